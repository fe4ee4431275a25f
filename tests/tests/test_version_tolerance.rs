// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.
use objgraph::{
    ClassBuilder, Error, Method, ObjGraph, StructBuilder, TypeDescriptor, TypeRegistry, Value,
    VersionTolerance,
};
use objgraph_tests::{init_logger, int, named};

fn registry(defs: Vec<objgraph_core::resolver::type_resolver::TypeDef>) -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    for def in defs {
        registry.register(def).unwrap();
    }
    registry
}

fn s() -> TypeDescriptor {
    TypeDescriptor::string()
}

/// Writes one `desc` instance with `fields` set through `writer`.
fn write(writer: &ObjGraph, desc: &str, fields: &[(&str, &str, Value)]) -> Vec<u8> {
    let obj = writer.registry().new_object(&named(desc)).unwrap();
    for (class, name, value) in fields {
        obj.set_in(class, name, value.clone()).unwrap();
    }
    writer.serialize(&Value::Object(obj)).unwrap()
}

fn reader(registry: TypeRegistry, tolerance: VersionTolerance) -> ObjGraph {
    ObjGraph::new(registry).version_tolerance(tolerance)
}

fn person_v1() -> TypeRegistry {
    registry(vec![
        ClassBuilder::new("t.Pet").field("name", s()).build(),
        ClassBuilder::new("t.Person")
            .field("name", s())
            .field("age", int())
            .field("pet", named("t.Pet"))
            .field("email", s())
            .build(),
    ])
}

fn person_v1_bytes() -> Vec<u8> {
    let writer = ObjGraph::new(person_v1());
    write(
        &writer,
        "t.Person",
        &[
            ("t.Person", "name", Value::string("ada")),
            ("t.Person", "age", Value::I32(36)),
            ("t.Person", "email", Value::string("ada@example.org")),
        ],
    )
}

#[test]
fn test_field_removal() {
    init_logger();
    let v2 = || {
        registry(vec![ClassBuilder::new("t.Person")
            .field("name", s())
            .field("email", s())
            .build()])
    };
    let bytes = person_v1_bytes();

    let strict = reader(v2(), VersionTolerance::empty());
    assert!(matches!(strict.deserialize(&bytes), Err(Error::SchemaMismatch(_))));

    for method in [Method::Generated, Method::Reflection] {
        let tolerant = reader(v2(), VersionTolerance::FIELD_REMOVAL).read_method(method);
        let read = tolerant.deserialize(&bytes).unwrap();
        let read = read.as_object().unwrap();
        assert_eq!(read.get("name").unwrap().as_str(), Some("ada"));
        assert_eq!(read.get("email").unwrap().as_str(), Some("ada@example.org"));
    }
}

#[test]
fn test_removed_object_of_unknown_type() {
    let v2 = registry(vec![ClassBuilder::new("t.Person")
        .field("name", s())
        .field("email", s())
        .build()]);
    let tolerant = reader(v2, VersionTolerance::FIELD_REMOVAL);

    // a null reference can be skipped without knowing its type
    let read = tolerant.deserialize(&person_v1_bytes()).unwrap();
    assert_eq!(
        read.as_object().unwrap().get("name").unwrap().as_str(),
        Some("ada")
    );

    // a live one cannot be read at all
    let writer = ObjGraph::new(person_v1());
    let pet = writer.registry().new_object(&named("t.Pet")).unwrap();
    pet.set("name", "rex").unwrap();
    let bytes = write(&writer, "t.Person", &[("t.Person", "pet", Value::Object(pet))]);
    assert!(matches!(
        tolerant.deserialize(&bytes),
        Err(Error::UnresolvedType(_))
    ));
}

#[test]
fn test_removed_value_of_unknown_type() {
    let v1 = registry(vec![
        StructBuilder::new("t.Dim").field("w", int()).build(),
        ClassBuilder::new("t.Frame")
            .field("title", s())
            .field("size", named("t.Dim"))
            .build(),
    ]);
    let v2 = registry(vec![ClassBuilder::new("t.Frame").field("title", s()).build()]);
    let bytes = write(
        &ObjGraph::new(v1),
        "t.Frame",
        &[("t.Frame", "title", Value::string("x"))],
    );
    // the size of an inline value is unknown without its type
    assert!(matches!(
        reader(v2, VersionTolerance::FIELD_REMOVAL).deserialize(&bytes),
        Err(Error::UnresolvedType(_))
    ));
}

#[test]
fn test_field_addition() {
    let v2 = || {
        registry(vec![
            ClassBuilder::new("t.Pet").field("name", s()).build(),
            ClassBuilder::new("t.Person")
                .field("name", s())
                .field("age", int())
                .field("pet", named("t.Pet"))
                .field("email", s())
                .field("nick", s())
                .field("score", int())
                .build(),
        ])
    };
    let bytes = person_v1_bytes();
    assert!(matches!(
        reader(v2(), VersionTolerance::FIELD_REMOVAL).deserialize(&bytes),
        Err(Error::SchemaMismatch(_))
    ));
    let read = reader(v2(), VersionTolerance::FIELD_ADDITION)
        .deserialize(&bytes)
        .unwrap();
    let read = read.as_object().unwrap();
    assert_eq!(read.get("age").unwrap(), Value::I32(36));
    assert!(read.get("nick").unwrap().is_null());
    assert_eq!(read.get("score").unwrap(), Value::I32(0));
}

#[test]
fn test_changed_field_type_is_never_tolerated() {
    let v2 = registry(vec![
        ClassBuilder::new("t.Pet").field("name", s()).build(),
        ClassBuilder::new("t.Person")
            .field("name", s())
            .field("age", s())
            .field("pet", named("t.Pet"))
            .field("email", s())
            .build(),
    ]);
    assert!(matches!(
        reader(v2, VersionTolerance::all()).deserialize(&person_v1_bytes()),
        Err(Error::SchemaMismatch(_))
    ));
}

fn employee(base_fields: &[&str], derived_fields: &[&str]) -> TypeRegistry {
    let field_type = |name: &str| if name == "salary" { int() } else { s() };
    let mut base = ClassBuilder::new("t.Base");
    for &name in base_fields {
        base = base.field(name, field_type(name));
    }
    let mut derived = ClassBuilder::new("t.Employee").base(named("t.Base"));
    for &name in derived_fields {
        derived = derived.field(name, field_type(name));
    }
    registry(vec![base.build(), derived.build()])
}

#[test]
fn test_field_moved_to_base() {
    let writer = ObjGraph::new(employee(&[], &["title", "salary"]));
    let bytes = write(
        &writer,
        "t.Employee",
        &[
            ("t.Employee", "title", Value::string("cto")),
            ("t.Employee", "salary", Value::I32(10)),
        ],
    );
    let v2 = || employee(&["title"], &["salary"]);
    assert!(matches!(
        reader(v2(), VersionTolerance::FIELD_ADDITION | VersionTolerance::FIELD_REMOVAL)
            .deserialize(&bytes),
        Err(Error::SchemaMismatch(_))
    ));
    let read = reader(v2(), VersionTolerance::FIELD_MOVE)
        .deserialize(&bytes)
        .unwrap();
    let read = read.as_object().unwrap();
    assert_eq!(read.get_in("t.Base", "title").unwrap().as_str(), Some("cto"));
    assert_eq!(read.get_in("t.Employee", "salary").unwrap(), Value::I32(10));
}

#[test]
fn test_field_moved_to_derived() {
    let writer = ObjGraph::new(employee(&["title"], &["salary"]));
    let bytes = write(
        &writer,
        "t.Employee",
        &[
            ("t.Base", "title", Value::string("cfo")),
            ("t.Employee", "salary", Value::I32(20)),
        ],
    );
    let read = reader(employee(&[], &["title", "salary"]), VersionTolerance::FIELD_MOVE)
        .deserialize(&bytes)
        .unwrap();
    let read = read.as_object().unwrap();
    assert_eq!(read.get_in("t.Employee", "title").unwrap().as_str(), Some("cfo"));
}

fn employee_with_mid(mid_fields: &[&str]) -> TypeRegistry {
    let mut mid = ClassBuilder::new("t.Mid").base(named("t.Base"));
    for name in mid_fields {
        mid = mid.field(name, s());
    }
    registry(vec![
        ClassBuilder::new("t.Base").field("title", s()).build(),
        mid.build(),
        ClassBuilder::new("t.Employee")
            .base(named("t.Mid"))
            .field("salary", int())
            .build(),
    ])
}

#[test]
fn test_inserted_base_class() {
    let writer = ObjGraph::new(employee(&["title"], &["salary"]));
    let bytes = write(
        &writer,
        "t.Employee",
        &[("t.Base", "title", Value::string("dev"))],
    );

    assert!(matches!(
        reader(employee_with_mid(&[]), VersionTolerance::FIELD_ADDITION).deserialize(&bytes),
        Err(Error::SchemaMismatch(_))
    ));
    let read = reader(
        employee_with_mid(&[]),
        VersionTolerance::INHERITANCE_CHAIN_CHANGE,
    )
    .deserialize(&bytes)
    .unwrap();
    assert_eq!(
        read.as_object().unwrap().get("title").unwrap().as_str(),
        Some("dev")
    );

    // a field on the inserted class is an addition as well
    assert!(matches!(
        reader(
            employee_with_mid(&["team"]),
            VersionTolerance::INHERITANCE_CHAIN_CHANGE
        )
        .deserialize(&bytes),
        Err(Error::SchemaMismatch(_))
    ));
    let read = reader(
        employee_with_mid(&["team"]),
        VersionTolerance::INHERITANCE_CHAIN_CHANGE | VersionTolerance::FIELD_ADDITION,
    )
    .deserialize(&bytes)
    .unwrap();
    assert!(read.as_object().unwrap().get("team").unwrap().is_null());
}

#[test]
fn test_renamed_base_class() {
    let chain = |base: &str| {
        registry(vec![
            ClassBuilder::new(base).field("title", s()).build(),
            ClassBuilder::new("t.Employee")
                .base(named(base))
                .field("salary", int())
                .build(),
        ])
    };
    let writer = ObjGraph::new(chain("t.OldBase"));
    let bytes = write(
        &writer,
        "t.Employee",
        &[("t.OldBase", "title", Value::string("ops"))],
    );
    let read = reader(chain("t.NewBase"), VersionTolerance::INHERITANCE_CHAIN_CHANGE)
        .deserialize(&bytes)
        .unwrap();
    assert_eq!(
        read.as_object()
            .unwrap()
            .get_in("t.NewBase", "title")
            .unwrap()
            .as_str(),
        Some("ops")
    );
}

#[test]
fn test_struct_evolves_inside_class() {
    let shapes = |dim_fields: &[&str]| {
        let mut dim = StructBuilder::new("t.Dim");
        for name in dim_fields {
            dim = dim.field(name, int());
        }
        registry(vec![
            dim.build(),
            ClassBuilder::new("t.Frame").field("size", named("t.Dim")).build(),
        ])
    };
    let writer = ObjGraph::new(shapes(&["w"]));
    let frame = writer.registry().new_object(&named("t.Frame")).unwrap();
    let mut size = writer.registry().new_struct(&named("t.Dim")).unwrap();
    if let Value::Struct(fields) = &mut size {
        fields.set("w", Value::I32(640)).unwrap();
    }
    frame.set("size", size).unwrap();
    let bytes = writer.serialize(&Value::Object(frame)).unwrap();

    assert!(matches!(
        reader(shapes(&["w", "h"]), VersionTolerance::empty()).deserialize(&bytes),
        Err(Error::SchemaMismatch(_))
    ));
    let read = reader(shapes(&["w", "h"]), VersionTolerance::FIELD_ADDITION)
        .deserialize(&bytes)
        .unwrap();
    let size = read.as_object().unwrap().get("size").unwrap();
    let size = size.as_struct().unwrap();
    assert_eq!(size.get("w"), Some(&Value::I32(640)));
    assert_eq!(size.get("h"), Some(&Value::I32(0)));
}

#[test]
fn test_one_reader_for_two_versions() {
    let v2 = || {
        registry(vec![ClassBuilder::new("t.Person")
            .field("name", s())
            .field("email", s())
            .build()])
    };
    let current = write(
        &ObjGraph::new(v2()),
        "t.Person",
        &[("t.Person", "name", Value::string("grace"))],
    );
    let old = person_v1_bytes();
    let tolerant = reader(v2(), VersionTolerance::FIELD_REMOVAL);
    for bytes in [&old, &current, &old] {
        let read = tolerant.deserialize(bytes).unwrap();
        assert!(read.as_object().unwrap().get("name").unwrap().as_str().is_some());
    }
}
