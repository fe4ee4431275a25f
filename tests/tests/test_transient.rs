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
use objgraph::value::Literal;
use objgraph::{ClassBuilder, Error, ObjGraph, TypeDescriptor, TypeRegistry, Value};
use objgraph_tests::{int, named, round_trip};

fn session_registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry
        .register(
            ClassBuilder::new("t.Session")
                .field("user", TypeDescriptor::string())
                .transient_field("hits", int())
                .transient_field("scratch", TypeDescriptor::object())
                .constructed_field("recent", TypeDescriptor::list(int()), vec![Literal::I32(8)])
                .build(),
        )
        .unwrap();
    registry
}

#[test]
fn test_transient_fields_are_reset() {
    let graph = ObjGraph::new(session_registry());
    let session = graph.registry().new_object(&named("t.Session")).unwrap();
    session.set("user", "root").unwrap();
    session.set("hits", Value::I32(99)).unwrap();
    session.set("scratch", Value::string("tmp")).unwrap();

    let read = round_trip(&graph, &Value::Object(session));
    let read = read.as_object().unwrap();
    assert_eq!(read.get("user").unwrap().as_str(), Some("root"));
    assert_eq!(read.get("hits").unwrap(), Value::I32(0));
    assert!(read.get("scratch").unwrap().is_null());
}

#[test]
fn test_constructed_field_is_rebuilt() {
    let graph = ObjGraph::new(session_registry());
    let session = graph.registry().new_object(&named("t.Session")).unwrap();
    let before = graph
        .registry()
        .new_object(&TypeDescriptor::list(int()))
        .unwrap();
    before
        .borrow_mut()
        .as_collection_mut()
        .unwrap()
        .add(Value::I32(1));
    session.set("recent", before).unwrap();

    let read = round_trip(&graph, &Value::Object(session));
    let recent = read.as_object().unwrap().get("recent").unwrap();
    let recent = recent.as_object().unwrap();
    assert_eq!(recent.type_descriptor(), TypeDescriptor::list(int()));
    assert!(recent.items().is_empty());
}

#[test]
fn test_transient_fields_are_not_written() {
    let graph = ObjGraph::new(session_registry());
    let session = graph.registry().new_object(&named("t.Session")).unwrap();
    let quiet = graph.serialize(&Value::Object(session.clone())).unwrap();
    session.set("scratch", Value::string("loud")).unwrap();
    session.set("hits", Value::I32(7)).unwrap();
    assert_eq!(graph.serialize(&Value::Object(session)).unwrap(), quiet);
}

#[test]
fn test_constructed_field_needs_constructor() {
    let mut registry = TypeRegistry::new();
    registry
        .register(ClassBuilder::new("t.Plain").build())
        .unwrap()
        .register(
            ClassBuilder::new("t.Holder")
                .constructed_field("helper", named("t.Plain"), vec![])
                .build(),
        )
        .unwrap();
    let graph = ObjGraph::new(registry);
    let holder = graph.registry().new_object(&named("t.Holder")).unwrap();
    let bytes = graph.serialize(&Value::Object(holder)).unwrap();
    assert!(matches!(graph.deserialize(&bytes), Err(Error::Configuration(_))));
}

#[test]
fn test_constructor_errors_surface() {
    let mut registry = TypeRegistry::new();
    registry
        .register(
            ClassBuilder::new("t.Picky")
                .constructor(|_| anyhow::bail!("never"))
                .build(),
        )
        .unwrap()
        .register(
            ClassBuilder::new("t.Holder")
                .constructed_field("picky", named("t.Picky"), vec![Literal::Null])
                .build(),
        )
        .unwrap();
    let graph = ObjGraph::new(registry);
    let holder = graph.registry().new_object(&named("t.Holder")).unwrap();
    let bytes = graph.serialize(&Value::Object(holder)).unwrap();
    assert!(matches!(graph.deserialize(&bytes), Err(Error::Callback(_))));
}
