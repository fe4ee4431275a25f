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
use objgraph::{ClassBuilder, TypeDescriptor, TypeRegistry};
use objgraph_core::meta::{ClassStamp, FieldLocation, FieldStamp, TypeStamp};
use objgraph_tests::int;

fn class(name: &str, fields: &[(&str, TypeDescriptor)]) -> ClassStamp {
    ClassStamp {
        name: name.to_owned(),
        module: "t".to_owned(),
        fields: fields
            .iter()
            .map(|(name, field_type)| FieldStamp {
                name: (*name).to_owned(),
                field_type: field_type.clone(),
            })
            .collect(),
    }
}

fn location(class: &str, name: &str, field_type: TypeDescriptor) -> FieldLocation {
    FieldLocation {
        class: class.to_owned(),
        name: name.to_owned(),
        field_type,
    }
}

fn s() -> TypeDescriptor {
    TypeDescriptor::string()
}

#[test]
fn test_identical_stamps() {
    let stamp = TypeStamp::new(vec![class("t.A", &[("a", s())]), class("t.B", &[("b", int())])]);
    let diff = stamp.compare_with(&stamp.clone());
    assert!(diff.is_empty());
    assert!(!diff.has_chain_changes());
}

#[test]
fn test_stamp_from_registry() {
    let mut registry = TypeRegistry::new();
    registry
        .register(ClassBuilder::new("t.Base").field("id", int()).build())
        .unwrap()
        .register(
            ClassBuilder::new("t.Item")
                .base(TypeDescriptor::named("t.Base"))
                .field("name", s())
                .transient_field("cache", int())
                .build(),
        )
        .unwrap();
    let stamp = registry
        .stamp_of(&TypeDescriptor::named("t.Item"), false)
        .unwrap()
        .unwrap();
    // most derived first, no sys.Object, no transient fields
    assert_eq!(
        stamp.as_ref(),
        &TypeStamp::new(vec![class("t.Item", &[("name", s())]), class("t.Base", &[("id", int())])])
    );
    assert!(registry.stamp_of(&int(), false).unwrap().is_none());
    assert!(registry
        .stamp_of(&TypeDescriptor::list(int()), false)
        .unwrap()
        .is_none());
    assert!(registry
        .stamp_of(&TypeDescriptor::list(int()), true)
        .unwrap()
        .is_some());
}

#[test]
fn test_class_inserted_at_root() {
    let previous = TypeStamp::new(vec![class("t.A", &[])]);
    let current = TypeStamp::new(vec![class("t.A", &[]), class("t.Root", &[])]);
    let diff = current.compare_with(&previous);
    assert_eq!(diff.classes_added, vec!["t.Root".to_owned()]);
    assert!(diff.classes_removed.is_empty());
    assert!(diff.has_chain_changes());
}

#[test]
fn test_classes_inserted_root_most_first() {
    let previous = TypeStamp::new(vec![class("t.A", &[]), class("t.B", &[])]);
    let current = TypeStamp::new(vec![
        class("t.A", &[]),
        class("t.X", &[]),
        class("t.B", &[]),
        class("t.Y", &[]),
    ]);
    let diff = current.compare_with(&previous);
    assert_eq!(diff.classes_added, vec!["t.Y".to_owned(), "t.X".to_owned()]);
    assert!(diff.fields_added.is_empty());
}

#[test]
fn test_class_removed() {
    let previous = TypeStamp::new(vec![
        class("t.A", &[("a", s())]),
        class("t.Mid", &[("m", int())]),
        class("t.Base", &[]),
    ]);
    let current = TypeStamp::new(vec![class("t.A", &[("a", s())]), class("t.Base", &[])]);
    let diff = current.compare_with(&previous);
    assert_eq!(diff.classes_removed, vec!["t.Mid".to_owned()]);
    assert_eq!(diff.fields_removed, vec![location("t.Mid", "m", int())]);
    assert!(diff.fields_moved.is_empty());
}

#[test]
fn test_class_renamed_keeps_fields() {
    let previous = TypeStamp::new(vec![class("t.A", &[]), class("t.Old", &[("x", int())])]);
    let current = TypeStamp::new(vec![class("t.A", &[]), class("t.New", &[("x", int())])]);
    let diff = current.compare_with(&previous);
    assert_eq!(
        diff.classes_renamed,
        vec![("t.Old".to_owned(), "t.New".to_owned())]
    );
    assert_eq!(diff.renamed_to("t.Old"), Some("t.New"));
    assert!(diff.fields_added.is_empty());
    assert!(diff.fields_removed.is_empty());
    assert!(diff.fields_moved.is_empty());
}

#[test]
fn test_field_added_and_removed() {
    let previous = TypeStamp::new(vec![class("t.A", &[("a", s()), ("gone", int())])]);
    let current = TypeStamp::new(vec![class("t.A", &[("a", s()), ("fresh", int())])]);
    let diff = current.compare_with(&previous);
    assert_eq!(diff.fields_removed, vec![location("t.A", "gone", int())]);
    assert_eq!(diff.fields_added, vec![location("t.A", "fresh", int())]);
    assert!(!diff.has_chain_changes());
}

#[test]
fn test_field_moved_to_base() {
    let previous = TypeStamp::new(vec![class("t.A", &[("a", s()), ("b", int())]), class("t.Base", &[])]);
    let current = TypeStamp::new(vec![class("t.A", &[("b", int())]), class("t.Base", &[("a", s())])]);
    let diff = current.compare_with(&previous);
    assert_eq!(
        diff.fields_moved,
        vec![(location("t.A", "a", s()), location("t.Base", "a", s()))]
    );
    assert_eq!(diff.moved_to("t.A", "a"), Some(&location("t.Base", "a", s())));
    assert!(diff.fields_added.is_empty());
    assert!(diff.fields_removed.is_empty());
}

#[test]
fn test_field_moved_to_derived() {
    let previous = TypeStamp::new(vec![class("t.A", &[]), class("t.Base", &[("a", s())])]);
    let current = TypeStamp::new(vec![class("t.A", &[("a", s())]), class("t.Base", &[])]);
    let diff = current.compare_with(&previous);
    assert_eq!(diff.moved_to("t.Base", "a"), Some(&location("t.A", "a", s())));
}

#[test]
fn test_field_type_changed() {
    let previous = TypeStamp::new(vec![class("t.A", &[("a", s())])]);
    let current = TypeStamp::new(vec![class("t.A", &[("a", int())])]);
    let diff = current.compare_with(&previous);
    assert_eq!(
        diff.fields_changed,
        vec![(location("t.A", "a", s()), location("t.A", "a", int()))]
    );
    assert!(diff.fields_added.is_empty());
    assert!(diff.fields_removed.is_empty());
}

#[test]
fn test_moved_field_with_other_type_is_not_a_move() {
    let previous = TypeStamp::new(vec![class("t.A", &[("a", s())]), class("t.Base", &[])]);
    let current = TypeStamp::new(vec![class("t.A", &[]), class("t.Base", &[("a", int())])]);
    let diff = current.compare_with(&previous);
    assert!(diff.fields_moved.is_empty());
    assert_eq!(diff.fields_removed, vec![location("t.A", "a", s())]);
    assert_eq!(diff.fields_added, vec![location("t.Base", "a", int())]);
}
