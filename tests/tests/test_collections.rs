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
use objgraph::types::{CollectionKind, DictionaryInsert, InsertMethod};
use objgraph::{
    ClassBuilder, CollectionBuilder, DictionaryBuilder, Error, ObjGraph, ObjRef, TypeDescriptor,
    TypeRegistry, Value,
};
use objgraph_tests::{init_logger, int, named, node_registry, round_trip};

fn filled(graph: &ObjGraph, desc: &TypeDescriptor, items: &[Value]) -> ObjRef {
    let obj = graph.registry().new_object(desc).unwrap();
    {
        let mut object = obj.borrow_mut();
        let collection = object.as_collection_mut().unwrap();
        for item in items {
            match collection.kind() {
                CollectionKind::Queue => collection.enqueue(item.clone()),
                CollectionKind::Stack => collection.push(item.clone()),
                _ => collection.add(item.clone()),
            }
        }
    }
    obj
}

fn ints(values: &[i32]) -> Vec<Value> {
    values.iter().map(|v| Value::I32(*v)).collect()
}

fn both_layouts() -> [ObjGraph; 2] {
    [
        ObjGraph::new(TypeRegistry::new()),
        ObjGraph::new(TypeRegistry::new()).treat_collections_as_user_objects(true),
    ]
}

#[test]
fn test_list_queue_and_set() {
    init_logger();
    for graph in both_layouts() {
        let list = filled(&graph, &TypeDescriptor::list(int()), &ints(&[1, 2, 3]));
        let read = round_trip(&graph, &Value::Object(list));
        assert_eq!(read.as_object().unwrap().items(), ints(&[1, 2, 3]));

        let queue = filled(&graph, &TypeDescriptor::queue(int()), &ints(&[4, 5]));
        let read = round_trip(&graph, &Value::Object(queue));
        let read = read.as_object().unwrap();
        let first = read.borrow_mut().as_collection_mut().unwrap().dequeue();
        assert_eq!(first, Some(Value::I32(4)));

        let names: Vec<Value> = ["x", "y"].iter().map(|s| Value::string(s)).collect();
        let set = filled(&graph, &TypeDescriptor::hash_set(TypeDescriptor::string()), &names);
        let read = round_trip(&graph, &Value::Object(set));
        assert_eq!(read.as_object().unwrap().items(), names);
    }
}

#[test]
fn test_stack_keeps_order() {
    for graph in both_layouts() {
        let stack = filled(&graph, &TypeDescriptor::stack(int()), &ints(&[1, 2, 3]));
        assert_eq!(stack.items(), ints(&[3, 2, 1]));
        let read = round_trip(&graph, &Value::Object(stack));
        let read = read.as_object().unwrap();
        assert_eq!(read.items(), ints(&[3, 2, 1]));
        let top = read.borrow_mut().as_collection_mut().unwrap().pop();
        assert_eq!(top, Some(Value::I32(3)));
    }
}

#[test]
fn test_empty_collection() {
    for graph in both_layouts() {
        let list = filled(&graph, &TypeDescriptor::list(TypeDescriptor::string()), &[]);
        let read = round_trip(&graph, &Value::Object(list));
        assert!(read.as_object().unwrap().items().is_empty());
    }
}

#[test]
fn test_collection_cycle() {
    for graph in both_layouts() {
        let list = filled(&graph, &TypeDescriptor::list(TypeDescriptor::object()), &[]);
        let item = Value::Object(list.clone());
        list.borrow_mut()
            .as_collection_mut()
            .unwrap()
            .add(item);
        let read = round_trip(&graph, &Value::Object(list));
        let read = read.as_object().unwrap();
        let items = read.items();
        assert_eq!(items.len(), 1);
        assert!(items[0].as_object().unwrap().ptr_eq(read));
    }
}

#[test]
fn test_dictionary() {
    for graph in both_layouts() {
        let desc = TypeDescriptor::dictionary(TypeDescriptor::string(), int());
        let dict = graph.registry().new_object(&desc).unwrap();
        {
            let mut object = dict.borrow_mut();
            let entries = object.as_dictionary_mut().unwrap();
            entries.add(Value::string("one"), Value::I32(1)).unwrap();
            entries.add(Value::string("two"), Value::I32(2)).unwrap();
        }
        let read = round_trip(&graph, &Value::Object(dict));
        let read = read.as_object().unwrap().borrow();
        let entries = read.as_dictionary().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries.get(&Value::string("two")), Some(&Value::I32(2)));
        let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str().unwrap()).collect();
        assert_eq!(keys, vec!["one", "two"]);
    }
}

#[test]
fn test_dictionary_rejects_added_duplicates() {
    let mut registry = node_registry();
    registry
        .register(
            DictionaryBuilder::new("demo.Lookup", TypeDescriptor::object(), int())
                .insert(DictionaryInsert::TryAdd)
                .build(),
        )
        .unwrap();
    let mut graph = ObjGraph::new(registry);
    // both keys read back as the same string
    graph.register_surrogate(named("demo.Node"), |node| {
        let node = node.as_object().unwrap();
        Ok(node.get("label").unwrap())
    });

    let keyed = |desc: &TypeDescriptor| {
        let dict = graph.registry().new_object(desc).unwrap();
        for value in [1, 2] {
            let key = graph.registry().new_object(&named("demo.Node")).unwrap();
            key.set("label", "k").unwrap();
            dict.borrow_mut()
                .as_dictionary_mut()
                .unwrap()
                .add(Value::Object(key), Value::I32(value))
                .unwrap();
        }
        graph.serialize(&Value::Object(dict)).unwrap()
    };

    let bytes = keyed(&TypeDescriptor::dictionary(TypeDescriptor::object(), int()));
    assert!(matches!(graph.deserialize(&bytes), Err(Error::InvalidData(_))));

    let bytes = keyed(&named("demo.Lookup"));
    let read = graph.deserialize(&bytes).unwrap();
    let read = read.as_object().unwrap().borrow();
    let entries = read.as_dictionary().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries.get(&Value::string("k")), Some(&Value::I32(1)));
}

#[test]
fn test_null_dictionary_key() {
    let graph = ObjGraph::new(TypeRegistry::new());
    let dict = graph
        .registry()
        .new_object(&TypeDescriptor::dictionary(TypeDescriptor::object(), int()))
        .unwrap();
    dict.borrow_mut()
        .as_dictionary_mut()
        .unwrap()
        .add(Value::Null, Value::I32(0))
        .unwrap();
    let bytes = graph.serialize(&Value::Object(dict)).unwrap();
    assert!(matches!(graph.deserialize(&bytes), Err(Error::InvalidData(_))));
}

#[test]
fn test_user_collection_needs_insert_method() {
    let mut registry = TypeRegistry::new();
    registry
        .register(CollectionBuilder::new("demo.Bag", int()).build())
        .unwrap()
        .register(
            CollectionBuilder::new("demo.Ring", int())
                .kind(CollectionKind::Queue)
                .insert(InsertMethod::Enqueue)
                .build(),
        )
        .unwrap();
    let graph = ObjGraph::new(registry);

    let ring = filled(&graph, &named("demo.Ring"), &ints(&[9, 8]));
    let read = round_trip(&graph, &Value::Object(ring));
    assert_eq!(read.as_object().unwrap().items(), ints(&[9, 8]));

    let bag = filled(&graph, &named("demo.Bag"), &ints(&[1]));
    let bytes = graph.serialize(&Value::Object(bag)).unwrap();
    assert!(matches!(graph.deserialize(&bytes), Err(Error::Configuration(_))));
}

#[test]
fn test_layout_flag_comes_from_stream() {
    let writer = ObjGraph::new(TypeRegistry::new()).treat_collections_as_user_objects(true);
    let reader = ObjGraph::new(TypeRegistry::new());
    let list = filled(&writer, &TypeDescriptor::list(int()), &ints(&[7]));
    let bytes = writer.serialize(&Value::Object(list)).unwrap();
    assert_eq!(bytes[3], 0b11);
    let read = reader.deserialize(&bytes).unwrap();
    assert_eq!(read.as_object().unwrap().items(), ints(&[7]));
}

#[test]
fn test_read_only_collection() {
    let graph = ObjGraph::new(node_registry());
    let registry = graph.registry();
    let node = registry.new_object(&named("demo.Node")).unwrap();
    node.set("label", "inside").unwrap();
    let items = vec![Value::Object(node.clone()), Value::Null, Value::Object(node)];
    let read_only = registry
        .new_read_only(&named("demo.Node"), items)
        .unwrap();
    let read = round_trip(&graph, &Value::Object(read_only));
    let read = read.as_object().unwrap();
    assert_eq!(read.type_descriptor(), TypeDescriptor::read_only(named("demo.Node")));
    let items = read.items();
    assert_eq!(items.len(), 3);
    assert!(items[1].is_null());
    assert!(items[0].as_object().unwrap().ptr_eq(items[2].as_object().unwrap()));
}

#[test]
fn test_read_only_cycle_is_rejected() {
    let mut registry = TypeRegistry::new();
    registry
        .register(
            ClassBuilder::new("demo.Owner")
                .field("view", TypeDescriptor::read_only(TypeDescriptor::object()))
                .build(),
        )
        .unwrap();
    let graph = ObjGraph::new(registry);
    let owner = graph.registry().new_object(&named("demo.Owner")).unwrap();
    let view = graph
        .registry()
        .new_read_only(&TypeDescriptor::object(), vec![Value::Object(owner.clone())])
        .unwrap();
    owner.set("view", view.clone()).unwrap();

    // the view only exists once its items are read, so the owner cannot point back to it
    let bytes = graph.serialize(&Value::Object(view)).unwrap();
    assert!(matches!(graph.deserialize(&bytes), Err(Error::InvalidRef(_))));

    // entered through the owner, the view is complete before anyone refers to it
    let bytes = graph.serialize(&Value::Object(owner)).unwrap();
    let read = graph.deserialize(&bytes).unwrap();
    let read = read.as_object().unwrap();
    let view = read.get("view").unwrap();
    assert!(view.as_object().unwrap().items()[0]
        .as_object()
        .unwrap()
        .ptr_eq(read));
}

#[test]
fn test_negative_and_oversized_counts() {
    let graph = ObjGraph::new(TypeRegistry::new());
    let list = filled(&graph, &TypeDescriptor::list(int()), &ints(&[7, 8, 9]));
    let bytes = graph.serialize(&Value::Object(list)).unwrap();
    let pattern = [3, 0, 0, 0, 7, 0, 0, 0];
    let at = bytes
        .windows(pattern.len())
        .position(|w| w == pattern)
        .unwrap();

    let mut negative = bytes.clone();
    negative[at..at + 4].copy_from_slice(&(-1i32).to_le_bytes());
    assert!(matches!(graph.deserialize(&negative), Err(Error::InvalidData(_))));

    let mut oversized = bytes.clone();
    oversized[at..at + 4].copy_from_slice(&1000i32.to_le_bytes());
    assert!(matches!(graph.deserialize(&oversized), Err(Error::InvalidData(_))));
}
