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
//! Shared fixtures for the integration tests.

use objgraph::{ClassBuilder, ObjGraph, TypeDescriptor, TypeRegistry, Value};
use objgraph::types::PrimitiveKind;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn int() -> TypeDescriptor {
    TypeDescriptor::primitive(PrimitiveKind::I32)
}

pub fn f64_type() -> TypeDescriptor {
    TypeDescriptor::primitive(PrimitiveKind::F64)
}

pub fn named(name: &str) -> TypeDescriptor {
    TypeDescriptor::named(name)
}

/// `demo.Node { label: string, next: demo.Node }`, the smallest type able to form cycles.
pub fn node_registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry
        .register(
            ClassBuilder::new("demo.Node")
                .field("label", TypeDescriptor::string())
                .field("next", named("demo.Node"))
                .build(),
        )
        .unwrap();
    registry
}

pub fn round_trip(graph: &ObjGraph, value: &Value) -> Value {
    let bytes = graph.serialize(value).unwrap();
    graph.deserialize(&bytes).unwrap()
}
