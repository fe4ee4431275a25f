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
//! # Objgraph
//!
//! Binary serialization of object graphs: shared references and cycles are
//! kept, polymorphic fields are written with their runtime type, and a
//! stream can be read back by a later version of its types.
//!
//! ## Key Features
//!
//! - **Identity**: every object is written once; aliases and cycles are
//!   restored as such
//! - **Schema evolution**: fields added, removed or moved along the
//!   inheritance chain, classes inserted, removed or renamed in the chain,
//!   each accepted per [`VersionTolerance`] flag
//! - **Collections**: lists, queues, stacks, sets, dictionaries, read-only
//!   collections and multi-dimensional arrays
//! - **Hooks and surrogates**: post-construction hooks, late hooks run once
//!   the graph is complete, and replacement of objects on either side
//!
//! ## Describing types
//!
//! Types are described once in a [`TypeRegistry`]:
//!
//! ```rust
//! use objgraph::{ClassBuilder, ObjGraph, TypeDescriptor, TypeRegistry, Value};
//! use objgraph::types::PrimitiveKind;
//!
//! let mut registry = TypeRegistry::new();
//! registry
//!     .register(
//!         ClassBuilder::new("zoo.Animal")
//!             .field("name", TypeDescriptor::string())
//!             .field("legs", TypeDescriptor::primitive(PrimitiveKind::I32))
//!             .build(),
//!     )
//!     .unwrap()
//!     .register(
//!         ClassBuilder::new("zoo.Bird")
//!             .base(TypeDescriptor::named("zoo.Animal"))
//!             .field("wingspan", TypeDescriptor::primitive(PrimitiveKind::F64))
//!             .build(),
//!     )
//!     .unwrap();
//!
//! let graph = ObjGraph::new(registry);
//! let bird = graph.registry().new_object(&TypeDescriptor::named("zoo.Bird")).unwrap();
//! bird.set("name", "robin").unwrap();
//! bird.set("legs", 2).unwrap();
//! bird.set("wingspan", 0.3).unwrap();
//!
//! let bytes = graph.serialize(&Value::Object(bird)).unwrap();
//! let copy = graph.deserialize(&bytes).unwrap();
//! let copy = copy.as_object().unwrap();
//! assert_eq!(copy.type_descriptor(), TypeDescriptor::named("zoo.Bird"));
//! assert_eq!(copy.get("legs"), Some(Value::I32(2)));
//! ```
//!
//! ## Error Handling
//!
//! Every operation returns [`Error`]. Errors raised by hooks, surrogates and
//! the deserialization callback come back as [`Error::Callback`] with the
//! original error reachable through `downcast_ref`.
//!
//! ```rust
//! use objgraph::{Error, ObjGraph, TypeRegistry, Value};
//!
//! fn load(bytes: &[u8]) -> Result<Value, Error> {
//!     let graph = ObjGraph::new(TypeRegistry::new());
//!     graph.deserialize(bytes)
//! }
//!
//! assert!(matches!(load(&[0xd2, 0x0b]), Err(Error::BufferOutOfBound(..))));
//! ```

pub use objgraph_core::{
    buffer, config::Config, config::Method, config::VersionTolerance, error::Error,
    meta::StampDiff, meta::TypeDescriptor, meta::TypeStamp, objgraph::ObjGraph,
    resolver::builder::ClassBuilder, resolver::builder::CollectionBuilder,
    resolver::builder::DelegateBuilder, resolver::builder::DictionaryBuilder,
    resolver::builder::EnumBuilder, resolver::builder::SpecialBuilder,
    resolver::builder::StructBuilder, resolver::type_resolver::TypeRegistry,
    serializer::special::SpecialFormat, types, value, value::ObjRef, value::Value,
};
