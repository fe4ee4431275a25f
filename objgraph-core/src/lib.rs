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
//! # Objgraph Core
//!
//! The engine behind `objgraph`: binary serialization of arbitrary object
//! graphs, cycles and shared references included, readable by a later
//! version of the same types.
//!
//! ## Architecture
//!
//! - **`objgraph`**: [`ObjGraph`], configuration entry point and plan caches
//! - **`buffer`**: little endian primitive codec with `Reader`/`Writer`
//! - **`value`**: dynamic values and heap objects making up a graph
//! - **`resolver`**: type registry, object and type tables, surrogates
//! - **`serializer`**: creation strategies, read/write plans and the engine
//!   interpreting them
//! - **`meta`**: type descriptors, type stamps and their comparison
//! - **`types`**: wire constants and small shared enums
//! - **`config`**: [`Config`], [`Method`] and [`VersionTolerance`]
//! - **`error`**: the [`Error`] type
//!
//! ## Types
//!
//! Without runtime reflection the program's types are described by a
//! [`TypeRegistry`]. Classes with single inheritance, structs, enums,
//! delegates and special format types are registered through builders;
//! primitives, strings, arrays and the `sys` generic collections are built
//! in. Two registries holding two versions of a type stand for two builds of
//! a program.
//!
//! ## Version tolerance
//!
//! Every class and struct travels with a [`TypeStamp`]: its inheritance
//! chain and non-transient fields. A reader whose stamp differs diffs the
//! two and, within the enabled [`VersionTolerance`], drops removed fields,
//! keeps defaults for added ones and relocates fields moved along the chain.
//!
//! ```rust
//! use objgraph_core::resolver::builder::ClassBuilder;
//! use objgraph_core::types::PrimitiveKind;
//! use objgraph_core::{ObjGraph, TypeDescriptor, TypeRegistry, Value, VersionTolerance};
//!
//! let int = TypeDescriptor::primitive(PrimitiveKind::I32);
//! let mut old = TypeRegistry::new();
//! old.register(ClassBuilder::new("app.Point").field("x", int.clone()).build())
//!     .unwrap();
//! let mut new = TypeRegistry::new();
//! new.register(
//!     ClassBuilder::new("app.Point")
//!         .field("x", int.clone())
//!         .field("y", int)
//!         .build(),
//! )
//! .unwrap();
//!
//! let writer = ObjGraph::new(old);
//! let point = writer.registry().new_object(&TypeDescriptor::named("app.Point")).unwrap();
//! point.set("x", 7).unwrap();
//! let bytes = writer.serialize(&Value::Object(point)).unwrap();
//!
//! let reader = ObjGraph::new(new).version_tolerance(VersionTolerance::FIELD_ADDITION);
//! let point = reader.deserialize(&bytes).unwrap();
//! let point = point.as_object().unwrap();
//! assert_eq!(point.get("x"), Some(Value::I32(7)));
//! assert_eq!(point.get("y"), Some(Value::I32(0)));
//! ```

pub mod buffer;
pub mod config;
pub mod error;
pub mod meta;
pub mod objgraph;
pub mod resolver;
pub mod serializer;
pub mod types;
pub mod value;

pub use config::{Config, Method, VersionTolerance};
pub use error::Error;
pub use meta::{StampDiff, TypeDescriptor, TypeStamp};
pub use objgraph::ObjGraph;
pub use resolver::builder::{
    ClassBuilder, CollectionBuilder, DelegateBuilder, DictionaryBuilder, EnumBuilder,
    SpecialBuilder, StructBuilder,
};
pub use resolver::type_resolver::TypeRegistry;
pub use serializer::special::SpecialFormat;
pub use value::{ObjRef, Value};
