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

//! Builders for the type definitions held by a [`TypeRegistry`](super::type_resolver::TypeRegistry).
//!
//! ```
//! use objgraph_core::meta::TypeDescriptor;
//! use objgraph_core::resolver::builder::ClassBuilder;
//! use objgraph_core::resolver::type_resolver::TypeRegistry;
//!
//! let mut registry = TypeRegistry::new();
//! registry
//!     .register(ClassBuilder::new("shop.Item").field("name", TypeDescriptor::string()).build())
//!     .unwrap();
//! let item = registry.new_object(&TypeDescriptor::named("shop.Item")).unwrap();
//! item.set("name", "pencil").unwrap();
//! ```

use super::type_resolver::{
    ClassDef, CollectionDef, ConstructorFn, DictionaryDef, EnumDef, FieldDef, HookFn, MethodDef,
    SpecialDef, StructDef, TypeDef, TypeKind,
};
use crate::meta::TypeDescriptor;
use crate::serializer::special::SpecialFormat;
use crate::types::{CollectionKind, DictionaryInsert, InsertMethod, PrimitiveKind};
use crate::value::{Literal, ObjRef, Value};
use std::sync::Arc;

fn plain_field(name: &str, field_type: TypeDescriptor) -> FieldDef {
    FieldDef {
        name: name.to_owned(),
        field_type,
        transient: false,
        constructor_args: None,
    }
}

pub struct ClassBuilder {
    descriptor: TypeDescriptor,
    class: ClassDef,
    constructor: Option<ConstructorFn>,
    methods: Vec<MethodDef>,
}

impl ClassBuilder {
    pub fn new(name: &str) -> ClassBuilder {
        ClassBuilder {
            descriptor: TypeDescriptor::named(name),
            class: ClassDef::default(),
            constructor: None,
            methods: Vec::new(),
        }
    }

    /// Overrides the module derived from the type name.
    pub fn in_module(mut self, module: &str) -> Self {
        self.descriptor = TypeDescriptor::named_in(self.descriptor.name(), module);
        self
    }

    pub fn base(mut self, base: TypeDescriptor) -> Self {
        self.class.base = Some(base);
        self
    }

    pub fn field(mut self, name: &str, field_type: TypeDescriptor) -> Self {
        self.class.fields.push(plain_field(name, field_type));
        self
    }

    pub fn transient_field(mut self, name: &str, field_type: TypeDescriptor) -> Self {
        self.class.fields.push(FieldDef {
            transient: true,
            ..plain_field(name, field_type)
        });
        self
    }

    /// Transient field rebuilt on read by calling the constructor of its type with `args`.
    pub fn constructed_field(
        mut self,
        name: &str,
        field_type: TypeDescriptor,
        args: Vec<Literal>,
    ) -> Self {
        self.class.fields.push(FieldDef {
            transient: true,
            constructor_args: Some(args),
            ..plain_field(name, field_type)
        });
        self
    }

    /// Runs right after the instance is filled, base classes first.
    pub fn hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ObjRef) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.class.hooks.push(Arc::new(hook) as HookFn);
        self
    }

    /// Runs once the whole graph has been read.
    pub fn late_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ObjRef) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.class.late_hooks.push(Arc::new(hook) as HookFn);
        self
    }

    pub fn method<F>(mut self, name: &str, body: F) -> Self
    where
        F: Fn(Option<&ObjRef>, &[Value]) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.methods.push(MethodDef {
            name: name.to_owned(),
            body: Arc::new(body),
        });
        self
    }

    pub fn constructor<F>(mut self, constructor: F) -> Self
    where
        F: Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.constructor = Some(Arc::new(constructor));
        self
    }

    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    pub fn build(self) -> TypeDef {
        let def = TypeDef::new(self.descriptor, TypeKind::Class(self.class))
            .with_methods(self.methods);
        match self.constructor {
            Some(constructor) => def.with_constructor(constructor),
            None => def,
        }
    }
}

pub struct StructBuilder {
    descriptor: TypeDescriptor,
    fields: Vec<FieldDef>,
}

impl StructBuilder {
    pub fn new(name: &str) -> StructBuilder {
        StructBuilder {
            descriptor: TypeDescriptor::named(name),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: &str, field_type: TypeDescriptor) -> Self {
        self.fields.push(plain_field(name, field_type));
        self
    }

    pub fn transient_field(mut self, name: &str, field_type: TypeDescriptor) -> Self {
        self.fields.push(FieldDef {
            transient: true,
            ..plain_field(name, field_type)
        });
        self
    }

    pub fn build(self) -> TypeDef {
        TypeDef::new(
            self.descriptor,
            TypeKind::Struct(StructDef {
                fields: self.fields,
            }),
        )
    }
}

pub struct EnumBuilder {
    descriptor: TypeDescriptor,
    def: EnumDef,
}

impl EnumBuilder {
    pub fn new(name: &str) -> EnumBuilder {
        EnumBuilder {
            descriptor: TypeDescriptor::named(name),
            def: EnumDef {
                underlying: PrimitiveKind::I32,
                variants: Vec::new(),
            },
        }
    }

    /// Integer representation on the wire, `I32` unless set.
    pub fn underlying(mut self, kind: PrimitiveKind) -> Self {
        self.def.underlying = kind;
        self
    }

    pub fn variant(mut self, name: &str, raw: i64) -> Self {
        self.def.variants.push((name.to_owned(), raw));
        self
    }

    pub fn build(self) -> TypeDef {
        TypeDef::new(self.descriptor, TypeKind::Enum(self.def))
    }
}

/// User collection type. Without any insertion operation the type cannot be read back.
pub struct CollectionBuilder {
    descriptor: TypeDescriptor,
    def: CollectionDef,
}

impl CollectionBuilder {
    pub fn new(name: &str, element: TypeDescriptor) -> CollectionBuilder {
        CollectionBuilder {
            descriptor: TypeDescriptor::named(name),
            def: CollectionDef {
                element,
                kind: CollectionKind::List,
                insert: Vec::new(),
            },
        }
    }

    pub fn kind(mut self, kind: CollectionKind) -> Self {
        self.def.kind = kind;
        self
    }

    pub fn insert(mut self, method: InsertMethod) -> Self {
        self.def.insert.push(method);
        self
    }

    pub fn build(self) -> TypeDef {
        TypeDef::new(self.descriptor, TypeKind::Collection(self.def))
    }
}

pub struct DictionaryBuilder {
    descriptor: TypeDescriptor,
    def: DictionaryDef,
}

impl DictionaryBuilder {
    pub fn new(name: &str, key: TypeDescriptor, value: TypeDescriptor) -> DictionaryBuilder {
        DictionaryBuilder {
            descriptor: TypeDescriptor::named(name),
            def: DictionaryDef {
                key,
                value,
                insert: None,
            },
        }
    }

    pub fn insert(mut self, insert: DictionaryInsert) -> Self {
        self.def.insert = Some(insert);
        self
    }

    pub fn build(self) -> TypeDef {
        TypeDef::new(self.descriptor, TypeKind::Dictionary(self.def))
    }
}

pub struct SpecialBuilder {
    descriptor: TypeDescriptor,
    factory: Arc<dyn Fn() -> Box<dyn SpecialFormat> + Send + Sync>,
}

impl SpecialBuilder {
    /// `factory` creates the empty instance that is then loaded from the stream.
    pub fn new<F>(name: &str, factory: F) -> SpecialBuilder
    where
        F: Fn() -> Box<dyn SpecialFormat> + Send + Sync + 'static,
    {
        SpecialBuilder {
            descriptor: TypeDescriptor::named(name),
            factory: Arc::new(factory),
        }
    }

    pub fn build(self) -> TypeDef {
        TypeDef::new(
            self.descriptor,
            TypeKind::Special(SpecialDef {
                factory: self.factory,
            }),
        )
    }
}

pub struct DelegateBuilder {
    descriptor: TypeDescriptor,
}

impl DelegateBuilder {
    pub fn new(name: &str) -> DelegateBuilder {
        DelegateBuilder {
            descriptor: TypeDescriptor::named(name),
        }
    }

    pub fn build(self) -> TypeDef {
        TypeDef::new(self.descriptor, TypeKind::Delegate)
    }
}
