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

//! Per-type read and write procedures.
//!
//! A plan is the result of walking a type definition once: creation
//! discipline, field slots in wire order, element encodings, hooks and
//! surrogate. The engine in [`crate::serializer`] interprets plans; caching
//! them is what [`Method::Generated`](crate::config::Method) means.

use crate::error::Error;
use crate::meta::TypeDescriptor;
use crate::objgraph::ObjGraph;
use crate::resolver::meta_resolver::{MetaReaderResolver, StreamType};
use crate::resolver::surrogate::SurrogateFn;
use crate::resolver::type_resolver::{HookFn, InstanceLayout, TypeDef, TypeKind, TypeRegistry};
use crate::serializer::creation::classify;
use crate::types::{CollectionKind, CreationWay, DictionaryInsert, InsertMethod, PrimitiveKind};
use crate::value::Literal;
use std::fmt;
use std::sync::Arc;

/// Encoding of a value in a field, element or entry position.
#[derive(Clone, Debug, PartialEq)]
pub enum ValuePlan {
    /// Object id, then type and payload on first occurrence. Carries the declared type.
    Reference(TypeDescriptor),
    Primitive(PrimitiveKind),
    Enum {
        ty: TypeDescriptor,
        underlying: PrimitiveKind,
    },
    Struct(TypeDescriptor),
    Nullable(Box<ValuePlan>),
}

impl ValuePlan {
    pub fn of(registry: &TypeRegistry, desc: &TypeDescriptor) -> Result<ValuePlan, Error> {
        let def = registry.resolve(desc)?;
        Ok(match def.kind() {
            TypeKind::Primitive(kind) if kind.is_value_type() => ValuePlan::Primitive(*kind),
            TypeKind::Enum(e) => ValuePlan::Enum {
                ty: desc.clone(),
                underlying: e.underlying,
            },
            TypeKind::Struct(_) => ValuePlan::Struct(desc.clone()),
            TypeKind::Nullable(inner) => {
                ValuePlan::Nullable(Box::new(ValuePlan::of(registry, inner)?))
            }
            _ => ValuePlan::Reference(desc.clone()),
        })
    }
}

#[derive(Clone, Debug)]
pub struct FieldStep {
    /// Slot receiving the value, `None` to read and discard.
    pub target: Option<usize>,
    pub value: ValuePlan,
}

/// Field reads of a class or struct in the order the stream carries them.
#[derive(Clone, Debug)]
pub struct FieldPlan {
    pub layout: Arc<InstanceLayout>,
    pub steps: Vec<FieldStep>,
    /// Transient fields built from constructor arguments: slot, type, arguments.
    pub constructed: Vec<(usize, TypeDescriptor, Vec<Literal>)>,
}

#[derive(Clone, Debug)]
pub enum ReadBody {
    Boxed(ValuePlan),
    Str,
    Fields(Arc<FieldPlan>),
    Array {
        element_type: TypeDescriptor,
        element: ValuePlan,
        rank: u8,
    },
    Collection {
        element: ValuePlan,
        insert: InsertMethod,
        stack: bool,
    },
    CollectionFields,
    Dictionary {
        key: ValuePlan,
        value: ValuePlan,
        insert: DictionaryInsert,
    },
    DictionaryFields,
    ReadOnly(ValuePlan),
    Delegate,
    Special,
}

pub struct ReadPlan {
    pub def: Arc<TypeDef>,
    pub creation: CreationWay,
    pub body: ReadBody,
    /// Immediate hooks, base class first.
    pub hooks: Vec<HookFn>,
    pub late_hooks: Vec<HookFn>,
    pub surrogate: Option<SurrogateFn>,
}

impl fmt::Debug for ReadPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadPlan")
            .field("type", self.def.descriptor())
            .field("creation", &self.creation)
            .field("body", &self.body)
            .field("hooks", &self.hooks.len())
            .field("late_hooks", &self.late_hooks.len())
            .field("surrogate", &self.surrogate.is_some())
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct WriteStep {
    pub slot: usize,
    pub class: String,
    pub name: String,
    pub value: ValuePlan,
}

#[derive(Clone, Debug)]
pub struct FieldWritePlan {
    pub layout: Arc<InstanceLayout>,
    pub steps: Vec<WriteStep>,
}

#[derive(Clone, Debug)]
pub enum WriteBody {
    Boxed(ValuePlan),
    Str,
    Fields(Arc<FieldWritePlan>),
    Array(ValuePlan),
    Collection(ValuePlan),
    CollectionFields {
        items: TypeDescriptor,
    },
    Dictionary {
        key: ValuePlan,
        value: ValuePlan,
    },
    DictionaryFields {
        keys: TypeDescriptor,
        values: TypeDescriptor,
    },
    ReadOnly(ValuePlan),
    Delegate,
    Special,
}

#[derive(Debug)]
pub struct WritePlan {
    pub descriptor: TypeDescriptor,
    pub body: WriteBody,
}

const INSERT_PREFERENCE: [InsertMethod; 3] =
    [InsertMethod::Add, InsertMethod::Enqueue, InsertMethod::Push];

fn check_pseudo_stamp(
    registry: &TypeRegistry,
    stream_type: &StreamType,
) -> Result<(), Error> {
    let current = registry.stamp_of(&stream_type.descriptor, true)?;
    if current.as_deref() != stream_type.stamp.as_deref() {
        return Err(Error::schema_mismatch(format!(
            "layout of {} differs from the stream",
            stream_type.descriptor
        )));
    }
    Ok(())
}

fn collect_hooks(
    registry: &TypeRegistry,
    desc: &TypeDescriptor,
) -> Result<(Vec<HookFn>, Vec<HookFn>), Error> {
    let layout = registry.layout_of(desc)?;
    let mut hooks = Vec::new();
    let mut late_hooks = Vec::new();
    for class in layout.classes.iter().rev() {
        if let TypeKind::Class(def) = registry.resolve(class)?.kind() {
            hooks.extend(def.hooks.iter().cloned());
            late_hooks.extend(def.late_hooks.iter().cloned());
        }
    }
    Ok((hooks, late_hooks))
}

pub(crate) fn build_read_plan(
    graph: &ObjGraph,
    stream_type: &StreamType,
    collections_as_objects: bool,
    types: &MetaReaderResolver,
) -> Result<ReadPlan, Error> {
    let registry = graph.registry();
    let desc = &stream_type.descriptor;
    let def = registry.resolve(desc)?;
    let creation = classify(&def, collections_as_objects);
    let body = match def.kind() {
        TypeKind::Primitive(PrimitiveKind::String) => ReadBody::Str,
        TypeKind::Primitive(_) | TypeKind::Enum(_) | TypeKind::Struct(_) => {
            ReadBody::Boxed(ValuePlan::of(registry, desc)?)
        }
        TypeKind::Nullable(_) => {
            return Err(Error::invalid_data(format!(
                "{} cannot appear as an object type",
                desc
            )))
        }
        TypeKind::Class(_) => {
            ReadBody::Fields(graph.field_plan(desc, stream_type.stamp.as_ref(), types)?)
        }
        TypeKind::Array { element, rank } => ReadBody::Array {
            element_type: element.clone(),
            element: ValuePlan::of(registry, element)?,
            rank: *rank,
        },
        TypeKind::Collection(_) | TypeKind::Dictionary(_) if collections_as_objects => {
            check_pseudo_stamp(registry, stream_type)?;
            match def.kind() {
                TypeKind::Collection(_) => ReadBody::CollectionFields,
                _ => ReadBody::DictionaryFields,
            }
        }
        TypeKind::Collection(c) => {
            let insert = INSERT_PREFERENCE
                .into_iter()
                .find(|m| c.insert.contains(m))
                .ok_or_else(|| {
                    Error::configuration(format!("{} has no insertion method", desc))
                })?;
            ReadBody::Collection {
                element: ValuePlan::of(registry, &c.element)?,
                insert,
                stack: c.kind == CollectionKind::Stack,
            }
        }
        TypeKind::Dictionary(d) => ReadBody::Dictionary {
            key: ValuePlan::of(registry, &d.key)?,
            value: ValuePlan::of(registry, &d.value)?,
            insert: d.insert.ok_or_else(|| {
                Error::configuration(format!("{} has no insertion method", desc))
            })?,
        },
        TypeKind::ReadOnlyCollection { element } => {
            ReadBody::ReadOnly(ValuePlan::of(registry, element)?)
        }
        TypeKind::Delegate => ReadBody::Delegate,
        TypeKind::Special(_) => ReadBody::Special,
    };
    let (hooks, late_hooks) = match def.kind() {
        TypeKind::Class(_) => collect_hooks(registry, desc)?,
        _ => (Vec::new(), Vec::new()),
    };
    let surrogate = graph.surrogates().lookup(desc, registry)?;
    if surrogate.is_some() && !late_hooks.is_empty() {
        return Err(Error::configuration(format!(
            "{} declares late hooks and has a surrogate",
            desc
        )));
    }
    let plan = ReadPlan {
        def,
        creation,
        body,
        hooks,
        late_hooks,
        surrogate,
    };
    log::debug!("generated {:?}", plan);
    Ok(plan)
}

pub(crate) fn build_field_write_plan(
    registry: &TypeRegistry,
    desc: &TypeDescriptor,
) -> Result<FieldWritePlan, Error> {
    let layout = registry.layout_of(desc)?;
    let stamp = registry
        .stamp_of(desc, false)?
        .ok_or_else(|| Error::type_error(format!("{} has no fields", desc)))?;
    let steps = stamp
        .fields()
        .map(|(class, field)| {
            let slot = layout.find(&class.name, &field.name).ok_or_else(|| {
                Error::unknown(format!("{}.{} missing from layout", class.name, field.name))
            })?;
            Ok(WriteStep {
                slot,
                class: class.name.clone(),
                name: field.name.clone(),
                value: ValuePlan::of(registry, &field.field_type)?,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;
    Ok(FieldWritePlan { layout, steps })
}

pub(crate) fn build_write_plan(graph: &ObjGraph, desc: &TypeDescriptor) -> Result<WritePlan, Error> {
    let registry = graph.registry();
    let collections_as_objects = graph.config().treat_collections_as_user_objects;
    let def = registry.resolve(desc)?;
    let body = match def.kind() {
        TypeKind::Primitive(PrimitiveKind::String) => WriteBody::Str,
        TypeKind::Primitive(_) | TypeKind::Enum(_) => WriteBody::Boxed(ValuePlan::of(registry, desc)?),
        TypeKind::Class(_) | TypeKind::Struct(_) => {
            WriteBody::Fields(Arc::new(build_field_write_plan(registry, desc)?))
        }
        TypeKind::Nullable(_) => {
            return Err(Error::type_error(format!(
                "{} cannot be written as an object",
                desc
            )))
        }
        TypeKind::Array { element, .. } => WriteBody::Array(ValuePlan::of(registry, element)?),
        TypeKind::Collection(c) if collections_as_objects => WriteBody::CollectionFields {
            items: TypeDescriptor::array(c.element.clone(), 1),
        },
        TypeKind::Collection(c) => WriteBody::Collection(ValuePlan::of(registry, &c.element)?),
        TypeKind::Dictionary(d) if collections_as_objects => WriteBody::DictionaryFields {
            keys: TypeDescriptor::array(d.key.clone(), 1),
            values: TypeDescriptor::array(d.value.clone(), 1),
        },
        TypeKind::Dictionary(d) => WriteBody::Dictionary {
            key: ValuePlan::of(registry, &d.key)?,
            value: ValuePlan::of(registry, &d.value)?,
        },
        TypeKind::ReadOnlyCollection { element } => {
            WriteBody::ReadOnly(ValuePlan::of(registry, element)?)
        }
        TypeKind::Delegate => WriteBody::Delegate,
        TypeKind::Special(_) => WriteBody::Special,
    };
    let plan = WritePlan {
        descriptor: desc.clone(),
        body,
    };
    log::debug!("generated {:?}", plan);
    Ok(plan)
}
