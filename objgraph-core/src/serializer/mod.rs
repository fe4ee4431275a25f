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
//! The engine interpreting read and write plans.
//!
//! Every value in reference position goes through [`write_ref`] and
//! [`read_ref`]: an `i32` object id, `0` for null, followed by the type and
//! the payload the first time the id appears. Value types are written inline
//! by [`write_value`] and [`read_value`].

use crate::buffer::Reader;
use crate::error::Error;
use crate::meta::TypeDescriptor;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::plan::{ReadBody, ReadPlan, ValuePlan, WriteBody, WritePlan};
use crate::serializer::primitive::{
    min_wire_size as primitive_wire_size, read_enum_raw, read_primitive, write_enum_raw,
    write_primitive,
};
use crate::types::{CreationWay, NULL_ID};
use crate::value::{EnumValue, ObjRef, Value};
use crate::{bail, ensure};

mod array;
mod collection;
pub mod creation;
mod delegate;
mod map;
pub mod object;
pub mod plan;
mod primitive;
pub mod special;

/// Upper bound for element counts of zero sized elements.
const MAX_UNSIZED_ELEMENTS: usize = 1 << 20;

/// Remaining stack below which a nested object continues on a new segment.
const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_SEGMENT_SIZE: usize = 4 * 1024 * 1024;

pub(crate) fn read_count(reader: &mut Reader) -> Result<usize, Error> {
    let count = reader.read_i32()?;
    ensure!(
        count >= 0,
        Error::invalid_data(format!("negative element count {}", count))
    );
    Ok(count as usize)
}

/// Fewest bytes one value of `plan` occupies in the stream.
///
/// Struct sizes follow the field list the stream declared for the struct.
pub(crate) fn min_wire_size(ctx: &mut ReadContext, plan: &ValuePlan) -> Result<usize, Error> {
    Ok(match plan {
        ValuePlan::Reference(_) => 4,
        ValuePlan::Primitive(kind) => primitive_wire_size(*kind),
        ValuePlan::Enum { underlying, .. } => primitive_wire_size(*underlying),
        ValuePlan::Nullable(_) => 1,
        ValuePlan::Struct(ty) => {
            let fields = ctx.struct_plan(ty)?;
            let mut size = 0;
            for step in &fields.steps {
                size += min_wire_size(ctx, &step.value)?;
            }
            size
        }
    })
}

/// Rejects counts the rest of the stream cannot possibly hold.
pub(crate) fn check_element_count(
    reader: &Reader,
    count: usize,
    min_size: usize,
) -> Result<(), Error> {
    let limit = match min_size {
        0 => MAX_UNSIZED_ELEMENTS,
        size => reader.remaining() / size,
    };
    if count > limit {
        return Err(Error::invalid_data(format!(
            "{} elements announced, at most {} fit in the remaining {} bytes",
            count,
            limit,
            reader.remaining()
        )));
    }
    Ok(())
}

fn expect_object<'v>(value: &'v Value, desc: &TypeDescriptor) -> Result<&'v ObjRef, Error> {
    value
        .as_object()
        .ok_or_else(|| Error::type_mismatch(desc.to_string(), value.kind_name()))
}

pub(crate) fn write_ref(
    ctx: &mut WriteContext,
    value: &Value,
    declared: &TypeDescriptor,
) -> Result<(), Error> {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT_SIZE, || {
        write_ref_info_data(ctx, value, declared)
    })
}

fn write_ref_info_data(
    ctx: &mut WriteContext,
    value: &Value,
    declared: &TypeDescriptor,
) -> Result<(), Error> {
    if value.is_null() {
        ctx.writer.write_i32(NULL_ID);
        return Ok(());
    }
    if let Some(id) = ctx.ref_writer.lookup(value) {
        ctx.writer.write_i32(id);
        return Ok(());
    }
    let graph = ctx.graph();
    let registry = graph.registry();
    let runtime = value
        .type_descriptor()
        .ok_or_else(|| Error::unknown("non-null value without a type"))?;
    if !registry.is_assignable(&runtime, declared)? {
        return Err(Error::type_mismatch(declared.to_string(), runtime.to_string()));
    }

    let mut payload = value.clone();
    if !graph.object_surrogates().is_empty() {
        if let Some(factory) = graph.object_surrogates().lookup(&runtime, registry)? {
            payload = factory(value).map_err(Error::callback)?;
            ctx.ref_writer.keep_alive(payload.clone());
            if payload.is_null() {
                ctx.writer.write_i32(NULL_ID);
                return Ok(());
            }
        }
    }
    let payload_type = payload
        .type_descriptor()
        .ok_or_else(|| Error::unknown("non-null value without a type"))?;

    // aliases of the original share the id of its replacement
    let id = ctx.ref_writer.assign(value);
    ctx.writer.write_i32(id);
    ctx.write_type(&payload_type)?;
    ctx.inc_depth()?;
    let plan = ctx.write_plan(&payload_type)?;
    write_payload(ctx, &payload, &plan)?;
    ctx.dec_depth();
    Ok(())
}

fn write_payload(ctx: &mut WriteContext, payload: &Value, plan: &WritePlan) -> Result<(), Error> {
    let desc = &plan.descriptor;
    match &plan.body {
        WriteBody::Boxed(value) => write_value(ctx, payload, value),
        WriteBody::Str => {
            let s = payload
                .as_str()
                .ok_or_else(|| Error::type_mismatch(desc.to_string(), payload.kind_name()))?;
            ctx.writer.write_string(s);
            Ok(())
        }
        WriteBody::Fields(fields) => object::write_fields(ctx, payload, fields),
        WriteBody::Array(element) => array::write_array(ctx, expect_object(payload, desc)?, element),
        WriteBody::Collection(element) => {
            collection::write_collection(ctx, expect_object(payload, desc)?, element)
        }
        WriteBody::CollectionFields { items } => {
            collection::write_collection_fields(ctx, expect_object(payload, desc)?, items)
        }
        WriteBody::Dictionary { key, value } => {
            map::write_dictionary(ctx, expect_object(payload, desc)?, key, value)
        }
        WriteBody::DictionaryFields { keys, values } => {
            map::write_dictionary_fields(ctx, expect_object(payload, desc)?, keys, values)
        }
        WriteBody::ReadOnly(element) => {
            collection::write_read_only(ctx, expect_object(payload, desc)?, element)
        }
        WriteBody::Delegate => delegate::write_delegate(ctx, expect_object(payload, desc)?),
        WriteBody::Special => special::write_special(ctx, expect_object(payload, desc)?),
    }
}

pub(crate) fn write_value(ctx: &mut WriteContext, value: &Value, plan: &ValuePlan) -> Result<(), Error> {
    match plan {
        ValuePlan::Reference(declared) => write_ref(ctx, value, declared),
        ValuePlan::Primitive(kind) => write_primitive(ctx.writer, *kind, value),
        ValuePlan::Enum { ty, underlying } => match value {
            Value::Enum(e) if e.ty == *ty => write_enum_raw(ctx.writer, *underlying, e.raw),
            other => Err(Error::type_mismatch(ty.to_string(), other.kind_name())),
        },
        ValuePlan::Struct(ty) => {
            match value {
                Value::Struct(fields) if fields.type_descriptor() == ty => {}
                other => return Err(Error::type_mismatch(ty.to_string(), other.kind_name())),
            }
            let fields = ctx.field_write_plan(ty)?;
            ctx.inc_depth()?;
            object::write_fields(ctx, value, &fields)?;
            ctx.dec_depth();
            Ok(())
        }
        ValuePlan::Nullable(inner) => {
            if value.is_null() {
                ctx.writer.write_bool(false);
                Ok(())
            } else {
                ctx.writer.write_bool(true);
                write_value(ctx, value, inner)
            }
        }
    }
}

pub(crate) fn read_ref(ctx: &mut ReadContext) -> Result<Value, Error> {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT_SIZE, || read_ref_info_data(ctx))
}

fn read_ref_info_data(ctx: &mut ReadContext) -> Result<Value, Error> {
    let id = ctx.reader.read_i32()?;
    if id == NULL_ID {
        return Ok(Value::Null);
    }
    ensure!(id >= 0, Error::invalid_data(format!("negative object id {}", id)));
    let id = id as usize;
    let next = ctx.ref_reader.high_water_mark();
    if id < next {
        return ctx.ref_reader.get(id);
    }
    if id > next {
        return Err(Error::invalid_ref(format!(
            "object id {} skips ahead of the next new id {}",
            id, next
        )));
    }
    ctx.ref_reader.reserve();
    let stream_type = ctx.meta_resolver.read_type(&mut ctx.reader)?;
    let plan = ctx.read_plan(&stream_type)?;
    ctx.inc_depth()?;
    let value = read_object(ctx, id, &plan)?;
    ctx.dec_depth();
    Ok(value)
}

fn read_object(ctx: &mut ReadContext, id: usize, plan: &ReadPlan) -> Result<Value, Error> {
    let desc = plan.def.descriptor();
    let storage = match plan.creation {
        CreationWay::NoPrecreate => None,
        CreationWay::DefaultConstruct | CreationWay::AllocateUninitialized => {
            let obj = ctx.graph().registry().new_object(desc)?;
            ctx.ref_reader.touch(id, Value::Object(obj.clone()));
            Some(obj)
        }
    };
    let value = match (&plan.body, storage) {
        (ReadBody::Boxed(value), _) => read_value(ctx, value)?,
        (ReadBody::Str, _) => Value::from(ctx.reader.read_string()?),
        (
            ReadBody::Array {
                element_type,
                element,
                rank,
            },
            _,
        ) => array::read_array(ctx, id, element_type, element, *rank)?,
        (ReadBody::ReadOnly(element), _) => collection::read_read_only(ctx, desc, element)?,
        (ReadBody::Delegate, _) => delegate::read_delegate(ctx, desc)?,
        (ReadBody::Fields(fields), Some(obj)) => {
            object::read_instance(ctx, &obj, fields)?;
            Value::Object(obj)
        }
        (
            ReadBody::Collection {
                element,
                insert,
                stack,
            },
            Some(obj),
        ) => {
            collection::read_collection(ctx, &obj, element, *insert, *stack)?;
            Value::Object(obj)
        }
        (ReadBody::CollectionFields, Some(obj)) => {
            collection::read_collection_fields(ctx, &obj)?;
            Value::Object(obj)
        }
        (
            ReadBody::Dictionary {
                key,
                value,
                insert,
            },
            Some(obj),
        ) => {
            map::read_dictionary(ctx, &obj, key, value, *insert)?;
            Value::Object(obj)
        }
        (ReadBody::DictionaryFields, Some(obj)) => {
            map::read_dictionary_fields(ctx, &obj)?;
            Value::Object(obj)
        }
        (ReadBody::Special, Some(obj)) => {
            special::read_special(ctx, &obj)?;
            Value::Object(obj)
        }
        (body, None) => bail!("{} read as {:?} without allocated storage", desc, body),
    };
    let value = post_construct(ctx, plan, value)?;
    ctx.ref_reader.fill(id, value.clone());
    Ok(value)
}

/// Immediate hooks, late hook registration, the global callback, then the surrogate.
fn post_construct(ctx: &mut ReadContext, plan: &ReadPlan, value: Value) -> Result<Value, Error> {
    if let Value::Object(obj) = &value {
        for hook in &plan.hooks {
            hook(obj).map_err(Error::callback)?;
        }
        for hook in &plan.late_hooks {
            ctx.push_late_hook(obj.clone(), hook.clone());
        }
    }
    if let Some(callback) = ctx.graph().callback() {
        callback(&value).map_err(Error::callback)?;
    }
    match &plan.surrogate {
        Some(surrogate) => surrogate(&value).map_err(Error::callback),
        None => Ok(value),
    }
}

pub(crate) fn read_value(ctx: &mut ReadContext, plan: &ValuePlan) -> Result<Value, Error> {
    match plan {
        ValuePlan::Reference(_) => read_ref(ctx),
        ValuePlan::Primitive(kind) => read_primitive(&mut ctx.reader, *kind),
        ValuePlan::Enum { ty, underlying } => Ok(Value::Enum(EnumValue {
            ty: ty.clone(),
            raw: read_enum_raw(&mut ctx.reader, *underlying)?,
        })),
        ValuePlan::Struct(ty) => object::read_struct(ctx, ty),
        ValuePlan::Nullable(inner) => {
            if ctx.reader.read_bool()? {
                read_value(ctx, inner)
            } else {
                Ok(Value::Null)
            }
        }
    }
}
