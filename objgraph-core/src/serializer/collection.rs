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
use crate::error::Error;
use crate::meta::TypeDescriptor;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::plan::ValuePlan;
use crate::serializer::{
    check_element_count, min_wire_size, read_count, read_ref, read_value, write_ref, write_value,
};
use crate::types::InsertMethod;
use crate::value::{ArrayData, CollectionData, ObjRef, Object, ObjectData, Value};

fn collection_of(obj: &ObjRef) -> Result<CollectionData, Error> {
    let object = obj.borrow();
    object.as_collection().cloned().ok_or_else(|| {
        Error::type_error(format!("{} is not a collection", object.type_descriptor()))
    })
}

fn write_items(ctx: &mut WriteContext, items: &[Value], element: &ValuePlan) -> Result<(), Error> {
    let count = i32::try_from(items.len())
        .map_err(|_| Error::type_error(format!("{} items exceed i32", items.len())))?;
    ctx.writer.write_i32(count);
    for item in items {
        write_value(ctx, item, element)?;
    }
    Ok(())
}

fn read_items(ctx: &mut ReadContext, element: &ValuePlan) -> Result<Vec<Value>, Error> {
    let count = read_count(&mut ctx.reader)?;
    let element_size = min_wire_size(ctx, element)?;
    check_element_count(&ctx.reader, count, element_size)?;
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        items.push(read_value(ctx, element)?);
    }
    Ok(items)
}

/// Count, then items in enumeration order. Stacks come out top first.
pub(crate) fn write_collection(
    ctx: &mut WriteContext,
    obj: &ObjRef,
    element: &ValuePlan,
) -> Result<(), Error> {
    let items: Vec<Value> = collection_of(obj)?.iter().cloned().collect();
    write_items(ctx, &items, element)
}

pub(crate) fn read_collection(
    ctx: &mut ReadContext,
    obj: &ObjRef,
    element: &ValuePlan,
    insert: InsertMethod,
    stack: bool,
) -> Result<(), Error> {
    let insert_into = |value: Value| -> Result<(), Error> {
        let mut object = obj.borrow_mut();
        let ty = object.type_descriptor().clone();
        object
            .as_collection_mut()
            .ok_or_else(|| Error::type_error(format!("{} is not a collection", ty)))?
            .insert(insert, value);
        Ok(())
    };
    if stack {
        // pop order on the wire, push back bottom first
        let items = read_items(ctx, element)?;
        for item in items.into_iter().rev() {
            insert_into(item)?;
        }
        return Ok(());
    }
    let count = read_count(&mut ctx.reader)?;
    let element_size = min_wire_size(ctx, element)?;
    check_element_count(&ctx.reader, count, element_size)?;
    for _ in 0..count {
        let item = read_value(ctx, element)?;
        insert_into(item)?;
    }
    Ok(())
}

/// Wraps `items` into a temporary one-dimensional array of `desc`.
pub(crate) fn temporary_array(desc: &TypeDescriptor, items: Vec<Value>) -> Value {
    let lengths = vec![items.len()];
    Value::Object(ObjRef::new(Object::new(
        desc.clone(),
        ObjectData::Array(ArrayData::new(lengths, items)),
    )))
}

/// Items of an array read in reference position, empty for null.
pub(crate) fn array_items(value: &Value, what: &str) -> Result<Vec<Value>, Error> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Object(obj) => {
            let object = obj.borrow();
            match object.as_array() {
                Some(array) if array.rank() == 1 => Ok(array.items().to_vec()),
                _ => Err(Error::invalid_data(format!(
                    "{} must be a one-dimensional array, found {}",
                    what,
                    object.type_descriptor()
                ))),
            }
        }
        other => Err(Error::invalid_data(format!(
            "{} must be an array, found {}",
            what,
            other.kind_name()
        ))),
    }
}

/// Internal layout: a single `_items` array in storage order.
pub(crate) fn write_collection_fields(
    ctx: &mut WriteContext,
    obj: &ObjRef,
    items_type: &TypeDescriptor,
) -> Result<(), Error> {
    let items = collection_of(obj)?.internal().to_vec();
    let array = temporary_array(items_type, items);
    ctx.ref_writer.keep_alive(array.clone());
    write_ref(ctx, &array, items_type)
}

pub(crate) fn read_collection_fields(ctx: &mut ReadContext, obj: &ObjRef) -> Result<(), Error> {
    let items = array_items(&read_ref(ctx)?, "_items")?;
    let mut object = obj.borrow_mut();
    let ty = object.type_descriptor().clone();
    let collection = object
        .as_collection_mut()
        .ok_or_else(|| Error::type_error(format!("{} is not a collection", ty)))?;
    *collection = CollectionData::from_internal(collection.kind(), items);
    Ok(())
}

pub(crate) fn write_read_only(
    ctx: &mut WriteContext,
    obj: &ObjRef,
    element: &ValuePlan,
) -> Result<(), Error> {
    let items = {
        let object = obj.borrow();
        object.as_read_only().map(<[Value]>::to_vec).ok_or_else(|| {
            Error::type_error(format!(
                "{} is not a read-only collection",
                object.type_descriptor()
            ))
        })?
    };
    write_items(ctx, &items, element)
}

/// The wrapper only exists once every item is read.
pub(crate) fn read_read_only(
    ctx: &mut ReadContext,
    desc: &TypeDescriptor,
    element: &ValuePlan,
) -> Result<Value, Error> {
    let items = read_items(ctx, element)?;
    Ok(Value::Object(ObjRef::new(Object::new(
        desc.clone(),
        ObjectData::ReadOnly(items),
    ))))
}
