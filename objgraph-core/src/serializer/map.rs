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
use crate::serializer::collection::{array_items, temporary_array};
use crate::serializer::plan::ValuePlan;
use crate::serializer::{
    check_element_count, min_wire_size, read_count, read_ref, read_value, write_ref, write_value,
};
use crate::types::DictionaryInsert;
use crate::value::{DictionaryData, ObjRef, Value};

fn entries_of(obj: &ObjRef) -> Result<Vec<(Value, Value)>, Error> {
    let object = obj.borrow();
    object
        .as_dictionary()
        .map(|d| d.entries().to_vec())
        .ok_or_else(|| {
            Error::type_error(format!("{} is not a dictionary", object.type_descriptor()))
        })
}

fn with_dictionary<R>(
    obj: &ObjRef,
    f: impl FnOnce(&mut DictionaryData) -> Result<R, Error>,
) -> Result<R, Error> {
    let mut object = obj.borrow_mut();
    let ty = object.type_descriptor().clone();
    let dictionary = object
        .as_dictionary_mut()
        .ok_or_else(|| Error::type_error(format!("{} is not a dictionary", ty)))?;
    f(dictionary)
}

pub(crate) fn write_dictionary(
    ctx: &mut WriteContext,
    obj: &ObjRef,
    key: &ValuePlan,
    value: &ValuePlan,
) -> Result<(), Error> {
    let entries = entries_of(obj)?;
    let count = i32::try_from(entries.len())
        .map_err(|_| Error::type_error(format!("{} entries exceed i32", entries.len())))?;
    ctx.writer.write_i32(count);
    for (k, v) in &entries {
        write_value(ctx, k, key)?;
        write_value(ctx, v, value)?;
    }
    Ok(())
}

pub(crate) fn read_dictionary(
    ctx: &mut ReadContext,
    obj: &ObjRef,
    key: &ValuePlan,
    value: &ValuePlan,
    insert: DictionaryInsert,
) -> Result<(), Error> {
    let count = read_count(&mut ctx.reader)?;
    let entry_size = min_wire_size(ctx, key)? + min_wire_size(ctx, value)?;
    check_element_count(&ctx.reader, count, entry_size)?;
    for _ in 0..count {
        let k = read_value(ctx, key)?;
        if k.is_null() {
            return Err(Error::invalid_data(format!(
                "null key in {}",
                obj.type_descriptor()
            )));
        }
        let v = read_value(ctx, value)?;
        with_dictionary(obj, |dictionary| match insert {
            DictionaryInsert::Add => dictionary.add(k, v),
            DictionaryInsert::TryAdd => {
                dictionary.try_add(k, v);
                Ok(())
            }
        })?;
    }
    Ok(())
}

/// Internal layout: parallel `_keys` and `_values` arrays in storage order.
pub(crate) fn write_dictionary_fields(
    ctx: &mut WriteContext,
    obj: &ObjRef,
    keys_type: &TypeDescriptor,
    values_type: &TypeDescriptor,
) -> Result<(), Error> {
    let (keys, values): (Vec<Value>, Vec<Value>) = entries_of(obj)?.into_iter().unzip();
    let keys = temporary_array(keys_type, keys);
    let values = temporary_array(values_type, values);
    ctx.ref_writer.keep_alive(keys.clone());
    ctx.ref_writer.keep_alive(values.clone());
    write_ref(ctx, &keys, keys_type)?;
    write_ref(ctx, &values, values_type)
}

pub(crate) fn read_dictionary_fields(ctx: &mut ReadContext, obj: &ObjRef) -> Result<(), Error> {
    let keys = array_items(&read_ref(ctx)?, "_keys")?;
    let values = array_items(&read_ref(ctx)?, "_values")?;
    if keys.len() != values.len() {
        return Err(Error::invalid_data(format!(
            "{} keys but {} values in {}",
            keys.len(),
            values.len(),
            obj.type_descriptor()
        )));
    }
    let entries = keys.into_iter().zip(values).collect();
    with_dictionary(obj, |dictionary| {
        *dictionary = DictionaryData::from_entries(entries);
        Ok(())
    })
}
