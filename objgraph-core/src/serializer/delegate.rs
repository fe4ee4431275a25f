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
use crate::serializer::{check_element_count, read_count, read_ref, write_ref};
use crate::value::{Invocation, ObjRef, Object, ObjectData, Value};

/// Target id, declaring type reference and at least a one byte name.
const MIN_INVOCATION_SIZE: usize = 6;

pub(crate) fn write_delegate(ctx: &mut WriteContext, obj: &ObjRef) -> Result<(), Error> {
    let list = {
        let object = obj.borrow();
        object.as_delegate().map(<[Invocation]>::to_vec).ok_or_else(|| {
            Error::type_error(format!("{} is not a delegate", object.type_descriptor()))
        })?
    };
    ctx.writer.write_i32(list.len() as i32);
    for invocation in &list {
        let target = invocation
            .target
            .clone()
            .map(Value::Object)
            .unwrap_or(Value::Null);
        let method = &invocation.method;
        write_ref(ctx, &target, &method.declaring)?;
        ctx.write_type(&method.declaring)?;
        ctx.writer.write_string(&method.name);
    }
    Ok(())
}

/// Targets are read first, the delegate exists once the whole list is bound.
pub(crate) fn read_delegate(ctx: &mut ReadContext, desc: &TypeDescriptor) -> Result<Value, Error> {
    let count = read_count(&mut ctx.reader)?;
    check_element_count(&ctx.reader, count, MIN_INVOCATION_SIZE)?;
    let mut list = Vec::with_capacity(count);
    for _ in 0..count {
        let target = match read_ref(ctx)? {
            Value::Null => None,
            Value::Object(obj) => Some(obj),
            other => {
                return Err(Error::invalid_data(format!(
                    "delegate target must be an object, found {}",
                    other.kind_name()
                )))
            }
        };
        let declaring = ctx.meta_resolver.read_descriptor(&mut ctx.reader)?;
        let name = ctx.reader.read_string()?;
        let method = ctx.graph().registry().method(&declaring, &name)?;
        list.push(Invocation { target, method });
    }
    Ok(Value::Object(ObjRef::new(Object::new(
        desc.clone(),
        ObjectData::Delegate(list),
    ))))
}
