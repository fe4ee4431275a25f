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
use crate::buffer::{Reader, Writer};
use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::value::ObjRef;
use std::any::Any;

/// A type that encodes itself with the primitive codec instead of going
/// through the field engine.
///
/// The engine allocates an empty instance through the type's factory, calls
/// [`SpecialFormat::load`] on it and checks that exactly the bytes written by
/// [`SpecialFormat::save`] were consumed. Specials cannot refer to other
/// objects of the graph.
pub trait SpecialFormat: Any {
    fn save(&self, writer: &mut Writer) -> Result<(), Error>;

    fn load(&mut self, reader: &mut Reader) -> Result<(), Error>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

pub(crate) fn write_special(ctx: &mut WriteContext, obj: &ObjRef) -> Result<(), Error> {
    let start = ctx.writer.len();
    {
        let object = obj.borrow();
        let special = object.as_special_dyn().ok_or_else(|| {
            Error::type_error(format!("{} is not a special format type", object.type_descriptor()))
        })?;
        special.save(ctx.writer)?;
    }
    let length = ctx.writer.len() - start;
    ctx.writer.write_i64(length as i64);
    Ok(())
}

pub(crate) fn read_special(ctx: &mut ReadContext, obj: &ObjRef) -> Result<(), Error> {
    let start = ctx.reader.get_cursor();
    {
        let mut object = obj.borrow_mut();
        let ty = object.type_descriptor().clone();
        let special = object
            .as_special_dyn_mut()
            .ok_or_else(|| Error::type_error(format!("{} is not a special format type", ty)))?;
        special.load(&mut ctx.reader)?;
    }
    let consumed = ctx.reader.get_cursor() - start;
    let expected = ctx.reader.read_i64()?;
    if expected < 0 || consumed as u64 != expected as u64 {
        return Err(Error::invalid_data(format!(
            "{} read {} bytes but {} were written",
            obj.type_descriptor(),
            consumed,
            expected
        )));
    }
    Ok(())
}
