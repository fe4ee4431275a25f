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
use crate::serializer::{check_element_count, min_wire_size, read_value, write_value};
use crate::ensure;
use crate::value::{ObjRef, Value};

/// Row-major walk over every index tuple of a multi-dimensional array.
/// The last dimension varies fastest.
pub(crate) struct Odometer {
    lengths: Vec<usize>,
    position: Vec<usize>,
    done: bool,
}

impl Odometer {
    pub(crate) fn new(lengths: &[usize]) -> Odometer {
        Odometer {
            lengths: lengths.to_vec(),
            position: vec![0; lengths.len()],
            done: lengths.is_empty() || lengths.contains(&0),
        }
    }

    pub(crate) fn position(&self) -> Option<&[usize]> {
        if self.done {
            None
        } else {
            Some(&self.position)
        }
    }

    pub(crate) fn advance(&mut self) {
        for dim in (0..self.lengths.len()).rev() {
            self.position[dim] += 1;
            if self.position[dim] < self.lengths[dim] {
                return;
            }
            self.position[dim] = 0;
        }
        self.done = true;
    }
}

pub(crate) fn write_array(
    ctx: &mut WriteContext,
    obj: &ObjRef,
    element: &ValuePlan,
) -> Result<(), Error> {
    let (lengths, items) = {
        let object = obj.borrow();
        let array = object.as_array().ok_or_else(|| {
            Error::type_error(format!("{} is not an array", object.type_descriptor()))
        })?;
        (array.lengths().to_vec(), array.items().to_vec())
    };
    ctx.writer.write_i32(lengths.len() as i32);
    for length in &lengths {
        let length = i32::try_from(*length)
            .map_err(|_| Error::type_error(format!("array length {} exceeds i32", length)))?;
        ctx.writer.write_i32(length);
    }
    for item in &items {
        write_value(ctx, item, element)?;
    }
    Ok(())
}

/// Reads the lengths, publishes the allocated array under `id`, then fills it.
pub(crate) fn read_array(
    ctx: &mut ReadContext,
    id: usize,
    element_type: &TypeDescriptor,
    element: &ValuePlan,
    rank: u8,
) -> Result<Value, Error> {
    let stream_rank = ctx.reader.read_i32()?;
    ensure!(
        stream_rank == rank as i32,
        Error::invalid_data(format!("array of rank {} carries rank {}", rank, stream_rank))
    );
    let mut lengths: Vec<usize> = Vec::with_capacity(rank as usize);
    for _ in 0..rank {
        let length = ctx.reader.read_i32()?;
        ensure!(
            length >= 0,
            Error::invalid_data(format!("negative array length {}", length))
        );
        lengths.push(length as usize);
    }
    let total = if lengths.contains(&0) {
        0
    } else {
        lengths
            .iter()
            .try_fold(1usize, |acc, len| acc.checked_mul(*len))
            .ok_or_else(|| Error::invalid_data(format!("array lengths {:?} overflow", lengths)))?
    };
    let element_size = min_wire_size(ctx, element)?;
    check_element_count(&ctx.reader, total, element_size)?;

    let obj = ctx.graph().registry().new_array(element_type, &lengths)?;
    ctx.ref_reader.touch(id, Value::Object(obj.clone()));

    let mut odometer = Odometer::new(&lengths);
    while let Some(position) = odometer.position() {
        let value = read_value(ctx, element)?;
        obj.borrow_mut()
            .as_array_mut()
            .ok_or_else(|| Error::unknown("array storage replaced while reading"))?
            .set(position, value)?;
        odometer.advance();
    }
    Ok(Value::Object(obj))
}
