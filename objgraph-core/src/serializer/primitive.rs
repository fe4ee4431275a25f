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
use crate::types::PrimitiveKind;
use crate::value::Value;

macro_rules! primitive_codec {
    ($($kind:ident => $variant:ident, $write:ident, $read:ident);+ $(;)?) => {
        pub(crate) fn write_primitive(
            writer: &mut Writer,
            kind: PrimitiveKind,
            value: &Value,
        ) -> Result<(), Error> {
            match (kind, value) {
                $((PrimitiveKind::$kind, Value::$variant(v)) => writer.$write(*v),)+
                (PrimitiveKind::String, Value::String(s)) => writer.write_string(s),
                (PrimitiveKind::DateTime, Value::DateTime(v)) => writer.write_datetime(v),
                (PrimitiveKind::TimeSpan, Value::TimeSpan(v)) => writer.write_timespan(v),
                _ => {
                    return Err(Error::type_mismatch(kind.type_name(), value.kind_name()));
                }
            }
            Ok(())
        }

        pub(crate) fn read_primitive(reader: &mut Reader, kind: PrimitiveKind) -> Result<Value, Error> {
            Ok(match kind {
                $(PrimitiveKind::$kind => Value::$variant(reader.$read()?),)+
                PrimitiveKind::String => Value::from(reader.read_string()?),
                PrimitiveKind::DateTime => Value::DateTime(reader.read_datetime()?),
                PrimitiveKind::TimeSpan => Value::TimeSpan(reader.read_timespan()?),
            })
        }
    };
}

primitive_codec! {
    Bool => Bool, write_bool, read_bool;
    Char => Char, write_char, read_char;
    I8 => I8, write_i8, read_i8;
    U8 => U8, write_u8, read_u8;
    I16 => I16, write_i16, read_i16;
    U16 => U16, write_u16, read_u16;
    I32 => I32, write_i32, read_i32;
    U32 => U32, write_u32, read_u32;
    I64 => I64, write_i64, read_i64;
    U64 => U64, write_u64, read_u64;
    F32 => F32, write_f32, read_f32;
    F64 => F64, write_f64, read_f64;
}

/// Smallest number of bytes a value of `kind` occupies in the stream.
pub(crate) fn min_wire_size(kind: PrimitiveKind) -> usize {
    match kind {
        PrimitiveKind::Bool | PrimitiveKind::I8 | PrimitiveKind::U8 | PrimitiveKind::String => 1,
        PrimitiveKind::I16 | PrimitiveKind::U16 => 2,
        PrimitiveKind::Char | PrimitiveKind::I32 | PrimitiveKind::U32 | PrimitiveKind::F32 => 4,
        PrimitiveKind::I64
        | PrimitiveKind::U64
        | PrimitiveKind::F64
        | PrimitiveKind::DateTime
        | PrimitiveKind::TimeSpan => 8,
    }
}

/// Writes the raw value of an enum with the encoding of its underlying integer.
pub(crate) fn write_enum_raw(
    writer: &mut Writer,
    underlying: PrimitiveKind,
    raw: i64,
) -> Result<(), Error> {
    let out_of_range = || {
        Error::type_error(format!(
            "enum value {} does not fit {}",
            raw,
            underlying.type_name()
        ))
    };
    match underlying {
        PrimitiveKind::I8 => writer.write_i8(i8::try_from(raw).map_err(|_| out_of_range())?),
        PrimitiveKind::U8 => writer.write_u8(u8::try_from(raw).map_err(|_| out_of_range())?),
        PrimitiveKind::I16 => writer.write_i16(i16::try_from(raw).map_err(|_| out_of_range())?),
        PrimitiveKind::U16 => writer.write_u16(u16::try_from(raw).map_err(|_| out_of_range())?),
        PrimitiveKind::I32 => writer.write_i32(i32::try_from(raw).map_err(|_| out_of_range())?),
        PrimitiveKind::U32 => writer.write_u32(u32::try_from(raw).map_err(|_| out_of_range())?),
        PrimitiveKind::I64 => writer.write_i64(raw),
        PrimitiveKind::U64 => writer.write_u64(u64::try_from(raw).map_err(|_| out_of_range())?),
        _ => {
            return Err(Error::configuration(format!(
                "{} cannot back an enum",
                underlying.type_name()
            )))
        }
    }
    Ok(())
}

pub(crate) fn read_enum_raw(reader: &mut Reader, underlying: PrimitiveKind) -> Result<i64, Error> {
    Ok(match underlying {
        PrimitiveKind::I8 => reader.read_i8()? as i64,
        PrimitiveKind::U8 => reader.read_u8()? as i64,
        PrimitiveKind::I16 => reader.read_i16()? as i64,
        PrimitiveKind::U16 => reader.read_u16()? as i64,
        PrimitiveKind::I32 => reader.read_i32()? as i64,
        PrimitiveKind::U32 => reader.read_u32()? as i64,
        PrimitiveKind::I64 => reader.read_i64()?,
        PrimitiveKind::U64 => i64::try_from(reader.read_u64()?)
            .map_err(|_| Error::invalid_data("enum value out of range"))?,
        _ => {
            return Err(Error::configuration(format!(
                "{} cannot back an enum",
                underlying.type_name()
            )))
        }
    })
}
