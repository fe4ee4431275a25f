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

//! Primitive codec: one symmetric read/write pair per primitive type.
//!
//! Everything is little endian. Fixed width encodings are used for payload
//! values; the var-length integers only appear in stream metadata.

use crate::error::Error;
use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use chrono::{NaiveDateTime, TimeDelta};

macro_rules! fixed_width_writers {
    ($($ty:ident),+) => {
        paste::paste! {
            $(
                #[inline(always)]
                pub fn [<write_ $ty>](&mut self, value: $ty) {
                    self.bf.[<write_ $ty>]::<LittleEndian>(value).unwrap_or(());
                }
            )+
        }
    };
}

macro_rules! fixed_width_readers {
    ($($ty:ident),+) => {
        paste::paste! {
            $(
                #[inline(always)]
                pub fn [<read_ $ty>](&mut self) -> Result<$ty, Error> {
                    let bytes = self.take(std::mem::size_of::<$ty>())?;
                    Ok(LittleEndian::[<read_ $ty>](bytes))
                }
            )+
        }
    };
}

#[derive(Default, Debug)]
pub struct Writer {
    pub(crate) bf: Vec<u8>,
}

impl Writer {
    pub fn with_capacity(capacity: usize) -> Writer {
        Writer {
            bf: Vec::with_capacity(capacity),
        }
    }

    pub fn dump(&self) -> Vec<u8> {
        self.bf.clone()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bf
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bf
    }

    pub fn len(&self) -> usize {
        self.bf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bf.is_empty()
    }

    pub fn reserve(&mut self, additional: usize) {
        self.bf.reserve(additional);
    }

    pub fn write_bytes(&mut self, v: &[u8]) -> usize {
        self.bf.extend_from_slice(v);
        v.len()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.bf.push(value);
    }

    pub fn write_i8(&mut self, value: i8) {
        self.bf.push(value as u8);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.bf.push(value as u8);
    }

    fixed_width_writers!(u16, i16, u32, i32, u64, i64, f32, f64);

    /// Chars are written as their unicode scalar value.
    pub fn write_char(&mut self, value: char) {
        self.write_u32(value as u32);
    }

    pub fn write_string(&mut self, value: &str) {
        self.write_varuint32(value.len() as u32);
        self.write_bytes(value.as_bytes());
    }

    /// Microseconds since the unix epoch.
    pub fn write_datetime(&mut self, value: &NaiveDateTime) {
        self.write_i64(value.and_utc().timestamp_micros());
    }

    pub fn write_timespan(&mut self, value: &TimeDelta) {
        // saturate instead of failing, spans beyond i64 micros are ~292k years
        self.write_i64(value.num_microseconds().unwrap_or(i64::MAX));
    }

    pub fn write_varint32(&mut self, value: i32) {
        let zigzag = ((value << 1) ^ (value >> 31)) as u32;
        self.write_varuint32(zigzag)
    }

    pub fn write_varuint32(&mut self, value: u32) {
        self.write_varuint64(value as u64)
    }

    pub fn write_varint64(&mut self, value: i64) {
        let zigzag = ((value << 1) ^ (value >> 63)) as u64;
        self.write_varuint64(zigzag)
    }

    pub fn write_varuint64(&mut self, mut value: u64) {
        while value >= 0x80 {
            self.bf.push((value as u8 & 0x7F) | 0x80);
            value >>= 7;
        }
        self.bf.push(value as u8);
    }
}

#[derive(Debug, Clone)]
pub struct Reader<'bf> {
    bf: &'bf [u8],
    cursor: usize,
}

impl<'bf> Reader<'bf> {
    pub fn new(bf: &'bf [u8]) -> Reader<'bf> {
        Reader { bf, cursor: 0 }
    }

    pub fn get_cursor(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.bf.len() - self.cursor
    }

    pub fn slice_after_cursor(&self) -> &'bf [u8] {
        &self.bf[self.cursor..]
    }

    #[inline(always)]
    fn take(&mut self, len: usize) -> Result<&'bf [u8], Error> {
        let end = self
            .cursor
            .checked_add(len)
            .filter(|end| *end <= self.bf.len())
            .ok_or_else(|| Error::buffer_out_of_bound(self.cursor, len, self.bf.len()))?;
        let bytes = &self.bf[self.cursor..end];
        self.cursor = end;
        Ok(bytes)
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'bf [u8], Error> {
        self.take(len)
    }

    pub fn skip(&mut self, len: usize) -> Result<(), Error> {
        self.take(len).map(|_| ())
    }

    pub fn read_u8(&mut self) -> Result<u8, Error> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, Error> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_bool(&mut self) -> Result<bool, Error> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(Error::invalid_data(format!(
                "invalid boolean byte {:#04x} at offset {}",
                other,
                self.cursor - 1
            ))),
        }
    }

    fixed_width_readers!(u16, i16, u32, i32, u64, i64, f32, f64);

    pub fn read_char(&mut self) -> Result<char, Error> {
        let raw = self.read_u32()?;
        char::from_u32(raw)
            .ok_or_else(|| Error::invalid_data(format!("invalid char scalar value {:#x}", raw)))
    }

    pub fn read_string(&mut self) -> Result<String, Error> {
        let len = self.read_varuint32()? as usize;
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|e| Error::invalid_data(format!("invalid utf-8 string: {}", e)))
    }

    pub fn read_datetime(&mut self) -> Result<NaiveDateTime, Error> {
        let micros = self.read_i64()?;
        chrono::DateTime::from_timestamp_micros(micros)
            .map(|dt| dt.naive_utc())
            .ok_or_else(|| Error::invalid_data(format!("date time out of range: {}", micros)))
    }

    pub fn read_timespan(&mut self) -> Result<TimeDelta, Error> {
        Ok(TimeDelta::microseconds(self.read_i64()?))
    }

    pub fn read_varuint32(&mut self) -> Result<u32, Error> {
        let value = self.read_varuint64()?;
        u32::try_from(value)
            .map_err(|_| Error::invalid_data(format!("varuint32 overflow: {}", value)))
    }

    pub fn read_varint32(&mut self) -> Result<i32, Error> {
        let encoded = self.read_varuint32()?;
        Ok(((encoded >> 1) as i32) ^ -((encoded & 1) as i32))
    }

    pub fn read_varuint64(&mut self) -> Result<u64, Error> {
        let mut result = 0u64;
        let mut shift = 0u32;
        loop {
            let b = self.read_u8()?;
            if shift == 63 && b > 1 {
                return Err(Error::invalid_data("varuint64 overflow"));
            }
            result |= ((b & 0x7F) as u64) << shift;
            if b & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
            if shift > 63 {
                return Err(Error::invalid_data("varuint64 overflow"));
            }
        }
    }

    pub fn read_varint64(&mut self) -> Result<i64, Error> {
        let encoded = self.read_varuint64()?;
        Ok(((encoded >> 1) as i64) ^ -((encoded & 1) as i64))
    }
}
