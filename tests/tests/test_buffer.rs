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
use chrono::{NaiveDate, TimeDelta};
use objgraph::buffer::{Reader, Writer};
use objgraph::Error;

#[test]
fn test_varint32() {
    let test_data: Vec<i32> = vec![
        // 1 byte
        0,
        1,
        -1,
        63,
        // 2 bytes
        64,
        300,
        -8_192,
        // 3 bytes
        16_384,
        1_048_575,
        // 5 bytes
        i32::MAX,
        i32::MIN,
    ];
    for &data in &test_data {
        let mut writer = Writer::default();
        writer.write_varint32(data);
        let binding = writer.dump();
        let mut reader = Reader::new(binding.as_slice());
        assert_eq!(reader.read_varint32().unwrap(), data);
        assert_eq!(reader.remaining(), 0);
    }
    for &data in &test_data {
        let mut writer = Writer::default();
        writer.write_varuint32(data as u32);
        let binding = writer.dump();
        let mut reader = Reader::new(binding.as_slice());
        assert_eq!(reader.read_varuint32().unwrap(), data as u32);
    }
}

#[test]
fn test_varuint_sizes() {
    let cases: [(u64, usize); 6] = [
        (0, 1),
        (127, 1),
        (128, 2),
        (16_383, 2),
        (16_384, 3),
        (u64::MAX, 10),
    ];
    for (value, size) in cases {
        let mut writer = Writer::default();
        writer.write_varuint64(value);
        assert_eq!(writer.len(), size, "encoded size of {}", value);
        let bytes = writer.dump();
        let mut reader = Reader::new(&bytes);
        assert_eq!(reader.read_varuint64().unwrap(), value);
    }
}

#[test]
fn test_varint64_extremes() {
    for value in [i64::MIN, -1, 0, 1, i64::MAX] {
        let mut writer = Writer::default();
        writer.write_varint64(value);
        let bytes = writer.dump();
        assert_eq!(Reader::new(&bytes).read_varint64().unwrap(), value);
    }
}

#[test]
fn test_varuint32_overflow() {
    let mut writer = Writer::default();
    writer.write_varuint64(u32::MAX as u64 + 1);
    let bytes = writer.dump();
    assert!(matches!(
        Reader::new(&bytes).read_varuint32(),
        Err(Error::InvalidData(_))
    ));
}

#[test]
fn test_fixed_width_little_endian() {
    let mut writer = Writer::default();
    writer.write_i32(-2);
    writer.write_u16(0x0bd2);
    writer.write_f64(1.5);
    let bytes = writer.dump();
    assert_eq!(&bytes[..6], &[0xfe, 0xff, 0xff, 0xff, 0xd2, 0x0b]);
    let mut reader = Reader::new(&bytes);
    assert_eq!(reader.read_i32().unwrap(), -2);
    assert_eq!(reader.read_u16().unwrap(), 0x0bd2);
    assert_eq!(reader.read_f64().unwrap(), 1.5);
}

#[test]
fn test_string_and_time() {
    let at = NaiveDate::from_ymd_opt(2024, 2, 29)
        .unwrap()
        .and_hms_micro_opt(13, 14, 15, 161_718)
        .unwrap();
    let span = TimeDelta::milliseconds(-90_061_001);
    let mut writer = Writer::default();
    writer.write_string("héllo");
    writer.write_datetime(&at);
    writer.write_timespan(&span);
    writer.write_char('λ');
    let bytes = writer.dump();
    let mut reader = Reader::new(&bytes);
    assert_eq!(reader.read_string().unwrap(), "héllo");
    assert_eq!(reader.read_datetime().unwrap(), at);
    assert_eq!(reader.read_timespan().unwrap(), span);
    assert_eq!(reader.read_char().unwrap(), 'λ');
    assert_eq!(reader.remaining(), 0);
}

#[test]
fn test_invalid_utf8() {
    let mut writer = Writer::default();
    writer.write_varuint32(2);
    writer.write_bytes(&[0xc3, 0x28]);
    let bytes = writer.dump();
    assert!(matches!(
        Reader::new(&bytes).read_string(),
        Err(Error::InvalidData(_))
    ));
}

#[test]
fn test_truncated_string() {
    let mut writer = Writer::default();
    writer.write_varuint32(10);
    writer.write_bytes(b"abc");
    let bytes = writer.dump();
    assert!(matches!(
        Reader::new(&bytes).read_string(),
        Err(Error::BufferOutOfBound(1, 10, 4))
    ));
}
