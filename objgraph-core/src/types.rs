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

use num_enum::{IntoPrimitive, TryFromPrimitive};

pub const MAGIC_NUMBER: u16 = 0x0bd2;
pub const FORMAT_VERSION: u8 = 1;

pub mod config_flags {
    pub const IS_LITTLE_ENDIAN_FLAG: u8 = 1;
    /// Collections and dictionaries were written through their internal layout.
    pub const COLLECTIONS_AS_OBJECTS_FLAG: u8 = 1 << 1;
}

/// Object id of the null reference.
pub const NULL_ID: i32 = 0;
/// Object id the writer assigns to the root.
pub const ROOT_ID: i32 = 1;

/// Module holding the built-in types.
pub const SYS_MODULE: &str = "sys";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum PrimitiveKind {
    Bool = 1,
    Char = 2,
    I8 = 3,
    U8 = 4,
    I16 = 5,
    U16 = 6,
    I32 = 7,
    U32 = 8,
    I64 = 9,
    U64 = 10,
    F32 = 11,
    F64 = 12,
    String = 13,
    DateTime = 14,
    TimeSpan = 15,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 15] = [
        PrimitiveKind::Bool,
        PrimitiveKind::Char,
        PrimitiveKind::I8,
        PrimitiveKind::U8,
        PrimitiveKind::I16,
        PrimitiveKind::U16,
        PrimitiveKind::I32,
        PrimitiveKind::U32,
        PrimitiveKind::I64,
        PrimitiveKind::U64,
        PrimitiveKind::F32,
        PrimitiveKind::F64,
        PrimitiveKind::String,
        PrimitiveKind::DateTime,
        PrimitiveKind::TimeSpan,
    ];

    /// Fully qualified name of the built-in type.
    pub fn type_name(self) -> &'static str {
        match self {
            PrimitiveKind::Bool => "sys.Boolean",
            PrimitiveKind::Char => "sys.Char",
            PrimitiveKind::I8 => "sys.SByte",
            PrimitiveKind::U8 => "sys.Byte",
            PrimitiveKind::I16 => "sys.Int16",
            PrimitiveKind::U16 => "sys.UInt16",
            PrimitiveKind::I32 => "sys.Int32",
            PrimitiveKind::U32 => "sys.UInt32",
            PrimitiveKind::I64 => "sys.Int64",
            PrimitiveKind::U64 => "sys.UInt64",
            PrimitiveKind::F32 => "sys.Single",
            PrimitiveKind::F64 => "sys.Double",
            PrimitiveKind::String => "sys.String",
            PrimitiveKind::DateTime => "sys.DateTime",
            PrimitiveKind::TimeSpan => "sys.TimeSpan",
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            PrimitiveKind::I8
                | PrimitiveKind::U8
                | PrimitiveKind::I16
                | PrimitiveKind::U16
                | PrimitiveKind::I32
                | PrimitiveKind::U32
                | PrimitiveKind::I64
                | PrimitiveKind::U64
        )
    }

    /// Strings are the only primitive with reference semantics.
    pub fn is_value_type(self) -> bool {
        self != PrimitiveKind::String
    }
}

/// Whether values of a type sit inline or behind an object id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum TypeCategory {
    Reference = 0,
    Value = 1,
}

/// Construction discipline used when an object is read back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CreationWay {
    /// Storage only exists once the content is read: primitives, strings,
    /// boxed value types, arrays, delegates, read-only collections.
    NoPrecreate,
    /// Empty instance first, then filled element by element.
    DefaultConstruct,
    /// Instance with every field at its default, fields assigned directly.
    AllocateUninitialized,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    List,
    Queue,
    Stack,
    Set,
}

/// Insertion operations a collection type accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InsertMethod {
    Add,
    Enqueue,
    Push,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DictionaryInsert {
    /// Duplicate keys are an error.
    Add,
    /// Later duplicates are ignored.
    TryAdd,
}

/// Tag of a type descriptor shape in the stream type table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum DescriptorTag {
    Named = 0,
    Array = 1,
}
