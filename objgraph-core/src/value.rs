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

//! Dynamic values making up an object graph.
//!
//! Value types (primitives, enums, structs) are held inline in [`Value`].
//! Everything with identity lives behind an [`ObjRef`]; strings carry
//! identity through their `Rc<str>` allocation so a shared string is written
//! once and read back shared.

use crate::error::Error;
use crate::meta::TypeDescriptor;
use crate::resolver::type_resolver::{InstanceLayout, MethodFn};
use crate::serializer::special::SpecialFormat;
use crate::types::{CollectionKind, InsertMethod, PrimitiveKind};
use chrono::{NaiveDateTime, TimeDelta};
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Char(char),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    String(Rc<str>),
    DateTime(NaiveDateTime),
    TimeSpan(TimeDelta),
    Enum(EnumValue),
    Struct(Box<Fields>),
    Object(ObjRef),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EnumValue {
    pub ty: TypeDescriptor,
    pub raw: i64,
}

/// Constant usable in type definitions, which outlive any single graph.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    I32(i32),
    I64(i64),
    F64(f64),
    Char(char),
    String(String),
}

impl Literal {
    pub fn to_value(&self) -> Value {
        match self {
            Literal::Null => Value::Null,
            Literal::Bool(v) => Value::Bool(*v),
            Literal::I32(v) => Value::I32(*v),
            Literal::I64(v) => Value::I64(*v),
            Literal::F64(v) => Value::F64(*v),
            Literal::Char(v) => Value::Char(*v),
            Literal::String(v) => Value::string(v),
        }
    }
}

impl Value {
    pub fn string(s: &str) -> Value {
        Value::String(Rc::from(s))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_object(&self) -> Option<&ObjRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Any integer primitive that fits in an `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::I8(v) => Some(v as i64),
            Value::U8(v) => Some(v as i64),
            Value::I16(v) => Some(v as i64),
            Value::U16(v) => Some(v as i64),
            Value::I32(v) => Some(v as i64),
            Value::U32(v) => Some(v as i64),
            Value::I64(v) => Some(v),
            Value::U64(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::F32(v) => Some(v as f64),
            Value::F64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&Fields> {
        match self {
            Value::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumValue> {
        match self {
            Value::Enum(e) => Some(e),
            _ => None,
        }
    }

    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        Some(match self {
            Value::Bool(_) => PrimitiveKind::Bool,
            Value::Char(_) => PrimitiveKind::Char,
            Value::I8(_) => PrimitiveKind::I8,
            Value::U8(_) => PrimitiveKind::U8,
            Value::I16(_) => PrimitiveKind::I16,
            Value::U16(_) => PrimitiveKind::U16,
            Value::I32(_) => PrimitiveKind::I32,
            Value::U32(_) => PrimitiveKind::U32,
            Value::I64(_) => PrimitiveKind::I64,
            Value::U64(_) => PrimitiveKind::U64,
            Value::F32(_) => PrimitiveKind::F32,
            Value::F64(_) => PrimitiveKind::F64,
            Value::String(_) => PrimitiveKind::String,
            Value::DateTime(_) => PrimitiveKind::DateTime,
            Value::TimeSpan(_) => PrimitiveKind::TimeSpan,
            _ => return None,
        })
    }

    /// Runtime type of the value, `None` for null.
    pub fn type_descriptor(&self) -> Option<TypeDescriptor> {
        match self {
            Value::Null => None,
            Value::Enum(e) => Some(e.ty.clone()),
            Value::Struct(fields) => Some(fields.type_descriptor().clone()),
            Value::Object(obj) => Some(obj.type_descriptor()),
            other => other.primitive_kind().map(TypeDescriptor::primitive),
        }
    }

    /// Address identifying the value within a pass, for values with identity.
    pub(crate) fn identity(&self) -> Option<usize> {
        match self {
            Value::Object(obj) => Some(obj.addr()),
            Value::String(s) => Some(Rc::as_ptr(s) as *const u8 as usize),
            _ => None,
        }
    }

    pub(crate) fn kind_name(&self) -> String {
        match self.type_descriptor() {
            Some(desc) => desc.to_string(),
            None => "null".to_owned(),
        }
    }
}

/// Strings and primitives compare by content, structs field by field and
/// objects by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::I8(a), Value::I8(b)) => a == b,
            (Value::U8(a), Value::U8(b)) => a == b,
            (Value::I16(a), Value::I16(b)) => a == b,
            (Value::U16(a), Value::U16(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::U32(a), Value::U32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::U64(a), Value::U64(b)) => a == b,
            (Value::F32(a), Value::F32(b)) => a == b,
            (Value::F64(a), Value::F64(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::TimeSpan(a), Value::TimeSpan(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Struct(a), Value::Struct(b)) => {
                a.type_descriptor() == b.type_descriptor() && a.values == b.values
            }
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(v) => write!(f, "Bool({})", v),
            Value::Char(v) => write!(f, "Char({:?})", v),
            Value::I8(v) => write!(f, "I8({})", v),
            Value::U8(v) => write!(f, "U8({})", v),
            Value::I16(v) => write!(f, "I16({})", v),
            Value::U16(v) => write!(f, "U16({})", v),
            Value::I32(v) => write!(f, "I32({})", v),
            Value::U32(v) => write!(f, "U32({})", v),
            Value::I64(v) => write!(f, "I64({})", v),
            Value::U64(v) => write!(f, "U64({})", v),
            Value::F32(v) => write!(f, "F32({})", v),
            Value::F64(v) => write!(f, "F64({})", v),
            Value::String(v) => write!(f, "String({:?})", v),
            Value::DateTime(v) => write!(f, "DateTime({})", v),
            Value::TimeSpan(v) => write!(f, "TimeSpan({})", v),
            Value::Enum(v) => write!(f, "Enum({}::{})", v.ty, v.raw),
            Value::Struct(v) => f
                .debug_map()
                .entries(v.layout.fields.iter().map(|l| &l.name).zip(&v.values))
                .finish(),
            Value::Object(obj) => write!(f, "{:?}", obj),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )+
    };
}

value_from! {
    bool => Bool, char => Char, i8 => I8, u8 => U8, i16 => I16, u16 => U16,
    i32 => I32, u32 => U32, i64 => I64, u64 => U64, f32 => F32, f64 => F64,
    NaiveDateTime => DateTime, TimeDelta => TimeSpan, ObjRef => Object,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::string(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(Rc::from(v))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Field storage of a class instance or a struct value, one slot per entry
/// of the type's [`InstanceLayout`].
#[derive(Clone)]
pub struct Fields {
    layout: Arc<InstanceLayout>,
    values: Vec<Value>,
}

impl Fields {
    pub(crate) fn new(layout: Arc<InstanceLayout>, values: Vec<Value>) -> Fields {
        debug_assert_eq!(layout.fields.len(), values.len());
        Fields { layout, values }
    }

    pub fn layout(&self) -> &Arc<InstanceLayout> {
        &self.layout
    }

    pub fn type_descriptor(&self) -> &TypeDescriptor {
        &self.layout.ty
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Field by name, the most derived declaration wins.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.layout.find_by_name(name).map(|i| &self.values[i])
    }

    pub fn get_in(&self, class: &str, name: &str) -> Option<&Value> {
        self.layout.find(class, name).map(|i| &self.values[i])
    }

    pub fn set(&mut self, name: &str, value: Value) -> Result<(), Error> {
        let index = self.layout.find_by_name(name).ok_or_else(|| {
            Error::type_error(format!("{} has no field {}", self.layout.ty, name))
        })?;
        self.values[index] = value;
        Ok(())
    }

    pub fn set_in(&mut self, class: &str, name: &str, value: Value) -> Result<(), Error> {
        let index = self.layout.find(class, name).ok_or_else(|| {
            Error::type_error(format!("{} has no field {}.{}", self.layout.ty, class, name))
        })?;
        self.values[index] = value;
        Ok(())
    }

    pub(crate) fn slot(&self, index: usize) -> &Value {
        &self.values[index]
    }

    pub(crate) fn set_slot(&mut self, index: usize, value: Value) {
        self.values[index] = value;
    }
}

/// Row-major storage of a single or multi-dimensional array.
#[derive(Clone, Debug)]
pub struct ArrayData {
    lengths: Vec<usize>,
    items: Vec<Value>,
}

impl ArrayData {
    pub(crate) fn new(lengths: Vec<usize>, items: Vec<Value>) -> ArrayData {
        debug_assert_eq!(lengths.iter().product::<usize>(), items.len());
        ArrayData { lengths, items }
    }

    pub fn rank(&self) -> usize {
        self.lengths.len()
    }

    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn flat_index(&self, indices: &[usize]) -> Option<usize> {
        if indices.len() != self.lengths.len() {
            return None;
        }
        let mut flat = 0;
        for (index, length) in indices.iter().zip(&self.lengths) {
            if index >= length {
                return None;
            }
            flat = flat * length + index;
        }
        Some(flat)
    }

    pub fn get(&self, indices: &[usize]) -> Option<&Value> {
        self.flat_index(indices).map(|i| &self.items[i])
    }

    pub fn set(&mut self, indices: &[usize], value: Value) -> Result<(), Error> {
        let flat = self.flat_index(indices).ok_or_else(|| {
            Error::invalid_ref(format!(
                "index {:?} out of bounds for array of lengths {:?}",
                indices, self.lengths
            ))
        })?;
        self.items[flat] = value;
        Ok(())
    }
}

/// Items of a list, queue, stack or set in insertion order. For stacks the
/// last item is the top.
#[derive(Clone, Debug)]
pub struct CollectionData {
    kind: CollectionKind,
    items: Vec<Value>,
}

impl CollectionData {
    pub fn new(kind: CollectionKind) -> CollectionData {
        CollectionData {
            kind,
            items: Vec::new(),
        }
    }

    pub(crate) fn from_internal(kind: CollectionKind, items: Vec<Value>) -> CollectionData {
        CollectionData { kind, items }
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in enumeration order: top to bottom for stacks, insertion order otherwise.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &Value> + '_> {
        match self.kind {
            CollectionKind::Stack => Box::new(self.items.iter().rev()),
            _ => Box::new(self.items.iter()),
        }
    }

    pub(crate) fn internal(&self) -> &[Value] {
        &self.items
    }

    pub fn add(&mut self, value: Value) {
        if self.kind == CollectionKind::Set && self.items.contains(&value) {
            return;
        }
        self.items.push(value);
    }

    pub fn enqueue(&mut self, value: Value) {
        self.items.push(value);
    }

    pub fn dequeue(&mut self) -> Option<Value> {
        if self.items.is_empty() {
            None
        } else {
            Some(self.items.remove(0))
        }
    }

    pub fn push(&mut self, value: Value) {
        self.items.push(value);
    }

    pub fn pop(&mut self) -> Option<Value> {
        self.items.pop()
    }

    pub(crate) fn insert(&mut self, method: InsertMethod, value: Value) {
        match method {
            InsertMethod::Add => self.add(value),
            InsertMethod::Enqueue => self.enqueue(value),
            InsertMethod::Push => self.push(value),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct DictionaryData {
    entries: Vec<(Value, Value)>,
}

impl DictionaryData {
    pub fn new() -> DictionaryData {
        DictionaryData::default()
    }

    /// Entries in their stored order, as kept by the internal layout.
    pub(crate) fn from_entries(entries: Vec<(Value, Value)>) -> DictionaryData {
        DictionaryData { entries }
    }

    pub(crate) fn entries(&self) -> &[(Value, Value)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn add(&mut self, key: Value, value: Value) -> Result<(), Error> {
        if self.get(&key).is_some() {
            return Err(Error::invalid_data(format!(
                "an item with the same key has already been added: {:?}",
                key
            )));
        }
        self.entries.push((key, value));
        Ok(())
    }

    /// Returns `false` and keeps the existing entry when the key is present.
    pub fn try_add(&mut self, key: Value, value: Value) -> bool {
        if self.get(&key).is_some() {
            return false;
        }
        self.entries.push((key, value));
        true
    }
}

/// Method resolved against a registry, bound into delegates.
#[derive(Clone)]
pub struct MethodRef {
    pub declaring: TypeDescriptor,
    pub name: String,
    pub(crate) body: MethodFn,
}

impl fmt::Debug for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.declaring, self.name)
    }
}

#[derive(Clone, Debug)]
pub struct Invocation {
    /// `None` for static methods.
    pub target: Option<ObjRef>,
    pub method: MethodRef,
}

pub enum ObjectData {
    Instance(Fields),
    Array(ArrayData),
    Collection(CollectionData),
    Dictionary(DictionaryData),
    ReadOnly(Vec<Value>),
    Delegate(Vec<Invocation>),
    Special(Box<dyn SpecialFormat>),
}

pub struct Object {
    ty: TypeDescriptor,
    data: ObjectData,
}

impl Object {
    pub fn new(ty: TypeDescriptor, data: ObjectData) -> Object {
        Object { ty, data }
    }

    pub fn type_descriptor(&self) -> &TypeDescriptor {
        &self.ty
    }

    pub fn data(&self) -> &ObjectData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut ObjectData {
        &mut self.data
    }

    pub fn fields(&self) -> Option<&Fields> {
        match &self.data {
            ObjectData::Instance(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn fields_mut(&mut self) -> Option<&mut Fields> {
        match &mut self.data {
            ObjectData::Instance(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayData> {
        match &self.data {
            ObjectData::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut ArrayData> {
        match &mut self.data {
            ObjectData::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&CollectionData> {
        match &self.data {
            ObjectData::Collection(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_collection_mut(&mut self) -> Option<&mut CollectionData> {
        match &mut self.data {
            ObjectData::Collection(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&DictionaryData> {
        match &self.data {
            ObjectData::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_dictionary_mut(&mut self) -> Option<&mut DictionaryData> {
        match &mut self.data {
            ObjectData::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_read_only(&self) -> Option<&[Value]> {
        match &self.data {
            ObjectData::ReadOnly(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_delegate(&self) -> Option<&[Invocation]> {
        match &self.data {
            ObjectData::Delegate(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_special<T: SpecialFormat>(&self) -> Option<&T> {
        self.as_special_dyn()
            .and_then(|special| special.as_any().downcast_ref::<T>())
    }

    pub fn as_special_mut<T: SpecialFormat>(&mut self) -> Option<&mut T> {
        self.as_special_dyn_mut()
            .and_then(|special| special.as_any_mut().downcast_mut::<T>())
    }

    pub(crate) fn as_special_dyn(&self) -> Option<&dyn SpecialFormat> {
        match &self.data {
            ObjectData::Special(special) => Some(special.as_ref()),
            _ => None,
        }
    }

    pub(crate) fn as_special_dyn_mut(&mut self) -> Option<&mut (dyn SpecialFormat + 'static)> {
        match &mut self.data {
            ObjectData::Special(special) => Some(special.as_mut()),
            _ => None,
        }
    }
}

/// Shared handle to a heap object. Equality of handles is identity.
#[derive(Clone)]
pub struct ObjRef(Rc<RefCell<Object>>);

impl ObjRef {
    pub fn new(object: Object) -> ObjRef {
        ObjRef(Rc::new(RefCell::new(object)))
    }

    pub fn ptr_eq(&self, other: &ObjRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as *const u8 as usize
    }

    pub fn borrow(&self) -> Ref<'_, Object> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Object> {
        self.0.borrow_mut()
    }

    pub fn type_descriptor(&self) -> TypeDescriptor {
        self.0.borrow().ty.clone()
    }

    /// Field of an instance by name, most derived declaration first.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.borrow().fields().and_then(|f| f.get(name)).cloned()
    }

    pub fn get_in(&self, class: &str, name: &str) -> Option<Value> {
        self.borrow()
            .fields()
            .and_then(|f| f.get_in(class, name))
            .cloned()
    }

    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<(), Error> {
        let mut object = self.borrow_mut();
        let ty = object.ty.clone();
        object
            .fields_mut()
            .ok_or_else(|| Error::type_error(format!("{} has no fields", ty)))?
            .set(name, value.into())
    }

    pub fn set_in(&self, class: &str, name: &str, value: impl Into<Value>) -> Result<(), Error> {
        let mut object = self.borrow_mut();
        let ty = object.ty.clone();
        object
            .fields_mut()
            .ok_or_else(|| Error::type_error(format!("{} has no fields", ty)))?
            .set_in(class, name, value.into())
    }

    /// Items of a collection in enumeration order.
    pub fn items(&self) -> Vec<Value> {
        let object = self.borrow();
        match object.data() {
            ObjectData::Collection(c) => c.iter().cloned().collect(),
            ObjectData::ReadOnly(items) => items.clone(),
            ObjectData::Array(array) => array.items().to_vec(),
            _ => Vec::new(),
        }
    }

    /// Calls every entry of a delegate's invocation list in order and returns
    /// the result of the last one.
    pub fn invoke(&self, args: &[Value]) -> Result<Value, Error> {
        let list = match self.borrow().data() {
            ObjectData::Delegate(list) => list.clone(),
            _ => {
                return Err(Error::type_error(format!(
                    "{} is not a delegate",
                    self.type_descriptor()
                )))
            }
        };
        let mut result = Value::Null;
        for invocation in &list {
            result =
                (invocation.method.body)(invocation.target.as_ref(), args).map_err(Error::callback)?;
        }
        Ok(result)
    }
}

impl fmt::Debug for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(object) => write!(f, "Object({}@{:#x})", object.ty, self.addr()),
            Err(_) => write!(f, "Object(<borrowed>@{:#x})", self.addr()),
        }
    }
}
