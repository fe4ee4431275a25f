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
use crate::meta::{ClassStamp, FieldStamp, Shape, TypeDescriptor, TypeStamp};
use crate::not_allowed;
use crate::serializer::special::SpecialFormat;
use crate::types::{
    CollectionKind, DictionaryInsert, InsertMethod, PrimitiveKind, TypeCategory, SYS_MODULE,
};
use crate::value::{
    ArrayData, CollectionData, DictionaryData, EnumValue, Fields, Invocation, Literal, MethodRef,
    ObjRef, Object, ObjectData, Value,
};
use chrono::{NaiveDateTime, TimeDelta};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Post-construction hook, called with the freshly filled instance.
pub type HookFn = Arc<dyn Fn(&ObjRef) -> anyhow::Result<()> + Send + Sync>;
/// Method body: optional target (`None` for static methods) and arguments.
pub type MethodFn = Arc<dyn Fn(Option<&ObjRef>, &[Value]) -> anyhow::Result<Value> + Send + Sync>;
pub type ConstructorFn = Arc<dyn Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync>;
pub type SpecialFactory = Arc<dyn Fn() -> Box<dyn SpecialFormat> + Send + Sync>;

/// Builds the definition of a generic type for one set of arguments.
type GenericFactory = fn(&TypeDescriptor) -> Result<TypeDef, Error>;

const MAX_CHAIN_LENGTH: usize = 64;

#[derive(Clone, Debug)]
pub struct FieldDef {
    pub name: String,
    pub field_type: TypeDescriptor,
    /// Never written; read back as the type's default or from `constructor_args`.
    pub transient: bool,
    pub constructor_args: Option<Vec<Literal>>,
}

#[derive(Clone, Default)]
pub struct ClassDef {
    pub base: Option<TypeDescriptor>,
    pub fields: Vec<FieldDef>,
    pub hooks: Vec<HookFn>,
    pub late_hooks: Vec<HookFn>,
}

#[derive(Clone, Debug)]
pub struct EnumDef {
    pub underlying: PrimitiveKind,
    pub variants: Vec<(String, i64)>,
}

#[derive(Clone, Debug, Default)]
pub struct StructDef {
    pub fields: Vec<FieldDef>,
}

#[derive(Clone, Debug)]
pub struct CollectionDef {
    pub element: TypeDescriptor,
    pub kind: CollectionKind,
    /// Insertion operations the type accepts, in no particular order.
    pub insert: Vec<InsertMethod>,
}

#[derive(Clone, Debug)]
pub struct DictionaryDef {
    pub key: TypeDescriptor,
    pub value: TypeDescriptor,
    pub insert: Option<DictionaryInsert>,
}

#[derive(Clone)]
pub struct SpecialDef {
    pub factory: SpecialFactory,
}

#[derive(Clone)]
pub enum TypeKind {
    Primitive(PrimitiveKind),
    Class(ClassDef),
    Enum(EnumDef),
    Struct(StructDef),
    Nullable(TypeDescriptor),
    Array { element: TypeDescriptor, rank: u8 },
    Collection(CollectionDef),
    Dictionary(DictionaryDef),
    ReadOnlyCollection { element: TypeDescriptor },
    Delegate,
    Special(SpecialDef),
}

#[derive(Clone)]
pub struct MethodDef {
    pub name: String,
    pub body: MethodFn,
}

/// Everything the engine knows about one type.
#[derive(Clone)]
pub struct TypeDef {
    descriptor: TypeDescriptor,
    kind: TypeKind,
    constructor: Option<ConstructorFn>,
    methods: Vec<MethodDef>,
}

impl TypeDef {
    pub fn new(descriptor: TypeDescriptor, kind: TypeKind) -> TypeDef {
        TypeDef {
            descriptor,
            kind,
            constructor: None,
            methods: Vec::new(),
        }
    }

    pub fn with_constructor(mut self, constructor: ConstructorFn) -> TypeDef {
        self.constructor = Some(constructor);
        self
    }

    pub fn with_methods(mut self, methods: Vec<MethodDef>) -> TypeDef {
        self.methods = methods;
        self
    }

    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn constructor(&self) -> Option<&ConstructorFn> {
        self.constructor.as_ref()
    }

    pub fn methods(&self) -> &[MethodDef] {
        &self.methods
    }

    pub fn category(&self) -> TypeCategory {
        match &self.kind {
            TypeKind::Primitive(kind) if kind.is_value_type() => TypeCategory::Value,
            TypeKind::Enum(_) | TypeKind::Struct(_) | TypeKind::Nullable(_) => {
                TypeCategory::Value
            }
            _ => TypeCategory::Reference,
        }
    }

    pub fn is_value_type(&self) -> bool {
        self.category() == TypeCategory::Value
    }
}

#[derive(Clone, Debug)]
pub struct FieldLayout {
    pub declaring: TypeDescriptor,
    pub name: String,
    pub field_type: TypeDescriptor,
    pub transient: bool,
    pub constructor_args: Option<Vec<Literal>>,
}

/// Flattened field slots of a class (most derived class first) or a struct.
#[derive(Clone, Debug)]
pub struct InstanceLayout {
    pub ty: TypeDescriptor,
    /// Inheritance chain, most derived first.
    pub classes: Vec<TypeDescriptor>,
    pub fields: Vec<FieldLayout>,
}

impl InstanceLayout {
    /// Slot of the field `name` declared by `class`.
    pub fn find(&self, class: &str, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.declaring.name() == class && f.name == name)
    }

    pub fn find_by_name(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// Registry of type definitions consulted by both directions of a pass.
///
/// Two registries describing different versions of the same types stand for
/// two builds of a program: a stream written with one can be read with the
/// other under the configured version tolerance.
pub struct TypeRegistry {
    types: HashMap<TypeDescriptor, Arc<TypeDef>>,
    generics: HashMap<String, GenericFactory>,
    instances: RwLock<HashMap<TypeDescriptor, Arc<TypeDef>>>,
    layouts: RwLock<HashMap<TypeDescriptor, Arc<InstanceLayout>>>,
    stamps: RwLock<HashMap<(TypeDescriptor, bool), Option<Arc<TypeStamp>>>>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        let mut registry = TypeRegistry {
            types: HashMap::new(),
            generics: HashMap::new(),
            instances: RwLock::new(HashMap::new()),
            layouts: RwLock::new(HashMap::new()),
            stamps: RwLock::new(HashMap::new()),
        };
        registry.register_builtins();
        registry
    }
}

impl TypeRegistry {
    pub fn new() -> TypeRegistry {
        TypeRegistry::default()
    }

    fn register_builtins(&mut self) {
        for kind in PrimitiveKind::ALL {
            let desc = TypeDescriptor::primitive(kind);
            self.types
                .insert(desc.clone(), Arc::new(TypeDef::new(desc, TypeKind::Primitive(kind))));
        }
        let object = TypeDescriptor::object();
        self.types.insert(
            object.clone(),
            Arc::new(TypeDef::new(object, TypeKind::Class(ClassDef::default()))),
        );
        let action = TypeDescriptor::action();
        self.types
            .insert(action.clone(), Arc::new(TypeDef::new(action, TypeKind::Delegate)));

        self.generics.insert("sys.List".to_owned(), list_def);
        self.generics.insert("sys.Queue".to_owned(), queue_def);
        self.generics.insert("sys.Stack".to_owned(), stack_def);
        self.generics.insert("sys.HashSet".to_owned(), hash_set_def);
        self.generics
            .insert("sys.Dictionary".to_owned(), dictionary_def);
        self.generics
            .insert("sys.ReadOnlyCollection".to_owned(), read_only_def);
        self.generics.insert("sys.Nullable".to_owned(), nullable_def);
    }

    /// Adds a type definition. Registering the same descriptor twice is an error.
    pub fn register(&mut self, def: TypeDef) -> Result<&mut Self, Error> {
        let desc = def.descriptor().clone();
        if self.types.contains_key(&desc) || desc.is_array() {
            not_allowed!("type {:?} is already registered", desc);
        }
        self.types.insert(desc, Arc::new(def));
        self.layouts.get_mut().clear();
        self.stamps.get_mut().clear();
        Ok(self)
    }

    pub fn contains(&self, desc: &TypeDescriptor) -> bool {
        self.resolve(desc).is_ok()
    }

    pub fn resolve(&self, desc: &TypeDescriptor) -> Result<Arc<TypeDef>, Error> {
        if let Some(def) = self.types.get(desc) {
            return Ok(def.clone());
        }
        if let Some(def) = self.instances.read().get(desc) {
            return Ok(def.clone());
        }
        let def = match desc.shape() {
            Shape::Array { element, rank } => {
                if *rank == 0 || *rank > 32 {
                    return Err(Error::unresolved_type(format!(
                        "{:?}: array rank must be within 1..=32",
                        desc
                    )));
                }
                self.resolve(element)?;
                TypeDef::new(
                    desc.clone(),
                    TypeKind::Array {
                        element: element.clone(),
                        rank: *rank,
                    },
                )
            }
            Shape::Named { name, module, args } if !args.is_empty() && module == SYS_MODULE => {
                let factory = self
                    .generics
                    .get(name)
                    .ok_or_else(|| Error::unresolved_type(format!("{:?}", desc)))?;
                for arg in args {
                    self.resolve(arg)?;
                }
                let def = factory(desc)?;
                if let TypeKind::Nullable(inner) = def.kind() {
                    if !self.resolve(inner)?.is_value_type() {
                        return Err(Error::type_error(format!(
                            "{} wraps a reference type",
                            desc
                        )));
                    }
                }
                def
            }
            _ => return Err(Error::unresolved_type(format!("{:?}", desc))),
        };
        let def = Arc::new(def);
        self.instances
            .write()
            .entry(desc.clone())
            .or_insert_with(|| def.clone());
        Ok(def)
    }

    pub fn layout_of(&self, desc: &TypeDescriptor) -> Result<Arc<InstanceLayout>, Error> {
        if let Some(layout) = self.layouts.read().get(desc) {
            return Ok(layout.clone());
        }
        let def = self.resolve(desc)?;
        let layout = match def.kind() {
            TypeKind::Class(_) => {
                let mut classes = Vec::new();
                let mut fields = Vec::new();
                let mut current = Some(desc.clone());
                while let Some(class_desc) = current {
                    if classes.len() >= MAX_CHAIN_LENGTH || classes.contains(&class_desc) {
                        return Err(Error::configuration(format!(
                            "inheritance chain of {} is cyclic or too deep",
                            desc
                        )));
                    }
                    let class_def = self.resolve(&class_desc)?;
                    let TypeKind::Class(class) = class_def.kind() else {
                        return Err(Error::configuration(format!(
                            "base {} of {} is not a class",
                            class_desc, desc
                        )));
                    };
                    fields.extend(class.fields.iter().map(|f| field_layout(&class_desc, f)));
                    classes.push(class_desc);
                    current = class.base.clone();
                }
                InstanceLayout {
                    ty: desc.clone(),
                    classes,
                    fields,
                }
            }
            TypeKind::Struct(s) => InstanceLayout {
                ty: desc.clone(),
                classes: vec![desc.clone()],
                fields: s.fields.iter().map(|f| field_layout(desc, f)).collect(),
            },
            _ => {
                return Err(Error::type_error(format!(
                    "{} has no field layout",
                    desc
                )))
            }
        };
        let layout = Arc::new(layout);
        self.layouts
            .write()
            .entry(desc.clone())
            .or_insert_with(|| layout.clone());
        Ok(layout)
    }

    /// Stamp of a class or struct; with `collections_as_objects` also the
    /// pseudo-class stamp of collections and dictionaries. `None` for every
    /// other kind of type.
    pub fn stamp_of(
        &self,
        desc: &TypeDescriptor,
        collections_as_objects: bool,
    ) -> Result<Option<Arc<TypeStamp>>, Error> {
        let key = (desc.clone(), collections_as_objects);
        if let Some(stamp) = self.stamps.read().get(&key) {
            return Ok(stamp.clone());
        }
        let def = self.resolve(desc)?;
        let stamp = match def.kind() {
            TypeKind::Class(_) | TypeKind::Struct(_) => {
                let layout = self.layout_of(desc)?;
                let object = TypeDescriptor::object();
                let classes = layout
                    .classes
                    .iter()
                    .filter(|class| **class != object)
                    .map(|class| ClassStamp {
                        name: class.name().to_owned(),
                        module: class.module().to_owned(),
                        fields: layout
                            .fields
                            .iter()
                            .filter(|f| !f.transient && f.declaring == *class)
                            .map(|f| FieldStamp {
                                name: f.name.clone(),
                                field_type: f.field_type.clone(),
                            })
                            .collect(),
                    })
                    .collect();
                Some(Arc::new(TypeStamp::new(classes)))
            }
            TypeKind::Collection(c) if collections_as_objects => Some(Arc::new(pseudo_stamp(
                desc,
                vec![("_items", TypeDescriptor::array(c.element.clone(), 1))],
            ))),
            TypeKind::Dictionary(d) if collections_as_objects => Some(Arc::new(pseudo_stamp(
                desc,
                vec![
                    ("_keys", TypeDescriptor::array(d.key.clone(), 1)),
                    ("_values", TypeDescriptor::array(d.value.clone(), 1)),
                ],
            ))),
            _ => None,
        };
        self.stamps
            .write()
            .entry(key)
            .or_insert_with(|| stamp.clone());
        Ok(stamp)
    }

    pub fn default_value(&self, desc: &TypeDescriptor) -> Result<Value, Error> {
        let def = self.resolve(desc)?;
        Ok(match def.kind() {
            TypeKind::Primitive(kind) => primitive_default(*kind),
            TypeKind::Enum(_) => Value::Enum(EnumValue {
                ty: desc.clone(),
                raw: 0,
            }),
            TypeKind::Struct(_) => Value::Struct(Box::new(self.default_fields(desc)?)),
            _ => Value::Null,
        })
    }

    pub(crate) fn default_fields(&self, desc: &TypeDescriptor) -> Result<Fields, Error> {
        let layout = self.layout_of(desc)?;
        let values = layout
            .fields
            .iter()
            .map(|f| self.default_value(&f.field_type))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Fields::new(layout, values))
    }

    /// Whether a value of `runtime` type may be stored where `declared` is expected.
    pub fn is_assignable(
        &self,
        runtime: &TypeDescriptor,
        declared: &TypeDescriptor,
    ) -> Result<bool, Error> {
        if runtime == declared || *declared == TypeDescriptor::object() {
            return Ok(true);
        }
        if let TypeKind::Nullable(inner) = self.resolve(declared)?.kind() {
            return Ok(inner == runtime);
        }
        let layout = match self.resolve(runtime)?.kind() {
            TypeKind::Class(_) => self.layout_of(runtime)?,
            _ => return Ok(false),
        };
        Ok(layout.classes.contains(declared))
    }

    /// Method `name` declared by `declaring` itself.
    pub fn method(&self, declaring: &TypeDescriptor, name: &str) -> Result<MethodRef, Error> {
        let def = self.resolve(declaring)?;
        let method = def
            .methods()
            .iter()
            .find(|m| m.name == name)
            .ok_or_else(|| {
                Error::unresolved_type(format!("method {}::{} not found", declaring, name))
            })?;
        Ok(MethodRef {
            declaring: declaring.clone(),
            name: method.name.clone(),
            body: method.body.clone(),
        })
    }

    /// Runs the constructor of `desc` with `args`.
    pub fn construct(&self, desc: &TypeDescriptor, args: &[Value]) -> Result<Value, Error> {
        let def = self.resolve(desc)?;
        let constructor = def.constructor().ok_or_else(|| {
            Error::configuration(format!("{} has no constructor", desc))
        })?;
        constructor(args).map_err(Error::callback)
    }

    /// Empty instance of a class, collection, dictionary or special type,
    /// fields at their defaults and no constructor run.
    pub fn new_object(&self, desc: &TypeDescriptor) -> Result<ObjRef, Error> {
        let def = self.resolve(desc)?;
        let data = match def.kind() {
            TypeKind::Class(_) => ObjectData::Instance(self.default_fields(desc)?),
            TypeKind::Collection(c) => ObjectData::Collection(CollectionData::new(c.kind)),
            TypeKind::Dictionary(_) => ObjectData::Dictionary(DictionaryData::new()),
            TypeKind::Special(s) => ObjectData::Special((s.factory)()),
            _ => {
                return Err(Error::type_error(format!(
                    "{} cannot be allocated without content",
                    desc
                )))
            }
        };
        Ok(ObjRef::new(Object::new(desc.clone(), data)))
    }

    pub fn new_struct(&self, desc: &TypeDescriptor) -> Result<Value, Error> {
        match self.resolve(desc)?.kind() {
            TypeKind::Struct(_) => self.default_value(desc),
            _ => Err(Error::type_error(format!("{} is not a struct", desc))),
        }
    }

    pub fn new_enum(&self, desc: &TypeDescriptor, variant: &str) -> Result<Value, Error> {
        let def = self.resolve(desc)?;
        let TypeKind::Enum(e) = def.kind() else {
            return Err(Error::type_error(format!("{} is not an enum", desc)));
        };
        let raw = e
            .variants
            .iter()
            .find(|(name, _)| name == variant)
            .map(|(_, raw)| *raw)
            .ok_or_else(|| Error::type_error(format!("{} has no variant {}", desc, variant)))?;
        Ok(Value::Enum(EnumValue {
            ty: desc.clone(),
            raw,
        }))
    }

    /// Array of `element` with one length per dimension, filled with defaults.
    pub fn new_array(&self, element: &TypeDescriptor, lengths: &[usize]) -> Result<ObjRef, Error> {
        let rank = u8::try_from(lengths.len())
            .ok()
            .filter(|rank| (1..=32).contains(rank))
            .ok_or_else(|| Error::type_error("array rank must be within 1..=32"))?;
        let desc = TypeDescriptor::array(element.clone(), rank);
        let default = self.default_value(element)?;
        let total = lengths.iter().product();
        Ok(ObjRef::new(Object::new(
            desc,
            ObjectData::Array(ArrayData::new(lengths.to_vec(), vec![default; total])),
        )))
    }

    pub fn new_read_only(&self, element: &TypeDescriptor, items: Vec<Value>) -> Result<ObjRef, Error> {
        let desc = TypeDescriptor::read_only(element.clone());
        self.resolve(&desc)?;
        Ok(ObjRef::new(Object::new(desc, ObjectData::ReadOnly(items))))
    }

    /// Binds `declaring::name` to `target` (`None` for a static method).
    pub fn bind(
        &self,
        target: Option<&ObjRef>,
        declaring: &TypeDescriptor,
        name: &str,
    ) -> Result<Invocation, Error> {
        Ok(Invocation {
            target: target.cloned(),
            method: self.method(declaring, name)?,
        })
    }

    pub fn new_delegate(
        &self,
        desc: &TypeDescriptor,
        invocations: Vec<Invocation>,
    ) -> Result<ObjRef, Error> {
        match self.resolve(desc)?.kind() {
            TypeKind::Delegate => Ok(ObjRef::new(Object::new(
                desc.clone(),
                ObjectData::Delegate(invocations),
            ))),
            _ => Err(Error::type_error(format!("{} is not a delegate", desc))),
        }
    }
}

fn field_layout(declaring: &TypeDescriptor, f: &FieldDef) -> FieldLayout {
    FieldLayout {
        declaring: declaring.clone(),
        name: f.name.clone(),
        field_type: f.field_type.clone(),
        transient: f.transient,
        constructor_args: f.constructor_args.clone(),
    }
}

fn pseudo_stamp(desc: &TypeDescriptor, fields: Vec<(&str, TypeDescriptor)>) -> TypeStamp {
    TypeStamp::new(vec![ClassStamp {
        name: desc.to_string(),
        module: desc.module().to_owned(),
        fields: fields
            .into_iter()
            .map(|(name, field_type)| FieldStamp {
                name: name.to_owned(),
                field_type,
            })
            .collect(),
    }])
}

pub(crate) fn primitive_default(kind: PrimitiveKind) -> Value {
    match kind {
        PrimitiveKind::Bool => Value::Bool(false),
        PrimitiveKind::Char => Value::Char('\0'),
        PrimitiveKind::I8 => Value::I8(0),
        PrimitiveKind::U8 => Value::U8(0),
        PrimitiveKind::I16 => Value::I16(0),
        PrimitiveKind::U16 => Value::U16(0),
        PrimitiveKind::I32 => Value::I32(0),
        PrimitiveKind::U32 => Value::U32(0),
        PrimitiveKind::I64 => Value::I64(0),
        PrimitiveKind::U64 => Value::U64(0),
        PrimitiveKind::F32 => Value::F32(0.0),
        PrimitiveKind::F64 => Value::F64(0.0),
        PrimitiveKind::String => Value::Null,
        PrimitiveKind::DateTime => Value::DateTime(NaiveDateTime::default()),
        PrimitiveKind::TimeSpan => Value::TimeSpan(TimeDelta::zero()),
    }
}

/// Built-in collections take an optional initial capacity.
fn collection_constructor(desc: &TypeDescriptor, kind: CollectionKind) -> ConstructorFn {
    let desc = desc.clone();
    Arc::new(move |args: &[Value]| {
        let capacity = match args {
            [] => 0,
            [capacity] => capacity
                .as_i64()
                .and_then(|c| usize::try_from(c).ok())
                .ok_or_else(|| anyhow::anyhow!("invalid capacity {:?}", capacity))?,
            _ => anyhow::bail!("{} takes at most one argument", desc),
        };
        let items = Vec::with_capacity(capacity);
        Ok(Value::Object(ObjRef::new(Object::new(
            desc.clone(),
            ObjectData::Collection(CollectionData::from_internal(kind, items)),
        ))))
    })
}

fn generic_args<const N: usize>(desc: &TypeDescriptor) -> Result<&[TypeDescriptor; N], Error> {
    desc.args().try_into().map_err(|_| {
        Error::unresolved_type(format!("{:?} expects {} type arguments", desc, N))
    })
}

macro_rules! collection_defs {
    ($($fn_name:ident => $kind:ident, [$($insert:ident),+]);+ $(;)?) => {
        $(
            fn $fn_name(desc: &TypeDescriptor) -> Result<TypeDef, Error> {
                let [element] = generic_args::<1>(desc)?;
                Ok(TypeDef::new(
                    desc.clone(),
                    TypeKind::Collection(CollectionDef {
                        element: element.clone(),
                        kind: CollectionKind::$kind,
                        insert: vec![$(InsertMethod::$insert),+],
                    }),
                )
                .with_constructor(collection_constructor(desc, CollectionKind::$kind)))
            }
        )+
    };
}

collection_defs! {
    list_def => List, [Add];
    queue_def => Queue, [Enqueue];
    stack_def => Stack, [Push];
    hash_set_def => Set, [Add];
}

fn dictionary_def(desc: &TypeDescriptor) -> Result<TypeDef, Error> {
    let [key, value] = generic_args::<2>(desc)?;
    let ty = desc.clone();
    Ok(TypeDef::new(
        desc.clone(),
        TypeKind::Dictionary(DictionaryDef {
            key: key.clone(),
            value: value.clone(),
            insert: Some(DictionaryInsert::Add),
        }),
    )
    .with_constructor(Arc::new(move |_: &[Value]| {
        Ok(Value::Object(ObjRef::new(Object::new(
            ty.clone(),
            ObjectData::Dictionary(DictionaryData::new()),
        ))))
    })))
}

fn read_only_def(desc: &TypeDescriptor) -> Result<TypeDef, Error> {
    let [element] = generic_args::<1>(desc)?;
    Ok(TypeDef::new(
        desc.clone(),
        TypeKind::ReadOnlyCollection {
            element: element.clone(),
        },
    ))
}

fn nullable_def(desc: &TypeDescriptor) -> Result<TypeDef, Error> {
    let [inner] = generic_args::<1>(desc)?;
    Ok(TypeDef::new(desc.clone(), TypeKind::Nullable(inner.clone())))
}
