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
use crate::config::{Config, Method, VersionTolerance};
use crate::error::Error;
use crate::meta::{compare, StampDiff, TypeDescriptor, TypeStamp};
use crate::resolver::context::{ReadContext, WriteContext};
use crate::resolver::meta_resolver::{MetaReaderResolver, StreamType};
use crate::resolver::surrogate::{CallbackFn, SurrogateRegistry};
use crate::resolver::type_resolver::TypeRegistry;
use crate::serializer::object::build_field_plan;
use crate::serializer::plan::{build_read_plan, build_write_plan, FieldPlan, ReadPlan, WritePlan};
use crate::serializer::{read_ref, write_ref};
use crate::types::config_flags::{COLLECTIONS_AS_OBJECTS_FLAG, IS_LITTLE_ENDIAN_FLAG};
use crate::types::{FORMAT_VERSION, MAGIC_NUMBER};
use crate::value::Value;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::hash::Hash;
use std::io::{Read, Write};
use std::sync::Arc;

/// Stream type, stream stamp and collection layout flag.
type PlanKey = (TypeDescriptor, Option<Arc<TypeStamp>>, bool);
type DiffKey = (Arc<TypeStamp>, Arc<TypeStamp>);

/// Serializer of object graphs over a [`TypeRegistry`].
///
/// An `ObjGraph` holds the configuration, the surrogates and the callback,
/// plus the per-type plans built on demand. It is `Send + Sync`: passes run
/// single-threaded, but any number of them may share one instance, each with
/// its own object table and type table.
///
/// # Configuration
///
/// Settings that shape the plans ([`write_method`](Self::write_method),
/// [`read_method`](Self::read_method),
/// [`version_tolerance`](Self::version_tolerance),
/// [`treat_collections_as_user_objects`](Self::treat_collections_as_user_objects),
/// [`max_depth`](Self::max_depth)) take `self` by value and chain right after
/// [`ObjGraph::new`]. Surrogates and the deserialization callback are
/// registered through `&mut self`
/// ([`register_surrogate`](Self::register_surrogate),
/// [`register_object_surrogate`](Self::register_object_surrogate),
/// [`on_object_deserialized`](Self::on_object_deserialized)) once the
/// instance is bound, before it is shared between threads.
///
/// # Examples
///
/// ```rust
/// use objgraph_core::resolver::builder::ClassBuilder;
/// use objgraph_core::{ObjGraph, TypeDescriptor, TypeRegistry, Value};
///
/// let mut registry = TypeRegistry::new();
/// registry
///     .register(
///         ClassBuilder::new("demo.Node")
///             .field("label", TypeDescriptor::string())
///             .field("next", TypeDescriptor::named("demo.Node"))
///             .build(),
///     )
///     .unwrap();
/// let graph = ObjGraph::new(registry);
///
/// let node = graph.registry().new_object(&TypeDescriptor::named("demo.Node")).unwrap();
/// node.set("label", "loop").unwrap();
/// node.set("next", node.clone()).unwrap();
///
/// let bytes = graph.serialize(&Value::Object(node)).unwrap();
/// let copy = graph.deserialize(&bytes).unwrap();
/// let copy = copy.as_object().unwrap();
/// assert_eq!(copy.get("label").unwrap().as_str(), Some("loop"));
/// assert!(copy.get("next").unwrap().as_object().unwrap().ptr_eq(copy));
/// ```
pub struct ObjGraph {
    registry: Arc<TypeRegistry>,
    config: Config,
    surrogates: SurrogateRegistry,
    object_surrogates: SurrogateRegistry,
    callback: Option<CallbackFn>,
    read_plans: RwLock<HashMap<PlanKey, Arc<ReadPlan>>>,
    field_plans: RwLock<HashMap<PlanKey, Arc<FieldPlan>>>,
    write_plans: RwLock<HashMap<TypeDescriptor, Arc<WritePlan>>>,
    diffs: RwLock<HashMap<DiffKey, Arc<StampDiff>>>,
}

/// Looks `key` up under the read lock, otherwise builds the value and keeps
/// whichever insert wins a race.
fn cached<K, V>(
    cache: &RwLock<HashMap<K, Arc<V>>>,
    key: K,
    build: impl FnOnce() -> Result<V, Error>,
) -> Result<Arc<V>, Error>
where
    K: Eq + Hash,
{
    if let Some(value) = cache.read().get(&key) {
        return Ok(value.clone());
    }
    let value = Arc::new(build()?);
    Ok(cache.write().entry(key).or_insert(value).clone())
}

impl ObjGraph {
    /// Creates a serializer with the default [`Config`].
    ///
    /// # Arguments
    ///
    /// * `registry` - The types this serializer reads and writes, owned or shared.
    pub fn new(registry: impl Into<Arc<TypeRegistry>>) -> ObjGraph {
        ObjGraph {
            registry: registry.into(),
            config: Config::default(),
            surrogates: SurrogateRegistry::default(),
            object_surrogates: SurrogateRegistry::default(),
            callback: None,
            read_plans: RwLock::new(HashMap::new()),
            field_plans: RwLock::new(HashMap::new()),
            write_plans: RwLock::new(HashMap::new()),
            diffs: RwLock::new(HashMap::new()),
        }
    }

    fn clear_plans(&mut self) {
        self.read_plans.get_mut().clear();
        self.field_plans.get_mut().clear();
        self.write_plans.get_mut().clear();
    }

    /// Sets how write plans are obtained.
    ///
    /// # Arguments
    ///
    /// * `method` - [`Method::Generated`] (the default) builds each plan once
    ///   and shares it; [`Method::Reflection`] walks the type definition
    ///   again for every object. Both write identical bytes.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use objgraph_core::{Method, ObjGraph, TypeRegistry};
    ///
    /// let graph = ObjGraph::new(TypeRegistry::new())
    ///     .write_method(Method::Reflection)
    ///     .read_method(Method::Generated);
    /// ```
    pub fn write_method(mut self, method: Method) -> Self {
        self.config.write_method = method;
        self.clear_plans();
        self
    }

    /// Sets how read plans are obtained, independently of the write side.
    pub fn read_method(mut self, method: Method) -> Self {
        self.config.read_method = method;
        self.clear_plans();
        self
    }

    /// Sets the schema changes accepted when reading a stream written
    /// against another shape of a type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use objgraph_core::{ObjGraph, TypeRegistry, VersionTolerance};
    ///
    /// let graph = ObjGraph::new(TypeRegistry::new())
    ///     .version_tolerance(VersionTolerance::FIELD_ADDITION | VersionTolerance::FIELD_REMOVAL);
    /// ```
    pub fn version_tolerance(mut self, tolerance: VersionTolerance) -> Self {
        self.config.version_tolerance = tolerance;
        self.clear_plans();
        self
    }

    /// Writes collections and dictionaries through their internal layout,
    /// as stamped pseudo-classes, instead of element by element.
    ///
    /// Readers follow the layout announced by the stream header whatever
    /// their own setting is.
    pub fn treat_collections_as_user_objects(mut self, enabled: bool) -> Self {
        self.config.treat_collections_as_user_objects = enabled;
        self.clear_plans();
        self
    }

    /// Sets the maximum nesting of objects and struct values in one pass.
    ///
    /// # Default
    ///
    /// 8192. Deeper graphs fail with [`Error::DepthExceed`]; shallower ones
    /// never overflow the native stack, which is extended as needed.
    pub fn max_depth(mut self, max_depth: u32) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    /// Registers a factory replacing every read object of `source` (or of a
    /// type deriving from it) by another value.
    ///
    /// The replacement takes the object's place in the object table, so
    /// later references to it see the replacement. A type with late hooks
    /// cannot have a surrogate; the conflict is reported when the type is
    /// first read.
    pub fn register_surrogate<F>(&mut self, source: TypeDescriptor, factory: F) -> &mut Self
    where
        F: Fn(&Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.surrogates.register(source, Arc::new(factory));
        self.read_plans.get_mut().clear();
        self
    }

    /// Registers a factory replacing every object of `source` (or of a type
    /// deriving from it) just before it is written.
    ///
    /// Identity stays keyed on the original: all references to it share the
    /// id of the single replacement written. A `Value::Null` replacement
    /// writes a null reference.
    pub fn register_object_surrogate<F>(&mut self, source: TypeDescriptor, factory: F) -> &mut Self
    where
        F: Fn(&Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.object_surrogates.register(source, Arc::new(factory));
        self
    }

    /// Sets a callback run once for every object read in reference position,
    /// after its immediate hooks and before its surrogate.
    pub fn on_object_deserialized<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&Value) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(callback));
        self
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn surrogates(&self) -> &SurrogateRegistry {
        &self.surrogates
    }

    pub fn object_surrogates(&self) -> &SurrogateRegistry {
        &self.object_surrogates
    }

    pub fn callback(&self) -> Option<&CallbackFn> {
        self.callback.as_ref()
    }

    pub(crate) fn read_plan(
        &self,
        stream_type: &StreamType,
        collections_as_objects: bool,
        types: &MetaReaderResolver,
    ) -> Result<Arc<ReadPlan>, Error> {
        let build = || build_read_plan(self, stream_type, collections_as_objects, types);
        if self.config.read_method == Method::Reflection {
            return build().map(Arc::new);
        }
        let key = (
            stream_type.descriptor.clone(),
            stream_type.stamp.clone(),
            collections_as_objects,
        );
        cached(&self.read_plans, key, build)
    }

    pub(crate) fn field_plan(
        &self,
        desc: &TypeDescriptor,
        stamp: Option<&Arc<TypeStamp>>,
        types: &MetaReaderResolver,
    ) -> Result<Arc<FieldPlan>, Error> {
        let build = || build_field_plan(self, desc, stamp, types);
        if self.config.read_method == Method::Reflection {
            return build().map(Arc::new);
        }
        cached(&self.field_plans, (desc.clone(), stamp.cloned(), false), build)
    }

    pub(crate) fn write_plan(&self, desc: &TypeDescriptor) -> Result<Arc<WritePlan>, Error> {
        let build = || build_write_plan(self, desc);
        if self.config.write_method == Method::Reflection {
            return build().map(Arc::new);
        }
        cached(&self.write_plans, desc.clone(), build)
    }

    /// Difference between the running shape of a type and the shape a stream
    /// was written with. Memoized for the lifetime of the instance.
    pub fn stamp_diff(&self, current: &Arc<TypeStamp>, previous: &Arc<TypeStamp>) -> Arc<StampDiff> {
        let key = (current.clone(), previous.clone());
        if let Some(diff) = self.diffs.read().get(&key) {
            return diff.clone();
        }
        let diff = Arc::new(compare(current, previous));
        self.diffs.write().entry(key).or_insert(diff).clone()
    }

    fn write_header(&self, writer: &mut Writer) {
        let mut flags = IS_LITTLE_ENDIAN_FLAG;
        if self.config.treat_collections_as_user_objects {
            flags |= COLLECTIONS_AS_OBJECTS_FLAG;
        }
        writer.write_u16(MAGIC_NUMBER);
        writer.write_u8(FORMAT_VERSION);
        writer.write_u8(flags);
    }

    fn read_header(reader: &mut Reader) -> Result<u8, Error> {
        let magic = reader.read_u16()?;
        if magic != MAGIC_NUMBER {
            return Err(Error::invalid_data(format!(
                "bad magic number {:#06x}, expected {:#06x}",
                magic, MAGIC_NUMBER
            )));
        }
        let version = reader.read_u8()?;
        if version != FORMAT_VERSION {
            return Err(Error::invalid_data(format!(
                "unsupported format version {}, expected {}",
                version, FORMAT_VERSION
            )));
        }
        let flags = reader.read_u8()?;
        if flags & IS_LITTLE_ENDIAN_FLAG == 0 {
            return Err(Error::invalid_data("big endian streams are not supported"));
        }
        if flags & !(IS_LITTLE_ENDIAN_FLAG | COLLECTIONS_AS_OBJECTS_FLAG) != 0 {
            return Err(Error::invalid_data(format!("unknown header flags {:#04x}", flags)));
        }
        Ok(flags)
    }

    /// Serializes the graph reachable from `root`.
    ///
    /// # Errors
    ///
    /// Fails on values that do not fit the declared type of their slot,
    /// types missing from the registry, graphs nested deeper than
    /// [`ObjGraph::max_depth`] and errors raised by write surrogates.
    pub fn serialize(&self, root: &Value) -> Result<Vec<u8>, Error> {
        let mut writer = Writer::default();
        self.write_header(&mut writer);
        log::trace!("serialize: start");
        {
            let mut ctx = WriteContext::new(self, &mut writer);
            write_ref(&mut ctx, root, &TypeDescriptor::object())?;
        }
        log::trace!("serialize: done, {} bytes", writer.len());
        Ok(writer.into_bytes())
    }

    pub fn serialize_to(&self, root: &Value, mut out: impl Write) -> Result<(), Error> {
        let bytes = self.serialize(root)?;
        out.write_all(&bytes)?;
        Ok(())
    }

    /// Rebuilds the graph stored in `bytes`.
    ///
    /// Late hooks run once the whole graph exists, in the order their
    /// objects were read. The stream must be consumed exactly.
    pub fn deserialize(&self, bytes: &[u8]) -> Result<Value, Error> {
        let mut reader = Reader::new(bytes);
        let flags = Self::read_header(&mut reader)?;
        log::trace!("deserialize: start, {} bytes", bytes.len());
        let mut ctx = ReadContext::new(self, reader, flags & COLLECTIONS_AS_OBJECTS_FLAG != 0);
        let root = read_ref(&mut ctx)?;
        if ctx.reader.remaining() != 0 {
            return Err(Error::invalid_data(format!(
                "{} trailing bytes after the root object",
                ctx.reader.remaining()
            )));
        }
        for (obj, hook) in ctx.take_late_hooks() {
            hook(&obj).map_err(Error::callback)?;
        }
        log::trace!("deserialize: done");
        Ok(root)
    }

    pub fn deserialize_from(&self, mut input: impl Read) -> Result<Value, Error> {
        let mut bytes = Vec::new();
        input.read_to_end(&mut bytes)?;
        self.deserialize(&bytes)
    }
}
