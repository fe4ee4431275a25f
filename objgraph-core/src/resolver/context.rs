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
use crate::config::Method;
use crate::error::Error;
use crate::meta::TypeDescriptor;
use crate::objgraph::ObjGraph;
use crate::resolver::meta_resolver::{MetaReaderResolver, MetaWriterResolver, StreamType};
use crate::resolver::ref_resolver::{RefReader, RefWriter};
use crate::resolver::type_resolver::HookFn;
use crate::serializer::plan::{FieldPlan, FieldWritePlan, ReadPlan, WriteBody, WritePlan};
use crate::value::ObjRef;
use std::collections::HashMap;
use std::sync::Arc;

pub struct WriteContext<'a> {
    pub writer: &'a mut Writer,
    graph: &'a ObjGraph,
    pub ref_writer: RefWriter,
    meta_resolver: MetaWriterResolver,
    current_depth: u32,
}

impl<'a> WriteContext<'a> {
    pub fn new(graph: &'a ObjGraph, writer: &'a mut Writer) -> WriteContext<'a> {
        WriteContext {
            writer,
            graph,
            ref_writer: RefWriter::new(),
            meta_resolver: MetaWriterResolver::default(),
            current_depth: 0,
        }
    }

    #[inline(always)]
    pub fn graph(&self) -> &'a ObjGraph {
        self.graph
    }

    /// Writes a type table reference, sending the definition on first use.
    pub fn write_type(&mut self, desc: &TypeDescriptor) -> Result<(), Error> {
        self.meta_resolver.write_type(
            self.writer,
            desc,
            self.graph.registry(),
            self.graph.config().treat_collections_as_user_objects,
        )
    }

    pub fn write_plan(&self, desc: &TypeDescriptor) -> Result<Arc<WritePlan>, Error> {
        self.graph.write_plan(desc)
    }

    pub fn field_write_plan(&self, desc: &TypeDescriptor) -> Result<Arc<FieldWritePlan>, Error> {
        match &self.write_plan(desc)?.body {
            WriteBody::Fields(fields) => Ok(fields.clone()),
            _ => Err(Error::type_error(format!("{} has no fields", desc))),
        }
    }

    pub fn inc_depth(&mut self) -> Result<(), Error> {
        self.current_depth += 1;
        let max_depth = self.graph.config().max_depth();
        if self.current_depth > max_depth {
            return Err(Error::depth_exceed(format!(
                "maximum nesting depth {} exceeded while writing",
                max_depth
            )));
        }
        Ok(())
    }

    #[inline(always)]
    pub fn dec_depth(&mut self) {
        self.current_depth = self.current_depth.saturating_sub(1);
    }
}

pub struct ReadContext<'a, 'bf> {
    pub reader: Reader<'bf>,
    graph: &'a ObjGraph,
    pub meta_resolver: MetaReaderResolver,
    pub ref_reader: RefReader,
    late_hooks: Vec<(ObjRef, HookFn)>,
    plans: HashMap<usize, Arc<ReadPlan>>,
    struct_plans: HashMap<TypeDescriptor, Arc<FieldPlan>>,
    collections_as_objects: bool,
    current_depth: u32,
}

impl<'a, 'bf> ReadContext<'a, 'bf> {
    /// `collections_as_objects` is the layout flag carried by the stream header.
    pub fn new(
        graph: &'a ObjGraph,
        reader: Reader<'bf>,
        collections_as_objects: bool,
    ) -> ReadContext<'a, 'bf> {
        ReadContext {
            reader,
            graph,
            meta_resolver: MetaReaderResolver::default(),
            ref_reader: RefReader::new(),
            late_hooks: Vec::new(),
            plans: HashMap::new(),
            struct_plans: HashMap::new(),
            collections_as_objects,
            current_depth: 0,
        }
    }

    #[inline(always)]
    pub fn graph(&self) -> &'a ObjGraph {
        self.graph
    }

    fn caches_plans(&self) -> bool {
        self.graph.config().read_method == Method::Generated
    }

    /// Read plan of a stream type. Under [`Method::Generated`] each stream
    /// type is resolved once per pass.
    pub fn read_plan(&mut self, stream_type: &Arc<StreamType>) -> Result<Arc<ReadPlan>, Error> {
        if let Some(plan) = self.plans.get(&stream_type.index) {
            return Ok(plan.clone());
        }
        let plan = self.graph.read_plan(
            stream_type,
            self.collections_as_objects,
            &self.meta_resolver,
        )?;
        if self.caches_plans() {
            self.plans.insert(stream_type.index, plan.clone());
        }
        Ok(plan)
    }

    /// Field plan of a struct, against the stamp the stream sent for it.
    pub fn struct_plan(&mut self, ty: &TypeDescriptor) -> Result<Arc<FieldPlan>, Error> {
        if let Some(plan) = self.struct_plans.get(ty) {
            return Ok(plan.clone());
        }
        let stamp = self.meta_resolver.find(ty).and_then(|t| t.stamp.clone());
        let plan = self
            .graph
            .field_plan(ty, stamp.as_ref(), &self.meta_resolver)?;
        if self.caches_plans() {
            self.struct_plans.insert(ty.clone(), plan.clone());
        }
        Ok(plan)
    }

    pub fn push_late_hook(&mut self, obj: ObjRef, hook: HookFn) {
        self.late_hooks.push((obj, hook));
    }

    pub fn take_late_hooks(&mut self) -> Vec<(ObjRef, HookFn)> {
        std::mem::take(&mut self.late_hooks)
    }

    pub fn inc_depth(&mut self) -> Result<(), Error> {
        self.current_depth += 1;
        let max_depth = self.graph.config().max_depth();
        if self.current_depth > max_depth {
            return Err(Error::depth_exceed(format!(
                "maximum nesting depth {} exceeded while reading, current depth {}",
                max_depth, self.current_depth
            )));
        }
        Ok(())
    }

    #[inline(always)]
    pub fn dec_depth(&mut self) {
        self.current_depth = self.current_depth.saturating_sub(1);
    }
}
