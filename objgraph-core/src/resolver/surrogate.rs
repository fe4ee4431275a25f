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
use crate::resolver::type_resolver::TypeRegistry;
use crate::value::Value;
use std::sync::Arc;

/// Replaces a value by another one: after reading, or before writing.
pub type SurrogateFn = Arc<dyn Fn(&Value) -> anyhow::Result<Value> + Send + Sync>;
/// Called with every object once it is fully read.
pub type CallbackFn = Arc<dyn Fn(&Value) -> anyhow::Result<()> + Send + Sync>;

/// Surrogate factories keyed by source type.
///
/// Lookup prefers an exact match, then the first registered type the
/// value's type is assignable to.
#[derive(Clone, Default)]
pub struct SurrogateRegistry {
    entries: Vec<(TypeDescriptor, SurrogateFn)>,
}

impl SurrogateRegistry {
    /// Replaces any factory already registered for `source`.
    pub fn register(&mut self, source: TypeDescriptor, factory: SurrogateFn) {
        match self.entries.iter_mut().find(|(ty, _)| *ty == source) {
            Some(entry) => entry.1 = factory,
            None => self.entries.push((source, factory)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(
        &self,
        ty: &TypeDescriptor,
        registry: &TypeRegistry,
    ) -> Result<Option<SurrogateFn>, Error> {
        if let Some((_, factory)) = self.entries.iter().find(|(source, _)| source == ty) {
            return Ok(Some(factory.clone()));
        }
        for (source, factory) in &self.entries {
            if registry.is_assignable(ty, source)? {
                return Ok(Some(factory.clone()));
            }
        }
        Ok(None)
    }
}
