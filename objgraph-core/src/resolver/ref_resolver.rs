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
use crate::types::NULL_ID;
use crate::value::Value;
use std::collections::HashMap;

/// Object id table of a serialization pass.
///
/// Values with identity (objects and strings) are keyed by address, so the
/// second occurrence of the same allocation gets the id of the first.
/// Values the writer creates on the fly are kept alive until the pass ends,
/// which stops their addresses from being handed out again.
///
/// ```rust
/// use objgraph_core::resolver::ref_resolver::RefWriter;
/// use objgraph_core::value::Value;
///
/// let mut refs = RefWriter::new();
/// let s = Value::string("shared");
/// let id = refs.assign(&s);
/// assert_eq!(id, 1);
/// assert_eq!(refs.lookup(&s.clone()), Some(1));
/// assert_eq!(refs.lookup(&Value::string("shared")), None);
/// ```
pub struct RefWriter {
    ids: HashMap<usize, i32>,
    next_id: i32,
    keep_alive: Vec<Value>,
}

impl Default for RefWriter {
    fn default() -> Self {
        RefWriter {
            ids: HashMap::new(),
            next_id: NULL_ID + 1,
            keep_alive: Vec::new(),
        }
    }
}

impl RefWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, value: &Value) -> Option<i32> {
        value.identity().and_then(|key| self.ids.get(&key).copied())
    }

    /// Assigns the next id. Values without identity get a fresh id that is
    /// never looked up again.
    pub fn assign(&mut self, value: &Value) -> i32 {
        let id = self.next_id;
        self.next_id += 1;
        if let Some(key) = value.identity() {
            self.ids.insert(key, id);
        }
        id
    }

    pub fn keep_alive(&mut self, value: Value) {
        self.keep_alive.push(value);
    }
}

#[derive(Clone, Debug)]
enum Slot {
    /// Id reserved, no storage yet.
    Empty,
    /// Touched: storage exists but is still being filled.
    InProgress(Value),
    Filled(Value),
}

/// Object id table of a deserialization pass. Slot 0 is the null reference.
pub struct RefReader {
    slots: Vec<Slot>,
}

impl Default for RefReader {
    fn default() -> Self {
        RefReader {
            slots: vec![Slot::Filled(Value::Null)],
        }
    }
}

impl RefReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// First id not yet handed out.
    #[inline(always)]
    pub fn high_water_mark(&self) -> usize {
        self.slots.len()
    }

    /// Claims the next id for a new object.
    pub fn reserve(&mut self) -> usize {
        self.slots.push(Slot::Empty);
        self.slots.len() - 1
    }

    /// Publishes storage of an object before its content is read.
    pub fn touch(&mut self, id: usize, value: Value) {
        self.slots[id] = Slot::InProgress(value);
    }

    pub fn fill(&mut self, id: usize, value: Value) {
        self.slots[id] = Slot::Filled(value);
    }

    pub fn get(&self, id: usize) -> Result<Value, Error> {
        match self.slots.get(id) {
            Some(Slot::Filled(value)) | Some(Slot::InProgress(value)) => Ok(value.clone()),
            Some(Slot::Empty) => Err(Error::invalid_ref(format!(
                "object {} is referenced before it is constructed",
                id
            ))),
            None => Err(Error::invalid_ref(format!(
                "object {} referenced before its definition, next id is {}",
                id,
                self.slots.len()
            ))),
        }
    }
}
