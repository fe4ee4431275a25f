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

use bitflags::bitflags;

/// How per-type procedures are obtained during a pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Method {
    /// Build a plan once per type and cache it in the [`ObjGraph`](crate::ObjGraph),
    /// sharing it with every later pass.
    #[default]
    Generated,
    /// Walk the type definition again for every object, nothing is cached.
    Reflection,
}

bitflags! {
    /// Categories of schema change accepted when reading a stream written
    /// against another shape of a type.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct VersionTolerance: u8 {
        /// Current type declares fields the stream does not carry.
        const FIELD_ADDITION = 0b0001;
        /// Stream carries fields the current type no longer declares.
        const FIELD_REMOVAL = 0b0010;
        /// Field moved between a class and one of its bases.
        const FIELD_MOVE = 0b0100;
        /// Classes inserted into, removed from or renamed within the inheritance chain.
        const INHERITANCE_CHAIN_CHANGE = 0b1000;
    }
}

/// Configuration shared by the [`ObjGraph`](crate::ObjGraph) instance and the
/// per-pass contexts.
#[derive(Clone, Debug)]
pub struct Config {
    pub write_method: Method,
    pub read_method: Method,
    pub version_tolerance: VersionTolerance,
    /// Write collections and dictionaries through their internal layout, as
    /// any other class, instead of element by element.
    pub treat_collections_as_user_objects: bool,
    /// Maximum nesting of objects and values during one pass. The native
    /// stack grows on demand up to this depth.
    pub max_depth: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            write_method: Method::Generated,
            read_method: Method::Generated,
            version_tolerance: VersionTolerance::empty(),
            treat_collections_as_user_objects: false,
            max_depth: 8192,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn allows(&self, tolerance: VersionTolerance) -> bool {
        self.version_tolerance.contains(tolerance)
    }

    #[inline(always)]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }
}
