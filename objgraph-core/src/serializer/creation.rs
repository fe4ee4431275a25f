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

use crate::resolver::type_resolver::{TypeDef, TypeKind};
use crate::types::CreationWay;

/// Construction discipline of a type when it is read back.
///
/// Only `DefaultConstruct` and `AllocateUninitialized` objects exist before
/// their content is read and can therefore be the target of a cycle.
pub fn classify(def: &TypeDef, treat_collections_as_objects: bool) -> CreationWay {
    match def.kind() {
        TypeKind::Primitive(_)
        | TypeKind::Enum(_)
        | TypeKind::Struct(_)
        | TypeKind::Nullable(_)
        | TypeKind::Array { .. }
        | TypeKind::Delegate
        | TypeKind::ReadOnlyCollection { .. } => CreationWay::NoPrecreate,
        TypeKind::Collection(_) | TypeKind::Dictionary(_) => {
            if treat_collections_as_objects {
                CreationWay::AllocateUninitialized
            } else {
                CreationWay::DefaultConstruct
            }
        }
        TypeKind::Special(_) => CreationWay::DefaultConstruct,
        TypeKind::Class(_) => CreationWay::AllocateUninitialized,
    }
}
