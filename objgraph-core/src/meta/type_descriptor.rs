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

use crate::types::{PrimitiveKind, SYS_MODULE};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    Named {
        name: String,
        module: String,
        args: Vec<TypeDescriptor>,
    },
    Array {
        element: TypeDescriptor,
        rank: u8,
    },
}

/// Resolvable handle to a type: fully qualified name and module, plus the
/// generic arguments or array rank of constructed types.
///
/// Descriptors are cheap to clone and compare structurally, so two
/// registries describing the same type produce equal descriptors.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor(Arc<Shape>);

impl TypeDescriptor {
    /// Named type whose module is the part of `name` before the last dot.
    ///
    /// ```
    /// use objgraph_core::meta::TypeDescriptor;
    ///
    /// let desc = TypeDescriptor::named("shop.Order");
    /// assert_eq!(desc.module(), "shop");
    /// assert_eq!(TypeDescriptor::named("Order").module(), "");
    /// ```
    pub fn named(name: &str) -> TypeDescriptor {
        let module = name.rsplit_once('.').map(|(m, _)| m).unwrap_or("");
        TypeDescriptor::named_in(name, module)
    }

    pub fn named_in(name: &str, module: &str) -> TypeDescriptor {
        TypeDescriptor::generic(name, module, Vec::new())
    }

    pub fn generic(name: &str, module: &str, args: Vec<TypeDescriptor>) -> TypeDescriptor {
        TypeDescriptor(Arc::new(Shape::Named {
            name: name.to_owned(),
            module: module.to_owned(),
            args,
        }))
    }

    pub fn array(element: TypeDescriptor, rank: u8) -> TypeDescriptor {
        TypeDescriptor(Arc::new(Shape::Array { element, rank }))
    }

    pub fn primitive(kind: PrimitiveKind) -> TypeDescriptor {
        TypeDescriptor::named_in(kind.type_name(), SYS_MODULE)
    }

    pub fn string() -> TypeDescriptor {
        TypeDescriptor::primitive(PrimitiveKind::String)
    }

    pub fn object() -> TypeDescriptor {
        TypeDescriptor::named_in("sys.Object", SYS_MODULE)
    }

    pub fn list(element: TypeDescriptor) -> TypeDescriptor {
        TypeDescriptor::generic("sys.List", SYS_MODULE, vec![element])
    }

    pub fn queue(element: TypeDescriptor) -> TypeDescriptor {
        TypeDescriptor::generic("sys.Queue", SYS_MODULE, vec![element])
    }

    pub fn stack(element: TypeDescriptor) -> TypeDescriptor {
        TypeDescriptor::generic("sys.Stack", SYS_MODULE, vec![element])
    }

    pub fn hash_set(element: TypeDescriptor) -> TypeDescriptor {
        TypeDescriptor::generic("sys.HashSet", SYS_MODULE, vec![element])
    }

    pub fn dictionary(key: TypeDescriptor, value: TypeDescriptor) -> TypeDescriptor {
        TypeDescriptor::generic("sys.Dictionary", SYS_MODULE, vec![key, value])
    }

    pub fn read_only(element: TypeDescriptor) -> TypeDescriptor {
        TypeDescriptor::generic("sys.ReadOnlyCollection", SYS_MODULE, vec![element])
    }

    pub fn nullable(inner: TypeDescriptor) -> TypeDescriptor {
        TypeDescriptor::generic("sys.Nullable", SYS_MODULE, vec![inner])
    }

    /// The built-in multicast callback type.
    pub fn action() -> TypeDescriptor {
        TypeDescriptor::named_in("sys.Action", SYS_MODULE)
    }

    pub fn shape(&self) -> &Shape {
        &self.0
    }

    /// Name of a named type, or of the innermost element type of an array.
    pub fn name(&self) -> &str {
        match self.shape() {
            Shape::Named { name, .. } => name,
            Shape::Array { element, .. } => element.name(),
        }
    }

    pub fn module(&self) -> &str {
        match self.shape() {
            Shape::Named { module, .. } => module,
            Shape::Array { element, .. } => element.module(),
        }
    }

    pub fn args(&self) -> &[TypeDescriptor] {
        match self.shape() {
            Shape::Named { args, .. } => args,
            Shape::Array { .. } => &[],
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self.shape(), Shape::Array { .. })
    }

    pub fn is_generic(&self) -> bool {
        !self.args().is_empty()
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.shape() {
            Shape::Named { name, args, .. } => {
                f.write_str(name)?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            Shape::Array { element, rank } => {
                write!(f, "{}[", element)?;
                for _ in 1..*rank {
                    f.write_str(",")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]{}", self.module(), self)
    }
}
