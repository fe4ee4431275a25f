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

//! Error type shared by every layer of the engine.
//!
//! Error constructors sit on every buffer read and every type check, so they
//! are `#[cold]` and never inlined into the successful path.

use std::borrow::Cow;

use thiserror::Error;

/// Set `OBJGRAPH_PANIC_ON_ERROR` at compile time to panic where an error is created.
pub const PANIC_ON_ERROR: bool = option_env!("OBJGRAPH_PANIC_ON_ERROR").is_some();

/// Error type for serialization and deserialization passes.
///
/// Variants fall into four groups:
///
/// - configuration errors: [`Error::Configuration`], [`Error::UnresolvedType`]
/// - schema errors: [`Error::SchemaMismatch`], [`Error::TypeMismatch`]
/// - data errors: [`Error::BufferOutOfBound`], [`Error::InvalidData`], [`Error::InvalidRef`]
/// - user code errors: [`Error::Callback`], carried through untouched
///
/// Always build errors through the static constructor functions
/// (`Error::invalid_data(..)` rather than `Error::InvalidData(..)`), they
/// honour `OBJGRAPH_PANIC_ON_ERROR`:
///
/// ```bash
/// RUST_BACKTRACE=1 OBJGRAPH_PANIC_ON_ERROR=1 cargo test
/// ```
///
/// ```rust
/// use objgraph_core::error::Error;
///
/// let err = Error::invalid_data(format!("negative element count {}", -3));
/// assert_eq!(err.to_string(), "negative element count -3");
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Value does not fit the declared type of the slot it is written to.
    #[error("Type mismatch: expected {expected}, found {actual}")]
    TypeMismatch {
        expected: Cow<'static, str>,
        actual: Cow<'static, str>,
    },

    #[error("Buffer out of bound: {0} + {1} > {2}")]
    BufferOutOfBound(usize, usize, usize),

    /// Corrupted or malformed stream content.
    #[error("{0}")]
    InvalidData(Cow<'static, str>),

    /// Object id that does not denote a usable table slot.
    #[error("{0}")]
    InvalidRef(Cow<'static, str>),

    /// Type descriptor that the registry cannot resolve.
    #[error("Unresolved type: {0}")]
    UnresolvedType(Cow<'static, str>),

    #[error("{0}")]
    TypeError(Cow<'static, str>),

    /// Stream layout that cannot be reconciled with the current type shape.
    #[error("{0}")]
    SchemaMismatch(Cow<'static, str>),

    /// Inconsistent type or serializer setup, found while building a procedure.
    #[error("{0}")]
    Configuration(Cow<'static, str>),

    #[error("{0}")]
    DepthExceed(Cow<'static, str>),

    #[error("{0}")]
    NotAllowed(Cow<'static, str>),

    #[error("{0}")]
    Unknown(Cow<'static, str>),

    /// Error raised by a hook, a surrogate factory or the deserialization callback.
    #[error(transparent)]
    Callback(#[from] anyhow::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

macro_rules! message_constructors {
    ($($(#[$doc:meta])* $fn_name:ident => $variant:ident),+ $(,)?) => {
        $(
            $(#[$doc])*
            #[inline(always)]
            #[cold]
            #[track_caller]
            pub fn $fn_name<S: Into<Cow<'static, str>>>(s: S) -> Self {
                Error::$variant(s.into()).checked()
            }
        )+
    };
}

impl Error {
    #[inline(always)]
    #[track_caller]
    fn checked(self) -> Self {
        if PANIC_ON_ERROR {
            panic!("OBJGRAPH_PANIC_ON_ERROR: {}", self);
        }
        self
    }

    /// Creates a new [`Error::TypeMismatch`] for a value that does not fit its slot.
    ///
    /// ```
    /// use objgraph_core::error::Error;
    ///
    /// let err = Error::type_mismatch("sys.Int32", "sys.String");
    /// ```
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn type_mismatch<E, A>(expected: E, actual: A) -> Self
    where
        E: Into<Cow<'static, str>>,
        A: Into<Cow<'static, str>>,
    {
        Error::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
        .checked()
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn buffer_out_of_bound(offset: usize, length: usize, capacity: usize) -> Self {
        Error::BufferOutOfBound(offset, length, capacity).checked()
    }

    message_constructors! {
        /// Creates a new [`Error::InvalidData`].
        invalid_data => InvalidData,
        /// Creates a new [`Error::InvalidRef`].
        invalid_ref => InvalidRef,
        /// Creates a new [`Error::UnresolvedType`] naming the descriptor.
        unresolved_type => UnresolvedType,
        type_error => TypeError,
        /// Creates a new [`Error::SchemaMismatch`].
        schema_mismatch => SchemaMismatch,
        /// Creates a new [`Error::Configuration`].
        configuration => Configuration,
        depth_exceed => DepthExceed,
        not_allowed => NotAllowed,
        unknown => Unknown,
    }

    /// Wraps an error raised by user code. The original error stays reachable
    /// through [`anyhow::Error::downcast_ref`].
    #[inline(always)]
    #[cold]
    pub fn callback(err: anyhow::Error) -> Self {
        Error::Callback(err)
    }

    /// Whether the error was raised by user code rather than by the engine.
    pub fn is_callback(&self) -> bool {
        matches!(self, Error::Callback(_))
    }
}

/// Ensures a condition is true; otherwise returns an [`enum@Error`].
///
/// ```
/// use objgraph_core::ensure;
/// use objgraph_core::error::Error;
///
/// fn check_count(n: i32) -> Result<(), Error> {
///     ensure!(n >= 0, Error::invalid_data(format!("negative count {}", n)));
///     ensure!(n < 1 << 24, "count {} too large", n);
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $msg:literal) => {
        if !$cond {
            return Err($crate::error::Error::unknown($msg));
        }
    };
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            return Err($crate::error::Error::unknown(format!($fmt, $($arg)*)));
        }
    };
}

/// Returns early with an [`Error::Unknown`].
#[macro_export]
macro_rules! bail {
    ($err:expr) => {
        return Err($crate::error::Error::unknown($err))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::error::Error::unknown(format!($fmt, $($arg)*)))
    };
}

/// Returns early with an [`Error::NotAllowed`].
///
/// ```
/// use objgraph_core::not_allowed;
/// use objgraph_core::error::Error;
///
/// fn register_twice(name: &str) -> Result<(), Error> {
///     not_allowed!("type {} is already registered", name);
/// }
/// ```
#[macro_export]
macro_rules! not_allowed {
    ($err:expr) => {
        return Err($crate::error::Error::not_allowed($err))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::error::Error::not_allowed(format!($fmt, $($arg)*)))
    };
}
