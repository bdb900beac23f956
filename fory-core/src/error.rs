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

use thiserror::Error as ThisError;

/// Every fallible operation in the crate returns this error type. The core
/// never logs (callers decide what to do with an error); each variant keeps
/// enough context to produce a useful message on its own.
#[derive(ThisError, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("unexpected end of buffer: needed {needed} bytes at offset {offset}, only {available} available")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("malformed varint: exceeded {max_bytes} bytes without a terminating byte")]
    MalformedVarint { max_bytes: usize },

    #[error("malformed input: {reason}")]
    MalformedInput { reason: String },

    #[error("type not registered: {description}")]
    UnregisteredType { description: String },

    #[error("schema hash mismatch for `{type_name}`: local {local:#x}, peer {peer:#x}")]
    SchemaHashMismatch {
        type_name: String,
        local: u32,
        peer: u32,
    },

    #[error("integer overflow: value {value} does not fit in declared width {width_bits} bits")]
    IntegerOverflow { value: i128, width_bits: u32 },

    #[error("invalid meta-string: {reason}")]
    InvalidMetaString { reason: String },

    #[error("invalid reference: ref-id {ref_id} not found (table holds {table_len} entries)")]
    InvalidReference { ref_id: u32, table_len: usize },

    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl Error {
    pub fn unexpected_eof(offset: usize, needed: usize, available: usize) -> Self {
        Error::UnexpectedEof {
            offset,
            needed,
            available,
        }
    }

    pub fn buffer_out_of_bound(offset: usize, needed: usize, available: usize) -> Self {
        Error::unexpected_eof(offset, needed, available)
    }

    pub fn malformed_varint(max_bytes: usize) -> Self {
        Error::MalformedVarint { max_bytes }
    }

    pub fn unregistered_type(description: impl Into<String>) -> Self {
        Error::UnregisteredType {
            description: description.into(),
        }
    }

    pub fn invalid_meta_string(reason: impl Into<String>) -> Self {
        Error::InvalidMetaString {
            reason: reason.into(),
        }
    }

    /// Alias used throughout the meta-string codec, where every failure is a
    /// malformed-encoding failure.
    pub fn encode_error(reason: impl Into<String>) -> Self {
        Error::invalid_meta_string(reason)
    }

    pub fn invalid_reference(ref_id: u32, table_len: usize) -> Self {
        Error::InvalidReference { ref_id, table_len }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Bails out of the current function with a `MalformedInput` error built from
/// a format string, mirroring the early-return style used throughout the
/// resolver and serializer modules.
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::error::Error::MalformedInput { reason: format!($($arg)*) })
    };
}

pub(crate) use bail;

/// `ensure!(cond, err)` returns `err` if `cond` is false, otherwise
/// evaluates to `()`. Used at validation points the way `assert!` is used
/// in non-fallible code.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !($cond) {
            return Err($err);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_context() {
        let e = Error::unexpected_eof(10, 4, 1);
        assert!(e.to_string().contains("offset 10"));
    }

    #[test]
    fn equality_for_retries_in_tests() {
        assert_eq!(Error::malformed_varint(5), Error::malformed_varint(5));
    }
}
