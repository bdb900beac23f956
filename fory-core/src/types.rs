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

use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::mem;

#[allow(dead_code)]
pub enum StringFlag {
    LATIN1 = 0,
    UTF8 = 1,
    UTF16 = 2,
}

/// Signed 8-bit reference tags. Values fixed by the wire format: `NULL_FLAG`
/// marks a null root/field, `REF_FLAG` precedes a back-reference id,
/// `NOT_NULL_VALUE_FLAG` marks a non-null value with ref tracking disabled
/// for that slot, `REF_VALUE_FLAG` marks a first-seen, ref-tracked value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(i8)]
pub enum RefFlag {
    Null = -3,
    Ref = -1,
    NotNullValue = -2,
    RefValue = 0,
}

/// Controls how reference and null flags are handled during serialization.
///
/// Combines nullable semantics and reference tracking into one parameter so
/// callers can configure it per type and per field:
/// - `None` = non-nullable, no ref tracking (primitives)
/// - `NullOnly` = nullable, no circular ref tracking
/// - `Tracking` = nullable, with circular ref tracking (Rc/Arc/Weak)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum RefMode {
    #[default]
    None = 0,
    NullOnly = 1,
    Tracking = 2,
}

impl RefMode {
    #[inline]
    pub const fn from_flags(nullable: bool, track_ref: bool) -> Self {
        match (nullable, track_ref) {
            (false, false) => RefMode::None,
            (true, false) => RefMode::NullOnly,
            (_, true) => RefMode::Tracking,
        }
    }

    #[inline]
    pub const fn has_ref_flag(self) -> bool {
        !matches!(self, RefMode::None)
    }

    #[inline]
    pub const fn tracks_refs(self) -> bool {
        matches!(self, RefMode::Tracking)
    }

    #[inline]
    pub const fn is_nullable(self) -> bool {
        !matches!(self, RefMode::None)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[allow(non_camel_case_types)]
#[repr(u8)]
pub enum TypeId {
    UNKNOWN = 0,
    BOOL = 1,
    INT8 = 2,
    INT16 = 3,
    INT32 = 4,
    VAR_INT32 = 5,
    INT64 = 6,
    VAR_INT64 = 7,
    SLI_INT64 = 8,
    UINT8 = 9,
    UINT16 = 10,
    UINT32 = 11,
    VAR_UINT32 = 12,
    UINT64 = 13,
    VAR_UINT64 = 14,
    TAGGED_UINT64 = 15,
    FLOAT8 = 16,
    FLOAT16 = 17,
    BFLOAT16 = 18,
    FLOAT32 = 19,
    FLOAT64 = 20,
    STRING = 21,
    LIST = 22,
    SET = 23,
    MAP = 24,
    ENUM = 25,
    NAMED_ENUM = 26,
    STRUCT = 27,
    COMPATIBLE_STRUCT = 28,
    NAMED_STRUCT = 29,
    NAMED_COMPATIBLE_STRUCT = 30,
    EXT = 31,
    NAMED_EXT = 32,
    // A tagged union value whose schema identity is not embedded.
    UNION = 33,
    // A union value with embedded numeric union type ID.
    TYPED_UNION = 34,
    // A union value with embedded union type name.
    NAMED_UNION = 35,
    NONE = 36,
    DURATION = 37,
    TIMESTAMP = 38,
    DATE = 39,
    DECIMAL = 40,
    BINARY = 41,
    ARRAY = 42,
    BOOL_ARRAY = 43,
    INT8_ARRAY = 44,
    INT16_ARRAY = 45,
    INT32_ARRAY = 46,
    INT64_ARRAY = 47,
    UINT8_ARRAY = 48,
    UINT16_ARRAY = 49,
    UINT32_ARRAY = 50,
    UINT64_ARRAY = 51,
    FLOAT8_ARRAY = 52,
    FLOAT16_ARRAY = 53,
    BFLOAT16_ARRAY = 54,
    FLOAT32_ARRAY = 55,
    FLOAT64_ARRAY = 56,
    // Rust-specific types, not part of the xlang enum (SPEC_FULL.md #11.1).
    U128 = 64,
    INT128 = 65,
    // USIZE/ISIZE need their own ids: usize and u64 are the same width on
    // 64-bit targets but distinct Rust types, and downcasting a `Box<dyn
    // Any>` round trip needs the exact type back.
    USIZE = 66,
    ISIZE = 67,
    U128_ARRAY = 68,
    INT128_ARRAY = 69,
    USIZE_ARRAY = 70,
    ISIZE_ARRAY = 71,
    // Types with id >= BOUND are user-assigned, not internal.
    BOUND = 72,
}

pub const BOOL: u32 = TypeId::BOOL as u32;
pub const INT8: u32 = TypeId::INT8 as u32;
pub const INT16: u32 = TypeId::INT16 as u32;
pub const INT32: u32 = TypeId::INT32 as u32;
pub const VAR_INT32: u32 = TypeId::VAR_INT32 as u32;
pub const INT64: u32 = TypeId::INT64 as u32;
pub const VAR_INT64: u32 = TypeId::VAR_INT64 as u32;
pub const SLI_INT64: u32 = TypeId::SLI_INT64 as u32;
pub const UINT8: u32 = TypeId::UINT8 as u32;
pub const UINT16: u32 = TypeId::UINT16 as u32;
pub const UINT32: u32 = TypeId::UINT32 as u32;
pub const VAR_UINT32: u32 = TypeId::VAR_UINT32 as u32;
pub const UINT64: u32 = TypeId::UINT64 as u32;
pub const VAR_UINT64: u32 = TypeId::VAR_UINT64 as u32;
pub const TAGGED_UINT64: u32 = TypeId::TAGGED_UINT64 as u32;
pub const FLOAT8: u32 = TypeId::FLOAT8 as u32;
pub const FLOAT16: u32 = TypeId::FLOAT16 as u32;
pub const BFLOAT16: u32 = TypeId::BFLOAT16 as u32;
pub const FLOAT32: u32 = TypeId::FLOAT32 as u32;
pub const FLOAT64: u32 = TypeId::FLOAT64 as u32;
pub const STRING: u32 = TypeId::STRING as u32;
pub const ENUM: u32 = TypeId::ENUM as u32;
pub const NAMED_ENUM: u32 = TypeId::NAMED_ENUM as u32;
pub const STRUCT: u32 = TypeId::STRUCT as u32;
pub const COMPATIBLE_STRUCT: u32 = TypeId::COMPATIBLE_STRUCT as u32;
pub const NAMED_STRUCT: u32 = TypeId::NAMED_STRUCT as u32;
pub const NAMED_COMPATIBLE_STRUCT: u32 = TypeId::NAMED_COMPATIBLE_STRUCT as u32;
pub const EXT: u32 = TypeId::EXT as u32;
pub const NAMED_EXT: u32 = TypeId::NAMED_EXT as u32;
pub const LIST: u32 = TypeId::LIST as u32;
pub const SET: u32 = TypeId::SET as u32;
pub const MAP: u32 = TypeId::MAP as u32;
pub const DURATION: u32 = TypeId::DURATION as u32;
pub const TIMESTAMP: u32 = TypeId::TIMESTAMP as u32;
pub const DATE: u32 = TypeId::DATE as u32;
pub const DECIMAL: u32 = TypeId::DECIMAL as u32;
pub const BINARY: u32 = TypeId::BINARY as u32;
pub const ARRAY: u32 = TypeId::ARRAY as u32;
pub const BOOL_ARRAY: u32 = TypeId::BOOL_ARRAY as u32;
pub const INT8_ARRAY: u32 = TypeId::INT8_ARRAY as u32;
pub const INT16_ARRAY: u32 = TypeId::INT16_ARRAY as u32;
pub const INT32_ARRAY: u32 = TypeId::INT32_ARRAY as u32;
pub const INT64_ARRAY: u32 = TypeId::INT64_ARRAY as u32;
pub const UINT8_ARRAY: u32 = TypeId::UINT8_ARRAY as u32;
pub const UINT16_ARRAY: u32 = TypeId::UINT16_ARRAY as u32;
pub const UINT32_ARRAY: u32 = TypeId::UINT32_ARRAY as u32;
pub const UINT64_ARRAY: u32 = TypeId::UINT64_ARRAY as u32;
pub const FLOAT8_ARRAY: u32 = TypeId::FLOAT8_ARRAY as u32;
pub const FLOAT16_ARRAY: u32 = TypeId::FLOAT16_ARRAY as u32;
pub const BFLOAT16_ARRAY: u32 = TypeId::BFLOAT16_ARRAY as u32;
pub const FLOAT32_ARRAY: u32 = TypeId::FLOAT32_ARRAY as u32;
pub const FLOAT64_ARRAY: u32 = TypeId::FLOAT64_ARRAY as u32;
pub const UNION: u32 = TypeId::UNION as u32;
pub const TYPED_UNION: u32 = TypeId::TYPED_UNION as u32;
pub const NAMED_UNION: u32 = TypeId::NAMED_UNION as u32;
pub const NONE: u32 = TypeId::NONE as u32;
pub const U128: u32 = TypeId::U128 as u32;
pub const INT128: u32 = TypeId::INT128 as u32;
pub const USIZE: u32 = TypeId::USIZE as u32;
pub const ISIZE: u32 = TypeId::ISIZE as u32;
pub const U128_ARRAY: u32 = TypeId::U128_ARRAY as u32;
pub const INT128_ARRAY: u32 = TypeId::INT128_ARRAY as u32;
pub const USIZE_ARRAY: u32 = TypeId::USIZE_ARRAY as u32;
pub const ISIZE_ARRAY: u32 = TypeId::ISIZE_ARRAY as u32;
pub const UNKNOWN: u32 = TypeId::UNKNOWN as u32;
pub const BOUND: u32 = TypeId::BOUND as u32;

/// User-assigned numeric type ids start here (spec.md #6).
pub const USER_TYPE_ID_START: u32 = 256;

/// ENUM, NAMED_ENUM and UNION are all treated as enum-shaped for schema
/// hashing purposes: Rust data-carrying enums serialize as unions, but
/// schema hashing needs to treat both forms as nullable the same way a
/// host-language enum reference type would be.
#[inline]
pub const fn is_enum_type_id(type_id: TypeId) -> bool {
    matches!(type_id, TypeId::ENUM | TypeId::NAMED_ENUM | TypeId::UNION)
}

const MAX_UINT32: u64 = (1 << 31) - 1;

pub fn compute_string_hash(s: &str) -> u32 {
    let mut hash: u64 = 17;
    s.as_bytes().iter().for_each(|b| {
        hash = (hash * 31) + (*b as u64);
        while hash >= MAX_UINT32 {
            hash /= 7;
        }
    });
    hash as u32
}

pub fn compute_field_hash(hash: u32, id: i16) -> u32 {
    let mut new_hash: u64 = (hash as u64) * 31 + (id as u64);
    while new_hash >= MAX_UINT32 {
        new_hash /= 7;
    }
    new_hash as u32
}

pub mod config_flags {
    pub const IS_NULL_FLAG: u8 = 1 << 0;
    pub const IS_LITTLE_ENDIAN_FLAG: u8 = 1 << 1;
    pub const IS_CROSS_LANGUAGE_FLAG: u8 = 1 << 2;
    pub const IS_OUT_OF_BAND_FLAG: u8 = 1 << 3;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Peers agree on the field list; wire omits field-level metadata.
    SchemaConsistent,
    /// Peers may add/delete/reorder fields independently; TypeMeta carries
    /// enough information to skip fields the local schema doesn't know.
    Compatible,
}

/// Every referenceable value starts with an `i8` ref flag and (when the type
/// isn't final) an `i16`-ish type marker; this is the fixed overhead used by
/// size estimation in the serializer layer.
pub const SIZE_OF_REF_AND_TYPE: usize = mem::size_of::<i8>() + mem::size_of::<i16>();

/// Keep as const fn for compile-time evaluation/constant folding.
#[inline(always)]
pub const fn is_primitive_type_id(type_id: TypeId) -> bool {
    matches!(
        type_id,
        TypeId::BOOL
            | TypeId::INT8
            | TypeId::INT16
            | TypeId::INT32
            | TypeId::INT64
            | TypeId::UINT8
            | TypeId::UINT16
            | TypeId::UINT32
            | TypeId::UINT64
            | TypeId::FLOAT8
            | TypeId::FLOAT16
            | TypeId::BFLOAT16
            | TypeId::FLOAT32
            | TypeId::FLOAT64
            | TypeId::U128
            | TypeId::INT128
            | TypeId::USIZE
            | TypeId::ISIZE
    )
}

/// Internal types are all types in `0 < id < BOUND` that are not
/// struct/ext/enum/union types.
#[inline(always)]
pub const fn is_internal_type(type_id: u32) -> bool {
    if type_id == UNKNOWN || type_id >= BOUND {
        return false;
    }
    !matches!(
        type_id,
        ENUM | NAMED_ENUM
            | STRUCT
            | COMPATIBLE_STRUCT
            | NAMED_STRUCT
            | NAMED_COMPATIBLE_STRUCT
            | EXT
            | NAMED_EXT
            | UNION
            | TYPED_UNION
            | NAMED_UNION
    )
}

/// Only user-defined types (struct/ext/union/unknown) carry type info on the
/// wire in compatible mode; internal types (primitives, strings,
/// collections) never do.
#[inline(always)]
pub const fn need_to_write_type_for_field(type_id: TypeId) -> bool {
    matches!(
        type_id,
        TypeId::STRUCT
            | TypeId::COMPATIBLE_STRUCT
            | TypeId::NAMED_STRUCT
            | TypeId::NAMED_COMPATIBLE_STRUCT
            | TypeId::EXT
            | TypeId::NAMED_EXT
            | TypeId::UNION
            | TypeId::TYPED_UNION
            | TypeId::NAMED_UNION
            | TypeId::UNKNOWN
    )
}

#[inline(always)]
pub const fn is_user_type(type_id: u32) -> bool {
    matches!(
        type_id,
        ENUM | NAMED_ENUM
            | UNION
            | TYPED_UNION
            | NAMED_UNION
            | STRUCT
            | COMPATIBLE_STRUCT
            | NAMED_STRUCT
            | NAMED_COMPATIBLE_STRUCT
            | EXT
            | NAMED_EXT
    )
}

#[inline(always)]
pub const fn needs_user_type_id(type_id: u32) -> bool {
    matches!(
        type_id,
        ENUM | STRUCT | COMPATIBLE_STRUCT | EXT | TYPED_UNION
    )
}

/// Returns the internal type id for extension types.
pub fn get_ext_actual_type_id(_type_id: u32, register_by_name: bool) -> u32 {
    if register_by_name {
        TypeId::NAMED_EXT as u32
    } else {
        TypeId::EXT as u32
    }
}

/// Formats a type id into a human-readable string, used in error messages.
pub fn format_type_id(type_id: u32) -> String {
    let name = TypeId::try_from(type_id as u8)
        .map(|t| format!("{t:?}"))
        .unwrap_or_else(|_| format!("USER({type_id})"));
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ref_flag_values_match_wire_contract() {
        assert_eq!(RefFlag::Null as i8, -3);
        assert_eq!(RefFlag::Ref as i8, -1);
        assert_eq!(RefFlag::NotNullValue as i8, -2);
        assert_eq!(RefFlag::RefValue as i8, 0);
    }

    #[test]
    fn ref_mode_from_flags() {
        assert_eq!(RefMode::from_flags(false, false), RefMode::None);
        assert_eq!(RefMode::from_flags(true, false), RefMode::NullOnly);
        assert_eq!(RefMode::from_flags(true, true), RefMode::Tracking);
        assert_eq!(RefMode::from_flags(false, true), RefMode::Tracking);
    }

    #[test]
    fn internal_type_excludes_user_types() {
        assert!(is_internal_type(BOOL));
        assert!(!is_internal_type(STRUCT));
        assert!(!is_internal_type(UNKNOWN));
        assert!(!is_internal_type(BOUND));
    }

    #[test]
    fn format_type_id_known_and_unknown() {
        assert_eq!(format_type_id(BOOL), "BOOL");
        assert_eq!(format_type_id(300), "USER(300)");
    }
}
