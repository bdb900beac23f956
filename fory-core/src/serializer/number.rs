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
use crate::resolver::context::{ReadContext, WriteContext};
use crate::resolver::type_resolver::TypeResolver;
use crate::serializer::{ForyDefault, ForyGeneralList, Serializer};
use crate::types::TypeId;
use std::any::Any;

/// Plain Rust numeric types serialize as fixed-width little-endian values
/// (spec.md #4.G scenario S1), not the variable-length encodings. The
/// `Var*`/`Sli*`/`Tagged*` newtypes below give access to the compact wire
/// forms for callers that want them explicitly.
macro_rules! impl_fixed_num_serializer {
    ($ty:ty, $write:ident, $read:ident, $type_id:expr, $size:expr) => {
        impl ForyDefault for $ty {
            fn fory_default() -> Self {
                0 as $ty
            }
        }

        impl ForyGeneralList for $ty {}

        impl Serializer for $ty {
            fn fory_write_data(
                &self,
                context: &mut WriteContext,
                _is_field: bool,
            ) -> Result<(), Error> {
                context.writer.$write(*self);
                Ok(())
            }

            fn fory_read_data(context: &mut ReadContext, _is_field: bool) -> Result<Self, Error> {
                context.reader.$read()
            }

            fn fory_reserved_space() -> usize {
                $size
            }

            fn fory_get_type_id(_type_resolver: &TypeResolver) -> Result<u32, Error> {
                Ok($type_id as u32)
            }

            fn fory_static_type_id() -> TypeId {
                $type_id
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }
    };
}

impl_fixed_num_serializer!(i8, i8, i8, TypeId::INT8, 1);
impl_fixed_num_serializer!(i16, i16, i16, TypeId::INT16, 2);
impl_fixed_num_serializer!(i32, i32, i32, TypeId::INT32, 4);
impl_fixed_num_serializer!(i64, i64, i64, TypeId::INT64, 8);
impl_fixed_num_serializer!(u8, u8, u8, TypeId::UINT8, 1);
impl_fixed_num_serializer!(u16, u16, u16, TypeId::UINT16, 2);
impl_fixed_num_serializer!(u32, u32, u32, TypeId::UINT32, 4);
impl_fixed_num_serializer!(u64, u64, u64, TypeId::UINT64, 8);
impl_fixed_num_serializer!(f32, f32, f32, TypeId::FLOAT32, 4);
impl_fixed_num_serializer!(f64, f64, f64, TypeId::FLOAT64, 8);

macro_rules! impl_wide_num_serializer {
    ($ty:ty, $type_id:expr, $width:expr) => {
        impl ForyDefault for $ty {
            fn fory_default() -> Self {
                0
            }
        }

        impl ForyGeneralList for $ty {}

        impl Serializer for $ty {
            fn fory_write_data(
                &self,
                context: &mut WriteContext,
                _is_field: bool,
            ) -> Result<(), Error> {
                context.writer.bytes(&self.to_le_bytes());
                Ok(())
            }

            fn fory_read_data(context: &mut ReadContext, _is_field: bool) -> Result<Self, Error> {
                let slice = context.reader.bytes($width)?;
                let mut buf = [0u8; $width];
                buf.copy_from_slice(slice);
                Ok(<$ty>::from_le_bytes(buf))
            }

            fn fory_reserved_space() -> usize {
                $width
            }

            fn fory_get_type_id(_type_resolver: &TypeResolver) -> Result<u32, Error> {
                Ok($type_id as u32)
            }

            fn fory_static_type_id() -> TypeId {
                $type_id
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }
    };
}

impl_wide_num_serializer!(u128, TypeId::U128, 16);
impl_wide_num_serializer!(i128, TypeId::INT128, 16);

macro_rules! impl_pointer_width_num_serializer {
    ($ty:ty, $via:ty, $type_id:expr) => {
        impl ForyDefault for $ty {
            fn fory_default() -> Self {
                0
            }
        }

        impl ForyGeneralList for $ty {}

        impl Serializer for $ty {
            fn fory_write_data(
                &self,
                context: &mut WriteContext,
                _is_field: bool,
            ) -> Result<(), Error> {
                context.writer.bytes(&(*self as $via).to_le_bytes());
                Ok(())
            }

            fn fory_read_data(context: &mut ReadContext, _is_field: bool) -> Result<Self, Error> {
                let slice = context.reader.bytes(8)?;
                let mut buf = [0u8; 8];
                buf.copy_from_slice(slice);
                Ok(<$via>::from_le_bytes(buf) as $ty)
            }

            fn fory_reserved_space() -> usize {
                8
            }

            fn fory_get_type_id(_type_resolver: &TypeResolver) -> Result<u32, Error> {
                Ok($type_id as u32)
            }

            fn fory_static_type_id() -> TypeId {
                $type_id
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }
    };
}

impl_pointer_width_num_serializer!(usize, u64, TypeId::USIZE);
impl_pointer_width_num_serializer!(isize, i64, TypeId::ISIZE);

/// Newtype wrappers exposing the variable-length/compact wire encodings
/// that the built-in type id enum defines alongside the fixed-width ones
/// (spec.md #6). Plain `i32`/`u64`/... always use the fixed-width form;
/// wrap in one of these to opt into the compact form explicitly.
macro_rules! impl_var_num_serializer {
    ($wrapper:ident, $inner:ty, $write:ident, $read:ident, $type_id:expr) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub struct $wrapper(pub $inner);

        impl From<$inner> for $wrapper {
            fn from(v: $inner) -> Self {
                $wrapper(v)
            }
        }

        impl ForyDefault for $wrapper {
            fn fory_default() -> Self {
                $wrapper(Default::default())
            }
        }

        impl ForyGeneralList for $wrapper {}

        impl Serializer for $wrapper {
            fn fory_write_data(
                &self,
                context: &mut WriteContext,
                _is_field: bool,
            ) -> Result<(), Error> {
                context.writer.$write(self.0);
                Ok(())
            }

            fn fory_read_data(context: &mut ReadContext, _is_field: bool) -> Result<Self, Error> {
                Ok($wrapper(context.reader.$read()?))
            }

            fn fory_get_type_id(_type_resolver: &TypeResolver) -> Result<u32, Error> {
                Ok($type_id as u32)
            }

            fn fory_static_type_id() -> TypeId {
                $type_id
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }
    };
}

impl_var_num_serializer!(VarInt32, i32, var_int32, var_int32, TypeId::VAR_INT32);
impl_var_num_serializer!(VarUint32, u32, var_uint32, var_uint32, TypeId::VAR_UINT32);
impl_var_num_serializer!(VarInt64, i64, var_int64, var_int64, TypeId::VAR_INT64);
impl_var_num_serializer!(VarUint64, u64, var_uint64, var_uint64, TypeId::VAR_UINT64);
impl_var_num_serializer!(SliInt64, i64, sli_int64, sli_int64, TypeId::SLI_INT64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaggedU64(pub u64);

impl From<u64> for TaggedU64 {
    fn from(v: u64) -> Self {
        TaggedU64(v)
    }
}

impl ForyDefault for TaggedU64 {
    fn fory_default() -> Self {
        TaggedU64(0)
    }
}

impl ForyGeneralList for TaggedU64 {}

impl Serializer for TaggedU64 {
    fn fory_write_data(&self, context: &mut WriteContext, _is_field: bool) -> Result<(), Error> {
        context.writer.tagged_uint64(self.0)
    }

    fn fory_read_data(context: &mut ReadContext, _is_field: bool) -> Result<Self, Error> {
        Ok(TaggedU64(context.reader.tagged_uint64()?))
    }

    fn fory_get_type_id(_type_resolver: &TypeResolver) -> Result<u32, Error> {
        Ok(TypeId::TAGGED_UINT64 as u32)
    }

    fn fory_static_type_id() -> TypeId {
        TypeId::TAGGED_UINT64
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{Reader, Writer};
    use crate::resolver::type_resolver::TypeResolver;

    /// spec.md scenario S1: serialize(i32 = -12345) produces the literal
    /// little-endian two's-complement bytes, not a varint.
    #[test]
    fn i32_is_fixed_width_little_endian() {
        let resolver = TypeResolver::new();
        let mut w = WriteContext::new(&resolver);
        (-12345i32).fory_write_data(&mut w, true).unwrap();
        assert_eq!(w.writer.dump(), vec![0xC7, 0xCF, 0xFF, 0xFF]);
    }

    #[test]
    fn u128_round_trips() {
        let resolver = TypeResolver::new();
        let mut w = WriteContext::new(&resolver);
        let v: u128 = 0x0102030405060708090a0b0c0d0e0f10;
        v.fory_write_data(&mut w, true).unwrap();
        let bytes = w.writer.dump();
        let mut r = ReadContext::new(Reader::new(&bytes), &resolver);
        assert_eq!(u128::fory_read_data(&mut r, true).unwrap(), v);
    }

    #[test]
    fn var_wrapper_round_trips() {
        let resolver = TypeResolver::new();
        let mut w = WriteContext::new(&resolver);
        VarInt32(-12345).fory_write_data(&mut w, true).unwrap();
        let bytes = w.writer.dump();
        assert!(bytes.len() < 4);
        let mut r = ReadContext::new(Reader::new(&bytes), &resolver);
        assert_eq!(VarInt32::fory_read_data(&mut r, true).unwrap().0, -12345);
    }
}
