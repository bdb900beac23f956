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

//! Dedicated fast path for arrays of numeric primitives (spec.md #4.H):
//! `varuint element_count` followed by one packed little-endian block, no
//! per-element chunk headers. `Vec<T>`'s own
//! [`Serializer`](crate::serializer::Serializer) impl always goes through
//! the general chunked [`collection`](super::collection) encoding so that a
//! single blanket `impl<T> Serializer for Vec<T>` stays possible; callers
//! that know their field is a primitive array (the `#[derive(ForyObject)]`
//! macro, in particular) call these functions directly instead to get the
//! compact encoding and the dedicated type id returned alongside it.

use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::types::TypeId;

macro_rules! impl_primitive_array {
    ($write_fn:ident, $read_fn:ident, $ty:ty, $write:ident, $read:ident, $type_id:expr) => {
        pub fn $write_fn(items: &[$ty], context: &mut WriteContext) -> Result<(), Error> {
            context.writer.var_uint32(items.len() as u32);
            for item in items {
                context.writer.$write(*item);
            }
            Ok(())
        }

        pub fn $read_fn(context: &mut ReadContext) -> Result<Vec<$ty>, Error> {
            let len = context.reader.var_uint32()? as usize;
            let mut out = Vec::with_capacity(len);
            for _ in 0..len {
                out.push(context.reader.$read()?);
            }
            Ok(out)
        }
    };
}

pub fn write_bool_array(items: &[bool], context: &mut WriteContext) -> Result<(), Error> {
    context.writer.var_uint32(items.len() as u32);
    for item in items {
        context.writer.bool(*item);
    }
    Ok(())
}

pub fn read_bool_array(context: &mut ReadContext) -> Result<Vec<bool>, Error> {
    let len = context.reader.var_uint32()? as usize;
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        out.push(context.reader.bool()?);
    }
    Ok(out)
}

pub const fn bool_array_type_id() -> TypeId {
    TypeId::BOOL_ARRAY
}

impl_primitive_array!(write_i8_array, read_i8_array, i8, i8, i8, int8_array_type_id);
impl_primitive_array!(
    write_i16_array,
    read_i16_array,
    i16,
    i16,
    i16,
    int16_array_type_id
);
impl_primitive_array!(
    write_i32_array,
    read_i32_array,
    i32,
    i32,
    i32,
    int32_array_type_id
);
impl_primitive_array!(
    write_i64_array,
    read_i64_array,
    i64,
    i64,
    i64,
    int64_array_type_id
);
impl_primitive_array!(write_u8_array, read_u8_array, u8, u8, u8, uint8_array_type_id);
impl_primitive_array!(
    write_u16_array,
    read_u16_array,
    u16,
    u16,
    u16,
    uint16_array_type_id
);
impl_primitive_array!(
    write_u32_array,
    read_u32_array,
    u32,
    u32,
    u32,
    uint32_array_type_id
);
impl_primitive_array!(
    write_u64_array,
    read_u64_array,
    u64,
    u64,
    u64,
    uint64_array_type_id
);
impl_primitive_array!(
    write_f32_array,
    read_f32_array,
    f32,
    f32,
    f32,
    float32_array_type_id
);
impl_primitive_array!(
    write_f64_array,
    read_f64_array,
    f64,
    f64,
    f64,
    float64_array_type_id
);

pub const fn int8_array_type_id() -> TypeId {
    TypeId::INT8_ARRAY
}
pub const fn int16_array_type_id() -> TypeId {
    TypeId::INT16_ARRAY
}
pub const fn int32_array_type_id() -> TypeId {
    TypeId::INT32_ARRAY
}
pub const fn int64_array_type_id() -> TypeId {
    TypeId::INT64_ARRAY
}
pub const fn uint8_array_type_id() -> TypeId {
    TypeId::UINT8_ARRAY
}
pub const fn uint16_array_type_id() -> TypeId {
    TypeId::UINT16_ARRAY
}
pub const fn uint32_array_type_id() -> TypeId {
    TypeId::UINT32_ARRAY
}
pub const fn uint64_array_type_id() -> TypeId {
    TypeId::UINT64_ARRAY
}
pub const fn float32_array_type_id() -> TypeId {
    TypeId::FLOAT32_ARRAY
}
pub const fn float64_array_type_id() -> TypeId {
    TypeId::FLOAT64_ARRAY
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Reader;
    use crate::resolver::type_resolver::TypeResolver;

    #[test]
    fn i32_array_round_trips_without_chunk_headers() {
        let resolver = TypeResolver::new();
        let mut w = WriteContext::new(&resolver);
        let items = vec![1i32, -2, 3, -4];
        write_i32_array(&items, &mut w).unwrap();
        let bytes = w.writer.dump();
        // varuint(4) + 4 * 4 bytes, no per-chunk flag byte.
        assert_eq!(bytes.len(), 1 + 16);
        let mut r = ReadContext::new(Reader::new(&bytes), &resolver);
        assert_eq!(read_i32_array(&mut r).unwrap(), items);
    }

    #[test]
    fn bool_array_round_trips() {
        let resolver = TypeResolver::new();
        let mut w = WriteContext::new(&resolver);
        let items = vec![true, false, true];
        write_bool_array(&items, &mut w).unwrap();
        let bytes = w.writer.dump();
        let mut r = ReadContext::new(Reader::new(&bytes), &resolver);
        assert_eq!(read_bool_array(&mut r).unwrap(), items);
    }
}
