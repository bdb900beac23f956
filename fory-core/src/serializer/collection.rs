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

//! Chunked list/set/map encoding (spec.md #4.H). The wire format allows the
//! encoder to split elements into any number of chunks as long as each
//! chunk's header correctly describes the elements inside it; this
//! implementation always emits one maximal chunk; the read side accepts any
//! valid partition a peer may have chosen instead.

use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::resolver::type_resolver::TypeResolver;
use crate::serializer::{ForyDefault, Serializer};

const CHUNK_HAS_SAME_TYPE: u8 = 1 << 0;
const CHUNK_HAS_NULL: u8 = 1 << 1;
const CHUNK_TRACK_REF: u8 = 1 << 2;
const CHUNK_DECLARED_TYPE_FINAL: u8 = 1 << 3;
const CHUNK_SIZE_SHIFT: u8 = 4;
const CHUNK_INLINE_SIZE_MAX: usize = 15;

/// Writes `varuint element_count` followed by a single chunk holding every
/// element, using `T`'s own serializer for the payload.
pub fn write_collection_data<T, I, It>(items: It, context: &mut WriteContext) -> Result<(), Error>
where
    T: Serializer,
    I: std::ops::Deref<Target = T>,
    It: ExactSizeIterator<Item = I>,
{
    let len = items.len();
    context.writer.var_uint32(len as u32);
    if len == 0 {
        return Ok(());
    }

    let mut flags = CHUNK_HAS_SAME_TYPE;
    if !T::fory_is_polymorphic() {
        flags |= CHUNK_DECLARED_TYPE_FINAL;
    }
    if T::fory_is_shared_ref() {
        flags |= CHUNK_TRACK_REF;
    }
    let has_null = T::fory_is_option();
    if has_null {
        flags |= CHUNK_HAS_NULL;
    }
    let inline_size = if len <= CHUNK_INLINE_SIZE_MAX { len } else { 0 };
    context
        .writer
        .u8(flags | ((inline_size as u8) << CHUNK_SIZE_SHIFT));
    if inline_size == 0 {
        context.writer.var_uint32(len as u32);
    }

    if !has_null {
        T::fory_write_type_info(context, false)?;
    }
    for item in items {
        if has_null {
            // `T` is `Option<U>`: each element carries its own ref flag,
            // so the chunk-level type info above is skipped.
            item.fory_write(context, true)?;
        } else {
            item.fory_write_data(context, false)?;
        }
    }
    Ok(())
}

/// Reads back what [`write_collection_data`] wrote, accepting any number of
/// chunks a differently-behaved peer may have emitted.
pub fn read_collection_data<T: Serializer + ForyDefault>(
    context: &mut ReadContext,
) -> Result<Vec<T>, Error> {
    let len = context.reader.var_uint32()? as usize;
    let mut out = Vec::with_capacity(len);
    let mut remaining = len;
    while remaining > 0 {
        let flags = context.reader.u8()?;
        let has_same_type = flags & CHUNK_HAS_SAME_TYPE != 0;
        let has_null = flags & CHUNK_HAS_NULL != 0;
        let inline_size = (flags >> CHUNK_SIZE_SHIFT) as usize;
        let chunk_len = if inline_size == 0 {
            context.reader.var_uint32()? as usize
        } else {
            inline_size
        };

        if has_same_type && !has_null {
            T::fory_read_type_info(context, false)?;
        }
        for _ in 0..chunk_len {
            if has_null {
                // `T` is `Option<U>`: each element carries its own ref
                // flag and reads itself fully, mirroring the write side.
                out.push(T::fory_read(context, true)?);
                continue;
            }
            if !has_same_type {
                T::fory_read_type_info(context, false)?;
            }
            out.push(T::fory_read_data(context, false)?);
        }
        remaining -= chunk_len;
    }
    Ok(out)
}

impl<T: ForyDefault> ForyDefault for Vec<T> {
    fn fory_default() -> Self {
        Vec::new()
    }
}

impl<T: Serializer + ForyDefault> Serializer for Vec<T> {
    fn fory_write_data(&self, context: &mut WriteContext, _is_field: bool) -> Result<(), Error> {
        write_collection_data::<T, _, _>(self.iter(), context)
    }

    fn fory_write_type_info(context: &mut WriteContext, is_field: bool) -> Result<(), Error> {
        crate::serializer::util::write_type_info::<Self>(context, is_field)
    }

    fn fory_read_data(context: &mut ReadContext, _is_field: bool) -> Result<Self, Error> {
        read_collection_data::<T>(context)
    }

    fn fory_read_type_info(context: &mut ReadContext, is_field: bool) -> Result<(), Error> {
        crate::serializer::util::read_type_info::<Self>(context, is_field)
    }

    fn fory_get_type_id(_type_resolver: &TypeResolver) -> Result<u32, Error> {
        Ok(crate::types::TypeId::LIST as u32)
    }

    fn fory_static_type_id() -> crate::types::TypeId {
        crate::types::TypeId::LIST
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl<T: Serializer + ForyDefault> crate::serializer::CollectionSerializer for Vec<T> {
    type Item = T;

    fn fory_iter(&self) -> Box<dyn Iterator<Item = &T> + '_> {
        Box::new(self.iter())
    }

    fn fory_from_vec(items: Vec<T>) -> Self {
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Reader;
    use crate::resolver::type_resolver::TypeResolver;

    #[test]
    fn round_trips_plain_vec() {
        let resolver = TypeResolver::new();
        let mut w = WriteContext::new(&resolver);
        let items = vec![1i32, 2, 3, 4];
        write_collection_data::<i32, _, _>(items.iter(), &mut w).unwrap();
        let bytes = w.writer.dump();
        let mut r = ReadContext::new(Reader::new(&bytes), &resolver);
        assert_eq!(read_collection_data::<i32>(&mut r).unwrap(), items);
    }

    #[test]
    fn round_trips_empty_vec() {
        let resolver = TypeResolver::new();
        let mut w = WriteContext::new(&resolver);
        write_collection_data::<i32, _, _>(Vec::<i32>::new().iter(), &mut w).unwrap();
        let bytes = w.writer.dump();
        let mut r = ReadContext::new(Reader::new(&bytes), &resolver);
        assert_eq!(read_collection_data::<i32>(&mut r).unwrap(), Vec::<i32>::new());
    }

    #[test]
    fn round_trips_large_vec_using_varuint_size() {
        let resolver = TypeResolver::new();
        let mut w = WriteContext::new(&resolver);
        let items: Vec<i32> = (0..100).collect();
        write_collection_data::<i32, _, _>(items.iter(), &mut w).unwrap();
        let bytes = w.writer.dump();
        let mut r = ReadContext::new(Reader::new(&bytes), &resolver);
        assert_eq!(read_collection_data::<i32>(&mut r).unwrap(), items);
    }

    #[test]
    fn vec_serializer_round_trips_strings() {
        let resolver = TypeResolver::new();
        let mut w = WriteContext::new(&resolver);
        let items = vec!["a".to_string(), "bb".to_string(), "ccc".to_string()];
        items.fory_write(&mut w, false).unwrap();
        let bytes = w.writer.dump();
        let mut r = ReadContext::new(Reader::new(&bytes), &resolver);
        assert_eq!(Vec::<String>::fory_read(&mut r, false).unwrap(), items);
    }

    #[test]
    fn vec_of_option_round_trips_including_none_elements() {
        let resolver = TypeResolver::new();
        let mut w = WriteContext::new(&resolver);
        let items: Vec<Option<i32>> = vec![Some(1), None, Some(3), None];
        items.fory_write(&mut w, false).unwrap();
        let bytes = w.writer.dump();
        let mut r = ReadContext::new(Reader::new(&bytes), &resolver);
        assert_eq!(
            Vec::<Option<i32>>::fory_read(&mut r, false).unwrap(),
            items
        );
    }
}
