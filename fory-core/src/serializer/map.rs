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

//! Map encoding (spec.md #4.H): the same chunk machinery as
//! [`collection`](super::collection) but with two parallel flag groups, one
//! for keys and one for values, since a chunk covers a run that shares both
//! a key type and a value type.

use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::resolver::type_resolver::TypeResolver;
use crate::serializer::util::{read_type_info, write_type_info};
use crate::serializer::{ForyDefault, MapSerializer, Serializer};
use crate::types::TypeId;
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

const FLAG_HAS_SAME_TYPE: u8 = 1 << 0;
const FLAG_DECLARED_TYPE_FINAL: u8 = 1 << 1;
const FLAG_TRACK_REF: u8 = 1 << 2;
const SIZE_SHIFT: u8 = 4;
const INLINE_SIZE_MAX: usize = 15;

const FLAG_HAS_NULL: u8 = 1 << 3;

fn entry_flags<T: Serializer>() -> u8 {
    let mut flags = FLAG_HAS_SAME_TYPE;
    if !T::fory_is_polymorphic() {
        flags |= FLAG_DECLARED_TYPE_FINAL;
    }
    if T::fory_is_shared_ref() {
        flags |= FLAG_TRACK_REF;
    }
    if T::fory_is_option() {
        flags |= FLAG_HAS_NULL;
    }
    flags
}

pub fn write_map_data<K, V>(
    pairs: impl ExactSizeIterator<Item = (K, V)>,
    context: &mut WriteContext,
) -> Result<(), Error>
where
    K: std::ops::Deref,
    K::Target: Serializer,
    V: std::ops::Deref,
    V::Target: Serializer,
{
    let len = pairs.len();
    context.writer.var_uint32(len as u32);
    if len == 0 {
        return Ok(());
    }

    let key_flags = entry_flags::<K::Target>();
    let value_flags = entry_flags::<V::Target>();
    let inline_size = if len <= INLINE_SIZE_MAX { len } else { 0 };
    context
        .writer
        .u8(key_flags | ((inline_size as u8) << SIZE_SHIFT));
    context.writer.u8(value_flags);
    if inline_size == 0 {
        context.writer.var_uint32(len as u32);
    }

    let value_has_null = value_flags & FLAG_HAS_NULL != 0;
    K::Target::fory_write_type_info(context, false)?;
    if !value_has_null {
        V::Target::fory_write_type_info(context, false)?;
    }
    for (k, v) in pairs {
        k.fory_write_data(context, false)?;
        if value_has_null {
            v.fory_write(context, true)?;
        } else {
            v.fory_write_data(context, false)?;
        }
    }
    Ok(())
}

pub fn read_map_data<K, V>(context: &mut ReadContext) -> Result<Vec<(K, V)>, Error>
where
    K: Serializer + ForyDefault,
    V: Serializer + ForyDefault,
{
    let len = context.reader.var_uint32()? as usize;
    let mut out = Vec::with_capacity(len);
    let mut remaining = len;
    while remaining > 0 {
        let key_flags = context.reader.u8()?;
        let value_flags = context.reader.u8()?;
        let value_has_null = value_flags & FLAG_HAS_NULL != 0;
        let inline_size = (key_flags >> SIZE_SHIFT) as usize;
        let chunk_len = if inline_size == 0 {
            context.reader.var_uint32()? as usize
        } else {
            inline_size
        };

        K::fory_read_type_info(context, false)?;
        if !value_has_null {
            V::fory_read_type_info(context, false)?;
        }
        for _ in 0..chunk_len {
            let k = K::fory_read_data(context, false)?;
            let v = if value_has_null {
                V::fory_read(context, true)?
            } else {
                V::fory_read_data(context, false)?
            };
            out.push((k, v));
        }
        remaining -= chunk_len;
    }
    Ok(out)
}

impl<K: ForyDefault, V: ForyDefault> ForyDefault for HashMap<K, V> {
    fn fory_default() -> Self {
        HashMap::default()
    }
}

impl<K: Serializer + ForyDefault + Eq + Hash, V: Serializer + ForyDefault> Serializer
    for HashMap<K, V>
{
    fn fory_write_data(&self, context: &mut WriteContext, _is_field: bool) -> Result<(), Error> {
        write_map_data(self.iter(), context)
    }

    fn fory_write_type_info(context: &mut WriteContext, is_field: bool) -> Result<(), Error> {
        write_type_info::<Self>(context, is_field)
    }

    fn fory_read_data(context: &mut ReadContext, _is_field: bool) -> Result<Self, Error> {
        Ok(read_map_data::<K, V>(context)?.into_iter().collect())
    }

    fn fory_read_type_info(context: &mut ReadContext, is_field: bool) -> Result<(), Error> {
        read_type_info::<Self>(context, is_field)
    }

    fn fory_get_type_id(_type_resolver: &TypeResolver) -> Result<u32, Error> {
        Ok(TypeId::MAP as u32)
    }

    fn fory_static_type_id() -> TypeId {
        TypeId::MAP
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<K: Serializer + ForyDefault + Eq + Hash, V: Serializer + ForyDefault> MapSerializer
    for HashMap<K, V>
{
    type Key = K;
    type Value = V;

    fn fory_iter(&self) -> Box<dyn Iterator<Item = (&K, &V)> + '_> {
        Box::new(self.iter())
    }

    fn fory_from_pairs(pairs: Vec<(K, V)>) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K: ForyDefault + Ord, V: ForyDefault> ForyDefault for BTreeMap<K, V> {
    fn fory_default() -> Self {
        BTreeMap::new()
    }
}

impl<K: Serializer + ForyDefault + Ord, V: Serializer + ForyDefault> Serializer
    for BTreeMap<K, V>
{
    fn fory_write_data(&self, context: &mut WriteContext, _is_field: bool) -> Result<(), Error> {
        write_map_data(self.iter(), context)
    }

    fn fory_write_type_info(context: &mut WriteContext, is_field: bool) -> Result<(), Error> {
        write_type_info::<Self>(context, is_field)
    }

    fn fory_read_data(context: &mut ReadContext, _is_field: bool) -> Result<Self, Error> {
        Ok(read_map_data::<K, V>(context)?.into_iter().collect())
    }

    fn fory_read_type_info(context: &mut ReadContext, is_field: bool) -> Result<(), Error> {
        read_type_info::<Self>(context, is_field)
    }

    fn fory_get_type_id(_type_resolver: &TypeResolver) -> Result<u32, Error> {
        Ok(TypeId::MAP as u32)
    }

    fn fory_static_type_id() -> TypeId {
        TypeId::MAP
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<K: Serializer + ForyDefault + Ord, V: Serializer + ForyDefault> MapSerializer
    for BTreeMap<K, V>
{
    type Key = K;
    type Value = V;

    fn fory_iter(&self) -> Box<dyn Iterator<Item = (&K, &V)> + '_> {
        Box::new(self.iter())
    }

    fn fory_from_pairs(pairs: Vec<(K, V)>) -> Self {
        pairs.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Reader;

    #[test]
    fn hash_map_round_trips() {
        let resolver = TypeResolver::new();
        let mut w = WriteContext::new(&resolver);
        let mut map = HashMap::new();
        map.insert("a".to_string(), 1i32);
        map.insert("b".to_string(), 2i32);
        map.fory_write(&mut w, false).unwrap();
        let bytes = w.writer.dump();
        let mut r = ReadContext::new(Reader::new(&bytes), &resolver);
        assert_eq!(
            HashMap::<String, i32>::fory_read(&mut r, false).unwrap(),
            map
        );
    }

    #[test]
    fn btree_map_round_trips() {
        let resolver = TypeResolver::new();
        let mut w = WriteContext::new(&resolver);
        let map: BTreeMap<i32, i32> = [(1, 10), (2, 20)].into_iter().collect();
        map.fory_write(&mut w, false).unwrap();
        let bytes = w.writer.dump();
        let mut r = ReadContext::new(Reader::new(&bytes), &resolver);
        assert_eq!(BTreeMap::<i32, i32>::fory_read(&mut r, false).unwrap(), map);
    }

    #[test]
    fn map_with_nullable_values_round_trips() {
        let resolver = TypeResolver::new();
        let mut w = WriteContext::new(&resolver);
        let mut map: HashMap<String, Option<i32>> = HashMap::new();
        map.insert("a".to_string(), Some(1));
        map.insert("b".to_string(), None);
        map.fory_write(&mut w, false).unwrap();
        let bytes = w.writer.dump();
        let mut r = ReadContext::new(Reader::new(&bytes), &resolver);
        assert_eq!(
            HashMap::<String, Option<i32>>::fory_read(&mut r, false).unwrap(),
            map
        );
    }

    #[test]
    fn empty_map_round_trips() {
        let resolver = TypeResolver::new();
        let mut w = WriteContext::new(&resolver);
        let map: HashMap<i32, i32> = HashMap::new();
        map.fory_write(&mut w, false).unwrap();
        let bytes = w.writer.dump();
        let mut r = ReadContext::new(Reader::new(&bytes), &resolver);
        assert_eq!(HashMap::<i32, i32>::fory_read(&mut r, false).unwrap(), map);
    }
}
