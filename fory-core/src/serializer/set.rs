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
use crate::serializer::collection::{read_collection_data, write_collection_data};
use crate::serializer::util::{read_type_info, write_type_info};
use crate::serializer::{CollectionSerializer, ForyDefault, Serializer};
use crate::types::TypeId;
use std::any::Any;
use std::collections::{BTreeSet, HashSet};
use std::hash::Hash;

impl<T: ForyDefault> ForyDefault for HashSet<T> {
    fn fory_default() -> Self {
        HashSet::default()
    }
}

impl<T: Serializer + ForyDefault + Eq + Hash> Serializer for HashSet<T> {
    fn fory_write_data(&self, context: &mut WriteContext, _is_field: bool) -> Result<(), Error> {
        write_collection_data::<T, _, _>(self.iter(), context)
    }

    fn fory_write_type_info(context: &mut WriteContext, is_field: bool) -> Result<(), Error> {
        write_type_info::<Self>(context, is_field)
    }

    fn fory_read_data(context: &mut ReadContext, _is_field: bool) -> Result<Self, Error> {
        Ok(read_collection_data::<T>(context)?.into_iter().collect())
    }

    fn fory_read_type_info(context: &mut ReadContext, is_field: bool) -> Result<(), Error> {
        read_type_info::<Self>(context, is_field)
    }

    fn fory_get_type_id(_type_resolver: &TypeResolver) -> Result<u32, Error> {
        Ok(TypeId::SET as u32)
    }

    fn fory_static_type_id() -> TypeId {
        TypeId::SET
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<T: Serializer + ForyDefault + Eq + Hash> CollectionSerializer for HashSet<T> {
    type Item = T;

    fn fory_iter(&self) -> Box<dyn Iterator<Item = &T> + '_> {
        Box::new(self.iter())
    }

    fn fory_from_vec(items: Vec<T>) -> Self {
        items.into_iter().collect()
    }
}

impl<T: ForyDefault + Ord> ForyDefault for BTreeSet<T> {
    fn fory_default() -> Self {
        BTreeSet::new()
    }
}

impl<T: Serializer + ForyDefault + Ord> Serializer for BTreeSet<T> {
    fn fory_write_data(&self, context: &mut WriteContext, _is_field: bool) -> Result<(), Error> {
        write_collection_data::<T, _, _>(self.iter(), context)
    }

    fn fory_write_type_info(context: &mut WriteContext, is_field: bool) -> Result<(), Error> {
        write_type_info::<Self>(context, is_field)
    }

    fn fory_read_data(context: &mut ReadContext, _is_field: bool) -> Result<Self, Error> {
        Ok(read_collection_data::<T>(context)?.into_iter().collect())
    }

    fn fory_read_type_info(context: &mut ReadContext, is_field: bool) -> Result<(), Error> {
        read_type_info::<Self>(context, is_field)
    }

    fn fory_get_type_id(_type_resolver: &TypeResolver) -> Result<u32, Error> {
        Ok(TypeId::SET as u32)
    }

    fn fory_static_type_id() -> TypeId {
        TypeId::SET
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<T: Serializer + ForyDefault + Ord> CollectionSerializer for BTreeSet<T> {
    type Item = T;

    fn fory_iter(&self) -> Box<dyn Iterator<Item = &T> + '_> {
        Box::new(self.iter())
    }

    fn fory_from_vec(items: Vec<T>) -> Self {
        items.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Reader;

    #[test]
    fn hash_set_round_trips() {
        let resolver = TypeResolver::new();
        let mut w = WriteContext::new(&resolver);
        let mut set = HashSet::new();
        set.insert(1i32);
        set.insert(2i32);
        set.fory_write(&mut w, false).unwrap();
        let bytes = w.writer.dump();
        let mut r = ReadContext::new(Reader::new(&bytes), &resolver);
        assert_eq!(HashSet::<i32>::fory_read(&mut r, false).unwrap(), set);
    }

    #[test]
    fn btree_set_round_trips() {
        let resolver = TypeResolver::new();
        let mut w = WriteContext::new(&resolver);
        let set: BTreeSet<i32> = [3, 1, 2].into_iter().collect();
        set.fory_write(&mut w, false).unwrap();
        let bytes = w.writer.dump();
        let mut r = ReadContext::new(Reader::new(&bytes), &resolver);
        assert_eq!(BTreeSet::<i32>::fory_read(&mut r, false).unwrap(), set);
    }
}
