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
use crate::serializer::{ForyDefault, Serializer};
use crate::types::{RefFlag, TypeId};
use std::any::Any;
use std::rc::Rc;

impl<T: ForyDefault> ForyDefault for Rc<T> {
    fn fory_default() -> Self {
        Rc::new(T::fory_default())
    }
}

/// `Rc<T>` tracks identity (spec.md #11.2): a second occurrence of the same
/// allocation is written as a back-reference instead of being re-encoded.
impl<T: Serializer + ForyDefault + 'static> Serializer for Rc<T> {
    fn fory_write(&self, context: &mut WriteContext, is_field: bool) -> Result<(), Error> {
        if !context
            .ref_writer
            .try_write_rc_ref(&mut context.writer, self)
        {
            T::fory_write_type_info(context, is_field)?;
            T::fory_write_data(self.as_ref(), context, is_field)?;
        }
        Ok(())
    }

    fn fory_write_data(&self, context: &mut WriteContext, is_field: bool) -> Result<(), Error> {
        self.fory_write(context, is_field)
    }

    fn fory_write_type_info(context: &mut WriteContext, is_field: bool) -> Result<(), Error> {
        T::fory_write_type_info(context, is_field)
    }

    fn fory_read(context: &mut ReadContext, is_field: bool) -> Result<Self, Error> {
        let ref_flag = context.ref_reader.read_ref_flag(&mut context.reader)?;
        match ref_flag {
            RefFlag::Null => Err(Error::InvalidData("Rc<T> cannot be null".into())),
            RefFlag::Ref => {
                let ref_id = context.ref_reader.read_ref_id(&mut context.reader)?;
                context
                    .ref_reader
                    .get_rc_ref::<T>(ref_id)
                    .ok_or_else(|| Error::invalid_reference(ref_id, 0))
            }
            RefFlag::NotNullValue => {
                T::fory_read_type_info(context, is_field)?;
                let inner = T::fory_read_data(context, is_field)?;
                Ok(Rc::new(inner))
            }
            RefFlag::RefValue => {
                let ref_id = context.ref_reader.reserve_ref_id();
                T::fory_read_type_info(context, is_field)?;
                let inner = T::fory_read_data(context, is_field)?;
                let rc = Rc::new(inner);
                context.ref_reader.store_rc_ref_at(ref_id, rc.clone());
                Ok(rc)
            }
        }
    }

    fn fory_read_data(context: &mut ReadContext, is_field: bool) -> Result<Self, Error> {
        Self::fory_read(context, is_field)
    }

    fn fory_read_type_info(_context: &mut ReadContext, _is_field: bool) -> Result<(), Error> {
        Ok(())
    }

    fn fory_reserved_space() -> usize {
        4
    }

    fn fory_get_type_id(type_resolver: &TypeResolver) -> Result<u32, Error> {
        T::fory_get_type_id(type_resolver)
    }

    fn fory_type_id_dyn(&self, type_resolver: &TypeResolver) -> Result<u32, Error> {
        self.as_ref().fory_type_id_dyn(type_resolver)
    }

    fn fory_static_type_id() -> TypeId {
        T::fory_static_type_id()
    }

    fn fory_is_shared_ref() -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Reader;
    use crate::resolver::type_resolver::TypeResolver;

    #[test]
    fn shared_rc_written_once_and_deduped_on_read() {
        let resolver = TypeResolver::new();
        let mut w = WriteContext::new(&resolver);
        let shared = Rc::new(42i32);
        shared.fory_write(&mut w, false).unwrap();
        shared.fory_write(&mut w, false).unwrap();
        let bytes = w.writer.dump();

        let mut r = ReadContext::new(Reader::new(&bytes), &resolver);
        let a = Rc::<i32>::fory_read(&mut r, false).unwrap();
        let b = Rc::<i32>::fory_read(&mut r, false).unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(*a, 42);
    }
}
