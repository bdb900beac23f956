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
use crate::types::RefFlag;
use std::any::Any;

impl<T: Serializer + ForyDefault> ForyDefault for Option<T> {
    fn fory_default() -> Self {
        None
    }
}

/// `Option<T>` always carries a ref-flag header (its whole purpose is
/// nullability), regardless of `is_field`.
impl<T: Serializer + ForyDefault> Serializer for Option<T> {
    fn fory_write(&self, context: &mut WriteContext, is_field: bool) -> Result<(), Error> {
        match self {
            None => {
                context.ref_writer.write_null(&mut context.writer);
                Ok(())
            }
            Some(v) => {
                context.ref_writer.write_non_ref_value(&mut context.writer, false);
                T::fory_write_type_info(context, is_field)?;
                v.fory_write_data(context, is_field)
            }
        }
    }

    fn fory_write_data(&self, context: &mut WriteContext, is_field: bool) -> Result<(), Error> {
        match self {
            None => Ok(()),
            Some(v) => v.fory_write_data(context, is_field),
        }
    }

    fn fory_read(context: &mut ReadContext, is_field: bool) -> Result<Self, Error> {
        let flag = context.ref_reader.read_ref_flag(&mut context.reader)?;
        match flag {
            RefFlag::Null => Ok(None),
            RefFlag::NotNullValue | RefFlag::RefValue => {
                T::fory_read_type_info(context, is_field)?;
                Ok(Some(T::fory_read_data(context, is_field)?))
            }
            RefFlag::Ref => Err(Error::InvalidData(
                "Option<T> does not support shared-reference back-references".into(),
            )),
        }
    }

    fn fory_read_data(context: &mut ReadContext, is_field: bool) -> Result<Self, Error> {
        Ok(Some(T::fory_read_data(context, is_field)?))
    }

    fn fory_get_type_id(type_resolver: &TypeResolver) -> Result<u32, Error> {
        T::fory_get_type_id(type_resolver)
    }

    fn fory_static_type_id() -> crate::types::TypeId {
        T::fory_static_type_id()
    }

    fn fory_is_polymorphic() -> bool {
        T::fory_is_polymorphic()
    }

    fn fory_is_option() -> bool {
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
    fn some_and_none_round_trip() {
        let resolver = TypeResolver::new();
        let mut w = WriteContext::new(&resolver);
        Some(7i32).fory_write(&mut w, false).unwrap();
        None::<i32>.fory_write(&mut w, false).unwrap();
        let bytes = w.writer.dump();
        let mut r = ReadContext::new(Reader::new(&bytes), &resolver);
        assert_eq!(Option::<i32>::fory_read(&mut r, false).unwrap(), Some(7));
        assert_eq!(Option::<i32>::fory_read(&mut r, false).unwrap(), None);
    }
}
