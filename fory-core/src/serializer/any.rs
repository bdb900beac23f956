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

//! `Box<dyn Any>` as a polymorphic field/collection-element type: the
//! concrete type written on the wire can vary value-to-value, so unlike
//! every other [`Serializer`] impl in this crate, the leading type id is
//! folded into `fory_write_data`/`fory_read_data` rather than the
//! `fory_write_type_info` hook (which only has access to the static type,
//! not a value to inspect). Dispatch to the concrete type's own
//! `fory_write_data`/`fory_read_data` goes through the registry's
//! [`Harness`](crate::resolver::type_resolver::Harness) table, keyed by
//! the value's runtime [`std::any::TypeId`].

use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::resolver::type_resolver::TypeResolver;
use crate::serializer::{ForyDefault, Serializer};
use crate::types::TypeId;
use std::any::Any;

impl ForyDefault for Box<dyn Any> {
    fn fory_default() -> Self {
        Box::new(())
    }
}

impl Serializer for Box<dyn Any> {
    fn fory_write_data(&self, context: &mut WriteContext, _is_field: bool) -> Result<(), Error> {
        context.inc_depth()?;
        let rust_type = (**self).type_id();
        let type_id = context
            .type_resolver
            .get_type_id_by_rust_type_id(rust_type)
            .ok_or_else(|| {
                Error::InvalidData(
                    "value behind Box<dyn Any> was not registered with this Fory instance".into(),
                )
            })?;
        context.writer.var_uint32(type_id);
        let harness = context
            .type_resolver
            .get_harness_by_rust_type_id(rust_type)
            .ok_or_else(|| {
                Error::InvalidData(
                    "value behind Box<dyn Any> has no registered harness".into(),
                )
            })?;
        let write_fn = harness.get_write_data_fn();
        let result = write_fn(self.as_ref(), context, false);
        context.dec_depth();
        result
    }

    fn fory_write_type_info(_context: &mut WriteContext, _is_field: bool) -> Result<(), Error> {
        // The type id is value-dependent; written inline by `fory_write_data`.
        Ok(())
    }

    fn fory_read_data(context: &mut ReadContext, _is_field: bool) -> Result<Self, Error> {
        context.inc_depth()?;
        let type_id = context.reader.var_uint32()?;
        let harness = context
            .type_resolver
            .get_harness_by_id(type_id)
            .ok_or_else(|| {
                Error::InvalidData(format!(
                    "no harness registered for type id {type_id} found behind Box<dyn Any>"
                ))
            })?;
        let read_fn = harness.get_read_data_fn();
        let result = read_fn(context, false);
        context.dec_depth();
        result
    }

    fn fory_read_type_info(_context: &mut ReadContext, _is_field: bool) -> Result<(), Error> {
        Ok(())
    }

    fn fory_get_type_id(_type_resolver: &TypeResolver) -> Result<u32, Error> {
        Ok(TypeId::UNKNOWN as u32)
    }

    fn fory_type_id_dyn(&self, type_resolver: &TypeResolver) -> Result<u32, Error> {
        let rust_type = (**self).type_id();
        type_resolver
            .get_type_id_by_rust_type_id(rust_type)
            .ok_or_else(|| {
                Error::InvalidData(
                    "value behind Box<dyn Any> was not registered with this Fory instance".into(),
                )
            })
    }

    fn fory_static_type_id() -> TypeId {
        TypeId::UNKNOWN
    }

    fn fory_is_polymorphic() -> bool {
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
    fn round_trips_a_registered_concrete_type_behind_box_dyn_any() {
        let mut resolver = TypeResolver::new();
        resolver.register_serializer::<i32>(TypeId::INT32 as u32);

        let mut w = WriteContext::new(&resolver);
        let value: Box<dyn Any> = Box::new(7i32);
        value.fory_write(&mut w, false).unwrap();
        let bytes = w.writer.dump();

        let mut r = ReadContext::new(Reader::new(&bytes), &resolver);
        let decoded = <Box<dyn Any> as Serializer>::fory_read(&mut r, false).unwrap();
        assert_eq!(*decoded.downcast::<i32>().unwrap(), 7);
    }

    #[test]
    fn unregistered_type_fails_to_write() {
        let resolver = TypeResolver::new();
        let mut w = WriteContext::new(&resolver);
        let value: Box<dyn Any> = Box::new(7i32);
        assert!(value.fory_write(&mut w, false).is_err());
    }
}
