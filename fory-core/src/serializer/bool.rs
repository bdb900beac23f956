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

impl ForyDefault for bool {
    fn fory_default() -> Self {
        false
    }
}

impl ForyGeneralList for bool {}

impl Serializer for bool {
    fn fory_write_data(&self, context: &mut WriteContext, _is_field: bool) -> Result<(), Error> {
        context.writer.bool(*self);
        Ok(())
    }

    fn fory_read_data(context: &mut ReadContext, _is_field: bool) -> Result<Self, Error> {
        context.reader.bool()
    }

    fn fory_reserved_space() -> usize {
        1
    }

    fn fory_get_type_id(_type_resolver: &TypeResolver) -> Result<u32, Error> {
        Ok(TypeId::BOOL as u32)
    }

    fn fory_static_type_id() -> TypeId {
        TypeId::BOOL
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::type_resolver::TypeResolver;

    #[test]
    fn round_trips() {
        let resolver = TypeResolver::new();
        let mut w = WriteContext::new(&resolver);
        true.fory_write(&mut w, false).unwrap();
        false.fory_write(&mut w, false).unwrap();
        let bytes = w.writer.dump();
        let mut r = ReadContext::new(crate::buffer::Reader::new(&bytes), &resolver);
        assert!(bool::fory_read(&mut r, false).unwrap());
        assert!(!bool::fory_read(&mut r, false).unwrap());
    }
}
