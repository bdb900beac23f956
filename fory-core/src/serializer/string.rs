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
use crate::meta::string_util::{buffer_rw_string, is_latin};
use crate::resolver::context::{ReadContext, WriteContext};
use crate::resolver::type_resolver::TypeResolver;
use crate::serializer::{ForyDefault, ForyGeneralList, Serializer};
use crate::types::TypeId;
use std::any::Any;

const SIZE_CLASS_LATIN1: u8 = 0;
const SIZE_CLASS_UTF16: u8 = 1;
const SIZE_CLASS_UTF8: u8 = 2;
const SMALL_LEN_MASK: u8 = 0x3F;
const SMALL_LEN_OVERFLOW: u8 = 0x3F;

impl ForyDefault for String {
    fn fory_default() -> Self {
        String::new()
    }
}

impl ForyGeneralList for String {}

impl Serializer for String {
    fn fory_write_data(&self, context: &mut WriteContext, _is_field: bool) -> Result<(), Error> {
        let (size_class, byte_len) = if is_latin(self) {
            (SIZE_CLASS_LATIN1, self.chars().count())
        } else {
            (SIZE_CLASS_UTF8, self.len())
        };

        if byte_len < SMALL_LEN_OVERFLOW as usize {
            context.writer.u8((size_class << 6) | byte_len as u8);
        } else {
            context.writer.u8((size_class << 6) | SMALL_LEN_OVERFLOW);
            context.writer.var_uint32(byte_len as u32);
        }

        match size_class {
            SIZE_CLASS_LATIN1 => buffer_rw_string::write_latin1(&mut context.writer, self),
            _ => buffer_rw_string::write_utf8(&mut context.writer, self),
        }
        Ok(())
    }

    fn fory_read_data(context: &mut ReadContext, _is_field: bool) -> Result<Self, Error> {
        let tag = context.reader.u8()?;
        let size_class = tag >> 6;
        let small_len = tag & SMALL_LEN_MASK;
        let len = if small_len == SMALL_LEN_OVERFLOW {
            context.reader.var_uint32()? as usize
        } else {
            small_len as usize
        };

        match size_class {
            SIZE_CLASS_LATIN1 => buffer_rw_string::read_latin1(&mut context.reader, len),
            SIZE_CLASS_UTF16 => buffer_rw_string::read_utf16(&mut context.reader, len),
            SIZE_CLASS_UTF8 => buffer_rw_string::read_utf8(&mut context.reader, len),
            other => Err(Error::InvalidData(format!(
                "unknown string size-class tag {other}"
            ))),
        }
    }

    fn fory_get_type_id(_type_resolver: &TypeResolver) -> Result<u32, Error> {
        Ok(TypeId::STRING as u32)
    }

    fn fory_static_type_id() -> TypeId {
        TypeId::STRING
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

    fn round_trip(s: &str) -> String {
        let resolver = TypeResolver::new();
        let mut w = WriteContext::new(&resolver);
        s.to_string().fory_write_data(&mut w, true).unwrap();
        let bytes = w.writer.dump();
        let mut r = ReadContext::new(Reader::new(&bytes), &resolver);
        String::fory_read_data(&mut r, true).unwrap()
    }

    #[test]
    fn latin1_fast_path_round_trips() {
        assert_eq!(round_trip("Hello, Fory!"), "Hello, Fory!");
    }

    #[test]
    fn utf8_round_trips() {
        assert_eq!(round_trip("héllo 世界"), "héllo 世界");
    }

    #[test]
    fn empty_string_round_trips() {
        assert_eq!(round_trip(""), "");
    }

    #[test]
    fn long_string_uses_varuint_length() {
        let s = "a".repeat(200);
        assert_eq!(round_trip(&s), s);
    }
}
