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

//! Skips a field's payload without decoding it into any Rust type, driven
//! purely by its `FieldType` descriptor (spec.md #4.I): a peer's compatible
//! struct may carry fields the local schema has since dropped, and those
//! bytes still need to be consumed in order to keep the cursor aligned for
//! the fields that follow.

use crate::buffer::Reader;
use crate::error::Error;
use crate::meta::FieldType;
use crate::resolver::context::ReadContext;
use crate::types::{RefFlag, TypeId};

fn skip_fixed(reader: &mut Reader, width: usize) -> Result<(), Error> {
    reader.skip(width)
}

/// Skips one value's ref flag and payload given its declared `FieldType`.
/// Nested collection/map/struct values are walked recursively so the
/// skip stays correct regardless of how deep the unknown field's schema is.
pub fn skip_field(context: &mut ReadContext, field_type: &FieldType) -> Result<(), Error> {
    let skip_ref_flag = crate::serializer::util::get_skip_ref_flag(field_type.type_id);
    if !skip_ref_flag {
        let flag = context.ref_reader.read_ref_flag(&mut context.reader)?;
        if flag == RefFlag::Null {
            return Ok(());
        }
        if flag == RefFlag::Ref {
            let _ = context.reader.var_uint32()?;
            return Ok(());
        }
    }
    skip_value(context, field_type)
}

fn skip_value(context: &mut ReadContext, field_type: &FieldType) -> Result<(), Error> {
    let type_id = TypeId::try_from(field_type.type_id as u8).ok();
    match type_id {
        Some(TypeId::BOOL | TypeId::INT8 | TypeId::UINT8) => skip_fixed(&mut context.reader, 1),
        Some(TypeId::INT16 | TypeId::UINT16) => skip_fixed(&mut context.reader, 2),
        Some(TypeId::INT32 | TypeId::UINT32 | TypeId::FLOAT32) => {
            skip_fixed(&mut context.reader, 4)
        }
        Some(TypeId::INT64 | TypeId::UINT64 | TypeId::FLOAT64) => {
            skip_fixed(&mut context.reader, 8)
        }
        Some(TypeId::U128 | TypeId::INT128) => skip_fixed(&mut context.reader, 16),
        Some(TypeId::VAR_INT32) => {
            context.reader.var_int32()?;
            Ok(())
        }
        Some(TypeId::VAR_INT64) => {
            context.reader.var_int64()?;
            Ok(())
        }
        Some(TypeId::SLI_INT64) => {
            context.reader.sli_int64()?;
            Ok(())
        }
        Some(TypeId::VAR_UINT32) => {
            context.reader.var_uint32()?;
            Ok(())
        }
        Some(TypeId::VAR_UINT64) => {
            context.reader.var_uint64()?;
            Ok(())
        }
        Some(TypeId::TAGGED_UINT64) => {
            context.reader.tagged_uint64()?;
            Ok(())
        }
        Some(TypeId::STRING | TypeId::BINARY) => {
            let tag = context.reader.u8()?;
            let small_len = (tag & 0x3f) as usize;
            let len = if small_len == 0x3f {
                context.reader.var_uint32()? as usize
            } else {
                small_len
            };
            context.reader.skip(len)
        }
        Some(TypeId::DATE) => skip_fixed(&mut context.reader, 4),
        Some(TypeId::TIMESTAMP) => skip_fixed(&mut context.reader, 8),
        Some(TypeId::LIST | TypeId::SET | TypeId::ARRAY) => skip_collection(context, field_type),
        Some(TypeId::MAP) => skip_map(context, field_type),
        _ => Err(Error::InvalidData(format!(
            "cannot skip unknown field of type id {}",
            field_type.type_id
        ))),
    }
}

fn skip_collection(context: &mut ReadContext, field_type: &FieldType) -> Result<(), Error> {
    let element = field_type.generics.first().cloned().unwrap_or_else(|| {
        crate::meta::FieldType::new(TypeId::UNKNOWN as u32)
    });
    let len = context.reader.var_uint32()? as usize;
    let mut remaining = len;
    while remaining > 0 {
        let flags = context.reader.u8()?;
        const HAS_NULL: u8 = 1 << 1;
        let inline_size = (flags >> 4) as usize;
        let chunk_size = if inline_size == 0 {
            context.reader.var_uint32()? as usize
        } else {
            inline_size
        };
        for _ in 0..chunk_size {
            if flags & HAS_NULL != 0 {
                let flag = context.ref_reader.read_ref_flag(&mut context.reader)?;
                if flag == RefFlag::Null {
                    continue;
                }
                if flag == RefFlag::Ref {
                    let _ = context.reader.var_uint32()?;
                    continue;
                }
            }
            skip_value(context, &element)?;
        }
        remaining = remaining.saturating_sub(chunk_size.max(1));
        if chunk_size == 0 {
            break;
        }
    }
    Ok(())
}

fn skip_map(context: &mut ReadContext, field_type: &FieldType) -> Result<(), Error> {
    let key_type = field_type
        .generics
        .first()
        .cloned()
        .unwrap_or_else(|| crate::meta::FieldType::new(TypeId::UNKNOWN as u32));
    let value_type = field_type
        .generics
        .get(1)
        .cloned()
        .unwrap_or_else(|| crate::meta::FieldType::new(TypeId::UNKNOWN as u32));
    let len = context.reader.var_uint32()? as usize;
    let mut remaining = len;
    while remaining > 0 {
        let key_flags = context.reader.u8()?;
        let value_flags = context.reader.u8()?;
        const HAS_NULL: u8 = 1 << 3;
        let inline_size = (key_flags >> 4) as usize;
        let chunk_size = if inline_size == 0 {
            context.reader.var_uint32()? as usize
        } else {
            inline_size
        };
        for _ in 0..chunk_size {
            skip_value(context, &key_type)?;
            if value_flags & HAS_NULL != 0 {
                let flag = context.ref_reader.read_ref_flag(&mut context.reader)?;
                if flag == RefFlag::Null {
                    continue;
                }
                if flag == RefFlag::Ref {
                    let _ = context.reader.var_uint32()?;
                    continue;
                }
            }
            skip_value(context, &value_type)?;
        }
        remaining = remaining.saturating_sub(chunk_size.max(1));
        if chunk_size == 0 {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Writer;
    use crate::resolver::type_resolver::TypeResolver;

    #[test]
    fn skips_a_plain_non_nullable_int32_field() {
        let resolver = TypeResolver::new();
        let mut writer = Writer::new();
        writer.i32(42);
        writer.u8(7); // next field's byte, to prove the cursor lands right after
        let bytes = writer.dump();
        let mut ctx = ReadContext::new(Reader::new(&bytes), &resolver);
        let ft = FieldType::new(TypeId::INT32 as u32);
        skip_field(&mut ctx, &ft).unwrap();
        assert_eq!(ctx.reader.u8().unwrap(), 7);
    }

    #[test]
    fn skips_a_nullable_string_field_marked_null() {
        let resolver = TypeResolver::new();
        let mut writer = Writer::new();
        writer.i8(RefFlag::Null as i8);
        writer.u8(9);
        let bytes = writer.dump();
        let mut ctx = ReadContext::new(Reader::new(&bytes), &resolver);
        let ft = FieldType::new(TypeId::STRING as u32).nullable(true);
        skip_field(&mut ctx, &ft).unwrap();
        assert_eq!(ctx.reader.u8().unwrap(), 9);
    }

    #[test]
    fn skips_a_dropped_list_of_nullable_ints() {
        use crate::resolver::context::WriteContext;
        use crate::serializer::collection::write_collection_data;

        let resolver = TypeResolver::new();
        let mut w = WriteContext::new(&resolver);
        w.ref_writer.write_non_ref_value(&mut w.writer, false);
        let items: Vec<Option<i32>> = vec![Some(1), None, Some(3)];
        write_collection_data::<Option<i32>, _, _>(items.iter().map(|o| Box::new(o.clone())), &mut w)
            .unwrap();
        w.writer.u8(9); // next field's byte
        let bytes = w.writer.dump();
        let mut ctx = ReadContext::new(Reader::new(&bytes), &resolver);
        let ft = FieldType::new(TypeId::LIST as u32)
            .with_generics(vec![FieldType::new(TypeId::INT32 as u32).nullable(true)]);
        skip_field(&mut ctx, &ft).unwrap();
        assert_eq!(ctx.reader.u8().unwrap(), 9);
    }

    #[test]
    fn skips_a_dropped_map_with_nullable_values() {
        use crate::resolver::context::WriteContext;
        use crate::serializer::map::write_map_data;

        let resolver = TypeResolver::new();
        let mut w = WriteContext::new(&resolver);
        w.ref_writer.write_non_ref_value(&mut w.writer, false);
        let pairs: Vec<(i32, Option<i32>)> = vec![(1, Some(10)), (2, None)];
        write_map_data::<&i32, &Option<i32>>(pairs.iter().map(|(k, v)| (k, v)), &mut w).unwrap();
        w.writer.u8(9); // next field's byte
        let bytes = w.writer.dump();
        let mut ctx = ReadContext::new(Reader::new(&bytes), &resolver);
        let ft = FieldType::new(TypeId::MAP as u32).with_generics(vec![
            FieldType::new(TypeId::INT32 as u32),
            FieldType::new(TypeId::INT32 as u32).nullable(true),
        ]);
        skip_field(&mut ctx, &ft).unwrap();
        assert_eq!(ctx.reader.u8().unwrap(), 9);
    }
}
