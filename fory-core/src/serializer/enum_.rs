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

//! Fieldless enum dispatch (spec.md #4.J): registered by id, the ordinal is
//! written as a `varuint`; registered by name, the variant name is written
//! as a MetaString. Either way, an unrecognized value on read falls back to
//! the implementation's `UNKNOWN` sentinel rather than failing.

use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::resolver::type_resolver::TypeResolver;
use crate::serializer::EnumSerializer;
use crate::types::TypeId;
use std::any::TypeId as RustTypeId;

/// Composes the wire type id for an enum the same way
/// [`struct_::actual_type_id`](super::struct_::actual_type_id) does for
/// structs, minus the compatible-mode variant (enums don't evolve
/// per-field).
#[inline(always)]
pub fn actual_type_id(type_id: u32, register_by_name: bool) -> u32 {
    if register_by_name {
        TypeId::NAMED_ENUM as u32
    } else {
        (type_id << 8) + TypeId::ENUM as u32
    }
}

fn enum_type_id<T: 'static>(type_resolver: &TypeResolver) -> Result<u32, Error> {
    let info = type_resolver
        .get_enum_info_by_rust_type::<T>()
        .ok_or_else(|| {
            Error::InvalidData(format!(
                "enum {} was not registered with this Fory instance",
                std::any::type_name::<T>()
            ))
        })?;
    Ok(actual_type_id(
        info.get_numeric_type_id().unwrap_or(0),
        info.is_register_by_name(),
    ))
}

pub fn write_type_info<T: EnumSerializer>(context: &mut WriteContext) -> Result<(), Error> {
    let type_id = enum_type_id::<T>(context.type_resolver)?;
    context.writer.var_uint32(type_id);
    Ok(())
}

pub fn read_type_info<T: EnumSerializer>(context: &mut ReadContext) -> Result<(), Error> {
    let remote_type_id = context.reader.var_uint32()?;
    let local_type_id = enum_type_id::<T>(context.type_resolver)?;
    if remote_type_id != local_type_id {
        return Err(Error::SchemaHashMismatch {
            type_name: std::any::type_name::<T>().to_string(),
            local: local_type_id,
            peer: remote_type_id,
        });
    }
    Ok(())
}

/// Writes a full enum value: ref flag, type descriptor, then the
/// ordinal-or-name payload.
pub fn write<T: EnumSerializer>(
    this: &T,
    context: &mut WriteContext,
    write_ref_info: bool,
) -> Result<(), Error> {
    if write_ref_info {
        context
            .ref_writer
            .write_non_ref_value(&mut context.writer, false);
    }
    write_type_info::<T>(context)?;
    this.fory_write_data(context, false)
}

pub fn read<T: EnumSerializer>(context: &mut ReadContext) -> Result<T, Error> {
    read_type_info::<T>(context)?;
    T::fory_read_data(context, false)
}

/// Writes just the payload (no ref flag, no type id): the ordinal if this
/// enum is registered numerically, the variant name as a MetaString if
/// registered by name.
pub fn write_data<T: EnumSerializer + 'static>(
    this: &T,
    context: &mut WriteContext,
) -> Result<(), Error> {
    let register_by_name = context
        .type_resolver
        .get_enum_info_by_rust_type::<T>()
        .map(|info| info.is_register_by_name())
        .unwrap_or(false);
    if register_by_name {
        let name = this.fory_variant_name();
        let mb = context
            .meta_string_writer
            .get_or_create_meta_string_bytes(&crate::meta::meta_string::FIELD_NAME_ENCODER.encode(name)?)?;
        context
            .meta_string_writer
            .write_meta_string_bytes(&mut context.writer, mb);
    } else {
        context.writer.var_uint32(this.fory_ordinal());
    }
    Ok(())
}

pub fn read_data<T: EnumSerializer + 'static>(context: &mut ReadContext) -> Result<T, Error> {
    let register_by_name = context
        .type_resolver
        .get_enum_info_by_rust_type::<T>()
        .map(|info| info.is_register_by_name())
        .unwrap_or(false);
    if register_by_name {
        let name = context.meta_string_reader.read_meta_string(&mut context.reader)?;
        Ok(T::fory_from_variant_name(&name.original))
    } else {
        let ordinal = context.reader.var_uint32()?;
        Ok(T::fory_from_ordinal(ordinal))
    }
}

#[allow(dead_code)]
fn rust_type_id_of<T: 'static>() -> RustTypeId {
    RustTypeId::of::<T>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Reader;
    use crate::serializer::Serializer;
    use crate::types::TypeId as WireTypeId;
    use std::any::Any;

    #[derive(Debug, PartialEq, Eq, Clone, Copy)]
    enum Color {
        Red,
        Green,
        Blue,
        Unknown,
    }

    impl Serializer for Color {
        fn fory_write_data(&self, context: &mut WriteContext, _is_field: bool) -> Result<(), Error> {
            write_data(self, context)
        }

        fn fory_write_type_info(context: &mut WriteContext, _is_field: bool) -> Result<(), Error> {
            write_type_info::<Self>(context)
        }

        fn fory_read_data(context: &mut ReadContext, _is_field: bool) -> Result<Self, Error> {
            read_data(context)
        }

        fn fory_read_type_info(context: &mut ReadContext, _is_field: bool) -> Result<(), Error> {
            read_type_info::<Self>(context)
        }

        fn fory_get_type_id(type_resolver: &TypeResolver) -> Result<u32, Error> {
            enum_type_id::<Self>(type_resolver)
        }

        fn fory_static_type_id() -> WireTypeId {
            WireTypeId::ENUM
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    impl EnumSerializer for Color {
        fn fory_ordinal(&self) -> u32 {
            match self {
                Color::Red => 0,
                Color::Green => 1,
                Color::Blue => 2,
                Color::Unknown => u32::MAX,
            }
        }

        fn fory_variant_name(&self) -> &'static str {
            match self {
                Color::Red => "Red",
                Color::Green => "Green",
                Color::Blue => "Blue",
                Color::Unknown => "UNKNOWN",
            }
        }

        fn fory_from_ordinal(ordinal: u32) -> Self {
            match ordinal {
                0 => Color::Red,
                1 => Color::Green,
                2 => Color::Blue,
                _ => Color::Unknown,
            }
        }

        fn fory_from_variant_name(name: &str) -> Self {
            match name {
                "Red" => Color::Red,
                "Green" => Color::Green,
                "Blue" => Color::Blue,
                _ => Color::Unknown,
            }
        }
    }

    #[test]
    fn ordinal_round_trips_by_numeric_registration() {
        let mut resolver = TypeResolver::new();
        resolver.register_enum::<Color>("test", "Color", false, None).unwrap();
        let mut w = WriteContext::new(&resolver);
        Color::Green.fory_write(&mut w, false).unwrap();
        let bytes = w.writer.dump();
        let mut r = ReadContext::new(Reader::new(&bytes), &resolver);
        assert_eq!(Color::fory_read(&mut r, false).unwrap(), Color::Green);
    }

    #[test]
    fn unknown_ordinal_falls_back_to_sentinel() {
        let mut resolver = TypeResolver::new();
        resolver.register_enum::<Color>("test", "Color", false, None).unwrap();
        let mut w = WriteContext::new(&resolver);
        w.writer.var_uint32(enum_type_id::<Color>(&resolver).unwrap());
        w.writer.var_uint32(99);
        let bytes = w.writer.dump();
        let mut r = ReadContext::new(Reader::new(&bytes), &resolver);
        assert_eq!(Color::fory_read(&mut r, false).unwrap(), Color::Unknown);
    }

    #[test]
    fn name_round_trips_by_name_registration() {
        let mut resolver = TypeResolver::new();
        resolver.register_enum::<Color>("test", "Color", true, None).unwrap();
        let mut w = WriteContext::new(&resolver);
        Color::Blue.fory_write(&mut w, false).unwrap();
        let bytes = w.writer.dump();
        let mut r = ReadContext::new(Reader::new(&bytes), &resolver);
        assert_eq!(Color::fory_read(&mut r, false).unwrap(), Color::Blue);
    }
}
