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

//! Tagged unions (spec.md #4.J): a data-carrying Rust enum whose active
//! variant is written as a `varuint` tag followed by that variant's own
//! fields, rather than the ordinal-or-name-only encoding
//! [`enum_`](super::enum_) uses for fieldless enums.

use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::resolver::type_resolver::TypeResolver;
use crate::serializer::Serializer;
use crate::types::TypeId;

/// Extension for `#[derive(ForyObject)]` data-carrying enum types.
pub trait UnionSerializer: Serializer + Sized {
    /// Stable index of the currently-active variant, assigned by
    /// declaration order at derive time.
    fn fory_variant_tag(&self) -> u32;

    /// Writes the active variant's own payload (its fields, in canonical
    /// field order), with no tag and no ref flag.
    fn fory_write_variant_data(&self, context: &mut WriteContext) -> Result<(), Error>;

    /// Reconstructs the variant named by `tag`, reading its fields from
    /// `context`. Returns `Err` for a tag the local schema doesn't define;
    /// unlike fieldless enums, a union has no `UNKNOWN` payload shape to
    /// fall back to.
    fn fory_read_variant_data(tag: u32, context: &mut ReadContext) -> Result<Self, Error>;
}

#[inline(always)]
pub fn actual_type_id(type_id: u32, register_by_name: bool) -> u32 {
    if register_by_name {
        TypeId::NAMED_UNION as u32
    } else if type_id == 0 {
        TypeId::UNION as u32
    } else {
        (type_id << 8) + TypeId::TYPED_UNION as u32
    }
}

fn union_type_id<T: 'static>(type_resolver: &TypeResolver) -> Result<u32, Error> {
    let info = type_resolver
        .get_enum_info_by_rust_type::<T>()
        .ok_or_else(|| {
            Error::InvalidData(format!(
                "union {} was not registered with this Fory instance",
                std::any::type_name::<T>()
            ))
        })?;
    Ok(actual_type_id(
        info.get_numeric_type_id().unwrap_or(0),
        info.is_register_by_name(),
    ))
}

pub fn write_type_info<T: UnionSerializer>(context: &mut WriteContext) -> Result<(), Error> {
    let type_id = union_type_id::<T>(context.type_resolver)?;
    context.writer.var_uint32(type_id);
    Ok(())
}

pub fn read_type_info<T: UnionSerializer>(context: &mut ReadContext) -> Result<(), Error> {
    let remote_type_id = context.reader.var_uint32()?;
    let local_type_id = union_type_id::<T>(context.type_resolver)?;
    if remote_type_id != local_type_id {
        return Err(Error::SchemaHashMismatch {
            type_name: std::any::type_name::<T>().to_string(),
            local: local_type_id,
            peer: remote_type_id,
        });
    }
    Ok(())
}

/// Writes a full union value: ref flag, type descriptor, variant tag, then
/// the active variant's payload.
pub fn write<T: UnionSerializer>(
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
    context.writer.var_uint32(this.fory_variant_tag());
    this.fory_write_variant_data(context)
}

pub fn read<T: UnionSerializer>(context: &mut ReadContext) -> Result<T, Error> {
    read_type_info::<T>(context)?;
    let tag = context.reader.var_uint32()?;
    T::fory_read_variant_data(tag, context)
}
