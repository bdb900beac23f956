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
use crate::serializer::Serializer;
use crate::types::{RefFlag, TypeId};

/// Writes the leading type id for `T`, unless `T` is in struct-field
/// position and doesn't need one (fixed-position fields only need a type id
/// when the value could be one of several concrete types, i.e. is
/// polymorphic).
pub fn write_type_info<T: Serializer>(
    context: &mut WriteContext,
    is_field: bool,
) -> Result<(), Error> {
    if is_field && !T::fory_is_polymorphic() {
        return Ok(());
    }
    let type_id = T::fory_get_type_id(context.type_resolver)?;
    context.writer.var_uint32(type_id);
    Ok(())
}

/// Reads and validates the leading type id written by
/// [`write_type_info`], mirroring its skip condition.
pub fn read_type_info<T: Serializer>(
    context: &mut ReadContext,
    is_field: bool,
) -> Result<(), Error> {
    if is_field && !T::fory_is_polymorphic() {
        return Ok(());
    }
    let remote_type_id = context.reader.var_uint32()?;
    let local_type_id = T::fory_get_type_id(context.type_resolver)?;
    if remote_type_id != local_type_id {
        return Err(Error::SchemaHashMismatch {
            type_name: format!("{:?}", T::fory_static_type_id()),
            local: local_type_id,
            peer: remote_type_id,
        });
    }
    Ok(())
}

/// Whether `type_id` never needs a ref flag on the wire: non-nullable
/// primitive scalars always hold a value, so struct fields of these types
/// skip the flag byte entirely.
pub fn get_skip_ref_flag(type_id: u32) -> bool {
    matches!(
        TypeId::try_from(type_id as u8),
        Ok(TypeId::BOOL
            | TypeId::INT8
            | TypeId::INT16
            | TypeId::INT32
            | TypeId::INT64
            | TypeId::FLOAT32
            | TypeId::FLOAT64)
    )
}

/// Writes the ref/null header then the payload for a field whose
/// `FieldType` carries `nullable`/`track_ref`. `is_none` lets callers pass
/// `Option<T>` without an extra allocation.
pub fn write_ref_info_data<T: Serializer>(
    value: Option<&T>,
    context: &mut WriteContext,
    nullable: bool,
    track_ref: bool,
) -> Result<(), Error> {
    match value {
        None => {
            if !nullable {
                return Err(Error::InvalidData(
                    "non-nullable field written with no value".into(),
                ));
            }
            context.ref_writer.write_null(&mut context.writer);
            Ok(())
        }
        Some(v) => {
            context
                .ref_writer
                .write_non_ref_value(&mut context.writer, track_ref);
            v.fory_write_data(context, true)
        }
    }
}

/// Reads the header written by [`write_ref_info_data`] and returns `None`
/// for a null field, `Some(value)` otherwise.
pub fn read_ref_info_data<T: Serializer>(
    context: &mut ReadContext,
) -> Result<Option<T>, Error> {
    let flag = context.ref_reader.read_ref_flag(&mut context.reader)?;
    match flag {
        RefFlag::Null => Ok(None),
        RefFlag::NotNullValue | RefFlag::RefValue => {
            Ok(Some(T::fory_read_data(context, true)?))
        }
        RefFlag::Ref => Err(Error::InvalidData(
            "plain field cannot carry a back-reference".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::ref_resolver::{RefReader, RefWriter};

    #[test]
    fn skip_ref_flag_covers_non_nullable_primitives() {
        assert!(get_skip_ref_flag(TypeId::INT32 as u32));
        assert!(!get_skip_ref_flag(TypeId::STRING as u32));
    }

    #[test]
    fn ref_writer_reader_roundtrip_null_and_value() {
        let mut rw = RefWriter::new();
        let mut writer = crate::buffer::Writer::default();
        rw.write_null(&mut writer);
        rw.write_non_ref_value(&mut writer, false);
        let bytes = writer.dump();
        let mut reader = crate::buffer::Reader::new(&bytes);
        let rr = RefReader::new();
        assert_eq!(rr.read_ref_flag(&mut reader).unwrap(), RefFlag::Null);
        assert_eq!(
            rr.read_ref_flag(&mut reader).unwrap(),
            RefFlag::NotNullValue
        );
    }
}
