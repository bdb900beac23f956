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

use crate::buffer::{Reader, Writer};
use crate::error::Error;
use crate::meta::meta_string::{MetaString, MetaStringDecoder};
use crate::meta::string_util::murmurhash3_x64_128;
use crate::types::{is_primitive_type_id, TypeId};

const HEADER_REGISTER_BY_NAME: u8 = 1 << 0;
const HEADER_HAS_TYPE_ID: u8 = 1 << 1;
const HEADER_COMPRESSED: u8 = 1 << 2;

const FIELD_TYPE_NULLABLE: u8 = 1 << 0;
const FIELD_TYPE_TRACK_REF: u8 = 1 << 1;
const FIELD_TYPE_HAS_GENERICS: u8 = 1 << 2;

/// A field's declared type, including generic parameters (spec.md #4.F).
/// Recursion is finite and tree-shaped: a `Vec<T>` field has one generic
/// child describing `T`, a `HashMap<K, V>` has two.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldType {
    pub type_id: u32,
    pub nullable: bool,
    pub track_ref: bool,
    pub generics: Vec<FieldType>,
}

impl FieldType {
    pub fn new(type_id: u32) -> Self {
        FieldType {
            type_id,
            nullable: false,
            track_ref: false,
            generics: Vec::new(),
        }
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn track_ref(mut self, track_ref: bool) -> Self {
        self.track_ref = track_ref;
        self
    }

    pub fn with_generics(mut self, generics: Vec<FieldType>) -> Self {
        self.generics = generics;
        self
    }

    pub fn write(&self, writer: &mut Writer) {
        let mut flags = 0u8;
        if self.nullable {
            flags |= FIELD_TYPE_NULLABLE;
        }
        if self.track_ref {
            flags |= FIELD_TYPE_TRACK_REF;
        }
        if !self.generics.is_empty() {
            flags |= FIELD_TYPE_HAS_GENERICS;
        }
        writer.u8(flags);
        writer.var_uint32(self.type_id);
        writer.var_uint32(self.generics.len() as u32);
        for child in &self.generics {
            child.write(writer);
        }
    }

    pub fn read(reader: &mut Reader) -> Result<Self, Error> {
        let flags = reader.u8()?;
        let type_id = reader.var_uint32()?;
        let num_generics = reader.var_uint32()? as usize;
        let mut generics = Vec::with_capacity(num_generics);
        for _ in 0..num_generics {
            generics.push(FieldType::read(reader)?);
        }
        Ok(FieldType {
            type_id,
            nullable: flags & FIELD_TYPE_NULLABLE != 0,
            track_ref: flags & FIELD_TYPE_TRACK_REF != 0,
            generics,
        })
    }

    /// Byte width used to order primitive fields widest-first (spec.md
    /// #4.F's `size_bytes desc` tiebreaker). Non-primitives sort after all
    /// primitives regardless of this value.
    fn size_bytes(&self) -> u32 {
        match self.type_id_enum() {
            Some(TypeId::BOOL | TypeId::INT8 | TypeId::UINT8) => 1,
            Some(TypeId::INT16 | TypeId::UINT16) => 2,
            Some(TypeId::INT32 | TypeId::UINT32 | TypeId::FLOAT32) => 4,
            Some(TypeId::INT64 | TypeId::UINT64 | TypeId::FLOAT64) => 8,
            Some(TypeId::INT128 | TypeId::U128) => 16,
            _ => 0,
        }
    }

    fn type_id_enum(&self) -> Option<TypeId> {
        u8::try_from(self.type_id)
            .ok()
            .and_then(|b| TypeId::try_from(b).ok())
    }

    /// Kind group used for canonical field ordering (spec.md #4.F/#4.H):
    /// primitive-non-nullable, primitive-nullable, built-in-reference,
    /// collection, map, user-struct, in that order.
    fn kind_group(&self) -> u8 {
        let is_primitive = self
            .type_id_enum()
            .map(is_primitive_type_id)
            .unwrap_or(false);
        if is_primitive {
            if self.nullable {
                1
            } else {
                0
            }
        } else {
            match self.type_id_enum() {
                Some(TypeId::STRING | TypeId::BINARY | TypeId::DATE | TypeId::TIMESTAMP) => 2,
                Some(
                    TypeId::LIST
                    | TypeId::SET
                    | TypeId::ARRAY
                    | TypeId::INT8_ARRAY
                    | TypeId::INT16_ARRAY
                    | TypeId::INT32_ARRAY
                    | TypeId::INT64_ARRAY
                    | TypeId::FLOAT32_ARRAY
                    | TypeId::FLOAT64_ARRAY
                    | TypeId::BOOL_ARRAY,
                ) => 3,
                Some(TypeId::MAP) => 4,
                _ => 5,
            }
        }
    }
}

/// `(field_id, field_name, field_type)`; `field_id` is absent when fields
/// are matched by name only (spec.md #4.F).
#[derive(Debug, Clone)]
pub struct FieldInfo {
    pub field_id: Option<u32>,
    pub field_name: MetaString,
    pub field_type: FieldType,
}

impl FieldInfo {
    pub fn new(field_name: &str, field_type: FieldType) -> Self {
        FieldInfo {
            field_id: None,
            field_name: crate::meta::meta_string::FIELD_NAME_ENCODER
                .encode(field_name)
                .expect("field name must be encodable as a meta-string"),
            field_type,
        }
    }

    pub fn with_field_id(mut self, field_id: u32) -> Self {
        self.field_id = Some(field_id);
        self
    }

    fn sort_key(&self) -> (u8, bool, std::cmp::Reverse<u32>, u32, String) {
        let group = self.field_type.kind_group();
        let is_primitive_group = group <= 1;
        (
            group,
            !is_primitive_group,
            std::cmp::Reverse(if is_primitive_group {
                self.field_type.size_bytes()
            } else {
                0
            }),
            if is_primitive_group {
                // Ties within a primitive group break on type_id desc, then
                // field_name asc; type_id is folded into the reverse key
                // below by negating through u32::MAX.
                u32::MAX - self.field_type.type_id
            } else {
                self.field_type.type_id
            },
            self.field_name.original.clone(),
        )
    }

    fn write(&self, writer: &mut Writer) {
        writer.bool(self.field_id.is_some());
        if let Some(id) = self.field_id {
            writer.var_uint32(id);
        }
        let encoded = &self.field_name.bytes;
        writer.var_uint32(encoded.len() as u32);
        writer.u8(self.field_name.encoding as i16 as u8);
        writer.bytes(encoded);
        self.field_type.write(writer);
    }

    fn read(reader: &mut Reader, decoder: &MetaStringDecoder) -> Result<Self, Error> {
        let has_field_id = reader.bool()?;
        let field_id = if has_field_id {
            Some(reader.var_uint32()?)
        } else {
            None
        };
        let len = reader.var_uint32()? as usize;
        let encoding_tag = reader.u8()?;
        let encoded = reader.bytes(len)?.to_vec();
        let field_name = decoder.decode(&encoded, encoding_tag_to_encoding(encoding_tag)?)?;
        let field_type = FieldType::read(reader)?;
        Ok(FieldInfo {
            field_id,
            field_name,
            field_type,
        })
    }
}

fn encoding_tag_to_encoding(tag: u8) -> Result<crate::meta::meta_string::Encoding, Error> {
    use crate::meta::meta_string::Encoding::*;
    Ok(match tag {
        0x00 => Extended,
        0x01 => LowerSpecial,
        0x02 => LowerUpperDigitSpecial,
        0x03 => FirstToLowerSpecial,
        0x04 => AllToLowerSpecial,
        other => {
            return Err(Error::invalid_meta_string(format!(
                "unknown meta-string encoding tag {other}"
            )))
        }
    })
}

/// Self-contained schema descriptor for a registered type (spec.md #4.F).
/// `fields` is always kept in canonical order so that `schema_hash` is a
/// pure function of the declared schema (spec.md property 6).
#[derive(Debug, Clone)]
pub struct TypeMeta {
    pub namespace: MetaString,
    pub type_name: MetaString,
    pub register_by_name: bool,
    pub numeric_type_id: Option<u32>,
    pub user_type_id: Option<u32>,
    pub fields: Vec<FieldInfo>,
}

impl TypeMeta {
    pub fn new(namespace: &str, type_name: &str, mut fields: Vec<FieldInfo>) -> Self {
        fields.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        TypeMeta {
            namespace: crate::meta::meta_string::NAMESPACE_ENCODER
                .encode(namespace)
                .expect("namespace must be encodable as a meta-string"),
            type_name: crate::meta::meta_string::TYPE_NAME_ENCODER
                .encode(type_name)
                .expect("type name must be encodable as a meta-string"),
            register_by_name: true,
            numeric_type_id: None,
            user_type_id: None,
            fields,
        }
    }

    pub fn with_numeric_type_id(mut self, id: u32) -> Self {
        self.numeric_type_id = Some(id);
        self.register_by_name = false;
        self
    }

    pub fn with_user_type_id(mut self, id: u32) -> Self {
        self.user_type_id = Some(id);
        self
    }

    /// 32-bit hash of the canonical `(field_name_utf8, field_type_id,
    /// nullable)` triples (spec.md #4.F). A read-side mismatch against the
    /// peer's stated hash switches the decoder into compatible mode.
    pub fn schema_hash(&self) -> u32 {
        let mut buf = Vec::new();
        for field in &self.fields {
            buf.extend_from_slice(field.field_name.original.as_bytes());
            buf.push(0);
            buf.extend_from_slice(&field.field_type.type_id.to_le_bytes());
            buf.push(field.field_type.nullable as u8);
        }
        let (h1, _h2) = murmurhash3_x64_128(&buf, 0);
        h1 as u32
    }

    pub fn write(&self, writer: &mut Writer) {
        let mut flags = 0u8;
        if self.register_by_name {
            flags |= HEADER_REGISTER_BY_NAME;
        }
        let has_type_id = self.numeric_type_id.is_some() || self.user_type_id.is_some();
        if has_type_id {
            flags |= HEADER_HAS_TYPE_ID;
        }
        writer.var_uint32(self.fields.len() as u32);
        writer.u8(flags);

        write_meta_string(writer, &self.namespace);
        write_meta_string(writer, &self.type_name);

        if let Some(id) = self.numeric_type_id {
            writer.var_uint32(id);
        } else if let Some(id) = self.user_type_id {
            writer.var_uint32(id);
        }

        for field in &self.fields {
            field.write(writer);
        }
    }

    pub fn read(reader: &mut Reader) -> Result<Self, Error> {
        let num_fields = reader.var_uint32()? as usize;
        let flags = reader.u8()?;
        let register_by_name = flags & HEADER_REGISTER_BY_NAME != 0;
        let has_type_id = flags & HEADER_HAS_TYPE_ID != 0;

        let namespace = read_meta_string(reader, &crate::meta::meta_string::NAMESPACE_DECODER)?;
        let type_name = read_meta_string(reader, &crate::meta::meta_string::TYPE_NAME_DECODER)?;

        let mut numeric_type_id = None;
        let mut user_type_id = None;
        if has_type_id {
            let id = reader.var_uint32()?;
            if register_by_name {
                user_type_id = Some(id);
            } else {
                numeric_type_id = Some(id);
            }
        }

        let field_decoder = crate::meta::meta_string::FIELD_NAME_DECODER;
        let mut fields = Vec::with_capacity(num_fields);
        for _ in 0..num_fields {
            fields.push(FieldInfo::read(reader, &field_decoder)?);
        }

        Ok(TypeMeta {
            namespace,
            type_name,
            register_by_name,
            numeric_type_id,
            user_type_id,
            fields,
        })
    }
}

fn write_meta_string(writer: &mut Writer, ms: &MetaString) {
    writer.var_uint32(ms.bytes.len() as u32);
    writer.u8(ms.encoding as i16 as u8);
    writer.bytes(&ms.bytes);
}

fn read_meta_string(reader: &mut Reader, decoder: &MetaStringDecoder) -> Result<MetaString, Error> {
    let len = reader.var_uint32()? as usize;
    let encoding_tag = reader.u8()?;
    let bytes = reader.bytes(len)?.to_vec();
    decoder.decode(&bytes, encoding_tag_to_encoding(encoding_tag)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_hash_is_pure_function_of_schema() {
        let a = TypeMeta::new(
            "com.example",
            "Point",
            vec![
                FieldInfo::new("x", FieldType::new(TypeId::INT32 as u32)),
                FieldInfo::new("y", FieldType::new(TypeId::INT32 as u32)),
            ],
        );
        let b = TypeMeta::new(
            "com.example",
            "Point",
            vec![
                FieldInfo::new("y", FieldType::new(TypeId::INT32 as u32)),
                FieldInfo::new("x", FieldType::new(TypeId::INT32 as u32)),
            ],
        );
        assert_eq!(a.schema_hash(), b.schema_hash());
        assert_eq!(a.fields[0].field_name.original, b.fields[0].field_name.original);
    }

    #[test]
    fn canonical_order_is_idempotent() {
        let fields = vec![
            FieldInfo::new("name", FieldType::new(TypeId::STRING as u32)),
            FieldInfo::new("id", FieldType::new(TypeId::INT64 as u32)),
            FieldInfo::new("active", FieldType::new(TypeId::BOOL as u32)),
        ];
        let once = TypeMeta::new("ns", "T", fields.clone());
        let twice = TypeMeta::new("ns", "T", once.fields.clone());
        let order_once: Vec<_> = once.fields.iter().map(|f| f.field_name.original.clone()).collect();
        let order_twice: Vec<_> = twice.fields.iter().map(|f| f.field_name.original.clone()).collect();
        assert_eq!(order_once, order_twice);
        assert_eq!(order_once[0], "active");
    }

    #[test]
    fn round_trips_through_buffer() {
        let meta = TypeMeta::new(
            "com.example",
            "Point",
            vec![
                FieldInfo::new("x", FieldType::new(TypeId::INT32 as u32)),
                FieldInfo::new("y", FieldType::new(TypeId::INT32 as u32).nullable(true)),
            ],
        )
        .with_user_type_id(1000);

        let mut writer = Writer::new();
        meta.write(&mut writer);
        let bytes = writer.dump();
        let mut reader = Reader::new(&bytes);
        let decoded = TypeMeta::read(&mut reader).unwrap();

        assert_eq!(decoded.namespace.original, meta.namespace.original);
        assert_eq!(decoded.type_name.original, meta.type_name.original);
        assert_eq!(decoded.user_type_id, Some(1000));
        assert_eq!(decoded.fields.len(), 2);
        assert_eq!(decoded.schema_hash(), meta.schema_hash());
    }
}
