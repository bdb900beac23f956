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
use crate::ensure;
use crate::error::Error;
use crate::meta::meta_string::{Encoding, MetaString, NAMESPACE_DECODER};
use crate::meta::string_util::murmurhash3_x64_128;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::convert::TryInto;
use std::rc::Rc;
use std::sync::Arc;

/// Interned form of a `MetaString` as it appears on the wire (spec.md #4.C):
/// bytes plus the hash used both as a dedup key for long strings and as the
/// header byte (`hash_code & 0xff`) that recovers the encoding on read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetaStringBytes {
    pub bytes: Vec<u8>,
    pub hash_code: i64,
    pub encoding: Encoding,
    pub first8: u64,
    pub second8: u64,
}

const HEADER_MASK: i64 = 0xff;

fn byte_to_encoding(byte: u8) -> Encoding {
    match byte {
        0 => Encoding::Extended,
        1 => Encoding::LowerSpecial,
        2 => Encoding::LowerUpperDigitSpecial,
        3 => Encoding::FirstToLowerSpecial,
        _ => Encoding::AllToLowerSpecial,
    }
}

static EMPTY: Lazy<MetaStringBytes> =
    Lazy::new(|| MetaStringBytes::from_metastring(MetaString::get_empty()).unwrap());

impl MetaStringBytes {
    pub const DEFAULT_DYNAMIC_WRITE_STRING_ID: i16 = -1;

    pub fn new(bytes: Vec<u8>, hash_code: i64) -> Self {
        let header = (hash_code & HEADER_MASK) as u8;
        let encoding = byte_to_encoding(header);
        let mut data = bytes.clone();
        if bytes.len() < 16 {
            data.resize(16, 0);
        }
        let first8 = u64::from_le_bytes(data[0..8].try_into().unwrap());
        let second8 = u64::from_le_bytes(data[8..16].try_into().unwrap());
        MetaStringBytes {
            bytes,
            hash_code,
            encoding,
            first8,
            second8,
        }
    }

    pub fn to_metastring(&self) -> Result<MetaString, Error> {
        NAMESPACE_DECODER.decode(&self.bytes, self.encoding)
    }

    pub(crate) fn from_metastring(meta_string: &MetaString) -> Result<Self, Error> {
        let bytes = meta_string.bytes.to_vec();
        let mut hash_code = murmurhash3_x64_128(&bytes, 47).0 as i64;
        hash_code = hash_code.abs();
        if hash_code == 0 {
            hash_code += 256;
        }
        hash_code = (hash_code as u64 & 0xffffffffffffff00) as i64;
        let header = meta_string.encoding as i64 & HEADER_MASK;
        hash_code |= header;
        Ok(Self::new(bytes, hash_code))
    }
}

/// Per-stream write-side table for meta-strings (spec.md #4.C): each
/// distinct string is written once with its bytes and re-referenced by a
/// dynamic id afterward.
pub struct MetaStringWriterResolver {
    meta_string_to_bytes: HashMap<MetaString, Rc<MetaStringBytes>>,
    dynamic_written: Vec<Option<Rc<MetaStringBytes>>>,
    dynamic_write_id: usize,
    bytes_id_map: HashMap<Rc<MetaStringBytes>, i16>,
}

impl Default for MetaStringWriterResolver {
    fn default() -> Self {
        Self {
            meta_string_to_bytes: HashMap::with_capacity(Self::INITIAL_CAPACITY),
            dynamic_written: vec![None; 32],
            dynamic_write_id: 0,
            bytes_id_map: HashMap::with_capacity(Self::INITIAL_CAPACITY),
        }
    }
}

impl MetaStringWriterResolver {
    const INITIAL_CAPACITY: usize = 8;
    const SMALL_STRING_THRESHOLD: usize = 16;

    pub fn get_or_create_meta_string_bytes(
        &mut self,
        ms: &MetaString,
    ) -> Result<Rc<MetaStringBytes>, Error> {
        if let Some(b) = self.meta_string_to_bytes.get(ms) {
            Ok(b.clone())
        } else {
            let mb = MetaStringBytes::from_metastring(ms)?;
            let rc_mb = Rc::new(mb);
            self.meta_string_to_bytes.insert(ms.clone(), rc_mb.clone());
            Ok(rc_mb)
        }
    }

    /// Write with the ref-bit scheme of spec.md #4.C: `(len<<1)|0` on first
    /// sighting, `(prev_id<<1)|1` on repeat.
    pub fn write_meta_string_bytes(&mut self, writer: &mut Writer, mb: Rc<MetaStringBytes>) {
        let id_option = self.bytes_id_map.get_mut(&mb);
        let id;
        if let Some(exist_id) = id_option {
            if *exist_id != MetaStringBytes::DEFAULT_DYNAMIC_WRITE_STRING_ID {
                let header = ((*exist_id as u32 + 1) << 1) | 1;
                writer.var_uint32(header);
                return;
            }
            id = self.dynamic_write_id;
            *exist_id = id as i16;
        } else {
            id = self.dynamic_write_id;
            self.bytes_id_map.insert(mb.clone(), id as i16);
        }

        self.dynamic_write_id += 1;
        if id >= self.dynamic_written.len() {
            self.dynamic_written.resize(id * 2 + 1, None);
        }
        self.dynamic_written[id] = Some(mb.clone());

        let len = mb.bytes.len();
        writer.var_uint32((len as u32) << 1);
        if len > Self::SMALL_STRING_THRESHOLD {
            writer.i64(mb.hash_code);
        } else {
            writer.u8(mb.encoding as i16 as u8);
        }
        writer.bytes(&mb.bytes);
    }

    pub fn reset(&mut self) {
        if self.dynamic_write_id != 0 {
            for i in 0..self.dynamic_write_id {
                let key = self.dynamic_written[i].as_ref().unwrap().clone();
                if let Some(v) = self.bytes_id_map.get_mut(&key) {
                    *v = MetaStringBytes::DEFAULT_DYNAMIC_WRITE_STRING_ID;
                }
                self.dynamic_written[i] = None;
            }
            self.dynamic_write_id = 0;
        }
    }
}

/// Per-stream read-side table mirroring `MetaStringWriterResolver`.
pub struct MetaStringReaderResolver {
    meta_string_bytes_to_string: HashMap<Rc<MetaStringBytes>, Arc<MetaString>>,
    hash_to_meta: HashMap<i64, Rc<MetaStringBytes>>,
    small_map: HashMap<(u64, u64, u8), Rc<MetaStringBytes>>,
    dynamic_read: Vec<Option<Rc<MetaStringBytes>>>,
    dynamic_read_id: usize,
}

impl Default for MetaStringReaderResolver {
    fn default() -> Self {
        Self {
            meta_string_bytes_to_string: HashMap::with_capacity(Self::INITIAL_CAPACITY),
            hash_to_meta: HashMap::with_capacity(Self::INITIAL_CAPACITY),
            small_map: HashMap::with_capacity(Self::INITIAL_CAPACITY),
            dynamic_read: vec![None; 32],
            dynamic_read_id: 0,
        }
    }
}

impl MetaStringReaderResolver {
    const SMALL_STRING_THRESHOLD: usize = 16;
    const INITIAL_CAPACITY: usize = 8;

    pub fn read_meta_string_bytes(
        &mut self,
        reader: &mut Reader,
    ) -> Result<Rc<MetaStringBytes>, Error> {
        let header = reader.var_uint32()?;
        let len = (header >> 1) as usize;
        if (header & 0b1) == 0 {
            let mb = if len > Self::SMALL_STRING_THRESHOLD {
                let hash_code = reader.i64()?;
                self.read_big_meta_string_bytes(reader, len, hash_code)?
            } else {
                self.read_small_meta_string_bytes(reader, len)?
            };
            self.update_dynamic_string(mb.clone());
            Ok(mb)
        } else {
            let idx = len - 1;
            self.dynamic_read
                .get(idx)
                .and_then(|opt| opt.clone())
                .ok_or_else(|| Error::InvalidData("dynamic meta-string id not found".into()))
        }
    }

    fn read_big_meta_string_bytes(
        &mut self,
        reader: &mut Reader,
        len: usize,
        hash_code: i64,
    ) -> Result<Rc<MetaStringBytes>, Error> {
        if let Some(existing) = self.hash_to_meta.get(&hash_code) {
            reader.skip(len)?;
            Ok(existing.clone())
        } else {
            let bytes = reader.bytes(len)?.to_vec();
            let mb = Rc::new(MetaStringBytes::new(bytes, hash_code));
            self.hash_to_meta.insert(hash_code, mb.clone());
            Ok(mb)
        }
    }

    fn read_small_meta_string_bytes(
        &mut self,
        reader: &mut Reader,
        len: usize,
    ) -> Result<Rc<MetaStringBytes>, Error> {
        let encoding_val = reader.u8()?;
        if len == 0 {
            ensure!(
                encoding_val == Encoding::Extended as i16 as u8,
                Error::invalid_meta_string(format!("wrong encoding value: {encoding_val}"))
            );
            return Ok(Rc::new(EMPTY.clone()));
        }
        let (v1, v2) = if len <= 8 {
            (Self::read_bytes_as_u64(reader, len)?, 0)
        } else {
            let v1 = Self::read_bytes_as_u64(reader, 8)?;
            let v2 = Self::read_bytes_as_u64(reader, len - 8)?;
            (v1, v2)
        };
        let key = (v1, v2, encoding_val);
        if let Some(existing) = self.small_map.get(&key) {
            Ok(existing.clone())
        } else {
            let mut data = vec![0u8; 16];
            data[0..8].copy_from_slice(&v1.to_le_bytes());
            data[8..16].copy_from_slice(&v2.to_le_bytes());
            data.truncate(len);
            let mut hash_code = (murmurhash3_x64_128(&data, 47).0 as i64).abs();
            hash_code = (hash_code as u64 & 0xffffffffffffff00_u64) as i64 | (encoding_val as i64);
            let mb = Rc::new(MetaStringBytes::new(data, hash_code));
            self.small_map.insert(key, mb.clone());
            Ok(mb)
        }
    }

    fn read_bytes_as_u64(reader: &mut Reader, len: usize) -> Result<u64, Error> {
        let mut v = 0u64;
        let slice = reader.bytes(len)?;
        for (i, b) in slice.iter().take(len).enumerate() {
            v |= (*b as u64) << (8 * i);
        }
        Ok(v)
    }

    fn update_dynamic_string(&mut self, mb: Rc<MetaStringBytes>) {
        let id = self.dynamic_read_id;
        self.dynamic_read_id += 1;
        if id >= self.dynamic_read.len() {
            self.dynamic_read.resize(id * 2 + 1, None);
        }
        self.dynamic_read[id] = Some(mb);
    }

    pub fn reset(&mut self) {
        if self.dynamic_read_id != 0 {
            for i in 0..self.dynamic_read_id {
                self.dynamic_read[i] = None;
            }
            self.dynamic_read_id = 0;
        }
    }

    pub fn read_meta_string(&mut self, reader: &mut Reader) -> Result<Arc<MetaString>, Error> {
        let mb = self.read_meta_string_bytes(reader)?;
        if let Some(ms) = self.meta_string_bytes_to_string.get(&mb) {
            Ok(ms.clone())
        } else {
            let ms = mb.to_metastring()?;
            let arc_ms = Arc::new(ms);
            self.meta_string_bytes_to_string.insert(mb, arc_ms.clone());
            Ok(arc_ms)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_round_trips_and_dedupes() {
        let ms = crate::meta::meta_string::NAMESPACE_ENCODER
            .encode("com.example.nested")
            .unwrap();
        let mut writer_resolver = MetaStringWriterResolver::default();
        let mut writer = Writer::new();

        let mb = writer_resolver.get_or_create_meta_string_bytes(&ms).unwrap();
        writer_resolver.write_meta_string_bytes(&mut writer, mb.clone());
        writer_resolver.write_meta_string_bytes(&mut writer, mb);

        let bytes = writer.dump();
        let mut reader = Reader::new(&bytes);
        let mut reader_resolver = MetaStringReaderResolver::default();
        let first = reader_resolver.read_meta_string(&mut reader).unwrap();
        let second = reader_resolver.read_meta_string(&mut reader).unwrap();
        assert_eq!(first.original, "com.example.nested");
        assert_eq!(first.bytes, second.bytes);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn long_string_uses_hash_prefix_dedup() {
        let long = "a".repeat(64);
        let ms = crate::meta::meta_string::NAMESPACE_ENCODER.encode(&long).unwrap();
        let mut writer_resolver = MetaStringWriterResolver::default();
        let mut writer = Writer::new();
        let mb = writer_resolver.get_or_create_meta_string_bytes(&ms).unwrap();
        assert!(mb.bytes.len() > MetaStringWriterResolver::SMALL_STRING_THRESHOLD);
        writer_resolver.write_meta_string_bytes(&mut writer, mb);

        let bytes = writer.dump();
        let mut reader = Reader::new(&bytes);
        let mut reader_resolver = MetaStringReaderResolver::default();
        let decoded = reader_resolver.read_meta_string(&mut reader).unwrap();
        assert_eq!(decoded.original, long);
    }
}
