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
use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

/// Growable little-endian byte buffer. Writes never fail: the only thing
/// that could make them fail is an allocation failure, which we let the
/// allocator abort on like everywhere else in the crate.
#[derive(Default)]
pub struct Writer {
    bf: Vec<u8>,
    reserved: usize,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dump(&self) -> Vec<u8> {
        self.bf.clone()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.bf
    }

    pub fn len(&self) -> usize {
        self.bf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bf.is_empty()
    }

    pub fn reserve(&mut self, additional: usize) {
        self.reserved += additional;
        if self.bf.capacity() < self.reserved {
            self.bf.reserve(self.reserved - self.bf.len());
        }
    }

    pub fn bool(&mut self, value: bool) {
        self.u8(value as u8);
    }

    pub fn u8(&mut self, value: u8) {
        self.bf.write_u8(value).unwrap();
    }

    pub fn i8(&mut self, value: i8) {
        self.bf.write_i8(value).unwrap();
    }

    pub fn u16(&mut self, value: u16) {
        self.bf.write_u16::<LittleEndian>(value).unwrap();
    }

    pub fn i16(&mut self, value: i16) {
        self.bf.write_i16::<LittleEndian>(value).unwrap();
    }

    pub fn u32(&mut self, value: u32) {
        self.bf.write_u32::<LittleEndian>(value).unwrap();
    }

    pub fn i32(&mut self, value: i32) {
        self.bf.write_i32::<LittleEndian>(value).unwrap();
    }

    pub fn u64(&mut self, value: u64) {
        self.bf.write_u64::<LittleEndian>(value).unwrap();
    }

    pub fn i64(&mut self, value: i64) {
        self.bf.write_i64::<LittleEndian>(value).unwrap();
    }

    pub fn f32(&mut self, value: f32) {
        self.bf.write_f32::<LittleEndian>(value).unwrap();
    }

    pub fn f64(&mut self, value: f64) {
        self.bf.write_f64::<LittleEndian>(value).unwrap();
    }

    pub fn skip(&mut self, len: usize) {
        self.bf.resize(self.bf.len() + len, 0);
    }

    pub fn bytes(&mut self, v: &[u8]) {
        self.reserve(v.len());
        self.bf.extend_from_slice(v);
    }

    pub fn set_bytes(&mut self, offset: usize, data: &[u8]) {
        self.bf
            .get_mut(offset..offset + data.len())
            .expect("offset/len within already-written bytes")
            .copy_from_slice(data);
    }

    /// 1-5 bytes, low 7 bits payload, high bit continuation.
    pub fn var_uint32(&mut self, value: u32) {
        let mut v = value;
        loop {
            if v < 0x80 {
                self.u8(v as u8);
                return;
            }
            self.u8(((v & 0x7F) | 0x80) as u8);
            v >>= 7;
        }
    }

    /// Fast path when the caller already knows `value < 128`.
    pub fn var_uint32_small7(&mut self, value: u32) {
        debug_assert!(value < 128);
        self.u8(value as u8);
    }

    pub fn var_int32(&mut self, value: i32) {
        self.var_uint32(zigzag_encode_32(value));
    }

    pub fn var_uint64(&mut self, value: u64) {
        let mut v = value;
        loop {
            if v < 0x80 {
                self.u8(v as u8);
                return;
            }
            self.u8(((v & 0x7F) | 0x80) as u8);
            v >>= 7;
        }
    }

    pub fn var_int64(&mut self, value: i64) {
        self.var_uint64(zigzag_encode_64(value));
    }

    /// 4 LE bytes if `value` fits in 30 bits plus sign (so `value << 1` fits
    /// an i32 without losing the high bit), else `0xFF` then 8 LE bytes.
    pub fn sli_int64(&mut self, value: i64) {
        if (-(1i64 << 30)..(1i64 << 30)).contains(&value) {
            self.i32((value as i32) << 1);
        } else {
            self.u8(0xFF);
            self.i64(value);
        }
    }

    /// Fixed 8 bytes, top bit of the big end used as a type tag.
    pub fn tagged_uint64(&mut self, value: u64) -> Result<(), Error> {
        if value > (1u64 << 63) - 1 {
            return Err(Error::IntegerOverflow {
                value: value as i128,
                width_bits: 63,
            });
        }
        self.u64(value);
        Ok(())
    }
}

pub struct Reader<'de> {
    bf: &'de [u8],
    cursor: usize,
}

impl<'bf> Reader<'bf> {
    pub fn new(bf: &[u8]) -> Reader {
        Reader { bf, cursor: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.bf.len() - self.cursor
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    fn require(&self, n: usize) -> Result<(), Error> {
        if self.remaining() < n {
            Err(Error::unexpected_eof(self.cursor, n, self.remaining()))
        } else {
            Ok(())
        }
    }

    fn move_next(&mut self, additional: usize) {
        self.cursor += additional;
    }

    fn slice_after_cursor(&self) -> &[u8] {
        &self.bf[self.cursor..]
    }

    pub fn bool(&mut self) -> Result<bool, Error> {
        Ok(self.u8()? != 0)
    }

    pub fn u8(&mut self) -> Result<u8, Error> {
        self.require(1)?;
        let result = self.bf[self.cursor];
        self.move_next(1);
        Ok(result)
    }

    pub fn i8(&mut self) -> Result<i8, Error> {
        Ok(self.u8()? as i8)
    }

    pub fn u16(&mut self) -> Result<u16, Error> {
        self.require(2)?;
        let result = LittleEndian::read_u16(self.slice_after_cursor());
        self.move_next(2);
        Ok(result)
    }

    pub fn i16(&mut self) -> Result<i16, Error> {
        self.require(2)?;
        let result = LittleEndian::read_i16(self.slice_after_cursor());
        self.move_next(2);
        Ok(result)
    }

    pub fn u32(&mut self) -> Result<u32, Error> {
        self.require(4)?;
        let result = LittleEndian::read_u32(self.slice_after_cursor());
        self.move_next(4);
        Ok(result)
    }

    pub fn i32(&mut self) -> Result<i32, Error> {
        self.require(4)?;
        let result = LittleEndian::read_i32(self.slice_after_cursor());
        self.move_next(4);
        Ok(result)
    }

    pub fn u64(&mut self) -> Result<u64, Error> {
        self.require(8)?;
        let result = LittleEndian::read_u64(self.slice_after_cursor());
        self.move_next(8);
        Ok(result)
    }

    pub fn i64(&mut self) -> Result<i64, Error> {
        self.require(8)?;
        let result = LittleEndian::read_i64(self.slice_after_cursor());
        self.move_next(8);
        Ok(result)
    }

    pub fn f32(&mut self) -> Result<f32, Error> {
        self.require(4)?;
        let result = LittleEndian::read_f32(self.slice_after_cursor());
        self.move_next(4);
        Ok(result)
    }

    pub fn f64(&mut self) -> Result<f64, Error> {
        self.require(8)?;
        let result = LittleEndian::read_f64(self.slice_after_cursor());
        self.move_next(8);
        Ok(result)
    }

    pub fn string(&mut self, len: usize) -> Result<String, Error> {
        let bytes = self.bytes(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| Error::InvalidData(format!("invalid utf8: {e}")))
    }

    pub fn skip(&mut self, len: usize) -> Result<(), Error> {
        self.require(len)?;
        self.move_next(len);
        Ok(())
    }

    pub fn slice(&self) -> &[u8] {
        self.bf
    }

    pub fn bytes(&mut self, len: usize) -> Result<&'bf [u8], Error> {
        self.require(len)?;
        let result = &self.bf[self.cursor..self.cursor + len];
        self.move_next(len);
        Ok(result)
    }

    /// Returns a closure that rewinds the cursor to the position it was at
    /// when this was called, for lookahead parsing (e.g. peeking a type id
    /// before deciding how to dispatch a read).
    pub fn mark(&self) -> impl FnOnce(&mut Self) {
        let raw_cursor = self.cursor;
        move |this: &mut Self| {
            this.cursor = raw_cursor;
        }
    }

    pub fn aligned<T>(&self) -> bool {
        unsafe { (self.bf.as_ptr().add(self.cursor) as usize) % std::mem::align_of::<T>() == 0 }
    }

    pub fn var_uint32(&mut self) -> Result<u32, Error> {
        let mut result: u32 = 0;
        for i in 0..5 {
            let byte = self.u8()?;
            result |= ((byte & 0x7F) as u32) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(Error::malformed_varint(5))
    }

    pub fn var_uint32_small7(&mut self) -> Result<u32, Error> {
        self.var_uint32()
    }

    pub fn var_int32(&mut self) -> Result<i32, Error> {
        Ok(zigzag_decode_32(self.var_uint32()?))
    }

    pub fn var_uint64(&mut self) -> Result<u64, Error> {
        let mut result: u64 = 0;
        for i in 0..10 {
            let byte = self.u8()?;
            result |= ((byte & 0x7F) as u64) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(Error::malformed_varint(10))
    }

    pub fn var_int64(&mut self) -> Result<i64, Error> {
        Ok(zigzag_decode_64(self.var_uint64()?))
    }

    pub fn sli_int64(&mut self) -> Result<i64, Error> {
        let rewind = self.mark();
        let tag = self.u8()?;
        if tag == 0xFF {
            self.i64()
        } else {
            rewind(self);
            Ok((self.i32()? as i64).wrapping_shr(1))
        }
    }

    pub fn tagged_uint64(&mut self) -> Result<u64, Error> {
        self.u64()
    }
}

fn zigzag_encode_32(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

fn zigzag_decode_32(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

fn zigzag_encode_64(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

fn zigzag_decode_64(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn var_uint32_boundaries() {
        let cases = [0u32, 1, 127, 128, 16383, 16384, u32::MAX];
        for &v in &cases {
            let mut w = Writer::new();
            w.var_uint32(v);
            let bytes = w.dump();
            let mut r = Reader::new(&bytes);
            assert_eq!(r.var_uint32().unwrap(), v);
            assert_eq!(r.position(), bytes.len());
        }
    }

    #[test]
    fn var_uint32_known_encodings() {
        let mut w = Writer::new();
        w.var_uint32(127);
        assert_eq!(w.dump(), vec![0x7F]);

        let mut w = Writer::new();
        w.var_uint32(128);
        assert_eq!(w.dump(), vec![0x80, 0x01]);
    }

    #[test]
    fn var_int32_round_trip_negative() {
        for v in [-1i32, -12345, i32::MIN, i32::MAX, 0] {
            let mut w = Writer::new();
            w.var_int32(v);
            let bytes = w.dump();
            let mut r = Reader::new(&bytes);
            assert_eq!(r.var_int32().unwrap(), v);
        }
    }

    #[test]
    fn var_uint64_round_trip_full_range() {
        for v in [0u64, 1, 127, 128, u32::MAX as u64, u64::MAX] {
            let mut w = Writer::new();
            w.var_uint64(v);
            let bytes = w.dump();
            let mut r = Reader::new(&bytes);
            assert_eq!(r.var_uint64().unwrap(), v);
        }
    }

    #[test]
    fn sli_int64_small_and_large() {
        for v in [0i64, -1, 12345, (1i64 << 30) - 1, -(1i64 << 30)] {
            let mut w = Writer::new();
            w.sli_int64(v);
            assert_eq!(w.len(), 4);
            let bytes = w.dump();
            let mut r = Reader::new(&bytes);
            assert_eq!(r.sli_int64().unwrap(), v);
        }
        for v in [
            i64::MAX,
            i64::MIN,
            i32::MAX as i64,
            i32::MIN as i64,
            1i64 << 30,
            -(1i64 << 30) - 1,
        ] {
            let mut w = Writer::new();
            w.sli_int64(v);
            assert_eq!(w.len(), 9);
            let bytes = w.dump();
            let mut r = Reader::new(&bytes);
            assert_eq!(r.sli_int64().unwrap(), v);
        }
    }

    #[test]
    fn tagged_uint64_rejects_top_bit() {
        let mut w = Writer::new();
        assert!(w.tagged_uint64(1u64 << 63).is_err());
        assert!(w.tagged_uint64((1u64 << 63) - 1).is_ok());
    }

    #[test]
    fn short_read_is_unexpected_eof() {
        let bytes = [0x01u8];
        let mut r = Reader::new(&bytes);
        assert!(r.u32().is_err());
    }

    #[test]
    fn malformed_varint_errors_past_max_bytes() {
        let bytes = [0x80u8; 6];
        let mut r = Reader::new(&bytes);
        assert!(matches!(
            r.var_uint32(),
            Err(Error::MalformedVarint { max_bytes: 5 })
        ));
    }
}
