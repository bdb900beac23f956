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

use std::mem;

#[cfg(target_arch = "x86_64")]
pub const MIN_DIM_SIZE_AVX: usize = 32;

#[cfg(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64"))]
pub const MIN_DIM_SIZE_SIMD: usize = 16;

#[cfg(target_arch = "x86_64")]
unsafe fn is_latin_avx(s: &str) -> bool {
    use std::arch::x86_64::*;
    let bytes = s.as_bytes();
    let len = bytes.len();
    let mut i = 0;
    while i + MIN_DIM_SIZE_AVX <= len {
        let chunk = _mm256_loadu_si256(bytes.as_ptr().add(i) as *const __m256i);
        let hi_mask = _mm256_set1_epi8(0x80u8 as i8);
        let masked = _mm256_and_si256(chunk, hi_mask);
        let cmp = _mm256_cmpeq_epi8(masked, _mm256_setzero_si256());
        if _mm256_movemask_epi8(cmp) != -1 {
            break;
        }
        i += MIN_DIM_SIZE_AVX;
    }
    s[i..].chars().all(|c| (c as u32) <= 0xFF)
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
unsafe fn is_latin_sse(s: &str) -> bool {
    use std::arch::x86_64::*;
    let bytes = s.as_bytes();
    let len = bytes.len();
    let mut i = 0;
    while i + MIN_DIM_SIZE_SIMD <= len {
        let chunk = _mm_loadu_si128(bytes.as_ptr().add(i) as *const __m128i);
        let hi_mask = _mm_set1_epi8(0x80u8 as i8);
        let masked = _mm_and_si128(chunk, hi_mask);
        let cmp = _mm_cmpeq_epi8(masked, _mm_setzero_si128());
        if _mm_movemask_epi8(cmp) != 0xFFFF {
            break;
        }
        i += MIN_DIM_SIZE_SIMD;
    }
    s[i..].chars().all(|c| (c as u32) <= 0xFF)
}

#[cfg(target_arch = "aarch64")]
unsafe fn is_latin_neon(s: &str) -> bool {
    use std::arch::aarch64::*;
    let bytes = s.as_bytes();
    let len = bytes.len();
    let mut i = 0;
    while i + MIN_DIM_SIZE_SIMD <= len {
        let chunk = vld1q_u8(bytes.as_ptr().add(i));
        let hi_mask = vdupq_n_u8(0x80);
        let masked = vandq_u8(chunk, hi_mask);
        if vmaxvq_u8(masked) != 0 {
            break;
        }
        i += MIN_DIM_SIZE_SIMD;
    }
    s[i..].chars().all(|c| (c as u32) <= 0xFF)
}

fn is_latin_standard(s: &str) -> bool {
    s.chars().all(|c| c as u32 <= 0xFF)
}

pub fn is_latin(s: &str) -> bool {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx") && s.len() >= MIN_DIM_SIZE_AVX {
            return unsafe { is_latin_avx(s) };
        }
    }
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        if is_x86_feature_detected!("sse2") && s.len() >= MIN_DIM_SIZE_SIMD {
            return unsafe { is_latin_sse(s) };
        }
    }
    #[cfg(target_arch = "aarch64")]
    {
        if std::arch::is_aarch64_feature_detected!("neon") && s.len() >= MIN_DIM_SIZE_SIMD {
            return unsafe { is_latin_neon(s) };
        }
    }
    is_latin_standard(s)
}

fn get_latin1_length_standard(s: &str) -> i32 {
    let mut count = 0;
    for c in s.chars() {
        if c as u32 > 0xFF {
            return -1;
        }
        count += 1;
    }
    count
}

/// Returns the Latin-1 length of `s`, or -1 if it contains a codepoint
/// outside Latin-1. Used to pick the string serializer's fast path.
pub fn get_latin1_length(s: &str) -> i32 {
    if is_latin(s) {
        get_latin1_length_standard(s)
    } else {
        -1
    }
}

fn fmix64(mut k: u64) -> u64 {
    k ^= k >> 33;
    k = k.wrapping_mul(0xff51afd7ed558ccdu64);
    k ^= k >> 33;
    k = k.wrapping_mul(0xc4ceb9fe1a85ec53u64);
    k ^= k >> 33;
    k
}

/// Used for `schema_hash` (spec.md #4.F) and the MetaStringResolver's
/// long-string hash prefix (spec.md #4.C); both only require that both
/// peers agree on one function (spec.md #9).
pub fn murmurhash3_x64_128(bytes: &[u8], seed: u64) -> (u64, u64) {
    let c1 = 0x87c37b91114253d5u64;
    let c2 = 0x4cf5ad432745937fu64;
    let read_size = 16;
    let len = bytes.len() as u64;
    let block_count = len / read_size;

    let (mut h1, mut h2) = (seed, seed);

    for i in 0..block_count as usize {
        let b64: &[u64] = unsafe { mem::transmute(bytes) };
        let (mut k1, mut k2) = (b64[i * 2], b64[i * 2 + 1]);

        k1 = k1.wrapping_mul(c1);
        k1 = k1.rotate_left(31);
        k1 = k1.wrapping_mul(c2);
        h1 ^= k1;

        h1 = h1.rotate_left(27);
        h1 = h1.wrapping_add(h2);
        h1 = h1.wrapping_mul(5);
        h1 = h1.wrapping_add(0x52dce729);

        k2 = k2.wrapping_mul(c2);
        k2 = k2.rotate_left(33);
        k2 = k2.wrapping_mul(c1);
        h2 ^= k2;

        h2 = h2.rotate_left(31);
        h2 = h2.wrapping_add(h1);
        h2 = h2.wrapping_mul(5);
        h2 = h2.wrapping_add(0x38495ab5);
    }
    let (mut k1, mut k2) = (0u64, 0u64);

    if len & 15 == 15 {
        k2 ^= (bytes[(block_count * read_size) as usize + 14] as u64) << 48;
    }
    if len & 15 >= 14 {
        k2 ^= (bytes[(block_count * read_size) as usize + 13] as u64) << 40;
    }
    if len & 15 >= 13 {
        k2 ^= (bytes[(block_count * read_size) as usize + 12] as u64) << 32;
    }
    if len & 15 >= 12 {
        k2 ^= (bytes[(block_count * read_size) as usize + 11] as u64) << 24;
    }
    if len & 15 >= 11 {
        k2 ^= (bytes[(block_count * read_size) as usize + 10] as u64) << 16;
    }
    if len & 15 >= 10 {
        k2 ^= (bytes[(block_count * read_size) as usize + 9] as u64) << 8;
    }
    if len & 15 >= 9 {
        k2 ^= bytes[(block_count * read_size) as usize + 8] as u64;
        k2 = k2.wrapping_mul(c2);
        k2 = k2.rotate_left(33);
        k2 = k2.wrapping_mul(c1);
        h2 ^= k2;
    }

    if len & 15 >= 8 {
        k1 ^= (bytes[(block_count * read_size) as usize + 7] as u64) << 56;
    }
    if len & 15 >= 7 {
        k1 ^= (bytes[(block_count * read_size) as usize + 6] as u64) << 48;
    }
    if len & 15 >= 6 {
        k1 ^= (bytes[(block_count * read_size) as usize + 5] as u64) << 40;
    }
    if len & 15 >= 5 {
        k1 ^= (bytes[(block_count * read_size) as usize + 4] as u64) << 32;
    }
    if len & 15 >= 4 {
        k1 ^= (bytes[(block_count * read_size) as usize + 3] as u64) << 24;
    }
    if len & 15 >= 3 {
        k1 ^= (bytes[(block_count * read_size) as usize + 2] as u64) << 16;
    }
    if len & 15 >= 2 {
        k1 ^= (bytes[(block_count * read_size) as usize + 1] as u64) << 8;
    }
    if len & 15 >= 1 {
        k1 ^= bytes[(block_count * read_size) as usize] as u64;
        k1 = k1.wrapping_mul(c1);
        k1 = k1.rotate_left(31);
        k1 = k1.wrapping_mul(c2);
        h1 ^= k1;
    }

    h1 ^= bytes.len() as u64;
    h2 ^= bytes.len() as u64;

    h1 = h1.wrapping_add(h2);
    h2 = h2.wrapping_add(h1);

    h1 = fmix64(h1);
    h2 = fmix64(h2);

    h1 = h1.wrapping_add(h2);
    h2 = h2.wrapping_add(h1);

    (h1, h2)
}

/// Latin-1/UTF-8/UTF-16 read/write helpers for the string serializer
/// (spec.md #4.G). Built on the `Reader`/`Writer` public API rather than
/// their internals, so no `unsafe` is needed to reach into the buffer.
pub mod buffer_rw_string {
    use crate::buffer::{Reader, Writer};
    use crate::error::Error;

    #[inline]
    pub fn write_latin1(writer: &mut Writer, s: &str) {
        if s.is_ascii() {
            writer.bytes(s.as_bytes());
            return;
        }
        let mut buf = Vec::with_capacity(s.len());
        for c in s.chars() {
            let v = c as u32;
            debug_assert!(v <= 0xFF, "non-Latin1 character passed to write_latin1");
            buf.push(v as u8);
        }
        writer.bytes(&buf);
    }

    #[inline]
    pub fn write_utf8(writer: &mut Writer, s: &str) {
        writer.bytes(s.as_bytes());
    }

    #[inline]
    pub fn write_utf16(writer: &mut Writer, utf16: &[u16]) {
        let mut buf = Vec::with_capacity(utf16.len() * 2);
        for unit in utf16 {
            buf.extend_from_slice(&unit.to_le_bytes());
        }
        writer.bytes(&buf);
    }

    #[inline]
    pub fn read_latin1(reader: &mut Reader, len: usize) -> Result<String, Error> {
        let slice = reader.bytes(len)?;
        Ok(slice.iter().map(|&b| b as char).collect())
    }

    #[inline]
    pub fn read_utf8(reader: &mut Reader, len: usize) -> Result<String, Error> {
        let slice = reader.bytes(len)?;
        String::from_utf8(slice.to_vec())
            .map_err(|e| Error::InvalidData(format!("invalid utf8 string payload: {e}")))
    }

    #[inline]
    pub fn read_utf16(reader: &mut Reader, len: usize) -> Result<String, Error> {
        if len % 2 != 0 {
            return Err(Error::encode_error("UTF-16 payload length must be even"));
        }
        let slice = reader.bytes(len)?;
        let units: Vec<u16> = slice
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        Ok(String::from_utf16_lossy(&units))
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn latin1_round_trips() {
            for s in ["Hello World!", "Rusty Cafe", "1234567890"] {
                let mut writer = Writer::default();
                write_latin1(&mut writer, s);
                write_latin1(&mut writer, s);
                let bytes = writer.dump();
                let mut reader = Reader::new(&bytes);
                assert_eq!(read_latin1(&mut reader, s.len()).unwrap(), s);
                assert_eq!(read_latin1(&mut reader, s.len()).unwrap(), s);
            }
        }

        #[test]
        fn utf8_round_trips() {
            for s in ["hello", "rust语言", "emoji 😀😃😄😁"] {
                let mut writer = Writer::default();
                write_utf8(&mut writer, s);
                let bytes = writer.dump();
                let mut reader = Reader::new(&bytes);
                assert_eq!(read_utf8(&mut reader, s.len()).unwrap(), s);
            }
        }

        #[test]
        fn utf16_round_trips() {
            for s in ["hello", "rust语言", "emoji 😀😃😄😁"] {
                let utf16: Vec<u16> = s.encode_utf16().collect();
                let mut writer = Writer::default();
                write_utf16(&mut writer, &utf16);
                let bytes = writer.dump();
                let mut reader = Reader::new(&bytes);
                assert_eq!(read_utf16(&mut reader, utf16.len() * 2).unwrap(), s);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn generate_random_string(length: usize) -> String {
        const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
        let mut rng = rand::thread_rng();
        (0..length)
            .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
            .collect()
    }

    #[test]
    fn is_latin_matches_standard_path() {
        let s = generate_random_string(1000);
        let not_latin = generate_random_string(1000) + "abc\u{1234}";
        assert!(is_latin(&s));
        assert!(!is_latin(&not_latin));
        assert!(is_latin_standard(&s));
        assert!(!is_latin_standard(&not_latin));
    }

    #[test]
    fn get_latin1_length_detects_non_latin() {
        assert_eq!(get_latin1_length("hello"), 5);
        assert_eq!(get_latin1_length("h\u{1234}llo"), -1);
    }
}

#[cfg(test)]
mod test_hash {
    use super::murmurhash3_x64_128;

    #[test]
    fn empty_string() {
        assert_eq!(murmurhash3_x64_128("".as_bytes(), 0), (0, 0));
    }

    #[test]
    fn tail_lengths() {
        assert_eq!(
            murmurhash3_x64_128("1".as_bytes(), 0),
            (8213365047359667313, 10676604921780958775)
        );
        assert_eq!(
            murmurhash3_x64_128("12345678".as_bytes(), 0),
            (4272337174398058908, 10464973996478965079)
        );
        assert_eq!(
            murmurhash3_x64_128("123456789abcdef1".as_bytes(), 0),
            (9259082041050667785, 12459473952842597282)
        );
    }

    #[test]
    fn large_data() {
        assert_eq!(
            murmurhash3_x64_128(
                "Lorem ipsum dolor sit amet, consectetur adipiscing elit. Etiam at consequat massa. Cras eleifend pellentesque ex, at dignissim libero maximus ut. Sed eget nulla felis".as_bytes(),
                0
            ),
            (9455322759164802692, 17863277201603478371)
        );
    }
}
