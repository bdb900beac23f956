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

//! A growable buffer that fills itself from an arbitrary `Read` source on
//! demand, for callers that have a stream rather than an already-materialized
//! byte slice to hand to [`Fory::deserialize`](crate::fory::Fory::deserialize).
//! Buffer grows monotonically (no compaction) — data is always appended at
//! the end.

use crate::error::Error;
use std::io::{self, Read};

const DEFAULT_CAPACITY: usize = 4096;

/// Wraps a `Read` source with a growable internal buffer, filling on demand
/// as callers ask for more bytes than are currently buffered.
pub struct ForyStreamBuf {
    source: Box<dyn Read>,
    buffer: Vec<u8>,
    valid_len: usize,
    read_pos: usize,
}

impl ForyStreamBuf {
    pub fn new(source: Box<dyn Read>) -> Self {
        Self::with_capacity(source, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(source: Box<dyn Read>, capacity: usize) -> Self {
        Self {
            source,
            buffer: Vec::with_capacity(capacity.max(1)),
            valid_len: 0,
            read_pos: 0,
        }
    }

    /// Ensures at least `min_bytes` are available to read beyond the current
    /// position, reading from the source in a loop until satisfied or EOF.
    pub fn fill_buffer(&mut self, min_bytes: usize) -> Result<(), Error> {
        if min_bytes == 0 || self.remaining() >= min_bytes {
            return Ok(());
        }

        let required = self.valid_len + (min_bytes - self.remaining());
        if required > self.buffer.len() {
            let new_cap = (self.buffer.len() * 2).max(required);
            self.buffer.resize(new_cap, 0);
        }

        while self.remaining() < min_bytes {
            let writable = self.buffer.len() - self.valid_len;
            if writable == 0 {
                let new_cap = self.buffer.len() * 2 + 1;
                self.buffer.resize(new_cap, 0);
                continue;
            }

            match self.source.read(&mut self.buffer[self.valid_len..]) {
                Ok(0) => {
                    return Err(Error::buffer_out_of_bound(
                        self.read_pos,
                        min_bytes,
                        self.valid_len,
                    ));
                }
                Ok(n) => self.valid_len += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(_) => {
                    return Err(Error::buffer_out_of_bound(
                        self.read_pos,
                        min_bytes,
                        self.valid_len,
                    ));
                }
            }
        }

        Ok(())
    }

    /// Bytes currently buffered and unread.
    pub fn filled(&self) -> &[u8] {
        &self.buffer[self.read_pos..self.valid_len]
    }

    pub fn size(&self) -> usize {
        self.valid_len
    }

    pub fn reader_index(&self) -> usize {
        self.read_pos
    }

    pub fn set_reader_index(&mut self, index: usize) {
        assert!(
            index <= self.valid_len,
            "reader index {} exceeds valid data length {}",
            index,
            self.valid_len
        );
        self.read_pos = index;
    }

    pub fn remaining(&self) -> usize {
        self.valid_len.saturating_sub(self.read_pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn fills_from_an_underlying_reader() {
        let data = vec![1, 2, 3, 4, 5];
        let mut buf = ForyStreamBuf::new(Box::new(Cursor::new(data)));

        buf.fill_buffer(3).unwrap();
        assert!(buf.size() >= 3);
        assert_eq!(buf.reader_index(), 0);
    }

    #[test]
    fn eof_before_enough_bytes_is_an_error() {
        let data = vec![1, 2];
        let mut buf = ForyStreamBuf::new(Box::new(Cursor::new(data)));
        assert!(buf.fill_buffer(10).is_err());
    }

    #[test]
    fn reader_index_advances_independently_of_fill() {
        let data = vec![1, 2, 3, 4, 5];
        let mut buf = ForyStreamBuf::new(Box::new(Cursor::new(data)));

        buf.fill_buffer(5).unwrap();
        assert_eq!(buf.remaining(), 5);

        buf.set_reader_index(3);
        assert_eq!(buf.reader_index(), 3);
        assert_eq!(buf.remaining(), 2);
        assert_eq!(buf.filled(), &[4, 5]);
    }

    #[test]
    fn zero_byte_request_is_a_no_op() {
        let data = vec![1, 2, 3];
        let mut buf = ForyStreamBuf::new(Box::new(Cursor::new(data)));
        buf.fill_buffer(0).unwrap();
        assert_eq!(buf.size(), 0);
    }
}
