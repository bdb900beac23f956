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

use rand::Rng;
use xeno_core::buffer::{Reader, Writer};

#[test]
fn fixed_width_primitives_round_trip() {
    let mut writer = Writer::new();
    writer.bool(true);
    writer.u8(200);
    writer.i8(-100);
    writer.i16(-30000);
    writer.i32(-2_000_000_000);
    writer.i64(-9_000_000_000_000_000_000);
    writer.f32(1.5);
    writer.f64(2.5);

    let bytes = writer.dump();
    let mut reader = Reader::new(&bytes);
    assert!(reader.bool().unwrap());
    assert_eq!(reader.u8().unwrap(), 200);
    assert_eq!(reader.i8().unwrap(), -100);
    assert_eq!(reader.i16().unwrap(), -30000);
    assert_eq!(reader.i32().unwrap(), -2_000_000_000);
    assert_eq!(reader.i64().unwrap(), -9_000_000_000_000_000_000);
    assert_eq!(reader.f32().unwrap(), 1.5);
    assert_eq!(reader.f64().unwrap(), 2.5);
}

#[test]
fn varint_encodings_round_trip_random_values() {
    let mut rng = rand::thread_rng();

    let mut writer = Writer::new();
    let u32_values: Vec<u32> = (0..200).map(|_| rng.gen()).collect();
    let i32_values: Vec<i32> = (0..200).map(|_| rng.gen()).collect();
    let u64_values: Vec<u64> = (0..200).map(|_| rng.gen()).collect();
    let i64_values: Vec<i64> = (0..200).map(|_| rng.gen()).collect();

    for v in &u32_values {
        writer.var_uint32(*v);
    }
    for v in &i32_values {
        writer.var_int32(*v);
    }
    for v in &u64_values {
        writer.var_uint64(*v);
    }
    for v in &i64_values {
        writer.var_int64(*v);
    }

    let bytes = writer.dump();
    let mut reader = Reader::new(&bytes);
    for v in &u32_values {
        assert_eq!(reader.var_uint32().unwrap(), *v);
    }
    for v in &i32_values {
        assert_eq!(reader.var_int32().unwrap(), *v);
    }
    for v in &u64_values {
        assert_eq!(reader.var_uint64().unwrap(), *v);
    }
    for v in &i64_values {
        assert_eq!(reader.var_int64().unwrap(), *v);
    }
}

#[test]
fn var_uint32_boundary_values_round_trip() {
    for v in [0u32, 1, 127, 128, 16383, 16384, 2_097_151, 2_097_152, u32::MAX] {
        let mut writer = Writer::new();
        writer.var_uint32(v);
        let bytes = writer.dump();
        let mut reader = Reader::new(&bytes);
        assert_eq!(reader.var_uint32().unwrap(), v);
    }
}

#[test]
fn reading_past_the_end_is_an_error_not_a_panic() {
    let mut writer = Writer::new();
    writer.u8(1);
    let bytes = writer.dump();
    let mut reader = Reader::new(&bytes);
    assert!(reader.u8().is_ok());
    assert!(reader.u8().is_err());
}

#[test]
fn bytes_and_string_round_trip() {
    let mut writer = Writer::new();
    writer.bytes(b"hello");
    writer.bytes("world".as_bytes());

    let bytes = writer.dump();
    let mut reader = Reader::new(&bytes);
    assert_eq!(reader.bytes(5).unwrap(), b"hello");
    assert_eq!(reader.string(5).unwrap(), "world");
}
