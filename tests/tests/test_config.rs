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

use xeno_core::fory::Fory;
use xeno_core::types::Mode;
use xeno_derive::ForyObject;

#[test]
fn default_config_is_schema_consistent_and_strict() {
    let fory = Fory::default();
    assert_eq!(*fory.get_mode(), Mode::SchemaConsistent);
    assert!(!fory.is_compress_string());
    assert!(!fory.is_track_ref_default());
    assert!(fory.is_require_registration());
}

#[test]
fn builder_chain_applies_every_toggle() {
    let fory = Fory::default()
        .mode(Mode::Compatible)
        .xlang(false)
        .compress_string(true)
        .track_ref_default(true)
        .require_registration(false);

    assert_eq!(*fory.get_mode(), Mode::Compatible);
    assert!(fory.is_compress_string());
    assert!(fory.is_track_ref_default());
    assert!(!fory.is_require_registration());
}

#[test]
fn schema_consistent_and_compatible_both_round_trip_the_same_struct() {
    #[derive(ForyObject, Debug, PartialEq)]
    struct Measurement {
        sensor: String,
        value: f64,
    }

    let data = Measurement {
        sensor: "temp".to_string(),
        value: 21.5,
    };

    let mut consistent = Fory::default();
    consistent.register::<Measurement>(800).unwrap();
    let bytes = consistent.serialize(&data).unwrap();
    assert_eq!(consistent.deserialize::<Measurement>(&bytes).unwrap(), data);

    let mut compatible = Fory::default().mode(Mode::Compatible);
    compatible.register::<Measurement>(801).unwrap();
    let bytes = compatible.serialize(&data).unwrap();
    assert_eq!(compatible.deserialize::<Measurement>(&bytes).unwrap(), data);
}

#[test]
fn compress_string_toggle_still_round_trips_correctly() {
    #[derive(ForyObject, Debug, PartialEq)]
    struct Note {
        text: String,
    }

    let mut fory = Fory::default().compress_string(true);
    fory.register::<Note>(802).unwrap();

    let data = Note {
        text: "hello compressed world".to_string(),
    };
    let bytes = fory.serialize(&data).unwrap();
    assert_eq!(fory.deserialize::<Note>(&bytes).unwrap(), data);
}
