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

mod v1 {
    use super::*;

    #[derive(ForyObject, Debug, PartialEq)]
    pub struct Person {
        pub name: String,
        pub age: i32,
    }
}

mod v2 {
    use super::*;

    #[derive(ForyObject, Debug, PartialEq)]
    pub struct Person {
        pub name: String,
        pub age: i32,
        pub nickname: String,
    }
}

mod v3 {
    use super::*;

    #[derive(ForyObject, Debug, PartialEq)]
    pub struct Person {
        pub name: String,
    }
}

#[test]
fn reader_with_added_field_gets_its_default() {
    let mut writer = Fory::default().mode(Mode::Compatible);
    writer.register::<v1::Person>(700).unwrap();

    let mut reader = Fory::default().mode(Mode::Compatible);
    reader.register::<v2::Person>(700).unwrap();

    let sent = v1::Person {
        name: "Ada".to_string(),
        age: 30,
    };
    let bytes = writer.serialize(&sent).unwrap();
    let back: v2::Person = reader.deserialize(&bytes).unwrap();
    assert_eq!(back.name, "Ada");
    assert_eq!(back.age, 30);
    assert_eq!(back.nickname, String::default());
}

#[test]
fn reader_with_dropped_field_skips_the_unknown_remote_field() {
    let mut writer = Fory::default().mode(Mode::Compatible);
    writer.register::<v2::Person>(701).unwrap();

    let mut reader = Fory::default().mode(Mode::Compatible);
    reader.register::<v3::Person>(701).unwrap();

    let sent = v2::Person {
        name: "Grace".to_string(),
        age: 45,
        nickname: "amazing".to_string(),
    };
    let bytes = writer.serialize(&sent).unwrap();
    let back: v3::Person = reader.deserialize(&bytes).unwrap();
    assert_eq!(back.name, "Grace");
}

#[test]
fn compatible_mode_round_trips_identical_schema() {
    let mut fory = Fory::default().mode(Mode::Compatible);
    fory.register::<v1::Person>(702).unwrap();

    let data = v1::Person {
        name: "Linus".to_string(),
        age: 55,
    };
    let bytes = fory.serialize(&data).unwrap();
    let back: v1::Person = fory.deserialize(&bytes).unwrap();
    assert_eq!(data, back);
}
