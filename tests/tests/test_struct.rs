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
use xeno_derive::ForyObject;

#[test]
fn flat_struct_round_trips() {
    #[derive(ForyObject, Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    let mut fory = Fory::default();
    fory.register::<Point>(100).unwrap();
    let p = Point { x: -7, y: 42 };
    let bytes = fory.serialize(&p).unwrap();
    let back: Point = fory.deserialize(&bytes).unwrap();
    assert_eq!(p, back);
}

#[test]
fn nested_struct_register_order_does_not_matter() {
    #[derive(ForyObject, Debug, PartialEq)]
    struct Inner {
        value: i32,
    }

    #[derive(ForyObject, Debug, PartialEq)]
    struct Outer {
        value: i32,
        inner: Inner,
    }

    let mut fory = Fory::default();
    fory.register::<Outer>(200).unwrap();
    fory.register::<Inner>(201).unwrap();

    let data = Outer {
        value: 1,
        inner: Inner { value: 2 },
    };
    let bytes = fory.serialize(&data).unwrap();
    let back: Outer = fory.deserialize(&bytes).unwrap();
    assert_eq!(data, back);
}

#[test]
fn empty_struct_round_trips() {
    #[derive(ForyObject, Debug, PartialEq)]
    struct Empty {}

    let mut fory = Fory::default();
    fory.register::<Empty>(300).unwrap();
    let bytes = fory.serialize(&Empty {}).unwrap();
    let back: Empty = fory.deserialize(&bytes).unwrap();
    assert_eq!(Empty {}, back);
}

#[test]
fn unregistered_struct_is_rejected() {
    #[derive(ForyObject, Debug, PartialEq)]
    struct Unregistered {
        value: i32,
    }

    let fory = Fory::default();
    let value = Unregistered { value: 1 };
    assert!(fory.serialize(&value).is_err());
}

#[test]
fn struct_with_optional_field_round_trips_present_and_absent() {
    #[derive(ForyObject, Debug, PartialEq)]
    struct Account {
        id: i64,
        nickname: Option<String>,
    }

    let mut fory = Fory::default();
    fory.register::<Account>(400).unwrap();

    let with_nick = Account {
        id: 1,
        nickname: Some("zed".to_string()),
    };
    let bytes = fory.serialize(&with_nick).unwrap();
    assert_eq!(with_nick, fory.deserialize(&bytes).unwrap());

    let without_nick = Account {
        id: 2,
        nickname: None,
    };
    let bytes = fory.serialize(&without_nick).unwrap();
    assert_eq!(without_nick, fory.deserialize(&bytes).unwrap());
}

#[test]
fn struct_with_collection_and_map_fields_round_trips() {
    use std::collections::HashMap;

    #[derive(ForyObject, Debug, PartialEq)]
    struct Catalog {
        tags: Vec<String>,
        prices: HashMap<String, i64>,
    }

    let mut fory = Fory::default();
    fory.register::<Catalog>(500).unwrap();

    let mut prices = HashMap::new();
    prices.insert("widget".to_string(), 199);
    prices.insert("gadget".to_string(), 599);
    let data = Catalog {
        tags: vec!["new".to_string(), "sale".to_string()],
        prices,
    };
    let bytes = fory.serialize(&data).unwrap();
    let back: Catalog = fory.deserialize(&bytes).unwrap();
    assert_eq!(data, back);
}
