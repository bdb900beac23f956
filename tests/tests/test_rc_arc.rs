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

//! Rust-specific shared-pointer support (`Rc`/`Arc`), carried as a
//! supplemental feature layered on top of the reference resolver.

use std::rc::Rc;
use std::sync::Arc;
use xeno_core::fory::Fory;
use xeno_derive::ForyObject;

#[test]
fn rc_string_round_trips() {
    let fory = Fory::default();
    let data = Rc::new(String::from("hello rc"));
    let bytes = fory.serialize(&data).unwrap();
    let back: Rc<String> = fory.deserialize(&bytes).unwrap();
    assert_eq!(*data, *back);
}

#[test]
fn arc_number_round_trips() {
    let fory = Fory::default();
    let data = Arc::new(42i32);
    let bytes = fory.serialize(&data).unwrap();
    let back: Arc<i32> = fory.deserialize(&bytes).unwrap();
    assert_eq!(*data, *back);
}

#[test]
fn struct_with_rc_field_round_trips() {
    #[derive(ForyObject, Debug, PartialEq)]
    struct Node {
        value: i32,
        label: Rc<String>,
    }

    let mut fory = Fory::default();
    fory.register::<Node>(600).unwrap();

    let node = Node {
        value: 9,
        label: Rc::new("leaf".to_string()),
    };
    let bytes = fory.serialize(&node).unwrap();
    let back: Node = fory.deserialize(&bytes).unwrap();
    assert_eq!(node, back);
}

#[test]
fn shared_rc_allocation_is_deduped_across_two_fields() {
    #[derive(ForyObject, Debug, PartialEq)]
    struct Pair {
        first: Rc<String>,
        second: Rc<String>,
    }

    let mut fory = Fory::default();
    fory.register::<Pair>(601).unwrap();

    let shared = Rc::new("shared".to_string());
    let pair = Pair {
        first: Rc::clone(&shared),
        second: Rc::clone(&shared),
    };
    let bytes = fory.serialize(&pair).unwrap();
    let back: Pair = fory.deserialize(&bytes).unwrap();
    assert_eq!(*back.first, "shared");
    assert!(Rc::ptr_eq(&back.first, &back.second));
}
