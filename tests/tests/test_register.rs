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

#[derive(ForyObject, Debug, PartialEq)]
struct TypeA {}

#[derive(ForyObject, Debug, PartialEq)]
struct TypeB {
    a: TypeA,
}

#[test]
fn nested_type_registered_after_its_container_still_resolves() {
    let mut fory = Fory::default();
    fory.register::<TypeB>(101).unwrap();
    fory.register::<TypeA>(100).unwrap();

    let b = TypeB { a: TypeA {} };
    let bytes = fory.serialize(&b).unwrap();
    let back: TypeB = fory.deserialize(&bytes).unwrap();
    assert_eq!(b, back);
}

#[test]
fn missing_nested_registration_is_an_error_not_a_panic() {
    let mut fory = Fory::default();
    fory.register::<TypeB>(102).unwrap();

    let b = TypeB { a: TypeA {} };
    assert!(fory.serialize(&b).is_err());
}

#[test]
fn duplicate_registration_under_the_same_id_is_allowed_to_overwrite() {
    #[derive(ForyObject, Debug, PartialEq)]
    struct Solo {
        n: i32,
    }

    let mut fory = Fory::default();
    fory.register::<Solo>(103).unwrap();
    fory.register::<Solo>(103).unwrap();
    let bytes = fory.serialize(&Solo { n: 5 }).unwrap();
    assert_eq!(fory.deserialize::<Solo>(&bytes).unwrap(), Solo { n: 5 });
}

#[test]
fn register_by_namespace_round_trips() {
    #[derive(ForyObject, Debug, PartialEq)]
    struct Widget {
        id: i32,
    }

    let mut fory = Fory::default();
    fory.register_by_namespace::<Widget>("shop", "Widget").unwrap();
    let bytes = fory.serialize(&Widget { id: 1 }).unwrap();
    assert_eq!(fory.deserialize::<Widget>(&bytes).unwrap(), Widget { id: 1 });
}
