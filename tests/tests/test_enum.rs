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
fn fieldless_enum_round_trips_by_ordinal() {
    #[derive(ForyObject, Debug, PartialEq, Clone, Copy)]
    enum Suit {
        Clubs,
        Diamonds,
        Hearts,
        Spades,
        Unknown,
    }

    let mut fory = Fory::default();
    fory.register_enum::<Suit>(10).unwrap();
    let bytes = fory.serialize(&Suit::Hearts).unwrap();
    assert_eq!(fory.deserialize::<Suit>(&bytes).unwrap(), Suit::Hearts);
}

#[test]
fn fieldless_enum_round_trips_by_name() {
    #[derive(ForyObject, Debug, PartialEq, Clone, Copy)]
    enum Suit {
        Clubs,
        Diamonds,
        Hearts,
        Spades,
        Unknown,
    }

    let mut fory = Fory::default();
    fory.register_enum_by_name::<Suit>("cards", "Suit").unwrap();
    let bytes = fory.serialize(&Suit::Spades).unwrap();
    assert_eq!(fory.deserialize::<Suit>(&bytes).unwrap(), Suit::Spades);
}

#[test]
fn data_carrying_enum_round_trips_every_variant_shape() {
    #[derive(ForyObject, Debug, PartialEq)]
    enum Token {
        Plus,
        Number(i64),
        Ident(String),
        Assign { target: String, value: i32 },
    }

    let mut fory = Fory::default();
    fory.register_union::<Token>(20).unwrap();

    for token in [
        Token::Plus,
        Token::Number(-9),
        Token::Ident("foo".to_string()),
        Token::Assign {
            target: "bar".to_string(),
            value: 42,
        },
    ] {
        let bytes = fory.serialize(&token).unwrap();
        let back: Token = fory.deserialize(&bytes).unwrap();
        assert_eq!(token, back);
    }
}

#[test]
fn data_carrying_enum_nests_through_box() {
    #[derive(ForyObject, Debug, PartialEq)]
    enum Token {
        Leaf(i64),
        Child(Box<Token>),
    }

    let mut fory = Fory::default();
    fory.register_union::<Token>(21).unwrap();

    let nested = Token::Child(Box::new(Token::Child(Box::new(Token::Leaf(7)))));
    let bytes = fory.serialize(&nested).unwrap();
    let back: Token = fory.deserialize(&bytes).unwrap();
    assert_eq!(nested, back);
}

#[test]
fn vec_of_unions_round_trips() {
    #[derive(ForyObject, Debug, PartialEq)]
    enum Token {
        Plus,
        Number(i64),
        Ident(String),
    }

    let mut fory = Fory::default();
    fory.register_union::<Token>(22).unwrap();

    let tokens = vec![
        Token::Plus,
        Token::Number(7),
        Token::Ident("x".to_string()),
        Token::Number(-3),
    ];
    let bytes = fory.serialize(&tokens).unwrap();
    let back: Vec<Token> = fory.deserialize(&bytes).unwrap();
    assert_eq!(tokens, back);
}

#[test]
fn vec_of_fieldless_enums_round_trips() {
    #[derive(ForyObject, Debug, PartialEq, Clone, Copy)]
    enum Light {
        Red,
        Yellow,
        Green,
    }

    let mut fory = Fory::default();
    fory.register_enum::<Light>(30).unwrap();

    let sequence = vec![Light::Red, Light::Green, Light::Yellow, Light::Red];
    let bytes = fory.serialize(&sequence).unwrap();
    let back: Vec<Light> = fory.deserialize(&bytes).unwrap();
    assert_eq!(sequence, back);
}
