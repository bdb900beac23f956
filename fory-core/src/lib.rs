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

//! Wire format, type registry and reference-tracked serializers for the
//! cross-language core protocol. `xeno-derive` generates the
//! [`serializer::StructSerializer`]/[`serializer::EnumSerializer`]/
//! [`serializer::UnionSerializer`] impls this crate's traits describe; the
//! `fory` facade crate re-exports both for application use.

pub mod buffer;
pub mod error;
pub mod fory;
pub mod meta;
pub mod resolver;
pub mod serializer;
pub mod stream;
pub mod types;

pub use error::{Error, Result};
pub use fory::Fory;
pub use types::Mode;
