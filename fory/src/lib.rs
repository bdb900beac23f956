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

//! Application-facing facade: re-exports the `xeno-core` runtime and the
//! `#[derive(ForyObject)]` macro under one crate, so a downstream
//! `Cargo.toml` needs only this one dependency.

pub use xeno_core::*;
pub use xeno_derive::ForyObject;

/// Re-exports the handful of names most call sites need, so application
/// code can do `use xenolith::prelude::*;` instead of naming each module.
pub mod prelude {
    pub use crate::ForyObject;
    pub use xeno_core::error::{Error, Result};
    pub use xeno_core::fory::Fory;
    pub use xeno_core::serializer::Serializer;
    pub use xeno_core::types::Mode;
}
