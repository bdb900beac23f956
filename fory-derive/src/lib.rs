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

//! `#[derive(ForyObject)]`: generates the `Serializer` impl (and whichever
//! of `StructSerializer`/`EnumSerializer`/`UnionSerializer` applies) for a
//! struct or enum so it can be registered with and exchanged through a
//! `xeno_core::fory::Fory` instance.
//!
//! Dispatch is on the shape of `syn::Data`: a named-field struct gets
//! `StructSerializer`; an enum whose variants are all unit variants gets
//! `EnumSerializer` (spec.md #4.J fieldless enum encoding); an enum with at
//! least one variant carrying fields gets `UnionSerializer` (tagged union
//! encoding) instead.

mod enum_;
mod field;
mod struct_;
mod union_;

use proc_macro::TokenStream;
use syn::{parse_macro_input, Data, DeriveInput, Fields};

#[proc_macro_derive(ForyObject)]
pub fn derive_fory_object(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    let name = &ast.ident;

    let expanded = match &ast.data {
        Data::Struct(data) => struct_::derive(name, data),
        Data::Enum(data) => {
            let all_unit = data.variants.iter().all(|v| matches!(v.fields, Fields::Unit));
            if all_unit {
                enum_::derive(name, data)
            } else {
                union_::derive(name, data)
            }
        }
        Data::Union(_) => {
            syn::Error::new_spanned(name, "ForyObject does not support `union` items").to_compile_error()
        }
    };

    expanded.into()
}
