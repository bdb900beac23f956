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

//! Codegen for `#[derive(ForyObject)]` on a fieldless enum: ordinal-or-name
//! dispatch with a sentinel `UNKNOWN` fallback (spec.md #4.J).

use proc_macro2::TokenStream;
use quote::quote;
use syn::{DataEnum, Ident};

pub fn derive(name: &Ident, data: &DataEnum) -> TokenStream {
    let variant_idents: Vec<&Ident> = data.variants.iter().map(|v| &v.ident).collect();
    let unknown = variant_idents
        .iter()
        .find(|v| v.to_string().eq_ignore_ascii_case("unknown"));
    let fallback = match unknown {
        Some(v) => quote! { #name::#v },
        None => {
            let first = variant_idents.first();
            match first {
                Some(v) => quote! { #name::#v },
                None => {
                    return syn::Error::new_spanned(name, "ForyObject enum must have at least one variant")
                        .to_compile_error()
                }
            }
        }
    };

    let ordinal_arms = variant_idents.iter().enumerate().map(|(i, v)| {
        let i = i as u32;
        quote! { #name::#v => #i, }
    });
    let name_arms = variant_idents.iter().map(|v| {
        let s = v.to_string();
        quote! { #name::#v => #s, }
    });
    let from_ordinal_arms = variant_idents.iter().enumerate().map(|(i, v)| {
        let i = i as u32;
        quote! { #i => #name::#v, }
    });
    let from_name_arms = variant_idents.iter().map(|v| {
        let s = v.to_string();
        quote! { #s => #name::#v, }
    });

    quote! {
        impl xeno_core::serializer::EnumSerializer for #name {
            fn fory_ordinal(&self) -> u32 {
                match self {
                    #(#ordinal_arms)*
                }
            }

            fn fory_variant_name(&self) -> &'static str {
                match self {
                    #(#name_arms)*
                }
            }

            fn fory_from_ordinal(ordinal: u32) -> Self {
                match ordinal {
                    #(#from_ordinal_arms)*
                    _ => #fallback,
                }
            }

            fn fory_from_variant_name(name: &str) -> Self {
                match name {
                    #(#from_name_arms)*
                    _ => #fallback,
                }
            }
        }

        impl xeno_core::serializer::Serializer for #name {
            fn fory_write(&self, context: &mut xeno_core::resolver::context::WriteContext, _is_field: bool) -> Result<(), xeno_core::error::Error> {
                xeno_core::serializer::enum_::write::<Self>(self, context, true)
            }

            fn fory_write_data(&self, context: &mut xeno_core::resolver::context::WriteContext, _is_field: bool) -> Result<(), xeno_core::error::Error> {
                xeno_core::serializer::enum_::write_data::<Self>(self, context)
            }

            fn fory_write_type_info(context: &mut xeno_core::resolver::context::WriteContext, _is_field: bool) -> Result<(), xeno_core::error::Error> {
                xeno_core::serializer::enum_::write_type_info::<Self>(context)
            }

            fn fory_read(context: &mut xeno_core::resolver::context::ReadContext, _is_field: bool) -> Result<Self, xeno_core::error::Error> {
                xeno_core::serializer::enum_::read::<Self>(context)
            }

            fn fory_read_data(context: &mut xeno_core::resolver::context::ReadContext, _is_field: bool) -> Result<Self, xeno_core::error::Error> {
                xeno_core::serializer::enum_::read_data::<Self>(context)
            }

            fn fory_read_type_info(context: &mut xeno_core::resolver::context::ReadContext, _is_field: bool) -> Result<(), xeno_core::error::Error> {
                xeno_core::serializer::enum_::read_type_info::<Self>(context)
            }

            fn fory_get_type_id(type_resolver: &xeno_core::resolver::type_resolver::TypeResolver) -> Result<u32, xeno_core::error::Error> {
                type_resolver
                    .get_enum_info_by_rust_type::<Self>()
                    .map(|info| {
                        xeno_core::serializer::enum_::actual_type_id(
                            info.get_numeric_type_id().unwrap_or(0),
                            info.is_register_by_name(),
                        )
                    })
                    .ok_or_else(|| xeno_core::error::Error::unregistered_type(stringify!(#name)))
            }

            fn fory_static_type_id() -> xeno_core::types::TypeId {
                xeno_core::types::TypeId::ENUM
            }

            fn as_any(&self) -> &dyn std::any::Any {
                self
            }
        }

        impl xeno_core::serializer::ForyDefault for #name {
            fn fory_default() -> Self {
                #fallback
            }
        }
    }
}
