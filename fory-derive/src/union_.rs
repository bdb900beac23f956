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

//! Codegen for `#[derive(ForyObject)]` on a data-carrying enum (tagged
//! union, spec.md #4.J): each variant's fields are written/read positionally
//! under a leading `varuint` tag, the same shape
//! [`xeno_core::serializer::union`] hand-demonstrates.

use crate::field::{option_inner, skips_ref_flag};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DataEnum, Fields, Ident};

pub fn derive(name: &Ident, data: &DataEnum) -> TokenStream {
    let variants: Vec<_> = data.variants.iter().collect();

    let tag_arms = variants.iter().enumerate().map(|(i, v)| {
        let vi = &v.ident;
        let i = i as u32;
        let pat = match &v.fields {
            Fields::Named(_) => quote! { #name::#vi { .. } },
            Fields::Unit => quote! { #name::#vi },
            Fields::Unnamed(_) => quote! { #name::#vi(..) },
        };
        quote! { #pat => #i, }
    });

    let write_arms = variants.iter().map(|v| {
        let vi = &v.ident;
        match &v.fields {
            Fields::Named(named) => {
                let idents: Vec<&Ident> = named.named.iter().map(|f| f.ident.as_ref().unwrap()).collect();
                let tys: Vec<&syn::Type> = named.named.iter().map(|f| &f.ty).collect();
                let writes = idents.iter().zip(tys.iter()).map(|(id, ty)| write_binding(id, ty));
                quote! {
                    #name::#vi { #(#idents),* } => {
                        #(#writes)*
                    }
                }
            }
            Fields::Unit => quote! { #name::#vi => {} },
            Fields::Unnamed(unnamed) => {
                let bind_idents: Vec<Ident> = (0..unnamed.unnamed.len())
                    .map(|i| quote::format_ident!("__f{}", i))
                    .collect();
                let tys: Vec<&syn::Type> = unnamed.unnamed.iter().map(|f| &f.ty).collect();
                let writes = bind_idents.iter().zip(tys.iter()).map(|(id, ty)| write_binding(id, ty));
                quote! {
                    #name::#vi( #(#bind_idents),* ) => {
                        #(#writes)*
                    }
                }
            }
        }
    });

    let read_arms = variants.iter().enumerate().map(|(i, v)| {
        let vi = &v.ident;
        let i = i as u32;
        match &v.fields {
            Fields::Named(named) => {
                let idents: Vec<&Ident> = named.named.iter().map(|f| f.ident.as_ref().unwrap()).collect();
                let tys: Vec<&syn::Type> = named.named.iter().map(|f| &f.ty).collect();
                let reads = idents.iter().zip(tys.iter()).map(|(id, ty)| read_binding(id, ty));
                quote! {
                    #i => {
                        #(#reads)*
                        Ok(#name::#vi { #(#idents),* })
                    }
                }
            }
            Fields::Unit => quote! { #i => Ok(#name::#vi), },
            Fields::Unnamed(unnamed) => {
                let bind_idents: Vec<Ident> = (0..unnamed.unnamed.len())
                    .map(|i| quote::format_ident!("__f{}", i))
                    .collect();
                let tys: Vec<&syn::Type> = unnamed.unnamed.iter().map(|f| &f.ty).collect();
                let reads = bind_idents.iter().zip(tys.iter()).map(|(id, ty)| read_binding(id, ty));
                quote! {
                    #i => {
                        #(#reads)*
                        Ok(#name::#vi( #(#bind_idents),* ))
                    }
                }
            }
        }
    });

    let first_variant_default = variants.first().map(|v| {
        let vi = &v.ident;
        match &v.fields {
            Fields::Named(named) => {
                let inits = named.named.iter().map(|f| {
                    let id = f.ident.as_ref().unwrap();
                    quote! { #id: xeno_core::serializer::ForyDefault::fory_default() }
                });
                quote! { #name::#vi { #(#inits),* } }
            }
            Fields::Unit => quote! { #name::#vi },
            Fields::Unnamed(unnamed) => {
                let inits = unnamed
                    .unnamed
                    .iter()
                    .map(|_| quote! { xeno_core::serializer::ForyDefault::fory_default() });
                quote! { #name::#vi( #(#inits),* ) }
            }
        }
    });
    let default_body = match first_variant_default {
        Some(d) => d,
        None => {
            return syn::Error::new_spanned(name, "ForyObject union must have at least one variant")
                .to_compile_error()
        }
    };

    quote! {
        impl xeno_core::serializer::union::UnionSerializer for #name {
            fn fory_variant_tag(&self) -> u32 {
                match self {
                    #(#tag_arms)*
                }
            }

            fn fory_write_variant_data(&self, context: &mut xeno_core::resolver::context::WriteContext) -> Result<(), xeno_core::error::Error> {
                match self {
                    #(#write_arms)*
                }
                Ok(())
            }

            fn fory_read_variant_data(tag: u32, context: &mut xeno_core::resolver::context::ReadContext) -> Result<Self, xeno_core::error::Error> {
                match tag {
                    #(#read_arms)*
                    other => Err(xeno_core::error::Error::InvalidData(format!("unknown union tag {other} for {}", stringify!(#name)))),
                }
            }
        }

        impl xeno_core::serializer::Serializer for #name {
            fn fory_write(&self, context: &mut xeno_core::resolver::context::WriteContext, _is_field: bool) -> Result<(), xeno_core::error::Error> {
                xeno_core::serializer::union::write::<Self>(self, context, true)
            }

            fn fory_write_data(&self, context: &mut xeno_core::resolver::context::WriteContext, _is_field: bool) -> Result<(), xeno_core::error::Error> {
                context.writer.var_uint32(xeno_core::serializer::union::UnionSerializer::fory_variant_tag(self));
                xeno_core::serializer::union::UnionSerializer::fory_write_variant_data(self, context)
            }

            fn fory_write_type_info(context: &mut xeno_core::resolver::context::WriteContext, _is_field: bool) -> Result<(), xeno_core::error::Error> {
                xeno_core::serializer::union::write_type_info::<Self>(context)
            }

            fn fory_read(context: &mut xeno_core::resolver::context::ReadContext, _is_field: bool) -> Result<Self, xeno_core::error::Error> {
                xeno_core::serializer::union::read::<Self>(context)
            }

            fn fory_read_data(context: &mut xeno_core::resolver::context::ReadContext, _is_field: bool) -> Result<Self, xeno_core::error::Error> {
                let tag = context.reader.var_uint32()?;
                <Self as xeno_core::serializer::union::UnionSerializer>::fory_read_variant_data(tag, context)
            }

            fn fory_read_type_info(context: &mut xeno_core::resolver::context::ReadContext, _is_field: bool) -> Result<(), xeno_core::error::Error> {
                xeno_core::serializer::union::read_type_info::<Self>(context)
            }

            fn fory_get_type_id(type_resolver: &xeno_core::resolver::type_resolver::TypeResolver) -> Result<u32, xeno_core::error::Error> {
                type_resolver
                    .get_enum_info_by_rust_type::<Self>()
                    .map(|info| {
                        xeno_core::serializer::union::actual_type_id(
                            info.get_numeric_type_id().unwrap_or(0),
                            info.is_register_by_name(),
                        )
                    })
                    .ok_or_else(|| xeno_core::error::Error::unregistered_type(stringify!(#name)))
            }

            fn fory_static_type_id() -> xeno_core::types::TypeId {
                xeno_core::types::TypeId::UNION
            }

            fn as_any(&self) -> &dyn std::any::Any {
                self
            }
        }

        impl xeno_core::serializer::ForyDefault for #name {
            fn fory_default() -> Self {
                #default_body
            }
        }
    }
}

fn write_binding(ident: &Ident, ty: &syn::Type) -> TokenStream {
    if option_inner(ty).is_some() || !skips_ref_flag(ty) {
        quote! {
            xeno_core::serializer::Serializer::fory_write(#ident, context, true)?;
        }
    } else {
        quote! {
            xeno_core::serializer::Serializer::fory_write_data(#ident, context, true)?;
        }
    }
}

fn read_binding(ident: &Ident, ty: &syn::Type) -> TokenStream {
    let expr = if option_inner(ty).is_some() || !skips_ref_flag(ty) {
        quote! { <#ty as xeno_core::serializer::Serializer>::fory_read(context, true)? }
    } else {
        quote! { <#ty as xeno_core::serializer::Serializer>::fory_read_data(context, true)? }
    };
    quote! { let #ident = #expr; }
}
