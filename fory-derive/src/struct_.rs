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

//! Codegen for `#[derive(ForyObject)]` on a plain (named-field) struct.

use crate::field::{field_type_expr, option_inner, skips_ref_flag};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{DataStruct, Ident};

pub fn derive(name: &Ident, data: &DataStruct) -> TokenStream {
    let fields: Vec<_> = match &data.fields {
        syn::Fields::Named(named) => named.named.iter().collect(),
        syn::Fields::Unit => Vec::new(),
        syn::Fields::Unnamed(_) => {
            return syn::Error::new_spanned(
                name,
                "ForyObject does not support tuple structs; use named fields",
            )
            .to_compile_error()
        }
    };

    let field_idents: Vec<&Ident> = fields.iter().map(|f| f.ident.as_ref().unwrap()).collect();
    let field_names: Vec<String> = field_idents.iter().map(|i| i.to_string()).collect();
    let field_tys: Vec<&syn::Type> = fields.iter().map(|f| &f.ty).collect();

    let type_def_fields = field_tys.iter().zip(field_names.iter()).map(|(ty, name)| {
        let ft = field_type_expr(ty);
        quote! { xeno_core::meta::FieldInfo::new(#name, #ft) }
    });

    let write_fields = field_idents.iter().zip(field_tys.iter()).map(|(ident, ty)| {
        gen_write_field(ident, ty)
    });

    let read_fields = field_idents.iter().zip(field_tys.iter()).map(|(ident, ty)| {
        gen_read_field(ident, ty)
    });

    let compatible_write_arms = field_names.iter().zip(field_idents.iter()).zip(field_tys.iter()).map(
        |((field_name, ident), ty)| {
            let write = gen_write_field(ident, ty);
            quote! { #field_name => { #write } }
        },
    );

    let struct_name_str = name.to_string();
    let compatible_locals: Vec<Ident> = field_idents
        .iter()
        .map(|i| format_ident!("__fory_field_{}", i))
        .collect();
    let compatible_decls = field_idents.iter().zip(field_tys.iter()).zip(compatible_locals.iter()).map(
        |((_ident, ty), local)| {
            quote! { let mut #local: Option<#ty> = None; }
        },
    );
    let compatible_arms = field_names.iter().zip(field_tys.iter()).zip(compatible_locals.iter()).map(
        |((field_name, ty), local)| {
            let read_expr = gen_read_expr(ty);
            quote! {
                #field_name => {
                    #local = Some(#read_expr);
                }
            }
        },
    );
    let compatible_construct = field_idents.iter().zip(compatible_locals.iter()).map(|(ident, local)| {
        quote! {
            #ident: match #local {
                Some(v) => v,
                None => xeno_core::serializer::ForyDefault::fory_default(),
            }
        }
    });

    let default_fields = field_idents.iter().map(|ident| {
        quote! { #ident: xeno_core::serializer::ForyDefault::fory_default() }
    });

    quote! {
        impl xeno_core::serializer::StructSerializer for #name {
            fn fory_type_def(
                _type_resolver: &xeno_core::resolver::type_resolver::TypeResolver,
                namespace: String,
                type_name: String,
                _register_by_name: bool,
            ) -> xeno_core::meta::TypeMeta {
                xeno_core::meta::TypeMeta::new(
                    &namespace,
                    &type_name,
                    vec![#(#type_def_fields),*],
                )
            }

            fn fory_write_compatible(&self, context: &mut xeno_core::resolver::context::WriteContext) -> Result<(), xeno_core::error::Error> {
                // Compatible mode writes fields in the same canonical order
                // `TypeMeta::new` sorted them into, independent of struct
                // declaration order, so a peer with a differently-shaped
                // struct can still line the wire bytes up by name.
                let field_order: Vec<String> = {
                    let info = context
                        .type_resolver
                        .get_type_info_by_rust_type::<Self>()
                        .expect("struct_type_id already validated registration");
                    info.get_type_meta()
                        .fields
                        .iter()
                        .map(|f| f.field_name.original.clone())
                        .collect()
                };
                for field_name in field_order.iter() {
                    match field_name.as_str() {
                        #(#compatible_write_arms)*
                        other => {
                            return Err(xeno_core::error::Error::InvalidData(format!(
                                "unknown field {other} in compatible write of {}",
                                stringify!(#name)
                            )))
                        }
                    }
                }
                Ok(())
            }

            fn fory_read_compatible(
                context: &mut xeno_core::resolver::context::ReadContext,
                type_meta: &xeno_core::meta::TypeMeta,
            ) -> Result<Self, xeno_core::error::Error> {
                #(#compatible_decls)*
                for field in type_meta.fields.iter() {
                    match field.field_name.original.as_str() {
                        #(#compatible_arms)*
                        _ => {
                            xeno_core::serializer::skip::skip_field(context, &field.field_type)?;
                        }
                    }
                }
                Ok(#name {
                    #(#compatible_construct),*
                })
            }
        }

        impl xeno_core::serializer::Serializer for #name {
            fn fory_write(&self, context: &mut xeno_core::resolver::context::WriteContext, _is_field: bool) -> Result<(), xeno_core::error::Error> {
                xeno_core::serializer::struct_::write::<Self>(self, context, true)
            }

            fn fory_write_data(&self, context: &mut xeno_core::resolver::context::WriteContext, _is_field: bool) -> Result<(), xeno_core::error::Error> {
                #(#write_fields)*
                Ok(())
            }

            fn fory_write_type_info(context: &mut xeno_core::resolver::context::WriteContext, _is_field: bool) -> Result<(), xeno_core::error::Error> {
                xeno_core::serializer::struct_::write_type_info::<Self>(context)
            }

            fn fory_read(context: &mut xeno_core::resolver::context::ReadContext, _is_field: bool) -> Result<Self, xeno_core::error::Error> {
                xeno_core::serializer::struct_::read::<Self>(context)
            }

            fn fory_read_data(context: &mut xeno_core::resolver::context::ReadContext, _is_field: bool) -> Result<Self, xeno_core::error::Error> {
                #(#read_fields)*
                Ok(#name { #(#field_idents),* })
            }

            fn fory_read_type_info(context: &mut xeno_core::resolver::context::ReadContext, _is_field: bool) -> Result<(), xeno_core::error::Error> {
                xeno_core::serializer::struct_::read_type_info::<Self>(context).map(|_| ())
            }

            fn fory_get_type_id(type_resolver: &xeno_core::resolver::type_resolver::TypeResolver) -> Result<u32, xeno_core::error::Error> {
                xeno_core::serializer::struct_::struct_type_id::<Self>(type_resolver)
            }

            fn fory_static_type_id() -> xeno_core::types::TypeId {
                xeno_core::types::TypeId::STRUCT
            }

            fn as_any(&self) -> &dyn std::any::Any {
                self
            }
        }

        impl xeno_core::serializer::ForyDefault for #name {
            fn fory_default() -> Self {
                #name { #(#default_fields),* }
            }
        }

        #[allow(dead_code)]
        const _: &str = #struct_name_str;
    }
}

fn gen_write_field(ident: &Ident, ty: &syn::Type) -> TokenStream {
    if let Some(inner) = option_inner(ty) {
        let _ = inner;
        return quote! {
            xeno_core::serializer::Serializer::fory_write(&self.#ident, context, true)?;
        };
    }
    if skips_ref_flag(ty) {
        quote! {
            xeno_core::serializer::Serializer::fory_write_data(&self.#ident, context, true)?;
        }
    } else {
        quote! {
            xeno_core::serializer::Serializer::fory_write(&self.#ident, context, true)?;
        }
    }
}

fn gen_read_expr(ty: &syn::Type) -> TokenStream {
    if option_inner(ty).is_some() {
        return quote! {
            <#ty as xeno_core::serializer::Serializer>::fory_read(context, true)?
        };
    }
    if skips_ref_flag(ty) {
        quote! {
            <#ty as xeno_core::serializer::Serializer>::fory_read_data(context, true)?
        }
    } else {
        quote! {
            <#ty as xeno_core::serializer::Serializer>::fory_read(context, true)?
        }
    }
}

fn gen_read_field(ident: &Ident, ty: &syn::Type) -> TokenStream {
    let expr = gen_read_expr(ty);
    quote! {
        let #ident = #expr;
    }
}
