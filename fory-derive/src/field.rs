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

//! Shared helpers for classifying a field's Rust type: whether it skips the
//! ref flag, whether it's `Option<_>`, and how to build a `FieldType`
//! descriptor for it at derive time.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{GenericArgument, Path, PathArguments, Type};

/// Last path segment's ident, e.g. `"Option"` for `std::option::Option<T>`.
fn last_segment_ident(path: &Path) -> Option<String> {
    path.segments.last().map(|s| s.ident.to_string())
}

fn single_generic_arg(path: &Path) -> Option<&Type> {
    let seg = path.segments.last()?;
    match &seg.arguments {
        PathArguments::AngleBracketed(args) => args.args.iter().find_map(|a| match a {
            GenericArgument::Type(t) => Some(t),
            _ => None,
        }),
        _ => None,
    }
}

fn generic_args(path: &Path) -> Vec<&Type> {
    let seg = match path.segments.last() {
        Some(s) => s,
        None => return Vec::new(),
    };
    match &seg.arguments {
        PathArguments::AngleBracketed(args) => args
            .args
            .iter()
            .filter_map(|a| match a {
                GenericArgument::Type(t) => Some(t),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// If `ty` is `Option<Inner>`, returns `Inner`; otherwise `None`.
pub fn option_inner(ty: &Type) -> Option<&Type> {
    if let Type::Path(p) = ty {
        if last_segment_ident(&p.path).as_deref() == Some("Option") {
            return single_generic_arg(&p.path);
        }
    }
    None
}

/// True for the fixed-width scalar types whose struct fields elide the ref
/// flag entirely (mirrors `xeno_core::serializer::get_skip_ref_flag`, but
/// decided at macro-expansion time from the written-out type name since the
/// macro has no access to the registry).
pub fn skips_ref_flag(ty: &Type) -> bool {
    if let Type::Path(p) = ty {
        if let Some(ident) = last_segment_ident(&p.path) {
            return matches!(
                ident.as_str(),
                "bool" | "i8" | "i16" | "i32" | "i64" | "f32" | "f64"
            );
        }
    }
    false
}

/// Builds the `xeno_core::meta::FieldType` construction expression used by
/// generated `fory_type_def` bodies. Falls back to `UNKNOWN` for shapes this
/// derive doesn't model precisely (nested user types, smart pointers); the
/// fallback only affects schema-evolution introspection, not the actual
/// wire bytes, since reading/writing a known local field always goes
/// through that field's own `Serializer` impl rather than this descriptor.
pub fn field_type_expr(ty: &Type) -> TokenStream {
    if let Some(inner) = option_inner(ty) {
        let inner_expr = field_type_expr(inner);
        return quote! { (#inner_expr).nullable(true) };
    }
    if let Type::Path(p) = ty {
        if let Some(ident) = last_segment_ident(&p.path) {
            let type_id = match ident.as_str() {
                "bool" => Some(quote! { xeno_core::types::TypeId::BOOL }),
                "i8" => Some(quote! { xeno_core::types::TypeId::INT8 }),
                "i16" => Some(quote! { xeno_core::types::TypeId::INT16 }),
                "i32" => Some(quote! { xeno_core::types::TypeId::INT32 }),
                "i64" => Some(quote! { xeno_core::types::TypeId::INT64 }),
                "u8" => Some(quote! { xeno_core::types::TypeId::UINT8 }),
                "u16" => Some(quote! { xeno_core::types::TypeId::UINT16 }),
                "u32" => Some(quote! { xeno_core::types::TypeId::UINT32 }),
                "u64" => Some(quote! { xeno_core::types::TypeId::UINT64 }),
                "f32" => Some(quote! { xeno_core::types::TypeId::FLOAT32 }),
                "f64" => Some(quote! { xeno_core::types::TypeId::FLOAT64 }),
                "u128" => Some(quote! { xeno_core::types::TypeId::U128 }),
                "i128" => Some(quote! { xeno_core::types::TypeId::INT128 }),
                "usize" => Some(quote! { xeno_core::types::TypeId::USIZE }),
                "isize" => Some(quote! { xeno_core::types::TypeId::ISIZE }),
                "String" => Some(quote! { xeno_core::types::TypeId::STRING }),
                _ => None,
            };
            if let Some(type_id) = type_id {
                return quote! { xeno_core::meta::FieldType::new(#type_id as u32) };
            }
            match ident.as_str() {
                "Vec" | "HashSet" | "BTreeSet" => {
                    let kind = if ident == "Vec" {
                        quote! { xeno_core::types::TypeId::LIST }
                    } else {
                        quote! { xeno_core::types::TypeId::SET }
                    };
                    let elem = generic_args(&p.path).first().map(|t| field_type_expr(t));
                    let generics = match elem {
                        Some(e) => quote! { vec![#e] },
                        None => quote! { vec![] },
                    };
                    return quote! {
                        xeno_core::meta::FieldType::new(#kind as u32).with_generics(#generics)
                    };
                }
                "HashMap" | "BTreeMap" => {
                    let args = generic_args(&p.path);
                    let key = args
                        .first()
                        .map(|t| field_type_expr(t))
                        .unwrap_or_else(|| quote! { xeno_core::meta::FieldType::new(xeno_core::types::TypeId::UNKNOWN as u32) });
                    let value = args
                        .get(1)
                        .map(|t| field_type_expr(t))
                        .unwrap_or_else(|| quote! { xeno_core::meta::FieldType::new(xeno_core::types::TypeId::UNKNOWN as u32) });
                    return quote! {
                        xeno_core::meta::FieldType::new(xeno_core::types::TypeId::MAP as u32)
                            .with_generics(vec![#key, #value])
                    };
                }
                "Box" | "Rc" | "Arc" | "RefCell" => {
                    if let Some(inner) = single_generic_arg(&p.path) {
                        return field_type_expr(inner);
                    }
                }
                _ => {}
            }
        }
    }
    quote! { xeno_core::meta::FieldType::new(xeno_core::types::TypeId::UNKNOWN as u32) }
}
