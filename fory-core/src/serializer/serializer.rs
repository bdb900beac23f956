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

use crate::error::Error;
use crate::meta::TypeMeta;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::resolver::type_resolver::TypeResolver;
use crate::types::TypeId;
use std::any::Any;

/// A value that can be written to and read from the Fory wire format.
///
/// `fory_write`/`fory_read` are the entry points callers use; they dispatch
/// to `fory_write_data`/`fory_read_data` for the value's own bytes and to
/// `fory_write_type_info`/`fory_read_type_info` for the leading type
/// descriptor, which most types only need in non-field (top-level or
/// collection-element) position.
pub trait Serializer: Sized + 'static {
    /// Writes the full value: ref flag, type info (when not a struct field),
    /// then payload.
    fn fory_write(&self, context: &mut WriteContext, is_field: bool) -> Result<(), Error> {
        context
            .ref_writer
            .write_non_ref_value(&mut context.writer, false);
        Self::fory_write_type_info(context, is_field)?;
        self.fory_write_data(context, is_field)
    }

    /// Writes the value's own bytes only, no ref flag or type info.
    fn fory_write_data(&self, context: &mut WriteContext, is_field: bool) -> Result<(), Error>;

    /// Writes the leading type descriptor. Most scalar types skip this in
    /// field position; collections and structs emit it at the top level and
    /// in compatible mode.
    #[allow(unused_variables)]
    fn fory_write_type_info(context: &mut WriteContext, is_field: bool) -> Result<(), Error> {
        Ok(())
    }

    fn fory_read(context: &mut ReadContext, is_field: bool) -> Result<Self, Error> {
        Self::fory_read_type_info(context, is_field)?;
        Self::fory_read_data(context, is_field)
    }

    fn fory_read_data(context: &mut ReadContext, is_field: bool) -> Result<Self, Error>;

    #[allow(unused_variables)]
    fn fory_read_type_info(context: &mut ReadContext, is_field: bool) -> Result<(), Error> {
        Ok(())
    }

    /// Number of bytes to pre-reserve in the write buffer for a value of
    /// this type; `0` when unknown or variable-length.
    fn fory_reserved_space() -> usize {
        0
    }

    /// The wire type id for this Rust type given the current type
    /// registry (struct types need the registry to resolve their
    /// registered numeric/user id).
    fn fory_get_type_id(type_resolver: &TypeResolver) -> Result<u32, Error>;

    /// Like [`fory_get_type_id`](Self::fory_get_type_id) but dispatched on a
    /// concrete value, used by trait-object serializers that only know the
    /// static type at runtime.
    fn fory_type_id_dyn(&self, type_resolver: &TypeResolver) -> Result<u32, Error> {
        Self::fory_get_type_id(type_resolver)
    }

    /// The type id this Rust type maps to irrespective of registration,
    /// used to validate compatible-mode field type descriptors.
    fn fory_static_type_id() -> TypeId;

    /// Whether values of this type may appear behind a `Box<dyn Any>` /
    /// `Rc<dyn Any>` / `Arc<dyn Any>` trait object and therefore need a
    /// type id written even in schema-consistent mode.
    fn fory_is_polymorphic() -> bool {
        false
    }

    /// Whether this type is itself a shared pointer (`Rc`/`Arc`) that
    /// tracks identity rather than encoding a plain value.
    fn fory_is_shared_ref() -> bool {
        false
    }

    /// Whether this type is `Option<U>` for some `U`. Chunked
    /// collection/map encoding (spec.md #4.H) uses this to decide whether a
    /// chunk's elements may be individually absent, in which case each
    /// element is written through the full ref-flag-aware `fory_write`/
    /// `fory_read` path instead of the flag-less `_data` methods.
    fn fory_is_option() -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any;
}

/// Produces a cheap placeholder value, used to pad `Vec::with_capacity`
/// allocations and fill `Option::None` slots before the real value (if any)
/// is read in place.
pub trait ForyDefault {
    fn fory_default() -> Self;
}

/// Marker for types allowed as the generic parameter of `Vec<T>` /
/// `HashSet<T>` / `Option<T>`; exists so blanket collection impls don't
/// conflict with the dedicated primitive-array fast paths.
pub trait ForyGeneralList {}

/// Extension for `#[derive(ForyObject)]` struct and enum types: knows how to
/// describe its own schema and how to write/read itself in compatible mode,
/// where fields are looked up by id/name instead of by fixed position.
pub trait StructSerializer: Serializer {
    fn fory_type_def(
        type_resolver: &TypeResolver,
        namespace: String,
        type_name: String,
        register_by_name: bool,
    ) -> TypeMeta;

    fn fory_write_compatible(&self, context: &mut WriteContext) -> Result<(), Error>;

    /// Reads a value using the peer's own field list (`type_meta`, decoded
    /// or recalled by [`struct_::read_type_info`](crate::serializer::struct_::read_type_info))
    /// rather than assuming it matches the local schema field-for-field:
    /// fields the peer dropped are simply absent, fields it added are
    /// skipped via [`skip::skip_field`](crate::serializer::skip::skip_field).
    fn fory_read_compatible(context: &mut ReadContext, type_meta: &TypeMeta) -> Result<Self, Error>;
}

/// Extension for `#[derive(ForyEnum)]` fieldless enum types: ordinal-or-name
/// dispatch (spec.md #4.J) with an `UNKNOWN` sentinel fallback for ordinals
/// or names the local schema doesn't recognize.
pub trait EnumSerializer: Serializer + Sized {
    fn fory_ordinal(&self) -> u32;

    fn fory_variant_name(&self) -> &'static str;

    /// Decodes an ordinal, falling back to the implementation's `UNKNOWN`
    /// sentinel variant for a value outside the known range.
    fn fory_from_ordinal(ordinal: u32) -> Self;

    /// Decodes a variant name, falling back to `UNKNOWN` for an unrecognized
    /// name.
    fn fory_from_variant_name(name: &str) -> Self;
}

/// Extension for homogeneous collection types (`Vec<T>`, `HashSet<T>`, ...)
/// giving access to chunked-encoding element metadata.
pub trait CollectionSerializer: Serializer {
    type Item: Serializer + ForyDefault;

    fn fory_iter(&self) -> Box<dyn Iterator<Item = &Self::Item> + '_>;

    fn fory_from_vec(items: Vec<Self::Item>) -> Self;
}

/// Extension for homogeneous map types (`HashMap<K, V>`, `BTreeMap<K, V>`).
pub trait MapSerializer: Serializer {
    type Key: Serializer + ForyDefault;
    type Value: Serializer + ForyDefault;

    fn fory_iter(&self) -> Box<dyn Iterator<Item = (&Self::Key, &Self::Value)> + '_>;

    fn fory_from_pairs(pairs: Vec<(Self::Key, Self::Value)>) -> Self;
}
