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
use crate::meta::{MetaString, TypeMeta, NAMESPACE_ENCODER, TYPE_NAME_ENCODER};
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::{Serializer, StructSerializer};
use std::any::{Any, TypeId as RustTypeId};
use std::collections::HashMap;

/// A type id past this value was assigned by the caller (user struct/enum
/// registration) rather than being one of the built-in primitive ids.
pub const USER_TYPE_ID_START: u32 = 256;

pub type WriteDataFn = fn(&dyn Any, &mut WriteContext, bool) -> Result<(), Error>;
pub type ReadDataFn = fn(&mut ReadContext, bool) -> Result<Box<dyn Any>, Error>;

fn write_data_erased<T: Serializer>(
    value: &dyn Any,
    context: &mut WriteContext,
    is_field: bool,
) -> Result<(), Error> {
    let value = value
        .downcast_ref::<T>()
        .ok_or_else(|| Error::InvalidData("harness type mismatch on write".into()))?;
    value.fory_write_data(context, is_field)
}

fn read_data_erased<T: Serializer>(
    context: &mut ReadContext,
    is_field: bool,
) -> Result<Box<dyn Any>, Error> {
    let value = T::fory_read_data(context, is_field)?;
    Ok(Box::new(value))
}

/// Type-erased read/write entry point for a registered type, looked up by
/// numeric or named type id so polymorphic containers (`Box<dyn Any>` and
/// friends) can dispatch to the concrete type written on the wire.
#[derive(Clone, Copy)]
pub struct Harness {
    write_fn: WriteDataFn,
    read_fn: ReadDataFn,
}

impl Harness {
    pub fn new<T: Serializer>() -> Self {
        Self {
            write_fn: write_data_erased::<T>,
            read_fn: read_data_erased::<T>,
        }
    }

    pub fn get_write_data_fn(&self) -> WriteDataFn {
        self.write_fn
    }

    pub fn get_read_data_fn(&self) -> ReadDataFn {
        self.read_fn
    }
}

/// Schema metadata for a registered struct/enum type: its canonical
/// `TypeMeta` plus the identifiers it was registered under.
#[derive(Clone)]
pub struct TypeInfo {
    type_meta: TypeMeta,
    numeric_type_id: Option<u32>,
    namespace: MetaString,
    type_name: MetaString,
    register_by_name: bool,
}

impl TypeInfo {
    pub fn new<T: StructSerializer>(
        type_resolver: &TypeResolver,
        numeric_type_id: Option<u32>,
        namespace: &str,
        type_name: &str,
        register_by_name: bool,
    ) -> Result<Self, Error> {
        let type_meta = T::fory_type_def(
            type_resolver,
            namespace.to_string(),
            type_name.to_string(),
            register_by_name,
        );
        Ok(Self {
            type_meta,
            numeric_type_id,
            namespace: NAMESPACE_ENCODER
                .encode(namespace)
                .map_err(|e| Error::InvalidMetaString {
                    reason: e.to_string(),
                })?,
            type_name: TYPE_NAME_ENCODER
                .encode(type_name)
                .map_err(|e| Error::InvalidMetaString {
                    reason: e.to_string(),
                })?,
            register_by_name,
        })
    }

    pub fn get_type_meta(&self) -> &TypeMeta {
        &self.type_meta
    }

    pub fn get_numeric_type_id(&self) -> Option<u32> {
        self.numeric_type_id
    }

    pub fn get_namespace(&self) -> &MetaString {
        &self.namespace
    }

    pub fn get_type_name(&self) -> &MetaString {
        &self.type_name
    }

    pub fn is_register_by_name(&self) -> bool {
        self.register_by_name
    }
}

/// Identifiers an enum type was registered under (spec.md #4.J); unlike
/// [`TypeInfo`] there is no `TypeMeta`, since enum schema evolution is
/// limited to ordinal/name dispatch rather than per-field descriptors.
#[derive(Clone)]
pub struct EnumInfo {
    numeric_type_id: Option<u32>,
    namespace: MetaString,
    type_name: MetaString,
    register_by_name: bool,
}

impl EnumInfo {
    pub fn get_numeric_type_id(&self) -> Option<u32> {
        self.numeric_type_id
    }

    pub fn get_namespace(&self) -> &MetaString {
        &self.namespace
    }

    pub fn get_type_name(&self) -> &MetaString {
        &self.type_name
    }

    pub fn is_register_by_name(&self) -> bool {
        self.register_by_name
    }
}

/// Central registry mapping Rust types to wire type ids and back, keyed
/// either numerically (builtin/extension types) or by `(namespace,
/// type_name)` (structs/enums registered by name for cross-language
/// schema evolution).
#[derive(Default)]
pub struct TypeResolver {
    harness_by_id: HashMap<u32, Harness>,
    harness_by_name: HashMap<(MetaString, MetaString), Harness>,
    type_info_by_id: HashMap<u32, TypeInfo>,
    type_info_by_name: HashMap<(MetaString, MetaString), TypeInfo>,
    rust_type_to_key: HashMap<RustTypeId, (MetaString, MetaString)>,
    enum_info_by_id: HashMap<u32, EnumInfo>,
    enum_info_by_name: HashMap<(MetaString, MetaString), EnumInfo>,
    rust_type_to_enum_key: HashMap<RustTypeId, (MetaString, MetaString)>,
    rust_type_to_numeric_id: HashMap<RustTypeId, u32>,
    next_user_type_id: u32,
    compatible: bool,
}

impl TypeResolver {
    pub fn new() -> Self {
        Self {
            next_user_type_id: USER_TYPE_ID_START,
            ..Default::default()
        }
    }

    /// Whether structs in this registry use compatible/evolving mode
    /// (per-chunk field descriptors, skip-on-unknown) rather than
    /// schema-consistent mode, a registry-wide choice set by
    /// `Fory::builder().compatible(..)`.
    pub fn is_compatible(&self) -> bool {
        self.compatible
    }

    pub fn set_compatible(&mut self, compatible: bool) {
        self.compatible = compatible;
    }

    /// Registers a struct/enum type under an explicit numeric id (when
    /// `register_by_name` is false) or purely by name. `explicit_id` lets a
    /// caller pin the numeric id (spec.md §6: `register(type, id)`); `None`
    /// falls back to the registry's auto-incrementing counter.
    pub fn register<T: StructSerializer>(
        &mut self,
        namespace: &str,
        type_name: &str,
        register_by_name: bool,
        explicit_id: Option<u32>,
    ) -> Result<u32, Error> {
        let numeric_type_id = if register_by_name {
            None
        } else if let Some(id) = explicit_id {
            Some(id)
        } else {
            let id = self.next_user_type_id;
            self.next_user_type_id += 1;
            Some(id)
        };
        let type_info = TypeInfo::new::<T>(self, numeric_type_id, namespace, type_name, register_by_name)?;
        let harness = Harness::new::<T>();

        if let Some(id) = numeric_type_id {
            self.harness_by_id.insert(id, harness);
            self.type_info_by_id.insert(id, type_info.clone());
        }
        let key = (type_info.namespace.clone(), type_info.type_name.clone());
        self.rust_type_to_key
            .insert(RustTypeId::of::<T>(), key.clone());
        self.harness_by_name.insert(key.clone(), harness);
        self.type_info_by_name.insert(key, type_info);

        Ok(numeric_type_id.unwrap_or(0))
    }

    /// Looks up the `TypeInfo` a `#[derive(ForyObject)]` type was registered
    /// under, by its Rust type rather than by the wire-facing numeric/name
    /// keys. Used by generated `fory_get_type_id`/`fory_write_type_info`
    /// impls, which only know `Self` at the call site.
    pub fn get_type_info_by_rust_type<T: 'static>(&self) -> Option<&TypeInfo> {
        self.get_type_info_by_rust_type_id(RustTypeId::of::<T>())
    }

    pub fn get_type_info_by_rust_type_id(&self, rust_type: RustTypeId) -> Option<&TypeInfo> {
        let key = self.rust_type_to_key.get(&rust_type)?;
        self.type_info_by_name.get(key)
    }

    /// Resolves the on-wire type id for a concrete value found behind a
    /// `Box<dyn Any>`/`Rc<dyn Any>`/`Arc<dyn Any>` trait object, given its
    /// runtime [`RustTypeId`]: a struct/enum composes its id the same way
    /// [`get_type_info_by_rust_type_id`](Self::get_type_info_by_rust_type_id)'s
    /// caller would, a plain extension type (registered through
    /// [`register_serializer`](Self::register_serializer)) returns its
    /// fixed numeric id directly.
    pub fn get_type_id_by_rust_type_id(&self, rust_type: RustTypeId) -> Option<u32> {
        if let Some(info) = self.get_type_info_by_rust_type_id(rust_type) {
            let base = info.get_numeric_type_id().unwrap_or(0);
            return Some(if info.is_register_by_name() {
                if self.compatible {
                    crate::types::NAMED_COMPATIBLE_STRUCT
                } else {
                    crate::types::NAMED_STRUCT
                }
            } else if self.compatible {
                (base << 8) + crate::types::COMPATIBLE_STRUCT
            } else {
                (base << 8) + crate::types::STRUCT
            });
        }
        self.rust_type_to_numeric_id.get(&rust_type).copied()
    }

    /// Looks up the type-erased read/write entry point for a concrete value
    /// found behind a trait object, by its runtime [`RustTypeId`].
    pub fn get_harness_by_rust_type_id(&self, rust_type: RustTypeId) -> Option<&Harness> {
        if let Some(key) = self.rust_type_to_key.get(&rust_type) {
            return self.harness_by_name.get(key);
        }
        let numeric_id = self.rust_type_to_numeric_id.get(&rust_type)?;
        self.harness_by_id.get(numeric_id)
    }

    /// Registers an enum type (spec.md #4.J) under an explicit numeric id
    /// or purely by name.
    pub fn register_enum<T: 'static>(
        &mut self,
        namespace: &str,
        type_name: &str,
        register_by_name: bool,
        explicit_id: Option<u32>,
    ) -> Result<u32, Error> {
        let numeric_type_id = if register_by_name {
            None
        } else if let Some(id) = explicit_id {
            Some(id)
        } else {
            let id = self.next_user_type_id;
            self.next_user_type_id += 1;
            Some(id)
        };
        let enum_info = EnumInfo {
            numeric_type_id,
            namespace: NAMESPACE_ENCODER
                .encode(namespace)
                .map_err(|e| Error::InvalidMetaString {
                    reason: e.to_string(),
                })?,
            type_name: TYPE_NAME_ENCODER
                .encode(type_name)
                .map_err(|e| Error::InvalidMetaString {
                    reason: e.to_string(),
                })?,
            register_by_name,
        };

        if let Some(id) = numeric_type_id {
            self.enum_info_by_id.insert(id, enum_info.clone());
        }
        let key = (enum_info.namespace.clone(), enum_info.type_name.clone());
        self.rust_type_to_enum_key
            .insert(RustTypeId::of::<T>(), key.clone());
        self.enum_info_by_name.insert(key, enum_info);

        Ok(numeric_type_id.unwrap_or(0))
    }

    pub fn get_enum_info_by_rust_type<T: 'static>(&self) -> Option<&EnumInfo> {
        let key = self.rust_type_to_enum_key.get(&RustTypeId::of::<T>())?;
        self.enum_info_by_name.get(key)
    }

    pub fn get_enum_info_by_id(&self, type_id: u32) -> Option<&EnumInfo> {
        self.enum_info_by_id.get(&type_id)
    }

    pub fn get_enum_info_by_name(
        &self,
        namespace: &MetaString,
        type_name: &MetaString,
    ) -> Option<&EnumInfo> {
        self.enum_info_by_name
            .get(&(namespace.clone(), type_name.clone()))
    }

    /// Registers a non-struct extension type (e.g. a newtype wrapping a
    /// foreign value) under a fixed numeric type id.
    pub fn register_serializer<T: Serializer>(&mut self, type_id: u32) {
        self.harness_by_id.insert(type_id, Harness::new::<T>());
        self.rust_type_to_numeric_id
            .insert(RustTypeId::of::<T>(), type_id);
    }

    pub fn get_harness_by_id(&self, type_id: u32) -> Option<&Harness> {
        self.harness_by_id.get(&type_id)
    }

    pub fn get_harness_by_name(
        &self,
        namespace: &MetaString,
        type_name: &MetaString,
    ) -> Option<&Harness> {
        self.harness_by_name
            .get(&(namespace.clone(), type_name.clone()))
    }

    pub fn get_type_info_by_id(&self, type_id: u32) -> Option<&TypeInfo> {
        self.type_info_by_id.get(&type_id)
    }

    pub fn get_type_info_by_name(
        &self,
        namespace: &MetaString,
        type_name: &MetaString,
    ) -> Option<&TypeInfo> {
        self.type_info_by_name
            .get(&(namespace.clone(), type_name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregistered_lookups_are_none() {
        let resolver = TypeResolver::new();
        assert!(resolver.get_harness_by_id(999).is_none());
        assert!(resolver.get_type_info_by_id(999).is_none());
    }

    #[test]
    fn user_type_ids_start_past_builtin_range() {
        assert!(USER_TYPE_ID_START >= 256);
    }
}
