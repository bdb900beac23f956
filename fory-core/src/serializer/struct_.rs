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

//! Helpers shared by `#[derive(ForyObject)]` struct impls: composing the
//! on-wire type id (spec.md #4.F/#4.I), writing/reading the leading type
//! descriptor (including `TypeMeta` interning for compatible mode), and the
//! debug hooks used to trace field-by-field progress.

use crate::error::Error;
use crate::meta::TypeMeta;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::resolver::type_resolver::TypeResolver;
use crate::serializer::{Serializer, StructSerializer};
use crate::types::TypeId;
use std::any::Any;
use std::sync::OnceLock;

/// Folds a registered type's raw numeric id and registration mode into the
/// composite wire type id (spec.md #4.F): named types always use the fixed
/// `NAMED_STRUCT`/`NAMED_COMPATIBLE_STRUCT` id and resolve their identity
/// from the namespace/type_name pair written alongside; numerically
/// registered types pack their id into the high bits with the struct kind
/// in the low byte.
#[inline(always)]
pub fn actual_type_id(type_id: u32, register_by_name: bool, compatible: bool) -> u32 {
    if compatible {
        if register_by_name {
            TypeId::NAMED_COMPATIBLE_STRUCT as u32
        } else {
            (type_id << 8) + TypeId::COMPATIBLE_STRUCT as u32
        }
    } else if register_by_name {
        TypeId::NAMED_STRUCT as u32
    } else {
        (type_id << 8) + TypeId::STRUCT as u32
    }
}

/// Looks up `T`'s registration and composes its wire type id, for use by
/// generated `Serializer::fory_get_type_id` impls.
pub fn struct_type_id<T: 'static>(type_resolver: &TypeResolver) -> Result<u32, Error> {
    let info = type_resolver
        .get_type_info_by_rust_type::<T>()
        .ok_or_else(|| {
            Error::InvalidData(format!(
                "type {} was not registered with this Fory instance",
                std::any::type_name::<T>()
            ))
        })?;
    Ok(actual_type_id(
        info.get_numeric_type_id().unwrap_or(0),
        info.is_register_by_name(),
        type_resolver.is_compatible(),
    ))
}

/// Writes the leading type descriptor for a registered struct: the
/// composite type id, then either the namespace/type_name pair (named
/// types, schema-consistent mode) or an interned `TypeMeta` ref-id
/// (compatible mode, any registration).
pub fn write_type_info<T: StructSerializer>(context: &mut WriteContext) -> Result<(), Error> {
    let type_id = struct_type_id::<T>(context.type_resolver)?;
    context.writer.var_uint32(type_id);

    let low_byte = type_id & 0xff;
    if low_byte == TypeId::NAMED_STRUCT as u32 {
        let info = context
            .type_resolver
            .get_type_info_by_rust_type::<T>()
            .expect("struct_type_id already validated registration");
        let namespace_mb = context
            .meta_string_writer
            .get_or_create_meta_string_bytes(info.get_namespace())?;
        let type_name_mb = context
            .meta_string_writer
            .get_or_create_meta_string_bytes(info.get_type_name())?;
        context
            .meta_string_writer
            .write_meta_string_bytes(&mut context.writer, namespace_mb);
        context
            .meta_string_writer
            .write_meta_string_bytes(&mut context.writer, type_name_mb);
    } else if low_byte == TypeId::NAMED_COMPATIBLE_STRUCT as u32
        || low_byte == TypeId::COMPATIBLE_STRUCT as u32
    {
        let rust_type = std::any::TypeId::of::<T>();
        let (ref_id, already_written) = context.intern_type_meta(rust_type);
        context.writer.var_uint32(ref_id);
        if !already_written {
            let info = context
                .type_resolver
                .get_type_info_by_rust_type::<T>()
                .expect("struct_type_id already validated registration");
            info.get_type_meta().write(&mut context.writer);
        }
    }
    Ok(())
}

/// Reads back the descriptor written by [`write_type_info`], validating
/// the composite type id and, in compatible mode, decoding (or recalling a
/// previously-interned) `TypeMeta` for the caller to drive field lookup.
pub fn read_type_info<T: StructSerializer>(
    context: &mut ReadContext,
) -> Result<Option<TypeMeta>, Error> {
    let remote_type_id = context.reader.var_uint32()?;
    let local_type_id = struct_type_id::<T>(context.type_resolver)?;
    if remote_type_id != local_type_id {
        return Err(Error::SchemaHashMismatch {
            type_name: std::any::type_name::<T>().to_string(),
            local: local_type_id,
            peer: remote_type_id,
        });
    }

    let low_byte = local_type_id & 0xff;
    if low_byte == TypeId::NAMED_STRUCT as u32 {
        let _namespace = context.meta_string_reader.read_meta_string(&mut context.reader)?;
        let _type_name = context.meta_string_reader.read_meta_string(&mut context.reader)?;
        Ok(None)
    } else if low_byte == TypeId::NAMED_COMPATIBLE_STRUCT as u32
        || low_byte == TypeId::COMPATIBLE_STRUCT as u32
    {
        let ref_id = context.reader.var_uint32()?;
        if let Some(meta) = context.get_type_meta(ref_id) {
            Ok(Some(meta.clone()))
        } else {
            let meta = TypeMeta::read(&mut context.reader)?;
            let stored_id = context.store_type_meta(meta.clone());
            debug_assert_eq!(stored_id, ref_id);
            Ok(Some(meta))
        }
    } else {
        Ok(None)
    }
}

/// Writes a full struct value: ref flag, type descriptor, then payload,
/// dispatching between schema-consistent and compatible field encoding
/// based on the registry's configured mode.
pub fn write<T: StructSerializer>(
    this: &T,
    context: &mut WriteContext,
    write_ref_info: bool,
) -> Result<(), Error> {
    if write_ref_info {
        context
            .ref_writer
            .write_non_ref_value(&mut context.writer, false);
    }
    write_type_info::<T>(context)?;
    if context.type_resolver.is_compatible() {
        this.fory_write_compatible(context)
    } else {
        this.fory_write_data(context, false)
    }
}

/// Reads a full struct value written by [`write`].
pub fn read<T: StructSerializer>(context: &mut ReadContext) -> Result<T, Error> {
    let type_meta = read_type_info::<T>(context)?;
    if context.type_resolver.is_compatible() {
        let type_meta = type_meta
            .expect("compatible mode always interns a TypeMeta in read_type_info");
        T::fory_read_compatible(context, &type_meta)
    } else {
        T::fory_read_data(context, false)
    }
}

/// Global switch for the field-tracing hooks below, checked once and
/// cached: set `ENABLE_FORY_DEBUG_OUTPUT=1` (or `true`) in the environment
/// to print a line before/after every field write/read.
static ENABLE_FORY_DEBUG_OUTPUT: OnceLock<bool> = OnceLock::new();

#[inline]
fn enable_debug_output() -> bool {
    *ENABLE_FORY_DEBUG_OUTPUT.get_or_init(|| {
        std::env::var("ENABLE_FORY_DEBUG_OUTPUT")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    })
}

pub type BeforeWriteFieldFunc =
    fn(struct_name: &str, field_name: &str, field_value: &dyn Any, context: &mut WriteContext);
pub type AfterWriteFieldFunc =
    fn(struct_name: &str, field_name: &str, field_value: &dyn Any, context: &mut WriteContext);
pub type BeforeReadFieldFunc = fn(struct_name: &str, field_name: &str, context: &mut ReadContext);
pub type AfterReadFieldFunc =
    fn(struct_name: &str, field_name: &str, field_value: &dyn Any, context: &mut ReadContext);

fn default_before_write_field(
    struct_name: &str,
    field_name: &str,
    _field_value: &dyn Any,
    context: &mut WriteContext,
) {
    if enable_debug_output() {
        println!(
            "before_write_field:\tstruct={struct_name},\tfield={field_name},\twriter_len={}",
            context.writer.len()
        );
    }
}

fn default_after_write_field(
    struct_name: &str,
    field_name: &str,
    _field_value: &dyn Any,
    context: &mut WriteContext,
) {
    if enable_debug_output() {
        println!(
            "after_write_field:\tstruct={struct_name},\tfield={field_name},\twriter_len={}",
            context.writer.len()
        );
    }
}

fn default_before_read_field(struct_name: &str, field_name: &str, context: &mut ReadContext) {
    if enable_debug_output() {
        println!(
            "before_read_field:\tstruct={struct_name},\tfield={field_name},\treader_remaining={}",
            context.reader.remaining()
        );
    }
}

fn default_after_read_field(
    struct_name: &str,
    field_name: &str,
    _field_value: &dyn Any,
    context: &mut ReadContext,
) {
    if enable_debug_output() {
        println!(
            "after_read_field:\tstruct={struct_name},\tfield={field_name},\treader_remaining={}",
            context.reader.remaining()
        );
    }
}

struct DebugHooks {
    before_write: BeforeWriteFieldFunc,
    after_write: AfterWriteFieldFunc,
    before_read: BeforeReadFieldFunc,
    after_read: AfterReadFieldFunc,
}

impl Default for DebugHooks {
    fn default() -> Self {
        Self {
            before_write: default_before_write_field,
            after_write: default_after_write_field,
            before_read: default_before_read_field,
            after_read: default_after_read_field,
        }
    }
}

static DEBUG_HOOKS: std::sync::Mutex<Option<DebugHooks>> = std::sync::Mutex::new(None);

fn with_hooks<R>(f: impl FnOnce(&DebugHooks) -> R) -> R {
    let mut guard = DEBUG_HOOKS.lock().expect("debug hooks mutex poisoned");
    f(guard.get_or_insert_with(DebugHooks::default))
}

pub fn set_before_write_field_func(func: BeforeWriteFieldFunc) {
    with_hooks(|_| ()); // ensure initialized before mutating below
    DEBUG_HOOKS.lock().expect("debug hooks mutex poisoned").as_mut().unwrap().before_write = func;
}

pub fn set_after_write_field_func(func: AfterWriteFieldFunc) {
    with_hooks(|_| ());
    DEBUG_HOOKS.lock().expect("debug hooks mutex poisoned").as_mut().unwrap().after_write = func;
}

pub fn set_before_read_field_func(func: BeforeReadFieldFunc) {
    with_hooks(|_| ());
    DEBUG_HOOKS.lock().expect("debug hooks mutex poisoned").as_mut().unwrap().before_read = func;
}

pub fn set_after_read_field_func(func: AfterReadFieldFunc) {
    with_hooks(|_| ());
    DEBUG_HOOKS.lock().expect("debug hooks mutex poisoned").as_mut().unwrap().after_read = func;
}

pub fn reset_struct_debug_hooks() {
    *DEBUG_HOOKS.lock().expect("debug hooks mutex poisoned") = Some(DebugHooks::default());
}

pub fn struct_before_write_field(
    struct_name: &str,
    field_name: &str,
    field_value: &dyn Any,
    context: &mut WriteContext,
) {
    let func = with_hooks(|h| h.before_write);
    func(struct_name, field_name, field_value, context)
}

pub fn struct_after_write_field(
    struct_name: &str,
    field_name: &str,
    field_value: &dyn Any,
    context: &mut WriteContext,
) {
    let func = with_hooks(|h| h.after_write);
    func(struct_name, field_name, field_value, context)
}

pub fn struct_before_read_field(struct_name: &str, field_name: &str, context: &mut ReadContext) {
    let func = with_hooks(|h| h.before_read);
    func(struct_name, field_name, context)
}

pub fn struct_after_read_field(
    struct_name: &str,
    field_name: &str,
    field_value: &dyn Any,
    context: &mut ReadContext,
) {
    let func = with_hooks(|h| h.after_read);
    func(struct_name, field_name, field_value, context)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actual_type_id_composes_numeric_struct() {
        let id = actual_type_id(300, false, false);
        assert_eq!(id & 0xff, TypeId::STRUCT as u32);
        assert_eq!(id >> 8, 300);
    }

    #[test]
    fn actual_type_id_named_compatible_ignores_numeric_part() {
        let id = actual_type_id(300, true, true);
        assert_eq!(id, TypeId::NAMED_COMPATIBLE_STRUCT as u32);
    }

    #[test]
    fn debug_hooks_default_without_panicking() {
        reset_struct_debug_hooks();
        struct_before_write_field(
            "S",
            "f",
            &0i32,
            &mut WriteContext::new(&TypeResolver::new()),
        );
    }
}
