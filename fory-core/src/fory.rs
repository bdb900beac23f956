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

//! The `Fory` runtime facade: a configured, registered instance that drives
//! the top-level `serialize`/`deserialize` entry points (spec.md #4.K).
//!
//! Unlike the teacher's `Fory`, this runtime's stream header carries no
//! magic number or language byte ahead of the bitmap; spec.md #6 defines
//! the stream header as exactly one byte, so that's all this writes.

use crate::buffer::{Reader, Writer};
use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::resolver::type_resolver::TypeResolver;
use crate::serializer::{EnumSerializer, Serializer, StructSerializer, UnionSerializer};
use crate::types::config_flags::{
    IS_CROSS_LANGUAGE_FLAG, IS_LITTLE_ENDIAN_FLAG, IS_NULL_FLAG, IS_OUT_OF_BAND_FLAG,
};
use crate::types::Mode;

/// Configured, registered runtime instance. Registration mutates the
/// internal type resolver, so `register*` takes `&mut self`; once
/// registration is done, `serialize`/`deserialize` only need `&self` and
/// may be called concurrently from multiple threads, each with its own
/// per-call context (spec.md #5).
pub struct Fory {
    mode: Mode,
    xlang: bool,
    compress_string: bool,
    track_ref_default: bool,
    require_registration: bool,
    type_resolver: TypeResolver,
}

impl Default for Fory {
    fn default() -> Self {
        let mut type_resolver = TypeResolver::new();
        type_resolver.set_compatible(false);
        Fory {
            mode: Mode::SchemaConsistent,
            xlang: true,
            compress_string: false,
            track_ref_default: false,
            require_registration: true,
            type_resolver,
        }
    }
}

impl Fory {
    pub fn mode(mut self, mode: Mode) -> Self {
        self.type_resolver
            .set_compatible(mode == Mode::Compatible);
        self.mode = mode;
        self
    }

    pub fn xlang(mut self, xlang: bool) -> Self {
        self.xlang = xlang;
        self
    }

    pub fn compress_string(mut self, compress_string: bool) -> Self {
        self.compress_string = compress_string;
        self
    }

    /// Default for whether newly written shared pointers (`Rc`/`Arc`) track
    /// identity via the reference table; `Rc`/`Arc` serializers consult this
    /// through the `Fory` they were registered with (spec.md §11.2 carries
    /// this at the serializer level, this flag exists so application code
    /// has one place to flip the default instead of annotating every field).
    pub fn track_ref_default(mut self, track_ref_default: bool) -> Self {
        self.track_ref_default = track_ref_default;
        self
    }

    /// When true (the default), `deserialize` of an unregistered struct,
    /// enum or union type is a programmer error surfaced as
    /// `Error::UnregisteredType` rather than silently decoding nothing.
    pub fn require_registration(mut self, require_registration: bool) -> Self {
        self.require_registration = require_registration;
        self
    }

    pub fn get_mode(&self) -> &Mode {
        &self.mode
    }

    pub fn is_compress_string(&self) -> bool {
        self.compress_string
    }

    pub fn is_track_ref_default(&self) -> bool {
        self.track_ref_default
    }

    pub fn is_require_registration(&self) -> bool {
        self.require_registration
    }

    pub fn get_type_resolver(&self) -> &TypeResolver {
        &self.type_resolver
    }

    /// Registers a struct/enum-as-struct type under an explicit numeric id
    /// (spec.md §6: `register(type, id)`).
    pub fn register<T: 'static + StructSerializer>(&mut self, id: u32) -> Result<u32, Error> {
        self.type_resolver
            .register::<T>("", "", false, Some(id))
    }

    /// Registers a struct type purely by namespace/type_name, with no fixed
    /// numeric id (spec.md §6: `register(type, namespace, type_name)`).
    pub fn register_by_namespace<T: 'static + StructSerializer>(
        &mut self,
        namespace: &str,
        type_name: &str,
    ) -> Result<u32, Error> {
        self.type_resolver
            .register::<T>(namespace, type_name, true, None)
    }

    pub fn register_by_name<T: 'static + StructSerializer>(
        &mut self,
        type_name: &str,
    ) -> Result<u32, Error> {
        self.register_by_namespace::<T>("", type_name)
    }

    /// Registers a fieldless enum type under an explicit numeric id.
    pub fn register_enum<T: 'static + EnumSerializer>(&mut self, id: u32) -> Result<u32, Error> {
        self.type_resolver
            .register_enum::<T>("", "", false, Some(id))
    }

    pub fn register_enum_by_name<T: 'static + EnumSerializer>(
        &mut self,
        namespace: &str,
        type_name: &str,
    ) -> Result<u32, Error> {
        self.type_resolver
            .register_enum::<T>(namespace, type_name, true, None)
    }

    /// Registers a tagged-union (data-carrying enum) type; unions share the
    /// enum registry since neither carries a `TypeMeta` (spec.md #4.J).
    pub fn register_union<T: 'static + UnionSerializer>(&mut self, id: u32) -> Result<u32, Error> {
        self.type_resolver
            .register_enum::<T>("", "", false, Some(id))
    }

    pub fn register_union_by_name<T: 'static + UnionSerializer>(
        &mut self,
        namespace: &str,
        type_name: &str,
    ) -> Result<u32, Error> {
        self.type_resolver
            .register_enum::<T>(namespace, type_name, true, None)
    }

    /// Registers a plain extension type (one that isn't a derived
    /// struct/enum/union, e.g. a newtype) under a fixed numeric id, so it
    /// can appear behind a `Box<dyn Any>`/`Rc<dyn Any>`/`Arc<dyn Any>` field
    /// (spec.md §6: `register_serializer(type, impl)`).
    pub fn register_serializer<T: Serializer>(&mut self, id: u32) {
        self.type_resolver.register_serializer::<T>(id);
    }

    fn write_head(&self, reserved_space: usize, writer: &mut Writer) {
        writer.reserve(reserved_space + 1);
        let mut bitmap = IS_LITTLE_ENDIAN_FLAG;
        if self.xlang {
            bitmap |= IS_CROSS_LANGUAGE_FLAG;
        }
        writer.u8(bitmap);
    }

    fn read_head(&self, reader: &mut Reader) -> Result<bool, Error> {
        let bitmap = reader.u8()?;
        let is_little_endian = bitmap & IS_LITTLE_ENDIAN_FLAG != 0;
        if !is_little_endian {
            return Err(Error::InvalidData(
                "big-endian peers are not supported; the stream header's little-endian bit was 0"
                    .into(),
            ));
        }
        let peer_is_xlang = bitmap & IS_CROSS_LANGUAGE_FLAG != 0;
        if peer_is_xlang != self.xlang {
            return Err(Error::InvalidData(
                "stream header's cross-language bit does not match this Fory instance's xlang setting"
                    .into(),
            ));
        }
        let _out_of_band = bitmap & IS_OUT_OF_BAND_FLAG != 0;
        Ok(bitmap & IS_NULL_FLAG != 0)
    }

    /// Serializes `value` to a freshly-allocated buffer.
    pub fn serialize<T: Serializer>(&self, value: &T) -> Result<Vec<u8>, Error> {
        let mut context = WriteContext::new(&self.type_resolver);
        self.write_head(T::fory_reserved_space(), &mut context.writer);
        value.fory_write(&mut context, false)?;
        Ok(context.writer.into_vec())
    }

    /// Deserializes a value of type `T` from `bytes`.
    pub fn deserialize<T: Serializer>(&self, bytes: &[u8]) -> Result<T, Error> {
        let mut reader = Reader::new(bytes);
        let is_none = self.read_head(&mut reader)?;
        if is_none {
            return Err(Error::InvalidData(
                "stream root is null; use Option<T> to deserialize a nullable root".into(),
            ));
        }
        let mut context = ReadContext::new(reader, &self.type_resolver);
        T::fory_read(&mut context, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_round_trips() {
        let fory = Fory::default();
        let bytes = fory.serialize(&7i32).unwrap();
        assert_eq!(fory.deserialize::<i32>(&bytes).unwrap(), 7);
    }

    #[test]
    fn stream_header_first_byte_has_little_endian_bit_set() {
        let fory = Fory::default();
        let bytes = fory.serialize(&1i32).unwrap();
        assert_eq!(bytes[0] & IS_LITTLE_ENDIAN_FLAG, IS_LITTLE_ENDIAN_FLAG);
        assert_eq!(bytes[0] & IS_NULL_FLAG, 0);
    }

    #[test]
    fn mode_builder_toggles_compatible_resolver() {
        let fory = Fory::default().mode(Mode::Compatible);
        assert!(fory.get_type_resolver().is_compatible());
        assert_eq!(*fory.get_mode(), Mode::Compatible);
    }

    #[test]
    fn non_xlang_peer_mismatch_is_rejected() {
        let writer_fory = Fory::default().xlang(false);
        let bytes = writer_fory.serialize(&1i32).unwrap();
        let reader_fory = Fory::default().xlang(true);
        assert!(reader_fory.deserialize::<i32>(&bytes).is_err());
    }

    #[test]
    fn string_round_trips() {
        let fory = Fory::default();
        let bytes = fory.serialize(&"hello".to_string()).unwrap();
        assert_eq!(fory.deserialize::<String>(&bytes).unwrap(), "hello");
    }
}
