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

use crate::buffer::{Reader, Writer};
use crate::error::Error;
use crate::meta::TypeMeta;
use crate::resolver::metastring_resolver::{MetaStringReaderResolver, MetaStringWriterResolver};
use crate::resolver::ref_resolver::{RefReader, RefWriter};
use crate::resolver::type_resolver::TypeResolver;
use std::any::TypeId as RustTypeId;
use std::collections::HashMap;
use std::sync::Mutex;

/// Maximum nesting depth for `Box<dyn Any>` / `Rc<dyn Any>` / `Arc<dyn Any>`
/// chains; guards against a malicious peer encoding an unbounded recursive
/// trait-object graph.
const DEFAULT_MAX_DYN_DEPTH: usize = 64;

/// Per-call state threaded through every `Serializer::fory_write`. Borrows
/// the `TypeResolver` for the duration of one `Fory::serialize` call.
pub struct WriteContext<'a> {
    pub writer: Writer,
    pub ref_writer: RefWriter,
    pub meta_string_writer: MetaStringWriterResolver,
    pub type_resolver: &'a TypeResolver,
    meta_written: HashMap<RustTypeId, u32>,
    depth: usize,
}

impl<'a> WriteContext<'a> {
    pub fn new(type_resolver: &'a TypeResolver) -> Self {
        Self {
            writer: Writer::default(),
            ref_writer: RefWriter::new(),
            meta_string_writer: MetaStringWriterResolver::default(),
            type_resolver,
            meta_written: HashMap::new(),
            depth: 0,
        }
    }

    /// Resets buffers so the context can be reused across calls without
    /// reallocating.
    pub fn reset(&mut self, type_resolver: &'a TypeResolver) {
        self.writer = Writer::default();
        self.ref_writer.reset();
        self.meta_string_writer.reset();
        self.type_resolver = type_resolver;
        self.meta_written.clear();
        self.depth = 0;
    }

    /// Interns a compatible-mode struct's `TypeMeta` by its Rust type id
    /// (spec.md #4.F: "encoded once per stream per type, cached by ref-id on
    /// later occurrences"). Returns `(ref_id, already_written)`.
    pub fn intern_type_meta(&mut self, rust_type: RustTypeId) -> (u32, bool) {
        if let Some(&id) = self.meta_written.get(&rust_type) {
            (id, true)
        } else {
            let id = self.meta_written.len() as u32;
            self.meta_written.insert(rust_type, id);
            (id, false)
        }
    }

    pub fn inc_depth(&mut self) -> Result<(), Error> {
        if self.depth >= DEFAULT_MAX_DYN_DEPTH {
            return Err(Error::InvalidData(
                "exceeded max nesting depth while writing a trait object".into(),
            ));
        }
        self.depth += 1;
        Ok(())
    }

    pub fn dec_depth(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

/// Per-call state threaded through every `Serializer::fory_read`.
pub struct ReadContext<'de, 'a> {
    pub reader: Reader<'de>,
    pub ref_reader: RefReader,
    pub meta_string_reader: MetaStringReaderResolver,
    pub type_resolver: &'a TypeResolver,
    read_metas: Vec<TypeMeta>,
    max_dyn_depth: usize,
    current_depth: usize,
}

impl<'de, 'a> ReadContext<'de, 'a> {
    pub fn new(reader: Reader<'de>, type_resolver: &'a TypeResolver) -> Self {
        Self {
            reader,
            ref_reader: RefReader::new(),
            meta_string_reader: MetaStringReaderResolver::default(),
            type_resolver,
            read_metas: Vec::new(),
            max_dyn_depth: DEFAULT_MAX_DYN_DEPTH,
            current_depth: 0,
        }
    }

    pub fn init(&mut self, reader: Reader<'de>, type_resolver: &'a TypeResolver) {
        self.reader = reader;
        self.ref_reader.reset();
        self.meta_string_reader.reset();
        self.type_resolver = type_resolver;
        self.read_metas.clear();
        self.current_depth = 0;
    }

    /// Stores a freshly-decoded `TypeMeta` under the next sequential ref-id
    /// and returns that id, mirroring [`WriteContext::intern_type_meta`]'s
    /// counter on the write side.
    pub fn store_type_meta(&mut self, meta: TypeMeta) -> u32 {
        let id = self.read_metas.len() as u32;
        self.read_metas.push(meta);
        id
    }

    pub fn get_type_meta(&self, ref_id: u32) -> Option<&TypeMeta> {
        self.read_metas.get(ref_id as usize)
    }

    pub fn inc_depth(&mut self) -> Result<(), Error> {
        if self.current_depth >= self.max_dyn_depth {
            return Err(Error::InvalidData(
                "exceeded max nesting depth while reading a trait object".into(),
            ));
        }
        self.current_depth += 1;
        Ok(())
    }

    pub fn dec_depth(&mut self) {
        self.current_depth = self.current_depth.saturating_sub(1);
    }
}

/// A tiny reuse pool for expensive-to-allocate scratch objects (e.g.
/// `Vec<u8>` write buffers), trading a mutex lock for one fewer allocation
/// on the common serialize/deserialize path.
pub struct Pool<T> {
    items: Mutex<Vec<T>>,
    factory: fn() -> T,
}

impl<T> Pool<T> {
    pub fn new(factory: fn() -> T) -> Self {
        Self {
            items: Mutex::new(Vec::new()),
            factory,
        }
    }

    pub fn get(&self) -> T {
        self.items
            .lock()
            .expect("pool mutex poisoned")
            .pop()
            .unwrap_or_else(self.factory)
    }

    pub fn put(&self, item: T) {
        self.items.lock().expect("pool mutex poisoned").push(item);
    }
}
