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
use crate::types::RefFlag;
use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

/// Tracks identity of `Rc`/`Arc` values written so far so that a second
/// occurrence of the same pointer is written as a back-reference instead of
/// being serialized again.
#[derive(Default)]
pub struct RefWriter {
    rc_ptr_to_id: HashMap<usize, u32>,
    arc_ptr_to_id: HashMap<usize, u32>,
    next_id: u32,
}

impl RefWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.rc_ptr_to_id.clear();
        self.arc_ptr_to_id.clear();
        self.next_id = 0;
    }

    pub fn write_null(&self, writer: &mut Writer) {
        writer.i8(RefFlag::Null as i8);
    }

    pub fn write_non_ref_value(&self, writer: &mut Writer, track_ref: bool) {
        let flag = if track_ref {
            RefFlag::RefValue
        } else {
            RefFlag::NotNullValue
        };
        writer.i8(flag as i8);
    }

    /// Writes the ref header for an `Rc<T>`. Returns `true` if the value had
    /// already been written once (in which case the caller must NOT write
    /// the payload again), `false` if this is the first occurrence and the
    /// caller must follow up with the payload.
    pub fn try_write_rc_ref<T: ?Sized>(&mut self, writer: &mut Writer, rc: &Rc<T>) -> bool {
        let ptr = Rc::as_ptr(rc) as *const () as usize;
        if let Some(&id) = self.rc_ptr_to_id.get(&ptr) {
            writer.i8(RefFlag::Ref as i8);
            writer.var_uint32(id);
            true
        } else {
            let id = self.next_id;
            self.next_id += 1;
            self.rc_ptr_to_id.insert(ptr, id);
            writer.i8(RefFlag::RefValue as i8);
            false
        }
    }

    /// Same as [`try_write_rc_ref`](Self::try_write_rc_ref) for `Arc<T>`.
    pub fn try_write_arc_ref<T: ?Sized>(&mut self, writer: &mut Writer, arc: &Arc<T>) -> bool {
        let ptr = Arc::as_ptr(arc) as *const () as usize;
        if let Some(&id) = self.arc_ptr_to_id.get(&ptr) {
            writer.i8(RefFlag::Ref as i8);
            writer.var_uint32(id);
            true
        } else {
            let id = self.next_id;
            self.next_id += 1;
            self.arc_ptr_to_id.insert(ptr, id);
            writer.i8(RefFlag::RefValue as i8);
            false
        }
    }
}

/// Mirror of [`RefWriter`] on the read side: resolves back-references and
/// remembers values read under a `RefValue` flag so later `Ref` occurrences
/// can be resolved to the same allocation.
#[derive(Default)]
pub struct RefReader {
    rc_refs: HashMap<u32, Rc<dyn Any>>,
    arc_refs: HashMap<u32, Arc<dyn Any + Send + Sync>>,
    next_id: u32,
}

impl RefReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.rc_refs.clear();
        self.arc_refs.clear();
        self.next_id = 0;
    }

    pub fn read_ref_flag(&self, reader: &mut Reader) -> Result<RefFlag, Error> {
        let tag = reader.i8()?;
        RefFlag::try_from(tag)
            .map_err(|_| Error::InvalidData(format!("unknown ref flag byte {tag}")))
    }

    pub fn read_ref_id(&mut self, reader: &mut Reader) -> Result<u32, Error> {
        reader.var_uint32()
    }

    /// Allocates an id for a value about to be read under `RefValue`,
    /// before its payload is decoded, so nested back-references to a
    /// self-referential field fail closed rather than recursing forever.
    pub fn reserve_ref_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn get_rc_ref<T: 'static>(&self, ref_id: u32) -> Option<Rc<T>> {
        self.rc_refs
            .get(&ref_id)
            .and_then(|rc| Rc::downcast::<T>(rc.clone()).ok())
    }

    pub fn get_rc_any_ref(&self, ref_id: u32) -> Option<Rc<dyn Any>> {
        self.rc_refs.get(&ref_id).cloned()
    }

    pub fn store_rc_ref_at<T: 'static>(&mut self, ref_id: u32, rc: Rc<T>) {
        self.rc_refs.insert(ref_id, rc);
    }

    pub fn get_arc_ref<T: 'static + Send + Sync>(&self, ref_id: u32) -> Option<Arc<T>> {
        self.arc_refs
            .get(&ref_id)
            .and_then(|arc| Arc::downcast::<T>(arc.clone()).ok())
    }

    pub fn get_arc_any_ref(&self, ref_id: u32) -> Option<Arc<dyn Any + Send + Sync>> {
        self.arc_refs.get(&ref_id).cloned()
    }

    pub fn store_arc_ref_at<T: 'static + Send + Sync>(&mut self, ref_id: u32, arc: Arc<T>) {
        self.arc_refs.insert(ref_id, arc);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rc_second_occurrence_is_a_back_reference() {
        let mut w = RefWriter::new();
        let mut writer = Writer::default();
        let rc = Rc::new(42i32);
        assert!(!w.try_write_rc_ref(&mut writer, &rc));
        assert!(w.try_write_rc_ref(&mut writer, &rc));
        let bytes = writer.dump();

        let mut reader = Reader::new(&bytes);
        let mut r = RefReader::new();
        assert_eq!(r.read_ref_flag(&mut reader).unwrap(), RefFlag::RefValue);
        let id = r.reserve_ref_id();
        r.store_rc_ref_at(id, rc.clone());
        assert_eq!(r.read_ref_flag(&mut reader).unwrap(), RefFlag::Ref);
        let ref_id = r.read_ref_id(&mut reader).unwrap();
        assert_eq!(r.get_rc_ref::<i32>(ref_id).as_deref(), Some(&42));
    }

    #[test]
    fn distinct_rcs_get_distinct_ids() {
        let mut w = RefWriter::new();
        let mut writer = Writer::default();
        let a = Rc::new(1i32);
        let b = Rc::new(2i32);
        assert!(!w.try_write_rc_ref(&mut writer, &a));
        assert!(!w.try_write_rc_ref(&mut writer, &b));
        assert_ne!(
            w.rc_ptr_to_id[&(Rc::as_ptr(&a) as *const () as usize)],
            w.rc_ptr_to_id[&(Rc::as_ptr(&b) as *const () as usize)]
        );
    }
}
