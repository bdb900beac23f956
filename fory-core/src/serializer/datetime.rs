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
use crate::resolver::context::{ReadContext, WriteContext};
use crate::resolver::type_resolver::TypeResolver;
use crate::serializer::util::{read_type_info, write_type_info};
use crate::serializer::{ForyDefault, ForyGeneralList, Serializer};
use crate::types::TypeId;
use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};
use std::any::Any;
use std::sync::OnceLock;

fn epoch() -> NaiveDate {
    *EPOCH.get_or_init(|| NaiveDate::from_ymd_opt(1970, 1, 1).expect("1970-01-01 is valid"))
}

static EPOCH: OnceLock<NaiveDate> = OnceLock::new();

impl ForyDefault for NaiveDateTime {
    fn fory_default() -> Self {
        NaiveDateTime::default()
    }
}

impl ForyGeneralList for NaiveDateTime {}

/// Microseconds since the Unix epoch (spec.md #11.1), matching the
/// cross-language `TIMESTAMP` type id.
impl Serializer for NaiveDateTime {
    fn fory_write_data(&self, context: &mut WriteContext, _is_field: bool) -> Result<(), Error> {
        let dt = self.and_utc();
        let micros = dt.timestamp() * 1_000_000 + dt.timestamp_subsec_micros() as i64;
        context.writer.i64(micros);
        Ok(())
    }

    fn fory_read_data(context: &mut ReadContext, _is_field: bool) -> Result<Self, Error> {
        let micros = context.reader.i64()?;
        let seconds = micros.div_euclid(1_000_000);
        let nanos = (micros.rem_euclid(1_000_000) as u32) * 1_000;
        DateTime::from_timestamp(seconds, nanos)
            .map(|dt| dt.naive_utc())
            .ok_or_else(|| {
                Error::InvalidData(format!("date out of range, timestamp micros: {micros}"))
            })
    }

    fn fory_reserved_space() -> usize {
        8
    }

    fn fory_get_type_id(_type_resolver: &TypeResolver) -> Result<u32, Error> {
        Ok(TypeId::TIMESTAMP as u32)
    }

    fn fory_static_type_id() -> TypeId {
        TypeId::TIMESTAMP
    }

    fn fory_write_type_info(context: &mut WriteContext, is_field: bool) -> Result<(), Error> {
        write_type_info::<Self>(context, is_field)
    }

    fn fory_read_type_info(context: &mut ReadContext, is_field: bool) -> Result<(), Error> {
        read_type_info::<Self>(context, is_field)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ForyDefault for NaiveDate {
    fn fory_default() -> Self {
        NaiveDate::default()
    }
}

impl ForyGeneralList for NaiveDate {}

/// Days since the Unix epoch (spec.md #11.1), matching the cross-language
/// `DATE` type id.
impl Serializer for NaiveDate {
    fn fory_write_data(&self, context: &mut WriteContext, _is_field: bool) -> Result<(), Error> {
        let days_since_epoch = self.signed_duration_since(epoch()).num_days();
        context.writer.i32(days_since_epoch as i32);
        Ok(())
    }

    fn fory_read_data(context: &mut ReadContext, _is_field: bool) -> Result<Self, Error> {
        let days = context.reader.i32()?;
        let epoch = epoch();
        if days >= 0 {
            epoch.checked_add_days(Days::new(days as u64))
        } else {
            epoch.checked_sub_days(Days::new((-(days as i64)) as u64))
        }
        .ok_or_else(|| Error::InvalidData(format!("date out of range, {days} days since epoch")))
    }

    fn fory_reserved_space() -> usize {
        4
    }

    fn fory_get_type_id(_type_resolver: &TypeResolver) -> Result<u32, Error> {
        Ok(TypeId::DATE as u32)
    }

    fn fory_static_type_id() -> TypeId {
        TypeId::DATE
    }

    fn fory_write_type_info(context: &mut WriteContext, is_field: bool) -> Result<(), Error> {
        write_type_info::<Self>(context, is_field)
    }

    fn fory_read_type_info(context: &mut ReadContext, is_field: bool) -> Result<(), Error> {
        read_type_info::<Self>(context, is_field)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Reader;
    use crate::resolver::type_resolver::TypeResolver;

    #[test]
    fn naive_date_round_trips() {
        let resolver = TypeResolver::new();
        let mut w = WriteContext::new(&resolver);
        let d = NaiveDate::from_ymd_opt(2026, 7, 27).unwrap();
        d.fory_write_data(&mut w, false).unwrap();
        let bytes = w.writer.dump();
        let mut r = ReadContext::new(Reader::new(&bytes), &resolver);
        assert_eq!(NaiveDate::fory_read_data(&mut r, false).unwrap(), d);
    }

    #[test]
    fn naive_date_time_round_trips_microseconds() {
        let resolver = TypeResolver::new();
        let mut w = WriteContext::new(&resolver);
        let dt = NaiveDate::from_ymd_opt(2026, 7, 27)
            .unwrap()
            .and_hms_micro_opt(1, 2, 3, 456_789)
            .unwrap();
        dt.fory_write_data(&mut w, false).unwrap();
        let bytes = w.writer.dump();
        let mut r = ReadContext::new(Reader::new(&bytes), &resolver);
        assert_eq!(NaiveDateTime::fory_read_data(&mut r, false).unwrap(), dt);
    }
}
