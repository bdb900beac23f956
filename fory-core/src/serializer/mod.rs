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

pub mod any;
pub mod arc;
pub mod bool;
pub mod box_;
pub mod collection;
pub mod datetime;
pub mod enum_;
pub mod map;
pub mod number;
pub mod option;
pub mod primitive_list;
pub mod rc;
pub mod refcell;
pub mod serializer;
pub mod set;
pub mod skip;
pub mod string;
pub mod struct_;
pub mod union;
pub mod util;

pub use serializer::{
    CollectionSerializer, EnumSerializer, ForyDefault, ForyGeneralList, MapSerializer, Serializer,
    StructSerializer,
};
pub use union::UnionSerializer;
pub use util::{get_skip_ref_flag, read_ref_info_data, read_type_info, write_ref_info_data, write_type_info};
