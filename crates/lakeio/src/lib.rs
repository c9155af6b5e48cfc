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

#![deny(missing_docs)]

//! Uniform file-access abstraction for lake table formats.
//!
//! Table-format code needs to read and write files across heterogeneous
//! storage systems, local disk, object stores, distributed filesystems,
//! addressed by URI-style location strings. This crate provides one
//! abstraction over all of them: callers obtain [`io::InputFile`] and
//! [`io::OutputFile`] handles through the [`io::FileIO`] contract and never
//! name a concrete storage backend at the call site.
//!
//! Backend selection happens once, at [`io::load_file_io`], which resolves
//! the configured implementation and falls back to the alternate one when
//! the chosen backend cannot serve a given location's scheme.

mod error;
pub mod io;

pub use error::{Error, ErrorKind, Result};
