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

//! File io implementation.
//!
//! # How to build a `FileIO`
//!
//! Use [`load_file_io`] with a configuration bag; the `io-impl` property
//! selects the backend and defaults to the OpenDAL one. Passing the target
//! location lets the selector fall back to the alternate backend when the
//! chosen one cannot serve the location's scheme:
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use lakeio::io::{load_file_io, S3_REGION};
//! use lakeio::Result;
//!
//! # fn test() -> Result<()> {
//! // Select by configuration only.
//! let file_io = load_file_io(HashMap::new(), None)?;
//!
//! // Select with a target location and backend properties.
//! let properties = HashMap::from([(S3_REGION.to_string(), "us-east-1".to_string())]);
//! let file_io = load_file_io(properties, Some("s3://bucket/warehouse"))?;
//! # Ok(())
//! # }
//! ```
//!
//! # How to use a `FileIO`
//!
//! A `FileIO` hands out location-bound file handles and deletes locations:
//!
//! - `new_input`: create an [`InputFile`] for reading.
//! - `new_output`: create an [`OutputFile`] for writing.
//! - `delete`: delete a location.
//!
//! Handles open [`InputStream`]/[`OutputStream`] resources on demand; a
//! stream belongs to whoever opened it and is released on every exit path.

mod file_io;
mod loader;
mod location;
mod props;
mod storage_object_store;
mod storage_opendal;

pub use file_io::{
    FileIO, FileMetadata, FileSystem, InputFile, InputStream, OutputFile, OutputStream,
};
pub use loader::{
    load_file_io, DEFAULT_IO_IMPL, IO_IMPL, OBJECT_STORE, OBJECT_STORE_FILE_IO, OPENDAL,
    OPENDAL_FILE_IO,
};
pub use location::{parse_location, ParsedLocation};
pub use props::*;
pub use storage_object_store::ObjectStoreFileIO;
pub use storage_opendal::OpenDalFileIO;
