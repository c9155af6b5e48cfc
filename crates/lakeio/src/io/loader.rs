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

//! Backend selection.

use std::sync::Arc;

use log::{debug, warn};

use super::{FileIO, ObjectStoreFileIO, OpenDalFileIO, Properties};
use crate::{Error, ErrorKind, Result};

/// Property key selecting the [`FileIO`] implementation.
pub const IO_IMPL: &str = "io-impl";
/// Identifier of the OpenDAL-backed implementation.
pub const OPENDAL: &str = "opendal";
/// Identifier of the object_store-backed implementation.
pub const OBJECT_STORE: &str = "object-store";
/// Deprecated spelling of [`OPENDAL`].
pub const OPENDAL_FILE_IO: &str = "lakeio::io::storage_opendal::OpenDalFileIO";
/// Deprecated spelling of [`OBJECT_STORE`].
pub const OBJECT_STORE_FILE_IO: &str = "lakeio::io::storage_object_store::ObjectStoreFileIO";
/// Implementation used when [`IO_IMPL`] is absent.
pub const DEFAULT_IO_IMPL: &str = OPENDAL;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum IoImpl {
    OpenDal,
    ObjectStore,
}

/// Normalize the configured implementation identifier, keeping backward
/// compatibility with the deprecated fully-qualified spellings.
fn parse_io_impl(value: &str) -> Result<IoImpl> {
    match value {
        OPENDAL => Ok(IoImpl::OpenDal),
        OBJECT_STORE => Ok(IoImpl::ObjectStore),
        OPENDAL_FILE_IO => {
            warn!(
                "The '{IO_IMPL}' value '{OPENDAL_FILE_IO}' is being deprecated, \
                 use '{OPENDAL}' instead"
            );
            Ok(IoImpl::OpenDal)
        }
        OBJECT_STORE_FILE_IO => {
            warn!(
                "The '{IO_IMPL}' value '{OBJECT_STORE_FILE_IO}' is being deprecated, \
                 use '{OBJECT_STORE}' instead"
            );
            Ok(IoImpl::ObjectStore)
        }
        value => Err(Error::new(
            ErrorKind::ConfigInvalid,
            format!(
                "Unknown value '{value}' for '{IO_IMPL}'. Accepts only: '{OPENDAL}', \
                 '{OBJECT_STORE}', or the deprecating values: '{OPENDAL_FILE_IO}', \
                 '{OBJECT_STORE_FILE_IO}'"
            ),
        )),
    }
}

/// Select and construct a [`FileIO`] implementation for the given
/// configuration bag.
///
/// The implementation named by the `io-impl` property is constructed,
/// defaulting to the OpenDAL backend. When a target `location` is given
/// its scheme is probed against the selected backend; if the backend
/// reports the scheme unsupported the alternate backend is substituted
/// with a warning. The substitution is attempted at most once per
/// direction: when the alternate cannot serve the scheme either, the
/// alternate instance is still returned and the eventual I/O call produces
/// the clearer error.
///
/// Only the selected backend is constructed; construction builds no
/// storage clients.
///
/// ```
/// use lakeio::io::load_file_io;
/// use lakeio::Result;
///
/// # fn example() -> Result<()> {
/// let file_io = load_file_io(Default::default(), Some("s3://bucket/warehouse"))?;
/// let input = file_io.new_input("s3://bucket/warehouse/data.parquet");
/// # Ok(())
/// # }
/// ```
pub fn load_file_io(properties: Properties, location: Option<&str>) -> Result<Arc<dyn FileIO>> {
    let configured = properties
        .get(IO_IMPL)
        .map(String::as_str)
        .unwrap_or(DEFAULT_IO_IMPL);

    match parse_io_impl(configured)? {
        IoImpl::OpenDal => {
            let file_io = OpenDalFileIO::new(properties.clone());
            if let Some(location) = location {
                match file_io.fs_by_uri(location) {
                    Ok(_) => {}
                    Err(err) if err.kind() == ErrorKind::FeatureUnsupported => {
                        warn!(
                            "Scheme of location {location} is not supported by the opendal \
                             file io. Attempting to load the object-store file io instead"
                        );
                        let alternate = ObjectStoreFileIO::new(properties);
                        if let Err(err) = alternate.fs_by_uri(location) {
                            debug!(
                                "Location {location} is not supported by the object-store \
                                 file io either: {err}"
                            );
                        }
                        return Ok(Arc::new(alternate));
                    }
                    Err(err) => return Err(err),
                }
            }
            Ok(Arc::new(file_io))
        }
        IoImpl::ObjectStore => {
            let file_io = ObjectStoreFileIO::new(properties.clone());
            if let Some(location) = location {
                match file_io.fs_by_uri(location) {
                    Ok(_) => {}
                    Err(err) if err.kind() == ErrorKind::FeatureUnsupported => {
                        warn!(
                            "Scheme of location {location} is not supported by the \
                             object-store file io. Attempting to load the opendal file io \
                             instead"
                        );
                        let alternate = OpenDalFileIO::new(properties);
                        if let Err(err) = alternate.fs_by_uri(location) {
                            debug!(
                                "Location {location} is not supported by the opendal file \
                                 io either: {err}"
                            );
                        }
                        return Ok(Arc::new(alternate));
                    }
                    Err(err) => return Err(err),
                }
            }
            Ok(Arc::new(file_io))
        }
    }
}
