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

//! The FileIO, file handle and stream contracts.

use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::io::SeekFrom;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;

use super::location::{parse_location, ParsedLocation};
use super::props::Properties;
use crate::Result;

/// Metadata of a file.
pub struct FileMetadata {
    /// Size of the file, in bytes.
    pub size: u64,
}

/// Contract every storage backend must satisfy.
///
/// A `FileIO` instance is long-lived: it is created once per table or
/// session context, holds the configuration bag, and memoizes one
/// filesystem client per URI scheme. Handles created through it are cheap
/// value objects that hold no open resource until a stream is acquired.
///
/// Use [`load_file_io`](super::load_file_io) to obtain the configured
/// implementation instead of naming one directly.
#[async_trait]
pub trait FileIO: Debug + Send + Sync {
    /// The configuration bag this instance was constructed with.
    fn properties(&self) -> &Properties;

    /// Create an [`InputFile`] to read bytes from the given location.
    ///
    /// Pure construction: always succeeds and performs no I/O.
    fn new_input(&self, location: &str) -> InputFile;

    /// Create an [`OutputFile`] to write bytes to the given location.
    ///
    /// Pure construction: always succeeds and performs no I/O.
    fn new_output(&self, location: &str) -> OutputFile;

    /// Delete the file at the given location.
    ///
    /// Returns [`ErrorKind::NotFound`](crate::ErrorKind::NotFound) when the
    /// location does not exist and
    /// [`ErrorKind::PermissionDenied`](crate::ErrorKind::PermissionDenied)
    /// when access is refused. To delete by handle, use
    /// [`InputFile::delete`] or [`OutputFile::delete`].
    async fn delete(&self, location: &str) -> Result<()> {
        let parsed = parse_location(location);
        self.fs_by_scheme(parsed.scheme())?
            .delete(parsed.path())
            .await
    }

    /// Resolve a URI scheme to the underlying filesystem client.
    ///
    /// Resolution is memoized: repeated calls with the same scheme return
    /// the identical client instance for the lifetime of this `FileIO`.
    /// A scheme this backend has no client for signals
    /// [`ErrorKind::FeatureUnsupported`](crate::ErrorKind::FeatureUnsupported),
    /// which callers use to probe compatibility rather than treat as
    /// failure.
    fn fs_by_scheme(&self, scheme: &str) -> Result<Arc<dyn FileSystem>>;

    /// Resolve a location's scheme to the underlying filesystem client.
    fn fs_by_uri(&self, uri: &str) -> Result<Arc<dyn FileSystem>> {
        self.fs_by_scheme(parse_location(uri).scheme())
    }
}

/// Per-scheme filesystem client contract.
///
/// Instances are produced and memoized by [`FileIO::fs_by_scheme`]. All
/// methods take the parser-translated path for the client's scheme, see
/// [`parse_location`](super::parse_location).
#[async_trait]
pub trait FileSystem: Debug + Send + Sync {
    /// Fetch metadata of the file at the path.
    async fn metadata(&self, path: &str) -> Result<FileMetadata>;

    /// Whether a file exists at the path.
    async fn exists(&self, path: &str) -> Result<bool>;

    /// Open the file at the path for reading.
    ///
    /// `seekable` is a hint: `false` promises the caller consumes the
    /// stream sequentially, which allows non-seekable fast paths.
    async fn open(&self, path: &str, seekable: bool) -> Result<Box<dyn InputStream>>;

    /// Create a file at the path for writing.
    async fn create(&self, path: &str, overwrite: bool) -> Result<Box<dyn OutputStream>>;

    /// Delete the file at the path.
    async fn delete(&self, path: &str) -> Result<()>;
}

/// Minimal capability contract for a readable stream.
///
/// Any type exposing this method set qualifies, which keeps backend-native
/// readers usable without forced wrapper types. The stream is exclusively
/// owned by whoever opened it and is released when dropped; `close` exists
/// for callers that want to surface release errors.
#[async_trait]
pub trait InputStream: Send + Unpin + 'static {
    /// Read at most `size` bytes from the current position, advancing it.
    ///
    /// Returns an empty buffer at end of file.
    async fn read(&mut self, size: usize) -> Result<Bytes>;

    /// Move the current position. Returns the new position.
    ///
    /// Seeking past end of file is allowed, seeking before the start is
    /// [`ErrorKind::DataInvalid`](crate::ErrorKind::DataInvalid).
    async fn seek(&mut self, pos: SeekFrom) -> Result<u64>;

    /// The current position.
    fn tell(&self) -> u64;

    /// Release the stream.
    async fn close(&mut self) -> Result<()>;
}

impl Debug for dyn InputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputStream").finish_non_exhaustive()
    }
}

#[async_trait]
impl InputStream for Box<dyn InputStream> {
    async fn read(&mut self, size: usize) -> Result<Bytes> {
        self.as_mut().read(size).await
    }

    async fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        self.as_mut().seek(pos).await
    }

    fn tell(&self) -> u64 {
        self.as_ref().tell()
    }

    async fn close(&mut self) -> Result<()> {
        self.as_mut().close().await
    }
}

/// Minimal capability contract for a writable stream.
///
/// `close` flushes and finalizes the write; a stream dropped without
/// `close` aborts it, which is the release path when writing fails
/// mid-way.
#[async_trait]
pub trait OutputStream: Send + Unpin + 'static {
    /// Write the given bytes, returning how many were written.
    async fn write(&mut self, bs: Bytes) -> Result<usize>;

    /// Flush buffered bytes and finalize the write.
    ///
    /// Closing an already closed stream is an error.
    async fn close(&mut self) -> Result<()>;
}

impl Debug for dyn OutputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputStream").finish_non_exhaustive()
    }
}

#[async_trait]
impl OutputStream for Box<dyn OutputStream> {
    async fn write(&mut self, bs: Bytes) -> Result<usize> {
        self.as_mut().write(bs).await
    }

    async fn close(&mut self) -> Result<()> {
        self.as_mut().close().await
    }
}

/// A location-bound handle for reading a file.
///
/// Cheap to construct and clone; holds no open resource until [`open`]
/// is called.
///
/// [`open`]: InputFile::open
#[derive(Clone, Debug)]
pub struct InputFile {
    io: Arc<dyn FileIO>,
    location: String,
    parsed: ParsedLocation,
}

impl InputFile {
    /// Create a new input file bound to the given location.
    pub fn new(io: Arc<dyn FileIO>, location: impl Into<String>) -> Self {
        let location = location.into();
        let parsed = parse_location(&location);
        Self {
            io,
            location,
            parsed,
        }
    }

    /// The location this handle is bound to, as given.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Total length of the file, in bytes.
    pub async fn len(&self) -> Result<u64> {
        let fs = self.io.fs_by_scheme(self.parsed.scheme())?;
        Ok(fs.metadata(self.parsed.path()).await?.size)
    }

    /// Whether the location exists.
    pub async fn exists(&self) -> Result<bool> {
        let fs = self.io.fs_by_scheme(self.parsed.scheme())?;
        fs.exists(self.parsed.path()).await
    }

    /// Open the file for reading.
    ///
    /// `seekable: false` is a hint that the stream is consumed
    /// sequentially. Fails with
    /// [`ErrorKind::NotFound`](crate::ErrorKind::NotFound) when the
    /// location does not exist.
    pub async fn open(&self, seekable: bool) -> Result<Box<dyn InputStream>> {
        let fs = self.io.fs_by_scheme(self.parsed.scheme())?;
        fs.open(self.parsed.path(), seekable).await
    }

    /// Read and return the whole content of the file.
    ///
    /// For continuous reading, use [`Self::open`] instead.
    pub async fn read(&self) -> Result<Bytes> {
        let size = self.len().await?;
        let mut stream = self.open(false).await?;
        let bytes = stream.read(size as usize).await?;
        stream.close().await?;
        Ok(bytes)
    }

    /// Delete the file at this handle's location.
    pub async fn delete(&self) -> Result<()> {
        self.io.delete(&self.location).await
    }
}

/// A location-bound handle for writing a file.
///
/// Cheap to construct and clone; holds no open resource until [`create`]
/// is called.
///
/// [`create`]: OutputFile::create
#[derive(Clone, Debug)]
pub struct OutputFile {
    io: Arc<dyn FileIO>,
    location: String,
    parsed: ParsedLocation,
}

impl OutputFile {
    /// Create a new output file bound to the given location.
    pub fn new(io: Arc<dyn FileIO>, location: impl Into<String>) -> Self {
        let location = location.into();
        let parsed = parse_location(&location);
        Self {
            io,
            location,
            parsed,
        }
    }

    /// The location this handle is bound to, as given.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Total length of the file, in bytes.
    pub async fn len(&self) -> Result<u64> {
        let fs = self.io.fs_by_scheme(self.parsed.scheme())?;
        Ok(fs.metadata(self.parsed.path()).await?.size)
    }

    /// Whether the location exists.
    pub async fn exists(&self) -> Result<bool> {
        let fs = self.io.fs_by_scheme(self.parsed.scheme())?;
        fs.exists(self.parsed.path()).await
    }

    /// Convert into an [`InputFile`] for the same location.
    pub fn to_input_file(self) -> InputFile {
        InputFile {
            io: self.io,
            location: self.location,
            parsed: self.parsed,
        }
    }

    /// Create the file and return a stream for writing.
    ///
    /// Fails with
    /// [`ErrorKind::AlreadyExists`](crate::ErrorKind::AlreadyExists) when
    /// the location exists and `overwrite` is `false`.
    pub async fn create(&self, overwrite: bool) -> Result<Box<dyn OutputStream>> {
        let fs = self.io.fs_by_scheme(self.parsed.scheme())?;
        fs.create(self.parsed.path(), overwrite).await
    }

    /// Write the given bytes as the whole content of the file, replacing
    /// any existing content.
    ///
    /// For continuous writing, use [`Self::create`] instead.
    pub async fn write(&self, bs: Bytes) -> Result<()> {
        let mut stream = self.create(true).await?;
        if !bs.is_empty() {
            stream.write(bs).await?;
        }
        stream.close().await
    }

    /// Delete the file at this handle's location.
    pub async fn delete(&self) -> Result<()> {
        self.io.delete(&self.location).await
    }
}

/// Resolve a [`SeekFrom`] against the current position and total size.
pub(crate) fn resolve_seek(pos: SeekFrom, current: u64, size: u64) -> Result<u64> {
    let target = match pos {
        SeekFrom::Start(offset) => offset as i64,
        SeekFrom::End(offset) => size as i64 + offset,
        SeekFrom::Current(offset) => current as i64 + offset,
    };
    if target < 0 {
        return Err(crate::Error::new(
            crate::ErrorKind::DataInvalid,
            format!("cannot seek to position {target} before the start of the stream"),
        ));
    }
    Ok(target as u64)
}

/// Scheme-to-client memo shared by the backend implementations.
///
/// First-time resolution of a scheme is not atomic: concurrent first
/// access may build the client more than once, the first inserted one
/// wins. Client construction is required to be idempotent and
/// side-effect-light, so this is acceptable.
#[derive(Debug, Default)]
pub(crate) struct SchemeCache {
    inner: Mutex<HashMap<String, Arc<dyn FileSystem>>>,
}

impl SchemeCache {
    pub(crate) fn get_or_try_insert(
        &self,
        scheme: &str,
        build: impl FnOnce() -> Result<Arc<dyn FileSystem>>,
    ) -> Result<Arc<dyn FileSystem>> {
        if let Some(fs) = self.lock().get(scheme) {
            return Ok(fs.clone());
        }
        // Built outside the lock; construction may block on config parsing
        // but never performs I/O.
        let fs = build()?;
        Ok(self
            .lock()
            .entry(scheme.to_string())
            .or_insert(fs)
            .clone())
    }

    /// Schemes resolved so far, for Debug output.
    pub(crate) fn resolved(&self) -> Vec<String> {
        let mut schemes: Vec<String> = self.lock().keys().cloned().collect();
        schemes.sort();
        schemes
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<dyn FileSystem>>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
