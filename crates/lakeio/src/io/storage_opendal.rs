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

//! OpenDAL-backed FileIO implementation.

use std::fmt::Debug;
use std::io::SeekFrom;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use opendal::services::FsConfig;
#[cfg(feature = "storage-gcs")]
use opendal::services::GcsConfig;
use opendal::services::MemoryConfig;
#[cfg(feature = "storage-oss")]
use opendal::services::OssConfig;
#[cfg(feature = "storage-s3")]
use opendal::services::S3Config;
use opendal::Operator;

#[cfg(feature = "storage-gcs")]
use super::props::{GCS_ENDPOINT, GCS_TOKEN};
#[cfg(feature = "storage-oss")]
use super::props::{OSS_ACCESS_KEY_ID, OSS_ACCESS_KEY_SECRET, OSS_ENDPOINT};
#[cfg(feature = "storage-s3")]
use super::props::{
    CLIENT_ACCESS_KEY_ID, CLIENT_REGION, CLIENT_SECRET_ACCESS_KEY, CLIENT_SESSION_TOKEN,
    S3_ACCESS_KEY_ID, S3_ENDPOINT, S3_REGION, S3_SECRET_ACCESS_KEY, S3_SESSION_TOKEN,
};
use super::{
    FileIO, FileMetadata, FileSystem, InputFile, InputStream, OutputFile, OutputStream, Properties,
};
use crate::io::file_io::{resolve_seek, SchemeCache};
use crate::{Error, ErrorKind, Result};

/// The primary, OpenDAL-backed [`FileIO`] implementation.
///
/// Serves the `memory`, `file`, `s3`/`s3a`, `oss` and `gs`/`gcs` schemes
/// (cloud schemes behind their feature flags). The Azure and HDFS scheme
/// families are reported as unsupported, which the backend selector uses
/// to substitute [`ObjectStoreFileIO`](super::ObjectStoreFileIO).
#[derive(Clone)]
pub struct OpenDalFileIO {
    properties: Arc<Properties>,
    schemes: Arc<SchemeCache>,
}

impl Debug for OpenDalFileIO {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenDalFileIO")
            .field("resolved_schemes", &self.schemes.resolved())
            .finish()
    }
}

impl OpenDalFileIO {
    /// Create a new instance holding the given configuration bag.
    ///
    /// No client is built here; the scheme memo fills on first resolution.
    pub fn new(properties: Properties) -> Self {
        Self {
            properties: Arc::new(properties),
            schemes: Arc::new(SchemeCache::default()),
        }
    }

    fn build_fs(&self, scheme: &str) -> Result<Arc<dyn FileSystem>> {
        match scheme {
            "memory" => {
                let op = Operator::from_config(MemoryConfig::default())?.finish();
                Ok(Arc::new(OpenDalFs::Memory(op)))
            }
            "file" => {
                let mut cfg = FsConfig::default();
                cfg.root = Some("/".to_string());
                let op = Operator::from_config(cfg)?.finish();
                Ok(Arc::new(OpenDalFs::LocalFs(op)))
            }
            #[cfg(feature = "storage-s3")]
            "s3" | "s3a" => Ok(Arc::new(OpenDalFs::S3 {
                properties: self.properties.clone(),
            })),
            #[cfg(feature = "storage-oss")]
            "oss" => Ok(Arc::new(OpenDalFs::Oss {
                properties: self.properties.clone(),
            })),
            #[cfg(feature = "storage-gcs")]
            "gs" | "gcs" => Ok(Arc::new(OpenDalFs::Gcs {
                properties: self.properties.clone(),
            })),
            _ => Err(Error::new(
                ErrorKind::FeatureUnsupported,
                format!("Scheme '{scheme}' is not supported by the opendal file io"),
            )),
        }
    }
}

#[async_trait]
impl FileIO for OpenDalFileIO {
    fn properties(&self) -> &Properties {
        &self.properties
    }

    fn new_input(&self, location: &str) -> InputFile {
        InputFile::new(Arc::new(self.clone()), location)
    }

    fn new_output(&self, location: &str) -> OutputFile {
        OutputFile::new(Arc::new(self.clone()), location)
    }

    fn fs_by_scheme(&self, scheme: &str) -> Result<Arc<dyn FileSystem>> {
        self.schemes
            .get_or_try_insert(scheme, || self.build_fs(scheme))
    }
}

/// Per-scheme client over OpenDAL operators.
///
/// Stateful services hold their operator; bucket-addressed services derive
/// one per call from the leading bucket segment of the folded path.
#[derive(Debug)]
enum OpenDalFs {
    Memory(Operator),
    LocalFs(Operator),
    #[cfg(feature = "storage-s3")]
    S3 { properties: Arc<Properties> },
    #[cfg(feature = "storage-oss")]
    Oss { properties: Arc<Properties> },
    #[cfg(feature = "storage-gcs")]
    Gcs { properties: Arc<Properties> },
}

impl OpenDalFs {
    /// Derive the operator and operator-relative path for one call.
    fn operator_for<'a>(&self, path: &'a str) -> Result<(Operator, &'a str)> {
        match self {
            OpenDalFs::Memory(op) => Ok((op.clone(), path.trim_start_matches('/'))),
            OpenDalFs::LocalFs(op) => Ok((op.clone(), path.trim_start_matches('/'))),
            #[cfg(feature = "storage-s3")]
            OpenDalFs::S3 { properties } => {
                let (bucket, relative) = split_bucket(path)?;
                let mut cfg = S3Config::default();
                cfg.bucket = bucket.to_string();
                cfg.endpoint = properties.get(S3_ENDPOINT).cloned();
                cfg.access_key_id = properties
                    .get(S3_ACCESS_KEY_ID)
                    .or_else(|| properties.get(CLIENT_ACCESS_KEY_ID))
                    .cloned();
                cfg.secret_access_key = properties
                    .get(S3_SECRET_ACCESS_KEY)
                    .or_else(|| properties.get(CLIENT_SECRET_ACCESS_KEY))
                    .cloned();
                cfg.session_token = properties
                    .get(S3_SESSION_TOKEN)
                    .or_else(|| properties.get(CLIENT_SESSION_TOKEN))
                    .cloned();
                // client.region takes precedence over s3.region.
                cfg.region = properties
                    .get(CLIENT_REGION)
                    .or_else(|| properties.get(S3_REGION))
                    .cloned();
                Ok((Operator::from_config(cfg)?.finish(), relative))
            }
            #[cfg(feature = "storage-oss")]
            OpenDalFs::Oss { properties } => {
                let (bucket, relative) = split_bucket(path)?;
                let mut cfg = OssConfig::default();
                cfg.bucket = bucket.to_string();
                cfg.endpoint = properties.get(OSS_ENDPOINT).cloned();
                cfg.access_key_id = properties.get(OSS_ACCESS_KEY_ID).cloned();
                cfg.access_key_secret = properties.get(OSS_ACCESS_KEY_SECRET).cloned();
                Ok((Operator::from_config(cfg)?.finish(), relative))
            }
            #[cfg(feature = "storage-gcs")]
            OpenDalFs::Gcs { properties } => {
                let (bucket, relative) = split_bucket(path)?;
                let mut cfg = GcsConfig::default();
                cfg.bucket = bucket.to_string();
                cfg.token = properties.get(GCS_TOKEN).cloned();
                cfg.endpoint = properties.get(GCS_ENDPOINT).cloned();
                Ok((Operator::from_config(cfg)?.finish(), relative))
            }
        }
    }
}

#[async_trait]
impl FileSystem for OpenDalFs {
    async fn metadata(&self, path: &str) -> Result<FileMetadata> {
        let (op, relative) = self.operator_for(path)?;
        let meta = op.stat(relative).await?;
        Ok(FileMetadata {
            size: meta.content_length(),
        })
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        let (op, relative) = self.operator_for(path)?;
        Ok(op.exists(relative).await?)
    }

    async fn open(&self, path: &str, _seekable: bool) -> Result<Box<dyn InputStream>> {
        let (op, relative) = self.operator_for(path)?;
        // stat up front: missing locations surface NotFound here, and the
        // size bounds every later positional read.
        let meta = op.stat(relative).await?;
        let reader = op.reader(relative).await?;
        Ok(Box::new(OpenDalInputStream {
            reader,
            pos: 0,
            size: meta.content_length(),
        }))
    }

    async fn create(&self, path: &str, overwrite: bool) -> Result<Box<dyn OutputStream>> {
        let (op, relative) = self.operator_for(path)?;
        if !overwrite && op.exists(relative).await? {
            return Err(
                Error::new(ErrorKind::AlreadyExists, "location already exists")
                    .with_context("path", path),
            );
        }
        Ok(Box::new(OpenDalOutputStream {
            writer: op.writer(relative).await?,
        }))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let (op, relative) = self.operator_for(path)?;
        // OpenDAL's delete is a no-op for missing paths; stat first so
        // deleting an absent location reports NotFound.
        op.stat(relative).await?;
        Ok(op.delete(relative).await?)
    }
}

/// Split the leading bucket segment off a folded object store path.
#[cfg(any(feature = "storage-s3", feature = "storage-oss", feature = "storage-gcs"))]
fn split_bucket(path: &str) -> Result<(&str, &str)> {
    match path.split_once('/') {
        Some((bucket, relative)) if !bucket.is_empty() => Ok((bucket, relative)),
        _ => Err(
            Error::new(ErrorKind::DataInvalid, "missing bucket in object store path")
                .with_context("path", path),
        ),
    }
}

struct OpenDalInputStream {
    reader: opendal::Reader,
    pos: u64,
    size: u64,
}

#[async_trait]
impl InputStream for OpenDalInputStream {
    async fn read(&mut self, size: usize) -> Result<Bytes> {
        let end = (self.pos.saturating_add(size as u64)).min(self.size);
        if self.pos >= end {
            return Ok(Bytes::new());
        }
        let bytes = self.reader.read(self.pos..end).await?.to_bytes();
        self.pos += bytes.len() as u64;
        Ok(bytes)
    }

    async fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        self.pos = resolve_seek(pos, self.pos, self.size)?;
        Ok(self.pos)
    }

    fn tell(&self) -> u64 {
        self.pos
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

struct OpenDalOutputStream {
    writer: opendal::Writer,
}

#[async_trait]
impl OutputStream for OpenDalOutputStream {
    async fn write(&mut self, bs: Bytes) -> Result<usize> {
        let written = bs.len();
        self.writer.write(bs).await?;
        Ok(written)
    }

    async fn close(&mut self) -> Result<()> {
        let _ = self.writer.close().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bytes::Bytes;

    use super::*;
    use crate::io::FileIO;
    use crate::ErrorKind;

    fn new_io() -> OpenDalFileIO {
        OpenDalFileIO::new(Properties::new())
    }

    #[tokio::test]
    async fn test_memory_write_then_read() {
        let io = new_io();
        let location = "memory://bucket/a/b.txt";

        let output = io.new_output(location);
        output.write(Bytes::from_static(b"hello world")).await.unwrap();

        let input = io.new_input(location);
        assert_eq!(input.read().await.unwrap(), Bytes::from_static(b"hello world"));
        assert_eq!(input.len().await.unwrap(), 11);
    }

    #[tokio::test]
    async fn test_memory_exists_lifecycle() {
        let io = new_io();
        let location = "memory://bucket/lifecycle.txt";

        let output = io.new_output(location);
        assert!(!output.exists().await.unwrap());

        let mut stream = output.create(false).await.unwrap();
        stream.write(Bytes::from_static(b"x")).await.unwrap();
        stream.close().await.unwrap();
        assert!(output.exists().await.unwrap());

        io.delete(location).await.unwrap();
        assert!(!output.exists().await.unwrap());
    }

    #[tokio::test]
    async fn test_create_without_overwrite_fails_on_existing() {
        let io = new_io();
        let location = "memory://bucket/existing.txt";

        let output = io.new_output(location);
        output.write(Bytes::from_static(b"v1")).await.unwrap();

        let err = output.create(false).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);

        // Overwriting is allowed when requested.
        let mut stream = output.create(true).await.unwrap();
        stream.write(Bytes::from_static(b"v2")).await.unwrap();
        stream.close().await.unwrap();
        assert_eq!(
            io.new_input(location).read().await.unwrap(),
            Bytes::from_static(b"v2")
        );
    }

    #[tokio::test]
    async fn test_open_missing_is_not_found() {
        let io = new_io();
        let input = io.new_input("memory://bucket/missing.txt");

        let err = input.open(true).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let io = new_io();
        let err = io.delete("memory://bucket/missing.txt").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_stream_seek_and_tell() {
        let io = new_io();
        let location = "memory://bucket/seek.txt";
        io.new_output(location)
            .write(Bytes::from_static(b"0123456789"))
            .await
            .unwrap();

        let mut stream = io.new_input(location).open(true).await.unwrap();
        assert_eq!(stream.read(4).await.unwrap(), Bytes::from_static(b"0123"));
        assert_eq!(stream.tell(), 4);

        assert_eq!(stream.seek(SeekFrom::Start(2)).await.unwrap(), 2);
        assert_eq!(stream.read(3).await.unwrap(), Bytes::from_static(b"234"));

        assert_eq!(stream.seek(SeekFrom::End(-2)).await.unwrap(), 8);
        assert_eq!(stream.read(10).await.unwrap(), Bytes::from_static(b"89"));

        assert_eq!(stream.seek(SeekFrom::Current(-4)).await.unwrap(), 6);
        assert_eq!(stream.read(1).await.unwrap(), Bytes::from_static(b"6"));

        let err = stream.seek(SeekFrom::Current(-100)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataInvalid);

        stream.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_read_past_end_is_empty() {
        let io = new_io();
        let location = "memory://bucket/short.txt";
        io.new_output(location)
            .write(Bytes::from_static(b"ab"))
            .await
            .unwrap();

        let mut stream = io.new_input(location).open(true).await.unwrap();
        stream.seek(SeekFrom::End(10)).await.unwrap();
        assert!(stream.read(4).await.unwrap().is_empty());
        stream.close().await.unwrap();
    }

    #[test]
    fn test_fs_by_scheme_is_memoized() {
        let io = new_io();
        let first = io.fs_by_scheme("memory").unwrap();
        let second = io.fs_by_scheme("memory").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_unsupported_schemes() {
        let io = new_io();
        for scheme in ["hdfs", "viewfs", "abfss", "wasb"] {
            let err = io.fs_by_scheme(scheme).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::FeatureUnsupported);
        }
    }

    #[tokio::test]
    async fn test_local_fs_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let location = dir.path().join("data.bin").to_str().unwrap().to_string();

        let io = new_io();
        io.new_output(&location)
            .write(Bytes::from_static(b"local bytes"))
            .await
            .unwrap();

        let input = io.new_input(&location);
        assert!(input.exists().await.unwrap());
        assert_eq!(input.read().await.unwrap(), Bytes::from_static(b"local bytes"));

        input.delete().await.unwrap();
        assert!(!input.exists().await.unwrap());
    }
}
