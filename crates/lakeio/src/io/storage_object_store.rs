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

//! object_store-backed FileIO implementation.

use std::fmt::Debug;
use std::io::SeekFrom;
use std::sync::Arc;
#[cfg(feature = "storage-s3")]
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
#[cfg(feature = "storage-s3")]
use object_store::aws::AmazonS3Builder;
#[cfg(feature = "storage-azdls")]
use object_store::azure::MicrosoftAzureBuilder;
use object_store::buffered::BufWriter;
#[cfg(feature = "storage-gcs")]
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path;
#[cfg(feature = "storage-s3")]
use object_store::ClientOptions;
use object_store::ObjectStore;
use tokio::io::AsyncWriteExt;

#[cfg(feature = "storage-azdls")]
use super::props::{
    ADLS_ACCOUNT_KEY, ADLS_ACCOUNT_NAME, ADLS_CLIENT_ID, ADLS_CLIENT_SECRET, ADLS_TENANT_ID,
};
#[cfg(feature = "storage-s3")]
use super::props::{
    CLIENT_ACCESS_KEY_ID, CLIENT_REGION, CLIENT_SECRET_ACCESS_KEY, CLIENT_SESSION_TOKEN,
    S3_ACCESS_KEY_ID, S3_CONNECT_TIMEOUT, S3_ENDPOINT, S3_PROXY_URI, S3_REGION,
    S3_SECRET_ACCESS_KEY, S3_SESSION_TOKEN,
};
use super::{
    FileIO, FileMetadata, FileSystem, InputFile, InputStream, OutputFile, OutputStream, Properties,
};
use crate::io::file_io::{resolve_seek, SchemeCache};
use crate::{Error, ErrorKind, Result};

/// The alternate, object_store-backed [`FileIO`] implementation.
///
/// Serves the `memory`, `file`, `s3`/`s3a`, `gs`/`gcs` and Azure
/// (`az`/`abfs`/`abfss`/`wasb`/`wasbs`) schemes, cloud schemes behind
/// their feature flags. `oss` and the HDFS scheme family are reported as
/// unsupported, which the backend selector uses to substitute
/// [`OpenDalFileIO`](super::OpenDalFileIO).
#[derive(Clone)]
pub struct ObjectStoreFileIO {
    properties: Arc<Properties>,
    schemes: Arc<SchemeCache>,
}

impl Debug for ObjectStoreFileIO {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStoreFileIO")
            .field("resolved_schemes", &self.schemes.resolved())
            .finish()
    }
}

impl ObjectStoreFileIO {
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
            "memory" => Ok(Arc::new(ObjectStoreFs::Memory(Arc::new(InMemory::new())))),
            "file" => Ok(Arc::new(ObjectStoreFs::LocalFs(Arc::new(
                LocalFileSystem::new(),
            )))),
            #[cfg(feature = "storage-s3")]
            "s3" | "s3a" => Ok(Arc::new(ObjectStoreFs::S3 {
                properties: self.properties.clone(),
            })),
            #[cfg(feature = "storage-gcs")]
            "gs" | "gcs" => Ok(Arc::new(ObjectStoreFs::Gcs)),
            #[cfg(feature = "storage-azdls")]
            "az" | "abfs" | "abfss" | "wasb" | "wasbs" => Ok(Arc::new(ObjectStoreFs::Azure {
                properties: self.properties.clone(),
            })),
            _ => Err(Error::new(
                ErrorKind::FeatureUnsupported,
                format!("Scheme '{scheme}' is not supported by the object-store file io"),
            )),
        }
    }
}

#[async_trait]
impl FileIO for ObjectStoreFileIO {
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

/// Per-scheme client over object_store stores.
///
/// Stateful stores are held; bucket-addressed stores are derived per call
/// from the leading segment of the folded path.
#[derive(Debug)]
enum ObjectStoreFs {
    Memory(Arc<InMemory>),
    LocalFs(Arc<LocalFileSystem>),
    #[cfg(feature = "storage-s3")]
    S3 { properties: Arc<Properties> },
    /// Credentials come from the client's application default lookup; the
    /// gcs.* properties have no counterpart in this client.
    #[cfg(feature = "storage-gcs")]
    Gcs,
    #[cfg(feature = "storage-azdls")]
    Azure { properties: Arc<Properties> },
}

impl ObjectStoreFs {
    /// Derive the store and store-relative path for one call.
    fn store_for(&self, path: &str) -> Result<(Arc<dyn ObjectStore>, Path)> {
        match self {
            ObjectStoreFs::Memory(store) => {
                Ok((store.clone(), parse_path(path.trim_start_matches('/'))?))
            }
            ObjectStoreFs::LocalFs(store) => {
                let location = Path::from_absolute_path(path).map_err(|err| {
                    Error::new(ErrorKind::DataInvalid, "invalid local filesystem path")
                        .with_context("path", path)
                        .with_source(err)
                })?;
                Ok((store.clone(), location))
            }
            #[cfg(feature = "storage-s3")]
            ObjectStoreFs::S3 { properties } => {
                let (bucket, relative) = split_bucket(path)?;
                let mut builder = AmazonS3Builder::new().with_bucket_name(bucket);
                if let Some(endpoint) = properties.get(S3_ENDPOINT) {
                    builder = builder.with_endpoint(endpoint);
                    if endpoint.starts_with("http://") {
                        builder = builder.with_allow_http(true);
                    }
                }
                // client.region takes precedence over s3.region.
                if let Some(region) = properties
                    .get(CLIENT_REGION)
                    .or_else(|| properties.get(S3_REGION))
                {
                    builder = builder.with_region(region);
                }
                if let Some(access_key_id) = properties
                    .get(S3_ACCESS_KEY_ID)
                    .or_else(|| properties.get(CLIENT_ACCESS_KEY_ID))
                {
                    builder = builder.with_access_key_id(access_key_id);
                }
                if let Some(secret_access_key) = properties
                    .get(S3_SECRET_ACCESS_KEY)
                    .or_else(|| properties.get(CLIENT_SECRET_ACCESS_KEY))
                {
                    builder = builder.with_secret_access_key(secret_access_key);
                }
                if let Some(session_token) = properties
                    .get(S3_SESSION_TOKEN)
                    .or_else(|| properties.get(CLIENT_SESSION_TOKEN))
                {
                    builder = builder.with_token(session_token);
                }
                builder = builder.with_client_options(client_options(properties)?);
                Ok((Arc::new(builder.build()?), parse_path(relative)?))
            }
            #[cfg(feature = "storage-gcs")]
            ObjectStoreFs::Gcs => {
                let (bucket, relative) = split_bucket(path)?;
                let builder = GoogleCloudStorageBuilder::new().with_bucket_name(bucket);
                Ok((Arc::new(builder.build()?), parse_path(relative)?))
            }
            #[cfg(feature = "storage-azdls")]
            ObjectStoreFs::Azure { properties } => {
                let (authority, relative) = split_bucket(path)?;
                let (container, host) = authority.split_once('@').ok_or_else(|| {
                    Error::new(
                        ErrorKind::DataInvalid,
                        "Azure locations must have the form scheme://container@account.host/path",
                    )
                    .with_context("path", path)
                })?;
                // adls.account-name overrides the account in the authority.
                let account = match properties.get(ADLS_ACCOUNT_NAME) {
                    Some(account) => account.clone(),
                    None => host
                        .split('.')
                        .next()
                        .filter(|account| !account.is_empty())
                        .ok_or_else(|| {
                            Error::new(ErrorKind::DataInvalid, "missing Azure storage account")
                                .with_context("path", path)
                        })?
                        .to_string(),
                };
                let mut builder = MicrosoftAzureBuilder::new()
                    .with_container_name(container)
                    .with_account(account);
                if let Some(account_key) = properties.get(ADLS_ACCOUNT_KEY) {
                    builder = builder.with_access_key(account_key);
                }
                if let (Some(client_id), Some(client_secret), Some(tenant_id)) = (
                    properties.get(ADLS_CLIENT_ID),
                    properties.get(ADLS_CLIENT_SECRET),
                    properties.get(ADLS_TENANT_ID),
                ) {
                    builder =
                        builder.with_client_secret_authorization(client_id, client_secret, tenant_id);
                }
                Ok((Arc::new(builder.build()?), parse_path(relative)?))
            }
        }
    }
}

#[async_trait]
impl FileSystem for ObjectStoreFs {
    async fn metadata(&self, path: &str) -> Result<FileMetadata> {
        let (store, location) = self.store_for(path)?;
        let meta = store.head(&location).await?;
        Ok(FileMetadata { size: meta.size })
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        let (store, location) = self.store_for(path)?;
        match store.head(&location).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    async fn open(&self, path: &str, _seekable: bool) -> Result<Box<dyn InputStream>> {
        let (store, location) = self.store_for(path)?;
        // head up front: missing locations surface NotFound here, and the
        // size bounds every later positional read.
        let meta = store.head(&location).await?;
        Ok(Box::new(ObjectStoreInputStream {
            store,
            location,
            pos: 0,
            size: meta.size,
        }))
    }

    async fn create(&self, path: &str, overwrite: bool) -> Result<Box<dyn OutputStream>> {
        let (store, location) = self.store_for(path)?;
        if !overwrite {
            match store.head(&location).await {
                Ok(_) => {
                    return Err(
                        Error::new(ErrorKind::AlreadyExists, "location already exists")
                            .with_context("path", path),
                    );
                }
                Err(object_store::Error::NotFound { .. }) => {}
                Err(err) => return Err(err.into()),
            }
        }
        let writer = BufWriter::new(store, location);
        Ok(Box::new(ObjectStoreOutputStream { writer }))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let (store, location) = self.store_for(path)?;
        Ok(store.delete(&location).await?)
    }
}

/// Split the leading bucket segment off a folded object store path.
#[cfg(any(
    feature = "storage-s3",
    feature = "storage-gcs",
    feature = "storage-azdls"
))]
fn split_bucket(path: &str) -> Result<(&str, &str)> {
    match path.split_once('/') {
        Some((bucket, relative)) if !bucket.is_empty() => Ok((bucket, relative)),
        _ => Err(
            Error::new(ErrorKind::DataInvalid, "missing bucket in object store path")
                .with_context("path", path),
        ),
    }
}

fn parse_path(relative: &str) -> Result<Path> {
    Path::parse(relative).map_err(|err| {
        Error::new(ErrorKind::DataInvalid, "invalid object store path")
            .with_context("path", relative)
            .with_source(err)
    })
}

#[cfg(feature = "storage-s3")]
fn client_options(properties: &Properties) -> Result<ClientOptions> {
    let mut options = ClientOptions::new();
    if let Some(proxy_uri) = properties.get(S3_PROXY_URI) {
        options = options.with_proxy_url(proxy_uri);
    }
    if let Some(connect_timeout) = properties.get(S3_CONNECT_TIMEOUT) {
        let seconds: f64 = connect_timeout.parse().map_err(|_| {
            Error::new(ErrorKind::DataInvalid, "connect timeout must be a number")
                .with_context(S3_CONNECT_TIMEOUT, connect_timeout)
        })?;
        options = options.with_connect_timeout(Duration::from_secs_f64(seconds));
    }
    Ok(options)
}

struct ObjectStoreInputStream {
    store: Arc<dyn ObjectStore>,
    location: Path,
    pos: u64,
    size: u64,
}

#[async_trait]
impl InputStream for ObjectStoreInputStream {
    async fn read(&mut self, size: usize) -> Result<Bytes> {
        let end = (self.pos.saturating_add(size as u64)).min(self.size);
        if self.pos >= end {
            return Ok(Bytes::new());
        }
        let bytes = self.store.get_range(&self.location, self.pos..end).await?;
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

struct ObjectStoreOutputStream {
    writer: BufWriter,
}

#[async_trait]
impl OutputStream for ObjectStoreOutputStream {
    async fn write(&mut self, bs: Bytes) -> Result<usize> {
        self.writer.write_all(&bs).await?;
        Ok(bs.len())
    }

    async fn close(&mut self) -> Result<()> {
        Ok(self.writer.shutdown().await?)
    }
}
