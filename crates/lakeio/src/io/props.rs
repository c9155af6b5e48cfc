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

//! Configuration property keys.
//!
//! The configuration bag is a flat string-to-string mapping, namespaced by
//! backend. It is passed by value into backend constructors and never
//! mutated after construction. Each backend consumes the keys its client
//! understands; keys a client cannot express are carried, not rejected.

use std::collections::HashMap;

/// Flat configuration bag handed to [`load_file_io`](super::load_file_io)
/// and held by every [`FileIO`](super::FileIO) instance.
pub type Properties = HashMap<String, String>;

/// Region for the generic client, takes precedence over [`S3_REGION`].
pub const CLIENT_REGION: &str = "client.region";
/// Access key ID for the generic client.
pub const CLIENT_ACCESS_KEY_ID: &str = "client.access-key-id";
/// Secret access key for the generic client.
pub const CLIENT_SECRET_ACCESS_KEY: &str = "client.secret-access-key";
/// Session token for the generic client.
pub const CLIENT_SESSION_TOKEN: &str = "client.session-token";

/// S3 endpoint URL.
pub const S3_ENDPOINT: &str = "s3.endpoint";
/// S3 access key ID.
pub const S3_ACCESS_KEY_ID: &str = "s3.access-key-id";
/// S3 secret access key.
pub const S3_SECRET_ACCESS_KEY: &str = "s3.secret-access-key";
/// S3 session token (required when using temporary credentials).
pub const S3_SESSION_TOKEN: &str = "s3.session-token";
/// S3 region.
pub const S3_REGION: &str = "s3.region";
/// Proxy URI for S3 requests.
pub const S3_PROXY_URI: &str = "s3.proxy-uri";
/// Connect timeout for S3 requests, in seconds (fractions allowed).
pub const S3_CONNECT_TIMEOUT: &str = "s3.connect-timeout";
/// URI of a remote request signer for S3.
pub const S3_SIGNER_URI: &str = "s3.signer.uri";
/// Endpoint path of the remote request signer, relative to
/// [`S3_SIGNER_URI`].
pub const S3_SIGNER_ENDPOINT: &str = "s3.signer.endpoint";
/// Default value for [`S3_SIGNER_ENDPOINT`].
pub const S3_SIGNER_ENDPOINT_DEFAULT: &str = "v1/aws/s3/sign";

/// HDFS namenode host.
pub const HDFS_HOST: &str = "hdfs.host";
/// HDFS namenode port.
pub const HDFS_PORT: &str = "hdfs.port";
/// HDFS user.
pub const HDFS_USER: &str = "hdfs.user";
/// Kerberos ticket cache for HDFS.
pub const HDFS_KERB_TICKET: &str = "hdfs.kerberos-ticket";

/// A connection string for Azure Data Lake Storage.
pub const ADLS_CONNECTION_STRING: &str = "adls.connection-string";
/// Azure storage account to connect to; overrides the account encoded in
/// the location's authority.
pub const ADLS_ACCOUNT_NAME: &str = "adls.account-name";
/// Key to authenticate against the Azure storage account.
pub const ADLS_ACCOUNT_KEY: &str = "adls.account-key";
/// Azure shared access signature.
pub const ADLS_SAS_TOKEN: &str = "adls.sas-token";
/// Azure tenant id for service principal authentication.
pub const ADLS_TENANT_ID: &str = "adls.tenant-id";
/// Azure client id for service principal authentication.
pub const ADLS_CLIENT_ID: &str = "adls.client-id";
/// Azure client secret for service principal authentication.
pub const ADLS_CLIENT_SECRET: &str = "adls.client-secret";

/// OAuth2 token for Google Cloud Storage.
pub const GCS_TOKEN: &str = "gcs.oauth2.token";
/// Expiry of the GCS OAuth2 token, in milliseconds since epoch.
pub const GCS_TOKEN_EXPIRES_AT_MS: &str = "gcs.oauth2.token-expires-at";
/// GCS project id.
pub const GCS_PROJECT_ID: &str = "gcs.project-id";
/// GCS access level.
pub const GCS_ACCESS: &str = "gcs.access";
/// GCS consistency mode.
pub const GCS_CONSISTENCY: &str = "gcs.consistency";
/// GCS listing cache timeout.
pub const GCS_CACHE_TIMEOUT: &str = "gcs.cache-timeout";
/// Whether to bill the requester for GCS access.
pub const GCS_REQUESTER_PAYS: &str = "gcs.requester-pays";
/// Extra session arguments for the GCS client.
pub const GCS_SESSION_KWARGS: &str = "gcs.session-kwargs";
/// GCS endpoint URL.
pub const GCS_ENDPOINT: &str = "gcs.endpoint";
/// Default bucket location for newly created GCS buckets.
pub const GCS_DEFAULT_LOCATION: &str = "gcs.default-bucket-location";
/// Whether the GCS client is object-version aware.
pub const GCS_VERSION_AWARE: &str = "gcs.version-aware";

/// Alibaba Cloud OSS endpoint URL.
pub const OSS_ENDPOINT: &str = "oss.endpoint";
/// Alibaba Cloud OSS access key ID.
pub const OSS_ACCESS_KEY_ID: &str = "oss.access-key-id";
/// Alibaba Cloud OSS access key secret.
pub const OSS_ACCESS_KEY_SECRET: &str = "oss.access-key-secret";
