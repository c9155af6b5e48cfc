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

//! Location parsing.

use url::Url;

/// Components of a parsed file location.
///
/// Produced by [`parse_location`]. The `path` component is already in the
/// form the backend client for the scheme expects, see [`parse_location`]
/// for the translation rules.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedLocation {
    scheme: String,
    authority: String,
    path: String,
}

impl ParsedLocation {
    /// URI scheme of the location, `file` when none was given.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Authority component (host, optional port and userinfo), empty when
    /// the location has none.
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Path component in the calling convention of the scheme's client.
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Parse a location string into scheme, authority and path.
///
/// The decomposition is total: every input produces a result.
///
/// - Inputs without a scheme are local files: scheme `file`, empty
///   authority, and the absolute form of the input as path.
/// - For the distributed-filesystem schemes `hdfs` and `viewfs` the path is
///   returned exactly as given; their clients interpret the authority
///   (namenode address) separately from the path.
/// - For every other scheme the authority is folded into the path, because
///   object store clients expect the bucket or account encoded in the path
///   string.
///
/// ```
/// use lakeio::io::parse_location;
///
/// let parsed = parse_location("s3://bucket/warehouse/data.parquet");
/// assert_eq!(parsed.scheme(), "s3");
/// assert_eq!(parsed.authority(), "bucket");
/// assert_eq!(parsed.path(), "bucket/warehouse/data.parquet");
/// ```
pub fn parse_location(location: &str) -> ParsedLocation {
    match Url::parse(location) {
        Ok(url) => {
            let authority = url.authority().to_string();
            let path = match url.scheme() {
                "hdfs" | "viewfs" => url.path().to_string(),
                _ => format!("{}{}", authority, url.path()),
            };
            ParsedLocation {
                scheme: url.scheme().to_string(),
                authority,
                path,
            }
        }
        // Not a URL: a bare filesystem path, relative or absolute.
        Err(_) => ParsedLocation {
            scheme: "file".to_string(),
            authority: String::new(),
            path: std::path::absolute(location)
                .map(|path| path.to_string_lossy().into_owned())
                .unwrap_or_else(|_| location.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_absolute_path_without_scheme() {
        let parsed = parse_location("/tmp/warehouse/data.parquet");
        assert_eq!(parsed.scheme(), "file");
        assert_eq!(parsed.authority(), "");
        assert_eq!(parsed.path(), "/tmp/warehouse/data.parquet");
    }

    #[test]
    fn test_parse_relative_path_without_scheme() {
        let parsed = parse_location("warehouse/data.parquet");
        let expected = std::path::absolute("warehouse/data.parquet").unwrap();

        assert_eq!(parsed.scheme(), "file");
        assert_eq!(parsed.authority(), "");
        assert_eq!(parsed.path(), expected.to_string_lossy());
    }

    #[test]
    fn test_parse_file_scheme() {
        let parsed = parse_location("file:///tmp/c");
        assert_eq!(parsed.scheme(), "file");
        assert_eq!(parsed.authority(), "");
        assert_eq!(parsed.path(), "/tmp/c");

        let parsed = parse_location("file:/tmp/b");
        assert_eq!(parsed.path(), "/tmp/b");
    }

    #[test]
    fn test_parse_s3_folds_bucket_into_path() {
        let parsed = parse_location("s3://bucket/warehouse/data.parquet");
        assert_eq!(parsed.scheme(), "s3");
        assert_eq!(parsed.authority(), "bucket");
        assert_eq!(parsed.path(), "bucket/warehouse/data.parquet");

        let parsed = parse_location("s3a://bucket/warehouse/data.parquet");
        assert_eq!(parsed.scheme(), "s3a");
        assert_eq!(parsed.path(), "bucket/warehouse/data.parquet");
    }

    #[test]
    fn test_parse_memory_folds_authority_into_path() {
        let parsed = parse_location("memory://bucket/a/b.txt");
        assert_eq!(parsed.scheme(), "memory");
        assert_eq!(parsed.authority(), "bucket");
        assert_eq!(parsed.path(), "bucket/a/b.txt");
    }

    #[test]
    fn test_parse_hdfs_keeps_authority_separate() {
        let parsed = parse_location("hdfs://namenode:8020/warehouse/tbl");
        assert_eq!(parsed.scheme(), "hdfs");
        assert_eq!(parsed.authority(), "namenode:8020");
        assert_eq!(parsed.path(), "/warehouse/tbl");
    }

    #[test]
    fn test_parse_viewfs_keeps_authority_separate() {
        let parsed = parse_location("viewfs://cluster/warehouse/tbl");
        assert_eq!(parsed.scheme(), "viewfs");
        assert_eq!(parsed.authority(), "cluster");
        assert_eq!(parsed.path(), "/warehouse/tbl");
    }

    #[test]
    fn test_parse_hdfs_authority_with_userinfo() {
        let parsed = parse_location("hdfs://hive@namenode:8020/warehouse/tbl");
        assert_eq!(parsed.authority(), "hive@namenode:8020");
        assert_eq!(parsed.path(), "/warehouse/tbl");
    }

    #[test]
    fn test_parse_abfss_folds_authority_into_path() {
        let parsed = parse_location("abfss://container@account.dfs.core.windows.net/data/file");
        assert_eq!(parsed.scheme(), "abfss");
        assert_eq!(parsed.authority(), "container@account.dfs.core.windows.net");
        assert_eq!(
            parsed.path(),
            "container@account.dfs.core.windows.net/data/file"
        );
    }

    #[test]
    fn test_parse_is_total_on_non_url_input() {
        let parsed = parse_location("tmp/||c");
        assert_eq!(parsed.scheme(), "file");
        assert!(parsed.path().starts_with('/'));
        assert!(parsed.path().ends_with("tmp/||c"));
    }
}
