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

//! End-to-end tests for FileIO across both backends.

use std::collections::HashMap;
use std::io::SeekFrom;
use std::sync::Arc;

use bytes::Bytes;
use lakeio::io::{load_file_io, FileIO, InputStream, OutputStream, IO_IMPL, OBJECT_STORE, OPENDAL};
use lakeio::ErrorKind;

fn io_with_impl(io_impl: &str) -> Arc<dyn FileIO> {
    let properties = HashMap::from([(IO_IMPL.to_string(), io_impl.to_string())]);
    load_file_io(properties, None).unwrap()
}

async fn roundtrip_through_handles(file_io: Arc<dyn FileIO>) {
    let location = "memory://bucket/path/to/data.bin";

    let output = file_io.new_output(location);
    assert!(!output.exists().await.unwrap());

    let mut stream = output.create(false).await.unwrap();
    assert_eq!(stream.write(Bytes::from_static(b"table ")).await.unwrap(), 6);
    assert_eq!(stream.write(Bytes::from_static(b"bytes")).await.unwrap(), 5);
    stream.close().await.unwrap();

    let input = output.to_input_file();
    assert_eq!(input.location(), location);
    assert!(input.exists().await.unwrap());
    assert_eq!(input.len().await.unwrap(), 11);
    assert_eq!(input.read().await.unwrap(), Bytes::from_static(b"table bytes"));

    input.delete().await.unwrap();
    assert!(!input.exists().await.unwrap());
}

#[tokio::test]
async fn test_memory_roundtrip_opendal() {
    roundtrip_through_handles(io_with_impl(OPENDAL)).await;
}

#[tokio::test]
async fn test_memory_roundtrip_object_store() {
    roundtrip_through_handles(io_with_impl(OBJECT_STORE)).await;
}

async fn seekable_stream_semantics(file_io: Arc<dyn FileIO>) {
    let location = "memory://bucket/stream.bin";
    file_io
        .new_output(location)
        .write(Bytes::from_static(b"0123456789"))
        .await
        .unwrap();

    let mut stream = file_io.new_input(location).open(true).await.unwrap();
    assert_eq!(stream.tell(), 0);
    assert_eq!(stream.read(4).await.unwrap(), Bytes::from_static(b"0123"));
    assert_eq!(stream.seek(SeekFrom::Current(2)).await.unwrap(), 6);
    assert_eq!(stream.read(2).await.unwrap(), Bytes::from_static(b"67"));
    assert_eq!(stream.seek(SeekFrom::End(-1)).await.unwrap(), 9);
    assert_eq!(stream.read(5).await.unwrap(), Bytes::from_static(b"9"));
    // Reads at end of file drain to empty rather than failing.
    assert!(stream.read(1).await.unwrap().is_empty());
    stream.close().await.unwrap();
}

#[tokio::test]
async fn test_stream_semantics_opendal() {
    seekable_stream_semantics(io_with_impl(OPENDAL)).await;
}

#[tokio::test]
async fn test_stream_semantics_object_store() {
    seekable_stream_semantics(io_with_impl(OBJECT_STORE)).await;
}

async fn local_fs_roundtrip(file_io: Arc<dyn FileIO>, location: &str) {
    let output = file_io.new_output(location);
    output.write(Bytes::from_static(b"on disk")).await.unwrap();

    // A second create without overwrite must refuse.
    let err = output.create(false).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);

    let input = file_io.new_input(location);
    assert_eq!(input.read().await.unwrap(), Bytes::from_static(b"on disk"));

    file_io.delete(location).await.unwrap();
    let err = input.open(true).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_local_fs_roundtrip_opendal() {
    let dir = tempfile::tempdir().unwrap();
    let location = dir.path().join("a.bin").to_str().unwrap().to_string();
    local_fs_roundtrip(io_with_impl(OPENDAL), &location).await;
}

#[tokio::test]
async fn test_local_fs_roundtrip_object_store() {
    let dir = tempfile::tempdir().unwrap();
    let location = dir.path().join("b.bin").to_str().unwrap().to_string();
    local_fs_roundtrip(io_with_impl(OBJECT_STORE), &location).await;
}

#[tokio::test]
async fn test_schemeless_location_is_served_by_local_fs() {
    let dir = tempfile::tempdir().unwrap();
    let location = dir.path().join("c.bin").to_str().unwrap().to_string();

    // A bare filesystem path selects and probes fine: every backend serves
    // the file scheme.
    let file_io = load_file_io(HashMap::new(), Some(&location)).unwrap();
    file_io
        .new_output(&location)
        .write(Bytes::from_static(b"x"))
        .await
        .unwrap();
    assert!(file_io.new_input(&location).exists().await.unwrap());
}

#[tokio::test]
async fn test_fallback_instance_still_serves_other_schemes() {
    // The HDFS scheme is supported by neither backend; selection still
    // returns the alternate instance, which works for schemes it serves.
    let file_io = load_file_io(HashMap::new(), Some("hdfs://namenode:8020/tbl")).unwrap();

    let location = "memory://bucket/after-fallback.bin";
    file_io
        .new_output(location)
        .write(Bytes::from_static(b"still works"))
        .await
        .unwrap();
    assert_eq!(
        file_io.new_input(location).read().await.unwrap(),
        Bytes::from_static(b"still works")
    );
}

#[tokio::test]
async fn test_empty_file_roundtrip() {
    let file_io = io_with_impl(OPENDAL);
    let location = "memory://bucket/empty.bin";

    file_io.new_output(location).write(Bytes::new()).await.unwrap();

    let input = file_io.new_input(location);
    assert!(input.exists().await.unwrap());
    assert_eq!(input.len().await.unwrap(), 0);
    assert!(input.read().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_memory_state_is_shared_within_one_file_io() {
    let file_io = io_with_impl(OPENDAL);

    // Handles created separately resolve to the same memoized client, so
    // in-memory writes are visible across handles of one instance.
    file_io
        .new_output("memory://bucket/shared.bin")
        .write(Bytes::from_static(b"shared"))
        .await
        .unwrap();
    assert!(file_io
        .new_input("memory://bucket/shared.bin")
        .exists()
        .await
        .unwrap());
}
