//! Filesystem archive transfer through a container handle.

use std::sync::Arc;

use base64::Engine;
use bytes::Bytes;
use futures::StreamExt;
use phobos::container::{CreateContainerOptions, PutArchiveOptions};
use phobos::transport::mock::MockDaemon;
use phobos::{Client, Error};

fn setup() -> (Arc<MockDaemon>, Client) {
    let daemon = Arc::new(MockDaemon::new().with_image("alpine"));
    let client = Client::new(daemon.clone());
    (daemon, client)
}

fn alpine() -> CreateContainerOptions {
    CreateContainerOptions {
        image: Some("alpine".into()),
        ..Default::default()
    }
}

fn archive_stream(chunks: &[&'static [u8]]) -> phobos::transport::ByteStream {
    futures::stream::iter(
        chunks
            .iter()
            .map(|c| Ok(Bytes::from_static(c)))
            .collect::<Vec<_>>(),
    )
    .boxed()
}

#[tokio::test]
async fn put_forwards_the_input_stream_verbatim() {
    let (daemon, client) = setup();
    let container = client.containers().create(&alpine()).await.unwrap();
    let fs = container.fs();

    fs.put(
        &PutArchiveOptions {
            path: "/srv".into(),
            ..Default::default()
        },
        archive_stream(&[b"tar-part-one,", b"tar-part-two"]),
    )
    .await
    .unwrap();

    assert_eq!(
        daemon.archive(container.id(), "/srv").unwrap(),
        Bytes::from_static(b"tar-part-one,tar-part-two")
    );
}

#[tokio::test]
async fn get_streams_back_what_put_uploaded() {
    let (_daemon, client) = setup();
    let container = client.containers().create(&alpine()).await.unwrap();
    let fs = container.fs();

    fs.put(
        &PutArchiveOptions {
            path: "/etc/app".into(),
            ..Default::default()
        },
        archive_stream(&[b"config-tarball"]),
    )
    .await
    .unwrap();

    let mut out = Vec::new();
    let mut stream = fs.get("/etc/app").await.unwrap();
    while let Some(chunk) = stream.next().await {
        out.extend_from_slice(&chunk.unwrap());
    }
    assert_eq!(out, b"config-tarball");
}

#[tokio::test]
async fn info_resolves_with_base64_stat_metadata() {
    let (_daemon, client) = setup();
    let container = client.containers().create(&alpine()).await.unwrap();
    let fs = container.fs();

    fs.put(
        &PutArchiveOptions {
            path: "/data".into(),
            ..Default::default()
        },
        archive_stream(&[b"0123456789"]),
    )
    .await
    .unwrap();

    let header = fs.info("/data").await.unwrap();
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(header)
        .unwrap();
    let stat: serde_json::Value = serde_json::from_slice(&decoded).unwrap();
    assert_eq!(stat["name"], "/data");
    assert_eq!(stat["size"], 10);
}

#[tokio::test]
async fn missing_paths_report_no_such_container_or_path() {
    let (_daemon, client) = setup();
    let container = client.containers().create(&alpine()).await.unwrap();
    let fs = container.fs();

    let err = fs.get("/nowhere").await.err().unwrap();
    match err {
        Error::Status { code: 404, reason } => {
            assert_eq!(reason, "no such container or path")
        }
        other => panic!("expected a mapped 404, got {other:?}"),
    }

    let err = fs.info("/nowhere").await.unwrap_err();
    assert!(err.is_not_found());
}
