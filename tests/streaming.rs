//! Byte fidelity and end-of-stream behavior of the streaming operations.

use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use phobos::client::EventsOptions;
use phobos::container::{
    AttachOptions, CreateContainerOptions, LogsOptions, StatsOptions, StopOptions,
};
use phobos::transport::mock::MockDaemon;
use phobos::Client;

fn setup() -> (Arc<MockDaemon>, Client) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
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

#[tokio::test]
async fn logs_deliver_the_daemon_bytes_in_order() {
    let (daemon, client) = setup();
    let container = client.containers().create(&alpine()).await.unwrap();
    container.start().await.unwrap();

    let chunks = vec![
        Bytes::from_static(b"alpha"),
        Bytes::from_static(b"beta"),
        Bytes::from_static(b"gamma"),
    ];
    daemon.set_logs(container.id(), chunks.clone());

    let mut stream = container
        .logs(&LogsOptions {
            stdout: true,
            stderr: true,
            ..Default::default()
        })
        .await
        .unwrap();

    let mut received = Vec::new();
    while let Some(chunk) = stream.next().await {
        received.push(chunk);
    }
    assert_eq!(received, chunks);

    // End-of-stream is signaled exactly once and stays terminal.
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn attach_replays_the_same_output_stream() {
    let (daemon, client) = setup();
    let container = client.containers().create(&alpine()).await.unwrap();
    container.start().await.unwrap();
    daemon.set_logs(container.id(), vec![Bytes::from_static(b"interactive")]);

    let stream = container
        .attach(
            &AttachOptions {
                stream: true,
                stdout: true,
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
    let received: Vec<Bytes> = stream.collect().await;
    assert_eq!(received, vec![Bytes::from_static(b"interactive")]);
}

#[tokio::test]
async fn stats_decode_as_json_lines() {
    let (_daemon, client) = setup();
    let container = client.containers().create(&alpine()).await.unwrap();
    container.start().await.unwrap();

    let samples: Vec<_> = container
        .stats(&StatsOptions::default())
        .await
        .unwrap()
        .collect()
        .await;
    assert_eq!(samples.len(), 1);
    let sample = samples[0].as_ref().unwrap();
    assert_eq!(sample.memory_stats.usage, 2048);
}

#[tokio::test]
async fn export_streams_and_buffers_the_same_archive() {
    let (_daemon, client) = setup();
    let container = client.containers().create(&alpine()).await.unwrap();

    let mut streamed = Vec::new();
    let mut stream = container.export().await.unwrap();
    while let Some(chunk) = stream.next().await {
        streamed.extend_from_slice(&chunk.unwrap());
    }

    let buffered = container.export_buffered().await.unwrap();
    assert_eq!(streamed, buffered.as_bytes());
    assert!(buffered.starts_with("tar-export:"));
}

#[tokio::test]
async fn events_replay_lifecycle_actions_in_order() {
    let (_daemon, client) = setup();
    let container = client.containers().create(&alpine()).await.unwrap();
    container.start().await.unwrap();
    container.stop(&StopOptions::default()).await.unwrap();

    let events: Vec<_> = client
        .events(&EventsOptions::default())
        .await
        .unwrap()
        .collect()
        .await;

    let actions: Vec<String> = events
        .into_iter()
        .map(Result::unwrap)
        .filter(|e| e.actor.id == container.id())
        .map(|e| e.action)
        .collect();
    assert_eq!(actions, vec!["create", "start", "stop"]);
}

#[tokio::test]
async fn logs_on_a_missing_container_report_no_such_container() {
    let (_daemon, client) = setup();
    let missing = client.containers().get("doesnotexist");
    let err = missing.logs(&LogsOptions::default()).await.err().unwrap();
    assert!(err.is_not_found());
}
