//! The two-phase exec protocol.

use std::sync::Arc;

use futures::StreamExt;
use phobos::container::CreateContainerOptions;
use phobos::exec::{ExecCreateOptions, ExecStartOptions};
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

fn echo(args: &[&str]) -> ExecCreateOptions {
    let mut cmd = vec!["echo".to_string()];
    cmd.extend(args.iter().map(|a| a.to_string()));
    ExecCreateOptions {
        cmd,
        attach_stdout: Some(true),
        ..Default::default()
    }
}

#[tokio::test]
async fn echo_output_round_trips() {
    let (_daemon, client) = setup();
    let container = client.containers().create(&alpine()).await.unwrap();
    container.start().await.unwrap();

    let exec = container.exec(&echo(&["hi"])).await.unwrap();
    assert_eq!(exec.container_id(), Some(container.id()));

    let stream = exec
        .start(&ExecStartOptions::default())
        .await
        .unwrap()
        .expect("non-detached start resolves with a stream");

    let mut output = Vec::new();
    let mut stream = stream;
    while let Some(chunk) = stream.next().await {
        output.extend_from_slice(&chunk.unwrap());
    }
    assert_eq!(output, b"hi\n");
}

#[tokio::test]
async fn detached_start_resolves_without_a_stream() {
    let (_daemon, client) = setup();
    let container = client.containers().create(&alpine()).await.unwrap();
    container.start().await.unwrap();

    let exec = container.exec(&echo(&["ignored"])).await.unwrap();
    let out = exec
        .start(&ExecStartOptions {
            detach: true,
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(out.is_none());
}

#[tokio::test]
async fn inspect_reports_the_owning_container() {
    let (_daemon, client) = setup();
    let container = client.containers().create(&alpine()).await.unwrap();
    container.start().await.unwrap();

    let exec = container.exec(&echo(&["hi"])).await.unwrap();
    let mut handle = client.execs().get(exec.id());
    assert_eq!(handle.container_id(), None);

    let details = handle.inspect().await.unwrap();
    assert_eq!(details.id, exec.id());
    assert_eq!(details.container_id, container.id());
    assert!(!details.running);
}

#[tokio::test]
async fn resize_resolves_for_a_known_exec() {
    let (_daemon, client) = setup();
    let container = client.containers().create(&alpine()).await.unwrap();
    container.start().await.unwrap();

    let exec = container.exec(&echo(&["hi"])).await.unwrap();
    exec.resize(120, 40).await.unwrap();
}

#[tokio::test]
async fn exec_create_on_a_paused_container_conflicts() {
    let (_daemon, client) = setup();
    let container = client.containers().create(&alpine()).await.unwrap();
    container.start().await.unwrap();
    container.pause().await.unwrap();

    let err = container.exec(&echo(&["hi"])).await.unwrap_err();
    match err {
        Error::Status { code: 409, reason } => assert_eq!(reason, "container is paused"),
        other => panic!("expected a mapped 409, got {other:?}"),
    }
}

#[tokio::test]
async fn starting_an_unknown_exec_reports_no_such_instance() {
    let (_daemon, client) = setup();
    let handle = client.execs().get("doesnotexist");
    let err = handle
        .start(&ExecStartOptions::default())
        .await
        .err()
        .unwrap();
    match err {
        Error::Status { code: 404, reason } => assert_eq!(reason, "no such exec instance"),
        other => panic!("expected a mapped 404, got {other:?}"),
    }
}
