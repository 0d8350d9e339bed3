//! Swarm service handles against the in-memory daemon.

use std::sync::Arc;

use futures::StreamExt;
use phobos::service::{ServiceListOptions, ServiceLogsOptions, ServiceSpec};
use phobos::transport::mock::MockDaemon;
use phobos::{Client, Error};

fn setup() -> Client {
    Client::new(Arc::new(MockDaemon::new()))
}

fn spec(name: &str) -> ServiceSpec {
    ServiceSpec {
        name: Some(name.to_string()),
        task_template: Some(serde_json::json!({
            "ContainerSpec": { "Image": "alpine" }
        })),
        ..Default::default()
    }
}

#[tokio::test]
async fn create_then_inspect_reference_the_same_service() {
    let client = setup();
    let services = client.services();

    let created = services.create(&spec("web")).await.unwrap();
    let mut by_id = services.get(created.id());
    let details = by_id.inspect().await.unwrap();

    assert_eq!(details.id, created.id());
    assert_eq!(details.spec.name.as_deref(), Some("web"));
    assert_eq!(details.version.index, 1);
}

#[tokio::test]
async fn list_reports_services_in_creation_order() {
    let client = setup();
    let services = client.services();

    let first = services.create(&spec("a")).await.unwrap();
    let second = services.create(&spec("b")).await.unwrap();

    let listed = services.list(&ServiceListOptions::default()).await.unwrap();
    let ids: Vec<&str> = listed.iter().map(|s| s.id()).collect();
    assert_eq!(ids, vec![first.id(), second.id()]);
}

#[tokio::test]
async fn duplicate_names_conflict() {
    let client = setup();
    let services = client.services();

    services.create(&spec("web")).await.unwrap();
    let err = services.create(&spec("web")).await.unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
async fn update_requires_the_current_version_index() {
    let client = setup();
    let services = client.services();

    let mut service = services.create(&spec("web")).await.unwrap();
    let version = service.inspect().await.unwrap().version.index;

    service.update(version, &spec("web")).await.unwrap();
    assert_eq!(service.inspect().await.unwrap().version.index, version + 1);

    let err = service.update(version, &spec("web")).await.unwrap_err();
    match err {
        Error::Status { code: 400, reason } => assert_eq!(reason, "bad parameter"),
        other => panic!("expected a mapped 400, got {other:?}"),
    }
}

#[tokio::test]
async fn removed_services_stay_addressable_but_stale() {
    let client = setup();
    let services = client.services();

    let service = services.create(&spec("web")).await.unwrap();
    service.remove().await.unwrap();

    let mut stale = services.get(service.id());
    let err = stale.inspect().await.unwrap_err();
    match err {
        Error::Status { code: 404, reason } => assert_eq!(reason, "no such service"),
        other => panic!("expected a mapped 404, got {other:?}"),
    }
}

#[tokio::test]
async fn service_logs_end_exactly_once() {
    let client = setup();
    let service = client.services().create(&spec("web")).await.unwrap();

    let mut stream = service
        .logs(&ServiceLogsOptions {
            stdout: true,
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(stream.next().await.is_none());
    assert!(stream.next().await.is_none());
}
