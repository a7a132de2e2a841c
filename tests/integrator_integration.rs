use std::sync::Arc;
use std::time::Duration;

use httpmock::Method::{GET, POST};
use httpmock::MockServer;
use nebuia_copilot::client::ClientError;
use nebuia_copilot::config::Config;
use nebuia_copilot::integrator::Integrator;
use nebuia_copilot::listener::{ListenerError, ListenerState, Subscription};
use nebuia_copilot::models::{FileRef, StatusDocument};
use serde_json::{Value, json};
use tokio::sync::mpsc;

fn integrator(server: &MockServer) -> Integrator {
    let mut config = Config::new(
        format!("{}/api/v1", server.base_url()),
        "test-key",
        "test-secret",
    );
    config.upload_retry_delay = Duration::from_millis(10);
    config.upload_concurrency = 2;
    Integrator::from_config(&config).expect("integrator")
}

fn document_json(id: &str) -> Value {
    json!({
        "id": id,
        "batch_id": "batch-1",
        "user": "user-1",
        "uuid": format!("uuid-{id}"),
        "url": format!("https://files.example/{id}.pdf"),
        "file_name": format!("{id}.pdf"),
        "type_document": "type-1",
        "status_document": "waiting_qa",
        "uploaded": "2024-07-27T17:00:00Z",
        "reviewed_at": null,
        "source_type": "url"
    })
}

#[tokio::test]
async fn append_to_batch_partitions_accepted_and_refused_files() {
    let server = MockServer::start_async().await;
    let accepted = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v1/integrator/append/to/batch/batch-1")
                .header("key", "test-key")
                .body_contains("https://domain.com/x.pdf");
            then.status(200)
                .json_body(json!({ "status": true, "payload": ["uuid-x"] }));
        })
        .await;
    let refused = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v1/integrator/append/to/batch/batch-1")
                .body_contains("https://domain.com/bad.pdf");
            then.status(200)
                .json_body(json!({ "status": false, "payload": "unsupported file" }));
        })
        .await;

    let integrator = integrator(&server);
    let files = [
        FileRef::url("https://domain.com/x.pdf", "type-1"),
        FileRef::url("https://domain.com/bad.pdf", "type-1"),
    ];
    let result = integrator
        .append_to_batch("batch-1", &files)
        .await
        .expect("batch");

    assert_eq!(result.successful.len(), 1);
    assert_eq!(result.successful[0].uuid(), Some("uuid-x"));
    assert_eq!(result.failed.len(), 1);
    assert_eq!(result.failed[0].file_name(), "bad.pdf");
    assert_eq!(result.failed[0].error_message(), Some("unsupported file"));
    assert_eq!(accepted.hits_async().await, 1);
    assert_eq!(refused.hits_async().await, 3);

    let metrics = integrator.upload_metrics();
    assert_eq!(metrics.attempts, 4);
    assert_eq!(metrics.failed, 1);
}

#[tokio::test]
async fn listener_delivers_repeated_documents_once() {
    let server = MockServer::start_async().await;
    let listing = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v1/integrator/documents/by/status/waiting_qa")
                .query_param("page", "1")
                .query_param("limit", "20");
            then.status(200).json_body(json!({
                "status": true,
                "payload": { "documents": [document_json("a"), document_json("b")], "total": 2 }
            }));
        })
        .await;

    let integrator = integrator(&server);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut listener = integrator.listener();
    listener.set_on_document_handler(move |_, doc| {
        let _ = tx.send(doc.uuid.clone());
    });
    listener
        .add_listener(
            Subscription::new(StatusDocument::WaitingQa).with_interval(Duration::from_millis(20)),
        )
        .expect("subscription");

    let handle = listener.handle();
    let listener = Arc::new(listener);
    let runner = listener.clone();
    let task = tokio::spawn(async move { runner.run_until(std::future::pending()).await });

    tokio::time::sleep(Duration::from_millis(150)).await;
    handle.stop();
    task.await.expect("join").expect("listener");

    let mut delivered = Vec::new();
    while let Ok(uuid) = rx.try_recv() {
        delivered.push(uuid);
    }
    assert_eq!(delivered, ["uuid-a", "uuid-b"]);
    assert!(listing.hits_async().await >= 2);
    assert_eq!(listener.state(), ListenerState::Stopped);
    assert_eq!(listener.metrics_snapshot().documents_delivered, 2);
}

#[tokio::test]
async fn listener_returns_error_on_rejected_credentials() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v1/integrator/documents/by/status/complete");
            then.status(403).body("forbidden");
        })
        .await;

    let integrator = integrator(&server);
    let listener = integrator.listener();
    listener
        .add_listener(
            Subscription::new(StatusDocument::Complete).with_interval(Duration::from_millis(20)),
        )
        .expect("subscription");

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        listener.run_until(std::future::pending()),
    )
    .await
    .expect("listener exits on its own");

    assert!(matches!(
        result,
        Err(ListenerError::Transport(ClientError::Unauthorized { .. }))
    ));
}
