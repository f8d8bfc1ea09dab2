//! Integration tests for middleware functionality.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use restsync::middleware::LoggingLayer;
use restsync::tower::util::MapRequestLayer;
use restsync::{HyperTransport, Method, RequestDescriptor};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
};

fn descriptor(method: Method, url: String) -> RequestDescriptor {
    RequestDescriptor::new(method, url)
}

/// Test that logging middleware doesn't break request/response flow.
#[tokio::test]
async fn test_logging_middleware() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/logged"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let transport = HyperTransport::builder().with_logging().build();
    let response = transport
        .execute(descriptor(Method::Get, format!("{}/logged", mock_server.uri())))
        .await
        .expect("response");

    assert!(response.is_success());
    assert_eq!(response.text(), Some("ok"));
}

/// Test that debug logging passes errors through untouched.
#[tokio::test]
async fn test_debug_logging_keeps_http_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&mock_server)
        .await;

    let transport = HyperTransport::builder().with_debug_logging().build();
    let response = transport
        .execute(descriptor(Method::Delete, format!("{}/gone", mock_server.uri())))
        .await
        .expect("response");

    assert_eq!(response.status(), 410);
    assert!(response.is_error());
}

#[tokio::test]
async fn test_transport_with_defaults() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/defaults"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let transport = HyperTransport::builder().with_defaults().build();
    let response = transport
        .execute(descriptor(Method::Get, format!("{}/defaults", mock_server.uri())))
        .await
        .expect("response");

    assert!(response.is_success());
}

/// Test generic layer API with a request-mapping layer.
#[tokio::test]
async fn test_generic_layer_api() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/custom-layer"))
        .and(header("x-tenant", "acme"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = HyperTransport::builder()
        .layer(MapRequestLayer::new(|mut request: RequestDescriptor| {
            request.set_header("X-Tenant", "acme");
            request
        }))
        .with_logging()
        .build();

    let response = transport
        .execute(descriptor(Method::Post, format!("{}/custom-layer", mock_server.uri())))
        .await
        .expect("response");

    assert_eq!(response.status(), 201);
}

/// Layers apply to requests sent through the `Transport` trait too.
#[tokio::test]
async fn test_layers_apply_to_sync_calls() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/todos"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .mount(&mock_server)
        .await;

    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);
    let transport = HyperTransport::builder()
        .layer(MapRequestLayer::new(move |request: RequestDescriptor| {
            counter.fetch_add(1, Ordering::SeqCst);
            request
        }))
        .layer(LoggingLayer::new())
        .build();

    let (done, finished) = tokio::sync::oneshot::channel();
    let options = restsync::SyncOptions::new()
        .url(format!("{}/todos", mock_server.uri()))
        .on_always(move |outcome| {
            let _ = done.send(outcome.is_success());
        });

    restsync::Syncer::new(transport)
        .sync(restsync::CrudMethod::Read, None, options)
        .expect("sync");

    assert!(finished.await.expect("always callback ran"));
    assert_eq!(seen.load(Ordering::SeqCst), 1);
}
