use super::{body_json, post_json, router, send};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use tests::mocks::MockConnectionRepository;
use tests::{fixtures, tcp};
use transferdesk_core::{ConnectionStatus, INVALID_PARAMETERS_MESSAGE};
use transferdesk_gateway::{DependenciesBuilder, GatewayConfig, GatewayServer};

#[tokio::test]
async fn test_health() {
    let response = send(
        router(Arc::new(MockConnectionRepository::new())),
        Request::get("/health").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_connection_outcome_is_200() {
    let (_listener, port) = tcp::listening().await;
    let response = send(
        router(Arc::new(MockConnectionRepository::new())),
        post_json(
            "/test-connection",
            json!({"connection_type": "SFTP", "sftp_host": "127.0.0.1", "sftp_port": port}),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"status": "Connected", "message": "SFTP connection successful"})
    );
}

#[tokio::test]
async fn test_failed_probe_is_still_200() {
    let port = tcp::closed_port().await;
    let response = send(
        router(Arc::new(MockConnectionRepository::new())),
        post_json(
            "/test-connection",
            json!({"connection_type": "SFTP", "sftp_host": "127.0.0.1", "sftp_port": port}),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "Error");
}

#[tokio::test]
async fn test_invalid_parameters_is_200() {
    let response = send(
        router(Arc::new(MockConnectionRepository::new())),
        post_json("/test-connection", json!({"connection_type": "FTP"})),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"status": "Error", "message": INVALID_PARAMETERS_MESSAGE})
    );
}

#[tokio::test]
async fn test_malformed_body_is_500_without_echo() {
    let response = send(
        router(Arc::new(MockConnectionRepository::new())),
        Request::post("/test-connection")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"sftp_password": "hunter2", "#))
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(body["error"].is_string());
    assert!(body["details"].is_string());
    assert!(!body.to_string().contains("hunter2"));
}

#[tokio::test]
async fn test_unroutable_id_still_tests_connection() {
    let (_listener, port) = tcp::listening().await;
    let repo = Arc::new(MockConnectionRepository::new());
    let router = router(repo.clone());

    for id in [json!(42), json!("conn-7")] {
        let response = send(
            router.clone(),
            post_json(
                "/test-connection",
                json!({
                    "id": id,
                    "connection_type": "SFTP",
                    "sftp_host": "127.0.0.1",
                    "sftp_port": port,
                }),
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK, "id {}", id);
        assert_eq!(
            body_json(response).await,
            json!({"status": "Connected", "message": "SFTP connection successful"})
        );
    }
    assert_eq!(repo.update_count(), 0);
}

#[tokio::test]
async fn test_json_body_without_content_type() {
    let (_listener, port) = tcp::listening().await;
    let body = json!({"connection_type": "SFTP", "sftp_host": "127.0.0.1", "sftp_port": port});

    for content_type in [None, Some("text/plain;charset=UTF-8")] {
        let mut request = Request::post("/test-connection");
        if let Some(content_type) = content_type {
            request = request.header("content-type", content_type);
        }
        let response = send(
            router(Arc::new(MockConnectionRepository::new())),
            request.body(Body::from(body.to_string())).unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "Connected");
    }
}

#[tokio::test]
async fn test_body_with_id_persists() {
    let (_listener, port) = tcp::listening().await;
    let record = fixtures::sftp_record("127.0.0.1", port);
    let repo = Arc::new(MockConnectionRepository::new().with_record(record.clone()));

    let response = send(
        router(repo.clone()),
        post_json(
            "/test-connection",
            json!({
                "id": record.id.to_string(),
                "connection_type": "SFTP",
                "sftp_host": "127.0.0.1",
                "sftp_port": port,
            }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        repo.record(&record.id).unwrap().status,
        Some(ConnectionStatus::Connected)
    );
}

#[tokio::test]
async fn test_stored_connection() {
    let (_listener, port) = tcp::listening().await;
    let record = fixtures::sftp_record("127.0.0.1", port);
    let repo = Arc::new(MockConnectionRepository::new().with_record(record.clone()));

    let response = send(
        router(repo.clone()),
        Request::post(format!("/connections/{}/test", record.id))
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "Connected");
    assert_eq!(repo.update_count(), 1);
}

#[tokio::test]
async fn test_stored_connection_not_found() {
    let router = router(Arc::new(MockConnectionRepository::new()));

    for id in [uuid::Uuid::new_v4().to_string(), "not-a-uuid".to_string()] {
        let response = send(
            router.clone(),
            Request::post(format!("/connections/{}/test", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Connection not found"})
        );
    }
}

#[tokio::test]
async fn test_stored_connection_read_failure_is_500() {
    let repo = Arc::new(MockConnectionRepository::new().failing_reads());

    let response = send(
        router(repo),
        Request::post(format!("/connections/{}/test", uuid::Uuid::new_v4()))
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await["error"],
        "Failed to load connection"
    );
}

#[tokio::test]
async fn test_serve_on_bound_listener() {
    let repo = Arc::new(MockConnectionRepository::new());
    let dependencies = DependenciesBuilder::new()
        .with_connection_repo(repo)
        .build()
        .unwrap();
    let (listener, port) = tcp::listening().await;
    let server = GatewayServer::new(GatewayConfig::default(), dependencies);
    let handle = tokio::spawn(server.serve(listener));

    let response = reqwest::get(format!("http://127.0.0.1:{}/health", port))
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "*"
    );
    handle.abort();
}
