//! Gateway server integration tests
//!
//! Requests go through the full router (CORS, logging, panic capture).

mod routes;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tests::mocks::MockConnectionRepository;
use tower::ServiceExt;
use transferdesk_gateway::{DependenciesBuilder, GatewayConfig, GatewayServer};

pub fn router(repo: Arc<MockConnectionRepository>) -> Router {
    router_with_config(repo, GatewayConfig::default())
}

pub fn router_with_config(repo: Arc<MockConnectionRepository>, config: GatewayConfig) -> Router {
    let dependencies = DependenciesBuilder::new()
        .with_connection_repo(repo)
        .with_tester_config(tests::fast_tester_config())
        .build()
        .unwrap();
    GatewayServer::new(config, dependencies).router()
}

pub async fn send(router: Router, request: Request<Body>) -> Response<Body> {
    router.oneshot(request).await.unwrap()
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
