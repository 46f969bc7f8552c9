use pretty_assertions::assert_eq;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tests::salesforce::{self as org, ACCESS_TOKEN};
use transferdesk_core::{ConnectionTarget, SalesforceTarget};
use transferdesk_gateway::{
    EndpointProbe, ProbeArtifacts, ProbeError, SalesforceProbe, SalesforceTokenClient,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn probe(api_version: &str) -> SalesforceProbe {
    let http = reqwest::Client::new();
    let timeout = Duration::from_secs(5);
    SalesforceProbe::new(
        http.clone(),
        SalesforceTokenClient::new(http, timeout),
        api_version,
        timeout,
    )
}

fn target(server: &MockServer) -> ConnectionTarget {
    ConnectionTarget::Salesforce(SalesforceTarget {
        authentication_url: server.uri(),
        consumer_key: "key".to_string(),
        consumer_secret: SecretString::from("secret"),
    })
}

#[tokio::test]
async fn test_configured_api_version() {
    let server = MockServer::start().await;
    org::mount_token_success(&server).await;
    Mock::given(method("GET"))
        .and(path("/services/data/v60.0/sobjects"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut artifacts = ProbeArtifacts::default();
    probe("60.0")
        .probe(&target(&server), &mut artifacts)
        .await
        .unwrap();

    assert_eq!(
        artifacts.access_token.unwrap().expose_secret(),
        ACCESS_TOKEN
    );
}

#[tokio::test]
async fn test_api_error_carries_status() {
    let server = MockServer::start().await;
    org::mount_token_success(&server).await;
    org::mount_sobjects_failure(
        &server,
        403,
        serde_json::json!([{"message": "API is not enabled for this Organization or Partner", "errorCode": "API_DISABLED_FOR_ORG"}]),
    )
    .await;

    let mut artifacts = ProbeArtifacts::default();
    let err = probe("54.0")
        .probe(&target(&server), &mut artifacts)
        .await
        .unwrap_err();

    match err {
        ProbeError::Api { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(
                message,
                "API is not enabled for this Organization or Partner"
            );
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(artifacts.access_token.is_some());
}
