//! Salesforce probe: token exchange followed by an authenticated sobjects listing.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::{debug, warn};
use transferdesk_core::{ConnectionKind, ConnectionTarget};

use super::{EndpointProbe, ProbeArtifacts, ProbeError};
use crate::describe_timeout;
use crate::salesforce::{sobjects_url, SalesforceTokenClient, GENERIC_API_ERROR};

/// Error element of a Salesforce REST error array
#[derive(Debug, Deserialize)]
struct ApiError {
    message: Option<String>,
    #[serde(rename = "errorCode")]
    error_code: Option<String>,
}

pub struct SalesforceProbe {
    http: reqwest::Client,
    tokens: SalesforceTokenClient,
    api_version: String,
    timeout: Duration,
}

impl SalesforceProbe {
    pub fn new(
        http: reqwest::Client,
        tokens: SalesforceTokenClient,
        api_version: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            tokens,
            api_version: api_version.into(),
            timeout,
        }
    }
}

#[async_trait]
impl EndpointProbe for SalesforceProbe {
    fn kind(&self) -> ConnectionKind {
        ConnectionKind::Salesforce
    }

    async fn probe(
        &self,
        target: &ConnectionTarget,
        artifacts: &mut ProbeArtifacts,
    ) -> Result<(), ProbeError> {
        let ConnectionTarget::Salesforce(target) = target else {
            return Err(ProbeError::KindMismatch {
                probe: self.kind(),
                target: target.kind(),
            });
        };

        let token = self
            .tokens
            .get_token(
                &target.authentication_url,
                &target.consumer_key,
                &target.consumer_secret,
            )
            .await?;

        // Cached by the caller even if the API call below fails
        artifacts.access_token = Some(token.access_token.clone());

        let url = sobjects_url(&token.instance_url, &self.api_version);
        debug!("[Probe] GET {}", url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(token.access_token.expose_secret())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProbeError::Timeout(describe_timeout(self.timeout))
                } else {
                    ProbeError::Transport(e.without_url().to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let first_error = response
            .json::<Vec<ApiError>>()
            .await
            .ok()
            .and_then(|errors| errors.into_iter().next());

        warn!(
            "[Probe] Salesforce API rejected probe: HTTP {} ({})",
            status.as_u16(),
            first_error
                .as_ref()
                .and_then(|e| e.error_code.as_deref())
                .unwrap_or("no error code")
        );

        let message = first_error
            .and_then(|e| e.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| GENERIC_API_ERROR.to_string());

        Err(ProbeError::Api {
            status: status.as_u16(),
            message,
        })
    }
}
