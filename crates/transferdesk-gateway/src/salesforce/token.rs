//! Salesforce OAuth2 client-credentials exchange.
//!
//! Every call performs a fresh exchange. Caching the returned token is the
//! caller's business (see `services::StatusPersistenceBridge`).

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::describe_timeout;

/// Access token and API base returned by a successful exchange
#[derive(Debug, Clone)]
pub struct SalesforceToken {
    pub access_token: SecretString,
    /// Base URL for REST calls against the org
    pub instance_url: String,
}

/// Why a token could not be obtained
#[derive(Debug, thiserror::Error)]
pub enum TokenExchangeError {
    /// The authorization server answered with a non-2xx status
    #[error("Failed to obtain token: {status_text}")]
    Rejected { status: u16, status_text: String },

    #[error("Failed to obtain token: {0}")]
    Transport(String),

    #[error("Failed to obtain token: timed out after {0}")]
    Timeout(String),

    #[error("Failed to obtain token: invalid response body")]
    InvalidBody,

    #[error("Failed to obtain token: response is missing {0}")]
    MissingField(&'static str),
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    instance_url: Option<String>,
}

/// Token endpoint for an org's authentication URL.
///
/// A trailing slash on the configured URL (as in `https://login.salesforce.com/`)
/// is dropped so the path is not doubled.
pub fn token_url(authentication_url: &str) -> String {
    format!(
        "{}/services/oauth2/token",
        authentication_url.trim().trim_end_matches('/')
    )
}

/// Client-credentials token exchange against a Salesforce authorization server
#[derive(Clone)]
pub struct SalesforceTokenClient {
    http: reqwest::Client,
    timeout: Duration,
}

impl SalesforceTokenClient {
    pub fn new(http: reqwest::Client, timeout: Duration) -> Self {
        Self { http, timeout }
    }

    /// Exchange the consumer key/secret for an access token.
    ///
    /// The secret and the returned token are never logged.
    pub async fn get_token(
        &self,
        authentication_url: &str,
        client_id: &str,
        client_secret: &SecretString,
    ) -> Result<SalesforceToken, TokenExchangeError> {
        let url = token_url(authentication_url);
        debug!("[Salesforce] Requesting token from {}", url);

        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", client_id),
            ("client_secret", client_secret.expose_secret()),
        ];

        let response = self
            .http
            .post(&url)
            .form(&params)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TokenExchangeError::Timeout(describe_timeout(self.timeout))
                } else {
                    TokenExchangeError::Transport(e.without_url().to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("[Salesforce] Token request rejected: HTTP {}", status.as_u16());
            return Err(TokenExchangeError::Rejected {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("Unknown status").to_string(),
            });
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|_| TokenExchangeError::InvalidBody)?;

        let access_token = body
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(TokenExchangeError::MissingField("access_token"))?;
        let instance_url = body
            .instance_url
            .filter(|u| !u.is_empty())
            .ok_or(TokenExchangeError::MissingField("instance_url"))?;

        info!("[Salesforce] Token obtained for instance {}", instance_url);

        Ok(SalesforceToken {
            access_token: SecretString::from(access_token),
            instance_url,
        })
    }
}
