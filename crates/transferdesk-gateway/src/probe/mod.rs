//! Endpoint probes
//!
//! One probe per connection kind, looked up through a [`ProbeRegistry`].
//! Adding a kind means adding its target variant and one `register` call in
//! [`ProbeRegistry::standard`].

mod salesforce;
mod tcp;

pub use salesforce::SalesforceProbe;
pub use tcp::TcpProbe;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;
use transferdesk_core::{ConnectionKind, ConnectionTarget};

use crate::salesforce::{SalesforceTokenClient, TokenExchangeError};
use crate::services::TesterConfig;

/// Failure of a single probe run. The display text is forwarded to callers,
/// so it never contains credential values.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// TCP connect failed (refused, DNS, timeout)
    #[error("Failed to connect to {host}:{port}: {reason}")]
    Unreachable {
        host: String,
        port: u16,
        reason: String,
    },

    #[error(transparent)]
    TokenExchange(#[from] TokenExchangeError),

    /// Salesforce REST call answered with a non-2xx status
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Salesforce API request failed: {0}")]
    Transport(String),

    #[error("Salesforce API request timed out after {0}")]
    Timeout(String),

    #[error("No probe registered for {0} connections")]
    Unsupported(ConnectionKind),

    #[error("{probe} probe cannot test a {target} target")]
    KindMismatch {
        probe: ConnectionKind,
        target: ConnectionKind,
    },
}

/// Side results a probe hands back whether or not it succeeds
#[derive(Debug, Default)]
pub struct ProbeArtifacts {
    /// Token obtained by a successful exchange, even if a later step failed
    pub access_token: Option<SecretString>,
}

/// Kind-specific reachability / authentication check
#[async_trait]
pub trait EndpointProbe: Send + Sync {
    /// Connection kind this probe handles
    fn kind(&self) -> ConnectionKind;

    /// Check the target. `Ok(())` means the endpoint is usable.
    async fn probe(
        &self,
        target: &ConnectionTarget,
        artifacts: &mut ProbeArtifacts,
    ) -> Result<(), ProbeError>;
}

/// Maps each connection kind to its probe
#[derive(Clone, Default)]
pub struct ProbeRegistry {
    probes: HashMap<ConnectionKind, Arc<dyn EndpointProbe>>,
}

impl ProbeRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// TCP probe for SFTP and the token + sobjects probe for Salesforce
    pub fn standard(http: reqwest::Client, config: &TesterConfig) -> Self {
        let tokens = SalesforceTokenClient::new(http.clone(), config.probe_timeout);

        Self::new()
            .with(Arc::new(TcpProbe::new(config.probe_timeout)))
            .with(Arc::new(SalesforceProbe::new(
                http,
                tokens,
                config.salesforce_api_version.clone(),
                config.probe_timeout,
            )))
    }

    /// Register a probe for its kind, replacing any previous one
    pub fn register(&mut self, probe: Arc<dyn EndpointProbe>) {
        self.probes.insert(probe.kind(), probe);
    }

    pub fn with(mut self, probe: Arc<dyn EndpointProbe>) -> Self {
        self.register(probe);
        self
    }

    pub fn get(&self, kind: ConnectionKind) -> Option<Arc<dyn EndpointProbe>> {
        self.probes.get(&kind).cloned()
    }

    pub fn contains(&self, kind: ConnectionKind) -> bool {
        self.probes.contains_key(&kind)
    }
}
