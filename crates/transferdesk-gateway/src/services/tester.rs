//! Connection Tester
//!
//! Validates a [`TestRequest`], runs the probe registered for its kind and
//! turns every expected failure into a [`TestOutcome`]. When the request
//! carries an id the outcome is handed to the [`StatusPersistenceBridge`].

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use transferdesk_core::{ConnectionKind, ConnectionRepository, TestOutcome, TestRequest};

use super::StatusPersistenceBridge;
use crate::probe::{ProbeArtifacts, ProbeError, ProbeRegistry};
use crate::salesforce::DEFAULT_API_VERSION;

/// Timeouts and API settings for connection tests
#[derive(Debug, Clone)]
pub struct TesterConfig {
    /// Bound for the TCP connect, the token exchange and the API call (each)
    pub probe_timeout: Duration,
    /// Bound for the best-effort status write
    pub persist_timeout: Duration,
    /// REST API version of the sobjects probe, without the leading `v`
    pub salesforce_api_version: String,
}

impl Default for TesterConfig {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(15),
            persist_timeout: Duration::from_secs(5),
            salesforce_api_version: DEFAULT_API_VERSION.to_string(),
        }
    }
}

pub struct ConnectionTester {
    probes: ProbeRegistry,
    persistence: Option<StatusPersistenceBridge>,
}

impl ConnectionTester {
    pub fn new(probes: ProbeRegistry, persistence: Option<StatusPersistenceBridge>) -> Self {
        Self {
            probes,
            persistence,
        }
    }

    /// Standard probes with results persisted to `connections`
    pub fn standard(
        http: reqwest::Client,
        connections: Arc<dyn ConnectionRepository>,
        config: &TesterConfig,
    ) -> Self {
        Self::new(
            ProbeRegistry::standard(http, config),
            Some(StatusPersistenceBridge::new(
                connections,
                config.persist_timeout,
            )),
        )
    }

    /// Test one connection. Never fails: every problem ends up in the outcome.
    pub async fn test(&self, request: TestRequest) -> TestOutcome {
        let mut artifacts = ProbeArtifacts::default();
        let outcome = self.run(&request, &mut artifacts).await;

        match (request.id, &self.persistence) {
            (Some(id), Some(bridge)) => {
                bridge.persist(&id, &outcome, artifacts.access_token).await;
            }
            (None, _) => debug!("[Tester] No id provided, skipping persistence"),
            (Some(_), None) => {}
        }

        outcome
    }

    async fn run(&self, request: &TestRequest, artifacts: &mut ProbeArtifacts) -> TestOutcome {
        let target = match request.target() {
            Ok(target) => target,
            Err(e) => {
                info!("[Tester] Rejected test request: {}", e.detail());
                return TestOutcome::invalid_parameters();
            }
        };

        let kind = target.kind();
        let Some(probe) = self.probes.get(kind) else {
            warn!("[Tester] No probe registered for {}", kind);
            return failed(kind, &ProbeError::Unsupported(kind));
        };

        info!("[Tester] Testing {} connection to {}", kind, target.describe());

        match probe.probe(&target, artifacts).await {
            Ok(()) => {
                info!("[Tester] {} connection to {} succeeded", kind, target.describe());
                TestOutcome::connected(format!("{} connection successful", kind))
            }
            Err(e) => {
                info!(
                    "[Tester] {} connection to {} failed: {}",
                    kind,
                    target.describe(),
                    e
                );
                failed(kind, &e)
            }
        }
    }
}

fn failed(kind: ConnectionKind, error: &ProbeError) -> TestOutcome {
    TestOutcome::error(format!("{} connection failed: {}", kind, error))
}
