//! Dependency Injection Container
//!
//! Everything the gateway needs from outside is injected here, so the
//! binary, integration tests and embedders wire it the same way.

use std::sync::Arc;

use transferdesk_core::ConnectionRepository;

use crate::probe::ProbeRegistry;
use crate::services::{ConnectionTester, StatusPersistenceBridge, TesterConfig};

/// Dependency container for Gateway
#[derive(Clone)]
pub struct GatewayDependencies {
    pub connection_repo: Arc<dyn ConnectionRepository>,
    pub tester: Arc<ConnectionTester>,
}

/// Builder for GatewayDependencies
#[derive(Default)]
pub struct DependenciesBuilder {
    connection_repo: Option<Arc<dyn ConnectionRepository>>,
    tester_config: Option<TesterConfig>,
    http_client: Option<reqwest::Client>,
    probes: Option<ProbeRegistry>,
}

impl DependenciesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_connection_repo(mut self, repo: Arc<dyn ConnectionRepository>) -> Self {
        self.connection_repo = Some(repo);
        self
    }

    pub fn with_tester_config(mut self, config: TesterConfig) -> Self {
        self.tester_config = Some(config);
        self
    }

    /// HTTP client shared by the Salesforce token exchange and API probe
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Replace the standard probes (tests, additional connection kinds)
    pub fn with_probes(mut self, probes: ProbeRegistry) -> Self {
        self.probes = Some(probes);
        self
    }

    pub fn build(self) -> Result<GatewayDependencies, String> {
        let connection_repo = self
            .connection_repo
            .ok_or("connection_repo is required")?;
        let config = self.tester_config.unwrap_or_default();

        let tester = match self.probes {
            Some(probes) => ConnectionTester::new(
                probes,
                Some(StatusPersistenceBridge::new(
                    connection_repo.clone(),
                    config.persist_timeout,
                )),
            ),
            None => ConnectionTester::standard(
                self.http_client.unwrap_or_default(),
                connection_repo.clone(),
                &config,
            ),
        };

        Ok(GatewayDependencies {
            connection_repo,
            tester: Arc::new(tester),
        })
    }
}
