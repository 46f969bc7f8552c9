//! TransferDesk Gateway
//!
//! Connection health checks for stored SFTP and Salesforce connections:
//! - Salesforce OAuth2 client-credentials token exchange
//! - Kind-specific endpoint probes behind a single registry
//! - Connection tester that never fails, with best-effort result persistence
//! - HTTP server with CORS, request tracing and panic capture

pub mod logging;
pub mod probe;
pub mod salesforce;
pub mod server;
pub mod services;

use std::time::Duration;

pub use probe::{EndpointProbe, ProbeArtifacts, ProbeError, ProbeRegistry, SalesforceProbe, TcpProbe};
pub use salesforce::{SalesforceToken, SalesforceTokenClient, TokenExchangeError};
pub use server::{
    build_router, AppState, DependenciesBuilder, GatewayConfig, GatewayDependencies, GatewayServer,
};
pub use services::{ConnectionTester, StatusPersistenceBridge, TesterConfig};

/// Human form of a timeout for messages ("15s", "250ms")
pub(crate) fn describe_timeout(timeout: Duration) -> String {
    if timeout.subsec_millis() == 0 && timeout.as_secs() > 0 {
        format!("{}s", timeout.as_secs())
    } else {
        format!("{}ms", timeout.as_millis())
    }
}
