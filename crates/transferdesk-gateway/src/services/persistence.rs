//! Status Persistence Bridge
//!
//! Folds a test outcome back into the stored connection record. Best-effort:
//! failures and timeouts are logged and never reach the caller.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use secrecy::SecretString;
use tracing::{debug, warn};
use transferdesk_core::{ConnectionPatch, ConnectionRepository, TestOutcome};
use uuid::Uuid;

pub struct StatusPersistenceBridge {
    connections: Arc<dyn ConnectionRepository>,
    timeout: Duration,
}

impl StatusPersistenceBridge {
    pub fn new(connections: Arc<dyn ConnectionRepository>, timeout: Duration) -> Self {
        Self {
            connections,
            timeout,
        }
    }

    /// Patch that records `outcome` (and a freshly obtained token, if any)
    pub fn patch_for(outcome: &TestOutcome, refreshed_token: Option<SecretString>) -> ConnectionPatch {
        let mut patch = ConnectionPatch::status(outcome.status);
        if outcome.is_connected() {
            patch = patch.with_last_connected(Utc::now());
        }
        if let Some(token) = refreshed_token {
            patch = patch.with_access_token(token);
        }
        patch
    }

    /// Store the outcome for connection `id`. Never fails.
    pub async fn persist(
        &self,
        id: &Uuid,
        outcome: &TestOutcome,
        refreshed_token: Option<SecretString>,
    ) {
        let caches_token = refreshed_token.is_some();
        let patch = Self::patch_for(outcome, refreshed_token);

        match tokio::time::timeout(self.timeout, self.connections.update(id, &patch)).await {
            Ok(Ok(())) => debug!(
                "[Persist] Stored status {} for {}{}",
                outcome.status,
                id,
                if caches_token { " (token cached)" } else { "" }
            ),
            Ok(Err(e)) => warn!("[Persist] Failed to store test result for {}: {:#}", id, e),
            Err(_) => warn!(
                "[Persist] Timed out after {:?} storing test result for {}",
                self.timeout, id
            ),
        }
    }
}
