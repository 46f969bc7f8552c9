//! Mock repository implementations for testing
//!
//! In-memory `ConnectionRepository` with failure injection and call recording.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use std::time::Duration;
use uuid::Uuid;

use transferdesk_core::{
    ConnectionKind, ConnectionPatch, ConnectionRecord, ConnectionRepository, ConnectionSettings,
    RepoResult,
};

// ============================================================================
// MockConnectionRepository
// ============================================================================

#[derive(Default)]
pub struct MockConnectionRepository {
    records: RwLock<HashMap<Uuid, ConnectionRecord>>,
    updates: RwLock<Vec<(Uuid, ConnectionPatch)>>,
    fail_updates: AtomicBool,
    fail_reads: AtomicBool,
    update_delay: RwLock<Option<Duration>>,
}

impl MockConnectionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(self, record: ConnectionRecord) -> Self {
        self.records.write().unwrap().insert(record.id, record);
        self
    }

    /// Every `update` call fails (after being recorded)
    pub fn failing_updates(self) -> Self {
        self.fail_updates.store(true, Ordering::SeqCst);
        self
    }

    /// Every `get`/`list` call fails
    pub fn failing_reads(self) -> Self {
        self.fail_reads.store(true, Ordering::SeqCst);
        self
    }

    /// Every `update` call sleeps this long before applying the patch
    pub fn with_update_delay(self, delay: Duration) -> Self {
        *self.update_delay.write().unwrap() = Some(delay);
        self
    }

    /// All `update` calls received, in order
    pub fn update_calls(&self) -> Vec<(Uuid, ConnectionPatch)> {
        self.updates.read().unwrap().clone()
    }

    pub fn update_count(&self) -> usize {
        self.updates.read().unwrap().len()
    }

    /// Current state of a stored record
    pub fn record(&self, id: &Uuid) -> Option<ConnectionRecord> {
        self.records.read().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl ConnectionRepository for MockConnectionRepository {
    async fn list(&self, kind: Option<ConnectionKind>) -> RepoResult<Vec<ConnectionRecord>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            anyhow::bail!("mock read failure");
        }
        let mut records: Vec<_> = self
            .records
            .read()
            .unwrap()
            .values()
            .filter(|r| kind.map_or(true, |k| r.connection_type() == k))
            .cloned()
            .collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(records)
    }

    async fn get(&self, id: &Uuid) -> RepoResult<Option<ConnectionRecord>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            anyhow::bail!("mock read failure");
        }
        Ok(self.records.read().unwrap().get(id).cloned())
    }

    async fn create(&self, record: &ConnectionRecord) -> RepoResult<()> {
        self.records.write().unwrap().insert(record.id, record.clone());
        Ok(())
    }

    async fn save(&self, record: &ConnectionRecord) -> RepoResult<()> {
        let mut records = self.records.write().unwrap();
        match records.get(&record.id) {
            None => anyhow::bail!("Connection not found: {}", record.id),
            Some(existing) if existing.connection_type() != record.connection_type() => {
                anyhow::bail!("Connection type cannot change")
            }
            Some(existing) => {
                let mut saved = record.clone();
                if let (
                    ConnectionSettings::Salesforce(stored),
                    ConnectionSettings::Salesforce(edited),
                ) = (&existing.settings, &mut saved.settings)
                {
                    edited.access_token = stored.access_token.clone();
                }
                records.insert(record.id, saved);
                Ok(())
            }
        }
    }

    async fn update(&self, id: &Uuid, patch: &ConnectionPatch) -> RepoResult<()> {
        self.updates.write().unwrap().push((*id, patch.clone()));

        if self.fail_updates.load(Ordering::SeqCst) {
            anyhow::bail!("mock update failure");
        }

        let delay = *self.update_delay.read().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut records = self.records.write().unwrap();
        let record = records
            .get_mut(id)
            .ok_or_else(|| anyhow::anyhow!("Connection not found: {}", id))?;
        record.apply_patch(patch);
        Ok(())
    }

    async fn delete(&self, id: &Uuid) -> RepoResult<()> {
        self.records.write().unwrap().remove(id);
        Ok(())
    }
}
