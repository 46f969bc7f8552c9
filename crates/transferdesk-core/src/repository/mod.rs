//! Repository traits for data access
//!
//! These traits define the record store interface without specifying
//! the implementation (SQLite, in-memory, etc.)

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{ConnectionKind, ConnectionPatch, ConnectionRecord, Project};

/// Result type for repository operations
pub type RepoResult<T> = anyhow::Result<T>;

/// Connection repository trait
///
/// Secret fields are returned decrypted; how they are stored is up to the
/// implementation.
#[async_trait]
pub trait ConnectionRepository: Send + Sync {
    /// Get all connections, optionally only those of one kind
    async fn list(&self, kind: Option<ConnectionKind>) -> RepoResult<Vec<ConnectionRecord>>;

    /// Get a connection by ID
    async fn get(&self, id: &Uuid) -> RepoResult<Option<ConnectionRecord>>;

    /// Create a new connection
    async fn create(&self, record: &ConnectionRecord) -> RepoResult<()>;

    /// Replace the settings and name of an existing connection.
    ///
    /// The cached Salesforce access token is left as stored; only `update`
    /// writes it. Fails if the stored record has a different connection type.
    async fn save(&self, record: &ConnectionRecord) -> RepoResult<()>;

    /// Apply a partial update (status, last_connected, access token).
    ///
    /// Fails if no connection with this ID exists.
    async fn update(&self, id: &Uuid, patch: &ConnectionPatch) -> RepoResult<()>;

    /// Delete a connection
    async fn delete(&self, id: &Uuid) -> RepoResult<()>;
}

/// Project repository trait
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Get all projects
    async fn list(&self) -> RepoResult<Vec<Project>>;

    /// Get a project by ID
    async fn get(&self, id: &Uuid) -> RepoResult<Option<Project>>;

    /// Create a new project
    async fn create(&self, project: &Project) -> RepoResult<()>;

    /// Update a project
    async fn update(&self, project: &Project) -> RepoResult<()>;

    /// Delete a project
    async fn delete(&self, id: &Uuid) -> RepoResult<()>;
}
