//! Project entity - a named file transfer between two connections
//!
//! Projects only describe a transfer; executing it is not part of TransferDesk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ConnectionKind, ConnectionRecord};

/// Direction of a project's transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    /// Retrieve a file from SFTP into Salesforce
    Retrieve,
    /// Push a file from Salesforce to SFTP
    Push,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Retrieve => "retrieve",
            OperationType::Push => "push",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "retrieve" => Some(OperationType::Retrieve),
            "push" => Some(OperationType::Push),
            _ => None,
        }
    }

    /// Connection kinds expected at the (from, to) ends
    pub fn endpoint_kinds(&self) -> (ConnectionKind, ConnectionKind) {
        match self {
            OperationType::Retrieve => (ConnectionKind::Sftp, ConnectionKind::Salesforce),
            OperationType::Push => (ConnectionKind::Salesforce, ConnectionKind::Sftp),
        }
    }
}

/// Problems found when checking a project's endpoints
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProjectError {
    #[error("{role} connection is not the one referenced by the project")]
    ReferenceMismatch { role: &'static str },

    #[error("{role} connection must be {expected}, got {actual}")]
    KindMismatch {
        role: &'static str,
        expected: ConnectionKind,
        actual: ConnectionKind,
    },
}

/// A transfer definition between two connections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub from_connection_id: Option<Uuid>,
    pub to_connection_id: Option<Uuid>,
    pub operation_type: Option<OperationType>,
    /// Source path on the SFTP server (retrieve)
    pub sftp_file_path: Option<String>,
    /// Source ContentVersion/Document id in Salesforce (push)
    pub salesforce_file_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            from_connection_id: None,
            to_connection_id: None,
            operation_type: None,
            sftp_file_path: None,
            salesforce_file_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set both ends of the transfer
    pub fn between(mut self, from: &ConnectionRecord, to: &ConnectionRecord) -> Self {
        self.from_connection_id = Some(from.id);
        self.to_connection_id = Some(to.id);
        self
    }

    /// Retrieve `path` from SFTP into Salesforce
    pub fn retrieve(mut self, path: impl Into<String>) -> Self {
        self.operation_type = Some(OperationType::Retrieve);
        self.sftp_file_path = Some(path.into());
        self
    }

    /// Push Salesforce file `file_id` to SFTP
    pub fn push(mut self, file_id: impl Into<String>) -> Self {
        self.operation_type = Some(OperationType::Push);
        self.salesforce_file_id = Some(file_id.into());
        self
    }

    /// Check that the given records are the project's endpoints and that their
    /// kinds fit the operation. Projects without an operation accept any kinds.
    pub fn validate_endpoints(
        &self,
        from: &ConnectionRecord,
        to: &ConnectionRecord,
    ) -> Result<(), ProjectError> {
        if self.from_connection_id != Some(from.id) {
            return Err(ProjectError::ReferenceMismatch { role: "from" });
        }
        if self.to_connection_id != Some(to.id) {
            return Err(ProjectError::ReferenceMismatch { role: "to" });
        }

        let Some(operation) = self.operation_type else {
            return Ok(());
        };
        let (expected_from, expected_to) = operation.endpoint_kinds();

        for (role, expected, record) in [("from", expected_from, from), ("to", expected_to, to)] {
            if record.connection_type() != expected {
                return Err(ProjectError::KindMismatch {
                    role,
                    expected,
                    actual: record.connection_type(),
                });
            }
        }

        Ok(())
    }
}
