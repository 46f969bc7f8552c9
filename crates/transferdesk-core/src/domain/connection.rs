//! Connection entity - a stored credential set for one remote endpoint
//!
//! The connection kind is fixed when the record is created. Only the settings
//! of that kind are meaningful; the settings enum makes the other kind's
//! fields unrepresentable.

use std::fmt;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of remote endpoint a connection points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionKind {
    /// SFTP server (reachability is checked over raw TCP)
    #[serde(rename = "SFTP")]
    Sftp,
    /// Salesforce org (OAuth2 client-credentials + REST API)
    #[serde(rename = "Salesforce")]
    Salesforce,
}

impl ConnectionKind {
    /// Every supported kind, in display order
    pub const ALL: [ConnectionKind; 2] = [ConnectionKind::Sftp, ConnectionKind::Salesforce];

    /// Wire/storage name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionKind::Sftp => "SFTP",
            ConnectionKind::Salesforce => "Salesforce",
        }
    }

    /// Parse a wire/storage name. Matching is exact.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }
}

impl fmt::Display for ConnectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of the most recent connection test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionStatus {
    Connected,
    Error,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Connected => "Connected",
            ConnectionStatus::Error => "Error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Connected" => Some(ConnectionStatus::Connected),
            "Error" => Some(ConnectionStatus::Error),
            _ => None,
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SFTP connection fields
///
/// Fields are optional because records may be saved from partially filled forms.
#[derive(Debug, Clone, Default)]
pub struct SftpSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<SecretString>,
}

/// Salesforce connection fields
#[derive(Debug, Clone, Default)]
pub struct SalesforceSettings {
    /// Base URL of the org's token endpoint (e.g. https://login.salesforce.com)
    pub authentication_url: Option<String>,
    pub consumer_key: Option<String>,
    pub consumer_secret: Option<SecretString>,
    /// Cached access token, refreshed by every successful token exchange
    pub access_token: Option<SecretString>,
}

/// Kind-specific settings of a connection
#[derive(Debug, Clone)]
pub enum ConnectionSettings {
    Sftp(SftpSettings),
    Salesforce(SalesforceSettings),
}

impl ConnectionSettings {
    /// The kind these settings belong to
    pub fn kind(&self) -> ConnectionKind {
        match self {
            ConnectionSettings::Sftp(_) => ConnectionKind::Sftp,
            ConnectionSettings::Salesforce(_) => ConnectionKind::Salesforce,
        }
    }
}

/// A stored connection.
///
/// `status` and `last_connected` are derived telemetry written back by the
/// connection tester; they are never a precondition for anything.
#[derive(Debug, Clone)]
pub struct ConnectionRecord {
    pub id: Uuid,

    /// Display name shown in connection lists
    pub name: String,

    pub settings: ConnectionSettings,

    pub status: Option<ConnectionStatus>,

    /// Time of the most recent successful test
    pub last_connected: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConnectionRecord {
    /// Create a new record with the given settings
    pub fn new(name: impl Into<String>, settings: ConnectionSettings) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            settings,
            status: None,
            last_connected: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a new SFTP record
    pub fn sftp(name: impl Into<String>, settings: SftpSettings) -> Self {
        Self::new(name, ConnectionSettings::Sftp(settings))
    }

    /// Create a new Salesforce record
    pub fn salesforce(name: impl Into<String>, settings: SalesforceSettings) -> Self {
        Self::new(name, ConnectionSettings::Salesforce(settings))
    }

    /// The immutable discriminant of this record
    pub fn connection_type(&self) -> ConnectionKind {
        self.settings.kind()
    }

    pub fn is_connected(&self) -> bool {
        self.status == Some(ConnectionStatus::Connected)
    }

    /// Fold a partial update into this record.
    ///
    /// An access token is only applied to Salesforce records.
    pub fn apply_patch(&mut self, patch: &ConnectionPatch) {
        if let Some(status) = patch.status {
            self.status = Some(status);
        }
        if let Some(at) = patch.last_connected {
            self.last_connected = Some(at);
        }
        if let (Some(token), ConnectionSettings::Salesforce(settings)) =
            (&patch.salesforce_access_token, &mut self.settings)
        {
            settings.access_token = Some(token.clone());
        }
        if !patch.is_empty() {
            self.updated_at = Utc::now();
        }
    }
}

/// Partial update of the fields owned by the connection tester
#[derive(Debug, Clone, Default)]
pub struct ConnectionPatch {
    pub status: Option<ConnectionStatus>,
    pub last_connected: Option<DateTime<Utc>>,
    pub salesforce_access_token: Option<SecretString>,
}

impl ConnectionPatch {
    /// Patch that only sets the status
    pub fn status(status: ConnectionStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn with_last_connected(mut self, at: DateTime<Utc>) -> Self {
        self.last_connected = Some(at);
        self
    }

    pub fn with_access_token(mut self, token: SecretString) -> Self {
        self.salesforce_access_token = Some(token);
        self
    }

    /// True when the patch would not change anything
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.last_connected.is_none()
            && self.salesforce_access_token.is_none()
    }
}
