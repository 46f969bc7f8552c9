//! SQLite implementation of ConnectionRepository with encrypted secret columns.
//!
//! Both kinds share one table. Columns of the other kind are written as NULL
//! and ignored when reading, so a row only ever carries one kind's settings.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use tokio::sync::Mutex;
use transferdesk_core::{
    ConnectionKind, ConnectionPatch, ConnectionRecord, ConnectionRepository, ConnectionSettings,
    ConnectionStatus, SalesforceSettings, SftpSettings,
};
use uuid::Uuid;

use super::{parse_datetime, parse_optional_datetime};
use crate::crypto::FieldEncryptor;
use crate::Database;

/// Raw row data extracted from SQLite before decryption.
struct RawConnectionRow {
    id: String,
    name: String,
    connection_type: String,
    sftp_host: Option<String>,
    sftp_port: Option<u16>,
    sftp_username: Option<String>,
    sftp_password: Option<String>, // Encrypted
    salesforce_authentication_url: Option<String>,
    salesforce_consumer_key: Option<String>,
    salesforce_consumer_secret: Option<String>, // Encrypted
    salesforce_access_token: Option<String>,    // Encrypted
    status: Option<String>,
    last_connected: Option<String>,
    created_at: String,
    updated_at: String,
}

/// Column values for the settings part of a row, secrets already sealed.
#[derive(Default)]
struct SettingsColumns {
    sftp_host: Option<String>,
    sftp_port: Option<u16>,
    sftp_username: Option<String>,
    sftp_password: Option<String>,
    salesforce_authentication_url: Option<String>,
    salesforce_consumer_key: Option<String>,
    salesforce_consumer_secret: Option<String>,
    salesforce_access_token: Option<String>,
}

/// SQLite-backed connection repository.
pub struct SqliteConnectionRepository {
    db: Arc<Mutex<Database>>,
    encryptor: Arc<FieldEncryptor>,
}

impl SqliteConnectionRepository {
    /// Create a new connection repository.
    pub fn new(db: Arc<Mutex<Database>>, encryptor: Arc<FieldEncryptor>) -> Self {
        Self { db, encryptor }
    }

    /// Standard column list for SELECT queries.
    const SELECT_COLUMNS: &'static str = "id, name, connection_type, \
         sftp_host, sftp_port, sftp_username, sftp_password, \
         salesforce_authentication_url, salesforce_consumer_key, salesforce_consumer_secret, salesforce_access_token, \
         status, last_connected, created_at, updated_at";

    fn extract_row(row: &rusqlite::Row) -> rusqlite::Result<RawConnectionRow> {
        Ok(RawConnectionRow {
            id: row.get(0)?,
            name: row.get(1)?,
            connection_type: row.get(2)?,
            sftp_host: row.get(3)?,
            sftp_port: row.get(4)?,
            sftp_username: row.get(5)?,
            sftp_password: row.get(6)?,
            salesforce_authentication_url: row.get(7)?,
            salesforce_consumer_key: row.get(8)?,
            salesforce_consumer_secret: row.get(9)?,
            salesforce_access_token: row.get(10)?,
            status: row.get(11)?,
            last_connected: row.get(12)?,
            created_at: row.get(13)?,
            updated_at: row.get(14)?,
        })
    }

    /// Build a record from raw row data (decrypts the secrets of its kind only).
    fn build_record(&self, row: RawConnectionRow) -> Result<ConnectionRecord> {
        let kind = ConnectionKind::parse(&row.connection_type)
            .ok_or_else(|| anyhow::anyhow!("Unknown connection type: {}", row.connection_type))?;

        let settings = match kind {
            ConnectionKind::Sftp => ConnectionSettings::Sftp(SftpSettings {
                host: row.sftp_host,
                port: row.sftp_port,
                username: row.sftp_username,
                password: self.encryptor.open_optional(row.sftp_password.as_deref())?,
            }),
            ConnectionKind::Salesforce => ConnectionSettings::Salesforce(SalesforceSettings {
                authentication_url: row.salesforce_authentication_url,
                consumer_key: row.salesforce_consumer_key,
                consumer_secret: self
                    .encryptor
                    .open_optional(row.salesforce_consumer_secret.as_deref())?,
                access_token: self
                    .encryptor
                    .open_optional(row.salesforce_access_token.as_deref())?,
            }),
        };

        Ok(ConnectionRecord {
            id: row
                .id
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid connection id '{}': {}", row.id, e))?,
            name: row.name,
            settings,
            status: row.status.as_deref().and_then(ConnectionStatus::parse),
            last_connected: parse_optional_datetime(row.last_connected),
            created_at: parse_datetime(&row.created_at),
            updated_at: parse_datetime(&row.updated_at),
        })
    }

    fn settings_columns(&self, settings: &ConnectionSettings) -> Result<SettingsColumns> {
        let columns = match settings {
            ConnectionSettings::Sftp(s) => SettingsColumns {
                sftp_host: s.host.clone(),
                sftp_port: s.port,
                sftp_username: s.username.clone(),
                sftp_password: self.encryptor.seal_optional(s.password.as_ref())?,
                ..Default::default()
            },
            ConnectionSettings::Salesforce(s) => SettingsColumns {
                salesforce_authentication_url: s.authentication_url.clone(),
                salesforce_consumer_key: s.consumer_key.clone(),
                salesforce_consumer_secret: self
                    .encryptor
                    .seal_optional(s.consumer_secret.as_ref())?,
                salesforce_access_token: self.encryptor.seal_optional(s.access_token.as_ref())?,
                ..Default::default()
            },
        };
        Ok(columns)
    }
}

#[async_trait]
impl ConnectionRepository for SqliteConnectionRepository {
    async fn list(&self, kind: Option<ConnectionKind>) -> Result<Vec<ConnectionRecord>> {
        let rows = {
            let db = self.db.lock().await;
            let mut stmt = db.connection().prepare(&format!(
                "SELECT {} FROM connections
                 WHERE ?1 IS NULL OR connection_type = ?1
                 ORDER BY name ASC, created_at ASC",
                Self::SELECT_COLUMNS
            ))?;
            let rows = stmt
                .query_map(params![kind.map(|k| k.as_str())], Self::extract_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        let records = rows
            .into_iter()
            .map(|row| self.build_record(row))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!("[ConnectionRepository::list] Returning {} connections", records.len());
        Ok(records)
    }

    async fn get(&self, id: &Uuid) -> Result<Option<ConnectionRecord>> {
        let row = {
            let db = self.db.lock().await;
            db.connection()
                .query_row(
                    &format!("SELECT {} FROM connections WHERE id = ?1", Self::SELECT_COLUMNS),
                    params![id.to_string()],
                    Self::extract_row,
                )
                .optional()?
        };

        row.map(|r| self.build_record(r)).transpose()
    }

    async fn create(&self, record: &ConnectionRecord) -> Result<()> {
        let columns = self.settings_columns(&record.settings)?;
        let db = self.db.lock().await;

        db.connection().execute(
            "INSERT INTO connections (
                id, name, connection_type,
                sftp_host, sftp_port, sftp_username, sftp_password,
                salesforce_authentication_url, salesforce_consumer_key,
                salesforce_consumer_secret, salesforce_access_token,
                status, last_connected, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                record.id.to_string(),
                record.name,
                record.connection_type().as_str(),
                columns.sftp_host,
                columns.sftp_port,
                columns.sftp_username,
                columns.sftp_password,
                columns.salesforce_authentication_url,
                columns.salesforce_consumer_key,
                columns.salesforce_consumer_secret,
                columns.salesforce_access_token,
                record.status.map(|s| s.as_str()),
                record.last_connected.map(|t| t.to_rfc3339()),
                record.created_at.to_rfc3339(),
                record.updated_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    async fn save(&self, record: &ConnectionRecord) -> Result<()> {
        let columns = self.settings_columns(&record.settings)?;
        let db = self.db.lock().await;
        let conn = db.connection();

        let stored_type: Option<String> = conn
            .query_row(
                "SELECT connection_type FROM connections WHERE id = ?1",
                params![record.id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        match stored_type.as_deref() {
            None => anyhow::bail!("Connection not found: {}", record.id),
            Some(t) if t != record.connection_type().as_str() => anyhow::bail!(
                "Connection {} is {} and cannot become {}",
                record.id,
                t,
                record.connection_type()
            ),
            Some(_) => {}
        }

        conn.execute(
            "UPDATE connections SET
                name = ?2,
                sftp_host = ?3, sftp_port = ?4, sftp_username = ?5, sftp_password = ?6,
                salesforce_authentication_url = ?7, salesforce_consumer_key = ?8,
                salesforce_consumer_secret = ?9,
                updated_at = ?10
             WHERE id = ?1",
            params![
                record.id.to_string(),
                record.name,
                columns.sftp_host,
                columns.sftp_port,
                columns.sftp_username,
                columns.sftp_password,
                columns.salesforce_authentication_url,
                columns.salesforce_consumer_key,
                columns.salesforce_consumer_secret,
                Utc::now().to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    async fn update(&self, id: &Uuid, patch: &ConnectionPatch) -> Result<()> {
        let sealed_token = self
            .encryptor
            .seal_optional(patch.salesforce_access_token.as_ref())?;
        let db = self.db.lock().await;
        let conn = db.connection();

        let rows_affected = if patch.is_empty() {
            conn.query_row(
                "SELECT COUNT(*) FROM connections WHERE id = ?1",
                params![id.to_string()],
                |row| row.get::<_, i64>(0),
            )? as usize
        } else {
            conn.execute(
                "UPDATE connections SET
                    status = COALESCE(?2, status),
                    last_connected = COALESCE(?3, last_connected),
                    salesforce_access_token = CASE
                        WHEN connection_type = 'Salesforce' THEN COALESCE(?4, salesforce_access_token)
                        ELSE salesforce_access_token
                    END,
                    updated_at = ?5
                 WHERE id = ?1",
                params![
                    id.to_string(),
                    patch.status.map(|s| s.as_str()),
                    patch.last_connected.map(|t| t.to_rfc3339()),
                    sealed_token,
                    Utc::now().to_rfc3339(),
                ],
            )?
        };

        if rows_affected == 0 {
            anyhow::bail!("Connection not found: {}", id);
        }

        Ok(())
    }

    async fn delete(&self, id: &Uuid) -> Result<()> {
        let db = self.db.lock().await;
        db.connection()
            .execute("DELETE FROM connections WHERE id = ?1", params![id.to_string()])?;
        Ok(())
    }
}
