//! TransferDesk Storage Layer
//!
//! SQLite record store for connections and projects, with field-level
//! encryption for connection secrets.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                    Application                       │
//! ├──────────────────────────────────────────────────────┤
//! │               Repository Traits                      │
//! │     (ConnectionRepository, ProjectRepository)        │
//! ├──────────────────────────────────────────────────────┤
//! │            SQLite Implementations                    │
//! │ (SqliteConnectionRepository, SqliteProjectRepository)│
//! ├──────────────────────────────────────────────────────┤
//! │         FieldEncryptor (AES-256-GCM)                 │
//! │   (Encrypts passwords, consumer secrets, tokens)     │
//! ├──────────────────────────────────────────────────────┤
//! │                   Database                           │
//! │                   (SQLite)                           │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use transferdesk_storage::{Database, FieldEncryptor, SqliteConnectionRepository};
//! use std::sync::Arc;
//! use tokio::sync::Mutex;
//!
//! let db = Arc::new(Mutex::new(Database::open(&path)?));
//! let encryptor = Arc::new(FieldEncryptor::from_hex_key(&master_key_hex)?);
//!
//! let connections = SqliteConnectionRepository::new(db.clone(), encryptor);
//! ```

pub mod crypto;
mod database;
mod repositories;

pub use crypto::{generate_master_key, FieldEncryptor, KEY_SIZE};
pub use database::Database;
pub use repositories::*;

/// Default database file name.
pub const DATABASE_FILE: &str = "transferdesk.db";

/// Get the default database path for the current platform.
pub fn default_database_path() -> Option<std::path::PathBuf> {
    dirs::data_local_dir().map(|p| p.join("transferdesk").join(DATABASE_FILE))
}
