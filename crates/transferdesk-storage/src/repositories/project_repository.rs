//! SQLite implementation of ProjectRepository.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};
use tokio::sync::Mutex;
use transferdesk_core::{OperationType, Project, ProjectRepository};
use uuid::Uuid;

use super::parse_datetime;
use crate::Database;

/// SQLite-backed project repository.
pub struct SqliteProjectRepository {
    db: Arc<Mutex<Database>>,
}

impl SqliteProjectRepository {
    /// Create a new project repository.
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db }
    }

    const SELECT_COLUMNS: &'static str = "id, name, description, from_connection_id, \
         to_connection_id, operation_type, sftp_file_path, salesforce_file_id, created_at, updated_at";

    fn parse_uuid(s: Option<String>) -> Option<Uuid> {
        s.and_then(|s| Uuid::parse_str(&s).ok())
    }

    fn row_to_project(row: &rusqlite::Row) -> rusqlite::Result<Project> {
        let id: String = row.get(0)?;
        let operation_type: Option<String> = row.get(5)?;
        let created_at: String = row.get(8)?;
        let updated_at: String = row.get(9)?;

        Ok(Project {
            id: Uuid::parse_str(&id).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
            })?,
            name: row.get(1)?,
            description: row.get(2)?,
            from_connection_id: Self::parse_uuid(row.get(3)?),
            to_connection_id: Self::parse_uuid(row.get(4)?),
            operation_type: operation_type.as_deref().and_then(OperationType::parse),
            sftp_file_path: row.get(6)?,
            salesforce_file_id: row.get(7)?,
            created_at: parse_datetime(&created_at),
            updated_at: parse_datetime(&updated_at),
        })
    }
}

#[async_trait]
impl ProjectRepository for SqliteProjectRepository {
    async fn list(&self) -> Result<Vec<Project>> {
        let db = self.db.lock().await;
        let mut stmt = db.connection().prepare(&format!(
            "SELECT {} FROM projects ORDER BY name ASC",
            Self::SELECT_COLUMNS
        ))?;

        let projects = stmt
            .query_map([], Self::row_to_project)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(projects)
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Project>> {
        let db = self.db.lock().await;
        let project = db
            .connection()
            .query_row(
                &format!("SELECT {} FROM projects WHERE id = ?1", Self::SELECT_COLUMNS),
                params![id.to_string()],
                Self::row_to_project,
            )
            .optional()?;

        Ok(project)
    }

    async fn create(&self, project: &Project) -> Result<()> {
        let db = self.db.lock().await;
        db.connection().execute(
            "INSERT INTO projects (
                id, name, description, from_connection_id, to_connection_id,
                operation_type, sftp_file_path, salesforce_file_id, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                project.id.to_string(),
                project.name,
                project.description,
                project.from_connection_id.map(|id| id.to_string()),
                project.to_connection_id.map(|id| id.to_string()),
                project.operation_type.map(|op| op.as_str()),
                project.sftp_file_path,
                project.salesforce_file_id,
                project.created_at.to_rfc3339(),
                project.updated_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    async fn update(&self, project: &Project) -> Result<()> {
        let db = self.db.lock().await;
        let updated = db.connection().execute(
            "UPDATE projects SET
                name = ?2, description = ?3, from_connection_id = ?4, to_connection_id = ?5,
                operation_type = ?6, sftp_file_path = ?7, salesforce_file_id = ?8, updated_at = ?9
             WHERE id = ?1",
            params![
                project.id.to_string(),
                project.name,
                project.description,
                project.from_connection_id.map(|id| id.to_string()),
                project.to_connection_id.map(|id| id.to_string()),
                project.operation_type.map(|op| op.as_str()),
                project.sftp_file_path,
                project.salesforce_file_id,
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;

        if updated == 0 {
            anyhow::bail!("Project not found: {}", project.id);
        }

        Ok(())
    }

    async fn delete(&self, id: &Uuid) -> Result<()> {
        let db = self.db.lock().await;
        db.connection()
            .execute("DELETE FROM projects WHERE id = ?1", params![id.to_string()])?;
        Ok(())
    }
}
