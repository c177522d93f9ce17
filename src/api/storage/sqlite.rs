//! SQLite storage backend for projects and imported schemas.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row, params};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use super::StorageError;
use super::traits::SchemaStore;
use crate::models::{Model, ModelColumn, Project, Relation, RelationType};

/// Schema store backed by a single SQLite connection.
///
/// rusqlite connections are not `Sync`, so the connection sits behind an
/// async mutex. Every trait method takes the lock for the duration of its
/// statement(s); `replace_schema` additionally wraps its work in a
/// transaction so a failed import leaves the prior schema untouched.
pub struct SqliteSchemaStore {
    conn: Mutex<Connection>,
}

impl SqliteSchemaStore {
    /// Open (or create) the database file at `db_path`.
    pub fn new(db_path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(db_path).map_err(|e| {
            StorageError::ConnectionError(format!("Failed to open database {:?}: {}", db_path, e))
        })?;
        Self::from_connection(conn)
    }

    /// In-memory store, used by tests.
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            StorageError::ConnectionError(format!("Failed to open in-memory database: {}", e))
        })?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(map_sqlite)?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

/// Initialize database schema.
fn init_schema(conn: &Connection) -> Result<(), StorageError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS projects (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            schema_name TEXT,
            catalog_name TEXT,
            created_at TIMESTAMP NOT NULL
        )",
        [],
    )
    .map_err(map_sqlite)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS models (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL,
            reference_name TEXT NOT NULL,
            display_name TEXT NOT NULL,
            source_table_name TEXT NOT NULL,
            properties_json TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL,
            FOREIGN KEY (project_id) REFERENCES projects(id)
        )",
        [],
    )
    .map_err(map_sqlite)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS model_columns (
            id TEXT PRIMARY KEY,
            model_id TEXT NOT NULL,
            reference_name TEXT NOT NULL,
            source_column_name TEXT NOT NULL,
            column_type TEXT NOT NULL,
            is_pk INTEGER NOT NULL,
            not_null INTEGER NOT NULL,
            properties_json TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL,
            FOREIGN KEY (model_id) REFERENCES models(id)
        )",
        [],
    )
    .map_err(map_sqlite)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS relations (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL,
            name TEXT NOT NULL,
            from_column_id TEXT NOT NULL,
            to_column_id TEXT NOT NULL,
            join_type TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL,
            FOREIGN KEY (project_id) REFERENCES projects(id),
            FOREIGN KEY (from_column_id) REFERENCES model_columns(id),
            FOREIGN KEY (to_column_id) REFERENCES model_columns(id)
        )",
        [],
    )
    .map_err(map_sqlite)?;

    info!("[Storage] Schema store initialized");
    Ok(())
}

#[async_trait::async_trait]
impl SchemaStore for SqliteSchemaStore {
    async fn create_project(&self, project: &Project) -> Result<(), StorageError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO projects (id, name, schema_name, catalog_name, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                project.id.to_string(),
                project.name,
                project.schema_name,
                project.catalog_name,
                project.created_at.to_rfc3339(),
            ],
        )
        .map_err(map_sqlite)?;
        Ok(())
    }

    async fn get_project(&self, project_id: Uuid) -> Result<Project, StorageError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(
                "SELECT id, name, schema_name, catalog_name, created_at
                 FROM projects WHERE id = ?1",
            )
            .map_err(map_sqlite)?;
        let mut rows = stmt
            .query_map(params![project_id.to_string()], row_to_project)
            .map_err(map_sqlite)?;
        match rows.next() {
            Some(row) => row.map_err(map_sqlite),
            None => Err(StorageError::NotFound {
                entity_type: "project".to_string(),
                entity_id: project_id.to_string(),
            }),
        }
    }

    async fn list_projects(&self) -> Result<Vec<Project>, StorageError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(
                "SELECT id, name, schema_name, catalog_name, created_at
                 FROM projects ORDER BY rowid",
            )
            .map_err(map_sqlite)?;
        let rows = stmt.query_map([], row_to_project).map_err(map_sqlite)?;
        collect_rows(rows)
    }

    async fn list_models(&self, project_id: Uuid) -> Result<Vec<Model>, StorageError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(
                "SELECT id, project_id, reference_name, display_name, source_table_name,
                        properties_json, created_at
                 FROM models WHERE project_id = ?1 ORDER BY rowid",
            )
            .map_err(map_sqlite)?;
        let rows = stmt
            .query_map(params![project_id.to_string()], row_to_model)
            .map_err(map_sqlite)?;
        collect_rows(rows)
    }

    async fn list_columns(&self, project_id: Uuid) -> Result<Vec<ModelColumn>, StorageError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(
                "SELECT c.id, c.model_id, c.reference_name, c.source_column_name, c.column_type,
                        c.is_pk, c.not_null, c.properties_json, c.created_at
                 FROM model_columns c
                 JOIN models m ON m.id = c.model_id
                 WHERE m.project_id = ?1 ORDER BY c.rowid",
            )
            .map_err(map_sqlite)?;
        let rows = stmt
            .query_map(params![project_id.to_string()], row_to_column)
            .map_err(map_sqlite)?;
        collect_rows(rows)
    }

    async fn list_relations(&self, project_id: Uuid) -> Result<Vec<Relation>, StorageError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(
                "SELECT id, project_id, name, from_column_id, to_column_id, join_type, created_at
                 FROM relations WHERE project_id = ?1 ORDER BY rowid",
            )
            .map_err(map_sqlite)?;
        let rows = stmt
            .query_map(params![project_id.to_string()], row_to_relation)
            .map_err(map_sqlite)?;
        collect_rows(rows)
    }

    async fn replace_schema(
        &self,
        project_id: Uuid,
        models: &[Model],
        columns: &[ModelColumn],
        relations: &[Relation],
    ) -> Result<(), StorageError> {
        let mut conn = self.conn.lock().await;
        // Dropped on error before commit, which rolls everything back.
        let tx = conn.transaction().map_err(map_sqlite)?;

        let pid = project_id.to_string();
        tx.execute("DELETE FROM relations WHERE project_id = ?1", params![pid])
            .map_err(map_sqlite)?;
        tx.execute(
            "DELETE FROM model_columns WHERE model_id IN
                 (SELECT id FROM models WHERE project_id = ?1)",
            params![pid],
        )
        .map_err(map_sqlite)?;
        tx.execute("DELETE FROM models WHERE project_id = ?1", params![pid])
            .map_err(map_sqlite)?;

        for model in models {
            let properties_json = serde_json::to_string(&model.properties)
                .map_err(|e| StorageError::Other(format!("Failed to serialize model properties: {}", e)))?;
            tx.execute(
                "INSERT INTO models (id, project_id, reference_name, display_name,
                                     source_table_name, properties_json, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    model.id.to_string(),
                    model.project_id.to_string(),
                    model.reference_name,
                    model.display_name,
                    model.source_table_name,
                    properties_json,
                    model.created_at.to_rfc3339(),
                ],
            )
            .map_err(map_sqlite)?;
        }

        for column in columns {
            let properties_json = serde_json::to_string(&column.properties)
                .map_err(|e| StorageError::Other(format!("Failed to serialize column properties: {}", e)))?;
            tx.execute(
                "INSERT INTO model_columns (id, model_id, reference_name, source_column_name,
                                            column_type, is_pk, not_null, properties_json, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    column.id.to_string(),
                    column.model_id.to_string(),
                    column.reference_name,
                    column.source_column_name,
                    column.column_type,
                    column.is_pk,
                    column.not_null,
                    properties_json,
                    column.created_at.to_rfc3339(),
                ],
            )
            .map_err(map_sqlite)?;
        }

        for relation in relations {
            tx.execute(
                "INSERT INTO relations (id, project_id, name, from_column_id, to_column_id,
                                        join_type, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    relation.id.to_string(),
                    relation.project_id.to_string(),
                    relation.name,
                    relation.from_column_id.to_string(),
                    relation.to_column_id.to_string(),
                    relation.join_type.as_str(),
                    relation.created_at.to_rfc3339(),
                ],
            )
            .map_err(map_sqlite)?;
        }

        tx.commit().map_err(map_sqlite)?;
        info!(
            "[Storage] Replaced schema for project {}: {} models, {} columns, {} relations",
            project_id,
            models.len(),
            columns.len(),
            relations.len()
        );
        Ok(())
    }
}

fn map_sqlite(e: rusqlite::Error) -> StorageError {
    StorageError::Other(e.to_string())
}

fn collect_rows<T>(
    rows: impl Iterator<Item = rusqlite::Result<T>>,
) -> Result<Vec<T>, StorageError> {
    let mut out = Vec::new();
    for row in rows {
        out.push(row.map_err(map_sqlite)?);
    }
    Ok(out)
}

fn read_uuid(row: &Row, column: &str) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(column)?;
    Uuid::parse_str(&raw).map_err(|_e| {
        rusqlite::Error::InvalidColumnType(0, column.to_string(), rusqlite::types::Type::Text)
    })
}

fn read_timestamp(row: &Row, column: &str) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(column)?;
    Ok(DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now()))
}

fn read_properties(row: &Row, column: &str) -> rusqlite::Result<serde_json::Value> {
    let raw: String = row.get(column)?;
    Ok(serde_json::from_str(&raw).unwrap_or_else(|_| serde_json::json!({})))
}

fn row_to_project(row: &Row) -> rusqlite::Result<Project> {
    Ok(Project {
        id: read_uuid(row, "id")?,
        name: row.get("name")?,
        schema_name: row.get("schema_name")?,
        catalog_name: row.get("catalog_name")?,
        created_at: read_timestamp(row, "created_at")?,
    })
}

fn row_to_model(row: &Row) -> rusqlite::Result<Model> {
    Ok(Model {
        id: read_uuid(row, "id")?,
        project_id: read_uuid(row, "project_id")?,
        reference_name: row.get("reference_name")?,
        display_name: row.get("display_name")?,
        source_table_name: row.get("source_table_name")?,
        properties: read_properties(row, "properties_json")?,
        created_at: read_timestamp(row, "created_at")?,
    })
}

fn row_to_column(row: &Row) -> rusqlite::Result<ModelColumn> {
    Ok(ModelColumn {
        id: read_uuid(row, "id")?,
        model_id: read_uuid(row, "model_id")?,
        reference_name: row.get("reference_name")?,
        source_column_name: row.get("source_column_name")?,
        column_type: row.get("column_type")?,
        is_pk: row.get("is_pk")?,
        not_null: row.get("not_null")?,
        properties: read_properties(row, "properties_json")?,
        created_at: read_timestamp(row, "created_at")?,
    })
}

fn row_to_relation(row: &Row) -> rusqlite::Result<Relation> {
    let join_type: String = row.get("join_type")?;
    Ok(Relation {
        id: read_uuid(row, "id")?,
        project_id: read_uuid(row, "project_id")?,
        name: row.get("name")?,
        from_column_id: read_uuid(row, "from_column_id")?,
        to_column_id: read_uuid(row, "to_column_id")?,
        join_type: RelationType::parse(&join_type).unwrap_or_default(),
        created_at: read_timestamp(row, "created_at")?,
    })
}
