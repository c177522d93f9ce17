//! Application state management.
//!
//! Defines the AppState struct that holds the shared storage backend used by
//! all route handlers.

use crate::storage::{SchemaStore, SqliteSchemaStore, StorageError};
use axum::extract::FromRef;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Default on-disk database when DATABASE_PATH is not set.
const DEFAULT_DATABASE_PATH: &str = "./diagram_import.db";

/// Application state shared across all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// Schema store backing projects and their imported schemas
    pub storage: Arc<dyn SchemaStore>,
}

impl AppState {
    pub fn new(storage: Arc<dyn SchemaStore>) -> Self {
        Self { storage }
    }

    /// Initialize state from environment configuration.
    ///
    /// DATABASE_PATH selects the SQLite database file, defaulting to
    /// `./diagram_import.db` next to the binary.
    pub fn from_env() -> Result<Self, StorageError> {
        let db_path =
            std::env::var("DATABASE_PATH").unwrap_or_else(|_| DEFAULT_DATABASE_PATH.to_string());
        let storage = SqliteSchemaStore::new(&PathBuf::from(&db_path))?;
        info!("[Storage] Using SQLite database at {}", db_path);
        Ok(Self::new(Arc::new(storage)))
    }

    /// State backed by an in-memory database, used by tests.
    pub fn in_memory() -> Result<Self, StorageError> {
        Ok(Self::new(Arc::new(SqliteSchemaStore::in_memory()?)))
    }
}

// Allow the store to be extracted directly (for Axum)
impl FromRef<AppState> for Arc<dyn SchemaStore> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.storage.clone()
    }
}
