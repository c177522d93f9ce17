//! Storage module for the API.
//!
//! Provides the schema store trait and its SQLite backend.

pub mod error;
pub mod traits;

// Storage backend implementations
pub mod sqlite;

pub use error::StorageError;
pub use sqlite::SqliteSchemaStore;
pub use traits::SchemaStore;
