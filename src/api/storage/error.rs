//! Error types for the schema storage boundary.

use thiserror::Error;

/// Errors surfaced by schema store implementations.
///
/// Route handlers map `NotFound` to a 404 response and everything else to
/// a 500; the import service passes storage errors through untouched so a
/// failed replace is never mistaken for a validation problem.
#[derive(Error, Debug, Clone)]
pub enum StorageError {
    /// Lookup for an entity that does not exist
    #[error("Entity not found: {entity_type} with id {entity_id}")]
    NotFound {
        entity_type: String,
        entity_id: String,
    },
    /// The database could not be opened
    #[error("Connection error: {0}")]
    ConnectionError(String),
    /// Statement execution or row mapping failure
    #[error("Storage error: {0}")]
    Other(String),
}
