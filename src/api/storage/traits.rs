//! Storage trait definitions for the API storage backends.

use crate::models::{Model, ModelColumn, Project, Relation};
use uuid::Uuid;

/// Storage backend trait for projects and their imported schemas.
#[async_trait::async_trait]
pub trait SchemaStore: Send + Sync {
    /// Create a new project
    async fn create_project(&self, project: &Project) -> Result<(), super::StorageError>;

    /// Get a project by id
    async fn get_project(&self, project_id: Uuid) -> Result<Project, super::StorageError>;

    /// List all projects
    async fn list_projects(&self) -> Result<Vec<Project>, super::StorageError>;

    /// List a project's models in insertion order
    async fn list_models(&self, project_id: Uuid) -> Result<Vec<Model>, super::StorageError>;

    /// List the columns of all models in a project, in insertion order
    async fn list_columns(&self, project_id: Uuid)
    -> Result<Vec<ModelColumn>, super::StorageError>;

    /// List a project's relations in insertion order
    async fn list_relations(&self, project_id: Uuid)
    -> Result<Vec<Relation>, super::StorageError>;

    /// Replace a project's schema in one transaction.
    ///
    /// Existing relations, columns and models for the project are deleted
    /// (dependents first) and the given rows inserted. Either everything
    /// commits or nothing changes.
    async fn replace_schema(
        &self,
        project_id: Uuid,
        models: &[Model],
        columns: &[ModelColumn],
        relations: &[Relation],
    ) -> Result<(), super::StorageError>;
}
