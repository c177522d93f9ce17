use super::diagram::RelationType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Persisted model row, one per imported table.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Model {
    pub id: Uuid,
    pub project_id: Uuid,
    pub reference_name: String,
    pub display_name: String,
    pub source_table_name: String,
    #[schema(value_type = Object)]
    pub properties: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl Model {
    pub fn new(
        project_id: Uuid,
        reference_name: String,
        display_name: String,
        source_table_name: String,
        properties: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id,
            reference_name,
            display_name,
            source_table_name,
            properties,
            created_at: Utc::now(),
        }
    }
}

/// Persisted column row attached to a model.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ModelColumn {
    pub id: Uuid,
    pub model_id: Uuid,
    pub reference_name: String,
    pub source_column_name: String,
    pub column_type: String,
    pub is_pk: bool,
    /// Imports cannot tell nullability from a diagram, so this stays false
    pub not_null: bool,
    #[schema(value_type = Object)]
    pub properties: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl ModelColumn {
    pub fn new(
        model_id: Uuid,
        reference_name: String,
        source_column_name: String,
        column_type: String,
        is_pk: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            model_id,
            reference_name,
            source_column_name,
            column_type,
            is_pk,
            not_null: false,
            properties: serde_json::json!({}),
            created_at: Utc::now(),
        }
    }
}

/// Persisted relation row joining two columns of the same project.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Relation {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub from_column_id: Uuid,
    pub to_column_id: Uuid,
    pub join_type: RelationType,
    pub created_at: DateTime<Utc>,
}

impl Relation {
    pub fn new(
        project_id: Uuid,
        name: String,
        from_column_id: Uuid,
        to_column_id: Uuid,
        join_type: RelationType,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id,
            name,
            from_column_id,
            to_column_id,
            join_type,
            created_at: Utc::now(),
        }
    }
}
