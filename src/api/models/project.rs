use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Project {
    pub fn new(name: String, schema_name: Option<String>, catalog_name: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            schema_name,
            catalog_name,
            created_at: Utc::now(),
        }
    }
}
