use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Parsed form of a draw.io diagram: the exact JSON accepted by the
/// payload import endpoint and produced by the parse endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ImportPayload {
    #[serde(default)]
    pub tables: Vec<DiagramTable>,
    #[serde(default)]
    pub relations: Vec<DiagramRelation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiagramTable {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<DiagramColumn>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiagramColumn {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub column_type: Option<String>,
    /// Latched: once any field sets it for a column name it stays set
    #[serde(default)]
    pub is_primary_key: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiagramRelation {
    pub from_table: String,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
    #[serde(rename = "type", default)]
    pub relation_type: RelationType,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationType {
    OneToOne,
    OneToMany,
    #[default]
    ManyToOne,
}

impl RelationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationType::OneToOne => "ONE_TO_ONE",
            RelationType::OneToMany => "ONE_TO_MANY",
            RelationType::ManyToOne => "MANY_TO_ONE",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ONE_TO_ONE" => Some(RelationType::OneToOne),
            "ONE_TO_MANY" => Some(RelationType::OneToMany),
            "MANY_TO_ONE" => Some(RelationType::ManyToOne),
            _ => None,
        }
    }
}

/// Counts reported back after a successful import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub models: usize,
    pub columns: usize,
    pub relations: usize,
    pub skipped_relations: usize,
}
