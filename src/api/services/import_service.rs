//! Import reconciliation.
//!
//! Takes a parsed [`ImportPayload`] and replaces a project's schema with it:
//! validation first, then one atomic storage call that deletes the prior
//! schema and inserts the new rows. Reference names are resolved against
//! collision sets local to the call, so concurrent imports for different
//! projects never interfere.

use std::collections::{HashMap, HashSet};

use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{ImportPayload, ImportSummary, Model, ModelColumn, Project, Relation};
use crate::services::naming::{capitalize, sanitize_reference_name, unique_name};
use crate::storage::{SchemaStore, StorageError};

/// Type recorded for columns whose diagram field carried no type.
pub const UNKNOWN_TYPE: &str = "UNKNOWN";

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Import payload contains no tables")]
    NoTables,
    #[error("Every imported table needs a name")]
    MissingTableName,
    #[error("Duplicate table name in import: {0}")]
    DuplicateTableName(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Replace `project`'s schema with the payload's tables, columns and
/// relations, returning the inserted counts.
///
/// Validation failures surface before any write. The replace itself is a
/// single storage transaction: on failure the prior schema is untouched.
/// Relations whose endpoints do not resolve are dropped and counted, never
/// errored.
pub async fn import_payload(
    storage: &dyn SchemaStore,
    project: &Project,
    payload: ImportPayload,
) -> Result<ImportSummary, ImportError> {
    validate_payload(&payload)?;

    // Models, one per table, with reference names unique within this import.
    let mut used_model_names: HashSet<String> = HashSet::new();
    let mut model_by_table: HashMap<String, usize> = HashMap::new();
    let mut models: Vec<Model> = Vec::with_capacity(payload.tables.len());
    for table in &payload.tables {
        let seed = sanitize_reference_name(&table.name, "table");
        let reference_name = unique_name(&seed, &mut used_model_names);
        let mut properties = json!({ "table": table.name });
        if let Some(schema) = &project.schema_name {
            properties["schema"] = json!(schema);
        }
        if let Some(catalog) = &project.catalog_name {
            properties["catalog"] = json!(catalog);
        }
        model_by_table.insert(table.name.clone(), models.len());
        models.push(Model::new(
            project.id,
            reference_name,
            table.name.clone(),
            table.name.clone(),
            properties,
        ));
    }

    // Columns, de-duplicated by source name within each model. The first
    // occurrence of a name wins; later ones are dropped entirely.
    let mut columns: Vec<ModelColumn> = Vec::new();
    let mut column_by_key: HashMap<(Uuid, String), usize> = HashMap::new();
    for table in &payload.tables {
        let Some(&model_idx) = model_by_table.get(&table.name) else {
            continue;
        };
        let model_id = models[model_idx].id;
        let mut used_column_names: HashSet<String> = HashSet::new();
        let mut seen_sources: HashSet<String> = HashSet::new();
        for column in &table.columns {
            if column.name.trim().is_empty() {
                continue;
            }
            if !seen_sources.insert(column.name.clone()) {
                continue;
            }
            let seed = sanitize_reference_name(&column.name, "column");
            let reference_name = unique_name(&seed, &mut used_column_names);
            let column_type = column
                .column_type
                .clone()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_TYPE.to_string());
            column_by_key.insert((model_id, column.name.clone()), columns.len());
            columns.push(ModelColumn::new(
                model_id,
                reference_name,
                column.name.clone(),
                column_type,
                column.is_primary_key,
            ));
        }
    }

    // Relations. Unresolved endpoints are counted, not errored: the diagram
    // may reference tables that were filtered out or columns lost to the
    // per-model de-duplication above.
    let mut relations: Vec<Relation> = Vec::new();
    let mut used_relation_names: HashSet<String> = HashSet::new();
    let mut skipped_relations = 0usize;
    for relation in &payload.relations {
        let from_idx = resolve_column(
            &model_by_table,
            &models,
            &column_by_key,
            &relation.from_table,
            &relation.from_column,
        );
        let to_idx = resolve_column(
            &model_by_table,
            &models,
            &column_by_key,
            &relation.to_table,
            &relation.to_column,
        );
        let (Some(from_idx), Some(to_idx)) = (from_idx, to_idx) else {
            warn!(
                "[Import] Skipping relation {}.{} -> {}.{}: unresolved endpoint",
                relation.from_table, relation.from_column, relation.to_table, relation.to_column
            );
            skipped_relations += 1;
            continue;
        };
        let seed = format!(
            "{}{}{}{}",
            capitalize(&relation.from_table),
            capitalize(&columns[from_idx].reference_name),
            capitalize(&relation.to_table),
            capitalize(&columns[to_idx].reference_name)
        );
        let name = unique_name(&seed, &mut used_relation_names);
        relations.push(Relation::new(
            project.id,
            name,
            columns[from_idx].id,
            columns[to_idx].id,
            relation.relation_type,
        ));
    }

    let summary = ImportSummary {
        models: models.len(),
        columns: columns.len(),
        relations: relations.len(),
        skipped_relations,
    };

    storage
        .replace_schema(project.id, &models, &columns, &relations)
        .await?;

    info!(
        "[Import] Replaced schema for project {}: {} models, {} columns, {} relations ({} skipped)",
        project.id, summary.models, summary.columns, summary.relations, summary.skipped_relations
    );
    Ok(summary)
}

/// Resolve a payload table/column pair to an index into the column batch.
fn resolve_column(
    model_by_table: &HashMap<String, usize>,
    models: &[Model],
    column_by_key: &HashMap<(Uuid, String), usize>,
    table: &str,
    column: &str,
) -> Option<usize> {
    let model_id = models[*model_by_table.get(table)?].id;
    column_by_key.get(&(model_id, column.to_string())).copied()
}

/// Payload checks that run before anything is written.
fn validate_payload(payload: &ImportPayload) -> Result<(), ImportError> {
    if payload.tables.is_empty() {
        return Err(ImportError::NoTables);
    }
    let mut seen: HashSet<&str> = HashSet::new();
    for table in &payload.tables {
        if table.name.trim().is_empty() {
            return Err(ImportError::MissingTableName);
        }
        if !seen.insert(table.name.as_str()) {
            return Err(ImportError::DuplicateTableName(table.name.clone()));
        }
    }
    Ok(())
}
