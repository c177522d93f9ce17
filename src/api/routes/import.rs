//! Import routes for draw.io diagram imports.
//!
//! Two ways in: a pre-parsed [`ImportPayload`] straight from a client that
//! ran the parser itself, or raw markup that gets parsed server-side. Both
//! end in the same replace-schema import. A standalone parse endpoint lets
//! clients pre-validate markup without touching any project.

use axum::{
    Router,
    extract::{Path, State},
    response::Json,
    routing::post,
};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use super::app_state::AppState;
use super::error::ApiError;
use crate::models::{ImportPayload, ImportSummary};
use crate::services::{diagram_parser, import_service};

/// Upper bound for request bodies on the import routes.
pub const MAX_IMPORT_BYTES: usize = 5 * 1024 * 1024;

/// Request body carrying raw diagram markup.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DiagramMarkupRequest {
    pub markup: String,
}

/// Create the import router (project-scoped routes live on the projects
/// router and reuse the handlers below).
pub fn import_router() -> Router<AppState> {
    Router::new().route("/diagram/parse", post(parse_diagram))
}

/// POST /projects/{project_id}/import/diagram - Import a parsed diagram payload
#[utoipa::path(
    post,
    path = "/projects/{project_id}/import/diagram",
    tag = "Import",
    params(
        ("project_id" = Uuid, Path, description = "Project to replace the schema of")
    ),
    request_body = ImportPayload,
    responses(
        (status = 200, description = "Schema replaced", body = ImportSummary),
        (status = 400, description = "Payload failed validation"),
        (status = 404, description = "Project not found"),
        (status = 500, description = "Import failed, no changes persisted")
    )
)]
pub async fn import_diagram(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<ImportPayload>,
) -> Result<Json<ImportSummary>, ApiError> {
    info!(
        "[Import] Diagram payload import for project {} ({} tables, {} relations)",
        project_id,
        payload.tables.len(),
        payload.relations.len()
    );

    let project = state.storage.get_project(project_id).await?;
    let summary = import_service::import_payload(state.storage.as_ref(), &project, payload).await?;

    Ok(Json(summary))
}

/// POST /projects/{project_id}/import/diagram/text - Import raw diagram markup
#[utoipa::path(
    post,
    path = "/projects/{project_id}/import/diagram/text",
    tag = "Import",
    params(
        ("project_id" = Uuid, Path, description = "Project to replace the schema of")
    ),
    request_body = DiagramMarkupRequest,
    responses(
        (status = 200, description = "Schema replaced", body = ImportSummary),
        (status = 400, description = "Markup empty, malformed or too large"),
        (status = 404, description = "Project not found"),
        (status = 500, description = "Import failed, no changes persisted")
    )
)]
pub async fn import_diagram_text(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(request): Json<DiagramMarkupRequest>,
) -> Result<Json<ImportSummary>, ApiError> {
    let markup = sanitize_markup(request.markup)?;
    info!(
        "[Import] Diagram markup import for project {} ({} bytes)",
        project_id,
        markup.len()
    );

    let payload = diagram_parser::parse(&markup)?;
    let project = state.storage.get_project(project_id).await?;
    let summary = import_service::import_payload(state.storage.as_ref(), &project, payload).await?;

    Ok(Json(summary))
}

/// POST /import/diagram/parse - Parse diagram markup without importing
#[utoipa::path(
    post,
    path = "/import/diagram/parse",
    tag = "Import",
    request_body = DiagramMarkupRequest,
    responses(
        (status = 200, description = "Parsed payload", body = ImportPayload),
        (status = 400, description = "Markup empty, malformed or too large")
    )
)]
pub async fn parse_diagram(
    Json(request): Json<DiagramMarkupRequest>,
) -> Result<Json<ImportPayload>, ApiError> {
    let markup = sanitize_markup(request.markup)?;
    let payload = diagram_parser::parse(&markup)?;

    info!(
        "[Import] Parsed markup into {} tables and {} relations",
        payload.tables.len(),
        payload.relations.len()
    );

    Ok(Json(payload))
}

/// Strip NUL bytes and enforce the markup size cap.
fn sanitize_markup(markup: String) -> Result<String, ApiError> {
    let markup = markup.replace('\x00', "");
    if markup.len() > MAX_IMPORT_BYTES {
        return Err(ApiError::bad_request(
            "Diagram markup exceeds the import size limit",
        ));
    }
    Ok(markup)
}
