//! Project routes: creation, lookup and schema read-back.

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use super::app_state::AppState;
use super::error::ApiError;
use super::import;
use crate::models::Project;

/// Request body for creating a project.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(default)]
    pub schema_name: Option<String>,
    #[serde(default)]
    pub catalog_name: Option<String>,
}

/// Create the projects router.
pub fn projects_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_project).get(list_projects))
        .route("/{project_id}", get(get_project))
        .route("/{project_id}/schema", get(get_project_schema))
        .route("/{project_id}/import/diagram", post(import::import_diagram))
        .route(
            "/{project_id}/import/diagram/text",
            post(import::import_diagram_text),
        )
}

/// POST /projects - Create a new project
#[utoipa::path(
    post,
    path = "/projects",
    tag = "Projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = Project),
        (status = 400, description = "Invalid project name")
    )
)]
pub async fn create_project(
    State(state): State<AppState>,
    Json(request): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    if request.name.trim().is_empty() {
        return Err(ApiError::bad_request("Project name cannot be empty"));
    }

    let project = Project::new(request.name, request.schema_name, request.catalog_name);
    state.storage.create_project(&project).await?;

    info!("[Projects] Created project {} ({})", project.name, project.id);
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /projects - List all projects
#[utoipa::path(
    get,
    path = "/projects",
    tag = "Projects",
    responses(
        (status = 200, description = "All projects", body = Vec<Project>)
    )
)]
pub async fn list_projects(State(state): State<AppState>) -> Result<Json<Vec<Project>>, ApiError> {
    let projects = state.storage.list_projects().await?;
    Ok(Json(projects))
}

/// GET /projects/{project_id} - Get a single project
#[utoipa::path(
    get,
    path = "/projects/{project_id}",
    tag = "Projects",
    params(
        ("project_id" = Uuid, Path, description = "Project id")
    ),
    responses(
        (status = 200, description = "The project", body = Project),
        (status = 404, description = "Project not found")
    )
)]
pub async fn get_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Project>, ApiError> {
    let project = state.storage.get_project(project_id).await?;
    Ok(Json(project))
}

/// GET /projects/{project_id}/schema - Read back the imported schema
#[utoipa::path(
    get,
    path = "/projects/{project_id}/schema",
    tag = "Projects",
    params(
        ("project_id" = Uuid, Path, description = "Project id")
    ),
    responses(
        (status = 200, description = "Project with its models, columns and relations"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn get_project_schema(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let project = state.storage.get_project(project_id).await?;
    let models = state.storage.list_models(project_id).await?;
    let columns = state.storage.list_columns(project_id).await?;
    let relations = state.storage.list_relations(project_id).await?;

    Ok(Json(json!({
        "project": project,
        "models": models,
        "columns": columns,
        "relations": relations,
    })))
}
