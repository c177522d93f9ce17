//! OpenAPI specification definition.
//!
//! Aggregates all route handlers and schemas for OpenAPI documentation generation.

use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Projects
        crate::routes::projects::create_project,
        crate::routes::projects::list_projects,
        crate::routes::projects::get_project,
        crate::routes::projects::get_project_schema,
        // Import
        crate::routes::import::import_diagram,
        crate::routes::import::import_diagram_text,
        crate::routes::import::parse_diagram,
        // OpenAPI
        crate::routes::openapi::serve_openapi_json,
    ),
    components(schemas(
        crate::models::ImportPayload,
        crate::models::DiagramTable,
        crate::models::DiagramColumn,
        crate::models::DiagramRelation,
        crate::models::RelationType,
        crate::models::ImportSummary,
        crate::models::Project,
        crate::models::Model,
        crate::models::ModelColumn,
        crate::models::Relation,
        crate::routes::import::DiagramMarkupRequest,
        crate::routes::projects::CreateProjectRequest,
    )),
    modifiers(&VersionAddon),
    tags(
        (name = "Projects", description = "Project management and schema read-back"),
        (name = "Import", description = "draw.io diagram import endpoints"),
        (name = "OpenAPI", description = "OpenAPI specification"),
    ),
    info(
        title = "Diagram Import API",
        description = "REST API that imports draw.io entity diagrams into project schemas",
        version = "1.0.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8081/api/v1", description = "Local development server")
    )
)]
pub struct ApiDoc;

struct VersionAddon;

impl Modify for VersionAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        // Keep the advertised version in sync with Cargo.toml
        openapi.info.version = env!("CARGO_PKG_VERSION").to_string();
    }
}
