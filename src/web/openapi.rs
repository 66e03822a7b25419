//! OpenAPI document for the file API.

use axum::Router;
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use super::dto::{FileRecordResponse, UploadForm, UploadResponse};
use super::handlers::files;

/// OpenAPI document.
#[derive(OpenApi)]
#[openapi(
    paths(
        files::upload_file,
        files::download_file,
        files::list_files,
        files::delete_file
    ),
    components(schemas(UploadForm, UploadResponse, FileRecordResponse)),
    modifiers(&BasicAuthScheme),
    tags((name = "files", description = "File storage with metadata tags"))
)]
pub struct ApiDoc;

struct BasicAuthScheme;

impl Modify for BasicAuthScheme {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)),
            );
        }
    }
}

/// Router serving Swagger UI and the raw OpenAPI JSON.
pub fn create_swagger_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
