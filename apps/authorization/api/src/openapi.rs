use axum::{Json, Router, routing::get};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    info(
        title = "Authorization API",
        version = "0.1.0",
        description = "User lifecycle management and login by id"
    ),
    nest(
        (path = "/v1", api = domain_users::handlers::ApiDoc)
    )
)]
pub struct ApiDoc;

/// `GET /api-docs/openapi.json`
pub fn router() -> Router {
    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { Json(ApiDoc::openapi()) }),
    )
}
