use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub name: &'static str,
    pub version: &'static str,
}

async fn health_handler(State(info): State<(&'static str, &'static str)>) -> Json<HealthResponse> {
    let (name, version) = info;
    Json(HealthResponse {
        status: "healthy",
        name,
        version,
    })
}

/// `GET /health` liveness endpoint reporting the service name and version.
///
/// ```ignore
/// let app = api_routes.merge(health_router(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")));
/// ```
pub fn health_router(name: &'static str, version: &'static str) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state((name, version))
}
