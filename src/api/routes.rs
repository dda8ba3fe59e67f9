//! Application route configuration.

use axum::{http::StatusCode, response::Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{health_routes, user_routes};
use super::openapi::ApiDoc;
use super::AppState;

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .merge(health_routes())
        // OpenAPI Swagger UI documentation
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // User directory
        .merge(user_routes())
        .fallback(route_not_found)
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Any path outside the route table
async fn route_not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Route not found" })))
}
