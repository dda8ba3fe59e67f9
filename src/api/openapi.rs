//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::OpenApi;

use crate::api::handlers::user_handler;
use crate::domain::{UserPayload, UserProfile, UserRecord};
use crate::types::{CreatedResponse, ListResponse, StatusMessage};

/// OpenAPI documentation for the user directory
#[derive(OpenApi)]
#[openapi(
    info(
        title = "User Directory",
        version = "0.1.0",
        description = "Create, read, update and delete user records",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development server")
    ),
    paths(
        user_handler::fetch_any_user,
        user_handler::get_user,
        user_handler::create_user,
        user_handler::update_user,
        user_handler::delete_user,
    ),
    components(
        schemas(
            UserPayload,
            UserProfile,
            UserRecord,
            ListResponse,
            CreatedResponse,
            StatusMessage,
        )
    ),
    tags(
        (name = "Users", description = "User directory endpoints")
    )
)]
pub struct ApiDoc;
