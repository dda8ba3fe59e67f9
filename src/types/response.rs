//! Response envelopes for the user endpoints.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{User, UserRecord};

/// Body of `GET /users`: one arbitrary live user, or `null` when empty
#[derive(Debug, Serialize, ToSchema)]
pub struct ListResponse {
    #[serde(rename = "List")]
    pub list: Option<UserRecord>,
}

impl From<Option<User>> for ListResponse {
    fn from(user: Option<User>) -> Self {
        Self {
            list: user.map(UserRecord::from),
        }
    }
}

/// Body of a successful create: the new user's email
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedResponse {
    #[serde(rename = "New user")]
    #[schema(example = "a@x.com")]
    pub new_user: String,
}

impl From<User> for CreatedResponse {
    fn from(user: User) -> Self {
        Self {
            new_user: user.email,
        }
    }
}

/// Status-only body
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusMessage {
    #[schema(example = "User is deleted")]
    pub status: String,
}

impl StatusMessage {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
        }
    }
}
