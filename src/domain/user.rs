//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::errors::{AppError, AppResult};

/// Wire order of the payload fields, used when reporting what is missing
const PAYLOAD_FIELDS: [&str; 4] = ["username", "email", "fname", "lname"];

/// User domain entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft delete timestamp (None = live, Some = deleted)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Build a fresh live user from a validated draft
    pub fn new(id: Uuid, draft: UserDraft) -> Self {
        let now = Utc::now();
        Self {
            id,
            username: draft.username,
            email: draft.email,
            first_name: draft.first_name,
            last_name: draft.last_name,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Check if user is live (not soft deleted)
    pub fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// Replace every mutable field with the draft's values.
    ///
    /// The draft's username is ignored; identity never changes.
    pub fn replace_details(&mut self, draft: UserDraft) {
        self.email = draft.email;
        self.first_name = draft.first_name;
        self.last_name = draft.last_name;
        self.updated_at = Utc::now();
    }

    /// Soft delete the user
    pub fn soft_delete(&mut self) {
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.updated_at = now;
    }
}

/// Request body for create and update.
///
/// Every field is optional at the serde level so that a missing key is
/// reported as a validation failure naming the field, not a parse error.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UserPayload {
    /// Unique login name
    #[validate(required, length(min = 1))]
    #[schema(example = "alice")]
    pub username: Option<String>,
    /// Email address
    #[validate(required, length(min = 1))]
    #[schema(example = "a@x.com")]
    pub email: Option<String>,
    /// First name
    #[serde(alias = "first_name")]
    #[validate(required, length(min = 1))]
    #[schema(example = "Alice")]
    pub fname: Option<String>,
    /// Last name
    #[serde(alias = "last_name")]
    #[validate(required, length(min = 1))]
    #[schema(example = "A")]
    pub lname: Option<String>,
}

impl UserPayload {
    /// Convenience constructor with every field present
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        fname: impl Into<String>,
        lname: impl Into<String>,
    ) -> Self {
        Self {
            username: Some(username.into()),
            email: Some(email.into()),
            fname: Some(fname.into()),
            lname: Some(lname.into()),
        }
    }
}

/// A payload that passed validation: all four fields present and non-empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl TryFrom<UserPayload> for UserDraft {
    type Error = AppError;

    fn try_from(payload: UserPayload) -> AppResult<Self> {
        payload
            .validate()
            .map_err(|e| AppError::validation(missing_fields_message(&e)))?;

        // validate() rejects any absent field, so the defaults are never taken
        Ok(Self {
            username: payload.username.unwrap_or_default(),
            email: payload.email.unwrap_or_default(),
            first_name: payload.fname.unwrap_or_default(),
            last_name: payload.lname.unwrap_or_default(),
        })
    }
}

/// Render a validation failure as a list of the offending fields, in wire order
pub fn missing_fields_message(errors: &ValidationErrors) -> String {
    let failed = errors.field_errors();
    let fields: Vec<&str> = PAYLOAD_FIELDS
        .iter()
        .copied()
        .filter(|name| failed.keys().any(|key| key.to_string() == *name))
        .collect();

    if fields.is_empty() {
        "Missing required fields".to_string()
    } else {
        format!("Missing required fields: {}", fields.join(", "))
    }
}

/// Single-user view returned by fetch and update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UserProfile {
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "a@x.com")]
    pub email: String,
    #[serde(rename = "first name")]
    #[schema(example = "Alice")]
    pub first_name: String,
    #[serde(rename = "last name")]
    #[schema(example = "A")]
    pub last_name: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

/// Full record view used by the fetch-any endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UserRecord {
    pub id: Uuid,
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "a@x.com")]
    pub email: String,
    #[schema(example = "Alice")]
    pub first_name: String,
    #[schema(example = "A")]
    pub last_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserRecord {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
