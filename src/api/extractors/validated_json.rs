//! Validated JSON extractor - Combines deserialization with validation.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::domain::user::missing_fields_message;
use crate::errors::AppError;

/// JSON extractor that rejects malformed or incomplete bodies with a
/// validation error before the handler runs.
///
/// # Example
///
/// ```rust,ignore
/// use user_directory::api::extractors::ValidatedJson;
/// use user_directory::domain::UserPayload;
///
/// async fn create_user(ValidatedJson(payload): ValidatedJson<UserPayload>) {
///     // every required field is present and non-empty
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;

        value
            .validate()
            .map_err(|e| AppError::validation(missing_fields_message(&e)))?;

        Ok(ValidatedJson(value))
    }
}
