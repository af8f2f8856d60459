//! The error type every handler and use case returns, and how it is
//! rendered as a JSON response.
//!
//! Client mistakes keep their message. Infrastructure failures are logged
//! in full and rendered with a generic message.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bb8_redis::{bb8, redis};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use super::storage::StorageError;

const INTERNAL_ERROR_MSG: &str = "An internal server error occurred";
const UPLOAD_FAILED_MSG: &str = "Failed to upload the file";
const INVALID_MULTIPART_MSG: &str = "Invalid multipart form data";
const VALIDATION_FAILED_MSG: &str = "Validation failed";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Validation failed: {0}")]
    ValidationStr(String),

    #[error("Invalid request format: {0}")]
    RequestFormat(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A missing or ended session; `redirect_to` tells the client where to
    /// send the user next.
    #[error("Session required: {message}")]
    SessionRequired { message: String, redirect_to: String },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Storage operation failed")]
    Storage(#[from] StorageError),

    #[error("Sea ORM operation failed")]
    Database(#[from] sea_orm::DbErr),

    #[error("Redis operation failed")]
    Redis(#[from] redis::RedisError),

    #[error("Redis connection pool operation failed")]
    RedisPool(#[from] bb8::RunError<redis::RedisError>),

    #[error("Multipart operation failed")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("An internal server error occurred")]
    Internal,

    /// A server-side failure after which the client should leave the
    /// current page for `redirect_to`. The cause is logged where it occurs.
    #[error("Internal error, redirecting: {message}")]
    InternalRedirect { message: String, redirect_to: String },
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::RequestFormat(_) | AppError::Multipart(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) | AppError::ValidationStr(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthorized(_) | AppError::SessionRequired { .. } => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Storage(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_)
            | AppError::Redis(_)
            | AppError::RedisPool(_)
            | AppError::Internal
            | AppError::InternalRedirect { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn log(&self) {
        match self {
            AppError::Storage(err) => tracing::error!(error = ?err, "Storage failure"),
            AppError::Database(err) => tracing::error!(error = ?err, "Database failure"),
            AppError::Redis(err) | AppError::RedisPool(bb8::RunError::User(err)) => {
                tracing::error!(error = ?err, "Redis failure")
            },
            AppError::RedisPool(bb8::RunError::TimedOut) => tracing::error!("Redis connection pool timed out"),
            AppError::Multipart(err) => tracing::warn!(error = ?err, "Malformed multipart request"),
            _ => (),
        }
    }

    fn into_body(self) -> ErrorBody {
        let (message, details) = match self {
            AppError::Validation(err) => {
                let message = single_field_message(&err).unwrap_or_else(|| VALIDATION_FAILED_MSG.to_string());
                (message, Some(json!(err.field_errors())))
            },
            AppError::SessionRequired { message, redirect_to } | AppError::InternalRedirect { message, redirect_to } => {
                (message, Some(json!({ "redirect_to": redirect_to })))
            },
            AppError::ValidationStr(msg)
            | AppError::RequestFormat(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg) => (msg, None),
            AppError::Storage(_) => (UPLOAD_FAILED_MSG.to_string(), None),
            AppError::Multipart(_) => (INVALID_MULTIPART_MSG.to_string(), None),
            AppError::Database(_) | AppError::Redis(_) | AppError::RedisPool(_) | AppError::Internal => {
                (INTERNAL_ERROR_MSG.to_string(), None)
            },
        };

        ErrorBody { message, details }
    }
}

/// The message of the only failing rule, when exactly one field failed.
fn single_field_message(errors: &validator::ValidationErrors) -> Option<String> {
    let fields = errors.field_errors();
    if fields.len() != 1 {
        return None;
    }

    let field_errors = fields.into_values().next()?;
    match field_errors.as_slice() {
        [only] => only.message.as_ref().map(|message| message.to_string()),
        _ => None,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status();

        (status, Json(self.into_body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::DbErr;
    use serde_json::Value;
    use validator::{ValidationError, ValidationErrors};

    use super::*;

    async fn render(error: AppError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_client_errors_keep_their_message() {
        let cases = [
            (AppError::RequestFormat("Invalid JSON format".to_string()), StatusCode::BAD_REQUEST),
            (AppError::ValidationStr("Avatar file too large (max 5MB)".to_string()), StatusCode::UNPROCESSABLE_ENTITY),
            (AppError::Unauthorized("Authentication required.".to_string()), StatusCode::UNAUTHORIZED),
            (AppError::Forbidden("Access denied".to_string()), StatusCode::FORBIDDEN),
            (AppError::NotFound("Profile not found".to_string()), StatusCode::NOT_FOUND),
        ];

        for (error, expected) in cases {
            let expected_message = match &error {
                AppError::RequestFormat(m)
                | AppError::ValidationStr(m)
                | AppError::Unauthorized(m)
                | AppError::Forbidden(m)
                | AppError::NotFound(m) => m.clone(),
                _ => unreachable!(),
            };
            let (status, json) = render(error).await;

            assert_eq!(status, expected);
            assert_eq!(json["message"], expected_message);
            assert!(json.get("details").is_none());
        }
    }

    #[tokio::test]
    async fn test_validation_error_lists_fields() {
        let mut errors = ValidationErrors::new();
        let mut name_error = ValidationError::new("blank");
        name_error.message = Some("Please enter a valid name.".into());
        errors.add("full_name", name_error);

        let (status, json) = render(AppError::Validation(errors)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["message"], "Please enter a valid name.");
        assert_eq!(json["details"]["full_name"][0]["message"], "Please enter a valid name.");
    }

    #[tokio::test]
    async fn test_validation_error_with_several_fields_is_generic() {
        let mut errors = ValidationErrors::new();
        let mut name_error = ValidationError::new("blank");
        name_error.message = Some("Please enter a valid name.".into());
        errors.add("full_name", name_error);
        errors.add("email", ValidationError::new("email"));

        let (status, json) = render(AppError::Validation(errors)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["message"], VALIDATION_FAILED_MSG);
        assert!(json["details"]["email"].is_array());
    }

    #[tokio::test]
    async fn test_validation_error_without_message_is_generic() {
        let mut errors = ValidationErrors::new();
        errors.add("full_name", ValidationError::new("length"));

        let (_, json) = render(AppError::Validation(errors)).await;

        assert_eq!(json["message"], VALIDATION_FAILED_MSG);
    }

    #[tokio::test]
    async fn test_session_required_carries_redirect() {
        let error = AppError::SessionRequired {
            message: "Session has ended".to_string(),
            redirect_to: "/login".to_string(),
        };
        let (status, json) = render(error).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["message"], "Session has ended");
        assert_eq!(json["details"]["redirect_to"], "/login");
    }

    #[tokio::test]
    async fn test_internal_redirect_carries_target() {
        let error = AppError::InternalRedirect {
            message: "Your profile could not be set up".to_string(),
            redirect_to: "/dashboard".to_string(),
        };
        let (status, json) = render(error).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["message"], "Your profile could not be set up");
        assert_eq!(json["details"]["redirect_to"], "/dashboard");
    }

    #[tokio::test]
    async fn test_storage_error_is_generic() {
        let (status, json) = render(AppError::Storage(StorageError::Unknown)).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["message"], UPLOAD_FAILED_MSG);
    }

    #[tokio::test]
    async fn test_infrastructure_errors_are_masked() {
        let redis_error = redis::RedisError::from((redis::ErrorKind::TypeError, "Type error"));
        let errors = [
            AppError::Database(DbErr::Custom("relation \"profiles\" does not exist".to_string())),
            AppError::Redis(redis_error),
            AppError::RedisPool(bb8::RunError::TimedOut),
            AppError::Internal,
        ];

        for error in errors {
            let (status, json) = render(error).await;

            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(json["message"], INTERNAL_ERROR_MSG);
            assert!(json.get("details").is_none());
        }
    }
}
