//! Unified error handling for admin.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Boxed cause of a failed hosted-service operation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Application-level error type for the admin API.
#[derive(Debug, Error)]
pub enum AppError {
    /// A hosted-service call failed. Clients only see the action.
    #[error("Failed to {action}")]
    Operation {
        action: String,
        #[source]
        source: BoxError,
    },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated, or supplied the wrong credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Wrap a hosted-service failure as "Failed to {action}".
    pub fn operation(action: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Operation {
            action: action.into(),
            source: source.into(),
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Operation { .. } => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the client.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Operation { action, .. } => format!("Failed to {action}"),
            Self::NotFound(msg) | Self::Unauthorized(msg) | Self::BadRequest(msg) => msg.clone(),
            Self::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        match &self {
            Self::Operation { action, source } => {
                let event_id = sentry::capture_error(&self);
                tracing::error!(
                    action = %action,
                    error = %source,
                    sentry_event_id = %event_id,
                    "Hosted service operation failed"
                );
            }
            Self::Internal(detail) => {
                let event_id = sentry::capture_error(&self);
                tracing::error!(
                    error = %detail,
                    sentry_event_id = %event_id,
                    "Admin request error"
                );
            }
            _ => {}
        }

        let body = Json(json!({ "error": self.public_message() }));
        (self.status(), body).into_response()
    }
}

/// Attach an action to a failing hosted-service result.
pub trait OperationContext<T> {
    /// Map the error to [`AppError::Operation`] for `action`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Operation` if `self` is an error.
    fn context(self, action: &str) -> Result<T, AppError>;
}

impl<T, E> OperationContext<T> for Result<T, E>
where
    E: Into<BoxError>,
{
    fn context(self, action: &str) -> Result<T, AppError> {
        self.map_err(|e| AppError::operation(action, e))
    }
}

/// Set the Sentry user context for the signed-in admin.
pub fn set_sentry_user(uid: &str, email: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(uid.to_string()),
            email: Some(email.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::StoreError;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("booking -Nx1".to_string());
        assert_eq!(err.to_string(), "Not found: booking -Nx1");

        let err = AppError::operation("load bookings", StoreError::Unavailable);
        assert_eq!(err.to_string(), "Failed to load bookings");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::operation("delete banner", StoreError::Unavailable)),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_operation_hides_cause() {
        let err = AppError::operation(
            "load users",
            StoreError::Api {
                status: 500,
                message: "secret internals".to_string(),
            },
        );
        let body = body_json(err.into_response()).await;
        assert_eq!(body, json!({"error": "Failed to load users"}));
    }

    #[tokio::test]
    async fn test_bad_request_shows_message() {
        let body = body_json(AppError::BadRequest("Title is required".to_string()).into_response()).await;
        assert_eq!(body, json!({"error": "Title is required"}));
    }

    #[test]
    fn test_context_maps_error() {
        let result: Result<(), StoreError> = Err(StoreError::Unauthorized);
        let err = result.context("update booking status").unwrap_err();
        assert!(matches!(err, AppError::Operation { ref action, .. } if action == "update booking status"));
    }
}
