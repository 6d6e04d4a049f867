//! Unified error handling with Sentry integration.
//!
//! Form handlers render validation and backend failures inline, so only
//! malformed requests end up as an `AppError`. Backend failures behind an
//! inline message are still reported through [`report_backend_failure`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use knots_folds_client::SyncError;
use thiserror::Error;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        (status, self.to_string()).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Record a failed backend write that the visitor sees as a generic message.
///
/// Remote failures go to Sentry; a missing connection is only logged since
/// it resolves itself once the backend comes up.
pub fn report_backend_failure(action: &'static str, err: &SyncError) {
    match err {
        SyncError::NotReady => {
            tracing::warn!(action, "Backend not ready, write rejected");
        }
        SyncError::RemoteCallFailed(_) => {
            let event_id = sentry::capture_error(err);
            tracing::error!(
                action,
                error = %err,
                sentry_event_id = %event_id,
                "Backend write failed"
            );
        }
    }
}

/// Add a breadcrumb for visitor actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str) {
    sentry::add_breadcrumb(sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::BadRequest("product_id must be a number".to_string());
        assert_eq!(err.to_string(), "Bad request: product_id must be a number");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            AppError::NotFound("test".to_string()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::BadRequest("test".to_string())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
    }
}
