//! Unified error handling for admin.
//!
//! Table and form handlers show backend failures inline; an `AppError` is
//! only produced for malformed requests and for session or template
//! failures, which are reported to Sentry.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use knots_folds_client::SyncError;
use thiserror::Error;

/// Application-level error type for the admin panel.
#[derive(Debug, Error)]
pub enum AppError {
    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Template rendering failed.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Session(_) | Self::Template(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        let status = match &self {
            Self::Session(_) | Self::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Session(_) | Self::Template(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Record a failed backend call that the admin sees as an inline message.
pub fn report_backend_failure(action: &'static str, err: &SyncError) {
    match err {
        SyncError::NotReady => {
            tracing::warn!(action, "Backend not ready, admin action rejected");
        }
        SyncError::RemoteCallFailed(_) => {
            let event_id = sentry::capture_error(err);
            tracing::error!(
                action,
                error = %err,
                sentry_event_id = %event_id,
                "Admin backend call failed"
            );
        }
    }
}
