//! Admin gate: session flag, extractor, and login/logout transitions.
//!
//! The gate has two states. `LoggedOut` is the absence of the session flag;
//! `LoggedIn` is the flag set to `true` after a correct password.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

/// Session key holding the admin gate flag.
pub const AUTHENTICATED_KEY: &str = "kf_admin_authenticated";

/// Extractor that requires the admin gate to be open.
///
/// Page requests without the flag are redirected to the login page; HTMX
/// requests, table fragments and the event stream get 401 instead.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(_auth: RequireAdminAuth) -> impl IntoResponse {
///     "Welcome back"
/// }
/// ```
pub struct RequireAdminAuth;

/// Error returned when the admin gate is closed.
#[derive(Debug, PartialEq, Eq)]
pub enum AdminAuthRejection {
    /// Redirect to login page (for page requests).
    RedirectToLogin,
    /// Unauthorized response (for HTMX and streaming requests).
    Unauthorized,
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAdminAuth
where
    S: Send + Sync,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AdminAuthRejection::Unauthorized)?;

        if is_authenticated(session).await {
            Ok(Self)
        } else if wants_status_only(parts) {
            Err(AdminAuthRejection::Unauthorized)
        } else {
            Err(AdminAuthRejection::RedirectToLogin)
        }
    }
}

fn wants_status_only(parts: &Parts) -> bool {
    let path = parts.uri.path();
    parts.headers.contains_key("hx-request")
        || path.starts_with("/partials/")
        || path == "/events"
}

/// Whether the session carries the admin flag.
///
/// A session store failure counts as logged out.
pub async fn is_authenticated(session: &Session) -> bool {
    session
        .get::<bool>(AUTHENTICATED_KEY)
        .await
        .ok()
        .flatten()
        .unwrap_or(false)
}

/// `LoggedOut → LoggedIn`.
///
/// Cycles the session id before setting the flag so a pre-login cookie
/// cannot be reused.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn log_in(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(AUTHENTICATED_KEY, true).await
}

/// `LoggedIn → LoggedOut`.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn log_out(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<bool>(AUTHENTICATED_KEY).await?;
    Ok(())
}
