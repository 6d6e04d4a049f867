//! Login and logout for the admin gate.

use askama::Template;
use axum::{
    Form, Router,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::Result;
use crate::filters;
use crate::middleware::auth::{is_authenticated, log_in, log_out};
use crate::middleware::login_rate_limiter;
use crate::routes::render;
use crate::state::AppState;

/// Shown for a wrong or empty password.
pub const INCORRECT_PASSWORD: &str = "Incorrect password. Please try again.";

/// Login page template.
#[derive(Template)]
#[template(path = "auth/login.html")]
struct LoginPageTemplate {
    error: Option<&'static str>,
}

/// Login form submission.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub password: String,
}

/// Build the auth router.
pub fn router(limit_login: bool) -> Router<AppState> {
    let submit = if limit_login {
        post(login).layer(login_rate_limiter())
    } else {
        post(login)
    };

    Router::new()
        .route("/auth/login", get(login_page).merge(submit))
        .route("/auth/logout", post(logout))
}

/// Render the login page, or skip it when already logged in.
///
/// GET /auth/login
async fn login_page(session: Session) -> Result<Response> {
    if is_authenticated(&session).await {
        return Ok(Redirect::to("/products").into_response());
    }
    Ok(render(&LoginPageTemplate { error: None })?.into_response())
}

/// Check the password and open the gate.
///
/// POST /auth/login
async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    if !state.config().password_matches(&form.password) {
        tracing::warn!("Admin login rejected");
        return Ok(render(&LoginPageTemplate {
            error: Some(INCORRECT_PASSWORD),
        })?
        .into_response());
    }

    log_in(&session).await?;
    tracing::info!("Admin logged in");
    Ok(Redirect::to("/products").into_response())
}

/// Close the gate.
///
/// POST /auth/logout
async fn logout(session: Session) -> Result<Redirect> {
    log_out(&session).await?;
    tracing::info!("Admin logged out");
    Ok(Redirect::to("/auth/login"))
}
