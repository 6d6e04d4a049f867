//! Feedback tab: contact messages, newest first.

use askama::Template;
use axum::{
    Router,
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use knots_folds_client::queries;
use knots_folds_core::{ContactMessage, ContactMessageId};
use tracing::instrument;

use crate::error::{Result, report_backend_failure};
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::routes::{DashboardLayout, TableView, render};
use crate::state::AppState;

/// Shown when a delete is rejected.
pub const DELETE_FAILED: &str = "Failed to delete message. Make sure you are logged in as admin.";

/// Feedback row for the table.
#[derive(Debug, Clone)]
pub struct MessageRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: String,
}

impl From<&ContactMessage> for MessageRow {
    fn from(message: &ContactMessage) -> Self {
        Self {
            id: message.id.to_string(),
            name: message.name.clone(),
            email: message.email.clone(),
            message: message.message.clone(),
            created_at: message.created_at.to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "feedback/index.html")]
struct FeedbackPageTemplate {
    layout: DashboardLayout,
    table: TableView<MessageRow>,
}

#[derive(Template)]
#[template(path = "partials/feedback_table.html")]
struct FeedbackTableTemplate {
    table: TableView<MessageRow>,
}

/// Build the feedback router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/feedback", get(index))
        .route("/feedback/{id}/delete", post(delete))
        .route("/partials/feedback", get(table))
}

#[allow(clippy::redundant_closure)]
async fn load_table(state: &AppState) -> TableView<MessageRow> {
    let mut messages = queries::contact_messages(state.sync()).await;
    messages
        .data
        .sort_by(|a, b| b.created_at.cmp(&a.created_at));
    TableView::from_state(&messages, |message| MessageRow::from(message))
}

/// Feedback tab.
///
/// GET /feedback
#[instrument(skip_all)]
async fn index(_auth: RequireAdminAuth, State(state): State<AppState>) -> Result<Response> {
    let template = FeedbackPageTemplate {
        layout: DashboardLayout::load(&state, "/feedback").await,
        table: load_table(&state).await,
    };
    Ok(render(&template)?.into_response())
}

/// Feedback table fragment.
///
/// GET /partials/feedback
#[instrument(skip_all)]
async fn table(_auth: RequireAdminAuth, State(state): State<AppState>) -> Result<Response> {
    let template = FeedbackTableTemplate {
        table: load_table(&state).await,
    };
    Ok(render(&template)?.into_response())
}

/// Delete a message and return the refreshed table.
///
/// POST /feedback/{id}/delete
#[instrument(skip_all, fields(message_id = id))]
async fn delete(
    _auth: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Response> {
    let notice =
        match queries::delete_contact_message(state.sync(), ContactMessageId::new(id)).await {
            Ok(()) => {
                tracing::info!("Feedback deleted");
                None
            }
            Err(err) => {
                report_backend_failure("delete_contact_message", &err);
                Some(DELETE_FAILED.to_string())
            }
        };

    let template = FeedbackTableTemplate {
        table: load_table(&state).await.with_notice(notice),
    };
    Ok(render(&template)?.into_response())
}
