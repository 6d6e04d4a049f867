//! Contact (feedback) form route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use knots_folds_client::queries;
use knots_folds_core::validation::{ContactForm, ContactFormErrors};
use tracing::instrument;

use crate::error::{add_breadcrumb, report_backend_failure};
use crate::state::AppState;

/// Shown when the backend rejects or cannot take the message.
pub const FEEDBACK_FAILED: &str = "Something went wrong. Please try again.";

/// Everything the contact form partial needs.
#[derive(Debug, Clone, Default)]
pub struct ContactFormView {
    pub form: ContactForm,
    pub errors: ContactFormErrors,
    pub failure: Option<&'static str>,
}

/// Contact form fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/contact_form.html")]
pub struct ContactFormTemplate {
    pub contact: ContactFormView,
}

/// Thank-you fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/contact_thanks.html")]
pub struct ContactThanksTemplate;

/// Render a blank contact form ("Leave another message").
///
/// GET /contact/new
pub async fn form() -> impl IntoResponse {
    ContactFormTemplate {
        contact: ContactFormView::default(),
    }
}

/// Validate and submit a feedback message.
///
/// POST /contact
#[instrument(skip_all)]
pub async fn submit(State(state): State<AppState>, Form(form): Form<ContactForm>) -> Response {
    let message = match form.validate() {
        Ok(message) => message,
        Err(errors) => {
            tracing::debug!(?errors, "Contact form rejected");
            return ContactFormTemplate {
                contact: ContactFormView {
                    form,
                    errors,
                    failure: None,
                },
            }
            .into_response();
        }
    };

    match queries::submit_contact_form(state.sync(), message).await {
        Ok(()) => {
            tracing::info!("Feedback received");
            add_breadcrumb("contact", "Submitted feedback");
            ContactThanksTemplate.into_response()
        }
        Err(err) => {
            report_backend_failure("submit_contact_form", &err);
            ContactFormTemplate {
                contact: ContactFormView {
                    form,
                    errors: ContactFormErrors::default(),
                    failure: Some(FEEDBACK_FAILED),
                },
            }
            .into_response()
        }
    }
}
