//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::filters;
use crate::routes::contact::ContactFormView;
use crate::routes::products::ShowcaseView;
use crate::state::AppState;

/// A short icon + title + line card (about values, contact topics).
#[derive(Debug, Clone, Copy)]
pub struct Highlight {
    pub icon: &'static str,
    pub title: &'static str,
    pub text: &'static str,
}

/// Values listed in the "Our Story" section.
pub const VALUES: &[Highlight] = &[
    Highlight {
        icon: "🌿",
        title: "Natural Materials",
        text: "Premium, ethically sourced wool",
    },
    Highlight {
        icon: "✋",
        title: "Handcrafted",
        text: "Every stitch made by hand",
    },
    Highlight {
        icon: "💜",
        title: "Made with Love",
        text: "Family tradition & care",
    },
    Highlight {
        icon: "🎁",
        title: "Unique Pieces",
        text: "No two items are the same",
    },
];

/// Reasons to get in touch, next to the feedback form.
pub const CONTACT_TOPICS: &[Highlight] = &[
    Highlight {
        icon: "🧶",
        title: "Custom Orders",
        text: "Have something specific in mind? We love creating one-of-a-kind pieces just for you.",
    },
    Highlight {
        icon: "🎁",
        title: "Gift Requests",
        text: "Looking for the perfect handmade gift? Tell us the occasion and we'll craft something special.",
    },
    Highlight {
        icon: "⭐",
        title: "Share Your Experience",
        text: "Received an order? We'd love to hear your feedback and see how we can improve.",
    },
];

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub showcase: ShowcaseView,
    pub contact: ContactFormView,
    pub values: &'static [Highlight],
    pub topics: &'static [Highlight],
}

/// Display the home page: hero, showcase, about and contact sections.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> impl IntoResponse {
    HomeTemplate {
        showcase: ShowcaseView::load(&state).await,
        contact: ContactFormView::default(),
        values: VALUES,
        topics: CONTACT_TOPICS,
    }
}
