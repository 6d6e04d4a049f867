//! Product showcase route handlers.
//!
//! The showcase lists the live catalogue from the backend. While the
//! backend connection is still being established the grid renders a
//! skeleton that polls itself; an empty catalogue falls back to the
//! static category cards.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use knots_folds_client::{QueryState, queries};
use knots_folds_core::Product;
use tracing::instrument;

use crate::filters;
use crate::state::AppState;

/// A category card shown when the catalogue is empty.
#[derive(Debug, Clone, Copy)]
pub struct CategoryCard {
    pub category: &'static str,
    pub description: &'static str,
    pub badge: Option<&'static str>,
}

/// The handmade ranges, in display order.
pub const CATEGORY_CARDS: &[CategoryCard] = &[
    CategoryCard {
        category: "Woolen Toys",
        description: "Adorable handcrafted stuffed animals and toys made from the softest wool. \
                      Perfect gifts for little ones that will be treasured for years.",
        badge: Some("Bestseller"),
    },
    CategoryCard {
        category: "Knitted Headbands",
        description: "Cozy and stylish headbands knitted with care. Available in a variety of \
                      colors and patterns to keep you warm and fashionable.",
        badge: Some("New"),
    },
    CategoryCard {
        category: "Woolen Accessories",
        description: "Scarves, mittens, keychains, and more, each piece uniquely crafted with \
                      love. Small details that make a big difference.",
        badge: None,
    },
];

/// Product display data for the showcase grid.
#[derive(Debug, Clone)]
pub struct ProductCardView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub category: String,
    pub image_url: Option<String>,
    pub in_stock: bool,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            category: product.category.clone(),
            image_url: Some(product.image_url.trim())
                .filter(|url| !url.is_empty())
                .map(String::from),
            in_stock: product.in_stock(),
        }
    }
}

/// Everything the showcase partial needs.
#[derive(Debug, Clone)]
pub struct ShowcaseView {
    pub products: Vec<ProductCardView>,
    /// Nothing cached yet; render the skeleton.
    pub is_loading: bool,
    /// A read is still pending; keep polling even if cached cards are shown.
    pub is_refreshing: bool,
    pub is_error: bool,
}

impl ShowcaseView {
    /// Build the view from the products read.
    #[must_use]
    pub fn from_state(state: &QueryState<Vec<Product>>) -> Self {
        Self {
            products: state.data.iter().map(ProductCardView::from).collect(),
            is_loading: state.is_loading && state.data.is_empty(),
            is_refreshing: state.is_loading,
            is_error: state.is_error,
        }
    }

    /// Load the showcase through the query cache.
    pub async fn load(state: &AppState) -> Self {
        Self::from_state(&queries::products(state.sync()).await)
    }

    /// Nothing to list and nothing pending: show the category cards.
    #[must_use]
    pub const fn shows_categories(&self) -> bool {
        !self.is_loading && !self.is_error && self.products.is_empty()
    }

    #[must_use]
    pub const fn categories(&self) -> &'static [CategoryCard] {
        CATEGORY_CARDS
    }
}

/// Showcase fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/showcase.html")]
pub struct ShowcaseTemplate {
    pub showcase: ShowcaseView,
}

/// Render the product grid fragment.
///
/// GET /products/showcase
#[instrument(skip(state))]
pub async fn showcase(State(state): State<AppState>) -> impl IntoResponse {
    ShowcaseTemplate {
        showcase: ShowcaseView::load(&state).await,
    }
}
