//! Order form route handlers.
//!
//! The form is an HTMX fragment swapped into the order dialog. Invalid
//! input and backend failures re-render the form with the visitor's input
//! kept; a successful order swaps in the confirmation.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use knots_folds_client::queries;
use knots_folds_core::validation::{OrderForm, OrderFormErrors};
use knots_folds_core::{Product, ProductId};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb, report_backend_failure};
use crate::state::AppState;

/// Shown when the backend rejects or cannot take the order.
pub const ORDER_FAILED: &str = "Something went wrong placing your order. Please try again.";

/// Query parameters for the order form.
#[derive(Debug, Deserialize)]
pub struct OrderFormQuery {
    pub product_id: Option<String>,
}

/// One entry of the product select.
#[derive(Debug, Clone)]
pub struct ProductOption {
    pub id: String,
    pub label: String,
    pub selected: bool,
}

/// Everything the order form partial needs.
#[derive(Debug, Clone)]
pub struct OrderFormView {
    pub form: OrderForm,
    pub errors: OrderFormErrors,
    pub options: Vec<ProductOption>,
    pub products_loading: bool,
    pub failure: Option<&'static str>,
}

impl OrderFormView {
    async fn load(state: &AppState, form: OrderForm) -> Self {
        let products = queries::products(state.sync()).await;
        let options = product_options(&products.data, &form.product_id);
        Self {
            form,
            errors: OrderFormErrors::default(),
            options,
            products_loading: products.is_loading,
            failure: None,
        }
    }
}

fn product_options(products: &[Product], selected: &str) -> Vec<ProductOption> {
    products
        .iter()
        .map(|product| {
            let id = product.id.to_string();
            ProductOption {
                selected: id == selected.trim(),
                label: format!("{} - {}", product.name, product.price),
                id,
            }
        })
        .collect()
}

/// Order form fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/order_form.html")]
pub struct OrderFormTemplate {
    pub order: OrderFormView,
}

/// Order confirmation fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/order_placed.html")]
pub struct OrderPlacedTemplate {
    pub customer_name: String,
}

/// Render a blank order form, optionally with a product preselected.
///
/// GET /orders/new?product_id=
#[instrument(skip(state))]
pub async fn new_form(
    State(state): State<AppState>,
    Query(query): Query<OrderFormQuery>,
) -> Result<impl IntoResponse> {
    let product_id = query
        .product_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::parse::<ProductId>)
        .transpose()
        .map_err(|_| AppError::BadRequest("product_id must be a number".to_string()))?;

    Ok(OrderFormTemplate {
        order: OrderFormView::load(&state, OrderForm::new(product_id)).await,
    })
}

/// Validate and place an order.
///
/// POST /orders
#[instrument(skip_all, fields(product_id = %form.product_id))]
pub async fn place(State(state): State<AppState>, Form(form): Form<OrderForm>) -> Response {
    let new_order = match form.validate() {
        Ok(order) => order,
        Err(errors) => {
            tracing::debug!(?errors, "Order form rejected");
            let mut order = OrderFormView::load(&state, form).await;
            order.errors = errors;
            return OrderFormTemplate { order }.into_response();
        }
    };

    let customer_name = new_order.customer_name.clone();
    match queries::place_order(state.sync(), new_order).await {
        Ok(order_id) => {
            tracing::info!(order_id = %order_id, "Order placed");
            add_breadcrumb("order", "Placed order");
            OrderPlacedTemplate { customer_name }.into_response()
        }
        Err(err) => {
            report_backend_failure("place_order", &err);
            let mut order = OrderFormView::load(&state, form).await;
            order.failure = Some(ORDER_FAILED);
            OrderFormTemplate { order }.into_response()
        }
    }
}
