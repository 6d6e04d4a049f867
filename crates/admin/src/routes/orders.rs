//! Orders tab: newest-first order table with an inline status select.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use knots_folds_client::queries;
use knots_folds_core::{Order, OrderId, OrderStatus};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result, report_backend_failure};
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::routes::{DashboardLayout, TableView, render};
use crate::state::AppState;

/// One entry of a row's status select.
#[derive(Debug, Clone, Copy)]
pub struct StatusOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Order row for the table.
#[derive(Debug, Clone)]
pub struct OrderRow {
    pub id: String,
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub product_id: String,
    pub quantity: u32,
    pub created_at: String,
    pub status: OrderStatus,
    pub statuses: Vec<StatusOption>,
}

impl From<&Order> for OrderRow {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            customer_name: order.customer_name.clone(),
            phone: order.phone.clone(),
            address: order.address.clone(),
            product_id: order.product_id.to_string(),
            quantity: order.quantity,
            created_at: order.created_at.to_string(),
            status: order.status,
            statuses: OrderStatus::ALL
                .iter()
                .map(|status| StatusOption {
                    value: status.as_str(),
                    label: status.label(),
                    selected: *status == order.status,
                })
                .collect(),
        }
    }
}

/// Status select submission.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

#[derive(Template)]
#[template(path = "orders/index.html")]
struct OrdersPageTemplate {
    layout: DashboardLayout,
    table: TableView<OrderRow>,
}

#[derive(Template)]
#[template(path = "partials/orders_table.html")]
struct OrdersTableTemplate {
    table: TableView<OrderRow>,
}

/// Build the orders router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(index))
        .route("/orders/{id}/status", post(update_status))
        .route("/partials/orders", get(table))
}

#[allow(clippy::redundant_closure)]
async fn load_table(state: &AppState) -> TableView<OrderRow> {
    let orders = queries::orders(state.sync()).await;
    TableView::from_state(&orders, |order| OrderRow::from(order))
}

/// Orders tab.
///
/// GET /orders
#[instrument(skip_all)]
async fn index(_auth: RequireAdminAuth, State(state): State<AppState>) -> Result<Response> {
    let template = OrdersPageTemplate {
        layout: DashboardLayout::load(&state, "/orders").await,
        table: load_table(&state).await,
    };
    Ok(render(&template)?.into_response())
}

/// Orders table fragment.
///
/// GET /partials/orders
#[instrument(skip_all)]
async fn table(_auth: RequireAdminAuth, State(state): State<AppState>) -> Result<Response> {
    let template = OrdersTableTemplate {
        table: load_table(&state).await,
    };
    Ok(render(&template)?.into_response())
}

/// Move an order to any status and return the refreshed table.
///
/// POST /orders/{id}/status
#[instrument(skip_all, fields(order_id = id, status = %form.status))]
async fn update_status(
    _auth: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Form(form): Form<StatusForm>,
) -> Result<Response> {
    let status = form
        .status
        .parse::<OrderStatus>()
        .map_err(AppError::BadRequest)?;
    let id = OrderId::new(id);

    let notice = match queries::update_order_status(state.sync(), id, status).await {
        Ok(()) => {
            tracing::info!("Order status updated");
            None
        }
        Err(err) => {
            report_backend_failure("update_order_status", &err);
            Some(format!(
                "Failed to update order #{id}. Make sure you are logged in as admin."
            ))
        }
    };

    let template = OrdersTableTemplate {
        table: load_table(&state).await.with_notice(notice),
    };
    Ok(render(&template)?.into_response())
}

#[cfg(test)]
mod tests {
    use knots_folds_core::{ProductId, Timestamp};

    use super::*;

    #[test]
    fn test_row_selects_current_status() {
        let order = Order {
            id: OrderId::new(42),
            customer_name: "Asha".into(),
            phone: "+91 98765 43210".into(),
            address: "12 Lake Road".into(),
            product_id: ProductId::new(3),
            quantity: 2,
            status: OrderStatus::Shipped,
            created_at: Timestamp::from_nanos(0),
        };

        let row = OrderRow::from(&order);
        assert_eq!(row.id, "42");
        assert_eq!(row.statuses.len(), 5);
        let selected: Vec<_> = row
            .statuses
            .iter()
            .filter(|option| option.selected)
            .map(|option| option.value)
            .collect();
        assert_eq!(selected, vec!["shipped"]);
    }
}
