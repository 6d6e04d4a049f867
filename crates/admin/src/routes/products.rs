//! Products tab: catalogue table and the add/edit form.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use knots_folds_client::queries;
use knots_folds_core::validation::{ProductForm, ProductFormErrors};
use knots_folds_core::{Product, ProductId};
use tracing::instrument;

use crate::error::{AppError, Result, report_backend_failure};
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::routes::{DashboardLayout, TableView, render};
use crate::state::AppState;

/// Shown when a create or update is rejected.
pub const SAVE_FAILED: &str = "Failed to save product. Make sure you are logged in as admin.";

/// Shown when a delete is rejected.
pub const DELETE_FAILED: &str = "Failed to delete product. Make sure you are logged in as admin.";

/// Product row for the table.
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: String,
    pub stock_quantity: u64,
    pub in_stock: bool,
    pub image_url: Option<String>,
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            price: product.price.to_string(),
            stock_quantity: product.stock_quantity,
            in_stock: product.in_stock(),
            image_url: Some(product.image_url.trim())
                .filter(|url| !url.is_empty())
                .map(String::from),
        }
    }
}

/// Add/edit form state.
#[derive(Debug, Clone)]
pub struct ProductFormView {
    /// Product being edited, `None` when adding
    pub product_id: Option<ProductId>,
    pub form: ProductForm,
    pub errors: ProductFormErrors,
    pub failure: Option<&'static str>,
}

impl ProductFormView {
    fn new(product_id: Option<ProductId>, form: ProductForm) -> Self {
        Self {
            product_id,
            form,
            errors: ProductFormErrors::default(),
            failure: None,
        }
    }

    #[must_use]
    pub const fn is_editing(&self) -> bool {
        self.product_id.is_some()
    }

    #[must_use]
    pub fn action(&self) -> String {
        self.product_id
            .map_or_else(|| "/products".to_string(), |id| format!("/products/{id}"))
    }

    #[must_use]
    pub const fn title(&self) -> &'static str {
        if self.is_editing() {
            "✏️ Edit Product"
        } else {
            "➕ Add New Product"
        }
    }

    #[must_use]
    pub const fn submit_label(&self) -> &'static str {
        if self.is_editing() {
            "Save Changes"
        } else {
            "Add Product"
        }
    }
}

#[derive(Template)]
#[template(path = "products/index.html")]
struct ProductsPageTemplate {
    layout: DashboardLayout,
    table: TableView<ProductRow>,
}

#[derive(Template)]
#[template(path = "partials/products_table.html")]
struct ProductsTableTemplate {
    table: TableView<ProductRow>,
}

#[derive(Template)]
#[template(path = "products/form.html")]
struct ProductFormTemplate {
    view: ProductFormView,
}

#[derive(Template)]
#[template(path = "products/saved.html")]
struct ProductSavedTemplate {
    message: &'static str,
}

/// Build the products router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(index).post(create))
        .route("/products/new", get(new_form))
        .route("/products/{id}", post(update))
        .route("/products/{id}/edit", get(edit_form))
        .route("/products/{id}/delete", post(delete))
        .route("/partials/products", get(table))
}

#[allow(clippy::redundant_closure)]
async fn load_table(state: &AppState) -> TableView<ProductRow> {
    let products = queries::products(state.sync()).await;
    TableView::from_state(&products, |product| ProductRow::from(product))
}

/// Products tab.
///
/// GET /products
#[instrument(skip_all)]
async fn index(_auth: RequireAdminAuth, State(state): State<AppState>) -> Result<Response> {
    let template = ProductsPageTemplate {
        layout: DashboardLayout::load(&state, "/products").await,
        table: load_table(&state).await,
    };
    Ok(render(&template)?.into_response())
}

/// Products table fragment.
///
/// GET /partials/products
#[instrument(skip_all)]
async fn table(_auth: RequireAdminAuth, State(state): State<AppState>) -> Result<Response> {
    let template = ProductsTableTemplate {
        table: load_table(&state).await,
    };
    Ok(render(&template)?.into_response())
}

/// Blank add form.
///
/// GET /products/new
async fn new_form(_auth: RequireAdminAuth) -> Result<Response> {
    let template = ProductFormTemplate {
        view: ProductFormView::new(None, ProductForm::default()),
    };
    Ok(render(&template)?.into_response())
}

/// Edit form prefilled from the cached catalogue.
///
/// GET /products/{id}/edit
#[instrument(skip_all, fields(product_id = id))]
async fn edit_form(
    _auth: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Response> {
    let id = ProductId::new(id);
    let products = queries::products(state.sync()).await;
    let product = products
        .data
        .iter()
        .find(|product| product.id == id)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let template = ProductFormTemplate {
        view: ProductFormView::new(Some(id), ProductForm::from_product(product)),
    };
    Ok(render(&template)?.into_response())
}

/// Create a product.
///
/// POST /products
#[instrument(skip_all)]
async fn create(
    _auth: RequireAdminAuth,
    State(state): State<AppState>,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    save(&state, ProductFormView::new(None, form)).await
}

/// Update a product.
///
/// POST /products/{id}
#[instrument(skip_all, fields(product_id = id))]
async fn update(
    _auth: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    save(&state, ProductFormView::new(Some(ProductId::new(id)), form)).await
}

async fn save(state: &AppState, mut view: ProductFormView) -> Result<Response> {
    let draft = match view.form.validate() {
        Ok(draft) => draft,
        Err(errors) => {
            view.errors = errors;
            return Ok(render(&ProductFormTemplate { view })?.into_response());
        }
    };

    let saved = match view.product_id {
        Some(id) => queries::update_product(state.sync(), id, draft)
            .await
            .map(|()| "Product updated."),
        None => queries::create_product(state.sync(), draft)
            .await
            .map(|id| {
                tracing::info!(product_id = %id, "Product created");
                "Product added."
            }),
    };

    match saved {
        Ok(message) => Ok(render(&ProductSavedTemplate { message })?.into_response()),
        Err(err) => {
            report_backend_failure("save_product", &err);
            view.failure = Some(SAVE_FAILED);
            Ok(render(&ProductFormTemplate { view })?.into_response())
        }
    }
}

/// Delete a product and return the refreshed table.
///
/// POST /products/{id}/delete
#[instrument(skip_all, fields(product_id = id))]
async fn delete(
    _auth: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Response> {
    let notice = match queries::delete_product(state.sync(), ProductId::new(id)).await {
        Ok(()) => {
            tracing::info!("Product deleted");
            None
        }
        Err(err) => {
            report_backend_failure("delete_product", &err);
            Some(DELETE_FAILED.to_string())
        }
    };

    let template = ProductsTableTemplate {
        table: load_table(&state).await.with_notice(notice),
    };
    Ok(render(&template)?.into_response())
}

#[cfg(test)]
mod tests {
    use knots_folds_core::Price;

    use super::*;

    #[test]
    fn test_form_view_modes() {
        let adding = ProductFormView::new(None, ProductForm::default());
        assert_eq!(adding.action(), "/products");
        assert_eq!(adding.title(), "➕ Add New Product");
        assert_eq!(adding.submit_label(), "Add Product");

        let editing = ProductFormView::new(Some(ProductId::new(7)), ProductForm::default());
        assert_eq!(editing.action(), "/products/7");
        assert_eq!(editing.title(), "✏️ Edit Product");
        assert_eq!(editing.submit_label(), "Save Changes");
    }

    #[test]
    fn test_row_formats_price_and_stock() {
        let product = Product {
            id: ProductId::new(7),
            name: "Woolen Teddy Bear".into(),
            description: "Hand-knitted bear".into(),
            price: Price::parse("499").unwrap_or(Price::ZERO),
            stock_quantity: 0,
            image_url: String::new(),
            category: "Woolen Toys".into(),
        };
        let row = ProductRow::from(&product);
        assert_eq!(row.price, "₹499.00");
        assert!(!row.in_stock);
        assert!(row.image_url.is_none());
    }
}
