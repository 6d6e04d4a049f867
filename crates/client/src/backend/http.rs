//! HTTP binding to the backend JSON gateway.

use std::sync::Arc;

use async_trait::async_trait;
use knots_folds_core::validation::{NewContactMessage, NewOrder, ProductDraft};
use knots_folds_core::{
    ContactMessage, ContactMessageId, Order, OrderId, OrderStatus, Product, ProductId, UserRole,
};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use super::wire::{
    IdArgs, NoArgs, PlaceOrderArgs, ProductArgs, ProductIdArgs, SubmitContactArgs,
    UpdateOrderStatusArgs, WireContactMessage, WireOrder, WireProduct,
};
use super::{Backend, BackendError, BackendHandle, method, wire};
use crate::config::BackendConfig;

/// Maximum number of response body characters kept in errors and logs.
const ERROR_BODY_LIMIT: usize = 500;

/// Client for the backend gateway.
///
/// Every call is `POST {url}/call/{method}` with a JSON object of camelCase
/// arguments; the 2xx response body is the JSON result.
#[derive(Clone)]
pub struct HttpBackend {
    inner: Arc<HttpBackendInner>,
}

struct HttpBackendInner {
    client: reqwest::Client,
    config: BackendConfig,
}

impl HttpBackend {
    /// Create a client without contacting the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("knots-folds/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(HttpBackendInner { client, config }),
        })
    }

    /// Create a client and verify the gateway answers its status probe.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built or the probe fails.
    #[instrument(skip(config), fields(url = %config.url))]
    pub async fn connect(config: BackendConfig) -> Result<Self, BackendError> {
        let backend = Self::new(config)?;
        backend.probe().await?;
        debug!("Backend status probe succeeded");
        Ok(backend)
    }

    /// [`connect`](Self::connect), returning the shared handle the
    /// connection provider stores.
    ///
    /// # Errors
    ///
    /// Same as [`connect`](Self::connect).
    pub async fn connect_handle(config: BackendConfig) -> Result<BackendHandle, BackendError> {
        Ok(Arc::new(Self::connect(config).await?))
    }

    /// `GET {url}/status`; any 2xx counts as alive.
    async fn probe(&self) -> Result<(), BackendError> {
        let response = self
            .authorize(self.inner.client.get(self.inner.config.endpoint("status")))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: truncate(&body),
            });
        }
        Ok(())
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.inner.config.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    /// Perform one remote call and return the raw response body.
    #[instrument(skip(self, args))]
    async fn call<A: Serialize + Sync>(
        &self,
        method: &'static str,
        args: &A,
    ) -> Result<String, BackendError> {
        let url = self.inner.config.endpoint(&format!("call/{method}"));
        let response = self
            .authorize(self.inner.client.post(&url))
            .json(args)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                body = %truncate(&body),
                "Backend call returned non-success status"
            );
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: truncate(&body),
            });
        }

        debug!(status = status.as_u16(), bytes = body.len(), "Backend call succeeded");
        Ok(body)
    }

    async fn call_decode<A, R>(&self, method: &'static str, args: &A) -> Result<R, BackendError>
    where
        A: Serialize + Sync,
        R: DeserializeOwned,
    {
        let body = self.call(method, args).await?;
        wire::decode(method, &body).inspect_err(|e| {
            warn!(method, error = %e, body = %truncate(&body), "Failed to decode backend response");
        })
    }

    async fn call_list<W, T>(&self, method: &'static str) -> Result<Vec<T>, BackendError>
    where
        W: DeserializeOwned,
        T: TryFrom<W, Error = BackendError>,
    {
        let body = self.call(method, &NoArgs {}).await?;
        wire::decode_list::<W, T>(method, &body).inspect_err(|e| {
            warn!(method, error = %e, "Failed to decode backend list");
        })
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(ERROR_BODY_LIMIT).collect()
}

#[async_trait]
impl Backend for HttpBackend {
    async fn get_all_products(&self) -> Result<Vec<Product>, BackendError> {
        self.call_list::<WireProduct, Product>(method::GET_ALL_PRODUCTS)
            .await
    }

    async fn create_product(&self, draft: &ProductDraft) -> Result<ProductId, BackendError> {
        let id: u64 = self
            .call_decode(method::CREATE_PRODUCT, &ProductArgs::new(None, draft))
            .await?;
        Ok(ProductId::new(id))
    }

    async fn update_product(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> Result<(), BackendError> {
        self.call_decode(method::UPDATE_PRODUCT, &ProductArgs::new(Some(id), draft))
            .await
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), BackendError> {
        self.call_decode(
            method::DELETE_PRODUCT,
            &ProductIdArgs {
                product_id: id.as_u64(),
            },
        )
        .await
    }

    async fn get_all_orders(&self) -> Result<Vec<Order>, BackendError> {
        self.call_list::<WireOrder, Order>(method::GET_ALL_ORDERS)
            .await
    }

    async fn place_order(&self, order: &NewOrder) -> Result<OrderId, BackendError> {
        let id: u64 = self
            .call_decode(method::PLACE_ORDER, &PlaceOrderArgs::from(order))
            .await?;
        Ok(OrderId::new(id))
    }

    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), BackendError> {
        self.call_decode(
            method::UPDATE_ORDER_STATUS,
            &UpdateOrderStatusArgs {
                order_id: id.as_u64(),
                status,
            },
        )
        .await
    }

    async fn get_all_contact_messages(&self) -> Result<Vec<ContactMessage>, BackendError> {
        self.call_list::<WireContactMessage, ContactMessage>(method::GET_ALL_CONTACT_MESSAGES)
            .await
    }

    async fn submit_contact_form(&self, message: &NewContactMessage) -> Result<(), BackendError> {
        self.call_decode(
            method::SUBMIT_CONTACT_FORM,
            &SubmitContactArgs::from(message),
        )
        .await
    }

    async fn delete_contact_message(&self, id: ContactMessageId) -> Result<(), BackendError> {
        self.call_decode(method::DELETE_CONTACT_MESSAGE, &IdArgs { id: id.as_u64() })
            .await
    }

    async fn get_caller_user_role(&self) -> Result<UserRole, BackendError> {
        let body = self.call(method::GET_CALLER_USER_ROLE, &NoArgs {}).await?;
        wire::decode_role(&body)
    }

    async fn is_caller_admin(&self) -> Result<bool, BackendError> {
        self.call_decode(method::IS_CALLER_ADMIN, &NoArgs {}).await
    }
}
