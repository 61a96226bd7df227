//! HTTP client for the Central Pet Care REST backend.

use std::{fmt, time::Duration};

use reqwest::{Client, RequestBuilder, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dto::{
        health::HealthData,
        orders::{CreateOrderRequest, CreateOrderResponse, OrderHistory, UpdateOrderStatusRequest},
        payments::{PaymentOrderResponse, ProcessPaymentRequest, ProcessPaymentResponse},
        products::{CartProductsRequest, CartProductsResponse, ProductList},
    },
    error::{AppError, AppResult},
    models::{Order, OrderStatus, Product},
    response::ApiMessage,
};

pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<SecretString>,
    request_timeout: Duration,
    payment_timeout: Duration,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("request_timeout", &self.request_timeout)
            .field("payment_timeout", &self.payment_timeout)
            .finish()
    }
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("central-pet-care/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Internal(e.into()))?;
        Ok(Self {
            http,
            base_url: config.api_url.clone(),
            token: None,
            request_timeout: config.request_timeout,
            payment_timeout: config.payment_timeout,
        })
    }

    /// Attach (or drop) the bearer token sent on authenticated calls.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.map(SecretString::from);
        self
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Base URL plus `segments`, each percent-encoded as one path segment so
    /// an id can never reach a different route.
    fn segment_url(&self, segments: &[&str]) -> AppResult<Url> {
        if let Some(bad) = segments
            .iter()
            .find(|s| s.is_empty() || **s == "." || **s == "..")
        {
            return Err(AppError::NotFound(format!("invalid id {bad:?}")));
        }
        let mut url = Url::parse(&self.base_url).map_err(|e| AppError::Internal(e.into()))?;
        url.path_segments_mut()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("base URL cannot carry a path")))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> AppResult<T> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body: ApiMessage = response.json().await.unwrap_or_default();
        warn!(%status, what, message = ?body.message, "backend returned an error");
        Err(match status {
            StatusCode::NOT_FOUND => AppError::NotFound(body.text(&format!("{what} not found"))),
            StatusCode::UNAUTHORIZED => AppError::Unauthenticated,
            StatusCode::FORBIDDEN => AppError::Forbidden,
            StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT => {
                AppError::Connectivity(body.text("backend unavailable"))
            }
            _ => AppError::Rejected {
                message: body.text(&format!("{what} failed with status {status}")),
                errors: body.error_list(),
            },
        })
    }

    #[instrument(skip(self))]
    pub async fn health(&self) -> AppResult<()> {
        let request = self
            .http
            .get(self.url("/api/health"))
            .timeout(HEALTH_TIMEOUT.min(self.request_timeout));
        let data: HealthData = self.send(request, "health check").await?;
        debug!(status = %data.status, "backend health");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_products(&self, category: Option<&str>) -> AppResult<Vec<Product>> {
        let mut request = self
            .http
            .get(self.url("/api/products"))
            .timeout(self.request_timeout);
        if let Some(category) = category.filter(|c| !c.is_empty()) {
            request = request.query(&[("category", category)]);
        }
        let list: ProductList = self.send(request, "product list").await?;
        Ok(list.items)
    }

    /// One batched lookup for every id referenced by the cart.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn cart_products(&self, ids: &[String]) -> AppResult<Vec<Product>> {
        let request = self
            .http
            .post(self.url("/api/products/cart-products"))
            .timeout(self.request_timeout)
            .json(&CartProductsRequest { ids: ids.to_vec() });
        let body: CartProductsResponse = self.send(request, "cart products").await?;
        Ok(body.products)
    }

    #[instrument(skip(self, payload), fields(items = payload.ordered_items.len(), total = payload.total_amount))]
    pub async fn create_order(&self, payload: &CreateOrderRequest) -> AppResult<CreateOrderResponse> {
        let request = self
            .http
            .post(self.url("/api/orders"))
            .timeout(self.request_timeout)
            .json(payload);
        self.send(request, "order creation").await
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: &str) -> AppResult<Order> {
        let request = self
            .http
            .get(self.segment_url(&["api", "orders", order_id])?)
            .timeout(self.request_timeout);
        self.send(request, "order").await
    }

    #[instrument(skip(self))]
    pub async fn orders_by_email(&self, email: &str) -> AppResult<Vec<Order>> {
        let request = self
            .http
            .get(self.url("/api/orders"))
            .query(&[("email", email)])
            .timeout(self.request_timeout);
        let history: OrderHistory = self.send(request, "order history").await?;
        Ok(history.orders)
    }

    /// Order as seen by the payment service.
    #[instrument(skip(self))]
    pub async fn payment_order(&self, order_id: &str) -> AppResult<Order> {
        let request = self
            .http
            .get(self.segment_url(&["api", "payments", "order", order_id])?)
            .timeout(self.request_timeout);
        let body: PaymentOrderResponse = self.send(request, "order").await?;
        match body.order {
            Some(order) if body.success => Ok(order),
            _ => Err(AppError::NotFound(format!("order {order_id} not found"))),
        }
    }

    #[instrument(skip(self, payload), fields(order_id = %payload.order_id, %idempotency_key))]
    pub async fn process_direct(
        &self,
        payload: &ProcessPaymentRequest,
        idempotency_key: Uuid,
    ) -> AppResult<ProcessPaymentResponse> {
        let request = self
            .http
            .post(self.url("/api/payments/process-direct"))
            .header(IDEMPOTENCY_HEADER, idempotency_key.to_string())
            .timeout(self.payment_timeout)
            .json(payload);
        self.send(request, "payment").await
    }

    #[instrument(skip(self))]
    pub async fn update_order_status(&self, order_id: &str, status: OrderStatus) -> AppResult<Order> {
        let request = self
            .http
            .put(self.segment_url(&["api", "orders", order_id, "status"])?)
            .timeout(self.request_timeout)
            .json(&UpdateOrderStatusRequest { status });
        self.send(request, "status update").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        let config = AppConfig::from_lookup(|key| {
            (key == "PETCARE_API_URL").then(|| "http://127.0.0.1:5000/".to_string())
        })
        .unwrap();
        ApiClient::new(&config).unwrap()
    }

    #[test]
    fn order_ids_are_encoded_as_one_segment() {
        let client = client();
        let url = client.segment_url(&["api", "orders", "../products"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:5000/api/orders/..%2Fproducts");

        let url = client
            .segment_url(&["api", "orders", "x?email=a", "status"])
            .unwrap();
        assert_eq!(url.path(), "/api/orders/x%3Femail=a/status");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn dot_segments_and_empty_ids_are_refused() {
        let client = client();
        for id in ["", ".", ".."] {
            assert!(matches!(
                client.segment_url(&["api", "orders", id]),
                Err(AppError::NotFound(_))
            ));
        }
    }
}
