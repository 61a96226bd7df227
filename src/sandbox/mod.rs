//! In-memory stand-in for the Central Pet Care backend.
//!
//! Serves the same routes the client calls, backed by a fixed catalog and
//! process-local order/payment ledgers. Card outcomes are canned by number:
//!
//! | card number           | outcome             |
//! |-----------------------|---------------------|
//! | `4000 0000 0000 0002` | declined            |
//! | `4000 0000 0000 9995` | insufficient funds  |
//! | anything else valid   | approved            |

use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::Arc,
    time::Duration,
};

use axum::{
    Router,
    http::{HeaderName, Request, Response, StatusCode},
    routing::{get, post, put},
};
use tokio::sync::RwLock;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    dto::payments::ProcessPaymentResponse,
    models::{Order, Product},
};

pub mod error;
pub mod routes;

pub const DECLINED_CARD: &str = "4000000000000002";
pub const INSUFFICIENT_FUNDS_CARD: &str = "4000000000009995";
pub const SUCCESS_CARD: &str = "4242424242424242";

/// Stored payment replies kept for idempotent replay. Oldest are evicted first.
pub const REPLY_CAPACITY: usize = 1024;

/// Replay key: the `Idempotency-Key` header plus the order it was sent for.
pub type ReplyKey = (String, String);

#[derive(Debug, Default)]
pub struct Ledger {
    pub orders: HashMap<String, Order>,
    pub paid: HashSet<String>,
    replies: HashMap<ReplyKey, (StatusCode, ProcessPaymentResponse)>,
    reply_order: VecDeque<ReplyKey>,
}

impl Ledger {
    pub fn reply(&self, key: &ReplyKey) -> Option<&(StatusCode, ProcessPaymentResponse)> {
        self.replies.get(key)
    }

    pub fn remember_reply(&mut self, key: ReplyKey, reply: (StatusCode, ProcessPaymentResponse)) {
        if self.replies.insert(key.clone(), reply).is_none() {
            self.reply_order.push_back(key);
        }
        while self.reply_order.len() > REPLY_CAPACITY {
            if let Some(oldest) = self.reply_order.pop_front() {
                self.replies.remove(&oldest);
            }
        }
    }

    pub fn reply_count(&self) -> usize {
        self.replies.len()
    }
}

#[derive(Clone)]
pub struct SandboxState {
    pub catalog: Arc<Vec<Product>>,
    pub ledger: Arc<RwLock<Ledger>>,
}

impl SandboxState {
    pub fn new(catalog: Vec<Product>) -> Self {
        Self {
            catalog: Arc::new(catalog),
            ledger: Arc::new(RwLock::new(Ledger::default())),
        }
    }

    pub fn seeded() -> Self {
        Self::new(seed_catalog())
    }
}

fn product(id: &str, name: &str, price: i64, category: &str, stock: i32) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        price,
        images: vec![format!("/images/products/{id}.jpg")],
        category_id: Some(category.to_string()),
        stock: Some(stock),
    }
}

pub fn seed_catalog() -> Vec<Product> {
    vec![
        product("dog-food-5kg", "Premium Dog Food 5kg", 1500, "food", 40),
        product("cat-food-2kg", "Salmon Cat Food 2kg", 1200, "food", 25),
        product("chew-toy", "Rubber Chew Toy", 800, "toys", 60),
        product("feather-wand", "Feather Wand Cat Toy", 650, "toys", 30),
        product("pet-bed-m", "Orthopedic Pet Bed (M)", 5400, "accessories", 8),
        product("leash-nylon", "Nylon Leash 1.5m", 950, "accessories", 50),
    ]
}

pub fn app(state: SandboxState) -> Router {
    let request_id_header = HeaderName::from_static("x-request-id");
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<_>| {
            let request_id = request
                .headers()
                .get("x-request-id")
                .and_then(|value| value.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id
            )
        })
        .on_response(|response: &Response<_>, latency: Duration, _span: &tracing::Span| {
            tracing::info!(
                status = %response.status(),
                ms = %latency.as_millis(),
                "request finished"
            );
        });

    Router::new()
        .route("/api/health", get(routes::health_check))
        .route("/api/products", get(routes::list_products))
        .route("/api/products/cart-products", post(routes::cart_products))
        .route("/api/orders", get(routes::list_orders).post(routes::create_order))
        .route("/api/orders/{order_id}", get(routes::get_order))
        .route("/api/orders/{order_id}/status", put(routes::update_order_status))
        .route("/api/payments/order/{order_id}", get(routes::payment_order))
        .route("/api/payments/process-direct", post(routes::process_direct))
        .fallback(routes::not_found)
        .layer(trace_layer)
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(1024 * 1024))
        .layer(ConcurrencyLimitLayer::new(100))
        .with_state(state)
}
