use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, Uri, header},
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::{
    DECLINED_CARD, INSUFFICIENT_FUNDS_CARD, SandboxState,
    error::{SandboxError, SandboxResult},
};
use crate::{
    client::IDEMPOTENCY_HEADER,
    dto::{
        health::HealthData,
        orders::{CreateOrderRequest, CreateOrderResponse, OrderHistory, UpdateOrderStatusRequest},
        payments::{
            PaymentOrderResponse, ProcessPaymentRequest, ProcessPaymentResponse,
            ProcessedPaymentData,
        },
        products::{CartProductsRequest, CartProductsResponse, ProductList},
    },
    models::{Order, OrderStatus},
    services::shipping_service::SHIPPING_FEE,
};

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrderQuery {
    pub email: Option<String>,
}

fn require_bearer(headers: &HeaderMap) -> SandboxResult<()> {
    let has_bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("Bearer ") && value.len() > "Bearer ".len());
    if has_bearer {
        Ok(())
    } else {
        Err(SandboxError::Unauthorized)
    }
}

fn short_id(prefix: &str) -> String {
    let id = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("{prefix}-{}", id.get(..8).unwrap_or(&id))
}

pub async fn health_check() -> Json<HealthData> {
    Json(HealthData {
        status: "ok".to_string(),
    })
}

pub async fn not_found(uri: Uri) -> SandboxError {
    SandboxError::NotFound(format!("No route for {}", uri.path()))
}

pub async fn list_products(
    State(state): State<SandboxState>,
    Query(query): Query<ProductQuery>,
) -> Json<ProductList> {
    let items = state
        .catalog
        .iter()
        .filter(|p| match query.category.as_deref().filter(|c| !c.is_empty()) {
            Some(category) => p.category_id.as_deref() == Some(category),
            None => true,
        })
        .cloned()
        .collect();
    Json(ProductList { items })
}

pub async fn cart_products(
    State(state): State<SandboxState>,
    Json(payload): Json<CartProductsRequest>,
) -> Json<CartProductsResponse> {
    let products = state
        .catalog
        .iter()
        .filter(|p| payload.ids.contains(&p.id))
        .cloned()
        .collect();
    Json(CartProductsResponse { products })
}

pub async fn create_order(
    State(state): State<SandboxState>,
    Json(payload): Json<CreateOrderRequest>,
) -> SandboxResult<(StatusCode, Json<CreateOrderResponse>)> {
    if payload.ordered_items.is_empty() {
        return Err(SandboxError::bad_request("No items in order"));
    }
    let mut errors = Vec::new();
    if payload.name.trim().is_empty() {
        errors.push("name is required".to_string());
    }
    if payload.address.trim().is_empty() {
        errors.push("address is required".to_string());
    }
    if payload.phone.trim().is_empty() {
        errors.push("phone is required".to_string());
    }
    if !errors.is_empty() {
        return Err(SandboxError::BadRequest {
            message: "Order validation failed".into(),
            errors,
        });
    }
    if payload.status != OrderStatus::Pending {
        return Err(SandboxError::bad_request("New orders must start as Pending"));
    }

    let subtotal: i64 = payload
        .ordered_items
        .iter()
        .map(|item| item.price * i64::from(item.quantity))
        .sum();
    let shipping_fee = if subtotal > 0 { SHIPPING_FEE } else { 0 };
    if payload.total_amount != subtotal + shipping_fee {
        return Err(SandboxError::bad_request(
            "Order total does not match the ordered items",
        ));
    }

    let order_id = short_id("ORD");
    let order = Order {
        order_id: order_id.clone(),
        ordered_items: payload.ordered_items,
        name: payload.name,
        address: payload.address,
        phone: payload.phone,
        email: payload.email,
        total_amount: payload.total_amount,
        status: OrderStatus::Pending,
        created_at: Some(Utc::now()),
    };
    state.ledger.write().await.orders.insert(order_id.clone(), order);
    tracing::info!(%order_id, "sandbox order created");

    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponse {
            order_id,
            message: Some("Order created successfully".into()),
        }),
    ))
}

pub async fn get_order(
    State(state): State<SandboxState>,
    Path(order_id): Path<String>,
) -> SandboxResult<Json<Order>> {
    state
        .ledger
        .read()
        .await
        .orders
        .get(&order_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| SandboxError::NotFound("Order not found".into()))
}

pub async fn list_orders(
    State(state): State<SandboxState>,
    headers: HeaderMap,
    Query(query): Query<OrderQuery>,
) -> SandboxResult<Json<OrderHistory>> {
    require_bearer(&headers)?;
    let ledger = state.ledger.read().await;
    let mut orders: Vec<Order> = ledger
        .orders
        .values()
        .filter(|order| match &query.email {
            Some(email) => order.email.as_ref() == Some(email),
            None => true,
        })
        .cloned()
        .collect();
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(Json(OrderHistory { orders }))
}

pub async fn update_order_status(
    State(state): State<SandboxState>,
    headers: HeaderMap,
    Path(order_id): Path<String>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> SandboxResult<Json<Order>> {
    require_bearer(&headers)?;
    let mut ledger = state.ledger.write().await;
    let order = ledger
        .orders
        .get_mut(&order_id)
        .ok_or_else(|| SandboxError::NotFound("Order not found".into()))?;
    if !order.status.can_transition_to(payload.status) {
        return Err(SandboxError::bad_request(format!(
            "Cannot move order from {} to {}",
            order.status, payload.status
        )));
    }
    order.status = payload.status;
    Ok(Json(order.clone()))
}

pub async fn payment_order(
    State(state): State<SandboxState>,
    Path(order_id): Path<String>,
) -> SandboxResult<Json<PaymentOrderResponse>> {
    let order = state
        .ledger
        .read()
        .await
        .orders
        .get(&order_id)
        .cloned()
        .ok_or_else(|| SandboxError::NotFound("Order not found".into()))?;
    Ok(Json(PaymentOrderResponse {
        success: true,
        order: Some(order),
    }))
}

/// Canned card processing. Replays the stored reply when the same
/// idempotency key is sent again for the same order.
pub async fn process_direct(
    State(state): State<SandboxState>,
    headers: HeaderMap,
    Json(payload): Json<ProcessPaymentRequest>,
) -> (StatusCode, Json<ProcessPaymentResponse>) {
    let key = headers
        .get(IDEMPOTENCY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| (value.to_string(), payload.order_id.clone()));

    let mut ledger = state.ledger.write().await;
    if let Some(reply) = key.as_ref().and_then(|k| ledger.reply(k)) {
        tracing::info!(order_id = %payload.order_id, "replaying payment reply");
        return (reply.0, Json(reply.1.clone()));
    }

    let reply = decide_payment(&mut ledger, &payload);
    if let Some(key) = key {
        ledger.remember_reply(key, reply.clone());
    }
    (reply.0, Json(reply.1))
}

fn failure(message: &str, errors: Vec<String>) -> ProcessPaymentResponse {
    ProcessPaymentResponse {
        success: false,
        message: message.to_string(),
        payment_id: None,
        data: None,
        errors: errors.into_iter().map(serde_json::Value::String).collect(),
    }
}

fn decide_payment(
    ledger: &mut super::Ledger,
    payload: &ProcessPaymentRequest,
) -> (StatusCode, ProcessPaymentResponse) {
    if !ledger.orders.contains_key(&payload.order_id) {
        return (StatusCode::NOT_FOUND, failure("Order not found", vec![]));
    }
    if ledger.paid.contains(&payload.order_id) {
        return (StatusCode::BAD_REQUEST, failure("Order already paid", vec![]));
    }

    let card = &payload.card_details;
    let mut errors = Vec::new();
    if card.card_number.is_empty() {
        errors.push("cardNumber is required".to_string());
    }
    if card.expiry_date.is_empty() {
        errors.push("expiryDate is required".to_string());
    }
    if card.cvv.is_empty() {
        errors.push("cvv is required".to_string());
    }
    if card.cardholder_name.is_empty() {
        errors.push("cardholderName is required".to_string());
    }
    if !errors.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            failure("Invalid card details", errors),
        );
    }

    match card.card_number.as_str() {
        DECLINED_CARD => (
            StatusCode::PAYMENT_REQUIRED,
            failure("Your card was declined.", vec![]),
        ),
        INSUFFICIENT_FUNDS_CARD => (
            StatusCode::PAYMENT_REQUIRED,
            failure("Insufficient funds.", vec![]),
        ),
        number => {
            ledger.paid.insert(payload.order_id.clone());
            let skip = number.len().saturating_sub(4);
            (
                StatusCode::OK,
                ProcessPaymentResponse {
                    success: true,
                    message: "Payment processed successfully".into(),
                    payment_id: Some(short_id("PAY")),
                    data: Some(ProcessedPaymentData {
                        card_last4: number.get(skip..).map(str::to_string),
                    }),
                    errors: Vec::new(),
                },
            )
        }
    }
}
