use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    dto::orders::CreateOrderRequest,
    error::{AppError, AppResult, FieldError},
    models::{
        CustomerInfo, HydratedCartItem, OrderStatus, OrderedItem, PaymentMethod, PaymentResult,
    },
    state::AppState,
};

pub const SHIPPING_FEE: i64 = 500;

pub const PROVINCES: &[(&str, &[&str])] = &[
    (
        "Western",
        &[
            "Colombo", "Dehiwala", "Moratuwa", "Negombo", "Gampaha", "Kalutara", "Panadura",
            "Kelaniya", "Ja-Ela", "Wattala",
        ],
    ),
    (
        "Central",
        &["Kandy", "Matale", "Nuwara Eliya", "Gampola", "Hatton", "Dambulla"],
    ),
    (
        "Southern",
        &["Galle", "Matara", "Hambantota", "Hikkaduwa", "Tangalle", "Ambalangoda"],
    ),
    (
        "Northern",
        &["Jaffna", "Kilinochchi", "Mannar", "Vavuniya", "Mullaitivu", "Point Pedro"],
    ),
    (
        "Eastern",
        &["Trincomalee", "Batticaloa", "Ampara", "Kalmunai", "Kattankudy"],
    ),
    (
        "North Western",
        &["Kurunegala", "Puttalam", "Chilaw", "Kuliyapitiya", "Wennappuwa"],
    ),
    (
        "North Central",
        &["Anuradhapura", "Polonnaruwa", "Kekirawa", "Medawachchiya"],
    ),
    ("Uva", &["Badulla", "Bandarawela", "Monaragala", "Haputale", "Ella"]),
    (
        "Sabaragamuwa",
        &["Ratnapura", "Kegalle", "Balangoda", "Embilipitiya", "Mawanella"],
    ),
];

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]+(?: [A-Za-z]+)*$").expect("valid name pattern"));
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^07[0-9]{8}$").expect("valid phone pattern"));
static POSTAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{5}$").expect("valid postal pattern"));

pub fn cities_for(province: &str) -> Option<&'static [&'static str]> {
    PROVINCES
        .iter()
        .find(|(name, _)| *name == province)
        .map(|(_, cities)| *cities)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingDraft {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub province: String,
    #[serde(default)]
    pub postal_code: String,
    pub phone: String,
}

impl ShippingDraft {
    /// Every failing field, in form order. Empty means the draft may be submitted.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        for (field, value, label) in [
            ("firstName", &self.first_name, "First name"),
            ("lastName", &self.last_name, "Last name"),
        ] {
            if value.is_empty() {
                errors.push(FieldError::new(field, format!("{label} is required")));
            } else if !NAME_RE.is_match(value) {
                errors.push(FieldError::new(
                    field,
                    format!("{label} may only contain letters and single spaces"),
                ));
            }
        }

        if self.address.trim().is_empty() {
            errors.push(FieldError::new("address", "Address is required"));
        }

        match (self.province.is_empty(), cities_for(&self.province)) {
            (true, _) => errors.push(FieldError::new("province", "Province is required")),
            (false, None) => errors.push(FieldError::new("province", "Select a valid province")),
            (false, Some(cities)) => {
                if self.city.is_empty() {
                    errors.push(FieldError::new("city", "City is required"));
                } else if !cities.contains(&self.city.as_str()) {
                    errors.push(FieldError::new(
                        "city",
                        format!("{} is not a city in {} province", self.city, self.province),
                    ));
                }
            }
        }
        if self.province.is_empty() && !self.city.is_empty() {
            errors.push(FieldError::new("city", "Select a province first"));
        }

        if !self.postal_code.is_empty() && !POSTAL_RE.is_match(&self.postal_code) {
            errors.push(FieldError::new(
                "postalCode",
                "Postal code must be exactly 5 digits",
            ));
        }

        if self.phone.is_empty() {
            errors.push(FieldError::new("phone", "Phone number is required"));
        } else if !PHONE_RE.is_match(&self.phone) {
            errors.push(FieldError::new(
                "phone",
                "Enter a valid mobile number (07XXXXXXXX)",
            ));
        }

        errors
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }

    /// Street, city, province and postal code on one line.
    pub fn flattened_address(&self) -> String {
        [
            self.address.trim(),
            self.city.as_str(),
            self.province.as_str(),
            self.postal_code.as_str(),
        ]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub subtotal: i64,
    pub shipping_fee: i64,
    pub total: i64,
}

pub fn compute_totals(items: &[HydratedCartItem]) -> CartTotals {
    let subtotal: i64 = items.iter().map(HydratedCartItem::line_total).sum();
    let shipping_fee = if subtotal > 0 { SHIPPING_FEE } else { 0 };
    CartTotals {
        subtotal,
        shipping_fee,
        total: subtotal + shipping_fee,
    }
}

/// Snapshot of the purchasable lines. Lines whose product could not be
/// loaded are left out.
pub fn ordered_items(items: &[HydratedCartItem]) -> Vec<OrderedItem> {
    items
        .iter()
        .filter(|item| item.available)
        .map(|item| OrderedItem {
            item_type: "product".into(),
            item_id: item.product_id.clone(),
            name: item.name.clone(),
            price: item.price,
            quantity: item.qty,
            image: item.image.clone(),
        })
        .collect()
}

pub fn build_order_request(
    draft: &ShippingDraft,
    items: &[HydratedCartItem],
    email: Option<String>,
) -> AppResult<CreateOrderRequest> {
    let errors = draft.validate();
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let skipped = items.iter().filter(|item| !item.available).count();
    if skipped > 0 {
        warn!(skipped, "cart lines without catalog data left out of the order");
    }
    let ordered_items = ordered_items(items);
    if ordered_items.is_empty() {
        return Err(AppError::Validation(vec![FieldError::new(
            "cart",
            "Your cart is empty",
        )]));
    }

    Ok(CreateOrderRequest {
        ordered_items,
        name: draft.full_name(),
        address: draft.flattened_address(),
        phone: draft.phone.clone(),
        email,
        total_amount: compute_totals(items).total,
        status: OrderStatus::Pending,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSubmission {
    pub order_id: String,
    pub message: String,
    pub totals: CartTotals,
}

/// Validate the draft, create the order, then record a pending payment
/// result for the payment step and empty the cart.
///
/// Nothing local changes when the backend refuses the order, so the user can
/// correct the draft and resubmit.
pub async fn submit_order(
    state: &AppState,
    draft: &ShippingDraft,
    items: &[HydratedCartItem],
) -> AppResult<OrderSubmission> {
    let user = state.session.user()?;
    let email = user.as_ref().map(|u| u.email.clone());
    let payload = build_order_request(draft, items, email.clone())?;

    let created = state.client.create_order(&payload).await?;
    info!(order_id = %created.order_id, total = payload.total_amount, "order created");

    let pending = PaymentResult {
        success: false,
        awaiting_payment: true,
        order_id: created.order_id.clone(),
        amount: payload.total_amount,
        payment_method: PaymentMethod::Card,
        transaction_id: None,
        card_last4: None,
        message: "Order placed, awaiting payment".into(),
        errors: Vec::new(),
        customer_info: CustomerInfo {
            name: payload.name.clone(),
            email,
            phone: payload.phone.clone(),
            address: payload.address.clone(),
        },
        items: payload.ordered_items.clone(),
        recorded_at: Utc::now(),
    };
    state.session.set_payment_result(&pending)?;
    state.carts.clear()?;

    Ok(OrderSubmission {
        order_id: created.order_id,
        message: created
            .message
            .unwrap_or_else(|| "Order created successfully".into()),
        totals: compute_totals(items),
    })
}
