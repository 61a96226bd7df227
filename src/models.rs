use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub stock: Option<i32>,
}

/// One line of the client-local cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEntry {
    pub product_id: String,
    pub qty: u32,
}

impl CartEntry {
    pub fn new(product_id: impl Into<String>, qty: u32) -> Self {
        Self {
            product_id: product_id.into(),
            qty,
        }
    }
}

/// A cart entry joined with catalog data. Never persisted.
///
/// Entries whose product could not be found keep `available == false`, an
/// empty name and a zero price so they contribute nothing to totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HydratedCartItem {
    pub product_id: String,
    pub qty: u32,
    pub name: String,
    pub price: i64,
    pub image: Option<String>,
    pub category_id: Option<String>,
    pub available: bool,
}

impl HydratedCartItem {
    pub fn line_total(&self) -> i64 {
        self.price * i64::from(self.qty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderedItem {
    pub item_type: String,
    pub item_id: String,
    pub name: String,
    pub price: i64,
    pub quantity: u32,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: String,
    #[serde(default)]
    pub ordered_items: Vec<OrderedItem>,
    pub name: String,
    pub address: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    pub total_amount: i64,
    pub status: OrderStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Order lifecycle. The first five variants form the linear progression;
/// `Cancelled` is an absorbing side-state reachable only from `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Preparing,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const STAGES: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Preparing => "Preparing",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Position on the linear progress bar, `None` for `Cancelled`.
    pub fn stage_index(&self) -> Option<usize> {
        Self::STAGES.iter().position(|stage| stage == self)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    pub fn is_absorbing(&self) -> bool {
        matches!(self, OrderStatus::Cancelled)
    }

    /// Forward-only along the stages; cancellation only while still pending.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        if next == OrderStatus::Cancelled {
            return *self == OrderStatus::Pending;
        }
        match (self.stage_index(), next.stage_index()) {
            (Some(from), Some(to)) => to > from,
            _ => false,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "preparing" => Ok(OrderStatus::Preparing),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

/// Pet adoption application lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdoptionStatus {
    Applied,
    Pending,
    Approved,
    Completed,
    Rejected,
}

impl AdoptionStatus {
    pub const APPROVAL_TRACK: [AdoptionStatus; 4] = [
        AdoptionStatus::Applied,
        AdoptionStatus::Pending,
        AdoptionStatus::Approved,
        AdoptionStatus::Completed,
    ];

    pub const REJECTION_TRACK: [AdoptionStatus; 3] = [
        AdoptionStatus::Applied,
        AdoptionStatus::Pending,
        AdoptionStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AdoptionStatus::Applied => "APPLIED",
            AdoptionStatus::Pending => "PENDING",
            AdoptionStatus::Approved => "APPROVED",
            AdoptionStatus::Completed => "COMPLETED",
            AdoptionStatus::Rejected => "REJECTED",
        }
    }

    /// The stage list that applies to this outcome branch.
    pub fn track(&self) -> &'static [AdoptionStatus] {
        match self {
            AdoptionStatus::Rejected => &Self::REJECTION_TRACK,
            _ => &Self::APPROVAL_TRACK,
        }
    }

    pub fn is_absorbing(&self) -> bool {
        matches!(self, AdoptionStatus::Rejected)
    }
}

impl fmt::Display for AdoptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdoptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "APPLIED" => Ok(AdoptionStatus::Applied),
            "PENDING" => Ok(AdoptionStatus::Pending),
            "APPROVED" => Ok(AdoptionStatus::Approved),
            "COMPLETED" => Ok(AdoptionStatus::Completed),
            "REJECTED" => Ok(AdoptionStatus::Rejected),
            other => Err(format!("unknown adoption status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "card")]
    Card,
    #[serde(rename = "cod")]
    CashOnDelivery,
    #[serde(rename = "bank_transfer")]
    BankTransfer,
}

impl PaymentMethod {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "Credit/Debit Card",
            PaymentMethod::CashOnDelivery => "Cash on Delivery",
            PaymentMethod::BankTransfer => "Bank Transfer",
        }
    }
}

/// Signed-in account as stored under the `user` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    #[serde(rename = "type")]
    pub user_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl UserProfile {
    pub fn is_customer(&self) -> bool {
        self.user_type.eq_ignore_ascii_case("customer")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub phone: String,
    pub address: String,
}

/// Client-local record of the latest checkout/payment outcome, consumed by
/// the confirmation view. Not an authoritative payment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResult {
    pub success: bool,
    #[serde(default)]
    pub awaiting_payment: bool,
    pub order_id: String,
    pub amount: i64,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub card_last4: Option<String>,
    pub message: String,
    #[serde(default)]
    pub errors: Vec<String>,
    pub customer_info: CustomerInfo,
    #[serde(default)]
    pub items: Vec<OrderedItem>,
    pub recorded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_index_follows_linear_order() {
        assert_eq!(OrderStatus::Pending.stage_index(), Some(0));
        assert_eq!(OrderStatus::Shipped.stage_index(), Some(3));
        assert_eq!(OrderStatus::Cancelled.stage_index(), None);
    }

    #[test]
    fn transitions_are_forward_only() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Preparing));
        assert!(OrderStatus::Preparing.can_transition_to(OrderStatus::Shipped));
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Processing));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Delivered));
    }

    #[test]
    fn cancellation_only_from_pending() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Preparing.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Preparing));
    }

    #[test]
    fn unknown_status_is_rejected_at_the_boundary() {
        let parsed: Result<Order, _> = serde_json::from_value(serde_json::json!({
            "orderId": "ORD-1",
            "name": "A B",
            "address": "x",
            "phone": "0771234567",
            "totalAmount": 100,
            "status": "Shiped"
        }));
        assert!(parsed.is_err());
        assert!("Shiped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn product_accepts_either_id_field() {
        let a: Product =
            serde_json::from_str(r#"{"_id":"p1","name":"Bone","price":200}"#).unwrap();
        let b: Product = serde_json::from_str(r#"{"id":"p1","name":"Bone","price":200}"#).unwrap();
        assert_eq!(a, b);
        assert!(a.images.is_empty());
    }

    #[test]
    fn product_missing_name_or_price_defaults() {
        let products: Vec<Product> =
            serde_json::from_str(r#"[{"_id":"p1"},{"_id":"p2","name":"Bone","price":200}]"#)
                .unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].name, "");
        assert_eq!(products[0].price, 0);
        assert_eq!(products[1].price, 200);
    }

    #[test]
    fn adoption_track_depends_on_outcome() {
        assert_eq!(AdoptionStatus::Approved.track().len(), 4);
        assert_eq!(
            AdoptionStatus::Rejected.track().last(),
            Some(&AdoptionStatus::Rejected)
        );
    }

    #[test]
    fn user_type_discriminates_customers() {
        let user: UserProfile =
            serde_json::from_str(r#"{"email":"a@b.lk","type":"Customer"}"#).unwrap();
        assert!(user.is_customer());
    }
}
