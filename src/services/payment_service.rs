use std::fmt;

use chrono::{Datelike, NaiveDate, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    dto::payments::{CardDetailsPayload, ProcessPaymentRequest, ProcessPaymentResponse},
    error::{AppError, AppResult, FieldError},
    models::{CustomerInfo, Order, PaymentMethod, PaymentResult, UserProfile},
    response::flatten_errors,
    state::AppState,
};

/// Where a single payment attempt currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentPhase {
    Idle,
    LoadingOrder,
    OrderLoaded,
    Submitting,
    Succeeded,
    Failed,
}

impl fmt::Display for PaymentPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaymentPhase::Idle => "idle",
            PaymentPhase::LoadingOrder => "loading-order",
            PaymentPhase::OrderLoaded => "order-loaded",
            PaymentPhase::Submitting => "submitting",
            PaymentPhase::Succeeded => "success",
            PaymentPhase::Failed => "failure",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardDetails {
    pub number: String,
    pub expiry: String,
    pub cvv: String,
    pub holder_name: String,
}

impl CardDetails {
    pub fn digits(&self) -> String {
        self.number
            .chars()
            .filter(|c| !matches!(c, ' ' | '-'))
            .collect()
    }

    pub fn last4(&self) -> String {
        let digits = self.digits();
        let skip = digits.chars().count().saturating_sub(4);
        digits.chars().skip(skip).collect()
    }

    /// Format checks only. No Luhn check.
    pub fn validate(&self, today: NaiveDate) -> Vec<FieldError> {
        let mut errors = Vec::new();

        let digits = self.digits();
        if digits.is_empty() {
            errors.push(FieldError::new("cardNumber", "Card number is required"));
        } else if !(13..=19).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit())
        {
            errors.push(FieldError::new("cardNumber", "Enter a valid card number"));
        }

        match parse_expiry(&self.expiry) {
            None => errors.push(FieldError::new("expiryDate", "Use the MM/YY format")),
            Some((month, year)) => {
                if (year, month) < (today.year(), today.month()) {
                    errors.push(FieldError::new("expiryDate", "Card has expired"));
                }
            }
        }

        let cvv = self.cvv.trim();
        if !(3..=4).contains(&cvv.len()) || !cvv.chars().all(|c| c.is_ascii_digit()) {
            errors.push(FieldError::new("cvv", "CVV must be 3 or 4 digits"));
        }

        if self.holder_name.trim().is_empty() {
            errors.push(FieldError::new("cardholderName", "Cardholder name is required"));
        }

        errors
    }

    fn payload(&self) -> CardDetailsPayload {
        CardDetailsPayload {
            card_number: self.digits(),
            expiry_date: self.expiry.trim().to_string(),
            cvv: self.cvv.trim().to_string(),
            cardholder_name: self.holder_name.trim().to_string(),
        }
    }
}

fn parse_expiry(raw: &str) -> Option<(u32, i32)> {
    let (month, year) = raw.trim().split_once('/')?;
    let two_digits = |part: &str| part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit());
    if !two_digits(month) || !two_digits(year) {
        return None;
    }
    let month: u32 = month.parse().ok()?;
    let year: i32 = year.parse().ok()?;
    (1..=12).contains(&month).then_some((month, 2000 + year))
}

/// Customer details for the confirmation record: account profile first, then
/// what the shipping step recorded, then the order itself.
pub fn resolve_customer(
    profile: Option<&UserProfile>,
    pending: Option<&PaymentResult>,
    order: &Order,
) -> CustomerInfo {
    let shipping = pending
        .filter(|p| p.order_id == order.order_id)
        .map(|p| &p.customer_info);

    let pick = |from_profile: Option<&String>, from_shipping: Option<&String>, from_order: &str| {
        from_profile
            .filter(|v| !v.is_empty())
            .or(from_shipping.filter(|v| !v.is_empty()))
            .cloned()
            .unwrap_or_else(|| from_order.to_string())
    };

    CustomerInfo {
        name: pick(
            profile.and_then(|p| p.name.as_ref()),
            shipping.map(|s| &s.name),
            &order.name,
        ),
        email: profile
            .map(|p| p.email.clone())
            .or_else(|| shipping.and_then(|s| s.email.clone()))
            .or_else(|| order.email.clone()),
        phone: pick(
            profile.and_then(|p| p.phone.as_ref()),
            shipping.map(|s| &s.phone),
            &order.phone,
        ),
        address: pick(
            profile.and_then(|p| p.address.as_ref()),
            shipping.map(|s| &s.address),
            &order.address,
        ),
    }
}

/// How the last submission failed, which decides whether a retry may reuse
/// the idempotency key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The backend answered and refused the payment. A retry is a new payment.
    Declined,
    /// No usable answer arrived, so the charge may have gone through. A retry
    /// keeps the key and the backend replays its first reply.
    Unconfirmed,
}

/// One pass through the payment page: load the order, then pay it.
///
/// Each attempt carries an idempotency key that the backend uses to collapse
/// duplicate submissions. A second submit is refused while one is in flight
/// or after a success.
#[derive(Debug)]
pub struct PaymentAttempt {
    phase: PaymentPhase,
    order: Option<Order>,
    idempotency_key: Uuid,
    last_failure: Option<FailureKind>,
}

impl Default for PaymentAttempt {
    fn default() -> Self {
        Self::new()
    }
}

impl PaymentAttempt {
    pub fn new() -> Self {
        Self {
            phase: PaymentPhase::Idle,
            order: None,
            idempotency_key: Uuid::new_v4(),
            last_failure: None,
        }
    }

    pub fn phase(&self) -> PaymentPhase {
        self.phase
    }

    pub fn order(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    pub fn idempotency_key(&self) -> Uuid {
        self.idempotency_key
    }

    pub fn last_failure(&self) -> Option<FailureKind> {
        self.last_failure
    }

    fn transition(&mut self, next: PaymentPhase) {
        info!(from = %self.phase, to = %next, key = %self.idempotency_key, "payment phase");
        self.phase = next;
    }

    /// Fetch the authoritative order. Failures here are fatal to the attempt:
    /// the phase returns to `Idle` and nothing is retried.
    pub async fn load_order(&mut self, state: &AppState, order_id: Option<&str>) -> AppResult<&Order> {
        if self.phase != PaymentPhase::Idle {
            return Err(AppError::InvalidState(format!(
                "cannot load an order while {}",
                self.phase
            )));
        }
        let order_id = order_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(AppError::MissingOrderId)?;

        self.transition(PaymentPhase::LoadingOrder);
        let loaded = async {
            state.client.health().await.map_err(|err| match err {
                AppError::Connectivity(_) => err,
                other => AppError::Connectivity(other.to_string()),
            })?;
            state.client.payment_order(order_id).await
        }
        .await;

        match loaded {
            Ok(order) => {
                self.transition(PaymentPhase::OrderLoaded);
                let order: &Order = self.order.insert(order);
                Ok(order)
            }
            Err(err) => {
                error!(order_id, error = %err, "could not load order for payment");
                self.transition(PaymentPhase::Idle);
                Err(err)
            }
        }
    }

    fn begin_submit(&mut self) -> AppResult<Order> {
        match self.phase {
            PaymentPhase::OrderLoaded => {}
            PaymentPhase::Failed => match self.last_failure {
                Some(FailureKind::Declined) => self.idempotency_key = Uuid::new_v4(),
                _ => info!(key = %self.idempotency_key, "retrying unconfirmed payment with the same key"),
            },
            PaymentPhase::Submitting => {
                return Err(AppError::InvalidState(
                    "a payment for this order is already being processed".into(),
                ));
            }
            PaymentPhase::Succeeded => {
                return Err(AppError::InvalidState(
                    "this order has already been paid".into(),
                ));
            }
            PaymentPhase::Idle | PaymentPhase::LoadingOrder => {
                return Err(AppError::InvalidState("load the order before paying".into()));
            }
        }
        self.order
            .clone()
            .ok_or_else(|| AppError::InvalidState("no order loaded".into()))
    }

    /// Submit a card payment and record the outcome for the confirmation view.
    ///
    /// A declined payment is still `Ok`: the returned record has
    /// `success == false`. Transport failures are recorded the same way and
    /// then returned as errors; the attempt keeps its key so a retry cannot
    /// charge twice. Once the request is sent the phase always leaves
    /// `Submitting`, even if recording the outcome fails.
    pub async fn submit_card(&mut self, state: &AppState, card: &CardDetails) -> AppResult<PaymentResult> {
        let errors = card.validate(Utc::now().date_naive());
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }
        let profile = state.session.user()?;
        let pending = state.session.payment_result()?;
        let order = self.begin_submit()?;
        let customer = resolve_customer(profile.as_ref(), pending.as_ref(), &order);
        self.transition(PaymentPhase::Submitting);

        let request = ProcessPaymentRequest {
            order_id: order.order_id.clone(),
            card_details: card.payload(),
        };
        let outcome = state
            .client
            .process_direct(&request, self.idempotency_key)
            .await;

        let mut record = PaymentResult {
            success: false,
            awaiting_payment: false,
            order_id: order.order_id.clone(),
            amount: order.total_amount,
            payment_method: PaymentMethod::Card,
            transaction_id: None,
            card_last4: Some(card.last4()),
            message: String::new(),
            errors: Vec::new(),
            customer_info: customer,
            items: order.ordered_items.clone(),
            recorded_at: Utc::now(),
        };

        let failure = match outcome {
            Ok(ProcessPaymentResponse {
                success: true,
                message,
                payment_id,
                data,
                ..
            }) => {
                record.success = true;
                record.transaction_id = payment_id;
                if let Some(last4) = data.and_then(|d| d.card_last4) {
                    record.card_last4 = Some(last4);
                }
                record.message = if message.is_empty() {
                    "Payment successful".into()
                } else {
                    message
                };
                None
            }
            Ok(ProcessPaymentResponse {
                message, errors, ..
            }) => {
                record.message = if message.is_empty() {
                    "Payment failed".into()
                } else {
                    message
                };
                record.errors = flatten_errors(&errors);
                Some((FailureKind::Declined, None))
            }
            Err(AppError::Rejected { message, errors }) => {
                record.message = message;
                record.errors = errors;
                Some((FailureKind::Declined, None))
            }
            Err(err @ (AppError::Connectivity(_) | AppError::Internal(_))) => {
                record.message = err.to_string();
                Some((FailureKind::Unconfirmed, Some(err)))
            }
            Err(err) => {
                record.message = err.to_string();
                Some((FailureKind::Declined, Some(err)))
            }
        };

        let (next, error) = match failure {
            None => (PaymentPhase::Succeeded, None),
            Some((kind, error)) => {
                warn!(order_id = %record.order_id, message = %record.message, ?kind, "payment failed");
                self.last_failure = Some(kind);
                (PaymentPhase::Failed, error)
            }
        };
        self.transition(next);

        state.session.set_payment_result(&record)?;
        match error {
            Some(err) => Err(err),
            None => Ok(record),
        }
    }

    /// Cash on delivery and bank transfer settle outside this flow; the
    /// order is confirmed and the record marks it as paid later.
    pub fn confirm_offline(&mut self, state: &AppState, method: PaymentMethod) -> AppResult<PaymentResult> {
        if method == PaymentMethod::Card {
            return Err(AppError::InvalidState("card payments must be submitted".into()));
        }
        let profile = state.session.user()?;
        let pending = state.session.payment_result()?;
        let order = self.begin_submit()?;
        self.transition(PaymentPhase::Submitting);

        let message = match method {
            PaymentMethod::BankTransfer => {
                "Order confirmed. Transfer the total and quote your order id as the reference."
            }
            _ => "Order confirmed. Pay the courier on delivery.",
        };
        let record = PaymentResult {
            success: true,
            awaiting_payment: false,
            order_id: order.order_id.clone(),
            amount: order.total_amount,
            payment_method: method,
            transaction_id: None,
            card_last4: None,
            message: message.into(),
            errors: Vec::new(),
            customer_info: resolve_customer(profile.as_ref(), pending.as_ref(), &order),
            items: order.ordered_items.clone(),
            recorded_at: Utc::now(),
        };
        self.transition(PaymentPhase::Succeeded);
        state.session.set_payment_result(&record)?;
        Ok(record)
    }
}
