use tracing::debug;

use crate::{error::AppResult, models::PaymentResult, storage::SessionRepository};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationView {
    Success(PaymentResult),
    Failure(PaymentResult),
    /// The order exists but has not been paid yet.
    AwaitingPayment(PaymentResult),
    /// Nothing recorded: rendered as "no payment data found".
    Missing,
}

impl ConfirmationView {
    pub fn is_success(&self) -> bool {
        matches!(self, ConfirmationView::Success(_))
    }
}

/// Read the last recorded result without consuming it.
pub fn view(session: &SessionRepository) -> AppResult<ConfirmationView> {
    Ok(match session.payment_result()? {
        None => ConfirmationView::Missing,
        Some(result) if result.awaiting_payment => ConfirmationView::AwaitingPayment(result),
        Some(result) if result.success => ConfirmationView::Success(result),
        Some(result) => ConfirmationView::Failure(result),
    })
}

/// Leaving the confirmation screen discards the record.
pub fn back_to_shop(session: &SessionRepository) -> AppResult<()> {
    session.clear_payment_result()?;
    debug!("payment result discarded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use super::*;
    use crate::{
        models::{CustomerInfo, PaymentMethod},
        storage::MemoryStore,
    };

    fn result(success: bool, awaiting_payment: bool) -> PaymentResult {
        PaymentResult {
            success,
            awaiting_payment,
            order_id: "ORD-1".into(),
            amount: 4300,
            payment_method: PaymentMethod::Card,
            transaction_id: success.then(|| "PAY-1".to_string()),
            card_last4: Some("4242".into()),
            message: "done".into(),
            errors: vec![],
            customer_info: CustomerInfo::default(),
            items: vec![],
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn lifecycle_success_then_back_to_shop() {
        let session = SessionRepository::new(Arc::new(MemoryStore::new()));
        session.set_payment_result(&result(true, false)).unwrap();

        let first = view(&session).unwrap();
        assert!(first.is_success());

        back_to_shop(&session).unwrap();
        assert_eq!(view(&session).unwrap(), ConfirmationView::Missing);
    }

    #[test]
    fn failure_and_pending_records_branch() {
        let session = SessionRepository::new(Arc::new(MemoryStore::new()));
        session.set_payment_result(&result(false, false)).unwrap();
        assert!(matches!(view(&session).unwrap(), ConfirmationView::Failure(_)));

        session.set_payment_result(&result(false, true)).unwrap();
        assert!(matches!(
            view(&session).unwrap(),
            ConfirmationView::AwaitingPayment(_)
        ));
    }
}
