mod common;

use central_pet_care::{
    dto::payments::{CardDetailsPayload, ProcessPaymentRequest},
    error::AppError,
    models::{OrderStatus, PaymentMethod},
    sandbox::{DECLINED_CARD, INSUFFICIENT_FUNDS_CARD, SUCCESS_CARD},
    services::{
        confirmation_service::{self, ConfirmationView},
        payment_service::{PaymentAttempt, PaymentPhase},
        tracking_service,
    },
};
use common::{TestBackend, card, place_order};
use uuid::Uuid;

#[tokio::test]
async fn card_payment_confirms_then_order_is_tracked_and_advanced() -> anyhow::Result<()> {
    let backend = TestBackend::spawn().await?;
    let customer = backend.sign_in("nimal@example.com", "customer")?;
    let order_id = place_order(&customer).await?;

    assert!(matches!(
        confirmation_service::view(&customer.session)?,
        ConfirmationView::AwaitingPayment(_)
    ));

    let mut attempt = PaymentAttempt::new();
    let order = attempt.load_order(&customer, Some(order_id.as_str())).await?;
    assert_eq!(order.total_amount, 1500 + 2 * 650 + 500);

    let result = attempt.submit_card(&customer, &card(SUCCESS_CARD)).await?;
    assert!(result.success);
    assert_eq!(attempt.phase(), PaymentPhase::Succeeded);
    assert_eq!(result.card_last4.as_deref(), Some("4242"));
    assert!(result.transaction_id.as_deref().is_some_and(|id| id.starts_with("PAY-")));
    assert_eq!(result.customer_info.name, "Nimal Perera");

    let view = confirmation_service::view(&customer.session)?;
    assert!(view.is_success());
    // Viewing does not consume the record.
    assert!(confirmation_service::view(&customer.session)?.is_success());
    confirmation_service::back_to_shop(&customer.session)?;
    assert_eq!(confirmation_service::view(&customer.session)?, ConfirmationView::Missing);

    let again = attempt.submit_card(&customer, &card(SUCCESS_CARD)).await;
    assert!(matches!(again, Err(AppError::InvalidState(_))));

    let (tracked, progress) = tracking_service::track_order(&customer, &order_id).await?;
    assert_eq!(tracked.status, OrderStatus::Pending);
    assert_eq!(progress.current, Some(0));
    assert_eq!(progress.percent, 0);

    let denied = tracking_service::update_status(&customer, &order_id, OrderStatus::Shipped).await;
    assert!(matches!(denied, Err(AppError::Forbidden)));

    let staff = backend.sign_in("staff@example.com", "admin")?;
    let updated = tracking_service::update_status(&staff, &order_id, OrderStatus::Shipped).await?;
    assert_eq!(updated.status, OrderStatus::Shipped);
    let (_, progress) = tracking_service::track_order(&staff, &order_id).await?;
    assert_eq!(progress.percent, 75);

    let backwards = tracking_service::update_status(&staff, &order_id, OrderStatus::Pending).await;
    assert!(matches!(backwards, Err(AppError::InvalidState(_))));
    Ok(())
}

#[tokio::test]
async fn declined_card_is_recorded_and_retry_uses_new_key() -> anyhow::Result<()> {
    let backend = TestBackend::spawn().await?;
    let state = backend.state()?;
    let order_id = place_order(&state).await?;

    let mut attempt = PaymentAttempt::new();
    attempt.load_order(&state, Some(order_id.as_str())).await?;
    let first_key = attempt.idempotency_key();

    let declined = attempt.submit_card(&state, &card(DECLINED_CARD)).await?;
    assert!(!declined.success);
    assert_eq!(declined.message, "Your card was declined.");
    assert_eq!(attempt.phase(), PaymentPhase::Failed);
    assert!(matches!(
        confirmation_service::view(&state.session)?,
        ConfirmationView::Failure(_)
    ));

    let short = attempt.submit_card(&state, &card(INSUFFICIENT_FUNDS_CARD)).await?;
    assert_eq!(short.message, "Insufficient funds.");
    assert_ne!(attempt.idempotency_key(), first_key);

    let paid = attempt.submit_card(&state, &card(SUCCESS_CARD)).await?;
    assert!(paid.success);
    Ok(())
}

#[tokio::test]
async fn invalid_card_never_reaches_the_backend() -> anyhow::Result<()> {
    let backend = TestBackend::spawn().await?;
    let state = backend.state()?;
    let order_id = place_order(&state).await?;

    let mut attempt = PaymentAttempt::new();
    attempt.load_order(&state, Some(order_id.as_str())).await?;
    let mut bad = card("4242");
    bad.expiry = "13/30".into();
    let err = attempt.submit_card(&state, &bad).await.unwrap_err();
    assert_eq!(err.field_errors().len(), 2);
    assert_eq!(attempt.phase(), PaymentPhase::OrderLoaded);
    assert!(matches!(
        confirmation_service::view(&state.session)?,
        ConfirmationView::AwaitingPayment(_)
    ));
    Ok(())
}

#[tokio::test]
async fn repeated_idempotency_key_replays_the_first_reply() -> anyhow::Result<()> {
    let backend = TestBackend::spawn().await?;
    let state = backend.state()?;
    let order_id = place_order(&state).await?;

    let request = ProcessPaymentRequest {
        order_id: order_id.clone(),
        card_details: CardDetailsPayload {
            card_number: SUCCESS_CARD.into(),
            expiry_date: "12/30".into(),
            cvv: "123".into(),
            cardholder_name: "Nimal Perera".into(),
        },
    };
    let key = Uuid::new_v4();
    let first = state.client.process_direct(&request, key).await?;
    let replay = state.client.process_direct(&request, key).await?;
    assert!(first.success);
    assert_eq!(first.payment_id, replay.payment_id);

    let err = state
        .client
        .process_direct(&request, Uuid::new_v4())
        .await
        .unwrap_err();
    match err {
        AppError::Rejected { message, .. } => assert_eq!(message, "Order already paid"),
        other => panic!("expected rejection, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn missing_or_unknown_order_is_fatal() -> anyhow::Result<()> {
    let backend = TestBackend::spawn().await?;
    let state = backend.state()?;

    let mut attempt = PaymentAttempt::new();
    let err = attempt.load_order(&state, None).await.unwrap_err();
    assert!(matches!(err, AppError::MissingOrderId));
    assert!(err.is_fatal());

    let err = attempt.load_order(&state, Some("ORD-NOPE")).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "got {err:?}");
    assert_eq!(attempt.phase(), PaymentPhase::Idle);
    Ok(())
}

#[tokio::test]
async fn cash_on_delivery_confirms_without_card() -> anyhow::Result<()> {
    let backend = TestBackend::spawn().await?;
    let state = backend.state()?;
    let order_id = place_order(&state).await?;

    let mut attempt = PaymentAttempt::new();
    attempt.load_order(&state, Some(order_id.as_str())).await?;
    let result = attempt.confirm_offline(&state, PaymentMethod::CashOnDelivery)?;
    assert!(result.success);
    assert_eq!(result.payment_method, PaymentMethod::CashOnDelivery);
    assert!(result.card_last4.is_none());
    Ok(())
}

#[tokio::test]
async fn order_history_needs_a_signed_in_account() -> anyhow::Result<()> {
    let backend = TestBackend::spawn().await?;
    let anonymous = backend.state()?;
    let err = tracking_service::order_history(&anonymous).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthenticated));

    let customer = backend.sign_in("nimal@example.com", "customer")?;
    let first = place_order(&customer).await?;
    let second = place_order(&customer).await?;

    let orders = tracking_service::order_history(&customer).await?;
    let ids: Vec<_> = orders.iter().map(|o| o.order_id.clone()).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&first) && ids.contains(&second));
    Ok(())
}
