mod common;

use central_pet_care::{
    error::AppError,
    services::{
        cart_service,
        hydration_service::CartHydrator,
        shipping_service::{self, compute_totals},
    },
};
use common::{TestBackend, draft};

#[tokio::test]
async fn hydration_joins_prices_and_flags_unknown_products() -> anyhow::Result<()> {
    let backend = TestBackend::spawn().await?;
    let state = backend.state()?;

    cart_service::add(&state.carts, "dog-food-5kg", 2)?;
    cart_service::add(&state.carts, "discontinued", 1)?;
    cart_service::add(&state.carts, "chew-toy", 1)?;

    let entries = cart_service::load(&state.carts)?;
    let hydrated = CartHydrator::new().hydrate(&state.client, &entries).await;
    assert!(!hydrated.stale);
    assert_eq!(hydrated.items.len(), 3);
    assert!(!hydrated.items[1].available);

    let totals = compute_totals(&hydrated.items);
    assert_eq!(totals.subtotal, 2 * 1500 + 800);
    assert_eq!(totals.total, totals.subtotal + 500);
    Ok(())
}

#[tokio::test]
async fn failed_refresh_keeps_last_snapshot() -> anyhow::Result<()> {
    let backend = TestBackend::spawn().await?;
    let state = backend.state()?;
    cart_service::add(&state.carts, "cat-food-2kg", 1)?;
    let entries = cart_service::load(&state.carts)?;

    let mut hydrator = CartHydrator::new();
    hydrator.hydrate(&state.client, &entries).await;

    let offline = TestBackend {
        base_url: "http://127.0.0.1:9".into(),
        store: backend.store.clone(),
    }
    .state()?;
    let hydrated = hydrator.hydrate(&offline.client, &entries).await;
    assert!(hydrated.stale);
    assert!(hydrated.warning.is_some());
    assert_eq!(hydrated.items[0].price, 1200);
    Ok(())
}

#[tokio::test]
async fn order_submission_clears_cart_and_records_pending_payment() -> anyhow::Result<()> {
    let backend = TestBackend::spawn().await?;
    let state = backend.sign_in("nimal@example.com", "customer")?;

    cart_service::add(&state.carts, "pet-bed-m", 1)?;
    cart_service::add(&state.carts, "leash-nylon", 2)?;
    let entries = cart_service::load(&state.carts)?;
    let hydrated = CartHydrator::new().hydrate(&state.client, &entries).await;

    let submission = shipping_service::submit_order(&state, &draft(), &hydrated.items).await?;
    assert!(submission.order_id.starts_with("ORD-"));
    assert_eq!(submission.totals.total, 5400 + 2 * 950 + 500);
    assert!(cart_service::load(&state.carts)?.is_empty());

    let pending = state.session.payment_result()?.expect("pending record");
    assert!(pending.awaiting_payment);
    assert_eq!(pending.order_id, submission.order_id);
    assert_eq!(pending.customer_info.email.as_deref(), Some("nimal@example.com"));

    let order = state.client.get_order(&submission.order_id).await?;
    assert_eq!(order.total_amount, submission.totals.total);
    assert_eq!(order.ordered_items.len(), 2);
    Ok(())
}

#[tokio::test]
async fn invalid_draft_is_rejected_before_any_request() -> anyhow::Result<()> {
    let backend = TestBackend::spawn().await?;
    let state = backend.state()?;
    cart_service::add(&state.carts, "chew-toy", 1)?;
    let entries = cart_service::load(&state.carts)?;
    let hydrated = CartHydrator::new().hydrate(&state.client, &entries).await;

    let mut bad = draft();
    bad.phone = "12345".into();
    bad.city = "Jaffna".into();
    let err = shipping_service::submit_order(&state, &bad, &hydrated.items)
        .await
        .unwrap_err();
    let fields: Vec<_> = err.field_errors().iter().map(|e| e.field.clone()).collect();
    assert_eq!(fields, vec!["city", "phone"]);
    assert_eq!(cart_service::load(&state.carts)?.len(), 1);
    assert!(state.session.payment_result()?.is_none());
    Ok(())
}

#[tokio::test]
async fn empty_cart_cannot_be_ordered() -> anyhow::Result<()> {
    let backend = TestBackend::spawn().await?;
    let state = backend.state()?;
    let err = shipping_service::submit_order(&state, &draft(), &[])
        .await
        .unwrap_err();
    assert!(!matches!(err, AppError::Connectivity(_)), "got {err:?}");
    Ok(())
}

#[tokio::test]
async fn catalog_lists_everything_or_one_category() -> anyhow::Result<()> {
    let backend = TestBackend::spawn().await?;
    let state = backend.state()?;

    let all = state.client.list_products(None).await?;
    assert_eq!(all.len(), 6);

    let toys = state.client.list_products(Some("toys")).await?;
    let ids: Vec<_> = toys.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["chew-toy", "feather-wand"]);
    Ok(())
}
