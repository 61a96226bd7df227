#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use central_pet_care::{
    config::AppConfig,
    models::UserProfile,
    sandbox::{self, SandboxState},
    services::{
        cart_service, hydration_service::CartHydrator, payment_service::CardDetails,
        shipping_service::{self, ShippingDraft},
    },
    state::AppState,
    storage::{MemoryStore, Storage},
};

pub struct TestBackend {
    pub base_url: String,
    pub store: Arc<dyn Storage>,
}

impl TestBackend {
    /// Serve a freshly seeded sandbox on an ephemeral port.
    pub async fn spawn() -> anyhow::Result<Self> {
        Self::spawn_router(sandbox::app(SandboxState::seeded())).await
    }

    /// Serve `app`, usually the sandbox with an extra test layer on top.
    pub async fn spawn_router(app: Router) -> anyhow::Result<Self> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Ok(Self {
            base_url: format!("http://{addr}"),
            store: Arc::new(MemoryStore::new()),
        })
    }

    /// Client state over the shared store. Build a new one after signing in,
    /// since the bearer token is read at construction.
    pub fn state(&self) -> anyhow::Result<AppState> {
        self.state_with(&[])
    }

    /// Like [`TestBackend::state`] with some config keys overridden.
    pub fn state_with(&self, overrides: &[(&str, &str)]) -> anyhow::Result<AppState> {
        let base_url = self.base_url.clone();
        let overrides: Vec<(String, String)> = overrides
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let config = AppConfig::from_lookup(move |key| {
            if let Some((_, value)) = overrides.iter().find(|(k, _)| k == key) {
                return Some(value.clone());
            }
            match key {
                "PETCARE_API_URL" => Some(base_url.clone()),
                "PETCARE_REQUEST_TIMEOUT_SECS" => Some("5".into()),
                "PETCARE_PAYMENT_TIMEOUT_SECS" => Some("5".into()),
                _ => None,
            }
        })?;
        Ok(AppState::new(config, self.store.clone())?)
    }

    pub fn sign_in(&self, email: &str, user_type: &str) -> anyhow::Result<AppState> {
        let state = self.state()?;
        state.session.set_token("test-token")?;
        state.session.set_user(&UserProfile {
            email: email.into(),
            user_type: user_type.into(),
            name: Some("Nimal Perera".into()),
            phone: Some("0771234567".into()),
            address: None,
        })?;
        self.state()
    }
}

pub fn draft() -> ShippingDraft {
    ShippingDraft {
        first_name: "Nimal".into(),
        last_name: "Perera".into(),
        address: "12 Galle Road".into(),
        city: "Colombo".into(),
        province: "Western".into(),
        postal_code: "00300".into(),
        phone: "0771234567".into(),
    }
}

pub fn card(number: &str) -> CardDetails {
    CardDetails {
        number: number.into(),
        expiry: "12/30".into(),
        cvv: "123".into(),
        holder_name: "Nimal Perera".into(),
    }
}

/// Fill the cart, hydrate it and submit an order. Returns the order id.
pub async fn place_order(state: &AppState) -> anyhow::Result<String> {
    cart_service::add(&state.carts, "dog-food-5kg", 1)?;
    cart_service::add(&state.carts, "feather-wand", 2)?;
    let entries = cart_service::load(&state.carts)?;
    let hydrated = CartHydrator::new().hydrate(&state.client, &entries).await;
    let submission = shipping_service::submit_order(state, &draft(), &hydrated.items).await?;
    Ok(submission.order_id)
}
