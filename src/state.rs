use std::sync::Arc;

use crate::{
    client::ApiClient,
    config::AppConfig,
    error::AppResult,
    storage::{CartRepository, JsonFileStore, SessionRepository, Storage},
};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub client: ApiClient,
    pub carts: CartRepository,
    pub session: SessionRepository,
}

impl AppState {
    /// Wire the repositories over `store` and attach any persisted bearer token
    /// to the API client.
    pub fn new(config: AppConfig, store: Arc<dyn Storage>) -> AppResult<Self> {
        let carts = CartRepository::new(store.clone());
        let session = SessionRepository::new(store);
        let client = ApiClient::new(&config)?.with_token(session.token()?);
        Ok(Self {
            config,
            client,
            carts,
            session,
        })
    }

    pub fn open(config: AppConfig) -> AppResult<Self> {
        let store = JsonFileStore::open(&config.store_path)?;
        Self::new(config, Arc::new(store))
    }
}
