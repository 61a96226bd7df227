use std::sync::Arc;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use super::{Storage, StorageError, StorageResult, keys};
use crate::models::{CartEntry, PaymentResult, UserProfile};

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    version: u32,
    data: &'a T,
}

#[derive(Deserialize)]
struct Envelope<T> {
    version: u32,
    data: T,
}

fn read<T: DeserializeOwned>(store: &dyn Storage, key: &str) -> StorageResult<Option<T>> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    let envelope: Envelope<serde_json::Value> = serde_json::from_str(&raw)?;
    if envelope.version != SCHEMA_VERSION {
        return Err(StorageError::UnsupportedVersion {
            key: key.to_string(),
            found: envelope.version,
        });
    }
    Ok(Some(serde_json::from_value(envelope.data)?))
}

fn write<T: Serialize>(store: &dyn Storage, key: &str, data: &T) -> StorageResult<()> {
    let raw = serde_json::to_string(&EnvelopeRef {
        version: SCHEMA_VERSION,
        data,
    })?;
    store.set(key, &raw)
}

/// Persisted cart lines under the `cart` key.
#[derive(Clone)]
pub struct CartRepository {
    store: Arc<dyn Storage>,
}

impl CartRepository {
    pub fn new(store: Arc<dyn Storage>) -> Self {
        Self { store }
    }

    /// Absence of a stored cart is an empty cart, not an error.
    pub fn get(&self) -> StorageResult<Vec<CartEntry>> {
        Ok(read(self.store.as_ref(), keys::CART)?.unwrap_or_default())
    }

    pub fn set(&self, entries: &[CartEntry]) -> StorageResult<()> {
        write(self.store.as_ref(), keys::CART, &entries)
    }

    pub fn clear(&self) -> StorageResult<()> {
        self.store.remove(keys::CART)
    }
}

/// Auth token, signed-in user and the last payment result.
#[derive(Clone)]
pub struct SessionRepository {
    store: Arc<dyn Storage>,
}

impl SessionRepository {
    pub fn new(store: Arc<dyn Storage>) -> Self {
        Self { store }
    }

    pub fn token(&self) -> StorageResult<Option<String>> {
        read(self.store.as_ref(), keys::TOKEN)
    }

    pub fn set_token(&self, token: &str) -> StorageResult<()> {
        write(self.store.as_ref(), keys::TOKEN, &token)
    }

    pub fn clear_token(&self) -> StorageResult<()> {
        self.store.remove(keys::TOKEN)
    }

    pub fn user(&self) -> StorageResult<Option<UserProfile>> {
        read(self.store.as_ref(), keys::USER)
    }

    pub fn set_user(&self, user: &UserProfile) -> StorageResult<()> {
        write(self.store.as_ref(), keys::USER, user)
    }

    pub fn clear_user(&self) -> StorageResult<()> {
        self.store.remove(keys::USER)
    }

    pub fn payment_result(&self) -> StorageResult<Option<PaymentResult>> {
        read(self.store.as_ref(), keys::PAYMENT_RESULT)
    }

    pub fn set_payment_result(&self, result: &PaymentResult) -> StorageResult<()> {
        write(self.store.as_ref(), keys::PAYMENT_RESULT, result)
    }

    pub fn clear_payment_result(&self) -> StorageResult<()> {
        self.store.remove(keys::PAYMENT_RESULT)
    }

    pub fn sign_out(&self) -> StorageResult<()> {
        self.clear_token()?;
        self.clear_user()
    }
}
