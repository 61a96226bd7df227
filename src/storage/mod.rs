//! Client-local persistence.
//!
//! Everything the client remembers between runs (cart, auth token, signed-in
//! user, last payment result) lives behind the [`Storage`] trait as string
//! values under fixed keys. Typed access goes through [`CartRepository`] and
//! [`SessionRepository`], which wrap every value in a versioned envelope.

use thiserror::Error;

mod file;
mod memory;
mod repository;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use repository::{CartRepository, SCHEMA_VERSION, SessionRepository};

pub mod keys {
    pub const CART: &str = "cart";
    pub const TOKEN: &str = "token";
    pub const USER: &str = "user";
    pub const PAYMENT_RESULT: &str = "paymentSuccess";
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored data is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("unsupported schema version {found} for key {key}")]
    UnsupportedVersion { key: String, found: u32 },

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// A string-keyed store. Each `set` replaces the previous value for the key
/// as a whole.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
}
