use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::StorageError;

/// A single field-level validation problem, reported next to the offending input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed: {}", join_fields(.0))]
    Validation(Vec<FieldError>),

    #[error("Backend unreachable: {0}")]
    Connectivity(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("{message}")]
    Rejected {
        message: String,
        errors: Vec<String>,
    },

    #[error("Please sign in first")]
    Unauthenticated,

    #[error("Forbidden")]
    Forbidden,

    #[error("No order id supplied")]
    MissingOrderId,

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Storage error")]
    Storage(#[from] StorageError),

    #[error("Internal Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Errors that end the current flow and send the user back home rather
    /// than letting them correct and resubmit.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AppError::Connectivity(_)
                | AppError::MissingOrderId
                | AppError::NotFound(_)
                | AppError::Storage(_)
        )
    }

    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            AppError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Connectivity("request timed out".into())
        } else if err.is_connect() || err.is_request() {
            AppError::Connectivity(err.to_string())
        } else if err.is_decode() {
            AppError::Internal(anyhow::anyhow!("malformed response: {err}"))
        } else {
            AppError::Internal(err.into())
        }
    }
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type AppResult<T> = Result<T, AppError>;
