use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::response::ApiMessage;

#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    BadRequest {
        message: String,
        errors: Vec<String>,
    },

    #[error("Authentication required")]
    Unauthorized,
}

impl SandboxError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        SandboxError::BadRequest {
            message: message.into(),
            errors: Vec::new(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            SandboxError::NotFound(_) => StatusCode::NOT_FOUND,
            SandboxError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            SandboxError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for SandboxError {
    fn into_response(self) -> Response {
        let status = self.status();
        let errors = match &self {
            SandboxError::BadRequest { errors, .. } => errors.clone(),
            _ => Vec::new(),
        };
        let body = ApiMessage::failure(self.to_string()).with_errors(errors);
        (status, Json(body)).into_response()
    }
}

pub type SandboxResult<T> = Result<T, SandboxError>;
