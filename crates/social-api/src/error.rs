use axum::http::StatusCode;
use thiserror::Error;
use tracing::{error, warn};

/// Every way an account or message operation can fail.
///
/// Lookups that find nothing are not errors; they come back as `None`.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid account: {0}")]
    Validation(&'static str),

    #[error("username already exists")]
    DuplicateUsername,

    #[error("account is not authorized")]
    Unauthorized,

    #[error("invalid message: {0}")]
    MessageValidation(&'static str),

    #[error("store failure: {0}")]
    Store(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::MessageValidation(_) => StatusCode::BAD_REQUEST,
            Self::DuplicateUsername => StatusCode::CONFLICT,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for StatusCode {
    fn from(err: ServiceError) -> Self {
        match &err {
            ServiceError::Store(e) => error!("Store error: {:#}", e),
            other => warn!("Request rejected: {}", other),
        }
        err.status_code()
    }
}
