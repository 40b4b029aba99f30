use std::path::Path;

use thiserror::Error;
use uuid::Uuid;

use crate::domain::offer::OfferError;
use crate::domain::registration::RegistrationError;

/// Failures surfaced by the referee desk. None of these are fatal to the process.
#[derive(Debug, Error)]
pub enum OpsError {
    #[error("data store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("failed to write data store: {0}")]
    StoreWriteFailed(String),

    #[error("could not deliver to {recipient}: {reason}")]
    DeliveryFailed { recipient: String, reason: String },

    #[error("no available referees found for this criteria")]
    PoolExhausted,

    #[error("invalid target: {0}")]
    InvalidTarget(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("offer {0} not found or no longer pending")]
    OfferNotFound(Uuid),

    #[error(transparent)]
    Offer(#[from] OfferError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),
}

impl OpsError {
    pub fn not_registered(user_id: &str) -> Self {
        OpsError::InvalidTarget(format!("user {} is not registered", user_id))
    }

    pub fn delivery(recipient: &str, reason: impl std::fmt::Display) -> Self {
        OpsError::DeliveryFailed {
            recipient: recipient.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn write_failed(err: anyhow::Error) -> Self {
        OpsError::StoreWriteFailed(format!("{:#}", err))
    }
}

/// Add context to store errors
pub fn store_context(operation: &str, path: &Path) -> String {
    format!("Failed to {} data store at {}", operation, path.display())
}

/// Add context to delivery errors
pub fn delivery_context(kind: &str, recipient: &str) -> String {
    format!("Failed to deliver {} to {}", kind, recipient)
}
