use thiserror::Error;
use uuid::Uuid;

use crate::contract::model::RequestStatus;
use crate::domain::lifecycle::LifecycleEvent;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Cannot {event} a request that is {from}")]
    InvalidTransition {
        from: RequestStatus,
        event: LifecycleEvent,
    },

    #[error("Not permitted: {reason}")]
    NotPermitted { reason: String },

    #[error("Request not found: {id}")]
    RequestNotFound { id: Uuid },

    #[error("User not found: {id}")]
    UserNotFound { id: Uuid },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl DomainError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invalid_transition(from: RequestStatus, event: LifecycleEvent) -> Self {
        Self::InvalidTransition { from, event }
    }

    pub fn not_permitted(reason: impl Into<String>) -> Self {
        Self::NotPermitted {
            reason: reason.into(),
        }
    }

    pub fn request_not_found(id: Uuid) -> Self {
        Self::RequestNotFound { id }
    }

    pub fn user_not_found(id: Uuid) -> Self {
        Self::UserNotFound { id }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Repository failure with its whole context chain.
    pub fn repository(e: anyhow::Error) -> Self {
        Self::storage(format!("{e:#}"))
    }
}
