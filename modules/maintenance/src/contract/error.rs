use thiserror::Error;
use uuid::Uuid;

/// Errors that are safe to expose to consumers of the module.
///
/// None of them is fatal: the caller reports the message and the store stays usable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MaintenanceError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Cannot {event} a request that is {from}")]
    InvalidTransition { from: String, event: String },

    #[error("Not permitted: {reason}")]
    NotPermitted { reason: String },

    #[error("Storage error: {message}")]
    Io { message: String },
}

impl MaintenanceError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn invalid_transition(from: impl Into<String>, event: impl Into<String>) -> Self {
        Self::InvalidTransition {
            from: from.into(),
            event: event.into(),
        }
    }

    pub fn not_permitted(reason: impl Into<String>) -> Self {
        Self::NotPermitted {
            reason: reason.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }
}

impl From<crate::domain::error::DomainError> for MaintenanceError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match domain_error {
            Validation { field, message } => Self::validation(format!("{field}: {message}")),
            InvalidTransition { from, event } => {
                Self::invalid_transition(from.as_str(), event.as_str())
            }
            NotPermitted { reason } => Self::not_permitted(reason),
            RequestNotFound { id } => Self::not_found("Request", id),
            UserNotFound { id } => Self::not_found("User", id),
            Storage { message } => Self::io(message),
        }
    }
}
