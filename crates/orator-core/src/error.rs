// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Orator assessment bot.

use thiserror::Error;

/// The primary error type used across all Orator adapter traits and core operations.
#[derive(Debug, Error)]
pub enum OratorError {
    /// Configuration errors (invalid TOML, missing credentials, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Channel adapter errors (connection failure, download failure, send failure).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Inference provider errors. `status` carries the HTTP status when the
    /// provider answered with one.
    #[error("provider error: {message}")]
    Provider {
        message: String,
        status: Option<u16>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A backend answered, but the answer could not be read as an assessment.
    #[error("malformed response from {backend}: {message}")]
    MalformedResponse { backend: String, message: String },

    /// Every inference candidate failed within one attempt cycle.
    #[error("all inference backends exhausted after {attempts} attempts: {last_error}")]
    ProviderExhausted { attempts: u32, last_error: String },

    /// The user has no quota left for today.
    #[error("daily limit exceeded for user {user_id}")]
    LimitExceeded { user_id: String },

    /// A referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl OratorError {
    /// Provider error without an HTTP status (connection failure, local refusal).
    pub fn provider(message: impl Into<String>) -> Self {
        OratorError::Provider {
            message: message.into(),
            status: None,
            source: None,
        }
    }

    /// Provider error carrying the HTTP status the backend answered with.
    pub fn provider_status(status: u16, message: impl Into<String>) -> Self {
        OratorError::Provider {
            message: message.into(),
            status: Some(status),
            source: None,
        }
    }

    /// Maps this error onto the single message class a user may see.
    ///
    /// Raw provider text never leaves this mapping.
    pub fn user_facing(&self) -> UserFacing {
        match self {
            OratorError::LimitExceeded { .. } => UserFacing::LimitExceeded,
            OratorError::MalformedResponse { .. } => UserFacing::MalformedResponse,
            OratorError::ProviderExhausted { .. } | OratorError::Provider { .. } => {
                UserFacing::ProviderExhausted
            }
            _ => UserFacing::TransportUnavailable,
        }
    }
}

/// User-visible failure classes. Each maps to exactly one reply text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserFacing {
    /// Quota denial; recoverable by waiting for tomorrow or inviting friends.
    LimitExceeded,
    /// No inference backend could serve the request.
    ProviderExhausted,
    /// Backends answered but never with a usable assessment.
    MalformedResponse,
    /// Storage or network fault on the assessment path.
    TransportUnavailable,
}
