//! Error types for the core library.

use thiserror::Error;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Backend request failed.
    #[error(transparent)]
    Api(#[from] auramail_api::Error),

    /// Input rejected before any request was made.
    #[error("{0}")]
    Validation(String),

    /// Action not permitted in the current state.
    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        /// Name of the current state.
        state: &'static str,
        /// Action that was attempted.
        action: &'static str,
    },

    /// An identical request is already outstanding.
    #[error("A {0} request is already in progress")]
    InFlight(&'static str),

    /// The action needs an open message.
    #[error("No message is open")]
    NoMessageOpen,
}

impl Error {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
