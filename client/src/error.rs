//! Error types for the marketplace client
//!
//! Collaborator errors ([`ClientError`], [`StorageError`]) describe what went
//! wrong talking to the outside world. Facade errors ([`SessionError`],
//! [`CheckoutError`]) describe what the caller sees.

use marquee_runtime::StoreError;
use thiserror::Error;

/// Errors returned by the auth, event and order collaborators
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The backend refused the request, optionally saying why
    #[error("Rejected: {}", message.as_deref().unwrap_or("no reason given"))]
    Rejected {
        /// Message suitable for display
        message: Option<String>,
    },

    /// The stored token is missing, expired or revoked, or the
    /// credentials were refused with `401`
    #[error("Unauthorized: {}", message.as_deref().unwrap_or("no reason given"))]
    Unauthorized {
        /// Backend-provided reason
        message: Option<String>,
    },

    /// The request never completed (connection, TLS, timeout)
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The response body was not what we expected
    #[error("Failed to parse response: {0}")]
    ResponseParseFailed(String),

    /// Non-success status without a more specific mapping
    #[error("API error ({status}): {}", message.as_deref().unwrap_or("no message"))]
    Api {
        /// HTTP status code
        status: u16,
        /// Backend-provided message
        message: Option<String>,
    },

    /// Token persistence failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ClientError {
    /// Message the UI may show verbatim, if the backend supplied one
    ///
    /// Transport and parse failures have no user-facing message; callers
    /// substitute a generic fallback.
    #[must_use]
    pub fn user_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message }
            | Self::Unauthorized { message }
            | Self::Api { message, .. } => message.as_deref().filter(|m| !m.is_empty()),
            Self::RequestFailed(_) | Self::ResponseParseFailed(_) | Self::Storage(_) => None,
        }
    }
}

/// Errors from the key-value persistence layer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Reading or writing the backing medium failed
    #[error("Storage I/O failed: {0}")]
    Io(String),

    /// Stored bytes could not be decoded
    #[error("Stored value is corrupt: {0}")]
    Corrupt(String),
}

/// Errors surfaced by session operations on the facade
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Credentials or registration data were refused
    ///
    /// `message` is what the session state recorded; `source` is the
    /// collaborator error it was derived from.
    #[error("{message}")]
    Rejected {
        /// Display message
        message: String,
        /// Original collaborator error
        source: ClientError,
    },

    /// The state store could not complete the operation
    #[error(transparent)]
    Runtime(#[from] StoreError),
}

/// Errors surfaced by checkout on the facade
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// No selected event or every quantity is zero
    #[error("Cart is empty")]
    EmptyCart,

    /// Another order is still being submitted
    #[error("Checkout already in progress")]
    InProgress,

    /// The order collaborator refused the order
    #[error("{0}")]
    Rejected(String),

    /// The state store could not complete the operation
    #[error(transparent)]
    Runtime(#[from] StoreError),
}
