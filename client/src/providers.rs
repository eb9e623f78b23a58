//! Collaborator traits
//!
//! The state slices never talk to the network directly. They call these
//! traits from `Effect::Future` tasks, so every returned future must be
//! `Send`. Production code uses [`ApiClient`](crate::http::ApiClient); tests
//! use the mocks in [`crate::mocks`].

use crate::checkout::{OrderConfirmation, OrderRequest};
use crate::error::ClientError;
use crate::types::{AuthResponse, Credentials, Event, Registration, User};
use std::future::Future;

/// Authentication backend
pub trait AuthClient: Send + Sync {
    /// Exchange credentials for a user and token
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Rejected`] when the credentials are refused, or
    /// a transport error.
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<AuthResponse, ClientError>> + Send;

    /// Create an account and sign in
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Rejected`] when the registration is refused, or
    /// a transport error.
    fn register(
        &self,
        registration: &Registration,
    ) -> impl Future<Output = Result<AuthResponse, ClientError>> + Send;

    /// Invalidate the current token remotely
    ///
    /// # Errors
    ///
    /// Returns a transport error. Callers treat this as best-effort.
    fn logout(&self) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Fetch the user the stored token belongs to
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Unauthorized`] when the token is no longer
    /// valid, or a transport error.
    fn current_user(&self) -> impl Future<Output = Result<User, ClientError>> + Send;
}

/// Read-only event catalogue
pub trait EventSource: Send + Sync {
    /// Look up a published event by its URL slug
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] with status 404 for unknown slugs, or a
    /// transport error.
    fn event_by_slug(&self, slug: &str) -> impl Future<Output = Result<Event, ClientError>> + Send;
}

/// Order placement backend
pub trait OrderClient: Send + Sync {
    /// Submit an order
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Rejected`] when the order is refused (sold out,
    /// invalid buyer), or a transport error.
    fn create_order(
        &self,
        request: &OrderRequest,
    ) -> impl Future<Output = Result<OrderConfirmation, ClientError>> + Send;
}
