//! Session environment.

use crate::providers::AuthClient;
use crate::storage::KeyValueStore;
use std::sync::Arc;

/// Dependencies of [`SessionReducer`](super::SessionReducer)
pub struct SessionEnvironment<A> {
    /// Auth collaborator
    pub auth: Arc<A>,
    /// Token persistence
    pub storage: Arc<dyn KeyValueStore>,
    /// Key the token is stored under
    pub token_key: String,
}

impl<A> SessionEnvironment<A> {
    /// Create an environment storing the token under `token_key`
    #[must_use]
    pub fn new(auth: Arc<A>, storage: Arc<dyn KeyValueStore>, token_key: impl Into<String>) -> Self {
        Self {
            auth,
            storage,
            token_key: token_key.into(),
        }
    }
}

impl<A> Clone for SessionEnvironment<A> {
    fn clone(&self) -> Self {
        Self {
            auth: Arc::clone(&self.auth),
            storage: Arc::clone(&self.storage),
            token_key: self.token_key.clone(),
        }
    }
}
