//! Marketplace REST API client

use crate::checkout::{OrderConfirmation, OrderRequest};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::providers::{AuthClient, EventSource, OrderClient};
use crate::storage::KeyValueStore;
use crate::types::{AuthResponse, Credentials, Event, Registration, User};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Error body returned by the backend
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// HTTP implementation of the auth, event and order collaborators
///
/// Reads the session token from the same storage the session slice writes
/// it to, and sends it as a bearer token. Any `401` removes the token.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    storage: Arc<dyn KeyValueStore>,
    token_key: String,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("token_key", &self.token_key)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for `base_url` with default request settings
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        storage: Arc<dyn KeyValueStore>,
        token_key: impl Into<String>,
    ) -> Self {
        Self::with_client(Client::new(), base_url, storage, token_key)
    }

    /// Create a client around a preconfigured `reqwest` client
    #[must_use]
    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        storage: Arc<dyn KeyValueStore>,
        token_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            storage,
            token_key: token_key.into(),
        }
    }

    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::RequestFailed`] if the HTTP client cannot be built.
    pub fn from_config(
        config: &ClientConfig,
        storage: Arc<dyn KeyValueStore>,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(config.api.request_timeout())
            .build()
            .map_err(|e| ClientError::RequestFailed(e.to_string()))?;

        Ok(Self::with_client(
            client,
            config.api.base_url.clone(),
            storage,
            config.storage.token_key.clone(),
        ))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Attach the bearer token (if any) and send
    async fn execute(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let request = match self.storage.get(&self.token_key)? {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message)
            .filter(|m| !m.is_empty());

        match status {
            StatusCode::UNAUTHORIZED => {
                if let Err(error) = self.storage.remove(&self.token_key) {
                    tracing::warn!(%error, "Failed to remove rejected auth token");
                }
                Err(ClientError::Unauthorized { message })
            }
            StatusCode::BAD_REQUEST
            | StatusCode::FORBIDDEN
            | StatusCode::CONFLICT
            | StatusCode::UNPROCESSABLE_ENTITY => Err(ClientError::Rejected { message }),
            status => Err(ClientError::Api {
                status: status.as_u16(),
                message,
            }),
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        self.execute(request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ClientError::ResponseParseFailed(e.to_string()))
    }
}

impl AuthClient for ApiClient {
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ClientError> {
        tracing::debug!(email = %credentials.email, "POST /auth/login");
        self.fetch(self.client.post(self.url("/auth/login")).json(credentials))
            .await
    }

    async fn register(&self, registration: &Registration) -> Result<AuthResponse, ClientError> {
        tracing::debug!(email = %registration.email, "POST /auth/register");
        self.fetch(self.client.post(self.url("/auth/register")).json(registration))
            .await
    }

    async fn logout(&self) -> Result<(), ClientError> {
        tracing::debug!("POST /auth/logout");
        self.execute(self.client.post(self.url("/auth/logout")))
            .await
            .map(|_| ())
    }

    async fn current_user(&self) -> Result<User, ClientError> {
        tracing::debug!("GET /auth/me");
        self.fetch(self.client.get(self.url("/auth/me"))).await
    }
}

impl EventSource for ApiClient {
    async fn event_by_slug(&self, slug: &str) -> Result<Event, ClientError> {
        tracing::debug!(slug, "GET /events/{{slug}}");
        self.fetch(self.client.get(self.url(&format!("/events/{slug}"))))
            .await
    }
}

impl OrderClient for ApiClient {
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderConfirmation, ClientError> {
        tracing::debug!(event_id = %request.event_id, "POST /orders");
        self.fetch(self.client.post(self.url("/orders")).json(request))
            .await
    }
}
