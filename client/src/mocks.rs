//! In-memory collaborators for tests and the demo binary.
//!
//! Each mock is cheaply cloneable and shares its state between clones, so a
//! test can keep a handle for assertions after moving one into the
//! marketplace.

use crate::checkout::{OrderConfirmation, OrderRequest, OrderStatus, PaymentMethod};
use crate::error::ClientError;
use crate::providers::{AuthClient, EventSource, OrderClient};
use crate::types::{
    AuthResponse, Credentials, Event, OrderId, Registration, User, UserRole,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

#[derive(Debug, Default)]
struct MockAuthInner {
    // email -> (password, user)
    accounts: HashMap<String, (String, User)>,
    current: Option<User>,
    fail_logout: bool,
    silent_rejections: bool,
    latency: Option<Duration>,
}

/// Mock auth collaborator
///
/// Knows a fixed set of accounts. `current_user` answers for whoever logged
/// in last, or for the user installed with [`MockAuthClient::with_session`].
#[derive(Debug, Clone, Default)]
pub struct MockAuthClient {
    inner: Arc<Mutex<MockAuthInner>>,
    login_calls: Arc<AtomicUsize>,
    logout_calls: Arc<AtomicUsize>,
    current_user_calls: Arc<AtomicUsize>,
}

impl MockAuthClient {
    /// Create a mock with no accounts
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account that `login` accepts
    #[must_use]
    pub fn with_account(self, user: User, password: impl Into<String>) -> Self {
        self.lock()
            .accounts
            .insert(user.email.clone(), (password.into(), user));
        self
    }

    /// Treat the stored token as belonging to `user`
    #[must_use]
    pub fn with_session(self, user: User) -> Self {
        self.lock().current = Some(user);
        self
    }

    /// Make `logout` fail with a transport error
    #[must_use]
    pub fn with_failing_logout(self) -> Self {
        self.lock().fail_logout = true;
        self
    }

    /// Refuse logins and registrations without a message
    #[must_use]
    pub fn with_silent_rejections(self) -> Self {
        self.lock().silent_rejections = true;
        self
    }

    /// Delay every call
    #[must_use]
    pub fn with_latency(self, latency: Duration) -> Self {
        self.lock().latency = Some(latency);
        self
    }

    /// Revoke the remote session
    pub fn expire_session(&self) {
        self.lock().current = None;
    }

    /// Number of `login` calls so far
    #[must_use]
    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    /// Number of `logout` calls so far
    #[must_use]
    pub fn logout_calls(&self) -> usize {
        self.logout_calls.load(Ordering::SeqCst)
    }

    /// Number of `current_user` calls so far
    #[must_use]
    pub fn current_user_calls(&self) -> usize {
        self.current_user_calls.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockAuthInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn simulate_latency(&self) {
        let latency = self.lock().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn rejection(&self, message: &str) -> ClientError {
        let message = (!self.lock().silent_rejections).then(|| message.to_string());
        ClientError::Rejected { message }
    }
}

fn token_for(user: &User) -> String {
    format!("mock-token-{}", user.id)
}

impl AuthClient for MockAuthClient {
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ClientError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        let account = self.lock().accounts.get(&credentials.email).cloned();
        match account {
            Some((password, user)) if password == credentials.password => {
                self.lock().current = Some(user.clone());
                Ok(AuthResponse {
                    token: token_for(&user),
                    user,
                })
            }
            _ => Err(self.rejection("Invalid credentials")),
        }
    }

    async fn register(&self, registration: &Registration) -> Result<AuthResponse, ClientError> {
        self.simulate_latency().await;

        if self.lock().accounts.contains_key(&registration.email) {
            return Err(self.rejection("Email already registered"));
        }

        let mut inner = self.lock();
        let user = User::new(
            format!("user-{}", inner.accounts.len() + 1),
            registration.name.clone(),
            registration.email.clone(),
            registration.role.unwrap_or(UserRole::Buyer),
        );
        inner.accounts.insert(
            registration.email.clone(),
            (registration.password.clone(), user.clone()),
        );
        inner.current = Some(user.clone());
        drop(inner);

        Ok(AuthResponse {
            token: token_for(&user),
            user,
        })
    }

    async fn logout(&self) -> Result<(), ClientError> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        let mut inner = self.lock();
        if inner.fail_logout {
            return Err(ClientError::RequestFailed("connection reset".to_string()));
        }
        inner.current = None;
        Ok(())
    }

    async fn current_user(&self) -> Result<User, ClientError> {
        self.current_user_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        self.lock()
            .current
            .clone()
            .ok_or_else(|| ClientError::Unauthorized {
                message: Some("Session expired".to_string()),
            })
    }
}

/// Mock event catalogue
#[derive(Debug, Clone, Default)]
pub struct MockEventSource {
    events: Arc<Mutex<HashMap<String, Event>>>,
}

impl MockEventSource {
    /// Create an empty catalogue
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish an event under its slug
    #[must_use]
    pub fn with_event(self, event: Event) -> Self {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(event.slug.clone(), event);
        self
    }
}

impl EventSource for MockEventSource {
    async fn event_by_slug(&self, slug: &str) -> Result<Event, ClientError> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(slug)
            .cloned()
            .ok_or_else(|| ClientError::Api {
                status: 404,
                message: Some("Event not found".to_string()),
            })
    }
}

/// Mock order backend
///
/// Card orders are confirmed as paid; transfer and cash orders stay pending.
#[derive(Debug, Clone, Default)]
pub struct MockOrderClient {
    requests: Arc<Mutex<Vec<OrderRequest>>>,
    rejection: Arc<Mutex<Option<String>>>,
}

impl MockOrderClient {
    /// Create a mock accepting every order
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse every order with `message`
    #[must_use]
    pub fn rejecting(self, message: impl Into<String>) -> Self {
        *self
            .rejection
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(message.into());
        self
    }

    /// Requests received so far
    #[must_use]
    pub fn requests(&self) -> Vec<OrderRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl OrderClient for MockOrderClient {
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderConfirmation, ClientError> {
        let order_number = {
            let mut requests = self.requests.lock().unwrap_or_else(PoisonError::into_inner);
            requests.push(request.clone());
            requests.len()
        };

        if let Some(message) = self
            .rejection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            return Err(ClientError::Rejected {
                message: Some(message),
            });
        }

        let status = match request.payment_method {
            PaymentMethod::Card => OrderStatus::Paid,
            PaymentMethod::Transfer | PaymentMethod::Cash => OrderStatus::Pending,
        };

        Ok(OrderConfirmation {
            order_id: OrderId::new(format!("order-{order_number}")),
            status,
            ticket_count: request.ticket_count(),
        })
    }
}
