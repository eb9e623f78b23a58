//! The `Marketplace` facade: one owned client state container.
//!
//! Every UI-facing operation is a method here. Commands go through the
//! store; operations that call a collaborator wait for the result action so
//! callers get a plain `Result`.

use crate::app::{AppAction, AppEnvironment, AppReducer, AppState, AppStore};
use crate::cart::{CartAction, CartState};
use crate::checkout::{
    BuyerInfo, CheckoutAction, OrderConfirmation, OrderRequest, PaymentMethod, CHECKOUT_FAILED,
};
use crate::config::{ClientConfig, DEFAULT_FAVORITES_KEY, DEFAULT_TOKEN_KEY};
use crate::error::{CheckoutError, ClientError, SessionError};
use crate::http::ApiClient;
use crate::providers::{AuthClient, EventSource, OrderClient};
use crate::session::{SessionAction, SessionState, SessionStatus};
use crate::storage::{FileStorage, KeyValueStore, MemoryStorage};
use crate::types::{
    Credentials, Event, EventId, Money, Registration, StripeAccountStatus, TicketType,
    TicketTypeId, User, UserPatch, VerificationStatus,
};
use crate::wishlist::{WishlistAction, WishlistState};
use marquee_runtime::{Store, StoreConfig, StoreError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// Client-side state for the marketplace
///
/// Generic over the auth (`A`), event catalogue (`V`) and order (`O`)
/// collaborators. Production code uses [`ApiClient`] for all three; see
/// [`Marketplace::from_config`].
pub struct Marketplace<A, V, O>
where
    A: AuthClient + 'static,
    O: OrderClient + 'static,
{
    store: AppStore<A, O>,
    events: Arc<V>,
    request_timeout: Duration,
}

impl<A, V, O> Marketplace<A, V, O>
where
    A: AuthClient + 'static,
    V: EventSource,
    O: OrderClient + 'static,
{
    /// Build a marketplace with the default storage keys and timeouts
    ///
    /// Favorites are loaded from `storage` here; the session is not restored
    /// until [`check_auth`](Self::check_auth) is called.
    #[must_use]
    pub fn new(auth: A, events: V, orders: O, storage: Arc<dyn KeyValueStore>) -> Self {
        Self::with_config(auth, events, orders, storage, &ClientConfig::default())
    }

    /// Build a marketplace using the keys and timeout from `config`
    #[must_use]
    pub fn with_config(
        auth: A,
        events: V,
        orders: O,
        storage: Arc<dyn KeyValueStore>,
        config: &ClientConfig,
    ) -> Self {
        let favorites_key = if config.storage.favorites_key.is_empty() {
            DEFAULT_FAVORITES_KEY
        } else {
            &config.storage.favorites_key
        };
        let token_key = if config.storage.token_key.is_empty() {
            DEFAULT_TOKEN_KEY
        } else {
            &config.storage.token_key
        };

        let initial = AppState {
            wishlist: WishlistState::load(storage.as_ref(), favorites_key),
            ..AppState::default()
        };
        tracing::debug!(
            favorites = initial.wishlist.favorites().len(),
            "Loaded favorites"
        );

        let environment = AppEnvironment::new(
            Arc::new(auth),
            Arc::new(orders),
            storage,
            token_key,
            favorites_key,
        );

        let store = Store::with_config(
            initial,
            AppReducer::new(),
            environment,
            StoreConfig::default().with_shutdown_timeout(config.api.request_timeout()),
        );

        Self {
            store,
            events: Arc::new(events),
            request_timeout: config.api.request_timeout(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Events
    // ═══════════════════════════════════════════════════════════════════════

    /// Fetch an event from the catalogue without selecting it
    ///
    /// # Errors
    ///
    /// Returns the catalogue's [`ClientError`].
    pub async fn load_event(&self, slug: &str) -> Result<Event, ClientError> {
        self.events.event_by_slug(slug).await
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Cart
    // ═══════════════════════════════════════════════════════════════════════

    /// Select an event, discarding any items
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`shutdown`](Self::shutdown).
    pub async fn set_event(&self, event: Event) -> Result<(), StoreError> {
        self.dispatch(CartAction::SetEvent { event }).await
    }

    /// Set the quantity for a ticket type, replacing any previous quantity
    ///
    /// Ignored while no event is selected.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`shutdown`](Self::shutdown).
    pub async fn add_item(&self, ticket_type: TicketType, quantity: u32) -> Result<(), StoreError> {
        self.dispatch(CartAction::AddItem {
            ticket_type,
            quantity,
        })
        .await
    }

    /// Drop the item for a ticket type
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`shutdown`](Self::shutdown).
    pub async fn remove_item(&self, ticket_type_id: TicketTypeId) -> Result<(), StoreError> {
        self.dispatch(CartAction::RemoveItem { ticket_type_id }).await
    }

    /// Forget the event and all items
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`shutdown`](Self::shutdown).
    pub async fn clear_cart(&self) -> Result<(), StoreError> {
        self.dispatch(CartAction::ClearCart).await
    }

    /// Cart total, computed on demand
    pub async fn total(&self) -> Money {
        self.store.state(|s| s.cart.total()).await
    }

    /// Number of tickets in the cart
    pub async fn item_count(&self) -> u32 {
        self.store.state(|s| s.cart.item_count()).await
    }

    /// Snapshot of the cart
    pub async fn cart(&self) -> CartState {
        self.store.state(|s| s.cart.clone()).await
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Session
    // ═══════════════════════════════════════════════════════════════════════

    /// Sign in
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Rejected`] with the display message (also
    /// recorded in the session state) and the collaborator's error, or
    /// [`SessionError::Runtime`].
    pub async fn login(&self, credentials: Credentials) -> Result<User, SessionError> {
        let result = self
            .store
            .send_and_wait_for(
                SessionAction::Login { credentials }.into(),
                |action| matches!(action, AppAction::Session(a) if a.is_login_result()),
                self.request_timeout,
            )
            .await?;

        match result {
            AppAction::Session(SessionAction::LoginSucceeded { user }) => Ok(user),
            AppAction::Session(SessionAction::LoginFailed { message, error }) => {
                Err(SessionError::Rejected {
                    message,
                    source: error,
                })
            }
            // The predicate only lets login results through
            _ => Err(StoreError::ChannelClosed.into()),
        }
    }

    /// Create an account and sign in
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Rejected`] with the display message (also
    /// recorded in the session state), or [`SessionError::Runtime`].
    pub async fn register(&self, registration: Registration) -> Result<User, SessionError> {
        let result = self
            .store
            .send_and_wait_for(
                SessionAction::Register { registration }.into(),
                |action| matches!(action, AppAction::Session(a) if a.is_register_result()),
                self.request_timeout,
            )
            .await?;

        match result {
            AppAction::Session(SessionAction::RegisterSucceeded { user }) => Ok(user),
            AppAction::Session(SessionAction::RegisterFailed { message, error }) => {
                Err(SessionError::Rejected {
                    message,
                    source: error,
                })
            }
            _ => Err(StoreError::ChannelClosed.into()),
        }
    }

    /// Sign out
    ///
    /// Always ends anonymous with the token removed; a failed remote logout
    /// is only logged.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store is shutting down or teardown
    /// exceeds the request timeout.
    pub async fn logout(&self) -> Result<(), StoreError> {
        self.store
            .send_and_wait_for(
                SessionAction::Logout.into(),
                |action| matches!(action, AppAction::Session(SessionAction::LoggedOut)),
                self.request_timeout,
            )
            .await
            .map(|_| ())
    }

    /// Restore the session from the persisted token
    ///
    /// Returns the restored user, or `None` when there is no token or it was
    /// rejected. Makes no network call without a token.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store is shutting down or the check
    /// exceeds the request timeout.
    pub async fn check_auth(&self) -> Result<Option<User>, StoreError> {
        let mut handle = self.store.send(SessionAction::CheckAuth.into()).await?;
        handle
            .wait_with_timeout(self.request_timeout)
            .await
            .map_err(|()| StoreError::Timeout)?;

        Ok(self.store.state(|s| s.session.user.clone()).await)
    }

    /// Merge a profile update into the signed-in user
    ///
    /// Returns the updated user, or `None` when anonymous.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`shutdown`](Self::shutdown).
    pub async fn update_user(&self, patch: UserPatch) -> Result<Option<User>, StoreError> {
        self.dispatch(SessionAction::UpdateUser { patch }).await?;
        Ok(self.user().await)
    }

    /// Record the signed-in user's payout account state
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`shutdown`](Self::shutdown).
    pub async fn update_stripe_status(
        &self,
        status: StripeAccountStatus,
    ) -> Result<Option<User>, StoreError> {
        self.dispatch(SessionAction::UpdateStripeStatus { status })
            .await?;
        Ok(self.user().await)
    }

    /// Record the signed-in user's verification outcome
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`shutdown`](Self::shutdown).
    pub async fn verify_user(
        &self,
        is_verified: bool,
        status: VerificationStatus,
    ) -> Result<Option<User>, StoreError> {
        self.dispatch(SessionAction::VerifyUser {
            is_verified,
            status,
        })
        .await?;
        Ok(self.user().await)
    }

    /// Dismiss the last login or registration error
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`shutdown`](Self::shutdown).
    pub async fn clear_error(&self) -> Result<(), StoreError> {
        self.dispatch(SessionAction::ClearError).await
    }

    /// Snapshot of the session
    pub async fn session(&self) -> SessionState {
        self.store.state(|s| s.session.clone()).await
    }

    /// Current session status
    pub async fn status(&self) -> SessionStatus {
        self.store.state(|s| s.session.status()).await
    }

    /// The signed-in user
    pub async fn user(&self) -> Option<User> {
        self.store.state(|s| s.session.user.clone()).await
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Wishlist
    // ═══════════════════════════════════════════════════════════════════════

    /// Add or remove a favorite, returning whether it is now a favorite
    ///
    /// The list is written to storage before this returns.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`shutdown`](Self::shutdown).
    pub async fn toggle_favorite(&self, event_id: EventId) -> Result<bool, StoreError> {
        self.dispatch(WishlistAction::ToggleFavorite {
            event_id: event_id.clone(),
        })
        .await?;

        Ok(self.is_favorite(&event_id).await)
    }

    /// `true` if `event_id` is a favorite
    pub async fn is_favorite(&self, event_id: &EventId) -> bool {
        self.store
            .state(|s| s.wishlist.is_favorite(event_id))
            .await
    }

    /// Favorites in the order they were added
    pub async fn favorites(&self) -> Vec<EventId> {
        self.store
            .state(|s| s.wishlist.favorites().to_vec())
            .await
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Checkout
    // ═══════════════════════════════════════════════════════════════════════

    /// Submit the cart as an order
    ///
    /// On success the cart is cleared and the confirmation recorded. On
    /// failure the cart is kept.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::EmptyCart`]: no event or no tickets; nothing is sent
    /// - [`CheckoutError::InProgress`]: another submission is in flight
    /// - [`CheckoutError::Rejected`]: the order collaborator refused the order
    /// - [`CheckoutError::Runtime`]: the store could not complete the operation
    pub async fn checkout(
        &self,
        buyer: BuyerInfo,
        payment_method: PaymentMethod,
    ) -> Result<OrderConfirmation, CheckoutError> {
        let (request, in_flight) = self
            .store
            .state(|s| {
                (
                    OrderRequest::from_cart(&s.cart, buyer, payment_method),
                    s.checkout.is_submitting,
                )
            })
            .await;
        let request = request?;
        if in_flight {
            return Err(CheckoutError::InProgress);
        }

        let result = self
            .store
            .send_and_wait_for(
                CheckoutAction::Submit { request }.into(),
                |action| matches!(action, AppAction::Checkout(a) if a.is_result()),
                self.request_timeout,
            )
            .await?;

        match result {
            AppAction::Checkout(CheckoutAction::Succeeded { confirmation }) => Ok(confirmation),
            AppAction::Checkout(CheckoutAction::Failed { message }) => {
                Err(CheckoutError::Rejected(message))
            }
            _ => Err(CheckoutError::Rejected(CHECKOUT_FAILED.to_string())),
        }
    }

    /// Confirmation of the last accepted order
    pub async fn last_order(&self) -> Option<OrderConfirmation> {
        self.store
            .state(|s| s.checkout.confirmation.clone())
            .await
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Lifecycle
    // ═══════════════════════════════════════════════════════════════════════

    /// Observe every action produced by a collaborator call
    ///
    /// Actions arrive after they have been applied to state.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AppAction> {
        self.store.subscribe_actions()
    }

    /// Snapshot of the whole state
    pub async fn snapshot(&self) -> AppState {
        self.store.state(Clone::clone).await
    }

    /// Stop accepting commands and wait for in-flight collaborator calls
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if calls are still running
    /// after the request timeout.
    pub async fn shutdown(&self) -> Result<(), StoreError> {
        tracing::info!("Shutting down marketplace client");
        self.store.shutdown_default().await
    }

    /// Send a command that needs no result
    async fn dispatch(&self, action: impl Into<AppAction>) -> Result<(), StoreError> {
        self.store.send(action.into()).await.map(|_| ())
    }
}

impl Marketplace<ApiClient, ApiClient, ApiClient> {
    /// Build a marketplace talking to the REST API described by `config`
    ///
    /// Uses [`FileStorage`] when `config.storage.path` is set and
    /// [`MemoryStorage`] otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::RequestFailed`] if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let storage: Arc<dyn KeyValueStore> = match &config.storage.path {
            Some(path) => {
                tracing::info!(path = %path.display(), "Using file storage");
                Arc::new(FileStorage::new(path.clone()))
            }
            None => {
                tracing::info!("Using in-memory storage");
                Arc::new(MemoryStorage::new())
            }
        };

        let api = ApiClient::from_config(config, Arc::clone(&storage))?;
        Ok(Self::with_config(
            api.clone(),
            api.clone(),
            api,
            storage,
            config,
        ))
    }
}
