//! # Marquee Client
//!
//! Client-side state for the Marquee event-ticketing marketplace: the ticket
//! cart, the signed-in session, favorite events and checkout.
//!
//! Each concern is a reducer slice ([`cart`], [`session`], [`wishlist`],
//! [`checkout`]) combined by [`app::AppReducer`] and run by a
//! `marquee_runtime::Store`. [`Marketplace`] wraps the store with plain async
//! methods.
//!
//! Collaborators are injected through the traits in [`providers`];
//! persistence goes through [`KeyValueStore`].
//!
//! ## Example
//!
//! ```no_run
//! use marquee_client::{ClientConfig, Credentials, Marketplace};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let marketplace = Marketplace::from_config(&ClientConfig::from_env())?;
//!
//! marketplace.check_auth().await?;
//! let event = marketplace.load_event("summer-concert").await?;
//! let general = event.ticket_types[0].clone();
//!
//! marketplace.set_event(event).await?;
//! marketplace.add_item(general, 2).await?;
//! println!("Total: {}", marketplace.total().await);
//!
//! marketplace
//!     .login(Credentials::new("ana@example.com", "secret"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod http;
pub mod marketplace;
#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;
pub mod providers;
pub mod session;
pub mod storage;
pub mod types;
pub mod wishlist;

pub use app::{AppAction, AppState};
pub use cart::{CartAction, CartItem, CartState};
pub use checkout::{
    BuyerInfo, CheckoutAction, CheckoutState, OrderConfirmation, OrderLine, OrderRequest,
    OrderStatus, PaymentMethod,
};
pub use config::ClientConfig;
pub use error::{CheckoutError, ClientError, SessionError, StorageError};
pub use http::ApiClient;
pub use marketplace::Marketplace;
pub use marquee_runtime::StoreError;
pub use providers::{AuthClient, EventSource, OrderClient};
pub use session::{SessionAction, SessionState, SessionStatus};
pub use storage::{FileStorage, KeyValueStore, MemoryStorage};
pub use types::{
    AuthResponse, Credentials, Event, EventId, Money, OrderId, Registration,
    StripeAccountStatus, TicketType, TicketTypeId, User, UserId, UserPatch, UserRole,
    VerificationStatus,
};
pub use wishlist::{WishlistAction, WishlistState};
