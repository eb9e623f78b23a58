//! Root reducer combining the cart, session, wishlist and checkout slices.

use crate::cart::{CartAction, CartReducer, CartState};
use crate::checkout::{CheckoutAction, CheckoutEnvironment, CheckoutReducer, CheckoutState};
use crate::providers::{AuthClient, OrderClient};
use crate::session::{SessionAction, SessionEnvironment, SessionReducer, SessionState};
use crate::storage::KeyValueStore;
use crate::wishlist::{WishlistAction, WishlistEnvironment, WishlistReducer, WishlistState};
use marquee_core::{effect::Effect, reducer::Reducer, SmallVec};
use marquee_runtime::Store;
use std::sync::Arc;

/// Store running the root reducer
pub type AppStore<A, O> = Store<AppState, AppAction, AppEnvironment<A, O>, AppReducer<A, O>>;

/// Whole client state
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppState {
    /// Cart slice
    pub cart: CartState,
    /// Session slice
    pub session: SessionState,
    /// Wishlist slice
    pub wishlist: WishlistState,
    /// Checkout slice
    pub checkout: CheckoutState,
}

/// Root action, one variant per slice
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppAction {
    /// Cart action
    Cart(CartAction),
    /// Session action
    Session(SessionAction),
    /// Wishlist action
    Wishlist(WishlistAction),
    /// Checkout action
    Checkout(CheckoutAction),
}

impl From<CartAction> for AppAction {
    fn from(action: CartAction) -> Self {
        Self::Cart(action)
    }
}

impl From<SessionAction> for AppAction {
    fn from(action: SessionAction) -> Self {
        Self::Session(action)
    }
}

impl From<WishlistAction> for AppAction {
    fn from(action: WishlistAction) -> Self {
        Self::Wishlist(action)
    }
}

impl From<CheckoutAction> for AppAction {
    fn from(action: CheckoutAction) -> Self {
        Self::Checkout(action)
    }
}

/// Dependencies of every slice
pub struct AppEnvironment<A, O> {
    /// Session slice dependencies
    pub session: SessionEnvironment<A>,
    /// Wishlist slice dependencies
    pub wishlist: WishlistEnvironment,
    /// Checkout slice dependencies
    pub checkout: CheckoutEnvironment<O>,
}

impl<A, O> AppEnvironment<A, O> {
    /// Wires the slices to shared collaborators and storage
    #[must_use]
    pub fn new(
        auth: Arc<A>,
        orders: Arc<O>,
        storage: Arc<dyn KeyValueStore>,
        token_key: impl Into<String>,
        favorites_key: impl Into<String>,
    ) -> Self {
        Self {
            session: SessionEnvironment::new(auth, Arc::clone(&storage), token_key),
            wishlist: WishlistEnvironment::new(storage, favorites_key),
            checkout: CheckoutEnvironment::new(orders),
        }
    }
}

impl<A, O> Clone for AppEnvironment<A, O> {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
            wishlist: self.wishlist.clone(),
            checkout: self.checkout.clone(),
        }
    }
}

/// Root reducer
///
/// Delegates each action to its slice and lifts the slice's effects back
/// into [`AppAction`]. A successful checkout also clears the cart.
pub struct AppReducer<A, O> {
    cart: CartReducer,
    session: SessionReducer<A>,
    wishlist: WishlistReducer,
    checkout: CheckoutReducer<O>,
}

impl<A, O> AppReducer<A, O> {
    /// Creates the root reducer
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cart: CartReducer::new(),
            session: SessionReducer::new(),
            wishlist: WishlistReducer::new(),
            checkout: CheckoutReducer::new(),
        }
    }
}

impl<A, O> Default for AppReducer<A, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, O> Clone for AppReducer<A, O> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<A, O> Reducer for AppReducer<A, O>
where
    A: AuthClient + 'static,
    O: OrderClient + 'static,
{
    type State = AppState;
    type Action = AppAction;
    type Environment = AppEnvironment<A, O>;

    fn reduce(
        &self,
        state: &mut AppState,
        action: AppAction,
        env: &AppEnvironment<A, O>,
    ) -> SmallVec<[Effect<AppAction>; 4]> {
        match action {
            AppAction::Cart(action) => lift(
                self.cart.reduce(&mut state.cart, action, &()),
                AppAction::Cart,
            ),

            AppAction::Session(action) => lift(
                self.session.reduce(&mut state.session, action, &env.session),
                AppAction::Session,
            ),

            AppAction::Wishlist(action) => lift(
                self.wishlist
                    .reduce(&mut state.wishlist, action, &env.wishlist),
                AppAction::Wishlist,
            ),

            AppAction::Checkout(action) => {
                let clears_cart = matches!(action, CheckoutAction::Succeeded { .. });

                let mut effects = lift(
                    self.checkout
                        .reduce(&mut state.checkout, action, &env.checkout),
                    AppAction::Checkout,
                );

                if clears_cart {
                    effects.extend(lift(
                        self.cart
                            .reduce(&mut state.cart, CartAction::ClearCart, &()),
                        AppAction::Cart,
                    ));
                }
                effects
            }
        }
    }
}

/// Maps a slice's effects into root effects, dropping no-ops
fn lift<C, F>(effects: SmallVec<[Effect<C>; 4]>, f: F) -> SmallVec<[Effect<AppAction>; 4]>
where
    C: Send + 'static,
    F: Fn(C) -> AppAction + Clone + Send + 'static,
{
    effects
        .into_iter()
        .filter(|effect| !effect.is_none())
        .map(|effect| effect.map(f.clone()))
        .collect()
}
