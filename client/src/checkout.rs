//! Checkout slice: turning the cart into an order.
//!
//! The order request is built from the cart before anything is sent, so an
//! empty cart fails locally without touching the order collaborator.

use crate::cart::CartState;
use crate::error::{CheckoutError, ClientError};
use crate::providers::OrderClient;
use crate::types::{EventId, OrderId, TicketTypeId};
use marquee_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::sync::Arc;

/// How the buyer intends to pay
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Card payment
    Card,
    /// Bank transfer
    Transfer,
    /// Cash at a partner store
    Cash,
}

/// Who the tickets are for
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyerInfo {
    /// Full name
    pub name: String,
    /// Where tickets are sent
    pub email: String,
    /// Contact phone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// One line of an order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    /// Ticket type being bought
    pub ticket_type_id: TicketTypeId,
    /// How many
    pub quantity: u32,
}

/// Body sent to the order collaborator
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    /// Event the tickets belong to
    pub event_id: EventId,
    /// Non-empty lines, all with quantity > 0
    pub items: Vec<OrderLine>,
    /// Ticket recipient
    pub buyer: BuyerInfo,
    /// Payment method
    pub payment_method: PaymentMethod,
}

impl OrderRequest {
    /// Builds a request from the cart, omitting zero-quantity items
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] when no event is selected or
    /// every quantity is zero.
    pub fn from_cart(
        cart: &CartState,
        buyer: BuyerInfo,
        payment_method: PaymentMethod,
    ) -> Result<Self, CheckoutError> {
        let event = cart.event.as_ref().ok_or(CheckoutError::EmptyCart)?;

        let items: Vec<OrderLine> = cart
            .items
            .iter()
            .filter(|item| item.quantity > 0)
            .map(|item| OrderLine {
                ticket_type_id: item.ticket_type.id.clone(),
                quantity: item.quantity,
            })
            .collect();

        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        Ok(Self {
            event_id: event.id.clone(),
            items,
            buyer,
            payment_method,
        })
    }

    /// Total number of tickets requested
    #[must_use]
    pub fn ticket_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |count, line| count.saturating_add(line.quantity))
    }
}

/// Order status reported by the backend
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Awaiting payment
    Pending,
    /// Paid and issued
    Paid,
    /// Cancelled before payment
    Cancelled,
}

/// Accepted order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    /// Backend order identifier
    pub order_id: OrderId,
    /// Current status
    pub status: OrderStatus,
    /// Tickets issued or reserved
    pub ticket_count: u32,
}

/// Checkout state
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckoutState {
    /// An order is being submitted
    pub is_submitting: bool,
    /// Last accepted order
    pub confirmation: Option<OrderConfirmation>,
    /// Message from the last refused order
    pub error: Option<String>,
}

/// Checkout actions
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckoutAction {
    /// Submit an order built with [`OrderRequest::from_cart`]
    Submit {
        /// Order body
        request: OrderRequest,
    },
    /// The order was accepted
    Succeeded {
        /// Backend confirmation
        confirmation: OrderConfirmation,
    },
    /// The order was refused
    Failed {
        /// Display message
        message: String,
    },
}

impl CheckoutAction {
    /// `true` for the action that ends a submission
    #[must_use]
    pub const fn is_result(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }
}

/// Shown when a refused order carries no message
pub const CHECKOUT_FAILED: &str = "Checkout failed";

/// Dependencies of [`CheckoutReducer`]
pub struct CheckoutEnvironment<O> {
    /// Order collaborator
    pub orders: Arc<O>,
}

impl<O> CheckoutEnvironment<O> {
    /// Creates a checkout environment
    #[must_use]
    pub const fn new(orders: Arc<O>) -> Self {
        Self { orders }
    }
}

impl<O> Clone for CheckoutEnvironment<O> {
    fn clone(&self) -> Self {
        Self {
            orders: Arc::clone(&self.orders),
        }
    }
}

/// Reducer for [`CheckoutState`]
///
/// Clearing the cart on success is the app reducer's job; this slice only
/// tracks the submission.
pub struct CheckoutReducer<O> {
    _phantom: PhantomData<O>,
}

impl<O> CheckoutReducer<O> {
    /// Creates a new checkout reducer
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<O> Default for CheckoutReducer<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> Clone for CheckoutReducer<O> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

fn failure_message(error: &ClientError) -> String {
    error.user_message().unwrap_or(CHECKOUT_FAILED).to_string()
}

impl<O> Reducer for CheckoutReducer<O>
where
    O: OrderClient + 'static,
{
    type State = CheckoutState;
    type Action = CheckoutAction;
    type Environment = CheckoutEnvironment<O>;

    fn reduce(
        &self,
        state: &mut CheckoutState,
        action: CheckoutAction,
        env: &CheckoutEnvironment<O>,
    ) -> SmallVec<[Effect<CheckoutAction>; 4]> {
        match action {
            CheckoutAction::Submit { request } => {
                if state.is_submitting {
                    tracing::warn!(event_id = %request.event_id, "Checkout already in flight, ignoring");
                    return smallvec![Effect::None];
                }

                tracing::debug!(
                    event_id = %request.event_id,
                    tickets = request.ticket_count(),
                    "Submitting order"
                );
                state.is_submitting = true;
                state.error = None;

                let orders = Arc::clone(&env.orders);
                smallvec![Effect::Future(Box::pin(async move {
                    match orders.create_order(&request).await {
                        Ok(confirmation) => Some(CheckoutAction::Succeeded { confirmation }),
                        Err(error) => {
                            tracing::debug!(%error, "Order rejected");
                            Some(CheckoutAction::Failed {
                                message: failure_message(&error),
                            })
                        }
                    }
                }))]
            }

            CheckoutAction::Succeeded { confirmation } => {
                tracing::debug!(order_id = %confirmation.order_id, "Order accepted");
                state.is_submitting = false;
                state.confirmation = Some(confirmation);
                smallvec![Effect::None]
            }

            CheckoutAction::Failed { message } => {
                state.is_submitting = false;
                state.error = Some(message);
                smallvec![Effect::None]
            }
        }
    }
}
