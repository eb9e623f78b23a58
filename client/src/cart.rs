//! Cart slice: the selected event and chosen ticket quantities.
//!
//! The cart is pure state. None of its actions fail and none produce effects;
//! availability is the caller's concern (see [`TicketType::clamp_quantity`]).

use crate::types::{Event, Money, TicketType, TicketTypeId};
use marquee_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};

/// One ticket type and how many of it are selected
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartItem {
    /// The ticket type, as it was when added
    pub ticket_type: TicketType,
    /// Selected quantity
    pub quantity: u32,
}

impl CartItem {
    /// Unit price times quantity
    #[must_use]
    pub const fn subtotal(&self) -> Money {
        self.ticket_type.price.times(self.quantity)
    }
}

/// Cart state
///
/// Holds at most one item per ticket type id, and no items without an event.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CartState {
    /// Currently selected event
    pub event: Option<Event>,
    /// Items in the order they were first added
    pub items: Vec<CartItem>,
}

impl CartState {
    /// Sum of unit price times quantity over all items
    #[must_use]
    pub fn total(&self) -> Money {
        self.items.iter().map(CartItem::subtotal).sum()
    }

    /// Number of tickets selected across all items
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |count, item| count.saturating_add(item.quantity))
    }

    /// `true` when there is nothing to check out
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.event.is_none() || self.item_count() == 0
    }

    /// Looks up the item for a ticket type
    #[must_use]
    pub fn item(&self, ticket_type_id: &TicketTypeId) -> Option<&CartItem> {
        self.items
            .iter()
            .find(|item| &item.ticket_type.id == ticket_type_id)
    }
}

/// Cart actions
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CartAction {
    /// Select an event, discarding every item (even for the same event)
    SetEvent {
        /// Event to select
        event: Event,
    },
    /// Set the quantity for a ticket type, replacing any previous quantity
    AddItem {
        /// Ticket type to add
        ticket_type: TicketType,
        /// New quantity
        quantity: u32,
    },
    /// Drop the item for a ticket type
    RemoveItem {
        /// Ticket type to drop
        ticket_type_id: TicketTypeId,
    },
    /// Forget the event and all items
    ClearCart,
}

/// Reducer for [`CartState`]
#[derive(Clone, Copy, Debug, Default)]
pub struct CartReducer;

impl CartReducer {
    /// Creates a new cart reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for CartReducer {
    type State = CartState;
    type Action = CartAction;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut CartState,
        action: CartAction,
        _env: &(),
    ) -> SmallVec<[Effect<CartAction>; 4]> {
        match action {
            CartAction::SetEvent { event } => {
                tracing::debug!(event_id = %event.id, "Selected event");
                state.event = Some(event);
                state.items.clear();
            }

            CartAction::AddItem {
                ticket_type,
                quantity,
            } => {
                if state.event.is_none() {
                    tracing::debug!(ticket_type_id = %ticket_type.id, "Ignored item: no event selected");
                    return smallvec![Effect::None];
                }

                match state
                    .items
                    .iter_mut()
                    .find(|item| item.ticket_type.id == ticket_type.id)
                {
                    Some(item) => {
                        item.ticket_type = ticket_type;
                        item.quantity = quantity;
                    }
                    None => state.items.push(CartItem {
                        ticket_type,
                        quantity,
                    }),
                }
            }

            CartAction::RemoveItem { ticket_type_id } => {
                state
                    .items
                    .retain(|item| item.ticket_type.id != ticket_type_id);
            }

            CartAction::ClearCart => {
                state.event = None;
                state.items.clear();
            }
        }

        smallvec![Effect::None]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use crate::types::EventId;
    use chrono::{TimeZone, Utc};
    use marquee_testing::{assertions, ReducerTest};
    use proptest::prelude::*;

    fn general() -> TicketType {
        TicketType::new("gen", "General", Money::from_major(120), 100)
    }

    fn vip() -> TicketType {
        TicketType::new("vip", "VIP", Money::from_major(350), 20)
    }

    fn free() -> TicketType {
        TicketType::new("free", "Community", Money::ZERO, 50)
    }

    fn concert() -> Event {
        Event {
            id: EventId::new("evt-1"),
            slug: "summer-concert".to_string(),
            title: "Summer Concert".to_string(),
            description: String::new(),
            venue: "Foro Sol".to_string(),
            starts_at: Utc.with_ymd_and_hms(2026, 7, 1, 20, 0, 0).unwrap(),
            image_url: None,
            ticket_types: vec![general(), vip(), free()],
        }
    }

    fn with_event() -> CartState {
        CartState {
            event: Some(concert()),
            items: Vec::new(),
        }
    }

    #[test]
    fn totals_mixed_cart() {
        ReducerTest::new(CartReducer::new())
            .with_env(())
            .given_state(with_event())
            .when_action(CartAction::AddItem {
                ticket_type: general(),
                quantity: 2,
            })
            .when_action(CartAction::AddItem {
                ticket_type: vip(),
                quantity: 1,
            })
            .when_action(CartAction::AddItem {
                ticket_type: free(),
                quantity: 3,
            })
            .then_state(|state| {
                assert_eq!(state.total(), Money::from_major(590));
                assert_eq!(state.item_count(), 6);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn add_item_replaces_quantity() {
        ReducerTest::new(CartReducer::new())
            .with_env(())
            .given_state(with_event())
            .when_action(CartAction::AddItem {
                ticket_type: general(),
                quantity: 2,
            })
            .when_action(CartAction::AddItem {
                ticket_type: general(),
                quantity: 5,
            })
            .then_state(|state| {
                assert_eq!(state.items.len(), 1);
                assert_eq!(state.items[0].quantity, 5);
                assert_eq!(state.total(), Money::from_major(600));
            })
            .run();
    }

    #[test]
    fn zero_quantity_item_stays_in_cart() {
        ReducerTest::new(CartReducer::new())
            .with_env(())
            .given_state(with_event())
            .when_action(CartAction::AddItem {
                ticket_type: vip(),
                quantity: 0,
            })
            .then_state(|state| {
                assert_eq!(state.items.len(), 1);
                assert_eq!(state.total(), Money::ZERO);
                assert!(state.is_empty());
            })
            .run();
    }

    #[test]
    fn set_event_discards_items_even_for_same_event() {
        ReducerTest::new(CartReducer::new())
            .with_env(())
            .given_state(with_event())
            .when_action(CartAction::AddItem {
                ticket_type: general(),
                quantity: 2,
            })
            .when_action(CartAction::SetEvent { event: concert() })
            .then_state(|state| {
                assert_eq!(state.event.as_ref().map(|e| e.id.as_str()), Some("evt-1"));
                assert!(state.items.is_empty());
            })
            .run();
    }

    #[test]
    fn remove_item_is_noop_when_absent() {
        ReducerTest::new(CartReducer::new())
            .with_env(())
            .given_state(with_event())
            .when_action(CartAction::AddItem {
                ticket_type: general(),
                quantity: 2,
            })
            .when_action(CartAction::RemoveItem {
                ticket_type_id: TicketTypeId::new("missing"),
            })
            .then_state(|state| assert_eq!(state.items.len(), 1))
            .run();
    }

    #[test]
    fn remove_item_drops_matching_line() {
        ReducerTest::new(CartReducer::new())
            .with_env(())
            .given_state(with_event())
            .when_action(CartAction::AddItem {
                ticket_type: general(),
                quantity: 2,
            })
            .when_action(CartAction::AddItem {
                ticket_type: vip(),
                quantity: 1,
            })
            .when_action(CartAction::RemoveItem {
                ticket_type_id: TicketTypeId::new("gen"),
            })
            .then_state(|state| {
                assert!(state.item(&TicketTypeId::new("gen")).is_none());
                assert_eq!(state.total(), Money::from_major(350));
            })
            .run();
    }

    #[test]
    fn clear_cart_resets_everything() {
        ReducerTest::new(CartReducer::new())
            .with_env(())
            .given_state(with_event())
            .when_action(CartAction::AddItem {
                ticket_type: vip(),
                quantity: 2,
            })
            .when_action(CartAction::ClearCart)
            .then_state(|state| {
                assert_eq!(state, &CartState::default());
                assert_eq!(state.total(), Money::ZERO);
            })
            .run();
    }

    #[test]
    fn add_item_without_event_is_ignored() {
        ReducerTest::new(CartReducer::new())
            .with_env(())
            .given_state(CartState::default())
            .when_action(CartAction::AddItem {
                ticket_type: general(),
                quantity: 1,
            })
            .then_state(|state| assert!(state.items.is_empty()))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    fn catalogue() -> Vec<TicketType> {
        (0u32..6)
            .map(|i| {
                TicketType::new(
                    format!("tt-{i}"),
                    format!("Tier {i}"),
                    Money::from_cents(u64::from(i) * 1_250),
                    100,
                )
            })
            .collect()
    }

    proptest! {
        #[test]
        fn total_ignores_insertion_order(
            quantities in proptest::collection::vec(0u32..10, 6),
            order in Just((0..6usize).collect::<Vec<_>>()).prop_shuffle(),
        ) {
            let catalogue = catalogue();
            let reducer = CartReducer::new();

            let mut forward = with_event();
            for (tt, qty) in catalogue.iter().zip(&quantities) {
                let _ = reducer.reduce(
                    &mut forward,
                    CartAction::AddItem { ticket_type: tt.clone(), quantity: *qty },
                    &(),
                );
            }

            let mut shuffled = with_event();
            for &i in &order {
                let _ = reducer.reduce(
                    &mut shuffled,
                    CartAction::AddItem { ticket_type: catalogue[i].clone(), quantity: quantities[i] },
                    &(),
                );
            }

            prop_assert_eq!(forward.total(), shuffled.total());
            prop_assert_eq!(forward.items.len(), shuffled.items.len());
        }

        #[test]
        fn one_item_per_ticket_type(
            adds in proptest::collection::vec((0usize..6, 0u32..10), 0..40),
        ) {
            let catalogue = catalogue();
            let reducer = CartReducer::new();
            let mut state = with_event();

            for (i, qty) in adds {
                let _ = reducer.reduce(
                    &mut state,
                    CartAction::AddItem { ticket_type: catalogue[i].clone(), quantity: qty },
                    &(),
                );
            }

            let mut ids: Vec<_> = state.items.iter().map(|item| item.ticket_type.id.as_str()).collect();
            let len = ids.len();
            ids.sort_unstable();
            ids.dedup();
            prop_assert_eq!(ids.len(), len);
        }
    }
}
