//! Wishlist slice: favorite events, persisted across restarts.
//!
//! Favorites are loaded once at construction. Every toggle writes the full
//! list back as a JSON array while the store lock is held, so stored
//! favorites always match the latest state.

use crate::storage::KeyValueStore;
use crate::types::EventId;
use marquee_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
use std::sync::Arc;

/// Wishlist state
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WishlistState {
    favorites: Vec<EventId>,
}

impl WishlistState {
    /// Creates a wishlist holding `favorites`, dropping duplicates
    #[must_use]
    pub fn new(favorites: impl IntoIterator<Item = EventId>) -> Self {
        let mut state = Self::default();
        for id in favorites {
            if !state.favorites.contains(&id) {
                state.favorites.push(id);
            }
        }
        state
    }

    /// Reads favorites from `storage`
    ///
    /// Missing, unreadable or malformed data yields an empty wishlist.
    #[must_use]
    pub fn load(storage: &dyn KeyValueStore, key: &str) -> Self {
        let raw = match storage.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::default(),
            Err(error) => {
                tracing::warn!(%error, "Failed to read favorites");
                return Self::default();
            }
        };

        match serde_json::from_str::<Vec<EventId>>(&raw) {
            Ok(ids) => Self::new(ids),
            Err(error) => {
                tracing::warn!(%error, "Discarding malformed favorites");
                Self::default()
            }
        }
    }

    /// `true` if `event_id` is a favorite
    #[must_use]
    pub fn is_favorite(&self, event_id: &EventId) -> bool {
        self.favorites.contains(event_id)
    }

    /// Favorites in the order they were added
    #[must_use]
    pub fn favorites(&self) -> &[EventId] {
        &self.favorites
    }

    fn toggle(&mut self, event_id: EventId) -> bool {
        if let Some(pos) = self.favorites.iter().position(|id| id == &event_id) {
            self.favorites.remove(pos);
            false
        } else {
            self.favorites.push(event_id);
            true
        }
    }
}

/// Wishlist actions
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WishlistAction {
    /// Add the event if absent, remove it if present
    ToggleFavorite {
        /// Event to toggle
        event_id: EventId,
    },
}

/// Dependencies of [`WishlistReducer`]
#[derive(Clone)]
pub struct WishlistEnvironment {
    /// Favorites persistence
    pub storage: Arc<dyn KeyValueStore>,
    /// Key the favorites are stored under
    pub favorites_key: String,
}

impl WishlistEnvironment {
    /// Creates an environment storing favorites under `favorites_key`
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>, favorites_key: impl Into<String>) -> Self {
        Self {
            storage,
            favorites_key: favorites_key.into(),
        }
    }
}

/// Reducer for [`WishlistState`]
#[derive(Clone, Copy, Debug, Default)]
pub struct WishlistReducer;

impl WishlistReducer {
    /// Creates a new wishlist reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for WishlistReducer {
    type State = WishlistState;
    type Action = WishlistAction;
    type Environment = WishlistEnvironment;

    fn reduce(
        &self,
        state: &mut WishlistState,
        action: WishlistAction,
        env: &WishlistEnvironment,
    ) -> SmallVec<[Effect<WishlistAction>; 4]> {
        match action {
            WishlistAction::ToggleFavorite { event_id } => {
                let added = state.toggle(event_id.clone());
                tracing::debug!(%event_id, added, "Toggled favorite");

                match serde_json::to_string(&state.favorites) {
                    Ok(json) => {
                        if let Err(error) = env.storage.set(&env.favorites_key, &json) {
                            tracing::warn!(%error, "Failed to persist favorites");
                        }
                    }
                    Err(error) => tracing::warn!(%error, "Failed to encode favorites"),
                }
                smallvec![Effect::None]
            }
        }
    }
}
