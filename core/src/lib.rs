//! # Marquee Core
//!
//! Core traits and types for the Marquee client state architecture.
//!
//! Client state is modelled as reducers over owned state values:
//!
//! - **State**: Domain state for a feature (cart, session, wishlist)
//! - **Action**: All possible inputs to a reducer (user intents and collaborator results)
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected dependencies (collaborators, persistence)
//!
//! ## Example
//!
//! ```
//! use marquee_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! #[derive(Clone, Debug, Default)]
//! struct SeatHold {
//!     seats: u32,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum SeatAction {
//!     Hold(u32),
//!     Release,
//! }
//!
//! struct SeatReducer;
//!
//! impl Reducer for SeatReducer {
//!     type State = SeatHold;
//!     type Action = SeatAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut SeatHold,
//!         action: SeatAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<SeatAction>; 4]> {
//!         match action {
//!             SeatAction::Hold(seats) => state.seats = seats,
//!             SeatAction::Release => state.seats = 0,
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! let mut hold = SeatHold::default();
//! let _ = SeatReducer.reduce(&mut hold, SeatAction::Hold(4), &());
//! assert_eq!(hold.seats, 4);
//! ```

pub use smallvec::{smallvec, SmallVec};

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
///
/// They contain all state transition logic and are deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for state transitions
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// Updates state in place and returns effect descriptions to be
        /// executed by the runtime. Most reducers return zero or one effect,
        /// hence the inline capacity of four.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values, not execution.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the Store runtime.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Returns `true` for [`Effect::None`]
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }

        /// Transform the action this effect feeds back
        ///
        /// Used to embed a child reducer's effects into a parent action type:
        ///
        /// ```
        /// use marquee_core::effect::Effect;
        ///
        /// #[derive(Debug)]
        /// enum Child { Done }
        /// #[derive(Debug)]
        /// enum Parent { Child(Child) }
        ///
        /// let effect: Effect<Child> = Effect::Future(Box::pin(async { Some(Child::Done) }));
        /// let lifted: Effect<Parent> = effect.map(Parent::Child);
        /// assert!(matches!(lifted, Effect::Future(_)));
        /// ```
        #[must_use]
        pub fn map<B, F>(self, f: F) -> Effect<B>
        where
            Action: Send + 'static,
            B: Send + 'static,
            F: Fn(Action) -> B + Send + 'static,
        {
            match self {
                Effect::None => Effect::None,
                Effect::Future(fut) => Effect::Future(Box::pin(async move { fut.await.map(f) })),
            }
        }
    }
}
