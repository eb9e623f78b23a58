//! # Marquee Testing
//!
//! Testing utilities and helpers for the Marquee client state architecture.
//!
//! This crate provides:
//! - [`ReducerTest`]: a Given-When-Then harness for reducers
//! - [`assertions`]: effect assertion helpers
//! - [`init_test_tracing`]: opt-in log output for failing tests
//!
//! ## Example
//!
//! ```ignore
//! use marquee_testing::{assertions, ReducerTest};
//!
//! ReducerTest::new(SessionReducer::<MockAuthClient>::new())
//!     .with_env(test_env())
//!     .given_state(SessionState::default())
//!     .when_action(SessionAction::Login { credentials })
//!     .then_state(|state| assert_eq!(state.status(), SessionStatus::Authenticating))
//!     .then_effects(assertions::assert_has_future_effect)
//!     .run();
//! ```


pub use reducer_test::{assertions, ReducerTest};

/// Install a `tracing` subscriber for tests, honouring `RUST_LOG`
///
/// Safe to call from every test; only the first call installs the subscriber.
/// Output goes through the test writer, so it only shows for failing tests.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_test_writer()
        .try_init();
}
