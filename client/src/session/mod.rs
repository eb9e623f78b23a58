//! Session slice: who is signed in.
//!
//! # Lifecycle
//!
//! ```text
//! Anonymous ──Login/Register──▶ Authenticating ──Succeeded──▶ Authenticated
//!     ▲                              │                              │
//!     │                              └──Failed──▶ Error             │
//!     └────────────────────── Logout / SessionExpired ◀─────────────┘
//! ```
//!
//! `CheckAuth` restores a session from the persisted token. A stale token
//! silently downgrades to anonymous; it never produces a user-facing error.

pub mod actions;
pub mod environment;
pub mod reducer;

pub use actions::SessionAction;
pub use environment::SessionEnvironment;
pub use reducer::SessionReducer;

use crate::types::User;

/// Derived session status
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    /// Nobody is signed in
    Anonymous,
    /// A login, registration or session check is in flight
    Authenticating,
    /// A user is signed in
    Authenticated,
    /// The last login or registration failed
    Error,
}

/// Session state
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    /// The signed-in user
    pub user: Option<User>,
    /// A collaborator call is in flight
    pub is_loading: bool,
    /// Message from the last failed login or registration
    pub error: Option<String>,
}

impl SessionState {
    /// Current lifecycle status
    #[must_use]
    pub const fn status(&self) -> SessionStatus {
        if self.user.is_some() {
            SessionStatus::Authenticated
        } else if self.is_loading {
            SessionStatus::Authenticating
        } else if self.error.is_some() {
            SessionStatus::Error
        } else {
            SessionStatus::Anonymous
        }
    }

    /// `true` when a user is signed in
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}
