//! Session actions.

use crate::error::ClientError;
use crate::types::{
    Credentials, Registration, StripeAccountStatus, User, UserPatch, VerificationStatus,
};

/// Session actions
///
/// Commands come from the facade; the `*Succeeded`/`*Failed`, `LoggedOut`,
/// `SessionRestored` and `SessionExpired` variants are fed back by effects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionAction {
    // Commands
    /// Sign in with email and password
    Login {
        /// Login form input
        credentials: Credentials,
    },
    /// Create an account and sign in
    Register {
        /// Sign-up form input
        registration: Registration,
    },
    /// Sign out; always ends anonymous
    Logout,
    /// Restore the session from the persisted token
    CheckAuth,
    /// Merge a profile update into the current user
    UpdateUser {
        /// Fields to change
        patch: UserPatch,
    },
    /// Record the user's payout account state
    UpdateStripeStatus {
        /// New payout account state
        status: StripeAccountStatus,
    },
    /// Record the outcome of identity verification
    VerifyUser {
        /// Whether verification passed
        is_verified: bool,
        /// Verification state
        status: VerificationStatus,
    },
    /// Dismiss the last error
    ClearError,

    // Results
    /// Login accepted; the token is already persisted
    LoginSucceeded {
        /// Signed-in user
        user: User,
    },
    /// Login refused
    LoginFailed {
        /// Display message, falling back to a generic one
        message: String,
        /// Collaborator error as returned
        error: ClientError,
    },
    /// Registration accepted; the token is already persisted
    RegisterSucceeded {
        /// Signed-in user
        user: User,
    },
    /// Registration refused
    RegisterFailed {
        /// Display message, falling back to a generic one
        message: String,
        /// Collaborator error as returned
        error: ClientError,
    },
    /// Local teardown finished
    LoggedOut,
    /// The persisted token is still valid
    SessionRestored {
        /// User the token belongs to
        user: User,
    },
    /// The persisted token was rejected and has been removed
    SessionExpired,
}

impl SessionAction {
    /// `true` for the action that ends a login attempt
    #[must_use]
    pub const fn is_login_result(&self) -> bool {
        matches!(self, Self::LoginSucceeded { .. } | Self::LoginFailed { .. })
    }

    /// `true` for the action that ends a registration attempt
    #[must_use]
    pub const fn is_register_result(&self) -> bool {
        matches!(
            self,
            Self::RegisterSucceeded { .. } | Self::RegisterFailed { .. }
        )
    }

    /// `true` for the action that ends a session check
    #[must_use]
    pub const fn is_check_result(&self) -> bool {
        matches!(self, Self::SessionRestored { .. } | Self::SessionExpired)
    }
}
