//! Session reducer.

use super::{SessionAction, SessionEnvironment, SessionState};
use crate::error::ClientError;
use crate::providers::AuthClient;
use crate::storage::KeyValueStore;
use crate::types::AuthResponse;
use marquee_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
use std::marker::PhantomData;
use std::sync::Arc;

/// Shown when a refused login carries no message
pub const LOGIN_FAILED: &str = "Login failed";

/// Shown when a refused registration carries no message
pub const REGISTRATION_FAILED: &str = "Registration failed";

/// Reducer for [`SessionState`]
///
/// Generic over the auth collaborator so tests can inject a mock.
pub struct SessionReducer<A> {
    _phantom: PhantomData<A>,
}

impl<A> SessionReducer<A> {
    /// Creates a new session reducer
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<A> Default for SessionReducer<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Clone for SessionReducer<A> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

/// Persist the token of a successful auth response
///
/// A storage failure is logged; the user stays signed in for this run.
fn persist_token(storage: &dyn KeyValueStore, key: &str, response: &AuthResponse) {
    if let Err(error) = storage.set(key, &response.token) {
        tracing::warn!(%error, "Failed to persist auth token");
    }
}

fn failure_message(error: &ClientError, fallback: &str) -> String {
    error.user_message().unwrap_or(fallback).to_string()
}

impl<A> Reducer for SessionReducer<A>
where
    A: AuthClient + 'static,
{
    type State = SessionState;
    type Action = SessionAction;
    type Environment = SessionEnvironment<A>;

    #[allow(clippy::too_many_lines)] // One arm per action
    fn reduce(
        &self,
        state: &mut SessionState,
        action: SessionAction,
        env: &SessionEnvironment<A>,
    ) -> SmallVec<[Effect<SessionAction>; 4]> {
        match action {
            // ═══════════════════════════════════════════════════════════════
            // Login / Register: call the auth collaborator
            // ═══════════════════════════════════════════════════════════════
            SessionAction::Login { credentials } => {
                tracing::debug!(email = %credentials.email, "Login started");
                state.is_loading = true;
                state.error = None;

                let auth = Arc::clone(&env.auth);
                let storage = Arc::clone(&env.storage);
                let token_key = env.token_key.clone();

                smallvec![Effect::Future(Box::pin(async move {
                    match auth.login(&credentials).await {
                        Ok(response) => {
                            persist_token(storage.as_ref(), &token_key, &response);
                            Some(SessionAction::LoginSucceeded {
                                user: response.user,
                            })
                        }
                        Err(error) => {
                            tracing::debug!(%error, "Login rejected");
                            Some(SessionAction::LoginFailed {
                                message: failure_message(&error, LOGIN_FAILED),
                                error,
                            })
                        }
                    }
                }))]
            }

            SessionAction::Register { registration } => {
                tracing::debug!(email = %registration.email, "Registration started");
                state.is_loading = true;
                state.error = None;

                let auth = Arc::clone(&env.auth);
                let storage = Arc::clone(&env.storage);
                let token_key = env.token_key.clone();

                smallvec![Effect::Future(Box::pin(async move {
                    match auth.register(&registration).await {
                        Ok(response) => {
                            persist_token(storage.as_ref(), &token_key, &response);
                            Some(SessionAction::RegisterSucceeded {
                                user: response.user,
                            })
                        }
                        Err(error) => {
                            tracing::debug!(%error, "Registration rejected");
                            Some(SessionAction::RegisterFailed {
                                message: failure_message(&error, REGISTRATION_FAILED),
                                error,
                            })
                        }
                    }
                }))]
            }

            SessionAction::LoginSucceeded { user } | SessionAction::RegisterSucceeded { user } => {
                tracing::debug!(user_id = %user.id, "Authenticated");
                state.user = Some(user);
                state.is_loading = false;
                state.error = None;
                smallvec![Effect::None]
            }

            SessionAction::LoginFailed { message, .. }
            | SessionAction::RegisterFailed { message, .. } => {
                state.user = None;
                state.is_loading = false;
                state.error = Some(message);
                smallvec![Effect::None]
            }

            // ═══════════════════════════════════════════════════════════════
            // Logout: best-effort remote call, guaranteed local teardown
            // ═══════════════════════════════════════════════════════════════
            SessionAction::Logout => {
                let auth = Arc::clone(&env.auth);
                let storage = Arc::clone(&env.storage);
                let token_key = env.token_key.clone();

                smallvec![Effect::Future(Box::pin(async move {
                    if let Err(error) = auth.logout().await {
                        tracing::warn!(%error, "Remote logout failed, clearing local session anyway");
                    }
                    if let Err(error) = storage.remove(&token_key) {
                        tracing::warn!(%error, "Failed to remove auth token");
                    }
                    Some(SessionAction::LoggedOut)
                }))]
            }

            SessionAction::LoggedOut => {
                tracing::debug!("Logged out");
                *state = SessionState::default();
                smallvec![Effect::None]
            }

            // ═══════════════════════════════════════════════════════════════
            // CheckAuth: restore from the persisted token
            // ═══════════════════════════════════════════════════════════════
            SessionAction::CheckAuth => {
                let token = match env.storage.get(&env.token_key) {
                    Ok(token) => token,
                    Err(error) => {
                        tracing::warn!(%error, "Failed to read auth token");
                        None
                    }
                };

                if token.is_none() {
                    tracing::debug!("No stored token, staying anonymous");
                    return smallvec![Effect::None];
                }

                state.is_loading = true;

                let auth = Arc::clone(&env.auth);
                let storage = Arc::clone(&env.storage);
                let token_key = env.token_key.clone();

                smallvec![Effect::Future(Box::pin(async move {
                    match auth.current_user().await {
                        Ok(user) => Some(SessionAction::SessionRestored { user }),
                        Err(error) => {
                            tracing::debug!(%error, "Stored token rejected");
                            if let Err(error) = storage.remove(&token_key) {
                                tracing::warn!(%error, "Failed to remove auth token");
                            }
                            Some(SessionAction::SessionExpired)
                        }
                    }
                }))]
            }

            SessionAction::SessionRestored { user } => {
                tracing::debug!(user_id = %user.id, "Session restored");
                state.user = Some(user);
                state.is_loading = false;
                smallvec![Effect::None]
            }

            SessionAction::SessionExpired => {
                state.user = None;
                state.is_loading = false;
                smallvec![Effect::None]
            }

            // ═══════════════════════════════════════════════════════════════
            // Profile merges: no-ops when anonymous
            // ═══════════════════════════════════════════════════════════════
            SessionAction::UpdateUser { patch } => {
                if let Some(user) = state.user.as_mut() {
                    patch.apply(user);
                }
                smallvec![Effect::None]
            }

            SessionAction::UpdateStripeStatus { status } => {
                if let Some(user) = state.user.as_mut() {
                    user.stripe_account_status = Some(status);
                }
                smallvec![Effect::None]
            }

            SessionAction::VerifyUser {
                is_verified,
                status,
            } => {
                if let Some(user) = state.user.as_mut() {
                    user.is_verified = is_verified;
                    user.verification_status = Some(status);
                }
                smallvec![Effect::None]
            }

            SessionAction::ClearError => {
                state.error = None;
                smallvec![Effect::None]
            }
        }
    }
}
