//! Session state container: current user, token, and restore status.
//!
//! SYSTEM CONTEXT
//! ==============
//! One [`SessionManager`] exists per process (per browser tab, per CLI run).
//! The UI holds a clone and calls `login`/`register`/`logout`/`update_user`;
//! renderers observe changes through [`SessionManager::watch`].
//!
//! ```text
//! Uninitialized -> Restoring -> Anonymous <-> Authenticated
//!                            \______________^
//! ```
//!
//! DESIGN
//! ======
//! State sits behind a mutex that is never held across an `.await`, so
//! overlapping operations interleave freely: two logins in flight both
//! complete and the last one to finish wins. There is no sequencing guard.
//! Listeners run after the lock is released.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

use crate::client::{ApiClient, ClientEvent};
use crate::config::RestorePolicy;
use crate::error::ApiError;
use crate::store::TokenStore;
use crate::transport::Transport;
use crate::types::{User, UserPatch};

const LOGIN_FAILED: &str = "Login failed";
const REGISTRATION_FAILED: &str = "Registration failed";

/// Client-side record of the authenticated user and their token.
///
/// `user.is_some()` implies `token.is_some()`; the reverse does not hold
/// right after a restore, before any profile fetch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<User>,
    /// True only while the initial restore from storage is running.
    pub loading: bool,
}

impl Session {
    /// Authenticated means "holds a token", validated or not.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Lifecycle position of the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SessionPhase {
    Uninitialized,
    Restoring,
    Anonymous,
    Authenticated,
}

/// Result of `login`/`register`, shaped for direct display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AuthOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AuthOutcome {
    #[must_use]
    pub fn succeeded() -> Self {
        Self { success: true, message: None }
    }

    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self { success: false, message: Some(message.into()) }
    }

    fn from_error(error: &ApiError, fallback: &str) -> Self {
        Self::failed(error.user_message().unwrap_or_else(|| fallback.to_owned()))
    }
}

type Watcher = Arc<dyn Fn(&Session) + Send + Sync>;

#[derive(Default)]
struct Shared {
    session: Session,
    started: bool,
    watchers: Vec<Watcher>,
}

impl Shared {
    fn phase(&self) -> SessionPhase {
        if !self.started {
            SessionPhase::Uninitialized
        } else if self.session.loading {
            SessionPhase::Restoring
        } else if self.session.is_authenticated() {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Anonymous
        }
    }
}

/// Owner of the session state; cheap to clone, all clones share state.
pub struct SessionManager<T, S> {
    client: Arc<ApiClient<T, S>>,
    shared: Arc<Mutex<Shared>>,
}

impl<T, S> Clone for SessionManager<T, S> {
    fn clone(&self) -> Self {
        Self { client: Arc::clone(&self.client), shared: Arc::clone(&self.shared) }
    }
}

impl<T, S> std::fmt::Debug for SessionManager<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("session", &self.snapshot())
            .finish_non_exhaustive()
    }
}

impl<T, S> SessionManager<T, S> {
    /// Wrap `client` and subscribe to its 401/403 notifications so a rejected
    /// token tears the in-memory session down too.
    pub fn new(client: Arc<ApiClient<T, S>>) -> Self {
        let shared = Arc::new(Mutex::new(Shared::default()));
        let teardown = Arc::clone(&shared);
        client.subscribe(move |event| match event {
            ClientEvent::Unauthorized { status, .. } => {
                log::info!("session torn down after {status}");
                mutate(&teardown, |session| {
                    session.user = None;
                    session.token = None;
                });
            }
        });
        Self { client, shared }
    }

    #[must_use]
    pub fn client(&self) -> &Arc<ApiClient<T, S>> {
        &self.client
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.lock().session.clone()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.lock().phase()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.lock().session.is_authenticated()
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.lock().session.token.clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.lock().session.user.clone()
    }

    #[must_use]
    pub fn loading(&self) -> bool {
        self.lock().session.loading
    }

    /// Observe every session change. The listener receives the new state.
    pub fn watch<F>(&self, listener: F)
    where
        F: Fn(&Session) + Send + Sync + 'static,
    {
        self.lock().watchers.push(Arc::new(listener));
    }

    /// Apply `change` and notify watchers.
    fn update(&self, change: impl FnOnce(&mut Session)) {
        mutate(&self.shared, change);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn mutate(shared: &Mutex<Shared>, change: impl FnOnce(&mut Session)) {
    let (snapshot, watchers) = {
        let mut guard = shared.lock().unwrap_or_else(PoisonError::into_inner);
        let before = guard.session.clone();
        change(&mut guard.session);
        if guard.session == before {
            return;
        }
        (guard.session.clone(), guard.watchers.clone())
    };
    for watcher in watchers {
        watcher(&snapshot);
    }
}

impl<T: Transport, S: TokenStore> SessionManager<T, S> {
    /// Restore the session from the token store. Runs once; later calls
    /// return the current phase without touching anything.
    ///
    /// The stored token is adopted without asking the server unless the
    /// client is configured with [`RestorePolicy::Validate`].
    pub async fn initialize(&self) -> SessionPhase {
        {
            let mut guard = self.lock();
            if guard.started {
                log::debug!("session already initialized");
                return guard.phase();
            }
            guard.started = true;
        }
        self.update(|session| session.loading = true);

        let stored = self.client.store().get();
        if let Some(token) = &stored {
            self.update(|session| session.token = Some(token.clone()));
            if self.client.config().restore_policy() == RestorePolicy::Validate {
                self.validate_restored().await;
            }
        }

        self.update(|session| session.loading = false);
        let phase = self.phase();
        log::info!("session restored: {phase:?}");
        phase
    }

    async fn validate_restored(&self) {
        match self.client.current_user().await {
            Ok(user) => self.adopt_user(user),
            // Teardown already ran through the client subscription.
            Err(ApiError::AuthRejected { .. }) => {}
            Err(e) => log::warn!("could not validate restored session, keeping token: {e}"),
        }
    }

    /// Log in with email and password.
    ///
    /// On failure the session is left exactly as it was, and the outcome
    /// carries the service's message or `"Login failed"`.
    pub async fn login(&self, email: &str, password: &str) -> AuthOutcome {
        match self.client.login(email, password).await {
            Ok(response) => {
                self.adopt(&response.access_token, response.user);
                AuthOutcome::succeeded()
            }
            Err(e) => {
                log::warn!("login failed: {e}");
                AuthOutcome::from_error(&e, LOGIN_FAILED)
            }
        }
    }

    /// Create an account and log into it. The token comes from the nested
    /// `user.accessToken` field of the registration response.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> AuthOutcome {
        match self.client.register(username, email, password).await {
            Ok(response) => {
                let user = response.user.user();
                self.adopt(&response.user.access_token, Some(user));
                AuthOutcome::succeeded()
            }
            Err(e) => {
                log::warn!("registration failed: {e}");
                AuthOutcome::from_error(&e, REGISTRATION_FAILED)
            }
        }
    }

    /// Forget the session locally. No server call is made.
    pub fn logout(&self) {
        if let Err(e) = self.client.store().clear() {
            log::warn!("failed to clear stored token on logout: {e}");
        }
        self.update(|session| {
            session.user = None;
            session.token = None;
        });
    }

    /// Shallow-merge `patch` into the current user. No-op without a user.
    pub fn update_user(&self, patch: &UserPatch) {
        self.update(|session| {
            if let Some(user) = session.user.as_mut() {
                user.apply(patch);
            }
        });
    }

    /// Fetch `GET /me` and adopt the user while a token is still held.
    ///
    /// # Errors
    ///
    /// Returns the failure of the underlying call.
    pub async fn refresh_user(&self) -> Result<User, ApiError> {
        let user = self.client.current_user().await?;
        self.adopt_user(user.clone());
        Ok(user)
    }

    /// Persist `patch` with `PUT /users/profile`, then merge the server's
    /// answer into the local user.
    ///
    /// # Errors
    ///
    /// Returns the failure of the underlying call; local state is untouched.
    pub async fn save_profile(&self, patch: &UserPatch) -> Result<User, ApiError> {
        let saved = self.client.update_profile(patch).await?;
        self.update_user(&UserPatch::from(&saved));
        Ok(saved)
    }

    /// Token first, then user: `user` is never visible without a token.
    fn adopt(&self, token: &str, user: Option<User>) {
        if let Err(e) = self.client.store().set(token) {
            log::warn!("failed to persist session token: {e}");
        }
        self.update(|session| {
            session.token = Some(token.to_owned());
            session.user = user;
        });
    }

    fn adopt_user(&self, user: User) {
        self.update(|session| {
            if session.token.is_some() {
                session.user = Some(user);
            }
        });
    }
}
