//! Auth-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session container is the source of truth; this is the copy held in an
//! `RwSignal` so route guards and the nav bar re-render when it changes.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use session::{Session, User};

/// Authentication state tracking the current user and loading status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    pub token: Option<String>,
    pub loading: bool,
}

impl Default for AuthState {
    /// Nothing has been restored yet, so the state starts out loading.
    fn default() -> Self {
        Self { user: None, token: None, loading: true }
    }
}

impl AuthState {
    pub fn from_session(session: &Session) -> Self {
        Self { user: session.user.clone(), token: session.token.clone(), loading: session.loading }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Label for the signed-in user. A restored token may not have a
    /// profile attached yet.
    pub fn display_name(&self) -> String {
        match &self.user {
            Some(user) if !user.username.is_empty() => user.username.clone(),
            Some(user) => user.email.clone(),
            None => "Account".to_owned(),
        }
    }
}
