//! Shared auth UI helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! The login and register pages send signed-in visitors home, and the
//! request client's 401/403 notification sends everyone else to `/login`.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use session::{AuthOutcome, ClientEvent};

use crate::state::auth::AuthState;

pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";

/// Signed-in visitors have no business on the login or register screens.
pub fn should_redirect_home(state: &AuthState) -> bool {
    state.is_authenticated()
}

/// A rejected token sends the visitor to the login screen unless they are
/// already looking at it.
pub fn should_navigate_to_login(current_path: &str) -> bool {
    current_path.trim_end_matches('/') != LOGIN_PATH
}

/// Message to show for a finished login or register attempt, if any.
pub fn failure_message(outcome: &AuthOutcome, fallback: &str) -> Option<String> {
    if outcome.success {
        return None;
    }
    Some(
        outcome
            .message
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback.to_owned()),
    )
}

/// Replace the current route with `/` as soon as the visitor is signed in.
pub fn install_home_redirect<F>(auth: RwSignal<AuthState>, navigate: F)
where
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    Effect::new(move || {
        if should_redirect_home(&auth.get()) {
            navigate(HOME_PATH, NavigateOptions { replace: true, ..NavigateOptions::default() });
        }
    });
}

/// Client listener: leave for `/login` after the service rejected the token.
///
/// A full page load is used so every in-memory view of the old session is
/// dropped along with it.
pub fn redirect_on_unauthorized(event: &ClientEvent) {
    match event {
        ClientEvent::Unauthorized { status, url } => {
            leptos::logging::warn!("session rejected with {status} by {url}");
            #[cfg(feature = "hydrate")]
            {
                if let Some(window) = web_sys::window() {
                    let location = window.location();
                    let path = location.pathname().unwrap_or_default();
                    if should_navigate_to_login(&path) {
                        let _ = location.set_href(LOGIN_PATH);
                    }
                }
            }
        }
    }
}
