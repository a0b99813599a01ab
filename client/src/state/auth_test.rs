use super::*;

fn alice() -> User {
    User { id: 1, username: "alice".to_owned(), email: "a@example.com".to_owned(), ..User::default() }
}

#[test]
fn default_state_is_loading_and_anonymous() {
    let state = AuthState::default();
    assert!(state.loading);
    assert!(!state.is_authenticated());
}

#[test]
fn from_session_copies_every_field() {
    let session = Session { token: Some("tok1".to_owned()), user: Some(alice()), loading: false };
    let state = AuthState::from_session(&session);
    assert_eq!(state.token.as_deref(), Some("tok1"));
    assert_eq!(state.user, Some(alice()));
    assert!(!state.loading);
    assert!(state.is_authenticated());
}

#[test]
fn token_without_user_still_counts_as_authenticated() {
    let state = AuthState { user: None, token: Some("tok1".to_owned()), loading: false };
    assert!(state.is_authenticated());
    assert_eq!(state.display_name(), "Account");
}

#[test]
fn display_name_prefers_username_then_email() {
    let mut state = AuthState { user: Some(alice()), token: Some("tok1".to_owned()), loading: false };
    assert_eq!(state.display_name(), "alice");
    if let Some(user) = state.user.as_mut() {
        user.username.clear();
    }
    assert_eq!(state.display_name(), "a@example.com");
}
