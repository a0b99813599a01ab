use std::sync::Mutex;

use serde_json::json;

use super::*;
use crate::config::ServiceConfig;
use crate::mock::{AUTH_ROOT, CONTENT_ROOT, MockTransport, TestClient, client_with};
use crate::store::MemoryTokenStore;
use crate::types::PostQuery;

fn manager(store: MemoryTokenStore) -> (SessionManager<Arc<MockTransport>, Arc<MemoryTokenStore>>, Arc<MockTransport>, Arc<MemoryTokenStore>) {
    let (client, transport, store) = client_with(store);
    (SessionManager::new(client), transport, store)
}

fn validating_manager(
    store: MemoryTokenStore,
) -> (SessionManager<Arc<MockTransport>, Arc<MemoryTokenStore>>, Arc<MockTransport>, Arc<MemoryTokenStore>) {
    let transport = Arc::new(MockTransport::default());
    let store = Arc::new(store);
    let config = ServiceConfig::new(AUTH_ROOT, CONTENT_ROOT)
        .unwrap()
        .with_restore_policy(RestorePolicy::Validate);
    let client: Arc<TestClient> = Arc::new(ApiClient::new(config, Arc::clone(&transport), Arc::clone(&store)));
    (SessionManager::new(client), transport, store)
}

fn alice() -> User {
    User {
        id: 1,
        username: "alice".to_owned(),
        email: "alice@example.com".to_owned(),
        avatar: String::new(),
        bio: "hi".to_owned(),
    }
}

async fn logged_in() -> (SessionManager<Arc<MockTransport>, Arc<MemoryTokenStore>>, Arc<MockTransport>, Arc<MemoryTokenStore>) {
    let (session, transport, store) = manager(MemoryTokenStore::new());
    session.initialize().await;
    transport.reply(200, json!({ "access_token": "tok1", "user": serde_json::to_value(alice()).unwrap() }));
    assert!(session.login("alice@example.com", "pw").await.success);
    (session, transport, store)
}

// =============================================================
// initialize
// =============================================================

#[test]
fn new_session_is_uninitialized_and_empty() {
    let (session, _, _) = manager(MemoryTokenStore::new());
    assert_eq!(session.phase(), SessionPhase::Uninitialized);
    assert_eq!(session.snapshot(), Session::default());
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn initialize_adopts_stored_token_without_server_call() {
    let (session, transport, _) = manager(MemoryTokenStore::with_token("T"));

    let phase = session.initialize().await;

    assert_eq!(phase, SessionPhase::Authenticated);
    assert_eq!(session.token().as_deref(), Some("T"));
    assert_eq!(session.user(), None);
    assert!(!session.loading());
    assert!(session.is_authenticated());
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn initialize_with_empty_store_is_anonymous() {
    let (session, _, _) = manager(MemoryTokenStore::new());

    assert_eq!(session.initialize().await, SessionPhase::Anonymous);
    assert_eq!(session.token(), None);
    assert!(!session.loading());
}

#[tokio::test]
async fn initialize_runs_once() {
    let (session, _, store) = manager(MemoryTokenStore::new());
    session.initialize().await;
    store.set("appeared-later").unwrap();

    assert_eq!(session.initialize().await, SessionPhase::Anonymous);
    assert_eq!(session.token(), None);
}

#[tokio::test]
async fn initialize_reports_restoring_to_watchers() {
    let (session, _, _) = manager(MemoryTokenStore::with_token("T"));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    session.watch(move |s| sink.lock().unwrap().push((s.loading, s.token.clone())));

    session.initialize().await;

    let seen = seen.lock().unwrap();
    assert_eq!(seen.first(), Some(&(true, None)));
    assert_eq!(seen.last(), Some(&(false, Some("T".to_owned()))));
}

#[tokio::test]
async fn validating_restore_adopts_current_user() {
    let (session, transport, _) = validating_manager(MemoryTokenStore::with_token("T"));
    transport.reply(200, serde_json::to_value(alice()).unwrap());

    assert_eq!(session.initialize().await, SessionPhase::Authenticated);
    assert_eq!(session.user(), Some(alice()));
    assert_eq!(transport.last_request().url, format!("{AUTH_ROOT}/me"));
    assert_eq!(transport.last_request().authorization.as_deref(), Some("Bearer T"));
}

#[tokio::test]
async fn validating_restore_drops_rejected_token() {
    let (session, transport, store) = validating_manager(MemoryTokenStore::with_token("expired"));
    transport.reply(401, json!({ "message": "jwt expired" }));

    assert_eq!(session.initialize().await, SessionPhase::Anonymous);
    assert_eq!(session.token(), None);
    assert_eq!(store.get(), None);
    assert!(!session.loading());
}

#[tokio::test]
async fn validating_restore_keeps_token_on_network_failure() {
    let (session, transport, store) = validating_manager(MemoryTokenStore::with_token("T"));
    transport.fail("offline");

    assert_eq!(session.initialize().await, SessionPhase::Authenticated);
    assert_eq!(session.token().as_deref(), Some("T"));
    assert_eq!(store.get().as_deref(), Some("T"));
}

// =============================================================
// login / register
// =============================================================

#[tokio::test]
async fn login_adopts_token_and_user() {
    let (session, transport, store) = manager(MemoryTokenStore::new());
    session.initialize().await;
    transport.reply(200, json!({ "access_token": "tok1", "user": { "id": 1, "username": "a" } }));

    let outcome = session.login("a@b.com", "x").await;

    assert_eq!(outcome, AuthOutcome::succeeded());
    assert_eq!(session.token().as_deref(), Some("tok1"));
    assert_eq!(session.user().map(|u| u.id), Some(1));
    assert_eq!(store.get().as_deref(), Some("tok1"));
    assert_eq!(session.phase(), SessionPhase::Authenticated);
    assert_eq!(transport.last_request().body, Some(json!({ "email": "a@b.com", "password": "x" })));
}

#[tokio::test]
async fn failed_login_leaves_session_unchanged() {
    let (session, transport, store) = manager(MemoryTokenStore::new());
    session.initialize().await;
    let before = session.snapshot();
    transport.reply(400, json!({ "message": "Invalid credentials" }));

    let outcome = session.login("a@b.com", "wrong").await;

    assert_eq!(outcome, AuthOutcome::failed("Invalid credentials"));
    assert_eq!(session.snapshot(), before);
    assert_eq!(store.get(), None);
}

#[tokio::test]
async fn unauthorized_login_reports_payload_message() {
    let (session, transport, _) = manager(MemoryTokenStore::new());
    session.initialize().await;
    let before = session.snapshot();
    transport.reply(401, json!({ "message": "Wrong password" }));

    let outcome = session.login("a@b.com", "wrong").await;

    assert_eq!(outcome, AuthOutcome::failed("Wrong password"));
    assert_eq!(session.snapshot(), before);
}

#[tokio::test]
async fn login_failure_without_message_uses_fallback() {
    let (session, transport, _) = manager(MemoryTokenStore::new());
    transport.reply(500, json!({ "message": "db down" }));
    assert_eq!(session.login("a@b.com", "x").await, AuthOutcome::failed("Login failed"));

    transport.fail("offline");
    assert_eq!(session.login("a@b.com", "x").await, AuthOutcome::failed("Login failed"));
}

#[tokio::test]
async fn register_adopts_nested_access_token() {
    let (session, transport, store) = manager(MemoryTokenStore::new());
    session.initialize().await;
    transport.reply(
        201,
        json!({ "user": { "id": 7, "firstName": "bob", "email": "b@example.com", "accessToken": "tok2" } }),
    );

    let outcome = session.register("bob", "b@example.com", "secret").await;

    assert!(outcome.success);
    assert_eq!(session.token().as_deref(), Some("tok2"));
    assert_eq!(store.get().as_deref(), Some("tok2"));
    let user = session.user().unwrap();
    assert_eq!(user.id, 7);
    assert_eq!(user.username, "bob");
}

#[tokio::test]
async fn register_failure_surfaces_message() {
    let (session, transport, _) = manager(MemoryTokenStore::new());
    session.initialize().await;
    let before = session.snapshot();
    transport.reply(409, json!({ "message": "Email taken" }));

    let outcome = session.register("bob", "b@example.com", "secret").await;

    assert_eq!(outcome, AuthOutcome { success: false, message: Some("Email taken".to_owned()) });
    assert_eq!(session.snapshot(), before);
}

#[tokio::test]
async fn register_failure_without_message_uses_fallback() {
    let (session, transport, _) = manager(MemoryTokenStore::new());
    transport.reply(400, json!({}));
    assert_eq!(
        session.register("bob", "b@example.com", "secret").await,
        AuthOutcome::failed("Registration failed")
    );
}

#[tokio::test]
async fn overlapping_logins_last_completion_wins() {
    let (session, transport, store) = manager(MemoryTokenStore::new());
    session.initialize().await;
    transport
        .reply(200, json!({ "access_token": "first", "user": { "id": 1 } }))
        .reply(200, json!({ "access_token": "second", "user": { "id": 2 } }))
        .stall_on("first@x.com", 5);

    let (a, b) = tokio::join!(session.login("first@x.com", "x"), session.login("second@x.com", "y"));

    assert!(a.success && b.success);
    assert_eq!(transport.requests().len(), 2);
    // The first-issued login resolves last, so its token is the survivor.
    assert_eq!(session.token().as_deref(), Some("first"));
    assert_eq!(session.user().map(|u| u.id), Some(1));
    assert_eq!(store.get().as_deref(), Some("first"));
}

#[tokio::test]
async fn sequential_logins_keep_the_later_token() {
    let (session, transport, store) = manager(MemoryTokenStore::new());
    session.initialize().await;
    transport
        .reply(200, json!({ "access_token": "first", "user": { "id": 1 } }))
        .reply(200, json!({ "access_token": "second", "user": { "id": 2 } }));

    assert!(session.login("a@b.com", "x").await.success);
    assert!(session.login("c@d.com", "y").await.success);

    assert_eq!(session.token().as_deref(), Some("second"));
    assert_eq!(store.get().as_deref(), Some("second"));
}

#[tokio::test]
async fn rejected_login_while_signed_in_tears_session_down() {
    let (session, transport, store) = logged_in().await;
    assert!(session.is_authenticated());
    transport.reply(401, json!({ "message": "Wrong password" }));

    let outcome = session.login("alice@example.com", "wrong").await;

    // Any 401 from the collaborator ends the held session, login included.
    assert_eq!(outcome, AuthOutcome::failed("Wrong password"));
    assert_eq!(session.token(), None);
    assert_eq!(session.user(), None);
    assert_eq!(store.get(), None);
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn non_auth_login_failure_while_signed_in_keeps_session() {
    let (session, transport, store) = logged_in().await;
    let before = session.snapshot();
    transport.reply(400, json!({ "message": "Invalid credentials" }));

    let outcome = session.login("alice@example.com", "wrong").await;

    assert_eq!(outcome, AuthOutcome::failed("Invalid credentials"));
    assert_eq!(session.snapshot(), before);
    assert!(store.get().is_some());
}

// =============================================================
// logout / update_user
// =============================================================

#[tokio::test]
async fn logout_clears_everything_without_server_call() {
    let (session, transport, store) = logged_in().await;
    let sent = transport.requests().len();

    session.logout();

    assert_eq!(session.token(), None);
    assert_eq!(session.user(), None);
    assert_eq!(store.get(), None);
    assert_eq!(session.phase(), SessionPhase::Anonymous);
    assert_eq!(transport.requests().len(), sent);
}

#[test]
fn logout_from_empty_state_is_harmless() {
    let (session, _, store) = manager(MemoryTokenStore::with_token("orphan"));
    session.logout();
    assert_eq!(session.snapshot(), Session::default());
    assert_eq!(store.get(), None);
}

#[test]
fn update_user_without_user_is_noop() {
    let (session, _, _) = manager(MemoryTokenStore::new());
    let before = session.snapshot();
    session.update_user(&UserPatch { bio: Some("x".to_owned()), ..UserPatch::default() });
    assert_eq!(session.snapshot(), before);
}

#[tokio::test]
async fn update_user_merges_patch_locally() {
    let (session, transport, _) = logged_in().await;
    let sent = transport.requests().len();

    session.update_user(&UserPatch { bio: Some("new bio".to_owned()), ..UserPatch::default() });

    let expected = alice().merged(&UserPatch { bio: Some("new bio".to_owned()), ..UserPatch::default() });
    assert_eq!(session.user(), Some(expected));
    assert_eq!(session.phase(), SessionPhase::Authenticated);
    assert_eq!(transport.requests().len(), sent);
}

// =============================================================
// 401/403 from unrelated calls
// =============================================================

#[tokio::test]
async fn rejected_content_call_tears_session_down() {
    let (session, transport, store) = logged_in().await;
    transport.reply(403, json!({}));

    let err = session.client().list_posts(&PostQuery::default()).await.unwrap_err();

    assert!(err.is_auth_rejected());
    assert!(!session.is_authenticated());
    assert_eq!(session.user(), None);
    assert_eq!(store.get(), None);
    assert_eq!(session.phase(), SessionPhase::Anonymous);
}

// =============================================================
// profile helpers
// =============================================================

#[tokio::test]
async fn refresh_user_adopts_server_identity() {
    let (session, transport, _) = manager(MemoryTokenStore::with_token("T"));
    session.initialize().await;
    transport.reply(200, serde_json::to_value(alice()).unwrap());

    let user = session.refresh_user().await.unwrap();

    assert_eq!(user, alice());
    assert_eq!(session.user(), Some(alice()));
}

#[tokio::test]
async fn refresh_user_without_token_does_not_adopt() {
    let (session, transport, _) = manager(MemoryTokenStore::new());
    session.initialize().await;
    transport.reply(200, serde_json::to_value(alice()).unwrap());

    session.refresh_user().await.unwrap();

    assert_eq!(session.user(), None);
}

#[tokio::test]
async fn save_profile_puts_patch_and_merges_result() {
    let (session, transport, _) = logged_in().await;
    let mut saved = alice();
    saved.bio = "server bio".to_owned();
    transport.reply(200, serde_json::to_value(&saved).unwrap());

    let patch = UserPatch { bio: Some("client bio".to_owned()), ..UserPatch::default() };
    session.save_profile(&patch).await.unwrap();

    let request = transport.last_request();
    assert_eq!(request.url, format!("{AUTH_ROOT}/users/profile"));
    assert_eq!(request.body, Some(json!({ "bio": "client bio" })));
    assert_eq!(session.user().unwrap().bio, "server bio");
}

#[tokio::test]
async fn save_profile_failure_leaves_user_untouched() {
    let (session, transport, _) = logged_in().await;
    transport.reply(422, json!({ "message": "bio too long" }));

    let err = session
        .save_profile(&UserPatch { bio: Some("x".repeat(10_000)), ..UserPatch::default() })
        .await
        .unwrap_err();

    assert_eq!(err.user_message().as_deref(), Some("bio too long"));
    assert_eq!(session.user(), Some(alice()));
}

#[test]
fn auth_outcome_serializes_without_empty_message() {
    assert_eq!(serde_json::to_value(AuthOutcome::succeeded()).unwrap(), json!({ "success": true }));
    assert_eq!(
        serde_json::to_value(AuthOutcome::failed("nope")).unwrap(),
        json!({ "success": false, "message": "nope" })
    );
}
