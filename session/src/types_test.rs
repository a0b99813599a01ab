use super::*;
use serde_json::json;

// =============================================================
// User
// =============================================================

#[test]
fn user_decodes_with_missing_optional_fields() {
    let user: User = serde_json::from_value(json!({ "id": 1, "username": "a" })).unwrap();
    assert_eq!(user.id, 1);
    assert_eq!(user.username, "a");
    assert_eq!(user.email, "");
    assert_eq!(user.avatar, "");
}

#[test]
fn user_decodes_null_strings_as_empty() {
    let user: User = serde_json::from_value(json!({ "id": 2, "username": "b", "bio": null })).unwrap();
    assert_eq!(user.bio, "");
}

#[test]
fn user_accepts_numeric_string_id() {
    let user: User = serde_json::from_value(json!({ "id": "17" })).unwrap();
    assert_eq!(user.id, 17);
}

#[test]
fn user_rejects_non_numeric_id() {
    assert!(serde_json::from_value::<User>(json!({ "id": "abc" })).is_err());
}

#[test]
fn user_merge_prefers_patch_fields() {
    let user = User {
        id: 1,
        username: "alice".to_owned(),
        email: "a@example.com".to_owned(),
        avatar: String::new(),
        bio: "old".to_owned(),
    };
    let patch = UserPatch { bio: Some("new".to_owned()), ..UserPatch::default() };
    let merged = user.merged(&patch);
    assert_eq!(merged.bio, "new");
    assert_eq!(merged.username, "alice");
    assert_eq!(merged.email, "a@example.com");
    assert_eq!(merged.id, 1);
}

#[test]
fn user_patch_serializes_only_present_fields() {
    let patch = UserPatch { avatar: Some("https://img".to_owned()), ..UserPatch::default() };
    assert_eq!(serde_json::to_value(&patch).unwrap(), json!({ "avatar": "https://img" }));
    assert!(!patch.is_empty());
    assert!(UserPatch::default().is_empty());
}

// =============================================================
// Login / register shapes
// =============================================================

#[test]
fn login_response_reads_top_level_access_token() {
    let resp: LoginResponse = serde_json::from_value(json!({
        "access_token": "tok1",
        "user": { "id": 1, "username": "a" }
    }))
    .unwrap();
    assert_eq!(resp.access_token, "tok1");
    assert_eq!(resp.user.unwrap().id, 1);
}

#[test]
fn login_response_without_token_is_rejected() {
    assert!(serde_json::from_value::<LoginResponse>(json!({ "user": { "id": 1 } })).is_err());
}

#[test]
fn register_response_reads_nested_access_token() {
    let resp: RegisterResponse = serde_json::from_value(json!({
        "user": { "id": 5, "firstName": "bob", "email": "b@example.com", "accessToken": "tok2" }
    }))
    .unwrap();
    assert_eq!(resp.user.access_token, "tok2");
    let user = resp.user.user();
    assert_eq!(user.id, 5);
    assert_eq!(user.username, "bob");
    assert_eq!(user.email, "b@example.com");
}

#[test]
fn register_response_prefers_explicit_username() {
    let resp: RegisterResponse = serde_json::from_value(json!({
        "user": { "id": 5, "username": "robert", "firstName": "bob", "accessToken": "tok2" }
    }))
    .unwrap();
    assert_eq!(resp.user.user().username, "robert");
}

#[test]
fn register_request_names_username_first_name() {
    let body = RegisterRequest { first_name: "bob", email: "b@example.com", password: "secret" };
    assert_eq!(
        serde_json::to_value(&body).unwrap(),
        json!({ "firstName": "bob", "email": "b@example.com", "password": "secret" })
    );
}

// =============================================================
// Posts
// =============================================================

#[test]
fn post_accepts_numeric_author_id() {
    let post: Post = serde_json::from_value(json!({
        "id": 3, "title": "Hello", "content": "body", "author_id": 42, "created_at": "2024-01-01"
    }))
    .unwrap();
    assert_eq!(post.author_id.as_deref(), Some("42"));
    assert!(post.tags.is_empty());
}

#[test]
fn post_page_defaults_missing_fields() {
    let page: PostPage = serde_json::from_value(json!({})).unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.total, 0);
}

#[test]
fn post_query_pairs_omit_empty_filters() {
    let query = PostQuery::new(2, 6).with_search("").with_tag("rust");
    assert_eq!(
        query.to_pairs(),
        vec![("page", "2".to_owned()), ("limit", "6".to_owned()), ("tag", "rust".to_owned())]
    );
}

#[test]
fn post_draft_skips_empty_tags() {
    let draft = PostDraft { title: "t".to_owned(), content: "c".to_owned(), tags: vec![] };
    assert_eq!(serde_json::to_value(&draft).unwrap(), json!({ "title": "t", "content": "c" }));
}

// =============================================================
// Comments / reactions
// =============================================================

#[test]
fn new_comment_uses_camel_case_post_id() {
    let body = NewComment { post_id: 9, content: "nice".to_owned() };
    assert_eq!(serde_json::to_value(&body).unwrap(), json!({ "postId": 9, "content": "nice" }));
}

#[test]
fn reaction_decodes_type_field() {
    let reaction: Reaction = serde_json::from_value(json!({ "type": "like", "postId": 9, "userId": 1 })).unwrap();
    assert_eq!(reaction.kind, "like");
    assert_eq!(reaction.post_id, Some(9));
    assert_eq!(reaction.user_id.as_deref(), Some("1"));
}
