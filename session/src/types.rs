//! Wire DTOs for the authentication and content services.
//!
//! DESIGN
//! ======
//! Field names mirror the collaborators' JSON exactly, including the
//! login/register asymmetry: login returns a top-level `access_token`, while
//! register nests `accessToken` inside the returned user. Both shapes are kept
//! literally so a contract change shows up as a decode failure here instead of
//! a silently missing token.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Identity record of an authenticated account.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Numeric account identifier.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: i64,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub username: String,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub email: String,
    /// Avatar image URL; empty when the account has none.
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub avatar: String,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub bio: String,
}

impl User {
    /// Shallow-merge `patch` into this user. Present patch fields win.
    pub fn apply(&mut self, patch: &UserPatch) {
        if let Some(username) = &patch.username {
            self.username.clone_from(username);
        }
        if let Some(email) = &patch.email {
            self.email.clone_from(email);
        }
        if let Some(avatar) = &patch.avatar {
            self.avatar.clone_from(avatar);
        }
        if let Some(bio) = &patch.bio {
            self.bio.clone_from(bio);
        }
    }

    /// Copy of this user with `patch` applied.
    #[must_use]
    pub fn merged(&self, patch: &UserPatch) -> Self {
        let mut next = self.clone();
        next.apply(patch);
        next
    }
}

/// Partial user update. Only present fields are sent or merged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl UserPatch {
    /// True when the patch carries no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.avatar.is_none() && self.bio.is_none()
    }
}

impl From<&User> for UserPatch {
    fn from(user: &User) -> Self {
        Self {
            username: Some(user.username.clone()),
            email: Some(user.email.clone()),
            avatar: Some(user.avatar.clone()),
            bio: Some(user.bio.clone()),
        }
    }
}

/// `POST /login` request body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// `POST /login` response body.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub user: Option<User>,
}

/// `POST /register` request body. The service names the username `firstName`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RegisterRequest<'a> {
    #[serde(rename = "firstName")]
    pub first_name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// `POST /register` response body.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RegisterResponse {
    pub user: RegisteredUser,
}

/// User payload returned by registration, carrying the new session token.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RegisteredUser {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "firstName", default)]
    pub first_name: Option<String>,
    #[serde(flatten)]
    pub profile: User,
}

impl RegisteredUser {
    /// The identity record, falling back to `firstName` for the username.
    #[must_use]
    pub fn user(&self) -> User {
        let mut user = self.profile.clone();
        if user.username.is_empty() {
            if let Some(first_name) = &self.first_name {
                user.username.clone_from(first_name);
            }
        }
        user
    }
}

/// A blog post as served by the content service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: i64,
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub content: String,
    /// Author reference; the service sends either a string or a number.
    #[serde(default, deserialize_with = "deserialize_optional_label")]
    pub author_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// One page of `GET /posts`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPage {
    #[serde(default)]
    pub items: Vec<Post>,
    #[serde(default)]
    pub total: u64,
}

/// Query parameters for `GET /posts`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostQuery {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub tag: Option<String>,
}

impl PostQuery {
    #[must_use]
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit, search: None, tag: None }
    }

    /// Attach a search term; an empty term is dropped.
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = non_empty(search.into());
        self
    }

    /// Attach a tag filter; an empty tag is dropped.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = non_empty(tag.into());
        self
    }

    /// Query pairs in wire order: `page`, `limit`, then optional filters.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", self.page.to_string()), ("limit", self.limit.to_string())];
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(tag) = &self.tag {
            pairs.push(("tag", tag.clone()));
        }
        pairs
    }
}

impl Default for PostQuery {
    fn default() -> Self {
        Self::new(1, 6)
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

/// Body for creating or replacing a post.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// A comment attached to a post.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: i64,
    #[serde(rename = "postId", default, deserialize_with = "deserialize_optional_id")]
    pub post_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub content: String,
    #[serde(default, deserialize_with = "deserialize_optional_label")]
    pub author_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// `POST /comments` request body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewComment {
    #[serde(rename = "postId")]
    pub post_id: i64,
    pub content: String,
}

/// A reaction left on a post (`like`, `love`, ...).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "postId", default, deserialize_with = "deserialize_optional_id")]
    pub post_id: Option<i64>,
    #[serde(rename = "userId", default, deserialize_with = "deserialize_optional_label")]
    pub user_id: Option<String>,
}

/// `POST /reactions` request body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewReaction<'a> {
    #[serde(rename = "postId")]
    pub post_id: i64,
    #[serde(rename = "type")]
    pub kind: &'a str,
}

/// `PUT /comments/:id` request body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CommentEdit<'a> {
    pub content: &'a str,
}

fn id_from_value<E: serde::de::Error>(value: serde_json::Value) -> Result<i64, E> {
    match value {
        serde_json::Value::Number(number) => number
            .as_i64()
            .ok_or_else(|| E::custom("expected integer id")),
        serde_json::Value::String(raw) => raw
            .trim()
            .parse::<i64>()
            .map_err(|_| E::custom(format!("expected numeric id, got {raw:?}"))),
        _ => Err(E::custom("expected id")),
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    id_from_value(value)
}

fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    id_from_value(value).map(Some)
}

fn deserialize_optional_label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(raw) => Ok(Some(raw)),
        serde_json::Value::Number(number) => Ok(Some(number.to_string())),
        _ => Err(D::Error::custom("expected string or number")),
    }
}

fn deserialize_nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
