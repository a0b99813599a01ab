//! Authenticated request client for the authentication and content services.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every outbound call goes through [`ApiClient::send_json`]:
//! 1. build the URL against one of two service roots,
//! 2. attach `Authorization: Bearer <token>` when the store holds a token,
//! 3. classify non-2xx responses into [`ApiError`],
//! 4. on 401/403 clear the store and emit [`ClientEvent::Unauthorized`]
//!    before handing the original failure back to the caller.
//!
//! The 401/403 reaction is unconditional: no caller can opt out of it. The
//! client does not navigate anywhere itself; subscribers decide what a
//! rejected session means for their surface (browser route, CLI hint).

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ServiceConfig;
use crate::error::ApiError;
use crate::store::TokenStore;
use crate::transport::{HttpRequest, Method, Transport};
use crate::types::{
    Comment, CommentEdit, LoginRequest, LoginResponse, NewComment, NewReaction, Post, PostDraft, PostPage,
    PostQuery, Reaction, RegisterRequest, RegisterResponse, User, UserPatch,
};

/// Which collaborator a call is addressed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServiceRoot {
    Auth,
    Content,
}

/// Notifications emitted by the client to its subscribers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClientEvent {
    /// A request was answered with 401 or 403. The token store is already
    /// cleared when this fires; the application should send the user to the
    /// login entry point.
    Unauthorized { status: u16, url: String },
}

type Listener = Arc<dyn Fn(&ClientEvent) + Send + Sync>;

/// HTTP client that decorates requests with the stored bearer token.
pub struct ApiClient<T, S> {
    config: ServiceConfig,
    transport: T,
    store: S,
    listeners: Mutex<Vec<Listener>>,
}

impl<T, S> std::fmt::Debug for ApiClient<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient").field("config", &self.config).finish_non_exhaustive()
    }
}

/// `Authorization` header value for `token`.
#[must_use]
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

impl<T, S> ApiClient<T, S> {
    pub fn new(config: ServiceConfig, transport: T, store: S) -> Self {
        Self { config, transport, store, listeners: Mutex::new(Vec::new()) }
    }

    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Register a listener for [`ClientEvent`]s. Listeners live as long as
    /// the client.
    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&ClientEvent) + Send + Sync + 'static,
    {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(listener));
    }

    /// Absolute URL for `path` under `root`, with `query` appended in order.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if the joined URL does not parse.
    pub fn endpoint(&self, root: ServiceRoot, path: &str, query: &[(&str, String)]) -> Result<String, ApiError> {
        let base = match root {
            ServiceRoot::Auth => self.config.auth_base_url(),
            ServiceRoot::Content => self.config.content_base_url(),
        };
        let joined = format!("{base}/{}", path.trim_start_matches('/'));
        let mut url = url::Url::parse(&joined).map_err(|e| ApiError::InvalidUrl(format!("{joined}: {e}")))?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url.into())
    }

    fn emit(&self, event: &ClientEvent) {
        // Snapshot so listeners may subscribe or call back into the client.
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in listeners {
            listener(event);
        }
    }
}

impl<T: Transport, S: TokenStore> ApiClient<T, S> {
    /// Send one request and return the decoded JSON body.
    ///
    /// An empty success body decodes as `null`.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`]. For 401/403 the token store has
    /// been cleared and subscribers notified before this returns.
    pub async fn send_json(
        &self,
        method: Method,
        root: ServiceRoot,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let url = self.endpoint(root, path, query)?;
        let authorization = self.store.get().map(|token| bearer(&token));
        log::debug!(
            "{} {url} (authorized: {})",
            method.as_str(),
            authorization.is_some()
        );

        let request = HttpRequest { method, url: url.clone(), authorization, body };
        let response = self.transport.send(request).await.map_err(|e| {
            log::warn!("{} {url} failed: {e}", method.as_str());
            ApiError::from(e)
        })?;

        if response.is_success() {
            return decode_body(&response.body);
        }

        let error = ApiError::from_status(response.status, &response.body);
        if error.is_auth_rejected() {
            self.reject_session(response.status, url);
        } else {
            log::warn!("{} {url} -> {}", method.as_str(), response.status);
        }
        Err(error)
    }

    /// Send one request and deserialize the body into `R`.
    ///
    /// # Errors
    ///
    /// As [`ApiClient::send_json`], plus [`ApiError::Decode`] when the body
    /// does not match `R`.
    pub async fn request<R: DeserializeOwned>(
        &self,
        method: Method,
        root: ServiceRoot,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<R, ApiError> {
        let value = self.send_json(method, root, path, query, body).await?;
        serde_json::from_value(value).map_err(|e| ApiError::Decode(format!("{path}: {e}")))
    }

    fn reject_session(&self, status: u16, url: String) {
        log::warn!("session rejected with {status} by {url}; clearing stored token");
        if let Err(e) = self.store.clear() {
            log::warn!("failed to clear rejected token: {e}");
        }
        self.emit(&ClientEvent::Unauthorized { status, url });
    }

    async fn get<R: DeserializeOwned>(&self, root: ServiceRoot, path: &str) -> Result<R, ApiError> {
        self.request(Method::Get, root, path, &[], None).await
    }

    async fn with_body<R: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        root: ServiceRoot,
        path: &str,
        body: &B,
    ) -> Result<R, ApiError> {
        let body = serde_json::to_value(body).map_err(|e| ApiError::Decode(format!("{path} body: {e}")))?;
        self.request(method, root, path, &[], Some(body)).await
    }

    // ---------------------------------------------------------------------
    // Authentication service
    // ---------------------------------------------------------------------

    /// `POST /login`.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the call.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        self.with_body(Method::Post, ServiceRoot::Auth, "/login", &LoginRequest { email, password })
            .await
    }

    /// `POST /register`. The username travels as `firstName`.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the call.
    pub async fn register(&self, first_name: &str, email: &str, password: &str) -> Result<RegisterResponse, ApiError> {
        let body = RegisterRequest { first_name, email, password };
        self.with_body(Method::Post, ServiceRoot::Auth, "/register", &body).await
    }

    /// `GET /me`.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the call.
    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.get(ServiceRoot::Auth, "/me").await
    }

    /// `PUT /users/profile`.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the call.
    pub async fn update_profile(&self, patch: &UserPatch) -> Result<User, ApiError> {
        self.with_body(Method::Put, ServiceRoot::Auth, "/users/profile", patch).await
    }

    /// `GET /users/:id`.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the call.
    pub async fn user_profile(&self, user_id: i64) -> Result<User, ApiError> {
        self.get(ServiceRoot::Auth, &format!("/users/{user_id}")).await
    }

    // ---------------------------------------------------------------------
    // Content service
    // ---------------------------------------------------------------------

    /// `GET /posts?page&limit[&search][&tag]`.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the call.
    pub async fn list_posts(&self, query: &PostQuery) -> Result<PostPage, ApiError> {
        self.request(Method::Get, ServiceRoot::Content, "/posts", &query.to_pairs(), None)
            .await
    }

    /// `GET /posts/:id`.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the call.
    pub async fn get_post(&self, id: i64) -> Result<Post, ApiError> {
        self.get(ServiceRoot::Content, &format!("/posts/{id}")).await
    }

    /// `POST /posts`.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the call.
    pub async fn create_post(&self, draft: &PostDraft) -> Result<Post, ApiError> {
        self.with_body(Method::Post, ServiceRoot::Content, "/posts", draft).await
    }

    /// `PUT /posts/:id`.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the call.
    pub async fn update_post(&self, id: i64, draft: &PostDraft) -> Result<Post, ApiError> {
        self.with_body(Method::Put, ServiceRoot::Content, &format!("/posts/{id}"), draft)
            .await
    }

    /// `DELETE /posts/:id`. Returns whatever the service echoes back.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the call.
    pub async fn delete_post(&self, id: i64) -> Result<Value, ApiError> {
        self.send_json(Method::Delete, ServiceRoot::Content, &format!("/posts/{id}"), &[], None)
            .await
    }

    /// `GET /posts/user/:userId`.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the call.
    pub async fn user_posts(&self, user_id: i64) -> Result<Vec<Post>, ApiError> {
        self.get(ServiceRoot::Content, &format!("/posts/user/{user_id}")).await
    }

    // ---------------------------------------------------------------------
    // Comments and reactions (served next to authentication)
    // ---------------------------------------------------------------------

    /// `GET /comments/post/:postId`.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the call.
    pub async fn post_comments(&self, post_id: i64) -> Result<Vec<Comment>, ApiError> {
        self.get(ServiceRoot::Auth, &format!("/comments/post/{post_id}")).await
    }

    /// `POST /comments`.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the call.
    pub async fn create_comment(&self, comment: &NewComment) -> Result<Comment, ApiError> {
        self.with_body(Method::Post, ServiceRoot::Auth, "/comments", comment).await
    }

    /// `PUT /comments/:id`.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the call.
    pub async fn update_comment(&self, id: i64, content: &str) -> Result<Comment, ApiError> {
        self.with_body(Method::Put, ServiceRoot::Auth, &format!("/comments/{id}"), &CommentEdit { content })
            .await
    }

    /// `DELETE /comments/:id`.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the call.
    pub async fn delete_comment(&self, id: i64) -> Result<Value, ApiError> {
        self.send_json(Method::Delete, ServiceRoot::Auth, &format!("/comments/{id}"), &[], None)
            .await
    }

    /// `GET /reactions/post/:postId`.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the call.
    pub async fn post_reactions(&self, post_id: i64) -> Result<Vec<Reaction>, ApiError> {
        self.get(ServiceRoot::Auth, &format!("/reactions/post/{post_id}")).await
    }

    /// `GET /reactions/post/:postId/user`. `None` when the caller has not reacted.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the call.
    pub async fn user_reaction(&self, post_id: i64) -> Result<Option<Reaction>, ApiError> {
        self.get(ServiceRoot::Auth, &format!("/reactions/post/{post_id}/user")).await
    }

    /// `POST /reactions {postId, type}`.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the call.
    pub async fn add_reaction(&self, post_id: i64, kind: &str) -> Result<Value, ApiError> {
        self.with_body(Method::Post, ServiceRoot::Auth, "/reactions", &NewReaction { post_id, kind })
            .await
    }

    /// `DELETE /reactions/post/:postId`.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the call.
    pub async fn remove_reaction(&self, post_id: i64) -> Result<Value, ApiError> {
        self.send_json(Method::Delete, ServiceRoot::Auth, &format!("/reactions/post/{post_id}"), &[], None)
            .await
    }
}

fn decode_body(raw: &str) -> Result<Value, ApiError> {
    if raw.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(raw).map_err(|e| ApiError::Decode(e.to_string()))
}
