//! Session core shared by the browser app and the command-line client.
//!
//! This crate owns the wire schema of the authentication and content
//! services, the persisted token contract, the authenticated request client,
//! and the session state container. It knows nothing about browsers, files,
//! or sockets: callers plug in a [`Transport`] and a [`TokenStore`].
//!
//! ```text
//! UI action -> SessionManager -> ApiClient -> Transport -> remote service
//!                   ^                |
//!                   +-- ClientEvent -+  (401/403 teardown)
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod session;
pub mod store;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use client::{ApiClient, ClientEvent, ServiceRoot};
pub use config::{ConfigError, RestorePolicy, ServiceConfig};
pub use error::{ApiError, StoreError, TransportError};
pub use session::{AuthOutcome, Session, SessionManager, SessionPhase};
pub use store::{MemoryTokenStore, TOKEN_KEY, TokenStore};
pub use transport::{HttpRequest, HttpResponse, Method, Transport};
pub use types::{
    Comment, LoginResponse, NewComment, Post, PostDraft, PostPage, PostQuery, Reaction, RegisterResponse,
    RegisteredUser, User, UserPatch,
};
