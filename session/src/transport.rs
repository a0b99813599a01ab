//! Minimal HTTP seam between the request client and a concrete HTTP stack.
//!
//! The browser implements it with `gloo-net`, the CLI with `reqwest`. The
//! transport only moves bytes: decoration, status classification and decoding
//! all happen in [`crate::client`].

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;

use crate::error::TransportError;

/// HTTP verbs used by the collaborators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

/// A fully decorated outbound request.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    /// Absolute URL including the query string.
    pub url: String,
    /// Value of the `Authorization` header, if any.
    pub authorization: Option<String>,
    /// JSON body, sent with `Content-Type: application/json`.
    pub body: Option<Value>,
}

/// Raw response: status plus undecoded body text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one request and returns whatever the server answered.
///
/// Only failures that produced no response at all are errors here; 4xx and
/// 5xx are ordinary responses at this layer.
pub trait Transport {
    fn send(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse, TransportError>>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse, TransportError>> {
        (**self).send(request)
    }
}
