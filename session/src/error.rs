//! Error taxonomy for collaborator calls and token persistence.
//!
//! ERROR HANDLING
//! ==============
//! Every non-2xx response is classified once, in [`ApiError::from_status`].
//! `AuthRejected` is the only variant with a side effect (session teardown),
//! and that side effect lives in the client, not here.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use serde_json::Value;

/// Transport-level failure: the request never produced a response.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Failure of a call to the authentication or content service.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// No response was received (DNS, connection reset, CORS, ...).
    #[error("network failure: {0}")]
    Network(#[from] TransportError),

    /// The service answered 401 or 403. The session has already been torn down.
    #[error("authorization rejected: status {status}")]
    AuthRejected { status: u16, body: Option<Value> },

    /// Any other 4xx. `message` is the payload's `message` field, if present.
    #[error("request rejected: status {status}{}", display_message(.message.as_deref()))]
    Validation {
        status: u16,
        message: Option<String>,
        body: Option<Value>,
    },

    /// 5xx, or any other non-success status.
    #[error("server failure: status {status}")]
    Server { status: u16, body: Option<Value> },

    /// A success response whose body did not match the expected shape.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// A configured service root and path did not form a valid URL.
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
}

fn display_message(message: Option<&str>) -> String {
    message.map(|m| format!(": {m}")).unwrap_or_default()
}

impl ApiError {
    /// Classify a non-success status and its raw body.
    #[must_use]
    pub fn from_status(status: u16, body: &str) -> Self {
        let body = parse_body(body);
        match status {
            401 | 403 => Self::AuthRejected { status, body },
            400..=499 => Self::Validation {
                status,
                message: body.as_ref().and_then(payload_message),
                body,
            },
            _ => Self::Server { status, body },
        }
    }

    /// HTTP status, when a response was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::AuthRejected { status, .. } | Self::Validation { status, .. } | Self::Server { status, .. } => {
                Some(*status)
            }
            Self::Network(_) | Self::Decode(_) | Self::InvalidUrl(_) => None,
        }
    }

    /// True for 401/403.
    #[must_use]
    pub fn is_auth_rejected(&self) -> bool {
        matches!(self, Self::AuthRejected { .. })
    }

    /// Message a user may see verbatim.
    ///
    /// Validation and authorization failures carry the service's own message;
    /// everything else is reported generically.
    #[must_use]
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::Validation { message, .. } => message.clone(),
            Self::AuthRejected { body, .. } => body.as_ref().and_then(payload_message),
            Self::Network(_) | Self::Server { .. } | Self::Decode(_) | Self::InvalidUrl(_) => None,
        }
    }
}

fn parse_body(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(trimmed.to_owned())))
}

/// Extract a human-readable `message` from an error payload.
///
/// Accepts `{"message": "..."}` and the list form `{"message": ["a", "b"]}`.
#[must_use]
pub fn payload_message(body: &Value) -> Option<String> {
    match body.get("message")? {
        Value::String(message) if !message.trim().is_empty() => Some(message.clone()),
        Value::Array(items) => {
            let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            if parts.is_empty() { None } else { Some(parts.join(", ")) }
        }
        _ => None,
    }
}

/// Failure to persist or clear the session token.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The backing storage cannot be reached (no window, private mode, ...).
    #[error("token storage unavailable: {0}")]
    Unavailable(String),
    /// The storage rejected the write.
    #[error("token storage write failed: {0}")]
    Write(String),
}
