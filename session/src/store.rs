//! Persisted token slot.
//!
//! SYSTEM CONTEXT
//! ==============
//! One durable slot holds at most one opaque token. The browser backs it with
//! `localStorage`, the CLI with a file, tests with [`MemoryTokenStore`]. No
//! expiry metadata is kept: the server's rejection is the only expiry signal.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::sync::{Arc, Mutex, PoisonError};

use crate::error::StoreError;

/// Storage key under which the session token is persisted.
pub const TOKEN_KEY: &str = "token";

/// Durable holder of the current session token.
pub trait TokenStore {
    /// Current token, if any.
    fn get(&self) -> Option<String>;

    /// Replace the stored token.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage rejects the write.
    fn set(&self, token: &str) -> Result<(), StoreError>;

    /// Remove the stored token. Clearing an empty slot succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage rejects the removal.
    fn clear(&self) -> Result<(), StoreError>;
}

impl<S: TokenStore + ?Sized> TokenStore for Arc<S> {
    fn get(&self) -> Option<String> {
        (**self).get()
    }

    fn set(&self, token: &str) -> Result<(), StoreError> {
        (**self).set(token)
    }

    fn clear(&self) -> Result<(), StoreError> {
        (**self).clear()
    }
}

/// Process-local token slot.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `token`, as after a page reload.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self { slot: Mutex::new(Some(token.into())) }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<String> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn set(&self, token: &str) -> Result<(), StoreError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_owned());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
