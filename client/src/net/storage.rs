//! `localStorage`-backed token slot.
//!
//! The token lives under the shared `"token"` key so other tabs of the same
//! origin see the same session on their next load. Server rendering has no
//! storage: reads come back empty, clears succeed, and writes are refused.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use session::{StoreError, TokenStore};

#[cfg(feature = "hydrate")]
use session::TOKEN_KEY;

#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserTokenStore;

#[cfg(feature = "hydrate")]
fn local_storage() -> Result<web_sys::Storage, StoreError> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .ok_or_else(|| StoreError::Unavailable("localStorage is not available".to_owned()))
}

impl TokenStore for BrowserTokenStore {
    fn get(&self) -> Option<String> {
        #[cfg(feature = "hydrate")]
        {
            local_storage().ok()?.get_item(TOKEN_KEY).ok().flatten()
        }
        #[cfg(not(feature = "hydrate"))]
        {
            None
        }
    }

    fn set(&self, token: &str) -> Result<(), StoreError> {
        #[cfg(feature = "hydrate")]
        {
            local_storage()?
                .set_item(TOKEN_KEY, token)
                .map_err(|e| StoreError::Write(format!("{e:?}")))
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = token;
            Err(StoreError::Unavailable("no browser storage during server rendering".to_owned()))
        }
    }

    fn clear(&self) -> Result<(), StoreError> {
        #[cfg(feature = "hydrate")]
        {
            local_storage()?
                .remove_item(TOKEN_KEY)
                .map_err(|e| StoreError::Write(format!("{e:?}")))
        }
        #[cfg(not(feature = "hydrate"))]
        {
            Ok(())
        }
    }
}
