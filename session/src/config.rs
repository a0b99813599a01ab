//! Service roots and restore behavior, parsed from environment-style lookups.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const DEFAULT_AUTH_SERVICE_URL: &str = "http://localhost:4001";
pub const DEFAULT_CONTENT_SERVICE_URL: &str = "http://localhost:4002";

pub const AUTH_SERVICE_URL_VAR: &str = "BLOG_AUTH_SERVICE_URL";
pub const CONTENT_SERVICE_URL_VAR: &str = "BLOG_CONTENT_SERVICE_URL";
pub const RESTORE_POLICY_VAR: &str = "BLOG_RESTORE_POLICY";

/// Errors produced while building a [`ServiceConfig`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}: {value:?} is not an absolute http(s) URL")]
    InvalidUrl { var: &'static str, value: String },
    #[error("invalid BLOG_RESTORE_POLICY: {0:?} (expected `optimistic` or `validate`)")]
    InvalidRestorePolicy(String),
}

/// What `initialize()` does with a token found in storage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RestorePolicy {
    /// Adopt the stored token without asking the server.
    #[default]
    Optimistic,
    /// Adopt the token, then confirm it with `GET /me`.
    Validate,
}

impl std::str::FromStr for RestorePolicy {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "optimistic" => Ok(Self::Optimistic),
            "validate" => Ok(Self::Validate),
            _ => Err(ConfigError::InvalidRestorePolicy(raw.to_owned())),
        }
    }
}

/// Base URLs of the two collaborators plus session restore behavior.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceConfig {
    auth_base_url: String,
    content_base_url: String,
    restore: RestorePolicy,
}

impl ServiceConfig {
    /// Validate both roots. Trailing slashes are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if a root is not an absolute
    /// `http`/`https` URL.
    pub fn new(auth_base_url: &str, content_base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            auth_base_url: normalize_base_url(AUTH_SERVICE_URL_VAR, auth_base_url)?,
            content_base_url: normalize_base_url(CONTENT_SERVICE_URL_VAR, content_base_url)?,
            restore: RestorePolicy::default(),
        })
    }

    /// Build config from process environment variables.
    ///
    /// Optional:
    /// - `BLOG_AUTH_SERVICE_URL`: default `http://localhost:4001`
    /// - `BLOG_CONTENT_SERVICE_URL`: default `http://localhost:4002`
    /// - `BLOG_RESTORE_POLICY`: `optimistic` (default) or `validate`
    ///
    /// # Errors
    ///
    /// Returns an error if any present variable is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup. The browser build passes
    /// compile-time values here; tests pass a map.
    ///
    /// # Errors
    ///
    /// Returns an error if any present value is malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let auth = value(AUTH_SERVICE_URL_VAR).unwrap_or_else(|| DEFAULT_AUTH_SERVICE_URL.to_owned());
        let content = value(CONTENT_SERVICE_URL_VAR).unwrap_or_else(|| DEFAULT_CONTENT_SERVICE_URL.to_owned());
        let restore = match value(RESTORE_POLICY_VAR) {
            Some(raw) => raw.parse()?,
            None => RestorePolicy::default(),
        };
        Ok(Self::new(&auth, &content)?.with_restore_policy(restore))
    }

    #[must_use]
    pub fn with_restore_policy(mut self, restore: RestorePolicy) -> Self {
        self.restore = restore;
        self
    }

    #[must_use]
    pub fn auth_base_url(&self) -> &str {
        &self.auth_base_url
    }

    #[must_use]
    pub fn content_base_url(&self) -> &str {
        &self.content_base_url
    }

    #[must_use]
    pub fn restore_policy(&self) -> RestorePolicy {
        self.restore
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            auth_base_url: DEFAULT_AUTH_SERVICE_URL.to_owned(),
            content_base_url: DEFAULT_CONTENT_SERVICE_URL.to_owned(),
            restore: RestorePolicy::default(),
        }
    }
}

fn normalize_base_url(var: &'static str, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let invalid = || ConfigError::InvalidUrl { var, value: raw.to_owned() };
    let parsed = url::Url::parse(trimmed).map_err(|_| invalid())?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
        return Err(invalid());
    }
    Ok(trimmed.to_owned())
}
