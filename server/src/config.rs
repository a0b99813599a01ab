//! Listener configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const DEFAULT_PORT: u16 = 3000;

/// Reasons the server fails to come up.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid PORT: {0:?}")]
    InvalidPort(String),
    #[error("leptos configuration: {0}")]
    Leptos(String),
    #[error("failed to bind listener: {0}")]
    Bind(std::io::Error),
    #[error("server failed: {0}")]
    Serve(std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
}

impl ServerConfig {
    /// Read `PORT` (default 3000).
    pub fn from_env() -> Result<Self, StartupError> {
        Self::from_port(std::env::var("PORT").ok().as_deref())
    }

    fn from_port(raw: Option<&str>) -> Result<Self, StartupError> {
        let port = match raw.map(str::trim).filter(|v| !v.is_empty()) {
            Some(value) => value
                .parse()
                .map_err(|_| StartupError::InvalidPort(value.to_owned()))?,
            None => DEFAULT_PORT,
        };
        Ok(Self { port })
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
