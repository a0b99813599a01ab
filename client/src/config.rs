//! Service roots baked into the WASM bundle at build time.
//!
//! The browser has no process environment, so the same variables the CLI
//! reads at runtime are captured with `option_env!` when the bundle is built.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use session::ServiceConfig;
use session::config::{AUTH_SERVICE_URL_VAR, CONTENT_SERVICE_URL_VAR, RESTORE_POLICY_VAR};

/// Resolve the service configuration, falling back to the local defaults
/// when the baked-in values do not parse.
pub fn service_config() -> ServiceConfig {
    ServiceConfig::from_lookup(build_env).unwrap_or_else(|e| {
        leptos::logging::warn!("{e}; using default service roots");
        ServiceConfig::default()
    })
}

fn build_env(key: &str) -> Option<String> {
    let value = match key {
        AUTH_SERVICE_URL_VAR => option_env!("BLOG_AUTH_SERVICE_URL"),
        CONTENT_SERVICE_URL_VAR => option_env!("BLOG_CONTENT_SERVICE_URL"),
        RESTORE_POLICY_VAR => option_env!("BLOG_RESTORE_POLICY"),
        _ => None,
    };
    value.map(str::to_owned)
}
