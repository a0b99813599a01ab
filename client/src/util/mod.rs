//! Utility helpers shared across client UI modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules keep routing and form rules out of the components so they
//! can be tested without a browser.

pub mod auth;
pub mod validation;
