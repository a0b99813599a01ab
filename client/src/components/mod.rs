//! UI component modules.
//!
//! ARCHITECTURE
//! ============
//! Components render view models from `state` and report user intent back
//! through signals; pages own the fetching.

pub mod nav_bar;
pub mod pagination;
pub mod post_card;
