//! Browser front end for the blog: feed, login and registration screens.
//!
//! ARCHITECTURE
//! ============
//! `app` wires one [`session::SessionManager`] into Leptos context. `net`
//! supplies its browser transport and token store, `state` holds the reactive
//! view models, and `pages`/`components` render them.

pub mod app;
pub mod components;
pub mod config;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

/// WASM entry point: install logging and hydrate the server-rendered body.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Debug).is_err() {
        leptos::logging::warn!("console logger already installed");
    }
    leptos::mount::hydrate_body(app::App);
}
