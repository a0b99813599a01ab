//! Reactive view models held in Leptos signals.
//!
//! SYSTEM CONTEXT
//! ==============
//! `auth` mirrors the session container for rendering; `feed` shapes post
//! pages into cards for the home screen.

pub mod auth;
pub mod feed;
