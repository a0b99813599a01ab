//! Root component, HTML shell, and context wiring.
//!
//! SYSTEM CONTEXT
//! ==============
//! `App` owns the single [`BrowserSession`] for the tab. It is provided as
//! context next to an `RwSignal<AuthState>` mirror that the session keeps in
//! sync through its watch hook. Restore from `localStorage` starts once the
//! app has hydrated.

use std::sync::Arc;

use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};
use leptos_router::StaticSegment;
use leptos_router::components::{Route, Router, Routes};
use session::{ApiClient, SessionManager};

use crate::components::nav_bar::NavBar;
use crate::config::service_config;
use crate::net::storage::BrowserTokenStore;
use crate::net::transport::GlooTransport;
use crate::pages::home::HomePage;
use crate::pages::login::LoginPage;
use crate::pages::register::RegisterPage;
use crate::state::auth::AuthState;
use crate::util::auth::redirect_on_unauthorized;

/// Session container bound to the browser transport and storage.
pub type BrowserSession = SessionManager<GlooTransport, BrowserTokenStore>;

/// HTML document shell rendered by the server.
pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8" />
                <meta name="viewport" content="width=device-width, initial-scale=1" />
                <AutoReload options=options.clone() />
                <HydrationScripts options />
                <leptos_meta::MetaTags />
            </head>
            <body>
                <App />
            </body>
        </html>
    }
}

fn build_session() -> BrowserSession {
    let client = ApiClient::new(service_config(), GlooTransport, BrowserTokenStore);
    let client = Arc::new(client);
    client.subscribe(redirect_on_unauthorized);
    SessionManager::new(client)
}

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let session = build_session();
    let auth = RwSignal::new(AuthState::default());
    session.watch(move |snapshot| {
        // The signal is gone once the app unmounts; later changes are moot.
        let _ = auth.try_set(AuthState::from_session(snapshot));
    });

    provide_context(auth);
    provide_context(session.clone());

    #[cfg(feature = "hydrate")]
    leptos::task::spawn_local(async move {
        session.initialize().await;
    });
    #[cfg(not(feature = "hydrate"))]
    drop(session);

    view! {
        <Title text="The Content Forge" />
        <Router>
            <NavBar />
            <main class="app-main">
                <Routes fallback=|| view! { <p class="not-found">"Page not found."</p> }>
                    <Route path=StaticSegment("") view=HomePage />
                    <Route path=StaticSegment("login") view=LoginPage />
                    <Route path=StaticSegment("register") view=RegisterPage />
                </Routes>
            </main>
        </Router>
    }
}
