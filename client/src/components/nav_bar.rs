//! Top navigation with sign-in links or the signed-in user and logout.

use leptos::prelude::*;

use crate::app::BrowserSession;
use crate::state::auth::AuthState;

#[component]
pub fn NavBar() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let session = expect_context::<BrowserSession>();

    view! {
        <header class="nav-bar">
            <a class="nav-bar__brand" href="/">"The Content Forge"</a>
            <nav class="nav-bar__links">
                <Show
                    when=move || auth.get().is_authenticated()
                    fallback=|| {
                        view! {
                            <a class="nav-bar__link" href="/login">"Sign in"</a>
                            <a class="nav-bar__link nav-bar__link--primary" href="/register">"Join"</a>
                        }
                    }
                >
                    <span class="nav-bar__user">{move || auth.get().display_name()}</span>
                    // Logout is local only; the link then takes the visitor to /login.
                    <a
                        class="nav-bar__link"
                        href="/login"
                        on:click={
                            let session = session.clone();
                            move |_| session.logout()
                        }
                    >
                        "Log out"
                    </a>
                </Show>
            </nav>
        </header>
    }
}
