//! Email + password sign-in page.

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::app::BrowserSession;
use crate::state::auth::AuthState;
use crate::util::auth::install_home_redirect;

#[cfg(feature = "hydrate")]
const LOGIN_FAILED: &str = "Login failed";

#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let session = expect_context::<BrowserSession>();
    install_home_redirect(auth, use_navigate());

    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let show_password = RwSignal::new(false);
    let busy = RwSignal::new(false);
    let error = RwSignal::new(String::new());

    let on_input = move |field: RwSignal<String>, value: String| {
        field.set(value);
        if !error.get_untracked().is_empty() {
            error.set(String::new());
        }
    };

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        busy.set(true);
        error.set(String::new());
        spawn_login(session.clone(), email.get_untracked(), password.get_untracked(), busy, error);
    };

    view! {
        <div class="auth-page">
            <div class="auth-card">
                <h1>"Welcome back"</h1>
                <p class="auth-card__subtitle">"Sign in to continue"</p>
                <form class="auth-form" on:submit=on_submit>
                    <Show when=move || !error.get().is_empty()>
                        <p class="auth-message auth-message--error">{move || error.get()}</p>
                    </Show>
                    <label class="auth-label" for="email">"Email"</label>
                    <input
                        class="auth-input"
                        id="email"
                        type="email"
                        placeholder="Email"
                        required
                        prop:value=move || email.get()
                        on:input=move |ev| on_input(email, event_target_value(&ev))
                    />
                    <label class="auth-label" for="password">"Password"</label>
                    <div class="auth-password">
                        <input
                            class="auth-input"
                            id="password"
                            type=move || if show_password.get() { "text" } else { "password" }
                            placeholder="Password"
                            required
                            prop:value=move || password.get()
                            on:input=move |ev| on_input(password, event_target_value(&ev))
                        />
                        <button
                            class="auth-password__toggle"
                            type="button"
                            on:click=move |_| show_password.update(|v| *v = !*v)
                        >
                            {move || if show_password.get() { "Hide" } else { "Show" }}
                        </button>
                    </div>
                    <button class="auth-button" type="submit" disabled=move || busy.get()>
                        {move || if busy.get() { "Signing in..." } else { "Sign In" }}
                    </button>
                </form>
                <p class="auth-card__footer">
                    "Don't have an account? "
                    <a href="/register">"Sign up"</a>
                </p>
            </div>
        </div>
    }
}

/// Run the login in the background. On success the home redirect fires from
/// the auth signal; on failure the message lands in `error`.
fn spawn_login(
    session: BrowserSession,
    email: String,
    password: String,
    busy: RwSignal<bool>,
    error: RwSignal<String>,
) {
    #[cfg(feature = "hydrate")]
    leptos::task::spawn_local(async move {
        let outcome = session.login(&email, &password).await;
        if let Some(message) = crate::util::auth::failure_message(&outcome, LOGIN_FAILED) {
            error.set(message);
        }
        busy.set(false);
    });
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (session, email, password, error);
        busy.set(false);
    }
}
