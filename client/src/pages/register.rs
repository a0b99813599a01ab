//! Account creation page.

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::app::BrowserSession;
use crate::state::auth::AuthState;
use crate::util::auth::install_home_redirect;
use crate::util::validation::{RegistrationForm, validate_registration};

#[cfg(feature = "hydrate")]
const REGISTRATION_FAILED: &str = "Registration failed";

#[component]
pub fn RegisterPage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let session = expect_context::<BrowserSession>();
    install_home_redirect(auth, use_navigate());

    let form = RwSignal::new(RegistrationForm::default());
    let show_password = RwSignal::new(false);
    let show_confirm = RwSignal::new(false);
    let busy = RwSignal::new(false);
    let error = RwSignal::new(String::new());
    let problems = RwSignal::new(Vec::<String>::new());

    // Any edit clears both the service error and the rule violations.
    let edit = move |apply: fn(&mut RegistrationForm, String), value: String| {
        form.update(|f| apply(f, value));
        if !error.get_untracked().is_empty() {
            error.set(String::new());
        }
        if !problems.with_untracked(Vec::is_empty) {
            problems.set(Vec::new());
        }
    };

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        let current = form.get_untracked();
        let violations = validate_registration(&current);
        if !violations.is_empty() {
            problems.set(violations);
            return;
        }
        problems.set(Vec::new());
        busy.set(true);
        error.set(String::new());
        spawn_register(session.clone(), current, busy, error);
    };

    view! {
        <div class="auth-page">
            <div class="auth-card">
                <h1>"Create your account"</h1>
                <p class="auth-card__subtitle">"Join the community"</p>
                <form class="auth-form" on:submit=on_submit>
                    <Show when=move || !error.get().is_empty()>
                        <p class="auth-message auth-message--error">{move || error.get()}</p>
                    </Show>
                    <Show when=move || !problems.with(Vec::is_empty)>
                        <div class="auth-message auth-message--warning">
                            {move || {
                                problems
                                    .get()
                                    .into_iter()
                                    .map(|p| view! { <p>{format!("• {p}")}</p> })
                                    .collect::<Vec<_>>()
                            }}
                        </div>
                    </Show>
                    <input
                        class="auth-input"
                        id="username"
                        type="text"
                        placeholder="Username"
                        required
                        prop:value=move || form.with(|f| f.username.clone())
                        on:input=move |ev| edit(|f, v| f.username = v, event_target_value(&ev))
                    />
                    <input
                        class="auth-input"
                        id="email"
                        type="email"
                        placeholder="Email"
                        required
                        prop:value=move || form.with(|f| f.email.clone())
                        on:input=move |ev| edit(|f, v| f.email = v, event_target_value(&ev))
                    />
                    <div class="auth-password">
                        <input
                            class="auth-input"
                            id="password"
                            type=move || if show_password.get() { "text" } else { "password" }
                            placeholder="Password"
                            required
                            prop:value=move || form.with(|f| f.password.clone())
                            on:input=move |ev| edit(|f, v| f.password = v, event_target_value(&ev))
                        />
                        <button
                            class="auth-password__toggle"
                            type="button"
                            on:click=move |_| show_password.update(|v| *v = !*v)
                        >
                            {move || if show_password.get() { "Hide" } else { "Show" }}
                        </button>
                    </div>
                    <div class="auth-password">
                        <input
                            class="auth-input"
                            id="confirmPassword"
                            type=move || if show_confirm.get() { "text" } else { "password" }
                            placeholder="Confirm Password"
                            required
                            prop:value=move || form.with(|f| f.confirm_password.clone())
                            on:input=move |ev| edit(|f, v| f.confirm_password = v, event_target_value(&ev))
                        />
                        <button
                            class="auth-password__toggle"
                            type="button"
                            on:click=move |_| show_confirm.update(|v| *v = !*v)
                        >
                            {move || if show_confirm.get() { "Hide" } else { "Show" }}
                        </button>
                    </div>
                    <button class="auth-button" type="submit" disabled=move || busy.get()>
                        {move || if busy.get() { "Creating account..." } else { "Create Account" }}
                    </button>
                </form>
                <p class="auth-card__footer">
                    "Already have an account? "
                    <a href="/login">"Sign in"</a>
                </p>
            </div>
        </div>
    }
}

/// Register in the background; the username doubles as the first name the
/// auth service expects.
fn spawn_register(session: BrowserSession, form: RegistrationForm, busy: RwSignal<bool>, error: RwSignal<String>) {
    #[cfg(feature = "hydrate")]
    leptos::task::spawn_local(async move {
        let outcome = session.register(&form.username, &form.email, &form.password).await;
        if let Some(message) = crate::util::auth::failure_message(&outcome, REGISTRATION_FAILED) {
            error.set(message);
        }
        busy.set(false);
    });
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (session, form, error);
        busy.set(false);
    }
}
