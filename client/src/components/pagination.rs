//! Previous / numbered / next page buttons.

use leptos::prelude::*;

use crate::state::feed::{next_page, prev_page};

#[component]
pub fn Pagination(page: RwSignal<u32>, total_pages: u32) -> impl IntoView {
    view! {
        <nav class="pagination">
            <button
                class="pagination__step"
                disabled=move || page.get() <= 1
                on:click=move |_| page.update(|p| *p = prev_page(*p))
            >
                "Previous"
            </button>
            {(1..=total_pages)
                .map(|n| {
                    view! {
                        <button
                            class="pagination__page"
                            class:pagination__page--current=move || page.get() == n
                            on:click=move |_| page.set(n)
                        >
                            {n}
                        </button>
                    }
                })
                .collect::<Vec<_>>()}
            <button
                class="pagination__step"
                disabled=move || page.get() >= total_pages
                on:click=move |_| page.update(|p| *p = next_page(*p, total_pages))
            >
                "Next"
            </button>
        </nav>
    }
}
