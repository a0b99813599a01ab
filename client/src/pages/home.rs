//! Home feed: hero, search and tag filter, paginated post cards.

use leptos::prelude::*;
use session::PostQuery;

use crate::app::BrowserSession;
use crate::components::pagination::Pagination;
use crate::components::post_card::{PostCard, PostCardSkeleton};
use crate::state::feed::{FeedState, PAGE_SIZE, feed_query};

#[component]
pub fn HomePage() -> impl IntoView {
    let session = expect_context::<BrowserSession>();
    let feed = RwSignal::new(FeedState::default());
    let page = RwSignal::new(1_u32);
    let search = RwSignal::new(String::new());
    let tag = RwSignal::new(String::new());

    // Refetch whenever page or filters change.
    Effect::new(move || {
        let query = feed_query(page.get(), &search.get(), &tag.get());
        let ticket = feed.try_update(FeedState::begin).unwrap_or_default();
        spawn_fetch(session.clone(), feed, ticket, query);
    });

    let on_search = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        page.set(1);
    };
    let clear_filters = move |_: leptos::ev::MouseEvent| {
        search.set(String::new());
        tag.set(String::new());
        page.set(1);
    };
    let filtered = move || !search.get().is_empty() || !tag.get().is_empty();

    view! {
        <div class="home">
            <section class="home-hero">
                <h1>"The Content Forge"</h1>
                <p>
                    "Explore cutting-edge articles, connect with top-tier authors, and share your insights."
                </p>
                <a href="/register" class="home-hero__cta">"Join Now"</a>
            </section>

            <section class="home-feed">
                <div class="home-filters">
                    <form class="home-search" on:submit=on_search>
                        <input
                            type="text"
                            placeholder="Search articles..."
                            prop:value=move || search.get()
                            on:input=move |ev| search.set(event_target_value(&ev))
                        />
                    </form>
                    <select
                        class="home-tags"
                        prop:value=move || tag.get()
                        on:change=move |ev| tag.set(event_target_value(&ev))
                    >
                        <option value="">"All Topics"</option>
                        {move || {
                            feed.with(FeedState::all_tags)
                                .into_iter()
                                .map(|t| {
                                    let value = t.clone();
                                    view! { <option value=value>{t}</option> }
                                })
                                .collect::<Vec<_>>()
                        }}
                    </select>
                    <Show when=filtered>
                        <button class="home-filters__clear" on:click=clear_filters>"Clear"</button>
                    </Show>
                </div>

                {move || {
                    let state = feed.get();
                    if state.loading {
                        view! {
                            <div class="post-grid">
                                {(0..PAGE_SIZE).map(|_| view! { <PostCardSkeleton /> }).collect::<Vec<_>>()}
                            </div>
                        }
                            .into_any()
                    } else if state.posts.is_empty() {
                        view! {
                            <div class="home-empty">
                                <h3>"No posts found"</h3>
                                <p>
                                    {if filtered() {
                                        "Try adjusting your search criteria."
                                    } else {
                                        "Be the first to share your insights!"
                                    }}
                                </p>
                            </div>
                        }
                            .into_any()
                    } else {
                        let total_pages = state.total_pages;
                        view! {
                            <div class="post-grid">
                                {state
                                    .posts
                                    .into_iter()
                                    .map(|post| view! { <PostCard post=post /> })
                                    .collect::<Vec<_>>()}
                            </div>
                            {(total_pages > 1).then(|| view! { <Pagination page=page total_pages=total_pages /> })}
                        }
                            .into_any()
                    }
                }}
            </section>
        </div>
    }
}

fn spawn_fetch(session: BrowserSession, feed: RwSignal<FeedState>, ticket: u64, query: PostQuery) {
    #[cfg(feature = "hydrate")]
    leptos::task::spawn_local(async move {
        let result = session.client().list_posts(&query).await;
        if let Err(e) = &result {
            leptos::logging::error!("error fetching posts: {e}");
        }
        feed.update(|f| f.finish(ticket, result));
    });
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (session, feed, ticket, query);
    }
}
