//! Feed card for a single post, plus its loading placeholder.

#[cfg(test)]
#[path = "post_card_test.rs"]
mod post_card_test;

use leptos::prelude::*;

use crate::state::feed::FeedPost;

/// Calendar date of an ISO-8601 timestamp, or the raw value if it has none.
pub fn display_date(timestamp: &str) -> &str {
    timestamp.split_once('T').map_or(timestamp, |(date, _)| date)
}

#[component]
pub fn PostCard(post: FeedPost) -> impl IntoView {
    let FeedPost { id, title, excerpt, author, created_at, tags } = post;
    let date = created_at.as_deref().map(display_date).unwrap_or_default().to_owned();
    let alt = author.username.clone();
    let tags = (!tags.is_empty()).then(|| {
        view! {
            <ul class="post-card__tags">
                {tags.into_iter().map(|t| view! { <li>{t}</li> }).collect::<Vec<_>>()}
            </ul>
        }
    });

    view! {
        <article class="post-card">
            <h2 class="post-card__title" data-post-id=id.to_string()>{title}</h2>
            <p class="post-card__excerpt">{excerpt}</p>
            <div class="post-card__meta">
                <img class="post-card__avatar" src=author.avatar alt=alt />
                <span class="post-card__author">{author.username}</span>
                <time class="post-card__date">{date}</time>
            </div>
            {tags}
        </article>
    }
}

#[component]
pub fn PostCardSkeleton() -> impl IntoView {
    view! {
        <div class="post-card post-card--skeleton">
            <div class="post-card__placeholder post-card__placeholder--image"></div>
            <div class="post-card__placeholder"></div>
            <div class="post-card__placeholder"></div>
            <div class="post-card__placeholder post-card__placeholder--short"></div>
        </div>
    }
}
