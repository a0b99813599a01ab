//! Home feed view model.
//!
//! SYSTEM CONTEXT
//! ==============
//! `GET /posts` returns raw post records. The feed turns each one into a card
//! (excerpt, author label, generated avatar) and tracks which fetch is the
//! latest so a slow response for an old filter never overwrites a newer one.

#[cfg(test)]
#[path = "feed_test.rs"]
mod feed_test;

use std::collections::BTreeSet;

use session::{ApiError, Post, PostPage, PostQuery};

/// Posts per page; the page count is derived from it.
pub const PAGE_SIZE: u32 = 6;
/// Characters of content shown on a card before the ellipsis.
pub const EXCERPT_CHARS: usize = 120;

const AVATAR_SERVICE: &str = "https://ui-avatars.com/api/?name=";

/// Author block shown on a card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedAuthor {
    pub id: Option<String>,
    pub username: String,
    pub avatar: String,
}

/// One post as rendered on the home page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedPost {
    pub id: i64,
    pub title: String,
    pub excerpt: String,
    pub author: FeedAuthor,
    pub created_at: Option<String>,
    pub tags: Vec<String>,
}

impl FeedPost {
    pub fn from_post(post: &Post) -> Self {
        let author_label = post.author_id.as_deref().filter(|id| !id.is_empty());
        Self {
            id: post.id,
            title: post.title.clone(),
            excerpt: excerpt(&post.content),
            author: FeedAuthor {
                id: post.author_id.clone(),
                username: author_label.unwrap_or("Unknown Author").to_owned(),
                avatar: avatar_url(author_label.unwrap_or("User")),
            },
            created_at: post.created_at.clone(),
            tags: post.tags.clone(),
        }
    }
}

/// First [`EXCERPT_CHARS`] characters, with `"..."` appended when cut.
pub fn excerpt(content: &str) -> String {
    match content.char_indices().nth(EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_owned(),
    }
}

pub fn avatar_url(name: &str) -> String {
    format!("{AVATAR_SERVICE}{}", urlencoding::encode(name))
}

/// `ceil(total / per_page)`; zero posts means zero pages.
pub fn total_pages(total: u64, per_page: u32) -> u32 {
    if per_page == 0 {
        return 0;
    }
    u32::try_from(total.div_ceil(u64::from(per_page))).unwrap_or(u32::MAX)
}

pub fn prev_page(page: u32) -> u32 {
    page.saturating_sub(1).max(1)
}

pub fn next_page(page: u32, total_pages: u32) -> u32 {
    page.saturating_add(1).min(total_pages.max(1))
}

/// Distinct tags across the visible posts, sorted.
pub fn all_tags(posts: &[FeedPost]) -> Vec<String> {
    posts
        .iter()
        .flat_map(|p| p.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Query for one page of the feed with the current filters.
pub fn feed_query(page: u32, search: &str, tag: &str) -> PostQuery {
    PostQuery::new(page.max(1), PAGE_SIZE).with_search(search).with_tag(tag)
}

/// Results side of the home page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedState {
    pub posts: Vec<FeedPost>,
    pub total_pages: u32,
    pub loading: bool,
    latest: u64,
}

impl Default for FeedState {
    fn default() -> Self {
        Self { posts: Vec::new(), total_pages: 1, loading: true, latest: 0 }
    }
}

impl FeedState {
    /// Mark a new fetch as in flight and return its ticket.
    pub fn begin(&mut self) -> u64 {
        self.latest += 1;
        self.loading = true;
        self.latest
    }

    /// Apply the outcome of fetch `ticket`. Outcomes of superseded fetches
    /// are dropped. A failed fetch keeps the previous posts on screen.
    pub fn finish(&mut self, ticket: u64, result: Result<PostPage, ApiError>) {
        if ticket != self.latest {
            return;
        }
        if let Ok(page) = result {
            self.posts = page.items.iter().map(FeedPost::from_post).collect();
            self.total_pages = total_pages(page.total, PAGE_SIZE);
        }
        self.loading = false;
    }

    pub fn all_tags(&self) -> Vec<String> {
        all_tags(&self.posts)
    }
}
