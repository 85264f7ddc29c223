//! Card components for displaying posts in listings.

use maud::{html, Markup, Render};

use crate::db::Post;

/// A post card component for listings (home, category, search, profile).
///
/// # Example
///
/// ```ignore
/// use crate::components::PostCard;
///
/// let card = PostCard::new(&post).with_snippet();
/// ```
#[derive(Debug, Clone)]
pub struct PostCard<'a> {
    pub post: &'a Post,
    pub show_snippet: bool,
}

impl<'a> PostCard<'a> {
    /// Create a new post card.
    #[must_use]
    pub const fn new(post: &'a Post) -> Self {
        Self {
            post,
            show_snippet: false,
        }
    }

    /// Show the first part of the post content under the title.
    #[must_use]
    pub const fn with_snippet(mut self) -> Self {
        self.show_snippet = true;
        self
    }

    fn snippet(&self) -> &str {
        let content = self.post.content.as_str();
        match content.char_indices().nth(200) {
            Some((idx, _)) => &content[..idx],
            None => content,
        }
    }
}

impl Render for PostCard<'_> {
    fn render(&self) -> Markup {
        let post = self.post;

        html! {
            article class="post-card" {
                h3 {
                    a href=(format!("/post/{}", post.id)) { (post.title) }
                }
                p class="meta" {
                    a class="category-tag" href=(format!("/?category={}", post.category_id)) {
                        (post.category_name)
                    }
                    " by "
                    a href=(format!("/profile/{}", post.username)) { (post.username) }
                    " on " (post.created_at)
                }
                @if self.show_snippet {
                    p class="snippet" {
                        (self.snippet())
                        @if post.content.chars().count() > 200 { "…" }
                    }
                }
                p class="counts" {
                    span class="likes" { "👍 " (post.likes_count) }
                    " "
                    span class="dislikes" { "👎 " (post.dislikes_count) }
                    " "
                    span class="comments" { "💬 " (post.comments_count) }
                }
            }
        }
    }
}

/// An ordered list of post cards with an empty-state message.
#[derive(Debug, Clone)]
pub struct PostList<'a> {
    pub posts: &'a [Post],
    pub empty_message: &'a str,
}

impl<'a> PostList<'a> {
    #[must_use]
    pub const fn new(posts: &'a [Post]) -> Self {
        Self {
            posts,
            empty_message: "No posts yet.",
        }
    }

    #[must_use]
    pub const fn with_empty_message(mut self, message: &'a str) -> Self {
        self.empty_message = message;
        self
    }
}

impl Render for PostList<'_> {
    fn render(&self) -> Markup {
        html! {
            @if self.posts.is_empty() {
                p class="empty-state" { (self.empty_message) }
            } @else {
                div class="post-list" {
                    @for post in self.posts {
                        (PostCard::new(post).with_snippet())
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_post() -> Post {
        Post {
            id: 7,
            title: "Recommend me a mystery".to_string(),
            content: "x".repeat(300),
            user_id: 1,
            category_id: 4,
            username: "sleuth".to_string(),
            category_name: "Mystery & Thriller".to_string(),
            created_at: "2024-03-01 10:00:00".to_string(),
            updated_at: "2024-03-01 10:00:00".to_string(),
            likes_count: 3,
            dislikes_count: 1,
            comments_count: 5,
        }
    }

    #[test]
    fn test_post_card_links_and_counts() {
        let post = sample_post();
        let html = PostCard::new(&post).render().into_string();

        assert!(html.contains("/post/7"));
        assert!(html.contains("/profile/sleuth"));
        assert!(html.contains("Mystery &amp; Thriller"));
        assert!(html.contains('3'));
        assert!(html.contains('5'));
    }

    #[test]
    fn test_snippet_is_truncated() {
        let post = sample_post();
        let html = PostCard::new(&post).with_snippet().render().into_string();
        assert!(html.contains("…"));
        assert!(!html.contains(&"x".repeat(300)));
    }

    #[test]
    fn test_empty_list_shows_message() {
        let html = PostList::new(&[])
            .with_empty_message("Nothing here")
            .render()
            .into_string();
        assert!(html.contains("Nothing here"));
    }
}
