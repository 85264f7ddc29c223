//! Post detail page (with the threaded comment view) and the post creation
//! form.

use std::collections::HashMap;

use maud::{html, Markup};

use crate::components::{Alert, BaseLayout};
use crate::db::{Category, CommentNode, Post, User, VoteStatus};

/// Parameters for the post detail page.
#[derive(Debug)]
pub struct PostDetailParams<'a> {
    pub user: Option<&'a User>,
    pub post: &'a Post,
    /// Comment forest in display order.
    pub comments: &'a [CommentNode],
    /// Total comments in the forest (may differ from the post's raw count
    /// when suspended authors are filtered out for this viewer).
    pub total_comments: usize,
    /// The viewer's current vote on the post.
    pub post_vote: VoteStatus,
    /// The viewer's current comment votes, keyed by comment id.
    pub comment_votes: &'a HashMap<i64, bool>,
}

/// Render the post detail page.
#[must_use]
pub fn render_post_detail_page(params: &PostDetailParams<'_>) -> Markup {
    let post = params.post;
    let logged_in = params.user.is_some();

    let content = html! {
        article class="post-detail" {
            h1 { (post.title) }
            p class="meta" {
                a class="category-tag" href=(format!("/?category={}", post.category_id)) {
                    (post.category_name)
                }
                " by "
                a href=(format!("/profile/{}", post.username)) { (post.username) }
                " on " (post.created_at)
            }
            div class="post-content" { p { (post.content) } }

            (vote_controls(
                "/like-post",
                "post_id",
                post.id,
                post.likes_count,
                post.dislikes_count,
                params.post_vote.liked,
                params.post_vote.disliked,
                logged_in,
            ))
        }

        section class="comments" {
            h2 { "Comments (" (params.total_comments) ")" }

            @if logged_in {
                (comment_form(post.id, None))
            } @else {
                p { a href="/login" { "Log in" } " to join the discussion." }
            }

            @if params.comments.is_empty() {
                p class="empty-state" { "No comments yet." }
            } @else {
                div class="comment-tree" {
                    @for node in params.comments {
                        (render_comment_node(node, params, 0))
                    }
                }
            }
        }
    };

    BaseLayout::new(&post.title, params.user).render(content)
}

/// Render one comment and, recursively, its replies.
fn render_comment_node(node: &CommentNode, params: &PostDetailParams<'_>, depth: usize) -> Markup {
    let comment = &node.comment;
    let logged_in = params.user.is_some();
    let vote = params.comment_votes.get(&comment.id).copied();

    html! {
        div class="comment" data-depth=(depth) {
            p class="meta" {
                a href=(format!("/profile/{}", comment.username)) { (comment.username) }
                " on " (comment.created_at)
            }
            p class="comment-content" { (comment.content) }

            (vote_controls(
                "/like-comment",
                "comment_id",
                comment.id,
                comment.likes_count,
                comment.dislikes_count,
                vote == Some(true),
                vote == Some(false),
                logged_in,
            ))

            @if logged_in {
                details class="reply" {
                    summary { "Reply" }
                    (comment_form(comment.post_id, Some(comment.id)))
                }
            }

            @if !node.replies.is_empty() {
                div class="replies" {
                    @for reply in &node.replies {
                        (render_comment_node(reply, params, depth + 1))
                    }
                }
            }
        }
    }
}

/// Like/dislike buttons for a post or comment.
fn vote_controls(
    action: &str,
    id_field: &str,
    target_id: i64,
    likes: i64,
    dislikes: i64,
    liked: bool,
    disliked: bool,
    logged_in: bool,
) -> Markup {
    html! {
        @if logged_in {
            div class="vote-controls" {
                form method="post" action=(action) class="inline-form" {
                    input type="hidden" name=(id_field) value=(target_id);
                    input type="hidden" name="is_like" value="true";
                    button type="submit" class=(if liked { "vote active" } else { "vote" }) {
                        "👍 " (likes)
                    }
                }
                form method="post" action=(action) class="inline-form" {
                    input type="hidden" name=(id_field) value=(target_id);
                    input type="hidden" name="is_like" value="false";
                    button type="submit" class=(if disliked { "vote active" } else { "vote" }) {
                        "👎 " (dislikes)
                    }
                }
            }
        } @else {
            p class="counts" {
                span class="likes" { "👍 " (likes) }
                " "
                span class="dislikes" { "👎 " (dislikes) }
            }
        }
    }
}

/// Comment form, top-level or as a reply to `parent_id`.
fn comment_form(post_id: i64, parent_id: Option<i64>) -> Markup {
    html! {
        form method="post" action="/create-comment" class="comment-form" {
            input type="hidden" name="post_id" value=(post_id);
            @if let Some(parent) = parent_id {
                input type="hidden" name="parent_id" value=(parent);
            }
            textarea name="content" rows="3" placeholder="Write a comment…" required {}
            button type="submit" { "Post comment" }
        }
    }
}

/// Render the post creation form.
#[must_use]
pub fn render_create_post_page(
    user: &User,
    categories: &[Category],
    error: Option<&str>,
) -> Markup {
    let content = html! {
        div class="create-post" {
            h1 { "New Post" }

            @if let Some(e) = error {
                (Alert::error(e))
            }

            form method="post" action="/create-post" {
                div class="form-group" {
                    label for="title" { "Title" }
                    input type="text" id="title" name="title" required;
                }
                div class="form-group" {
                    label for="category_id" { "Category" }
                    select id="category_id" name="category_id" required {
                        @for category in categories {
                            option value=(category.id) { (category.name) }
                        }
                    }
                }
                div class="form-group" {
                    label for="content" { "Content" }
                    textarea id="content" name="content" rows="10" required {}
                }
                button type="submit" { "Publish" }
            }
        }
    };

    BaseLayout::new("New Post", Some(user)).render(content)
}
