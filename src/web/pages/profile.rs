//! Public profile pages and the profile editor.

use maud::{html, Markup};

use crate::components::{Alert, BaseLayout, PostList};
use crate::db::{Post, User, UserStats};

/// Parameters for the profile page.
#[derive(Debug)]
pub struct ProfilePageParams<'a> {
    pub viewer: Option<&'a User>,
    pub profile_user: &'a User,
    pub stats: UserStats,
    pub posts: &'a [Post],
    /// Only present when the viewer is looking at their own profile.
    pub liked_posts: Option<&'a [Post]>,
}

/// Render a public profile page.
#[must_use]
pub fn render_profile_page(params: &ProfilePageParams<'_>) -> Markup {
    let profile = params.profile_user;
    let own_profile = params
        .viewer
        .is_some_and(|viewer| viewer.id == profile.id);

    let content = html! {
        section class="profile" {
            div class="profile-header" {
                @if !profile.profile_picture.is_empty() {
                    img class="avatar" src=(profile.profile_picture) alt=(profile.username);
                }
                h1 { (profile.username) }
                @if profile.is_suspended() {
                    span class="badge suspended" { "suspended" }
                }
                p class="meta" { "Member since " (profile.created_at) }
                @if !profile.signature.is_empty() {
                    blockquote class="signature" { (profile.signature) }
                }
            }

            div class="profile-stats" {
                span { (params.stats.posts_count) " posts" }
                " · "
                span { (params.stats.comments_count) " comments" }
                " · "
                span { (params.stats.likes_received) " posts liked by others" }
            }

            @if own_profile {
                p class="profile-actions" {
                    a href="/edit-profile" { "Edit profile" }
                }
            }

            h2 { "Posts" }
            (PostList::new(params.posts).with_empty_message("No posts yet."))

            @if let Some(liked) = params.liked_posts {
                h2 { "Liked posts" }
                (PostList::new(liked).with_empty_message("No liked posts yet."))
            }
        }
    };

    BaseLayout::new(&profile.username, params.viewer).render(content)
}

/// Render the profile editor.
#[must_use]
pub fn render_edit_profile_page(user: &User, message: Option<&str>) -> Markup {
    let content = html! {
        div class="edit-profile" {
            h1 { "Edit Profile" }

            @if let Some(m) = message {
                (Alert::success(m))
            }

            form method="post" action="/edit-profile" {
                div class="form-group" {
                    label for="profile_picture" { "Profile picture URL" }
                    input type="url" id="profile_picture" name="profile_picture"
                        value=(user.profile_picture);
                }
                div class="form-group" {
                    label for="signature" { "Signature" }
                    textarea id="signature" name="signature" rows="3" { (user.signature) }
                }
                button type="submit" { "Save" }
            }

            hr;

            // Account deletion removes the user's posts, comments and votes
            form method="post" action="/delete-profile"
                onsubmit="return confirm('Delete your account and all of your content? This cannot be undone.');" {
                button type="submit" class="danger" { "Delete account" }
            }
        }
    };

    BaseLayout::new("Edit Profile", Some(user)).render(content)
}
