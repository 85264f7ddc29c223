//! Base layout components for the web UI.
//!
//! This module provides the main page layout structure including
//! the HTML skeleton, navigation, and footer.

use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::db::User;

/// Critical theme initialization script that runs in <head> to prevent flash
/// of wrong theme. Must be inline (not external) to execute before body
/// renders.
const THEME_INIT_SCRIPT: &str = r#"(function() {
    var theme = localStorage.getItem('theme');
    if (theme) {
        document.documentElement.setAttribute('data-theme', theme);
    } else if (window.matchMedia('(prefers-color-scheme: dark)').matches) {
        document.documentElement.setAttribute('data-theme', 'dark');
    }
})();"#;

/// Base page layout builder.
///
/// Provides a fluent interface for constructing the main page layout
/// with required user context for authentication-aware navigation.
///
/// # Example
///
/// ```ignore
/// use maud::html;
/// use crate::components::BaseLayout;
///
/// let content = html! { h1 { "Hello World" } };
/// let page = BaseLayout::new("My Page", user.as_ref()).render(content);
/// ```
#[derive(Debug, Clone)]
pub struct BaseLayout<'a> {
    title: &'a str,
    user: Option<&'a User>,
}

impl<'a> BaseLayout<'a> {
    /// Create a new base layout with the given page title and user.
    ///
    /// The user parameter is required so authentication state is always
    /// explicitly handled. Pass `None` for anonymous visitors.
    #[must_use]
    pub fn new(title: &'a str, user: Option<&'a User>) -> Self {
        Self { title, user }
    }

    /// Render the complete HTML page with the given content.
    ///
    /// The content is placed inside the `<main class="container">` element.
    #[must_use]
    pub fn render(self, content: Markup) -> Markup {
        html! {
            (DOCTYPE)
            html lang="en" data-theme="light" {
                head {
                    meta charset="UTF-8";
                    meta name="viewport" content="width=device-width, initial-scale=1.0";
                    meta name="color-scheme" content="light dark";
                    title { (self.title) " - Literary Lions" }

                    link rel="stylesheet" href="/static/css/style.css";
                    link rel="icon" href="data:image/svg+xml,<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 100 100'><text y='.9em' font-size='90'>🦁</text></svg>";
                    // Inline critical script to prevent theme flicker
                    script { (PreEscaped(THEME_INIT_SCRIPT)) }
                }
                body {
                    (self.render_header())
                    main class="container" {
                        (content)
                    }
                    (Self::render_footer())
                    script src="/static/js/theme.js" {}
                    script src="/static/js/search-suggestions.js" {}
                }
            }
        }
    }

    /// Render the page header with navigation.
    fn render_header(&self) -> Markup {
        html! {
            header class="container" {
                nav {
                    ul {
                        li {
                            a href="/" {
                                strong class="site-logo" { "Literary Lions" }
                            }
                        }
                    }
                    ul {
                        li { a href="/" { "Home" } }
                        li { a href="/search" { "Search" } }
                        @if self.user.is_some() {
                            li { a href="/create-post" { "New Post" } }
                        }
                        (self.render_auth_nav())
                        li {
                            button
                                id="theme-toggle"
                                class="theme-toggle"
                                title="Toggle dark mode"
                                aria-label="Toggle dark mode"
                            { "🌓" }
                        }
                    }
                }
            }
        }
    }

    /// Render the login/profile part of the navigation.
    fn render_auth_nav(&self) -> Markup {
        match self.user {
            Some(user) => html! {
                li {
                    a href=(format!("/profile/{}", user.username)) { (user.username) }
                }
                @if user.is_admin() {
                    li { a href="/admin" { "Admin" } }
                }
                li {
                    form method="post" action="/logout" class="inline-form" {
                        button type="submit" class="link-button" { "Logout" }
                    }
                }
            },
            None => html! {
                li { a href="/login" { "Login" } }
                li { a href="/register" { "Register" } }
            },
        }
    }

    /// Render the page footer.
    fn render_footer() -> Markup {
        html! {
            footer class="container" {
                small { "Literary Lions — a forum for book lovers" }
            }
        }
    }
}
