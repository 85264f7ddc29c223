//! Search page.

use maud::{html, Markup};

use crate::components::{BaseLayout, PostList};
use crate::db::{Post, User};

/// Render the search page. An empty query shows just the form.
#[must_use]
pub fn render_search_page(user: Option<&User>, query: &str, results: &[Post]) -> Markup {
    let content = html! {
        section class="search" {
            h1 { "Search" }

            form method="get" action="/search" class="search-form" {
                input type="search" id="search-input" name="q" value=(query)
                    placeholder="Search posts…" autocomplete="off";
                button type="submit" { "Search" }
                div id="search-suggestions" class="suggestions" {}
            }

            @if !query.is_empty() {
                h2 { "Results for \"" (query) "\"" }
                (PostList::new(results).with_empty_message("Nothing found."))
            }
        }
    };

    BaseLayout::new("Search", user).render(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_shows_only_form() {
        let html = render_search_page(None, "", &[]).into_string();
        assert!(html.contains("search-form"));
        assert!(!html.contains("Results for"));
    }

    #[test]
    fn test_query_is_escaped_in_results_heading() {
        let html = render_search_page(None, "<b>dune</b>", &[]).into_string();
        assert!(html.contains("&lt;b&gt;dune&lt;/b&gt;"));
        assert!(html.contains("Nothing found."));
    }
}
