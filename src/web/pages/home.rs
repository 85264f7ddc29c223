//! Home page: the post listing with category filter and sort controls.

use maud::{html, Markup, Render};

use crate::components::{BaseLayout, PostList};
use crate::db::{Category, Post, PostSort, SortOrder, User};

/// Parameters for the home page.
#[derive(Debug)]
pub struct HomePageParams<'a> {
    pub user: Option<&'a User>,
    pub posts: &'a [Post],
    pub categories: &'a [Category],
    pub active_category: Option<i64>,
    pub sort: PostSort,
    pub order: SortOrder,
}

/// Sort navigation links, preserving the active category filter.
struct SortNav<'a> {
    active_category: Option<i64>,
    sort: PostSort,
    order: SortOrder,
    keys: &'a [(PostSort, &'static str)],
}

impl SortNav<'_> {
    fn url_for(&self, sort: PostSort) -> String {
        // Clicking the active sort key flips the direction; anything else
        // starts descending.
        let order = if sort == self.sort && self.order == SortOrder::Desc {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        };
        match self.active_category {
            Some(id) => format!(
                "/?category={id}&sort={}&order={}",
                sort.as_str(),
                order.as_str()
            ),
            None => format!("/?sort={}&order={}", sort.as_str(), order.as_str()),
        }
    }
}

impl Render for SortNav<'_> {
    fn render(&self) -> Markup {
        html! {
            nav class="sort-nav" {
                span { "Sort by:" }
                @for (sort, label) in self.keys {
                    a
                        href=(self.url_for(*sort))
                        class=(if *sort == self.sort { "active" } else { "" })
                    {
                        (label)
                        @if *sort == self.sort {
                            (match self.order {
                                SortOrder::Asc => " ↑",
                                SortOrder::Desc => " ↓",
                            })
                        }
                    }
                }
            }
        }
    }
}

/// Render the home page.
#[must_use]
pub fn render_home_page(params: &HomePageParams<'_>) -> Markup {
    let sort_nav = SortNav {
        active_category: params.active_category,
        sort: params.sort,
        order: params.order,
        keys: &[
            (PostSort::Date, "Date"),
            (PostSort::Likes, "Likes"),
            (PostSort::Comments, "Comments"),
            (PostSort::Title, "Title"),
        ],
    };

    let content = html! {
        div class="home-layout" {
            aside class="category-sidebar" {
                h2 { "Categories" }
                ul {
                    li {
                        a
                            href="/"
                            class=(if params.active_category.is_none() { "active" } else { "" })
                        { "All" }
                    }
                    @for category in params.categories {
                        li {
                            a
                                href=(format!("/?category={}", category.id))
                                class=(if params.active_category == Some(category.id) { "active" } else { "" })
                                title=(category.description)
                            { (category.name) }
                        }
                    }
                }
            }

            section class="post-feed" {
                h1 { "Latest Discussions" }
                (sort_nav)
                (PostList::new(params.posts).with_empty_message("No posts in this category yet. Start the discussion!"))
            }
        }
    };

    BaseLayout::new("Home", params.user).render(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: i64, name: &str) -> Category {
        Category {
            id,
            name: name.to_string(),
            description: String::new(),
            created_at: String::new(),
        }
    }

    #[test]
    fn test_home_page_lists_categories() {
        let categories = vec![category(1, "Fiction"), category(2, "Classics")];
        let params = HomePageParams {
            user: None,
            posts: &[],
            categories: &categories,
            active_category: Some(2),
            sort: PostSort::Date,
            order: SortOrder::Desc,
        };
        let html = render_home_page(&params).into_string();

        assert!(html.contains("Fiction"));
        assert!(html.contains("Classics"));
        assert!(html.contains("/?category=1"));
    }

    #[test]
    fn test_sort_nav_flips_active_direction() {
        let params = HomePageParams {
            user: None,
            posts: &[],
            categories: &[],
            active_category: None,
            sort: PostSort::Likes,
            order: SortOrder::Desc,
        };
        let html = render_home_page(&params).into_string();

        // Active key links to the flipped direction; inactive keys start desc
        assert!(html.contains("/?sort=likes&amp;order=asc"));
        assert!(html.contains("/?sort=title&amp;order=desc"));
    }
}
