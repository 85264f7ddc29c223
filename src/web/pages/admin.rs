//! Admin moderation panel.

use maud::{html, Markup};

use crate::components::{Alert, BaseLayout};
use crate::db::User;

/// Render the admin panel: every account with its status and the moderation
/// actions that apply to it.
#[must_use]
pub fn render_admin_panel(admin: &User, users: &[User], message: Option<&str>) -> Markup {
    let content = html! {
        section class="admin-panel" {
            h1 { "Moderation" }

            @if let Some(m) = message {
                (Alert::info(m))
            }

            table class="admin-table" {
                thead {
                    tr {
                        th { "User" }
                        th { "Email" }
                        th { "Role" }
                        th { "Status" }
                        th { "Joined" }
                        th { "Actions" }
                    }
                }
                tbody {
                    @for user in users {
                        tr {
                            td {
                                a href=(format!("/profile/{}", user.username)) { (user.username) }
                            }
                            td { (user.email) }
                            td { (user.role) }
                            td {
                                span class=(if user.is_suspended() { "badge suspended" } else { "badge active" }) {
                                    (user.status)
                                }
                            }
                            td { (user.created_at) }
                            td class="admin-actions" {
                                @if user.is_admin() {
                                    "—"
                                } @else {
                                    @if user.is_suspended() {
                                        form method="post" action="/admin/unsuspend" class="inline-form" {
                                            input type="hidden" name="user_id" value=(user.id);
                                            button type="submit" { "Unsuspend" }
                                        }
                                    } @else {
                                        form method="post" action="/admin/suspend" class="inline-form" {
                                            input type="hidden" name="user_id" value=(user.id);
                                            button type="submit" { "Suspend" }
                                        }
                                    }
                                    form method="post" action="/admin/delete" class="inline-form"
                                        onsubmit="return confirm('Delete this account and all of its content?');" {
                                        input type="hidden" name="user_id" value=(user.id);
                                        button type="submit" class="danger" { "Delete" }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    BaseLayout::new("Moderation", Some(admin)).render(content)
}
