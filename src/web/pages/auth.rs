//! Login and registration pages.

use maud::{html, Markup};

use crate::components::{Alert, BaseLayout};
use crate::web::error::FieldError;

/// Render the login page.
///
/// # Arguments
///
/// * `error` - Optional error message to display above the form
/// * `email` - Email value to prefill after a failed attempt
#[must_use]
pub fn render_login_page(error: Option<&str>, email: Option<&str>) -> Markup {
    let content = html! {
        div class="auth-container" {
            h1 { "Login" }

            @if let Some(e) = error {
                (Alert::error(e))
            }

            form method="post" action="/login" {
                div class="form-group" {
                    label for="email" { "Email" }
                    input type="email" id="email" name="email" value=[email] required;
                }
                div class="form-group" {
                    label for="password" { "Password" }
                    input type="password" id="password" name="password" required;
                }
                div class="form-group" {
                    label {
                        input type="checkbox" name="remember" value="true";
                        " Remember me"
                    }
                }
                button type="submit" { "Login" }
            }

            p class="auth-switch" {
                "Don't have an account? "
                a href="/register" { "Register" }
            }
        }
    };

    BaseLayout::new("Login", None).render(content)
}

/// Values to prefill in the registration form after a failed attempt.
#[derive(Debug, Clone, Default)]
pub struct RegisterFormValues {
    pub username: String,
    pub email: String,
}

/// Render the registration page, listing any per-field validation errors.
#[must_use]
pub fn render_register_page(errors: &[FieldError], values: &RegisterFormValues) -> Markup {
    let content = html! {
        div class="auth-container" {
            h1 { "Register" }

            @if !errors.is_empty() {
                article class="alert alert-error" role="alert" {
                    ul {
                        @for error in errors {
                            li { strong { (error.field) } ": " (error.message) }
                        }
                    }
                }
            }

            form method="post" action="/register" {
                div class="form-group" {
                    label for="username" { "Username" }
                    input type="text" id="username" name="username" value=(values.username) required;
                }
                div class="form-group" {
                    label for="email" { "Email" }
                    input type="email" id="email" name="email" value=(values.email) required;
                }
                div class="form-group" {
                    label for="password" { "Password" }
                    input type="password" id="password" name="password" required;
                }
                div class="form-group" {
                    label for="confirm_password" { "Confirm password" }
                    input type="password" id="confirm_password" name="confirm_password" required;
                }
                button type="submit" { "Create account" }
            }

            p class="auth-switch" {
                "Already have an account? "
                a href="/login" { "Login" }
            }
        }
    };

    BaseLayout::new("Register", None).render(content)
}
