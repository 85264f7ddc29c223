//! Web-boundary error taxonomy.
//!
//! Handlers return `Result<Response, AppError>`; the conversion to an HTTP
//! response lives here so every route fails the same way. Persistence errors
//! are logged with their full chain and surfaced as a generic 500 page.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use maud::html;
use thiserror::Error;

use crate::components::BaseLayout;

/// A single invalid form field.
#[derive(Debug, Clone)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    #[must_use]
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    /// Missing post/comment/user, or content hidden from this viewer.
    #[error("not found")]
    NotFound,

    /// Bad input shape; the offending fields are listed in the response.
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    /// Action attempted without the required role or ownership.
    #[error("forbidden: {0}")]
    Forbidden(&'static str),

    /// Storage failure. Logged, surfaced as a generic failure, never
    /// retried here.
    #[error(transparent)]
    Persistence(#[from] anyhow::Error),
}

impl AppError {
    /// Shorthand for a single-field validation error.
    #[must_use]
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound => {
                let page = BaseLayout::new("Not Found", None).render(html! {
                    section class="error-page" {
                        h1 { "404" }
                        p { "The page you were looking for does not exist." }
                        p { a href="/" { "Back to the forum" } }
                    }
                });
                (StatusCode::NOT_FOUND, Html(page.into_string())).into_response()
            }
            Self::Validation(fields) => {
                let page = BaseLayout::new("Invalid Input", None).render(html! {
                    section class="error-page" {
                        h1 { "Invalid input" }
                        ul {
                            @for field in &fields {
                                li { strong { (field.field) } ": " (field.message) }
                            }
                        }
                        p { a href="/" { "Back to the forum" } }
                    }
                });
                (StatusCode::BAD_REQUEST, Html(page.into_string())).into_response()
            }
            Self::Forbidden(reason) => (StatusCode::FORBIDDEN, reason).into_response(),
            Self::Persistence(e) => {
                tracing::error!("Persistence error: {e:#}");
                let page = BaseLayout::new("Error", None).render(html! {
                    section class="error-page" {
                        h1 { "Something went wrong" }
                        p { "Please try again in a moment." }
                    }
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Html(page.into_string())).into_response()
            }
        }
    }
}
