//! Login, registration and logout handlers.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use chrono::{Duration, Utc};
use serde::Deserialize;

use crate::auth::middleware::session_token_from_headers;
use crate::auth::{
    generate_session_token, hash_password, validate_email, validate_password, validate_username,
    verify_password, MaybeUser, RequireUser, SessionDuration,
};
use crate::db as queries;
use crate::web::error::FieldError;
use crate::web::{pages, AppState};

/// Build the Set-Cookie value for a new session.
fn session_cookie(token: &str, max_age: i64) -> String {
    format!("session={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age}")
}

/// Build the Set-Cookie value that removes the session cookie.
#[must_use]
pub fn clear_session_cookie() -> String {
    "session=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0".to_string()
}

/// Create a session for the user and respond with the cookie and a redirect
/// to the front page.
async fn start_session(state: &AppState, user_id: i64, remember: bool) -> Response {
    let token = generate_session_token();
    let duration = if remember {
        SessionDuration::Long
    } else {
        SessionDuration::Short
    };
    // Stored in SQLite's datetime format so the sweep's datetime('now')
    // comparison sees the same shape
    let expires_at = (Utc::now() + Duration::seconds(duration.as_seconds()))
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();

    if let Err(e) = queries::create_session(state.db.pool(), user_id, &token, &expires_at).await {
        tracing::error!("Failed to create session: {e:#}");
        return (StatusCode::INTERNAL_SERVER_ERROR, "Login failed").into_response();
    }

    tracing::info!(user_id, "Session created");

    (
        [(header::SET_COOKIE, session_cookie(&token, duration.as_seconds()))],
        Redirect::to("/"),
    )
        .into_response()
}

// ========== Login ==========

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    email: Option<String>,
    password: Option<String>,
    #[serde(default)]
    remember: bool,
}

/// GET /login - Show login form.
pub async fn login_page(MaybeUser(user): MaybeUser) -> Response {
    // If already logged in, redirect to home
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    Html(pages::render_login_page(None, None).into_string()).into_response()
}

/// POST /login - Handle login.
pub async fn login_post(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let email = match form.email {
        Some(e) if !e.is_empty() => e,
        _ => {
            return Html(
                pages::render_login_page(Some("Email is required"), None).into_string(),
            )
            .into_response();
        }
    };

    let password = match form.password {
        Some(p) if !p.is_empty() => p,
        _ => {
            return Html(
                pages::render_login_page(Some("Password is required"), Some(&email)).into_string(),
            )
            .into_response();
        }
    };

    let user = match queries::get_user_by_email(state.db.pool(), &email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            return Html(
                pages::render_login_page(Some("Invalid email or password"), Some(&email))
                    .into_string(),
            )
            .into_response();
        }
        Err(e) => {
            tracing::error!("Database error during login: {e:#}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Login failed").into_response();
        }
    };

    let password_valid = match verify_password(&password, &user.password_hash) {
        Ok(valid) => valid,
        Err(e) => {
            tracing::error!("Password verification error: {e:#}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Login failed").into_response();
        }
    };

    if !password_valid {
        return Html(
            pages::render_login_page(Some("Invalid email or password"), Some(&email))
                .into_string(),
        )
        .into_response();
    }

    // Suspended users may still log in; only their content is hidden
    start_session(&state, user.id, form.remember).await
}

// ========== Registration ==========

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    confirm_password: String,
}

/// GET /register - Show registration form.
pub async fn register_page(MaybeUser(user): MaybeUser) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    Html(
        pages::render_register_page(&[], &pages::RegisterFormValues::default()).into_string(),
    )
    .into_response()
}

/// POST /register - Handle registration, listing every invalid field at
/// once. The new account is logged in straight away.
pub async fn register_post(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Response {
    let username = form.username.trim().to_string();
    let email = form.email.trim().to_string();

    let mut errors: Vec<FieldError> = Vec::new();

    if let Err(e) = validate_username(&username) {
        errors.push(FieldError::new("username", e.to_string()));
    }
    if let Err(e) = validate_email(&email) {
        errors.push(FieldError::new("email", e.to_string()));
    }
    if let Err(e) = validate_password(&form.password) {
        errors.push(FieldError::new("password", e.to_string()));
    }
    if form.password != form.confirm_password {
        errors.push(FieldError::new("confirm_password", "passwords do not match"));
    }

    if errors.is_empty() {
        match queries::user_exists(state.db.pool(), &email, &username).await {
            Ok((email_taken, username_taken)) => {
                if email_taken {
                    errors.push(FieldError::new("email", "email is already registered"));
                }
                if username_taken {
                    errors.push(FieldError::new("username", "username is already taken"));
                }
            }
            Err(e) => {
                tracing::error!("Database error during registration: {e:#}");
                return (StatusCode::INTERNAL_SERVER_ERROR, "Registration failed").into_response();
            }
        }
    }

    if !errors.is_empty() {
        let values = pages::RegisterFormValues { username, email };
        return Html(pages::render_register_page(&errors, &values).into_string())
            .into_response();
    }

    let password_hash = match hash_password(&form.password) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!("Failed to hash password: {e:#}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Registration failed").into_response();
        }
    };

    let user_id =
        match queries::create_user(state.db.pool(), &username, &email, &password_hash).await {
            Ok(id) => id,
            Err(e) => {
                tracing::error!("Failed to create user: {e:#}");
                let errors = vec![FieldError::new(
                    "username",
                    "registration failed, please try again",
                )];
                let values = pages::RegisterFormValues { username, email };
                return Html(pages::render_register_page(&errors, &values).into_string())
                    .into_response();
            }
        };

    tracing::info!(user_id, "User registered");

    start_session(&state, user_id, false).await
}

// ========== Logout ==========

/// POST /logout - Log out the current user.
pub async fn logout(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
    RequireUser(user): RequireUser,
) -> Response {
    // Delete the session behind this request's cookie; fall back to all of
    // the user's sessions if the token is somehow missing
    match session_token_from_headers(&headers) {
        Some(token) => {
            let _ = queries::delete_session(state.db.pool(), &token).await;
        }
        None => {
            let _ = queries::delete_user_sessions(state.db.pool(), user.id).await;
        }
    }

    tracing::info!(user_id = user.id, "User logged out");

    (
        [(header::SET_COOKIE, clear_session_cookie())],
        Redirect::to("/"),
    )
        .into_response()
}
