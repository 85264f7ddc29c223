use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::Deserialize;

use super::auth::clear_session_cookie;
use super::error::AppError;
use super::pages;
use super::AppState;
use crate::auth::{MaybeUser, RequireAdmin, RequireUser};
use crate::comment_tree::{build_comment_forest, count_comments};
use crate::db as queries;
use crate::db::{NewComment, NewPost, PostScope, PostSort, SortOrder, VoteStatus, VoteTarget};

/// Maximum number of results returned by the search page.
const SEARCH_RESULT_LIMIT: i64 = 50;

/// Maximum number of entries returned by the suggestion endpoint.
const SUGGESTION_LIMIT: i64 = 8;

/// Create the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/login", get(super::auth::login_page).post(super::auth::login_post))
        .route(
            "/register",
            get(super::auth::register_page).post(super::auth::register_post),
        )
        .route("/logout", post(super::auth::logout))
        .route("/post/:id", get(post_detail))
        .route("/create-post", get(create_post_form).post(create_post))
        .route("/create-comment", post(create_comment))
        .route("/like-post", post(like_post))
        .route("/like-comment", post(like_comment))
        .route("/search", get(search))
        .route("/api/search-suggestions", get(search_suggestions))
        .route("/profile/:username", get(profile))
        .route("/edit-profile", get(edit_profile_form).post(edit_profile))
        .route("/delete-profile", post(delete_profile))
        .route("/admin", get(admin_panel))
        .route("/admin/suspend", post(admin_suspend))
        .route("/admin/unsuspend", post(admin_unsuspend))
        .route("/admin/delete", post(admin_delete))
        .route("/healthz", get(health))
        .fallback(not_found)
}

// ========== Listing ==========

#[derive(Debug, Deserialize)]
pub struct HomeParams {
    category: Option<i64>,
    sort: Option<String>,
    order: Option<String>,
}

async fn home(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Query(params): Query<HomeParams>,
) -> Result<Response, AppError> {
    let scope = params
        .category
        .map_or(PostScope::All, PostScope::Category);
    let sort = PostSort::from_str(params.sort.as_deref().unwrap_or_default());
    let order = SortOrder::from_str(params.order.as_deref().unwrap_or_default());
    let include_suspended = user.as_ref().is_some_and(queries::User::is_admin);

    let posts =
        queries::list_posts(state.db.pool(), scope, sort, order, include_suspended).await?;
    let categories = queries::get_all_categories(state.db.pool()).await?;

    let page = pages::render_home_page(&pages::HomePageParams {
        user: user.as_ref(),
        posts: &posts,
        categories: &categories,
        active_category: params.category,
        sort,
        order,
    });

    Ok(Html(page.into_string()).into_response())
}

// ========== Posts ==========

async fn post_detail(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let is_admin = user.as_ref().is_some_and(queries::User::is_admin);

    let post = queries::get_post_by_id(state.db.pool(), id)
        .await?
        .ok_or(AppError::NotFound)?;

    // A suspended author's post is invisible to non-admin viewers, same as
    // in the listings
    if !is_admin {
        let author = queries::get_user_by_id(state.db.pool(), post.user_id).await?;
        if author.map_or(true, |a| a.is_suspended()) {
            return Err(AppError::NotFound);
        }
    }

    let comments = queries::list_comments(state.db.pool(), id, is_admin).await?;
    let forest = build_comment_forest(comments);
    let total_comments = count_comments(&forest);

    let (post_vote, comment_votes) = match &user {
        Some(u) => (
            queries::get_vote_state(state.db.pool(), u.id, id, VoteTarget::Post).await?,
            queries::get_user_comment_votes(state.db.pool(), u.id, id).await?,
        ),
        None => (VoteStatus::default(), HashMap::new()),
    };

    let page = pages::render_post_detail_page(&pages::PostDetailParams {
        user: user.as_ref(),
        post: &post,
        comments: &forest,
        total_comments,
        post_vote,
        comment_votes: &comment_votes,
    });

    Ok(Html(page.into_string()).into_response())
}

async fn create_post_form(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Response, AppError> {
    let categories = queries::get_all_categories(state.db.pool()).await?;
    let page = pages::render_create_post_page(&user, &categories, None);
    Ok(Html(page.into_string()).into_response())
}

#[derive(Debug, Deserialize)]
pub struct CreatePostForm {
    title: String,
    content: String,
    category_id: i64,
}

async fn create_post(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Form(form): Form<CreatePostForm>,
) -> Result<Response, AppError> {
    let title = form.title.trim();
    let content = form.content.trim();

    if title.is_empty() {
        return Err(AppError::invalid("title", "title cannot be empty"));
    }
    if content.is_empty() {
        return Err(AppError::invalid("content", "content cannot be empty"));
    }

    let category = queries::get_category_by_id(state.db.pool(), form.category_id).await?;
    if category.is_none() {
        return Err(AppError::invalid("category_id", "unknown category"));
    }

    let post_id = queries::create_post(
        state.db.pool(),
        &NewPost {
            title: title.to_string(),
            content: content.to_string(),
            user_id: user.id,
            category_id: form.category_id,
        },
    )
    .await?;

    tracing::info!(post_id, user_id = user.id, "Post created");

    Ok(Redirect::to(&format!("/post/{post_id}")).into_response())
}

// ========== Comments ==========

#[derive(Debug, Deserialize)]
pub struct CreateCommentForm {
    post_id: i64,
    content: String,
    parent_id: Option<i64>,
}

async fn create_comment(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Form(form): Form<CreateCommentForm>,
) -> Result<Response, AppError> {
    let content = form.content.trim();
    if content.is_empty() {
        return Err(AppError::invalid("content", "content cannot be empty"));
    }

    let post = queries::get_post_by_id(state.db.pool(), form.post_id).await?;
    if post.is_none() {
        return Err(AppError::NotFound);
    }

    // A reply must target a comment on the same post; the tree builder
    // assumes this invariant holds upstream, and this is the upstream
    if let Some(parent_id) = form.parent_id {
        let parent = queries::get_comment_by_id(state.db.pool(), parent_id)
            .await?
            .filter(|parent| parent.post_id == form.post_id);
        if parent.is_none() {
            return Err(AppError::invalid(
                "parent_id",
                "parent comment does not exist on this post",
            ));
        }
    }

    let comment_id = queries::create_comment(
        state.db.pool(),
        &NewComment {
            content: content.to_string(),
            user_id: user.id,
            post_id: form.post_id,
            parent_id: form.parent_id,
        },
    )
    .await?;

    tracing::info!(comment_id, post_id = form.post_id, user_id = user.id, "Comment created");

    Ok(Redirect::to(&format!("/post/{}", form.post_id)).into_response())
}

// ========== Votes ==========

#[derive(Debug, Deserialize)]
pub struct PostVoteForm {
    post_id: i64,
    is_like: bool,
}

async fn like_post(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Form(form): Form<PostVoteForm>,
) -> Result<Response, AppError> {
    let post = queries::get_post_by_id(state.db.pool(), form.post_id).await?;
    if post.is_none() {
        return Err(AppError::NotFound);
    }

    let state_after = queries::toggle_vote(
        state.db.pool(),
        user.id,
        form.post_id,
        VoteTarget::Post,
        form.is_like,
    )
    .await?;

    tracing::debug!(
        user_id = user.id,
        post_id = form.post_id,
        state = ?state_after,
        "Post vote toggled"
    );

    Ok(Redirect::to(&format!("/post/{}", form.post_id)).into_response())
}

#[derive(Debug, Deserialize)]
pub struct CommentVoteForm {
    comment_id: i64,
    is_like: bool,
}

async fn like_comment(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Form(form): Form<CommentVoteForm>,
) -> Result<Response, AppError> {
    let comment = queries::get_comment_by_id(state.db.pool(), form.comment_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let state_after = queries::toggle_vote(
        state.db.pool(),
        user.id,
        form.comment_id,
        VoteTarget::Comment,
        form.is_like,
    )
    .await?;

    tracing::debug!(
        user_id = user.id,
        comment_id = form.comment_id,
        state = ?state_after,
        "Comment vote toggled"
    );

    Ok(Redirect::to(&format!("/post/{}", comment.post_id)).into_response())
}

// ========== Search ==========

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    q: Option<String>,
}

async fn search(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Query(params): Query<SearchParams>,
) -> Result<Response, AppError> {
    let query = params.q.unwrap_or_default();
    let include_suspended = user.as_ref().is_some_and(queries::User::is_admin);

    let results = if query.is_empty() {
        Vec::new()
    } else {
        queries::search_posts(
            state.db.pool(),
            &query,
            SEARCH_RESULT_LIMIT,
            include_suspended,
        )
        .await?
    };

    let page = pages::render_search_page(user.as_ref(), &query, &results);
    Ok(Html(page.into_string()).into_response())
}

async fn search_suggestions(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Query(params): Query<SearchParams>,
) -> Result<Response, AppError> {
    let query = params.q.unwrap_or_default();
    let include_suspended = user.as_ref().is_some_and(queries::User::is_admin);

    let titles = if query.is_empty() {
        Vec::new()
    } else {
        queries::search_post_titles(state.db.pool(), &query, SUGGESTION_LIMIT, include_suspended)
            .await?
    };

    let suggestions: Vec<serde_json::Value> = titles
        .into_iter()
        .map(|(id, title)| serde_json::json!({ "id": id, "title": title }))
        .collect();

    Ok(Json(suggestions).into_response())
}

// ========== Profiles ==========

async fn profile(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(username): Path<String>,
) -> Result<Response, AppError> {
    let profile_user = queries::get_user_by_username(state.db.pool(), &username)
        .await?
        .ok_or(AppError::NotFound)?;

    let own_profile = viewer.as_ref().is_some_and(|v| v.id == profile_user.id);
    // Users always see their own content; others see it only while the
    // author is active
    let include_suspended =
        own_profile || viewer.as_ref().is_some_and(queries::User::is_admin);

    let stats = queries::get_user_stats(state.db.pool(), profile_user.id).await?;
    let posts = queries::list_posts(
        state.db.pool(),
        PostScope::Author(profile_user.id),
        PostSort::Date,
        SortOrder::Desc,
        include_suspended,
    )
    .await?;

    let liked_posts = if own_profile {
        Some(
            queries::list_posts(
                state.db.pool(),
                PostScope::LikedBy(profile_user.id),
                PostSort::Date,
                SortOrder::Desc,
                include_suspended,
            )
            .await?,
        )
    } else {
        None
    };

    let page = pages::render_profile_page(&pages::ProfilePageParams {
        viewer: viewer.as_ref(),
        profile_user: &profile_user,
        stats,
        posts: &posts,
        liked_posts: liked_posts.as_deref(),
    });

    Ok(Html(page.into_string()).into_response())
}

async fn edit_profile_form(RequireUser(user): RequireUser) -> Response {
    Html(pages::render_edit_profile_page(&user, None).into_string()).into_response()
}

#[derive(Debug, Deserialize)]
pub struct EditProfileForm {
    #[serde(default)]
    profile_picture: String,
    #[serde(default)]
    signature: String,
}

async fn edit_profile(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Form(form): Form<EditProfileForm>,
) -> Result<Response, AppError> {
    queries::update_user_profile(
        state.db.pool(),
        user.id,
        form.profile_picture.trim(),
        form.signature.trim(),
    )
    .await?;

    let updated = queries::get_user_by_id(state.db.pool(), user.id)
        .await?
        .ok_or(AppError::NotFound)?;

    let page = pages::render_edit_profile_page(&updated, Some("Profile updated"));
    Ok(Html(page.into_string()).into_response())
}

async fn delete_profile(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Response, AppError> {
    queries::delete_user_cascade(state.db.pool(), user.id).await?;

    tracing::info!(user_id = user.id, "Account deleted by owner");

    // The cascade already removed the sessions; clear the stale cookie too
    Ok((
        [(header::SET_COOKIE, clear_session_cookie())],
        Redirect::to("/"),
    )
        .into_response())
}

// ========== Admin ==========

async fn admin_panel(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Response, AppError> {
    let users = queries::get_all_users(state.db.pool()).await?;
    let page = pages::render_admin_panel(&admin, &users, None);
    Ok(Html(page.into_string()).into_response())
}

#[derive(Debug, Deserialize)]
pub struct UserIdForm {
    user_id: i64,
}

async fn admin_suspend(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Form(form): Form<UserIdForm>,
) -> Result<Response, AppError> {
    let target = queries::get_user_by_id(state.db.pool(), form.user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if target.is_admin() {
        return Err(AppError::Forbidden("Admin accounts cannot be suspended"));
    }

    queries::suspend_user(state.db.pool(), form.user_id).await?;

    tracing::info!(
        admin_id = admin.id,
        user_id = form.user_id,
        "User suspended"
    );

    Ok(Redirect::to("/admin").into_response())
}

async fn admin_unsuspend(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Form(form): Form<UserIdForm>,
) -> Result<Response, AppError> {
    let target = queries::get_user_by_id(state.db.pool(), form.user_id).await?;
    if target.is_none() {
        return Err(AppError::NotFound);
    }

    queries::unsuspend_user(state.db.pool(), form.user_id).await?;

    tracing::info!(
        admin_id = admin.id,
        user_id = form.user_id,
        "User unsuspended"
    );

    Ok(Redirect::to("/admin").into_response())
}

async fn admin_delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Form(form): Form<UserIdForm>,
) -> Result<Response, AppError> {
    let target = queries::get_user_by_id(state.db.pool(), form.user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if target.is_admin() {
        return Err(AppError::Forbidden("Admin accounts cannot be deleted"));
    }

    queries::delete_user_cascade(state.db.pool(), form.user_id).await?;

    tracing::info!(
        admin_id = admin.id,
        user_id = form.user_id,
        "User deleted by admin"
    );

    Ok(Redirect::to("/admin").into_response())
}

// ========== Misc ==========

async fn health() -> &'static str {
    "OK"
}

async fn not_found() -> Response {
    AppError::NotFound.into_response()
}
