//! Route-level integration tests driving the full router, from registration
//! through posting and voting, with a real temp database behind it.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use literary_lions::config::Config;
use literary_lions::db::{
    create_post, create_user, ensure_default_categories, get_all_categories, suspend_user,
    Database, NewPost,
};
use literary_lions::web::{create_app, AppState};
use tempfile::TempDir;
use tower::ServiceExt;

async fn setup_app() -> (Router, Database, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db = Database::new(&temp_dir.path().join("test.sqlite"))
        .await
        .expect("Failed to create database");
    ensure_default_categories(db.pool()).await.unwrap();

    let config = Config::from_env().expect("Failed to create config");
    let app = create_app(AppState {
        db: db.clone(),
        config: Arc::new(config),
    });

    (app, db, temp_dir)
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn form_request(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// Register a user through the route and return the session cookie.
async fn register(app: &Router, username: &str) -> String {
    let body = format!(
        "username={username}&email={username}%40example.com&password=reading123&confirm_password=reading123"
    );
    let response = app
        .clone()
        .oneshot(form_request("/register", &body, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("registration should set a session cookie")
        .to_str()
        .unwrap();
    cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn test_home_page_renders() {
    let (app, _db, _tmp) = setup_app().await;

    let response = app.oneshot(get_request("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains("Latest Discussions"));
    assert!(body.contains("Fiction"));
}

#[tokio::test]
async fn test_healthz() {
    let (app, _db, _tmp) = setup_app().await;

    let response = app.oneshot(get_request("/healthz", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "OK");
}

#[tokio::test]
async fn test_unknown_routes_and_missing_posts_are_404() {
    let (app, _db, _tmp) = setup_app().await;

    let response = app
        .clone()
        .oneshot(get_request("/no-such-page", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(get_request("/post/9999", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_voting_requires_login() {
    let (app, _db, _tmp) = setup_app().await;

    let response = app
        .oneshot(form_request("/like-post", "post_id=1&is_like=true", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/login"
    );
}

#[tokio::test]
async fn test_admin_panel_forbidden_for_regular_users() {
    let (app, _db, _tmp) = setup_app().await;
    let cookie = register(&app, "regular").await;

    let response = app
        .oneshot(get_request("/admin", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_register_post_comment_vote_flow() {
    let (app, db, _tmp) = setup_app().await;
    let cookie = register(&app, "flowuser").await;
    let category_id = get_all_categories(db.pool()).await.unwrap()[0].id;

    // Create a post
    let response = app
        .clone()
        .oneshot(form_request(
            "/create-post",
            &format!("title=A+good+yarn&content=Tell+me+about+it&category_id={category_id}"),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(location.starts_with("/post/"));

    // View it
    let response = app
        .clone()
        .oneshot(get_request(&location, Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("A good yarn"));
    assert!(body.contains("Comments (0)"));

    // Comment on it, then reply to that comment
    let post_id = location.rsplit('/').next().unwrap().to_string();
    let response = app
        .clone()
        .oneshot(form_request(
            "/create-comment",
            &format!("post_id={post_id}&content=Loved+it"),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    // Vote on the post
    let response = app
        .clone()
        .oneshot(form_request(
            "/like-post",
            &format!("post_id={post_id}&is_like=true"),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = app
        .clone()
        .oneshot(get_request(&location, Some(&cookie)))
        .await
        .unwrap();
    let body = body_string(response).await;
    assert!(body.contains("Comments (1)"));
    assert!(body.contains("Loved it"));
    assert!(body.contains("vote active"));
}

#[tokio::test]
async fn test_comment_on_wrong_post_parent_is_rejected() {
    let (app, db, _tmp) = setup_app().await;
    let cookie = register(&app, "replier").await;
    let category_id = get_all_categories(db.pool()).await.unwrap()[0].id;
    let author = create_user(db.pool(), "author", "author@example.com", "hash")
        .await
        .unwrap();
    let post_a = create_post(
        db.pool(),
        &NewPost {
            title: "Post A".to_string(),
            content: "a".to_string(),
            user_id: author,
            category_id,
        },
    )
    .await
    .unwrap();
    let post_b = create_post(
        db.pool(),
        &NewPost {
            title: "Post B".to_string(),
            content: "b".to_string(),
            user_id: author,
            category_id,
        },
    )
    .await
    .unwrap();

    // Comment on post A
    let response = app
        .clone()
        .oneshot(form_request(
            "/create-comment",
            &format!("post_id={post_a}&content=On+A"),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    // Replying on post B with post A's comment as parent is invalid
    let response = app
        .oneshot(form_request(
            "/create-comment",
            &format!("post_id={post_b}&content=Cross-post&parent_id=1"),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_suspended_authors_post_is_hidden_from_anonymous_viewers() {
    let (app, db, _tmp) = setup_app().await;
    let category_id = get_all_categories(db.pool()).await.unwrap()[0].id;
    let author = create_user(db.pool(), "suspendee", "s@example.com", "hash")
        .await
        .unwrap();
    let post_id = create_post(
        db.pool(),
        &NewPost {
            title: "Soon hidden".to_string(),
            content: "…".to_string(),
            user_id: author,
            category_id,
        },
    )
    .await
    .unwrap();

    // Visible while the author is active
    let response = app
        .clone()
        .oneshot(get_request(&format!("/post/{post_id}"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    suspend_user(db.pool(), author).await.unwrap();

    // Hidden once suspended, on both the detail page and the home listing
    let response = app
        .clone()
        .oneshot(get_request(&format!("/post/{post_id}"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(get_request("/", None)).await.unwrap();
    let body = body_string(response).await;
    assert!(!body.contains("Soon hidden"));
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let (app, _db, _tmp) = setup_app().await;
    register(&app, "loginuser").await;

    let response = app
        .clone()
        .oneshot(form_request(
            "/login",
            "email=loginuser%40example.com&password=wrong",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Invalid email or password"));

    // Correct credentials log in
    let response = app
        .oneshot(form_request(
            "/login",
            "email=loginuser%40example.com&password=reading123",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(response.headers().get(header::SET_COOKIE).is_some());
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let (app, _db, _tmp) = setup_app().await;
    let cookie = register(&app, "leaver").await;

    let response = app
        .clone()
        .oneshot(form_request("/logout", "", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(set_cookie.contains("Max-Age=0"));

    // The old session no longer authenticates
    let response = app
        .oneshot(get_request("/create-post", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/login"
    );
}

#[tokio::test]
async fn test_registration_validation_lists_offending_fields() {
    let (app, _db, _tmp) = setup_app().await;

    let response = app
        .oneshot(form_request(
            "/register",
            "username=ab&email=not-an-email&password=tiny&confirm_password=other",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains("at least 3 characters"));
    assert!(body.contains("email address is not valid"));
    assert!(body.contains("at least 6 characters"));
    assert!(body.contains("passwords do not match"));
}
