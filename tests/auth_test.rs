//! Integration tests for authentication building blocks: password hashing,
//! session lifecycle (including the expiry sweep), and field validation.

use chrono::{Duration, Utc};
use literary_lions::auth::{
    generate_session_token, hash_password, validate_email, validate_password, validate_username,
    verify_password, SessionDuration,
};
use literary_lions::db::{
    create_session, create_user, delete_expired_sessions, delete_session, delete_user_sessions,
    get_session_by_token, Database,
};
use tempfile::TempDir;

async fn setup_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db = Database::new(&temp_dir.path().join("test.sqlite"))
        .await
        .expect("Failed to create database");
    (db, temp_dir)
}

#[test]
fn test_password_hash_round_trip() {
    let hash = hash_password("my reading list is private").unwrap();
    assert!(verify_password("my reading list is private", &hash).unwrap());
    assert!(!verify_password("guess", &hash).unwrap());
    // Argon2id PHC string
    assert!(hash.starts_with("$argon2id$"));
}

#[test]
fn test_validation_rules() {
    assert!(validate_username("bookworm_99").is_ok());
    assert!(validate_username("ab").is_err());
    assert!(validate_username("no spaces").is_err());

    assert!(validate_email("reader@example.com").is_ok());
    assert!(validate_email("not-an-email").is_err());

    assert!(validate_password("longenough").is_ok());
    assert!(validate_password("tiny").is_err());
}

#[tokio::test]
async fn test_session_lifecycle() {
    let (db, _tmp) = setup_db().await;
    let user_id = create_user(db.pool(), "reader", "reader@example.com", "hash")
        .await
        .unwrap();

    let token = generate_session_token();
    let expires_at = (Utc::now() + Duration::seconds(SessionDuration::Short.as_seconds()))
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();
    create_session(db.pool(), user_id, &token, &expires_at)
        .await
        .unwrap();

    let session = get_session_by_token(db.pool(), &token)
        .await
        .unwrap()
        .expect("session should exist");
    assert_eq!(session.user_id, user_id);

    delete_session(db.pool(), &token).await.unwrap();
    assert!(get_session_by_token(db.pool(), &token)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_expired_sessions_are_swept() {
    let (db, _tmp) = setup_db().await;
    let user_id = create_user(db.pool(), "reader", "reader@example.com", "hash")
        .await
        .unwrap();

    let expired_token = generate_session_token();
    let live_token = generate_session_token();

    // datetime('now') comparisons use the "YYYY-MM-DD HH:MM:SS" shape
    let past = (Utc::now() - Duration::hours(2))
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();
    let future = (Utc::now() + Duration::hours(2))
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();

    create_session(db.pool(), user_id, &expired_token, &past)
        .await
        .unwrap();
    create_session(db.pool(), user_id, &live_token, &future)
        .await
        .unwrap();

    let removed = delete_expired_sessions(db.pool()).await.unwrap();
    assert_eq!(removed, 1);

    assert!(get_session_by_token(db.pool(), &expired_token)
        .await
        .unwrap()
        .is_none());
    assert!(get_session_by_token(db.pool(), &live_token)
        .await
        .unwrap()
        .is_some());

    // Sweeping again removes nothing
    let removed = delete_expired_sessions(db.pool()).await.unwrap();
    assert_eq!(removed, 0);
}

#[tokio::test]
async fn test_delete_user_sessions_removes_all_of_them() {
    let (db, _tmp) = setup_db().await;
    let user_id = create_user(db.pool(), "reader", "reader@example.com", "hash")
        .await
        .unwrap();
    let other = create_user(db.pool(), "other", "other@example.com", "hash")
        .await
        .unwrap();

    let future = (Utc::now() + Duration::hours(1))
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();
    let t1 = generate_session_token();
    let t2 = generate_session_token();
    let t3 = generate_session_token();
    create_session(db.pool(), user_id, &t1, &future).await.unwrap();
    create_session(db.pool(), user_id, &t2, &future).await.unwrap();
    create_session(db.pool(), other, &t3, &future).await.unwrap();

    delete_user_sessions(db.pool(), user_id).await.unwrap();

    assert!(get_session_by_token(db.pool(), &t1).await.unwrap().is_none());
    assert!(get_session_by_token(db.pool(), &t2).await.unwrap().is_none());
    assert!(get_session_by_token(db.pool(), &t3).await.unwrap().is_some());
}
