//! Integration tests for the three-way vote toggle: none -> vote, same vote
//! -> removed, opposite vote -> flipped, identically for posts and comments.

use literary_lions::db::{
    create_comment, create_post, create_user, ensure_default_categories, get_all_categories,
    get_vote_state, toggle_vote, Database, NewComment, NewPost, VoteState, VoteTarget,
};
use sqlx::SqlitePool;
use tempfile::TempDir;

async fn setup() -> (Database, TempDir, i64, i64, i64) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db = Database::new(&temp_dir.path().join("test.sqlite"))
        .await
        .expect("Failed to create database");
    ensure_default_categories(db.pool()).await.unwrap();

    let author = create_user(db.pool(), "author", "author@example.com", "hash")
        .await
        .unwrap();
    let voter = create_user(db.pool(), "voter", "voter@example.com", "hash")
        .await
        .unwrap();
    let category_id = get_all_categories(db.pool()).await.unwrap()[0].id;
    let post_id = create_post(
        db.pool(),
        &NewPost {
            title: "Vote on me".to_string(),
            content: "please".to_string(),
            user_id: author,
            category_id,
        },
    )
    .await
    .unwrap();

    (db, temp_dir, author, voter, post_id)
}

async fn vote_rows(pool: &SqlitePool, table: &str, user_id: i64) -> Vec<(i64, bool)> {
    sqlx::query_as(&format!(
        "SELECT id, is_like FROM {table} WHERE user_id = ? ORDER BY id"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
    .unwrap()
}

#[tokio::test]
async fn test_first_like_inserts_row() {
    let (db, _tmp, _author, voter, post_id) = setup().await;

    let state = toggle_vote(db.pool(), voter, post_id, VoteTarget::Post, true)
        .await
        .unwrap();
    assert_eq!(state, VoteState::Liked);

    let rows = vote_rows(db.pool(), "post_votes", voter).await;
    assert_eq!(rows.len(), 1);
    assert!(rows[0].1);

    let status = get_vote_state(db.pool(), voter, post_id, VoteTarget::Post)
        .await
        .unwrap();
    assert!(status.liked);
    assert!(!status.disliked);
}

#[tokio::test]
async fn test_toggle_idempotence_like_twice_returns_to_none() {
    let (db, _tmp, _author, voter, post_id) = setup().await;

    toggle_vote(db.pool(), voter, post_id, VoteTarget::Post, true)
        .await
        .unwrap();
    let state = toggle_vote(db.pool(), voter, post_id, VoteTarget::Post, true)
        .await
        .unwrap();
    assert_eq!(state, VoteState::None);

    // The row is deleted, not zeroed
    assert!(vote_rows(db.pool(), "post_votes", voter).await.is_empty());

    let status = get_vote_state(db.pool(), voter, post_id, VoteTarget::Post)
        .await
        .unwrap();
    assert!(!status.liked);
    assert!(!status.disliked);
}

#[tokio::test]
async fn test_flip_keeps_exactly_one_row() {
    let (db, _tmp, _author, voter, post_id) = setup().await;

    toggle_vote(db.pool(), voter, post_id, VoteTarget::Post, true)
        .await
        .unwrap();
    let state = toggle_vote(db.pool(), voter, post_id, VoteTarget::Post, false)
        .await
        .unwrap();
    assert_eq!(state, VoteState::Disliked);

    let rows = vote_rows(db.pool(), "post_votes", voter).await;
    assert_eq!(rows.len(), 1, "flip must not create a duplicate row");
    assert!(!rows[0].1);
}

#[tokio::test]
async fn test_full_post_scenario() {
    // None -> Liked -> Disliked -> None
    let (db, _tmp, _author, voter, post_id) = setup().await;

    let s1 = toggle_vote(db.pool(), voter, post_id, VoteTarget::Post, true)
        .await
        .unwrap();
    assert_eq!(s1, VoteState::Liked);

    let s2 = toggle_vote(db.pool(), voter, post_id, VoteTarget::Post, false)
        .await
        .unwrap();
    assert_eq!(s2, VoteState::Disliked);
    let rows = vote_rows(db.pool(), "post_votes", voter).await;
    assert_eq!(rows.len(), 1);
    assert!(!rows[0].1);

    let s3 = toggle_vote(db.pool(), voter, post_id, VoteTarget::Post, false)
        .await
        .unwrap();
    assert_eq!(s3, VoteState::None);
    assert!(vote_rows(db.pool(), "post_votes", voter).await.is_empty());
}

#[tokio::test]
async fn test_comment_votes_behave_identically() {
    let (db, _tmp, author, voter, post_id) = setup().await;
    let comment_id = create_comment(
        db.pool(),
        &NewComment {
            content: "vote on me too".to_string(),
            user_id: author,
            post_id,
            parent_id: None,
        },
    )
    .await
    .unwrap();

    let s1 = toggle_vote(db.pool(), voter, comment_id, VoteTarget::Comment, false)
        .await
        .unwrap();
    assert_eq!(s1, VoteState::Disliked);

    let s2 = toggle_vote(db.pool(), voter, comment_id, VoteTarget::Comment, true)
        .await
        .unwrap();
    assert_eq!(s2, VoteState::Liked);
    let rows = vote_rows(db.pool(), "comment_votes", voter).await;
    assert_eq!(rows.len(), 1);
    assert!(rows[0].1);

    let s3 = toggle_vote(db.pool(), voter, comment_id, VoteTarget::Comment, true)
        .await
        .unwrap();
    assert_eq!(s3, VoteState::None);
    assert!(vote_rows(db.pool(), "comment_votes", voter).await.is_empty());
}

#[tokio::test]
async fn test_votes_are_scoped_per_user_and_target() {
    let (db, _tmp, author, voter, post_id) = setup().await;

    toggle_vote(db.pool(), voter, post_id, VoteTarget::Post, true)
        .await
        .unwrap();
    toggle_vote(db.pool(), author, post_id, VoteTarget::Post, false)
        .await
        .unwrap();

    // Each user holds their own row; toggling one leaves the other alone
    let voter_status = get_vote_state(db.pool(), voter, post_id, VoteTarget::Post)
        .await
        .unwrap();
    let author_status = get_vote_state(db.pool(), author, post_id, VoteTarget::Post)
        .await
        .unwrap();
    assert!(voter_status.liked);
    assert!(author_status.disliked);

    toggle_vote(db.pool(), voter, post_id, VoteTarget::Post, true)
        .await
        .unwrap();
    let author_status = get_vote_state(db.pool(), author, post_id, VoteTarget::Post)
        .await
        .unwrap();
    assert!(author_status.disliked);
}

#[tokio::test]
async fn test_unique_constraint_backstops_duplicate_rows() {
    let (db, _tmp, _author, voter, post_id) = setup().await;

    toggle_vote(db.pool(), voter, post_id, VoteTarget::Post, true)
        .await
        .unwrap();

    // A direct duplicate insert (as a racing writer would attempt) is
    // rejected by the uniqueness constraint
    let result = sqlx::query("INSERT INTO post_votes (user_id, post_id, is_like) VALUES (?, ?, ?)")
        .bind(voter)
        .bind(post_id)
        .bind(false)
        .execute(db.pool())
        .await;
    assert!(result.is_err());

    let rows = vote_rows(db.pool(), "post_votes", voter).await;
    assert_eq!(rows.len(), 1);
}
