use std::collections::HashMap;

use anyhow::{Context, Result};
use sqlx::SqlitePool;

use super::models::{
    Category, Comment, NewComment, NewPost, Post, PostScope, PostSort, Session, SortOrder, User,
    UserStats, VoteState, VoteStatus, VoteTarget,
};

// ========== Posts ==========

/// Columns shared by every post listing. Author username, category name and
/// the three counts are computed at read time so they always reflect the
/// current vote/comment rows.
const POST_SELECT: &str = r"
    SELECT
        p.id, p.title, p.content, p.user_id, p.category_id,
        u.username, c.name AS category_name,
        p.created_at, p.updated_at,
        (SELECT COUNT(*) FROM post_votes pv WHERE pv.post_id = p.id AND pv.is_like = 1) AS likes_count,
        (SELECT COUNT(*) FROM post_votes pv WHERE pv.post_id = p.id AND pv.is_like = 0) AS dislikes_count,
        (SELECT COUNT(*) FROM comments cm WHERE cm.post_id = p.id) AS comments_count
    FROM posts p
    JOIN users u ON p.user_id = u.id
    JOIN categories c ON p.category_id = c.id
";

/// Build the ORDER BY clause for a post listing.
///
/// The secondary key on `p.id` makes ties deterministic for identical inputs.
/// Title ordering uses SQLite's default BINARY collation, so it is byte-wise
/// (all uppercase before all lowercase).
fn post_order_clause(sort: PostSort, order: SortOrder) -> String {
    let key = match sort {
        PostSort::Date => "p.created_at",
        PostSort::Likes => "likes_count",
        PostSort::Comments => "comments_count",
        PostSort::Title => "p.title",
    };
    let dir = order.as_sql();
    format!("ORDER BY {key} {dir}, p.id {dir}")
}

/// List posts for a scope with the given sort, annotated with vote and
/// comment counts.
///
/// `include_suspended = false` excludes posts whose author is suspended,
/// regardless of scope; pass `true` only for admin viewers. The liked-by
/// scope returns only posts the user holds an active like (not dislike)
/// against.
pub async fn list_posts(
    pool: &SqlitePool,
    scope: PostScope,
    sort: PostSort,
    order: SortOrder,
    include_suspended: bool,
) -> Result<Vec<Post>> {
    let mut conditions: Vec<&str> = Vec::new();
    let mut binds: Vec<i64> = Vec::new();

    match scope {
        PostScope::All => {}
        PostScope::Category(category_id) => {
            conditions.push("p.category_id = ?");
            binds.push(category_id);
        }
        PostScope::Author(user_id) => {
            conditions.push("p.user_id = ?");
            binds.push(user_id);
        }
        PostScope::LikedBy(user_id) => {
            conditions.push(
                "EXISTS (SELECT 1 FROM post_votes pv WHERE pv.post_id = p.id AND pv.user_id = ? AND pv.is_like = 1)",
            );
            binds.push(user_id);
        }
    }

    if !include_suspended {
        conditions.push("u.status = 'active'");
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let query = format!(
        "{POST_SELECT} {where_clause} {}",
        post_order_clause(sort, order)
    );

    let mut q = sqlx::query_as(&query);
    for bind in binds {
        q = q.bind(bind);
    }

    q.fetch_all(pool).await.context("Failed to list posts")
}

/// Get a single post by id with its counts. Suspension filtering is the
/// caller's concern here (the handler decides whether a suspended author's
/// post is visible to the viewer).
pub async fn get_post_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Post>> {
    let query = format!("{POST_SELECT} WHERE p.id = ?");
    sqlx::query_as(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch post by id")
}

/// Insert a new post, returning its id.
pub async fn create_post(pool: &SqlitePool, post: &NewPost) -> Result<i64> {
    let result = sqlx::query(
        r"
        INSERT INTO posts (title, content, user_id, category_id)
        VALUES (?, ?, ?, ?)
        ",
    )
    .bind(&post.title)
    .bind(&post.content)
    .bind(post.user_id)
    .bind(post.category_id)
    .execute(pool)
    .await
    .context("Failed to insert post")?;

    Ok(result.last_insert_rowid())
}

// ========== Search ==========

/// Search posts by title or content, newest first. The suspension filter
/// applies here the same way it does to the scoped listings.
pub async fn search_posts(
    pool: &SqlitePool,
    term: &str,
    limit: i64,
    include_suspended: bool,
) -> Result<Vec<Post>> {
    let pattern = format!("%{term}%");
    let suspension_filter = if include_suspended {
        ""
    } else {
        "AND u.status = 'active'"
    };
    let query = format!(
        "{POST_SELECT} WHERE (p.title LIKE ? OR p.content LIKE ?) {suspension_filter} ORDER BY p.created_at DESC, p.id DESC LIMIT ?"
    );
    sqlx::query_as(&query)
        .bind(&pattern)
        .bind(&pattern)
        .bind(limit)
        .fetch_all(pool)
        .await
        .context("Failed to search posts")
}

/// Title-only search used by the live suggestion endpoint. Returns
/// (id, title) pairs, newest first.
pub async fn search_post_titles(
    pool: &SqlitePool,
    term: &str,
    limit: i64,
    include_suspended: bool,
) -> Result<Vec<(i64, String)>> {
    let pattern = format!("%{term}%");
    let suspension_filter = if include_suspended {
        ""
    } else {
        "AND u.status = 'active'"
    };
    let query = format!(
        r"
        SELECT p.id, p.title FROM posts p
        JOIN users u ON p.user_id = u.id
        WHERE p.title LIKE ? {suspension_filter}
        ORDER BY p.created_at DESC, p.id DESC
        LIMIT ?
        "
    );
    sqlx::query_as(&query)
        .bind(&pattern)
        .bind(limit)
        .fetch_all(pool)
        .await
        .context("Failed to search post titles")
}

// ========== Comments ==========

/// List all comments for a post, each annotated with aggregated vote counts,
/// ordered by creation time ascending (id as tie-break).
///
/// The ascending order gives the tree builder a deterministic sibling order;
/// the builder itself only needs all rows for the post in one pass.
/// `include_suspended = false` excludes comments by suspended authors.
pub async fn list_comments(
    pool: &SqlitePool,
    post_id: i64,
    include_suspended: bool,
) -> Result<Vec<Comment>> {
    let suspension_filter = if include_suspended {
        ""
    } else {
        "AND u.status = 'active'"
    };

    let query = format!(
        r"
        SELECT c.id, c.content, c.user_id, c.post_id, c.parent_id, u.username, c.created_at,
               COALESCE(SUM(CASE WHEN cv.is_like = 1 THEN 1 ELSE 0 END), 0) AS likes_count,
               COALESCE(SUM(CASE WHEN cv.is_like = 0 THEN 1 ELSE 0 END), 0) AS dislikes_count
        FROM comments c
        JOIN users u ON c.user_id = u.id
        LEFT JOIN comment_votes cv ON c.id = cv.comment_id
        WHERE c.post_id = ? {suspension_filter}
        GROUP BY c.id, c.content, c.user_id, c.post_id, c.parent_id, u.username, c.created_at
        ORDER BY c.created_at ASC, c.id ASC
        "
    );

    sqlx::query_as(&query)
        .bind(post_id)
        .fetch_all(pool)
        .await
        .context("Failed to list comments")
}

/// Get a single comment by id with its counts.
pub async fn get_comment_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Comment>> {
    sqlx::query_as(
        r"
        SELECT c.id, c.content, c.user_id, c.post_id, c.parent_id, u.username, c.created_at,
               COALESCE(SUM(CASE WHEN cv.is_like = 1 THEN 1 ELSE 0 END), 0) AS likes_count,
               COALESCE(SUM(CASE WHEN cv.is_like = 0 THEN 1 ELSE 0 END), 0) AS dislikes_count
        FROM comments c
        JOIN users u ON c.user_id = u.id
        LEFT JOIN comment_votes cv ON c.id = cv.comment_id
        WHERE c.id = ?
        GROUP BY c.id, c.content, c.user_id, c.post_id, c.parent_id, u.username, c.created_at
        ",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to fetch comment by id")
}

/// Insert a new comment, returning its id. The handler is responsible for
/// checking that `parent_id`, if present, references a comment on the same
/// post.
pub async fn create_comment(pool: &SqlitePool, comment: &NewComment) -> Result<i64> {
    let result = sqlx::query(
        r"
        INSERT INTO comments (content, user_id, post_id, parent_id)
        VALUES (?, ?, ?, ?)
        ",
    )
    .bind(&comment.content)
    .bind(comment.user_id)
    .bind(comment.post_id)
    .bind(comment.parent_id)
    .execute(pool)
    .await
    .context("Failed to insert comment")?;

    Ok(result.last_insert_rowid())
}

// ========== Votes ==========

/// Apply the three-way vote toggle for a user on a post or comment.
///
/// State machine per (user, target): no vote + like inserts a like; an
/// existing vote of the same polarity is removed (toggle off); an existing
/// vote of the opposite polarity is flipped in place. Returns the resulting
/// state.
///
/// The read-then-write runs inside one transaction so concurrent toggles
/// from the same user serialize; the UNIQUE(user, target) constraint
/// backstops a racing duplicate insert. At most one mutating statement is
/// issued per call.
pub async fn toggle_vote(
    pool: &SqlitePool,
    user_id: i64,
    target_id: i64,
    target: VoteTarget,
    is_like: bool,
) -> Result<VoteState> {
    let table = target.table();
    let id_column = target.id_column();

    let mut tx = pool
        .begin()
        .await
        .context("Failed to begin vote transaction")?;

    let select = format!("SELECT is_like FROM {table} WHERE user_id = ? AND {id_column} = ?");
    let existing: Option<(bool,)> = sqlx::query_as(&select)
        .bind(user_id)
        .bind(target_id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to read current vote")?;

    let state = match existing {
        None => {
            let insert =
                format!("INSERT INTO {table} (user_id, {id_column}, is_like) VALUES (?, ?, ?)");
            sqlx::query(&insert)
                .bind(user_id)
                .bind(target_id)
                .bind(is_like)
                .execute(&mut *tx)
                .await
                .context("Failed to insert vote")?;
            if is_like {
                VoteState::Liked
            } else {
                VoteState::Disliked
            }
        }
        Some((current,)) if current == is_like => {
            let delete = format!("DELETE FROM {table} WHERE user_id = ? AND {id_column} = ?");
            sqlx::query(&delete)
                .bind(user_id)
                .bind(target_id)
                .execute(&mut *tx)
                .await
                .context("Failed to remove vote")?;
            VoteState::None
        }
        Some(_) => {
            let update = format!("UPDATE {table} SET is_like = ? WHERE user_id = ? AND {id_column} = ?");
            sqlx::query(&update)
                .bind(is_like)
                .bind(user_id)
                .bind(target_id)
                .execute(&mut *tx)
                .await
                .context("Failed to flip vote")?;
            if is_like {
                VoteState::Liked
            } else {
                VoteState::Disliked
            }
        }
    };

    tx.commit().await.context("Failed to commit vote")?;

    Ok(state)
}

/// Read the vote a user currently holds on a target. Absence of a row means
/// neither flag is set.
pub async fn get_vote_state(
    pool: &SqlitePool,
    user_id: i64,
    target_id: i64,
    target: VoteTarget,
) -> Result<VoteStatus> {
    let query = format!(
        "SELECT is_like FROM {} WHERE user_id = ? AND {} = ?",
        target.table(),
        target.id_column()
    );
    let row: Option<(bool,)> = sqlx::query_as(&query)
        .bind(user_id)
        .bind(target_id)
        .fetch_optional(pool)
        .await
        .context("Failed to read vote state")?;

    Ok(row.map_or_else(VoteStatus::default, |(is_like,)| VoteStatus {
        liked: is_like,
        disliked: !is_like,
    }))
}

/// All comment votes a user holds on one post's comments, keyed by comment
/// id (true = like). One query per page render instead of one per comment.
pub async fn get_user_comment_votes(
    pool: &SqlitePool,
    user_id: i64,
    post_id: i64,
) -> Result<HashMap<i64, bool>> {
    let rows: Vec<(i64, bool)> = sqlx::query_as(
        r"
        SELECT cv.comment_id, cv.is_like
        FROM comment_votes cv
        JOIN comments c ON cv.comment_id = c.id
        WHERE cv.user_id = ? AND c.post_id = ?
        ",
    )
    .bind(user_id)
    .bind(post_id)
    .fetch_all(pool)
    .await
    .context("Failed to fetch user comment votes")?;

    Ok(rows.into_iter().collect())
}

// ========== Users ==========

/// Create a new user with the default role and status, returning the id.
pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<i64> {
    let result = sqlx::query(
        r"
        INSERT INTO users (username, email, password_hash)
        VALUES (?, ?, ?)
        ",
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .execute(pool)
    .await
    .context("Failed to create user")?;

    Ok(result.last_insert_rowid())
}

/// Get a user by id.
pub async fn get_user_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>> {
    sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch user by id")
}

/// Get a user by username.
pub async fn get_user_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    sqlx::query_as("SELECT * FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch user by username")
}

/// Get a user by email. Used for login.
pub async fn get_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
    sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch user by email")
}

/// Check whether the email and username are already taken.
/// Returns (email_taken, username_taken).
pub async fn user_exists(pool: &SqlitePool, email: &str, username: &str) -> Result<(bool, bool)> {
    let email_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = ?")
        .bind(email)
        .fetch_one(pool)
        .await
        .context("Failed to check email existence")?;

    let username_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = ?")
        .bind(username)
        .fetch_one(pool)
        .await
        .context("Failed to check username existence")?;

    Ok((email_count.0 > 0, username_count.0 > 0))
}

/// Update a user's profile picture URL and signature.
pub async fn update_user_profile(
    pool: &SqlitePool,
    user_id: i64,
    profile_picture: &str,
    signature: &str,
) -> Result<()> {
    sqlx::query("UPDATE users SET profile_picture = ?, signature = ? WHERE id = ?")
        .bind(profile_picture)
        .bind(signature)
        .bind(user_id)
        .execute(pool)
        .await
        .context("Failed to update user profile")?;
    Ok(())
}

/// Count total users.
pub async fn count_users(pool: &SqlitePool) -> Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
        .context("Failed to count users")?;
    Ok(row.0)
}

/// Get all users, newest first. Used by the admin panel.
pub async fn get_all_users(pool: &SqlitePool) -> Result<Vec<User>> {
    sqlx::query_as(
        r"
        SELECT * FROM users
        ORDER BY created_at DESC, id DESC
        ",
    )
    .fetch_all(pool)
    .await
    .context("Failed to get all users")
}

/// Per-user activity statistics for profile pages: post count, comment
/// count, and the number of the user's posts that received at least one
/// like.
pub async fn get_user_stats(pool: &SqlitePool, user_id: i64) -> Result<UserStats> {
    let posts: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .context("Failed to count user posts")?;

    let comments: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM comments WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .context("Failed to count user comments")?;

    let likes: (i64,) = sqlx::query_as(
        r"
        SELECT COUNT(DISTINCT p.id) FROM post_votes pv
        JOIN posts p ON pv.post_id = p.id
        WHERE p.user_id = ? AND pv.is_like = 1
        ",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
    .context("Failed to count likes received")?;

    Ok(UserStats {
        posts_count: posts.0,
        comments_count: comments.0,
        likes_received: likes.0,
    })
}

// ========== Moderation ==========

/// Suspend a user. Admin accounts cannot be suspended.
pub async fn suspend_user(pool: &SqlitePool, user_id: i64) -> Result<()> {
    let result = sqlx::query("UPDATE users SET status = 'suspended' WHERE id = ? AND role != 'admin'")
        .bind(user_id)
        .execute(pool)
        .await
        .context("Failed to suspend user")?;

    if result.rows_affected() == 0 {
        anyhow::bail!("user not found or cannot suspend an admin");
    }

    Ok(())
}

/// Reactivate a suspended user.
pub async fn unsuspend_user(pool: &SqlitePool, user_id: i64) -> Result<()> {
    sqlx::query("UPDATE users SET status = 'active' WHERE id = ?")
        .bind(user_id)
        .execute(pool)
        .await
        .context("Failed to unsuspend user")?;
    Ok(())
}

/// Delete a user and everything that depends on their content, in one
/// transaction. Order matters: votes on the affected comments and posts go
/// first, then the comments, the posts, the user's sessions, and finally
/// the user row.
pub async fn delete_user_cascade(pool: &SqlitePool, user_id: i64) -> Result<()> {
    let mut tx = pool
        .begin()
        .await
        .context("Failed to begin user deletion transaction")?;

    // Votes on comments under the user's posts, on the user's own comments,
    // and votes the user cast on any comment
    sqlx::query(
        r"
        DELETE FROM comment_votes
        WHERE comment_id IN (
            SELECT c.id FROM comments c
            JOIN posts p ON c.post_id = p.id
            WHERE p.user_id = ? OR c.user_id = ?
        ) OR user_id = ?
        ",
    )
    .bind(user_id)
    .bind(user_id)
    .bind(user_id)
    .execute(&mut *tx)
    .await
    .context("Failed to delete comment votes")?;

    // Votes on the user's posts and votes the user cast on any post
    sqlx::query(
        r"
        DELETE FROM post_votes
        WHERE post_id IN (SELECT id FROM posts WHERE user_id = ?) OR user_id = ?
        ",
    )
    .bind(user_id)
    .bind(user_id)
    .execute(&mut *tx)
    .await
    .context("Failed to delete post votes")?;

    // Comments under the user's posts and comments the user authored
    sqlx::query(
        r"
        DELETE FROM comments
        WHERE post_id IN (SELECT id FROM posts WHERE user_id = ?) OR user_id = ?
        ",
    )
    .bind(user_id)
    .bind(user_id)
    .execute(&mut *tx)
    .await
    .context("Failed to delete comments")?;

    sqlx::query("DELETE FROM posts WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .context("Failed to delete posts")?;

    sqlx::query("DELETE FROM sessions WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .context("Failed to delete sessions")?;

    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .context("Failed to delete user")?;

    tx.commit()
        .await
        .context("Failed to commit user deletion")?;

    Ok(())
}

// ========== Sessions ==========

/// Create a new session.
pub async fn create_session(
    pool: &SqlitePool,
    user_id: i64,
    token: &str,
    expires_at: &str,
) -> Result<i64> {
    let result = sqlx::query(
        r"
        INSERT INTO sessions (user_id, token, expires_at)
        VALUES (?, ?, ?)
        ",
    )
    .bind(user_id)
    .bind(token)
    .bind(expires_at)
    .execute(pool)
    .await
    .context("Failed to create session")?;

    Ok(result.last_insert_rowid())
}

/// Get a session by token.
pub async fn get_session_by_token(pool: &SqlitePool, token: &str) -> Result<Option<Session>> {
    sqlx::query_as("SELECT * FROM sessions WHERE token = ?")
        .bind(token)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch session by token")
}

/// Delete a session.
pub async fn delete_session(pool: &SqlitePool, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await
        .context("Failed to delete session")?;
    Ok(())
}

/// Delete all sessions for a user.
pub async fn delete_user_sessions(pool: &SqlitePool, user_id: i64) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE user_id = ?")
        .bind(user_id)
        .execute(pool)
        .await
        .context("Failed to delete user sessions")?;
    Ok(())
}

/// Delete expired sessions. Returns the number of rows removed.
pub async fn delete_expired_sessions(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at < datetime('now')")
        .execute(pool)
        .await
        .context("Failed to delete expired sessions")?;
    Ok(result.rows_affected())
}

// ========== Categories ==========

/// Get all categories, ordered by name.
pub async fn get_all_categories(pool: &SqlitePool) -> Result<Vec<Category>> {
    sqlx::query_as("SELECT * FROM categories ORDER BY name")
        .fetch_all(pool)
        .await
        .context("Failed to get categories")
}

/// Get a category by id.
pub async fn get_category_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Category>> {
    sqlx::query_as("SELECT * FROM categories WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch category by id")
}

/// Default categories seeded on startup.
const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    (
        "General Discussion",
        "General book-related discussions and recommendations",
    ),
    ("Fiction", "Discussions about fiction books and novels"),
    (
        "Non-Fiction",
        "Non-fiction books, biographies, and educational content",
    ),
    (
        "Mystery & Thriller",
        "Mystery, thriller, and suspense novels",
    ),
    ("Romance", "Romance novels and love stories"),
    (
        "Science Fiction & Fantasy",
        "Sci-fi, fantasy, and speculative fiction",
    ),
    ("Classics", "Classic literature and timeless works"),
    ("Book Reviews", "Share and read book reviews"),
    ("Author Discussions", "Discussions about specific authors"),
    (
        "Book Club Picks",
        "Monthly book club selections and discussions",
    ),
];

/// Insert the default categories if they are not present yet.
pub async fn ensure_default_categories(pool: &SqlitePool) -> Result<()> {
    for (name, description) in DEFAULT_CATEGORIES {
        sqlx::query("INSERT OR IGNORE INTO categories (name, description) VALUES (?, ?)")
            .bind(name)
            .bind(description)
            .execute(pool)
            .await
            .context("Failed to seed category")?;
    }
    Ok(())
}

/// Create the admin account if no user with that username exists yet.
pub async fn ensure_admin_user(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<()> {
    let existing = get_user_by_username(pool, username).await?;
    if existing.is_some() {
        return Ok(());
    }

    sqlx::query(
        r"
        INSERT INTO users (username, email, password_hash, role, status)
        VALUES (?, ?, ?, 'admin', 'active')
        ",
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .execute(pool)
    .await
    .context("Failed to create admin user")?;

    Ok(())
}
