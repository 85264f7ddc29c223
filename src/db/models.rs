use serde::{Deserialize, Serialize};

/// A registered forum user.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub profile_picture: String,
    pub signature: String,
    pub role: String,
    pub status: String,
    pub created_at: String,
}

impl User {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin.as_str()
    }

    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.status == UserStatus::Suspended.as_str()
    }
}

/// User role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

/// User account status. Suspended users keep their account but their
/// content is hidden from non-admin viewers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Suspended,
}

impl UserStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
        }
    }
}

/// A post category.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: String,
}

/// A forum post annotated for display: author username, category name and
/// vote/comment counts are computed at query time, not stored.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub user_id: i64,
    pub category_id: i64,
    pub username: String,
    pub category_name: String,
    pub created_at: String,
    pub updated_at: String,
    pub likes_count: i64,
    pub dislikes_count: i64,
    pub comments_count: i64,
}

/// A comment on a post, annotated with author username and vote counts.
/// `parent_id` of `None` means a top-level comment.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub content: String,
    pub user_id: i64,
    pub post_id: i64,
    pub parent_id: Option<i64>,
    pub username: String,
    pub created_at: String,
    pub likes_count: i64,
    pub dislikes_count: i64,
}

/// A comment plus its ordered replies. Built fresh per request by the
/// comment tree builder; never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct CommentNode {
    pub comment: Comment,
    pub replies: Vec<CommentNode>,
}

/// A login session.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    pub id: i64,
    pub user_id: i64,
    pub token: String,
    pub expires_at: String,
    pub created_at: String,
}

/// Data for inserting a new post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub user_id: i64,
    pub category_id: i64,
}

/// Data for inserting a new comment.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub content: String,
    pub user_id: i64,
    pub post_id: i64,
    pub parent_id: Option<i64>,
}

/// Which subset of posts a listing targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostScope {
    All,
    Category(i64),
    Author(i64),
    /// Posts the user has an active like (not dislike) recorded against.
    LikedBy(i64),
}

/// Sort key for post listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostSort {
    Date,
    Likes,
    Comments,
    Title,
}

impl PostSort {
    /// Parse a user-supplied sort key. Unrecognized input falls back to
    /// `Date`, the default.
    #[must_use]
    pub fn from_str(s: &str) -> Self {
        match s {
            "likes" => Self::Likes,
            "comments" => Self::Comments,
            "title" => Self::Title,
            _ => Self::Date,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Likes => "likes",
            Self::Comments => "comments",
            Self::Title => "title",
        }
    }
}

/// Sort direction for post listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Parse a user-supplied sort order. Unrecognized input falls back to
    /// `Desc`, the default.
    #[must_use]
    pub fn from_str(s: &str) -> Self {
        match s {
            "asc" => Self::Asc,
            _ => Self::Desc,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    #[must_use]
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// What a vote is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTarget {
    Post,
    Comment,
}

impl VoteTarget {
    #[must_use]
    pub fn table(&self) -> &'static str {
        match self {
            Self::Post => "post_votes",
            Self::Comment => "comment_votes",
        }
    }

    #[must_use]
    pub fn id_column(&self) -> &'static str {
        match self {
            Self::Post => "post_id",
            Self::Comment => "comment_id",
        }
    }
}

/// The vote a user holds on a target. Absence of a vote row means `None`;
/// there is no third stored polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteState {
    None,
    Liked,
    Disliked,
}

/// Current vote flags for immediate UI feedback.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct VoteStatus {
    pub liked: bool,
    pub disliked: bool,
}

/// Per-user activity statistics shown on profile pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserStats {
    pub posts_count: i64,
    pub comments_count: i64,
    pub likes_received: i64,
}
