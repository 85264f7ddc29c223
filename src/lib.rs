//! Literary Lions forum library.
//!
//! A server-rendered discussion forum for book lovers: categorized posts,
//! threaded comments, like/dislike voting, search, profiles, and an admin
//! moderation panel, backed by SQLite.

pub mod auth;
pub mod comment_tree;
pub mod components;
pub mod config;
pub mod db;
pub mod web;
