//! Maud HTML components for the web UI.
//!
//! Reusable building blocks shared by the page templates:
//!
//! - `layout`: base page skeleton and auth-aware navigation
//! - `alert`: success/error/info message boxes
//! - `card`: post summary cards and lists

pub mod alert;
pub mod card;
pub mod layout;

pub use alert::{Alert, AlertVariant};
pub use card::{PostCard, PostList};
pub use layout::BaseLayout;
