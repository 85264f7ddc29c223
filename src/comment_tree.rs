//! Reconstruction of the nested reply hierarchy from flat comment rows.
//!
//! Comments are stored flat with an optional parent pointer; rendering needs
//! a forest. Construction is index-based: one pass partitions the input into
//! roots and a parent-id -> children map, then each root is expanded
//! recursively. O(n) overall, with sibling order preserved from the input.

use std::collections::HashMap;

use crate::db::{Comment, CommentNode};

/// Build the reply forest for one post from its flat comment list.
///
/// A comment with no parent becomes a root, in input order. A node's
/// children are exactly the input comments whose `parent_id` equals its id,
/// in input order. Nesting depth is unlimited.
///
/// Comments whose parent is not present in the input (for example when the
/// parent was filtered out because its author is suspended) are unreachable
/// from any root and silently dropped from the forest. The same containment
/// applies to parent-pointer cycles and self-references: no member of a
/// cycle has a nil parent chain, so none is ever reached and construction
/// terminates on arbitrary input. Callers are still expected to supply
/// parent pointers that form a forest within a single post.
#[must_use]
pub fn build_comment_forest(comments: Vec<Comment>) -> Vec<CommentNode> {
    let mut roots: Vec<Comment> = Vec::new();
    let mut children: HashMap<i64, Vec<Comment>> = HashMap::new();

    for comment in comments {
        match comment.parent_id {
            None => roots.push(comment),
            Some(parent_id) => children.entry(parent_id).or_default().push(comment),
        }
    }

    roots
        .into_iter()
        .map(|comment| expand_node(comment, &mut children))
        .collect()
}

/// Materialize one node and its subtree. Children are removed from the map
/// as they are consumed, so no comment is expanded twice.
fn expand_node(comment: Comment, children: &mut HashMap<i64, Vec<Comment>>) -> CommentNode {
    let replies = children
        .remove(&comment.id)
        .unwrap_or_default()
        .into_iter()
        .map(|child| expand_node(child, children))
        .collect();

    CommentNode { comment, replies }
}

/// Total number of comments in the forest.
///
/// For input with no orphaned parents this equals the input length.
#[must_use]
pub fn count_comments(forest: &[CommentNode]) -> usize {
    forest
        .iter()
        .map(|node| 1 + count_comments(&node.replies))
        .sum()
}
