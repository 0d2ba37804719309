//! Fixed-depth prefix tree
//!
//! Indexes clusters by token count, then by their first few tokens, so a
//! line only has to be compared against the small bucket of clusters that
//! share its routing key.
//!
//! # Layout
//!
//! ```text
//! root ─┬─ len=4 ─┬─ "user" ─┬─ <*> ───── "login" ─ [bucket]
//!       │         │          └─ "admin" ─ "added" ─ [bucket]
//!       │         └─ <*> ─── ...
//!       └─ len=2 ─── "delete" ─ "file" ─ [bucket]
//! ```
//!
//! Below the length node every level branches on one token, so a tree of
//! depth `d` routes on the first `d - 1` tokens of a line.
//!
//! Nodes live in an arena and refer to each other by index. A token that
//! contains a digit always takes the wildcard branch, and a node that
//! already has `max_children` literal children sends every unseen token to
//! its wildcard branch as well.

use crate::cluster::ClusterId;
use crate::config::DrainConfig;
use std::collections::HashMap;

#[cfg(test)]
#[path = "tree_test.rs"]
mod tests;

type NodeIndex = usize;

/// Node in the prefix tree
#[derive(Debug, Clone, Default, PartialEq)]
struct TreeNode {
    /// Literal token → child
    literals: HashMap<String, NodeIndex>,

    /// Shared child for numeric and overflow tokens
    wildcard: Option<NodeIndex>,

    /// Clusters filed at this node, oldest first
    bucket: Vec<ClusterId>,
}

/// Arena-backed Drain prefix tree
#[derive(Debug, Clone, PartialEq)]
pub struct PrefixTree {
    nodes: Vec<TreeNode>,

    /// Token count → length node
    by_length: HashMap<usize, NodeIndex>,

    /// Token levels below the length node
    token_levels: usize,

    max_children: usize,
}

/// Whether a token contains a decimal digit
pub fn has_digit(token: &str) -> bool {
    token.bytes().any(|b| b.is_ascii_digit())
}

impl PrefixTree {
    /// Create an empty tree shaped by `config`
    pub fn new(config: &DrainConfig) -> Self {
        Self {
            nodes: Vec::new(),
            by_length: HashMap::new(),
            token_levels: config.prefix_len(usize::MAX),
            max_children: config.max_children,
        }
    }

    /// Number of leading tokens used to route a line of `token_count` tokens
    pub fn route_len(&self, token_count: usize) -> usize {
        self.token_levels.min(token_count)
    }

    /// Find the candidate bucket for a tokenized line
    ///
    /// Returns `None` when no cluster can match; the tree is never
    /// modified on this path.
    pub fn descend(&self, tokens: &[&str]) -> Option<&[ClusterId]> {
        let mut current = *self.by_length.get(&tokens.len())?;

        for token in &tokens[..self.route_len(tokens.len())] {
            let node = &self.nodes[current];
            let literal = if has_digit(token) {
                None
            } else {
                node.literals.get(*token).copied()
            };
            current = literal.or(node.wildcard)?;
        }

        Some(&self.nodes[current].bucket)
    }

    /// File a new cluster under the path of a tokenized line
    pub fn insert(&mut self, tokens: &[&str], id: ClusterId) {
        let route = &tokens[..self.route_len(tokens.len())];
        self.insert_route(tokens.len(), route, id);
    }

    /// File a cluster under an explicit route
    ///
    /// `route` holds the first `route_len(token_count)` tokens of the line
    /// the cluster was created from.
    pub fn insert_route<S: AsRef<str>>(&mut self, token_count: usize, route: &[S], id: ClusterId) {
        debug_assert_eq!(route.len(), self.route_len(token_count));

        let mut current = match self.by_length.get(&token_count) {
            Some(&index) => index,
            None => {
                let index = self.alloc();
                self.by_length.insert(token_count, index);
                index
            }
        };

        for token in route {
            current = self.child_for_insert(current, token.as_ref());
        }

        self.nodes[current].bucket.push(id);
    }

    /// Total nodes, excluding the implicit root
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of distinct token counts seen
    pub fn length_count(&self) -> usize {
        self.by_length.len()
    }

    fn alloc(&mut self) -> NodeIndex {
        self.nodes.push(TreeNode::default());
        self.nodes.len() - 1
    }

    fn child_for_insert(&mut self, parent: NodeIndex, token: &str) -> NodeIndex {
        if !has_digit(token) {
            if let Some(&child) = self.nodes[parent].literals.get(token) {
                return child;
            }

            if self.nodes[parent].literals.len() < self.max_children {
                let child = self.alloc();
                self.nodes[parent].literals.insert(token.to_string(), child);
                return child;
            }
        }

        match self.nodes[parent].wildcard {
            Some(child) => child,
            None => {
                let child = self.alloc();
                self.nodes[parent].wildcard = Some(child);
                child
            }
        }
    }
}
