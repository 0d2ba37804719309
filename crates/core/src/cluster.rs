//! Log clusters and their templates
//!
//! A cluster owns one template: the token sequence shared by every line
//! merged into it, with positions that disagreed generalized to
//! [`Token::Wildcard`].

use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(test)]
#[path = "cluster_test.rs"]
mod tests;

/// How a wildcard position is rendered in text output
pub const WILDCARD_MARKER: &str = "<*>";

/// Number of literal tokens kept in a canonical name
const CANONICAL_NAME_TOKENS: usize = 5;

/// Stable cluster identifier, assigned in creation order starting at 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterId(u64);

impl ClusterId {
    /// Wrap a raw identifier
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw identifier value
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

/// One template position
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    /// Text every merged line agreed on
    Literal(String),
    /// Position that has varied across merged lines
    Wildcard,
}

impl Token {
    /// Whether this position has been generalized
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Token::Wildcard)
    }

    /// Literal text, if any
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Token::Literal(text) => Some(text),
            Token::Wildcard => None,
        }
    }

    /// Whether an input token agrees with this position
    ///
    /// Wildcards agree with everything.
    pub fn accepts(&self, token: &str) -> bool {
        match self {
            Token::Literal(text) => text == token,
            Token::Wildcard => true,
        }
    }
}

impl From<&str> for Token {
    fn from(text: &str) -> Self {
        Token::Literal(text.to_string())
    }
}

impl From<Option<String>> for Token {
    fn from(value: Option<String>) -> Self {
        value.map_or(Token::Wildcard, Token::Literal)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_literal().unwrap_or(WILDCARD_MARKER))
    }
}

/// Render a template as space-separated text
pub fn render_template(template: &[Token]) -> String {
    template
        .iter()
        .map(|t| t.as_literal().unwrap_or(WILDCARD_MARKER))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Generate a human-readable name from a template
///
/// Takes the first 5 literal tokens and joins them with spaces.
/// Returns "Unknown Pattern" if all tokens are wildcards.
pub fn canonical_name(template: &[Token]) -> String {
    let name_tokens: Vec<&str> = template
        .iter()
        .filter_map(Token::as_literal)
        .take(CANONICAL_NAME_TOKENS)
        .collect();

    if name_tokens.is_empty() {
        "Unknown Pattern".to_string()
    } else {
        name_tokens.join(" ")
    }
}

/// Merge a line into a template
///
/// Every literal position that disagrees with the line becomes a wildcard.
/// Wildcards never revert. Returns the number of positions newly
/// generalized; the caller guarantees both sides have the same length.
pub fn merge_template(template: &mut [Token], tokens: &[&str]) -> usize {
    debug_assert_eq!(template.len(), tokens.len());

    let mut generalized = 0;
    for (slot, token) in template.iter_mut().zip(tokens) {
        if !slot.accepts(token) {
            *slot = Token::Wildcard;
            generalized += 1;
        }
    }
    generalized
}

/// A group of structurally similar log lines
#[derive(Debug, Clone, PartialEq)]
pub struct LogCluster {
    id: ClusterId,
    template: Vec<Token>,
    match_count: u64,
    /// Literal prefix the cluster was filed under at creation
    route: Vec<String>,
}

impl LogCluster {
    /// Create a cluster from the first line seen for it
    pub(crate) fn new(id: ClusterId, tokens: &[&str], route_len: usize) -> Self {
        Self {
            id,
            template: tokens.iter().map(|t| Token::from(*t)).collect(),
            match_count: 1,
            route: tokens[..route_len].iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Rebuild a cluster from persisted parts
    pub(crate) fn restore(
        id: ClusterId,
        template: Vec<Token>,
        match_count: u64,
        route: Vec<String>,
    ) -> Self {
        Self {
            id,
            template,
            match_count,
            route,
        }
    }

    /// Cluster identifier
    pub fn id(&self) -> ClusterId {
        self.id
    }

    /// Current template
    pub fn template(&self) -> &[Token] {
        &self.template
    }

    /// Number of lines merged into this cluster, including the first
    pub fn match_count(&self) -> u64 {
        self.match_count
    }

    /// Token count shared by every line in this cluster
    pub fn token_count(&self) -> usize {
        self.template.len()
    }

    /// Tokens the cluster was routed by when it was created
    pub fn route(&self) -> &[String] {
        &self.route
    }

    /// Number of generalized positions
    pub fn wildcard_count(&self) -> usize {
        self.template.iter().filter(|t| t.is_wildcard()).count()
    }

    /// Template rendered as text with `<*>` for wildcards
    pub fn template_string(&self) -> String {
        render_template(&self.template)
    }

    /// First few literal tokens of the template
    pub fn canonical_name(&self) -> String {
        canonical_name(&self.template)
    }

    /// Merge a matched line and count the sighting
    pub(crate) fn absorb(&mut self, tokens: &[&str]) -> usize {
        let generalized = merge_template(&mut self.template, tokens);
        self.match_count += 1;
        generalized
    }
}

impl fmt::Display for LogCluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (size {}): {}",
            self.id,
            self.match_count,
            self.template_string()
        )
    }
}
