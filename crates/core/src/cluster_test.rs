//! Tests for clusters and the template updater

use super::*;

fn template(text: &str) -> Vec<Token> {
    text.split_whitespace()
        .map(|t| if t == WILDCARD_MARKER { Token::Wildcard } else { Token::from(t) })
        .collect()
}

#[test]
fn test_new_cluster_is_verbatim() {
    let cluster = LogCluster::new(ClusterId::new(1), &["user", "5", "login", "ok"], 2);

    assert_eq!(cluster.id().get(), 1);
    assert_eq!(cluster.match_count(), 1);
    assert_eq!(cluster.token_count(), 4);
    assert_eq!(cluster.wildcard_count(), 0);
    assert_eq!(cluster.template_string(), "user 5 login ok");
    assert_eq!(cluster.route(), &["user".to_string(), "5".to_string()]);
}

#[test]
fn test_merge_generalizes_mismatches() {
    let mut t = template("user 5 login ok");
    let generalized = merge_template(&mut t, &["user", "7", "login", "ok"]);

    assert_eq!(generalized, 1);
    assert_eq!(render_template(&t), "user <*> login ok");
}

#[test]
fn test_merge_is_idempotent() {
    let mut t = template("user 5 login ok");
    merge_template(&mut t, &["user", "7", "logout", "ok"]);
    let snapshot = t.clone();

    let generalized = merge_template(&mut t, &["user", "7", "logout", "ok"]);
    assert_eq!(generalized, 0);
    assert_eq!(t, snapshot);
}

#[test]
fn test_wildcards_never_revert() {
    let mut t = template("a <*> c");
    merge_template(&mut t, &["a", "b", "c"]);
    assert!(t[1].is_wildcard());
}

#[test]
fn test_absorb_counts_sightings() {
    let mut cluster = LogCluster::new(ClusterId::new(3), &["conn", "open"], 1);
    cluster.absorb(&["conn", "open"]);
    cluster.absorb(&["conn", "closed"]);

    assert_eq!(cluster.match_count(), 3);
    assert_eq!(cluster.template_string(), "conn <*>");
    // Route is fixed at creation
    assert_eq!(cluster.route(), &["conn".to_string()]);
}

#[test]
fn test_literal_marker_text_is_not_a_wildcard() {
    let token = Token::from("<*>");
    assert!(!token.is_wildcard());
    assert!(!token.accepts("anything"));
    assert!(token.accepts("<*>"));
}

#[test]
fn test_token_option_conversion() {
    assert_eq!(Token::from(None), Token::Wildcard);
    assert_eq!(Token::from(Some("x".to_string())), Token::Literal("x".to_string()));
}

#[test]
fn test_cluster_display() {
    let mut cluster = LogCluster::new(ClusterId::new(12), &["Connection", "closed", "by", "1.2.3.4"], 2);
    cluster.absorb(&["Connection", "closed", "by", "5.6.7.8"]);

    assert_eq!(cluster.to_string(), "0012 (size 2): Connection closed by <*>");
}

#[test]
fn test_canonical_name_simple() {
    assert_eq!(
        canonical_name(&template("User logged in successfully")),
        "User logged in successfully"
    );
}

#[test]
fn test_canonical_name_skips_wildcards_and_truncates() {
    assert_eq!(
        canonical_name(&template("This <*> is a very long message with tokens")),
        "This is a very long"
    );
}

#[test]
fn test_canonical_name_all_wildcards() {
    assert_eq!(canonical_name(&[Token::Wildcard, Token::Wildcard]), "Unknown Pattern");
}

#[test]
fn test_empty_template() {
    let cluster = LogCluster::new(ClusterId::new(1), &[], 0);
    assert_eq!(cluster.token_count(), 0);
    assert_eq!(cluster.template_string(), "");
}
