//! Tests for the bucket matcher

use super::*;
use crate::cluster::{ClusterId, WILDCARD_MARKER};

fn cluster(raw: u64, text: &str) -> LogCluster {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let template: Vec<Token> = tokens
        .iter()
        .map(|t| if *t == WILDCARD_MARKER { Token::Wildcard } else { Token::from(*t) })
        .collect();
    LogCluster::restore(ClusterId::new(raw), template, 1, Vec::new())
}

#[test]
fn test_similarity_exact() {
    let c = cluster(1, "user 5 login ok");
    assert_eq!(similarity(c.template(), &["user", "5", "login", "ok"]), 1.0);
}

#[test]
fn test_similarity_partial() {
    let c = cluster(1, "user 5 login ok");
    assert_eq!(similarity(c.template(), &["user", "7", "login", "ok"]), 0.75);
    assert_eq!(similarity(c.template(), &["admin", "7", "logout", "ok"]), 0.25);
}

#[test]
fn test_wildcards_are_free_matches() {
    let c = cluster(1, "user <*> <*> ok");
    assert_eq!(similarity(c.template(), &["user", "x", "y", "ok"]), 1.0);
    assert_eq!(similarity(c.template(), &["admin", "x", "y", "fail"]), 0.5);
}

#[test]
fn test_similarity_empty_template() {
    assert_eq!(similarity(&[], &[]), 1.0);
}

#[test]
fn test_empty_bucket_never_matches() {
    assert!(best_match(Vec::<&LogCluster>::new(), &["a"], 0.0).is_none());
}

#[test]
fn test_best_score_wins() {
    let weak = cluster(1, "a b x y");
    let strong = cluster(2, "a b c y");

    let found = best_match([&weak, &strong], &["a", "b", "c", "d"], 0.5).unwrap();
    assert_eq!(found.id(), ClusterId::new(2));
}

#[test]
fn test_first_seen_wins_ties() {
    let older = cluster(1, "a b c x");
    let newer = cluster(2, "a b c y");

    let found = best_match([&older, &newer], &["a", "b", "c", "z"], 0.5).unwrap();
    assert_eq!(found.id(), ClusterId::new(1));

    let found = best_match([&newer, &older], &["a", "b", "c", "z"], 0.5).unwrap();
    assert_eq!(found.id(), ClusterId::new(2));
}

#[test]
fn test_below_threshold_is_no_match() {
    let c = cluster(1, "a b c d");
    assert!(best_match([&c], &["a", "x", "y", "z"], 0.5).is_none());
}

#[test]
fn test_threshold_boundary_is_inclusive() {
    let c = cluster(1, "a b c d e");
    let line = ["a", "b", "c", "x", "y"]; // 3 of 5

    assert!(best_match([&c], &line, 0.6).is_some());
    // Any threshold above the score, by less than 1/L, rejects it
    assert!(best_match([&c], &line, 0.6 + 1e-9).is_none());
}

#[test]
fn test_zero_threshold_accepts_anything_in_bucket() {
    let c = cluster(1, "a b");
    assert!(best_match([&c], &["x", "y"], 0.0).is_some());
}
