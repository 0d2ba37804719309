//! Bucket matcher
//!
//! Scores a tokenized line against every cluster in a bucket and picks the
//! best one. Wildcard positions always count as agreement, so a template
//! that has generalized never scores worse for it.

use crate::cluster::{LogCluster, Token};

#[cfg(test)]
#[path = "matcher_test.rs"]
mod tests;

/// Fraction of positions where `template` accepts `tokens`
///
/// Both sides have the same length. A zero-length template scores 1.0.
pub fn similarity(template: &[Token], tokens: &[&str]) -> f64 {
    debug_assert_eq!(template.len(), tokens.len());

    if template.is_empty() {
        return 1.0;
    }

    let agreeing = template
        .iter()
        .zip(tokens)
        .filter(|(slot, token)| slot.accepts(token))
        .count();

    agreeing as f64 / template.len() as f64
}

/// Select the best cluster for a line, if it clears `threshold`
///
/// Clusters are scanned in the given order and the first one reaching the
/// highest score wins ties. An empty candidate set never matches.
pub fn best_match<'a, I>(candidates: I, tokens: &[&str], threshold: f64) -> Option<&'a LogCluster>
where
    I: IntoIterator<Item = &'a LogCluster>,
{
    let mut best: Option<(&LogCluster, f64)> = None;

    for cluster in candidates {
        let score = similarity(cluster.template(), tokens);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((cluster, score)),
        }
    }

    best.filter(|(_, score)| *score >= threshold)
        .map(|(cluster, _)| cluster)
}
