//! Tests for drain configuration

use super::*;

#[test]
fn test_default_config() {
    let config = DrainConfig::default();

    assert_eq!(config.max_depth, 4);
    assert_eq!(config.max_children, 100);
    assert_eq!(config.similarity_threshold, 0.4);
    assert_eq!(config.delimiters, " \t");
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_builder() {
    let config = DrainConfig::new()
        .with_max_depth(6)
        .with_max_children(50)
        .with_similarity_threshold(0.7)
        .with_delimiters(" ,");

    assert_eq!(config.max_depth, 6);
    assert_eq!(config.max_children, 50);
    assert_eq!(config.similarity_threshold, 0.7);
    assert_eq!(config.delimiters, " ,");
}

#[test]
fn test_additional_delimiters_are_deduplicated() {
    let config = DrainConfig::new().with_additional_delimiters("_ =_");
    assert_eq!(config.delimiters, " \t_=");
}

#[test]
fn test_prefix_len() {
    let config = DrainConfig::new().with_max_depth(4);
    assert_eq!(config.prefix_len(0), 0);
    assert_eq!(config.prefix_len(1), 1);
    assert_eq!(config.prefix_len(2), 2);
    assert_eq!(config.prefix_len(3), 3);
    assert_eq!(config.prefix_len(10), 3);

    let config = DrainConfig::new().with_max_depth(2);
    assert_eq!(config.prefix_len(10), 1);
}

#[test]
fn test_validation_threshold_out_of_range() {
    for threshold in [-0.1, 1.01, f64::NAN, f64::INFINITY] {
        let config = DrainConfig::new().with_similarity_threshold(threshold);
        let result = config.validate();
        assert!(result.is_err(), "threshold {threshold} should be rejected");
        assert!(result.unwrap_err().contains("similarity_threshold"));
    }
}

#[test]
fn test_validation_threshold_bounds_inclusive() {
    assert!(DrainConfig::new().with_similarity_threshold(0.0).validate().is_ok());
    assert!(DrainConfig::new().with_similarity_threshold(1.0).validate().is_ok());
}

#[test]
fn test_validation_max_depth() {
    let result = DrainConfig::new().with_max_depth(1).validate();
    assert!(result.unwrap_err().contains("max_depth"));

    assert!(DrainConfig::new().with_max_depth(2).validate().is_ok());
}

#[test]
fn test_validation_max_children() {
    let result = DrainConfig::new().with_max_children(0).validate();
    assert!(result.unwrap_err().contains("max_children"));
}

#[test]
fn test_deserialize_partial_uses_defaults() {
    let config: DrainConfig = serde_json::from_str(r#"{"max_depth": 5}"#).unwrap();
    assert_eq!(config.max_depth, 5);
    assert_eq!(config.max_children, 100);
    assert_eq!(config.delimiters, " \t");
}
