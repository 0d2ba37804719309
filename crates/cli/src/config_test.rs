//! Tests for the configuration file

use super::*;
use std::str::FromStr;
use tempfile::TempDir;

#[test]
fn test_empty_config_uses_defaults() {
    let config = Config::from_str("").unwrap();

    assert_eq!(config, Config::default());
    assert_eq!(config.drain, DrainSection::default());
    assert_eq!(config.tail.lines, "10");
    assert_eq!(config.tail.poll_interval_ms, 250);
    assert_eq!(config.funnel.channel_capacity, 10_000);
    assert_eq!(config.funnel.checkpoint_interval_secs, 30);
    assert_eq!(config.log.level, LogLevel::Info);
    assert_eq!(config.log.format, LogFormat::Console);
}

#[test]
fn test_full_config() {
    let toml = r#"
[drain]
max_depth = 5
max_children = 50
similarity_threshold = 0.6
delimiters = " \t_"

[tail]
lines = "+1"
poll_interval_ms = 100

[funnel]
channel_capacity = 500
checkpoint_interval_secs = 5
progress_every = 1000

[log]
level = "debug"
format = "json"
"#;
    let config = Config::from_str(toml).unwrap();

    assert_eq!(config.drain.max_depth, 5);
    assert_eq!(config.drain.max_children, 50);
    assert_eq!(config.drain.similarity_threshold, 0.6);
    assert_eq!(config.drain.delimiters, " \t_");
    assert_eq!(config.tail.from_line(), FromLine::beginning());
    assert_eq!(config.funnel.progress_every, 1000);
    assert_eq!(config.log.level, LogLevel::Debug);
    assert_eq!(config.log.format, LogFormat::Json);
}

#[test]
fn test_partial_section_keeps_other_defaults() {
    let config = Config::from_str("[drain]\nsimilarity_threshold = 0.7\n").unwrap();

    assert_eq!(config.drain.similarity_threshold, 0.7);
    assert_eq!(config.drain.max_depth, 4);
    assert_eq!(config.drain.max_children, 100);
    assert_eq!(config.drain.delimiters, " \t_");
}

#[test]
fn test_mining_splits_on_underscore_by_default() {
    let engine = DrainSection::default().engine_config();
    assert_eq!(engine.delimiters, " \t_");
    assert_eq!(engine.max_depth, DrainConfig::default().max_depth);

    let mut drain = drain_core::Drain::new(engine).unwrap();
    drain.process("session_41 opened");
    let result = drain.process("session_42 opened");

    assert!(!result.is_new);
    assert_eq!(result.template_string(), "session <*> opened");
}

#[test]
fn test_delimiters_can_drop_underscore() {
    let config = Config::from_str("[drain]\ndelimiters = \" \"\n").unwrap();
    let mut drain = drain_core::Drain::new(config.drain.engine_config()).unwrap();

    // The whole identifier is one token, so the session prefix is lost
    drain.process("session_41 opened");
    let result = drain.process("session_42 opened");
    assert_eq!(result.template_string(), "<*> opened");
}

#[test]
fn test_invalid_drain_section() {
    let result = Config::from_str("[drain]\nsimilarity_threshold = 1.5\n");
    assert!(matches!(
        result,
        Err(ConfigError::InvalidSection { section: "drain", .. })
    ));

    let result = Config::from_str("[drain]\nmax_depth = 1\n");
    assert!(matches!(
        result,
        Err(ConfigError::InvalidSection { section: "drain", .. })
    ));
}

#[test]
fn test_invalid_tail_lines() {
    let result = Config::from_str("[tail]\nlines = \"-5\"\n");
    assert!(matches!(
        result,
        Err(ConfigError::InvalidValue {
            section: "tail",
            field: "lines",
            ..
        })
    ));
}

#[test]
fn test_zero_values_rejected() {
    for (toml, field) in [
        ("[tail]\npoll_interval_ms = 0\n", "poll_interval_ms"),
        ("[funnel]\nchannel_capacity = 0\n", "channel_capacity"),
        ("[funnel]\ncheckpoint_interval_secs = 0\n", "checkpoint_interval_secs"),
        ("[funnel]\nprogress_every = 0\n", "progress_every"),
    ] {
        match Config::from_str(toml) {
            Err(ConfigError::InvalidValue { field: f, .. }) => assert_eq!(f, field),
            other => panic!("expected invalid {field}, got {other:?}"),
        }
    }
}

#[test]
fn test_parse_error() {
    let result = Config::from_str("[drain\nmax_depth = ");
    assert!(matches!(result, Err(ConfigError::ParseError(_))));

    let result = Config::from_str("[log]\nlevel = \"loud\"\n");
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

#[test]
fn test_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("drain.toml");
    std::fs::write(&path, "[log]\nlevel = \"warn\"\n").unwrap();

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.log.level, LogLevel::Warn);
}

#[test]
fn test_from_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = Config::from_file(dir.path().join("missing.toml"));

    match result {
        Err(ConfigError::IoError { path, .. }) => assert!(path.ends_with("missing.toml")),
        other => panic!("expected IoError, got {other:?}"),
    }
}

#[test]
fn test_error_messages() {
    let err = Config::from_str("[funnel]\nprogress_every = 0\n").unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid value for funnel.progress_every: must be greater than 0"
    );

    let err = Config::from_str("[drain]\nmax_children = 0\n").unwrap_err();
    assert!(err.to_string().starts_with("invalid [drain] section: "));
}

#[test]
fn test_tail_options() {
    let config = Config::from_str("[tail]\nlines = \"25\"\npoll_interval_ms = 50\n").unwrap();
    let options = config.tail.options(true);

    assert_eq!(options.from_line, FromLine::last(25));
    assert!(options.follow);
    assert_eq!(options.poll_interval, Duration::from_millis(50));
}

#[test]
fn test_funnel_config() {
    let config = Config::from_str("[funnel]\ncheckpoint_interval_secs = 7\n").unwrap();
    let funnel = config.funnel.funnel_config();

    assert_eq!(funnel.checkpoint_interval, Duration::from_secs(7));
    assert_eq!(funnel.channel_capacity, 10_000);
}

#[test]
fn test_log_level_as_str() {
    assert_eq!(LogLevel::Trace.as_str(), "trace");
    assert_eq!(LogLevel::Warn.as_str(), "warn");
    assert_eq!(LogLevel::default().as_str(), "info");
}
