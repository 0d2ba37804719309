//! Tests for the show command

use super::*;
use clap::Parser;
use drain_core::DrainConfig;
use tempfile::TempDir;

#[derive(Parser, Debug)]
struct TestCli {
    #[command(flatten)]
    args: ShowArgs,
}

#[test]
fn test_parse_args() {
    let cli = TestCli::try_parse_from(["show", "state.json", "--top", "5", "-o", "compact"]).unwrap();

    assert_eq!(cli.args.state, PathBuf::from("state.json"));
    assert_eq!(cli.args.top, Some(5));
    assert_eq!(cli.args.format, Format::Compact);
    assert!(!cli.args.no_color);
}

#[test]
fn test_load_saved_state() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");

    let mut drain = Drain::new(DrainConfig::new().with_max_depth(5)).unwrap();
    drain.process("user 5 login ok");
    drain.process("user 7 login ok");
    drain.process("disk full");
    SnapshotStore::new(&path).save(&drain.snapshot()).unwrap();

    let loaded = load(&path).unwrap();
    assert_eq!(loaded.config().max_depth, 5);
    assert_eq!(loaded.clusters(), drain.clusters());
}

#[test]
fn test_load_missing_state() {
    let dir = TempDir::new().unwrap();
    let err = load(&dir.path().join("missing.json")).unwrap_err();

    assert!(err.to_string().contains("does not exist"));
}

#[test]
fn test_load_corrupt_state() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, "{\"version\": 1}").unwrap();

    let err = load(&path).unwrap_err();
    assert!(err.to_string().starts_with("failed to load state"));
}
