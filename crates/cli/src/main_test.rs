use super::*;
use clap::CommandFactory;
use tempfile::TempDir;

#[test]
fn test_cli_definition() {
    Cli::command().debug_assert();
}

#[test]
fn test_global_args_after_subcommand() {
    let cli = Cli::try_parse_from([
        "drain",
        "show",
        "state.json",
        "--config",
        "drain.toml",
        "-l",
        "debug",
    ])
    .unwrap();

    assert_eq!(cli.config, Some(PathBuf::from("drain.toml")));
    assert_eq!(cli.log_level.as_deref(), Some("debug"));
    assert!(matches!(cli.command, Command::Show(_)));
}

#[test]
fn test_subcommand_required() {
    assert!(Cli::try_parse_from(["drain"]).is_err());
}

#[test]
fn test_resolve_log_level() {
    let mut config = Config::default();
    assert_eq!(resolve_log_level(None, &config), "info");

    config.log.level = config::LogLevel::Warn;
    assert_eq!(resolve_log_level(None, &config), "warn");
    assert_eq!(resolve_log_level(Some("trace"), &config), "trace");
}

#[test]
fn test_load_config() {
    assert_eq!(load_config(None).unwrap(), Config::default());

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("drain.toml");
    std::fs::write(&path, "[drain]\nmax_depth = 6\n").unwrap();
    assert_eq!(load_config(Some(path.as_path())).unwrap().drain.max_depth, 6);

    // Named but missing is an error
    assert!(load_config(Some(dir.path().join("missing.toml").as_path())).is_err());
}
