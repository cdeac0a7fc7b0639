//! CLI integration tests.
//!
//! These tests verify the CLI argument parsing and configuration loading.

use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

use cmdr::cli::{parse_args_from, Args};
use cmdr::config::{Config, ConfigError};
use cmdr::{Param, Runner};

fn args(args: &[&str]) -> Vec<OsString> {
    std::iter::once("cmdr")
        .chain(args.iter().copied())
        .map(OsString::from)
        .collect()
}

fn write_config(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

// ============================================================================
// CLI Argument Tests
// ============================================================================

#[test]
fn test_cli_defaults() {
    let result = parse_args_from(args(&[])).unwrap();

    assert!(result.program.is_none());
    assert!(result.name.is_none());
    assert!(result.config.is_none());
    assert!(result.timeout.is_none());
    assert!(!result.json);
}

#[test]
fn test_cli_full_options() {
    let result = parse_args_from(args(&[
        "ls",
        "-A",
        "-l {{WHAT}} [{{EVER}}]",
        "-p",
        "WHAT=*.go",
        "-d",
        "/srv",
        "-l",
        "debug",
        "--async",
        "-j",
    ]))
    .unwrap();

    assert_eq!(result.program.as_deref(), Some("ls"));
    assert_eq!(result.arg_template.as_deref(), Some("-l {{WHAT}} [{{EVER}}]"));
    assert_eq!(result.params, vec![Param::named("WHAT", "*.go")]);
    assert_eq!(result.working_dir, Some(PathBuf::from("/srv")));
    assert_eq!(result.log_level.as_deref(), Some("debug"));
    assert!(result.asynchronous);
    assert!(result.json);
}

#[test]
fn test_cli_invalid_timeout() {
    assert!(parse_args_from(args(&["-t", "never"])).is_err());
}

// ============================================================================
// Configuration Tests
// ============================================================================

#[test]
fn test_config_load_with_args() {
    let file = write_config(
        r#"{
            "logging": { "level": "info" },
            "templates": { "greet": { "path": "echo", "args": "hello {{WHO}}" } }
        }"#,
    );

    let args = Args {
        config: Some(file.path().to_path_buf()),
        log_level: Some("trace".to_string()),
        ..Args::default()
    };

    let config = Config::load(&args).unwrap();
    assert_eq!(config.log_filter(), "trace");
    assert_eq!(config.template("greet").unwrap().path, "echo");
}

#[test]
fn test_config_missing_file() {
    let args = Args {
        config: Some(PathBuf::from("/cmdr/no/such/config.json")),
        ..Args::default()
    };

    assert!(matches!(Config::load(&args), Err(ConfigError::Io(_))));
}

#[test]
fn test_catalog_template_runs() {
    let file = write_config(
        r#"{ "templates": { "greet": { "path": "echo", "args": "hello {{WHO}} [{{TAIL}}]" } } }"#,
    );
    let parsed = parse_args_from(args(&[
        "-c",
        file.path().to_str().unwrap(),
        "-n",
        "greet",
        "-p",
        "WHO=world",
        "-a",
        "again",
    ]))
    .unwrap();

    let config = Config::load(&parsed).unwrap();
    let template = config.command_for(&parsed).unwrap();
    let result = Runner::new().run(&template, &parsed.params).unwrap();

    assert_eq!(result.stdout, "hello world again\n");
}
