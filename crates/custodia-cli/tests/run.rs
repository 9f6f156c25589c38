//! Driving parsed command lines through `run`.

#![allow(clippy::unwrap_used)]

use clap::Parser;
use custodia_cli::{Cli, CliError, run};
use custodia_core::CustodiaConfig;

fn run_args(args: &[&str]) -> Result<String, CliError> {
    let cli = Cli::try_parse_from(args).unwrap();
    let mut out = Vec::new();
    run(&cli, &CustodiaConfig::default(), &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

#[test]
fn test_permissions_by_value() {
    let text = run_args(&["custodia", "permissions", "--role", "2"]).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "create projects: action:create projects",
            "edit projects: action:edit projects",
            "view projects: action:view projects",
        ]
    );
}

#[test]
fn test_workflow_archived() {
    let text = run_args(&["custodia", "workflow", "--state", "archived"]).unwrap();
    assert_eq!(text, "restore\n");
}

#[test]
fn test_workflow_unknown_state_fails() {
    let err = run_args(&["custodia", "workflow", "-s", "lost"]).unwrap_err();
    assert!(err.to_string().contains("lost"));
}

#[test]
fn test_config_init_then_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let path = path.to_str().unwrap();

    let text = run_args(&["custodia", "--config", path, "config", "init"]).unwrap();
    assert_eq!(text, format!("Config file created at {path}\n"));

    let err = run_args(&["custodia", "--config", path, "config", "init"]).unwrap_err();
    assert!(matches!(err, CliError::Core(_)));

    let text = run_args(&["custodia", "--config", path, "config", "path"]).unwrap();
    assert_eq!(text, format!("{path}\n"));
}
