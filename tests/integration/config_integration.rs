//! Integration tests for configuration loading and command routing

use clap::Parser;
use multiverse::cli::{Cli, RunContext};
use multiverse::config::{ConfigLoader, TagBackend, WORKSPACE_CONFIG_FILE};
use multiverse::error::ApiError;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use super::test_utils::write_files;

fn write_workspace_config(workspace: &Path, remote_dir: &Path, backend: &str) {
    fs::write(
        workspace.join(WORKSPACE_CONFIG_FILE),
        format!(
            r#"
default_remote = "local"

[remotes.local]
path = '{}'
tags = "{}"
"#,
            remote_dir.display(),
            backend
        ),
    )
    .unwrap();
}

fn run(context: &RunContext, args: &[&str]) -> Result<String, ApiError> {
    let mut argv = vec!["multi"];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).unwrap();
    context.execute(&cli.command)
}

#[test]
fn test_workspace_config_selects_path_remote() {
    let workspace = TempDir::new().unwrap();
    let remote_dir = TempDir::new().unwrap();
    write_workspace_config(workspace.path(), remote_dir.path(), "sled");

    let config = ConfigLoader::load_layers(None, workspace.path()).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.default_remote.as_deref(), Some("local"));

    let (name, remote) = config.resolve_remote(None).unwrap();
    assert_eq!(name, "local");
    assert_eq!(remote.tags, TagBackend::Sled);
    assert_eq!(remote.path.as_deref(), Some(remote_dir.path()));
}

#[test]
fn test_invalid_remote_is_reported_before_any_work() {
    let workspace = TempDir::new().unwrap();
    fs::write(
        workspace.path().join(WORKSPACE_CONFIG_FILE),
        r#"
[remotes.broken]
path = "/tmp/somewhere"
url = "localhost:1"
"#,
    )
    .unwrap();

    let config = ConfigLoader::load_layers(None, workspace.path()).unwrap();
    assert!(config.validate().is_err());

    let context = RunContext::from_config(config, None);
    let ws = workspace.path().to_string_lossy().to_string();
    assert!(matches!(
        run(&context, &["status", &ws]),
        Err(ApiError::ConfigError(_))
    ));
}

#[test]
fn test_push_tag_pull_through_cli_routes() {
    let workspace = TempDir::new().unwrap();
    let remote_dir = TempDir::new().unwrap();
    write_files(workspace.path(), &[("a.txt", "hello"), ("b/c.txt", "world")]);
    write_workspace_config(workspace.path(), remote_dir.path(), "file");

    let config = ConfigLoader::load_layers(None, workspace.path()).unwrap();
    let context = RunContext::from_config(config, None);
    let ws = workspace.path().to_string_lossy().to_string();

    let pushed = run(&context, &["push", &ws, "--tag", "main"]).unwrap();
    assert!(pushed.contains("Tagged: main"), "{}", pushed);

    let status = run(&context, &["status", &ws]).unwrap();
    assert!(status.lines().all(|line| line.contains(" ✓ ")), "{}", status);

    let target = TempDir::new().unwrap();
    let checkout = target.path().join("checkout");
    let checkout_str = checkout.to_string_lossy().to_string();
    run(&context, &["pull", "main", &checkout_str]).unwrap();
    assert_eq!(fs::read_to_string(checkout.join("b/c.txt")).unwrap(), "world");

    let diff = run(&context, &["diff", "main", &checkout_str]).unwrap();
    assert_eq!(diff, "No changes");

    let listed = run(&context, &["tag", "list", "--format", "json"]).unwrap();
    assert!(listed.contains("\"main\""), "{}", listed);
}

#[test]
fn test_unknown_remote_flag() {
    let workspace = TempDir::new().unwrap();
    let remote_dir = TempDir::new().unwrap();
    write_workspace_config(workspace.path(), remote_dir.path(), "file");

    let config = ConfigLoader::load_layers(None, workspace.path()).unwrap();
    let context = RunContext::from_config(config, Some("elsewhere".to_string()));
    let ws = workspace.path().to_string_lossy().to_string();

    assert!(matches!(
        run(&context, &["status", &ws]),
        Err(ApiError::UnknownRemote(name)) if name == "elsewhere"
    ));
}
