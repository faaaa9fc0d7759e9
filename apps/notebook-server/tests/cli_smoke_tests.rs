//! CLI smoke tests for the notebook-server binary
//!
//! These tests verify that the CLI commands work correctly, including
//! configuration validation, help output and a short live run on an
//! in-memory database.

use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout, Instant};

/// Helper to run the notebook-server binary with given arguments
fn run_notebook_server(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_notebook-server"))
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute notebook-server")
}

/// Config rooted in a temp home so nothing leaks into the user's home dir.
fn write_config(dir: &Path, name: &str, extra: &str) -> String {
    let path = dir.join(name);
    let content = format!(
        r#"
server:
  home_dir: "{home}"

logging:
  default:
    console_level: warn
    file: ""
{extra}
"#,
        home = dir.join("home").to_string_lossy().replace('\\', "/"),
    );
    std::fs::write(&path, content).expect("Failed to write config file");
    path.to_string_lossy().to_string()
}

fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .and_then(|l| l.local_addr())
        .map(|a| a.port())
        .expect("no free port")
}

/// Minimal HTTP/1.1 exchange; returns the raw response text.
async fn http(port: u16, method: &str, path: &str, body: Option<&str>) -> std::io::Result<String> {
    let mut stream = TcpStream::connect(("127.0.0.1", port)).await?;
    let body = body.unwrap_or("");
    let request = format!(
        "{method} {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\
         Content-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(request.as_bytes()).await?;
    let mut out = String::new();
    stream.read_to_string(&mut out).await?;
    Ok(out)
}

#[test]
fn test_cli_help_command() {
    let output = run_notebook_server(&["--help"]);

    assert!(output.status.success(), "Help command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("notebook-server"), "Should contain binary name");
    assert!(stdout.contains("Usage:"), "Should contain usage information");
    assert!(stdout.contains("run"), "Should contain 'run' subcommand");
    assert!(stdout.contains("check"), "Should contain 'check' subcommand");
    assert!(stdout.contains("--config"), "Should mention config option");
    assert!(stdout.contains("--mock"), "Should mention mock option");
}

#[test]
fn test_cli_version_command() {
    let output = run_notebook_server(&["--version"]);

    assert!(output.status.success(), "Version command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("notebook-server"));
    assert!(stdout.chars().any(|c| c.is_ascii_digit()));
}

#[test]
fn test_cli_invalid_command() {
    let output = run_notebook_server(&["invalid-command"]);

    assert!(!output.status.success(), "Invalid command should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error"), "Should report the bad subcommand");
}

#[test]
fn test_cli_config_validation_missing_file() {
    let output = run_notebook_server(&["--config", "/nonexistent/config.yaml", "check"]);

    assert!(!output.status.success(), "Should fail with missing config");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("config"),
        "Should mention config file issue: {}",
        stderr
    );
}

#[test]
fn test_cli_config_validation_invalid_yaml() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("invalid.yaml");
    std::fs::write(&config_path, "invalid: yaml: content: [unclosed")
        .expect("Failed to write file");

    let output = run_notebook_server(&["--config", config_path.to_str().unwrap(), "check"]);

    assert!(!output.status.success(), "Should fail with invalid YAML");
}

#[test]
fn test_cli_check_valid_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_config(
        temp_dir.path(),
        "valid.yaml",
        r#"
database:
  url: "sqlite://database/notebook.db"

modules:
  notebook:
    app_name: "notebookApp"
"#,
    );

    let output = run_notebook_server(&["--config", &config, "check"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "Should succeed with valid config: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout.contains("Configuration check passed"));
    // Relative sqlite paths are anchored in home_dir.
    assert!(stdout.contains("home/database/notebook.db"), "{}", stdout);
}

#[test]
fn test_cli_check_rejects_unknown_module_key() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_config(
        temp_dir.path(),
        "bad-module.yaml",
        r#"
database:
  url: "sqlite::memory:"

modules:
  api_ingress:
    bind_adr: "127.0.0.1:1"
"#,
    );

    let output = run_notebook_server(&["--config", &config, "check"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("api_ingress"), "{}", stderr);
}

#[test]
fn test_cli_check_rejects_invalid_bind_address() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_config(
        temp_dir.path(),
        "bad-addr.yaml",
        r#"
database:
  url: "sqlite::memory:"

modules:
  api_ingress:
    bind_addr: "not-an-address"
"#,
    );

    let output = run_notebook_server(&["--config", &config, "check"]);
    assert!(!output.status.success(), "Should fail with invalid bind address");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("address"), "{}", stderr);
}

#[test]
fn test_cli_mock_flag_overrides_database() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_config(
        temp_dir.path(),
        "mock.yaml",
        r#"
database:
  url: "mysql://localhost/nonexistent"
"#,
    );

    // Unsupported scheme fails without --mock ...
    let output = run_notebook_server(&["--config", &config, "check"]);
    assert!(!output.status.success());

    // ... and is replaced by in-memory SQLite with it.
    let output = run_notebook_server(&["--config", &config, "--mock", "check"]);
    assert!(
        output.status.success(),
        "Should succeed with mock database: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("sqlite::memory:"));
}

#[test]
fn test_cli_print_config_applies_port_override() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_config(temp_dir.path(), "print.yaml", "");

    let output = run_notebook_server(&["--config", &config, "--port", "9123", "--print-config"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("port: 9123"), "{}", stdout);
}

#[test]
fn test_cli_subcommand_help() {
    let output = run_notebook_server(&["run", "--help"]);
    assert!(output.status.success());
    let output = run_notebook_server(&["check", "--help"]);
    assert!(output.status.success());
}

#[tokio::test]
async fn test_cli_run_serves_api_with_mock_database() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_config(temp_dir.path(), "run.yaml", "");
    let port = free_port();

    let mut child = tokio::process::Command::new(env!("CARGO_BIN_EXE_notebook-server"))
        .args(["--config", &config, "--mock", "--port", &port.to_string(), "run"])
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to start notebook-server");

    // Wait until the listener is up.
    let deadline = Instant::now() + Duration::from_secs(15);
    let health = loop {
        match http(port, "GET", "/health", None).await {
            Ok(resp) => break resp,
            Err(_) if Instant::now() < deadline => sleep(Duration::from_millis(100)).await,
            Err(e) => panic!("server did not come up: {e}"),
        }
    };
    assert!(health.starts_with("HTTP/1.1 200"), "{}", health);
    assert!(health.contains("healthy"));
    assert!(health.to_ascii_lowercase().contains("x-request-id:"));

    let created = timeout(
        Duration::from_secs(5),
        http(
            port,
            "POST",
            "/api/note-books",
            Some(r#"{"name":"Trip Notes","handle":"trip01"}"#),
        ),
    )
    .await
    .expect("request timed out")
    .expect("request failed");
    assert!(created.starts_with("HTTP/1.1 201"), "{}", created);
    assert!(created
        .to_ascii_lowercase()
        .contains("x-notebookapp-alert: notebookapp.notebook.created"));

    let listed = http(port, "GET", "/api/note-books", None).await.unwrap();
    assert!(listed.contains("Trip Notes"));

    child.kill().await.expect("Failed to stop server");
}
