//! Integration tests driving the `skyview` binary.
//!
//! None of these reach the network: they cover argument handling and the
//! paths that short-circuit before any HTTP request.

use std::{path::Path, process::Command};

/// Helper to run the CLI with given args against a throwaway config file.
fn run_cli(config: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_skyview"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env("SKYVIEW_API_KEY", "TEST_KEY")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute skyview")
}

#[test]
fn test_help_lists_subcommands() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_cli(&dir.path().join("config.toml"), &["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for sub in ["configure", "search", "show", "here", "interactive"] {
        assert!(stdout.contains(sub), "help should mention {sub}: {stdout}");
    }
}

#[test]
fn test_one_character_search_needs_no_network() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_cli(&dir.path().join("config.toml"), &["search", "L"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("at least 2 characters"), "stdout: {stdout}");
}

#[test]
fn test_show_rejects_short_city_name() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_cli(&dir.path().join("config.toml"), &["show", "X"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("at least 2 characters"), "stderr: {stderr}");
}

#[test]
fn test_here_with_denied_location_reports_permission_message() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "[location]\nallow = false\n").unwrap();

    let output = run_cli(&config, &["here"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Please allow location access"), "stderr: {stderr}");
}

#[test]
fn test_here_without_coordinates_reports_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_cli(&dir.path().join("config.toml"), &["here"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Geolocation is not available"), "stderr: {stderr}");
}

#[test]
fn test_lat_requires_lon() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_cli(&dir.path().join("config.toml"), &["here", "--lat", "10"]);

    assert!(!output.status.success());
}

#[test]
fn test_malformed_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "this is not toml = = =").unwrap();

    let output = run_cli(&config, &["search", "Berlin"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to parse config file"), "stderr: {stderr}");
}
