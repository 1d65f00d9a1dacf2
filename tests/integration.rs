//! Integration tests for iocsync.
//!
//! These drive the compiled binary. None of them require network access:
//! the sync paths exercised here fail on configuration before any request
//! is made.

use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Helper to get the path to the compiled binary
fn get_binary_path() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // Remove test binary name
    path.pop(); // Remove deps directory
    path.push("iocsync");
    path
}

/// Run iocsync in the given directory and return output
fn run_iocsync(dir: &TempDir, args: &[&str]) -> Output {
    Command::new(get_binary_path())
        .args(args)
        .current_dir(dir.path())
        .env_remove("OTX_API_KEY")
        .output()
        .expect("Failed to execute iocsync")
}

#[test]
fn test_version_command() {
    let dir = TempDir::new().unwrap();
    let output = run_iocsync(&dir, &["version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("iocsync"));
}

#[test]
fn test_help_command() {
    let dir = TempDir::new().unwrap();
    let output = run_iocsync(&dir, &["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("sync"));
    assert!(stdout.contains("status"));
    assert!(stdout.contains("check"));
}

#[test]
fn test_sync_without_credential_fails_cleanly() {
    let dir = TempDir::new().unwrap();
    let output = run_iocsync(&dir, &["sync"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("OTX_API_KEY"),
        "Expected credential error, got: {}",
        stderr
    );
    // Nothing was written before the failure
    assert!(!dir.path().join("iocs").join("otx_ipv4.csv").exists());
}

#[test]
fn test_sync_unknown_feed_fails() {
    let dir = TempDir::new().unwrap();
    let output = run_iocsync(&dir, &["sync", "--feed", "no-such-feed"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown feed"), "got: {}", stderr);
}

#[test]
fn test_sync_invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("iocsync.yaml"), "feeds: {not: [valid").unwrap();

    let output = run_iocsync(&dir, &["sync"]);
    assert!(!output.status.success());
}

#[test]
fn test_sync_rejects_http_feed_url() {
    let dir = TempDir::new().unwrap();
    let config = "feeds:\n  - name: insecure\n    url: http://feeds.example.com/export\n    api_key_env: EXAMPLE_KEY\n";
    std::fs::write(dir.path().join("iocsync.yaml"), config).unwrap();

    let output = run_iocsync(&dir, &["sync"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("HTTPS"), "got: {}", stderr);
}

#[test]
fn test_status_on_fresh_directory() {
    let dir = TempDir::new().unwrap();
    let output = run_iocsync(&dir, &["status"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("IOCSYNC STORE STATISTICS"));
    assert!(stdout.contains("Last sync: never"));
}

#[test]
fn test_check_invalid_ip_fails() {
    let dir = TempDir::new().unwrap();
    let output = run_iocsync(&dir, &["check", "not-an-ip"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not-an-ip"), "got: {}", stderr);
}

#[test]
fn test_check_unknown_ip_reports_not_recorded() {
    let dir = TempDir::new().unwrap();
    let output = run_iocsync(&dir, &["check", "203.0.113.7"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("NOT recorded"));
}

#[test]
fn test_check_finds_ip_in_existing_store() {
    let dir = TempDir::new().unwrap();
    let iocs = dir.path().join("iocs");
    std::fs::create_dir_all(&iocs).unwrap();
    std::fs::write(iocs.join("otx_ipv4.csv"), "IndicatorValue\n203.0.113.7\n").unwrap();

    let output = run_iocsync(&dir, &["check", "203.0.113.7"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("recorded in: otx_ipv4"), "got: {}", stdout);
}

#[test]
fn test_status_counts_existing_store() {
    let dir = TempDir::new().unwrap();
    let iocs = dir.path().join("iocs");
    std::fs::create_dir_all(&iocs).unwrap();
    std::fs::write(
        iocs.join("otx_ipv4.csv"),
        "IndicatorValue\n1.1.1.1\n2.2.2.2\n3.3.3.3\n",
    )
    .unwrap();

    let output = run_iocsync(&dir, &["status"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("otx_ipv4"));
    assert!(stdout.contains('3'));
}
