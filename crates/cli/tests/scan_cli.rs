#![forbid(unsafe_code)]

use std::process::{Command, Output};
use tempfile::tempdir;

fn scapscan() -> Command {
    Command::new(env!("CARGO_BIN_EXE_scapscan"))
}

fn combined(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).to_string();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text
}

#[test]
fn unreachable_target_fails_the_run() {
    let out_dir = tempdir().unwrap();

    let output = scapscan()
        .args([
            "scan",
            "--targets",
            "chroot:///scapscan-test/does-not-exist",
            "--output",
        ])
        .arg(out_dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(combined(&output).contains("failed"));
    // The failed target produced no result files.
    assert_eq!(std::fs::read_dir(out_dir.path()).unwrap().count(), 0);
}

#[test]
fn run_with_all_scans_disabled_succeeds() {
    let out_dir = tempdir().unwrap();

    let output = scapscan()
        .args([
            "-v",
            "scan",
            "--targets",
            "localhost",
            "--no-cve-scan",
            "--no-standard-compliance",
            "--output",
        ])
        .arg(out_dir.path())
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", combined(&output));
    assert!(combined(&output).contains("scan finished"));
    assert_eq!(std::fs::read_dir(out_dir.path()).unwrap().count(), 0);
}

#[test]
fn missing_output_directory_is_a_usage_error() {
    let output = scapscan()
        .args([
            "scan",
            "--targets",
            "localhost",
            "--output",
            "/scapscan-test/no-such-dir",
        ])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(combined(&output).contains("Output directory not found"));
}

#[test]
fn unknown_target_scheme_is_rejected() {
    let out_dir = tempdir().unwrap();

    let output = scapscan()
        .args(["scan", "--targets", "docker://fedora", "--output"])
        .arg(out_dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(combined(&output).contains("invalid target descriptor"));
}
