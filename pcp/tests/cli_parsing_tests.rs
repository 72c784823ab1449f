//! CLI Argument Parsing Compatibility Tests for pcp
//!
//! These tests verify that command-line arguments are parsed correctly and maintain
//! backward compatibility. Most of them append `--help` so that only parsing is exercised.

use assert_cmd::Command;

#[test]
fn test_help_runs() {
    Command::cargo_bin("pcp")
        .unwrap()
        .arg("--help")
        .assert()
        .success();
}

#[test]
fn test_version_runs() {
    Command::cargo_bin("pcp")
        .unwrap()
        .arg("--version")
        .assert()
        .success();
}

#[test]
fn test_missing_arguments_fail() {
    Command::cargo_bin("pcp").unwrap().assert().failure();
    Command::cargo_bin("pcp")
        .unwrap()
        .arg("only-source")
        .assert()
        .failure();
}

// ============================================================================
// Copy options
// ============================================================================

#[test]
fn test_parts_long_and_short() {
    for flag in ["--parts", "-p"] {
        Command::cargo_bin("pcp")
            .unwrap()
            .args([flag, "8", "--help"])
            .assert()
            .success();
    }
}

#[test]
fn test_zero_parts_rejected() {
    Command::cargo_bin("pcp")
        .unwrap()
        .args(["--parts", "0", "src", "dst"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("--parts"));
}

#[test]
fn test_non_numeric_parts_rejected() {
    Command::cargo_bin("pcp")
        .unwrap()
        .args(["--parts", "many", "src", "dst"])
        .assert()
        .failure();
}

#[test]
fn test_block_size_formats() {
    for size in ["1048576", "64KiB", "4MiB", "1GiB"] {
        Command::cargo_bin("pcp")
            .unwrap()
            .args(["--block-size", size, "--help"])
            .assert()
            .success();
    }
}

#[test]
fn test_invalid_block_size_rejected() {
    Command::cargo_bin("pcp")
        .unwrap()
        .args(["--block-size", "lots", "src", "dst"])
        .assert()
        .failure();
}

#[test]
fn test_poll_interval_formats() {
    for interval in ["500ms", "1s", "2min"] {
        Command::cargo_bin("pcp")
            .unwrap()
            .args(["--poll-interval", interval, "--help"])
            .assert()
            .success();
    }
}

#[test]
fn test_invalid_poll_interval_rejected() {
    Command::cargo_bin("pcp")
        .unwrap()
        .args(["--poll-interval", "often", "src", "dst"])
        .assert()
        .failure();
}

// ============================================================================
// Progress & output
// ============================================================================

#[test]
fn test_progress_types() {
    for progress_type in ["auto", "progress-bar", "text-updates"] {
        Command::cargo_bin("pcp")
            .unwrap()
            .args(["--progress-type", progress_type, "--help"])
            .assert()
            .success();
    }
}

#[test]
fn test_invalid_progress_type_rejected() {
    Command::cargo_bin("pcp")
        .unwrap()
        .args(["--progress-type", "fireworks", "src", "dst"])
        .assert()
        .failure();
}

#[test]
fn test_verbose_levels() {
    for flags in [vec!["-v"], vec!["-vv"], vec!["-vvv"], vec!["-v", "-v"]] {
        let mut args = flags.clone();
        args.push("--help");
        Command::cargo_bin("pcp")
            .unwrap()
            .args(args)
            .assert()
            .success();
    }
}

#[test]
fn test_output_flags() {
    for flag in ["--progress", "--summary", "--quiet", "-q"] {
        Command::cargo_bin("pcp")
            .unwrap()
            .args([flag, "--help"])
            .assert()
            .success();
    }
}

// ============================================================================
// Advanced settings
// ============================================================================

#[test]
fn test_runtime_settings() {
    Command::cargo_bin("pcp")
        .unwrap()
        .args([
            "--max-workers",
            "4",
            "--max-blocking-threads",
            "16",
            "--help",
        ])
        .assert()
        .success();
}
