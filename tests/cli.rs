//! End-to-end tests for the `duet` binary.
//!
//! Each test writes source files into a temp directory and runs the binary
//! there, so `duet.toml` discovery sees only what the test put down.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

const SERVICE: &str = r#"package demo;

// counts down and replies
function main(int n) (int) {
    while (n > 0) {
        n = n - 1;
        if (n == 3) {
            break;
        }
    }
    reply n;
}
"#;

/// Run duet in `dir` and capture (stdout, stderr, exit code).
fn run_duet(dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::cargo_bin("duet")
        .expect("duet binary")
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to execute duet");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

fn workspace(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    for (name, text) in files {
        fs::write(dir.path().join(name), text).expect("write fixture");
    }
    dir
}

fn json(stdout: &str) -> Value {
    serde_json::from_str(stdout).unwrap_or_else(|e| panic!("invalid JSON ({e}): {stdout}"))
}

// ============================================================================
// fmt
// ============================================================================

#[test]
fn fmt_prints_canonical_source() {
    let dir = workspace(&[("main.bal", "function f(){ if(a){x=1;} }")]);
    let (stdout, _, code) = run_duet(dir.path(), &["fmt", "main.bal"]);
    assert_eq!(code, 0);
    assert_eq!(stdout, "function f() {\n    if (a) {\n        x = 1;\n    }\n}\n");
}

#[test]
fn fmt_is_stable_on_canonical_input() {
    let dir = workspace(&[("main.bal", SERVICE)]);
    let (stdout, _, code) = run_duet(dir.path(), &["fmt", "main.bal", "--format", "json"]);
    assert_eq!(code, 0);
    let response = json(&stdout);
    assert_eq!(response["status"], "ok");
    assert_eq!(response["changed"], false);
    assert_eq!(response["source"], SERVICE);
}

// ============================================================================
// outline / dump
// ============================================================================

#[test]
fn outline_json_and_text() {
    let dir = workspace(&[("main.bal", SERVICE)]);
    let (stdout, _, code) = run_duet(dir.path(), &["outline", "main.bal"]);
    assert_eq!(code, 0);
    let response = json(&stdout);
    assert_eq!(response["schema_version"], "1");
    assert_eq!(response["outline"]["label"], "package demo");
    assert_eq!(response["outline"]["children"][1]["label"], "function main(int n) (int)");

    let (text, _, code) = run_duet(
        dir.path(),
        &["outline", "main.bal", "--format", "text", "--collapse", "while"],
    );
    assert_eq!(code, 0);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[3].starts_with("    while (n > 0) ["));
    assert!(lines[3].ends_with("(+2)"));
}

#[test]
fn outline_collapse_from_config() {
    let dir = workspace(&[
        ("main.bal", SERVICE),
        ("duet.toml", "[outline]\ncollapse = [\"function\"]\n"),
    ]);
    let (stdout, _, code) = run_duet(dir.path(), &["outline", "main.bal"]);
    assert_eq!(code, 0);
    let response = json(&stdout);
    assert_eq!(response["outline"]["children"][1]["collapsed"], true);
    assert_eq!(response["summary"]["skipped"], 1);
}

#[test]
fn dump_snapshot() {
    let dir = workspace(&[("main.bal", "function f() { return; }")]);
    let (stdout, _, code) = run_duet(dir.path(), &["dump", "main.bal"]);
    assert_eq!(code, 0);
    let response = json(&stdout);
    assert_eq!(response["nodes"], 3);
    assert_eq!(response["tree"]["data"]["kind"], "compilation_unit");
    assert_eq!(response["tree"]["children"][0]["data"]["name"], "f");
}

// ============================================================================
// check
// ============================================================================

#[test]
fn check_clean_file_exits_zero() {
    let dir = workspace(&[("main.bal", SERVICE)]);
    let (stdout, _, code) = run_duet(dir.path(), &["check", "main.bal"]);
    assert_eq!(code, 0);
    assert_eq!(json(&stdout)["status"], "ok");
}

#[test]
fn check_findings_exit_five() {
    let source = "function f() {\n    return;\n    x = 1;\n}\n";
    let dir = workspace(&[("main.bal", source)]);
    let (stdout, _, code) = run_duet(dir.path(), &["check", "main.bal"]);
    assert_eq!(code, 5);
    let response = json(&stdout);
    assert_eq!(response["status"], "findings");
    assert_eq!(response["findings"][0]["rule"], "unreachable-code");

    let (_, _, code) = run_duet(
        dir.path(),
        &["check", "main.bal", "--disable", "unreachable-code"],
    );
    assert_eq!(code, 0);
}

#[test]
fn check_max_depth_flag_overrides_config() {
    let dir = workspace(&[
        ("main.bal", SERVICE),
        ("duet.toml", "[lint]\nmax_depth = 5\n"),
    ]);
    let (stdout, _, code) = run_duet(
        dir.path(),
        &["check", "main.bal", "--max-depth", "1", "--format", "text"],
    );
    assert_eq!(code, 5);
    assert!(stdout.contains("[max-depth]"), "{stdout}");
}

// ============================================================================
// errors
// ============================================================================

#[test]
fn parse_error_exits_three_with_location() {
    let dir = workspace(&[("bad.bal", "function f() {\n    x = ;\n}\n")]);
    let (stdout, _, code) = run_duet(dir.path(), &["fmt", "bad.bal"]);
    assert_eq!(code, 3);
    let response = json(&stdout);
    assert_eq!(response["status"], "error");
    assert_eq!(response["error"]["code"], 3);
    assert_eq!(response["error"]["location"]["file"], "bad.bal");
    assert_eq!(response["error"]["location"]["line"], 2);
    assert_eq!(response["error"]["location"]["col"], 9);
}

#[test]
fn missing_file_exits_two() {
    let dir = workspace(&[]);
    let (stdout, _, code) = run_duet(dir.path(), &["dump", "absent.bal"]);
    assert_eq!(code, 2);
    assert_eq!(json(&stdout)["error"]["code"], 2);
}

#[test]
fn bad_config_exits_two() {
    let dir = workspace(&[
        ("main.bal", SERVICE),
        ("duet.toml", "[lint]\ncolour = true\n"),
    ]);
    let (stdout, _, code) = run_duet(dir.path(), &["check", "main.bal"]);
    assert_eq!(code, 2);
    let message = json(&stdout)["error"]["message"].as_str().unwrap_or_default().to_string();
    assert!(message.contains("duet.toml"), "{message}");

    let (_, _, code) = run_duet(
        dir.path(),
        &["--config", "missing.toml", "outline", "main.bal"],
    );
    assert_eq!(code, 2);
}

#[test]
fn unknown_collapse_kind_is_rejected() {
    let dir = workspace(&[("main.bal", SERVICE)]);
    let (_, stderr, code) = run_duet(dir.path(), &["outline", "main.bal", "--collapse", "loop"]);
    assert_eq!(code, 2);
    assert!(!stderr.is_empty());
}
