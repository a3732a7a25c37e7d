//! Integration tests: run the `ldaplog` binary against the fixture logs.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

const ACCESS_LOG: &str = "tests/fixtures/access.log";
const ERROR_LOG: &str = "tests/fixtures/error.log";
const AUDIT_LOG: &str = "tests/fixtures/audit.log";

/// Writes a config file into a per-test directory so the binary never touches the
/// user's config or state directories.
fn config_for(test: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ldaplog-cli-{}-{test}", std::process::id()));
    fs::create_dir_all(&dir).expect("create temp dir");
    let log_path = dir.join("ldaplog.log");
    let config = dir.join("config.toml");
    fs::write(
        &config,
        format!("log_file_path = {:?}\n", log_path.to_string_lossy()),
    )
    .expect("write config");
    config
}

fn ldaplog(test: &str, args: &[&str]) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_ldaplog"));
    command
        .arg("--config")
        .arg(config_for(test))
        .args(args)
        .env_remove("LDAPLOG_PEPPER")
        .env_remove("LDAPLOG_CONFIG");
    command
}

fn run_with_stdin(mut command: Command, input: &str) -> Output {
    let mut child = command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn binary");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input.as_bytes())
        .expect("write stdin");
    child.wait_with_output().expect("wait for binary")
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn binary_prints_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_ldaplog"))
        .arg("--version")
        .output()
        .expect("Failed to execute binary");

    let stdout = stdout_of(&output);
    assert!(
        stdout.contains(env!("CARGO_PKG_VERSION")),
        "Expected output to contain version, but got: {}",
        stdout
    );
}

#[test]
fn parse_reproduces_access_log() {
    let output = ldaplog("parse_access", &["parse", ACCESS_LOG])
        .output()
        .expect("Failed to execute binary");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let expected = fs::read_to_string(ACCESS_LOG).expect("read fixture");
    assert_eq!(stdout_of(&output), expected);
}

#[test]
fn parse_reproduces_error_log() {
    let output = ldaplog("parse_error", &["parse", ERROR_LOG, "--kind", "error"])
        .output()
        .expect("Failed to execute binary");

    assert!(output.status.success());
    let expected = fs::read_to_string(ERROR_LOG).expect("read fixture");
    assert_eq!(stdout_of(&output), expected);
}

#[test]
fn parse_reproduces_audit_records() {
    let output = ldaplog("parse_audit", &["parse", AUDIT_LOG, "--kind", "audit"])
        .output()
        .expect("Failed to execute binary");

    assert!(output.status.success());
    // Every record, the last one included, is followed by a blank line.
    let expected = fs::read_to_string(AUDIT_LOG).expect("read fixture") + "\n";
    assert_eq!(stdout_of(&output), expected);
}

#[test]
fn parse_json_prints_one_object_per_line() {
    let output = ldaplog("parse_json", &["parse", ACCESS_LOG, "--json"])
        .output()
        .expect("Failed to execute binary");

    assert!(output.status.success());
    let stdout = stdout_of(&output);
    let objects: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line is JSON"))
        .collect();
    assert_eq!(objects.len(), 11);
    assert_eq!(objects[0]["timestamp"], "24/Aug/2018:12:11:49.812 -0500");
    assert_eq!(objects[0]["unnamed"], serde_json::json!(["CONNECT"]));
    assert_eq!(objects[4]["fields"]["entriesReturned"], "1");
    assert_eq!(objects[5]["fields"]["uncachedDataAccessed"], "true");
    assert_eq!(objects[10]["fields"], serde_json::json!({}));
}

#[test]
fn redact_replaces_selected_fields_only() {
    let output = ldaplog(
        "redact",
        &["redact", ACCESS_LOG, "--redact", "dn,filter,authDN"],
    )
    .output()
    .expect("Failed to execute binary");

    assert!(output.status.success());
    let stdout = stdout_of(&output);
    assert!(stdout.contains(r#"dn="{REDACTED}""#));
    assert!(stdout.contains(r#"filter="{REDACTED}""#));
    assert!(!stdout.contains("Directory Manager,cn=Root DNs"));
    assert!(!stdout.contains("uid=jdoe"));
    assert!(stdout.contains(r#"base="ou=People,dc=example,dc=com""#));
    assert_eq!(stdout.lines().count(), 11);
}

#[test]
fn redact_components_keeps_dn_structure() {
    let output = ldaplog(
        "redact_components",
        &["redact", ACCESS_LOG, "--redact", "base", "--components"],
    )
    .output()
    .expect("Failed to execute binary");

    assert!(output.status.success());
    assert!(stdout_of(&output)
        .contains(r#"base="ou={REDACTED},dc={REDACTED},dc={REDACTED}""#));
}

#[test]
fn tokenize_uses_pepper_from_environment() {
    let output = ldaplog("tokenize", &["redact", ACCESS_LOG, "--tokenize", "filter"])
        .env("LDAPLOG_PEPPER", "cli-test-pepper")
        .output()
        .expect("Failed to execute binary");

    assert!(output.status.success());
    let token = ldaplog::tokenization::tokenize(
        b"(&(objectClass=person)(uid=jdoe))",
        b"cli-test-pepper",
    );
    let stdout = stdout_of(&output);
    assert!(stdout.contains(&format!(r#"filter="{token}""#)));
    assert!(!stdout.contains("cli-test-pepper"));
}

#[test]
fn tokenize_without_pepper_fails() {
    let output = ldaplog("no_pepper", &["redact", ACCESS_LOG, "--tokenize", "filter"])
        .output()
        .expect("Failed to execute binary");

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr).to_lowercase();
    assert!(stderr.contains("pepper"), "stderr: {stderr}");
}

#[test]
fn redact_audit_record_from_stdin() {
    let input = fs::read_to_string(AUDIT_LOG).expect("read fixture");
    let output = run_with_stdin(
        ldaplog(
            "audit_stdin",
            &["redact", "--kind", "audit", "--redact", "uid,cn"],
        ),
        &input,
    );

    assert!(output.status.success());
    let stdout = stdout_of(&output);
    assert!(stdout.contains("# uid: {REDACTED}"));
    assert!(stdout.contains("cn: {REDACTED}"));
    assert!(!stdout.contains("jsmith\n"));
    assert!(!stdout.contains("Jörg"));
}

#[test]
fn malformed_lines_are_skipped_by_default() {
    let output = run_with_stdin(
        ldaplog("skip_malformed", &["parse"]),
        "garbage\n[24/Aug/2018:12:11:50 -0500] CONNECT conn=1\n",
    );

    assert!(output.status.success());
    assert_eq!(
        stdout_of(&output),
        "[24/Aug/2018:12:11:50 -0500] CONNECT conn=1\n"
    );
}

#[test]
fn strict_mode_fails_on_malformed_line() {
    let output = run_with_stdin(
        ldaplog("strict", &["parse", "--strict"]),
        "garbage\n[24/Aug/2018:12:11:50 -0500] CONNECT conn=1\n",
    );

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn missing_input_file_fails() {
    let output = ldaplog("missing_file", &["parse", "tests/fixtures/does-not-exist.log"])
        .output()
        .expect("Failed to execute binary");

    assert!(!output.status.success());
}

#[test]
fn skipped_lines_are_reported_on_stderr_without_log_file() {
    let dir = std::env::temp_dir().join(format!("ldaplog-cli-{}-stderr", std::process::id()));
    fs::create_dir_all(&dir).expect("create temp dir");
    let config = dir.join("config.toml");
    fs::write(&config, "").expect("write config");

    let mut command = Command::new(env!("CARGO_BIN_EXE_ldaplog"));
    command
        .arg("--config")
        .arg(&config)
        .arg("parse")
        .env_remove("LDAPLOG_PEPPER")
        .env_remove("RUST_LOG");
    let output = run_with_stdin(command, "garbage\n[24/Aug/2018:12:11:50 -0500] CONNECT conn=1\n");

    assert!(output.status.success());
    assert_eq!(stdout_of(&output), "[24/Aug/2018:12:11:50 -0500] CONNECT conn=1\n");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("skipping malformed record"), "stderr: {stderr}");
}
