//! Integration tests for the halbind CLI
//!
//! These run the actual binary. Network-touching paths are exercised only
//! up to the fatal bootstrap check, which by contract fires before any
//! request goes out.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get the binary to test
fn halbind_cmd() -> Command {
    let mut cmd = Command::cargo_bin("halbind").unwrap();
    // Keep the environment's key from leaking into bootstrap resolution.
    cmd.env_remove("HALBIND_API_KEY");
    cmd
}

fn write_manifest(dir: &TempDir, name: &str, yaml: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, yaml).unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn help_flag() {
    halbind_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "declarative hypermedia data binding",
        ));
}

// ============================================================================
// validate
// ============================================================================

#[test]
fn validate_valid_manifest() {
    let dir = TempDir::new().unwrap();
    let file = write_manifest(
        &dir,
        "page.yaml",
        r#"
schema: halbind/page@0.1

api:
  key: k

entity:
  type: group
  id: "109"

bindings:
  - expression: name
    targets: [title]
  - expression: chairs ${name}
    targets: [chairs-list]
"#,
    );

    halbind_cmd()
        .args(["validate", &file])
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"))
        .stdout(predicate::str::contains("Bindings: 2"));
}

#[test]
fn validate_rejects_wrong_schema() {
    let dir = TempDir::new().unwrap();
    let file = write_manifest(&dir, "page.yaml", "schema: other/page@9\nbindings: []\n");

    halbind_cmd()
        .args(["validate", &file])
        .assert()
        .failure()
        .stderr(predicate::str::contains("HB-010"))
        .stderr(predicate::str::contains("halbind/page@0.1"));
}

#[test]
fn validate_rejects_invalid_expression() {
    let dir = TempDir::new().unwrap();
    let file = write_manifest(
        &dir,
        "page.yaml",
        r#"
schema: halbind/page@0.1
bindings:
  - expression: "..bad"
    targets: [slot]
"#,
    );

    halbind_cmd()
        .args(["validate", &file])
        .assert()
        .failure()
        .stderr(predicate::str::contains("HB-020"));
}

#[test]
fn validate_missing_file() {
    halbind_cmd()
        .args(["validate", "/nonexistent/page.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

// ============================================================================
// render: fatal bootstrap path (fires before any network)
// ============================================================================

#[test]
fn render_without_entity_id_is_fatal_with_echo() {
    let dir = TempDir::new().unwrap();
    let file = write_manifest(
        &dir,
        "page.yaml",
        r#"
schema: halbind/page@0.1
api:
  key: visible-key
entity:
  type: group
bindings:
  - expression: name
    targets: [title]
"#,
    );

    halbind_cmd()
        .args(["render", &file])
        .assert()
        .failure()
        .stderr(predicate::str::contains("HB-001"))
        .stderr(predicate::str::contains("visible-key"))
        .stderr(predicate::str::contains("entity_id=None"))
        .stderr(predicate::str::contains("Fix:"));
}

#[test]
fn render_without_api_key_is_fatal() {
    let dir = TempDir::new().unwrap();
    let file = write_manifest(
        &dir,
        "page.yaml",
        r#"
schema: halbind/page@0.1
entity:
  type: user
  id: "u1"
bindings: []
"#,
    );

    halbind_cmd()
        .args(["render", &file])
        .assert()
        .failure()
        .stderr(predicate::str::contains("HB-001"));
}

#[test]
fn render_key_override_reaches_bootstrap() {
    let dir = TempDir::new().unwrap();
    // Key passed on the command line, entity id still missing: the echoed
    // bootstrap shows the override, proving it was applied before failure.
    let file = write_manifest(
        &dir,
        "page.yaml",
        r#"
schema: halbind/page@0.1
entity:
  type: group
bindings: []
"#,
    );

    halbind_cmd()
        .args(["render", &file, "--key", "cli-key"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cli-key"));
}
