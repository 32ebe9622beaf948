//! CLI regression tests for the `parapet` binary.
//!
//! These tests invoke the binary as a subprocess to catch regressions in flag
//! names, exit codes, and output formats.
//!
//! Run with: `cargo test -p parapet-test`
//! Requires the `parapet` binary to be built first (`cargo build -p parapet`).

use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

use crate::fixture;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Returns an assert_cmd Command wrapping the `parapet` binary.
fn parapet() -> Command {
    // cargo_bin is deprecated for custom build-dir setups; fine for standard workspace use.
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("parapet")
        .expect("parapet binary not found, run `cargo build -p parapet` first");
    cmd.env_remove("PARAPET_BACKEND").env_remove("RUST_LOG");
    cmd
}

// ---------------------------------------------------------------------------
// parapet validate
// ---------------------------------------------------------------------------

#[test]
fn validate_valid_spec_exits_zero() {
    parapet()
        .args(["validate", "--spec"])
        .arg(fixture("petstore.yaml"))
        .assert()
        .success()
        .stderr(contains("is valid"))
        .stderr(contains("openapi-spec-validator"));
}

#[test]
fn validate_with_each_backend() {
    for backend in ["flex", "swagger-spec-validator", "openapi-spec-validator"] {
        parapet()
            .args(["validate", "--backend", backend, "--spec"])
            .arg(fixture("petstore.yaml"))
            .assert()
            .success();
    }
}

#[test]
fn validate_unknown_backend_exits_two() {
    parapet()
        .args(["validate", "--backend", "does_not_exist", "--spec"])
        .arg(fixture("petstore.yaml"))
        .assert()
        .failure()
        .code(2)
        .stderr(contains("E1005"));
}

#[test]
fn validate_backend_from_env() {
    parapet()
        .env("PARAPET_BACKEND", "does_not_exist")
        .args(["validate", "--spec"])
        .arg(fixture("petstore.yaml"))
        .assert()
        .code(2);
}

#[test]
fn validate_missing_reference_exits_one() {
    parapet()
        .args(["validate", "--spec"])
        .arg(fixture("missing_reference.yaml"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("E1003"));
}

#[test]
fn validate_missing_file_exits_one() {
    parapet()
        .args(["validate", "--spec", "this-file-does-not-exist.yaml"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("E1000"));
}

#[test]
fn validate_integer_keys_strict_vs_lenient() {
    parapet()
        .args(["validate", "--spec"])
        .arg(fixture("issue_5.yaml"))
        .assert()
        .code(1)
        .stderr(contains("E1006"));

    parapet()
        .args(["validate", "--lenient", "--spec"])
        .arg(fixture("issue_5.yaml"))
        .assert()
        .success();

    parapet()
        .args(["validate", "--backend", "flex", "--spec"])
        .arg(fixture("issue_5.yaml"))
        .assert()
        .success();
}

#[test]
fn validate_json_output_reports_version_on_failure() {
    let output = parapet()
        .args(["validate", "--lenient", "--format", "json", "--spec"])
        .arg(fixture("issue_20.yaml"))
        .arg("--spec")
        .arg(fixture("petstore.yaml"))
        .assert()
        .code(1)
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["summary"]["total"], 2);
    assert_eq!(report["summary"]["invalid"], 1);

    let broken = &report["results"][0];
    assert_eq!(broken["valid"], false);
    assert_eq!(broken["version"], "OpenAPI 3.0.0");
    assert_eq!(broken["errors"][0]["code"], "E1004");

    let petstore = &report["results"][1];
    assert_eq!(petstore["valid"], true);
    assert_eq!(petstore["backend"], "openapi-spec-validator");
}

// ---------------------------------------------------------------------------
// parapet normalize
// ---------------------------------------------------------------------------

#[test]
fn normalize_stringifies_keys() {
    let output = parapet()
        .args(["normalize", "--spec"])
        .arg(fixture("issue_5.yaml"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let spec: serde_yaml::Value = serde_yaml::from_slice(&output).unwrap();
    let responses = spec["paths"]["/test"]["post"]["responses"]
        .as_mapping()
        .unwrap();
    assert!(responses.contains_key("200"));
}

#[test]
fn normalized_output_validates_strictly() {
    let dir = TempDir::new().unwrap();
    let normalized = dir.path().join("issue_5.normalized.yaml");

    let output = parapet()
        .args(["normalize", "--spec"])
        .arg(fixture("issue_5.yaml"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    std::fs::write(&normalized, output).unwrap();

    parapet()
        .args(["validate", "--backend", "swagger-spec-validator", "--spec"])
        .arg(&normalized)
        .assert()
        .success();
}

#[test]
fn normalize_warns_about_shadowed_keys() {
    let dir = TempDir::new().unwrap();
    let spec = dir.path().join("duplicate.yaml");
    std::fs::write(
        &spec,
        "responses:\n  200:\n    description: integer\n  \"200\":\n    description: string\n",
    )
    .unwrap();

    let output = parapet()
        .args(["normalize", "--spec"])
        .arg(&spec)
        .assert()
        .success()
        .stderr(contains("/responses: dropped integer key 200"))
        .get_output()
        .stdout
        .clone();

    let normalized: serde_yaml::Value = serde_yaml::from_slice(&output).unwrap();
    assert_eq!(normalized["responses"]["200"]["description"], "string");
}

// ---------------------------------------------------------------------------
// parapet backends
// ---------------------------------------------------------------------------

#[test]
fn backends_lists_registry() {
    parapet()
        .arg("backends")
        .assert()
        .success()
        .stdout(contains("flex"))
        .stdout(contains("swagger-spec-validator"))
        .stdout(contains("openapi-spec-validator (default)"));
}

#[test]
fn backends_json() {
    let output = parapet()
        .args(["backends", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let backends: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(backends.as_array().unwrap().len(), 3);
    assert_eq!(backends[0]["name"], "flex");
    assert_eq!(backends[0]["strict_keys"], false);
}

#[test]
fn invalid_log_format_exits_two() {
    parapet()
        .args(["--log-format", "xml", "backends"])
        .assert()
        .code(2);
}
