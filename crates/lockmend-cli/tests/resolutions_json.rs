//! Integration tests for `lockmend resolutions`.

use std::fs;
use std::process::Command;

const LOCK: &str = "\"app@workspace:.\":\n  version: 0.0.0-use.local\n\n\"minimist@npm:^1.2.0\":\n  version: 1.2.8\n";

fn cargo_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO"));
    cmd.args(["run", "-p", "lockmend-cli", "--bin", "lockmend", "--"]);
    cmd
}

#[test]
fn test_consistent_resolutions() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("yarn.lock"), LOCK).unwrap();
    fs::write(
        dir.path().join("package.json"),
        r#"{"name": "app", "resolutions": {"minimist@^1.2.0": "^1.2.6"}}"#,
    )
    .unwrap();

    let output = cargo_bin()
        .arg("--cwd")
        .arg(dir.path())
        .args(["--json", "resolutions"])
        .output()
        .expect("Failed to run lockmend");

    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON");
    assert_eq!(json["ok"], true);
    assert_eq!(json["resolutions"], serde_json::json!([]));
}

#[test]
fn test_flagged_resolutions() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("yarn.lock"), LOCK).unwrap();
    fs::write(
        dir.path().join("package.json"),
        r#"{"resolutions": {"minimist": "^1.2.6", "left-pad@^1.0.0": "1.3.0"}}"#,
    )
    .unwrap();

    let output = cargo_bin()
        .arg("--cwd")
        .arg(dir.path())
        .args(["--json", "resolutions"])
        .output()
        .expect("Failed to run lockmend");

    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON");
    assert_eq!(json["ok"], false);

    let kinds: Vec<_> = json["resolutions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| (d["kind"].as_str().unwrap(), d["key"].as_str().unwrap()))
        .collect();
    assert_eq!(
        kinds,
        vec![("superfluous", "left-pad@^1.0.0"), ("unrestricted", "minimist")]
    );
}
