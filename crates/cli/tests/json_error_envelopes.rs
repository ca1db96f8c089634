//! Ensure CLI command failures honor `--output json`.

use std::fs;
use std::process::Command;

use assert_cmd::cargo;

fn bridge_cmd() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("barcode-bridge"));
    cmd.env_remove("BARCODE_BRIDGE_DB");
    cmd
}

fn envelope(stdout: &[u8]) -> serde_json::Value {
    let json: serde_json::Value = serde_json::from_slice(stdout).expect("valid json envelope");
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "command_failed");
    json
}

#[test]
fn missing_record_source_emits_json_error_envelope() {
    let output = bridge_cmd()
        .args(["price-lists", "--output", "json"])
        .output()
        .expect("run price-lists");

    assert!(!output.status.success());
    let json = envelope(&output.stdout);
    assert!(
        json["message"]
            .as_str()
            .is_some_and(|m| m.contains("--snapshot")),
        "unexpected message: {}",
        json["message"]
    );
}

#[test]
fn unreadable_snapshot_emits_json_error_envelope() {
    let output = bridge_cmd()
        .args([
            "--snapshot",
            "nope-does-not-exist.json",
            "settings",
            "--output",
            "json",
        ])
        .output()
        .expect("run settings");

    assert!(!output.status.success());
    let json = envelope(&output.stdout);
    assert!(
        json["message"]
            .as_str()
            .is_some_and(|m| m.contains("failed to read snapshot")),
        "unexpected message: {}",
        json["message"]
    );
}

#[test]
fn unknown_invoice_emits_json_error_envelope() {
    let dir = tempfile::tempdir().expect("tempdir");
    let snap = dir.path().join("empty.json");
    fs::write(&snap, "{}").expect("write snapshot");

    let output = bridge_cmd()
        .args(["--snapshot", &snap.to_string_lossy(), "--output", "json"])
        .args(["invoice-items", "PINV-404"])
        .output()
        .expect("run invoice-items");

    assert!(!output.status.success());
    let json = envelope(&output.stdout);
    assert!(
        json["message"]
            .as_str()
            .is_some_and(|m| m.contains("PINV-404")),
        "unexpected message: {}",
        json["message"]
    );
}

#[test]
fn invalid_settings_file_emits_json_error_envelope() {
    let dir = tempfile::tempdir().expect("tempdir");
    let snap = dir.path().join("empty.json");
    fs::write(&snap, "{}").expect("write snapshot");
    let settings = dir.path().join("settings.json");
    fs::write(
        &settings,
        r#"{"label_sizes": [{"label_name": "a", "print_speed": 40}]}"#,
    )
    .expect("write settings");

    let output = bridge_cmd()
        .args(["--snapshot", &snap.to_string_lossy(), "--output", "json"])
        .args(["import-settings", &settings.to_string_lossy()])
        .output()
        .expect("run import-settings");

    assert!(!output.status.success());
    let json = envelope(&output.stdout);
    assert!(
        json["message"]
            .as_str()
            .is_some_and(|m| m.contains("print_speed")),
        "unexpected message: {}",
        json["message"]
    );
    // nothing written back on failure
    assert_eq!(fs::read_to_string(&snap).expect("read snapshot"), "{}");
}
