// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Binary-level smoke tests.
#![allow(clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn cli(config_dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("replay-cli").unwrap();
    cmd.arg("--config-dir").arg(config_dir);
    cmd
}

#[test]
fn hash_prints_keccak_of_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("hello.txt");
    std::fs::write(&file, b"hello world").unwrap();
    cli(dir.path())
        .arg("hash")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "0x47173285a8d7341e5e972fc677286384f802f8ef42a5ec5f03bbfa254cb01fad",
        ));
}

#[test]
fn config_init_writes_defaults() {
    let dir = tempfile::tempdir().unwrap();
    cli(dir.path())
        .args(["config", "--init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"channel_policy\": \"ignore\""));
    let written = std::fs::read_to_string(dir.path().join("engine.json")).unwrap();
    assert!(written.contains("\"reject_empty_roots\": true"));
    assert!(written.contains("\"state_codec\": \"identity\""));
}

#[test]
fn configured_gas_changes_cost() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("engine.json"), br#"{"gas": {"get_preimage_size": 7}}"#).unwrap();
    let hash = "00".repeat(32);
    // getPreimageSize(bytes32)
    let payload = format!("{}{hash}", hex_selector("getPreimageSize(bytes32)"));
    cli(dir.path())
        .args(["cost", payload.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("required_cost: 7"));
}

#[test]
fn bad_event_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let root = "11".repeat(32);
    cli(dir.path())
        .args(["encode-run", "--static", root.as_str(), "--dynamic", root.as_str(), "--event", "0:sideways:1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("press must be true/false"));
}

fn hex_selector(signature: &str) -> String {
    replay_abi::selector_hex(&replay_abi::selector(signature))
}
