// The cargo_bin! macro requires build script setup that's overkill for simple tests.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_help_flag() {
    let mut cmd = std::process::Command::new(cargo_bin("claimguard"));
    let output = cmd.arg("--help").output().expect("failed to execute");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("--scenario"));
}

#[test]
fn test_replays_scenario_events() {
    let output = Command::new(cargo_bin("claimguard"))
        .arg("--scenario")
        .arg(fixture("border_skirmish.json"))
        .output()
        .expect("failed to execute");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let verdicts: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(verdicts.len(), 4);

    // Enemy in the wilderness hitting a resident in a peaceful zone
    assert_eq!(verdicts[0]["cancelled"], true);
    assert_eq!(verdicts[0]["rule"], "defender_zone_pvp");

    // Both inside the PvP zone
    assert_eq!(verdicts[1]["cancelled"], false);
    assert!(verdicts[1]["rule"].is_null());

    // Townmates
    assert_eq!(verdicts[2]["rule"], "friendly_fire");
    assert!(verdicts[2]["message"].is_string());

    // Outsider hitting a cow in someone else's town
    assert_eq!(verdicts[3]["rule"], "protected_entity");
}

#[test]
fn test_settings_file_overrides_defaults() {
    let dir = std::env::temp_dir().join(format!("claimguard-cli-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let settings = dir.join("settings.json");
    std::fs::write(&settings, r#"{ "protected_entity_types": ["Villager"] }"#).unwrap();

    let output = Command::new(cargo_bin("claimguard"))
        .arg("--scenario")
        .arg(fixture("border_skirmish.json"))
        .arg("--settings")
        .arg(&settings)
        .output()
        .expect("failed to execute");

    assert!(output.status.success());
    let last = String::from_utf8_lossy(&output.stdout)
        .lines()
        .last()
        .map(str::to_string)
        .unwrap();
    // Cows are no longer protected
    assert!(last.contains(r#""cancelled":false"#), "got {}", last);
}

#[test]
fn test_invalid_settings_rejected() {
    let dir = std::env::temp_dir().join(format!("claimguard-cli-bad-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let settings = dir.join("settings.json");
    std::fs::write(&settings, r#"{ "zone_size": 0 }"#).unwrap();

    Command::new(cargo_bin("claimguard"))
        .arg("--scenario")
        .arg(fixture("border_skirmish.json"))
        .arg("--settings")
        .arg(&settings)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid settings"));
}

#[test]
fn test_missing_scenario_fails() {
    Command::new(cargo_bin("claimguard"))
        .arg("--scenario")
        .arg("/nonexistent/scenario.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read scenario"));
}
