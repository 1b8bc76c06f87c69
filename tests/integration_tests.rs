//! Integration tests for the okr CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get an okr command isolated from the caller's environment
fn okr(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("okr").unwrap();
    cmd.current_dir(tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path().join("xdg"))
        .env("HOME", tmp.path())
        .env("OKR_OWNER", "Test Owner")
        .env_remove("OKR_REMOTE_DATABASE")
        .env_remove("OKR_STORAGE_KEY")
        .env_remove("OKR_FORMAT")
        .env_remove("OKR_WORKSPACE")
        .env_remove("OKR_LOG");
    cmd
}

/// Workspace holding the example dataset
fn setup_seeded() -> TempDir {
    let tmp = TempDir::new().unwrap();
    okr(&tmp).arg("init").assert().success();
    tmp
}

/// Workspace with no OKRs
fn setup_empty() -> TempDir {
    let tmp = TempDir::new().unwrap();
    okr(&tmp).args(["init", "--empty"]).assert().success();
    tmp
}

/// Create an OKR and return its id
fn create(tmp: &TempDir, args: &[&str]) -> String {
    let output = okr(tmp)
        .args(["new", "--format", "id"])
        .args(args)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn list_ids(tmp: &TempDir) -> Vec<String> {
    let output = okr(tmp).args(["list", "--format", "id"]).output().unwrap();
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

fn show_json(tmp: &TempDir, reference: &str) -> serde_json::Value {
    let output = okr(tmp)
        .args(["show", reference, "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

// ============================================================================
// Init
// ============================================================================

#[test]
fn test_init_creates_workspace() {
    let tmp = setup_empty();
    assert!(tmp.path().join(".okr").is_dir());
    assert!(tmp.path().join(".okr/config.yaml").is_file());
    assert!(tmp.path().join(".okr/store").is_dir());
}

#[test]
fn test_init_twice_suggests_force() {
    let tmp = setup_empty();
    okr(&tmp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("--force"));
}

#[test]
fn test_init_seeds_example_dataset() {
    let tmp = setup_seeded();
    assert_eq!(list_ids(&tmp).len(), 10);
}

#[test]
fn test_commands_outside_workspace_fail() {
    let tmp = TempDir::new().unwrap();
    okr(&tmp)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains(".okr"));
}

// ============================================================================
// New / show / list
// ============================================================================

#[test]
fn test_new_root_gets_display_id() {
    let tmp = setup_empty();
    create(&tmp, &["--objective", "Grow revenue", "--kr", "Revenue:100:250:number"]);
    let second = create(&tmp, &["--objective", "Ship platform"]);

    let json = show_json(&tmp, "OKR-2");
    assert_eq!(json["id"], second.as_str());
    assert_eq!(json["displayId"], "OKR-2");
    assert_eq!(json["owner"], "Test Owner");

    let first = show_json(&tmp, "1");
    assert_eq!(first["keyResults"][0]["metricName"], "Revenue");
    assert_eq!(first["keyResults"][0]["unit"], "number");
}

#[test]
fn test_new_child_has_no_display_id() {
    let tmp = setup_empty();
    create(&tmp, &["--objective", "Grow revenue"]);
    let child = create(&tmp, &["--objective", "Sell more", "--parent", "OKR-1", "--area", "Sales"]);

    let json = show_json(&tmp, &child);
    assert!(json.get("displayId").is_none());
    assert_eq!(json["area"], "Sales");
}

#[test]
fn test_new_after_seed_continues_numbering() {
    let tmp = setup_seeded();
    create(&tmp, &["--objective", "Fourth goal"]);
    assert_eq!(show_json(&tmp, "OKR-4")["objective"], "Fourth goal");
}

#[test]
fn test_new_with_unknown_parent_fails() {
    let tmp = setup_empty();
    okr(&tmp)
        .args(["new", "--objective", "Orphan", "--parent", "OKR-9"])
        .assert()
        .failure();
    assert!(list_ids(&tmp).is_empty());
}

#[test]
fn test_new_rejects_bad_key_result() {
    let tmp = setup_empty();
    okr(&tmp)
        .args(["new", "--objective", "Grow", "--kr", "Revenue:lots"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("METRIC:FROM:TO"));
}

#[test]
fn test_list_tree_indents_children() {
    let tmp = setup_seeded();
    okr(&tmp)
        .args(["list", "--tree", "--format", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("└ Deliver savings"));
}

#[test]
fn test_list_orders_roots_before_children() {
    let tmp = setup_seeded();
    let ids = list_ids(&tmp);
    assert_eq!(&ids[..3], &["global-1", "global-2", "global-3"]);
}

#[test]
fn test_list_filters() {
    let tmp = setup_seeded();
    let output = okr(&tmp)
        .args(["list", "--roots", "--format", "id"])
        .output()
        .unwrap();
    assert_eq!(String::from_utf8_lossy(&output.stdout).lines().count(), 3);

    let output = okr(&tmp)
        .args(["list", "--area", "gcc india", "--format", "id"])
        .output()
        .unwrap();
    assert_eq!(String::from_utf8_lossy(&output.stdout).lines().count(), 3);
}

#[test]
fn test_list_csv_has_header() {
    let tmp = setup_seeded();
    okr(&tmp)
        .args(["list", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("id,okr,objective"));
}

#[test]
fn test_search_propagates_to_parent() {
    let tmp = setup_seeded();
    okr(&tmp)
        .args(["search", "escalations", "--format", "id"])
        .assert()
        .success()
        .stdout(predicate::str::contains("global-3"))
        .stdout(predicate::str::contains("child-3-2"))
        .stdout(predicate::str::contains("global-1").not());
}

// ============================================================================
// Edit / check-in / delete
// ============================================================================

#[test]
fn test_edit_updates_fields_and_checklist() {
    let tmp = setup_empty();
    create(&tmp, &["--objective", "Grow", "--kr", "A:0:10", "--kr", "B:0:10"]);

    okr(&tmp)
        .args([
            "edit", "OKR-1", "--objective", "Grow faster", "--remove-kr", "A", "--check", "ownership",
        ])
        .assert()
        .success();

    let json = show_json(&tmp, "OKR-1");
    assert_eq!(json["objective"], "Grow faster");
    assert_eq!(json["keyResults"].as_array().unwrap().len(), 1);
    let checked: Vec<&serde_json::Value> = json["qualityChecklist"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|item| item["checked"] == true)
        .collect();
    assert_eq!(checked.len(), 1);
    assert_eq!(checked[0]["id"], "ownership");
}

#[test]
fn test_edit_cannot_move_global_okr() {
    let tmp = setup_empty();
    create(&tmp, &["--objective", "One"]);
    create(&tmp, &["--objective", "Two"]);
    okr(&tmp)
        .args(["edit", "OKR-2", "--parent", "OKR-1"])
        .assert()
        .failure();
}

#[test]
fn test_checkin_records_progress_and_actions() {
    let tmp = setup_empty();
    create(&tmp, &["--objective", "Grow", "--kr", "Revenue:0:200:number"]);

    okr(&tmp)
        .args([
            "checkin",
            "OKR-1",
            "--kr",
            "1=50",
            "--status",
            "progressing",
            "--comments",
            "Halfway there",
            "--add-action",
            "2030-01-15 Hire two AEs",
        ])
        .assert()
        .success();

    let json = show_json(&tmp, "OKR-1");
    assert_eq!(json["keyResults"][0]["current"], 50.0);
    assert_eq!(json["status"], "progressing");
    assert_eq!(json["comments"], "Halfway there");
    assert_eq!(json["actions"][0]["text"], "Hire two AEs");
    assert_eq!(json["actions"][0]["owner"], "Test Owner");

    okr(&tmp)
        .args(["checkin", "OKR-1", "--complete", "1"])
        .assert()
        .success();
    let json = show_json(&tmp, "OKR-1");
    assert_eq!(json["actions"][0]["completed"], true);
    assert!(json["actions"][0]["completedAt"].is_string());
}

#[test]
fn test_checkin_without_changes_fails() {
    let tmp = setup_empty();
    create(&tmp, &["--objective", "Grow"]);
    okr(&tmp)
        .args(["checkin", "OKR-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to record"));
}

#[test]
fn test_delete_removes_subtree() {
    let tmp = setup_seeded();
    okr(&tmp).args(["delete", "OKR-1", "--yes"]).assert().success();

    let ids = list_ids(&tmp);
    assert_eq!(ids.len(), 6);
    assert!(!ids.iter().any(|id| id == "global-1" || id.starts_with("child-1-")));
}

#[test]
fn test_delete_unknown_fails() {
    let tmp = setup_empty();
    okr(&tmp).args(["delete", "OKR-7", "--yes"]).assert().failure();
}

// ============================================================================
// Dashboard / actions
// ============================================================================

#[test]
fn test_status_json() {
    let tmp = setup_seeded();
    let output = okr(&tmp)
        .args(["status", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let dashboard = &json["dashboard"];
    assert_eq!(dashboard["mode"], "local-only");
    assert_eq!(dashboard["global"], 3);
    assert_eq!(dashboard["area"], 7);
    assert_eq!(dashboard["rag"]["on_track"], 1);
    assert_eq!(dashboard["rag"]["progressing"], 2);
    assert_eq!(dashboard["rag"]["off_track"], 0);
}

#[test]
fn test_status_dashboard_renders() {
    let tmp = setup_seeded();
    okr(&tmp)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("On Track"))
        .stdout(predicate::str::contains("Overdue"));
}

#[test]
fn test_actions_lists_seed_actions() {
    let tmp = setup_seeded();
    let output = okr(&tmp)
        .args(["actions", "--format", "json"])
        .output()
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 4);
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn test_config_set_and_show() {
    let tmp = setup_empty();
    okr(&tmp)
        .args(["config", "set", "default_format", "json"])
        .assert()
        .success();
    okr(&tmp)
        .args(["config", "show", "default_format"])
        .assert()
        .success()
        .stdout(predicate::str::contains("json"));

    // default_format now applies to list
    okr(&tmp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("["));
}

#[test]
fn test_config_rejects_unknown_key() {
    let tmp = setup_empty();
    okr(&tmp)
        .args(["config", "set", "colour", "blue"])
        .assert()
        .failure();
}

#[test]
fn test_config_unset() {
    let tmp = setup_empty();
    okr(&tmp).args(["config", "set", "owner", "Dana"]).assert().success();
    okr(&tmp).args(["config", "unset", "owner"]).assert().success();
    let content = fs::read_to_string(tmp.path().join(".okr/config.yaml")).unwrap();
    assert!(!content.contains("Dana"));
}

// ============================================================================
// Shared database
// ============================================================================

#[test]
fn test_remote_workspace_round_trip() {
    let tmp = TempDir::new().unwrap();
    okr(&tmp)
        .args(["init", "--empty", "--remote", "shared.db"])
        .assert()
        .success();
    assert!(tmp.path().join("shared.db").exists());

    create(&tmp, &["--objective", "Shared goal", "--kr", "Metric:0:10"]);
    let json = show_json(&tmp, "OKR-1");
    assert_eq!(json["objective"], "Shared goal");

    okr(&tmp)
        .args(["status", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("remote-active"));
}

#[test]
fn test_two_workspaces_share_one_database() {
    let shared = TempDir::new().unwrap();
    let db = shared.path().join("team.db");
    let db = db.to_str().unwrap();

    let alice = TempDir::new().unwrap();
    okr(&alice).args(["init", "--empty", "--remote", db]).assert().success();
    let bob = TempDir::new().unwrap();
    okr(&bob).args(["init", "--empty", "--remote", db]).assert().success();

    let id = create(&alice, &["--objective", "Written by Alice"]);
    assert_eq!(list_ids(&bob), vec![id]);
}

#[test]
fn test_watch_requires_shared_database() {
    let tmp = setup_empty();
    okr(&tmp)
        .args(["watch", "--count", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("local-only"));
}

#[test]
fn test_completions() {
    let tmp = TempDir::new().unwrap();
    okr(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("okr"));
}
