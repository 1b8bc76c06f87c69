//! Cascade parity between the local and shared stores
//!
//! The local store deletes a subtree by rewriting its blob; the shared store
//! issues one DELETE and relies on foreign-key cascades. Both must end in the
//! same state for any tree shape.

use chrono::NaiveDate;
use okr::entities::{checklist_with, Action, KeyResult, Okr, QualityCheck};
use okr::store::{LocalStore, MemoryKeyValueStore, OkrStore, RemoteStore};

fn node(id: &str, parent: Option<&str>, display: Option<&str>) -> Okr {
    let mut okr = match parent {
        Some(parent) => Okr::child_of(parent, format!("Objective {}", id)),
        None => Okr::new(format!("Objective {}", id)),
    };
    okr.id = id.to_string();
    okr.display_id = display.map(str::to_string);
    okr.area = parent.map(|_| format!("Area {}", id));
    okr.key_results = vec![
        KeyResult::new(format!("{} metric A", id), 0.0, 10.0).with_current(4.0),
        KeyResult::new(format!("{} metric B", id), 5.0, 1.0),
    ];
    okr.actions = vec![Action::new(
        format!("Follow up on {}", id),
        "Owner",
        NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
    )];
    okr.quality_checklist = checklist_with(&[QualityCheck::Direction, QualityCheck::Cascading]);
    okr
}

/// r1 ─ a ─ a1 ─ a1x
///    │     └ a2
///    └ b
/// r2 ─ c ─ c1
fn forest() -> Vec<Okr> {
    vec![
        node("r1", None, Some("OKR-1")),
        node("r2", None, Some("OKR-2")),
        node("a", Some("r1"), None),
        node("b", Some("r1"), None),
        node("c", Some("r2"), None),
        node("a1", Some("a"), None),
        node("a2", Some("a"), None),
        node("c1", Some("c"), None),
        node("a1x", Some("a1"), None),
    ]
}

fn stores() -> (LocalStore<MemoryKeyValueStore>, RemoteStore) {
    let mut local = LocalStore::new(MemoryKeyValueStore::new(), "okrs").without_seed();
    let mut remote = RemoteStore::open_in_memory().unwrap();
    for okr in forest() {
        local.create(&okr).unwrap();
        remote.create(&okr).unwrap();
    }
    (local, remote)
}

fn ids(okrs: &[Okr]) -> Vec<&str> {
    okrs.iter().map(|okr| okr.id.as_str()).collect()
}

#[test]
fn test_stores_agree_before_any_delete() {
    let (mut local, mut remote) = stores();
    assert_eq!(local.read_all().unwrap(), remote.read_all().unwrap());
}

#[test]
fn test_every_delete_target_ends_in_same_state() {
    for target in forest() {
        let (mut local, mut remote) = stores();
        local.remove(&target.id).unwrap();
        remote.remove(&target.id).unwrap();

        let local_okrs = local.read_all().unwrap();
        let remote_okrs = remote.read_all().unwrap();
        assert_eq!(
            local_okrs, remote_okrs,
            "stores diverged after deleting {}",
            target.id
        );
        assert!(!ids(&local_okrs).contains(&target.id.as_str()));
    }
}

#[test]
fn test_deleting_root_removes_three_levels() {
    let (mut local, mut remote) = stores();
    local.remove("r1").unwrap();
    remote.remove("r1").unwrap();

    let remaining = remote.read_all().unwrap();
    assert_eq!(ids(&remaining), vec!["r2", "c", "c1"]);
    assert_eq!(local.read_all().unwrap(), remaining);
}

#[test]
fn test_sequential_deletes_stay_in_step() {
    let (mut local, mut remote) = stores();
    for target in ["a1", "c", "missing", "r1"] {
        local.remove(target).unwrap();
        remote.remove(target).unwrap();
        assert_eq!(local.read_all().unwrap(), remote.read_all().unwrap());
    }
    assert_eq!(ids(&remote.read_all().unwrap()), vec!["r2"]);
}

#[test]
fn test_replace_after_partial_delete_matches() {
    let (mut local, mut remote) = stores();
    local.remove("a1").unwrap();
    remote.remove("a1").unwrap();

    let mut updated = local
        .read_all()
        .unwrap()
        .into_iter()
        .find(|okr| okr.id == "a")
        .unwrap();
    updated.key_results.pop();
    updated.actions.clear();
    local.replace(&updated).unwrap();
    remote.replace(&updated).unwrap();

    assert_eq!(local.read_all().unwrap(), remote.read_all().unwrap());
}

#[test]
fn test_replace_with_new_creation_time_matches() {
    let (mut local, mut remote) = stores();
    let original = local
        .read_all()
        .unwrap()
        .into_iter()
        .find(|okr| okr.id == "b")
        .unwrap();

    let mut backdated = original.clone();
    backdated.created_at = chrono::DateTime::from_timestamp(978_307_200, 0).unwrap();
    backdated.objective = "Renamed".to_string();
    local.replace(&backdated).unwrap();
    remote.replace(&backdated).unwrap();

    let local_okrs = local.read_all().unwrap();
    assert_eq!(local_okrs, remote.read_all().unwrap());
    let stored = local_okrs.iter().find(|okr| okr.id == "b").unwrap();
    assert_eq!(stored.objective, "Renamed");
    assert_eq!(stored.created_at, original.created_at);
}

#[test]
fn test_empty_optional_strings_match() {
    let (mut local, mut remote) = stores();
    let mut blank = node("blank", Some("r2"), None);
    blank.area = Some(String::new());
    blank.owner = Some(String::new());
    blank.challenges = Some(String::new());
    blank.key_results[1].function = Some(String::new());
    local.create(&blank).unwrap();
    remote.create(&blank).unwrap();

    let local_okrs = local.read_all().unwrap();
    assert_eq!(local_okrs, remote.read_all().unwrap());
    assert!(local_okrs.contains(&blank));
}
