//! One-way migrations for the local blob
//!
//! Each migration upgrades the stored hierarchy from `to - 1` to `to`. They
//! run in order, at most once per stored version, and never downgrade.

use std::collections::HashMap;

use tracing::debug;

use crate::store::seed::seed_okrs;
use crate::store::StoreError;
use crate::entities::Okr;

/// Version written alongside freshly saved blobs
pub const CURRENT_VERSION: u32 = 3;

struct Migration {
    to: u32,
    name: &'static str,
    apply: fn(&mut [Okr]) -> Result<usize, StoreError>,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        to: 2,
        name: "backfill status from seed",
        apply: backfill_status_from_seed,
    },
    Migration {
        to: 3,
        name: "strip display ids from area OKRs",
        apply: strip_child_display_ids,
    },
];

/// What a migration run changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationReport {
    pub from: u32,
    pub to: u32,
    /// OKRs touched across all applied migrations
    pub changed: usize,
}

/// Apply every migration newer than `from`
pub fn migrate(okrs: &mut [Okr], from: u32) -> Result<MigrationReport, StoreError> {
    let mut changed = 0;
    let mut version = from;

    for migration in MIGRATIONS.iter().filter(|m| m.to > from) {
        let touched = (migration.apply)(okrs)?;
        debug!(to = migration.to, name = migration.name, touched, "applied migration");
        changed += touched;
        version = migration.to;
    }

    Ok(MigrationReport {
        from,
        to: version.max(from),
        changed,
    })
}

// OKRs stored before `status` existed pick it up from the seed they came from
fn backfill_status_from_seed(okrs: &mut [Okr]) -> Result<usize, StoreError> {
    let seed = seed_okrs()?;
    let statuses: HashMap<&str, _> = seed
        .iter()
        .filter_map(|okr| okr.status.map(|status| (okr.id.as_str(), status)))
        .collect();

    let mut touched = 0;
    for okr in okrs.iter_mut().filter(|okr| okr.status.is_none()) {
        if let Some(&status) = statuses.get(okr.id.as_str()) {
            okr.status = Some(status);
            touched += 1;
        }
    }
    Ok(touched)
}

fn strip_child_display_ids(okrs: &mut [Okr]) -> Result<usize, StoreError> {
    let mut touched = 0;
    for okr in okrs.iter_mut().filter(|okr| !okr.is_root()) {
        if okr.display_id.take().is_some() {
            touched += 1;
        }
    }
    Ok(touched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::Status;

    #[test]
    fn test_backfill_only_fills_missing_seed_statuses() {
        let mut seeded = seed_okrs().unwrap();
        let expected = seeded[0].status;
        assert!(expected.is_some());
        seeded[0].status = None;
        seeded[1].status = Some(Status::OffTrack);
        let untouched_before = seeded[1].status;

        let mut foreign = Okr::new("User created");
        foreign.status = None;
        seeded.push(foreign);

        let report = migrate(&mut seeded, 1).unwrap();
        assert_eq!(report.from, 1);
        assert_eq!(report.to, CURRENT_VERSION);
        assert_eq!(seeded[0].status, expected);
        assert_eq!(seeded[1].status, untouched_before);
        assert_eq!(seeded.last().unwrap().status, None);
    }

    #[test]
    fn test_migrate_from_current_is_noop() {
        let mut okrs = vec![Okr::new("A")];
        let report = migrate(&mut okrs, CURRENT_VERSION).unwrap();
        assert_eq!(report.changed, 0);
        assert_eq!(report.to, CURRENT_VERSION);
    }

    #[test]
    fn test_migrate_from_v2_only_runs_later_steps() {
        let mut seeded = seed_okrs().unwrap();
        seeded[0].status = None;
        let mut child = Okr::child_of(&seeded[0].id, "Child");
        child.display_id = Some("OKR-77".to_string());
        seeded.push(child);

        let report = migrate(&mut seeded, 2).unwrap();
        assert_eq!(report.changed, 1);
        assert_eq!(seeded[0].status, None);
        assert_eq!(seeded.last().unwrap().display_id, None);
    }
}
