//! Derived progress, RAG buckets and action buckets
//!
//! Nothing computed here is ever persisted; callers recompute on every read.

use chrono::NaiveDate;
use serde::Serialize;

use crate::core::entity::Status;
use crate::entities::{Action, KeyResult, Okr};

/// Progress of a key result through its `from → to` range, 0-100
pub fn key_result_progress(kr: &KeyResult) -> u8 {
    let Some(current) = kr.current else {
        return 0;
    };
    let range = kr.to - kr.from;
    if range == 0.0 {
        return 100;
    }
    let pct = ((current - kr.from) / range) * 100.0;
    if pct.is_nan() {
        return 0;
    }
    pct.clamp(0.0, 100.0).round() as u8
}

/// Rounded mean of key result progress, 0 when there are none
pub fn okr_progress(okr: &Okr) -> u8 {
    if okr.key_results.is_empty() {
        return 0;
    }
    let total: u32 = okr
        .key_results
        .iter()
        .map(|kr| u32::from(key_result_progress(kr)))
        .sum();
    (f64::from(total) / okr.key_results.len() as f64).round() as u8
}

/// Rounded mean of `okr_progress` across `okrs`, 0 when empty
pub fn average_progress<'a>(okrs: impl IntoIterator<Item = &'a Okr>) -> u8 {
    let (sum, count) = okrs
        .into_iter()
        .fold((0u32, 0u32), |(sum, count), okr| {
            (sum + u32::from(okr_progress(okr)), count + 1)
        });
    if count == 0 {
        0
    } else {
        (f64::from(sum) / f64::from(count)).round() as u8
    }
}

/// The explicit status when set; unset counts as off-track
pub fn rag_bucket(okr: &Okr) -> Status {
    okr.status.unwrap_or(Status::OffTrack)
}

/// Where an action sits relative to a calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionBucket {
    Overdue,
    Open,
    Completed,
}

impl ActionBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionBucket::Overdue => "overdue",
            ActionBucket::Open => "open",
            ActionBucket::Completed => "completed",
        }
    }
}

impl std::fmt::Display for ActionBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ActionBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "overdue" => Ok(ActionBucket::Overdue),
            "open" => Ok(ActionBucket::Open),
            "completed" | "done" => Ok(ActionBucket::Completed),
            _ => Err(format!("Unknown action bucket: {}", s)),
        }
    }
}

/// Completed wins regardless of date; otherwise overdue only when the due
/// date is strictly before `today`
pub fn action_bucket(action: &Action, today: NaiveDate) -> ActionBucket {
    if action.completed {
        ActionBucket::Completed
    } else if action.due_date < today {
        ActionBucket::Overdue
    } else {
        ActionBucket::Open
    }
}

/// Counts of root OKRs per RAG bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RagSummary {
    pub on_track: usize,
    pub progressing: usize,
    pub off_track: usize,
}

impl RagSummary {
    pub fn from_roots<'a>(okrs: impl IntoIterator<Item = &'a Okr>) -> Self {
        let mut summary = Self::default();
        for okr in okrs.into_iter().filter(|okr| okr.is_root()) {
            match rag_bucket(okr) {
                Status::OnTrack => summary.on_track += 1,
                Status::Progressing => summary.progressing += 1,
                Status::OffTrack => summary.off_track += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.on_track + self.progressing + self.off_track
    }

    pub fn count(&self, status: Status) -> usize {
        match status {
            Status::OnTrack => self.on_track,
            Status::Progressing => self.progressing,
            Status::OffTrack => self.off_track,
        }
    }
}

/// Counts of actions per bucket across every OKR
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActionSummary {
    pub overdue: usize,
    pub open: usize,
    pub completed: usize,
}

impl ActionSummary {
    pub fn collect<'a>(okrs: impl IntoIterator<Item = &'a Okr>, today: NaiveDate) -> Self {
        let mut summary = Self::default();
        for action in okrs.into_iter().flat_map(|okr| okr.actions.iter()) {
            match action_bucket(action, today) {
                ActionBucket::Overdue => summary.overdue += 1,
                ActionBucket::Open => summary.open += 1,
                ActionBucket::Completed => summary.completed += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.overdue + self.open + self.completed
    }
}
