//! Action entity type - follow-up items captured during check-ins

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::identity::new_id;

/// A follow-up item owned by someone, due on a calendar date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    /// Unique identifier
    pub id: String,

    pub text: String,

    pub owner: String,

    pub due_date: NaiveDate,

    #[serde(default)]
    pub completed: bool,

    /// Set exactly when `completed` flips to true
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

impl Action {
    pub fn new(text: impl Into<String>, owner: impl Into<String>, due_date: NaiveDate) -> Self {
        Self {
            id: new_id("act"),
            text: text.into(),
            owner: owner.into(),
            due_date,
            completed: false,
            completed_at: None,
            created_at: Utc::now(),
        }
    }

    /// Toggle completion, stamping `completed_at` only on a false → true transition
    pub fn set_completed(&mut self, completed: bool, now: DateTime<Utc>) {
        if completed && !self.completed {
            self.completed_at = Some(now);
        } else if !completed {
            self.completed_at = None;
        }
        self.completed = completed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn due() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    #[test]
    fn test_completing_stamps_time_once() {
        let mut action = Action::new("Review targets", "Deepa Abi", due());
        let first = Utc.with_ymd_and_hms(2026, 2, 1, 9, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2026, 2, 5, 9, 0, 0).unwrap();

        action.set_completed(true, first);
        assert!(action.completed);
        assert_eq!(action.completed_at, Some(first));

        // Already complete - timestamp is not moved
        action.set_completed(true, later);
        assert_eq!(action.completed_at, Some(first));
    }

    #[test]
    fn test_reopening_clears_completed_at() {
        let mut action = Action::new("Review targets", "Deepa Abi", due());
        action.set_completed(true, Utc::now());
        action.set_completed(false, Utc::now());
        assert!(!action.completed);
        assert_eq!(action.completed_at, None);
    }

    #[test]
    fn test_action_json_shape() {
        let json = r#"{"id":"act-1","text":"Align roadmap","owner":"Hardik Bhatt","dueDate":"2026-02-01","completed":false,"createdAt":"2026-01-12T09:00:00Z"}"#;
        let action: Action = serde_json::from_str(json).unwrap();
        assert_eq!(action.due_date, NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
        assert!(action.completed_at.is_none());
    }
}
