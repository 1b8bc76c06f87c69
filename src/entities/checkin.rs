//! Check-in - rewrites an OKR's observed progress and narrative fields
//!
//! A check-in never changes an OKR's identity or structure. Applying one
//! yields the complete replacement object handed to the store.

use chrono::{DateTime, Utc};

use crate::core::entity::Status;
use crate::entities::action::Action;
use crate::entities::okr::Okr;
use crate::entities::validate::ValidationError;

/// Observation for a single key result
#[derive(Debug, Clone, PartialEq)]
pub struct KeyResultUpdate {
    pub key_result_id: String,
    pub current: Option<f64>,
    pub status: Option<Status>,
}

/// Everything a check-in may change. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckIn {
    pub key_results: Vec<KeyResultUpdate>,
    pub status: Option<Status>,
    pub challenges: Option<String>,
    pub needs: Option<String>,
    pub comments: Option<String>,
    pub new_actions: Vec<Action>,
    pub complete_actions: Vec<String>,
    pub reopen_actions: Vec<String>,
}

impl CheckIn {
    pub fn is_empty(&self) -> bool {
        *self == CheckIn::default()
    }

    /// Produce the full replacement for `okr`
    pub fn apply(&self, okr: &Okr, now: DateTime<Utc>) -> Result<Okr, ValidationError> {
        let mut updated = okr.clone();

        for update in &self.key_results {
            let kr = updated
                .key_results
                .iter_mut()
                .find(|kr| kr.id == update.key_result_id)
                .ok_or_else(|| ValidationError::UnknownKeyResult {
                    okr_id: okr.id.clone(),
                    key_result_id: update.key_result_id.clone(),
                })?;
            if update.current.is_some() {
                kr.current = update.current;
            }
            if update.status.is_some() {
                kr.status = update.status;
            }
        }

        if self.status.is_some() {
            updated.status = self.status;
        }
        if let Some(challenges) = &self.challenges {
            updated.challenges = non_empty(challenges);
        }
        if let Some(needs) = &self.needs {
            updated.needs = non_empty(needs);
        }
        if let Some(comments) = &self.comments {
            updated.comments = non_empty(comments);
        }

        for (ids, completed) in [(&self.complete_actions, true), (&self.reopen_actions, false)] {
            for action_id in ids {
                let action = updated
                    .actions
                    .iter_mut()
                    .find(|a| &a.id == action_id)
                    .ok_or_else(|| ValidationError::UnknownAction {
                        okr_id: okr.id.clone(),
                        action_id: action_id.clone(),
                    })?;
                action.set_completed(completed, now);
            }
        }

        updated.actions.extend(self.new_actions.iter().cloned());
        updated.validate()?;
        Ok(updated)
    }
}

// Blank narrative text clears the field
fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::key_result::KeyResult;
    use chrono::{NaiveDate, TimeZone};

    fn sample() -> Okr {
        let mut okr = Okr::new("Deliver savings");
        okr.key_results.push(KeyResult::new("Cost reduction", 10.0, 30.0));
        okr.actions.push(Action::new(
            "Review vendor contracts",
            "Deepa Abi",
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
        ));
        okr
    }

    #[test]
    fn test_check_in_updates_observations_and_narrative() {
        let okr = sample();
        let kr_id = okr.key_results[0].id.clone();
        let checkin = CheckIn {
            key_results: vec![KeyResultUpdate {
                key_result_id: kr_id,
                current: Some(22.0),
                status: Some(Status::OnTrack),
            }],
            status: Some(Status::Progressing),
            challenges: Some("Hiring freeze".to_string()),
            comments: Some("   ".to_string()),
            ..Default::default()
        };

        let updated = checkin.apply(&okr, Utc::now()).unwrap();
        assert_eq!(updated.id, okr.id);
        assert_eq!(updated.key_results[0].current, Some(22.0));
        assert_eq!(updated.key_results[0].status, Some(Status::OnTrack));
        assert_eq!(updated.status, Some(Status::Progressing));
        assert_eq!(updated.challenges.as_deref(), Some("Hiring freeze"));
        assert_eq!(updated.comments, None);
        assert_eq!(updated.created_at, okr.created_at);
    }

    #[test]
    fn test_check_in_completes_and_adds_actions() {
        let okr = sample();
        let now = Utc.with_ymd_and_hms(2026, 2, 2, 12, 0, 0).unwrap();
        let checkin = CheckIn {
            complete_actions: vec![okr.actions[0].id.clone()],
            new_actions: vec![Action::new(
                "Present pipeline",
                "Elena Schoeman",
                NaiveDate::from_ymd_opt(2026, 3, 15).unwrap(),
            )],
            ..Default::default()
        };

        let updated = checkin.apply(&okr, now).unwrap();
        assert_eq!(updated.actions.len(), 2);
        assert!(updated.actions[0].completed);
        assert_eq!(updated.actions[0].completed_at, Some(now));
        assert!(!updated.actions[1].completed);
    }

    #[test]
    fn test_check_in_rejects_unknown_key_result() {
        let okr = sample();
        let checkin = CheckIn {
            key_results: vec![KeyResultUpdate {
                key_result_id: "kr-missing".to_string(),
                current: Some(1.0),
                status: None,
            }],
            ..Default::default()
        };
        assert!(matches!(
            checkin.apply(&okr, Utc::now()),
            Err(ValidationError::UnknownKeyResult { .. })
        ));
    }
}
