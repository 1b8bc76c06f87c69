//! Entity type definitions

pub mod action;
pub mod checkin;
pub mod checklist;
pub mod key_result;
pub mod okr;
pub mod validate;

pub use action::Action;
pub use checkin::{CheckIn, KeyResultUpdate};
pub use checklist::{checklist_score, checklist_with, QualityCheck, QualityChecklistItem};
pub use key_result::{format_value, KeyResult, KeyResultUnit};
pub use okr::Okr;
pub use validate::ValidationError;
