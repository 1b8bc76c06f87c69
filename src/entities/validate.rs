//! Entity model rule violations

use miette::Diagnostic;
use thiserror::Error;

/// A write was rejected because it would break a model invariant
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ValidationError {
    #[error("OKR id must not be empty")]
    #[diagnostic(code(okr::validate::empty_id))]
    EmptyId,

    #[error("OKR {0} cannot be its own parent")]
    #[diagnostic(code(okr::validate::self_parent))]
    SelfParent(String),

    #[error("OKR {id} has a parent but carries display id {display_id}")]
    #[diagnostic(
        code(okr::validate::display_id_on_child),
        help("display ids are only assigned to global (root) OKRs")
    )]
    DisplayIdOnChild { id: String, display_id: String },

    #[error("Malformed display id '{0}'")]
    #[diagnostic(
        code(okr::validate::display_id),
        help("display ids have the form OKR-<positive integer>")
    )]
    MalformedDisplayId(String),

    #[error("Display id of {id} cannot change from {from:?} to {to:?}")]
    #[diagnostic(code(okr::validate::display_id_changed))]
    DisplayIdChanged {
        id: String,
        from: Option<String>,
        to: Option<String>,
    },

    #[error("Display id {display_id} is already used by {existing}")]
    #[diagnostic(code(okr::validate::duplicate_display_id))]
    DuplicateDisplayId { display_id: String, existing: String },

    #[error("Creation time of {id} cannot change")]
    #[diagnostic(
        code(okr::validate::created_at_changed),
        help("createdAt is fixed when the OKR is first stored")
    )]
    CreatedAtChanged { id: String },

    #[error("No display id left after OKR-{0}")]
    #[diagnostic(code(okr::validate::display_ids_exhausted))]
    DisplayIdsExhausted(u64),

    #[error("Duplicate key result id: {0}")]
    #[diagnostic(code(okr::validate::duplicate_key_result))]
    DuplicateKeyResult(String),

    #[error("Duplicate action id: {0}")]
    #[diagnostic(code(okr::validate::duplicate_action))]
    DuplicateAction(String),

    #[error("Duplicate quality checklist item: {0}")]
    #[diagnostic(code(okr::validate::duplicate_checklist_item))]
    DuplicateChecklistItem(String),

    #[error("Action {0} has a completion time but is not completed")]
    #[diagnostic(code(okr::validate::completed_at))]
    CompletedAtOnOpenAction(String),

    #[error("Parent OKR {parent_id} does not exist")]
    #[diagnostic(code(okr::validate::unknown_parent))]
    UnknownParent { parent_id: String },

    #[error("Making {parent_id} the parent of {id} would create a cycle")]
    #[diagnostic(code(okr::validate::cycle))]
    Cycle { id: String, parent_id: String },

    #[error("OKR {okr_id} has no key result {key_result_id}")]
    #[diagnostic(code(okr::validate::unknown_key_result))]
    UnknownKeyResult {
        okr_id: String,
        key_result_id: String,
    },

    #[error("OKR {okr_id} has no action {action_id}")]
    #[diagnostic(code(okr::validate::unknown_action))]
    UnknownAction { okr_id: String, action_id: String },
}
