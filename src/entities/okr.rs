//! OKR entity type - a node in the global/area goal hierarchy

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Status;
use crate::core::identity::{new_id, parse_display_id};
use crate::entities::action::Action;
use crate::entities::checklist::QualityChecklistItem;
use crate::entities::key_result::KeyResult;
use crate::entities::validate::ValidationError;

/// A goal node. Roots (no `parent_id`) are global objectives and carry a
/// display id; children are area objectives supporting their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Okr {
    /// Unique identifier, never reassigned
    pub id: String,

    /// Human-facing `OKR-<n>` label, roots only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_id: Option<String>,

    pub objective: String,

    /// Display order is list order
    #[serde(default)]
    pub key_results: Vec<KeyResult>,

    /// Creation timestamp (immutable)
    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    /// Organizational area, area OKRs only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Authoritative status set during check-ins
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenges: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub needs: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quality_checklist: Vec<QualityChecklistItem>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
}

impl Okr {
    /// Create a new root OKR with a fresh id
    pub fn new(objective: impl Into<String>) -> Self {
        Self {
            id: new_id("okr"),
            display_id: None,
            objective: objective.into(),
            key_results: Vec::new(),
            created_at: Utc::now(),
            parent_id: None,
            area: None,
            owner: None,
            status: None,
            challenges: None,
            needs: None,
            comments: None,
            quality_checklist: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Create a new area OKR under `parent_id`
    pub fn child_of(parent_id: impl Into<String>, objective: impl Into<String>) -> Self {
        Self {
            parent_id: Some(parent_id.into()),
            ..Self::new(objective)
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Display id for roots, `"<area> - OKR"` for area OKRs
    pub fn label(&self) -> String {
        match (&self.display_id, &self.area) {
            (Some(display_id), _) => display_id.clone(),
            (None, Some(area)) => format!("{} - OKR", area),
            (None, None) => String::from("OKR"),
        }
    }

    pub fn key_result(&self, id: &str) -> Option<&KeyResult> {
        self.key_results.iter().find(|kr| kr.id == id)
    }

    /// Check the model rules that hold for a single OKR in isolation
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::EmptyId);
        }
        if self.parent_id.as_deref() == Some(self.id.as_str()) {
            return Err(ValidationError::SelfParent(self.id.clone()));
        }
        if let Some(display_id) = &self.display_id {
            if !self.is_root() {
                return Err(ValidationError::DisplayIdOnChild {
                    id: self.id.clone(),
                    display_id: display_id.clone(),
                });
            }
            if parse_display_id(display_id).is_none() {
                return Err(ValidationError::MalformedDisplayId(display_id.clone()));
            }
        }

        let mut seen = std::collections::HashSet::new();
        for kr in &self.key_results {
            if !seen.insert(kr.id.as_str()) {
                return Err(ValidationError::DuplicateKeyResult(kr.id.clone()));
            }
        }

        let mut seen = std::collections::HashSet::new();
        for action in &self.actions {
            if !seen.insert(action.id.as_str()) {
                return Err(ValidationError::DuplicateAction(action.id.clone()));
            }
            if action.completed_at.is_some() && !action.completed {
                return Err(ValidationError::CompletedAtOnOpenAction(action.id.clone()));
            }
        }

        let mut seen = std::collections::HashSet::new();
        for item in &self.quality_checklist {
            if !seen.insert(item.id) {
                return Err(ValidationError::DuplicateChecklistItem(item.id.to_string()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::checklist::{checklist_with, QualityCheck};

    #[test]
    fn test_okr_json_uses_camel_case() {
        let mut okr = Okr::new("Become the market leader");
        okr.display_id = Some("OKR-1".to_string());
        okr.key_results.push(KeyResult::new("Market Share", 10.0, 30.0));

        let json = serde_json::to_string(&okr).unwrap();
        assert!(json.contains("\"displayId\":\"OKR-1\""));
        assert!(json.contains("\"keyResults\""));
        assert!(json.contains("\"metricName\":\"Market Share\""));
        assert!(!json.contains("parentId"));

        let parsed: Okr = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, okr);
    }

    #[test]
    fn test_label() {
        let mut root = Okr::new("Global");
        root.display_id = Some("OKR-2".to_string());
        assert_eq!(root.label(), "OKR-2");

        let mut child = Okr::child_of(&root.id, "Deliver savings");
        child.area = Some("GCC India".to_string());
        assert_eq!(child.label(), "GCC India - OKR");
    }

    #[test]
    fn test_validate_rejects_display_id_on_child() {
        let mut child = Okr::child_of("parent", "Area goal");
        child.display_id = Some("OKR-5".to_string());
        assert!(matches!(
            child.validate(),
            Err(ValidationError::DisplayIdOnChild { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_malformed_display_id() {
        let mut root = Okr::new("Global");
        root.display_id = Some("OKR-0".to_string());
        assert!(matches!(
            root.validate(),
            Err(ValidationError::MalformedDisplayId(_))
        ));
    }

    #[test]
    fn test_validate_rejects_self_parent() {
        let mut okr = Okr::new("Loop");
        okr.parent_id = Some(okr.id.clone());
        assert!(matches!(okr.validate(), Err(ValidationError::SelfParent(_))));
    }

    #[test]
    fn test_validate_rejects_duplicate_nested_ids() {
        let mut okr = Okr::new("Dupes");
        let kr = KeyResult::new("Revenue", 0.0, 10.0);
        okr.key_results = vec![kr.clone(), kr];
        assert!(matches!(
            okr.validate(),
            Err(ValidationError::DuplicateKeyResult(_))
        ));

        let mut okr = Okr::new("Dupes");
        let mut checklist = checklist_with(&[QualityCheck::Direction]);
        checklist.push(checklist[0]);
        okr.quality_checklist = checklist;
        assert!(matches!(
            okr.validate(),
            Err(ValidationError::DuplicateChecklistItem(_))
        ));
    }
}
