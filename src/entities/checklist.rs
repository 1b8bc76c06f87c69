//! Quality checklist - a fixed set of eight review criteria per OKR

use serde::{Deserialize, Serialize};

/// The eight quality criteria an OKR is reviewed against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QualityCheck {
    Direction,
    StakeholderAlignment,
    Cascading,
    Understanding,
    Measurability,
    Prioritization,
    Ownership,
    StrategicThinking,
}

impl QualityCheck {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityCheck::Direction => "direction",
            QualityCheck::StakeholderAlignment => "stakeholder-alignment",
            QualityCheck::Cascading => "cascading",
            QualityCheck::Understanding => "understanding",
            QualityCheck::Measurability => "measurability",
            QualityCheck::Prioritization => "prioritization",
            QualityCheck::Ownership => "ownership",
            QualityCheck::StrategicThinking => "strategic-thinking",
        }
    }

    /// All criteria in review order
    pub fn all() -> &'static [QualityCheck] {
        &[
            QualityCheck::Direction,
            QualityCheck::StakeholderAlignment,
            QualityCheck::Cascading,
            QualityCheck::Understanding,
            QualityCheck::Measurability,
            QualityCheck::Prioritization,
            QualityCheck::Ownership,
            QualityCheck::StrategicThinking,
        ]
    }
}

impl std::fmt::Display for QualityCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for QualityCheck {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QualityCheck::all()
            .iter()
            .find(|check| check.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Unknown quality checklist item: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityChecklistItem {
    pub id: QualityCheck,
    pub checked: bool,
}

/// `(checked, total)` for a checklist
pub fn checklist_score(items: &[QualityChecklistItem]) -> (usize, usize) {
    let checked = items.iter().filter(|item| item.checked).count();
    (checked, items.len())
}

/// A full eight-item checklist with the given criteria ticked
pub fn checklist_with(checked: &[QualityCheck]) -> Vec<QualityChecklistItem> {
    QualityCheck::all()
        .iter()
        .map(|&id| QualityChecklistItem {
            id,
            checked: checked.contains(&id),
        })
        .collect()
}
