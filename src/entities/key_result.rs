//! Key result entity type

use serde::{Deserialize, Serialize};

use crate::core::entity::Status;
use crate::core::identity::new_id;

/// How a key result's bounds are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum KeyResultUnit {
    #[default]
    Percentage,
    Number,
}

impl KeyResultUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyResultUnit::Percentage => "percentage",
            KeyResultUnit::Number => "number",
        }
    }
}

impl std::fmt::Display for KeyResultUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for KeyResultUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "percentage" | "percent" | "%" => Ok(KeyResultUnit::Percentage),
            "number" | "num" | "#" => Ok(KeyResultUnit::Number),
            _ => Err(format!("Unknown unit: {}", s)),
        }
    }
}

/// Render a key result bound: `"30%"` for percentages, `"30"` for numbers
pub fn format_value(value: f64, unit: KeyResultUnit) -> String {
    match unit {
        KeyResultUnit::Percentage => format!("{}%", value),
        KeyResultUnit::Number => format!("{}", value),
    }
}

/// A measurable sub-target of an OKR
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyResult {
    /// Unique identifier
    pub id: String,

    /// What is being measured
    pub metric_name: String,

    /// Starting value of the target range
    pub from: f64,

    /// Target value
    pub to: f64,

    #[serde(default)]
    pub unit: KeyResultUnit,

    /// Last observed value (set during check-ins)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,

    /// Free-text function tag, used on area OKRs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
}

impl KeyResult {
    /// Create a key result with a fresh id and no observations
    pub fn new(metric_name: impl Into<String>, from: f64, to: f64) -> Self {
        Self {
            id: new_id("kr"),
            metric_name: metric_name.into(),
            from,
            to,
            unit: KeyResultUnit::default(),
            current: None,
            status: None,
            function: None,
        }
    }

    pub fn with_unit(mut self, unit: KeyResultUnit) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_current(mut self, current: f64) -> Self {
        self.current = Some(current);
        self
    }

    /// Bounds rendered as `from → to`
    pub fn range_label(&self) -> String {
        format!(
            "{} → {}",
            format_value(self.from, self.unit),
            format_value(self.to, self.unit)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(30.0, KeyResultUnit::Percentage), "30%");
        assert_eq!(format_value(12.5, KeyResultUnit::Number), "12.5");
        assert_eq!(format_value(-4.0, KeyResultUnit::Number), "-4");
    }

    #[test]
    fn test_unit_defaults_to_percentage() {
        let kr: KeyResult =
            serde_json::from_str(r#"{"id":"kr-1","metricName":"Share","from":10,"to":30}"#)
                .unwrap();
        assert_eq!(kr.unit, KeyResultUnit::Percentage);
        assert_eq!(kr.current, None);
        assert_eq!(kr.range_label(), "10% → 30%");
    }
}
