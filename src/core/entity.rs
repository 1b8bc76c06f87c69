//! Status values shared by OKRs and key results

use serde::{Deserialize, Serialize};

/// Red/amber/green tri-state set explicitly during check-ins
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    OnTrack,
    Progressing,
    OffTrack,
}

impl Status {
    /// Get the wire representation (also used in the relational schema)
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::OnTrack => "on-track",
            Status::Progressing => "progressing",
            Status::OffTrack => "off-track",
        }
    }

    /// All statuses in display order
    pub fn all() -> &'static [Status] {
        &[Status::OnTrack, Status::Progressing, Status::OffTrack]
    }

    /// Human label for dashboards
    pub fn label(&self) -> &'static str {
        match self {
            Status::OnTrack => "On Track",
            Status::Progressing => "Progressing",
            Status::OffTrack => "Off Track",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "on-track" | "ontrack" | "green" => Ok(Status::OnTrack),
            "progressing" | "amber" | "yellow" => Ok(Status::Progressing),
            "off-track" | "offtrack" | "red" => Ok(Status::OffTrack),
            _ => Err(format!("Unknown status: {}", s)),
        }
    }
}
