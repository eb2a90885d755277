use super::policy::EffectiveRatio;
use serde::{Deserialize, Serialize};

/// Traffic-light signal shown on the classroom badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusIndicator {
    Good,
    Warning,
    Critical,
}

impl StatusIndicator {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Good => "Within ratio",
            Self::Warning => "At capacity",
            Self::Critical => "Over ratio",
        }
    }

    pub const fn colour(self) -> &'static str {
        match self {
            Self::Good => "green",
            Self::Warning => "amber",
            Self::Critical => "red",
        }
    }
}

/// Ratio evaluation for one classroom at one instant. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioStatus {
    pub children_count: u32,
    pub staff_count: u32,
    /// Children counted in the room but left out of group classification
    /// because no birth date is on file.
    pub unclassified_children: u32,
    pub required_ratio: EffectiveRatio,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_allowed_children: Option<u32>,
    pub actual_ratio: f32,
    pub is_over_ratio: bool,
    pub status_indicator: StatusIndicator,
}

impl RatioStatus {
    pub fn summary(&self) -> String {
        let capacity = match self.max_allowed_children {
            Some(max) => format!("capacity {max}"),
            None => "capacity unlimited".to_string(),
        };
        format!(
            "{} staff / {} children ({} required, {:.1} actual, {}): {}",
            self.staff_count,
            self.children_count,
            self.required_ratio,
            self.actual_ratio,
            capacity,
            self.status_indicator.label()
        )
    }
}

/// Critical when over ratio, warning at exactly full capacity, good otherwise.
pub fn status_indicator(status: &RatioStatus) -> StatusIndicator {
    if status.is_over_ratio {
        StatusIndicator::Critical
    } else if status.max_allowed_children == Some(status.children_count) {
        StatusIndicator::Warning
    } else {
        StatusIndicator::Good
    }
}
