use serde::{Deserialize, Serialize};
use std::fmt;

/// Licensing age band that fixes how many children one staff member may supervise.
///
/// Variants are ordered youngest first; the ordering is what breaks ties when
/// two represented groups share a ratio constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioGroup {
    Infant,
    Toddler,
    Preschool,
    Kindergarten,
}

impl RatioGroup {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Infant,
            Self::Toddler,
            Self::Preschool,
            Self::Kindergarten,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Infant => "Infant",
            Self::Toddler => "Toddler",
            Self::Preschool => "Preschool",
            Self::Kindergarten => "Kindergarten",
        }
    }
}

impl fmt::Display for RatioGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-child input to a ratio evaluation, derived from the stored profile on
/// the evaluation date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildRatioInput {
    pub child_id: String,
    pub first_name: String,
    pub last_name: String,
    /// `None` when the profile has no birth date on file.
    pub age_in_months: Option<u32>,
    pub is_kindergarten_enrolled: bool,
}
