use super::group::{ChildRatioInput, RatioGroup};
use super::status::{status_indicator, RatioStatus, StatusIndicator};
use crate::config::RatioConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Binding children-per-staff limit for whatever mix of groups is in the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectiveRatio {
    /// No classified child is present; capacity is unlimited.
    Unconstrained,
    Limited {
        children_per_staff: u32,
        dominant_group: RatioGroup,
    },
}

impl EffectiveRatio {
    pub fn children_per_staff(&self) -> Option<u32> {
        match self {
            Self::Unconstrained => None,
            Self::Limited {
                children_per_staff, ..
            } => Some(*children_per_staff),
        }
    }

    pub fn dominant_group(&self) -> Option<RatioGroup> {
        match self {
            Self::Unconstrained => None,
            Self::Limited { dominant_group, .. } => Some(*dominant_group),
        }
    }

    /// Children the given staff may supervise; `None` means unlimited.
    pub fn max_allowed_children(&self, staff_count: u32) -> Option<u32> {
        self.children_per_staff()
            .map(|ratio| staff_count.saturating_mul(ratio))
    }
}

impl fmt::Display for EffectiveRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unconstrained => f.write_str("unconstrained"),
            Self::Limited {
                children_per_staff, ..
            } => write!(f, "1:{children_per_staff}"),
        }
    }
}

/// Ratio constants and age-band boundaries applied during evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatioPolicy {
    infant_ratio: u32,
    toddler_ratio: u32,
    preschool_ratio: u32,
    kindergarten_ratio: u32,
    toddler_min_months: u32,
    preschool_min_months: u32,
}

impl Default for RatioPolicy {
    fn default() -> Self {
        Self::from(&RatioConfig::default())
    }
}

impl From<&RatioConfig> for RatioPolicy {
    fn from(config: &RatioConfig) -> Self {
        let defaults = RatioConfig::default();
        let (toddler_min_months, preschool_min_months) = if config.toddler_min_months > 0
            && config.toddler_min_months < config.preschool_min_months
        {
            (config.toddler_min_months, config.preschool_min_months)
        } else {
            (defaults.toddler_min_months, defaults.preschool_min_months)
        };

        Self {
            infant_ratio: config.infant_ratio.max(1),
            toddler_ratio: config.toddler_ratio.max(1),
            preschool_ratio: config.preschool_ratio.max(1),
            kindergarten_ratio: config.kindergarten_ratio.max(1),
            toddler_min_months,
            preschool_min_months,
        }
    }
}

impl RatioPolicy {
    pub fn ratio_for(&self, group: RatioGroup) -> u32 {
        match group {
            RatioGroup::Infant => self.infant_ratio,
            RatioGroup::Toddler => self.toddler_ratio,
            RatioGroup::Preschool => self.preschool_ratio,
            RatioGroup::Kindergarten => self.kindergarten_ratio,
        }
    }

    /// Assigns the licensing band. Kindergarten enrollment overrides age;
    /// otherwise lower bounds are inclusive, so a boundary month belongs to the
    /// older band.
    pub fn classify(&self, age_in_months: u32, is_kindergarten_enrolled: bool) -> RatioGroup {
        if is_kindergarten_enrolled {
            return RatioGroup::Kindergarten;
        }

        if age_in_months >= self.preschool_min_months {
            RatioGroup::Preschool
        } else if age_in_months >= self.toddler_min_months {
            RatioGroup::Toddler
        } else {
            RatioGroup::Infant
        }
    }

    /// Group for a child, or `None` when the age is unknown and nothing else
    /// pins the band down.
    pub fn group_for(&self, child: &ChildRatioInput) -> Option<RatioGroup> {
        match child.age_in_months {
            Some(age) => Some(self.classify(age, child.is_kindergarten_enrolled)),
            None if child.is_kindergarten_enrolled => Some(RatioGroup::Kindergarten),
            None => None,
        }
    }

    /// Strictest ratio among the groups present. Only the set of groups
    /// matters, not ordering or head count within a group.
    pub fn effective_ratio(&self, children: &[ChildRatioInput]) -> EffectiveRatio {
        let represented: BTreeSet<RatioGroup> = children
            .iter()
            .filter_map(|child| self.group_for(child))
            .collect();

        represented
            .into_iter()
            .min_by_key(|group| self.ratio_for(*group))
            .map(|group| EffectiveRatio::Limited {
                children_per_staff: self.ratio_for(group),
                dominant_group: group,
            })
            .unwrap_or(EffectiveRatio::Unconstrained)
    }

    pub fn calculate_ratio_status(
        &self,
        staff_count: u32,
        children: &[ChildRatioInput],
    ) -> RatioStatus {
        let children_count = u32::try_from(children.len()).unwrap_or(u32::MAX);
        let unclassified_children = u32::try_from(
            children
                .iter()
                .filter(|child| self.group_for(child).is_none())
                .count(),
        )
        .unwrap_or(u32::MAX);

        let required_ratio = self.effective_ratio(children);
        let max_allowed_children = required_ratio.max_allowed_children(staff_count);

        let unstaffed = staff_count == 0 && children_count > 0;
        let is_over_ratio = unstaffed
            || max_allowed_children
                .map(|max| children_count > max)
                .unwrap_or(false);

        let actual_ratio = children_count as f32 / staff_count.max(1) as f32;

        let mut status = RatioStatus {
            children_count,
            staff_count,
            unclassified_children,
            required_ratio,
            max_allowed_children,
            actual_ratio,
            is_over_ratio,
            status_indicator: StatusIndicator::Good,
        };
        status.status_indicator = status_indicator(&status);
        status
    }
}
