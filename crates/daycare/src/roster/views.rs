use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::domain::{AssignmentState, ChildId, ClassroomId, StaffAssignment, StaffId};
use crate::ratio::{RatioGroup, RatioStatus};

#[derive(Debug, Clone, Serialize)]
pub struct ChildRatioEntry {
    pub child_id: ChildId,
    pub first_name: String,
    pub last_name: String,
    pub age_in_months: Option<u32>,
    pub ratio_group: Option<RatioGroup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratio_group_label: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StaffEntry {
    pub staff_id: StaffId,
    pub first_name: String,
    pub last_name: String,
}

/// Payload of `/ratio/classroom/:id`, one row of the overview.
#[derive(Debug, Clone, Serialize)]
pub struct ClassroomRatioView {
    pub classroom_id: ClassroomId,
    pub classroom_name: String,
    pub as_of: NaiveDate,
    pub children: Vec<ChildRatioEntry>,
    pub staff: Vec<StaffEntry>,
    pub status: RatioStatus,
    pub status_label: &'static str,
    pub status_colour: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RatioOverview {
    pub as_of: NaiveDate,
    pub total_children: u32,
    pub total_staff: u32,
    pub over_ratio_classrooms: usize,
    pub at_capacity_classrooms: usize,
    pub classrooms: Vec<ClassroomRatioView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceSubject {
    Child,
    Staff,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceView {
    pub subject: AttendanceSubject,
    pub subject_id: String,
    pub state: &'static str,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignmentView {
    pub staff_id: StaffId,
    pub classroom_id: ClassroomId,
    pub assigned_at: DateTime<Utc>,
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed_at: Option<DateTime<Utc>>,
}

impl From<&StaffAssignment> for AssignmentView {
    fn from(assignment: &StaffAssignment) -> Self {
        let removed_at = match assignment.state {
            AssignmentState::Active => None,
            AssignmentState::Removed { removed_at } => Some(removed_at),
        };
        Self {
            staff_id: assignment.staff_id.clone(),
            classroom_id: assignment.classroom_id.clone(),
            assigned_at: assignment.assigned_at,
            state: assignment.state.label(),
            removed_at,
        }
    }
}
