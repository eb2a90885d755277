use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ratio::{calculate_age_in_months, ChildRatioInput};

macro_rules! roster_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

roster_id!(
    /// Identifier wrapper for classrooms.
    ClassroomId
);
roster_id!(
    /// Identifier wrapper for enrolled children.
    ChildId
);
roster_id!(
    /// Identifier wrapper for staff members.
    StaffId
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classroom {
    pub classroom_id: ClassroomId,
    pub name: String,
}

/// Stored child profile. Only the fields the ratio screens consume are modeled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildProfile {
    pub child_id: ChildId,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub is_kindergarten_enrolled: bool,
    pub classroom_id: ClassroomId,
}

impl ChildProfile {
    /// Ratio input with the age computed on `as_of`.
    pub fn ratio_input(&self, as_of: NaiveDate) -> ChildRatioInput {
        ChildRatioInput {
            child_id: self.child_id.0.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            age_in_months: calculate_age_in_months(self.date_of_birth, as_of),
            is_kindergarten_enrolled: self.is_kindergarten_enrolled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffMember {
    pub staff_id: StaffId,
    pub first_name: String,
    pub last_name: String,
}

/// Whether a child is checked in, or a staff member signed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Attendance {
    Present { since: DateTime<Utc> },
    Absent { since: Option<DateTime<Utc>> },
}

impl Default for Attendance {
    fn default() -> Self {
        Self::Absent { since: None }
    }
}

impl Attendance {
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present { .. })
    }

    pub fn changed_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Present { since } => Some(*since),
            Self::Absent { since } => *since,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildRecord {
    pub profile: ChildProfile,
    pub attendance: Attendance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffRecord {
    pub member: StaffMember,
    pub attendance: Attendance,
}

/// Lifecycle of a staff-to-classroom assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AssignmentState {
    Active,
    Removed { removed_at: DateTime<Utc> },
}

impl AssignmentState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Removed { .. } => "removed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffAssignment {
    pub staff_id: StaffId,
    pub classroom_id: ClassroomId,
    pub assigned_at: DateTime<Utc>,
    pub state: AssignmentState,
}

impl StaffAssignment {
    pub fn new(staff_id: StaffId, classroom_id: ClassroomId, assigned_at: DateTime<Utc>) -> Self {
        Self {
            staff_id,
            classroom_id,
            assigned_at,
            state: AssignmentState::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == AssignmentState::Active
    }

    /// Moves `Active -> Removed`. Returns `false` if the assignment was already removed.
    pub fn remove(&mut self, removed_at: DateTime<Utc>) -> bool {
        if !self.is_active() {
            return false;
        }
        self.state = AssignmentState::Removed { removed_at };
        true
    }
}

/// Checked-in children and on-duty staff of one classroom, read at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassroomSnapshot {
    pub classroom: Classroom,
    pub children: Vec<ChildProfile>,
    pub staff: Vec<StaffMember>,
}
