use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};

use super::domain::{
    Attendance, ChildId, ClassroomId, ClassroomSnapshot, StaffAssignment, StaffId,
};
use super::repository::{RepositoryError, RosterRepository};
use super::views::{
    AssignmentView, AttendanceSubject, AttendanceView, ChildRatioEntry, ClassroomRatioView,
    RatioOverview, StaffEntry,
};
use crate::ratio::{ChildRatioInput, RatioPolicy, StatusIndicator};

/// Service composing the roster repository with the ratio policy.
pub struct RosterService<R> {
    repository: Arc<R>,
    policy: Arc<RatioPolicy>,
}

impl<R> RosterService<R>
where
    R: RosterRepository + 'static,
{
    pub fn new(repository: Arc<R>, policy: RatioPolicy) -> Self {
        Self {
            repository,
            policy: Arc::new(policy),
        }
    }

    pub fn policy(&self) -> &RatioPolicy {
        &self.policy
    }

    /// Evaluate one classroom from a single repository snapshot.
    pub fn classroom_ratio(
        &self,
        classroom_id: &ClassroomId,
        as_of: NaiveDate,
    ) -> Result<ClassroomRatioView, RosterError> {
        let snapshot = self
            .repository
            .snapshot(classroom_id)?
            .ok_or_else(|| RosterError::ClassroomNotFound(classroom_id.clone()))?;
        Ok(self.evaluate(snapshot, as_of))
    }

    /// Evaluate every classroom. Each room is read as its own snapshot.
    pub fn ratio_overview(&self, as_of: NaiveDate) -> Result<RatioOverview, RosterError> {
        let mut classrooms = Vec::new();
        for classroom in self.repository.classrooms()? {
            // A room deleted between listing and reading is simply skipped.
            if let Some(snapshot) = self.repository.snapshot(&classroom.classroom_id)? {
                classrooms.push(self.evaluate(snapshot, as_of));
            }
        }

        let total_children = classrooms
            .iter()
            .map(|view| view.status.children_count)
            .sum();
        let total_staff = classrooms.iter().map(|view| view.status.staff_count).sum();
        let over_ratio_classrooms = classrooms
            .iter()
            .filter(|view| view.status.status_indicator == StatusIndicator::Critical)
            .count();
        let at_capacity_classrooms = classrooms
            .iter()
            .filter(|view| view.status.status_indicator == StatusIndicator::Warning)
            .count();

        Ok(RatioOverview {
            as_of,
            total_children,
            total_staff,
            over_ratio_classrooms,
            at_capacity_classrooms,
            classrooms,
        })
    }

    pub fn check_in_child(
        &self,
        child_id: &ChildId,
        at: DateTime<Utc>,
    ) -> Result<AttendanceView, RosterError> {
        self.set_child_presence(child_id, true, at)
    }

    pub fn check_out_child(
        &self,
        child_id: &ChildId,
        at: DateTime<Utc>,
    ) -> Result<AttendanceView, RosterError> {
        self.set_child_presence(child_id, false, at)
    }

    pub fn sign_in_staff(
        &self,
        staff_id: &StaffId,
        at: DateTime<Utc>,
    ) -> Result<AttendanceView, RosterError> {
        self.set_staff_presence(staff_id, true, at)
    }

    pub fn sign_out_staff(
        &self,
        staff_id: &StaffId,
        at: DateTime<Utc>,
    ) -> Result<AttendanceView, RosterError> {
        self.set_staff_presence(staff_id, false, at)
    }

    pub fn assign_staff(
        &self,
        staff_id: &StaffId,
        classroom_id: &ClassroomId,
        at: DateTime<Utc>,
    ) -> Result<AssignmentView, RosterError> {
        self.require_classroom(classroom_id)?;
        if self.repository.staff_member(staff_id)?.is_none() {
            return Err(RosterError::StaffNotFound(staff_id.clone()));
        }

        let assignment = StaffAssignment::new(staff_id.clone(), classroom_id.clone(), at);
        match self.repository.insert_assignment(assignment.clone()) {
            Ok(()) => {}
            Err(RepositoryError::Conflict) => {
                return Err(RosterError::AlreadyAssigned {
                    staff_id: staff_id.clone(),
                    classroom_id: classroom_id.clone(),
                })
            }
            Err(other) => return Err(other.into()),
        }

        info!(%staff_id, %classroom_id, "staff assigned to classroom");
        Ok(AssignmentView::from(&assignment))
    }

    pub fn remove_assignment(
        &self,
        staff_id: &StaffId,
        classroom_id: &ClassroomId,
        at: DateTime<Utc>,
    ) -> Result<AssignmentView, RosterError> {
        self.require_classroom(classroom_id)?;
        let mut assignment = self
            .repository
            .assignments(classroom_id)?
            .into_iter()
            .find(|assignment| &assignment.staff_id == staff_id && assignment.is_active())
            .ok_or_else(|| RosterError::InvalidTransition {
                subject: staff_id.to_string(),
                detail: "no active assignment to remove",
            })?;

        assignment.remove(at);
        self.repository.update_assignment(assignment.clone())?;

        info!(%staff_id, %classroom_id, "staff assignment removed");
        Ok(AssignmentView::from(&assignment))
    }

    fn require_classroom(&self, classroom_id: &ClassroomId) -> Result<(), RosterError> {
        let exists = self
            .repository
            .classrooms()?
            .iter()
            .any(|classroom| &classroom.classroom_id == classroom_id);
        if exists {
            Ok(())
        } else {
            Err(RosterError::ClassroomNotFound(classroom_id.clone()))
        }
    }

    fn set_child_presence(
        &self,
        child_id: &ChildId,
        present: bool,
        at: DateTime<Utc>,
    ) -> Result<AttendanceView, RosterError> {
        let record = self
            .repository
            .child(child_id)?
            .ok_or_else(|| RosterError::ChildNotFound(child_id.clone()))?;

        if record.attendance.is_present() == present {
            return Err(RosterError::InvalidTransition {
                subject: child_id.to_string(),
                detail: if present {
                    "child is already checked in"
                } else {
                    "child is not checked in"
                },
            });
        }

        self.repository
            .record_child_attendance(child_id, presence(present, at))?;

        let state = if present { "checked_in" } else { "checked_out" };
        info!(%child_id, classroom_id = %record.profile.classroom_id, state, "child attendance updated");
        Ok(AttendanceView {
            subject: AttendanceSubject::Child,
            subject_id: child_id.to_string(),
            state,
            at,
        })
    }

    fn set_staff_presence(
        &self,
        staff_id: &StaffId,
        present: bool,
        at: DateTime<Utc>,
    ) -> Result<AttendanceView, RosterError> {
        let record = self
            .repository
            .staff_member(staff_id)?
            .ok_or_else(|| RosterError::StaffNotFound(staff_id.clone()))?;

        if record.attendance.is_present() == present {
            return Err(RosterError::InvalidTransition {
                subject: staff_id.to_string(),
                detail: if present {
                    "staff member is already signed in"
                } else {
                    "staff member is not signed in"
                },
            });
        }

        self.repository
            .record_staff_attendance(staff_id, presence(present, at))?;

        let state = if present { "signed_in" } else { "signed_out" };
        info!(%staff_id, state, "staff attendance updated");
        Ok(AttendanceView {
            subject: AttendanceSubject::Staff,
            subject_id: staff_id.to_string(),
            state,
            at,
        })
    }

    fn evaluate(&self, snapshot: ClassroomSnapshot, as_of: NaiveDate) -> ClassroomRatioView {
        let ClassroomSnapshot {
            classroom,
            children,
            staff,
        } = snapshot;

        let inputs: Vec<ChildRatioInput> = children
            .iter()
            .map(|profile| profile.ratio_input(as_of))
            .collect();
        let staff_count = u32::try_from(staff.len()).unwrap_or(u32::MAX);
        let status = self.policy.calculate_ratio_status(staff_count, &inputs);

        if status.unclassified_children > 0 {
            warn!(
                classroom_id = %classroom.classroom_id,
                unclassified = status.unclassified_children,
                "children without a birth date excluded from ratio groups"
            );
        }
        if status.is_over_ratio {
            warn!(
                classroom_id = %classroom.classroom_id,
                children = status.children_count,
                staff = status.staff_count,
                required = %status.required_ratio,
                "classroom over ratio"
            );
        } else {
            debug!(
                classroom_id = %classroom.classroom_id,
                children = status.children_count,
                staff = status.staff_count,
                indicator = status.status_indicator.label(),
                "classroom ratio evaluated"
            );
        }

        let children = children
            .into_iter()
            .zip(inputs.iter())
            .map(|(profile, input)| {
                let ratio_group = self.policy.group_for(input);
                ChildRatioEntry {
                    child_id: profile.child_id,
                    first_name: profile.first_name,
                    last_name: profile.last_name,
                    age_in_months: input.age_in_months,
                    ratio_group,
                    ratio_group_label: ratio_group.map(|group| group.label()),
                }
            })
            .collect();

        let staff = staff
            .into_iter()
            .map(|member| StaffEntry {
                staff_id: member.staff_id,
                first_name: member.first_name,
                last_name: member.last_name,
            })
            .collect();

        ClassroomRatioView {
            classroom_id: classroom.classroom_id,
            classroom_name: classroom.name,
            as_of,
            children,
            staff,
            status_label: status.status_indicator.label(),
            status_colour: status.status_indicator.colour(),
            status,
        }
    }
}

fn presence(present: bool, at: DateTime<Utc>) -> Attendance {
    if present {
        Attendance::Present { since: at }
    } else {
        Attendance::Absent { since: Some(at) }
    }
}

/// Error raised by the roster service.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("classroom {0} not found")]
    ClassroomNotFound(ClassroomId),
    #[error("child {0} not found")]
    ChildNotFound(ChildId),
    #[error("staff member {0} not found")]
    StaffNotFound(StaffId),
    #[error("staff member {staff_id} is already assigned to classroom {classroom_id}")]
    AlreadyAssigned {
        staff_id: StaffId,
        classroom_id: ClassroomId,
    },
    #[error("{subject}: {detail}")]
    InvalidTransition {
        subject: String,
        detail: &'static str,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
