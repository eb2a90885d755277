use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{
    Attendance, ChildId, ChildProfile, ChildRecord, Classroom, ClassroomId, ClassroomSnapshot,
    StaffAssignment, StaffId, StaffMember, StaffRecord,
};
use super::repository::{RepositoryError, RosterRepository};

#[derive(Debug, Default)]
struct RosterTables {
    classrooms: BTreeMap<ClassroomId, Classroom>,
    children: BTreeMap<ChildId, ChildRecord>,
    staff: BTreeMap<StaffId, StaffRecord>,
    assignments: Vec<StaffAssignment>,
}

/// Process-local roster store. All tables sit behind one lock so a snapshot
/// never mixes before and after states.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRosterRepository {
    tables: Arc<Mutex<RosterTables>>,
}

impl InMemoryRosterRepository {
    fn tables(&self) -> Result<MutexGuard<'_, RosterTables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("roster mutex poisoned".to_string()))
    }
}

impl RosterRepository for InMemoryRosterRepository {
    fn upsert_classroom(&self, classroom: Classroom) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        tables
            .classrooms
            .insert(classroom.classroom_id.clone(), classroom);
        Ok(())
    }

    fn upsert_child(&self, profile: ChildProfile) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        let attendance = tables
            .children
            .get(&profile.child_id)
            .map(|record| record.attendance)
            .unwrap_or_default();
        tables.children.insert(
            profile.child_id.clone(),
            ChildRecord {
                profile,
                attendance,
            },
        );
        Ok(())
    }

    fn upsert_staff(&self, member: StaffMember) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        let attendance = tables
            .staff
            .get(&member.staff_id)
            .map(|record| record.attendance)
            .unwrap_or_default();
        tables.staff.insert(
            member.staff_id.clone(),
            StaffRecord { member, attendance },
        );
        Ok(())
    }

    fn classrooms(&self) -> Result<Vec<Classroom>, RepositoryError> {
        Ok(self.tables()?.classrooms.values().cloned().collect())
    }

    fn child(&self, id: &ChildId) -> Result<Option<ChildRecord>, RepositoryError> {
        Ok(self.tables()?.children.get(id).cloned())
    }

    fn staff_member(&self, id: &StaffId) -> Result<Option<StaffRecord>, RepositoryError> {
        Ok(self.tables()?.staff.get(id).cloned())
    }

    fn record_child_attendance(
        &self,
        id: &ChildId,
        attendance: Attendance,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        let record = tables
            .children
            .get_mut(id)
            .ok_or(RepositoryError::NotFound)?;
        record.attendance = attendance;
        Ok(())
    }

    fn record_staff_attendance(
        &self,
        id: &StaffId,
        attendance: Attendance,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        let record = tables.staff.get_mut(id).ok_or(RepositoryError::NotFound)?;
        record.attendance = attendance;
        Ok(())
    }

    fn insert_assignment(&self, assignment: StaffAssignment) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        let duplicate = tables.assignments.iter().any(|existing| {
            existing.is_active()
                && existing.staff_id == assignment.staff_id
                && existing.classroom_id == assignment.classroom_id
        });
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        tables.assignments.push(assignment);
        Ok(())
    }

    fn update_assignment(&self, assignment: StaffAssignment) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        let existing = tables
            .assignments
            .iter_mut()
            .find(|existing| {
                existing.staff_id == assignment.staff_id
                    && existing.classroom_id == assignment.classroom_id
                    && existing.assigned_at == assignment.assigned_at
            })
            .ok_or(RepositoryError::NotFound)?;
        *existing = assignment;
        Ok(())
    }

    fn assignments(
        &self,
        classroom: &ClassroomId,
    ) -> Result<Vec<StaffAssignment>, RepositoryError> {
        Ok(self
            .tables()?
            .assignments
            .iter()
            .filter(|assignment| &assignment.classroom_id == classroom)
            .cloned()
            .collect())
    }

    fn snapshot(
        &self,
        classroom: &ClassroomId,
    ) -> Result<Option<ClassroomSnapshot>, RepositoryError> {
        let tables = self.tables()?;
        let Some(room) = tables.classrooms.get(classroom).cloned() else {
            return Ok(None);
        };

        let children = tables
            .children
            .values()
            .filter(|record| {
                &record.profile.classroom_id == classroom && record.attendance.is_present()
            })
            .map(|record| record.profile.clone())
            .collect();

        let staff = tables
            .assignments
            .iter()
            .filter(|assignment| assignment.is_active() && &assignment.classroom_id == classroom)
            .filter_map(|assignment| tables.staff.get(&assignment.staff_id))
            .filter(|record| record.attendance.is_present())
            .map(|record| record.member.clone())
            .collect();

        Ok(Some(ClassroomSnapshot {
            classroom: room,
            children,
            staff,
        }))
    }
}
