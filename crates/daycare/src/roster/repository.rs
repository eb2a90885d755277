use super::domain::{
    Attendance, ChildId, ChildProfile, ChildRecord, Classroom, ClassroomId, ClassroomSnapshot,
    StaffAssignment, StaffId, StaffMember, StaffRecord,
};

/// Storage abstraction over the roster tables the ratio screens read.
pub trait RosterRepository: Send + Sync {
    fn upsert_classroom(&self, classroom: Classroom) -> Result<(), RepositoryError>;
    fn upsert_child(&self, profile: ChildProfile) -> Result<(), RepositoryError>;
    fn upsert_staff(&self, member: StaffMember) -> Result<(), RepositoryError>;

    fn classrooms(&self) -> Result<Vec<Classroom>, RepositoryError>;
    fn child(&self, id: &ChildId) -> Result<Option<ChildRecord>, RepositoryError>;
    fn staff_member(&self, id: &StaffId) -> Result<Option<StaffRecord>, RepositoryError>;

    fn record_child_attendance(
        &self,
        id: &ChildId,
        attendance: Attendance,
    ) -> Result<(), RepositoryError>;
    fn record_staff_attendance(
        &self,
        id: &StaffId,
        attendance: Attendance,
    ) -> Result<(), RepositoryError>;

    /// Stores a new assignment; fails with `Conflict` while another active
    /// assignment exists for the same staff member and classroom.
    fn insert_assignment(&self, assignment: StaffAssignment) -> Result<(), RepositoryError>;
    /// Replaces the assignment matching staff, classroom, and `assigned_at`.
    fn update_assignment(&self, assignment: StaffAssignment) -> Result<(), RepositoryError>;
    /// Every assignment ever made to the classroom, removed ones included.
    fn assignments(&self, classroom: &ClassroomId)
        -> Result<Vec<StaffAssignment>, RepositoryError>;

    /// Checked-in children and signed-in, actively assigned staff, read
    /// together. `None` when the classroom does not exist.
    fn snapshot(&self, classroom: &ClassroomId)
        -> Result<Option<ClassroomSnapshot>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
