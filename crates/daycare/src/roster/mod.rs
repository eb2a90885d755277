//! Classroom roster, attendance, and staff assignments: the live state the
//! ratio engine is evaluated against.

pub mod domain;
pub mod import;
pub mod memory;
pub mod repository;
pub mod router;
pub mod service;
pub mod views;

#[cfg(test)]
mod tests;

pub use domain::{
    AssignmentState, Attendance, ChildId, ChildProfile, ChildRecord, Classroom, ClassroomId,
    ClassroomSnapshot, StaffAssignment, StaffId, StaffMember, StaffRecord,
};
pub use import::{ImportSummary, RosterImportError, RosterImporter};
pub use memory::InMemoryRosterRepository;
pub use repository::{RepositoryError, RosterRepository};
pub use router::roster_router;
pub use service::{RosterError, RosterService};
pub use views::{
    AssignmentView, AttendanceSubject, AttendanceView, ChildRatioEntry, ClassroomRatioView,
    RatioOverview, StaffEntry,
};
