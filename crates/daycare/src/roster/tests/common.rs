use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::auth::{Role, StaticProfileDirectory, UserProfile};
use crate::ratio::RatioPolicy;
use crate::roster::domain::{
    Attendance, ChildId, ChildProfile, ChildRecord, Classroom, ClassroomId, ClassroomSnapshot,
    StaffAssignment, StaffId, StaffMember, StaffRecord,
};
use crate::roster::memory::InMemoryRosterRepository;
use crate::roster::repository::{RepositoryError, RosterRepository};
use crate::roster::{roster_router, RosterService};

pub(super) const SUNFLOWERS: &str = "sunflowers";
pub(super) const OAK: &str = "oak";

pub(super) fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 3).expect("valid date")
}

pub(super) fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 3, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    Some(NaiveDate::from_ymd_opt(y, m, d).expect("valid date"))
}

pub(super) fn child(
    id: &str,
    date_of_birth: Option<NaiveDate>,
    kindergarten: bool,
    classroom: &str,
) -> ChildProfile {
    ChildProfile {
        child_id: ChildId::from(id),
        first_name: format!("First-{id}"),
        last_name: format!("Last-{id}"),
        date_of_birth,
        is_kindergarten_enrolled: kindergarten,
        classroom_id: ClassroomId::from(classroom),
    }
}

/// Two classrooms on 2025-03-03:
/// sunflowers holds an infant (6 months), a toddler (18 months), and a child
/// with no birth date; oak holds two preschoolers and a kindergartner.
/// `s-maya` is assigned to sunflowers, `s-jon` to oak, `s-priya` to nothing.
/// Nobody is checked in or signed in yet.
pub(super) fn seeded_repository() -> Arc<InMemoryRosterRepository> {
    let repository = Arc::new(InMemoryRosterRepository::default());
    for (id, name) in [(SUNFLOWERS, "Sunflowers"), (OAK, "Oak")] {
        repository
            .upsert_classroom(Classroom {
                classroom_id: ClassroomId::from(id),
                name: name.to_string(),
            })
            .expect("classroom stored");
    }

    for profile in [
        child("c-ava", date(2024, 9, 1), false, SUNFLOWERS),
        child("c-ben", date(2023, 8, 15), false, SUNFLOWERS),
        child("c-cora", None, false, SUNFLOWERS),
        child("c-dev", date(2021, 1, 10), false, OAK),
        child("c-eli", date(2019, 11, 2), true, OAK),
        child("c-fay", date(2021, 5, 20), false, OAK),
    ] {
        repository.upsert_child(profile).expect("child stored");
    }

    for (id, first, last) in [
        ("s-maya", "Maya", "Ortiz"),
        ("s-jon", "Jon", "Baker"),
        ("s-priya", "Priya", "Nair"),
    ] {
        repository
            .upsert_staff(StaffMember {
                staff_id: StaffId::from(id),
                first_name: first.to_string(),
                last_name: last.to_string(),
            })
            .expect("staff stored");
    }

    for (staff, classroom) in [("s-maya", SUNFLOWERS), ("s-jon", OAK)] {
        repository
            .insert_assignment(StaffAssignment::new(
                StaffId::from(staff),
                ClassroomId::from(classroom),
                at(6),
            ))
            .expect("assignment stored");
    }

    repository
}

pub(super) fn build_service() -> (
    RosterService<InMemoryRosterRepository>,
    Arc<InMemoryRosterRepository>,
) {
    let repository = seeded_repository();
    let service = RosterService::new(repository.clone(), RatioPolicy::default());
    (service, repository)
}

pub(super) fn check_in(service: &RosterService<InMemoryRosterRepository>, ids: &[&str]) {
    for id in ids {
        service
            .check_in_child(&ChildId::from(*id), at(8))
            .expect("check-in succeeds");
    }
}

pub(super) fn sign_in(service: &RosterService<InMemoryRosterRepository>, ids: &[&str]) {
    for id in ids {
        service
            .sign_in_staff(&StaffId::from(*id), at(7))
            .expect("sign-in succeeds");
    }
}

pub(super) fn directory() -> Arc<StaticProfileDirectory> {
    let profile = |user_id: &str, role: Role| UserProfile {
        user_id: user_id.to_string(),
        display_name: user_id.to_string(),
        role,
    };
    Arc::new(StaticProfileDirectory::new([
        ("admin-token".to_string(), profile("u-admin", Role::Administrator)),
        ("director-token".to_string(), profile("u-director", Role::Director)),
        ("teacher-token".to_string(), profile("u-teacher", Role::Teacher)),
        ("parent-token".to_string(), profile("u-parent", Role::Parent)),
    ]))
}

pub(super) fn router_with_service(
    service: RosterService<InMemoryRosterRepository>,
) -> axum::Router {
    roster_router(Arc::new(service), directory())
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) struct UnavailableRepository;

impl UnavailableRepository {
    fn offline<T>() -> Result<T, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

impl RosterRepository for UnavailableRepository {
    fn upsert_classroom(&self, _classroom: Classroom) -> Result<(), RepositoryError> {
        Self::offline()
    }

    fn upsert_child(&self, _profile: ChildProfile) -> Result<(), RepositoryError> {
        Self::offline()
    }

    fn upsert_staff(&self, _member: StaffMember) -> Result<(), RepositoryError> {
        Self::offline()
    }

    fn classrooms(&self) -> Result<Vec<Classroom>, RepositoryError> {
        Self::offline()
    }

    fn child(&self, _id: &ChildId) -> Result<Option<ChildRecord>, RepositoryError> {
        Self::offline()
    }

    fn staff_member(&self, _id: &StaffId) -> Result<Option<StaffRecord>, RepositoryError> {
        Self::offline()
    }

    fn record_child_attendance(
        &self,
        _id: &ChildId,
        _attendance: Attendance,
    ) -> Result<(), RepositoryError> {
        Self::offline()
    }

    fn record_staff_attendance(
        &self,
        _id: &StaffId,
        _attendance: Attendance,
    ) -> Result<(), RepositoryError> {
        Self::offline()
    }

    fn insert_assignment(&self, _assignment: StaffAssignment) -> Result<(), RepositoryError> {
        Self::offline()
    }

    fn update_assignment(&self, _assignment: StaffAssignment) -> Result<(), RepositoryError> {
        Self::offline()
    }

    fn assignments(
        &self,
        _classroom: &ClassroomId,
    ) -> Result<Vec<StaffAssignment>, RepositoryError> {
        Self::offline()
    }

    fn snapshot(
        &self,
        _classroom: &ClassroomId,
    ) -> Result<Option<ClassroomSnapshot>, RepositoryError> {
        Self::offline()
    }
}
