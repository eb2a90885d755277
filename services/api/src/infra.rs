use crate::cli::RosterSourceArgs;
use chrono::{DateTime, Months, NaiveDate, Utc};
use daycare::auth::{Role, StaticProfileDirectory, UserProfile};
use daycare::error::AppError;
use daycare::roster::{
    Attendance, ChildId, ChildProfile, Classroom, ClassroomId, InMemoryRosterRepository,
    RepositoryError, RosterError, RosterImporter, RosterRepository, StaffAssignment, StaffId,
    StaffMember,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Builds the roster from CSV exports, or from the demo roster when none are given.
pub(crate) fn load_roster(
    source: &RosterSourceArgs,
    today: NaiveDate,
    at: DateTime<Utc>,
) -> Result<Arc<InMemoryRosterRepository>, AppError> {
    let repository = Arc::new(InMemoryRosterRepository::default());

    if source.is_empty() {
        seed_demo_roster(repository.as_ref(), today, at).map_err(RosterError::from)?;
        info!("no roster exports given; seeded demo roster");
        return Ok(repository);
    }

    if let Some(path) = &source.children_csv {
        RosterImporter::children_from_path(path, repository.as_ref(), at)?;
    }
    if let Some(path) = &source.staff_csv {
        RosterImporter::staff_from_path(path, repository.as_ref(), at)?;
    }
    Ok(repository)
}

struct DemoChild {
    id: &'static str,
    first_name: &'static str,
    last_name: &'static str,
    age_in_months: Option<u32>,
    kindergarten: bool,
    classroom: &'static str,
    checked_in: bool,
}

const DEMO_CLASSROOMS: &[(&str, &str)] = &[
    ("sunflowers", "Sunflowers"),
    ("willow", "Willow"),
    ("oak", "Oak"),
];

const DEMO_CHILDREN: &[DemoChild] = &[
    DemoChild { id: "c-101", first_name: "Ava", last_name: "Stone", age_in_months: Some(5), kindergarten: false, classroom: "sunflowers", checked_in: true },
    DemoChild { id: "c-102", first_name: "Milo", last_name: "Reyes", age_in_months: Some(9), kindergarten: false, classroom: "sunflowers", checked_in: true },
    DemoChild { id: "c-103", first_name: "Nora", last_name: "Kim", age_in_months: Some(11), kindergarten: false, classroom: "sunflowers", checked_in: true },
    DemoChild { id: "c-104", first_name: "Theo", last_name: "Grant", age_in_months: Some(15), kindergarten: false, classroom: "sunflowers", checked_in: true },
    DemoChild { id: "c-105", first_name: "Iris", last_name: "Lowe", age_in_months: Some(7), kindergarten: false, classroom: "sunflowers", checked_in: true },
    DemoChild { id: "c-201", first_name: "Ben", last_name: "Cho", age_in_months: Some(18), kindergarten: false, classroom: "willow", checked_in: true },
    DemoChild { id: "c-202", first_name: "June", last_name: "Park", age_in_months: Some(22), kindergarten: false, classroom: "willow", checked_in: true },
    DemoChild { id: "c-203", first_name: "Leo", last_name: "Hart", age_in_months: Some(26), kindergarten: false, classroom: "willow", checked_in: true },
    DemoChild { id: "c-204", first_name: "Ruby", last_name: "Shaw", age_in_months: Some(30), kindergarten: false, classroom: "willow", checked_in: true },
    DemoChild { id: "c-205", first_name: "Owen", last_name: "Pike", age_in_months: Some(33), kindergarten: false, classroom: "willow", checked_in: true },
    DemoChild { id: "c-206", first_name: "Cora", last_name: "Diaz", age_in_months: None, kindergarten: false, classroom: "willow", checked_in: true },
    DemoChild { id: "c-301", first_name: "Dev", last_name: "Patel", age_in_months: Some(41), kindergarten: false, classroom: "oak", checked_in: true },
    DemoChild { id: "c-302", first_name: "Fay", last_name: "Wu", age_in_months: Some(47), kindergarten: false, classroom: "oak", checked_in: true },
    DemoChild { id: "c-303", first_name: "Eli", last_name: "Fox", age_in_months: Some(64), kindergarten: true, classroom: "oak", checked_in: true },
];

const DEMO_STAFF: &[(&str, &str, &str, &str, bool)] = &[
    ("s-01", "Maya", "Ortiz", "sunflowers", true),
    ("s-02", "Jon", "Baker", "willow", true),
    ("s-03", "Priya", "Nair", "oak", true),
    ("s-04", "Sam", "Cole", "sunflowers", false),
];

/// Seeds three classrooms whose ages are relative to `today`, so the demo
/// shows one room over ratio, one at capacity, and one within ratio.
pub(crate) fn seed_demo_roster<R>(
    repository: &R,
    today: NaiveDate,
    at: DateTime<Utc>,
) -> Result<(), RepositoryError>
where
    R: RosterRepository + ?Sized,
{
    for (id, name) in DEMO_CLASSROOMS {
        repository.upsert_classroom(Classroom {
            classroom_id: ClassroomId::from(*id),
            name: (*name).to_string(),
        })?;
    }

    for demo in DEMO_CHILDREN {
        let child_id = ChildId::from(demo.id);
        repository.upsert_child(ChildProfile {
            child_id: child_id.clone(),
            first_name: demo.first_name.to_string(),
            last_name: demo.last_name.to_string(),
            date_of_birth: demo
                .age_in_months
                .and_then(|months| today.checked_sub_months(Months::new(months))),
            is_kindergarten_enrolled: demo.kindergarten,
            classroom_id: ClassroomId::from(demo.classroom),
        })?;
        if demo.checked_in {
            repository.record_child_attendance(&child_id, Attendance::Present { since: at })?;
        }
    }

    for (id, first_name, last_name, classroom, signed_in) in DEMO_STAFF {
        let staff_id = StaffId::from(*id);
        repository.upsert_staff(StaffMember {
            staff_id: staff_id.clone(),
            first_name: (*first_name).to_string(),
            last_name: (*last_name).to_string(),
        })?;
        repository.insert_assignment(StaffAssignment::new(
            staff_id.clone(),
            ClassroomId::from(*classroom),
            at,
        ))?;
        if *signed_in {
            repository.record_staff_attendance(&staff_id, Attendance::Present { since: at })?;
        }
    }

    Ok(())
}

/// Fixed bearer tokens for local use, one per role.
pub(crate) fn demo_directory() -> StaticProfileDirectory {
    let sessions = [
        ("demo-admin", "Avery Admin", Role::Administrator),
        ("demo-director", "Dana Director", Role::Director),
        ("demo-teacher", "Terry Teacher", Role::Teacher),
        ("demo-parent", "Pat Parent", Role::Parent),
    ];
    StaticProfileDirectory::new(sessions.into_iter().map(|(token, name, role)| {
        (
            token.to_string(),
            UserProfile {
                user_id: format!("user-{}", role.label()),
                display_name: name.to_string(),
                role,
            },
        )
    }))
}
