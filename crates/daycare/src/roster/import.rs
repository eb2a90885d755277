use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use tracing::info;

use super::domain::{
    Attendance, ChildId, ChildProfile, Classroom, ClassroomId, StaffAssignment, StaffId,
    StaffMember,
};
use super::repository::{RepositoryError, RosterRepository};
use crate::dates::parse_date;

#[derive(Debug, thiserror::Error)]
pub enum RosterImportError {
    #[error("failed to read roster export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid roster CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("roster export line {line}: {reason}")]
    InvalidRow { line: u64, reason: String },
    #[error("could not store imported roster: {0}")]
    Repository(#[from] RepositoryError),
}

/// Counts reported back after an import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub classrooms_created: usize,
    pub records: usize,
    pub present: usize,
}

#[derive(Debug, Deserialize)]
struct ChildRow {
    #[serde(rename = "Child ID")]
    child_id: String,
    #[serde(rename = "First Name")]
    first_name: String,
    #[serde(rename = "Last Name")]
    last_name: String,
    #[serde(
        rename = "Date of Birth",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    date_of_birth: Option<String>,
    #[serde(rename = "Kindergarten", default, deserialize_with = "empty_string_as_none")]
    kindergarten: Option<String>,
    #[serde(rename = "Classroom")]
    classroom: String,
    #[serde(rename = "Checked In", default, deserialize_with = "empty_string_as_none")]
    checked_in: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StaffRow {
    #[serde(rename = "Staff ID")]
    staff_id: String,
    #[serde(rename = "First Name")]
    first_name: String,
    #[serde(rename = "Last Name")]
    last_name: String,
    #[serde(rename = "Classroom", default, deserialize_with = "empty_string_as_none")]
    classroom: Option<String>,
    #[serde(rename = "Signed In", default, deserialize_with = "empty_string_as_none")]
    signed_in: Option<String>,
}

/// Loads children and staff exports into any roster repository.
pub struct RosterImporter;

impl RosterImporter {
    pub fn children_from_path<P, R>(
        path: P,
        repository: &R,
        at: DateTime<Utc>,
    ) -> Result<ImportSummary, RosterImportError>
    where
        P: AsRef<Path>,
        R: RosterRepository + ?Sized,
    {
        let file = std::fs::File::open(path)?;
        Self::children_from_reader(file, repository, at)
    }

    pub fn staff_from_path<P, R>(
        path: P,
        repository: &R,
        at: DateTime<Utc>,
    ) -> Result<ImportSummary, RosterImportError>
    where
        P: AsRef<Path>,
        R: RosterRepository + ?Sized,
    {
        let file = std::fs::File::open(path)?;
        Self::staff_from_reader(file, repository, at)
    }

    /// Columns: `Child ID,First Name,Last Name,Date of Birth,Kindergarten,Classroom,Checked In`.
    /// Children marked checked in are recorded present as of `at`.
    pub fn children_from_reader<Rd, R>(
        reader: Rd,
        repository: &R,
        at: DateTime<Utc>,
    ) -> Result<ImportSummary, RosterImportError>
    where
        Rd: Read,
        R: RosterRepository + ?Sized,
    {
        let mut csv_reader = csv_reader(reader);
        let mut known = known_classrooms(repository)?;
        let mut summary = ImportSummary::default();

        for (index, row) in csv_reader.deserialize::<ChildRow>().enumerate() {
            let row = row?;
            let line = data_line(index);

            let date_of_birth = row
                .date_of_birth
                .as_deref()
                .map(parse_date)
                .transpose()
                .map_err(|reason| RosterImportError::InvalidRow { line, reason })?;
            let is_kindergarten_enrolled = parse_flag(row.kindergarten.as_deref(), line)?;
            let checked_in = parse_flag(row.checked_in.as_deref(), line)?;
            let child_id = required(&row.child_id, "Child ID", line)?;
            let classroom_id = required(&row.classroom, "Classroom", line)?;

            summary.classrooms_created +=
                ensure_classroom(repository, &mut known, &classroom_id)?;

            let child_id = ChildId(child_id);
            repository.upsert_child(ChildProfile {
                child_id: child_id.clone(),
                first_name: row.first_name,
                last_name: row.last_name,
                date_of_birth,
                is_kindergarten_enrolled,
                classroom_id: ClassroomId(classroom_id),
            })?;
            if checked_in {
                repository.record_child_attendance(&child_id, Attendance::Present { since: at })?;
                summary.present += 1;
            }
            summary.records += 1;
        }

        info!(
            children = summary.records,
            checked_in = summary.present,
            classrooms_created = summary.classrooms_created,
            "children roster imported"
        );
        Ok(summary)
    }

    /// Columns: `Staff ID,First Name,Last Name,Classroom,Signed In`. A
    /// non-empty classroom creates an active assignment as of `at`.
    pub fn staff_from_reader<Rd, R>(
        reader: Rd,
        repository: &R,
        at: DateTime<Utc>,
    ) -> Result<ImportSummary, RosterImportError>
    where
        Rd: Read,
        R: RosterRepository + ?Sized,
    {
        let mut csv_reader = csv_reader(reader);
        let mut known = known_classrooms(repository)?;
        let mut summary = ImportSummary::default();

        for (index, row) in csv_reader.deserialize::<StaffRow>().enumerate() {
            let row = row?;
            let line = data_line(index);

            let signed_in = parse_flag(row.signed_in.as_deref(), line)?;
            let staff_id = StaffId(required(&row.staff_id, "Staff ID", line)?);

            repository.upsert_staff(StaffMember {
                staff_id: staff_id.clone(),
                first_name: row.first_name,
                last_name: row.last_name,
            })?;

            if let Some(classroom) = row.classroom {
                summary.classrooms_created +=
                    ensure_classroom(repository, &mut known, &classroom)?;
                match repository.insert_assignment(StaffAssignment::new(
                    staff_id.clone(),
                    ClassroomId(classroom),
                    at,
                )) {
                    Ok(()) | Err(RepositoryError::Conflict) => {}
                    Err(other) => return Err(other.into()),
                }
            }

            if signed_in {
                repository.record_staff_attendance(&staff_id, Attendance::Present { since: at })?;
                summary.present += 1;
            }
            summary.records += 1;
        }

        info!(
            staff = summary.records,
            signed_in = summary.present,
            classrooms_created = summary.classrooms_created,
            "staff roster imported"
        );
        Ok(summary)
    }
}

fn csv_reader<Rd: Read>(reader: Rd) -> csv::Reader<Rd> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}

// Header is line 1, so the first data row is line 2.
fn data_line(index: usize) -> u64 {
    index as u64 + 2
}

fn known_classrooms<R>(repository: &R) -> Result<BTreeSet<ClassroomId>, RepositoryError>
where
    R: RosterRepository + ?Sized,
{
    Ok(repository
        .classrooms()?
        .into_iter()
        .map(|classroom| classroom.classroom_id)
        .collect())
}

fn ensure_classroom<R>(
    repository: &R,
    known: &mut BTreeSet<ClassroomId>,
    name: &str,
) -> Result<usize, RepositoryError>
where
    R: RosterRepository + ?Sized,
{
    let classroom_id = ClassroomId(name.to_string());
    if known.contains(&classroom_id) {
        return Ok(0);
    }
    repository.upsert_classroom(Classroom {
        classroom_id: classroom_id.clone(),
        name: name.to_string(),
    })?;
    known.insert(classroom_id);
    Ok(1)
}

fn required(value: &str, column: &str, line: u64) -> Result<String, RosterImportError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RosterImportError::InvalidRow {
            line,
            reason: format!("{column} is required"),
        });
    }
    Ok(trimmed.to_string())
}

fn parse_flag(value: Option<&str>, line: u64) -> Result<bool, RosterImportError> {
    let Some(raw) = value else {
        return Ok(false);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Ok(true),
        "false" | "no" | "n" | "0" => Ok(false),
        other => Err(RosterImportError::InvalidRow {
            line,
            reason: format!("expected yes/no flag, found '{other}'"),
        }),
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
pub(crate) fn parse_flag_for_tests(value: Option<&str>) -> Result<bool, RosterImportError> {
    parse_flag(value, 2)
}

