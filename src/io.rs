//! CSV boundary: registrations, halls, allowed slots, schedules.
//!
//! Input parsing is deliberately forgiving below the header line:
//! `#`-prefixed comment lines are skipped, extra columns are ignored,
//! and malformed or incomplete rows are dropped silently. A header
//! missing a required column is fatal.
//!
//! Duplicate (student, course) registrations are kept (penalty and
//! verification count each row) but are surfaced on the `log` facade
//! so callers can decide whether the data is intentional.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use csv::{ReaderBuilder, Trim, WriterBuilder};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::models::{
    AllowedSlot, AllowedSlots, Assignment, Course, CourseId, Hall, Registration,
};

/// Renames for the required input columns.
///
/// Unset fields keep the defaults (`student_id`, `course_id`, `hall`,
/// `capacity`, `group`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnMapping {
    /// Column holding student identifiers.
    pub student_id_column: String,
    /// Column holding course identifiers.
    pub course_id_column: String,
    /// Column holding hall identifiers.
    pub hall_id_column: String,
    /// Column holding hall capacities.
    pub capacity_column: String,
    /// Column holding hall group labels.
    pub group_column: String,
}

/// A CSV input could not be read at all.
#[derive(Debug)]
pub enum ParseError {
    /// The underlying CSV data is unreadable.
    Csv(csv::Error),
    /// The header lacks one or more required columns.
    MissingColumns {
        /// The column names that were expected but absent.
        columns: Vec<String>,
    },
    /// Writing serialized output failed.
    Io(std::io::Error),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv(err) => write!(f, "unreadable CSV: {err}"),
            Self::MissingColumns { columns } => {
                write!(f, "missing required columns: {}", columns.join(", "))
            }
            Self::Io(err) => write!(f, "CSV output failed: {err}"),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Csv(err) => Some(err),
            Self::MissingColumns { .. } => None,
            Self::Io(err) => Some(err),
        }
    }
}

impl From<csv::Error> for ParseError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

fn input_reader(data: &str) -> csv::Reader<&[u8]> {
    ReaderBuilder::new()
        .comment(Some(b'#'))
        .flexible(true)
        .trim(Trim::All)
        .from_reader(data.as_bytes())
}

/// Finds the indices of required (and optional) columns in a header.
fn column_indices(
    header: &csv::StringRecord,
    required: &[&str],
    optional: &[&str],
) -> Result<(Vec<usize>, Vec<Option<usize>>), ParseError> {
    let position = |name: &str| header.iter().position(|col| col == name);

    let mut found = Vec::with_capacity(required.len());
    let mut missing = Vec::new();
    for &name in required {
        match position(name) {
            Some(idx) => found.push(idx),
            None => missing.push(name.to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(ParseError::MissingColumns { columns: missing });
    }
    let optional_found = optional.iter().map(|&name| position(name)).collect();
    Ok((found, optional_found))
}

fn non_empty(name: &str, fallback: &str) -> String {
    if name.is_empty() {
        fallback.to_string()
    } else {
        name.to_string()
    }
}

/// Parses the registrations CSV into courses and raw registration rows.
///
/// The course map is ordered by course id, which fixes the vertex order
/// of the conflict graph and makes every downstream stage reproducible.
pub fn parse_registrations(
    csv_data: &str,
    mapping: Option<&ColumnMapping>,
) -> Result<(BTreeMap<CourseId, Course>, Vec<Registration>), ParseError> {
    let student_col = non_empty(
        mapping.map_or("", |m| m.student_id_column.as_str()),
        "student_id",
    );
    let course_col = non_empty(
        mapping.map_or("", |m| m.course_id_column.as_str()),
        "course_id",
    );

    let mut reader = input_reader(csv_data);
    let header = reader.headers()?.clone();
    let (required, _) = column_indices(&header, &[student_col.as_str(), course_col.as_str()], &[])?;
    let (student_idx, course_idx) = (required[0], required[1]);

    let mut courses: BTreeMap<CourseId, Course> = BTreeMap::new();
    let mut registrations = Vec::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();

    for record in reader.records() {
        let Ok(record) = record else {
            continue; // malformed row
        };
        let (Some(student_id), Some(course_id)) = (record.get(student_idx), record.get(course_idx))
        else {
            continue;
        };
        if student_id.is_empty() || course_id.is_empty() {
            continue;
        }

        if !seen.insert((student_id.to_string(), course_id.to_string())) {
            warn!("duplicate registration: student {student_id} in course {course_id}");
        }

        registrations.push(Registration::new(student_id, course_id));
        courses
            .entry(course_id.to_string())
            .or_insert_with(|| Course::new(course_id))
            .enrollments
            .push(student_id.to_string());
    }

    Ok((courses, registrations))
}

/// Parses the halls CSV. Rows with a non-integer or negative capacity
/// are skipped.
pub fn parse_halls(
    csv_data: &str,
    mapping: Option<&ColumnMapping>,
) -> Result<Vec<Hall>, ParseError> {
    let hall_col = non_empty(mapping.map_or("", |m| m.hall_id_column.as_str()), "hall");
    let capacity_col = non_empty(
        mapping.map_or("", |m| m.capacity_column.as_str()),
        "capacity",
    );
    let group_col = non_empty(mapping.map_or("", |m| m.group_column.as_str()), "group");

    let mut reader = input_reader(csv_data);
    let header = reader.headers()?.clone();
    let (required, optional) = column_indices(
        &header,
        &[hall_col.as_str(), capacity_col.as_str()],
        &[group_col.as_str()],
    )?;
    let (hall_idx, capacity_idx) = (required[0], required[1]);
    let group_idx = optional[0];

    let mut halls = Vec::new();
    for record in reader.records() {
        let Ok(record) = record else {
            continue;
        };
        let Some(hall_id) = record.get(hall_idx).filter(|id| !id.is_empty()) else {
            continue;
        };
        let Some(capacity) = record
            .get(capacity_idx)
            .and_then(|c| c.parse::<usize>().ok())
        else {
            continue;
        };

        let mut hall = Hall::new(hall_id, capacity);
        if let Some(group) = group_idx.and_then(|idx| record.get(idx)).filter(|g| !g.is_empty()) {
            hall = hall.with_group(group);
        }
        halls.push(hall);
    }

    Ok(halls)
}

/// Parses the optional allowed-slots CSV. Empty input means no
/// restrictions.
pub fn parse_allowed_slots(csv_data: &str) -> Result<AllowedSlots, ParseError> {
    let mut allowed = AllowedSlots::new();
    if csv_data.trim().is_empty() {
        return Ok(allowed);
    }

    let mut reader = input_reader(csv_data);
    for row in reader.deserialize::<AllowedSlot>() {
        let restriction = row?;
        if restriction.course_id.is_empty() || restriction.slot_id.is_empty() {
            continue;
        }
        allowed
            .entry(restriction.course_id)
            .or_default()
            .insert(restriction.slot_id);
    }

    Ok(allowed)
}

/// Serializes assignments to the schedule CSV form.
///
/// Header row is exactly
/// `course_id,slot_id,slot_datetime,halls,enrolled_count,notes`;
/// commas and quotes inside fields are quoted per standard CSV.
pub fn serialize_assignments(assignments: &[Assignment]) -> Result<String, ParseError> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    if assignments.is_empty() {
        // serde emits the header lazily; an empty schedule still needs it.
        writer.write_record([
            "course_id",
            "slot_id",
            "slot_datetime",
            "halls",
            "enrolled_count",
            "notes",
        ])?;
    }
    for assignment in assignments {
        writer.serialize(assignment)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| ParseError::Io(err.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Parses a schedule CSV back into assignments.
///
/// Used by the verifier. The five columns before `notes` are required;
/// rows that fail to deserialize are skipped.
pub fn parse_schedule(csv_data: &str) -> Result<Vec<Assignment>, ParseError> {
    let mut reader = input_reader(csv_data);
    let header = reader.headers()?.clone();
    column_indices(
        &header,
        &[
            "course_id",
            "slot_id",
            "slot_datetime",
            "halls",
            "enrolled_count",
        ],
        &[],
    )?;

    let mut assignments = Vec::new();
    for row in reader.deserialize::<Assignment>() {
        let Ok(assignment) = row else {
            continue; // malformed row
        };
        assignments.push(assignment);
    }
    Ok(assignments)
}
