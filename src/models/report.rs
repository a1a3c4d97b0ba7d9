//! Validation report model.
//!
//! Collects everything the verifier finds wrong with a schedule.
//! Schedule defects never abort verification; they accumulate here.
//!
//! `valid` holds iff there are zero clashes, zero errors, and zero
//! unassigned courses. Capacity warnings do not affect validity.

use serde::{Deserialize, Serialize};

use super::ids::CourseId;

/// Result of verifying a schedule against registrations and halls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// Whether the schedule passed every fatal check.
    pub valid: bool,
    /// Number of student clashes found.
    pub conflicts: usize,
    /// Courses present in registrations but absent from the schedule.
    pub unassigned: Vec<CourseId>,
    /// Non-fatal capacity findings (shortfalls, unknown halls).
    pub capacity_warnings: Vec<String>,
    /// Fatal findings (e.g., a double-booked hall).
    pub errors: Vec<String>,
    /// One entry per student clash.
    pub student_clashes: Vec<String>,
}

impl ValidationReport {
    /// Creates an empty report with `valid` set.
    pub fn new() -> Self {
        Self {
            valid: true,
            conflicts: 0,
            unassigned: Vec::new(),
            capacity_warnings: Vec::new(),
            errors: Vec::new(),
            student_clashes: Vec::new(),
        }
    }

    /// Records a student clash. Clears `valid`.
    pub fn record_clash(&mut self, description: impl Into<String>) {
        self.student_clashes.push(description.into());
        self.conflicts += 1;
        self.valid = false;
    }

    /// Records a fatal error. Clears `valid`.
    pub fn record_error(&mut self, description: impl Into<String>) {
        self.errors.push(description.into());
        self.valid = false;
    }

    /// Records a course missing from the schedule. Clears `valid`.
    pub fn record_unassigned(&mut self, course_id: impl Into<CourseId>) {
        self.unassigned.push(course_id.into());
        self.valid = false;
    }

    /// Records a non-fatal capacity warning.
    pub fn record_capacity_warning(&mut self, description: impl Into<String>) {
        self.capacity_warnings.push(description.into());
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}
