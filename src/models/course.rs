//! Course and registration models.
//!
//! A course carries its raw enrollment list in registration order.
//! Duplicate (student, course) rows are kept: the conflict graph
//! collapses them to a single participation, while the penalty
//! evaluator and the verifier see every row.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::ids::{CourseId, SlotId, StudentId};

/// A course with its student enrollments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Course {
    /// Unique course identifier.
    pub id: CourseId,
    /// Enrolled students, in registration order. May contain duplicates.
    pub enrollments: Vec<StudentId>,
}

/// One student-course registration row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Registered student.
    pub student_id: StudentId,
    /// Registered course.
    pub course_id: CourseId,
}

/// One allowed-slot restriction row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedSlot {
    /// Restricted course.
    pub course_id: CourseId,
    /// A slot the course may occupy.
    pub slot_id: SlotId,
}

/// Per-course slot restrictions.
///
/// A course absent from the map, or mapped to an empty set, may occupy
/// any slot.
pub type AllowedSlots = BTreeMap<CourseId, BTreeSet<SlotId>>;

impl Course {
    /// Creates a course with no enrollments.
    pub fn new(id: impl Into<CourseId>) -> Self {
        Self {
            id: id.into(),
            enrollments: Vec::new(),
        }
    }

    /// Adds an enrollment.
    pub fn with_enrollment(mut self, student: impl Into<StudentId>) -> Self {
        self.enrollments.push(student.into());
        self
    }

    /// Number of enrollments, duplicates included.
    #[inline]
    pub fn enrolled_count(&self) -> usize {
        self.enrollments.len()
    }
}

impl Registration {
    /// Creates a registration row.
    pub fn new(student_id: impl Into<StudentId>, course_id: impl Into<CourseId>) -> Self {
        Self {
            student_id: student_id.into(),
            course_id: course_id.into(),
        }
    }
}
