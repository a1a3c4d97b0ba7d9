//! Assignment model.
//!
//! An assignment places one course into one slot with zero or more
//! halls. The field order matches the schedule CSV column order:
//! `course_id,slot_id,slot_datetime,halls,enrolled_count,notes`.

use serde::{Deserialize, Serialize};

use super::ids::{CourseId, HallId, SlotId};
use super::slot::Slot;

/// A course scheduled into a specific slot and hall set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Scheduled course.
    pub course_id: CourseId,
    /// Assigned slot.
    pub slot_id: SlotId,
    /// Slot start rendered as RFC 3339 with offset.
    pub slot_datetime: String,
    /// `;`-joined, ascending-sorted hall identifiers. Empty if none.
    #[serde(default)]
    pub halls: String,
    /// Number of enrollments, duplicates included.
    pub enrolled_count: usize,
    /// Free-form annotation. Usually empty.
    #[serde(default)]
    pub notes: String,
}

impl Assignment {
    /// Creates an assignment for a course in a slot, with no halls yet.
    pub fn new(course_id: impl Into<CourseId>, slot: &Slot, enrolled_count: usize) -> Self {
        Self {
            course_id: course_id.into(),
            slot_id: slot.id.clone(),
            slot_datetime: slot.start_rfc3339(),
            halls: String::new(),
            enrolled_count,
            notes: String::new(),
        }
    }

    /// Stores a hall set as the `;`-joined ascending-sorted rendering.
    pub fn set_halls(&mut self, halls: &[HallId]) {
        let mut ids: Vec<&str> = halls.iter().map(String::as_str).collect();
        ids.sort_unstable();
        self.halls = ids.join(";");
    }

    /// The hall identifiers listed on this assignment.
    pub fn hall_ids(&self) -> Vec<HallId> {
        self.halls
            .split(';')
            .filter(|h| !h.is_empty())
            .map(str::to_string)
            .collect()
    }
}
