//! Examination hall model.

use serde::{Deserialize, Serialize};

use super::ids::HallId;

/// An examination hall with a seating capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hall {
    /// Unique hall identifier.
    pub id: HallId,
    /// Number of seats.
    pub capacity: usize,
    /// Optional grouping label (e.g., a building or campus).
    /// Carried through parsing; not consulted by the allocator.
    #[serde(default)]
    pub group: Option<String>,
}

impl Hall {
    /// Creates a hall.
    pub fn new(id: impl Into<HallId>, capacity: usize) -> Self {
        Self {
            id: id.into(),
            capacity,
            group: None,
        }
    }

    /// Sets the grouping label.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}
