//! Time slot model.
//!
//! A slot is one contiguous exam sitting with an absolute start and end
//! instant in the scheduling time zone. Slots are produced in
//! chronological order by the slot generator and addressed everywhere
//! else by their index in that order.

use chrono::{DateTime, SecondsFormat};
use chrono_tz::Tz;

use super::ids::SlotId;

/// One contiguous exam sitting.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    /// Canonical slot identifier (`YYYY-MM-DDThh:mmZ#N`).
    pub id: SlotId,
    /// Sitting start instant.
    pub start: DateTime<Tz>,
    /// Sitting end instant. Always after `start`.
    pub end: DateTime<Tz>,
    /// 0-based index of the working day this slot falls on.
    pub day_index: usize,
    /// 0-based position of this slot within its day.
    pub index_in_day: usize,
}

impl Slot {
    /// Creates a slot.
    pub fn new(
        id: impl Into<SlotId>,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
        day_index: usize,
        index_in_day: usize,
    ) -> Self {
        Self {
            id: id.into(),
            start,
            end,
            day_index,
            index_in_day,
        }
    }

    /// The start instant rendered as RFC 3339 with offset (`Z` for UTC).
    pub fn start_rfc3339(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}
