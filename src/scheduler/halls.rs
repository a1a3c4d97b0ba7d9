//! Per-slot hall allocation.
//!
//! Packs the courses of one slot into halls: tightest single fit first,
//! then a greedy multi-hall combination, then a capacity warning when
//! even the whole remaining catalog is too small.
//!
//! Within one slot no hall is handed to two courses; the removal
//! discipline on the available list enforces that. Across slots the
//! caller-owned usage registry keeps allocations independent.

use std::collections::{HashMap, HashSet};

use crate::models::{Assignment, CourseId, Hall, HallId, SlotId};

/// Halls already consumed, per slot.
pub type UsedHalls = HashMap<SlotId, HashSet<HallId>>;

/// Allocates halls to every assignment of one slot.
///
/// Assignments are processed largest-enrollment first (ties broken by
/// course id ascending). Each assignment's `halls` field is written as
/// the `;`-joined ascending-sorted hall list, and consumed halls are
/// recorded in `used_halls` under `slot_id`.
///
/// Returns the per-course hall sets and any capacity warnings.
pub fn allocate_halls(
    assignments: &mut [Assignment],
    halls: &[Hall],
    used_halls: &mut UsedHalls,
    slot_id: &SlotId,
) -> (HashMap<CourseId, Vec<HallId>>, Vec<String>) {
    let mut allocated: HashMap<CourseId, Vec<HallId>> = HashMap::new();
    let mut warnings = Vec::new();

    assignments.sort_by(|a, b| {
        b.enrolled_count
            .cmp(&a.enrolled_count)
            .then_with(|| a.course_id.cmp(&b.course_id))
    });

    let used = used_halls.entry(slot_id.clone()).or_default();
    let mut available: Vec<&Hall> = halls.iter().filter(|h| !used.contains(&h.id)).collect();
    available.sort_by_key(|h| h.capacity);

    for assignment in assignments.iter_mut() {
        let needed = assignment.enrolled_count;
        let mut course_halls: Vec<HallId> = Vec::new();

        // Tightest single fit: the smallest hall that still holds everyone.
        let mut best_fit: Option<usize> = None;
        for (i, hall) in available.iter().enumerate() {
            if hall.capacity >= needed
                && best_fit.is_none_or(|b| hall.capacity < available[b].capacity)
            {
                best_fit = Some(i);
            }
        }

        if let Some(i) = best_fit {
            let hall = available.remove(i);
            used.insert(hall.id.clone());
            course_halls.push(hall.id.clone());
        } else {
            // Greedy multi-hall fallback: largest halls first.
            available.sort_by(|a, b| b.capacity.cmp(&a.capacity));

            let mut combined = 0;
            let mut take = 0;
            while take < available.len() && combined < needed {
                combined += available[take].capacity;
                take += 1;
            }

            if combined >= needed {
                for hall in available.drain(..take) {
                    used.insert(hall.id.clone());
                    course_halls.push(hall.id.clone());
                }
            } else {
                warnings.push(format!(
                    "course {} (enrolled: {}) could not be fully allocated. Total available capacity: {}",
                    assignment.course_id, needed, combined
                ));
                for hall in available.drain(..) {
                    used.insert(hall.id.clone());
                    course_halls.push(hall.id.clone());
                }
            }
        }

        assignment.set_halls(&course_halls);
        allocated.insert(assignment.course_id.clone(), course_halls);
    }

    (allocated, warnings)
}
