//! Independent schedule verification.
//!
//! Re-checks a produced schedule (in its CSV form) against the original
//! registrations and the hall catalog, from scratch. Schedule defects
//! never abort verification; they accumulate on the report. The only
//! hard failure is a schedule CSV that cannot be read at all.
//!
//! With an empty hall catalog the capacity checks degrade gracefully:
//! per-hall lookups find nothing, so shortfalls are reported against a
//! total of zero and no unknown-hall noise is emitted.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::io::{parse_schedule, ParseError};
use crate::models::{
    Assignment, CourseId, Hall, HallId, Registration, SlotId, StudentId, ValidationReport,
};

/// Verifies a schedule CSV against registrations and a hall catalog.
///
/// The catalog may be empty; capacity checks then degrade to warnings.
/// Every registration row counts: duplicate (student, course) pairs
/// register as clashes rather than being deduplicated away.
pub fn verify_schedule(
    registrations: &[Registration],
    schedule_csv: &str,
    halls: &[Hall],
) -> Result<ValidationReport, ParseError> {
    let assignments = parse_schedule(schedule_csv)?;
    let mut report = ValidationReport::new();

    let assignment_map: HashMap<&CourseId, &Assignment> =
        assignments.iter().map(|a| (&a.course_id, a)).collect();
    let hall_capacity: HashMap<&HallId, usize> =
        halls.iter().map(|h| (&h.id, h.capacity)).collect();

    // Student clashes: a student twice in one slot.
    let mut student_slots: HashMap<&StudentId, HashSet<&SlotId>> = HashMap::new();
    for registration in registrations {
        let Some(assignment) = assignment_map.get(&registration.course_id) else {
            continue; // reported below as unassigned
        };
        let slots = student_slots.entry(&registration.student_id).or_default();
        if !slots.insert(&assignment.slot_id) {
            report.record_clash(format!(
                "student {} has a clash in slot {}",
                registration.student_id, assignment.slot_id
            ));
        }
    }

    // Hall double-booking and capacity.
    let mut slot_hall_usage: HashMap<&SlotId, HashMap<HallId, usize>> = HashMap::new();
    for assignment in &assignments {
        let mut total_capacity = 0;
        for hall_id in assignment.hall_ids() {
            let Some(&capacity) = hall_capacity.get(&hall_id) else {
                if !halls.is_empty() {
                    report.record_capacity_warning(format!(
                        "course {} assigned to unknown hall {}",
                        assignment.course_id, hall_id
                    ));
                }
                continue;
            };
            total_capacity += capacity;

            let usage = slot_hall_usage
                .entry(&assignment.slot_id)
                .or_default()
                .entry(hall_id.clone())
                .or_insert(0);
            *usage += 1;
            if *usage > 1 {
                report.record_error(format!(
                    "hall {} is double-booked in slot {}",
                    hall_id, assignment.slot_id
                ));
            }
        }

        if total_capacity < assignment.enrolled_count {
            report.record_capacity_warning(format!(
                "course {} has insufficient capacity. Enrolled: {}, Allocated: {} in halls [{}]",
                assignment.course_id, assignment.enrolled_count, total_capacity, assignment.halls
            ));
        }
    }

    // Registered courses missing from the schedule.
    let registered: BTreeSet<&CourseId> =
        registrations.iter().map(|r| &r.course_id).collect();
    for course_id in registered {
        if !assignment_map.contains_key(course_id) {
            report.record_unassigned(course_id.clone());
        }
    }

    Ok(report)
}
