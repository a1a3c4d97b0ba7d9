//! Multi-restart scheduling search.
//!
//! Runs N independent colorer → allocator → evaluator attempts, each
//! with its own RNG seeded from a fresh 63-bit draw of a master RNG,
//! and keeps the lowest-penalty result (first observed wins on ties).
//!
//! A single infeasible attempt is recoverable: it is reported on the
//! `log` facade and the search moves on. The search fails only when no
//! attempt at all produced a schedule.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::dsatur::color_graph;
use super::halls::{allocate_halls, UsedHalls};
use super::penalty::{calculate_penalty, PenaltyConfig};
use crate::graph::ConflictGraph;
use crate::models::{AllowedSlots, Assignment, Course, CourseId, Hall, Slot};

/// Search knobs.
#[derive(Debug, Clone, Default)]
pub struct SearchConfig {
    /// Number of attempts. 0 falls back to [`DEFAULT_TRIES`].
    pub tries: usize,
    /// Master seed. 0 derives one from the wall clock.
    pub seed: i64,
    /// Minimum comfortable gap between a student's exams, in minutes.
    pub min_gap_minutes: i64,
    /// Soft-penalty weights.
    pub penalty: PenaltyConfig,
    /// Optional stop flag, observed between attempts.
    pub cancel: Option<Arc<AtomicBool>>,
}

/// Attempts used when the caller leaves `tries` at 0.
pub const DEFAULT_TRIES: usize = 100;

/// The best schedule found across all attempts.
#[derive(Debug, Clone)]
pub struct ScheduleResult {
    /// Assignments sorted by (slot_datetime, course_id).
    pub assignments: Vec<Assignment>,
    /// Penalty of the winning attempt.
    pub penalty: f64,
    /// Courses left without a slot. Always empty on success: the
    /// colorer either places every course or the attempt fails whole.
    pub unassigned: Vec<CourseId>,
    /// Capacity warnings from the winning attempt's hall allocation.
    pub capacity_warnings: Vec<String>,
    /// The master seed actually used (surfaced for reproducibility).
    pub seed: i64,
    /// Attempts executed, including infeasible ones.
    pub attempts: usize,
}

/// No attempt produced a schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoFeasibleError {
    /// Attempts executed before giving up.
    pub attempts: usize,
}

impl fmt::Display for NoFeasibleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to find a valid schedule after {} attempts",
            self.attempts
        )
    }
}

impl std::error::Error for NoFeasibleError {}

/// Runs the multi-restart search and returns the best schedule.
pub fn run_attempts(
    courses: &BTreeMap<CourseId, Course>,
    halls: &[Hall],
    slots: &[Slot],
    allowed_slots: &AllowedSlots,
    graph: &ConflictGraph,
    config: &SearchConfig,
) -> Result<ScheduleResult, NoFeasibleError> {
    let tries = if config.tries == 0 {
        DEFAULT_TRIES
    } else {
        config.tries
    };
    let seed = if config.seed == 0 {
        wall_clock_seed()
    } else {
        config.seed
    };
    let mut master = ChaCha8Rng::seed_from_u64(seed as u64);

    let mut best: Option<(f64, Vec<Assignment>, Vec<String>)> = None;
    let mut attempts = 0;

    for attempt in 0..tries {
        if let Some(cancel) = &config.cancel {
            if cancel.load(Ordering::Relaxed) {
                debug!("search cancelled after {attempts} attempts");
                break;
            }
        }

        let attempt_seed = master.random::<u64>() >> 1;
        attempts += 1;

        let coloring = match color_graph(graph, slots, allowed_slots, attempt_seed) {
            Ok(coloring) => coloring,
            Err(err) => {
                debug!("attempt {} failed: {}", attempt + 1, err);
                continue;
            }
        };

        // Group assignments by slot, in course order within each group.
        let mut by_slot: Vec<Vec<Assignment>> = vec![Vec::new(); slots.len()];
        for (course_id, course) in courses {
            let slot_idx = coloring[course_id];
            by_slot[slot_idx].push(Assignment::new(
                course_id.clone(),
                &slots[slot_idx],
                course.enrolled_count(),
            ));
        }

        let mut used_halls = UsedHalls::new();
        let mut warnings = Vec::new();
        let mut assignments = Vec::new();
        for (slot_idx, mut group) in by_slot.into_iter().enumerate() {
            if group.is_empty() {
                continue;
            }
            let (_, slot_warnings) =
                allocate_halls(&mut group, halls, &mut used_halls, &slots[slot_idx].id);
            warnings.extend(slot_warnings);
            assignments.extend(group);
        }

        let penalty = calculate_penalty(
            &coloring,
            courses,
            slots,
            config.min_gap_minutes,
            &config.penalty,
        );

        if best.as_ref().is_none_or(|(lowest, _, _)| penalty < *lowest) {
            best = Some((penalty, assignments, warnings));
        }
    }

    let Some((penalty, mut assignments, capacity_warnings)) = best else {
        return Err(NoFeasibleError { attempts });
    };

    assignments.sort_by(|a, b| {
        a.slot_datetime
            .cmp(&b.slot_datetime)
            .then_with(|| a.course_id.cmp(&b.course_id))
    });

    Ok(ScheduleResult {
        assignments,
        penalty,
        unassigned: Vec::new(),
        capacity_warnings,
        seed,
        attempts,
    })
}

/// Derives a nonzero seed from the wall clock.
pub fn wall_clock_seed() -> i64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as i64)
        .unwrap_or(1);
    if nanos == 0 {
        1
    } else {
        nanos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slots::generate_slots;
    use std::collections::HashMap;

    fn course(id: &str, students: &[&str]) -> (CourseId, Course) {
        let mut c = Course::new(id);
        for s in students {
            c = c.with_enrollment(*s);
        }
        (id.to_string(), c)
    }

    fn acceptance_fixture() -> (BTreeMap<CourseId, Course>, Vec<Hall>, Vec<Slot>) {
        let courses: BTreeMap<_, _> = [
            course("c1", &["s1", "s2"]),
            course("c2", &["s1"]),
            course("c3", &["s3", "s4"]),
            course("c4", &["s4"]),
        ]
        .into_iter()
        .collect();
        let halls = vec![Hall::new("H1", 5), Hall::new("H2", 2)];
        let slots = generate_slots(
            "2025-01-20",
            "2025-01-21",
            2,
            &["09:00".into(), "14:00".into()],
            180,
            &[],
            "UTC",
        )
        .unwrap();
        (courses, halls, slots)
    }

    #[test]
    fn test_acceptance_four_courses() {
        let (courses, halls, slots) = acceptance_fixture();
        let graph = ConflictGraph::new(&courses);
        let config = SearchConfig {
            tries: 10,
            seed: 12345,
            min_gap_minutes: 60,
            ..SearchConfig::default()
        };

        let result = run_attempts(&courses, &halls, &slots, &AllowedSlots::new(), &graph, &config)
            .unwrap();

        assert_eq!(result.assignments.len(), 4);
        assert_eq!(result.seed, 12345);
        assert!(result.unassigned.is_empty());

        let by_course: HashMap<&str, &Assignment> = result
            .assignments
            .iter()
            .map(|a| (a.course_id.as_str(), a))
            .collect();
        assert_ne!(by_course["c1"].slot_id, by_course["c2"].slot_id);
        assert_ne!(by_course["c3"].slot_id, by_course["c4"].slot_id);
        for a in &result.assignments {
            assert!(!a.halls.is_empty(), "{} has no hall", a.course_id);
        }
    }

    #[test]
    fn test_output_sorted_and_deterministic() {
        let (courses, halls, slots) = acceptance_fixture();
        let graph = ConflictGraph::new(&courses);
        let config = SearchConfig {
            tries: 10,
            seed: 777,
            ..SearchConfig::default()
        };

        let first = run_attempts(&courses, &halls, &slots, &AllowedSlots::new(), &graph, &config)
            .unwrap();
        let second = run_attempts(&courses, &halls, &slots, &AllowedSlots::new(), &graph, &config)
            .unwrap();

        let key = |r: &ScheduleResult| {
            r.assignments
                .iter()
                .map(|a| (a.course_id.clone(), a.slot_id.clone(), a.halls.clone()))
                .collect::<Vec<_>>()
        };
        assert_eq!(key(&first), key(&second));
        assert_eq!(first.penalty, second.penalty);

        let mut sorted = first.assignments.clone();
        sorted.sort_by(|a, b| {
            a.slot_datetime
                .cmp(&b.slot_datetime)
                .then_with(|| a.course_id.cmp(&b.course_id))
        });
        assert_eq!(first.assignments, sorted);
    }

    #[test]
    fn test_no_feasible_after_all_attempts() {
        // 3-clique with only 2 slots: every attempt is infeasible.
        let courses: BTreeMap<_, _> = [
            course("c1", &["s1", "s2"]),
            course("c2", &["s1", "s3"]),
            course("c3", &["s2", "s3"]),
        ]
        .into_iter()
        .collect();
        let halls = vec![Hall::new("H1", 10)];
        let slots = generate_slots(
            "2025-01-06",
            "2025-01-06",
            2,
            &["09:00".into(), "14:00".into()],
            180,
            &[],
            "UTC",
        )
        .unwrap();
        let graph = ConflictGraph::new(&courses);
        let config = SearchConfig {
            tries: 5,
            seed: 9,
            ..SearchConfig::default()
        };

        let err = run_attempts(&courses, &halls, &slots, &AllowedSlots::new(), &graph, &config)
            .unwrap_err();
        assert_eq!(err.attempts, 5);
    }

    #[test]
    fn test_empty_registrations_yield_empty_schedule() {
        let courses = BTreeMap::new();
        let halls = vec![Hall::new("H1", 10)];
        let slots = generate_slots(
            "2025-01-06",
            "2025-01-06",
            2,
            &["09:00".into(), "14:00".into()],
            180,
            &[],
            "UTC",
        )
        .unwrap();
        let graph = ConflictGraph::new(&courses);
        let config = SearchConfig {
            tries: 3,
            seed: 4,
            ..SearchConfig::default()
        };

        let result = run_attempts(&courses, &halls, &slots, &AllowedSlots::new(), &graph, &config)
            .unwrap();
        assert!(result.assignments.is_empty());
        assert_eq!(result.penalty, 0.0);
    }

    #[test]
    fn test_zero_seed_is_replaced_and_surfaced() {
        let (courses, halls, slots) = acceptance_fixture();
        let graph = ConflictGraph::new(&courses);
        let config = SearchConfig {
            tries: 3,
            seed: 0,
            ..SearchConfig::default()
        };

        let result = run_attempts(&courses, &halls, &slots, &AllowedSlots::new(), &graph, &config)
            .unwrap();
        assert_ne!(result.seed, 0);
    }

    #[test]
    fn test_cancellation_before_any_attempt() {
        let (courses, halls, slots) = acceptance_fixture();
        let graph = ConflictGraph::new(&courses);
        let cancel = Arc::new(AtomicBool::new(true));
        let config = SearchConfig {
            tries: 10,
            seed: 5,
            cancel: Some(cancel),
            ..SearchConfig::default()
        };

        // Nothing succeeded before the flag was observed.
        let err = run_attempts(&courses, &halls, &slots, &AllowedSlots::new(), &graph, &config)
            .unwrap_err();
        assert_eq!(err.attempts, 0);
    }

    #[test]
    fn test_min_gap_weight_increase_never_improves_penalty() {
        let (courses, halls, slots) = acceptance_fixture();
        let graph = ConflictGraph::new(&courses);
        let base = SearchConfig {
            tries: 10,
            seed: 12345,
            min_gap_minutes: 60,
            ..SearchConfig::default()
        };
        let heavier = SearchConfig {
            penalty: PenaltyConfig {
                student_proximity_weight: base.penalty.student_proximity_weight * 2.0,
                min_gap_violation_weight: base.penalty.min_gap_violation_weight * 2.0,
            },
            ..base.clone()
        };

        let p1 = run_attempts(&courses, &halls, &slots, &AllowedSlots::new(), &graph, &base)
            .unwrap()
            .penalty;
        let p2 = run_attempts(&courses, &halls, &slots, &AllowedSlots::new(), &graph, &heavier)
            .unwrap()
            .penalty;
        assert!(p2 >= p1);
    }
}
