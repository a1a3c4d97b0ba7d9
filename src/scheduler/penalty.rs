//! Soft-constraint penalty evaluation.
//!
//! Scores a coloring by walking every student's exam instants and
//! charging each uncomfortable pair: two exams on the same calendar day
//! (in the scheduling time zone), and two exams closer together than
//! the configured minimum gap. Lower is better; zero means no
//! soft-constraint violations.
//!
//! The evaluator is pure and monotone in its weights. Students are
//! visited in a sorted order so the floating-point sum is reproducible.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, TimeDelta};
use chrono_tz::Tz;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::models::{Course, CourseId, Slot, StudentId};

/// Weights for the soft-penalty terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PenaltyConfig {
    /// Charge per student pair of exams on the same calendar day.
    pub student_proximity_weight: f64,
    /// Charge per student pair of exams violating the minimum gap.
    pub min_gap_violation_weight: f64,
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        Self {
            student_proximity_weight: 1.0,
            min_gap_violation_weight: 10.0,
        }
    }
}

/// Sums the soft penalty of a coloring over all student schedules.
///
/// Every registration row counts as one exam event; duplicate
/// enrollments are deliberately not collapsed here.
pub fn calculate_penalty(
    coloring: &HashMap<CourseId, usize>,
    courses: &BTreeMap<CourseId, Course>,
    slots: &[Slot],
    min_gap_minutes: i64,
    config: &PenaltyConfig,
) -> f64 {
    let mut student_exams: BTreeMap<&StudentId, Vec<DateTime<Tz>>> = BTreeMap::new();
    for (course_id, course) in courses {
        let Some(&slot_idx) = coloring.get(course_id) else {
            continue;
        };
        let start = slots[slot_idx].start;
        for student in &course.enrollments {
            student_exams.entry(student).or_default().push(start);
        }
    }

    let min_gap = TimeDelta::minutes(min_gap_minutes);
    let mut total = 0.0;

    for exams in student_exams.values() {
        for (a, b) in exams.iter().tuple_combinations() {
            let gap = (*a - *b).abs();

            if a.date_naive() == b.date_naive() {
                total += config.student_proximity_weight;
            }
            if min_gap_minutes > 0 && gap < min_gap {
                total += config.min_gap_violation_weight;
            }
        }
    }

    total
}
