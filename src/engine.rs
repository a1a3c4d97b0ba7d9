//! Scheduling invocation envelope.
//!
//! Ties the stages together for a caller holding nothing but CSV text
//! and a parameter block: parse inputs → generate slots → build the
//! conflict graph → run the search → serialize the schedule → verify
//! it. Returns either a success value with the schedule CSV, the
//! verification report, and run statistics, or a failure envelope with
//! an error message and whatever statistics were gathered.

use std::fmt;
use std::time::Instant;

use log::info;
use serde::{Deserialize, Serialize};

use crate::graph::ConflictGraph;
use crate::io::{
    parse_allowed_slots, parse_halls, parse_registrations, serialize_assignments, ColumnMapping,
};
use crate::models::ValidationReport;
use crate::scheduler::{run_attempts, wall_clock_seed, PenaltyConfig, SearchConfig, DEFAULT_TRIES};
use crate::slots::generate_slots;
use crate::verify::verify_schedule;

/// Parameters of one scheduling invocation.
///
/// All fields are optional in serialized form; zero values select the
/// documented defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunParams {
    /// First exam day, ISO local date.
    pub exam_start_date: String,
    /// Last exam day, ISO local date (inclusive).
    pub exam_end_date: String,
    /// Sittings per day when `slot_times` is empty.
    pub slots_per_day: usize,
    /// Explicit sitting times (`HH:MM`), overriding `slots_per_day`.
    pub slot_times: Vec<String>,
    /// Sitting length in minutes.
    pub slot_duration: i64,
    /// Dates (ISO) without exams, besides Saturdays and Sundays.
    pub holidays: Vec<String>,
    /// Search attempts. 0 means 100.
    pub tries: usize,
    /// Master seed. 0 derives one from the wall clock.
    pub seed: i64,
    /// Minimum comfortable gap between a student's exams, in minutes.
    pub min_gap: i64,
    /// Optional allowed-slots CSV (`course_id,slot_id`).
    pub allowed_slots_csv: String,
    /// IANA zone name. Empty or unknown falls back to UTC.
    pub timezone: String,
    /// Input column renames.
    pub column_mapping: Option<ColumnMapping>,
    /// Soft-penalty weights.
    pub penalty: PenaltyConfig,
}

/// Statistics of one invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// The master seed actually used.
    pub seed: i64,
    /// Wall-clock time of the invocation, in milliseconds.
    pub total_time_ms: f64,
    /// Search attempts executed.
    pub attempts: usize,
    /// Penalty of the winning attempt.
    pub best_penalty: f64,
    /// Distinct slots used by the final schedule.
    pub slots_used: usize,
}

/// A completed scheduling run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSuccess {
    /// The schedule in its CSV form.
    pub schedule_csv: String,
    /// Verification of that schedule against the inputs.
    pub report: ValidationReport,
    /// Run statistics.
    pub stats: Stats,
}

/// A failed scheduling run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunFailure {
    /// What went wrong.
    pub error: String,
    /// Partial findings, when verification got far enough to produce any.
    pub report: Option<ValidationReport>,
    /// Statistics gathered before the failure.
    pub stats: Stats,
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.error)
    }
}

impl std::error::Error for RunFailure {}

/// Runs a full scheduling invocation over CSV inputs.
pub fn run_schedule(
    reg_csv: &str,
    halls_csv: &str,
    params: &RunParams,
) -> Result<RunSuccess, RunFailure> {
    let started = Instant::now();

    let tries = if params.tries == 0 {
        DEFAULT_TRIES
    } else {
        params.tries
    };
    let timezone = if params.timezone.is_empty() {
        "UTC"
    } else {
        &params.timezone
    };
    // Resolve the seed up front so even failure envelopes carry the
    // value a caller would need to reproduce the run.
    let seed = if params.seed == 0 {
        wall_clock_seed()
    } else {
        params.seed
    };

    let fail = move |error: String, started: &Instant| RunFailure {
        error,
        report: None,
        stats: Stats {
            seed,
            total_time_ms: started.elapsed().as_secs_f64() * 1000.0,
            ..Stats::default()
        },
    };

    let (courses, registrations) = parse_registrations(reg_csv, params.column_mapping.as_ref())
        .map_err(|e| fail(format!("failed to parse registrations CSV: {e}"), &started))?;
    let halls = parse_halls(halls_csv, params.column_mapping.as_ref())
        .map_err(|e| fail(format!("failed to parse halls CSV: {e}"), &started))?;
    let allowed_slots = parse_allowed_slots(&params.allowed_slots_csv)
        .map_err(|e| fail(format!("failed to parse allowed slots CSV: {e}"), &started))?;

    let slots = generate_slots(
        &params.exam_start_date,
        &params.exam_end_date,
        params.slots_per_day,
        &params.slot_times,
        params.slot_duration,
        &params.holidays,
        timezone,
    )
    .map_err(|e| fail(format!("failed to generate slots: {e}"), &started))?;

    info!(
        "scheduling {} courses into {} slots across {} halls",
        courses.len(),
        slots.len(),
        halls.len()
    );

    let graph = ConflictGraph::new(&courses);
    let config = SearchConfig {
        tries,
        seed,
        min_gap_minutes: params.min_gap,
        penalty: params.penalty,
        cancel: None,
    };
    let result = run_attempts(&courses, &halls, &slots, &allowed_slots, &graph, &config)
        .map_err(|e| fail(format!("scheduling failed: {e}"), &started))?;

    let schedule_csv = serialize_assignments(&result.assignments)
        .map_err(|e| fail(format!("failed to serialize schedule: {e}"), &started))?;

    let mut report = verify_schedule(&registrations, &schedule_csv, &halls)
        .map_err(|e| fail(format!("failed to verify schedule: {e}"), &started))?;
    // The allocator's own warnings carry the authoritative shortfall
    // figures for this run.
    report.capacity_warnings = result.capacity_warnings.clone();

    let mut used_slots: Vec<&str> = result
        .assignments
        .iter()
        .map(|a| a.slot_id.as_str())
        .collect();
    used_slots.sort_unstable();
    used_slots.dedup();

    Ok(RunSuccess {
        schedule_csv,
        report,
        stats: Stats {
            seed: result.seed,
            total_time_ms: started.elapsed().as_secs_f64() * 1000.0,
            attempts: result.attempts,
            best_penalty: result.penalty,
            slots_used: used_slots.len(),
        },
    })
}

/// Verifies an existing schedule CSV against registrations, without a
/// hall catalog. Capacity checks degrade to warnings.
pub fn verify_only(reg_csv: &str, schedule_csv: &str) -> Result<ValidationReport, RunFailure> {
    let (_, registrations) = parse_registrations(reg_csv, None).map_err(|e| RunFailure {
        error: format!("failed to parse registrations CSV: {e}"),
        report: None,
        stats: Stats::default(),
    })?;
    verify_schedule(&registrations, schedule_csv, &[]).map_err(|e| RunFailure {
        error: format!("failed to parse schedule CSV: {e}"),
        report: None,
        stats: Stats::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const REG_CSV: &str = "student_id,course_id\n\
        s1,c1\n\
        s1,c2\n\
        s2,c1\n\
        s3,c3\n\
        s4,c3\n\
        s4,c4\n";
    const HALLS_CSV: &str = "hall,capacity\nH1,5\nH2,2\n";

    fn base_params() -> RunParams {
        RunParams {
            exam_start_date: "2025-01-20".to_string(),
            exam_end_date: "2025-01-21".to_string(),
            slot_times: vec!["09:00".to_string(), "14:00".to_string()],
            slot_duration: 180,
            tries: 10,
            seed: 12345,
            min_gap: 60,
            timezone: "UTC".to_string(),
            ..RunParams::default()
        }
    }

    #[test]
    fn test_end_to_end_run() {
        let success = run_schedule(REG_CSV, HALLS_CSV, &base_params()).unwrap();

        // 4 assignment lines plus the header.
        assert_eq!(success.schedule_csv.lines().count(), 5);
        assert!(success
            .schedule_csv
            .starts_with("course_id,slot_id,slot_datetime,halls,enrolled_count,notes"));
        assert!(success.report.valid, "report: {:?}", success.report);
        assert_eq!(success.stats.seed, 12345);
        assert!(success.stats.attempts >= 1);
        assert!(success.stats.slots_used >= 2);
    }

    #[test]
    fn test_run_is_deterministic() {
        let first = run_schedule(REG_CSV, HALLS_CSV, &base_params()).unwrap();
        let second = run_schedule(REG_CSV, HALLS_CSV, &base_params()).unwrap();
        assert_eq!(first.schedule_csv, second.schedule_csv);
        assert_eq!(first.stats.best_penalty, second.stats.best_penalty);
    }

    #[test]
    fn test_engine_output_verifies_clean() {
        let success = run_schedule(REG_CSV, HALLS_CSV, &base_params()).unwrap();
        let report = verify_only(REG_CSV, &success.schedule_csv).unwrap();
        assert_eq!(report.conflicts, 0);
        assert!(report.unassigned.is_empty());
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_empty_registrations() {
        let success =
            run_schedule("student_id,course_id\n", HALLS_CSV, &base_params()).unwrap();
        assert_eq!(success.schedule_csv.lines().count(), 1);
        assert!(success.report.valid);
        assert_eq!(success.stats.slots_used, 0);
    }

    #[test]
    fn test_no_slots_fails() {
        let mut params = base_params();
        // Every candidate day is a holiday.
        params.holidays = vec!["2025-01-20".to_string(), "2025-01-21".to_string()];

        let failure = run_schedule(REG_CSV, HALLS_CSV, &params).unwrap_err();
        assert!(failure.error.contains("scheduling failed"));
    }

    #[test]
    fn test_unparseable_registrations_fail() {
        let failure = run_schedule("not,a header\nx,y\n", HALLS_CSV, &base_params()).unwrap_err();
        assert!(failure.error.contains("registrations"));
    }

    #[test]
    fn test_invalid_dates_fail() {
        let mut params = base_params();
        params.exam_start_date = "January 20".to_string();
        let failure = run_schedule(REG_CSV, HALLS_CSV, &params).unwrap_err();
        assert!(failure.error.contains("failed to generate slots"));
    }

    #[test]
    fn test_default_tries_and_timezone() {
        let mut params = base_params();
        params.tries = 0;
        params.timezone = String::new();
        let success = run_schedule(REG_CSV, HALLS_CSV, &params).unwrap();
        assert!(success.report.valid);
    }

    #[test]
    fn test_params_deserialize_camel_case() {
        let json = r#"{
            "examStartDate": "2025-01-20",
            "examEndDate": "2025-01-21",
            "slotTimes": ["09:00", "14:00"],
            "slotDuration": 180,
            "tries": 5,
            "seed": 7,
            "minGap": 60,
            "timezone": "UTC",
            "columnMapping": {"studentIdColumn": "matric_no"}
        }"#;
        let params: RunParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.exam_start_date, "2025-01-20");
        assert_eq!(params.slot_times.len(), 2);
        assert_eq!(
            params.column_mapping.unwrap().student_id_column,
            "matric_no"
        );
    }
}
