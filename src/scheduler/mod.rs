//! The scheduling engine.
//!
//! Four stages, composed by [`search::run_attempts`]:
//!
//! - **`dsatur`**: slot assignment via saturation-driven graph coloring
//! - **`halls`**: per-slot hall packing with multi-hall fallback
//! - **`penalty`**: soft-constraint scoring of a coloring
//! - **`search`**: seeded multi-restart harness keeping the best result

pub mod dsatur;
pub mod halls;
pub mod penalty;
pub mod search;

pub use dsatur::{color_graph, InfeasibleError};
pub use halls::{allocate_halls, UsedHalls};
pub use penalty::{calculate_penalty, PenaltyConfig};
pub use search::{
    run_attempts, wall_clock_seed, NoFeasibleError, ScheduleResult, SearchConfig, DEFAULT_TRIES,
};
