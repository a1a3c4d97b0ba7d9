//! Exam scheduling domain models.
//!
//! Provides the core data types shared by the graph builder, the
//! colorer, the hall allocator, the verifier, and the CSV boundary.
//!
//! All entities are constructed during a single scheduling invocation
//! and are immutable once produced, except [`Assignment::halls`] which
//! the hall allocator populates after coloring.

mod assignment;
mod course;
mod hall;
mod ids;
mod report;
mod slot;

pub use assignment::Assignment;
pub use course::{AllowedSlot, AllowedSlots, Course, Registration};
pub use hall::Hall;
pub use ids::{CourseId, HallId, SlotId, StudentId};
pub use report::ValidationReport;
pub use slot::Slot;
