//! Identifier aliases.
//!
//! All identifiers are opaque strings compared by exact byte value.
//! Aliases keep signatures readable without imposing conversion
//! boilerplate at the CSV boundary.

/// Unique identifier for a student.
pub type StudentId = String;

/// Unique identifier for a course.
pub type CourseId = String;

/// Unique identifier for an examination hall.
pub type HallId = String;

/// Unique identifier for a time slot.
///
/// Canonical form is `YYYY-MM-DDThh:mmZ#N` where `N` is the 1-based
/// position of the slot within its day. Allowed-slot inputs are keyed
/// on this exact form.
pub type SlotId = String;
