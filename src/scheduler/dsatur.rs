//! DSATUR graph colorer.
//!
//! Assigns a slot index (color) to every course so that no two
//! conflicting courses share a slot, honoring per-course allowed-slot
//! palettes.
//!
//! # Algorithm
//!
//! Classic degree-of-saturation coloring: repeatedly pick the uncolored
//! vertex whose colored neighbors block the largest number of colors
//! still achievable for it, break ties by unweighted degree, then
//! uniformly at random from the seeded RNG, and give it the smallest
//! feasible slot index from its palette.
//!
//! # Determinism
//! Identical inputs and seed produce an identical coloring. The RNG is
//! consumed only when the random tie-break actually has more than one
//! candidate.
//!
//! # Reference
//! Brélaz (1979), "New methods to color the vertices of a graph"

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::graph::ConflictGraph;
use crate::models::{AllowedSlots, CourseId, Slot};

/// The instance admits no coloring under its palettes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfeasibleError {
    /// The course that could not be given any slot.
    pub course_id: CourseId,
}

impl fmt::Display for InfeasibleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "infeasible schedule: cannot assign a slot to course {}",
            self.course_id
        )
    }
}

impl std::error::Error for InfeasibleError {}

/// Colors the conflict graph, mapping each course to a slot index.
///
/// A course listed in `allowed_slots` with a non-empty set may only
/// occupy those slots; any other course may occupy any slot.
pub fn color_graph(
    graph: &ConflictGraph,
    slots: &[Slot],
    allowed_slots: &AllowedSlots,
    seed: u64,
) -> Result<HashMap<CourseId, usize>, InfeasibleError> {
    let n = graph.len();

    // Per-vertex candidate palette, fixed for the whole run.
    let palettes: Vec<BTreeSet<usize>> = (0..n)
        .map(|v| match allowed_slots.get(graph.course(v)) {
            Some(allowed) if !allowed.is_empty() => slots
                .iter()
                .enumerate()
                .filter(|(_, slot)| allowed.contains(&slot.id))
                .map(|(idx, _)| idx)
                .collect(),
            _ => (0..slots.len()).collect(),
        })
        .collect();

    let mut colors: Vec<Option<usize>> = vec![None; n];
    let mut saturation = vec![0usize; n];
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    for _ in 0..n {
        let vertex = select_vertex(graph, &colors, &saturation, &mut rng);

        // Smallest palette index no colored neighbor already holds.
        let chosen = palettes[vertex].iter().copied().find(|&k| {
            graph
                .neighbors(vertex)
                .all(|(neighbor, _)| colors[neighbor] != Some(k))
        });
        let Some(color) = chosen else {
            return Err(InfeasibleError {
                course_id: graph.course(vertex).clone(),
            });
        };
        colors[vertex] = Some(color);

        // The chosen color becomes newly unreachable for every uncolored
        // neighbor that could still use it and had no other colored
        // neighbor already holding it.
        for (neighbor, _) in graph.neighbors(vertex) {
            if colors[neighbor].is_some() || !palettes[neighbor].contains(&color) {
                continue;
            }
            let newly_blocked = graph
                .neighbors(neighbor)
                .all(|(other, _)| other == vertex || colors[other] != Some(color));
            if newly_blocked {
                saturation[neighbor] += 1;
            }
        }
    }

    Ok(colors
        .into_iter()
        .enumerate()
        .map(|(v, color)| (graph.course(v).clone(), color.unwrap_or_default()))
        .collect())
}

/// Picks the next vertex: maximum saturation, then maximum degree, then
/// uniformly at random among the remaining ties.
fn select_vertex(
    graph: &ConflictGraph,
    colors: &[Option<usize>],
    saturation: &[usize],
    rng: &mut ChaCha8Rng,
) -> usize {
    let mut candidates: Vec<usize> = Vec::new();
    let mut max_saturation = 0;
    for v in 0..graph.len() {
        if colors[v].is_some() {
            continue;
        }
        if candidates.is_empty() || saturation[v] > max_saturation {
            max_saturation = saturation[v];
            candidates.clear();
            candidates.push(v);
        } else if saturation[v] == max_saturation {
            candidates.push(v);
        }
    }

    if candidates.len() > 1 {
        let max_degree = candidates
            .iter()
            .map(|&v| graph.degree(v))
            .max()
            .unwrap_or(0);
        candidates.retain(|&v| graph.degree(v) == max_degree);
    }

    if candidates.len() > 1 {
        candidates[rng.random_range(0..candidates.len())]
    } else {
        candidates[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Course;
    use crate::slots::generate_slots;
    use std::collections::BTreeMap;

    fn course(id: &str, students: &[&str]) -> (CourseId, Course) {
        let mut c = Course::new(id);
        for s in students {
            c = c.with_enrollment(*s);
        }
        (id.to_string(), c)
    }

    fn make_slots(start: &str, end: &str) -> Vec<Slot> {
        generate_slots(
            start,
            end,
            2,
            &["09:00".into(), "14:00".into()],
            180,
            &[],
            "UTC",
        )
        .unwrap()
    }

    #[test]
    fn test_conflicting_courses_get_distinct_slots() {
        // c1-c2 and c1-c3 conflict; c4 is isolated.
        let courses: BTreeMap<_, _> = [
            course("c1", &["s1", "s2"]),
            course("c2", &["s1"]),
            course("c3", &["s2"]),
            course("c4", &["s3"]),
        ]
        .into_iter()
        .collect();
        let graph = ConflictGraph::new(&courses);
        let slots = make_slots("2025-01-06", "2025-01-07");

        let coloring = color_graph(&graph, &slots, &AllowedSlots::new(), 123).unwrap();

        assert_eq!(coloring.len(), 4);
        assert_ne!(coloring["c1"], coloring["c2"]);
        assert_ne!(coloring["c1"], coloring["c3"]);
    }

    #[test]
    fn test_infeasible_clique() {
        // A 3-clique cannot be colored with 2 slots.
        let courses: BTreeMap<_, _> = [
            course("c1", &["s1", "s2"]),
            course("c2", &["s1", "s3"]),
            course("c3", &["s2", "s3"]),
        ]
        .into_iter()
        .collect();
        let graph = ConflictGraph::new(&courses);
        let slots = make_slots("2025-01-06", "2025-01-06");
        assert_eq!(slots.len(), 2);

        let err = color_graph(&graph, &slots, &AllowedSlots::new(), 123).unwrap_err();
        assert!(["c1", "c2", "c3"].contains(&err.course_id.as_str()));
    }

    #[test]
    fn test_allowed_slots_conflict_is_infeasible() {
        let courses: BTreeMap<_, _> = [course("c1", &["s1"]), course("c2", &["s1"])]
            .into_iter()
            .collect();
        let graph = ConflictGraph::new(&courses);
        let slots = make_slots("2025-01-06", "2025-01-06");

        // Both courses pinned to the same slot: impossible.
        let mut allowed = AllowedSlots::new();
        allowed
            .entry("c1".to_string())
            .or_default()
            .insert(slots[0].id.clone());
        allowed
            .entry("c2".to_string())
            .or_default()
            .insert(slots[0].id.clone());

        assert!(color_graph(&graph, &slots, &allowed, 123).is_err());
    }

    #[test]
    fn test_allowed_slots_force_assignment() {
        let courses: BTreeMap<_, _> = [course("c1", &["s1"]), course("c2", &["s1"])]
            .into_iter()
            .collect();
        let graph = ConflictGraph::new(&courses);
        let slots = make_slots("2025-01-06", "2025-01-06");

        let mut allowed = AllowedSlots::new();
        allowed
            .entry("c1".to_string())
            .or_default()
            .insert(slots[0].id.clone());
        allowed
            .entry("c2".to_string())
            .or_default()
            .insert(slots[1].id.clone());

        let coloring = color_graph(&graph, &slots, &allowed, 123).unwrap();
        assert_eq!(coloring["c1"], 0);
        assert_eq!(coloring["c2"], 1);
    }

    #[test]
    fn test_coloring_stays_inside_palette() {
        let courses: BTreeMap<_, _> = [
            course("c1", &["s1"]),
            course("c2", &["s1"]),
            course("c3", &["s2"]),
        ]
        .into_iter()
        .collect();
        let graph = ConflictGraph::new(&courses);
        let slots = make_slots("2025-01-06", "2025-01-07");

        let mut allowed = AllowedSlots::new();
        for course_id in ["c1", "c2"] {
            let entry = allowed.entry(course_id.to_string()).or_default();
            entry.insert(slots[2].id.clone());
            entry.insert(slots[3].id.clone());
        }

        let coloring = color_graph(&graph, &slots, &allowed, 7).unwrap();
        assert!(coloring["c1"] >= 2);
        assert!(coloring["c2"] >= 2);
    }

    #[test]
    fn test_same_seed_same_coloring() {
        // Many interchangeable vertices force the random tie-break.
        let courses: BTreeMap<_, _> = (0..12)
            .map(|i| {
                let id = format!("c{i:02}");
                let student = format!("s{}", i / 2);
                (id.clone(), Course::new(id).with_enrollment(student))
            })
            .collect();
        let graph = ConflictGraph::new(&courses);
        let slots = make_slots("2025-01-06", "2025-01-07");

        let first = color_graph(&graph, &slots, &AllowedSlots::new(), 42).unwrap();
        let second = color_graph(&graph, &slots, &AllowedSlots::new(), 42).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_graph_yields_empty_coloring() {
        let graph = ConflictGraph::new(&BTreeMap::new());
        let slots = make_slots("2025-01-06", "2025-01-06");
        let coloring = color_graph(&graph, &slots, &AllowedSlots::new(), 1).unwrap();
        assert!(coloring.is_empty());
    }
}
