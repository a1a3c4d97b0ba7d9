//! Course conflict graph.
//!
//! Vertices are courses; an edge connects two courses whenever at least
//! one student is enrolled in both, weighted by the number of shared
//! students. The colorer treats any positive weight as a hard
//! constraint; weights and unweighted degrees feed its tie-breaking.
//!
//! # Representation
//! Adjacency is stored as one ordered neighbor map per vertex, sized by
//! edge density rather than |V|². Enrollment data is typically sparse:
//! most course pairs share no students.

use std::collections::{BTreeMap, HashMap};

use crate::models::{Course, CourseId, StudentId};

/// Weighted undirected conflict graph over courses.
///
/// The course order is fixed at construction (ascending by course id,
/// the iteration order of the input map) and stable for the graph's
/// lifetime; all other components address courses by index into it.
#[derive(Debug, Clone)]
pub struct ConflictGraph {
    courses: Vec<CourseId>,
    course_index: HashMap<CourseId, usize>,
    adjacency: Vec<BTreeMap<usize, u32>>,
    degrees: Vec<usize>,
}

impl ConflictGraph {
    /// Builds the conflict graph from a course map.
    ///
    /// Iterates once over each student's set of courses and increments
    /// the weight of every unordered pair; a student's duplicate
    /// enrollments in one course collapse to a single participation.
    /// Degrees count distinct neighbors (unweighted) and grow only on
    /// the first 0→1 weight transition of an edge.
    pub fn new(courses: &BTreeMap<CourseId, Course>) -> Self {
        let course_list: Vec<CourseId> = courses.keys().cloned().collect();
        let course_index: HashMap<CourseId, usize> = course_list
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();

        let n = course_list.len();
        let mut adjacency: Vec<BTreeMap<usize, u32>> = vec![BTreeMap::new(); n];
        let mut degrees = vec![0usize; n];

        // Each student's distinct course indices, in a stable order.
        let mut student_courses: BTreeMap<&StudentId, Vec<usize>> = BTreeMap::new();
        for (course_id, course) in courses {
            let idx = course_index[course_id];
            for student in &course.enrollments {
                let entry = student_courses.entry(student).or_default();
                if !entry.contains(&idx) {
                    entry.push(idx);
                }
            }
        }

        for indices in student_courses.values() {
            for i in 0..indices.len() {
                for j in (i + 1)..indices.len() {
                    let (a, b) = (indices[i], indices[j]);
                    let weight = adjacency[a].entry(b).or_insert(0);
                    if *weight == 0 {
                        degrees[a] += 1;
                        degrees[b] += 1;
                    }
                    *weight += 1;
                    *adjacency[b].entry(a).or_insert(0) += 1;
                }
            }
        }

        Self {
            courses: course_list,
            course_index,
            adjacency,
            degrees,
        }
    }

    /// Number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.courses.len()
    }

    /// Whether the graph has no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// The ordered course list.
    pub fn courses(&self) -> &[CourseId] {
        &self.courses
    }

    /// The course at a vertex index.
    #[inline]
    pub fn course(&self, vertex: usize) -> &CourseId {
        &self.courses[vertex]
    }

    /// The vertex index of a course, if present.
    pub fn index_of(&self, course_id: &str) -> Option<usize> {
        self.course_index.get(course_id).copied()
    }

    /// Shared-student count between two vertices (0 = no edge).
    pub fn weight(&self, a: usize, b: usize) -> u32 {
        self.adjacency[a].get(&b).copied().unwrap_or(0)
    }

    /// Neighbors of a vertex with their edge weights, ascending by index.
    pub fn neighbors(&self, vertex: usize) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.adjacency[vertex].iter().map(|(&n, &w)| (n, w))
    }

    /// Unweighted degree: number of distinct neighbors.
    #[inline]
    pub fn degree(&self, vertex: usize) -> usize {
        self.degrees[vertex]
    }
}
