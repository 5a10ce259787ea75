//! Edge extraction and deduplication
//!
//! A tetrahedron has six edges and neighboring tetrahedra share most of
//! them. Extraction expands every tetrahedron, canonicalizes each pair so the
//! smaller index comes first, then sorts and drops duplicates.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::engine::Tetrahedron;

/// Canonical undirected edge between two vertex indices
///
/// Endpoints are reordered so that `v0 <= v1`; the derived ordering is
/// lexicographic on `(v0, v1)`, which is also the output order.
///
/// # Example
///
/// ```rust
/// use weighted_delaunay_edges::Edge;
///
/// let edge = Edge::new(7, 2);
/// assert_eq!(edge, Edge::new(2, 7));
/// assert_eq!((edge.v0(), edge.v1()), (2, 7));
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    v0: u32,
    v1: u32,
}

impl Edge {
    /// Create a canonical edge from two endpoints in any order
    #[inline]
    pub const fn new(a: u32, b: u32) -> Self {
        if a <= b {
            Self { v0: a, v1: b }
        } else {
            Self { v0: b, v1: a }
        }
    }

    /// Smaller endpoint
    #[inline]
    pub const fn v0(self) -> u32 {
        self.v0
    }

    /// Larger endpoint
    #[inline]
    pub const fn v1(self) -> u32 {
        self.v1
    }

    /// Both endpoints, smaller first
    #[inline]
    pub const fn endpoints(self) -> (u32, u32) {
        (self.v0, self.v1)
    }

    /// True for a loop on a single vertex
    #[inline]
    pub const fn is_degenerate(self) -> bool {
        self.v0 == self.v1
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.v0, self.v1)
    }
}

impl Tetrahedron {
    /// The six canonical vertex pairs of this tetrahedron
    pub fn edges(&self) -> [Edge; 6] {
        let [a, b, c, d] = self.0;
        [
            Edge::new(a, b),
            Edge::new(a, c),
            Edge::new(a, d),
            Edge::new(b, c),
            Edge::new(b, d),
            Edge::new(c, d),
        ]
    }
}

/// Reduce tetrahedra to their sorted, duplicate-free edge set
///
/// # Example
///
/// ```rust
/// use weighted_delaunay_edges::{extract_edges, Edge, Tetrahedron};
///
/// let tets = [Tetrahedron::new(0, 1, 2, 3), Tetrahedron::new(1, 2, 3, 4)];
/// let edges = extract_edges(&tets);
///
/// // Three edges of the shared face appear once
/// assert_eq!(edges.len(), 9);
/// assert_eq!(edges[0], Edge::new(0, 1));
/// ```
pub fn extract_edges(tetrahedra: &[Tetrahedron]) -> Vec<Edge> {
    let mut edges = Vec::with_capacity(tetrahedra.len() * 6);
    for tet in tetrahedra {
        edges.extend(tet.edges().into_iter().filter(|e| !e.is_degenerate()));
    }

    edges.sort_unstable();
    edges.dedup();
    edges
}
