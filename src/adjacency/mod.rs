//! Voronoi-cell adjacency over the 3-D embedding of a node table.
//!
//! The geometric partitioner grows groups along the adjacency graph exposed by
//! an [`AdjacencyOracle`]. Nodes are embedded at (x, y, time-window midpoint).
//!
//! - [`StaticAdjacency`] — neighbor lists computed elsewhere (e.g. by a
//!   computational-geometry backend) and handed over as-is
//! - [`NearestNeighborAdjacency`] — in-crate approximation from symmetrized
//!   k-nearest neighbors

mod nearest;
mod static_graph;

pub use nearest::{NearestNeighborAdjacency, DEFAULT_NEIGHBORS};
pub use static_graph::StaticAdjacency;

/// Read-only adjacency between the points of one node table.
///
/// Neighbor sets of a true Voronoi diagram are symmetric, but callers must not
/// rely on it and always query from the side they are growing.
pub trait AdjacencyOracle: Send + Sync {
    /// Number of points covered.
    fn len(&self) -> usize;

    /// Returns `true` if no point is covered.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Points sharing a cell facet with `point`, in ascending order.
    fn neighbors(&self, point: usize) -> &[usize];
}
