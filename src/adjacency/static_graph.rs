//! Adjacency from explicit neighbor lists.

use std::collections::BTreeSet;

use crate::error::{PartitionError, Result};

use super::AdjacencyOracle;

/// Neighbor lists handed over by an external backend.
///
/// Lists are deduplicated, sorted and stripped of self-loops.
///
/// # Examples
///
/// ```
/// use u_partition::adjacency::{AdjacencyOracle, StaticAdjacency};
///
/// let oracle = StaticAdjacency::from_neighbor_lists(vec![
///     vec![1, 2],
///     vec![2, 0, 2],
///     vec![0, 1],
/// ]).unwrap();
/// assert_eq!(oracle.neighbors(1), &[0, 2]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticAdjacency {
    neighbors: Vec<Vec<usize>>,
}

impl StaticAdjacency {
    /// Wraps the given lists, one per point.
    ///
    /// # Errors
    ///
    /// [`PartitionError::SizeMismatch`] if a list names a point that does not
    /// exist.
    pub fn from_neighbor_lists(lists: Vec<Vec<usize>>) -> Result<Self> {
        let len = lists.len();
        let mut neighbors = Vec::with_capacity(len);
        for (point, list) in lists.into_iter().enumerate() {
            let set: BTreeSet<usize> = list.into_iter().filter(|&n| n != point).collect();
            if let Some(&last) = set.iter().next_back() {
                if last >= len {
                    return Err(PartitionError::SizeMismatch {
                        expected: len,
                        actual: last + 1,
                    });
                }
            }
            neighbors.push(set.into_iter().collect());
        }
        Ok(Self { neighbors })
    }

    /// Builds symmetric lists from undirected edges over `len` points.
    pub fn from_edges(len: usize, edges: &[(usize, usize)]) -> Result<Self> {
        let mut lists = vec![Vec::new(); len];
        for &(a, b) in edges {
            if a >= len || b >= len {
                return Err(PartitionError::SizeMismatch {
                    expected: len,
                    actual: a.max(b) + 1,
                });
            }
            lists[a].push(b);
            lists[b].push(a);
        }
        Self::from_neighbor_lists(lists)
    }
}

impl AdjacencyOracle for StaticAdjacency {
    fn len(&self) -> usize {
        self.neighbors.len()
    }

    fn neighbors(&self, point: usize) -> &[usize] {
        &self.neighbors[point]
    }
}
