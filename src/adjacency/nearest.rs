//! Approximate Voronoi adjacency from k-nearest neighbors.

use std::collections::BTreeSet;

use crate::models::NodeTable;

use super::AdjacencyOracle;

/// Default neighborhood size; a 3-D Voronoi cell has about 15 facets on average.
pub const DEFAULT_NEIGHBORS: usize = 12;

/// Symmetrized k-nearest-neighbor graph on 3-D points.
///
/// Every Voronoi neighbor that is among the `k` closest points of either
/// endpoint is found, which covers the facets that matter for growing compact
/// groups. Ties are broken by the lower point index.
///
/// # Examples
///
/// ```
/// use u_partition::adjacency::{AdjacencyOracle, NearestNeighborAdjacency};
///
/// let points = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [5.0, 0.0, 0.0], [6.0, 0.0, 0.0]];
/// let oracle = NearestNeighborAdjacency::build(&points, 1);
/// assert_eq!(oracle.neighbors(0), &[1]);
/// assert_eq!(oracle.neighbors(1), &[0]);
/// assert_eq!(oracle.neighbors(2), &[3]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NearestNeighborAdjacency {
    neighbors: Vec<Vec<usize>>,
}

impl NearestNeighborAdjacency {
    /// Builds the graph over `points` with `k` neighbors per point (at least 1).
    pub fn build(points: &[[f64; 3]], k: usize) -> Self {
        let n = points.len();
        let k = k.max(1).min(n.saturating_sub(1));
        let mut sets: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); n];

        let mut order: Vec<(f64, usize)> = Vec::with_capacity(n);
        for (i, p) in points.iter().enumerate() {
            order.clear();
            order.extend(
                points
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != i)
                    .map(|(j, q)| (squared_distance(p, q), j)),
            );
            if k < order.len() {
                order.select_nth_unstable_by(k - 1, |a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
                order.truncate(k);
            }
            for &(_, j) in &order {
                sets[i].insert(j);
                sets[j].insert(i);
            }
        }

        Self {
            neighbors: sets.into_iter().map(|s| s.into_iter().collect()).collect(),
        }
    }

    /// Builds the graph over the 3-D embedding of `table`.
    pub fn for_table(table: &NodeTable, k: usize) -> Self {
        Self::build(&table.embedding(), k)
    }
}

impl AdjacencyOracle for NearestNeighborAdjacency {
    fn len(&self) -> usize {
        self.neighbors.len()
    }

    fn neighbors(&self, point: usize) -> &[usize] {
        &self.neighbors[point]
    }
}

fn squared_distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Customer, TimeWindow};

    fn grid(side: usize) -> Vec<[f64; 3]> {
        let mut points = Vec::new();
        for x in 0..side {
            for y in 0..side {
                points.push([x as f64, y as f64, 0.0]);
            }
        }
        points
    }

    #[test]
    fn test_symmetric() {
        let oracle = NearestNeighborAdjacency::build(&grid(5), 4);
        for i in 0..oracle.len() {
            for &j in oracle.neighbors(i) {
                assert_ne!(i, j);
                assert!(oracle.neighbors(j).contains(&i));
            }
        }
    }

    #[test]
    fn test_grid_center_reaches_ring() {
        let oracle = NearestNeighborAdjacency::build(&grid(3), 4);
        // Center (1, 1) picks its axis neighbors; corners pick the center back.
        assert_eq!(oracle.neighbors(4), &[0, 1, 2, 3, 5, 6, 7, 8]);
        assert_eq!(oracle.neighbors(0), &[1, 2, 3, 4, 6]);
    }

    #[test]
    fn test_k_larger_than_points() {
        let oracle = NearestNeighborAdjacency::build(&grid(2), 50);
        for i in 0..4 {
            assert_eq!(oracle.neighbors(i).len(), 3);
        }
    }

    #[test]
    fn test_single_point() {
        let oracle = NearestNeighborAdjacency::build(&[[0.0, 0.0, 0.0]], 3);
        assert_eq!(oracle.len(), 1);
        assert!(oracle.neighbors(0).is_empty());
    }

    #[test]
    fn test_for_table_uses_time_axis() {
        let tw = |a, b| TimeWindow::new(a, b).expect("valid");
        let table = NodeTable::new(vec![
            Customer::depot(0.0, 0.0).with_time_window(tw(0.0, 10.0)),
            Customer::new(1, 10.0, 0.0, 1, 0.0).with_time_window(tw(1000.0, 1010.0)),
            Customer::new(2, 30.0, 0.0, 1, 0.0).with_time_window(tw(0.0, 10.0)),
            Customer::new(3, 12.0, 0.0, 1, 0.0).with_time_window(tw(1000.0, 1010.0)),
        ]);
        let oracle = NearestNeighborAdjacency::for_table(&table, 1);
        // Customer 1 is the closest on the plane, but far away in time.
        assert_eq!(oracle.neighbors(0), &[2]);
        assert_eq!(oracle.neighbors(1), &[3]);
    }
}
