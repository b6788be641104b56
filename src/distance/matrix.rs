//! Dense distance matrix.

use crate::models::NodeTable;

/// A dense n×n matrix stored in row-major order.
///
/// Backs every [`DistanceModel`](super::DistanceModel) variant.
///
/// # Examples
///
/// ```
/// use u_partition::models::{Customer, NodeTable};
/// use u_partition::distance::DistanceMatrix;
///
/// let table = NodeTable::new(vec![
///     Customer::depot(0.0, 0.0),
///     Customer::new(1, 3.0, 4.0, 10, 5.0),
///     Customer::new(2, 6.0, 8.0, 20, 5.0),
/// ]);
/// let dm = DistanceMatrix::euclidean(&table);
/// assert!((dm.get(0, 1) - 5.0).abs() < 1e-10);
/// assert_eq!(dm.size(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    data: Vec<f64>,
    size: usize,
}

impl DistanceMatrix {
    /// Creates a matrix of the given size, initialized to zero.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0.0; size * size],
            size,
        }
    }

    /// Fills a symmetric matrix from `f(i, j)` evaluated for `i < j`; the
    /// diagonal stays zero.
    pub fn symmetric_from_fn<F>(size: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut dm = Self::new(size);
        for i in 0..size {
            for j in (i + 1)..size {
                let d = f(i, j);
                dm.set(i, j, d);
                dm.set(j, i, d);
            }
        }
        dm
    }

    /// Euclidean distances on (x, y).
    pub fn euclidean(table: &NodeTable) -> Self {
        let nodes = table.nodes();
        Self::symmetric_from_fn(nodes.len(), |i, j| nodes[i].distance_to(&nodes[j]))
    }

    /// Creates a matrix from an explicit n×n grid, such as road-network
    /// distances computed elsewhere. The matrix is itself a
    /// [`DistanceModel`](super::DistanceModel).
    ///
    /// Returns `None` if the data length doesn't match `size * size`.
    pub fn from_data(size: usize, data: Vec<f64>) -> Option<Self> {
        if data.len() != size * size {
            return None;
        }
        Some(Self { data, size })
    }

    /// Returns the entry for `from` → `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    /// Sets the entry for `from` → `to`.
    pub fn set(&mut self, from: usize, to: usize, distance: f64) {
        self.data[from * self.size + to] = distance;
    }

    /// Number of locations in this matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns `true` if the matrix is symmetric within the given tolerance.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                if (self.get(i, j) - self.get(j, i)).abs() > tol {
                    return false;
                }
            }
        }
        true
    }

    /// Smallest and largest off-diagonal entry among customer pairs
    /// (row and column 0 ignored).
    ///
    /// Returns `None` when there are fewer than two customers.
    pub fn customer_range(&self) -> Option<(f64, f64)> {
        let mut range: Option<(f64, f64)> = None;
        for i in 1..self.size {
            for j in 1..self.size {
                if i == j {
                    continue;
                }
                let d = self.get(i, j);
                range = Some(match range {
                    None => (d, d),
                    Some((lo, hi)) => (lo.min(d), hi.max(d)),
                });
            }
        }
        range
    }

    /// Sum of the entries from `from` to every member of `group`.
    pub fn sum_to(&self, from: usize, group: &[usize]) -> f64 {
        group.iter().map(|&to| self.get(from, to)).sum()
    }
}
