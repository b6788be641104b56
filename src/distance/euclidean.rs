//! Straight-line distance on (x, y).

use crate::error::Result;
use crate::models::NodeTable;

use super::model::require_customers;
use super::{DistanceMatrix, DistanceModel};

/// Euclidean distance model.
///
/// # Examples
///
/// ```
/// use u_partition::models::{Customer, NodeTable};
/// use u_partition::distance::{DistanceModel, Euclidean};
///
/// let table = NodeTable::new(vec![
///     Customer::depot(0.0, 0.0),
///     Customer::new(1, 3.0, 4.0, 10, 0.0),
///     Customer::new(2, 0.0, 8.0, 10, 0.0),
/// ]);
/// let model = Euclidean::build(&table).unwrap();
/// assert!((model.distance(0, 1) - 5.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct Euclidean {
    matrix: DistanceMatrix,
}

impl Euclidean {
    /// Precomputes all pairwise distances of `table`.
    pub fn build(table: &NodeTable) -> Result<Self> {
        require_customers(table)?;
        Ok(Self {
            matrix: DistanceMatrix::euclidean(table),
        })
    }
}

impl DistanceModel for Euclidean {
    fn matrix(&self) -> &DistanceMatrix {
        &self.matrix
    }
}
