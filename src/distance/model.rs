//! The distance model abstraction and its selectable kinds.

use serde::{Deserialize, Serialize};

use crate::error::{PartitionError, Result};
use crate::models::NodeTable;

use super::{DistanceMatrix, Euclidean, Spatial3d, SpatioTemporal, SpatioTemporalParams};

/// A precomputed, read-only distance over the rows of a [`NodeTable`].
///
/// Implementations build their dense matrix once at construction; lookups are
/// defined for every pair of rows including the depot, are non-negative and
/// finite, and `distance(i, i) == 0`.
pub trait DistanceModel: Send + Sync {
    /// The backing matrix.
    fn matrix(&self) -> &DistanceMatrix;

    /// Distance from row `from` to row `to`.
    fn distance(&self, from: usize, to: usize) -> f64 {
        self.matrix().get(from, to)
    }

    /// Number of rows covered (depot included).
    fn size(&self) -> usize {
        self.matrix().size()
    }

    /// Sum of distances from `from` to every member of `group`.
    fn sum_to(&self, from: usize, group: &[usize]) -> f64 {
        self.matrix().sum_to(from, group)
    }
}

impl DistanceModel for DistanceMatrix {
    fn matrix(&self) -> &DistanceMatrix {
        self
    }
}

/// Selects which [`DistanceModel`] to build for a table.
///
/// # Examples
///
/// ```
/// use u_partition::models::{Customer, NodeTable};
/// use u_partition::distance::DistanceKind;
///
/// let table = NodeTable::new(vec![
///     Customer::depot(0.0, 0.0),
///     Customer::new(1, 3.0, 4.0, 10, 0.0),
///     Customer::new(2, 6.0, 8.0, 10, 0.0),
/// ]);
/// let model = DistanceKind::Euclidean.build(&table).unwrap();
/// assert!((model.distance(1, 2) - 5.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DistanceKind {
    /// Straight-line distance on (x, y).
    #[default]
    Euclidean,
    /// Weighted spatial and temporal distance.
    SpatioTemporal(SpatioTemporalParams),
    /// Euclidean distance on (x, y, time-window midpoint).
    Spatial3d,
}

impl DistanceKind {
    /// Builds the model for `table`.
    ///
    /// # Errors
    ///
    /// [`PartitionError::DegenerateInstance`] when the table has fewer than two
    /// customers or cannot be normalized.
    pub fn build(&self, table: &NodeTable) -> Result<Box<dyn DistanceModel>> {
        Ok(match self {
            Self::Euclidean => Box::new(Euclidean::build(table)?),
            Self::SpatioTemporal(params) => Box::new(SpatioTemporal::with_params(table, *params)?),
            Self::Spatial3d => Box::new(Spatial3d::build(table)?),
        })
    }
}

/// Rejects tables with fewer than two customers.
pub(crate) fn require_customers(table: &NodeTable) -> Result<()> {
    if table.num_customers() < 2 {
        return Err(PartitionError::DegenerateInstance(format!(
            "need at least 2 customers, got {}",
            table.num_customers()
        )));
    }
    Ok(())
}
