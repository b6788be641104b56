//! Euclidean distance on the (x, y, time-window midpoint) embedding.

use crate::error::Result;
use crate::models::NodeTable;

use super::model::require_customers;
use super::{DistanceMatrix, DistanceModel};

/// Euclidean distance after lifting every node to (x, y, midpoint of its
/// time window). No temporal weighting is applied.
#[derive(Debug, Clone)]
pub struct Spatial3d {
    matrix: DistanceMatrix,
}

impl Spatial3d {
    /// Precomputes all pairwise 3-D distances of `table`.
    pub fn build(table: &NodeTable) -> Result<Self> {
        require_customers(table)?;
        let points = table.embedding();
        let matrix = DistanceMatrix::symmetric_from_fn(points.len(), |i, j| {
            points[i]
                .iter()
                .zip(&points[j])
                .map(|(a, b)| (a - b) * (a - b))
                .sum::<f64>()
                .sqrt()
        });
        Ok(Self { matrix })
    }
}

impl DistanceModel for Spatial3d {
    fn matrix(&self) -> &DistanceMatrix {
        &self.matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Customer, TimeWindow};

    #[test]
    fn test_time_axis_contributes() {
        let tw = |a, b| TimeWindow::new(a, b).expect("valid");
        let table = NodeTable::new(vec![
            Customer::depot(0.0, 0.0).with_time_window(tw(0.0, 100.0)),
            Customer::new(1, 0.0, 0.0, 1, 0.0).with_time_window(tw(0.0, 10.0)),
            Customer::new(2, 3.0, 0.0, 1, 0.0).with_time_window(tw(4.0, 14.0)),
        ]);
        let model = Spatial3d::build(&table).expect("valid");
        // midpoints 5 and 9: sqrt(3² + 4²)
        assert!((model.distance(1, 2) - 5.0).abs() < 1e-10);
        assert_eq!(model.distance(1, 2), model.distance(2, 1));
        assert!((model.distance(0, 1) - 45.0).abs() < 1e-10);
    }
}
