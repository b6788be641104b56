//! Spatio-temporal distance.
//!
//! Combines the min-max normalized Euclidean distance with a normalized
//! temporal distance:
//!
//! ```text
//! d(i, j) = alpha * (s(i,j) - s_min) / (s_max - s_min)
//!         + (1 - alpha) * (t(i,j) - t_min) / (t_max - t_min)
//! ```
//!
//! The ranges are taken over customer pairs only; the depot usually sits far
//! from everything and would squash the scale.
//!
//! # Temporal term
//!
//! Leaving `i` at any time of its window, after service and travel, yields an
//! arrival window at `j`. Each arrival time is scored against `j`'s window
//! `[a, b]`:
//!
//! ```text
//! early   (t < a):       k2 * (t - a) + k1 * (b - a)
//! on time (a <= t <= b): k1 * (b - t)
//! late    (t > b):       k3 * (b - t)
//! ```
//!
//! The directed temporal distance is `k1 * max_width` minus the mean score
//! over the arrival window. The two directions generally differ; the matrix
//! keeps the smaller one. Taking the larger direction is the textbook
//! formulation, but the smaller one reproduces the reference partitions and is
//! kept on purpose.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{PartitionError, Result};
use crate::models::NodeTable;

use super::model::require_customers;
use super::{DistanceMatrix, DistanceModel};

/// Penalty multipliers and the spatial weight of [`SpatioTemporal`].
///
/// Valid when `k1 < k2 < k3` and `alpha` lies in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatioTemporalParams {
    /// Multiplier for on-time arrival.
    pub k1: f64,
    /// Multiplier for early arrival (waiting).
    pub k2: f64,
    /// Multiplier for late arrival.
    pub k3: f64,
    /// Weight of the spatial term; the temporal term gets `1 - alpha`.
    pub alpha: f64,
}

impl Default for SpatioTemporalParams {
    fn default() -> Self {
        Self {
            k1: 1.0,
            k2: 1.5,
            k3: 2.0,
            alpha: 0.5,
        }
    }
}

impl SpatioTemporalParams {
    /// Sets the penalty multipliers.
    pub fn with_penalties(mut self, k1: f64, k2: f64, k3: f64) -> Self {
        self.k1 = k1;
        self.k2 = k2;
        self.k3 = k3;
        self
    }

    /// Sets the spatial weight.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Checks the parameter domains.
    pub fn validate(&self) -> Result<()> {
        if !(self.k1 < self.k2 && self.k2 < self.k3) {
            return Err(PartitionError::InvalidParameter {
                name: "k1/k2/k3",
                reason: format!(
                    "expected k1 < k2 < k3, got {}, {}, {}",
                    self.k1, self.k2, self.k3
                ),
            });
        }
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(PartitionError::InvalidParameter {
                name: "alpha",
                reason: format!("expected a value in [0, 1], got {}", self.alpha),
            });
        }
        Ok(())
    }

    /// Replaces out-of-domain values with the defaults.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let mut params = self;
        if !(params.k1 < params.k2 && params.k2 < params.k3) {
            warn!(
                event = "parameter_fallback",
                parameter = "k1/k2/k3",
                k1 = params.k1,
                k2 = params.k2,
                k3 = params.k3,
            );
            params.k1 = defaults.k1;
            params.k2 = defaults.k2;
            params.k3 = defaults.k3;
        }
        if !(0.0..=1.0).contains(&params.alpha) {
            warn!(event = "parameter_fallback", parameter = "alpha", alpha = params.alpha);
            params.alpha = defaults.alpha;
        }
        params
    }
}

/// Spatio-temporal distance model.
///
/// # Examples
///
/// ```
/// use u_partition::models::{Customer, NodeTable, TimeWindow};
/// use u_partition::distance::{DistanceModel, SpatioTemporal};
///
/// let tw = |a, b| TimeWindow::new(a, b).unwrap();
/// let table = NodeTable::new(vec![
///     Customer::depot(0.0, 0.0).with_time_window(tw(0.0, 300.0)),
///     Customer::new(1, 10.0, 0.0, 5, 10.0).with_time_window(tw(0.0, 50.0)),
///     Customer::new(2, 20.0, 5.0, 5, 10.0).with_time_window(tw(60.0, 120.0)),
///     Customer::new(3, 0.0, 30.0, 5, 10.0).with_time_window(tw(200.0, 260.0)),
/// ]);
/// let model = SpatioTemporal::build(&table).unwrap();
/// assert_eq!(model.distance(2, 2), 0.0);
/// assert_eq!(model.distance(1, 3), model.distance(3, 1));
/// ```
#[derive(Debug, Clone)]
pub struct SpatioTemporal {
    params: SpatioTemporalParams,
    spatial: DistanceMatrix,
    temporal: DistanceMatrix,
    combined: DistanceMatrix,
    spatial_range: (f64, f64),
    temporal_range: (f64, f64),
}

impl SpatioTemporal {
    /// Builds the model with default parameters.
    pub fn build(table: &NodeTable) -> Result<Self> {
        Self::with_params(table, SpatioTemporalParams::default())
    }

    /// Builds the model; out-of-domain parameters fall back to the defaults.
    ///
    /// # Errors
    ///
    /// [`PartitionError::DegenerateInstance`] when fewer than two customers
    /// exist or a weighted term has an empty range (all customer pairs equally
    /// far apart).
    pub fn with_params(table: &NodeTable, params: SpatioTemporalParams) -> Result<Self> {
        require_customers(table)?;
        let params = params.sanitized();
        let spatial = DistanceMatrix::euclidean(table);

        let max_width = table
            .nodes()
            .iter()
            .map(|c| c.time_window().width())
            .fold(0.0, f64::max);
        let temporal = DistanceMatrix::symmetric_from_fn(table.len(), |i, j| {
            let forward = directed(table, &spatial, &params, max_width, i, j);
            let backward = directed(table, &spatial, &params, max_width, j, i);
            forward.min(backward)
        });

        let spatial_range = spatial.customer_range().unwrap_or((0.0, 0.0));
        let temporal_range = temporal.customer_range().unwrap_or((0.0, 0.0));
        let alpha = params.alpha;
        let spatial_scale = scale(spatial_range, alpha > 0.0, "spatial")?;
        let temporal_scale = scale(temporal_range, alpha < 1.0, "temporal")?;

        let combined = DistanceMatrix::symmetric_from_fn(table.len(), |i, j| {
            let s = (spatial.get(i, j) - spatial_range.0) * spatial_scale;
            let t = (temporal.get(i, j) - temporal_range.0) * temporal_scale;
            // Pairs with the depot may fall below the customer range.
            (alpha * s + (1.0 - alpha) * t).max(0.0)
        });

        Ok(Self {
            params,
            spatial,
            temporal,
            combined,
            spatial_range,
            temporal_range,
        })
    }

    /// The parameters in effect after sanitizing.
    pub fn params(&self) -> &SpatioTemporalParams {
        &self.params
    }

    /// Raw Euclidean distance.
    pub fn spatial_distance(&self, from: usize, to: usize) -> f64 {
        self.spatial.get(from, to)
    }

    /// Raw (unnormalized) temporal distance, already reduced to the smaller
    /// of both directions.
    pub fn temporal_distance(&self, from: usize, to: usize) -> f64 {
        self.temporal.get(from, to)
    }

    /// `(min, max)` of the spatial distance over customer pairs.
    pub fn spatial_range(&self) -> (f64, f64) {
        self.spatial_range
    }

    /// `(min, max)` of the temporal distance over customer pairs.
    pub fn temporal_range(&self) -> (f64, f64) {
        self.temporal_range
    }
}

impl DistanceModel for SpatioTemporal {
    fn matrix(&self) -> &DistanceMatrix {
        &self.combined
    }
}

/// `1 / (max - min)`, or 0 for an unweighted term.
fn scale(range: (f64, f64), weighted: bool, term: &str) -> Result<f64> {
    if !weighted {
        return Ok(0.0);
    }
    let span = range.1 - range.0;
    if span <= 0.0 || !span.is_finite() {
        return Err(PartitionError::DegenerateInstance(format!(
            "{term} distances have an empty range [{}, {}]",
            range.0, range.1
        )));
    }
    Ok(1.0 / span)
}

/// Directed temporal distance from row `from` to row `to`.
fn directed(
    table: &NodeTable,
    spatial: &DistanceMatrix,
    params: &SpatioTemporalParams,
    max_width: f64,
    from: usize,
    to: usize,
) -> f64 {
    if from == to {
        return 0.0;
    }
    let origin = table.node(from);
    let offset = origin.service_duration() + spatial.get(from, to);
    let arrival = origin.time_window().shifted(offset);
    let target = table.node(to).time_window();
    params.k1 * max_width - mean_arrival_score(params, arrival.ready(), arrival.due(), target.ready(), target.due())
}

/// Mean score of arriving uniformly in `[s, e]` at a window `[a, b]`.
fn mean_arrival_score(p: &SpatioTemporalParams, s: f64, e: f64, a: f64, b: f64) -> f64 {
    let width = e - s;
    if width <= 0.0 {
        return arrival_score(p, s, a, b);
    }

    // Antiderivatives of the piecewise score.
    let early = |t: f64| p.k2 * t * t / 2.0 + p.k1 * b * t - (p.k1 * a * t + p.k2 * a * t);
    let on_time = |t: f64| -p.k1 * t * t / 2.0 + p.k1 * b * t;
    let late = |t: f64| -p.k3 * t * t / 2.0 + p.k3 * b * t;

    let early_part = early(e.min(a)) - early(s.min(a));
    let on_time_part = on_time(e.min(b).max(a)) - on_time(s.max(a).min(b));
    let late_part = late(e.max(b)) - late(s.max(b));
    (early_part + on_time_part + late_part) / width
}

/// Score of arriving exactly at `t`.
fn arrival_score(p: &SpatioTemporalParams, t: f64, a: f64, b: f64) -> f64 {
    if t < a {
        p.k2 * (t - a) + p.k1 * (b - a)
    } else if t <= b {
        p.k1 * (b - t)
    } else {
        p.k3 * (b - t)
    }
}
