//! Distance models over a node table.
//!
//! - [`Euclidean`] — straight-line distance on (x, y)
//! - [`SpatioTemporal`] — weighted, normalized spatial and temporal distance
//! - [`Spatial3d`] — Euclidean distance on (x, y, time-window midpoint)
//!
//! All of them precompute a dense [`DistanceMatrix`] at construction and are
//! used through the [`DistanceModel`] trait.

mod euclidean;
mod matrix;
mod model;
mod spatial3d;
mod spatio_temporal;

pub use euclidean::Euclidean;
pub use matrix::DistanceMatrix;
pub use model::{DistanceKind, DistanceModel};
pub use spatial3d::Spatial3d;
pub use spatio_temporal::{SpatioTemporal, SpatioTemporalParams};
