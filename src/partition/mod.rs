//! Customer partitioners.
//!
//! - [`VoronoiPartitioner`] — grows groups from seeds over Voronoi-cell
//!   adjacency, with balanced or strongest-first growth
//! - [`GeneticPartitioner`] — evolves medoid sets, customers join their
//!   nearest medoid
//! - [`KMedoidPartitioner`] — multi-start alternating assignment and medoid
//!   update
//! - [`RecursiveSplitter`] — re-partitions oversized groups in two
//!
//! Every partitioner borrows its [`DistanceModel`](crate::distance::DistanceModel)
//! read-only and draws from the random stream handed to each call.

mod genetic;
mod kmedoid;
pub mod medoid;
mod splitter;
mod voronoi;

#[cfg(test)]
pub(crate) mod fixtures;

pub use genetic::{GeneticConfig, GeneticOutcome, GeneticPartitioner};
pub use kmedoid::{KMedoidConfig, KMedoidOutcome, KMedoidPartitioner};
pub use splitter::{RecursiveSplitter, DEFAULT_SPLIT_TOLERANCE};
pub use voronoi::{GrowthPolicy, VoronoiConfig, VoronoiOutcome, VoronoiPartitioner};

use rand::Rng;

use crate::error::Result;
use crate::models::Partition;

/// Splits the customers of an instance into a requested number of groups.
pub trait Partitioner {
    /// Partitions the customers into `groups` non-empty groups.
    ///
    /// # Errors
    ///
    /// [`PartitionError::InvalidGroupCount`](crate::error::PartitionError::InvalidGroupCount)
    /// unless `1 <= groups <= N - 2`.
    fn partition<R: Rng + ?Sized>(&self, groups: usize, rng: &mut R) -> Result<Partition>;
}
