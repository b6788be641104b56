//! Strategy dispatch over a node table.
//!
//! [`PartitionEngine`] builds the configured distance model for a table, runs
//! the configured partitioner and optionally splits oversized groups with the
//! same distance kind and strategy.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::adjacency::NearestNeighborAdjacency;
use crate::config::{ConfigError, PartitionConfig, Strategy};
use crate::distance::{DistanceKind, DistanceModel};
use crate::error::{PartitionError, Result};
use crate::models::{NodeTable, Partition};
use crate::partition::{
    GeneticPartitioner, KMedoidPartitioner, Partitioner, RecursiveSplitter, VoronoiPartitioner,
};
use crate::random::rng_from;

/// Runs `strategy` on `table` with a prebuilt distance model.
///
/// Voronoi growth uses the nearest-neighbor adjacency of the table's 3-D
/// embedding.
///
/// # Errors
///
/// [`PartitionError::SizeMismatch`] if `distance` does not cover `table`, and
/// every error of the selected partitioner.
pub fn partition_with<R: Rng + ?Sized>(
    table: &NodeTable,
    distance: &dyn DistanceModel,
    strategy: &Strategy,
    groups: usize,
    rng: &mut R,
) -> Result<Partition> {
    if distance.size() != table.len() {
        return Err(PartitionError::SizeMismatch {
            expected: table.len(),
            actual: distance.size(),
        });
    }
    match strategy {
        Strategy::Voronoi(config) => {
            let oracle = NearestNeighborAdjacency::for_table(table, config.neighbors);
            VoronoiPartitioner::new(distance, &oracle, *config)?.partition(groups, rng)
        }
        Strategy::Genetic(config) => GeneticPartitioner::new(distance, *config).partition(groups, rng),
        Strategy::KMedoid(config) => KMedoidPartitioner::new(distance, *config).partition(groups, rng),
    }
}

/// Configured partitioning pipeline.
///
/// # Examples
///
/// ```
/// use u_partition::config::{PartitionConfig, Strategy};
/// use u_partition::engine::PartitionEngine;
/// use u_partition::models::{Customer, NodeTable};
/// use u_partition::partition::KMedoidConfig;
///
/// let mut nodes = vec![Customer::depot(0.0, 0.0)];
/// for i in 1..=20 {
///     nodes.push(Customer::new(i, (i * 7 % 20) as f64, (i * 3 % 11) as f64, 1, 0.0));
/// }
/// let table = NodeTable::new(nodes);
///
/// let config = PartitionConfig::new()
///     .with_groups(4)
///     .with_seed(42)
///     .with_strategy(Strategy::KMedoid(KMedoidConfig::default().with_attempts(10)));
/// let mut engine = PartitionEngine::from_config(&config).unwrap();
///
/// let partition = engine.run(&table).unwrap();
/// assert_eq!(partition.num_groups(), 4);
/// assert!(partition.covers(table.len()));
/// ```
pub struct PartitionEngine {
    distance: DistanceKind,
    strategy: Strategy,
    groups: usize,
    splitter: Option<RecursiveSplitter>,
    rng: StdRng,
}

impl PartitionEngine {
    /// Creates an engine with fresh entropy and no splitting.
    pub fn new(distance: DistanceKind, strategy: Strategy, groups: usize) -> Self {
        Self {
            distance,
            strategy,
            groups,
            splitter: None,
            rng: rng_from(None),
        }
    }

    /// Creates an engine from a configuration after validating it.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first offending setting.
    pub fn from_config(config: &PartitionConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let splitter = if config.split_oversized {
            Some(RecursiveSplitter::new(config.split_tolerance)?)
        } else {
            None
        };
        Ok(Self {
            distance: config.distance,
            strategy: config.strategy,
            groups: config.groups,
            splitter,
            rng: rng_from(config.seed),
        })
    }

    /// Enables splitting of oversized groups.
    pub fn with_splitter(mut self, splitter: RecursiveSplitter) -> Self {
        self.splitter = Some(splitter);
        self
    }

    /// Reseeds the master stream.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = rng_from(Some(seed));
        self
    }

    /// The configured group count.
    pub fn groups(&self) -> usize {
        self.groups
    }

    /// Partitions `table` into the configured number of groups.
    pub fn run(&mut self, table: &NodeTable) -> Result<Partition> {
        self.partition(table, self.groups)
    }

    /// Partitions `table` into `groups` groups.
    ///
    /// Each call draws from a child stream of the engine's master stream, so
    /// consecutive calls differ while the sequence stays reproducible.
    pub fn partition(&mut self, table: &NodeTable, groups: usize) -> Result<Partition> {
        let mut rng = StdRng::from_rng(&mut self.rng);
        self.partition_into(table, groups, &mut rng)
    }

    /// Partitions `table` into `groups` groups drawing from `rng`.
    pub fn partition_into<R: Rng + ?Sized>(
        &self,
        table: &NodeTable,
        groups: usize,
        rng: &mut R,
    ) -> Result<Partition> {
        let distance = self.distance.build(table)?;
        let partition = partition_with(table, distance.as_ref(), &self.strategy, groups, rng)?;
        info!(
            event = "partitioned",
            strategy = self.strategy.name(),
            nodes = table.len(),
            groups,
            imbalance = partition.imbalance(),
        );

        let Some(splitter) = &self.splitter else {
            return Ok(partition);
        };
        let split = splitter.split(table, partition, |sub| {
            let distance = self.distance.build(sub)?;
            partition_with(sub, distance.as_ref(), &self.strategy, 2, &mut *rng)
        })?;
        if split.num_groups() > groups {
            info!(
                event = "oversized_groups_split",
                before = groups,
                after = split.num_groups(),
            );
        }
        Ok(split)
    }
}
