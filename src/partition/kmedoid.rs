//! Multi-start k-medoids.
//!
//! Each attempt draws `k` random medoids, then alternates nearest-medoid
//! assignment with moving every medoid to the member of its group that has
//! the smallest total distance to the others, until no medoid moves. The
//! attempt with the lowest final cost wins.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::distance::DistanceModel;
use crate::error::{check_group_count, PartitionError, Result};
use crate::models::Partition;
use crate::random::distinct_customers;

use super::medoid::{assign_to_nearest, best_member};
use super::Partitioner;

/// Upper bound on assignment/update rounds within one attempt.
const MAX_ROUNDS: usize = 1_000;

/// Configuration for [`KMedoidPartitioner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KMedoidConfig {
    /// Number of random starts.
    pub attempts: usize,
}

impl Default for KMedoidConfig {
    fn default() -> Self {
        Self { attempts: 150 }
    }
}

impl KMedoidConfig {
    /// Sets the number of random starts.
    pub fn with_attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts;
        self
    }

    /// Checks the parameter domains.
    pub fn validate(&self) -> Result<()> {
        if self.attempts == 0 {
            return Err(PartitionError::InvalidParameter {
                name: "attempts",
                reason: "must be positive".into(),
            });
        }
        Ok(())
    }

    /// Replaces out-of-domain values with the defaults.
    pub fn sanitized(self) -> Self {
        if self.attempts == 0 {
            warn!(event = "parameter_fallback", parameter = "attempts", value = 0);
            return Self::default();
        }
        self
    }
}

/// Result of [`KMedoidPartitioner::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct KMedoidOutcome {
    /// Groups of the best attempt, in medoid order.
    pub partition: Partition,
    /// Medoid of each group.
    pub medoids: Vec<usize>,
    /// Sum over groups of the distances from the medoid to every member.
    pub cost: f64,
    /// Cost of the first assignment of every attempt.
    pub initial_costs: Vec<f64>,
}

/// Multi-start k-medoids partitioner.
///
/// # Examples
///
/// ```
/// use u_partition::distance::Euclidean;
/// use u_partition::models::{Customer, NodeTable};
/// use u_partition::partition::{KMedoidConfig, KMedoidPartitioner, Partitioner};
/// use u_partition::random::create_rng;
///
/// let mut nodes = vec![Customer::depot(50.0, 50.0)];
/// for i in 1..=9 {
///     let base = if i <= 5 { 0.0 } else { 100.0 };
///     nodes.push(Customer::new(i, base + i as f64, base, 1, 0.0));
/// }
/// let table = NodeTable::new(nodes);
/// let distance = Euclidean::build(&table).unwrap();
///
/// let km = KMedoidPartitioner::new(&distance, KMedoidConfig::default().with_attempts(10));
/// let partition = km.partition(2, &mut create_rng(3)).unwrap();
/// let mut sizes = partition.sizes();
/// sizes.sort();
/// assert_eq!(sizes, vec![4, 5]);
/// ```
pub struct KMedoidPartitioner<'a> {
    distance: &'a dyn DistanceModel,
    config: KMedoidConfig,
}

impl<'a> KMedoidPartitioner<'a> {
    /// Creates a partitioner; a zero attempt count falls back to the default.
    pub fn new(distance: &'a dyn DistanceModel, config: KMedoidConfig) -> Self {
        Self {
            distance,
            config: config.sanitized(),
        }
    }

    /// The effective configuration.
    pub fn config(&self) -> &KMedoidConfig {
        &self.config
    }

    /// Runs every attempt and keeps the cheapest.
    pub fn run<R: Rng + ?Sized>(&self, groups: usize, rng: &mut R) -> Result<KMedoidOutcome> {
        let n = self.distance.size();
        check_group_count(groups, n)?;

        let mut best: Option<(Vec<usize>, Vec<Vec<usize>>, f64)> = None;
        let mut initial_costs = Vec::with_capacity(self.config.attempts);
        for attempt in 0..self.config.attempts {
            let medoids = distinct_customers(rng, n - 1, groups);
            let (medoids, assignment, initial, cost) = self.descend(medoids);
            debug!(event = "kmedoid_attempt", attempt, initial, cost);
            initial_costs.push(initial);
            if best.as_ref().map_or(true, |(_, _, c)| cost < *c) {
                best = Some((medoids, assignment, cost));
            }
        }

        let (medoids, assignment, cost) = best.ok_or_else(|| PartitionError::InvalidParameter {
            name: "attempts",
            reason: "must be positive".into(),
        })?;
        info!(event = "kmedoid_finished", groups, attempts = self.config.attempts, cost);
        Ok(KMedoidOutcome {
            partition: Partition::new(assignment),
            medoids,
            cost,
            initial_costs,
        })
    }

    /// Alternates assignment and medoid update from `medoids` until stable.
    ///
    /// Returns the final medoids, their assignment, the cost of the first
    /// assignment and the final cost.
    fn descend(&self, mut medoids: Vec<usize>) -> (Vec<usize>, Vec<Vec<usize>>, f64, f64) {
        let mut initial = None;
        let mut assignment = Vec::new();
        let mut cost = 0.0;
        for _ in 0..MAX_ROUNDS {
            assignment = assign_to_nearest(self.distance, &medoids);
            cost = self.cost(&medoids, &assignment);
            initial.get_or_insert(cost);

            let mut changed = false;
            for (medoid, group) in medoids.iter_mut().zip(&assignment) {
                let (member, _) = best_member(self.distance, group, *medoid);
                if member != *medoid {
                    *medoid = member;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        (medoids, assignment, initial.unwrap_or(cost), cost)
    }

    /// Sum over groups of the distances from the medoid to every member.
    pub fn cost(&self, medoids: &[usize], groups: &[Vec<usize>]) -> f64 {
        medoids
            .iter()
            .zip(groups)
            .map(|(&m, group)| self.distance.sum_to(m, group))
            .sum()
    }
}

impl Partitioner for KMedoidPartitioner<'_> {
    fn partition<R: Rng + ?Sized>(&self, groups: usize, rng: &mut R) -> Result<Partition> {
        self.run(groups, rng).map(|outcome| outcome.partition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::{DistanceKind, Euclidean, SpatioTemporalParams};
    use crate::models::{Customer, NodeTable};
    use crate::partition::fixtures::{random_table, two_clusters};
    use crate::random::create_rng;

    fn ten_nodes() -> NodeTable {
        let coords = [
            (35.0, 35.0),
            (41.0, 49.0),
            (35.0, 17.0),
            (55.0, 45.0),
            (55.0, 20.0),
            (15.0, 30.0),
            (25.0, 30.0),
            (20.0, 50.0),
            (10.0, 43.0),
            (55.0, 60.0),
        ];
        let nodes = coords
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| {
                if i == 0 {
                    Customer::depot(x, y)
                } else {
                    Customer::new(i, x, y, 10, 10.0)
                }
            })
            .collect();
        NodeTable::new(nodes)
    }

    #[test]
    fn test_single_attempt_reproducible() {
        let table = ten_nodes();
        let distance = Euclidean::build(&table).expect("valid");
        let km = KMedoidPartitioner::new(&distance, KMedoidConfig::default().with_attempts(1));

        let a = km.run(3, &mut create_rng(2024)).expect("valid k");
        assert_eq!(a.partition.num_groups(), 3);
        assert!(a.partition.sizes().iter().all(|&s| s > 0));
        assert_eq!(a.partition.num_assigned(), 9);
        assert!(a.partition.covers(table.len()));

        let b = km.run(3, &mut create_rng(2024)).expect("valid k");
        assert_eq!(a, b);
    }

    #[test]
    fn test_cost_never_exceeds_initial() {
        let table = random_table(35, 9);
        let distance = Euclidean::build(&table).expect("valid");
        let km = KMedoidPartitioner::new(&distance, KMedoidConfig::default().with_attempts(12));
        let outcome = km.run(4, &mut create_rng(6)).expect("valid k");
        assert_eq!(outcome.initial_costs.len(), 12);
        for &initial in &outcome.initial_costs {
            assert!(outcome.cost <= initial + 1e-9);
        }
        let recomputed = km.cost(&outcome.medoids, outcome.partition.groups());
        assert!((recomputed - outcome.cost).abs() < 1e-9);
    }

    #[test]
    fn test_medoids_are_group_members() {
        let table = random_table(25, 2);
        let distance = DistanceKind::SpatioTemporal(SpatioTemporalParams::default())
            .build(&table)
            .expect("valid");
        let km = KMedoidPartitioner::new(distance.as_ref(), KMedoidConfig::default().with_attempts(5));
        let outcome = km.run(3, &mut create_rng(1)).expect("valid k");
        assert!(outcome.partition.covers(table.len()));
        for (group, medoid) in outcome.partition.groups().iter().zip(&outcome.medoids) {
            assert!(group.contains(medoid));
        }
    }

    #[test]
    fn test_clusters() {
        let table = two_clusters();
        let distance = Euclidean::build(&table).expect("valid");
        let km = KMedoidPartitioner::new(&distance, KMedoidConfig::default().with_attempts(10));
        let mut groups = km.partition(2, &mut create_rng(0)).expect("valid k").into_groups();
        for g in &mut groups {
            g.sort();
        }
        groups.sort();
        assert_eq!(groups, vec![vec![1, 2, 3, 4], vec![5, 6, 7, 8]]);
    }

    #[test]
    fn test_one_group_takes_everything() {
        let table = ten_nodes();
        let distance = Euclidean::build(&table).expect("valid");
        let km = KMedoidPartitioner::new(&distance, KMedoidConfig::default().with_attempts(3));
        let outcome = km.run(1, &mut create_rng(5)).expect("valid k");
        assert_eq!(outcome.partition.sizes(), vec![9]);
    }

    #[test]
    fn test_invalid_group_count() {
        let table = ten_nodes();
        let distance = Euclidean::build(&table).expect("valid");
        let km = KMedoidPartitioner::new(&distance, KMedoidConfig::default());
        assert!(matches!(
            km.run(9, &mut create_rng(0)),
            Err(PartitionError::InvalidGroupCount { groups: 9, max: 8 })
        ));
    }

    #[test]
    fn test_zero_attempts_fall_back() {
        let config = KMedoidConfig::default().with_attempts(0);
        assert!(config.validate().is_err());
        assert_eq!(config.sanitized().attempts, 150);
    }
}
