//! Post-processing of oversized groups.

use tracing::{debug, warn};

use crate::error::{PartitionError, Result};
use crate::models::{NodeTable, Partition};

/// Default relative tolerance above the mean group size.
pub const DEFAULT_SPLIT_TOLERANCE: f64 = 0.3;

/// Groups smaller than this are never split.
const MIN_SPLITTABLE: usize = 3;

/// Replaces every group larger than `mean * (1 + tolerance)` by a two-group
/// re-partition of its sub-instance.
///
/// The two halves take the place of the original group, so the result has
/// one more group per split. Halves are not checked again.
///
/// # Examples
///
/// ```
/// use u_partition::models::{Customer, NodeTable, Partition};
/// use u_partition::partition::RecursiveSplitter;
///
/// let nodes = (0..=8).map(|i| if i == 0 {
///     Customer::depot(0.0, 0.0)
/// } else {
///     Customer::new(i, i as f64, 0.0, 1, 0.0)
/// }).collect();
/// let table = NodeTable::new(nodes);
/// let partition = Partition::new(vec![vec![1], vec![2, 3, 4, 5, 6, 7], vec![8]]);
///
/// // Halve by local row order.
/// let split = RecursiveSplitter::default()
///     .split(&table, partition, |sub| {
///         let rows: Vec<usize> = (1..sub.len()).collect();
///         let (a, b) = rows.split_at(rows.len() / 2);
///         Ok(Partition::new(vec![a.to_vec(), b.to_vec()]))
///     })
///     .unwrap();
/// assert_eq!(split.groups(), &[vec![1], vec![2, 3, 4], vec![5, 6, 7], vec![8]]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecursiveSplitter {
    tolerance: f64,
}

impl Default for RecursiveSplitter {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_SPLIT_TOLERANCE,
        }
    }
}

impl RecursiveSplitter {
    /// Creates a splitter with the given tolerance.
    ///
    /// # Errors
    ///
    /// [`PartitionError::InvalidParameter`] for a negative or non-finite
    /// tolerance.
    pub fn new(tolerance: f64) -> Result<Self> {
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(PartitionError::InvalidParameter {
                name: "split_tolerance",
                reason: format!("expected a non-negative value, got {tolerance}"),
            });
        }
        Ok(Self { tolerance })
    }

    /// The relative tolerance.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Size above which a group of `partition` is split.
    pub fn threshold(&self, partition: &Partition) -> f64 {
        partition.mean_size() * (1.0 + self.tolerance)
    }

    /// Splits the oversized groups of `partition`.
    ///
    /// `repartition` receives the sub-instance of one group (its depot plus
    /// the group's customers, see [`NodeTable::subset`]) and must return a
    /// partition of it in local row indices; the rows are mapped back to
    /// `table` before insertion.
    ///
    /// # Errors
    ///
    /// Errors of `repartition` are returned unchanged, except
    /// [`PartitionError::DegenerateInstance`], which keeps the group whole.
    /// [`PartitionError::DegenerateInstance`] if it does not cover its
    /// sub-instance.
    pub fn split<F>(&self, table: &NodeTable, partition: Partition, mut repartition: F) -> Result<Partition>
    where
        F: FnMut(&NodeTable) -> Result<Partition>,
    {
        let threshold = self.threshold(&partition);
        let mut groups = Vec::with_capacity(partition.num_groups() + 1);
        for (index, group) in partition.into_groups().into_iter().enumerate() {
            if group.len() < MIN_SPLITTABLE || group.len() as f64 <= threshold {
                groups.push(group);
                continue;
            }

            let sub = table.subset(&group);
            let halves = match repartition(&sub) {
                Ok(halves) => halves,
                Err(PartitionError::DegenerateInstance(reason)) => {
                    warn!(event = "group_kept", group = index, size = group.len(), %reason);
                    groups.push(group);
                    continue;
                }
                Err(e) => return Err(e),
            };
            if !halves.covers(sub.len()) {
                return Err(PartitionError::DegenerateInstance(format!(
                    "re-partition of group {index} does not cover its {} customers",
                    group.len()
                )));
            }
            debug!(
                event = "group_split",
                group = index,
                size = group.len(),
                threshold,
                parts = halves.num_groups(),
            );
            for half in halves.into_groups() {
                groups.push(half.into_iter().map(|row| sub.parent_index(row)).collect());
            }
        }
        Ok(Partition::new(groups))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::{DistanceKind, Euclidean, SpatioTemporalParams};
    use crate::models::Customer;
    use crate::partition::fixtures::random_table;
    use crate::partition::{KMedoidConfig, KMedoidPartitioner, Partitioner};
    use crate::random::create_rng;

    fn halve(sub: &NodeTable) -> Result<Partition> {
        let rows: Vec<usize> = (1..sub.len()).collect();
        let (a, b) = rows.split_at(rows.len() / 2);
        Ok(Partition::new(vec![a.to_vec(), b.to_vec()]))
    }

    #[test]
    fn test_threshold() {
        let p = Partition::new(vec![vec![1, 2], vec![3, 4, 5, 6]]);
        assert!((RecursiveSplitter::default().threshold(&p) - 3.9).abs() < 1e-12);
    }

    #[test]
    fn test_only_oversized_groups_split() {
        let table = random_table(20, 1);
        // Sizes 10, 5, 5: mean 6.67, threshold 8.67.
        let partition = Partition::new(vec![
            (1..=10).collect(),
            (11..=15).collect(),
            (16..=20).collect(),
        ]);
        let split = RecursiveSplitter::default()
            .split(&table, partition, halve)
            .expect("halves cover");
        assert_eq!(split.num_groups(), 4);
        assert_eq!(split.groups()[0], vec![1, 2, 3, 4, 5]);
        assert_eq!(split.groups()[1], vec![6, 7, 8, 9, 10]);
        assert_eq!(split.groups()[2], (11..=15).collect::<Vec<_>>());
        assert!(split.covers(table.len()));
    }

    #[test]
    fn test_balanced_partition_untouched() {
        let table = random_table(9, 1);
        let partition = Partition::new(vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]]);
        let split = RecursiveSplitter::default()
            .split(&table, partition.clone(), |_| panic!("nothing to split"))
            .expect("no split");
        assert_eq!(split, partition);
    }

    #[test]
    fn test_split_with_kmedoids() {
        let table = random_table(24, 8);
        let partition = Partition::new(vec![(1..=16).collect(), (17..=20).collect(), (21..=24).collect()]);
        let split = RecursiveSplitter::default()
            .split(&table, partition, |sub| {
                let distance = Euclidean::build(sub)?;
                KMedoidPartitioner::new(&distance, KMedoidConfig::default().with_attempts(5))
                    .partition(2, &mut create_rng(3))
            })
            .expect("splittable");
        assert_eq!(split.num_groups(), 4);
        assert!(split.covers(table.len()));
        let first_two: usize = split.groups()[..2].iter().map(Vec::len).sum();
        assert_eq!(first_two, 16);
        for group in &split.groups()[..2] {
            assert!(group.iter().all(|&i| (1..=16).contains(&i)));
        }
    }

    #[test]
    fn test_bad_repartition_rejected() {
        let table = random_table(12, 1);
        let partition = Partition::new(vec![(1..=10).collect(), vec![11], vec![12]]);
        let result = RecursiveSplitter::default().split(&table, partition, |_| Ok(Partition::new(vec![vec![1]])));
        assert!(matches!(result, Err(PartitionError::DegenerateInstance(_))));
    }

    #[test]
    fn test_degenerate_group_kept_whole() {
        // Customers 1-4 share coordinates and window; 5 is far away.
        let mut nodes = vec![Customer::depot(0.0, 0.0)];
        for i in 1..=4 {
            nodes.push(Customer::new(i, 10.0, 10.0, 1, 0.0));
        }
        nodes.push(Customer::new(5, 90.0, 90.0, 1, 0.0));
        let table = NodeTable::new(nodes);
        let partition = Partition::new(vec![vec![1, 2, 3, 4], vec![5]]);

        let split = RecursiveSplitter::new(0.0)
            .expect("valid")
            .split(&table, partition.clone(), |sub| {
                let distance = DistanceKind::SpatioTemporal(SpatioTemporalParams::default()).build(sub)?;
                KMedoidPartitioner::new(distance.as_ref(), KMedoidConfig::default().with_attempts(2))
                    .partition(2, &mut create_rng(0))
            })
            .expect("degenerate group stays whole");
        assert_eq!(split, partition);
    }

    #[test]
    fn test_other_errors_propagate() {
        let table = random_table(12, 1);
        let partition = Partition::new(vec![(1..=10).collect(), vec![11], vec![12]]);
        let result = RecursiveSplitter::default().split(&table, partition, |_| {
            Err(PartitionError::InvalidGroupCount { groups: 2, max: 1 })
        });
        assert!(matches!(result, Err(PartitionError::InvalidGroupCount { .. })));
    }

    #[test]
    fn test_negative_tolerance() {
        assert!(RecursiveSplitter::new(-0.1).is_err());
        assert_eq!(RecursiveSplitter::new(0.5).expect("valid").tolerance(), 0.5);
    }
}
