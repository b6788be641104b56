//! Parallel hand-off of partition groups to an external routing solver.
//!
//! Each group becomes a sub-instance ([`NodeTable::subset`]) solved on its own
//! rayon task. Costs and vehicle counts are accumulated atomically; the batch
//! is rejected as a whole if any group comes back with a zero cost.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{PartitionError, Result};
use crate::models::{NodeTable, Partition};

/// Routes computed for one sub-instance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SubSolution {
    /// Routes as sequences of instance ids (see [`Customer::id`](crate::models::Customer::id)).
    pub routes: Vec<Vec<usize>>,
    /// Cost of each route.
    pub route_costs: Vec<f64>,
    /// Sum of the route costs.
    pub total_cost: f64,
    /// Vehicles used.
    pub vehicles: usize,
}

/// A routing solver for one sub-instance.
///
/// Implementations run concurrently on different sub-instances and must not
/// share mutable state without synchronization.
pub trait SubproblemSolver: Sync {
    /// Solves the sub-instance; row 0 is the depot.
    fn solve(&self, sub: &NodeTable) -> SubSolution;
}

impl<F> SubproblemSolver for F
where
    F: Fn(&NodeTable) -> SubSolution + Sync,
{
    fn solve(&self, sub: &NodeTable) -> SubSolution {
        self(sub)
    }
}

/// Solutions of every group of a partition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchSolution {
    /// One solution per group, in partition order.
    pub groups: Vec<SubSolution>,
    /// Sum of the group costs.
    pub total_cost: f64,
    /// Sum of the vehicles used.
    pub vehicles: usize,
}

/// Solves every group of `partition` in parallel.
///
/// # Errors
///
/// [`PartitionError::UnsolvableSubgroup`] naming the lowest failing group if
/// any group reports a zero or non-finite cost.
///
/// # Examples
///
/// ```
/// use u_partition::models::{Customer, NodeTable, Partition};
/// use u_partition::solve::{solve_partition, SubSolution};
///
/// let table = NodeTable::new(vec![
///     Customer::depot(0.0, 0.0),
///     Customer::new(11, 3.0, 4.0, 1, 0.0),
///     Customer::new(12, 6.0, 8.0, 1, 0.0),
/// ]);
/// let partition = Partition::new(vec![vec![1], vec![2]]);
///
/// // Out-and-back for every customer.
/// let solver = |sub: &NodeTable| {
///     let costs: Vec<f64> = sub.nodes()[1..].iter().map(|c| 2.0 * c.distance_to(sub.depot())).collect();
///     SubSolution {
///         routes: sub.nodes()[1..].iter().map(|c| vec![c.id()]).collect(),
///         total_cost: costs.iter().sum(),
///         vehicles: costs.len(),
///         route_costs: costs,
///     }
/// };
///
/// let batch = solve_partition(&table, &partition, &solver).unwrap();
/// assert_eq!(batch.vehicles, 2);
/// assert!((batch.total_cost - 30.0).abs() < 1e-9);
/// assert_eq!(batch.groups[1].routes, vec![vec![12]]);
/// ```
pub fn solve_partition<S>(table: &NodeTable, partition: &Partition, solver: &S) -> Result<BatchSolution>
where
    S: SubproblemSolver + ?Sized,
{
    let total_bits = AtomicU64::new(0f64.to_bits());
    let vehicles = AtomicUsize::new(0);
    let failed = AtomicUsize::new(usize::MAX);

    let groups: Vec<SubSolution> = partition
        .groups()
        .par_iter()
        .enumerate()
        .map(|(index, group)| {
            let sub = table.subset(group);
            let solution = solver.solve(&sub);
            if solution.total_cost <= 0.0 || !solution.total_cost.is_finite() {
                warn!(
                    event = "subproblem_unsolvable",
                    group = index,
                    customers = group.len(),
                    cost = solution.total_cost,
                );
                failed.fetch_min(index, Ordering::Relaxed);
            }
            add_f64(&total_bits, solution.total_cost);
            vehicles.fetch_add(solution.vehicles, Ordering::Relaxed);
            solution
        })
        .collect();

    let failed = failed.into_inner();
    if failed != usize::MAX {
        return Err(PartitionError::UnsolvableSubgroup { group: failed });
    }

    let batch = BatchSolution {
        groups,
        total_cost: f64::from_bits(total_bits.into_inner()),
        vehicles: vehicles.into_inner(),
    };
    info!(
        event = "batch_solved",
        groups = batch.groups.len(),
        total_cost = batch.total_cost,
        vehicles = batch.vehicles,
    );
    Ok(batch)
}

/// Atomically adds `value` to the `f64` stored as bits in `cell`.
fn add_f64(cell: &AtomicU64, value: f64) {
    let mut current = cell.load(Ordering::Relaxed);
    loop {
        let next = (f64::from_bits(current) + value).to_bits();
        match cell.compare_exchange_weak(current, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return,
            Err(actual) => current = actual,
        }
    }
}
