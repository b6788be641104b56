//! Geometric partitioning by growing groups over Voronoi-cell adjacency.
//!
//! Each restart draws `k` distinct seed customers and grows one group per
//! seed along the adjacency graph until every customer is assigned. The seeds
//! are then moved to the medoid of their group and growth is repeated while
//! any seed moves. The best grown partition over all restarts wins.
//!
//! Two growth policies are available:
//!
//! - [`GrowthPolicy::Balanced`]: groups take turns, each adding one node per
//!   ring, which keeps group sizes close.
//! - [`GrowthPolicy::Strongest`]: the globally shortest frontier edge is
//!   always taken first, which keeps groups compact.
//!
//! Customers unreachable through the adjacency graph join the group whose
//! gravity point (medoid) is nearest, and growth resumes from them.

use std::cmp::Ordering;
use std::collections::{BTreeSet, VecDeque};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::adjacency::{AdjacencyOracle, DEFAULT_NEIGHBORS};
use crate::distance::DistanceModel;
use crate::error::{check_group_count, PartitionError, Result};
use crate::models::Partition;
use crate::random::distinct_customers;

use super::medoid::{best_member, nearest_medoid};
use super::Partitioner;

/// Order in which groups claim frontier nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthPolicy {
    /// Round-robin: every group adds its nearest frontier node per ring.
    #[default]
    Balanced,
    /// Global: the shortest frontier edge over all groups is taken next.
    Strongest,
}

/// Configuration for [`VoronoiPartitioner`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoronoiConfig {
    /// Growth policy.
    pub policy: GrowthPolicy,
    /// Number of independent random seedings.
    pub restarts: usize,
    /// Upper bound on re-seeding rounds per restart.
    pub max_reseed_rounds: usize,
    /// Neighborhood size of the in-crate adjacency approximation.
    pub neighbors: usize,
}

impl Default for VoronoiConfig {
    fn default() -> Self {
        Self {
            policy: GrowthPolicy::Balanced,
            restarts: 100,
            max_reseed_rounds: 50,
            neighbors: DEFAULT_NEIGHBORS,
        }
    }
}

impl VoronoiConfig {
    /// Sets the growth policy.
    pub fn with_policy(mut self, policy: GrowthPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the number of restarts.
    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts;
        self
    }

    /// Sets the re-seeding bound.
    pub fn with_max_reseed_rounds(mut self, rounds: usize) -> Self {
        self.max_reseed_rounds = rounds;
        self
    }

    /// Sets the adjacency neighborhood size.
    pub fn with_neighbors(mut self, neighbors: usize) -> Self {
        self.neighbors = neighbors;
        self
    }

    /// Checks the parameter domains.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("restarts", self.restarts),
            ("max_reseed_rounds", self.max_reseed_rounds),
            ("neighbors", self.neighbors),
        ] {
            if value == 0 {
                return Err(PartitionError::InvalidParameter {
                    name,
                    reason: "must be positive".into(),
                });
            }
        }
        Ok(())
    }

    /// Replaces out-of-domain values with the defaults.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let mut config = self;
        if config.restarts == 0 {
            warn!(event = "parameter_fallback", parameter = "restarts", value = 0);
            config.restarts = defaults.restarts;
        }
        if config.max_reseed_rounds == 0 {
            warn!(event = "parameter_fallback", parameter = "max_reseed_rounds", value = 0);
            config.max_reseed_rounds = defaults.max_reseed_rounds;
        }
        if config.neighbors == 0 {
            warn!(event = "parameter_fallback", parameter = "neighbors", value = 0);
            config.neighbors = defaults.neighbors;
        }
        config
    }
}

/// Best partition found by [`VoronoiPartitioner::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct VoronoiOutcome {
    /// The groups; each starts with its seed.
    pub partition: Partition,
    /// Seed customer of each group.
    pub seeds: Vec<usize>,
    /// Sum of the growth edge lengths.
    pub cost: f64,
    /// `max_size - min_size`.
    pub imbalance: usize,
}

/// Seeded region growing over an [`AdjacencyOracle`].
///
/// # Examples
///
/// ```
/// use u_partition::adjacency::NearestNeighborAdjacency;
/// use u_partition::distance::Euclidean;
/// use u_partition::models::{Customer, NodeTable};
/// use u_partition::partition::{Partitioner, VoronoiConfig, VoronoiPartitioner};
/// use u_partition::random::create_rng;
///
/// let mut nodes = vec![Customer::depot(0.0, 0.0)];
/// for i in 1..=12 {
///     nodes.push(Customer::new(i, (i % 4) as f64, (i / 4) as f64, 1, 0.0));
/// }
/// let table = NodeTable::new(nodes);
/// let distance = Euclidean::build(&table).unwrap();
/// let oracle = NearestNeighborAdjacency::for_table(&table, 4);
/// let partitioner =
///     VoronoiPartitioner::new(&distance, &oracle, VoronoiConfig::default().with_restarts(5)).unwrap();
///
/// let partition = partitioner.partition(3, &mut create_rng(42)).unwrap();
/// assert_eq!(partition.num_groups(), 3);
/// assert!(partition.covers(table.len()));
/// ```
pub struct VoronoiPartitioner<'a> {
    distance: &'a dyn DistanceModel,
    oracle: &'a dyn AdjacencyOracle,
    config: VoronoiConfig,
}

impl<'a> VoronoiPartitioner<'a> {
    /// Creates a partitioner; out-of-domain settings fall back to defaults.
    ///
    /// # Errors
    ///
    /// [`PartitionError::SizeMismatch`] when the oracle and the distance model
    /// cover a different number of nodes.
    pub fn new(
        distance: &'a dyn DistanceModel,
        oracle: &'a dyn AdjacencyOracle,
        config: VoronoiConfig,
    ) -> Result<Self> {
        if oracle.len() != distance.size() {
            return Err(PartitionError::SizeMismatch {
                expected: distance.size(),
                actual: oracle.len(),
            });
        }
        Ok(Self {
            distance,
            oracle,
            config: config.sanitized(),
        })
    }

    /// The effective configuration.
    pub fn config(&self) -> &VoronoiConfig {
        &self.config
    }

    /// Runs all restarts and returns the best grown partition with its score.
    pub fn run<R: Rng + ?Sized>(&self, groups: usize, rng: &mut R) -> Result<VoronoiOutcome> {
        let n = self.distance.size();
        check_group_count(groups, n)?;

        let mut best: Option<VoronoiOutcome> = None;
        for restart in 0..self.config.restarts {
            let mut seeds = distinct_customers(rng, n - 1, groups);
            let mut current = self.grow(&seeds);
            let mut restart_best = current.clone();

            let mut rounds = 0;
            while rounds < self.config.max_reseed_rounds && self.reseed(&mut seeds, &current) {
                current = self.grow(&seeds);
                if self.is_better(&current, &restart_best) {
                    restart_best = current.clone();
                }
                rounds += 1;
            }

            debug!(
                event = "voronoi_restart",
                restart,
                reseed_rounds = rounds,
                cost = restart_best.cost,
                imbalance = restart_best.imbalance,
            );
            if best.as_ref().map_or(true, |b| self.is_better(&restart_best, b)) {
                best = Some(restart_best);
            }
        }

        best.ok_or_else(|| PartitionError::InvalidParameter {
            name: "restarts",
            reason: "must be positive".into(),
        })
    }

    /// Grows one partition from `seeds` with the configured policy.
    pub fn grow(&self, seeds: &[usize]) -> VoronoiOutcome {
        let mut growth = Growth::new(self.distance, self.oracle, seeds);
        match self.config.policy {
            GrowthPolicy::Balanced => growth.balanced(),
            GrowthPolicy::Strongest => growth.strongest(),
        }
        debug_assert_eq!(growth.remaining, 0);

        let partition = Partition::new(growth.groups);
        VoronoiOutcome {
            imbalance: partition.imbalance(),
            partition,
            seeds: seeds.to_vec(),
            cost: growth.cost,
        }
    }

    /// Moves every seed to the medoid of its group. Returns `true` if any seed
    /// moved.
    fn reseed(&self, seeds: &mut [usize], grown: &VoronoiOutcome) -> bool {
        let mut changed = false;
        for (seed, group) in seeds.iter_mut().zip(grown.partition.groups()) {
            let (medoid, _) = best_member(self.distance, group, *seed);
            if medoid != *seed {
                *seed = medoid;
                changed = true;
            }
        }
        changed
    }

    /// Balanced growth ranks by imbalance, then cost; strongest growth by cost.
    fn is_better(&self, a: &VoronoiOutcome, b: &VoronoiOutcome) -> bool {
        match self.config.policy {
            GrowthPolicy::Balanced => match a.imbalance.cmp(&b.imbalance) {
                Ordering::Less => true,
                Ordering::Equal => a.cost < b.cost,
                Ordering::Greater => false,
            },
            GrowthPolicy::Strongest => a.cost < b.cost,
        }
    }
}

impl Partitioner for VoronoiPartitioner<'_> {
    fn partition<R: Rng + ?Sized>(&self, groups: usize, rng: &mut R) -> Result<Partition> {
        self.run(groups, rng).map(|outcome| outcome.partition)
    }
}

/// Frontier entry of the strongest policy, ordered by distance then node.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    distance: f64,
    node: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.node.cmp(&other.node))
    }
}

/// State of one growth run.
struct Growth<'g> {
    distance: &'g dyn DistanceModel,
    oracle: &'g dyn AdjacencyOracle,
    assigned: Vec<bool>,
    groups: Vec<Vec<usize>>,
    remaining: usize,
    cost: f64,
}

impl<'g> Growth<'g> {
    fn new(distance: &'g dyn DistanceModel, oracle: &'g dyn AdjacencyOracle, seeds: &[usize]) -> Self {
        let n = distance.size();
        let mut assigned = vec![false; n];
        assigned[0] = true;
        for &seed in seeds {
            assigned[seed] = true;
        }
        Self {
            distance,
            oracle,
            assigned,
            groups: seeds.iter().map(|&s| vec![s]).collect(),
            remaining: n - 1 - seeds.len(),
            cost: 0.0,
        }
    }

    fn assign(&mut self, group: usize, node: usize, edge: f64) {
        self.assigned[node] = true;
        self.groups[group].push(node);
        self.remaining -= 1;
        self.cost += edge;
    }

    /// Nearest unassigned neighbor of `node`; ties go to the lower index.
    fn nearest_free_neighbor(&self, node: usize) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for &nb in self.oracle.neighbors(node) {
            if self.assigned[nb] {
                continue;
            }
            let d = self.distance.distance(node, nb);
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((nb, d));
            }
        }
        best
    }

    /// Medoid of every group, used to place unreachable customers.
    fn gravity_points(&self) -> Vec<usize> {
        self.groups
            .iter()
            .map(|group| best_member(self.distance, group, group[0]).0)
            .collect()
    }

    fn balanced(&mut self) {
        let mut queues: Vec<VecDeque<usize>> =
            self.groups.iter().map(|g| VecDeque::from(vec![g[0]])).collect();
        self.grow_rings(&mut queues);
        if self.remaining == 0 {
            return;
        }

        let gravity = self.gravity_points();
        let mut pending: Vec<VecDeque<usize>> = vec![VecDeque::new(); gravity.len()];
        for node in 1..self.assigned.len() {
            if !self.assigned[node] {
                let (g, _) = nearest_medoid(self.distance, &gravity, node);
                pending[g].push_back(node);
            }
        }
        debug!(event = "voronoi_unreachable", count = self.remaining);

        while pending.iter().any(|p| !p.is_empty()) {
            for (g, list) in pending.iter_mut().enumerate() {
                let Some(node) = list.pop_front() else {
                    continue;
                };
                if !self.assigned[node] {
                    let edge = self.distance.distance(node, gravity[g]);
                    self.assign(g, node, edge);
                    queues[g].push_back(node);
                }
            }
            self.grow_rings(&mut queues);
        }
    }

    /// Rings of round-robin growth until every queue is exhausted.
    fn grow_rings(&mut self, queues: &mut [VecDeque<usize>]) {
        while queues.iter().any(|q| !q.is_empty()) {
            for (g, queue) in queues.iter_mut().enumerate() {
                self.grow_step(g, queue);
            }
        }
    }

    /// Pops the queue head and adds its nearest free neighbor, which becomes
    /// the new tail. A head without free neighbors is dropped.
    fn grow_step(&mut self, group: usize, queue: &mut VecDeque<usize>) {
        let Some(head) = queue.pop_front() else {
            return;
        };
        if let Some((node, edge)) = self.nearest_free_neighbor(head) {
            self.assign(group, node, edge);
            queue.push_back(node);
        }
    }

    fn strongest(&mut self) {
        let k = self.groups.len();
        let mut frontier: Vec<BTreeSet<Candidate>> = vec![BTreeSet::new(); k];
        let mut owner: Vec<Option<(usize, f64)>> = vec![None; self.assigned.len()];
        for g in 0..k {
            let seed = self.groups[g][0];
            self.offer(g, seed, &mut frontier, &mut owner);
        }

        loop {
            let mut pick: Option<(usize, Candidate)> = None;
            for (g, set) in frontier.iter().enumerate() {
                if let Some(&c) = set.first() {
                    if pick.map_or(true, |(_, p)| c.distance < p.distance) {
                        pick = Some((g, c));
                    }
                }
            }

            let (group, node) = match pick {
                Some((g, c)) => {
                    frontier[g].remove(&c);
                    owner[c.node] = None;
                    self.assign(g, c.node, c.distance);
                    (g, c.node)
                }
                None if self.remaining == 0 => break,
                None => {
                    let gravity = self.gravity_points();
                    let Some(node) = (1..self.assigned.len()).find(|&i| !self.assigned[i]) else {
                        break;
                    };
                    let (g, edge) = nearest_medoid(self.distance, &gravity, node);
                    debug!(event = "voronoi_unreachable", node, group = g);
                    self.assign(g, node, edge);
                    (g, node)
                }
            };
            self.offer(group, node, &mut frontier, &mut owner);
        }
    }

    /// Puts the free neighbors of `from` on the frontier of `group`. A node
    /// already on another frontier moves only if `from` is strictly closer.
    fn offer(
        &self,
        group: usize,
        from: usize,
        frontier: &mut [BTreeSet<Candidate>],
        owner: &mut [Option<(usize, f64)>],
    ) {
        for &nb in self.oracle.neighbors(from) {
            if self.assigned[nb] {
                continue;
            }
            let d = self.distance.distance(from, nb);
            match owner[nb] {
                Some((_, held)) if held <= d => {}
                Some((holder, held)) => {
                    frontier[holder].remove(&Candidate { distance: held, node: nb });
                    frontier[group].insert(Candidate { distance: d, node: nb });
                    owner[nb] = Some((group, d));
                }
                None => {
                    frontier[group].insert(Candidate { distance: d, node: nb });
                    owner[nb] = Some((group, d));
                }
            }
        }
    }
}
