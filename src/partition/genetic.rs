//! Genetic search over medoid sets.
//!
//! A chromosome is a set of `k` distinct customer indices (medoids). Its
//! fitness is the sum over customers of the distance to the nearest medoid;
//! lower is better. Each generation applies fitness-proportional selection on
//! the inverse fitness, pairwise recombination and point mutation. The
//! best chromosome ever seen is decoded by nearest-medoid assignment.

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, trace, warn};

use crate::distance::DistanceModel;
use crate::error::{check_group_count, PartitionError, Result};
use crate::models::Partition;
use crate::random::{customer_outside, distinct_customers};

use super::medoid::{assign_to_nearest, medoid_cost};
use super::Partitioner;

/// Lower bound on a fitness value before inversion.
const MIN_FITNESS: f64 = 1e-12;

/// Configuration for [`GeneticPartitioner`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticConfig {
    /// Chromosomes per generation.
    pub population_size: usize,
    /// Number of generations.
    pub generations: usize,
    /// Probability that a selected pair is recombined.
    pub crossover_rate: f64,
    /// Probability that a pooled gene is replaced by a fresh customer during
    /// recombination.
    pub crossover_mutation_rate: f64,
    /// Probability that a chromosome has one gene replaced.
    pub mutation_rate: f64,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            generations: 300,
            crossover_rate: 0.65,
            crossover_mutation_rate: 0.2,
            mutation_rate: 0.05,
        }
    }
}

impl GeneticConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Sets the number of generations.
    pub fn with_generations(mut self, generations: usize) -> Self {
        self.generations = generations;
        self
    }

    /// Sets the crossover probability.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    /// Sets the in-crossover replacement probability.
    pub fn with_crossover_mutation_rate(mut self, rate: f64) -> Self {
        self.crossover_mutation_rate = rate;
        self
    }

    /// Sets the mutation probability.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    fn rates(&self) -> [(&'static str, f64); 3] {
        [
            ("crossover_rate", self.crossover_rate),
            ("crossover_mutation_rate", self.crossover_mutation_rate),
            ("mutation_rate", self.mutation_rate),
        ]
    }

    /// Checks the parameter domains.
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(PartitionError::InvalidParameter {
                name: "population_size",
                reason: "must be positive".into(),
            });
        }
        for (name, rate) in self.rates() {
            if !(0.0..=1.0).contains(&rate) {
                return Err(PartitionError::InvalidParameter {
                    name,
                    reason: format!("expected a probability, got {rate}"),
                });
            }
        }
        Ok(())
    }

    /// Replaces out-of-domain values with the defaults.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let mut config = self;
        if config.population_size == 0 {
            warn!(event = "parameter_fallback", parameter = "population_size", value = 0);
            config.population_size = defaults.population_size;
        }
        if !(0.0..=1.0).contains(&config.crossover_rate) {
            warn!(event = "parameter_fallback", parameter = "crossover_rate", value = config.crossover_rate);
            config.crossover_rate = defaults.crossover_rate;
        }
        if !(0.0..=1.0).contains(&config.crossover_mutation_rate) {
            warn!(
                event = "parameter_fallback",
                parameter = "crossover_mutation_rate",
                value = config.crossover_mutation_rate,
            );
            config.crossover_mutation_rate = defaults.crossover_mutation_rate;
        }
        if !(0.0..=1.0).contains(&config.mutation_rate) {
            warn!(event = "parameter_fallback", parameter = "mutation_rate", value = config.mutation_rate);
            config.mutation_rate = defaults.mutation_rate;
        }
        config
    }
}

/// Result of [`GeneticPartitioner::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct GeneticOutcome {
    /// Nearest-medoid decoding of the best chromosome.
    pub partition: Partition,
    /// The best chromosome.
    pub medoids: Vec<usize>,
    /// Its fitness.
    pub best_fitness: f64,
    /// Best fitness so far, after initialization and after every generation.
    pub fitness_history: Vec<f64>,
}

/// Genetic algorithm over medoid sets.
///
/// # Examples
///
/// ```
/// use u_partition::distance::Euclidean;
/// use u_partition::models::{Customer, NodeTable};
/// use u_partition::partition::{GeneticConfig, GeneticPartitioner};
/// use u_partition::random::create_rng;
///
/// let mut nodes = vec![Customer::depot(0.0, 0.0)];
/// for i in 1..=10 {
///     nodes.push(Customer::new(i, i as f64, (i * i % 7) as f64, 1, 0.0));
/// }
/// let table = NodeTable::new(nodes);
/// let distance = Euclidean::build(&table).unwrap();
/// let config = GeneticConfig::default().with_population_size(20).with_generations(30);
///
/// let outcome = GeneticPartitioner::new(&distance, config).run(3, &mut create_rng(7)).unwrap();
/// assert_eq!(outcome.medoids.len(), 3);
/// assert!(outcome.partition.covers(table.len()));
/// ```
pub struct GeneticPartitioner<'a> {
    distance: &'a dyn DistanceModel,
    config: GeneticConfig,
}

impl<'a> GeneticPartitioner<'a> {
    /// Creates a partitioner; out-of-domain settings fall back to defaults.
    pub fn new(distance: &'a dyn DistanceModel, config: GeneticConfig) -> Self {
        Self {
            distance,
            config: config.sanitized(),
        }
    }

    /// The effective configuration.
    pub fn config(&self) -> &GeneticConfig {
        &self.config
    }

    /// Sum over customers of the distance to their nearest medoid.
    pub fn fitness(&self, medoids: &[usize]) -> f64 {
        medoid_cost(self.distance, medoids)
    }

    /// Evolves the population and decodes the best chromosome.
    pub fn run<R: Rng + ?Sized>(&self, groups: usize, rng: &mut R) -> Result<GeneticOutcome> {
        let n = self.distance.size();
        check_group_count(groups, n)?;
        let customers = n - 1;

        let mut population: Vec<Vec<usize>> = (0..self.config.population_size)
            .map(|_| distinct_customers(rng, customers, groups))
            .collect();
        let mut fitness: Vec<f64> = population.iter().map(|c| self.fitness(c)).collect();

        let mut best_index = 0;
        for (i, &f) in fitness.iter().enumerate() {
            if f < fitness[best_index] {
                best_index = i;
            }
        }
        let mut best = population[best_index].clone();
        let mut best_fitness = fitness[best_index];
        let mut history = Vec::with_capacity(self.config.generations + 1);
        history.push(best_fitness);

        for generation in 0..self.config.generations {
            let mut next = roulette_select(&population, &fitness, rng);
            self.crossover(&mut next, customers, rng);
            self.mutate(&mut next, customers, rng);
            population = next;
            fitness = population.iter().map(|c| self.fitness(c)).collect();

            for (chromosome, &f) in population.iter().zip(&fitness) {
                if f < best_fitness {
                    best_fitness = f;
                    best.clone_from(chromosome);
                    trace!(event = "ga_improved", generation, fitness = f);
                }
            }
            history.push(best_fitness);
        }

        info!(
            event = "ga_finished",
            groups,
            generations = self.config.generations,
            best_fitness,
        );
        Ok(GeneticOutcome {
            partition: Partition::new(assign_to_nearest(self.distance, &best)),
            medoids: best,
            best_fitness,
            fitness_history: history,
        })
    }

    /// Pairs chromosomes in random order; each pair recombines with the
    /// crossover probability. An odd one out passes through.
    fn crossover<R: Rng + ?Sized>(&self, population: &mut [Vec<usize>], customers: usize, rng: &mut R) {
        let mut order: Vec<usize> = (0..population.len()).collect();
        order.shuffle(rng);
        for pair in order.chunks_exact(2) {
            if !rng.random_bool(self.config.crossover_rate) {
                continue;
            }
            let mut first = std::mem::take(&mut population[pair[0]]);
            let mut second = std::mem::take(&mut population[pair[1]]);
            recombine(
                &mut first,
                &mut second,
                customers,
                self.config.crossover_mutation_rate,
                rng,
            );
            population[pair[0]] = first;
            population[pair[1]] = second;
        }
    }

    fn mutate<R: Rng + ?Sized>(&self, population: &mut [Vec<usize>], customers: usize, rng: &mut R) {
        for chromosome in population.iter_mut() {
            if rng.random_bool(self.config.mutation_rate) {
                mutate_gene(chromosome, customers, rng);
            }
        }
    }
}

impl Partitioner for GeneticPartitioner<'_> {
    fn partition<R: Rng + ?Sized>(&self, groups: usize, rng: &mut R) -> Result<Partition> {
        self.run(groups, rng).map(|outcome| outcome.partition)
    }
}

/// Draws `population.len()` chromosomes with probability proportional to
/// `1 / fitness`.
pub(crate) fn roulette_select<R: Rng + ?Sized>(
    population: &[Vec<usize>],
    fitness: &[f64],
    rng: &mut R,
) -> Vec<Vec<usize>> {
    let weights: Vec<f64> = fitness.iter().map(|f| 1.0 / f.max(MIN_FITNESS)).collect();
    let total: f64 = weights.iter().sum();
    let mut slots = Vec::with_capacity(weights.len());
    let mut acc = 0.0;
    for w in &weights {
        acc += w / total;
        slots.push(acc);
    }

    let last = population.len() - 1;
    (0..population.len())
        .map(|_| {
            let u: f64 = rng.random();
            let index = slots.partition_point(|&s| s <= u).min(last);
            population[index].clone()
        })
        .collect()
}

/// Recombines two medoid sets of equal length `k` in place.
///
/// The genes of both parents are pooled and shuffled. With probability
/// `replace_rate` each of the first `k` pooled genes is replaced by a customer
/// outside one parent's set. After a second shuffle the first child takes the
/// first `k` distinct genes scanning forward, the second scanning backward.
pub(crate) fn recombine<R: Rng + ?Sized>(
    first: &mut Vec<usize>,
    second: &mut Vec<usize>,
    customers: usize,
    replace_rate: f64,
    rng: &mut R,
) {
    let k = first.len();
    let mut in_first: BTreeSet<usize> = first.iter().copied().collect();
    let mut in_second: BTreeSet<usize> = second.iter().copied().collect();

    let mut pool: Vec<usize> = first.iter().chain(second.iter()).copied().collect();
    pool.shuffle(rng);
    for gene in pool.iter_mut().take(k) {
        if !rng.random_bool(replace_rate) {
            continue;
        }
        if let Some(c) = customer_outside(rng, customers, in_first.len(), |c| in_first.contains(&c)) {
            in_first.insert(c);
            *gene = c;
        } else if let Some(c) =
            customer_outside(rng, customers, in_second.len(), |c| in_second.contains(&c))
        {
            in_second.insert(c);
            *gene = c;
        }
    }
    pool.shuffle(rng);

    *first = take_distinct(pool.iter().copied(), k, customers, rng);
    *second = take_distinct(pool.iter().rev().copied(), k, customers, rng);
}

/// First `k` distinct genes of `genes`, topped up with fresh customers.
fn take_distinct<I, R>(genes: I, k: usize, customers: usize, rng: &mut R) -> Vec<usize>
where
    I: Iterator<Item = usize>,
    R: Rng + ?Sized,
{
    let mut seen = BTreeSet::new();
    let mut child = Vec::with_capacity(k);
    for gene in genes {
        if child.len() == k {
            break;
        }
        if seen.insert(gene) {
            child.push(gene);
        }
    }
    while child.len() < k {
        match customer_outside(rng, customers, seen.len(), |c| seen.contains(&c)) {
            Some(c) => {
                seen.insert(c);
                child.push(c);
            }
            None => break,
        }
    }
    child
}

/// Replaces one random gene by a customer not already in the chromosome.
pub(crate) fn mutate_gene<R: Rng + ?Sized>(chromosome: &mut [usize], customers: usize, rng: &mut R) {
    if chromosome.is_empty() {
        return;
    }
    let position = rng.random_range(0..chromosome.len());
    let taken: BTreeSet<usize> = chromosome.iter().copied().collect();
    if let Some(c) = customer_outside(rng, customers, taken.len(), |c| taken.contains(&c)) {
        chromosome[position] = c;
    }
}
