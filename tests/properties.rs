//! Property tests for the partition invariants.

use proptest::prelude::*;
use u_partition::adjacency::NearestNeighborAdjacency;
use u_partition::distance::{DistanceKind, DistanceModel, Euclidean, SpatioTemporalParams};
use u_partition::models::{Customer, NodeTable, TimeWindow};
use u_partition::partition::{
    GeneticConfig, GeneticPartitioner, GrowthPolicy, KMedoidConfig, KMedoidPartitioner, Partitioner,
    RecursiveSplitter, VoronoiConfig, VoronoiPartitioner,
};
use u_partition::random::create_rng;

fn customer_prototype() -> impl Strategy<Value = (i32, i32, i32, i32, i32)> {
    (0..100, 0..100, 1..30, 0..800, 10..200)
}

prop_compose! {
    fn generate_table(customers: std::ops::Range<usize>)
    (rows in prop::collection::vec(customer_prototype(), customers)) -> NodeTable {
        let mut nodes = vec![Customer::depot(50.0, 50.0)
            .with_time_window(TimeWindow::new(0.0, 1200.0).unwrap())];
        for (i, (x, y, demand, ready, width)) in rows.into_iter().enumerate() {
            let ready = ready as f64;
            nodes.push(
                Customer::new(i + 1, x as f64, y as f64, demand, 10.0)
                    .with_time_window(TimeWindow::new(ready, ready + width as f64).unwrap()),
            );
        }
        NodeTable::new(nodes)
    }
}

prop_compose! {
    fn generate_instance()
    (table in generate_table(6..40))
    (groups in 1..=table.len() - 2, seed in any::<u64>(), table in Just(table)) -> (NodeTable, usize, u64) {
        (table, groups, seed)
    }
}

fn distance_kinds() -> impl Strategy<Value = DistanceKind> {
    prop_oneof![
        Just(DistanceKind::Euclidean),
        Just(DistanceKind::SpatioTemporal(SpatioTemporalParams::default())),
        Just(DistanceKind::Spatial3d),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn voronoi_partitions_cover_customers(
        (table, groups, seed) in generate_instance(),
        kind in distance_kinds(),
        strongest in any::<bool>(),
    ) {
        let distance = kind.build(&table).unwrap();
        let oracle = NearestNeighborAdjacency::for_table(&table, 6);
        let policy = if strongest { GrowthPolicy::Strongest } else { GrowthPolicy::Balanced };
        let config = VoronoiConfig::default().with_policy(policy).with_restarts(3);
        let partitioner = VoronoiPartitioner::new(distance.as_ref(), &oracle, config).unwrap();

        let outcome = partitioner.run(groups, &mut create_rng(seed)).unwrap();
        prop_assert_eq!(outcome.partition.num_groups(), groups);
        prop_assert!(outcome.partition.covers(table.len()));
        prop_assert_eq!(outcome.imbalance, outcome.partition.imbalance());

        let again = partitioner.run(groups, &mut create_rng(seed)).unwrap();
        prop_assert_eq!(outcome, again);
    }

    #[test]
    fn genetic_history_never_worsens(
        (table, groups, seed) in generate_instance(),
        kind in distance_kinds(),
    ) {
        let distance = kind.build(&table).unwrap();
        let config = GeneticConfig::default().with_population_size(10).with_generations(10);
        let outcome = GeneticPartitioner::new(distance.as_ref(), config)
            .run(groups, &mut create_rng(seed))
            .unwrap();

        prop_assert!(outcome.partition.covers(table.len()));
        prop_assert_eq!(outcome.partition.num_groups(), groups);
        for pair in outcome.fitness_history.windows(2) {
            prop_assert!(pair[1] <= pair[0]);
        }
        let fitness: f64 = (1..table.len())
            .map(|c| outcome.medoids.iter().map(|&m| distance.distance(m, c)).fold(f64::INFINITY, f64::min))
            .sum();
        prop_assert!((fitness - outcome.best_fitness).abs() < 1e-6);
    }

    #[test]
    fn kmedoid_cost_bounded_by_every_start(
        (table, groups, seed) in generate_instance(),
        kind in distance_kinds(),
    ) {
        let distance = kind.build(&table).unwrap();
        let km = KMedoidPartitioner::new(distance.as_ref(), KMedoidConfig::default().with_attempts(4));
        let outcome = km.run(groups, &mut create_rng(seed)).unwrap();

        prop_assert!(outcome.partition.covers(table.len()));
        for initial in &outcome.initial_costs {
            prop_assert!(outcome.cost <= initial + 1e-9);
        }
        for (group, medoid) in outcome.partition.groups().iter().zip(&outcome.medoids) {
            prop_assert!(group.contains(medoid));
        }
    }

    #[test]
    fn splitting_preserves_membership(
        (table, groups, seed) in generate_instance(),
        tolerance in 0.0..1.0f64,
    ) {
        let distance = Euclidean::build(&table).unwrap();
        let km = KMedoidPartitioner::new(&distance, KMedoidConfig::default().with_attempts(2));
        let mut rng = create_rng(seed);
        let partition = km.partition(groups, &mut rng).unwrap();
        let splitter = RecursiveSplitter::new(tolerance).unwrap();
        let threshold = splitter.threshold(&partition);
        let oversized = partition
            .groups()
            .iter()
            .filter(|g| g.len() >= 3 && g.len() as f64 > threshold)
            .count();

        let split = splitter
            .split(&table, partition.clone(), |sub| {
                let d = Euclidean::build(sub)?;
                KMedoidPartitioner::new(&d, KMedoidConfig::default().with_attempts(2)).partition(2, &mut rng)
            })
            .unwrap();

        prop_assert!(split.covers(table.len()));
        prop_assert_eq!(split.num_groups(), partition.num_groups() + oversized);
    }
}

#[test]
fn kmedoid_single_attempt_ten_nodes() {
    let coords = [
        (40.0, 50.0),
        (45.0, 68.0),
        (45.0, 70.0),
        (42.0, 66.0),
        (42.0, 68.0),
        (42.0, 65.0),
        (40.0, 69.0),
        (40.0, 66.0),
        (38.0, 68.0),
        (38.0, 70.0),
    ];
    let nodes = coords
        .iter()
        .enumerate()
        .map(|(i, &(x, y))| if i == 0 { Customer::depot(x, y) } else { Customer::new(i, x, y, 10, 90.0) })
        .collect();
    let table = NodeTable::new(nodes);
    let distance = Euclidean::build(&table).unwrap();
    let km = KMedoidPartitioner::new(&distance, KMedoidConfig::default().with_attempts(1));

    let first = km.run(3, &mut create_rng(1)).unwrap();
    assert_eq!(first.partition.num_groups(), 3);
    assert!(first.partition.sizes().iter().all(|&s| s > 0));
    assert_eq!(first.partition.num_assigned(), 9);
    assert_eq!(first, km.run(3, &mut create_rng(1)).unwrap());
}
