//! Instances shared by the partitioner tests.

use rand::Rng;

use crate::models::{Customer, NodeTable, TimeWindow};
use crate::random::create_rng;

/// `customers` random customers on a 100 x 100 square with random windows.
pub fn random_table(customers: usize, seed: u64) -> NodeTable {
    let mut rng = create_rng(seed);
    let mut nodes = vec![Customer::depot(50.0, 50.0)
        .with_time_window(TimeWindow::new(0.0, 1000.0).expect("valid"))];
    for id in 1..=customers {
        let ready = rng.random_range(0.0..800.0);
        let width = rng.random_range(30.0..150.0);
        nodes.push(
            Customer::new(
                id,
                rng.random_range(0.0..100.0),
                rng.random_range(0.0..100.0),
                rng.random_range(1..30),
                10.0,
            )
            .with_time_window(TimeWindow::new(ready, ready + width).expect("valid")),
        );
    }
    NodeTable::with_fleet(nodes, 25, 200)
}

/// Two tight clusters of four customers, around (0, 0) and (100, 100).
///
/// Customers 1..=4 form the first cluster, 5..=8 the second.
pub fn two_clusters() -> NodeTable {
    let mut nodes = vec![Customer::depot(50.0, 50.0)];
    let offsets = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)];
    for (base, start) in [(0.0, 1), (100.0, 5)] {
        for (i, (dx, dy)) in offsets.iter().enumerate() {
            nodes.push(Customer::new(start + i, base + dx, base + dy, 5, 0.0));
        }
    }
    NodeTable::new(nodes)
}
