//! Medoid helpers shared by the partitioners.

use crate::distance::DistanceModel;

/// Assigns every customer to its nearest medoid, producing one group per
/// medoid in medoid order.
///
/// Ties go to the lowest medoid position. A medoid always lands in its own
/// group, so no group is empty.
pub fn assign_to_nearest(distance: &dyn DistanceModel, medoids: &[usize]) -> Vec<Vec<usize>> {
    let n = distance.size();
    let mut owner = vec![None; n];
    for (g, &m) in medoids.iter().enumerate() {
        owner[m] = Some(g);
    }

    let mut groups = vec![Vec::with_capacity(n / medoids.len().max(1) + 1); medoids.len()];
    for customer in 1..n {
        let g = owner[customer].unwrap_or_else(|| nearest_medoid(distance, medoids, customer).0);
        groups[g].push(customer);
    }
    groups
}

/// Position of the medoid nearest to `node` and the distance to it.
///
/// # Panics
///
/// Panics if `medoids` is empty.
pub fn nearest_medoid(distance: &dyn DistanceModel, medoids: &[usize], node: usize) -> (usize, f64) {
    let mut best = 0;
    let mut best_distance = distance.distance(medoids[0], node);
    for (g, &m) in medoids.iter().enumerate().skip(1) {
        let d = distance.distance(m, node);
        if d < best_distance {
            best = g;
            best_distance = d;
        }
    }
    (best, best_distance)
}

/// The member of `group` with the smallest total distance to the others,
/// starting from `current`; a member replaces it only on strict improvement.
///
/// Returns the member and its total distance.
pub fn best_member(distance: &dyn DistanceModel, group: &[usize], current: usize) -> (usize, f64) {
    let mut best = current;
    let mut best_cost = distance.sum_to(current, group);
    for &candidate in group {
        if candidate == current {
            continue;
        }
        let cost = distance.sum_to(candidate, group);
        if cost < best_cost {
            best = candidate;
            best_cost = cost;
        }
    }
    (best, best_cost)
}

/// Sum over customers of the distance to their nearest medoid.
pub fn medoid_cost(distance: &dyn DistanceModel, medoids: &[usize]) -> f64 {
    (1..distance.size())
        .map(|customer| nearest_medoid(distance, medoids, customer).1)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::Euclidean;
    use crate::models::{Customer, NodeTable};

    fn line() -> Euclidean {
        // depot far away, customers on a line at x = 0, 1, 2, 10, 11
        let table = NodeTable::new(vec![
            Customer::depot(100.0, 100.0),
            Customer::new(1, 0.0, 0.0, 1, 0.0),
            Customer::new(2, 1.0, 0.0, 1, 0.0),
            Customer::new(3, 2.0, 0.0, 1, 0.0),
            Customer::new(4, 10.0, 0.0, 1, 0.0),
            Customer::new(5, 11.0, 0.0, 1, 0.0),
        ]);
        Euclidean::build(&table).expect("valid")
    }

    #[test]
    fn test_assign_to_nearest() {
        let d = line();
        let groups = assign_to_nearest(&d, &[1, 5]);
        assert_eq!(groups, vec![vec![1, 2, 3], vec![4, 5]]);
    }

    #[test]
    fn test_medoid_keeps_own_group_on_ties() {
        let table = NodeTable::new(vec![
            Customer::depot(0.0, 0.0),
            Customer::new(1, 5.0, 5.0, 1, 0.0),
            Customer::new(2, 5.0, 5.0, 1, 0.0),
            Customer::new(3, 9.0, 9.0, 1, 0.0),
        ]);
        let d = Euclidean::build(&table).expect("valid");
        let groups = assign_to_nearest(&d, &[1, 2]);
        assert_eq!(groups, vec![vec![1, 3], vec![2]]);
    }

    #[test]
    fn test_best_member() {
        let d = line();
        let (m, cost) = best_member(&d, &[1, 2, 3], 1);
        assert_eq!(m, 2);
        assert!((cost - 2.0).abs() < 1e-12);
        // Already optimal: stays.
        assert_eq!(best_member(&d, &[1, 2, 3], 2).0, 2);
    }

    #[test]
    fn test_medoid_cost() {
        let d = line();
        // 1→2: 1, 3→2: 1, 4→5: 1
        assert!((medoid_cost(&d, &[2, 5]) - 3.0).abs() < 1e-12);
    }
}
