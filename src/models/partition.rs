//! Partition of the customers of a node table into groups.

use serde::{Deserialize, Serialize};

/// Groups of customer row indices; the depot (row 0) never appears.
///
/// A valid partition of an `N`-row table places every row `1..N` in exactly
/// one group, so the group sizes sum to `N - 1`.
///
/// # Examples
///
/// ```
/// use u_partition::models::Partition;
///
/// let p = Partition::new(vec![vec![1, 3], vec![2, 4, 5]]);
/// assert_eq!(p.num_groups(), 2);
/// assert_eq!(p.num_assigned(), 5);
/// assert_eq!(p.imbalance(), 1);
/// assert!(p.covers(6));
/// assert!(!p.covers(7));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Partition {
    groups: Vec<Vec<usize>>,
}

impl Partition {
    /// Wraps the given groups.
    pub fn new(groups: Vec<Vec<usize>>) -> Self {
        Self { groups }
    }

    /// The groups, in order.
    pub fn groups(&self) -> &[Vec<usize>] {
        &self.groups
    }

    /// Consumes the partition, returning its groups.
    pub fn into_groups(self) -> Vec<Vec<usize>> {
        self.groups
    }

    /// Number of groups.
    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    /// Total number of assigned rows.
    pub fn num_assigned(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    /// Size of each group.
    pub fn sizes(&self) -> Vec<usize> {
        self.groups.iter().map(Vec::len).collect()
    }

    /// `max_size - min_size` over the groups (0 for an empty partition).
    pub fn imbalance(&self) -> usize {
        let max = self.groups.iter().map(Vec::len).max().unwrap_or(0);
        let min = self.groups.iter().map(Vec::len).min().unwrap_or(0);
        max - min
    }

    /// Mean group size.
    pub fn mean_size(&self) -> f64 {
        if self.groups.is_empty() {
            return 0.0;
        }
        self.num_assigned() as f64 / self.groups.len() as f64
    }

    /// Returns `true` if every row `1..nodes` appears in exactly one non-empty
    /// group and nothing else (in particular not the depot) appears.
    pub fn covers(&self, nodes: usize) -> bool {
        if nodes == 0 || self.num_assigned() != nodes - 1 {
            return false;
        }
        let mut seen = vec![false; nodes];
        seen[0] = true;
        for group in &self.groups {
            if group.is_empty() {
                return false;
            }
            for &i in group {
                if i >= nodes || seen[i] {
                    return false;
                }
                seen[i] = true;
            }
        }
        true
    }
}

impl From<Vec<Vec<usize>>> for Partition {
    fn from(groups: Vec<Vec<usize>>) -> Self {
        Self::new(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_covers_detects_duplicates() {
        let p = Partition::new(vec![vec![1, 2], vec![2, 3]]);
        assert!(!p.covers(5));
    }

    #[test]
    fn test_covers_rejects_depot_and_empty_groups() {
        assert!(!Partition::new(vec![vec![0, 1], vec![2]]).covers(4));
        assert!(!Partition::new(vec![vec![1, 2, 3], vec![]]).covers(4));
        assert!(Partition::new(vec![vec![3, 1], vec![2]]).covers(4));
    }

    #[test]
    fn test_covers_rejects_out_of_range() {
        assert!(!Partition::new(vec![vec![1, 9]]).covers(3));
    }

    #[test]
    fn test_sizes_and_mean() {
        let p = Partition::new(vec![vec![1], vec![2, 3, 4], vec![5, 6]]);
        assert_eq!(p.sizes(), vec![1, 3, 2]);
        assert_eq!(p.imbalance(), 2);
        assert!((p.mean_size() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty() {
        let p = Partition::default();
        assert_eq!(p.num_groups(), 0);
        assert_eq!(p.imbalance(), 0);
        assert_eq!(p.mean_size(), 0.0);
    }
}
