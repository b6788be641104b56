//! The node table of a VRPTW instance.

use serde::{Deserialize, Serialize};

use super::Customer;

/// An immutable, ordered table of nodes; index 0 is the depot.
///
/// A table is either a full instance or a sub-instance created with
/// [`NodeTable::subset`]. Sub-instances remember, for each of their rows,
/// the row index in the table they were cut from.
///
/// # Examples
///
/// ```
/// use u_partition::models::{Customer, NodeTable};
///
/// let table = NodeTable::new(vec![
///     Customer::depot(0.0, 0.0),
///     Customer::new(1, 1.0, 0.0, 10, 0.0),
///     Customer::new(2, 2.0, 0.0, 10, 0.0),
///     Customer::new(3, 3.0, 0.0, 10, 0.0),
/// ]);
/// assert_eq!(table.len(), 4);
/// assert_eq!(table.num_customers(), 3);
///
/// let sub = table.subset(&[3, 1]);
/// assert_eq!(sub.len(), 3);
/// assert_eq!(sub.node(1).id(), 3);
/// assert_eq!(sub.parent_index(2), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeTable {
    nodes: Vec<Customer>,
    parent: Vec<usize>,
    vehicles: usize,
    capacity: i32,
}

impl NodeTable {
    /// Creates a table from its nodes (depot first), without fleet data.
    pub fn new(nodes: Vec<Customer>) -> Self {
        Self::with_fleet(nodes, 0, 0)
    }

    /// Creates a table carrying the fleet size and vehicle capacity.
    pub fn with_fleet(nodes: Vec<Customer>, vehicles: usize, capacity: i32) -> Self {
        let parent = (0..nodes.len()).collect();
        Self {
            nodes,
            parent,
            vehicles,
            capacity,
        }
    }

    /// Builds a sub-instance from the given row indices (depot excluded).
    ///
    /// The depot is re-inserted at index 0 and the selected rows follow in the
    /// given order, so row `i + 1` of the result is `indices[i]` of `self`.
    ///
    /// # Panics
    ///
    /// Panics if an index is out of bounds.
    pub fn subset(&self, indices: &[usize]) -> Self {
        let mut nodes = Vec::with_capacity(indices.len() + 1);
        let mut parent = Vec::with_capacity(indices.len() + 1);
        nodes.push(self.nodes[0].clone());
        parent.push(0);
        for &i in indices {
            nodes.push(self.nodes[i].clone());
            parent.push(i);
        }
        Self {
            nodes,
            parent,
            vehicles: self.vehicles,
            capacity: self.capacity,
        }
    }

    /// All rows, depot first.
    pub fn nodes(&self) -> &[Customer] {
        &self.nodes
    }

    /// The row at `index`.
    pub fn node(&self, index: usize) -> &Customer {
        &self.nodes[index]
    }

    /// The depot row.
    pub fn depot(&self) -> &Customer {
        &self.nodes[0]
    }

    /// Number of rows (depot included).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the table has no rows at all.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of customers (depot excluded).
    pub fn num_customers(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// Row index in the table this one was cut from.
    pub fn parent_index(&self, index: usize) -> usize {
        self.parent[index]
    }

    /// Instance identifiers of the given rows.
    pub fn ids_of(&self, indices: &[usize]) -> Vec<usize> {
        indices.iter().map(|&i| self.nodes[i].id()).collect()
    }

    /// Available vehicles.
    pub fn vehicles(&self) -> usize {
        self.vehicles
    }

    /// Vehicle capacity.
    pub fn capacity(&self) -> i32 {
        self.capacity
    }

    /// Every row embedded as (x, y, time-window midpoint).
    pub fn embedding(&self) -> Vec<[f64; 3]> {
        self.nodes.iter().map(Customer::embedding).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeWindow;

    fn table() -> NodeTable {
        let tw = |a, b| TimeWindow::new(a, b).expect("valid");
        NodeTable::with_fleet(
            vec![
                Customer::depot(0.0, 0.0).with_time_window(tw(0.0, 100.0)),
                Customer::new(1, 1.0, 0.0, 10, 1.0).with_time_window(tw(0.0, 10.0)),
                Customer::new(2, 2.0, 0.0, 20, 1.0).with_time_window(tw(10.0, 20.0)),
                Customer::new(3, 3.0, 0.0, 30, 1.0).with_time_window(tw(20.0, 30.0)),
            ],
            5,
            200,
        )
    }

    #[test]
    fn test_counts() {
        let t = table();
        assert_eq!(t.len(), 4);
        assert_eq!(t.num_customers(), 3);
        assert_eq!(t.vehicles(), 5);
        assert_eq!(t.capacity(), 200);
        assert!(!t.is_empty());
    }

    #[test]
    fn test_subset_reinserts_depot() {
        let t = table();
        let sub = t.subset(&[2, 3]);
        assert_eq!(sub.len(), 3);
        assert_eq!(sub.depot().id(), 0);
        assert_eq!(sub.node(1).id(), 2);
        assert_eq!(sub.node(2).id(), 3);
        assert_eq!(sub.parent_index(0), 0);
        assert_eq!(sub.parent_index(1), 2);
        assert_eq!(sub.vehicles(), 5);
        assert_eq!(sub.capacity(), 200);
    }

    #[test]
    fn test_nested_subset_keeps_ids() {
        let t = table();
        let sub = t.subset(&[3, 1, 2]);
        let subsub = sub.subset(&[3]);
        assert_eq!(subsub.node(1).id(), 2);
        assert_eq!(subsub.parent_index(1), 3);
        assert_eq!(sub.parent_index(subsub.parent_index(1)), 2);
    }

    #[test]
    fn test_embedding() {
        let t = table();
        let points = t.embedding();
        assert_eq!(points.len(), 4);
        assert_eq!(points[0], [0.0, 0.0, 50.0]);
        assert_eq!(points[3], [3.0, 0.0, 25.0]);
    }

    #[test]
    fn test_ids_of() {
        let t = table().subset(&[3, 1]);
        assert_eq!(t.ids_of(&[1, 2]), vec![3, 1]);
    }
}
