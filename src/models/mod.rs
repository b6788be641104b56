//! Domain model types for instance partitioning.
//!
//! Customers with demands and time windows, the immutable node table they
//! live in (depot at index 0), and the partition of its customers into groups.

mod customer;
mod node_table;
mod partition;

pub use customer::{Customer, TimeWindow};
pub use node_table::NodeTable;
pub use partition::Partition;
