//! # u-partition
//!
//! Partitioning of vehicle routing instances with time windows into groups of
//! customers that can be routed independently.
//!
//! ## Modules
//!
//! - [`models`] — Customers, time windows, node tables and partitions
//! - [`distance`] — Euclidean, spatio-temporal and 3-D distance models
//! - [`adjacency`] — Voronoi-cell adjacency oracles
//! - [`partition`] — Voronoi growth, genetic medoid search, k-medoids and
//!   oversized-group splitting
//! - [`engine`] — Strategy dispatch driven by a [`config::PartitionConfig`]
//! - [`solve`] — Parallel hand-off of groups to an external routing solver
//! - [`io`] — Solomon instance reader
//!
//! ## Example
//!
//! ```
//! use u_partition::config::{PartitionConfig, Strategy};
//! use u_partition::engine::PartitionEngine;
//! use u_partition::io::parse_solomon;
//! use u_partition::partition::VoronoiConfig;
//!
//! let text = "C1\n\nVEHICLE\nNUMBER CAPACITY\n 4 100\n\nCUSTOMER\n\n\
//!             0 50 50 0 0 500 0\n\
//!             1 10 10 5 0 100 10\n2 12 11 5 0 100 10\n3 11 14 5 0 100 10\n\
//!             4 90 90 5 200 300 10\n5 88 91 5 200 300 10\n6 91 87 5 200 300 10\n";
//! let table = parse_solomon(text).unwrap();
//!
//! let config = PartitionConfig::new()
//!     .with_groups(2)
//!     .with_seed(7)
//!     .with_strategy(Strategy::Voronoi(VoronoiConfig::default().with_restarts(10)));
//! let mut engine = PartitionEngine::from_config(&config).unwrap();
//! let partition = engine.partition(&table, 2).unwrap();
//!
//! assert!(partition.covers(table.len()));
//! assert_eq!(partition.num_groups(), 2);
//! ```

pub mod adjacency;
pub mod config;
pub mod distance;
pub mod engine;
pub mod error;
pub mod io;
pub mod models;
pub mod partition;
pub mod random;
pub mod solve;

pub use error::{PartitionError, Result};
