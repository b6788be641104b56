//! Engine configuration, loadable from TOML.
//!
//! ```
//! use u_partition::config::{PartitionConfig, Strategy};
//! use u_partition::distance::DistanceKind;
//! use u_partition::partition::GrowthPolicy;
//!
//! let config = PartitionConfig::from_toml_str(r#"
//!     groups = 8
//!     seed = 42
//!     split_oversized = true
//!
//!     [distance]
//!     type = "spatio_temporal"
//!     alpha = 0.6
//!
//!     [strategy]
//!     type = "voronoi"
//!     policy = "strongest"
//!     restarts = 20
//! "#).unwrap();
//!
//! assert_eq!(config.groups, 8);
//! assert!(matches!(config.distance, DistanceKind::SpatioTemporal(p) if p.alpha == 0.6));
//! assert!(matches!(config.strategy, Strategy::Voronoi(v) if v.policy == GrowthPolicy::Strongest));
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::distance::DistanceKind;
use crate::error::PartitionError;
use crate::partition::{GeneticConfig, KMedoidConfig, VoronoiConfig, DEFAULT_SPLIT_TOLERANCE};

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<PartitionError> for ConfigError {
    fn from(err: PartitionError) -> Self {
        Self::Invalid(err.to_string())
    }
}

/// Which partitioner to run, with its settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Strategy {
    /// Seeded growth over Voronoi adjacency.
    Voronoi(VoronoiConfig),
    /// Genetic search over medoid sets.
    Genetic(GeneticConfig),
    /// Multi-start k-medoids.
    #[serde(rename = "kmedoid")]
    KMedoid(KMedoidConfig),
}

impl Default for Strategy {
    fn default() -> Self {
        Self::Voronoi(VoronoiConfig::default())
    }
}

impl Strategy {
    /// Short name used in log events.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Voronoi(_) => "voronoi",
            Self::Genetic(_) => "genetic",
            Self::KMedoid(_) => "kmedoid",
        }
    }

    /// Checks the settings of the selected partitioner.
    pub fn validate(&self) -> Result<(), PartitionError> {
        match self {
            Self::Voronoi(c) => c.validate(),
            Self::Genetic(c) => c.validate(),
            Self::KMedoid(c) => c.validate(),
        }
    }
}

/// Top-level partitioning configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartitionConfig {
    /// Requested number of groups.
    pub groups: usize,
    /// Re-partition oversized groups in two.
    pub split_oversized: bool,
    /// Relative tolerance above the mean group size.
    pub split_tolerance: f64,
    /// Seed of the engine's master stream; fresh entropy when absent.
    pub seed: Option<u64>,
    /// Distance model to build for each table.
    pub distance: DistanceKind,
    /// Partitioner and its settings.
    pub strategy: Strategy,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            groups: 2,
            split_oversized: false,
            split_tolerance: DEFAULT_SPLIT_TOLERANCE,
            seed: None,
            distance: DistanceKind::default(),
            strategy: Strategy::default(),
        }
    }
}

impl PartitionConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Sets the distance kind.
    pub fn with_distance(mut self, distance: DistanceKind) -> Self {
        self.distance = distance;
        self
    }

    /// Sets the strategy.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the number of groups.
    pub fn with_groups(mut self, groups: usize) -> Self {
        self.groups = groups;
        self
    }

    /// Enables splitting of oversized groups with the given tolerance.
    pub fn with_splitting(mut self, tolerance: f64) -> Self {
        self.split_oversized = true;
        self.split_tolerance = tolerance;
        self
    }

    /// Sets the master seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks every setting.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first offending setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.groups == 0 {
            return Err(ConfigError::Invalid("groups must be positive".into()));
        }
        if !self.split_tolerance.is_finite() || self.split_tolerance < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "split_tolerance must be non-negative, got {}",
                self.split_tolerance
            )));
        }
        if let DistanceKind::SpatioTemporal(params) = &self.distance {
            params.validate()?;
        }
        self.strategy.validate()?;
        Ok(())
    }
}
