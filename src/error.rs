//! Error types for the partitioning engine.

use thiserror::Error;

/// Errors produced while building distance models or partitioning an instance.
#[derive(Debug, Error)]
pub enum PartitionError {
    /// The instance cannot be normalized or partitioned (too few customers,
    /// all-identical coordinates, ...).
    #[error("degenerate instance: {0}")]
    DegenerateInstance(String),

    /// Requested group count outside `[1, N - 2]`.
    #[error("invalid group count {groups}: must lie in [1, {max}]")]
    InvalidGroupCount {
        /// Requested number of groups.
        groups: usize,
        /// Largest admissible number of groups for the instance.
        max: usize,
    },

    /// A tuning parameter lies outside its domain.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// Two collaborators disagree on the number of nodes.
    #[error("size mismatch: expected {expected} nodes, got {actual}")]
    SizeMismatch {
        /// Node count of the distance model.
        expected: usize,
        /// Node count of the other collaborator.
        actual: usize,
    },

    /// The external routing solver reported a zero or degenerate cost for a group.
    #[error("sub-problem for group {group} could not be solved")]
    UnsolvableSubgroup {
        /// Index of the failing group in the partition.
        group: usize,
    },

    /// Malformed instance text.
    #[error("malformed instance at line {line}: {reason}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        reason: String,
    },

    /// I/O failure while reading an instance.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PartitionError>;

/// Checks that `groups` lies in `[1, nodes - 2]` for a table of `nodes` entries
/// (depot included).
pub(crate) fn check_group_count(groups: usize, nodes: usize) -> Result<()> {
    let max = nodes.saturating_sub(2);
    if groups == 0 || groups > max {
        return Err(PartitionError::InvalidGroupCount { groups, max });
    }
    Ok(())
}
