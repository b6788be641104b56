//! Solomon instance reader.
//!
//! The layout is the one of the Solomon VRPTW benchmark files:
//!
//! ```text
//! C101
//!
//! VEHICLE
//! NUMBER     CAPACITY
//!   25         200
//!
//! CUSTOMER
//! CUST NO.  XCOORD.   YCOORD.    DEMAND   READY TIME  DUE DATE   SERVICE   TIME
//!
//!     0      40         50          0          0       1236          0
//!     1      45         68         10        912        967         90
//! ```
//!
//! The first line holding exactly two integers gives the fleet size and the
//! vehicle capacity. Every line with seven numbers is a node row
//! (id, x, y, demand, ready, due, service); the first row is the depot. Other
//! header lines are skipped.

use std::path::Path;

use tracing::debug;

use crate::error::{PartitionError, Result};
use crate::models::{Customer, NodeTable, TimeWindow};

/// Reads a Solomon instance from a file.
pub fn read_solomon(path: impl AsRef<Path>) -> Result<NodeTable> {
    let contents = std::fs::read_to_string(path)?;
    parse_solomon(&contents)
}

/// Parses a Solomon instance.
///
/// # Errors
///
/// [`PartitionError::Parse`] for a row with an invalid time window, a row
/// that appears before the fleet line, a malformed line between rows, or when
/// no row is found.
///
/// # Examples
///
/// ```
/// use u_partition::io::parse_solomon;
///
/// let text = "R101\n\nVEHICLE\nNUMBER CAPACITY\n 25 200\n\nCUSTOMER\n\
///             CUST NO. XCOORD. YCOORD. DEMAND READY TIME DUE DATE SERVICE TIME\n\n\
///             0 35 35 0 0 230 0\n\
///             1 41 49 10 161 171 10\n\
///             2 35 17 7 50 60 10\n";
/// let table = parse_solomon(text).unwrap();
/// assert_eq!(table.len(), 3);
/// assert_eq!(table.vehicles(), 25);
/// assert_eq!(table.capacity(), 200);
/// assert_eq!(table.node(2).demand(), 7);
/// ```
pub fn parse_solomon(text: &str) -> Result<NodeTable> {
    let mut fleet: Option<(usize, i32)> = None;
    let mut nodes: Vec<Customer> = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let number = index + 1;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }

        if fleet.is_none() {
            if let [vehicles, capacity] = tokens[..] {
                if let (Ok(v), Ok(c)) = (vehicles.parse(), capacity.parse()) {
                    fleet = Some((v, c));
                }
            }
            continue;
        }

        let values: Option<Vec<f64>> = tokens.iter().map(|t| t.parse().ok()).collect();
        match values {
            Some(values) if values.len() == 7 => nodes.push(parse_row(&values, number)?),
            _ if nodes.is_empty() => {}
            _ => {
                return Err(PartitionError::Parse {
                    line: number,
                    reason: format!("expected 7 numeric fields, got `{}`", line.trim()),
                })
            }
        }
    }

    let Some((vehicles, capacity)) = fleet else {
        return Err(PartitionError::Parse {
            line: 0,
            reason: "missing vehicle count and capacity".into(),
        });
    };
    if nodes.is_empty() {
        return Err(PartitionError::Parse {
            line: 0,
            reason: "no node rows".into(),
        });
    }
    debug!(event = "instance_loaded", nodes = nodes.len(), vehicles, capacity);
    Ok(NodeTable::with_fleet(nodes, vehicles, capacity))
}

fn parse_row(values: &[f64], line: usize) -> Result<Customer> {
    let integral = |value: f64, field: &str| -> Result<f64> {
        if value.fract() != 0.0 || value < 0.0 {
            return Err(PartitionError::Parse {
                line,
                reason: format!("{field} must be a non-negative integer, got {value}"),
            });
        }
        Ok(value)
    };
    let id = integral(values[0], "id")? as usize;
    let demand = integral(values[3], "demand")? as i32;
    let window = TimeWindow::new(values[4], values[5]).ok_or_else(|| PartitionError::Parse {
        line,
        reason: format!("invalid time window [{}, {}]", values[4], values[5]),
    })?;
    Ok(Customer::new(id, values[1], values[2], demand, values[6]).with_time_window(window))
}
