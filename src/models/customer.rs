//! Customer and time window types.

use serde::{Deserialize, Serialize};

/// The interval in which service at a node may start.
///
/// # Examples
///
/// ```
/// use u_partition::models::TimeWindow;
///
/// let tw = TimeWindow::new(100.0, 200.0).unwrap();
/// assert_eq!(tw.width(), 100.0);
/// assert_eq!(tw.midpoint(), 150.0);
/// assert!(tw.contains(150.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeWindow {
    ready: f64,
    due: f64,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// Returns `None` if `ready > due` or either value is non-finite.
    pub fn new(ready: f64, due: f64) -> Option<Self> {
        if !ready.is_finite() || !due.is_finite() || ready > due {
            return None;
        }
        Some(Self { ready, due })
    }

    /// Earliest start of service.
    pub fn ready(&self) -> f64 {
        self.ready
    }

    /// Latest start of service.
    pub fn due(&self) -> f64 {
        self.due
    }

    /// `due - ready`.
    pub fn width(&self) -> f64 {
        self.due - self.ready
    }

    /// Center of the window, used as the time coordinate of the 3-D embedding.
    pub fn midpoint(&self) -> f64 {
        (self.ready + self.due) / 2.0
    }

    /// Returns `true` if the given time falls within this window.
    pub fn contains(&self, time: f64) -> bool {
        time >= self.ready && time <= self.due
    }

    /// The window shifted by `offset`.
    pub fn shifted(&self, offset: f64) -> Self {
        Self {
            ready: self.ready + offset,
            due: self.due + offset,
        }
    }
}

/// A customer (or the depot) of a VRPTW instance.
///
/// Index 0 of a [`NodeTable`](super::NodeTable) is always the depot. The `id`
/// is the identifier carried by the instance file and survives re-indexing
/// into sub-instances.
///
/// # Examples
///
/// ```
/// use u_partition::models::{Customer, TimeWindow};
///
/// let depot = Customer::depot(35.0, 35.0);
/// assert_eq!(depot.id(), 0);
/// assert_eq!(depot.demand(), 0);
///
/// let c = Customer::new(1, 41.0, 49.0, 10, 10.0)
///     .with_time_window(TimeWindow::new(161.0, 171.0).unwrap());
/// assert_eq!(c.time_window().midpoint(), 166.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    id: usize,
    x: f64,
    y: f64,
    demand: i32,
    service_duration: f64,
    time_window: TimeWindow,
}

impl Customer {
    /// Creates a new customer with an empty `[0, 0]` time window.
    pub fn new(id: usize, x: f64, y: f64, demand: i32, service_duration: f64) -> Self {
        Self {
            id,
            x,
            y,
            demand,
            service_duration,
            time_window: TimeWindow::default(),
        }
    }

    /// Creates a depot at the given coordinates (id=0, demand=0).
    pub fn depot(x: f64, y: f64) -> Self {
        Self::new(0, x, y, 0, 0.0)
    }

    /// Sets the time window for this customer.
    pub fn with_time_window(mut self, tw: TimeWindow) -> Self {
        self.time_window = tw;
        self
    }

    /// Identifier from the instance (0 = depot).
    pub fn id(&self) -> usize {
        self.id
    }

    /// X-coordinate.
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Y-coordinate.
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Demand at this customer.
    pub fn demand(&self) -> i32 {
        self.demand
    }

    /// Service duration at this customer.
    pub fn service_duration(&self) -> f64 {
        self.service_duration
    }

    /// Time window of this customer.
    pub fn time_window(&self) -> &TimeWindow {
        &self.time_window
    }

    /// Euclidean distance to another customer on (x, y).
    pub fn distance_to(&self, other: &Customer) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// The point (x, y, time-window midpoint).
    pub fn embedding(&self) -> [f64; 3] {
        [self.x, self.y, self.time_window.midpoint()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_window_invalid() {
        assert!(TimeWindow::new(20.0, 10.0).is_none());
        assert!(TimeWindow::new(f64::NAN, 10.0).is_none());
        assert!(TimeWindow::new(10.0, f64::INFINITY).is_none());
    }

    #[test]
    fn test_time_window_shape() {
        let tw = TimeWindow::new(10.0, 30.0).expect("valid");
        assert_eq!(tw.width(), 20.0);
        assert_eq!(tw.midpoint(), 20.0);
        let moved = tw.shifted(5.0);
        assert_eq!(moved.ready(), 15.0);
        assert_eq!(moved.due(), 35.0);
        assert_eq!(moved.width(), tw.width());
    }

    #[test]
    fn test_time_window_contains() {
        let tw = TimeWindow::new(10.0, 20.0).expect("valid");
        assert!(tw.contains(10.0));
        assert!(tw.contains(20.0));
        assert!(!tw.contains(9.9));
        assert!(!tw.contains(20.1));
    }

    #[test]
    fn test_customer_depot() {
        let d = Customer::depot(35.0, 35.0);
        assert_eq!(d.id(), 0);
        assert_eq!(d.demand(), 0);
        assert_eq!(d.service_duration(), 0.0);
        assert_eq!(d.time_window().width(), 0.0);
    }

    #[test]
    fn test_customer_embedding() {
        let tw = TimeWindow::new(100.0, 200.0).expect("valid");
        let c = Customer::new(1, 10.0, 20.0, 5, 3.0).with_time_window(tw);
        assert_eq!(c.embedding(), [10.0, 20.0, 150.0]);
    }

    #[test]
    fn test_customer_distance() {
        let a = Customer::new(0, 0.0, 0.0, 0, 0.0);
        let b = Customer::new(1, 3.0, 4.0, 0, 0.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-10);
        assert!((a.distance_to(&b) - b.distance_to(&a)).abs() < 1e-10);
    }
}
