//! Cumulative quantities tracked along each route.
//!
//! The time dimension starts at zero at every vehicle start, grows by the arc
//! travel time on each transition and may absorb waiting up to `max_slack`
//! seconds so a vehicle that arrives early can hold until a window opens.
//! The capacity dimension starts at zero and grows by each visited stop's
//! demand. Both are bounded at every node.

use convoy_core::TimeWindow;
use thiserror::Error;

/// Planning horizon used when none is configured: one day in seconds.
pub const DEFAULT_HORIZON_SECS: u64 = 86_400;

/// Bounds for the time dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeDimensionConfig {
    /// Upper bound on the cumulative time at every node.
    pub horizon: u64,
    /// Longest wait allowed at a single stop.
    pub max_slack: u64,
}

impl Default for TimeDimensionConfig {
    fn default() -> Self {
        Self {
            horizon: DEFAULT_HORIZON_SECS,
            max_slack: DEFAULT_HORIZON_SECS,
        }
    }
}

/// Reason a route breaks a dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Violation {
    /// The load after visiting `node` exceeds the vehicle's capacity.
    #[error("load {load} exceeds capacity {capacity} at node {node}")]
    Capacity {
        /// Node at which the capacity was exceeded.
        node: usize,
        /// Cumulative load at that node.
        load: u64,
        /// Vehicle capacity.
        capacity: u64,
    },
    /// Service at `node` would start after its window closes.
    #[error("service at node {node} would start at {time}s, after the window closes")]
    TimeWindow {
        /// Node whose window was missed.
        node: usize,
        /// Earliest possible service start.
        time: u64,
    },
    /// Holding at `node` until its window opens needs more than the allowed slack.
    #[error("waiting {wait}s at node {node} exceeds the allowed slack")]
    Slack {
        /// Node at which the vehicle would wait.
        node: usize,
        /// Required wait in seconds.
        wait: u64,
    },
    /// The vehicle reaches its end depot after the horizon.
    #[error("vehicle reaches its end at {time}s, past the horizon")]
    Horizon {
        /// Arrival time at the end depot.
        time: u64,
    },
}

/// Per-stop demands and per-vehicle capacities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityDimension {
    demands: Vec<u64>,
    capacities: Vec<u64>,
}

impl CapacityDimension {
    pub(crate) const fn new(demands: Vec<u64>, capacities: Vec<u64>) -> Self {
        Self {
            demands,
            capacities,
        }
    }

    pub(crate) fn unconstrained(stops: usize, vehicles: usize) -> Self {
        Self {
            demands: vec![0; stops],
            capacities: vec![u64::MAX; vehicles],
        }
    }

    /// Demand of stop `stop`, zero when out of range.
    #[must_use]
    pub fn demand(&self, stop: usize) -> u64 {
        self.demands.get(stop).copied().unwrap_or(0)
    }

    /// Capacity of `vehicle`, zero when out of range.
    #[must_use]
    pub fn capacity(&self, vehicle: usize) -> u64 {
        self.capacities.get(vehicle).copied().unwrap_or(0)
    }

    /// Largest capacity in the fleet.
    #[must_use]
    pub fn max_capacity(&self) -> u64 {
        self.capacities.iter().copied().max().unwrap_or(0)
    }
}

/// Horizon, slack and the per-stop windows.
///
/// A stop maps to `None` when its window opens after the horizon and it can
/// therefore never be served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeDimension {
    config: TimeDimensionConfig,
    windows: Vec<Option<TimeWindow>>,
}

impl TimeDimension {
    pub(crate) fn new(config: TimeDimensionConfig, stops: usize) -> Self {
        let open = TimeWindow::new(0, config.horizon).ok();
        Self {
            config,
            windows: vec![open; stops],
        }
    }

    pub(crate) fn restrict(&mut self, stop: usize, window: TimeWindow) {
        if let Some(slot) = self.windows.get_mut(stop) {
            *slot = window.clamp_to(self.config.horizon);
        }
    }

    /// The configured bounds.
    #[must_use]
    pub const fn config(&self) -> TimeDimensionConfig {
        self.config
    }

    /// Effective window of stop `stop`.
    #[must_use]
    pub fn window(&self, stop: usize) -> Option<TimeWindow> {
        self.windows.get(stop).copied().flatten()
    }

    /// Earliest service start at a stop reached at `arrival`.
    ///
    /// # Errors
    ///
    /// Returns the [`Violation`] that makes the visit impossible.
    pub fn service_start(&self, node: usize, stop: usize, arrival: u64) -> Result<u64, Violation> {
        let Some(window) = self.window(stop) else {
            return Err(Violation::TimeWindow {
                node,
                time: arrival,
            });
        };
        let start = arrival.max(window.ready());
        let wait = start.saturating_sub(arrival);
        if wait > self.config.max_slack {
            return Err(Violation::Slack { node, wait });
        }
        if start > window.due() {
            return Err(Violation::TimeWindow { node, time: start });
        }
        Ok(start)
    }
}
