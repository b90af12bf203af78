//! Vehicles, stops and the time windows that constrain visits.
//!
//! All values are immutable for the duration of one solve. Quantities are
//! unsigned so negative capacities or demands cannot be represented; JSON
//! payloads carrying negative numbers fail to deserialise.

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Location;

/// Capacity assigned to a vehicle when the request omits one.
pub const DEFAULT_VEHICLE_CAPACITY: u32 = 50;

/// Demand assigned to a stop when the request omits one.
pub const DEFAULT_STOP_DEMAND: u32 = 1;

#[cfg(feature = "serde")]
const fn default_capacity() -> u32 {
    DEFAULT_VEHICLE_CAPACITY
}

#[cfg(feature = "serde")]
const fn default_demand() -> u32 {
    DEFAULT_STOP_DEMAND
}

/// A vehicle with a start depot, an optional end depot and a load capacity.
///
/// # Examples
/// ```
/// use convoy_core::{Location, Vehicle};
///
/// let depot = Location::new(0.0, 0.0);
/// let van = Vehicle::new("van-1", depot).with_capacity(12);
/// assert_eq!(van.end_location(), depot);
/// assert_eq!(van.capacity, 12);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vehicle {
    /// Caller-supplied identifier.
    pub id: String,
    /// Where the vehicle departs from.
    pub start: Location,
    /// Where the vehicle must finish; `None` means a round trip.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub end: Option<Location>,
    /// Maximum load in demand units.
    #[cfg_attr(feature = "serde", serde(default = "default_capacity"))]
    pub capacity: u32,
}

impl Vehicle {
    /// Construct a round-trip vehicle with the default capacity.
    pub fn new(id: impl Into<String>, start: Location) -> Self {
        Self {
            id: id.into(),
            start,
            end: None,
            capacity: DEFAULT_VEHICLE_CAPACITY,
        }
    }

    /// Set an explicit end depot.
    #[must_use]
    pub const fn with_end(mut self, end: Location) -> Self {
        self.end = Some(end);
        self
    }

    /// Set the load capacity.
    #[must_use]
    pub const fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    /// The depot the vehicle finishes at, falling back to its start.
    #[must_use]
    pub fn end_location(&self) -> Location {
        self.end.unwrap_or(self.start)
    }
}

/// A delivery or pickup point with a demand and an optional visit window.
///
/// `ready_ts` and `due_ts` are whole seconds measured from the common
/// departure time of the fleet. A window only applies when both are set.
///
/// # Examples
/// ```
/// use convoy_core::{Location, Stop, TimeWindow};
///
/// let stop = Stop::new("drop-7", Location::new(0.0, 0.01))
///     .with_demand(3)
///     .with_window(600, 1_800);
/// assert_eq!(stop.time_window(), TimeWindow::new(600, 1_800).ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Stop {
    /// Caller-supplied identifier, echoed back in solutions.
    pub id: String,
    /// Position of the stop.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub location: Location,
    /// Units of capacity consumed when the stop is visited.
    #[cfg_attr(feature = "serde", serde(default = "default_demand"))]
    pub demand: u32,
    /// Earliest service time in seconds.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub ready_ts: Option<u64>,
    /// Latest service time in seconds.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub due_ts: Option<u64>,
}

impl Stop {
    /// Construct a stop with the default demand and no window.
    pub fn new(id: impl Into<String>, location: Location) -> Self {
        Self {
            id: id.into(),
            location,
            demand: DEFAULT_STOP_DEMAND,
            ready_ts: None,
            due_ts: None,
        }
    }

    /// Set the demand.
    #[must_use]
    pub const fn with_demand(mut self, demand: u32) -> Self {
        self.demand = demand;
        self
    }

    /// Set both ends of the visit window.
    #[must_use]
    pub const fn with_window(mut self, ready_ts: u64, due_ts: u64) -> Self {
        self.ready_ts = Some(ready_ts);
        self.due_ts = Some(due_ts);
        self
    }

    /// The visit window, when both timestamps are present and ordered.
    #[must_use]
    pub fn time_window(&self) -> Option<TimeWindow> {
        match (self.ready_ts, self.due_ts) {
            (Some(ready), Some(due)) => TimeWindow::new(ready, due).ok(),
            _ => None,
        }
    }
}

/// Errors returned by [`TimeWindow::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("time window closes at {due}s before it opens at {ready}s")]
pub struct TimeWindowError {
    /// Requested opening time.
    pub ready: u64,
    /// Requested closing time.
    pub due: u64,
}

/// An inclusive `[ready, due]` interval in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeWindow {
    ready: u64,
    due: u64,
}

impl TimeWindow {
    /// Validate and construct a window.
    ///
    /// # Errors
    ///
    /// Returns [`TimeWindowError`] when `due < ready`.
    pub const fn new(ready: u64, due: u64) -> Result<Self, TimeWindowError> {
        if due < ready {
            return Err(TimeWindowError { ready, due });
        }
        Ok(Self { ready, due })
    }

    /// Opening time.
    #[must_use]
    pub const fn ready(&self) -> u64 {
        self.ready
    }

    /// Closing time.
    #[must_use]
    pub const fn due(&self) -> u64 {
        self.due
    }

    /// Whether `time` falls inside the window.
    #[must_use]
    pub const fn contains(&self, time: u64) -> bool {
        self.ready <= time && time <= self.due
    }

    /// Restrict the window to `[0, horizon]`.
    ///
    /// Returns `None` when the window opens after the horizon.
    #[must_use]
    pub fn clamp_to(&self, horizon: u64) -> Option<Self> {
        if self.ready > horizon {
            return None;
        }
        Some(Self {
            ready: self.ready,
            due: self.due.min(horizon),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn vehicle_defaults_to_round_trip() {
        let start = Location::new(1.0, 2.0);
        let vehicle = Vehicle::new("v", start);
        assert_eq!(vehicle.end_location(), start);
        assert_eq!(vehicle.capacity, DEFAULT_VEHICLE_CAPACITY);
    }

    #[rstest]
    fn vehicle_end_overrides_start() {
        let end = Location::new(3.0, 4.0);
        let vehicle = Vehicle::new("v", Location::new(1.0, 2.0)).with_end(end);
        assert_eq!(vehicle.end_location(), end);
    }

    #[rstest]
    #[case(Some(10), None)]
    #[case(None, Some(10))]
    #[case(None, None)]
    fn partial_timestamps_give_no_window(#[case] ready: Option<u64>, #[case] due: Option<u64>) {
        let mut stop = Stop::new("s", Location::new(0.0, 0.0));
        stop.ready_ts = ready;
        stop.due_ts = due;
        assert_eq!(stop.time_window(), None);
    }

    #[rstest]
    fn window_rejects_inverted_bounds() {
        let err = TimeWindow::new(20, 10).expect_err("inverted window");
        assert_eq!(err, TimeWindowError { ready: 20, due: 10 });
    }

    #[rstest]
    #[case(0, true)]
    #[case(5, true)]
    #[case(10, true)]
    #[case(11, false)]
    fn window_contains_is_inclusive(#[case] time: u64, #[case] inside: bool) {
        let window = TimeWindow::new(0, 10).expect("valid window");
        assert_eq!(window.contains(time), inside);
    }

    #[rstest]
    fn clamp_trims_due_and_drops_late_windows() {
        let window = TimeWindow::new(100, 200_000).expect("valid window");
        let clamped = window.clamp_to(86_400).expect("opens before horizon");
        assert_eq!(clamped.due(), 86_400);

        let late = TimeWindow::new(90_000, 90_100).expect("valid window");
        assert_eq!(late.clamp_to(86_400), None);
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn stop_json_applies_defaults() {
        let stop: Stop =
            serde_json::from_str(r#"{"id": "s1", "lat": 1.5, "lon": 2.5}"#).expect("decode stop");
        assert_eq!(stop.demand, DEFAULT_STOP_DEMAND);
        assert_eq!(stop.location, Location::new(1.5, 2.5));
        assert_eq!(stop.ready_ts, None);
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn vehicle_json_rejects_negative_capacity() {
        let result: Result<Vehicle, _> = serde_json::from_str(
            r#"{"id": "v1", "start": {"lat": 0.0, "lon": 0.0}, "capacity": -1}"#,
        );
        assert!(result.is_err());
    }
}
