//! Node indexing, arc costs and registered dimensions for one solve.
//!
//! Nodes are laid out as `[vehicle starts] ++ [stops] ++ [vehicle ends]`.
//! Vehicle `v` starts at node `v` and ends at node `V + S + v`, so a node
//! index alone says whether it is a depot or a stop.

use std::ops::Range;

use convoy_core::{TimeMatrix, TimeWindow};
use thiserror::Error;

use crate::dimension::{CapacityDimension, TimeDimension, TimeDimensionConfig, Violation};

/// Index arithmetic over the nodes of one solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeSpace {
    vehicles: usize,
    stops: usize,
}

impl NodeSpace {
    /// Lay out nodes for `vehicles` vehicles and `stops` stops.
    #[must_use]
    pub const fn new(vehicles: usize, stops: usize) -> Self {
        Self { vehicles, stops }
    }

    /// Number of vehicles.
    #[must_use]
    pub const fn vehicle_count(&self) -> usize {
        self.vehicles
    }

    /// Number of stops.
    #[must_use]
    pub const fn stop_count(&self) -> usize {
        self.stops
    }

    /// Total node count, `2V + S`.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.vehicles * 2 + self.stops
    }

    /// Whether the space holds no nodes at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Start node of `vehicle`.
    #[must_use]
    pub const fn start(&self, vehicle: usize) -> usize {
        vehicle
    }

    /// End node of `vehicle`.
    #[must_use]
    pub const fn end(&self, vehicle: usize) -> usize {
        self.vehicles + self.stops + vehicle
    }

    /// Node of stop `stop`.
    #[must_use]
    pub const fn stop_node(&self, stop: usize) -> usize {
        self.vehicles + stop
    }

    /// Node range covering all stops.
    #[must_use]
    pub const fn stop_nodes(&self) -> Range<usize> {
        self.vehicles..self.vehicles + self.stops
    }

    /// Stop index of `node`, or `None` for depots and out-of-range nodes.
    #[must_use]
    pub const fn stop_of(&self, node: usize) -> Option<usize> {
        if node >= self.vehicles && node < self.vehicles + self.stops {
            Some(node - self.vehicles)
        } else {
            None
        }
    }
}

/// Errors raised while wiring a [`RoutingModel`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The matrix does not cover every node.
    #[error("matrix covers {actual} nodes but the model needs {expected}")]
    MatrixSize {
        /// `2V + S`.
        expected: usize,
        /// Matrix size supplied.
        actual: usize,
    },
    /// A dimension vector has the wrong length.
    #[error("{dimension} has {actual} entries, expected {expected}")]
    DimensionLength {
        /// Which vector was wrong.
        dimension: &'static str,
        /// Required length.
        expected: usize,
        /// Supplied length.
        actual: usize,
    },
    /// A time window names a stop that does not exist.
    #[error("time window given for stop {stop} but only {stops} stops exist")]
    StopOutOfRange {
        /// Offending stop index.
        stop: usize,
        /// Number of stops.
        stops: usize,
    },
}

/// Registers dimensions and windows before producing a [`RoutingModel`].
///
/// # Examples
/// ```
/// use convoy_core::{TimeMatrix, TimeWindow};
/// use convoy_solver_gls::{NodeSpace, RoutingModelBuilder, TimeDimensionConfig};
///
/// // One vehicle, one stop: nodes are [start, stop, end].
/// let matrix = TimeMatrix::from_rows(vec![
///     vec![0, 10, 0],
///     vec![10, 0, 10],
///     vec![0, 10, 0],
/// ])?;
/// let model = RoutingModelBuilder::new(NodeSpace::new(1, 1), matrix)
///     .with_capacity_dimension(vec![1], vec![5])
///     .with_time_dimension(TimeDimensionConfig::default())
///     .with_time_window(0, TimeWindow::new(30, 60)?)
///     .build()?;
/// let schedule = model.schedule(0, &[1])?;
/// assert_eq!(schedule.service_times, vec![30]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct RoutingModelBuilder {
    nodes: NodeSpace,
    matrix: TimeMatrix,
    capacity: Option<(Vec<u64>, Vec<u64>)>,
    time: TimeDimensionConfig,
    windows: Vec<(usize, TimeWindow)>,
}

impl RoutingModelBuilder {
    /// Start a model over `nodes` with arc costs taken from `matrix`.
    #[must_use]
    pub fn new(nodes: NodeSpace, matrix: TimeMatrix) -> Self {
        Self {
            nodes,
            matrix,
            capacity: None,
            time: TimeDimensionConfig::default(),
            windows: Vec::new(),
        }
    }

    /// Register per-stop demands and per-vehicle capacities.
    #[must_use]
    pub fn with_capacity_dimension(mut self, demands: Vec<u64>, capacities: Vec<u64>) -> Self {
        self.capacity = Some((demands, capacities));
        self
    }

    /// Set the horizon and slack of the time dimension.
    #[must_use]
    pub const fn with_time_dimension(mut self, config: TimeDimensionConfig) -> Self {
        self.time = config;
        self
    }

    /// Restrict the service start at stop `stop` to `window`.
    #[must_use]
    pub fn with_time_window(mut self, stop: usize, window: TimeWindow) -> Self {
        self.windows.push((stop, window));
        self
    }

    /// Validate the registrations and produce the model.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] when the matrix or a dimension does not match
    /// the node space.
    pub fn build(self) -> Result<RoutingModel, ModelError> {
        let Self {
            nodes,
            matrix,
            capacity,
            time,
            windows,
        } = self;
        if matrix.size() != nodes.len() {
            return Err(ModelError::MatrixSize {
                expected: nodes.len(),
                actual: matrix.size(),
            });
        }

        let capacity_dimension = match capacity {
            Some((demands, capacities)) => {
                check_length("demands", nodes.stop_count(), demands.len())?;
                check_length("capacities", nodes.vehicle_count(), capacities.len())?;
                CapacityDimension::new(demands, capacities)
            }
            None => CapacityDimension::unconstrained(nodes.stop_count(), nodes.vehicle_count()),
        };

        let mut time_dimension = TimeDimension::new(time, nodes.stop_count());
        for (stop, window) in windows {
            if stop >= nodes.stop_count() {
                return Err(ModelError::StopOutOfRange {
                    stop,
                    stops: nodes.stop_count(),
                });
            }
            time_dimension.restrict(stop, window);
        }

        Ok(RoutingModel {
            nodes,
            matrix,
            capacity: capacity_dimension,
            time: time_dimension,
        })
    }
}

const fn check_length(
    dimension: &'static str,
    expected: usize,
    actual: usize,
) -> Result<(), ModelError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ModelError::DimensionLength {
            dimension,
            expected,
            actual,
        })
    }
}

/// Cumulative values along one feasible route.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schedule {
    /// Service start at each visited stop, in visiting order.
    pub service_times: Vec<u64>,
    /// Arrival time at the end depot.
    pub end_time: u64,
    /// Total load carried.
    pub load: u64,
    /// Sum of arc travel times from start to end.
    pub travel_time: u64,
}

/// An immutable routing problem ready for search.
#[derive(Debug, Clone)]
pub struct RoutingModel {
    nodes: NodeSpace,
    matrix: TimeMatrix,
    capacity: CapacityDimension,
    time: TimeDimension,
}

impl RoutingModel {
    /// Node layout.
    #[must_use]
    pub const fn nodes(&self) -> &NodeSpace {
        &self.nodes
    }

    /// The capacity dimension.
    #[must_use]
    pub const fn capacity(&self) -> &CapacityDimension {
        &self.capacity
    }

    /// The time dimension.
    #[must_use]
    pub const fn time(&self) -> &TimeDimension {
        &self.time
    }

    /// Travel time from `from` to `to`. Unknown nodes cost `u64::MAX`.
    #[must_use]
    pub fn arc_cost(&self, from: usize, to: usize) -> u64 {
        self.matrix.get(from, to).unwrap_or(u64::MAX)
    }

    /// Sum of `arc` over the route `start(vehicle) -> stops -> end(vehicle)`.
    pub fn route_cost_with<F>(&self, vehicle: usize, stops: &[usize], arc: F) -> u64
    where
        F: Fn(usize, usize) -> u64,
    {
        let mut previous = self.nodes.start(vehicle);
        let mut total = 0_u64;
        for &node in stops {
            total = total.saturating_add(arc(previous, node));
            previous = node;
        }
        total.saturating_add(arc(previous, self.nodes.end(vehicle)))
    }

    /// Travel time of the route `start(vehicle) -> stops -> end(vehicle)`.
    #[must_use]
    pub fn route_cost(&self, vehicle: usize, stops: &[usize]) -> u64 {
        self.route_cost_with(vehicle, stops, |from, to| self.arc_cost(from, to))
    }

    /// Propagate both dimensions along a route of stop nodes.
    ///
    /// # Errors
    ///
    /// Returns the first [`Violation`] met along the route.
    pub fn schedule(&self, vehicle: usize, stops: &[usize]) -> Result<Schedule, Violation> {
        let capacity = self.capacity.capacity(vehicle);
        let mut schedule = Schedule {
            service_times: Vec::with_capacity(stops.len()),
            ..Schedule::default()
        };
        let mut previous = self.nodes.start(vehicle);
        let mut clock = 0_u64;
        for &node in stops {
            let leg = self.arc_cost(previous, node);
            let stop = self.nodes.stop_of(node).ok_or(Violation::TimeWindow {
                node,
                time: clock,
            })?;
            clock = self
                .time
                .service_start(node, stop, clock.saturating_add(leg))?;
            schedule.load = schedule.load.saturating_add(self.capacity.demand(stop));
            if schedule.load > capacity {
                return Err(Violation::Capacity {
                    node,
                    load: schedule.load,
                    capacity,
                });
            }
            schedule.travel_time = schedule.travel_time.saturating_add(leg);
            schedule.service_times.push(clock);
            previous = node;
        }
        let last_leg = self.arc_cost(previous, self.nodes.end(vehicle));
        schedule.travel_time = schedule.travel_time.saturating_add(last_leg);
        schedule.end_time = clock.saturating_add(last_leg);
        if schedule.end_time > self.time.config().horizon {
            return Err(Violation::Horizon {
                time: schedule.end_time,
            });
        }
        Ok(schedule)
    }

    /// Whether a route of stop nodes respects every dimension.
    #[must_use]
    pub fn is_feasible(&self, vehicle: usize, stops: &[usize]) -> bool {
        self.schedule(vehicle, stops).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    /// Two vehicles, two stops; every leg takes 10 s.
    #[fixture]
    fn matrix() -> TimeMatrix {
        let size = 6;
        let rows = (0..size)
            .map(|i| (0..size).map(|j| if i == j { 0 } else { 10 }).collect())
            .collect();
        TimeMatrix::from_rows(rows).expect("square matrix")
    }

    #[rstest]
    fn node_space_anchors_vehicles() {
        let nodes = NodeSpace::new(2, 3);
        assert_eq!(nodes.len(), 7);
        assert_eq!(nodes.start(1), 1);
        assert_eq!(nodes.end(1), 6);
        assert_eq!(nodes.stop_node(0), 2);
        assert_eq!(nodes.stop_of(4), Some(2));
        assert_eq!(nodes.stop_of(5), None);
        assert_eq!(nodes.stop_of(1), None);
        assert_eq!(nodes.stop_nodes(), 2..5);
    }

    #[rstest]
    fn mismatched_matrix_is_rejected(matrix: TimeMatrix) {
        let err = RoutingModelBuilder::new(NodeSpace::new(1, 1), matrix)
            .build()
            .expect_err("matrix too large");
        assert_eq!(
            err,
            ModelError::MatrixSize {
                expected: 3,
                actual: 6
            }
        );
    }

    #[rstest]
    #[case(vec![1], vec![5, 5], "demands")]
    #[case(vec![1, 1], vec![5], "capacities")]
    fn mismatched_dimensions_are_rejected(
        matrix: TimeMatrix,
        #[case] demands: Vec<u64>,
        #[case] capacities: Vec<u64>,
        #[case] expected: &str,
    ) {
        let err = RoutingModelBuilder::new(NodeSpace::new(2, 2), matrix)
            .with_capacity_dimension(demands, capacities)
            .build()
            .expect_err("length mismatch");
        assert!(matches!(err, ModelError::DimensionLength { dimension, .. } if dimension == expected));
    }

    #[rstest]
    fn windows_must_name_existing_stops(matrix: TimeMatrix) {
        let window = TimeWindow::new(0, 10).expect("valid window");
        let err = RoutingModelBuilder::new(NodeSpace::new(2, 2), matrix)
            .with_time_window(2, window)
            .build()
            .expect_err("stop out of range");
        assert_eq!(err, ModelError::StopOutOfRange { stop: 2, stops: 2 });
    }

    #[rstest]
    fn schedule_accumulates_time_and_load(matrix: TimeMatrix) {
        let model = RoutingModelBuilder::new(NodeSpace::new(2, 2), matrix)
            .with_capacity_dimension(vec![2, 3], vec![5, 5])
            .build()
            .expect("valid model");
        let schedule = model.schedule(0, &[2, 3]).expect("feasible route");
        assert_eq!(schedule.service_times, vec![10, 20]);
        assert_eq!(schedule.end_time, 30);
        assert_eq!(schedule.travel_time, 30);
        assert_eq!(schedule.load, 5);
        assert_eq!(model.route_cost(0, &[2, 3]), 30);
    }

    #[rstest]
    fn capacity_is_enforced_per_vehicle(matrix: TimeMatrix) {
        let model = RoutingModelBuilder::new(NodeSpace::new(2, 2), matrix)
            .with_capacity_dimension(vec![2, 3], vec![5, 4])
            .build()
            .expect("valid model");
        assert!(model.is_feasible(0, &[2, 3]));
        assert_eq!(
            model.schedule(1, &[2, 3]),
            Err(Violation::Capacity {
                node: 3,
                load: 5,
                capacity: 4
            })
        );
    }

    #[rstest]
    fn missed_windows_are_violations(matrix: TimeMatrix) {
        let model = RoutingModelBuilder::new(NodeSpace::new(2, 2), matrix)
            .with_time_window(1, TimeWindow::new(0, 15).expect("valid window"))
            .build()
            .expect("valid model");
        assert!(model.is_feasible(0, &[3, 2]));
        assert_eq!(
            model.schedule(0, &[2, 3]),
            Err(Violation::TimeWindow { node: 3, time: 20 })
        );
    }

    #[rstest]
    fn late_return_breaks_the_horizon(matrix: TimeMatrix) {
        let model = RoutingModelBuilder::new(NodeSpace::new(2, 2), matrix)
            .with_time_dimension(TimeDimensionConfig {
                horizon: 25,
                max_slack: 25,
            })
            .build()
            .expect("valid model");
        assert!(model.is_feasible(0, &[2]));
        assert_eq!(
            model.schedule(0, &[2, 3]),
            Err(Violation::Horizon { time: 30 })
        );
    }

    #[rstest]
    fn depots_cannot_be_visited_mid_route(matrix: TimeMatrix) {
        let model = RoutingModelBuilder::new(NodeSpace::new(2, 2), matrix)
            .build()
            .expect("valid model");
        assert!(!model.is_feasible(0, &[1]));
    }
}
