//! `GlsSolver`: the default [`Solver`] implementation.
//!
//! A solve walks a fixed sequence of phases, each logged at debug level:
//! the travel-time matrix is built, the routing model is wired, the search
//! runs, and the result is either decoded into routes or reported as
//! infeasible. Nothing is carried over between calls.

use std::fmt;
use std::time::{Duration, Instant};

use convoy_core::{
    CancellationToken, Diagnostics, SolveError, SolveRequest, SolveResponse, Solver,
    TravelTimeOracle, build_time_matrix,
};
use geo::Coord;

use crate::decode::decode;
use crate::dimension::{DEFAULT_HORIZON_SECS, TimeDimensionConfig};
use crate::model::{ModelError, NodeSpace, RoutingModel, RoutingModelBuilder};
use crate::search::{
    DEFAULT_LAMBDA_COEFFICIENT, DEFAULT_STAGNATION_LIMIT, DEFAULT_TIME_LIMIT,
    FirstSolutionStrategy, LocalSearchMetaheuristic, SearchEngine, SearchOutcome,
    SearchParameters,
};

/// Configuration for [`GlsSolver`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlsSolverConfig {
    /// Wall-clock budget for the search phase.
    pub time_limit: Duration,
    /// Upper bound on the time dimension, in seconds from departure.
    pub horizon: u64,
    /// Longest wait allowed at one stop.
    pub max_slack: u64,
    /// Initial plan heuristic.
    pub first_solution: FirstSolutionStrategy,
    /// Improvement strategy.
    pub metaheuristic: LocalSearchMetaheuristic,
    /// Guided local search penalty weight coefficient.
    pub lambda_coefficient: f64,
    /// Penalty rounds without a new best before the search stops.
    pub stagnation_limit: u64,
}

impl Default for GlsSolverConfig {
    fn default() -> Self {
        Self {
            time_limit: DEFAULT_TIME_LIMIT,
            horizon: DEFAULT_HORIZON_SECS,
            max_slack: DEFAULT_HORIZON_SECS,
            first_solution: FirstSolutionStrategy::default(),
            metaheuristic: LocalSearchMetaheuristic::default(),
            lambda_coefficient: DEFAULT_LAMBDA_COEFFICIENT,
            stagnation_limit: DEFAULT_STAGNATION_LIMIT,
        }
    }
}

impl GlsSolverConfig {
    /// Set the search time limit.
    #[must_use]
    pub const fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = time_limit;
        self
    }

    /// Set the planning horizon.
    #[must_use]
    pub const fn with_horizon(mut self, horizon: u64) -> Self {
        self.horizon = horizon;
        self
    }

    /// Set the longest wait allowed at a stop.
    #[must_use]
    pub const fn with_max_slack(mut self, max_slack: u64) -> Self {
        self.max_slack = max_slack;
        self
    }

    /// Set the initial plan heuristic.
    #[must_use]
    pub const fn with_first_solution(mut self, strategy: FirstSolutionStrategy) -> Self {
        self.first_solution = strategy;
        self
    }

    /// Set the improvement strategy.
    #[must_use]
    pub const fn with_metaheuristic(mut self, metaheuristic: LocalSearchMetaheuristic) -> Self {
        self.metaheuristic = metaheuristic;
        self
    }

    /// Set the penalty weight coefficient.
    #[must_use]
    pub const fn with_lambda_coefficient(mut self, coefficient: f64) -> Self {
        self.lambda_coefficient = coefficient;
        self
    }

    /// Set the stagnation limit.
    #[must_use]
    pub const fn with_stagnation_limit(mut self, rounds: u64) -> Self {
        self.stagnation_limit = rounds;
        self
    }

    const fn search_parameters(&self) -> SearchParameters {
        SearchParameters {
            first_solution: self.first_solution,
            metaheuristic: self.metaheuristic,
            time_limit: self.time_limit,
            lambda_coefficient: self.lambda_coefficient,
            stagnation_limit: self.stagnation_limit,
        }
    }

    const fn time_dimension(&self) -> TimeDimensionConfig {
        TimeDimensionConfig {
            horizon: self.horizon,
            max_slack: self.max_slack,
        }
    }
}

/// Phases of one solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Built,
    Modeled,
    Searching,
    Solved,
    Infeasible,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Built => "built",
            Self::Modeled => "modeled",
            Self::Searching => "searching",
            Self::Solved => "solved",
            Self::Infeasible => "infeasible",
        };
        f.write_str(name)
    }
}

fn enter(phase: Phase, started_at: Instant) {
    log::debug!("solve {phase} after {:?}", started_at.elapsed());
}

/// CVRPTW solver combining cheapest-arc construction with guided local
/// search.
///
/// The solver is generic over the travel-time oracle used to build the
/// matrix.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use convoy_core::{Location, SolveRequest, Solver, StraightLineOracle, Stop, Vehicle};
/// use convoy_solver_gls::{GlsSolver, GlsSolverConfig};
///
/// let depot = Location::new(51.5, -0.12);
/// let request = SolveRequest {
///     vehicles: vec![Vehicle::new("van", depot)],
///     stops: vec![
///         Stop::new("a", Location::new(51.51, -0.12)),
///         Stop::new("b", Location::new(51.5, -0.11)),
///     ],
/// };
/// let config = GlsSolverConfig::default().with_time_limit(Duration::from_millis(100));
/// let solver = GlsSolver::with_config(StraightLineOracle::default(), config);
/// let response = solver.solve(&request)?;
/// assert!(response.is_solved());
/// assert_eq!(response.route(0).map(<[String]>::len), Some(2));
/// # Ok::<(), convoy_core::SolveError>(())
/// ```
#[derive(Debug, Clone)]
pub struct GlsSolver<O> {
    oracle: O,
    config: GlsSolverConfig,
}

impl<O> GlsSolver<O>
where
    O: TravelTimeOracle,
{
    /// Construct a solver using default configuration.
    #[must_use]
    pub fn new(oracle: O) -> Self {
        Self::with_config(oracle, GlsSolverConfig::default())
    }

    /// Construct a solver with explicit configuration.
    #[must_use]
    pub const fn with_config(oracle: O, config: GlsSolverConfig) -> Self {
        Self { oracle, config }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &GlsSolverConfig {
        &self.config
    }

    /// The oracle used to build matrices.
    #[must_use]
    pub const fn oracle(&self) -> &O {
        &self.oracle
    }
}

impl<O> Solver for GlsSolver<O>
where
    O: TravelTimeOracle + Send + Sync,
{
    fn solve_with_cancellation(
        &self,
        request: &SolveRequest,
        cancellation: &CancellationToken,
    ) -> Result<SolveResponse, SolveError> {
        request.validate()?;
        let started_at = Instant::now();
        let nodes = NodeSpace::new(request.vehicles.len(), request.stops.len());

        let matrix = build_time_matrix(&self.oracle, &node_coordinates(request))?;
        enter(Phase::Built, started_at);

        let model = build_model(request, nodes, matrix, &self.config).map_err(|err| {
            SolveError::Model {
                message: err.to_string(),
            }
        })?;
        enter(Phase::Modeled, started_at);

        enter(Phase::Searching, started_at);
        let outcome =
            SearchEngine::new(&model, self.config.search_parameters()).solve(cancellation);

        let mut diagnostics = Diagnostics {
            solve_time: Duration::ZERO,
            matrix_nodes: nodes.len(),
            total_travel_time_s: 0,
            iterations: 0,
        };
        match outcome {
            SearchOutcome::Solved(assignment) => {
                enter(Phase::Solved, started_at);
                let routes = decode(&nodes, &request.stops, &assignment);
                diagnostics.total_travel_time_s = assignment.cost();
                diagnostics.iterations = assignment.iterations();
                diagnostics.solve_time = started_at.elapsed();
                log::info!(
                    "routed {} stops on {} vehicles in {:?}; total travel {}s",
                    request.stops.len(),
                    request.vehicles.len(),
                    diagnostics.solve_time,
                    diagnostics.total_travel_time_s
                );
                Ok(SolveResponse::solved(routes, diagnostics))
            }
            SearchOutcome::Infeasible => {
                enter(Phase::Infeasible, started_at);
                diagnostics.solve_time = started_at.elapsed();
                log::info!(
                    "no feasible routes for {} stops on {} vehicles",
                    request.stops.len(),
                    request.vehicles.len()
                );
                Ok(SolveResponse::infeasible(diagnostics))
            }
        }
    }
}

/// Coordinates in node order: starts, stops, then ends.
fn node_coordinates(request: &SolveRequest) -> Vec<Coord<f64>> {
    let starts = request.vehicles.iter().map(|vehicle| vehicle.start.to_coord());
    let stops = request.stops.iter().map(|stop| stop.location.to_coord());
    let ends = request
        .vehicles
        .iter()
        .map(|vehicle| vehicle.end_location().to_coord());
    starts.chain(stops).chain(ends).collect()
}

fn build_model(
    request: &SolveRequest,
    nodes: NodeSpace,
    matrix: convoy_core::TimeMatrix,
    config: &GlsSolverConfig,
) -> Result<RoutingModel, ModelError> {
    let demands = request
        .stops
        .iter()
        .map(|stop| u64::from(stop.demand))
        .collect();
    let capacities = request
        .vehicles
        .iter()
        .map(|vehicle| u64::from(vehicle.capacity))
        .collect();
    let builder = RoutingModelBuilder::new(nodes, matrix)
        .with_capacity_dimension(demands, capacities)
        .with_time_dimension(config.time_dimension());
    request
        .stops
        .iter()
        .enumerate()
        .filter_map(|(index, stop)| stop.time_window().map(|window| (index, window)))
        .fold(builder, |model, (index, window)| {
            model.with_time_window(index, window)
        })
        .build()
}
