//! Construction and improvement of route plans over a [`RoutingModel`].
//!
//! A search runs in two phases. A first-solution heuristic builds a feasible
//! plan, falling back to the other heuristic and then to ejection repair when
//! stops are left unplaced. A local-search metaheuristic then improves it
//! until the deadline, cancellation or stagnation stops it. The best feasible
//! plan by true travel time is returned.

mod construction;
mod guided;
mod neighbourhood;
mod repair;

use std::time::{Duration, Instant};

use convoy_core::CancellationToken;

use crate::model::RoutingModel;

/// Default wall-clock budget for one search.
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(30);

/// Default penalty rounds without a new best before the search stops.
pub const DEFAULT_STAGNATION_LIMIT: u64 = 5_000;

/// Default scale factor for the guided local search penalty weight.
pub const DEFAULT_LAMBDA_COEFFICIENT: f64 = 0.1;

/// Heuristic used to build the initial plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FirstSolutionStrategy {
    /// Extend each vehicle's route with the cheapest feasible next arc.
    #[default]
    PathCheapestArc,
    /// Repeatedly insert the stop whose cheapest feasible insertion costs least.
    CheapestInsertion,
}

impl FirstSolutionStrategy {
    fn construct(self, model: &RoutingModel) -> construction::Construction {
        match self {
            Self::PathCheapestArc => construction::path_cheapest_arc(model),
            Self::CheapestInsertion => construction::cheapest_insertion(model),
        }
    }

    const fn other(self) -> Self {
        match self {
            Self::PathCheapestArc => Self::CheapestInsertion,
            Self::CheapestInsertion => Self::PathCheapestArc,
        }
    }
}

/// Strategy used to improve the initial plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocalSearchMetaheuristic {
    /// Penalise arcs of local minima to escape them.
    #[default]
    GuidedLocalSearch,
    /// Stop at the first local minimum.
    GreedyDescent,
}

/// Tuning for a [`SearchEngine`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchParameters {
    /// Initial plan heuristic.
    pub first_solution: FirstSolutionStrategy,
    /// Improvement strategy.
    pub metaheuristic: LocalSearchMetaheuristic,
    /// Wall-clock budget for the whole search.
    pub time_limit: Duration,
    /// Penalty weight as a fraction of the average arc cost of the first
    /// local minimum.
    pub lambda_coefficient: f64,
    /// Penalty rounds without a new best before the search gives up.
    pub stagnation_limit: u64,
}

impl Default for SearchParameters {
    fn default() -> Self {
        Self {
            first_solution: FirstSolutionStrategy::default(),
            metaheuristic: LocalSearchMetaheuristic::default(),
            time_limit: DEFAULT_TIME_LIMIT,
            lambda_coefficient: DEFAULT_LAMBDA_COEFFICIENT,
            stagnation_limit: DEFAULT_STAGNATION_LIMIT,
        }
    }
}

/// Complete routes for every vehicle.
///
/// Each route is a node sequence from the vehicle's start to its end with
/// only stop nodes in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    routes: Vec<Vec<usize>>,
    cost: u64,
    iterations: u64,
}

impl Assignment {
    fn from_plan(model: &RoutingModel, plan: &Plan, iterations: u64) -> Self {
        let nodes = model.nodes();
        let routes = plan
            .routes
            .iter()
            .enumerate()
            .map(|(vehicle, stops)| {
                let mut route = Vec::with_capacity(stops.len() + 2);
                route.push(nodes.start(vehicle));
                route.extend_from_slice(stops);
                route.push(nodes.end(vehicle));
                route
            })
            .collect();
        Self {
            routes,
            cost: plan.cost(model),
            iterations,
        }
    }

    /// Node sequence of `vehicle`, start and end included.
    #[must_use]
    pub fn route(&self, vehicle: usize) -> Option<&[usize]> {
        self.routes.get(vehicle).map(Vec::as_slice)
    }

    /// Node sequences for every vehicle in index order.
    pub fn routes(&self) -> impl Iterator<Item = &[usize]> {
        self.routes.iter().map(Vec::as_slice)
    }

    /// Total travel time of all routes.
    #[must_use]
    pub const fn cost(&self) -> u64 {
        self.cost
    }

    /// Improving moves applied during the search.
    #[must_use]
    pub const fn iterations(&self) -> u64 {
        self.iterations
    }
}

/// Result of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A feasible assignment covering every stop.
    Solved(Assignment),
    /// No feasible assignment was found.
    Infeasible,
}

/// Runs construction and improvement over one model.
///
/// # Examples
/// ```
/// use convoy_core::{CancellationToken, TimeMatrix};
/// use convoy_solver_gls::{
///     NodeSpace, RoutingModelBuilder, SearchEngine, SearchOutcome, SearchParameters,
/// };
/// use std::time::Duration;
///
/// let matrix = TimeMatrix::from_rows(vec![
///     vec![0, 5, 9, 0],
///     vec![5, 0, 4, 5],
///     vec![9, 4, 0, 9],
///     vec![0, 5, 9, 0],
/// ])?;
/// let model = RoutingModelBuilder::new(NodeSpace::new(1, 2), matrix).build()?;
/// let parameters = SearchParameters {
///     time_limit: Duration::from_millis(200),
///     ..SearchParameters::default()
/// };
/// let SearchOutcome::Solved(assignment) =
///     SearchEngine::new(&model, parameters).solve(&CancellationToken::new())
/// else {
///     panic!("expected a solution");
/// };
/// assert_eq!(assignment.cost(), 18);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SearchEngine<'m> {
    model: &'m RoutingModel,
    parameters: SearchParameters,
}

impl<'m> SearchEngine<'m> {
    /// Prepare a search over `model`.
    #[must_use]
    pub const fn new(model: &'m RoutingModel, parameters: SearchParameters) -> Self {
        Self { model, parameters }
    }

    /// Build a complete plan with the configured heuristic.
    ///
    /// If that strands stops, the other heuristic is tried. If both strand
    /// stops, the construction with fewer leftovers is repaired by ejection
    /// within the search budget.
    fn initial_plan(&self, budget: &Budget<'_>) -> Option<Plan> {
        let configured = self.parameters.first_solution;
        let primary = configured.construct(self.model);
        if primary.unplaced.is_empty() {
            return Some(primary.plan);
        }
        let fallback = configured.other();
        log::debug!(
            "{configured:?} left {} stops unplaced; trying {fallback:?}",
            primary.unplaced.len()
        );
        let secondary = fallback.construct(self.model);
        if secondary.unplaced.is_empty() {
            return Some(secondary.plan);
        }
        let partial = if secondary.unplaced.len() < primary.unplaced.len() {
            secondary
        } else {
            primary
        };
        log::debug!("repairing {} unplaced stops", partial.unplaced.len());
        repair::repair(self.model, partial, budget)
    }

    /// Search until the deadline, cancellation or stagnation.
    #[must_use]
    pub fn solve(&self, cancellation: &CancellationToken) -> SearchOutcome {
        let budget = Budget::new(self.parameters.time_limit, cancellation);
        if let Err(reason) = construction::precheck(self.model) {
            log::debug!("search skipped: {reason}");
            return SearchOutcome::Infeasible;
        }

        let Some(initial) = self.initial_plan(&budget) else {
            log::debug!("no construction or repair placed every stop");
            return SearchOutcome::Infeasible;
        };
        log::debug!("initial plan costs {}s", initial.cost(self.model));

        let improved = match self.parameters.metaheuristic {
            LocalSearchMetaheuristic::GuidedLocalSearch => {
                guided::GuidedLocalSearch::new(self.model, &self.parameters).run(initial, &budget)
            }
            LocalSearchMetaheuristic::GreedyDescent => guided::descend_once(self.model, initial, &budget),
        };
        log::debug!(
            "search finished after {} moves with cost {}s",
            improved.iterations,
            improved.plan.cost(self.model)
        );
        SearchOutcome::Solved(Assignment::from_plan(
            self.model,
            &improved.plan,
            improved.iterations,
        ))
    }
}

/// Stop nodes per vehicle, depots excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Plan {
    pub(crate) routes: Vec<Vec<usize>>,
}

impl Plan {
    pub(crate) fn empty(vehicles: usize) -> Self {
        Self {
            routes: vec![Vec::new(); vehicles],
        }
    }

    pub(crate) fn route(&self, vehicle: usize) -> &[usize] {
        self.routes.get(vehicle).map_or(&[], Vec::as_slice)
    }

    pub(crate) fn cost(&self, model: &RoutingModel) -> u64 {
        self.routes
            .iter()
            .enumerate()
            .map(|(vehicle, stops)| model.route_cost(vehicle, stops))
            .fold(0_u64, u64::saturating_add)
    }
}

/// Improved plan together with the number of applied moves.
#[derive(Debug, Clone)]
pub(crate) struct Improved {
    pub(crate) plan: Plan,
    pub(crate) iterations: u64,
}

/// Deadline and cancellation shared by every phase of one search.
#[derive(Debug)]
pub(crate) struct Budget<'c> {
    deadline: Option<Instant>,
    cancellation: &'c CancellationToken,
}

impl<'c> Budget<'c> {
    pub(crate) fn new(time_limit: Duration, cancellation: &'c CancellationToken) -> Self {
        Self {
            deadline: Instant::now().checked_add(time_limit),
            cancellation,
        }
    }

    pub(crate) fn exhausted(&self) -> bool {
        self.cancellation.is_cancelled()
            || self
                .deadline
                .is_some_and(|deadline| Instant::now() >= deadline)
    }
}
