//! Guided local search over arc penalties.
//!
//! Each local minimum has the arcs of highest utility `cost / (1 + penalty)`
//! penalised. The descent then runs under the augmented arc cost
//! `cost + lambda * penalty`. The incumbent is tracked by true cost only.

use super::neighbourhood::LocalSearch;
use super::{Budget, Improved, Plan, SearchParameters};
use crate::model::RoutingModel;

/// Penalty counters for every ordered node pair.
#[derive(Debug, Clone)]
struct Penalties {
    size: usize,
    counts: Vec<u64>,
}

impl Penalties {
    fn new(size: usize) -> Self {
        Self {
            size,
            counts: vec![0; size.saturating_mul(size)],
        }
    }

    fn get(&self, from: usize, to: usize) -> u64 {
        self.counts
            .get(from * self.size + to)
            .copied()
            .unwrap_or(0)
    }

    fn increment(&mut self, from: usize, to: usize) {
        if let Some(count) = self.counts.get_mut(from * self.size + to) {
            *count = count.saturating_add(1);
        }
    }
}

/// Penalty state and incumbent for one search.
pub(crate) struct GuidedLocalSearch<'m> {
    model: &'m RoutingModel,
    lambda_coefficient: f64,
    stagnation_limit: u64,
    penalties: Penalties,
}

impl<'m> GuidedLocalSearch<'m> {
    pub(crate) fn new(model: &'m RoutingModel, parameters: &SearchParameters) -> Self {
        Self {
            model,
            lambda_coefficient: parameters.lambda_coefficient,
            stagnation_limit: parameters.stagnation_limit,
            penalties: Penalties::new(model.nodes().len()),
        }
    }

    pub(crate) fn run(mut self, initial: Plan, budget: &Budget<'_>) -> Improved {
        let model = self.model;
        let mut current = initial;
        let first = LocalSearch::new(model, |from, to| model.arc_cost(from, to), budget)
            .descend(&mut current);
        let mut iterations = first.moves;
        let mut best = current.clone();
        let mut best_cost = best.cost(model);
        if first.interrupted {
            return Improved {
                plan: best,
                iterations,
            };
        }

        let lambda = penalty_weight(self.lambda_coefficient, best_cost, arc_count(model, &current));
        log::debug!("first local minimum costs {best_cost}s; penalty weight {lambda}");

        let mut stale_rounds = 0_u64;
        while stale_rounds < self.stagnation_limit && !budget.exhausted() {
            if !self.penalise(&current) {
                log::debug!("no arc left to penalise");
                break;
            }
            let penalties = &self.penalties;
            let augmented = |from: usize, to: usize| {
                model
                    .arc_cost(from, to)
                    .saturating_add(lambda.saturating_mul(penalties.get(from, to)))
            };
            let descent = LocalSearch::new(model, augmented, budget).descend(&mut current);
            iterations += descent.moves;

            let cost = current.cost(model);
            if cost < best_cost {
                log::debug!("new best plan costs {cost}s");
                best.clone_from(&current);
                best_cost = cost;
                stale_rounds = 0;
            } else {
                stale_rounds += 1;
            }
            if descent.interrupted {
                break;
            }
        }
        Improved {
            plan: best,
            iterations,
        }
    }

    /// Raise the penalty of every maximum-utility arc in `plan`.
    ///
    /// Returns `false` when no arc has positive utility.
    fn penalise(&mut self, plan: &Plan) -> bool {
        let arcs = plan_arcs(self.model, plan);
        let mut best: Option<(u64, u64)> = None;
        for &(from, to) in &arcs {
            let cost = self.model.arc_cost(from, to);
            let penalty = self.penalties.get(from, to);
            if cost > 0 && best.is_none_or(|top| utility_exceeds((cost, penalty), top)) {
                best = Some((cost, penalty));
            }
        }
        let Some(top) = best else {
            return false;
        };
        for (from, to) in arcs {
            let candidate = (self.model.arc_cost(from, to), self.penalties.get(from, to));
            if candidate.0 > 0 && !utility_exceeds(top, candidate) {
                self.penalties.increment(from, to);
            }
        }
        true
    }
}

/// Plain descent on true cost, stopping at the first local minimum.
pub(crate) fn descend_once(model: &RoutingModel, initial: Plan, budget: &Budget<'_>) -> Improved {
    let mut plan = initial;
    let descent =
        LocalSearch::new(model, |from, to| model.arc_cost(from, to), budget).descend(&mut plan);
    Improved {
        plan,
        iterations: descent.moves,
    }
}

/// Whether `cost_a / (1 + penalty_a)` is strictly greater than the same ratio
/// for `b`, compared without division.
fn utility_exceeds((cost_a, penalty_a): (u64, u64), (cost_b, penalty_b): (u64, u64)) -> bool {
    let lhs = u128::from(cost_a) * (u128::from(penalty_b) + 1);
    let rhs = u128::from(cost_b) * (u128::from(penalty_a) + 1);
    lhs > rhs
}

fn plan_arcs(model: &RoutingModel, plan: &Plan) -> Vec<(usize, usize)> {
    let nodes = model.nodes();
    let mut arcs = Vec::new();
    for (vehicle, stops) in plan.routes.iter().enumerate() {
        if stops.is_empty() {
            continue;
        }
        let mut previous = nodes.start(vehicle);
        for &node in stops {
            arcs.push((previous, node));
            previous = node;
        }
        arcs.push((previous, nodes.end(vehicle)));
    }
    arcs
}

fn arc_count(model: &RoutingModel, plan: &Plan) -> u64 {
    u64::try_from(plan_arcs(model, plan).len()).unwrap_or(u64::MAX)
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "the penalty weight scales an average arc cost by a fractional coefficient"
)]
fn penalty_weight(coefficient: f64, cost: u64, arcs: u64) -> u64 {
    if arcs == 0 {
        return 1;
    }
    let weight = coefficient * cost as f64 / arcs as f64;
    if weight.is_finite() && weight >= 1.0 {
        weight.round() as u64
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case((10, 0), (9, 0), true)]
    #[case((10, 1), (9, 0), false)]
    #[case((10, 1), (5, 0), false)]
    #[case((12, 1), (5, 0), true)]
    fn utility_compares_penalised_costs(
        #[case] a: (u64, u64),
        #[case] b: (u64, u64),
        #[case] expected: bool,
    ) {
        assert_eq!(utility_exceeds(a, b), expected);
    }

    #[rstest]
    #[case(0.1, 1_000, 10, 10)]
    #[case(0.1, 5, 10, 1)]
    #[case(0.1, 1_000, 0, 1)]
    #[case(0.5, 300, 4, 38)]
    fn penalty_weight_scales_average_arc_cost(
        #[case] coefficient: f64,
        #[case] cost: u64,
        #[case] arcs: u64,
        #[case] expected: u64,
    ) {
        assert_eq!(penalty_weight(coefficient, cost, arcs), expected);
    }

    #[rstest]
    fn penalties_default_to_zero_and_saturate_quietly() {
        let mut penalties = Penalties::new(3);
        penalties.increment(1, 2);
        penalties.increment(1, 2);
        penalties.increment(7, 7);
        assert_eq!(penalties.get(1, 2), 2);
        assert_eq!(penalties.get(2, 1), 0);
        assert_eq!(penalties.get(7, 7), 0);
    }
}
