//! Move neighbourhoods and first-improvement descent.
//!
//! Neighbourhoods are scanned in a fixed order: single-stop relocate, swap
//! between routes, 2-opt reversal, then or-opt segments of two and three
//! stops. The first feasible move that lowers the route value under the
//! current arc function is applied.

use super::{Budget, Plan};
use crate::model::RoutingModel;

/// Routes rewritten by a move, as `(vehicle, stops)` pairs.
pub(crate) type Rewrite = Vec<(usize, Vec<usize>)>;

/// A candidate change to a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Move {
    /// Move `length` consecutive stops to another position, possibly in
    /// another route. A length of one is a plain relocate; longer segments
    /// are or-opt moves.
    Relocate {
        from_vehicle: usize,
        from_position: usize,
        length: usize,
        to_vehicle: usize,
        to_position: usize,
    },
    /// Exchange two stops between routes.
    Swap {
        first: (usize, usize),
        second: (usize, usize),
    },
    /// Reverse the stops in `start..=end` of one route.
    TwoOpt {
        vehicle: usize,
        start: usize,
        end: usize,
    },
}

impl Move {
    /// Routes after applying the move, or `None` if it does not fit `plan`.
    pub(crate) fn rewrite(&self, plan: &Plan) -> Option<Rewrite> {
        match *self {
            Self::Relocate {
                from_vehicle,
                from_position,
                length,
                to_vehicle,
                to_position,
            } => {
                let source = plan.routes.get(from_vehicle)?;
                let end = from_position.checked_add(length)?;
                let segment = source.get(from_position..end)?.to_vec();
                let mut reduced: Vec<usize> = source
                    .iter()
                    .take(from_position)
                    .chain(source.iter().skip(end))
                    .copied()
                    .collect();
                if from_vehicle == to_vehicle {
                    if to_position > reduced.len() {
                        return None;
                    }
                    reduced.splice(to_position..to_position, segment);
                    return Some(vec![(from_vehicle, reduced)]);
                }
                let mut target = plan.routes.get(to_vehicle)?.clone();
                if to_position > target.len() {
                    return None;
                }
                target.splice(to_position..to_position, segment);
                Some(vec![(from_vehicle, reduced), (to_vehicle, target)])
            }
            Self::Swap {
                first: (first_vehicle, first_position),
                second: (second_vehicle, second_position),
            } => {
                let first_node = *plan.route(first_vehicle).get(first_position)?;
                let second_node = *plan.route(second_vehicle).get(second_position)?;
                let mut first_route = plan.route(first_vehicle).to_vec();
                *first_route.get_mut(first_position)? = second_node;
                if first_vehicle == second_vehicle {
                    *first_route.get_mut(second_position)? = first_node;
                    return Some(vec![(first_vehicle, first_route)]);
                }
                let mut second_route = plan.route(second_vehicle).to_vec();
                *second_route.get_mut(second_position)? = first_node;
                Some(vec![
                    (first_vehicle, first_route),
                    (second_vehicle, second_route),
                ])
            }
            Self::TwoOpt {
                vehicle,
                start,
                end,
            } => {
                let mut route = plan.route(vehicle).to_vec();
                route.get_mut(start..=end)?.reverse();
                Some(vec![(vehicle, route)])
            }
        }
    }
}

/// The deadline or cancellation fired mid-scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Interrupted;

/// Outcome of one descent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Descent {
    pub(crate) moves: u64,
    pub(crate) interrupted: bool,
}

/// First-improvement local search under an arc valuation.
pub(crate) struct LocalSearch<'a, F> {
    model: &'a RoutingModel,
    arc: F,
    budget: &'a Budget<'a>,
}

impl<'a, F> LocalSearch<'a, F>
where
    F: Fn(usize, usize) -> u64,
{
    pub(crate) const fn new(model: &'a RoutingModel, arc: F, budget: &'a Budget<'a>) -> Self {
        Self { model, arc, budget }
    }

    /// Apply improving moves until none is left or the budget runs out.
    pub(crate) fn descend(&self, plan: &mut Plan) -> Descent {
        let mut moves = 0_u64;
        loop {
            match self.find_improving(plan) {
                Ok(Some(rewrite)) => {
                    for (vehicle, stops) in rewrite {
                        if let Some(route) = plan.routes.get_mut(vehicle) {
                            *route = stops;
                        }
                    }
                    moves += 1;
                }
                Ok(None) => {
                    return Descent {
                        moves,
                        interrupted: false,
                    };
                }
                Err(Interrupted) => {
                    return Descent {
                        moves,
                        interrupted: true,
                    };
                }
            }
        }
    }

    fn find_improving(&self, plan: &Plan) -> Result<Option<Rewrite>, Interrupted> {
        if let Some(rewrite) = self.relocate(plan, 1)? {
            return Ok(Some(rewrite));
        }
        if let Some(rewrite) = self.swap(plan)? {
            return Ok(Some(rewrite));
        }
        if let Some(rewrite) = self.two_opt(plan)? {
            return Ok(Some(rewrite));
        }
        for length in 2..=3 {
            if let Some(rewrite) = self.relocate(plan, length)? {
                return Ok(Some(rewrite));
            }
        }
        Ok(None)
    }

    fn relocate(&self, plan: &Plan, length: usize) -> Result<Option<Rewrite>, Interrupted> {
        let vehicles = plan.routes.len();
        for from_vehicle in 0..vehicles {
            let source_len = plan.route(from_vehicle).len();
            let Some(last_start) = source_len.checked_sub(length) else {
                continue;
            };
            for from_position in 0..=last_start {
                for to_vehicle in 0..vehicles {
                    let target_len = if to_vehicle == from_vehicle {
                        last_start
                    } else {
                        plan.route(to_vehicle).len()
                    };
                    for to_position in 0..=target_len {
                        if to_vehicle == from_vehicle && to_position == from_position {
                            continue;
                        }
                        let candidate = Move::Relocate {
                            from_vehicle,
                            from_position,
                            length,
                            to_vehicle,
                            to_position,
                        };
                        if let Some(rewrite) = self.evaluate(plan, candidate)? {
                            return Ok(Some(rewrite));
                        }
                    }
                }
            }
        }
        Ok(None)
    }

    fn swap(&self, plan: &Plan) -> Result<Option<Rewrite>, Interrupted> {
        let vehicles = plan.routes.len();
        for first_vehicle in 0..vehicles {
            for second_vehicle in first_vehicle + 1..vehicles {
                for first_position in 0..plan.route(first_vehicle).len() {
                    for second_position in 0..plan.route(second_vehicle).len() {
                        let candidate = Move::Swap {
                            first: (first_vehicle, first_position),
                            second: (second_vehicle, second_position),
                        };
                        if let Some(rewrite) = self.evaluate(plan, candidate)? {
                            return Ok(Some(rewrite));
                        }
                    }
                }
            }
        }
        Ok(None)
    }

    fn two_opt(&self, plan: &Plan) -> Result<Option<Rewrite>, Interrupted> {
        for vehicle in 0..plan.routes.len() {
            let len = plan.route(vehicle).len();
            for start in 0..len {
                for end in start + 1..len {
                    let candidate = Move::TwoOpt {
                        vehicle,
                        start,
                        end,
                    };
                    if let Some(rewrite) = self.evaluate(plan, candidate)? {
                        return Ok(Some(rewrite));
                    }
                }
            }
        }
        Ok(None)
    }

    fn evaluate(&self, plan: &Plan, candidate: Move) -> Result<Option<Rewrite>, Interrupted> {
        if self.budget.exhausted() {
            return Err(Interrupted);
        }
        let Some(rewrite) = candidate.rewrite(plan) else {
            return Ok(None);
        };
        let before = rewrite
            .iter()
            .map(|(vehicle, _)| self.value(*vehicle, plan.route(*vehicle)))
            .fold(0_u64, u64::saturating_add);
        let after = rewrite
            .iter()
            .map(|(vehicle, stops)| self.value(*vehicle, stops))
            .fold(0_u64, u64::saturating_add);
        if after >= before {
            return Ok(None);
        }
        let feasible = rewrite
            .iter()
            .all(|(vehicle, stops)| self.model.is_feasible(*vehicle, stops));
        Ok(feasible.then_some(rewrite))
    }

    fn value(&self, vehicle: usize, stops: &[usize]) -> u64 {
        self.model.route_cost_with(vehicle, stops, &self.arc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn plan(routes: &[&[usize]]) -> Plan {
        Plan {
            routes: routes.iter().map(|route| route.to_vec()).collect(),
        }
    }

    #[rstest]
    #[case(0, 0, 1, 0, 2, vec![(0, vec![3, 4, 2])])]
    #[case(0, 1, 2, 0, 0, vec![(0, vec![3, 4, 2])])]
    #[case(0, 0, 1, 1, 1, vec![(0, vec![3, 4]), (1, vec![5, 2])])]
    #[case(0, 1, 2, 1, 0, vec![(0, vec![2]), (1, vec![3, 4, 5])])]
    fn relocate_moves_segments(
        #[case] from_vehicle: usize,
        #[case] from_position: usize,
        #[case] length: usize,
        #[case] to_vehicle: usize,
        #[case] to_position: usize,
        #[case] expected: Rewrite,
    ) {
        let candidate = Move::Relocate {
            from_vehicle,
            from_position,
            length,
            to_vehicle,
            to_position,
        };
        assert_eq!(candidate.rewrite(&plan(&[&[2, 3, 4], &[5]])), Some(expected));
    }

    #[rstest]
    fn relocate_rejects_out_of_range_segments() {
        let candidate = Move::Relocate {
            from_vehicle: 0,
            from_position: 2,
            length: 2,
            to_vehicle: 1,
            to_position: 0,
        };
        assert_eq!(candidate.rewrite(&plan(&[&[2, 3, 4], &[5]])), None);
    }

    #[rstest]
    fn swap_exchanges_between_routes() {
        let candidate = Move::Swap {
            first: (0, 1),
            second: (1, 0),
        };
        assert_eq!(
            candidate.rewrite(&plan(&[&[2, 3, 4], &[5]])),
            Some(vec![(0, vec![2, 5, 4]), (1, vec![3])])
        );
    }

    #[rstest]
    fn two_opt_reverses_the_inner_segment() {
        let candidate = Move::TwoOpt {
            vehicle: 0,
            start: 0,
            end: 1,
        };
        assert_eq!(
            candidate.rewrite(&plan(&[&[2, 3, 4], &[5]])),
            Some(vec![(0, vec![3, 2, 4])])
        );
    }
}
