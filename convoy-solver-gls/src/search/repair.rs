//! Ejection repair of incomplete constructions.
//!
//! Unplaced stops wait in a pool. Each round takes one out and inserts it,
//! ejecting a routed stop to make room when no slot is free. Stops ejected
//! often become expensive to eject again, which steers the repair away from
//! cycling between the same few exchanges.

use std::collections::VecDeque;

use super::construction::{Construction, best_insertion, cheapest_slot};
use super::{Budget, Plan};
use crate::model::RoutingModel;

/// Pool rounds allowed per stop before the repair gives up.
const ROUNDS_PER_STOP: usize = 500;

/// Place every unplaced stop of `construction`, or give up.
///
/// Returns `None` when a pooled stop fits no vehicle even on its own, when
/// total demand exceeds the fleet's capacity, or once the budget or round
/// allowance runs out.
pub(crate) fn repair(
    model: &RoutingModel,
    construction: Construction,
    budget: &Budget<'_>,
) -> Option<Plan> {
    let Construction { mut plan, unplaced } = construction;
    if unplaced.is_empty() {
        return Some(plan);
    }
    if !fleet_carries_total_demand(model) {
        log::debug!("repair skipped: total demand exceeds fleet capacity");
        return None;
    }
    if let Some(&node) = unplaced.iter().find(|&&node| !fits_alone(model, node)) {
        log::debug!("repair skipped: node {node} fits no vehicle on its own");
        return None;
    }

    let mut ejections = vec![0_u64; model.nodes().len()];
    let mut pool: VecDeque<usize> = unplaced.into();
    let allowance = model.nodes().stop_count().saturating_mul(ROUNDS_PER_STOP);
    let mut rounds = 0_usize;
    while let Some(node) = pool.pop_front() {
        if rounds >= allowance || budget.exhausted() {
            log::debug!(
                "repair gave up after {rounds} rounds with {} stops unplaced",
                pool.len() + 1
            );
            return None;
        }
        rounds += 1;
        if let Some(insertion) = best_insertion(model, &plan, node) {
            insertion.apply(&mut plan, node);
            continue;
        }
        let ejected = match cheapest_ejection(model, &plan, node, &ejections) {
            Some(ejection) => ejection.apply(&mut plan, node),
            None => evict_route(model, &mut plan, node, &ejections)?,
        };
        for stop in ejected {
            if let Some(count) = ejections.get_mut(stop) {
                *count = count.saturating_add(1);
            }
            pool.push_back(stop);
        }
    }
    log::debug!("repair placed every stop after {rounds} rounds");
    Some(plan)
}

fn fleet_carries_total_demand(model: &RoutingModel) -> bool {
    let nodes = model.nodes();
    let capacity = model.capacity();
    let demand = (0..nodes.stop_count())
        .map(|stop| capacity.demand(stop))
        .fold(0_u64, u64::saturating_add);
    let fleet = (0..nodes.vehicle_count())
        .map(|vehicle| capacity.capacity(vehicle))
        .fold(0_u64, u64::saturating_add);
    demand <= fleet
}

fn fits_alone(model: &RoutingModel, node: usize) -> bool {
    (0..model.nodes().vehicle_count()).any(|vehicle| model.is_feasible(vehicle, &[node]))
}

/// Swap one routed stop out for the pooled one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ejection {
    vehicle: usize,
    removed: usize,
    position: usize,
    /// Prior ejections of the removed stop, then the change in travel time.
    key: (u64, i128),
}

impl Ejection {
    fn apply(self, plan: &mut Plan, node: usize) -> Vec<usize> {
        let Some(route) = plan.routes.get_mut(self.vehicle) else {
            return Vec::new();
        };
        if self.removed >= route.len() {
            return Vec::new();
        }
        let ejected = route.remove(self.removed);
        route.insert(self.position.min(route.len()), node);
        vec![ejected]
    }
}

/// Least-ejected stop whose removal lets `node` in, breaking ties by cost.
fn cheapest_ejection(
    model: &RoutingModel,
    plan: &Plan,
    node: usize,
    ejections: &[u64],
) -> Option<Ejection> {
    let mut best: Option<Ejection> = None;
    let mut reduced = Vec::new();
    for (vehicle, route) in plan.routes.iter().enumerate() {
        let before = i128::from(model.route_cost(vehicle, route));
        for (removed, &stop) in route.iter().enumerate() {
            let count = ejections.get(stop).copied().unwrap_or(0);
            if best.is_some_and(|current| count > current.key.0) {
                continue;
            }
            reduced.clear();
            reduced.extend(route.iter().take(removed));
            reduced.extend(route.iter().skip(removed + 1));
            let Some((position, delta)) = cheapest_slot(model, vehicle, &reduced, node) else {
                continue;
            };
            let key = (
                count,
                i128::from(model.route_cost(vehicle, &reduced)) + delta - before,
            );
            if best.is_none_or(|current| key < current.key) {
                best = Some(Ejection {
                    vehicle,
                    removed,
                    position,
                    key,
                });
            }
        }
    }
    best
}

/// Empty the least-disturbed route that can serve `node` alone and give it
/// `node`.
fn evict_route(
    model: &RoutingModel,
    plan: &mut Plan,
    node: usize,
    ejections: &[u64],
) -> Option<Vec<usize>> {
    let disturbance = |route: &[usize]| {
        route
            .iter()
            .map(|&stop| ejections.get(stop).copied().unwrap_or(0))
            .fold(0_u64, u64::saturating_add)
    };
    let vehicle = plan
        .routes
        .iter()
        .enumerate()
        .filter(|&(vehicle, _)| model.is_feasible(vehicle, &[node]))
        .min_by_key(|&(_, route)| disturbance(route))
        .map(|(vehicle, _)| vehicle)?;
    let route = plan.routes.get_mut(vehicle)?;
    log::debug!("node {node} evicts {} stops from vehicle {vehicle}", route.len());
    Some(std::mem::replace(route, vec![node]))
}
