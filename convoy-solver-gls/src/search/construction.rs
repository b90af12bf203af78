//! First-solution heuristics.

use thiserror::Error;

use super::Plan;
use crate::model::RoutingModel;

/// A stop no vehicle can ever serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub(crate) enum Unservable {
    #[error("stop {stop} demands {demand} units, more than any vehicle carries")]
    Demand { stop: usize, demand: u64 },
    #[error("stop {stop} cannot be reached from any start before its window closes")]
    Window { stop: usize },
}

/// Reject instances with a stop that no route can serve.
///
/// Only direct legs from each start are considered, so a window is deemed
/// unreachable when every start is too far away.
pub(crate) fn precheck(model: &RoutingModel) -> Result<(), Unservable> {
    let nodes = model.nodes();
    let max_capacity = model.capacity().max_capacity();
    for stop in 0..nodes.stop_count() {
        let demand = model.capacity().demand(stop);
        if demand > max_capacity {
            return Err(Unservable::Demand { stop, demand });
        }
        let Some(window) = model.time().window(stop) else {
            return Err(Unservable::Window { stop });
        };
        let node = nodes.stop_node(stop);
        let earliest = (0..nodes.vehicle_count())
            .map(|vehicle| model.arc_cost(nodes.start(vehicle), node))
            .min();
        if earliest.is_none_or(|arrival| arrival > window.due()) {
            return Err(Unservable::Window { stop });
        }
    }
    Ok(())
}

/// Plan built by a first-solution heuristic and the stops it could not place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Construction {
    pub(crate) plan: Plan,
    pub(crate) unplaced: Vec<usize>,
}

impl Construction {
    /// The plan, if every stop was placed.
    pub(crate) fn into_complete(self) -> Option<Plan> {
        self.unplaced.is_empty().then_some(self.plan)
    }
}

/// Grow each vehicle's route in turn along the cheapest feasible arc.
///
/// Stops no route could take are then offered the cheapest feasible
/// insertion anywhere. Those still without a slot are reported as unplaced.
pub(crate) fn path_cheapest_arc(model: &RoutingModel) -> Construction {
    let nodes = model.nodes();
    let mut unvisited: Vec<usize> = nodes.stop_nodes().collect();
    let mut plan = Plan::empty(nodes.vehicle_count());

    for (vehicle, route) in plan.routes.iter_mut().enumerate() {
        loop {
            let current = route.last().copied().unwrap_or(nodes.start(vehicle));
            let Some(position) = cheapest_feasible_arc(model, vehicle, route, current, &unvisited)
            else {
                break;
            };
            route.push(unvisited.remove(position));
        }
        log::debug!("vehicle {vehicle} takes {} stops", route.len());
    }

    if !unvisited.is_empty() {
        log::debug!("{} stops left after path construction", unvisited.len());
    }
    let mut unplaced = Vec::new();
    for node in unvisited {
        match best_insertion(model, &plan, node) {
            Some(insertion) => insertion.apply(&mut plan, node),
            None => unplaced.push(node),
        }
    }
    Construction { plan, unplaced }
}

/// Repeatedly insert the stop whose best feasible insertion is cheapest.
///
/// Stops stop being placed once none of the remaining ones has a slot.
pub(crate) fn cheapest_insertion(model: &RoutingModel) -> Construction {
    let nodes = model.nodes();
    let mut unvisited: Vec<usize> = nodes.stop_nodes().collect();
    let mut plan = Plan::empty(nodes.vehicle_count());
    let mut unplaced = Vec::new();

    while !unvisited.is_empty() {
        let mut chosen: Option<(usize, Insertion)> = None;
        for (index, &node) in unvisited.iter().enumerate() {
            let Some(insertion) = best_insertion(model, &plan, node) else {
                continue;
            };
            if chosen
                .as_ref()
                .is_none_or(|(_, best)| insertion.delta < best.delta)
            {
                chosen = Some((index, insertion));
            }
        }
        let Some((index, insertion)) = chosen else {
            unplaced.append(&mut unvisited);
            break;
        };
        let node = unvisited.remove(index);
        insertion.apply(&mut plan, node);
    }
    Construction { plan, unplaced }
}

fn cheapest_feasible_arc(
    model: &RoutingModel,
    vehicle: usize,
    route: &[usize],
    current: usize,
    unvisited: &[usize],
) -> Option<usize> {
    let mut order: Vec<(u64, usize)> = unvisited
        .iter()
        .enumerate()
        .map(|(position, &node)| (model.arc_cost(current, node), position))
        .collect();
    order.sort_unstable();

    let mut candidate = Vec::with_capacity(route.len() + 1);
    candidate.extend_from_slice(route);
    candidate.push(current);
    order.into_iter().find_map(|(_, position)| {
        let node = *unvisited.get(position)?;
        *candidate.last_mut()? = node;
        model.is_feasible(vehicle, &candidate).then_some(position)
    })
}

/// Where to put a stop and what it costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Insertion {
    vehicle: usize,
    position: usize,
    delta: i128,
}

impl Insertion {
    pub(crate) fn apply(self, plan: &mut Plan, node: usize) {
        if let Some(route) = plan.routes.get_mut(self.vehicle) {
            route.insert(self.position.min(route.len()), node);
        }
    }
}

/// Cheapest feasible position for `node` across every route.
pub(crate) fn best_insertion(model: &RoutingModel, plan: &Plan, node: usize) -> Option<Insertion> {
    let mut best: Option<Insertion> = None;
    for (vehicle, route) in plan.routes.iter().enumerate() {
        let Some((position, delta)) = cheapest_slot(model, vehicle, route, node) else {
            continue;
        };
        if best.is_none_or(|current| delta < current.delta) {
            best = Some(Insertion {
                vehicle,
                position,
                delta,
            });
        }
    }
    best
}

/// Cheapest feasible position for `node` within one route, with the change
/// in travel time it causes.
pub(crate) fn cheapest_slot(
    model: &RoutingModel,
    vehicle: usize,
    route: &[usize],
    node: usize,
) -> Option<(usize, i128)> {
    let nodes = model.nodes();
    let mut best: Option<(usize, i128)> = None;
    let mut candidate = Vec::with_capacity(route.len() + 1);
    for position in 0..=route.len() {
        let previous = position
            .checked_sub(1)
            .and_then(|index| route.get(index))
            .copied()
            .unwrap_or(nodes.start(vehicle));
        let next = route.get(position).copied().unwrap_or(nodes.end(vehicle));
        let delta = i128::from(model.arc_cost(previous, node))
            + i128::from(model.arc_cost(node, next))
            - i128::from(model.arc_cost(previous, next));
        if best.is_some_and(|(_, current)| delta >= current) {
            continue;
        }
        candidate.clear();
        candidate.extend(route.iter().take(position));
        candidate.push(node);
        candidate.extend(route.iter().skip(position));
        if model.is_feasible(vehicle, &candidate) {
            best = Some((position, delta));
        }
    }
    best
}
