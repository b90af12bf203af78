//! Mapping assignments back to caller-supplied stop identifiers.

use std::collections::BTreeMap;

use convoy_core::Stop;

use crate::model::NodeSpace;
use crate::search::Assignment;

/// Ordered stop ids per vehicle index.
///
/// Depot nodes are dropped. Costs and feasibility are not recomputed; the
/// assignment is trusted as produced by the search.
///
/// # Examples
/// ```
/// use convoy_core::{Location, Stop};
/// use convoy_solver_gls::{NodeSpace, decode_routes};
///
/// let stops = vec![
///     Stop::new("a", Location::new(0.0, 0.0)),
///     Stop::new("b", Location::new(0.0, 0.0)),
/// ];
/// let nodes = NodeSpace::new(1, 2);
/// let routes = decode_routes(&nodes, &stops, [&[0, 2, 1, 3][..]]);
/// assert_eq!(routes.get(&0), Some(&vec!["b".to_owned(), "a".to_owned()]));
/// ```
#[must_use]
pub fn decode_routes<'a, I>(
    nodes: &NodeSpace,
    stops: &[Stop],
    routes: I,
) -> BTreeMap<usize, Vec<String>>
where
    I: IntoIterator<Item = &'a [usize]>,
{
    routes
        .into_iter()
        .enumerate()
        .map(|(vehicle, route)| {
            let ids = route
                .iter()
                .filter_map(|&node| nodes.stop_of(node))
                .filter_map(|stop| stops.get(stop))
                .map(|stop| stop.id.clone())
                .collect();
            (vehicle, ids)
        })
        .collect()
}

/// Decode every route of `assignment`.
#[must_use]
pub fn decode(
    nodes: &NodeSpace,
    stops: &[Stop],
    assignment: &Assignment,
) -> BTreeMap<usize, Vec<String>> {
    decode_routes(nodes, stops, assignment.routes())
}
