//! Propagating canonical ids into route chains and route rows

use log::debug;

use super::union_find::StopUnionFind;
use crate::model::{RouteChain, RouteChains, RouteDataset};

/// Canonical stop chain of every route.
///
/// Ids are remapped first and adjacent repeats collapsed afterwards, so two
/// merged stops visited back to back appear once.
pub fn rebuild_route_chains(dataset: &RouteDataset, forest: &mut StopUnionFind) -> RouteChains {
    dataset
        .iter()
        .map(|route| {
            let chain = RouteChain::collapsed(route.stops().map(|stop| forest.find(stop.id)));
            debug!(
                "Route {}: {} stops -> chain of {}",
                route.name,
                route.stops().count(),
                chain.len()
            );
            (route.name.clone(), chain)
        })
        .collect()
}

/// Replaces every stop id in the full row sequences with its canonical id.
///
/// Shape points, coordinates and headers are left untouched. Returns the
/// number of rows whose id changed.
pub fn canonicalize_routes(dataset: &mut RouteDataset, forest: &mut StopUnionFind) -> usize {
    let mut rewritten = 0;
    for route in dataset.routes.values_mut() {
        for point in route.points.iter_mut().filter(|point| point.is_stop()) {
            let canonical = forest.find(point.id);
            if canonical != point.id {
                point.id = canonical;
                rewritten += 1;
            }
        }
    }
    rewritten
}
