use hashbrown::{HashMap, HashSet};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::{
    Error, StopId,
    canonical::DuplicateLocationMap,
    distance::DistanceOracle,
    model::{AdjacencyMatrix, Route, RouteChain, RouteChains, RouteDataset, RoutePoint},
};

/// Counters collected while building the adjacency matrix
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdjacencyReport {
    pub routes_processed: usize,
    /// Chains without a matching route file
    pub routes_skipped: usize,
    pub edges: usize,
    /// Edges dropped because a segment distance could not be computed
    pub edges_failed: usize,
    /// Edges that replaced an earlier weight for the same pair
    pub edges_overwritten: usize,
}

/// A directed edge between two consecutive chain stops
#[derive(Debug, Clone, Copy, PartialEq)]
struct RouteEdge {
    from: StopId,
    to: StopId,
    meters: f64,
}

/// Length of the polyline through `points`, summed segment by segment
pub fn path_length(points: &[RoutePoint], oracle: &dyn DistanceOracle) -> Result<f64, Error> {
    points
        .windows(2)
        .map(|segment| oracle.distance(&segment[0], &segment[1]))
        .sum()
}

/// Chain stops of `route` with their row positions, ordered by position.
///
/// A stop visited several times is placed at its last occurrence.
fn ordered_chain_stops(route: &Route, chain: &RouteChain) -> Vec<(StopId, usize)> {
    let members: HashSet<StopId> = chain.stops().iter().copied().collect();
    let mut positions: HashMap<StopId, usize> = HashMap::new();
    for (idx, point) in route.points.iter().enumerate() {
        if point.is_stop() && members.contains(&point.id) {
            positions.insert(point.id, idx);
        }
    }

    let mut ordered: Vec<(StopId, usize)> = positions.into_iter().collect();
    ordered.sort_unstable_by_key(|&(_, idx)| idx);
    ordered
}

/// Edges of one route, or the number of edges that failed
fn route_edges(
    route: &Route,
    chain: &RouteChain,
    duplicates: &DuplicateLocationMap,
    oracle: &dyn DistanceOracle,
) -> (Vec<RouteEdge>, usize) {
    let ordered = ordered_chain_stops(route, chain);
    let mut edges = Vec::with_capacity(ordered.len().saturating_sub(1));
    let mut failed = 0;

    for pair in ordered.windows(2) {
        let (s1, idx1) = pair[0];
        let (s2, idx2) = pair[1];
        match path_length(&route.points[idx1..=idx2], oracle) {
            Ok(meters) => edges.push(RouteEdge {
                from: duplicates.get(s1),
                to: duplicates.get(s2),
                meters,
            }),
            Err(e) => {
                warn!(
                    "Skipping edge {s1} -> {s2} on route {}: {e}",
                    route.name
                );
                failed += 1;
            }
        }
    }

    (edges, failed)
}

/// Builds the directed stop graph from canonical chains and route rows.
///
/// Consecutive chain stops become edges weighted by the path length along
/// the route's rows between them. Edge endpoints go through the duplicate
/// location map. Routes are applied in name order, so a later route
/// overwrites the weight an earlier one assigned to the same pair.
/// With `parallel` set, per-route edges are computed on the rayon pool;
/// the result is the same either way.
pub fn build_adjacency_matrix(
    chains: &RouteChains,
    dataset: &RouteDataset,
    duplicates: &DuplicateLocationMap,
    oracle: &dyn DistanceOracle,
    parallel: bool,
) -> (AdjacencyMatrix, AdjacencyReport) {
    let mut report = AdjacencyReport::default();

    let routes: Vec<(&Route, &RouteChain)> = chains
        .iter()
        .filter_map(|(name, chain)| match dataset.get(name) {
            Some(route) => Some((route, chain)),
            None => {
                warn!("No route points for chain '{name}', skipping");
                report.routes_skipped += 1;
                None
            }
        })
        .collect();

    let edges_of = |&(route, chain): &(&Route, &RouteChain)| {
        route_edges(route, chain, duplicates, oracle)
    };
    let per_route: Vec<(Vec<RouteEdge>, usize)> = if parallel {
        routes.par_iter().map(edges_of).collect()
    } else {
        routes.iter().map(edges_of).collect()
    };

    let mut matrix = AdjacencyMatrix::new();
    for ((route, _), (edges, failed)) in routes.iter().zip(per_route) {
        debug!("Route {}: {} edges", route.name, edges.len());
        report.routes_processed += 1;
        report.edges_failed += failed;
        for edge in edges {
            if matrix.insert(edge.from, edge.to, edge.meters).is_some() {
                report.edges_overwritten += 1;
            }
        }
    }
    report.edges = matrix.edge_count();

    info!(
        "Built adjacency matrix with {} edges from {} routes",
        report.edges, report.routes_processed
    );
    (matrix, report)
}
