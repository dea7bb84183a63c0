use hashbrown::HashSet;
use log::{debug, info, trace, warn};
use rayon::prelude::*;
use serde::Serialize;

use super::candidates::{CandidateStrategy, candidate_generator};
use super::union_find::StopUnionFind;
use crate::{StopId, distance::DistanceOracle, model::RoutePoint};

/// Parameters of a clustering run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusteringOptions {
    /// Stops at most this far apart are merged
    pub max_distance_meters: f64,
    pub candidates: CandidateStrategy,
    /// Evaluate candidate pairs on the rayon thread pool
    pub parallel: bool,
}

impl Default for ClusteringOptions {
    fn default() -> Self {
        Self {
            max_distance_meters: 60.0,
            candidates: CandidateStrategy::default(),
            parallel: true,
        }
    }
}

/// Counters collected while clustering
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClusteringReport {
    /// Distinct (id, location) stop records compared
    pub stops: usize,
    /// Pairs passed to the distance oracle
    pub pairs_evaluated: usize,
    /// Pairs found within tolerance
    pub pairs_within_tolerance: usize,
    /// Pairs skipped because the oracle failed
    pub pairs_failed: usize,
    /// Unions that actually joined two clusters
    pub merges: usize,
}

/// Outcome of comparing one or more stops against their candidates
#[derive(Default)]
struct PairBatch {
    evaluated: usize,
    failed: usize,
    matches: Vec<(StopId, StopId)>,
}

impl PairBatch {
    fn merge(mut self, other: PairBatch) -> PairBatch {
        self.evaluated += other.evaluated;
        self.failed += other.failed;
        self.matches.extend(other.matches);
        self
    }

    /// Applies the matches to `forest` and adds the counters to `report`
    fn apply(self, forest: &mut StopUnionFind, report: &mut ClusteringReport) {
        report.pairs_evaluated += self.evaluated;
        report.pairs_failed += self.failed;
        report.pairs_within_tolerance += self.matches.len();
        report.merges += self
            .matches
            .into_iter()
            .filter(|&(a, b)| forest.union(a, b))
            .count();
    }
}

/// Groups stops lying within the configured tolerance of each other.
///
/// Shape points are ignored and stops sharing an id are never compared.
/// The returned forest maps every merged id to the minimum id of its cluster.
///
/// The parallel path buffers every matching pair before the first union, so
/// with exhaustive candidates and a tolerance spanning the whole network its
/// memory grows with the square of the stop count. The sequential path
/// unions after each stop and only holds that stop's matches.
pub fn cluster_stops(
    stops: &[RoutePoint],
    options: &ClusteringOptions,
    oracle: &dyn DistanceOracle,
) -> (StopUnionFind, ClusteringReport) {
    let stops = unique_stops(stops);
    let tolerance = options.max_distance_meters;
    info!(
        "Clustering {} stops within {tolerance} m ({:?} candidates)",
        stops.len(),
        options.candidates
    );

    let generator = candidate_generator(options.candidates, &stops, tolerance);

    let evaluate = |i: usize| -> PairBatch {
        let mut batch = PairBatch::default();
        let a = &stops[i];
        for j in generator.partners(i) {
            let b = &stops[j];
            if a.id == b.id {
                continue;
            }
            batch.evaluated += 1;
            match oracle.distance(a, b) {
                Ok(distance) if distance <= tolerance => {
                    trace!("Stops {} and {} are {distance:.2} m apart", a.id, b.id);
                    batch.matches.push((a.id, b.id));
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("Skipping comparison of stops {} and {}: {e}", a.id, b.id);
                    batch.failed += 1;
                }
            }
        }
        batch
    };

    let mut forest = StopUnionFind::new();
    let mut report = ClusteringReport {
        stops: stops.len(),
        ..ClusteringReport::default()
    };

    if options.parallel {
        (0..stops.len())
            .into_par_iter()
            .map(evaluate)
            .reduce(PairBatch::default, PairBatch::merge)
            .apply(&mut forest, &mut report);
    } else {
        for i in 0..stops.len() {
            evaluate(i).apply(&mut forest, &mut report);
        }
    }

    debug!("{report:?}");
    info!(
        "Merged {} stop ids into existing clusters",
        forest.merged_count()
    );

    (forest, report)
}

/// Drops stop records repeated with the same id at the same location.
///
/// Comparing such a record twice can never produce a different union,
/// since pairs are judged by id and position only.
fn unique_stops(stops: &[RoutePoint]) -> Vec<RoutePoint> {
    let mut seen: HashSet<(StopId, u64, u64)> = HashSet::with_capacity(stops.len());
    stops
        .iter()
        .filter(|stop| stop.is_stop())
        .filter(|stop| seen.insert((stop.id, stop.lon.to_bits(), stop.lat.to_bits())))
        .copied()
        .collect()
}
