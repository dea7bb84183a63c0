//! Candidate pair generation for stop clustering
//!
//! The exhaustive generator compares every pair of stops and is quadratic in
//! the number of stops, which stays manageable for a few thousand stops.
//! The R-tree generator pre-filters partners with a bounding box that is
//! strictly larger than the tolerance, so it yields the same clusters with
//! far fewer distance evaluations on large networks.

use rstar::{AABB, RTree, primitives::GeomWithData};
use serde::{Deserialize, Serialize};

use crate::model::RoutePoint;

/// Lower bound of meters per degree of latitude (110 574 m at the equator)
const MIN_METERS_PER_DEGREE_LAT: f64 = 110_000.0;
/// Lower bound of meters per degree of longitude at the equator
const MIN_METERS_PER_DEGREE_LON: f64 = 111_000.0;
/// Beyond this latitude the box spans every longitude
const MAX_BOXED_LATITUDE: f64 = 89.0;
const ENVELOPE_PADDING: f64 = 1e-9;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateStrategy {
    #[default]
    Exhaustive,
    #[serde(alias = "r-tree")]
    RTree,
}

impl std::str::FromStr for CandidateStrategy {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "exhaustive" => Ok(CandidateStrategy::Exhaustive),
            "rtree" | "r-tree" => Ok(CandidateStrategy::RTree),
            other => Err(crate::Error::InvalidData(format!(
                "Unknown candidate strategy: {other}"
            ))),
        }
    }
}

/// Produces, for each stop index `i`, the indices `j > i` worth comparing with it
pub trait CandidateGenerator: Sync {
    fn partners(&self, i: usize) -> Vec<usize>;
}

/// Every later stop is a candidate
#[derive(Debug, Clone, Copy)]
pub struct ExhaustivePairs {
    len: usize,
}

impl ExhaustivePairs {
    pub fn new(len: usize) -> Self {
        Self { len }
    }
}

impl CandidateGenerator for ExhaustivePairs {
    fn partners(&self, i: usize) -> Vec<usize> {
        (i + 1..self.len).collect()
    }
}

type IndexedStop = GeomWithData<[f64; 2], usize>;

/// Stops whose coordinates fall in a tolerance-sized box around stop `i`
pub struct RTreePairs {
    tree: RTree<IndexedStop>,
    envelopes: Vec<AABB<[f64; 2]>>,
}

impl RTreePairs {
    pub fn new(stops: &[RoutePoint], max_distance_meters: f64) -> Self {
        let tree = RTree::bulk_load(
            stops
                .iter()
                .enumerate()
                .map(|(idx, stop)| GeomWithData::new([stop.lon, stop.lat], idx))
                .collect(),
        );
        let envelopes = stops
            .iter()
            .map(|stop| search_envelope(stop, max_distance_meters))
            .collect();

        Self { tree, envelopes }
    }
}

impl CandidateGenerator for RTreePairs {
    fn partners(&self, i: usize) -> Vec<usize> {
        let mut partners: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&self.envelopes[i])
            .map(|node| node.data)
            .filter(|&j| j > i)
            .collect();
        partners.sort_unstable();
        partners
    }
}

/// Box in degrees containing every point within `meters` of `stop`
fn search_envelope(stop: &RoutePoint, meters: f64) -> AABB<[f64; 2]> {
    let d_lat = meters / MIN_METERS_PER_DEGREE_LAT + ENVELOPE_PADDING;
    let max_lat = stop.lat.abs() + d_lat;

    let d_lon = if max_lat >= MAX_BOXED_LATITUDE {
        360.0
    } else {
        meters / (MIN_METERS_PER_DEGREE_LON * max_lat.to_radians().cos()) + ENVELOPE_PADDING
    };

    AABB::from_corners(
        [stop.lon - d_lon, stop.lat - d_lat],
        [stop.lon + d_lon, stop.lat + d_lat],
    )
}

/// Generator for the chosen strategy
pub fn candidate_generator(
    strategy: CandidateStrategy,
    stops: &[RoutePoint],
    max_distance_meters: f64,
) -> Box<dyn CandidateGenerator> {
    match strategy {
        CandidateStrategy::Exhaustive => Box::new(ExhaustivePairs::new(stops.len())),
        CandidateStrategy::RTree => Box::new(RTreePairs::new(stops, max_distance_meters)),
    }
}
