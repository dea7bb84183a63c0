//! Stop identity resolution.
//!
//! Two independent passes live here: tolerance based clustering of stops
//! into canonical ids (minimum id per cluster), and the exact coordinate
//! duplicate map applied when building the stop graph. They are not
//! composed with each other.

mod candidates;
mod clustering;
mod duplicates;
mod rewrite;
mod union_find;

pub use candidates::{
    CandidateGenerator, CandidateStrategy, ExhaustivePairs, RTreePairs, candidate_generator,
};
pub use clustering::{ClusteringOptions, ClusteringReport, cluster_stops};
pub use duplicates::DuplicateLocationMap;
pub use rewrite::{canonicalize_routes, rebuild_route_chains};
pub use union_find::StopUnionFind;
