//! Canonical transit stop graphs from raw per-route traces.
//!
//! Stops recorded under different ids at (nearly) the same place are merged
//! into one canonical id, and consecutive stops of every route become
//! directed edges weighted by the path length along the route shape.

pub mod canonical;
pub mod distance;
mod error;
pub mod graph;
pub mod loading;
pub mod model;
pub mod prelude;

pub use error::Error;

/// Stop identifier; `0` marks shape points
pub type StopId = i64;
