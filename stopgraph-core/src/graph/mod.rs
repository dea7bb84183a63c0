//! Stop graph synthesis from canonical route chains

mod builder;
mod to_geojson;

pub use builder::{AdjacencyReport, build_adjacency_matrix, path_length};
pub use to_geojson::stop_locations;
