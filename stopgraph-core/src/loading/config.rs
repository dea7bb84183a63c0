use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    Error,
    canonical::{CandidateStrategy, ClusteringOptions},
    distance::DistanceMetric,
};

/// Configuration of both pipelines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StopGraphConfig {
    /// Directory holding one file per route
    pub routes_dir: PathBuf,
    /// Extension of route files, without the dot
    pub file_extension: String,
    /// Clustering tolerance in meters
    pub max_distance_meters: f64,
    /// Canonical chain table (`Route`, `Stop Chain`)
    pub chains_path: PathBuf,
    /// Adjacency table (`From`, `To`, `Distance (meters)`)
    pub adjacency_path: PathBuf,
    /// Optional `GeoJSON` export of the stop graph
    pub geojson_path: Option<PathBuf>,
    pub candidates: CandidateStrategy,
    pub distance: DistanceMetric,
    /// Use the rayon pool for pair evaluation and edge computation
    pub parallel: bool,
}

impl Default for StopGraphConfig {
    fn default() -> Self {
        Self {
            routes_dir: PathBuf::from("routes"),
            file_extension: "csv".to_string(),
            max_distance_meters: 60.0,
            chains_path: PathBuf::from("route_chains.csv"),
            adjacency_path: PathBuf::from("adjacency_matrix.csv"),
            geojson_path: None,
            candidates: CandidateStrategy::default(),
            distance: DistanceMetric::default(),
            parallel: true,
        }
    }
}

impl StopGraphConfig {
    pub fn new(routes_dir: impl AsRef<Path>) -> Self {
        Self {
            routes_dir: routes_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn clustering_options(&self) -> ClusteringOptions {
        ClusteringOptions {
            max_distance_meters: self.max_distance_meters,
            candidates: self.candidates,
            parallel: self.parallel,
        }
    }

    /// Checks the configuration before any data is touched
    ///
    /// # Errors
    ///
    /// Returns an error if the route directory is missing or the tolerance
    /// is negative or not finite
    pub fn validate(&self) -> Result<(), Error> {
        if !self.routes_dir.is_dir() {
            return Err(Error::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Route directory not found: {}", self.routes_dir.display()),
            )));
        }

        if !self.max_distance_meters.is_finite() || self.max_distance_meters < 0.0 {
            return Err(Error::InvalidData(format!(
                "Clustering tolerance must be a non-negative number of meters, got {}",
                self.max_distance_meters
            )));
        }

        if self.file_extension.is_empty() {
            return Err(Error::InvalidData(
                "No route file extension provided in the configuration".to_string(),
            ));
        }

        Ok(())
    }
}
