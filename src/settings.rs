//! Run configuration: optional TOML file, then command line overrides

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use stopgraph_core::prelude::*;

/// Flags shared by every command; each one overrides the config file
#[derive(Args, Debug, Clone, Default)]
pub struct Overrides {
    /// Directory holding one CSV file per route
    #[arg(long)]
    pub routes_dir: Option<PathBuf>,
    /// Extension of route files
    #[arg(long)]
    pub extension: Option<String>,
    /// Clustering tolerance in meters
    #[arg(long, short = 't')]
    pub tolerance: Option<f64>,
    /// Route chain table
    #[arg(long)]
    pub chains: Option<PathBuf>,
    /// Adjacency table
    #[arg(long)]
    pub adjacency: Option<PathBuf>,
    /// Also export the stop graph as GeoJSON
    #[arg(long)]
    pub geojson: Option<PathBuf>,
    /// Candidate pair generator: exhaustive or rtree
    #[arg(long)]
    pub candidates: Option<CandidateStrategy>,
    /// Distance metric: geodesic or haversine
    #[arg(long)]
    pub metric: Option<DistanceMetric>,
    /// Compare stop pairs and compute graph edges on a single thread
    #[arg(long)]
    pub sequential: bool,
}

/// Reads the TOML config if given, otherwise starts from defaults
pub fn load_config(path: Option<&Path>) -> Result<StopGraphConfig, Error> {
    let Some(path) = path else {
        return Ok(StopGraphConfig::default());
    };

    let text = fs::read_to_string(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("Failed to read config '{}': {}", path.display(), e),
        )
    })?;
    toml::from_str(&text).map_err(|e| {
        Error::InvalidData(format!("Invalid config '{}': {}", path.display(), e))
    })
}

impl Overrides {
    pub fn apply(self, mut config: StopGraphConfig) -> StopGraphConfig {
        if let Some(dir) = self.routes_dir {
            config.routes_dir = dir;
        }
        if let Some(extension) = self.extension {
            config.file_extension = extension.trim_start_matches('.').to_string();
        }
        if let Some(tolerance) = self.tolerance {
            config.max_distance_meters = tolerance;
        }
        if let Some(chains) = self.chains {
            config.chains_path = chains;
        }
        if let Some(adjacency) = self.adjacency {
            config.adjacency_path = adjacency;
        }
        if self.geojson.is_some() {
            config.geojson_path = self.geojson;
        }
        if let Some(candidates) = self.candidates {
            config.candidates = candidates;
        }
        if let Some(metric) = self.metric {
            config.distance = metric;
        }
        if self.sequential {
            config.parallel = false;
        }
        config
    }
}
