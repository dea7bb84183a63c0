use log::info;
use serde::Serialize;

use super::config::StopGraphConfig;
use super::routes::{load_route_dataset, save_route_dataset};
use super::tables::{load_route_chains, save_adjacency_matrix, save_route_chains};
use crate::{
    Error,
    canonical::{
        ClusteringReport, DuplicateLocationMap, canonicalize_routes, cluster_stops,
        rebuild_route_chains,
    },
    distance::DistanceOracle,
    graph::{AdjacencyReport, build_adjacency_matrix, stop_locations},
    model::{AdjacencyMatrix, RouteChains},
};

/// Outcome of a canonicalization run
#[derive(Debug, Clone, Serialize)]
pub struct CanonicalizationReport {
    pub routes: usize,
    pub clustering: ClusteringReport,
    /// Route rows whose stop id was replaced
    pub rows_rewritten: usize,
    #[serde(skip)]
    pub chains: RouteChains,
}

/// Outcome of a stop graph run
#[derive(Debug, Clone, Serialize)]
pub struct StopGraphReport {
    pub duplicate_locations: usize,
    pub adjacency: AdjacencyReport,
    #[serde(skip)]
    pub matrix: AdjacencyMatrix,
}

/// Merges nearby stops across all route files and writes the canonical data back.
///
/// Route files are rewritten in place and the chain table is replaced.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or route data cannot be
/// read or written
pub fn canonicalize_dataset(
    config: &StopGraphConfig,
    oracle: &dyn DistanceOracle,
) -> Result<CanonicalizationReport, Error> {
    config.validate()?;

    info!("Loading route data from {}", config.routes_dir.display());
    let mut dataset = load_route_dataset(&config.routes_dir, &config.file_extension)?;

    let (mut forest, clustering) =
        cluster_stops(&dataset.all_stops(), &config.clustering_options(), oracle);

    let chains = rebuild_route_chains(&dataset, &mut forest);
    let rows_rewritten = canonicalize_routes(&mut dataset, &mut forest);
    info!("Replaced stop ids in {rows_rewritten} route rows");

    save_route_chains(&config.chains_path, &chains)?;
    save_route_dataset(&config.routes_dir, &dataset)?;

    Ok(CanonicalizationReport {
        routes: dataset.len(),
        clustering,
        rows_rewritten,
        chains,
    })
}

/// Builds the stop graph from the chain table and the (canonical) route files.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, an input cannot be read
/// or an output cannot be written
pub fn build_stop_graph(
    config: &StopGraphConfig,
    oracle: &dyn DistanceOracle,
) -> Result<StopGraphReport, Error> {
    config.validate()?;

    let chains = load_route_chains(&config.chains_path)?;
    let dataset = load_route_dataset(&config.routes_dir, &config.file_extension)?;

    let duplicates = DuplicateLocationMap::build(&dataset);
    let (matrix, adjacency) =
        build_adjacency_matrix(&chains, &dataset, &duplicates, oracle, config.parallel);

    save_adjacency_matrix(&config.adjacency_path, &matrix)?;

    if let Some(path) = &config.geojson_path {
        let geojson = matrix.to_geojson_string(&stop_locations(&dataset))?;
        std::fs::write(path, geojson)?;
        info!("Saved stop graph GeoJSON to {}", path.display());
    }

    Ok(StopGraphReport {
        duplicate_locations: duplicates.duplicate_count(),
        adjacency,
        matrix,
    })
}
