//! Summary tables: canonical route chains and the adjacency matrix

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    Error, StopId,
    model::{AdjacencyMatrix, RouteChain, RouteChains},
};

#[derive(Debug, Serialize, Deserialize)]
struct ChainRecord {
    #[serde(rename = "Route")]
    route: String,
    #[serde(rename = "Stop Chain")]
    stop_chain: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct AdjacencyRecord {
    #[serde(rename = "From")]
    from: StopId,
    #[serde(rename = "To")]
    to: StopId,
    #[serde(rename = "Distance (meters)")]
    distance: f64,
}

/// Rounds to centimeters, as stored in the adjacency table
pub fn round_meters(meters: f64) -> f64 {
    (meters * 100.0).round() / 100.0
}

pub fn write_route_chains<W: Write>(chains: &RouteChains, writer: W) -> Result<(), Error> {
    let mut writer = csv::Writer::from_writer(writer);
    if chains.is_empty() {
        writer.write_record(["Route", "Stop Chain"])?;
    }
    for (route, chain) in chains {
        writer.serialize(ChainRecord {
            route: route.clone(),
            stop_chain: chain.to_string(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads the chain table; rows with a malformed chain are skipped
pub fn read_route_chains<R: Read>(reader: R) -> Result<RouteChains, Error> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut chains = RouteChains::new();

    for result in reader.deserialize::<ChainRecord>() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping unreadable chain row: {e}");
                continue;
            }
        };

        match record.stop_chain.parse::<RouteChain>() {
            Ok(chain) => {
                chains.insert(record.route, chain);
            }
            Err(reason) => {
                let error = Error::InvalidChain {
                    route: record.route,
                    reason: reason.to_string(),
                };
                warn!("Skipping chain row: {error}");
            }
        }
    }

    Ok(chains)
}

pub fn write_adjacency_matrix<W: Write>(matrix: &AdjacencyMatrix, writer: W) -> Result<(), Error> {
    let mut writer = csv::Writer::from_writer(writer);
    if matrix.is_empty() {
        writer.write_record(["From", "To", "Distance (meters)"])?;
    }
    for (from, to, meters) in matrix.edges() {
        writer.serialize(AdjacencyRecord {
            from,
            to,
            distance: round_meters(meters),
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads a previously written adjacency table
pub fn read_adjacency_matrix<R: Read>(reader: R) -> Result<AdjacencyMatrix, Error> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut matrix = AdjacencyMatrix::new();
    for result in reader.deserialize::<AdjacencyRecord>() {
        match result {
            Ok(record) => {
                matrix.insert(record.from, record.to, record.distance);
            }
            Err(e) => warn!("Skipping unreadable adjacency row: {e}"),
        }
    }
    Ok(matrix)
}

fn create_file(path: &Path) -> Result<File, Error> {
    File::create(path).map_err(|e| {
        Error::IoError(std::io::Error::new(
            e.kind(),
            format!("Failed to create file '{}': {}", path.display(), e),
        ))
    })
}

fn open_file(path: &Path) -> Result<File, Error> {
    File::open(path).map_err(|e| {
        Error::IoError(std::io::Error::new(
            e.kind(),
            format!("Failed to open file '{}': {}", path.display(), e),
        ))
    })
}

pub fn save_route_chains(path: &Path, chains: &RouteChains) -> Result<(), Error> {
    write_route_chains(chains, create_file(path)?)?;
    info!("Saved {} route chains to {}", chains.len(), path.display());
    Ok(())
}

pub fn load_route_chains(path: &Path) -> Result<RouteChains, Error> {
    let chains = read_route_chains(open_file(path)?)?;
    info!("Loaded {} route chains from {}", chains.len(), path.display());
    Ok(chains)
}

pub fn save_adjacency_matrix(path: &Path, matrix: &AdjacencyMatrix) -> Result<(), Error> {
    write_adjacency_matrix(matrix, create_file(path)?)?;
    info!(
        "Saved {} adjacency edges to {}",
        matrix.edge_count(),
        path.display()
    );
    Ok(())
}

pub fn load_adjacency_matrix(path: &Path) -> Result<AdjacencyMatrix, Error> {
    read_adjacency_matrix(open_file(path)?)
}
