use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Invalid stop chain for route '{route}': {reason}")]
    InvalidChain { route: String, reason: String },
    #[error("Invalid coordinate: lon {lon}, lat {lat}")]
    InvalidCoordinate { lon: f64, lat: f64 },
    #[error("No route files found in {}", .0.display())]
    MissingRoutes(PathBuf),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
}
