//! Per-route point files: a header row, then `id, lon, lat` rows

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::{
    Error, StopId,
    model::{Route, RouteDataset, RoutePoint},
};

/// Route files in `dir` with the given extension, sorted by file name
pub fn discover_route_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, Error> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!("Failed to read directory '{}': {}", dir.display(), e),
            )
        })?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| path.extension().is_some_and(|ext| ext == extension))
        .collect();

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Reads one route.
///
/// The header is kept as raw bytes, so it round-trips whatever its encoding.
/// Rows that do not hold exactly an integer id and two floats are skipped.
/// Stop ids must fit in an `i64`; larger ids are reported and skipped.
pub fn read_route<R: Read>(name: &str, reader: R) -> Result<Route, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Fields)
        .from_reader(reader);

    let header = reader.byte_headers()?.clone();

    let mut points = Vec::new();
    let mut skipped = 0;
    for (row, result) in reader.byte_records().enumerate() {
        let parsed = result.ok().and_then(|record| {
            if record.len() != 3 {
                return None;
            }
            match record.deserialize::<(StopId, f64, f64)>(None) {
                Ok(point) => Some(point),
                Err(_) => {
                    if record.get(0).is_some_and(is_out_of_range_id) {
                        warn!(
                            "{name}: row {}: stop id '{}' does not fit in 64 bits",
                            row + 1,
                            String::from_utf8_lossy(&record[0])
                        );
                    }
                    None
                }
            }
        });

        match parsed {
            Some((id, lon, lat)) => points.push(RoutePoint::new(id, lon, lat)),
            None => {
                debug!("{name}: skipping malformed row {}", row + 1);
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!("{name}: skipped {skipped} malformed rows");
    }

    Ok(Route::new(name, points).with_header(header))
}

/// An integer literal too large for a `StopId`
fn is_out_of_range_id(field: &[u8]) -> bool {
    let digits = field
        .strip_prefix(b"-")
        .or_else(|| field.strip_prefix(b"+"))
        .unwrap_or(field);
    let is_integer = !digits.is_empty() && digits.iter().all(u8::is_ascii_digit);
    is_integer
        && std::str::from_utf8(field)
            .ok()
            .and_then(|text| text.parse::<StopId>().ok())
            .is_none()
}

/// Writes a route back out: header verbatim, then every row
pub fn write_route<W: Write>(route: &Route, writer: W) -> Result<(), Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    if !route.header.is_empty() {
        writer.write_byte_record(&route.header)?;
    }
    for point in &route.points {
        writer.serialize((point.id, point.lon, point.lat))?;
    }
    writer.flush()?;
    Ok(())
}

fn route_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Loads every route file of a directory
///
/// # Errors
///
/// Returns an error if the directory or one of its route files cannot be read
pub fn load_route_dataset(dir: &Path, extension: &str) -> Result<RouteDataset, Error> {
    let files = discover_route_files(dir, extension)?;
    if files.is_empty() {
        return Err(Error::MissingRoutes(dir.to_path_buf()));
    }

    let mut dataset = RouteDataset::new();
    for path in files {
        let file = File::open(&path).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!("Failed to open file '{}': {}", path.display(), e),
            )
        })?;
        let route = read_route(&route_name(&path), file)?;
        debug!("Loaded {} rows from {}", route.len(), route.name);
        dataset.insert(route);
    }

    info!(
        "Loaded {} routes with {} points from {}",
        dataset.len(),
        dataset.point_count(),
        dir.display()
    );
    Ok(dataset)
}

/// Overwrites the route files in `dir` with the given dataset
pub fn save_route_dataset(dir: &Path, dataset: &RouteDataset) -> Result<(), Error> {
    for route in dataset.iter() {
        let path = dir.join(&route.name);
        let file = File::create(&path).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!("Failed to create file '{}': {}", path.display(), e),
            )
        })?;
        write_route(route, file)?;
    }
    info!("Rewrote {} route files in {}", dataset.len(), dir.display());
    Ok(())
}
