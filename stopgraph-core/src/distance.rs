//! Distance between two route points in meters

use geo::{Distance, Geodesic, Haversine};
use serde::{Deserialize, Serialize};

use crate::{Error, model::RoutePoint};

/// Source of point-to-point distances used by clustering and edge synthesis
///
/// Implementations must be symmetric and non-negative.
pub trait DistanceOracle: Sync {
    fn distance(&self, a: &RoutePoint, b: &RoutePoint) -> Result<f64, Error>;
}

/// Ellipsoidal distance on WGS84 (Karney)
#[derive(Debug, Clone, Copy, Default)]
pub struct GeodesicOracle;

/// Great-circle distance on a spherical earth
#[derive(Debug, Clone, Copy, Default)]
pub struct HaversineOracle;

impl DistanceOracle for GeodesicOracle {
    fn distance(&self, a: &RoutePoint, b: &RoutePoint) -> Result<f64, Error> {
        validate_coordinate(a)?;
        validate_coordinate(b)?;
        Ok(Geodesic.distance(a.geometry(), b.geometry()))
    }
}

impl DistanceOracle for HaversineOracle {
    fn distance(&self, a: &RoutePoint, b: &RoutePoint) -> Result<f64, Error> {
        validate_coordinate(a)?;
        validate_coordinate(b)?;
        Ok(Haversine.distance(a.geometry(), b.geometry()))
    }
}

/// Distance metric selectable from configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    #[default]
    Geodesic,
    Haversine,
}

impl DistanceOracle for DistanceMetric {
    fn distance(&self, a: &RoutePoint, b: &RoutePoint) -> Result<f64, Error> {
        match self {
            DistanceMetric::Geodesic => GeodesicOracle.distance(a, b),
            DistanceMetric::Haversine => HaversineOracle.distance(a, b),
        }
    }
}

impl std::str::FromStr for DistanceMetric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "geodesic" => Ok(DistanceMetric::Geodesic),
            "haversine" => Ok(DistanceMetric::Haversine),
            other => Err(Error::InvalidData(format!("Unknown distance metric: {other}"))),
        }
    }
}

fn validate_coordinate(point: &RoutePoint) -> Result<(), Error> {
    let valid = point.lon.is_finite()
        && point.lat.is_finite()
        && (-180.0..=180.0).contains(&point.lon)
        && (-90.0..=90.0).contains(&point.lat);

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidCoordinate {
            lon: point.lon,
            lat: point.lat,
        })
    }
}
