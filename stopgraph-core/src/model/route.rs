//! Route point data as read from the per-route files

use std::collections::BTreeMap;

use csv::ByteRecord;
use geo::Point;
use serde::{Deserialize, Serialize};

use crate::StopId;

/// Identifier carried by shape points
pub const SHAPE_POINT_ID: StopId = 0;

/// One row of a route file
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    pub id: StopId,
    pub lon: f64,
    pub lat: f64,
}

impl RoutePoint {
    pub fn new(id: StopId, lon: f64, lat: f64) -> Self {
        Self { id, lon, lat }
    }

    /// Stops are boarding locations, everything else only describes the path
    pub fn is_stop(&self) -> bool {
        self.id != SHAPE_POINT_ID
    }

    pub fn geometry(&self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }
}

/// A single route in traversal order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Route {
    /// File name the route was read from, used as the route key
    pub name: String,
    /// Header row as raw bytes, written back verbatim whatever its encoding
    pub header: ByteRecord,
    /// Full row sequence: stops and shape points
    pub points: Vec<RoutePoint>,
}

impl Route {
    pub fn new(name: impl Into<String>, points: Vec<RoutePoint>) -> Self {
        Self {
            name: name.into(),
            header: ByteRecord::new(),
            points,
        }
    }

    pub fn with_header(mut self, header: ByteRecord) -> Self {
        self.header = header;
        self
    }

    /// Stop subsequence of the route
    pub fn stops(&self) -> impl Iterator<Item = &RoutePoint> {
        self.points.iter().filter(|point| point.is_stop())
    }

    /// Raw stop ids in visiting order, repeats included
    pub fn stop_ids(&self) -> Vec<StopId> {
        self.stops().map(|point| point.id).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// All routes of one input directory, keyed and ordered by file name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteDataset {
    pub routes: BTreeMap<String, Route>,
}

impl RouteDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, route: Route) {
        self.routes.insert(route.name.clone(), route);
    }

    pub fn get(&self, name: &str) -> Option<&Route> {
        self.routes.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.values()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Every stop point of every route, in file then row order
    pub fn all_stops(&self) -> Vec<RoutePoint> {
        self.iter().flat_map(|route| route.stops().copied()).collect()
    }

    pub fn point_count(&self) -> usize {
        self.iter().map(Route::len).sum()
    }
}

impl FromIterator<Route> for RouteDataset {
    fn from_iter<I: IntoIterator<Item = Route>>(iter: I) -> Self {
        let mut dataset = Self::new();
        for route in iter {
            dataset.insert(route);
        }
        dataset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_route() -> Route {
        Route::new(
            "10.csv",
            vec![
                RoutePoint::new(4, 10.0, 50.0),
                RoutePoint::new(0, 10.1, 50.0),
                RoutePoint::new(9, 10.2, 50.0),
                RoutePoint::new(0, 10.3, 50.0),
                RoutePoint::new(4, 10.4, 50.0),
            ],
        )
        .with_header(ByteRecord::from(vec!["id", "lon", "lat"]))
    }

    #[test]
    fn test_stop_subsequence_skips_shape_points() {
        let route = sample_route();
        assert_eq!(route.stop_ids(), vec![4, 9, 4]);
        assert_eq!(route.len(), 5);
    }

    #[test]
    fn test_dataset_orders_routes_by_name() {
        let mut second = sample_route();
        second.name = "02.csv".into();
        let dataset: RouteDataset = [sample_route(), second].into_iter().collect();

        let names: Vec<_> = dataset.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["02.csv", "10.csv"]);
        assert_eq!(dataset.all_stops().len(), 6);
        assert_eq!(dataset.point_count(), 10);
    }
}
