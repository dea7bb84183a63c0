use geo::{Point, line_string};
use geojson::{Feature, FeatureCollection, Geometry, Value as GeoJsonValue};
use hashbrown::HashMap;

use crate::{
    Error, StopId,
    loading::tables::round_meters,
    model::{AdjacencyMatrix, RouteDataset},
};

/// First location seen for every stop id, in route then row order
pub fn stop_locations(dataset: &RouteDataset) -> HashMap<StopId, Point<f64>> {
    let mut locations = HashMap::new();
    for stop in dataset.iter().flat_map(|route| route.stops()) {
        locations.entry(stop.id).or_insert_with(|| stop.geometry());
    }
    locations
}

impl AdjacencyMatrix {
    /// Converts the matrix to a `GeoJSON` `FeatureCollection`, one straight
    /// `LineString` per edge.
    ///
    /// Edges with an endpoint missing from `locations` are left out.
    pub fn to_geojson(&self, locations: &HashMap<StopId, Point<f64>>) -> FeatureCollection {
        let features = self
            .edges()
            .filter_map(|(from, to, meters)| {
                let from_loc = locations.get(&from)?;
                let to_loc = locations.get(&to)?;
                Some(create_edge_feature(from, to, meters, from_loc, to_loc))
            })
            .collect();

        FeatureCollection {
            features,
            bbox: None,
            foreign_members: None,
        }
    }

    pub fn to_geojson_string(
        &self,
        locations: &HashMap<StopId, Point<f64>>,
    ) -> Result<String, Error> {
        serde_json::to_string(&self.to_geojson(locations))
            .map_err(|e| Error::GeoJsonError(e.to_string()))
    }
}

fn create_edge_feature(
    from: StopId,
    to: StopId,
    meters: f64,
    from_loc: &Point<f64>,
    to_loc: &Point<f64>,
) -> Feature {
    let line = line_string![
        (x: from_loc.x(), y: from_loc.y()),
        (x: to_loc.x(), y: to_loc.y())
    ];

    let mut feature = Feature::from(Geometry::new(GeoJsonValue::from(&line)));
    feature.set_property("from", from);
    feature.set_property("to", to);
    feature.set_property("distance_m", round_meters(meters));
    feature
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Route, RoutePoint};
    use serde_json::json;

    #[test]
    fn test_edges_become_line_strings() {
        let dataset: RouteDataset = [Route::new(
            "r.csv",
            vec![
                RoutePoint::new(1, 10.0, 50.0),
                RoutePoint::new(0, 10.5, 50.0),
                RoutePoint::new(2, 11.0, 50.0),
                RoutePoint::new(1, 12.0, 50.0),
            ],
        )]
        .into_iter()
        .collect();
        let locations = stop_locations(&dataset);
        assert_eq!(locations[&1], Point::new(10.0, 50.0));
        assert_eq!(locations.len(), 2);

        let mut matrix = AdjacencyMatrix::new();
        matrix.insert(1, 2, 71_555.123);
        matrix.insert(2, 99, 10.0);

        let collection = matrix.to_geojson(&locations);
        assert_eq!(collection.features.len(), 1);

        let feature = &collection.features[0];
        assert_eq!(feature.property("from"), Some(&json!(1)));
        assert_eq!(feature.property("distance_m"), Some(&json!(71_555.12)));
        let geometry = serde_json::to_value(feature.geometry.as_ref().unwrap()).unwrap();
        assert_eq!(geometry["type"], json!("LineString"));
        assert_eq!(geometry["coordinates"], json!([[10.0, 50.0], [11.0, 50.0]]));

        let text = matrix.to_geojson_string(&locations).unwrap();
        assert!(text.contains("FeatureCollection"));
    }

    #[test]
    fn test_distance_property_matches_adjacency_table() {
        use crate::loading::tables::{read_adjacency_matrix, write_adjacency_matrix};

        let locations: HashMap<StopId, Point<f64>> =
            [(3, Point::new(0.0, 0.0)), (4, Point::new(0.001, 0.0))].into_iter().collect();
        let mut matrix = AdjacencyMatrix::new();
        matrix.insert(3, 4, 111.194_999);
        matrix.insert(4, 3, 0.005);

        let mut buffer = Vec::new();
        write_adjacency_matrix(&matrix, &mut buffer).unwrap();
        let stored = read_adjacency_matrix(buffer.as_slice()).unwrap();

        let collection = matrix.to_geojson(&locations);
        assert_eq!(collection.features.len(), 2);
        for feature in &collection.features {
            let from = feature.property("from").and_then(|v| v.as_i64()).unwrap();
            let to = feature.property("to").and_then(|v| v.as_i64()).unwrap();
            let distance = feature.property("distance_m").and_then(|v| v.as_f64()).unwrap();
            assert_eq!(Some(distance), stored.get(from, to));
        }
    }
}
