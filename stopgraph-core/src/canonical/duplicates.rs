use hashbrown::HashMap;
use log::{debug, info};

use crate::{StopId, model::RouteDataset};

/// Exact coordinate key; `-0.0` and `0.0` compare equal
fn location_key(lon: f64, lat: f64) -> Option<(u64, u64)> {
    if lon.is_nan() || lat.is_nan() {
        return None;
    }
    let normalize = |v: f64| if v == 0.0 { 0.0_f64.to_bits() } else { v.to_bits() };
    Some((normalize(lon), normalize(lat)))
}

/// Maps stop ids that sit at exactly the same coordinate as an earlier stop
/// to that earlier stop's id.
///
/// Independent of tolerance based clustering; no distance is involved.
#[derive(Debug, Clone, Default)]
pub struct DuplicateLocationMap {
    mapping: HashMap<StopId, StopId>,
}

impl DuplicateLocationMap {
    /// Scans routes in name order and rows in file order.
    ///
    /// The first id seen at a coordinate represents it. An id occurring at
    /// several coordinates takes the representative of its last occurrence.
    pub fn build(dataset: &RouteDataset) -> Self {
        let mut representatives: HashMap<(u64, u64), StopId> = HashMap::new();
        let mut mapping = HashMap::new();

        for point in dataset.iter().flat_map(|route| route.stops()) {
            let representative = match location_key(point.lon, point.lat) {
                Some(key) => *representatives.entry(key).or_insert(point.id),
                None => point.id,
            };
            mapping.insert(point.id, representative);
        }

        let map = Self { mapping };
        info!(
            "Found {} stop ids sharing a location with another id",
            map.duplicate_count()
        );
        debug!("{} stop ids indexed by location", map.mapping.len());
        map
    }

    /// Representative of `id`; ids never seen map to themselves
    pub fn get(&self, id: StopId) -> StopId {
        self.mapping.get(&id).copied().unwrap_or(id)
    }

    /// Number of ids mapped to some other id
    pub fn duplicate_count(&self) -> usize {
        self.mapping.iter().filter(|(id, rep)| id != rep).count()
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Route, RoutePoint};

    fn route(name: &str, points: Vec<RoutePoint>) -> Route {
        Route::new(name, points)
    }

    #[test]
    fn test_first_id_at_location_wins() {
        let dataset: RouteDataset = [
            route(
                "1.csv",
                vec![
                    RoutePoint::new(201, 10.0, 20.0),
                    RoutePoint::new(0, 10.0, 20.0),
                    RoutePoint::new(300, 11.0, 20.0),
                ],
            ),
            route(
                "2.csv",
                vec![
                    RoutePoint::new(101, 10.0, 20.0),
                    RoutePoint::new(301, 11.000001, 20.0),
                ],
            ),
        ]
        .into_iter()
        .collect();

        let map = DuplicateLocationMap::build(&dataset);
        assert_eq!(map.get(101), 201);
        assert_eq!(map.get(201), 201);
        // Exact match only, no tolerance
        assert_eq!(map.get(301), 301);
        assert_eq!(map.get(0), 0);
        assert_eq!(map.get(999), 999);
        assert_eq!(map.duplicate_count(), 1);
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn test_signed_zero_is_same_location() {
        let dataset: RouteDataset = [route(
            "1.csv",
            vec![
                RoutePoint::new(4, 0.0, 51.0),
                RoutePoint::new(6, -0.0, 51.0),
            ],
        )]
        .into_iter()
        .collect();

        assert_eq!(DuplicateLocationMap::build(&dataset).get(6), 4);
    }

    #[test]
    fn test_last_occurrence_decides_for_repeated_id() {
        let dataset: RouteDataset = [route(
            "1.csv",
            vec![
                RoutePoint::new(9, 1.0, 1.0),
                RoutePoint::new(5, 2.0, 2.0),
                RoutePoint::new(5, 1.0, 1.0),
            ],
        )]
        .into_iter()
        .collect();

        let map = DuplicateLocationMap::build(&dataset);
        assert_eq!(map.get(5), 9);
        assert_eq!(map.get(9), 9);
    }
}
