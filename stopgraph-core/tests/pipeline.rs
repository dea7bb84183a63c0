use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use approx::assert_relative_eq;
use stopgraph_core::graph::path_length;
use stopgraph_core::loading::routes::read_route;
use stopgraph_core::loading::tables::{load_adjacency_matrix, round_meters};
use stopgraph_core::prelude::*;

static SCRATCH_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Fresh directory layout: `<scratch>/routes/*.csv` plus room for the tables
struct Scratch {
    root: PathBuf,
}

impl Scratch {
    fn new(name: &str) -> Self {
        let id = SCRATCH_COUNTER.fetch_add(1, Ordering::SeqCst);
        let root = std::env::temp_dir().join(format!(
            "stopgraph-{name}-{}-{id}",
            std::process::id()
        ));
        if root.exists() {
            fs::remove_dir_all(&root).unwrap();
        }
        fs::create_dir_all(root.join("routes")).unwrap();
        Self { root }
    }

    fn routes_dir(&self) -> PathBuf {
        self.root.join("routes")
    }

    fn write_route(&self, name: &str, contents: &str) {
        fs::write(self.routes_dir().join(name), contents).unwrap();
    }

    fn read_route(&self, name: &str) -> String {
        fs::read_to_string(self.routes_dir().join(name)).unwrap()
    }

    fn config(&self, tolerance: f64) -> StopGraphConfig {
        StopGraphConfig {
            max_distance_meters: tolerance,
            chains_path: self.root.join("route_chains.csv"),
            adjacency_path: self.root.join("adjacency_matrix.csv"),
            geojson_path: Some(self.root.join("graph.geojson")),
            ..StopGraphConfig::new(self.routes_dir())
        }
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

const ROUTE_A: &str = "id,lon,lat\n\
101,30.3,59.93\n\
0,30.301,59.9302\n\
0,30.303,59.9302\n\
102,30.305,59.93\n";

// 201 sits about a meter east of 101
const ROUTE_B: &str = "id,lon,lat\n\
201,30.30002,59.93\n\
0,30.305,59.9295\n\
not,a,row\n\
202,30.31,59.93\n";

fn seed(scratch: &Scratch) {
    scratch.write_route("a.csv", ROUTE_A);
    scratch.write_route("b.csv", ROUTE_B);
    scratch.write_route("notes.txt", "not a route");
}

fn points(route: &str) -> Vec<RoutePoint> {
    read_route("r.csv", route.as_bytes()).unwrap().points
}

#[test]
fn test_canonicalize_merges_nearby_stops() {
    let scratch = Scratch::new("merge");
    seed(&scratch);

    let report = canonicalize_dataset(&scratch.config(5.0), &GeodesicOracle).unwrap();
    assert_eq!(report.routes, 2);
    assert_eq!(report.clustering.merges, 1);
    assert_eq!(report.rows_rewritten, 1);
    assert_eq!(report.chains["a.csv"].stops(), &[101, 102]);
    assert_eq!(report.chains["b.csv"].stops(), &[101, 202]);

    // Header kept, id replaced, shape rows and coordinates untouched, junk dropped
    assert_eq!(
        scratch.read_route("b.csv"),
        "id,lon,lat\n101,30.30002,59.93\n0,30.305,59.9295\n202,30.31,59.93\n"
    );
    assert_eq!(scratch.read_route("a.csv"), ROUTE_A);
    assert_eq!(
        fs::read_to_string(scratch.routes_dir().join("notes.txt")).unwrap(),
        "not a route"
    );

    let chains = fs::read_to_string(scratch.root.join("route_chains.csv")).unwrap();
    assert_eq!(
        chains,
        "Route,Stop Chain\na.csv,\"[101, 102]\"\nb.csv,\"[101, 202]\"\n"
    );
}

#[test]
fn test_canonicalize_twice_is_a_no_op() {
    let scratch = Scratch::new("idempotent");
    seed(&scratch);
    let config = scratch.config(60.0);

    canonicalize_dataset(&config, &GeodesicOracle).unwrap();
    let first_a = scratch.read_route("a.csv");
    let first_b = scratch.read_route("b.csv");

    let second = canonicalize_dataset(&config, &GeodesicOracle).unwrap();
    assert_eq!(second.clustering.merges, 0);
    assert_eq!(second.rows_rewritten, 0);
    assert_eq!(scratch.read_route("a.csv"), first_a);
    assert_eq!(scratch.read_route("b.csv"), first_b);
}

#[test]
fn test_zero_tolerance_keeps_distinct_locations() {
    let scratch = Scratch::new("zero");
    seed(&scratch);
    scratch.write_route("c.csv", "id,lon,lat\n305,30.31,59.93\n306,30.4,59.9\n");

    let report = canonicalize_dataset(&scratch.config(0.0), &GeodesicOracle).unwrap();
    // Only 305, exactly on top of 202, is merged
    assert_eq!(report.clustering.merges, 1);
    assert_eq!(report.chains["c.csv"].stops(), &[202, 306]);
    assert_eq!(report.chains["b.csv"].stops(), &[201, 202]);
}

#[test]
fn test_stop_graph_integrates_shape_distance() {
    let scratch = Scratch::new("graph");
    seed(&scratch);
    let config = scratch.config(5.0);

    canonicalize_dataset(&config, &GeodesicOracle).unwrap();
    let report = build_stop_graph(&config, &GeodesicOracle).unwrap();

    let along_a = path_length(&points(ROUTE_A), &GeodesicOracle).unwrap();
    let rewritten_b = points(&scratch.read_route("b.csv"));
    let along_b = path_length(&rewritten_b, &GeodesicOracle).unwrap();

    let matrix = &report.matrix;
    assert_eq!(matrix.edge_count(), 2);
    assert_relative_eq!(matrix.get(101, 102).unwrap(), along_a);
    assert_relative_eq!(matrix.get(101, 202).unwrap(), along_b);
    assert!(along_a > 280.0 && along_a < 292.0);

    let stored = load_adjacency_matrix(&config.adjacency_path).unwrap();
    assert_eq!(stored.get(101, 102), Some(round_meters(along_a)));
    assert_eq!(stored.get(101, 202), Some(round_meters(along_b)));

    let geojson = fs::read_to_string(scratch.root.join("graph.geojson")).unwrap();
    assert!(geojson.contains("\"distance_m\""));
}

#[test]
fn test_stop_graph_skips_routes_without_points() {
    let scratch = Scratch::new("missing");
    seed(&scratch);
    let config = scratch.config(5.0);
    fs::write(
        &config.chains_path,
        "Route,Stop Chain\na.csv,\"[101, 102]\"\ngone.csv,\"[1, 2]\"\nbad.csv,\"[1; 2]\"\n",
    )
    .unwrap();

    let report = build_stop_graph(&config, &GeodesicOracle).unwrap();
    assert_eq!(report.adjacency.routes_skipped, 1);
    assert_eq!(report.adjacency.routes_processed, 1);
    assert_eq!(report.matrix.edge_count(), 1);
}

#[test]
fn test_legacy_encoded_header_survives_canonicalization() {
    let scratch = Scratch::new("latin1");
    seed(&scratch);
    let path = scratch.routes_dir().join("c.csv");
    fs::write(&path, b"id,L\xe4ngengrad,Breitengrad\n301,30.30001,59.93\n").unwrap();

    let report = canonicalize_dataset(&scratch.config(5.0), &GeodesicOracle).unwrap();
    assert_eq!(report.routes, 3);
    assert_eq!(report.chains["c.csv"].stops(), &[101]);
    assert_eq!(
        fs::read(&path).unwrap(),
        b"id,L\xe4ngengrad,Breitengrad\n101,30.30001,59.93\n".to_vec()
    );
}

#[test]
fn test_stop_graph_requires_chain_table() {
    let scratch = Scratch::new("nochains");
    seed(&scratch);

    let result = build_stop_graph(&scratch.config(5.0), &GeodesicOracle);
    assert!(matches!(result, Err(Error::IoError(_))));
}

#[test]
fn test_empty_directory_is_an_error() {
    let scratch = Scratch::new("empty");
    let result = canonicalize_dataset(&scratch.config(5.0), &GeodesicOracle);
    assert!(matches!(result, Err(Error::MissingRoutes(path)) if path == scratch.routes_dir()));
}

#[test]
fn test_rtree_candidates_match_exhaustive() {
    let exhaustive = Scratch::new("exhaustive");
    let rtree = Scratch::new("rtree");
    for scratch in [&exhaustive, &rtree] {
        seed(scratch);
        scratch.write_route(
            "c.csv",
            "id,lon,lat\n7,30.30001,59.93001\n8,30.3051,59.9300\n9,30.5,59.5\n",
        );
    }

    let exhaustive_report =
        canonicalize_dataset(&exhaustive.config(60.0), &GeodesicOracle).unwrap();
    let mut rtree_config = rtree.config(60.0);
    rtree_config.candidates = CandidateStrategy::RTree;
    let rtree_report = canonicalize_dataset(&rtree_config, &GeodesicOracle).unwrap();

    assert_eq!(exhaustive_report.chains, rtree_report.chains);
    assert_eq!(exhaustive_report.clustering.merges, rtree_report.clustering.merges);
    assert!(rtree_report.clustering.pairs_evaluated < exhaustive_report.clustering.pairs_evaluated);
    assert_eq!(exhaustive_report.chains["c.csv"].stops(), &[7, 8, 9]);
    assert_eq!(exhaustive_report.chains["a.csv"].stops(), &[7, 8]);

    for name in ["a.csv", "b.csv", "c.csv"] {
        assert_eq!(exhaustive.read_route(name), rtree.read_route(name));
    }
}
