pub use crate::{Error, StopId};

// Re-export key components
pub use crate::canonical::{
    CandidateStrategy, ClusteringOptions, ClusteringReport, DuplicateLocationMap, StopUnionFind,
    canonicalize_routes, cluster_stops, rebuild_route_chains,
};
pub use crate::distance::{DistanceMetric, DistanceOracle, GeodesicOracle, HaversineOracle};
pub use crate::graph::{AdjacencyReport, build_adjacency_matrix};
pub use crate::loading::{
    CanonicalizationReport, StopGraphConfig, StopGraphReport, build_stop_graph,
    canonicalize_dataset,
};
pub use crate::model::{AdjacencyMatrix, Route, RouteChain, RouteChains, RouteDataset, RoutePoint};
