//! Data model for route traces and the resulting stop graph

pub mod adjacency;
pub mod chain;
pub mod route;

pub use adjacency::AdjacencyMatrix;
pub use chain::{ParseChainError, RouteChain, RouteChains};
pub use route::{Route, RouteDataset, RoutePoint, SHAPE_POINT_ID};
