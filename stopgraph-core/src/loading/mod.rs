//! This module is responsible for reading and writing route data and
//! summary tables, and for running the two pipelines over a directory.

mod builder;
mod config;
pub mod routes;
pub mod tables;

pub use builder::{
    CanonicalizationReport, StopGraphReport, build_stop_graph, canonicalize_dataset,
};
pub use config::StopGraphConfig;
