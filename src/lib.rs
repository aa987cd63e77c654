//! Decirank
//!
//! Fixed-point PageRank over plain-text edge lists.
//!
//! # Architecture
//!
//! - `decirank-algorithms`: the I/O-free core (decimal type, graph arena, engine)
//! - [`graph`]: edge list ingestion into a `GraphModel`
//! - [`algo`]: the run pipeline producing a [`RankReport`]
//! - [`output`]: line-oriented text, CSV, JSON and table rendering
//! - [`config`]: YAML-backed run configuration
//!
//! ## Example Usage
//!
//! ```rust
//! use decirank::{parse_params, rank_edge_list, RankConfig};
//!
//! let params = parse_params("0.85", "0.15").unwrap();
//! let report = rank_edge_list("A B\nB A\n", params, &RankConfig::default()).unwrap();
//!
//! assert!(report.converged());
//! assert_eq!(report.rank_of("A"), report.rank_of("B"));
//! ```

#![warn(clippy::all)]

pub mod algo;
pub mod config;
pub mod error;
pub mod graph;
pub mod output;

// Re-export main types for convenience
pub use algo::{parse_params, rank_edge_list, rank_file, rank_graph, NodeRank, RankReport};
pub use config::{ConfigError, ConfigResult, RankConfig};
pub use error::{DecirankError, DecirankResult};
pub use graph::{
    load_edge_list, parse_edge_list, EdgeListError, EdgeListResult, GraphModel, GraphModelBuilder,
    ParseOptions,
};
pub use output::{render, write_report, OutputFormat};

pub use decirank_algorithms::{
    EngineConfig, Fixed, IterationStatus, RankEngine, RankError, RankOutcome, RankParams,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
