//! Fixed-point PageRank engine
//!
//! Pure, I/O-free building blocks: a six-digit decimal type, an arena-backed
//! directed graph, and the power-iteration engine that ranks it.

pub mod common;
pub mod decimal;
pub mod pagerank;

pub use common::{GraphModel, GraphModelBuilder};
pub use decimal::{Fixed, ParseFixedError, SCALE};
pub use pagerank::{
    initialize, EngineConfig, Initialization, IterationStatus, RankEngine, RankError,
    RankOutcome, RankParams, RankResult, RankState, RoundReport,
};
