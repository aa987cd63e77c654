//! Ranking pipeline
//!
//! Glue between ingestion, the engine in `decirank-algorithms`, and output:
//! edge list -> `GraphModel` -> `RankEngine` -> [`RankReport`].

use crate::config::RankConfig;
use crate::error::{DecirankError, DecirankResult};
use crate::graph::{load_edge_list, parse_edge_list, GraphModel};
use decirank_algorithms::{EngineConfig, Fixed, IterationStatus, RankEngine, RankParams};
use serde::Serialize;
use std::path::Path;
use tracing::info;

// Re-export the engine
pub use decirank_algorithms::{
    initialize, Initialization, RankError, RankOutcome, RankState, RoundReport,
};

/// Final rank of one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeRank {
    pub node: String,
    pub rank: Fixed,
}

/// Everything a caller needs to print or inspect a finished run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankReport {
    pub status: IterationStatus,
    pub rounds: usize,
    pub max_rounds: usize,
    pub epsilon: Fixed,
    pub max_residual: Fixed,
    pub node_count: usize,
    pub edge_count: usize,
    /// Ascending by node identifier
    pub ranks: Vec<NodeRank>,
}

impl RankReport {
    pub fn converged(&self) -> bool {
        self.status == IterationStatus::Converged
    }

    pub fn rank_of(&self, node: &str) -> Option<Fixed> {
        self.ranks
            .binary_search_by(|r| r.node.as_str().cmp(node))
            .ok()
            .map(|idx| self.ranks[idx].rank)
    }
}

/// Parse `alpha` and `beta` from their decimal text form
pub fn parse_params(alpha: &str, beta: &str) -> DecirankResult<RankParams> {
    let alpha = alpha.parse().map_err(|source| DecirankError::Parameter {
        name: "alpha",
        source,
    })?;
    let beta = beta.parse().map_err(|source| DecirankError::Parameter {
        name: "beta",
        source,
    })?;
    Ok(RankParams::new(alpha, beta))
}

/// Rank an already built graph
pub fn rank_graph(
    graph: GraphModel,
    params: RankParams,
    config: &EngineConfig,
) -> DecirankResult<RankReport> {
    let edge_count = graph.edge_count();
    let mut engine = RankEngine::new(graph, params, config.clone())?;

    info!(
        "Ranking {} nodes (alpha={}, beta={}, epsilon={}, max_rounds={})",
        engine.graph().node_count(),
        params.alpha,
        params.beta,
        engine.epsilon(),
        engine.max_rounds()
    );

    let outcome = engine.iterate();

    let ranks = engine
        .ranking()
        .into_iter()
        .map(|(node, rank)| NodeRank {
            node: node.to_string(),
            rank,
        })
        .collect();

    Ok(RankReport {
        status: outcome.status,
        rounds: outcome.rounds,
        max_rounds: engine.max_rounds(),
        epsilon: engine.epsilon(),
        max_residual: outcome.max_residual,
        node_count: engine.graph().node_count(),
        edge_count,
        ranks,
    })
}

/// Rank an in-memory edge list
pub fn rank_edge_list(text: &str, params: RankParams, config: &RankConfig) -> DecirankResult<RankReport> {
    let graph = parse_edge_list(text, &config.parse)?;
    rank_graph(graph, params, &config.engine)
}

/// Rank the edge list stored at `path`
pub fn rank_file(
    path: impl AsRef<Path>,
    params: RankParams,
    config: &RankConfig,
) -> DecirankResult<RankReport> {
    let graph = load_edge_list(path, &config.parse)?;
    rank_graph(graph, params, &config.engine)
}
