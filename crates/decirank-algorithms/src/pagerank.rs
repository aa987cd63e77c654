//! PageRank power iteration over fixed-point ranks
//!
//! Each round reads ranks exclusively from the previous round's buffer and
//! writes into a separate buffer, which is swapped in once every node has been
//! visited (Jacobi update). Per-node work within a round may run on rayon's pool.

use super::common::GraphModel;
use super::decimal::Fixed;
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, trace};

/// Errors raised while preparing the engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RankError {
    #[error("graph has no nodes; ranking is undefined")]
    EmptyGraph,

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type RankResult<T> = Result<T, RankError>;

/// Damping factor and additive offset.
///
/// `beta` is added as-is to every node's new rank. Callers that want rank mass
/// to be conserved pass `beta = (1 - alpha) / N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankParams {
    /// Damping factor (usually 0.85)
    pub alpha: Fixed,
    /// Additive offset
    pub beta: Fixed,
}

impl Default for RankParams {
    fn default() -> Self {
        Self {
            alpha: Fixed::from_raw(850_000),
            beta: Fixed::from_raw(150_000),
        }
    }
}

impl RankParams {
    pub fn new(alpha: Fixed, beta: Fixed) -> Self {
        Self { alpha, beta }
    }

    pub fn validate(&self) -> RankResult<()> {
        if self.alpha.is_negative() {
            return Err(RankError::InvalidParameter(format!(
                "alpha must be non-negative, got {}",
                self.alpha
            )));
        }
        if self.beta.is_negative() {
            return Err(RankError::InvalidParameter(format!(
                "beta must be non-negative, got {}",
                self.beta
            )));
        }
        Ok(())
    }
}

/// Engine tuning that does not change the ranking formula
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Rounds allowed per node: `max_rounds = base_iteration_bound * N`
    pub base_iteration_bound: usize,
    /// `epsilon = 1 / (epsilon_scale * N)`
    pub epsilon_scale: u64,
    /// Run each round's per-node pass on the rayon thread pool
    pub parallel: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_iteration_bound: 100,
            epsilon_scale: 1_000_000,
            parallel: false,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> RankResult<()> {
        if self.base_iteration_bound == 0 {
            return Err(RankError::InvalidParameter(
                "base_iteration_bound must be at least 1".to_string(),
            ));
        }
        if self.epsilon_scale == 0 {
            return Err(RankError::InvalidParameter(
                "epsilon_scale must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Per-node rank and the residual of the last completed round.
///
/// Both vectors are indexed like the [`GraphModel`] arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankState {
    pub ranks: Vec<Fixed>,
    pub residuals: Vec<Fixed>,
}

/// Output of [`initialize`]
#[derive(Debug, Clone)]
pub struct Initialization {
    pub state: RankState,
    pub epsilon: Fixed,
    pub max_rounds: usize,
    /// Dangling nodes whose out-degree was raised to 1
    pub dangling_adjusted: usize,
}

/// Derive N, epsilon, the round budget and the uniform starting ranks.
///
/// Also applies the dangling-node fix to `graph`.
pub fn initialize(graph: &mut GraphModel, config: &EngineConfig) -> RankResult<Initialization> {
    config.validate()?;

    let n = graph.node_count();
    if n == 0 {
        return Err(RankError::EmptyGraph);
    }

    let max_rounds = config.base_iteration_bound.saturating_mul(n);
    let epsilon = Fixed::from_ratio(1, config.epsilon_scale as u128 * n as u128)
        .ok_or_else(|| RankError::InvalidParameter("epsilon denominator is zero".to_string()))?;
    let initial = Fixed::from_ratio(1, n as u128)
        .ok_or(RankError::EmptyGraph)?;

    let dangling_adjusted = graph.force_min_out_degree();

    debug!(
        "Initialized {} nodes: epsilon={}, max_rounds={}, dangling adjusted={}",
        n, epsilon, max_rounds, dangling_adjusted
    );

    Ok(Initialization {
        state: RankState {
            ranks: vec![initial; n],
            residuals: vec![Fixed::ZERO; n],
        },
        epsilon,
        max_rounds,
        dangling_adjusted,
    })
}

/// Where the iteration loop stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum IterationStatus {
    Running,
    /// Every node moved by at most epsilon in the last round
    Converged,
    /// The round budget ran out first
    Exhausted,
}

impl IterationStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, IterationStatus::Running)
    }
}

/// Summary of one round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundReport {
    pub round: usize,
    pub max_residual: Fixed,
    pub converged: bool,
}

/// Final result of [`RankEngine::iterate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankOutcome {
    pub status: IterationStatus,
    pub rounds: usize,
    pub max_residual: Fixed,
}

/// Rank of `idx` computed from the frozen `snapshot` of the previous round.
fn next_rank(graph: &GraphModel, snapshot: &[Fixed], params: &RankParams, idx: usize) -> Fixed {
    let inbound: Fixed = graph
        .in_neighbours(idx)
        .iter()
        .map(|&src| snapshot[src].div_count(graph.out_degree(src)))
        .sum();
    params.alpha * inbound + params.beta
}

/// Owns the graph and rank buffers and runs the iterate-until-converged loop.
#[derive(Debug)]
pub struct RankEngine {
    graph: GraphModel,
    params: RankParams,
    config: EngineConfig,
    state: RankState,
    /// Write buffer for the round in progress
    next: Vec<Fixed>,
    epsilon: Fixed,
    max_rounds: usize,
    round: usize,
    status: IterationStatus,
    max_residual: Fixed,
}

impl RankEngine {
    /// Validate parameters and initialize rank state for `graph`.
    pub fn new(mut graph: GraphModel, params: RankParams, config: EngineConfig) -> RankResult<Self> {
        params.validate()?;
        let init = initialize(&mut graph, &config)?;
        let n = graph.node_count();

        Ok(Self {
            graph,
            params,
            config,
            state: init.state,
            next: vec![Fixed::ZERO; n],
            epsilon: init.epsilon,
            max_rounds: init.max_rounds,
            round: 0,
            status: IterationStatus::Running,
            max_residual: Fixed::ZERO,
        })
    }

    /// Run one round. Returns `None` once the engine has reached a terminal state.
    pub fn step(&mut self) -> Option<RoundReport> {
        if self.status.is_terminal() {
            return None;
        }

        let graph = &self.graph;
        let params = &self.params;
        let RankState { ranks, residuals } = &mut self.state;
        let snapshot: &[Fixed] = ranks;

        if self.config.parallel {
            self.next
                .par_iter_mut()
                .zip(residuals.par_iter_mut())
                .enumerate()
                .for_each(|(idx, (slot, residual))| {
                    let new_rank = next_rank(graph, snapshot, params, idx);
                    *residual = (snapshot[idx] - new_rank).abs();
                    *slot = new_rank;
                });
        } else {
            for (idx, (slot, residual)) in self.next.iter_mut().zip(residuals.iter_mut()).enumerate() {
                let new_rank = next_rank(graph, snapshot, params, idx);
                *residual = (snapshot[idx] - new_rank).abs();
                *slot = new_rank;
            }
        }

        // Swap buffers
        std::mem::swap(ranks, &mut self.next);
        self.round += 1;

        let epsilon = self.epsilon;
        let converged = residuals.iter().all(|r| *r <= epsilon);
        self.max_residual = residuals.iter().copied().max().unwrap_or(Fixed::ZERO);

        trace!(
            "Round {}: max residual {} (epsilon {})",
            self.round, self.max_residual, epsilon
        );

        if converged {
            self.status = IterationStatus::Converged;
        } else if self.round >= self.max_rounds {
            self.status = IterationStatus::Exhausted;
        }

        Some(RoundReport {
            round: self.round,
            max_residual: self.max_residual,
            converged,
        })
    }

    /// Iterate until converged or the round budget is spent.
    ///
    /// Calling this again after a terminal state returns the same outcome.
    pub fn iterate(&mut self) -> RankOutcome {
        while self.step().is_some() {}

        let outcome = self.outcome();
        info!(
            "PageRank finished: {:?} after {} rounds (max residual {}, epsilon {})",
            outcome.status, outcome.rounds, outcome.max_residual, self.epsilon
        );
        outcome
    }

    pub fn outcome(&self) -> RankOutcome {
        RankOutcome {
            status: self.status,
            rounds: self.round,
            max_residual: self.max_residual,
        }
    }

    /// `(identifier, rank)` pairs in ascending identifier order
    pub fn ranking(&self) -> Vec<(&str, Fixed)> {
        self.graph
            .ids_sorted()
            .into_iter()
            .map(|idx| (self.graph.id(idx), self.state.ranks[idx]))
            .collect()
    }

    pub fn rank_of(&self, id: &str) -> Option<Fixed> {
        self.graph.index_of(id).map(|idx| self.state.ranks[idx])
    }

    pub fn state(&self) -> &RankState {
        &self.state
    }

    pub fn graph(&self) -> &GraphModel {
        &self.graph
    }

    pub fn params(&self) -> &RankParams {
        &self.params
    }

    pub fn epsilon(&self) -> Fixed {
        self.epsilon
    }

    pub fn max_rounds(&self) -> usize {
        self.max_rounds
    }

    pub fn round(&self) -> usize {
        self.round
    }

    pub fn status(&self) -> IterationStatus {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::GraphModelBuilder;

    fn fx(s: &str) -> Fixed {
        s.parse().unwrap()
    }

    fn graph_from(edges: &[(&str, &str)]) -> GraphModel {
        let mut builder = GraphModelBuilder::new();
        for (s, t) in edges {
            builder.add_edge_by_id(s, t);
        }
        builder.build()
    }

    fn run(edges: &[(&str, &str)], params: RankParams, config: EngineConfig) -> RankEngine {
        let mut engine = RankEngine::new(graph_from(edges), params, config).unwrap();
        engine.iterate();
        engine
    }

    #[test]
    fn test_initialize_derives_budget_and_epsilon() {
        let mut graph = graph_from(&[("a", "b"), ("b", "a")]);
        let init = initialize(&mut graph, &EngineConfig::default()).unwrap();

        assert_eq!(init.max_rounds, 200);
        // 1 / 2_000_000 rounds half-up to 0.000001
        assert_eq!(init.epsilon, fx("0.000001"));
        assert_eq!(init.state.ranks, vec![fx("0.5"); 2]);
        assert_eq!(init.dangling_adjusted, 0);
    }

    #[test]
    fn test_initialize_empty_graph() {
        let mut graph = GraphModelBuilder::new().build();
        let err = initialize(&mut graph, &EngineConfig::default()).unwrap_err();
        assert_eq!(err, RankError::EmptyGraph);
    }

    #[test]
    fn test_initialize_fixes_dangling_nodes() {
        let mut graph = graph_from(&[("a", "b"), ("b", "c")]);
        let init = initialize(&mut graph, &EngineConfig::default()).unwrap();

        assert_eq!(init.dangling_adjusted, 1);
        assert_eq!(graph.out_degree(graph.index_of("c").unwrap()), 1);
        assert_eq!(init.state.ranks, vec![fx("0.333333"); 3]);
        // 1 / 3_000_000 rounds to zero at six digits
        assert_eq!(init.epsilon, Fixed::ZERO);
    }

    #[test]
    fn test_two_node_cycle_converges_symmetrically() {
        let engine = run(&[("A", "B"), ("B", "A")], RankParams::default(), EngineConfig::default());

        assert_eq!(engine.status(), IterationStatus::Converged);
        assert!(engine.round() < engine.max_rounds());

        let ranking = engine.ranking();
        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking[0].0, "A");
        assert_eq!(ranking[1].0, "B");
        assert_eq!(ranking[0].1, ranking[1].1);
        assert!(ranking[0].1 > fx("0.99") && ranking[0].1 <= Fixed::ONE);
    }

    #[test]
    fn test_two_node_cycle_normalized_offset_is_fixed_point() {
        // beta = (1 - alpha) / N keeps the uniform distribution stationary
        let params = RankParams::new(fx("0.85"), fx("0.075"));
        let engine = run(&[("A", "B"), ("B", "A")], params, EngineConfig::default());

        assert_eq!(engine.status(), IterationStatus::Converged);
        assert_eq!(engine.round(), 1);
        assert_eq!(engine.rank_of("A"), Some(fx("0.5")));
        assert_eq!(engine.rank_of("B"), Some(fx("0.5")));
    }

    #[test]
    fn test_three_node_chain_exact_values() {
        let engine = run(&[("A", "B"), ("B", "C")], RankParams::default(), EngineConfig::default());

        // Rounds 1-3 move ranks, round 4 changes nothing.
        assert_eq!(engine.status(), IterationStatus::Converged);
        assert_eq!(engine.round(), 4);
        assert_eq!(engine.rank_of("A"), Some(fx("0.150000")));
        assert_eq!(engine.rank_of("B"), Some(fx("0.277500")));
        assert_eq!(engine.rank_of("C"), Some(fx("0.385875")));
    }

    #[test]
    fn test_round_reads_previous_snapshot_only() {
        let mut engine = RankEngine::new(
            graph_from(&[("A", "B"), ("B", "C")]),
            RankParams::default(),
            EngineConfig::default(),
        )
        .unwrap();

        let report = engine.step().unwrap();
        assert_eq!(report.round, 1);
        assert!(!report.converged);
        // B and C both see the initial 0.333333 of their in-neighbour, not A's or B's new value.
        assert_eq!(engine.rank_of("A"), Some(fx("0.150000")));
        assert_eq!(engine.rank_of("B"), Some(fx("0.433333")));
        assert_eq!(engine.rank_of("C"), Some(fx("0.433333")));
        assert_eq!(report.max_residual, fx("0.183333"));
    }

    #[test]
    fn test_exhausted_when_budget_runs_out() {
        let config = EngineConfig {
            base_iteration_bound: 1,
            ..EngineConfig::default()
        };
        let mut engine =
            RankEngine::new(graph_from(&[("A", "B"), ("B", "A")]), RankParams::default(), config).unwrap();
        let outcome = engine.iterate();

        assert_eq!(outcome.status, IterationStatus::Exhausted);
        assert_eq!(outcome.rounds, 2);
        assert_eq!(engine.rank_of("A"), Some(fx("0.638750")));
        assert_eq!(outcome.max_residual, fx("0.063750"));

        // Terminal state is sticky
        assert!(engine.step().is_none());
        assert_eq!(engine.iterate(), outcome);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let edges: Vec<(String, String)> = (0..60)
            .flat_map(|i| {
                vec![
                    (format!("n{}", i), format!("n{}", (i * 7 + 3) % 60)),
                    (format!("n{}", i), format!("n{}", (i + 1) % 60)),
                ]
            })
            .filter(|(s, _)| s != "n13")
            .collect();
        let refs: Vec<(&str, &str)> = edges.iter().map(|(s, t)| (s.as_str(), t.as_str())).collect();

        let sequential = run(&refs, RankParams::default(), EngineConfig::default());
        let parallel = run(
            &refs,
            RankParams::default(),
            EngineConfig {
                parallel: true,
                ..EngineConfig::default()
            },
        );

        assert_eq!(sequential.ranking(), parallel.ranking());
        assert_eq!(sequential.outcome(), parallel.outcome());
    }

    #[test]
    fn test_edge_order_does_not_change_result() {
        let forward = [("a", "b"), ("b", "c"), ("c", "a"), ("a", "c"), ("d", "a")];
        let mut backward = forward;
        backward.reverse();

        let first = run(&forward, RankParams::default(), EngineConfig::default());
        let second = run(&backward, RankParams::default(), EngineConfig::default());

        assert_eq!(first.ranking(), second.ranking());
        assert_eq!(first.outcome().rounds, second.outcome().rounds);
    }

    #[test]
    fn test_ranks_stay_non_negative() {
        let engine = run(
            &[("a", "b"), ("b", "c"), ("c", "a"), ("c", "d")],
            RankParams::new(fx("0.5"), Fixed::ZERO),
            EngineConfig::default(),
        );
        assert!(engine.state().ranks.iter().all(|r| !r.is_negative()));
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let graph = graph_from(&[("a", "b")]);
        let err = RankEngine::new(graph, RankParams::new(fx("-0.1"), fx("0.15")), EngineConfig::default())
            .unwrap_err();
        assert!(matches!(err, RankError::InvalidParameter(_)));

        let graph = graph_from(&[("a", "b")]);
        let config = EngineConfig {
            epsilon_scale: 0,
            ..EngineConfig::default()
        };
        let err = RankEngine::new(graph, RankParams::default(), config).unwrap_err();
        assert!(matches!(err, RankError::InvalidParameter(_)));
    }
}
