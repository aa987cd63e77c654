//! Graph model shared by the ranking engine
//!
//! Nodes live in an arena addressed by dense indices (0..N). In-neighbour lists
//! are stored in Compressed Sparse Column form and reference nodes by index.

use indexmap::IndexSet;

/// A directed graph built once from an edge list.
#[derive(Debug, Clone)]
pub struct GraphModel {
    /// Mapping from dense index to identifier, and back (first-seen order)
    ids: IndexSet<String>,

    /// Outgoing edge count per node. Mutable only through `force_min_out_degree`.
    out_degree: Vec<u64>,

    /// Offsets into `in_sources`. Size = node_count + 1
    in_offsets: Vec<usize>,
    /// Contiguous array of source node indices, in edge declaration order
    in_sources: Vec<usize>,
}

impl GraphModel {
    /// Number of distinct identifiers seen across all edges
    pub fn node_count(&self) -> usize {
        self.ids.len()
    }

    pub fn edge_count(&self) -> usize {
        self.in_sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Identifier of the node at `idx`
    pub fn id(&self, idx: usize) -> &str {
        &self.ids[idx]
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.ids.get_index_of(id)
    }

    /// Get the out-degree of a node (by index)
    pub fn out_degree(&self, idx: usize) -> u64 {
        self.out_degree[idx]
    }

    /// Get incoming neighbors (predecessors) of a node
    pub fn in_neighbours(&self, idx: usize) -> &[usize] {
        let start = self.in_offsets[idx];
        let end = self.in_offsets[idx + 1];
        &self.in_sources[start..end]
    }

    /// Indices of nodes that currently have no outgoing edge
    pub fn dangling_nodes(&self) -> Vec<usize> {
        self.out_degree
            .iter()
            .enumerate()
            .filter(|(_, &d)| d == 0)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Node indices ordered by ascending identifier
    pub fn ids_sorted(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.node_count()).collect();
        order.sort_by(|&a, &b| self.ids[a].cmp(&self.ids[b]));
        order
    }

    /// Raise every zero out-degree to one so that `rank / out_degree` is always defined.
    ///
    /// The dangling node's rank is not redistributed anywhere else. Returns the
    /// number of nodes adjusted.
    pub fn force_min_out_degree(&mut self) -> usize {
        let mut adjusted = 0;
        for degree in self.out_degree.iter_mut().filter(|d| **d == 0) {
            *degree = 1;
            adjusted += 1;
        }
        adjusted
    }
}

/// Incremental builder for [`GraphModel`].
///
/// The first occurrence of an identifier creates its node; later occurrences reuse it.
#[derive(Debug, Default)]
pub struct GraphModelBuilder {
    ids: IndexSet<String>,
    out_degree: Vec<u64>,
    incoming: Vec<Vec<usize>>,
}

impl GraphModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up or create the node for `id`, returning its index
    pub fn get_or_create_node(&mut self, id: &str) -> usize {
        if let Some(idx) = self.ids.get_index_of(id) {
            return idx;
        }
        let (idx, _) = self.ids.insert_full(id.to_string());
        self.out_degree.push(0);
        self.incoming.push(Vec::new());
        idx
    }

    /// Record the edge `source -> target`.
    ///
    /// Self-loops and parallel edges are kept as declared.
    pub fn add_edge(&mut self, source: usize, target: usize) {
        self.out_degree[source] += 1;
        self.incoming[target].push(source);
    }

    /// Convenience for `get_or_create_node` on both ends followed by `add_edge`
    pub fn add_edge_by_id(&mut self, source: &str, target: &str) {
        let s = self.get_or_create_node(source);
        let t = self.get_or_create_node(target);
        self.add_edge(s, t);
    }

    pub fn node_count(&self) -> usize {
        self.ids.len()
    }

    /// Freeze into a [`GraphModel`], flattening the in-neighbour lists.
    pub fn build(self) -> GraphModel {
        let mut in_offsets = Vec::with_capacity(self.incoming.len() + 1);
        let mut in_sources = Vec::new();

        in_offsets.push(0);
        for sources in self.incoming {
            in_sources.extend(sources);
            in_offsets.push(in_sources.len());
        }

        GraphModel {
            ids: self.ids,
            out_degree: self.out_degree,
            in_offsets,
            in_sources,
        }
    }
}
