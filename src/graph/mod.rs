//! Graph ingestion
//!
//! Turns plain-text edge lists into the engine's [`GraphModel`].

pub mod edge_list;

pub use decirank_algorithms::{GraphModel, GraphModelBuilder};
pub use edge_list::{
    load_edge_list, parse_edge_list, parse_lines, EdgeListError, EdgeListResult, ParseOptions,
};
