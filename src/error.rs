//! Crate-wide error type
//!
//! Every failure aborts the run; nothing is retried and no partial ranking is produced.

use crate::config::ConfigError;
use crate::graph::EdgeListError;
use decirank_algorithms::{ParseFixedError, RankError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecirankError {
    #[error(transparent)]
    EdgeList(#[from] EdgeListError),

    #[error(transparent)]
    Rank(#[from] RankError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid {name}: {source}")]
    Parameter {
        name: &'static str,
        #[source]
        source: ParseFixedError,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DecirankResult<T> = Result<T, DecirankError>;
