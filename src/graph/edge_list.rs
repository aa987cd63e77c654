//! Plain-text edge list parsing
//!
//! Each non-empty line holds `source destination`, separated by any run of
//! whitespace. The first malformed line aborts the build; no partial graph is
//! ever returned.

use decirank_algorithms::{GraphModel, GraphModelBuilder};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Edge list errors
#[derive(Error, Debug)]
pub enum EdgeListError {
    /// Input path does not resolve to a readable file
    #[error("File not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    /// A line did not yield a source and a destination
    #[error("Malformed edge at line {line}: {content:?} (expected 'source destination')")]
    Malformed { line: usize, content: String },

    /// Read failure after the file was opened
    #[error("I/O error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type EdgeListResult<T> = Result<T, EdgeListError>;

/// Tokenizer options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Lines starting with this prefix (after leading whitespace) are skipped.
    /// Off by default: identifiers may start with any character.
    pub comment_prefix: Option<String>,
    /// Reject lines with more than two tokens instead of ignoring the extras
    pub strict_tokens: bool,
}

impl ParseOptions {
    fn is_comment(&self, trimmed: &str) -> bool {
        match &self.comment_prefix {
            Some(prefix) if !prefix.is_empty() => trimmed.starts_with(prefix.as_str()),
            _ => false,
        }
    }
}

/// Split one line into `(source, destination)`.
///
/// Returns `Ok(None)` for blank and comment lines.
fn tokenize<'a>(
    line_no: usize,
    line: &'a str,
    options: &ParseOptions,
) -> EdgeListResult<Option<(&'a str, &'a str)>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || options.is_comment(trimmed) {
        return Ok(None);
    }

    let malformed = || EdgeListError::Malformed {
        line: line_no,
        content: line.to_string(),
    };

    let mut tokens = trimmed.split_whitespace();
    let source = tokens.next().ok_or_else(malformed)?;
    let target = tokens.next().ok_or_else(malformed)?;

    if tokens.next().is_some() {
        if options.strict_tokens {
            return Err(malformed());
        }
        debug!("Ignoring extra tokens on line {}", line_no);
    }

    Ok(Some((source, target)))
}

fn build_graph<I, S>(lines: I, options: &ParseOptions) -> EdgeListResult<GraphModel>
where
    I: Iterator<Item = EdgeListResult<S>>,
    S: AsRef<str>,
{
    let mut builder = GraphModelBuilder::new();

    for (i, line) in lines.enumerate() {
        let line = line?;
        if let Some((source, target)) = tokenize(i + 1, line.as_ref(), options)? {
            builder.add_edge_by_id(source, target);
        }
    }

    Ok(builder.build())
}

/// Build a graph from an iterator of lines. Line numbers are 1-based.
pub fn parse_lines<I, S>(lines: I, options: &ParseOptions) -> EdgeListResult<GraphModel>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let graph = build_graph(lines.into_iter().map(Ok), options)?;
    debug!(
        "Built graph with {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

/// Build a graph from an in-memory edge list
pub fn parse_edge_list(text: &str, options: &ParseOptions) -> EdgeListResult<GraphModel> {
    parse_lines(text.lines(), options)
}

/// Read and parse an edge list file
pub fn load_edge_list(path: impl AsRef<Path>, options: &ParseOptions) -> EdgeListResult<GraphModel> {
    let path = path.as_ref();
    info!("Loading edge list from {:?}", path);

    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => {}
        _ => {
            return Err(EdgeListError::FileNotFound {
                path: path.to_path_buf(),
            })
        }
    }

    let io_error = |source: std::io::Error| EdgeListError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(io_error)?;
    let lines = BufReader::new(file).lines().map(|line| line.map_err(io_error));
    let graph = build_graph(lines, options)?;

    info!(
        "Loaded {} nodes and {} edges from {:?}",
        graph.node_count(),
        graph.edge_count(),
        path
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_edges() {
        let graph = parse_edge_list("A B\nB\tC\n", &ParseOptions::default()).unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);

        let a = graph.index_of("A").unwrap();
        let b = graph.index_of("B").unwrap();
        assert_eq!(graph.out_degree(a), 1);
        assert_eq!(graph.in_neighbours(b), &[a]);
    }

    #[test]
    fn test_whitespace_runs_collapse() {
        let graph = parse_edge_list("   A  \t  B   \n", &ParseOptions::default()).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert!(graph.index_of("A").is_some());
        assert!(graph.index_of("B").is_some());
    }

    #[test]
    fn test_blank_lines_skipped() {
        let graph = parse_edge_list("\nA B\n   \n\t\nB A\n", &ParseOptions::default()).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_hash_identifiers_are_edges_by_default() {
        let graph = parse_edge_list("#tag A\nA #tag\n", &ParseOptions::default()).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 2);

        let tag = graph.index_of("#tag").unwrap();
        let a = graph.index_of("A").unwrap();
        assert_eq!(graph.out_degree(tag), 1);
        assert_eq!(graph.in_neighbours(a), &[tag]);
    }

    #[test]
    fn test_single_hash_token_is_malformed_by_default() {
        let err = parse_edge_list("A B\n#orphan\nB A\n", &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, EdgeListError::Malformed { line: 2, .. }));
    }

    #[test]
    fn test_comment_prefix_skips_lines() {
        let options = ParseOptions {
            comment_prefix: Some("#".to_string()),
            ..ParseOptions::default()
        };
        let text = "# FromNodeId ToNodeId\nA B\n  # indented comment\nB A\n";
        let graph = parse_edge_list(text, &options).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_single_token_line_is_malformed() {
        let err = parse_edge_list("A B\nlonely\nB C\n", &ParseOptions::default()).unwrap_err();
        match err {
            EdgeListError::Malformed { line, content } => {
                assert_eq!(line, 2);
                assert_eq!(content, "lonely");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_extra_tokens() {
        let lenient = parse_edge_list("A B C\n", &ParseOptions::default()).unwrap();
        assert_eq!(lenient.node_count(), 2);
        assert!(lenient.index_of("C").is_none());

        let strict = ParseOptions {
            strict_tokens: true,
            ..ParseOptions::default()
        };
        let err = parse_edge_list("A B C\n", &strict).unwrap_err();
        assert!(matches!(err, EdgeListError::Malformed { line: 1, .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = load_edge_list("/definitely/not/here.txt", &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, EdgeListError::FileNotFound { .. }));
    }
}
