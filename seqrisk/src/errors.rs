//! Error types for sequence analysis and risk scoring.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Result type alias for seqrisk operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Error type for seqrisk operations
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Malformed FASTA input
    #[error("FASTA parse error at line {line}: {reason}")]
    Parse {
        /// 1-based line number (0 when the whole input is at fault)
        line: usize,
        /// Explanation of the problem
        reason: String,
    },

    /// Empty or degenerate sequence
    #[error("Invalid sequence '{id}': {reason}")]
    InvalidSequence {
        /// Identifier of the offending record, or "query"
        id: String,
        /// Explanation of the problem
        reason: String,
    },

    /// Symbols outside the recognised nucleotide alphabet
    #[error("Invalid character(s) {} in sequence (allowed: {allowed})", format_symbols(.symbols))]
    InvalidCharacter {
        /// Offending symbols, deduplicated, in order of first appearance
        symbols: Vec<char>,
        /// The accepted alphabet
        allowed: String,
    },

    /// Required columns absent from a tabular input
    #[error("Missing required column(s) {} in '{source_name}'", .missing.join(", "))]
    Schema {
        /// Path or name of the table
        source_name: String,
        /// Required columns that were not found
        missing: Vec<String>,
    },

    /// A row whose values violate a column constraint
    #[error("Invalid record at row {row} in '{source_name}': {reason}")]
    InvalidRecord {
        /// Path or name of the table
        source_name: String,
        /// 0-based data row index
        row: usize,
        /// Explanation of the problem
        reason: String,
    },

    /// Lookup against a knowledge base with no records
    #[error("Knowledge base is empty")]
    EmptyKnowledgeBase,

    /// Cluster count incompatible with the data
    #[error("Cannot cluster {n_points} point(s) ({n_distinct} distinct) into {k} cluster(s): {reason}")]
    Clustering {
        /// Requested cluster count
        k: usize,
        /// Number of input rows
        n_points: usize,
        /// Number of distinct feature vectors
        n_distinct: usize,
        /// Explanation of the problem
        reason: String,
    },

    /// Invalid parameter value provided
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// The parameter name
        parameter: String,
        /// Explanation of why it's invalid
        reason: String,
    },

    /// A serialized motif column entry that cannot be decoded
    #[error("Invalid motif encoding '{entry}': {reason}")]
    InvalidMotifEncoding {
        /// The offending entry
        entry: String,
        /// Explanation of the problem
        reason: String,
    },

    /// Free-text table query that matches no known keyword
    #[error("Unrecognized query '{query}'. Try 'GC content', 'sequence length', 'cluster', or 'motif'.")]
    UnrecognizedQuery {
        /// The query text as given
        query: String,
    },

    #[error(transparent)]
    Polars(#[from] PolarsError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn format_symbols(symbols: &[char]) -> String {
    symbols
        .iter()
        .map(|c| format!("'{c}'"))
        .collect::<Vec<_>>()
        .join(", ")
}
