//! Sequence analysis and heuristic risk scoring.
//!
//! FASTA records are turned into per-sequence features (GC content, length,
//! repeated motifs), grouped with k-means on (GC content, length), and written
//! as a flat table. Independently, a query sequence's GC content is matched
//! against a reference knowledge base and the matched score is adjusted for
//! age, smoking and sex. The estimate is a heuristic, not a clinical result.

pub mod analysis;
pub mod config;
pub mod data_handling;
pub mod errors;
pub mod helper_functions;
pub mod models;

pub use errors::{AnalysisError, Result};
