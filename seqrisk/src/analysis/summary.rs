//! Descriptive queries over an analysis table.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use statrs::statistics::Statistics;

use crate::errors::{AnalysisError, Result};
use crate::models::FeatureRow;

/// How many motifs the motif query reports.
pub const TOP_MOTIFS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    GcContent,
    SequenceLength,
    Cluster,
    Motif,
}

impl FromStr for Query {
    type Err = AnalysisError;

    /// Keyword match, checked in this order: "gc content", "sequence length",
    /// "cluster", "motif".
    fn from_str(s: &str) -> Result<Self> {
        let text = s.to_lowercase();
        if text.contains("gc content") {
            Ok(Query::GcContent)
        } else if text.contains("sequence length") {
            Ok(Query::SequenceLength)
        } else if text.contains("cluster") {
            Ok(Query::Cluster)
        } else if text.contains("motif") {
            Ok(Query::Motif)
        } else {
            Err(AnalysisError::UnrecognizedQuery { query: s.to_string() })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "query", rename_all = "snake_case")]
pub enum QueryAnswer {
    GcContent { mean: f64 },
    SequenceLength { mean: f64 },
    Cluster { distinct: usize, sizes: BTreeMap<usize, usize> },
    Motif { top: Vec<(String, usize)> },
}

impl fmt::Display for QueryAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryAnswer::GcContent { mean } => write!(f, "Mean GC content: {mean:.2}%"),
            QueryAnswer::SequenceLength { mean } => write!(f, "Mean sequence length: {mean:.2}"),
            QueryAnswer::Cluster { distinct, sizes } => {
                write!(f, "Number of clusters: {distinct}")?;
                for (cluster, size) in sizes {
                    write!(f, "\n  cluster {cluster}: {size} sequences")?;
                }
                Ok(())
            }
            QueryAnswer::Motif { top } => match top.first() {
                Some((motif, freq)) => {
                    write!(f, "Most frequent motif: {motif} (frequency: {freq})")?;
                    for (motif, freq) in top {
                        write!(f, "\n  {motif}\t{freq}")?;
                    }
                    Ok(())
                }
                None => write!(f, "No repeated motifs in the table"),
            },
        }
    }
}

pub fn mean_gc_content(rows: &[FeatureRow]) -> Result<f64> {
    non_empty(rows)?;
    Ok(rows.iter().map(|r| r.gc_content).mean())
}

pub fn mean_length(rows: &[FeatureRow]) -> Result<f64> {
    non_empty(rows)?;
    Ok(rows.iter().map(|r| r.length as f64).mean())
}

/// Sequences per cluster id; unclustered rows are not counted.
pub fn cluster_distribution(rows: &[FeatureRow]) -> BTreeMap<usize, usize> {
    let mut sizes = BTreeMap::new();
    for cluster in rows.iter().filter_map(|r| r.cluster_id) {
        *sizes.entry(cluster).or_insert(0) += 1;
    }
    sizes
}

/// Motifs ranked by the number of sequences in which they are repeated,
/// ties broken alphabetically.
pub fn top_motifs(rows: &[FeatureRow], n: usize) -> Vec<(String, usize)> {
    let mut frequency: HashMap<&str, usize> = HashMap::new();
    for motif in rows.iter().flat_map(|r| r.motif_counts.keys()) {
        *frequency.entry(motif.as_str()).or_default() += 1;
    }
    let mut ranked: Vec<(String, usize)> = frequency
        .into_iter()
        .map(|(motif, freq)| (motif.to_string(), freq))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(n);
    ranked
}

pub fn answer(query: Query, rows: &[FeatureRow]) -> Result<QueryAnswer> {
    non_empty(rows)?;
    Ok(match query {
        Query::GcContent => QueryAnswer::GcContent { mean: mean_gc_content(rows)? },
        Query::SequenceLength => QueryAnswer::SequenceLength { mean: mean_length(rows)? },
        Query::Cluster => {
            let sizes = cluster_distribution(rows);
            QueryAnswer::Cluster { distinct: sizes.len(), sizes }
        }
        Query::Motif => QueryAnswer::Motif { top: top_motifs(rows, TOP_MOTIFS) },
    })
}

fn non_empty(rows: &[FeatureRow]) -> Result<()> {
    if rows.is_empty() {
        Err(AnalysisError::InvalidParameter {
            parameter: "table".to_string(),
            reason: "analysis table has no rows".to_string(),
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(gc: f64, length: usize, motifs: &[&str], cluster: Option<usize>) -> FeatureRow {
        FeatureRow {
            id: "x".to_string(),
            sequence: String::new(),
            gc_content: gc,
            length,
            motif_counts: motifs.iter().map(|m| (m.to_string(), 2)).collect(),
            cluster_id: cluster,
        }
    }

    fn table() -> Vec<FeatureRow> {
        vec![
            row(40.0, 10, &["AAA", "TTT"], Some(0)),
            row(60.0, 30, &["TTT", "GCG"], Some(1)),
            row(50.0, 20, &["TTT", "AAA"], Some(1)),
        ]
    }

    #[test]
    fn parses_keywords_case_insensitively() {
        assert_eq!("Show GC Content please".parse::<Query>().unwrap(), Query::GcContent);
        assert_eq!("sequence length".parse::<Query>().unwrap(), Query::SequenceLength);
        assert_eq!("CLUSTERS?".parse::<Query>().unwrap(), Query::Cluster);
        assert_eq!("top motifs".parse::<Query>().unwrap(), Query::Motif);
        assert!(matches!(
            "weather".parse::<Query>(),
            Err(AnalysisError::UnrecognizedQuery { .. })
        ));
    }

    #[test]
    fn keyword_priority_follows_declared_order() {
        assert_eq!("cluster by gc content".parse::<Query>().unwrap(), Query::GcContent);
    }

    #[test]
    fn means() {
        assert!((mean_gc_content(&table()).unwrap() - 50.0).abs() < 1e-12);
        assert!((mean_length(&table()).unwrap() - 20.0).abs() < 1e-12);
    }

    #[test]
    fn cluster_sizes() {
        let answer = answer(Query::Cluster, &table()).unwrap();
        let expected: BTreeMap<usize, usize> = [(0, 1), (1, 2)].into_iter().collect();
        assert_eq!(answer, QueryAnswer::Cluster { distinct: 2, sizes: expected });
    }

    #[test]
    fn motifs_ranked_by_sequence_frequency() {
        let top = top_motifs(&table(), 10);
        assert_eq!(
            top,
            vec![("TTT".to_string(), 3), ("AAA".to_string(), 2), ("GCG".to_string(), 1)]
        );
        assert_eq!(top_motifs(&table(), 1).len(), 1);
    }

    #[test]
    fn motif_answer_names_the_most_frequent() {
        let text = answer(Query::Motif, &table()).unwrap().to_string();
        assert!(text.starts_with("Most frequent motif: TTT (frequency: 3)"));
    }

    #[test]
    fn empty_table_is_rejected() {
        assert!(matches!(
            answer(Query::GcContent, &[]),
            Err(AnalysisError::InvalidParameter { .. })
        ));
    }
}
