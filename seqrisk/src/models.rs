use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AnalysisError;

/// Repeated motif → number of occurrences (always > 1).
pub type MotifCounts = BTreeMap<String, usize>;

/// One FASTA entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    pub id: String,
    pub description: Option<String>,
    pub sequence: String,
}

impl SequenceRecord {
    pub fn new(id: impl Into<String>, sequence: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: None,
            sequence: sequence.into(),
        }
    }
}

/// Per-sequence statistics, one row per input record in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub id: String,
    pub sequence: String,
    pub gc_content: f64,
    pub length: usize,
    pub motif_counts: MotifCounts,
    pub cluster_id: Option<usize>,
}

/// One reference row of the knowledge base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBaseRecord {
    pub gc_content: f64,
    pub risk_score: f64,
    pub risk_category: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    #[value(alias = "m", alias = "homme")]
    Male,
    #[value(alias = "f", alias = "femme")]
    Female,
}

impl FromStr for Sex {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" | "homme" => Ok(Sex::Male),
            "female" | "f" | "femme" => Ok(Sex::Female),
            other => Err(AnalysisError::InvalidParameter {
                parameter: "sex".to_string(),
                reason: format!("'{other}' is not one of male, female"),
            }),
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Male => write!(f, "male"),
            Sex::Female => write!(f, "female"),
        }
    }
}

/// Auxiliary factors supplied alongside a query sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFactors {
    pub age: u32,
    pub is_smoker: bool,
    pub sex: Sex,
}

/// A multiplier that was applied to the base score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedFactor {
    pub name: String,
    pub multiplier: f64,
}

/// Result of a single risk query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskEstimate {
    /// Length of the query sequence, when estimated from one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_length: Option<usize>,
    pub gc_content: f64,
    /// GC content of the matched knowledge-base record.
    pub matched_gc_content: f64,
    pub base_risk_score: f64,
    pub risk_category: String,
    pub adjusted_risk_score: f64,
    pub factors_applied: Vec<AppliedFactor>,
    pub factors: RiskFactors,
}

impl fmt::Display for RiskEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DNA sequence analysis:")?;
        writeln!(f)?;
        if let Some(len) = self.sequence_length {
            writeln!(f, "Sequence length : {len} nucleotides")?;
        }
        writeln!(f, "GC content      : {:.2}%", self.gc_content)?;
        writeln!(f)?;
        writeln!(f, "Estimated risk score : {:.4}", self.adjusted_risk_score)?;
        writeln!(f, "Risk category        : {}", self.risk_category)?;
        writeln!(f)?;
        writeln!(f, "Additional information:")?;
        writeln!(f, "Sex    : {}", self.factors.sex)?;
        writeln!(f, "Age    : {} years", self.factors.age)?;
        writeln!(f, "Smoker : {}", if self.factors.is_smoker { "yes" } else { "no" })?;
        if self.factors_applied.is_empty() {
            writeln!(f, "Adjustments : none")?;
        } else {
            let steps: Vec<String> = self
                .factors_applied
                .iter()
                .map(|a| format!("{} x{}", a.name, a.multiplier))
                .collect();
            writeln!(f, "Adjustments : {}", steps.join(", "))?;
        }
        writeln!(f)?;
        write!(
            f,
            "Note: this estimate is a simplified heuristic. \
             For an accurate cancer risk assessment, consult a health professional."
        )
    }
}
