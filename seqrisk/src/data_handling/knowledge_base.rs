//! The reference table used for nearest-match risk lookup.
//!
//! A [`KnowledgeBase`] is built once, sorted ascending by GC content with a
//! stable sort (rows sharing a GC value keep their file order), and never
//! mutated afterwards. Updating it means loading a new one.

use std::path::PathBuf;

use polars::prelude::*;
use serde::Serialize;
use statrs::statistics::Statistics;
use tracing::{debug, error, info};

use crate::data_handling::Dataset;
use crate::errors::{AnalysisError, Result};
use crate::helper_functions::{f64_values, invalid_record, read_csv, require_columns, string_values};
use crate::models::KnowledgeBaseRecord;

pub const REQUIRED_COLUMNS: [&str; 3] = ["gc_content", "risk_score", "risk_category"];

/// A knowledge-base CSV on disk.
pub struct KnowledgeBaseDataset {
    pub path: PathBuf,
}

impl Dataset for KnowledgeBaseDataset {
    type Output = KnowledgeBase;

    fn load(&self) -> Result<KnowledgeBase> {
        info!("Reading knowledge base from {}", self.path.display());
        let df = match read_csv(&self.path) {
            Ok(df) => df,
            Err(e) => {
                error!("Failed to read knowledge base CSV: {}", e);
                return Err(e.into());
            }
        };
        let kb = KnowledgeBase::from_dataframe(&df, &self.path.display().to_string())?;
        info!("Knowledge base loaded: {} records", kb.len());
        Ok(kb)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GcSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; NaN with fewer than two records.
    pub std_dev: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeBase {
    records: Vec<KnowledgeBaseRecord>,
}

impl KnowledgeBase {
    /// Validates and sorts `records`. Scores must be non-negative and all
    /// numbers finite.
    pub fn from_records(mut records: Vec<KnowledgeBaseRecord>) -> Result<Self> {
        for (row, record) in records.iter().enumerate() {
            if !record.gc_content.is_finite() || !(0.0..=100.0).contains(&record.gc_content) {
                return Err(invalid_record(
                    "knowledge base",
                    row,
                    format!("gc_content {} is outside [0, 100]", record.gc_content),
                ));
            }
            if !record.risk_score.is_finite() || record.risk_score < 0.0 {
                return Err(invalid_record(
                    "knowledge base",
                    row,
                    format!("risk_score {} must be a non-negative number", record.risk_score),
                ));
            }
        }
        records.sort_by(|a, b| a.gc_content.total_cmp(&b.gc_content));
        Ok(Self { records })
    }

    /// Builds from a frame holding at least the [`REQUIRED_COLUMNS`]; other
    /// columns are ignored.
    pub fn from_dataframe(df: &DataFrame, source_name: &str) -> Result<Self> {
        require_columns(df, &REQUIRED_COLUMNS, source_name)?;

        let gc = f64_values(df, "gc_content", source_name)?;
        let scores = f64_values(df, "risk_score", source_name)?;
        let categories = string_values(df, "risk_category", source_name)?;
        debug!("Knowledge base frame has {} rows", df.height());

        let records = gc
            .into_iter()
            .zip(scores)
            .zip(categories)
            .map(|((gc_content, risk_score), risk_category)| KnowledgeBaseRecord {
                gc_content,
                risk_score,
                risk_category,
            })
            .collect();
        Self::from_records(records)
    }

    pub fn records(&self) -> &[KnowledgeBaseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record minimising `|record.gc_content - gc_content|`. On equal
    /// distance the lower GC content wins, and among records sharing that GC
    /// content the first in file order.
    pub fn nearest(&self, gc_content: f64) -> Result<&KnowledgeBaseRecord> {
        if self.records.is_empty() {
            return Err(AnalysisError::EmptyKnowledgeBase);
        }
        if !gc_content.is_finite() {
            return Err(AnalysisError::InvalidParameter {
                parameter: "gc_content".to_string(),
                reason: format!("{gc_content} is not a finite number"),
            });
        }

        // first record with gc >= query
        let upper = self.records.partition_point(|r| r.gc_content < gc_content);
        let chosen_gc = match (upper.checked_sub(1), self.records.get(upper)) {
            (Some(lo), Some(hi)) => {
                let below = gc_content - self.records[lo].gc_content;
                let above = hi.gc_content - gc_content;
                if below <= above {
                    self.records[lo].gc_content
                } else {
                    hi.gc_content
                }
            }
            (Some(lo), None) => self.records[lo].gc_content,
            (None, Some(hi)) => hi.gc_content,
            (None, None) => unreachable!("knowledge base checked non-empty"),
        };

        let first = self.records.partition_point(|r| r.gc_content < chosen_gc);
        Ok(&self.records[first])
    }

    pub fn gc_summary(&self) -> Result<GcSummary> {
        if self.records.is_empty() {
            return Err(AnalysisError::EmptyKnowledgeBase);
        }
        let values: Vec<f64> = self.records.iter().map(|r| r.gc_content).collect();
        Ok(GcSummary {
            count: values.len(),
            mean: values.iter().mean(),
            std_dev: values.iter().std_dev(),
        })
    }
}
