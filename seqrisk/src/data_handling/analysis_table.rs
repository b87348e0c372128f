//! Flat tabular export of feature rows and its re-import.
//!
//! Columns: `id, sequence, gc_content, motifs_repetes, longueur, cluster`.
//! The motif column holds `MOTIF:COUNT` entries joined by `;`, sorted by
//! motif, e.g. `AAA:2;TTG:3`. An empty cell is an empty mapping.

use std::path::{Path, PathBuf};

use polars::df;
use polars::prelude::*;
use tracing::{error, info};

use crate::data_handling::Dataset;
use crate::errors::{AnalysisError, Result};
use crate::helper_functions::{
    dataframe_to_csv, f64_values, invalid_record, read_csv, require_columns, string_values,
    string_values_or_empty,
};
use crate::models::{FeatureRow, MotifCounts};

pub const EXPORT_COLUMNS: [&str; 6] = ["id", "sequence", "gc_content", "motifs_repetes", "longueur", "cluster"];

const ENTRY_SEPARATOR: &str = ";";
const COUNT_SEPARATOR: &str = ":";

pub fn encode_motifs(motifs: &MotifCounts) -> String {
    motifs
        .iter()
        .map(|(motif, count)| format!("{motif}{COUNT_SEPARATOR}{count}"))
        .collect::<Vec<_>>()
        .join(ENTRY_SEPARATOR)
}

pub fn decode_motifs(encoded: &str) -> Result<MotifCounts> {
    let mut motifs = MotifCounts::new();
    let encoded = encoded.trim();
    if encoded.is_empty() {
        return Ok(motifs);
    }

    for entry in encoded.split(ENTRY_SEPARATOR) {
        let bad = |reason: &str| AnalysisError::InvalidMotifEncoding {
            entry: entry.to_string(),
            reason: reason.to_string(),
        };
        let (motif, count) = entry
            .split_once(COUNT_SEPARATOR)
            .ok_or_else(|| bad("expected MOTIF:COUNT"))?;
        if motif.is_empty() || !motif.chars().all(|c| c.is_ascii_graphic()) {
            return Err(bad("motif must be non-empty printable ASCII"));
        }
        let count: usize = count.parse().map_err(|_| bad("count is not an integer"))?;
        if count < 2 {
            return Err(bad("a repeated motif occurs at least twice"));
        }
        if motifs.insert(motif.to_string(), count).is_some() {
            return Err(bad("duplicate motif"));
        }
    }
    Ok(motifs)
}

pub fn feature_rows_to_dataframe(rows: &[FeatureRow]) -> PolarsResult<DataFrame> {
    let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
    let sequences: Vec<&str> = rows.iter().map(|r| r.sequence.as_str()).collect();
    let gc: Vec<f64> = rows.iter().map(|r| r.gc_content).collect();
    let motifs: Vec<String> = rows.iter().map(|r| encode_motifs(&r.motif_counts)).collect();
    let lengths: Vec<u64> = rows.iter().map(|r| r.length as u64).collect();
    let clusters: Vec<Option<u32>> = rows.iter().map(|r| r.cluster_id.map(|c| c as u32)).collect();

    df![
        "id" => ids,
        "sequence" => sequences,
        "gc_content" => gc,
        "motifs_repetes" => motifs,
        "longueur" => lengths,
        "cluster" => clusters
    ]
}

/// Writes one row per feature row, in the given order.
pub fn write_analysis_table(rows: &[FeatureRow], path: &Path) -> Result<()> {
    let mut df = feature_rows_to_dataframe(rows)?;
    dataframe_to_csv(&mut df, path)?;
    info!("Analysis results for {} sequences saved to {}", rows.len(), path.display());
    Ok(())
}

pub fn feature_rows_from_dataframe(df: &DataFrame, source_name: &str) -> Result<Vec<FeatureRow>> {
    require_columns(df, &EXPORT_COLUMNS, source_name)?;

    let ids = string_values(df, "id", source_name)?;
    let sequences = string_values_or_empty(df, "sequence")?;
    let gc = f64_values(df, "gc_content", source_name)?;
    let motifs = string_values_or_empty(df, "motifs_repetes")?;
    let lengths = f64_values(df, "longueur", source_name)?;
    let clusters = df.column("cluster")?.cast(&DataType::Int64)?;
    let clusters = clusters.i64()?;

    let mut rows = Vec::with_capacity(df.height());
    for (row, cluster) in clusters.into_iter().enumerate() {
        let length = lengths[row];
        if length < 0.0 || length.fract() != 0.0 {
            return Err(invalid_record(source_name, row, format!("longueur {length} is not a length")));
        }
        let cluster_id = match cluster {
            Some(c) if c < 0 => {
                return Err(invalid_record(source_name, row, format!("cluster {c} is negative")));
            }
            other => other.map(|c| c as usize),
        };
        rows.push(FeatureRow {
            id: ids[row].clone(),
            sequence: sequences[row].clone(),
            gc_content: gc[row],
            length: length as usize,
            motif_counts: decode_motifs(&motifs[row])?,
            cluster_id,
        });
    }
    Ok(rows)
}

/// A previously exported analysis table.
pub struct AnalysisTableDataset {
    pub path: PathBuf,
}

impl Dataset for AnalysisTableDataset {
    type Output = Vec<FeatureRow>;

    fn load(&self) -> Result<Vec<FeatureRow>> {
        info!("Reading analysis table from {}", self.path.display());
        let df = match read_csv(&self.path) {
            Ok(df) => df,
            Err(e) => {
                error!("Failed to read analysis table CSV: {}", e);
                return Err(e.into());
            }
        };
        let rows = feature_rows_from_dataframe(&df, &self.path.display().to_string())?;
        info!("Analysis table loaded: {} sequences", rows.len());
        Ok(rows)
    }
}
