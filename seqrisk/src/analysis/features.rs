use tracing::debug;

use crate::errors::{AnalysisError, Result};
use crate::models::{FeatureRow, MotifCounts, SequenceRecord};

/// Alphabet accepted for risk queries.
pub const NUCLEOTIDES: &str = "ACGT";

/// Maps nucleotide characters to whether they count as G/C; `None` for
/// anything outside A/C/G/T.
fn gc_flag(base: u8) -> Option<bool> {
    match base {
        b'G' | b'g' | b'C' | b'c' => Some(true),
        b'A' | b'a' | b'T' | b't' => Some(false),
        _ => None,
    }
}

/// Percentage of G/C among the A/C/G/T characters of `sequence`
/// (case-insensitive). Ambiguity codes are excluded from numerator and
/// denominator.
///
/// # Errors
///
/// * `InvalidSequence` if no A/C/G/T character is present
pub fn gc_content(sequence: &str) -> Result<f64> {
    let (gc, counted) = sequence
        .bytes()
        .filter_map(gc_flag)
        .fold((0usize, 0usize), |(gc, n), is_gc| (gc + is_gc as usize, n + 1));

    if counted == 0 {
        let reason = if sequence.is_empty() {
            "sequence is empty".to_string()
        } else {
            "sequence contains no A/C/G/T nucleotides".to_string()
        };
        return Err(AnalysisError::InvalidSequence { id: String::new(), reason });
    }
    Ok(gc as f64 / counted as f64 * 100.0)
}

/// Literal character count, ambiguity codes included.
pub fn sequence_length(sequence: &str) -> usize {
    sequence.chars().count()
}

/// Counts every window of `motif_length` characters and keeps those seen more than
/// once. Matching is exact and case-sensitive.
pub fn find_repeated_motifs(sequence: &str, motif_length: usize) -> Result<MotifCounts> {
    if motif_length == 0 {
        return Err(AnalysisError::InvalidParameter {
            parameter: "motif_length".to_string(),
            reason: "must be >= 1".to_string(),
        });
    }

    let symbols: Vec<char> = sequence.chars().collect();
    let mut counts = MotifCounts::new();
    for window in symbols.windows(motif_length) {
        *counts.entry(window.iter().collect()).or_insert(0) += 1;
    }
    counts.retain(|_, count| *count > 1);
    Ok(counts)
}

/// Fails with the distinct symbols outside A/C/G/T, in order of first
/// appearance. Lower-case nucleotides are accepted.
pub fn validate_nucleotides(sequence: &str) -> Result<()> {
    let mut invalid: Vec<char> = Vec::new();
    for c in sequence.chars() {
        if !NUCLEOTIDES.contains(c.to_ascii_uppercase()) && !invalid.contains(&c) {
            invalid.push(c);
        }
    }
    if invalid.is_empty() {
        Ok(())
    } else {
        Err(AnalysisError::InvalidCharacter {
            symbols: invalid,
            allowed: NUCLEOTIDES.to_string(),
        })
    }
}

/// Builds one unclustered row per record, in input order. The first record
/// that fails aborts the batch.
pub fn extract_features(records: &[SequenceRecord], motif_length: usize) -> Result<Vec<FeatureRow>> {
    records
        .iter()
        .map(|record| -> Result<FeatureRow> {
            let gc = gc_content(&record.sequence).map_err(|e| match e {
                AnalysisError::InvalidSequence { reason, .. } => AnalysisError::InvalidSequence {
                    id: record.id.clone(),
                    reason,
                },
                other => other,
            })?;
            let motif_counts = find_repeated_motifs(&record.sequence, motif_length)?;
            let length = sequence_length(&record.sequence);
            debug!(
                "{}: gc={:.2} len={} repeated motifs={}",
                record.id,
                gc,
                length,
                motif_counts.len()
            );
            Ok(FeatureRow {
                id: record.id.clone(),
                sequence: record.sequence.clone(),
                gc_content: gc,
                length,
                motif_counts,
                cluster_id: None,
            })
        })
        .collect()
}
