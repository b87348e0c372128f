use tracing::info;

use crate::analysis::clustering::{cluster_points, ClusterParams};
use crate::analysis::features::extract_features;
use crate::config::AnalysisConfig;
use crate::errors::Result;
use crate::models::{FeatureRow, SequenceRecord};

/// Computes features for every record and assigns cluster ids. Rows come back
/// in input order.
pub fn analyze_sequences(records: &[SequenceRecord], config: &AnalysisConfig) -> Result<Vec<FeatureRow>> {
    config.validate()?;
    info!("Analysing {} sequences (motif length {})", records.len(), config.motif_length);

    let mut rows = extract_features(records, config.motif_length)?;

    let points: Vec<(f64, f64)> = rows.iter().map(|r| (r.gc_content, r.length as f64)).collect();
    let assignment = cluster_points(&points, &ClusterParams::from(config))?;
    for (row, label) in rows.iter_mut().zip(assignment.labels) {
        row.cluster_id = Some(label);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AnalysisError;

    fn records() -> Vec<SequenceRecord> {
        vec![
            SequenceRecord::new("short_at_1", "ATATATATAT"),
            SequenceRecord::new("long_gc_1", "GCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGC"),
            SequenceRecord::new("short_at_2", "ATTATATAAT"),
            SequenceRecord::new("mid_1", "ACGTACGTACGTACGTACGTACGTA"),
            SequenceRecord::new("long_gc_2", "GGCCGGCCGGCCGGCCGGCCGGCCGGCCGGCCGGCCGGCCG"),
            SequenceRecord::new("mid_2", "ACGTTCGAACGTACGTACGTACGAT"),
        ]
    }

    #[test]
    fn rows_are_clustered_in_input_order() {
        let rows = analyze_sequences(&records(), &AnalysisConfig::default()).unwrap();
        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["short_at_1", "long_gc_1", "short_at_2", "mid_1", "long_gc_2", "mid_2"]);

        let clusters: Vec<usize> = rows.iter().map(|r| r.cluster_id.unwrap()).collect();
        assert_eq!(clusters, vec![0, 2, 0, 1, 2, 1]);
    }

    #[test]
    fn too_few_sequences_for_k() {
        let records = vec![SequenceRecord::new("a", "ACGT"), SequenceRecord::new("b", "GGGG")];
        assert!(matches!(
            analyze_sequences(&records, &AnalysisConfig::default()),
            Err(AnalysisError::Clustering { .. })
        ));
    }

    #[test]
    fn invalid_config_is_rejected_before_work() {
        let config = AnalysisConfig { motif_length: 0, ..AnalysisConfig::default() };
        assert!(matches!(
            analyze_sequences(&records(), &config),
            Err(AnalysisError::InvalidParameter { .. })
        ));
    }
}
