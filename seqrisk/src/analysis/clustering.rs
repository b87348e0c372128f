//! Unsupervised grouping of sequences on (GC content, length).

use linfa::prelude::*;
use linfa::DatasetBase;
use linfa_clustering::KMeans;
use ndarray::{Array1, Array2};
use rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, info};

use crate::config::AnalysisConfig;
use crate::errors::{AnalysisError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterParams {
    pub n_clusters: usize,
    pub seed: u64,
    pub max_iterations: u64,
    pub tolerance: f64,
    pub n_runs: usize,
}

impl From<&AnalysisConfig> for ClusterParams {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            n_clusters: config.n_clusters,
            seed: config.seed,
            max_iterations: config.max_iterations,
            tolerance: config.tolerance,
            n_runs: config.n_runs,
        }
    }
}

impl Default for ClusterParams {
    fn default() -> Self {
        (&AnalysisConfig::default()).into()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterAssignment {
    /// One label per input point, in `[0, n_clusters)`.
    pub labels: Vec<usize>,
    /// `(gc_content, length)` centroid per label.
    pub centroids: Vec<(f64, f64)>,
}

impl ClusterAssignment {
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.centroids.len()];
        for &label in &self.labels {
            sizes[label] += 1;
        }
        sizes
    }
}

/// Partitions `(gc_content, length)` points with seeded k-means++.
///
/// Labels are renumbered so that cluster 0 has the lowest centroid GC content
/// (ties broken by length), which keeps ids stable for identical input.
///
/// # Errors
///
/// * `Clustering` when `n_clusters` is 0 or exceeds the number of points or
///   of distinct points
pub fn cluster_points(points: &[(f64, f64)], params: &ClusterParams) -> Result<ClusterAssignment> {
    let k = params.n_clusters;
    let n_distinct = count_distinct(points);
    let fail = |reason: &str| AnalysisError::Clustering {
        k,
        n_points: points.len(),
        n_distinct,
        reason: reason.to_string(),
    };

    if k == 0 {
        return Err(fail("at least one cluster is required"));
    }
    if points.len() < k {
        return Err(fail("fewer sequences than clusters"));
    }
    if n_distinct < k {
        return Err(fail("fewer distinct (gc_content, length) points than clusters"));
    }
    if points.iter().any(|(gc, len)| !gc.is_finite() || !len.is_finite()) {
        return Err(fail("features must be finite"));
    }

    let x = Array2::from_shape_fn((points.len(), 2), |(i, j)| {
        if j == 0 {
            points[i].0
        } else {
            points[i].1
        }
    });
    let observations = DatasetBase::from(x.clone());

    let model = KMeans::params_with_rng(k, StdRng::seed_from_u64(params.seed))
        .n_runs(params.n_runs)
        .max_n_iterations(params.max_iterations)
        .tolerance(params.tolerance)
        .fit(&observations)
        .map_err(|e| fail(&e.to_string()))?;

    let raw_labels: Array1<usize> = model.predict(&x);
    debug!("Fitted centroids: {:?}", model.centroids());
    let raw_centroids = member_means(points, &raw_labels, model.centroids());
    debug!("Member-mean centroids: {:?}", raw_centroids);

    // order[new] = old
    let mut order: Vec<usize> = (0..raw_centroids.len()).collect();
    order.sort_by(|&a, &b| {
        raw_centroids[a]
            .0
            .total_cmp(&raw_centroids[b].0)
            .then(raw_centroids[a].1.total_cmp(&raw_centroids[b].1))
    });
    let mut relabel = vec![0; order.len()];
    for (new, &old) in order.iter().enumerate() {
        relabel[old] = new;
    }

    let assignment = ClusterAssignment {
        labels: raw_labels.iter().map(|&l| relabel[l]).collect(),
        centroids: order.iter().map(|&old| raw_centroids[old]).collect(),
    };
    info!(
        "Clustered {} sequences into {} clusters, sizes {:?}",
        points.len(),
        k,
        assignment.cluster_sizes()
    );
    Ok(assignment)
}

/// Mean `(gc_content, length)` of the points carrying each label. A label
/// with no members keeps the fitted centroid.
fn member_means(points: &[(f64, f64)], labels: &Array1<usize>, fitted: &Array2<f64>) -> Vec<(f64, f64)> {
    let mut sums = vec![(0.0, 0.0, 0usize); fitted.nrows()];
    for (&(gc, len), &label) in points.iter().zip(labels.iter()) {
        let entry = &mut sums[label];
        entry.0 += gc;
        entry.1 += len;
        entry.2 += 1;
    }
    sums.iter()
        .zip(fitted.outer_iter())
        .map(|(&(gc, len, n), row)| {
            if n == 0 {
                (row[0], row[1])
            } else {
                (gc / n as f64, len / n as f64)
            }
        })
        .collect()
}

fn count_distinct(points: &[(f64, f64)]) -> usize {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
    sorted.dedup_by(|a, b| a.0.total_cmp(&b.0).is_eq() && a.1.total_cmp(&b.1).is_eq());
    sorted.len()
}
