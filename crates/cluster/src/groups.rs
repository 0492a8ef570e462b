use std::collections::BTreeMap;

use perceptual::MinHashSketch;
use tracing::debug;

use crate::dbscan::dbscan;
use crate::matrix::DistanceMatrix;
use crate::types::{Cluster, ClusterConfig, ClusterError, Label};

/// Outcome of clustering one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    /// Pairwise distances, in input order.
    pub matrix: DistanceMatrix,
    /// One label per input document.
    pub labels: Vec<Label>,
    /// Documents grouped by label, ordered by label.
    pub clusters: Vec<Cluster>,
}

/// Group `names` by their label.
///
/// Clusters come out ordered by label and keep the input order of their
/// members. Every name lands in exactly one cluster.
pub fn group_by_label<S: AsRef<str>>(
    names: &[S],
    labels: &[Label],
) -> Result<Vec<Cluster>, ClusterError> {
    if names.len() != labels.len() {
        return Err(ClusterError::LengthMismatch {
            names: names.len(),
            labels: labels.len(),
        });
    }

    let mut by_label: BTreeMap<Label, Cluster> = BTreeMap::new();
    for (name, &label) in names.iter().zip(labels) {
        by_label
            .entry(label)
            .or_default()
            .push(name.as_ref().to_string());
    }
    Ok(by_label.into_values().collect())
}

/// Sort clusters by descending size; equal sizes keep their relative order.
pub fn sort_by_size_desc(clusters: &mut [Cluster]) {
    clusters.sort_by(|a, b| b.len().cmp(&a.len()));
}

/// Build the distance matrix, run the density scan and group the names.
///
/// `names[i]` must belong to `sketches[i]`.
pub fn cluster_documents<S: AsRef<str>>(
    names: &[S],
    sketches: &[&MinHashSketch],
    cfg: &ClusterConfig,
) -> Result<Clustering, ClusterError> {
    if names.len() != sketches.len() {
        return Err(ClusterError::LengthMismatch {
            names: names.len(),
            labels: sketches.len(),
        });
    }

    let matrix = DistanceMatrix::build(sketches, cfg)?;
    let labels = dbscan(&matrix, cfg.eps, cfg.min_samples);
    let clusters = group_by_label(names, &labels)?;
    debug!(
        documents = names.len(),
        clusters = clusters.len(),
        eps = cfg.eps,
        min_samples = cfg.min_samples,
        "clustered collection"
    );

    Ok(Clustering {
        matrix,
        labels,
        clusters,
    })
}
