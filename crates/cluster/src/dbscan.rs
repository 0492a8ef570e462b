//! Density-based clustering over a precomputed distance matrix.

use std::collections::VecDeque;

use crate::matrix::DistanceMatrix;
use crate::types::Label;

/// Assign a cluster label to every document of `matrix`.
///
/// Neighborhoods are inclusive (`distance <= eps`) and contain the point
/// itself; a core point has at least `min_samples` neighbors. Clusters are
/// grown breadth-first from core points in ascending index order and
/// labelled `0, 1, 2, ...` in creation order. A border point joins the
/// first cluster that reaches it.
///
/// Points no core point reaches become singleton clusters with fresh labels,
/// in ascending index order, after the scan. No point is left unlabelled.
/// A `min_samples` of zero behaves like one.
pub fn dbscan(matrix: &DistanceMatrix, eps: f64, min_samples: usize) -> Vec<Label> {
    let n = matrix.len();
    let min_samples = min_samples.max(1);

    let neighborhoods: Vec<Vec<usize>> = (0..n).map(|i| matrix.neighbors(i, eps)).collect();
    let is_core: Vec<bool> = neighborhoods
        .iter()
        .map(|hood| hood.len() >= min_samples)
        .collect();

    let mut labels: Vec<Option<Label>> = vec![None; n];
    let mut next_label: Label = 0;
    let mut queue = VecDeque::new();

    for seed in 0..n {
        if labels[seed].is_some() || !is_core[seed] {
            continue;
        }
        let label = next_label;
        next_label += 1;

        labels[seed] = Some(label);
        queue.push_back(seed);
        while let Some(point) = queue.pop_front() {
            // Border points are labelled but do not expand the cluster.
            if !is_core[point] {
                continue;
            }
            for &neighbor in &neighborhoods[point] {
                if labels[neighbor].is_none() {
                    labels[neighbor] = Some(label);
                    queue.push_back(neighbor);
                }
            }
        }
    }

    labels
        .into_iter()
        .map(|label| {
            label.unwrap_or_else(|| {
                let fresh = next_label;
                next_label += 1;
                fresh
            })
        })
        .collect()
}
