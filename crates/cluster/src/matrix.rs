//! Pairwise distance matrix over MinHash sketches.

use ndarray::{Array2, ArrayView1};
use perceptual::MinHashSketch;
use rayon::prelude::*;

use crate::types::{ClusterConfig, ClusterError};

/// Symmetric `n x n` table of distances in `[0, text_weight]` with a zero
/// diagonal. Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    values: Array2<f64>,
}

impl DistanceMatrix {
    /// Compute `(1 - jaccard(i, j)) * text_weight` for every pair.
    ///
    /// Every sketch must share the first sketch's `num_perm` and seed; the
    /// check runs before any comparison.
    pub fn build(sketches: &[&MinHashSketch], cfg: &ClusterConfig) -> Result<Self, ClusterError> {
        cfg.validate()?;
        let n = sketches.len();
        if let Some(first) = sketches.first() {
            for other in &sketches[1..] {
                first.check_compatible(other)?;
            }
        }

        let weight = cfg.text_weight;
        // Row i holds the distances to every j > i.
        let upper_row = |i: usize| -> Result<Vec<f64>, ClusterError> {
            let left = sketches[i];
            sketches[i + 1..]
                .iter()
                .map(|right| -> Result<f64, ClusterError> {
                    Ok((1.0 - left.jaccard(right)?) * weight)
                })
                .collect()
        };

        let rows: Vec<Vec<f64>> = if cfg.use_parallel {
            (0..n).into_par_iter().map(upper_row).collect::<Result<_, _>>()?
        } else {
            (0..n).map(upper_row).collect::<Result<_, _>>()?
        };

        let mut values = Array2::<f64>::zeros((n, n));
        for (i, row) in rows.into_iter().enumerate() {
            for (offset, d) in row.into_iter().enumerate() {
                let j = i + 1 + offset;
                values[[i, j]] = d;
                values[[j, i]] = d;
            }
        }
        Ok(Self { values })
    }

    /// Wrap a precomputed matrix after checking it is square, symmetric,
    /// finite, non-negative and zero on the diagonal.
    pub fn from_array(values: Array2<f64>) -> Result<Self, ClusterError> {
        let (rows, cols) = values.dim();
        if rows != cols {
            return Err(ClusterError::InvalidMatrix(format!(
                "matrix must be square (got {rows}x{cols})"
            )));
        }
        for i in 0..rows {
            if values[[i, i]] != 0.0 {
                return Err(ClusterError::InvalidMatrix(format!(
                    "diagonal entry {i} is {} instead of 0",
                    values[[i, i]]
                )));
            }
            for j in (i + 1)..cols {
                let d = values[[i, j]];
                if !d.is_finite() || d < 0.0 {
                    return Err(ClusterError::InvalidMatrix(format!(
                        "entry ({i}, {j}) is not a finite non-negative distance: {d}"
                    )));
                }
                if d != values[[j, i]] {
                    return Err(ClusterError::InvalidMatrix(format!(
                        "entries ({i}, {j}) and ({j}, {i}) differ"
                    )));
                }
            }
        }
        Ok(Self { values })
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.values.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distance between documents `i` and `j`, `None` when out of range.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.values.get([i, j]).copied()
    }

    /// Distances from document `i` to every document.
    ///
    /// Panics when `i` is out of range.
    pub fn row(&self, i: usize) -> ArrayView1<'_, f64> {
        self.values.row(i)
    }

    pub fn as_array(&self) -> &Array2<f64> {
        &self.values
    }

    /// Indices within `eps` (inclusive) of document `i`, `i` itself included,
    /// in ascending order.
    pub fn neighbors(&self, i: usize, eps: f64) -> Vec<usize> {
        self.values
            .row(i)
            .iter()
            .enumerate()
            .filter(|(_, d)| **d <= eps)
            .map(|(j, _)| j)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sketch(tokens: &[&str]) -> MinHashSketch {
        let mut s = MinHashSketch::new(256, 7).unwrap();
        s.update_all(tokens.iter().map(|t| t.as_bytes()));
        s
    }

    fn sample_sketches() -> Vec<MinHashSketch> {
        vec![
            sketch(&["hello", "world"]),
            sketch(&["hello", "world"]),
            sketch(&["alpha", "beta", "gamma"]),
            sketch(&["alpha", "beta", "delta"]),
            sketch(&[]),
        ]
    }

    #[test]
    fn symmetric_with_zero_diagonal() {
        let owned = sample_sketches();
        let refs: Vec<&MinHashSketch> = owned.iter().collect();
        let m = DistanceMatrix::build(&refs, &ClusterConfig::default()).unwrap();

        assert_eq!(m.len(), 5);
        for i in 0..m.len() {
            assert_eq!(m.get(i, i), Some(0.0));
            for j in 0..m.len() {
                assert_eq!(m.get(i, j), m.get(j, i));
                let d = m.get(i, j).unwrap();
                assert!((0.0..=0.88).contains(&d));
            }
        }
    }

    #[test]
    fn identical_and_disjoint_distances() {
        let owned = sample_sketches();
        let refs: Vec<&MinHashSketch> = owned.iter().collect();
        let m = DistanceMatrix::build(&refs, &ClusterConfig::default()).unwrap();

        assert_eq!(m.get(0, 1), Some(0.0));
        assert!((m.get(0, 2).unwrap() - 0.88).abs() < 1e-12);
    }

    #[test]
    fn text_weight_scales_distances() {
        let owned = vec![sketch(&["a"]), sketch(&["b"])];
        let refs: Vec<&MinHashSketch> = owned.iter().collect();
        let cfg = ClusterConfig::default().with_text_weight(1.0);
        let m = DistanceMatrix::build(&refs, &cfg).unwrap();
        assert_eq!(m.get(0, 1), Some(1.0));
    }

    #[test]
    fn parallel_equals_sequential() {
        let owned: Vec<MinHashSketch> = (0..40)
            .map(|i| {
                let toks: Vec<String> = (i..i + 20).map(|t| format!("t{}", t % 50)).collect();
                let mut s = MinHashSketch::new(128, 3).unwrap();
                s.update_all(&toks);
                s
            })
            .collect();
        let refs: Vec<&MinHashSketch> = owned.iter().collect();

        let seq_cfg = ClusterConfig::default().with_parallel(false);
        let par_cfg = ClusterConfig::default().with_parallel(true);
        let seq = DistanceMatrix::build(&refs, &seq_cfg).unwrap();
        let par = DistanceMatrix::build(&refs, &par_cfg).unwrap();
        assert_eq!(seq, par);
    }

    #[test]
    fn empty_and_single_inputs() {
        let m = DistanceMatrix::build(&[], &ClusterConfig::default()).unwrap();
        assert!(m.is_empty());

        let only = sketch(&["x"]);
        let m = DistanceMatrix::build(&[&only], &ClusterConfig::default()).unwrap();
        assert_eq!(m.len(), 1);
        assert_eq!(m.get(0, 0), Some(0.0));
    }

    #[test]
    fn mismatched_parameters_rejected() {
        let a = MinHashSketch::new(64, 1).unwrap();
        let b = MinHashSketch::new(128, 1).unwrap();
        let err = DistanceMatrix::build(&[&a, &b], &ClusterConfig::default()).unwrap_err();
        assert!(matches!(err, ClusterError::Perceptual(_)));
    }

    #[test]
    fn invalid_config_rejected() {
        let a = sketch(&["x"]);
        let cfg = ClusterConfig::default().with_text_weight(-1.0);
        assert!(matches!(
            DistanceMatrix::build(&[&a], &cfg),
            Err(ClusterError::InvalidConfig(_))
        ));
    }

    #[test]
    fn neighbors_include_self_and_are_inclusive() {
        let m = DistanceMatrix::from_array(array![
            [0.0, 0.6, 0.7],
            [0.6, 0.0, 0.1],
            [0.7, 0.1, 0.0],
        ])
        .unwrap();
        assert_eq!(m.neighbors(0, 0.6), vec![0, 1]);
        assert_eq!(m.neighbors(2, 0.0), vec![2]);
        assert_eq!(m.row(1).to_vec(), vec![0.6, 0.0, 0.1]);
    }

    #[test]
    fn from_array_validates_shape_and_symmetry() {
        assert!(DistanceMatrix::from_array(Array2::zeros((2, 3))).is_err());
        assert!(DistanceMatrix::from_array(array![[0.0, 0.2], [0.3, 0.0]]).is_err());
        assert!(DistanceMatrix::from_array(array![[1.0, 0.2], [0.2, 0.0]]).is_err());
        assert!(DistanceMatrix::from_array(array![[0.0, -0.2], [-0.2, 0.0]]).is_err());
        assert!(DistanceMatrix::from_array(array![[0.0, 0.2], [0.2, 0.0]]).is_ok());
    }

    #[test]
    fn get_out_of_range_is_none() {
        let m = DistanceMatrix::from_array(array![[0.0]]).unwrap();
        assert_eq!(m.get(0, 1), None);
        assert_eq!(m.as_array().dim(), (1, 1));
    }
}
