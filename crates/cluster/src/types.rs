use perceptual::PerceptualError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Cluster label assigned to one document.
pub type Label = usize;

/// Ordered list of document names sharing a label.
pub type Cluster = Vec<String>;

/// Parameters of the distance matrix and the density-based grouping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClusterConfig {
    /// Maximum distance (inclusive) for two documents to be neighbors.
    #[serde(default = "ClusterConfig::default_eps")]
    pub eps: f64,
    /// Neighbors, the point itself included, required for a core point.
    #[serde(default = "ClusterConfig::default_min_samples")]
    pub min_samples: usize,
    /// Scale applied to `1 - similarity`; distances live in `[0, text_weight]`.
    #[serde(default = "ClusterConfig::default_text_weight")]
    pub text_weight: f64,
    /// Compute matrix rows on the rayon pool.
    #[serde(default = "ClusterConfig::default_use_parallel")]
    pub use_parallel: bool,
}

impl ClusterConfig {
    pub(crate) fn default_eps() -> f64 {
        0.6
    }

    pub(crate) fn default_min_samples() -> usize {
        1
    }

    pub(crate) fn default_text_weight() -> f64 {
        0.88
    }

    pub(crate) fn default_use_parallel() -> bool {
        true
    }

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }

    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = min_samples;
        self
    }

    pub fn with_text_weight(mut self, text_weight: f64) -> Self {
        self.text_weight = text_weight;
        self
    }

    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ClusterError> {
        if !self.eps.is_finite() || self.eps < 0.0 {
            return Err(ClusterError::InvalidConfig(format!(
                "eps must be a finite value >= 0.0 (got {})",
                self.eps
            )));
        }
        if self.min_samples == 0 {
            return Err(ClusterError::InvalidConfig(
                "min_samples must be greater than zero".into(),
            ));
        }
        if !self.text_weight.is_finite() || self.text_weight <= 0.0 {
            return Err(ClusterError::InvalidConfig(format!(
                "text_weight must be a finite value > 0.0 (got {})",
                self.text_weight
            )));
        }
        Ok(())
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            eps: Self::default_eps(),
            min_samples: Self::default_min_samples(),
            text_weight: Self::default_text_weight(),
            use_parallel: Self::default_use_parallel(),
        }
    }
}

/// Errors returned by the clustering layer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClusterError {
    #[error("invalid cluster config: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Perceptual(#[from] PerceptualError),
    #[error("length mismatch: {names} names but {labels} labels")]
    LengthMismatch { names: usize, labels: usize },
    #[error("invalid distance matrix: {0}")]
    InvalidMatrix(String),
}
