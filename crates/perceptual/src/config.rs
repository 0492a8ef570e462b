//! Configuration and error types for MinHash fingerprinting.
//!
//! The fingerprint stage is a pure function of `(feature_record, config)`:
//! no I/O, no clock, no global state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration for the fingerprint builder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerceptualConfig {
    /// Configuration schema version.
    ///
    /// Any algorithmic change that can affect the fingerprint must bump this
    /// version so old fingerprints are never silently compared with new ones.
    pub version: u32,
    /// Number of MinHash permutations (slots in the sketch).
    ///
    /// The standard error of the Jaccard estimate is roughly
    /// `1 / sqrt(num_perm)`.
    pub num_perm: usize,
    /// Seed of the hash family.
    ///
    /// Sketches are only comparable when they share both `num_perm` and
    /// `seed`.
    pub seed: u64,
    /// Compute sketch slots in parallel with rayon.
    ///
    /// The result is bit-identical to the sequential path.
    pub use_parallel: bool,
}

impl PerceptualConfig {
    /// Create a new configuration with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of permutations. Typical values: 64-512.
    pub fn with_num_perm(mut self, num_perm: usize) -> Self {
        self.num_perm = num_perm;
        self
    }

    /// Set the hash family seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enable or disable parallel slot computation.
    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), PerceptualError> {
        if self.version < 1 {
            return Err(PerceptualError::InvalidConfigVersion {
                version: self.version,
            });
        }
        if self.num_perm < 1 {
            return Err(PerceptualError::InvalidConfigNumPerm {
                num_perm: self.num_perm,
            });
        }
        Ok(())
    }
}

impl Default for PerceptualConfig {
    fn default() -> Self {
        Self {
            version: 1,
            num_perm: 256,
            seed: 0xF00D_BAAD_F00D_BAAD,
            use_parallel: false,
        }
    }
}

/// Errors returned by the fingerprint builder.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PerceptualError {
    #[error("invalid config: num_perm must be >= 1 (got {num_perm})")]
    InvalidConfigNumPerm { num_perm: usize },

    #[error("invalid config version {version}; expected >= 1")]
    InvalidConfigVersion { version: u32 },

    #[error("feature record requires a non-empty doc_id")]
    MissingDocId,

    #[error(
        "sketch parameters differ: num_perm {left_num_perm} vs {right_num_perm}, \
         seed {left_seed:#x} vs {right_seed:#x}"
    )]
    ParameterMismatch {
        left_num_perm: usize,
        right_num_perm: usize,
        left_seed: u64,
        right_seed: u64,
    },
}
