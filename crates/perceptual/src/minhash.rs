//! MinHash sketches over token sets.
//!
//! A sketch holds, for each of `num_perm` hash functions, the minimum hash
//! value seen over every token fed into it. The fraction of slots on which
//! two sketches agree is an unbiased estimate of the Jaccard similarity of
//! the underlying token sets. The hash family is derived deterministically
//! from a single 64-bit seed.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64_with_seed;

use crate::config::{PerceptualConfig, PerceptualError};

/// Value of a slot that has not absorbed any token yet.
pub const EMPTY_SLOT: u64 = u64::MAX;

/// Fixed-width MinHash sketch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinHashSketch {
    seed: u64,
    hashvalues: Box<[u64]>,
}

impl MinHashSketch {
    /// Create an empty sketch with `num_perm` slots.
    pub fn new(num_perm: usize, seed: u64) -> Result<Self, PerceptualError> {
        if num_perm == 0 {
            return Err(PerceptualError::InvalidConfigNumPerm { num_perm });
        }
        Ok(Self {
            seed,
            hashvalues: vec![EMPTY_SLOT; num_perm].into_boxed_slice(),
        })
    }

    /// Build a sketch from a token stream using the parameters in `cfg`.
    ///
    /// Token hashes are deduplicated before the slots are computed.
    pub fn from_tokens<I, T>(tokens: I, cfg: &PerceptualConfig) -> Result<Self, PerceptualError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        cfg.validate()?;
        let mut hashes: Vec<u64> = tokens
            .into_iter()
            .map(|t| token_hash(t.as_ref(), cfg.seed))
            .collect();
        hashes.sort_unstable();
        hashes.dedup();
        Self::from_token_hashes(&hashes, cfg.num_perm, cfg.seed, cfg.use_parallel)
    }

    /// Build a sketch from already-hashed tokens (see [`token_hash`]).
    ///
    /// Callers should pass deduplicated hashes; duplicates are harmless but
    /// cost time. With `use_parallel` the slots are computed on the rayon
    /// pool; the result is identical to the sequential path.
    pub fn from_token_hashes(
        unique_hashes: &[u64],
        num_perm: usize,
        seed: u64,
        use_parallel: bool,
    ) -> Result<Self, PerceptualError> {
        if num_perm == 0 {
            return Err(PerceptualError::InvalidConfigNumPerm { num_perm });
        }

        let mut hashvalues = Vec::with_capacity(num_perm);
        if use_parallel {
            (0..num_perm)
                .into_par_iter()
                .map(|j| compute_slot(unique_hashes, j, seed))
                .collect_into_vec(&mut hashvalues);
        } else {
            hashvalues.extend((0..num_perm).map(|j| compute_slot(unique_hashes, j, seed)));
        }

        Ok(Self {
            seed,
            hashvalues: hashvalues.into_boxed_slice(),
        })
    }

    /// Feed one token into the sketch. Feeding the same token again is a
    /// no-op.
    pub fn update(&mut self, token: &[u8]) {
        let h = token_hash(token, self.seed);
        for (j, slot) in self.hashvalues.iter_mut().enumerate() {
            let v = mix_u64(h, slot_key(self.seed, j));
            if v < *slot {
                *slot = v;
            }
        }
    }

    /// Feed every token of `tokens`, in order.
    pub fn update_all<I, T>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        for token in tokens {
            self.update(token.as_ref());
        }
    }

    /// Number of permutations (slots).
    pub fn num_perm(&self) -> usize {
        self.hashvalues.len()
    }

    /// Seed of the hash family.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Raw slot values.
    pub fn hashvalues(&self) -> &[u64] {
        &self.hashvalues
    }

    /// True when no token has been absorbed.
    pub fn is_empty(&self) -> bool {
        self.hashvalues.iter().all(|&v| v == EMPTY_SLOT)
    }

    /// Fail unless `other` was built with the same `num_perm` and seed.
    pub fn check_compatible(&self, other: &Self) -> Result<(), PerceptualError> {
        if self.num_perm() != other.num_perm() || self.seed != other.seed {
            return Err(PerceptualError::ParameterMismatch {
                left_num_perm: self.num_perm(),
                right_num_perm: other.num_perm(),
                left_seed: self.seed,
                right_seed: other.seed,
            });
        }
        Ok(())
    }

    /// Estimated Jaccard similarity in `[0, 1]`.
    ///
    /// Two empty sketches agree on every slot and therefore estimate `1.0`.
    pub fn jaccard(&self, other: &Self) -> Result<f64, PerceptualError> {
        self.check_compatible(other)?;
        let matches = self
            .hashvalues
            .iter()
            .zip(other.hashvalues.iter())
            .filter(|(a, b)| a == b)
            .count();
        Ok(matches as f64 / self.num_perm() as f64)
    }
}

/// Hash a token into the 64-bit space the sketch permutes.
#[inline]
pub fn token_hash(token: &[u8], seed: u64) -> u64 {
    xxh3_64_with_seed(token, seed)
}

/// Computes a single slot of the sketch over a set of token hashes.
#[inline]
pub(crate) fn compute_slot(unique_hashes: &[u64], j: usize, seed: u64) -> u64 {
    let key = slot_key(seed, j);
    let mut minv = EMPTY_SLOT;
    for &val in unique_hashes {
        let h = mix_u64(val, key);
        if h < minv {
            minv = h;
        }
    }
    minv
}

/// Key of the `j`-th hash function in the family.
#[inline]
pub(crate) fn slot_key(seed: u64, j: usize) -> u64 {
    // Each slot uses a different key to simulate a different permutation.
    let step = (j as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    splitmix64(seed.wrapping_add(step))
}

/// A mixing function to create a new hash from an existing one.
#[inline]
pub(crate) fn mix_u64(x: u64, key: u64) -> u64 {
    let mut h = xxh3_64_with_seed(&x.to_le_bytes(), key);
    h ^= h >> 33;
    h = h.wrapping_mul(0xff51afd7ed558ccd);
    h ^= h >> 33;
    h = h.wrapping_mul(0xc4ceb9fe1a85ec53);
    h ^ (h >> 33)
}

#[inline]
pub(crate) fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}
