//! Fingerprint and metadata types.
//!
//! The fingerprint schema and metadata are part of the public contract: any
//! incompatible change must result in a new `perceptual_version`.

use serde::{Deserialize, Serialize};

use crate::minhash::MinHashSketch;

/// MinHash fingerprint of one document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Fingerprint {
    /// Identity of the owning document (its file name).
    pub doc_id: String,
    /// Sketch over the document's text and style tokens.
    pub sketch: MinHashSketch,
    /// How and with which configuration the fingerprint was produced.
    pub meta: FingerprintMeta,
}

impl Fingerprint {
    /// Estimated Jaccard similarity with another fingerprint.
    pub fn similarity(&self, other: &Self) -> Result<f64, crate::PerceptualError> {
        self.sketch.jaccard(&other.sketch)
    }
}

/// Metadata for traceability and determinism.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FingerprintMeta {
    /// Algorithm version, bumped whenever token hashing or slot mixing
    /// changes in a way that can affect sketches.
    pub perceptual_version: u16,
    /// Human-readable algorithm identifier.
    pub algorithm_name: String,
    pub num_perm: usize,
    pub seed: u64,
    /// Whether slots were computed on the rayon pool.
    pub use_parallel: bool,
    pub config_version: u32,
    /// Tokens fed into the sketch, duplicates included.
    pub token_count: usize,
    /// Distinct token hashes the sketch was built from.
    pub unique_tokens: usize,
}
