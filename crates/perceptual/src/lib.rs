//! # Perceptual fingerprinting
//!
//! Compresses an extracted HTML [`FeatureRecord`] into a fixed-size MinHash
//! sketch whose slot agreement estimates the Jaccard similarity of two
//! documents' token sets.
//!
//! ## Contract
//!
//! - The builder only consumes the whitespace-delimited tokens of a
//!   [`FeatureRecord`]: every visible-text token first, then every style
//!   token.
//! - It performs no I/O and never reads clocks or global process state.
//! - Token order and duplicate tokens do not influence the sketch.
//!
//! Invariant: for the same feature record and the same [`PerceptualConfig`],
//! the fingerprint is bit identical, with or without `use_parallel`.
//!
//! ## Example Usage
//!
//! ```
//! use extract::FeatureRecord;
//! use perceptual::{build_fingerprint, PerceptualConfig};
//!
//! let record = FeatureRecord {
//!     doc_id: "a.html".into(),
//!     visible_text: "hello world".into(),
//!     normalized_style_text: "color:red".into(),
//! };
//! let cfg = PerceptualConfig::default();
//!
//! let fp = build_fingerprint(&record, &cfg).unwrap();
//! assert_eq!(fp.sketch.num_perm(), 256);
//! assert_eq!(fp.meta.unique_tokens, 3);
//! assert_eq!(fp.similarity(&fp).unwrap(), 1.0);
//! ```

pub mod config;
pub mod fingerprint;
mod minhash;

use extract::FeatureRecord;

pub use crate::config::{PerceptualConfig, PerceptualError};
pub use crate::fingerprint::{Fingerprint, FingerprintMeta};
pub use crate::minhash::{token_hash, MinHashSketch, EMPTY_SLOT};

/// Current perceptual algorithm version for this crate.
pub const PERCEPTUAL_VERSION: u16 = 1;

/// Human-readable algorithm identifier.
pub const PERCEPTUAL_ALGORITHM: &str = "xxh3-minhash_v1";

/// Fingerprint an extracted document.
pub fn build_fingerprint(
    record: &FeatureRecord,
    cfg: &PerceptualConfig,
) -> Result<Fingerprint, PerceptualError> {
    fingerprint_tokens(record.doc_id.as_str(), record.tokens(), cfg)
}

/// Fingerprint an arbitrary token stream on behalf of `doc_id`.
pub fn fingerprint_tokens<I, T>(
    doc_id: &str,
    tokens: I,
    cfg: &PerceptualConfig,
) -> Result<Fingerprint, PerceptualError>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    cfg.validate()?;
    if doc_id.is_empty() {
        return Err(PerceptualError::MissingDocId);
    }

    let mut token_count = 0usize;
    let mut hashes: Vec<u64> = tokens
        .into_iter()
        .inspect(|_| token_count += 1)
        .map(|t| token_hash(t.as_ref(), cfg.seed))
        .collect();
    hashes.sort_unstable();
    hashes.dedup();

    let sketch =
        MinHashSketch::from_token_hashes(&hashes, cfg.num_perm, cfg.seed, cfg.use_parallel)?;

    Ok(Fingerprint {
        doc_id: doc_id.to_string(),
        sketch,
        meta: FingerprintMeta {
            perceptual_version: PERCEPTUAL_VERSION,
            algorithm_name: PERCEPTUAL_ALGORITHM.to_string(),
            num_perm: cfg.num_perm,
            seed: cfg.seed,
            use_parallel: cfg.use_parallel,
            config_version: cfg.version,
            token_count,
            unique_tokens: hashes.len(),
        },
    })
}
