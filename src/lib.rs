//! Workspace umbrella crate for HTML clone detection.
//!
//! This crate stitches together feature extraction, MinHash fingerprinting
//! and density-based clustering so callers can group a directory of saved
//! HTML pages with a single call:
//!
//! - [`process_directory`] groups the `.html` files directly under one
//!   directory into clusters of near-duplicates.
//! - [`process_base`] does the same for every immediate subdirectory of a
//!   base directory and merges the results into a [`BaseReport`].
//!
//! Documents that cannot be read or fingerprinted are skipped and reported;
//! they never abort a run.

pub mod config;
mod pipeline;
mod report;

pub use cluster::{
    Cluster, ClusterConfig, ClusterError, Clustering, DistanceMatrix, cluster_documents, dbscan,
    project_2d, render_svg,
};
pub use extract::{
    ExtractConfig, ExtractError, FeatureRecord, FetchError, HttpFetcher, NoopFetcher,
    StylesheetFetcher, extract, normalize_css,
};
pub use perceptual::{
    Fingerprint, MinHashSketch, PerceptualConfig, PerceptualError, build_fingerprint,
};

pub use crate::config::{ConfigLoadError, HtmlClonesConfig};
pub use crate::pipeline::{
    PipelineConfig, fingerprint_file, list_html_files, process_base, process_base_with_fetcher,
    process_directory, process_directory_with_fetcher,
};
pub use crate::report::{BaseReport, CollectionReport, SkippedDocument};

use std::io;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock, RwLock};
use std::time::{Duration, Instant};

use thiserror::Error;

/// Errors that abort processing of a directory or a base directory.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid pipeline config: {0}")]
    InvalidConfig(String),
    #[error("{}: {reason}", path.display())]
    InvalidPath { path: PathBuf, reason: String },
    #[error("failed to list {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("extraction setup failed: {0}")]
    Extract(#[from] ExtractError),
    #[error("fingerprinting failed: {0}")]
    Perceptual(#[from] PerceptualError),
    #[error("clustering failed: {0}")]
    Cluster(#[from] ClusterError),
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
    #[error("failed to write plot {}: {source}", path.display())]
    Plot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to export results to {}: {reason}", path.display())]
    Export { path: PathBuf, reason: String },
}

/// Why a single document was left out of its collection.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DocumentError {
    #[error("unreadable document: {0}")]
    Read(String),
    #[error("extraction failed: {0}")]
    Extract(ExtractError),
    #[error("fingerprinting failed: {0}")]
    Perceptual(PerceptualError),
}

/// Metrics observer for pipeline stages.
pub trait PipelineMetrics: Send + Sync {
    /// Reading and extracting one document.
    fn record_extract(&self, latency: Duration, result: Result<(), DocumentError>);
    /// Fingerprinting one document.
    fn record_fingerprint(&self, latency: Duration, result: Result<(), PerceptualError>);
    /// Building the matrix and clustering one collection.
    fn record_cluster(&self, latency: Duration, result: Result<(), ClusterError>);
}

/// Install or clear the global pipeline metrics recorder.
pub fn set_pipeline_metrics(recorder: Option<Arc<dyn PipelineMetrics>>) {
    let mut guard = metrics_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn PipelineMetrics>>> {
    static METRICS: OnceLock<RwLock<Option<Arc<dyn PipelineMetrics>>>> = OnceLock::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

fn metrics_recorder() -> Option<Arc<dyn PipelineMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

pub(crate) struct MetricsSpan {
    recorder: Arc<dyn PipelineMetrics>,
    start: Instant,
}

impl MetricsSpan {
    pub(crate) fn start() -> Option<Self> {
        metrics_recorder().map(|recorder| Self {
            recorder,
            start: Instant::now(),
        })
    }

    pub(crate) fn record_extract(self, result: Result<(), DocumentError>) {
        self.recorder.record_extract(self.start.elapsed(), result);
    }

    pub(crate) fn record_fingerprint(self, result: Result<(), PerceptualError>) {
        self.recorder
            .record_fingerprint(self.start.elapsed(), result);
    }

    pub(crate) fn record_cluster(self, result: Result<(), ClusterError>) {
        self.recorder.record_cluster(self.start.elapsed(), result);
    }
}
