use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use cluster::{Cluster, sort_by_size_desc};

use crate::{DocumentError, PipelineError};

/// A document left out of its collection, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedDocument {
    pub file_name: String,
    pub reason: DocumentError,
}

/// Result of grouping one directory.
#[derive(Debug, Clone)]
pub struct CollectionReport {
    pub directory: PathBuf,
    /// Documents that made it into the clustering.
    pub documents: usize,
    /// Clusters of file names, in label order.
    pub clusters: Vec<Cluster>,
    pub skipped: Vec<SkippedDocument>,
    pub elapsed: Duration,
}

impl CollectionReport {
    /// Last component of the directory path.
    pub fn directory_name(&self) -> String {
        self.directory
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.directory.display().to_string())
    }

    /// Clusters ordered by descending size; ties keep label order.
    pub fn clusters_by_size(&self) -> Vec<Cluster> {
        let mut clusters = self.clusters.clone();
        sort_by_size_desc(&mut clusters);
        clusters
    }

    /// Human-readable summary, one line per group, largest group first.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Processed {} folder and found {} groups of similar websites in {:.2} seconds:",
            self.directory_name(),
            self.clusters.len(),
            self.elapsed.as_secs_f64()
        );
        for (i, cluster) in self.clusters_by_size().iter().enumerate() {
            let _ = writeln!(
                out,
                "   Group {}: Contains {} similar websites -> {:?}",
                i + 1,
                cluster.len(),
                cluster
            );
        }
        for doc in &self.skipped {
            let _ = writeln!(out, "   Skipped {}: {}", doc.file_name, doc.reason);
        }
        out
    }
}

/// Results for every subdirectory of a base directory, keyed by
/// subdirectory name.
#[derive(Debug, Clone)]
pub struct BaseReport {
    pub base: PathBuf,
    pub directories: BTreeMap<String, CollectionReport>,
}

impl BaseReport {
    /// `{ "<directory>": [["a.html", "b.html"], ["c.html"]], ... }`,
    /// pretty-printed with a two-space indent.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mapping: BTreeMap<&str, &Vec<Cluster>> = self
            .directories
            .iter()
            .map(|(name, report)| (name.as_str(), &report.clusters))
            .collect();
        serde_json::to_string_pretty(&mapping)
    }

    /// Write [`BaseReport::to_json`] to `path`.
    pub fn export_json(&self, path: impl AsRef<Path>) -> Result<(), PipelineError> {
        let path = path.as_ref();
        let export_err = |reason: String| PipelineError::Export {
            path: path.to_path_buf(),
            reason,
        };
        let json = self.to_json().map_err(|err| export_err(err.to_string()))?;
        fs::write(path, json).map_err(|err| export_err(err.to_string()))
    }

    /// Total number of clusters across all directories.
    pub fn cluster_count(&self) -> usize {
        self.directories.values().map(|r| r.clusters.len()).sum()
    }
}
