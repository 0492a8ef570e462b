use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use cluster::{ClusterConfig, Clustering, cluster_documents, project_2d, render_svg};
use extract::{ExtractConfig, HttpFetcher, NoopFetcher, StylesheetFetcher, extract};
use perceptual::{Fingerprint, MinHashSketch, PerceptualConfig, build_fingerprint};
use rayon::ThreadPool;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::report::{BaseReport, CollectionReport, SkippedDocument};
use crate::{DocumentError, MetricsSpan, PipelineError};

/// Settings for a whole run: one config per stage plus the worker pool and
/// the optional diagnostic plot.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub extract: ExtractConfig,
    pub perceptual: PerceptualConfig,
    pub cluster: ClusterConfig,
    /// Threads used for per-document extraction and fingerprinting.
    pub workers: usize,
    /// Write `<plot_dir>/<directory>.svg` for every processed directory.
    pub plot: bool,
    pub plot_dir: PathBuf,
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_fetch_external_styles(mut self, enabled: bool) -> Self {
        self.extract.fetch_external_styles = enabled;
        self
    }

    pub fn with_cluster(mut self, cluster: ClusterConfig) -> Self {
        self.cluster = cluster;
        self
    }

    pub fn with_perceptual(mut self, perceptual: PerceptualConfig) -> Self {
        self.perceptual = perceptual;
        self
    }

    /// Enable plotting into `dir`.
    pub fn with_plot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.plot = true;
        self.plot_dir = dir.into();
        self
    }

    /// Validate every stage configuration.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.workers == 0 {
            return Err(PipelineError::InvalidConfig(
                "workers must be greater than zero".into(),
            ));
        }
        self.extract.validate()?;
        self.perceptual.validate()?;
        self.cluster.validate()?;
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            extract: ExtractConfig::default(),
            perceptual: PerceptualConfig::default(),
            cluster: ClusterConfig::default(),
            workers: 4,
            plot: false,
            plot_dir: PathBuf::from("plots"),
        }
    }
}

/// Group the `.html` files directly under `dir`.
///
/// External stylesheets are fetched over HTTP unless the extract config
/// disables it.
pub fn process_directory(
    dir: impl AsRef<Path>,
    cfg: &PipelineConfig,
) -> Result<CollectionReport, PipelineError> {
    cfg.validate()?;
    let fetcher = build_fetcher(&cfg.extract)?;
    process_directory_with_fetcher(dir, cfg, fetcher.as_ref())
}

/// [`process_directory`] with a caller-supplied stylesheet source.
pub fn process_directory_with_fetcher(
    dir: impl AsRef<Path>,
    cfg: &PipelineConfig,
    fetcher: &dyn StylesheetFetcher,
) -> Result<CollectionReport, PipelineError> {
    cfg.validate()?;
    let pool = build_pool(cfg.workers)?;
    run_directory(dir.as_ref(), cfg, fetcher, &pool)
}

/// Process every immediate subdirectory of `base`, in name order.
///
/// Files directly under `base` are ignored.
pub fn process_base(
    base: impl AsRef<Path>,
    cfg: &PipelineConfig,
) -> Result<BaseReport, PipelineError> {
    cfg.validate()?;
    let fetcher = build_fetcher(&cfg.extract)?;
    process_base_with_fetcher(base, cfg, fetcher.as_ref())
}

/// [`process_base`] with a caller-supplied stylesheet source.
pub fn process_base_with_fetcher(
    base: impl AsRef<Path>,
    cfg: &PipelineConfig,
    fetcher: &dyn StylesheetFetcher,
) -> Result<BaseReport, PipelineError> {
    let base = base.as_ref();
    cfg.validate()?;
    ensure_directory(base)?;
    let pool = build_pool(cfg.workers)?;

    let mut directories = BTreeMap::new();
    for subdir in list_subdirectories(base)? {
        let report = run_directory(&subdir, cfg, fetcher, &pool)?;
        directories.insert(report.directory_name(), report);
    }

    Ok(BaseReport {
        base: base.to_path_buf(),
        directories,
    })
}

/// Regular files with extension exactly `html` directly under `dir`, sorted
/// by file name.
pub fn list_html_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, PipelineError> {
    let dir = dir.as_ref();
    let mut files: Vec<PathBuf> = read_dir_paths(dir)?
        .into_iter()
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "html"))
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Read, extract and fingerprint one file. The fingerprint's `doc_id` is the
/// file name.
pub fn fingerprint_file(
    path: &Path,
    cfg: &PipelineConfig,
    fetcher: &dyn StylesheetFetcher,
) -> Result<Fingerprint, SkippedDocument> {
    let file_name = file_name_of(path);
    let skipped = |reason: DocumentError| SkippedDocument {
        file_name: file_name.clone(),
        reason,
    };

    let mut extract_metrics = MetricsSpan::start();
    let extracted = fs::read_to_string(path)
        .map_err(|err| DocumentError::Read(err.to_string()))
        .and_then(|html| {
            extract(&html, file_name.as_str(), fetcher, &cfg.extract)
                .map_err(DocumentError::Extract)
        });
    if let Some(span) = extract_metrics.take() {
        span.record_extract(extracted.as_ref().map(|_| ()).map_err(Clone::clone));
    }
    let record = extracted.map_err(skipped)?;

    let mut fingerprint_metrics = MetricsSpan::start();
    let fingerprint = build_fingerprint(&record, &cfg.perceptual);
    if let Some(span) = fingerprint_metrics.take() {
        span.record_fingerprint(fingerprint.as_ref().map(|_| ()).map_err(Clone::clone));
    }
    fingerprint.map_err(|err| skipped(DocumentError::Perceptual(err)))
}

fn run_directory(
    dir: &Path,
    cfg: &PipelineConfig,
    fetcher: &dyn StylesheetFetcher,
    pool: &ThreadPool,
) -> Result<CollectionReport, PipelineError> {
    let start = Instant::now();
    ensure_directory(dir)?;
    // `.` and `..` carry no file name to key the report or name the plot by.
    let dir = fs::canonicalize(dir).map_err(|source| PipelineError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let files = list_html_files(&dir)?;
    debug!(directory = %dir.display(), files = files.len(), "listed html files");

    let outcomes: Vec<Result<Fingerprint, SkippedDocument>> = pool.install(|| {
        files
            .par_iter()
            .map(|path| fingerprint_file(path, cfg, fetcher))
            .collect()
    });

    let mut fingerprints = Vec::with_capacity(outcomes.len());
    let mut skipped = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(fp) => fingerprints.push(fp),
            Err(doc) => {
                warn!(
                    directory = %dir.display(),
                    file = %doc.file_name,
                    reason = %doc.reason,
                    "skipping document"
                );
                skipped.push(doc);
            }
        }
    }

    let names: Vec<&str> = fingerprints.iter().map(|fp| fp.doc_id.as_str()).collect();
    let sketches: Vec<&MinHashSketch> = fingerprints.iter().map(|fp| &fp.sketch).collect();

    let mut cluster_metrics = MetricsSpan::start();
    let clustering = cluster_documents(&names, &sketches, &cfg.cluster);
    if let Some(span) = cluster_metrics.take() {
        span.record_cluster(clustering.as_ref().map(|_| ()).map_err(Clone::clone));
    }
    let clustering = clustering?;

    if cfg.plot {
        if let Err(err) = write_plot(&dir, cfg, &clustering, &names) {
            warn!(directory = %dir.display(), error = %err, "cluster plot not written");
        }
    }

    let report = CollectionReport {
        directory: dir.to_path_buf(),
        documents: fingerprints.len(),
        clusters: clustering.clusters,
        skipped,
        elapsed: start.elapsed(),
    };
    info!(
        directory = %dir.display(),
        documents = report.documents,
        clusters = report.clusters.len(),
        skipped = report.skipped.len(),
        elapsed_ms = report.elapsed.as_millis() as u64,
        "processed directory"
    );
    Ok(report)
}

fn write_plot(
    dir: &Path,
    cfg: &PipelineConfig,
    clustering: &Clustering,
    names: &[&str],
) -> Result<(), PipelineError> {
    let points = project_2d(&clustering.matrix);
    let svg = render_svg(&points, &clustering.labels, names)?;
    let path = cfg
        .plot_dir
        .join(format!("{}.svg", file_name_of(dir)));
    fs::create_dir_all(&cfg.plot_dir)
        .and_then(|()| fs::write(&path, svg))
        .map_err(|source| PipelineError::Plot {
            path: path.clone(),
            source,
        })?;
    debug!(plot = %path.display(), "wrote cluster plot");
    Ok(())
}

fn build_fetcher(cfg: &ExtractConfig) -> Result<Box<dyn StylesheetFetcher>, PipelineError> {
    if cfg.fetch_external_styles {
        Ok(Box::new(HttpFetcher::new(cfg)?))
    } else {
        Ok(Box::new(NoopFetcher))
    }
}

fn build_pool(workers: usize) -> Result<ThreadPool, PipelineError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("htmlclones-worker-{i}"))
        .build()
        .map_err(|err| PipelineError::ThreadPool(err.to_string()))
}

fn ensure_directory(path: &Path) -> Result<(), PipelineError> {
    if !path.exists() {
        return Err(PipelineError::InvalidPath {
            path: path.to_path_buf(),
            reason: "directory does not exist".into(),
        });
    }
    if !path.is_dir() {
        return Err(PipelineError::InvalidPath {
            path: path.to_path_buf(),
            reason: "not a directory".into(),
        });
    }
    Ok(())
}

fn list_subdirectories(base: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let mut dirs: Vec<PathBuf> = read_dir_paths(base)?
        .into_iter()
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(dirs)
}

fn read_dir_paths(dir: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let io_err = |source| PipelineError::Io {
        path: dir.to_path_buf(),
        source,
    };
    fs::read_dir(dir)
        .map_err(io_err)?
        .map(|entry| entry.map(|e| e.path()).map_err(io_err))
        .collect()
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
