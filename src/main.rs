//! htmlclones - group saved HTML pages into clusters of near-duplicates.
//!
//! Every immediate subdirectory of the base directory (default `clones`) is
//! processed on its own; a summary is printed per directory and the
//! directory -> clusters mapping is exported as JSON.

use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser};
use htmlclones::{HtmlClonesConfig, process_base};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "htmlclones", version, about = "Group near-duplicate HTML pages")]
struct Cli {
    /// Base directory whose subdirectories hold the HTML snapshots.
    base: Option<PathBuf>,

    /// YAML configuration file; command-line flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    workers: Option<usize>,

    /// Neighborhood radius for clustering.
    #[arg(long)]
    eps: Option<f64>,

    #[arg(long = "min-samples")]
    min_samples: Option<usize>,

    /// Scale applied to `1 - similarity`.
    #[arg(long = "text-weight")]
    text_weight: Option<f64>,

    /// MinHash permutations per fingerprint.
    #[arg(long = "num-perm")]
    num_perm: Option<usize>,

    /// Do not fetch linked stylesheets over the network.
    #[arg(long = "no-fetch", action = ArgAction::SetTrue)]
    no_fetch: bool,

    /// Write an SVG scatter plot of every directory's clusters.
    #[arg(long, action = ArgAction::SetTrue)]
    plot: bool,

    #[arg(long = "plot-dir")]
    plot_dir: Option<PathBuf>,

    /// Where to write the directory -> clusters JSON.
    #[arg(long)]
    export: Option<PathBuf>,

    /// Log filter used when `RUST_LOG` is not set.
    #[arg(long = "log-level", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines.
    #[arg(long = "log-json", action = ArgAction::SetTrue)]
    log_json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_json);

    let mut file_cfg = match &cli.config {
        Some(path) => HtmlClonesConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => HtmlClonesConfig::default(),
    };
    apply_overrides(&mut file_cfg, &cli);
    file_cfg.validate().context("invalid configuration")?;

    let base = cli
        .base
        .clone()
        .unwrap_or_else(|| file_cfg.pipeline.base_dir.clone());
    let export_path = cli
        .export
        .clone()
        .unwrap_or_else(|| file_cfg.pipeline.export_path.clone());
    let cfg = file_cfg.to_pipeline_config();

    tracing::info!(
        base = %base.display(),
        workers = cfg.workers,
        eps = cfg.cluster.eps,
        fetch_external_styles = cfg.extract.fetch_external_styles,
        "starting clone detection"
    );

    let report = process_base(&base, &cfg)
        .with_context(|| format!("processing {}", base.display()))?;

    for collection in report.directories.values() {
        println!("{}", collection.summary());
    }

    report
        .export_json(&export_path)
        .with_context(|| format!("exporting results to {}", export_path.display()))?;
    println!("Results exported to {}", export_path.display());

    Ok(())
}

fn apply_overrides(cfg: &mut HtmlClonesConfig, cli: &Cli) {
    if let Some(workers) = cli.workers {
        cfg.pipeline.workers = workers;
    }
    if let Some(eps) = cli.eps {
        cfg.cluster.eps = eps;
    }
    if let Some(min_samples) = cli.min_samples {
        cfg.cluster.min_samples = min_samples;
    }
    if let Some(text_weight) = cli.text_weight {
        cfg.cluster.text_weight = text_weight;
    }
    if let Some(num_perm) = cli.num_perm {
        cfg.perceptual.num_perm = num_perm;
    }
    if cli.no_fetch {
        cfg.extract.fetch_external_styles = false;
    }
    if cli.plot {
        cfg.pipeline.plot = true;
    }
    if let Some(dir) = &cli.plot_dir {
        cfg.pipeline.plot_dir = dir.clone();
    }
}

fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
