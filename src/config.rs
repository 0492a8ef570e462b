//! YAML configuration file support.
//!
//! Every stage of the pipeline can be configured from a single YAML file.
//! Sections and fields that are left out fall back to their defaults, so an
//! empty document apart from `version` is a valid configuration.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "nightly clones run"
//!
//! extract:
//!   version: 1
//!   fetch_external_styles: true
//!   fetch_timeout_secs: 10
//!
//! perceptual:
//!   version: 1
//!   num_perm: 256
//!   seed: 17297687000019483309
//!   use_parallel: false
//!
//! cluster:
//!   eps: 0.6
//!   min_samples: 1
//!   text_weight: 0.88
//!   use_parallel: true
//!
//! pipeline:
//!   workers: 4
//!   base_dir: "clones"
//!   export_path: "exported_grouped_htmls.json"
//!   plot: false
//!   plot_dir: "plots"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use cluster::ClusterConfig;
use extract::{DEFAULT_USER_AGENT, ExtractConfig};
use perceptual::PerceptualConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pipeline::PipelineConfig;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration for a clone-detection run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct HtmlClonesConfig {
    /// Configuration format version
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub extract: ExtractYamlConfig,

    #[serde(default)]
    pub perceptual: PerceptualYamlConfig,

    #[serde(default)]
    pub cluster: ClusterYamlConfig,

    /// Worker pool, input and output locations
    #[serde(default)]
    pub pipeline: PipelineYamlConfig,
}

impl HtmlClonesConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: HtmlClonesConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.extract.validate()?;
        self.perceptual.validate()?;
        self.cluster.validate()?;
        self.pipeline.validate()?;

        Ok(())
    }

    /// Stage configuration for [`crate::process_base`] and friends.
    pub fn to_pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            extract: ExtractConfig {
                version: self.extract.version,
                fetch_external_styles: self.extract.fetch_external_styles,
                fetch_timeout_secs: self.extract.fetch_timeout_secs,
                user_agent: self.extract.user_agent.clone(),
            },
            perceptual: PerceptualConfig {
                version: self.perceptual.version,
                num_perm: self.perceptual.num_perm,
                seed: self.perceptual.seed,
                use_parallel: self.perceptual.use_parallel,
            },
            cluster: ClusterConfig {
                eps: self.cluster.eps,
                min_samples: self.cluster.min_samples,
                text_weight: self.cluster.text_weight,
                use_parallel: self.cluster.use_parallel,
            },
            workers: self.pipeline.workers,
            plot: self.pipeline.plot,
            plot_dir: self.pipeline.plot_dir.clone(),
        }
    }
}

impl Default for HtmlClonesConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            extract: ExtractYamlConfig::default(),
            perceptual: PerceptualYamlConfig::default(),
            cluster: ClusterYamlConfig::default(),
            pipeline: PipelineYamlConfig::default(),
        }
    }
}

/// Feature extraction YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractYamlConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "true_value")]
    pub fetch_external_styles: bool,

    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl ExtractYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.version == 0 {
            return Err(ConfigLoadError::Validation(
                "extract.version must be >= 1".to_string(),
            ));
        }
        if self.fetch_external_styles && self.fetch_timeout_secs == 0 {
            return Err(ConfigLoadError::Validation(
                "extract.fetch_timeout_secs must be >= 1".to_string(),
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigLoadError::Validation(
                "extract.user_agent must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ExtractYamlConfig {
    fn default() -> Self {
        Self {
            version: 1,
            fetch_external_styles: true,
            fetch_timeout_secs: default_fetch_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// MinHash fingerprinting YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerceptualYamlConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "default_num_perm")]
    pub num_perm: usize,

    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default)]
    pub use_parallel: bool,
}

impl PerceptualYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.version == 0 {
            return Err(ConfigLoadError::Validation(
                "perceptual.version must be >= 1".to_string(),
            ));
        }
        if self.num_perm == 0 {
            return Err(ConfigLoadError::Validation(
                "perceptual.num_perm must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for PerceptualYamlConfig {
    fn default() -> Self {
        Self {
            version: 1,
            num_perm: default_num_perm(),
            seed: default_seed(),
            use_parallel: false,
        }
    }
}

/// Distance matrix and clustering YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClusterYamlConfig {
    #[serde(default = "default_eps")]
    pub eps: f64,

    #[serde(default = "default_min_samples")]
    pub min_samples: usize,

    #[serde(default = "default_text_weight")]
    pub text_weight: f64,

    #[serde(default = "true_value")]
    pub use_parallel: bool,
}

impl ClusterYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if !self.eps.is_finite() || self.eps < 0.0 {
            return Err(ConfigLoadError::Validation(
                "cluster.eps must be a finite value >= 0.0".to_string(),
            ));
        }
        if self.min_samples == 0 {
            return Err(ConfigLoadError::Validation(
                "cluster.min_samples must be >= 1".to_string(),
            ));
        }
        if !self.text_weight.is_finite() || self.text_weight <= 0.0 {
            return Err(ConfigLoadError::Validation(
                "cluster.text_weight must be a finite value > 0.0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ClusterYamlConfig {
    fn default() -> Self {
        Self {
            eps: default_eps(),
            min_samples: default_min_samples(),
            text_weight: default_text_weight(),
            use_parallel: true,
        }
    }
}

/// Run-level YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineYamlConfig {
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Directory whose subdirectories are processed
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// Where the directory -> clusters mapping is written
    #[serde(default = "default_export_path")]
    pub export_path: PathBuf,

    #[serde(default)]
    pub plot: bool,

    #[serde(default = "default_plot_dir")]
    pub plot_dir: PathBuf,
}

impl PipelineYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.workers == 0 {
            return Err(ConfigLoadError::Validation(
                "pipeline.workers must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for PipelineYamlConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            base_dir: default_base_dir(),
            export_path: default_export_path(),
            plot: false,
            plot_dir: default_plot_dir(),
        }
    }
}

fn default_version() -> u32 {
    1
}
fn true_value() -> bool {
    true
}
fn default_fetch_timeout() -> u64 {
    10
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
fn default_num_perm() -> usize {
    256
}
fn default_seed() -> u64 {
    0xF00D_BAAD_F00D_BAAD
}
fn default_eps() -> f64 {
    0.6
}
fn default_min_samples() -> usize {
    1
}
fn default_text_weight() -> f64 {
    0.88
}
fn default_workers() -> usize {
    4
}
fn default_base_dir() -> PathBuf {
    PathBuf::from("clones")
}
fn default_export_path() -> PathBuf {
    PathBuf::from("exported_grouped_htmls.json")
}
fn default_plot_dir() -> PathBuf {
    PathBuf::from("plots")
}
