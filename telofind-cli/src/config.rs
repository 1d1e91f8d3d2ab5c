//! Configuration handling for the telofind CLI
//!
//! Supports loading configuration from telofind.toml files with CLI argument overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use telofind_core::metrics::{DEFAULT_POLYNUCLEOTIDES, DEFAULT_WINDOW_SIZE};
use telofind_core::pipeline::{DEFAULT_NB_SCANNED_NT, DEFAULT_THREADS};
use telofind_core::{MetricsParams, TelomereParams, Thresholds};

pub const DEFAULT_CONFIG_FILE: &str = "telofind.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub detect: DetectConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Worker threads used per FASTA file
    #[serde(default = "default_threads")]
    pub threads: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectConfig {
    /// Minimum polynucleotide proportion of a telomeric window
    #[serde(default = "default_threshold")]
    pub polynuc_thres: f64,

    /// Maximum entropy of a telomeric window
    #[serde(default = "default_threshold")]
    pub entropy_thres: f64,

    /// Nucleotides scanned from each end, -1 for the whole sequence
    #[serde(default = "default_nb_scanned_nt")]
    pub nb_scanned_nt: i64,

    #[serde(default = "default_window_size")]
    pub window_size: usize,

    #[serde(default = "default_polynucleotides")]
    pub polynucleotides: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output directory of the detection tables
    #[serde(default = "default_outdir")]
    pub outdir: PathBuf,

    /// Also write the per-window metrics table
    #[serde(default)]
    pub raw: bool,
}

// Default value functions
fn default_threads() -> usize { DEFAULT_THREADS }
fn default_threshold() -> f64 { 0.8 }
fn default_nb_scanned_nt() -> i64 { DEFAULT_NB_SCANNED_NT }
fn default_window_size() -> usize { DEFAULT_WINDOW_SIZE }
fn default_polynucleotides() -> Vec<String> {
    DEFAULT_POLYNUCLEOTIDES.iter().map(|p| p.to_string()).collect()
}
fn default_outdir() -> PathBuf { PathBuf::from("telofinder_results") }

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { threads: default_threads() }
    }
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            polynuc_thres: default_threshold(),
            entropy_thres: default_threshold(),
            nb_scanned_nt: default_nb_scanned_nt(),
            window_size: default_window_size(),
            polynucleotides: default_polynucleotides(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            outdir: default_outdir(),
            raw: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            detect: DetectConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl DetectConfig {
    /// Detection parameters for the core pipeline
    pub fn to_params(&self) -> TelomereParams {
        TelomereParams {
            metrics: MetricsParams {
                window_size: self.window_size,
                polynucleotides: self.polynucleotides.clone(),
            },
            thresholds: Thresholds {
                polynuc: self.polynuc_thres,
                entropy: self.entropy_thres,
            },
            nb_scanned_nt: self.nb_scanned_nt,
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                log::info!("Loading configuration from: {}", path.display());
                Self::load_from_file(path)?
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    log::info!("Loading configuration from: {}", DEFAULT_CONFIG_FILE);
                    Self::load_from_file(&default_path)?
                } else {
                    log::debug!("Using default configuration");
                    Self::default()
                }
            }
        };

        Ok(config)
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;

        Ok(())
    }

    /// Generate example configuration file content
    pub fn example_toml() -> Result<String> {
        toml::to_string_pretty(&Self::default())
            .context("Failed to serialize default configuration")
    }
}
