/// Pipeline configuration loader - parses an optional TOML file
///
/// Keeps tunables (target column, neighbour count, split ratio, seed,
/// delimiter) out of the code so a different dataset layout can be used
/// without recompiling.

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::{DEFAULT_TARGET_COLUMN, PipelineError};

/// Environment variable naming a configuration file when `--config` is absent.
pub const CONFIG_ENV_VAR: &str = "FLOOD_RISK_CONFIG";

/// Pipeline settings. Every field has a default, so an empty
/// `[pipeline]` table (or no file at all) is valid.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Column holding the flood risk class
    pub target_column: String,

    /// Neighbour count for the KNN vote
    pub n_neighbors: usize,

    /// Share of rows held out for evaluation
    pub test_ratio: f64,

    /// Seed for the stratified split
    pub seed: u64,

    /// Field delimiter of the input files
    pub delimiter: char,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_column: DEFAULT_TARGET_COLUMN.to_string(),
            n_neighbors: 5,
            test_ratio: 0.3,
            seed: 42,
            delimiter: ',',
        }
    }
}

/// Root structure for TOML parsing
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    pipeline: PipelineConfig,
}

impl PipelineConfig {
    /// Checks parameters that can be rejected before touching any data file.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.n_neighbors == 0 {
            return Err(PipelineError::InvalidParameter(
                "n_neighbors must be a positive integer, got 0".to_string(),
            ));
        }
        if !(self.test_ratio > 0.0 && self.test_ratio < 1.0) {
            return Err(PipelineError::InvalidParameter(format!(
                "test_ratio must be strictly between 0 and 1, got {}",
                self.test_ratio
            )));
        }
        if self.target_column.trim().is_empty() {
            return Err(PipelineError::InvalidParameter(
                "target_column must not be empty".to_string(),
            ));
        }
        if !self.delimiter.is_ascii() {
            return Err(PipelineError::InvalidParameter(format!(
                "delimiter must be a single ASCII character, got '{}'",
                self.delimiter
            )));
        }
        Ok(())
    }

    /// Delimiter as the byte the csv reader expects. Only valid after
    /// `validate` has accepted the config.
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter as u8
    }
}

/// Parses configuration from TOML text.
pub fn parse_config(contents: &str, origin: &Path) -> Result<PipelineConfig, PipelineError> {
    let file: ConfigFile = toml::from_str(contents)
        .map_err(|e| PipelineError::parse_failure(origin, e.to_string()))?;
    Ok(file.pipeline)
}

/// Loads configuration from a TOML file.
///
/// # Errors
/// - `ResourceNotFound` - the file does not exist.
/// - `ParseFailure` - the file is unreadable or not valid TOML for this schema.
pub fn load_config(path: &Path) -> Result<PipelineConfig, PipelineError> {
    if !path.exists() {
        return Err(PipelineError::ResourceNotFound { path: path.to_path_buf() });
    }

    let contents = fs::read_to_string(path)
        .map_err(|e| PipelineError::parse_failure(path, e.to_string()))?;

    parse_config(&contents, path)
}

/// Resolves which configuration file to use: an explicit path wins, then
/// `FLOOD_RISK_CONFIG` (a `.env` file is honoured), otherwise none.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    dotenv::dotenv().ok();
    env::var(CONFIG_ENV_VAR)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

/// Loads the effective configuration: file if one is resolved, otherwise
/// built-in defaults.
pub fn load_effective_config(explicit: Option<&Path>) -> Result<PipelineConfig, PipelineError> {
    match resolve_config_path(explicit) {
        Some(path) => load_config(&path),
        None => Ok(PipelineConfig::default()),
    }
}
