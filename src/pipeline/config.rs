//! `tradedoc.toml` settings.

use crate::error::PipelineError;
use crate::render::pdf::EngineKind;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "TRADEDOC_CONFIG";
/// Environment variable overriding the output root (used only if the directory exists).
pub const OUTPUT_DIR_ENV: &str = "TRADEDOC_OUTPUT_DIR";
/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "tradedoc.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    pub templates: PathBuf,
    pub output: PathBuf,
    pub ledger: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            templates: PathBuf::from("templates"),
            output: PathBuf::from("documents/output"),
            ledger: PathBuf::from("documents/ledger.json"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfSettings {
    /// Engine tried first; the others follow in their usual order.
    pub prefer: EngineKind,
    /// Skip PDF conversion unless a request asks otherwise.
    pub html_only: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberingSettings {
    /// Prepended to allocated transaction numbers.
    pub transaction_prefix: String,
}

/// Everything the binary reads from `tradedoc.toml`. Missing keys take defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub paths: PathSettings,
    pub pdf: PdfSettings,
    pub numbering: NumberingSettings,
}

impl Settings {
    pub fn from_toml_str(s: &str) -> Result<Self, PipelineError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| PipelineError::Config(format!("Failed to read '{}': {}", path.display(), e)))?;
        Self::from_toml_str(&text)
            .map_err(|e| PipelineError::Config(format!("Invalid config '{}': {}", path.display(), e)))
    }

    /// Loads settings from `--config`, then `TRADEDOC_CONFIG`, then
    /// `./tradedoc.toml`, else defaults, and applies `TRADEDOC_OUTPUT_DIR`.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, PipelineError> {
        let cwd = env::current_dir()?;
        Self::discover_with(
            explicit,
            env::var_os(CONFIG_ENV).map(PathBuf::from),
            &cwd,
            env::var_os(OUTPUT_DIR_ENV).map(PathBuf::from),
        )
    }

    /// [`Self::discover`] with the environment passed in.
    pub fn discover_with(
        explicit: Option<&Path>,
        env_config: Option<PathBuf>,
        cwd: &Path,
        output_override: Option<PathBuf>,
    ) -> Result<Self, PipelineError> {
        let local = cwd.join(DEFAULT_CONFIG_FILE);
        let mut settings = if let Some(path) = explicit {
            Self::load(path)?
        } else if let Some(path) = env_config.filter(|p| !p.as_os_str().is_empty()) {
            Self::load(path)?
        } else if local.is_file() {
            Self::load(&local)?
        } else {
            debug!("No config file found, using defaults");
            Self::default()
        };

        if let Some(dir) = output_override {
            if dir.is_dir() {
                info!("Output root overridden by {}: {}", OUTPUT_DIR_ENV, dir.display());
                settings.paths.output = dir;
            } else {
                debug!("Ignoring {}: {} is not a directory", OUTPUT_DIR_ENV, dir.display());
            }
        }
        Ok(settings)
    }
}
