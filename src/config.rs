//! Site configuration module.
//!
//! Handles loading, validating, and merging configuration. Configuration is
//! layered: stock defaults are overridden by an optional `mdgen.toml`, which is
//! in turn overridden by command-line flags.
//!
//! ## Config File Location
//!
//! `mdgen.toml` is read from the working directory, or from the path given
//! with `--config`:
//!
//! ```text
//! my-site/
//! ├── mdgen.toml               # Optional (overrides stock defaults)
//! ├── markdown/                # Content root
//! ├── templates/               # template_*.html and partial_*.html
//! └── build/                   # Output (deleted and recreated every run)
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! markdown_dir = "markdown"
//! build_dir = "build"
//! template_dir = "templates"
//!
//! [processing]
//! max_processes = 4         # Max parallel render workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the working directory when `--config` is absent.
pub const CONFIG_FILENAME: &str = "mdgen.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Root of the Markdown content tree.
    pub markdown_dir: PathBuf,
    /// Output root. Removed and recreated on every generation run.
    pub build_dir: PathBuf,
    /// Directory holding `template_<name>.html` and `partial_<name>.html`.
    pub template_dir: PathBuf,
    /// Parallel rendering settings.
    pub processing: ProcessingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            markdown_dir: PathBuf::from("markdown"),
            build_dir: PathBuf::from("build"),
            template_dir: PathBuf::from("templates"),
            processing: ProcessingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate directory settings.
    ///
    /// The build directory is wiped on every run, so it may not coincide with
    /// or contain the content or template directories.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, dir) in [
            ("markdown_dir", &self.markdown_dir),
            ("build_dir", &self.build_dir),
            ("template_dir", &self.template_dir),
        ] {
            if dir.as_os_str().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        for (key, dir) in [
            ("markdown_dir", &self.markdown_dir),
            ("template_dir", &self.template_dir),
        ] {
            if is_within(dir, &self.build_dir) {
                return Err(ConfigError::Validation(format!(
                    "build_dir ({}) must not contain {key} ({})",
                    self.build_dir.display(),
                    dir.display()
                )));
            }
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// True if `path` equals `ancestor` or lies beneath it.
///
/// Compares canonical paths when both exist so `./build` and `build` agree.
fn is_within(path: &Path, ancestor: &Path) -> bool {
    match (path.canonicalize(), ancestor.canonicalize()) {
        (Ok(path), Ok(ancestor)) => path.starts_with(ancestor),
        _ => normalize(path).starts_with(normalize(ancestor)),
    }
}

fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, std::path::Component::CurDir))
        .collect()
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel render workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Command-line overrides, applied as the topmost layer.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub markdown_dir: Option<PathBuf>,
    pub build_dir: Option<PathBuf>,
    pub template_dir: Option<PathBuf>,
}

impl Overrides {
    /// The overrides as a sparse TOML table (unset flags are omitted).
    pub fn to_toml(&self) -> toml::Value {
        let mut table = toml::Table::new();
        for (key, value) in [
            ("markdown_dir", &self.markdown_dir),
            ("build_dir", &self.build_dir),
            ("template_dir", &self.template_dir),
        ] {
            if let Some(path) = value {
                let path = path.to_string_lossy().into_owned();
                table.insert(key.to_string(), toml::Value::String(path));
            }
        }
        toml::Value::Table(table)
    }
}

/// Merge layers onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    layers: impl IntoIterator<Item = toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = layers.into_iter().fold(base, merge_toml);
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config: stock defaults, then `config_path` (if it exists), then
/// command-line overrides.
///
/// An explicitly requested file that is missing is an error; the implicit
/// `mdgen.toml` lookup silently falls back to defaults.
pub fn load_config(
    config_path: Option<&Path>,
    overrides: &Overrides,
) -> Result<SiteConfig, ConfigError> {
    let file_layer = match config_path {
        Some(path) => match load_raw_config(path)? {
            Some(value) => Some(value),
            None => {
                return Err(ConfigError::Validation(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
        },
        None => load_raw_config(Path::new(CONFIG_FILENAME))?,
    };

    let layers = file_layer.into_iter().chain([overrides.to_toml()]);
    resolve_config(stock_defaults_value(), layers)
}

/// Returns a fully-commented stock `mdgen.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# mdgen Configuration
# ===================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Command-line flags (--markdown-dir, --build-dir, --template-dir) override
# the values in this file.
# Unknown keys will cause an error.

# Markdown content root. Every *.md file below it becomes an HTML page.
markdown_dir = "markdown"

# Output root. WARNING: deleted and recreated on every run.
build_dir = "build"

# Templates: template_<name>.html pages and partial_<name>.html fragments.
template_dir = "templates"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel render workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
