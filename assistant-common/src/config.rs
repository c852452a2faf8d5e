//! Configuration loading and collection root resolution
//!
//! Bootstrap configuration comes from a TOML file. Every section is optional;
//! a missing file is not an error and yields the compiled defaults.
//!
//! Config file priority:
//! 1. Explicit path (command-line argument)
//! 2. `ASSISTANT_CONFIG` environment variable
//! 3. `<user config dir>/assistant/config.toml`
//!
//! Collection root priority:
//! 1. Command-line argument
//! 2. `ASSISTANT_ROOT_DIR` environment variable
//! 3. TOML `collection.root_dir`
//! 4. OS-dependent compiled default (`~/Music`)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming the TOML config file
pub const CONFIG_ENV_VAR: &str = "ASSISTANT_CONFIG";

/// Environment variable naming the collection root directory
pub const ROOT_DIR_ENV_VAR: &str = "ASSISTANT_ROOT_DIR";

/// Default analysis backend address
pub const DEFAULT_BACKEND_URL: &str = "http://assistant-backend";

/// Default analysis backend timeout in seconds
pub const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 600;

/// Default upper bound on track length, in minutes
pub const DEFAULT_MAX_TRACK_MINUTES: u64 = 20;

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Music collection settings
    #[serde(default)]
    pub collection: CollectionConfig,

    /// Analysis backend settings
    #[serde(default)]
    pub backend: BackendConfig,

    /// Batch pipeline settings
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Music collection settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Base directory every relative track path is computed against
    #[serde(default)]
    pub root_dir: Option<PathBuf>,

    /// Rules deciding which collection entries are never visited
    #[serde(default)]
    pub ignore: IgnoreConfig,
}

/// Ignore rules for collection traversal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IgnoreConfig {
    /// Exact file or directory names to skip
    #[serde(default = "default_ignored_names")]
    pub names: Vec<String>,

    /// Paths relative to the collection root whose subtrees are skipped
    #[serde(default)]
    pub paths: Vec<PathBuf>,

    /// Skip entries whose name starts with a dot
    #[serde(default = "default_true")]
    pub hidden: bool,

    /// Accepted file extensions (case-insensitive); empty accepts every file
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            names: default_ignored_names(),
            paths: Vec::new(),
            hidden: true,
            extensions: default_extensions(),
        }
    }
}

/// Analysis backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the analysis service
    #[serde(default = "default_backend_url")]
    pub url: String,

    /// Upper bound for a single analysis request, in seconds
    #[serde(default = "default_backend_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            timeout_secs: default_backend_timeout_secs(),
        }
    }
}

/// Batch pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Number of tracks processed at once (1 = strictly sequential)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Tracks longer than this many minutes are never analyzed
    #[serde(default = "default_max_track_minutes")]
    pub max_track_minutes: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            max_track_minutes: default_max_track_minutes(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_ignored_names() -> Vec<String> {
    [".DS_Store", "Thumbs.db", ".git", ".svn", "@eaDir"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_extensions() -> Vec<String> {
    ["mp3", "flac", "ogg", "oga", "m4a", "aac", "mp4", "wav", "opus", "aiff"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_true() -> bool {
    true
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

fn default_backend_timeout_secs() -> u64 {
    DEFAULT_BACKEND_TIMEOUT_SECS
}

fn default_concurrency() -> usize {
    1
}

fn default_max_track_minutes() -> u64 {
    DEFAULT_MAX_TRACK_MINUTES
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.pipeline.concurrency == 0 {
            return Err(Error::InvalidInput(
                "pipeline.concurrency must be at least 1".to_string(),
            ));
        }
        if self.backend.timeout_secs == 0 {
            return Err(Error::InvalidInput(
                "backend.timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.backend.url.trim().is_empty() {
            return Err(Error::InvalidInput("backend.url is empty".to_string()));
        }
        Ok(())
    }
}

/// Parse and validate a TOML config file
pub fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;

    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    config.validate()?;
    Ok(config)
}

/// Where the bootstrap configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Read from this file
    File(PathBuf),
    /// This file was looked up but does not exist
    Missing(PathBuf),
    /// No config file location could be determined
    Unavailable,
}

impl ConfigSource {
    /// Report the source
    ///
    /// Loading happens before the subscriber is installed, so callers emit
    /// this once logging is up.
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Loading config from {}", path.display()),
            ConfigSource::Missing(path) => warn!(
                "Config file {} not found, using built-in defaults",
                path.display()
            ),
            ConfigSource::Unavailable => {
                warn!("No config directory available, using built-in defaults")
            }
        }
    }
}

/// Bootstrap configuration together with its [`ConfigSource`]
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: TomlConfig,
    pub source: ConfigSource,
}

/// Load the bootstrap configuration
///
/// An explicitly requested file must exist. When the file is only discovered
/// through the environment or the platform default, absence falls back to
/// compiled defaults; the returned source says which case applied.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(Error::NotFound(format!(
                "Config file {} does not exist",
                path.display()
            )));
        }
        return Ok(LoadedConfig {
            config: read_toml_config(path)?,
            source: ConfigSource::File(path.to_path_buf()),
        });
    }

    let candidate = std::env::var(CONFIG_ENV_VAR)
        .ok()
        .map(PathBuf::from)
        .or_else(default_config_path);

    match candidate {
        Some(path) if path.exists() => Ok(LoadedConfig {
            config: read_toml_config(&path)?,
            source: ConfigSource::File(path),
        }),
        Some(path) => Ok(LoadedConfig {
            config: TomlConfig::default(),
            source: ConfigSource::Missing(path),
        }),
        None => Ok(LoadedConfig {
            config: TomlConfig::default(),
            source: ConfigSource::Unavailable,
        }),
    }
}

/// Platform config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("assistant").join("config.toml"))
}

/// Resolve the collection root directory
pub fn resolve_root_dir(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        debug!("Collection root from command line: {}", path.display());
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ROOT_DIR_ENV_VAR) {
        if !path.trim().is_empty() {
            debug!("Collection root from {}: {}", ROOT_DIR_ENV_VAR, path);
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &config.collection.root_dir {
        debug!("Collection root from config file: {}", path.display());
        return path.clone();
    }

    // Priority 4: OS-dependent compiled default
    default_root_dir()
}

/// OS-dependent default collection root
pub fn default_root_dir() -> PathBuf {
    dirs::audio_dir()
        .or_else(|| dirs::home_dir().map(|d| d.join("Music")))
        .unwrap_or_else(|| PathBuf::from("./Music"))
}

/// Create the parent directory of an output file if it is missing
///
/// Returns the directory when it had to be created.
pub fn ensure_parent_dir(path: &Path) -> Result<Option<PathBuf>> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Can't create directory {}: {}", parent.display(), e))
            })?;
            Ok(Some(parent.to_path_buf()))
        }
        _ => Ok(None),
    }
}
