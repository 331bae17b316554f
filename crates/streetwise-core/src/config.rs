//! Configuration loading from `streetwise-config.yaml`.
//!
//! The file mirrors [`StreetwiseConfig`]. Every section and key is
//! optional; a missing key takes its default. Two environment variables
//! override the file:
//!
//! - `STREETWISE_RNG_SEED` -- fixed seed for the game's random generator
//! - `STREETWISE_CATALOG` -- path to an action catalog YAML file

use std::path::{Path, PathBuf};

use serde::Deserialize;
use streetwise_engine::{ActionCatalog, CatalogError, RulesConfig};
use tracing::{info, warn};

/// Environment variable overriding [`StreetwiseConfig::seed`].
pub const ENV_RNG_SEED: &str = "STREETWISE_RNG_SEED";

/// Environment variable overriding [`CatalogConfig::path`].
pub const ENV_CATALOG: &str = "STREETWISE_CATALOG";

/// Catalog shipped with the crate, used when no path is configured.
pub const BUILTIN_CATALOG: &str = include_str!("../data/catalog.yaml");

/// Errors that can occur while loading configuration or the catalog.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a file from disk.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The action catalog is malformed.
    #[error("invalid action catalog: {source}")]
    Catalog {
        /// The underlying catalog error.
        #[from]
        source: CatalogError,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StreetwiseConfig {
    /// Host process settings (job intervals, demo data).
    #[serde(default)]
    pub server: ServerConfig,

    /// Game rules.
    #[serde(default)]
    pub rules: RulesConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Where to load the action catalog from.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Seed for the random generator. `None` seeds from the OS.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl StreetwiseConfig {
    /// Load configuration from a YAML file, then apply environment overrides.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            info!(path = %path.display(), "loading configuration");
            Self::from_file(path)
        } else {
            warn!(path = %path.display(), "config file not found, using defaults");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply `STREETWISE_RNG_SEED` and `STREETWISE_CATALOG` if set.
    ///
    /// An unparsable seed is ignored with a warning.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(raw) = std::env::var(ENV_RNG_SEED) {
            match raw.trim().parse::<u64>() {
                Ok(seed) => self.seed = Some(seed),
                Err(err) => warn!(value = %raw, error = %err, "ignoring invalid {ENV_RNG_SEED}"),
            }
        }
        if let Ok(path) = std::env::var(ENV_CATALOG)
            && !path.trim().is_empty()
        {
            self.catalog.path = Some(PathBuf::from(path));
        }
    }
}

/// Host process settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Seconds between regeneration ticks (default: 60).
    pub regen_interval_secs: u64,

    /// Seconds between temporary status sweeps (default: 60).
    pub cooldown_sweep_interval_secs: u64,

    /// Whether to create the demo avatars at startup (default: true).
    pub seed_demo_avatars: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            regen_interval_secs: 60,
            cooldown_sweep_interval_secs: 60,
            seed_demo_avatars: true,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset (default: `info`).
    pub level: String,

    /// Emit JSON lines instead of human-readable output (default: false).
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            json: false,
        }
    }
}

/// Action catalog source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Path to a catalog YAML file. `None` uses the built-in catalog.
    pub path: Option<PathBuf>,
}

impl CatalogConfig {
    /// Load the configured catalog, or the built-in one.
    pub fn load(&self) -> Result<ActionCatalog, ConfigError> {
        let catalog = match &self.path {
            Some(path) => {
                let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.clone(),
                    source,
                })?;
                ActionCatalog::parse(&yaml)?
            }
            None => builtin_catalog()?,
        };
        info!(
            actions = catalog.len(),
            source = self
                .path
                .as_ref()
                .map_or_else(|| String::from("built-in"), |p| p.display().to_string()),
            "action catalog loaded"
        );
        Ok(catalog)
    }
}

/// Parse the catalog shipped with the crate.
pub fn builtin_catalog() -> Result<ActionCatalog, CatalogError> {
    ActionCatalog::parse(BUILTIN_CATALOG)
}
