use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for cantor.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (CANTOR_* prefix)
/// 3. Config file (~/.config/cantor/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Path to the SQLite database.
    ///
    /// Can be set via:
    /// - CLI: --db /path/to/db
    /// - ENV: CANTOR_DATABASE_PATH
    /// - Config: database_path = "/path/to/db"
    /// - Default: ~/.local/share/cantor/cantor.db
    #[serde(default = "default_db_path")]
    pub database_path: PathBuf,

    /// Search and cache tuning, the `[search]` table.
    #[serde(default)]
    pub search: SearchSettings,
}

/// Tunables of the search engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Records per page when the caller does not pick one.
    pub page_size: usize,

    /// Width of the page-number navigation window.
    pub navigation_pages: usize,

    /// Maximum number of entries held by the shared cache.
    pub cache_capacity: u64,

    /// Time-to-live of every cache entry, in seconds.
    pub cache_ttl_secs: u64,

    /// Trigram similarity a name must exceed to count as a fuzzy match.
    pub similarity_threshold: f64,

    /// Number of neighbours returned next to an item by `similar`.
    pub similar_count: usize,

    /// Built IPADIC dictionary for Japanese segmentation and readings: a
    /// directory or a `file://` URI. Without one, Japanese text is split
    /// into script runs and only kana is read.
    pub japanese_dictionary: Option<String>,

    /// ko-dic dictionary for Korean morphemes. Without one, Korean text is
    /// split on word boundaries.
    pub korean_dictionary: Option<String>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            page_size: 5,
            navigation_pages: 5,
            cache_capacity: 3300,
            cache_ttl_secs: 3 * 60 * 60,
            similarity_threshold: 0.33,
            similar_count: 3,
            japanese_dictionary: None,
            korean_dictionary: None,
        }
    }
}

impl SearchSettings {
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_db_path(),
            search: SearchSettings::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/cantor/config.toml
    /// Reads environment variables with CANTOR_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("cantor");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder
            .build()
            .context("Failed to build configuration")?;

        Ok(config)
    }

    /// Load configuration with custom database path.
    ///
    /// This is used when the --db CLI flag is provided.
    pub fn load_with_db_path(db_path: PathBuf) -> Result<Self> {
        let mut config = Self::load()?;
        config.database_path = db_path;
        Ok(config)
    }
}

/// Get the default database path.
///
/// Returns: ~/.local/share/cantor/cantor.db (or platform equivalent)
fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cantor")
        .join("cantor.db")
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/cantor/config.toml
/// - macOS: ~/Library/Application Support/cantor/config.toml
/// - Windows: %APPDATA%\cantor\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cantor")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Cantor Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (CANTOR_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Path to the SQLite database holding the hymn catalog
#
# Can also be set via:
# - CLI: cantor --db /custom/path.db search grace
# - Environment: CANTOR_DATABASE_PATH=/custom/path.db
#
# Default: Platform-specific data directory
#database_path = "/path/to/custom/cantor.db"

[search]
# Records per page
page_size = 5

# Width of the page-number navigation window
navigation_pages = 5

# Shared cache size (entries) and entry lifetime (seconds)
cache_capacity = 3300
cache_ttl_secs = 10800

# Trigram similarity a name must exceed to be a fuzzy match
similarity_threshold = 0.33

# Neighbours listed by `cantor similar`
similar_count = 3

# Built lindera dictionaries (a directory path or a file:// URI). Unset
# means the built-in segmenters and kana-only readings.
#japanese_dictionary = "/usr/local/share/lindera/ipadic"
#korean_dictionary = "/usr/local/share/lindera/ko-dic"
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}
