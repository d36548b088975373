//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\aperture-sync\config.toml
//! - macOS: ~/Library/Application Support/aperture-sync/config.toml
//! - Linux: ~/.config/aperture-sync/config.toml
//!
//! Every setting has a default, so the file is optional. A path passed with
//! `--config` must exist and parse.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::source::{dataapi, listing, service::DEFAULT_BEST_EFFORT_PAGES};
use crate::store::CatalogLayout;
use crate::thumbnail::DEFAULT_CONCURRENCY;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API credentials
    pub credentials: Credentials,

    /// Playlist provider settings
    pub source: SourceConfig,

    /// Thumbnail cache settings
    pub thumbnails: ThumbnailConfig,

    /// Catalog document layout
    pub catalog: CatalogConfig,
}

/// API credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// YouTube Data API key; enables the credentialed fetch tiers
    pub youtube_api_key: Option<String>,
}

/// Playlist provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Base URL of the Data API
    pub api_base_url: String,

    /// Base URL of the unauthenticated listing instance
    pub listing_base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Listing pages read by the last-resort tier
    pub best_effort_pages: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            api_base_url: dataapi::DEFAULT_BASE_URL.to_string(),
            listing_base_url: listing::DEFAULT_BASE_URL.to_string(),
            timeout_secs: 20,
            best_effort_pages: DEFAULT_BEST_EFFORT_PAGES,
        }
    }
}

impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Thumbnail cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailConfig {
    /// Thumbnails downloaded at once
    pub concurrency: usize,

    /// Path prefix under which the cache directory is served
    pub public_mount: String,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            public_mount: "media/yt".to_string(),
        }
    }
}

/// Catalog document layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Key of the item collection
    pub collection: String,

    /// Key of the object holding `filters`
    pub config_object: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        let layout = CatalogLayout::default();
        Self {
            collection: layout.collection,
            config_object: layout.config_object,
        }
    }
}

impl CatalogConfig {
    pub fn layout(&self) -> CatalogLayout {
        CatalogLayout {
            collection: self.collection.clone(),
            config_object: self.config_object.clone(),
        }
    }
}

impl Config {
    /// Explicit key first, then the configured one. Blank keys count as absent.
    pub fn api_key<'a>(&'a self, explicit: Option<&'a str>) -> Option<&'a str> {
        explicit
            .or(self.credentials.youtube_api_key.as_deref())
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("aperture-sync"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from the default location
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };

    if !path.exists() {
        tracing::debug!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match load_from(&path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            tracing::warn!("Using default configuration");
            Config::default()
        }
    }
}

/// Load configuration from an explicit path
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let contents = read_file(path)?;
    let config =
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
    tracing::info!("Loaded config from {:?}", path);
    Ok(config)
}

/// Read a TOML file, distinguishing a missing file from other I/O failures.
pub(crate) fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ConfigError::NotFound(path.to_path_buf()),
        _ => ConfigError::Read(path.to_path_buf(), e),
    })
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read {0}: {1}")]
    Read(PathBuf, std::io::Error),

    #[error("Failed to parse {0}: {1}")]
    Parse(PathBuf, toml::de::Error),

    #[error("No playlists defined in {0}")]
    EmptyBatch(PathBuf),

    #[error("Missing required value: {0}")]
    Missing(&'static str),

    #[error("Invalid playlist: {0}")]
    InvalidPlaylist(#[from] crate::source::InvalidPlaylistRef),
}

// ============================================================================
// Tests
// ============================================================================
