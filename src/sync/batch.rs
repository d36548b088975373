//! Declarative playlist lists.
//!
//! ```toml
//! [defaults]
//! out_dir = "public/media/yt"
//! target = "src/content/items.json"
//! mode = "reconcile"
//!
//! [[playlist]]
//! tag = "music"
//! playlist = "https://www.youtube.com/playlist?list=PLxxxx"
//! max = 50
//!
//! [[playlist]]
//! tag = "talks"
//! playlist = "PLyyyy"
//! force_update = true
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::SyncJob;
use crate::config::{ConfigError, read_file};
use crate::source::PlaylistRef;
use crate::store::StoreMode;

/// Default thumbnail directory
pub const DEFAULT_OUT_DIR: &str = "public/media/yt";

/// Default catalog file
pub const DEFAULT_TARGET: &str = "src/content/items.json";

/// Settings every playlist falls back to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunDefaults {
    pub out_dir: PathBuf,
    pub target: PathBuf,
    pub mode: StoreMode,
    pub max: Option<usize>,
    pub force_update: bool,
}

impl Default for RunDefaults {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            target: PathBuf::from(DEFAULT_TARGET),
            mode: StoreMode::default(),
            max: None,
            force_update: false,
        }
    }
}

impl RunDefaults {
    /// Apply the `[defaults]` table of a batch file.
    pub fn merged(&self, overrides: &BatchDefaults) -> Self {
        Self {
            out_dir: overrides.out_dir.clone().unwrap_or_else(|| self.out_dir.clone()),
            target: overrides.target.clone().unwrap_or_else(|| self.target.clone()),
            mode: overrides.mode.unwrap_or(self.mode),
            max: overrides.max.or(self.max),
            force_update: overrides.force_update.unwrap_or(self.force_update),
        }
    }
}

/// The `[defaults]` table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchDefaults {
    #[serde(alias = "outDir")]
    pub out_dir: Option<PathBuf>,
    pub target: Option<PathBuf>,
    pub mode: Option<StoreMode>,
    pub max: Option<usize>,
    #[serde(alias = "forceUpdate")]
    pub force_update: Option<bool>,
}

/// One `[[playlist]]` entry
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlaylistSpec {
    pub tag: String,
    pub playlist: String,
    #[serde(default, alias = "outDir")]
    pub out_dir: Option<PathBuf>,
    #[serde(default)]
    pub target: Option<PathBuf>,
    #[serde(default)]
    pub mode: Option<StoreMode>,
    #[serde(default)]
    pub max: Option<usize>,
    #[serde(default, alias = "forceUpdate")]
    pub force_update: Option<bool>,
}

impl PlaylistSpec {
    pub fn new(tag: impl Into<String>, playlist: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            playlist: playlist.into(),
            ..Default::default()
        }
    }

    /// Fill unset fields from `defaults` and validate.
    pub fn resolve(&self, defaults: &RunDefaults) -> Result<SyncJob, ConfigError> {
        let tag = self.tag.trim();
        if tag.is_empty() {
            return Err(ConfigError::Missing("tag"));
        }
        let playlist = PlaylistRef::parse(&self.playlist)?;

        Ok(SyncJob {
            tag: tag.to_string(),
            playlist,
            out_dir: self.out_dir.clone().unwrap_or_else(|| defaults.out_dir.clone()),
            target: self.target.clone().unwrap_or_else(|| defaults.target.clone()),
            mode: self.mode.unwrap_or(defaults.mode),
            // Zero means no cap.
            max: self.max.or(defaults.max).filter(|m| *m > 0),
            force: self.force_update.unwrap_or(defaults.force_update),
        })
    }
}

/// A parsed batch file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchFile {
    #[serde(default)]
    pub defaults: BatchDefaults,
    #[serde(default, rename = "playlist")]
    pub playlists: Vec<PlaylistSpec>,
}

impl BatchFile {
    /// Load and validate a batch file; it must list at least one playlist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = read_file(path)?;
        let batch: BatchFile =
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        if batch.playlists.is_empty() {
            return Err(ConfigError::EmptyBatch(path.to_path_buf()));
        }
        tracing::info!(path = %path.display(), count = batch.playlists.len(), "Loaded batch file");
        Ok(batch)
    }
}
