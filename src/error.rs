//! Application-wide error types.
//!
//! This module provides a unified error hierarchy for the application.
//! Library modules use specific error types via `thiserror`, while
//! CLI/main uses `anyhow` for convenient error propagation.
//!
//! # Design
//!
//! - [`Error`]: Top-level application error enum
//! - Module-specific errors ([`FetchError`], [`StoreError`], [`ConfigError`])
//!   for detailed handling
//! - Thumbnail failures never reach this level; they degrade to remote URLs
//!
//! # Example
//!
//! ```ignore
//! use aperture_sync::error::{Result, ResultExt};
//!
//! fn save(store: &mut dyn CatalogStore) -> Result<()> {
//!     store.commit().with_context("while saving the catalog")?;
//!     Ok(())
//! }
//! ```
//!
//! [`FetchError`]: crate::source::FetchError
//! [`StoreError`]: crate::store::StoreError
//! [`ConfigError`]: crate::config::ConfigError

use crate::config::ConfigError;
use crate::source::FetchError;
use crate::store::StoreError;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
///
/// Every variant is fatal for the current run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or invalid run parameters, batch file or config
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Every fetch tier failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Catalog could not be read or written
    #[error("Catalog error: {0}")]
    Store(#[from] StoreError),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create an error for a missing run parameter.
    pub fn missing(what: &'static str) -> Self {
        Self::Config(ConfigError::Missing(what))
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, StoreError> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Store(e).context(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_error_display() {
        let err = Error::from(StoreError::NotFound(PathBuf::from("/site/items.json")));
        assert!(err.to_string().contains("/site/items.json"));
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::missing("tag").context("while reading batch entry 2");
        let msg = err.to_string();
        assert!(msg.contains("while reading batch entry 2"));
        assert!(msg.contains("tag"));
    }

    #[test]
    fn test_fetch_error_is_transparent() {
        let err = Error::from(FetchError::Exhausted {
            playlist: "PL1".to_string(),
            failures: vec![],
        });
        assert_eq!(
            err.to_string(),
            "Failed to fetch playlist PL1: no fetch tier available"
        );
    }

    #[test]
    fn test_result_ext() {
        let result: std::result::Result<(), StoreError> =
            Err(StoreError::UnknownEntry("yt:v1".to_string()));
        let with_ctx = result.with_context("additional context");
        let msg = with_ctx.unwrap_err().to_string();
        assert!(msg.contains("additional context"));
        assert!(msg.contains("yt:v1"));
    }
}
