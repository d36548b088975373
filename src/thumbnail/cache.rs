//! Thumbnail disk cache.
//!
//! Files are named `<key>.<ext>` directly under the cache directory, where the
//! key is the item's external id. Absence is always recoverable by downloading
//! again; nothing here is a source of truth.

use std::io;
use std::path::{Path, PathBuf};

use reqwest::Url;

/// Image extensions the cache will write or purge.
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// Extension used when the URL gives no usable hint.
pub const DEFAULT_EXTENSION: &str = "jpg";

/// Thumbnail disk cache rooted at one directory.
#[derive(Debug, Clone)]
pub struct ThumbnailCache {
    cache_dir: PathBuf,
}

impl ThumbnailCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Create the cache directory if needed.
    pub async fn ensure_dir(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.cache_dir).await
    }

    /// Target path for a key and extension.
    pub fn path_for(&self, key: &str, ext: &str) -> PathBuf {
        self.cache_dir.join(file_name(key, ext))
    }

    /// Whether a non-empty file already sits at `path`.
    pub async fn is_populated(&self, path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .map(|m| m.is_file() && m.len() > 0)
            .unwrap_or(false)
    }

    /// Remove `<key>.<ext>` for every allowed extension.
    ///
    /// Returns how many files were removed.
    pub async fn purge(&self, key: &str) -> usize {
        let mut removed = 0;
        for ext in ALLOWED_EXTENSIONS {
            let path = self.path_for(key, ext);
            match tokio::fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to purge thumbnail"),
            }
        }
        removed
    }

    /// Write `data` to `path` via a sibling `.part` file and a rename.
    pub async fn write_atomic(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        let mut part = path.as_os_str().to_owned();
        part.push(".part");
        let part = PathBuf::from(part);

        tokio::fs::write(&part, data).await?;
        if let Err(e) = tokio::fs::rename(&part, path).await {
            let _ = tokio::fs::remove_file(&part).await;
            return Err(e);
        }
        Ok(())
    }
}

/// Cache file name for a key; the key is sanitized so it stays inside the cache dir.
pub fn file_name(key: &str, ext: &str) -> String {
    format!("{}.{}", sanitize_key(key), ext)
}

/// Replace anything outside `[A-Za-z0-9_-]` with `_`.
pub fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Guess an image extension from a URL.
///
/// Looks at the last path segment first, then at any `.ext` in the whole URL.
pub fn sniff_extension(url: &str) -> &'static str {
    if let Ok(parsed) = Url::parse(url) {
        let last = parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or("")
            .to_lowercase();
        if let Some(dot) = last.rfind('.') {
            let ext: String = last[dot + 1..]
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric())
                .collect();
            if let Some(found) = ALLOWED_EXTENSIONS.iter().find(|e| **e == ext) {
                return *found;
            }
        }
    }

    let lowered = url.to_lowercase();
    ALLOWED_EXTENSIONS
        .iter()
        .find(|e| lowered.contains(&format!(".{e}")))
        .copied()
        .unwrap_or(DEFAULT_EXTENSION)
}
