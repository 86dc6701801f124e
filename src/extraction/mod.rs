//! Archive extraction
//!
//! Extraction itself is delegated to an external 7-zip binary behind the
//! [`ArchiveExtractor`] trait. This module also decides which files in a
//! directory are archives the pipeline should pick up, and locates multi-part
//! volume sets inside extraction results.

mod sevenzip;
mod volume;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

// Re-exports
pub use sevenzip::SevenZipExtractor;
pub use volume::{delete_non_volume_files, find_volume_set, is_volume_part, parse_volume_part};

use crate::error::Result;
use crate::utils::has_archive_extension;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::debug;

/// Trait for extracting a single archive (or the first part of a volume set)
///
/// Implementations must create `output_dir` if needed, overwrite conflicting
/// files, and leave the source archive in place. When `timeout` is set and
/// exceeded, they must return
/// [`ExtractionError::Timeout`](crate::error::ExtractionError::Timeout).
#[async_trait]
pub trait ArchiveExtractor: Send + Sync {
    /// Extract `archive` into `output_dir` using `password`
    async fn extract(
        &self,
        archive: &Path,
        output_dir: &Path,
        password: &str,
        timeout: Option<Duration>,
    ) -> Result<()>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Decide whether a file name is an archive the pipeline should process
///
/// The extension must be one of the recognized archive extensions. A purely
/// numeric stem (`031.gz`) is always accepted; any other stem (`022abc.gz`)
/// only when `allow_mixed` is set.
///
/// # Examples
///
/// ```
/// use batch_unpack::extraction::is_archive_candidate;
///
/// assert!(is_archive_candidate("031.gz", false));
/// assert!(!is_archive_candidate("022咬.gz", false));
/// assert!(is_archive_candidate("022咬.gz", true));
/// assert!(!is_archive_candidate("031.txt", true));
/// ```
pub fn is_archive_candidate(file_name: &str, allow_mixed: bool) -> bool {
    if !has_archive_extension(file_name) {
        return false;
    }
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    if !stem.is_empty() && stem.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }
    allow_mixed
}

/// List the archive candidates directly inside `dir`, sorted by name
pub async fn select_archives(dir: &Path, allow_mixed: bool) -> Result<Vec<String>> {
    let mut entries = fs::read_dir(dir).await?;
    let mut archives = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_archive_candidate(&name, allow_mixed) {
            archives.push(name);
        }
    }

    archives.sort();
    debug!(?dir, count = archives.len(), "selected archive candidates");
    Ok(archives)
}
