//! Multi-part 7z volume naming and volume-set discovery.
//!
//! Parts are named `<base>.7z.<NNN>`. Extraction starts from the lowest part
//! and the extraction binary picks up the remaining parts from the same directory.

use crate::error::{Error, Result};
use crate::types::VolumeSet;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tokio::fs;
use tracing::{debug, info};

fn volume_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        #[allow(clippy::expect_used)]
        Regex::new(r"^(?P<base>.+)\.7z\.(?P<part>\d+)$").expect("volume pattern is valid")
    })
}

/// Split a volume part name into its base name and part number
///
/// `photos.7z.002` → `("photos", 2)`. Returns `None` for anything else.
pub fn parse_volume_part(file_name: &str) -> Option<(&str, u64)> {
    let caps = volume_pattern().captures(file_name)?;
    let base = caps.name("base")?.as_str();
    let part = caps.name("part")?.as_str().parse().ok()?;
    Some((base, part))
}

/// Check if a file name is a part of a multi-volume 7z archive
pub fn is_volume_part(file_name: &str) -> bool {
    volume_pattern().is_match(file_name)
}

/// Find the first directory below `base_dir` that contains volume parts
///
/// The walk uses an explicit stack (LIFO), so when several directories hold
/// volume sets the one reported is the first popped, not necessarily the
/// shallowest. Only parts sharing the base name of the lowest-sorted part are
/// included in the result.
pub async fn find_volume_set(base_dir: &Path) -> Result<Option<VolumeSet>> {
    let mut stack = vec![base_dir.to_path_buf()];

    while let Some(current) = stack.pop() {
        let mut entries = fs::read_dir(&current).await?;
        let mut parts: Vec<(String, u64, PathBuf)> = Vec::new();
        let mut subdirs = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let file_type = entry.file_type().await?;
            let path = entry.path();
            if file_type.is_dir() {
                subdirs.push(path);
            } else if file_type.is_file() {
                let name = entry.file_name().to_string_lossy().into_owned();
                if let Some((base, part)) = parse_volume_part(&name) {
                    parts.push((base.to_string(), part, path));
                }
            }
        }

        if !parts.is_empty() {
            parts.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));
            let base_name = parts[0].0.clone();
            let files: Vec<PathBuf> = parts
                .into_iter()
                .filter(|(base, _, _)| *base == base_name)
                .map(|(_, _, path)| path)
                .collect();

            info!(
                dir = ?current,
                %base_name,
                parts = files.len(),
                "found volume set"
            );
            return Ok(Some(VolumeSet {
                dir: current,
                base_name,
                files,
            }));
        }

        stack.extend(subdirs);
    }

    debug!(?base_dir, "no volume set found");
    Ok(None)
}

/// Delete every regular file in `volume_dir` that is not a part of `base_name`
///
/// Returns the number of files deleted.
pub async fn delete_non_volume_files(volume_dir: &Path, base_name: &str) -> Result<usize> {
    let allowed_prefix = format!("{}.7z.", base_name);
    let mut entries = fs::read_dir(volume_dir).await?;
    let mut deleted = 0;

    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(&allowed_prefix) {
            continue;
        }
        let path = entry.path();
        fs::remove_file(&path)
            .await
            .map_err(|e| Error::file_op(&path, e))?;
        debug!(?path, "deleted non-volume file next to volume set");
        deleted += 1;
    }

    Ok(deleted)
}
