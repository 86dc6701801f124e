//! Normalization of already extracted folders
//!
//! Manual or repeated extraction tends to produce wrapper chains like:
//!
//! ```text
//! 213/
//! └── Some Gallery NO.213 [40P]/
//!     └── Some Gallery NO.213 [40P]/
//!         └── (image files)
//! ```
//!
//! The organizer finds the innermost content level, flattens it into the
//! numbered root, and optionally renames the root to the wrapper's name.

use crate::config::Config;
use crate::error::Result;
use crate::types::TargetOutcome;
use crate::utils::{delete_dirty_recursive, move_files_to_root, rename_root_folder};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Result of [`find_deepest_content_dir`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeepestContent {
    /// The innermost directory reached by descending through wrapper levels
    pub deepest_dir: PathBuf,
    /// Name of the first wrapper directory descended into, if any
    pub detected_name: Option<String>,
}

/// Immediate subdirectories and regular-file count of `dir`, or `None` if unreadable
async fn list_level(dir: &Path) -> Option<(Vec<PathBuf>, usize)> {
    let mut entries = fs::read_dir(dir).await.ok()?;
    let mut subdirs = Vec::new();
    let mut files = 0;
    while let Ok(Some(entry)) = entries.next_entry().await {
        match entry.file_type().await {
            Ok(ft) if ft.is_dir() => subdirs.push(entry.path()),
            Ok(ft) if ft.is_file() => files += 1,
            _ => {}
        }
    }
    Some((subdirs, files))
}

/// Descend through single-child wrapper directories below `root_dir`
///
/// A level is treated as a wrapper when it has exactly one subdirectory and
/// either no files, or some files while the subdirectory itself directly holds
/// files. Descent stops at the first level that is not a wrapper.
pub async fn find_deepest_content_dir(root_dir: &Path) -> DeepestContent {
    let mut current = root_dir.to_path_buf();
    let mut detected_name: Option<String> = None;

    while let Some((subdirs, files)) = list_level(&current).await {
        let [only_child] = subdirs.as_slice() else {
            break;
        };
        let child_name = only_child
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());

        if files == 0 {
            detected_name = child_name;
            current = only_child.clone();
            continue;
        }

        let child_has_files = match list_level(only_child).await {
            Some((_, child_files)) => child_files > 0,
            None => break,
        };
        if !child_has_files {
            break;
        }
        if detected_name.is_none() {
            detected_name = child_name;
        }
        current = only_child.clone();
    }

    DeepestContent {
        deepest_dir: current,
        detected_name,
    }
}

/// Flatten an extracted folder and optionally rename it to its detected name
pub async fn organize_folder(folder: &Path, config: &Config) -> Result<TargetOutcome> {
    info!(?folder, "organizing folder");

    delete_dirty_recursive(folder, &config.dirty_files).await?;

    let DeepestContent {
        deepest_dir,
        detected_name,
    } = find_deepest_content_dir(folder).await;

    if deepest_dir == folder {
        info!(?folder, "folder is already flat");
        return Ok(TargetOutcome::AlreadyFlat);
    }

    debug!(
        ?deepest_dir,
        detected_name = detected_name.as_deref().unwrap_or(""),
        "nested structure detected"
    );

    if config.move_files_to_root {
        let moved = move_files_to_root(folder).await?;
        info!(?folder, moved, "moved files to root");
    }

    // moving can expose dirty files that were hidden in nested levels
    delete_dirty_recursive(folder, &config.dirty_files).await?;

    let mut final_path = folder.to_path_buf();
    if let Some(name) = detected_name.as_deref()
        && config.rename_root_folder
    {
        final_path = rename_root_folder(folder, name).await?;
    }

    info!(folder = ?final_path, "folder organized");
    Ok(TargetOutcome::Organized { folder: final_path })
}
