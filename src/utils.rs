//! File-system utilities: dirty-file purging, flattening, pruning and renaming

use crate::error::{Error, Result};
use crate::extraction::is_volume_part;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Archive extensions recognized by the pipeline (without dots, lowercase)
pub const ARCHIVE_EXTENSIONS: &[&str] = &["gz", "zip", "7z"];

/// Maximum number of suffixes tried when resolving a name collision
const MAX_RENAME_ATTEMPTS: u32 = 9999;

/// Lowercased extension of a file name, if any
pub(crate) fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
}

/// Whether `file_name` has one of the recognized archive extensions
pub fn has_archive_extension(file_name: &str) -> bool {
    extension_of(file_name).is_some_and(|ext| ARCHIVE_EXTENSIONS.contains(&ext.as_str()))
}

/// Whether a file name denotes an archive, including volume parts like `x.7z.002`
pub fn is_archive_file(file_name: &str) -> bool {
    has_archive_extension(file_name) || is_volume_part(&file_name.to_lowercase())
}

/// Whether a path exists
///
/// Only "not found" counts as missing; any other failure to probe the path
/// (an untraversable or non-directory parent) is returned as an error.
pub async fn path_exists(path: &Path) -> Result<bool> {
    fs::try_exists(path)
        .await
        .map_err(|e| Error::file_op(path, e))
}

/// Create a directory and all of its parents
pub async fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .await
        .map_err(|e| Error::file_op(dir, e))
}

/// Pick a destination for `file_name` inside `base_dir` that does not exist yet
///
/// Collisions are resolved by appending `-1`, `-2`, ... to the file stem, so
/// `a.jpg` becomes `a-1.jpg`.
pub async fn make_unique_dest(base_dir: &Path, file_name: &str) -> Result<PathBuf> {
    let candidate = base_dir.join(file_name);
    if !path_exists(&candidate).await? {
        return Ok(candidate);
    }

    let as_path = Path::new(file_name);
    let stem = as_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());
    let extension = as_path.extension().map(|e| e.to_string_lossy().into_owned());

    for i in 1..=MAX_RENAME_ATTEMPTS {
        let new_name = match &extension {
            Some(ext) => format!("{}-{}.{}", stem, i, ext),
            None => format!("{}-{}", stem, i),
        };
        let new_path = base_dir.join(new_name);
        if !path_exists(&new_path).await? {
            return Ok(new_path);
        }
    }

    Err(Error::FileOperation {
        path: candidate,
        reason: format!(
            "could not find a unique file name after {} attempts",
            MAX_RENAME_ATTEMPTS
        ),
    })
}

/// Collect every regular file below `dir`, optionally leaving out archives
pub async fn collect_files(dir: &Path, exclude_archives: bool) -> Result<Vec<PathBuf>> {
    let mut stack = vec![dir.to_path_buf()];
    let mut files = Vec::new();

    while let Some(current) = stack.pop() {
        let mut entries = fs::read_dir(&current).await?;
        while let Some(entry) = entries.next_entry().await? {
            let file_type = entry.file_type().await?;
            let path = entry.path();
            if file_type.is_dir() {
                stack.push(path);
            } else if exclude_archives && is_archive_file(&entry.file_name().to_string_lossy()) {
                continue;
            } else {
                files.push(path);
            }
        }
    }

    Ok(files)
}

/// Delete configured dirty files at any depth below `dir`
///
/// A file matches when its full name or its name without extension is listed.
/// Returns the number of files deleted.
pub async fn delete_dirty_recursive(dir: &Path, dirty_names: &[String]) -> Result<usize> {
    if dirty_names.is_empty() {
        return Ok(0);
    }

    let mut stack = vec![dir.to_path_buf()];
    let mut deleted = 0;

    while let Some(current) = stack.pop() {
        let mut entries = fs::read_dir(&current).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_dir() {
                stack.push(path);
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            let stem = Path::new(&name)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();

            if dirty_names.iter().any(|d| *d == name || *d == stem) {
                fs::remove_file(&path)
                    .await
                    .map_err(|e| Error::file_op(&path, e))?;
                info!(?path, "deleted dirty file");
                deleted += 1;
            }
        }
    }

    Ok(deleted)
}

/// Move every non-archive file below `root_dir` directly into `root_dir`
///
/// Name collisions get a numeric suffix. Afterwards, directories left empty or
/// holding only archives are removed. Returns the number of files moved.
pub async fn move_files_to_root(root_dir: &Path) -> Result<usize> {
    let files = collect_files(root_dir, true).await?;
    let mut moved = 0;

    for file in files {
        if file.parent() == Some(root_dir) {
            continue;
        }
        let Some(name) = file.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        let dest = make_unique_dest(root_dir, &name).await?;
        fs::rename(&file, &dest)
            .await
            .map_err(|e| Error::file_op(&file, e))?;
        debug!(from = ?file, to = ?dest, "moved file to root");
        moved += 1;
    }

    remove_empty_dirs(root_dir).await?;
    Ok(moved)
}

/// Remove directories below `root_dir` that are empty or contain only archives
///
/// Directories are visited deepest first so that a parent emptied by its
/// children's removal is removed too. `root_dir` itself is kept.
pub async fn remove_empty_dirs(root_dir: &Path) -> Result<()> {
    let mut dirs = Vec::new();
    let mut stack = vec![root_dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        let mut entries = fs::read_dir(&current).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                let path = entry.path();
                stack.push(path.clone());
                dirs.push(path);
            }
        }
    }

    dirs.sort_by_key(|d| std::cmp::Reverse(d.components().count()));

    for dir in dirs {
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(_) => continue,
        };
        let mut has_content = false;
        while let Some(entry) = entries.next_entry().await? {
            if !is_archive_file(&entry.file_name().to_string_lossy()) {
                has_content = true;
                break;
            }
        }
        if has_content {
            continue;
        }
        match fs::remove_dir_all(&dir).await {
            Ok(()) => debug!(?dir, "removed empty or archive-only directory"),
            Err(e) => warn!(?dir, error = %e, "failed to remove directory"),
        }
    }

    Ok(())
}

/// Rename `folder` to `new_name` within the same parent directory
///
/// An existing directory at the destination is deleted first (clobber, not merge).
/// Returns the final path, which equals `folder` when the name is unchanged.
pub async fn rename_root_folder(folder: &Path, new_name: &str) -> Result<PathBuf> {
    let parent = folder.parent().ok_or_else(|| Error::FileOperation {
        path: folder.to_path_buf(),
        reason: "folder has no parent directory".into(),
    })?;
    let new_path = parent.join(new_name);
    if new_path == folder {
        return Ok(new_path);
    }

    match fs::symlink_metadata(&new_path).await {
        Ok(meta) => {
            warn!(?new_path, "rename destination exists, deleting it");
            let removed = if meta.is_dir() {
                fs::remove_dir_all(&new_path).await
            } else {
                fs::remove_file(&new_path).await
            };
            removed.map_err(|e| Error::file_op(&new_path, e))?;
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(Error::file_op(&new_path, e)),
    }

    fs::rename(folder, &new_path)
        .await
        .map_err(|e| Error::file_op(folder, e))?;
    info!(from = ?folder, to = ?new_path, "renamed folder");
    Ok(new_path)
}

/// Strip one pair of matching surrounding quotes (for shells that pass them through)
pub fn strip_quotes(arg: &str) -> &str {
    let trimmed = arg.trim();
    for quote in ['"', '\''] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return &trimmed[1..trimmed.len() - 1];
        }
    }
    trimmed
}

/// Validate the command line target: absolute, existing, and a directory
pub async fn validate_target_dir(raw: &str) -> Result<PathBuf> {
    let path = PathBuf::from(strip_quotes(raw));

    if !path.is_absolute() {
        return Err(Error::InvalidTarget {
            path,
            reason: "path must be absolute".into(),
        });
    }

    let metadata = fs::metadata(&path).await.map_err(|_| Error::InvalidTarget {
        path: path.clone(),
        reason: "path does not exist".into(),
    })?;

    if !metadata.is_dir() {
        return Err(Error::InvalidTarget {
            path,
            reason: "path is not a directory".into(),
        });
    }

    Ok(path)
}
