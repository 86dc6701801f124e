//! Phase detection for numbered work items
//!
//! Each id in a configured range maps to at most one [`ProcessTarget`]. Archives
//! always win over folders for the same id:
//!
//! 1. `<id>.<ext>` / `<id:03>.<ext>` regular file → [`ProcessPhase::Decompress`]
//! 2. `<id>/` / `<id:03>/` directory → [`ProcessPhase::Organize`]
//! 3. fuzzy fallback over entries named `<id><non-digit>...` or
//!    `<id:03><non-digit>...`, skipping entries carrying the completed marker

use crate::config::FolderRange;
use crate::error::Result;
use crate::extraction::is_archive_candidate;
use crate::types::{ProcessPhase, ProcessTarget};
use crate::utils::ARCHIVE_EXTENSIONS;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

/// Every id in `range`, ascending, both ends inclusive
pub fn generate_number_range(range: FolderRange) -> Vec<u32> {
    (range.start..=range.end).collect()
}

/// Name stems an id may appear under: exact first, then zero-padded to 3 digits
pub fn candidate_stems(number: u32) -> Vec<String> {
    let exact = number.to_string();
    let padded = format!("{:03}", number);
    if padded == exact {
        vec![exact]
    } else {
        vec![exact, padded]
    }
}

/// Whether `name` starts with `stem` followed by a non-digit character
fn has_number_prefix(name: &str, stem: &str) -> bool {
    name.strip_prefix(stem)
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| !c.is_ascii_digit())
}

fn target(number: u32, phase: ProcessPhase, dir: &Path, name: &str) -> ProcessTarget {
    ProcessTarget {
        number,
        phase,
        full_path: dir.join(name),
        name: name.to_string(),
    }
}

/// Classify the work item for `number` inside `dir`
///
/// Returns `None` when nothing in `dir` corresponds to the id.
pub async fn detect_phase(
    dir: &Path,
    number: u32,
    completed_marker: &str,
) -> Result<Option<ProcessTarget>> {
    let stems = candidate_stems(number);

    for stem in &stems {
        for ext in ARCHIVE_EXTENSIONS {
            let name = format!("{}.{}", stem, ext);
            if let Ok(meta) = fs::metadata(dir.join(&name)).await
                && meta.is_file()
            {
                return Ok(Some(target(number, ProcessPhase::Decompress, dir, &name)));
            }
        }
    }

    for stem in &stems {
        if let Ok(meta) = fs::metadata(dir.join(stem)).await
            && meta.is_dir()
        {
            return Ok(Some(target(number, ProcessPhase::Organize, dir, stem)));
        }
    }

    fuzzy_match(dir, number, &stems, completed_marker).await
}

async fn fuzzy_match(
    dir: &Path,
    number: u32,
    stems: &[String],
    completed_marker: &str,
) -> Result<Option<ProcessTarget>> {
    let mut entries = fs::read_dir(dir).await?;
    let mut matches = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !stems.iter().any(|stem| has_number_prefix(&name, stem)) {
            continue;
        }
        if !completed_marker.is_empty() && name.contains(completed_marker) {
            debug!(number, %name, "skipping entry marked as completed");
            continue;
        }
        matches.push((name, entry.file_type().await?));
    }

    matches.sort_by(|a, b| a.0.cmp(&b.0));

    let archive = matches
        .iter()
        .find(|(name, ft)| ft.is_file() && is_archive_candidate(name, true));
    if let Some((name, _)) = archive {
        return Ok(Some(target(number, ProcessPhase::Decompress, dir, name)));
    }

    if let Some((name, _)) = matches.iter().find(|(_, ft)| ft.is_dir()) {
        return Ok(Some(target(number, ProcessPhase::Organize, dir, name)));
    }

    if let Some((name, _)) = matches.first() {
        return Ok(Some(target(number, ProcessPhase::Unknown, dir, name)));
    }

    Ok(None)
}

/// Detect targets for every id in `range`, preserving numeric order
pub async fn detect_all_targets(
    dir: &Path,
    range: FolderRange,
    completed_marker: &str,
) -> Result<Vec<ProcessTarget>> {
    info!(
        start = range.start,
        end = range.end,
        "detecting targets in range"
    );

    let mut targets = Vec::new();
    for number in generate_number_range(range) {
        match detect_phase(dir, number, completed_marker).await? {
            Some(found) => {
                info!(number, phase = %found.phase, name = %found.name, "detected target");
                targets.push(found);
            }
            None => debug!(number, "no file or folder found, skipping"),
        }
    }

    let count = |phase: ProcessPhase| targets.iter().filter(|t| t.phase == phase).count();
    info!(
        total = targets.len(),
        decompress = count(ProcessPhase::Decompress),
        organize = count(ProcessPhase::Organize),
        unknown = count(ProcessPhase::Unknown),
        "detection complete"
    );

    Ok(targets)
}
