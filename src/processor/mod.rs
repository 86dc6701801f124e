//! Batch orchestration over a target directory
//!
//! Two modes, selected by whether `folder_range` is configured:
//! - range mode: detect a phase for every id in the range, then extract or
//!   organize each target
//! - full mode: extract every archive candidate in the directory
//!
//! Targets are processed sequentially. An extraction timeout abandons only the
//! target it hit; every other error aborts the run.


use crate::config::{Config, FolderRange};
use crate::error::{Error, Result};
use crate::extraction::{
    ArchiveExtractor, delete_non_volume_files, find_volume_set, select_archives,
};
use crate::organizer::organize_folder;
use crate::phase_detector::detect_all_targets;
use crate::types::{ProcessPhase, ProcessTarget, RunSummary, TargetOutcome};
use crate::utils::{delete_dirty_recursive, move_files_to_root, rename_root_folder};
use std::path::Path;
use tokio::fs;
use tracing::{info, warn};

/// Run the pipeline over `target_dir`
pub async fn run_process(
    target_dir: &Path,
    config: &Config,
    extractor: &dyn ArchiveExtractor,
) -> Result<RunSummary> {
    info!(extractor = extractor.name(), ?target_dir, "starting run");

    let summary = match config.folder_range {
        Some(range) => {
            info!(start = range.start, end = range.end, "range mode");
            process_with_range(target_dir, range, config, extractor).await?
        }
        None => {
            info!("full mode: processing every archive in the directory");
            process_all_archives(target_dir, config, extractor).await?
        }
    };

    info!(
        extracted = summary.extracted,
        organized = summary.organized,
        already_flat = summary.already_flat,
        timed_out = summary.timed_out,
        skipped = summary.skipped,
        "processing complete"
    );
    Ok(summary)
}

/// Detect and process every target whose id lies in `range`
pub async fn process_with_range(
    target_dir: &Path,
    range: FolderRange,
    config: &Config,
    extractor: &dyn ArchiveExtractor,
) -> Result<RunSummary> {
    let targets = detect_all_targets(target_dir, range, &config.completed_marker).await?;
    let mut summary = RunSummary::default();

    if targets.is_empty() {
        warn!(
            start = range.start,
            end = range.end,
            "no targets found in range"
        );
        return Ok(summary);
    }

    let total = targets.len();
    for (i, target) in targets.iter().enumerate() {
        info!(
            number = target.number,
            "[{}/{}] processing {}",
            i + 1,
            total,
            target.name
        );
        let outcome = process_target(target_dir, target, config, extractor).await?;
        summary.record(&outcome);
    }

    Ok(summary)
}

/// Dispatch one detected target by phase
pub async fn process_target(
    target_dir: &Path,
    target: &ProcessTarget,
    config: &Config,
    extractor: &dyn ArchiveExtractor,
) -> Result<TargetOutcome> {
    match target.phase {
        ProcessPhase::Decompress => {
            process_archive(target_dir, &target.name, config, extractor).await
        }
        ProcessPhase::Organize => organize_folder(&target.full_path, config).await,
        ProcessPhase::Unknown => {
            warn!(
                number = target.number,
                name = %target.name,
                "unknown phase, skipping"
            );
            Ok(TargetOutcome::Skipped)
        }
    }
}

/// Extract every archive candidate directly inside `target_dir`
pub async fn process_all_archives(
    target_dir: &Path,
    config: &Config,
    extractor: &dyn ArchiveExtractor,
) -> Result<RunSummary> {
    let archives = select_archives(target_dir, config.decompress_mixed_named_packages).await?;
    let mut summary = RunSummary::default();

    if archives.is_empty() {
        warn!(?target_dir, "no matching archives found");
        return Ok(summary);
    }

    info!(count = archives.len(), "found archives, starting extraction");
    for archive in &archives {
        let outcome = process_archive(target_dir, archive, config, extractor).await?;
        summary.record(&outcome);
    }

    Ok(summary)
}

/// Run `extract`, turning a timeout into `Ok(false)` so the caller can skip the target
async fn extract_or_skip(
    extractor: &dyn ArchiveExtractor,
    archive: &Path,
    output_dir: &Path,
    config: &Config,
) -> Result<bool> {
    match extractor
        .extract(
            archive,
            output_dir,
            &config.password,
            config.extraction_timeout(),
        )
        .await
    {
        Ok(()) => Ok(true),
        Err(e) if e.is_timeout() => {
            warn!(?archive, error = %e, "extraction timed out, skipping target");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

/// Full pipeline for one archive in `target_dir`
///
/// Extract into `<target_dir>/<stem>`, purge dirty files, extract a nested
/// volume set if one exists, flatten, and rename to the volume set's base name.
pub async fn process_archive(
    target_dir: &Path,
    archive_name: &str,
    config: &Config,
    extractor: &dyn ArchiveExtractor,
) -> Result<TargetOutcome> {
    let archive_path = target_dir.join(archive_name);
    let stem = Path::new(archive_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| archive_name.to_string());
    let extraction_dir = target_dir.join(&stem);

    info!(archive = %archive_name, "processing archive");

    if !extract_or_skip(extractor, &archive_path, &extraction_dir, config).await? {
        return Ok(TargetOutcome::TimedOut);
    }

    if config.delete_packages {
        fs::remove_file(&archive_path)
            .await
            .map_err(|e| Error::file_op(&archive_path, e))?;
        info!(?archive_path, "deleted source archive");
    }

    delete_dirty_recursive(&extraction_dir, &config.dirty_files).await?;

    let volume_set = find_volume_set(&extraction_dir).await?;
    if let Some(set) = &volume_set {
        info!(base_name = %set.base_name, parts = set.files.len(), "extracting volume set");
        delete_non_volume_files(&set.dir, &set.base_name).await?;

        if let Some(first) = set.first_part()
            && !extract_or_skip(extractor, first, &set.dir, config).await?
        {
            return Ok(TargetOutcome::TimedOut);
        }

        if config.delete_packages {
            for part in &set.files {
                fs::remove_file(part)
                    .await
                    .map_err(|e| Error::file_op(part, e))?;
            }
        }

        delete_dirty_recursive(&set.dir, &config.dirty_files).await?;
    }

    if config.move_files_to_root {
        let moved = move_files_to_root(&extraction_dir).await?;
        info!(dir = ?extraction_dir, moved, "moved files to root");
    }

    let mut output_dir = extraction_dir.clone();
    if let Some(set) = &volume_set
        && config.rename_root_folder
    {
        output_dir = rename_root_folder(&extraction_dir, &set.base_name).await?;
    }

    info!(archive = %archive_name, output = ?output_dir, "archive processed");
    Ok(TargetOutcome::Extracted { output_dir })
}
