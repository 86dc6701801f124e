//! Core types shared across the pipeline

use std::fmt;
use std::path::PathBuf;

/// How a numeric id should be processed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProcessPhase {
    /// An archive that has not been extracted yet
    Decompress,
    /// An already extracted folder whose nesting needs to be normalized
    Organize,
    /// Something matched the id but cannot be handled; skipped with a warning
    Unknown,
}

impl fmt::Display for ProcessPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProcessPhase::Decompress => "decompress",
            ProcessPhase::Organize => "organize",
            ProcessPhase::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// A unit of work produced by phase detection for one numeric id
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessTarget {
    /// The numeric id
    pub number: u32,
    /// Detected phase
    pub phase: ProcessPhase,
    /// Archive file path or folder path
    pub full_path: PathBuf,
    /// File or folder name (last path component)
    pub name: String,
}

/// A group of multi-part archive fragments (`name.7z.001`, `name.7z.002`, ...)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VolumeSet {
    /// Directory containing the parts
    pub dir: PathBuf,
    /// Shared base name, without the `.7z.NNN` suffix
    pub base_name: String,
    /// Full paths of the parts, sorted
    pub files: Vec<PathBuf>,
}

impl VolumeSet {
    /// The part extraction starts from (lowest part number)
    pub fn first_part(&self) -> Option<&PathBuf> {
        self.files.first()
    }
}

/// Result of processing a single target
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TargetOutcome {
    /// Archive extracted; `output_dir` is the final (possibly renamed) directory
    Extracted {
        /// Directory holding the extracted content
        output_dir: PathBuf,
    },
    /// Nested folder flattened; `folder` is the final (possibly renamed) directory
    Organized {
        /// Directory holding the organized content
        folder: PathBuf,
    },
    /// Folder was already flat, nothing to do
    AlreadyFlat,
    /// Extraction exceeded the configured timeout; remaining steps skipped
    TimedOut,
    /// Target could not be handled and was skipped
    Skipped,
}

/// Per-run tally returned by the processor
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Archives extracted
    pub extracted: usize,
    /// Folders flattened
    pub organized: usize,
    /// Folders that needed no work
    pub already_flat: usize,
    /// Targets abandoned because extraction timed out
    pub timed_out: usize,
    /// Targets skipped for an unknown phase
    pub skipped: usize,
}

impl RunSummary {
    /// Fold one target outcome into the tally
    pub fn record(&mut self, outcome: &TargetOutcome) {
        match outcome {
            TargetOutcome::Extracted { .. } => self.extracted += 1,
            TargetOutcome::Organized { .. } => self.organized += 1,
            TargetOutcome::AlreadyFlat => self.already_flat += 1,
            TargetOutcome::TimedOut => self.timed_out += 1,
            TargetOutcome::Skipped => self.skipped += 1,
        }
    }

    /// Total number of targets visited
    pub fn total(&self) -> usize {
        self.extracted + self.organized + self.already_flat + self.timed_out + self.skipped
    }
}
