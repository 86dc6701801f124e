//! # batch-unpack
//!
//! Bulk extraction and folder normalization for directories of numbered,
//! password-protected archives.
//!
//! ## Design Philosophy
//!
//! batch-unpack is designed to be:
//! - **Configurable** - Every cleanup step can be toggled from a TOML file
//! - **Sensible defaults** - Works out of the box with zero configuration
//! - **Library-first** - The CLI is a thin wrapper over [`run_process`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use batch_unpack::{Config, FolderRange, SevenZipExtractor, run_process};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config {
//!         folder_range: Some(FolderRange { start: 200, end: 250 }),
//!         ..Default::default()
//!     };
//!
//!     let extractor = SevenZipExtractor::from_config(&config)?;
//!     let summary = run_process(Path::new("/data/galleries"), &config, &extractor).await?;
//!     println!("extracted {} archives", summary.extracted);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types and discovery
pub mod config;
/// Error types
pub mod error;
/// Archive extraction
pub mod extraction;
/// Flattening of nested folders
pub mod organizer;
/// Per-id phase detection
pub mod phase_detector;
/// Range and full-directory processing
pub mod processor;
/// Core types
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use config::{Config, FolderRange};
pub use error::{Error, ExtractionError, Result};
pub use extraction::{ArchiveExtractor, SevenZipExtractor};
pub use processor::run_process;
pub use types::{ProcessPhase, ProcessTarget, RunSummary, TargetOutcome, VolumeSet};
