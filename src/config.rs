//! Configuration types for batch-unpack
//!
//! Configuration is read from a TOML file found by searching upward from the
//! working directory. Every key is optional; omitted keys take their defaults.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info, warn};

/// File names recognized during configuration discovery, in priority order
pub const CONFIG_FILE_NAMES: &[&str] = &["batch-unpack.toml", ".batch-unpack.toml"];

/// Inclusive range of numeric ids to process
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderRange {
    /// First id (inclusive)
    pub start: u32,
    /// Last id (inclusive)
    pub end: u32,
}

/// Tool configuration, immutable for the duration of a run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Password passed to the extraction binary
    #[serde(default = "default_password")]
    pub password: String,

    /// File names (or file stems) to purge from extracted content
    #[serde(default = "default_dirty_files")]
    pub dirty_files: Vec<String>,

    /// Delete source archives and volume parts after extraction (default: false)
    #[serde(default)]
    pub delete_packages: bool,

    /// Flatten extracted content into the extraction root (default: true)
    #[serde(default = "default_true")]
    pub move_files_to_root: bool,

    /// Rename the root folder to the detected name (default: true)
    #[serde(default = "default_true")]
    pub rename_root_folder: bool,

    /// Also process archives whose stem is not purely numeric (default: false)
    #[serde(default)]
    pub decompress_mixed_named_packages: bool,

    /// Only process ids in this range; when unset every archive in the directory is processed
    #[serde(default)]
    pub folder_range: Option<FolderRange>,

    /// Per-extraction timeout in milliseconds, 0 disables it (default: 10000)
    #[serde(
        default = "default_decompress_timeout",
        with = "duration_millis_serde"
    )]
    pub decompress_timeout: Duration,

    /// Entries whose name contains this marker are ignored by fuzzy phase detection
    #[serde(default = "default_completed_marker")]
    pub completed_marker: String,

    /// Path to the 7z executable (auto-detected if None)
    #[serde(default)]
    pub sevenzip_path: Option<PathBuf>,

    /// Whether to search PATH for the 7z executable if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            password: default_password(),
            dirty_files: default_dirty_files(),
            delete_packages: false,
            move_files_to_root: true,
            rename_root_folder: true,
            decompress_mixed_named_packages: false,
            folder_range: None,
            decompress_timeout: default_decompress_timeout(),
            completed_marker: default_completed_marker(),
            sevenzip_path: None,
            search_path: true,
        }
    }
}

impl Config {
    /// Load configuration from an explicit file, or discover one upward from the
    /// current working directory. Falls back to defaults when nothing is found.
    pub async fn load(explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) => Self::from_file(path).await?,
            None => {
                let cwd = std::env::current_dir()?;
                match Self::discover(&cwd).await {
                    Some(path) => {
                        info!(?path, "found configuration file");
                        Self::from_file(&path).await?
                    }
                    None => {
                        warn!("no configuration file found, using defaults");
                        Self::default()
                    }
                }
            }
        };

        config.validate()?;

        match config.folder_range {
            Some(range) => info!(
                start = range.start,
                end = range.end,
                "configuration loaded, range mode"
            ),
            None => info!("configuration loaded, folder_range unset, processing every archive"),
        }

        Ok(config)
    }

    /// Search `start_dir` and each of its ancestors for a recognized configuration file
    pub async fn discover(start_dir: &Path) -> Option<PathBuf> {
        for dir in start_dir.ancestors() {
            for name in CONFIG_FILE_NAMES {
                let candidate = dir.join(name);
                if let Ok(meta) = fs::metadata(&candidate).await
                    && meta.is_file()
                {
                    return Some(candidate);
                }
            }
        }
        None
    }

    /// Read and parse a TOML configuration file
    pub async fn from_file(path: &Path) -> Result<Self> {
        debug!(?path, "reading configuration file");
        let contents = fs::read_to_string(path).await.map_err(|e| Error::Config {
            message: format!("failed to read {}: {}", path.display(), e),
            key: None,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from TOML text, merging it over the defaults
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::Config {
            message: e.to_string(),
            key: None,
        })
    }

    /// Reject settings that cannot produce a meaningful run
    pub fn validate(&self) -> Result<()> {
        if let Some(range) = self.folder_range
            && range.start > range.end
        {
            return Err(Error::Config {
                message: format!(
                    "folder_range start ({}) is greater than end ({})",
                    range.start, range.end
                ),
                key: Some("folder_range".into()),
            });
        }
        Ok(())
    }

    /// Effective extraction timeout, `None` when disabled
    pub fn extraction_timeout(&self) -> Option<Duration> {
        (!self.decompress_timeout.is_zero()).then_some(self.decompress_timeout)
    }
}

// Default value functions
fn default_password() -> String {
    "https://www.91xiezhen.top".into()
}

fn default_dirty_files() -> Vec<String> {
    vec!["孔雀海".into()]
}

fn default_true() -> bool {
    true
}

fn default_decompress_timeout() -> Duration {
    Duration::from_millis(10_000)
}

fn default_completed_marker() -> String {
    "[done]".into()
}

// Duration serialization helper (integer milliseconds)
mod duration_millis_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
