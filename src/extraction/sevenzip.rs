//! CLI-based extractor using an external 7-zip binary

use super::ArchiveExtractor;
use crate::config::Config;
use crate::error::{Error, ExtractionError, Result};
use crate::utils::ensure_dir;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

/// Binary names searched on PATH, in order
const BINARY_NAMES: &[&str] = &["7z", "7za", "7zz"];

/// Archive extractor that shells out to a 7-zip compatible binary
///
/// Runs `<binary> x <archive> -o<dir> -p<password> -y`, so existing files in the
/// output directory are overwritten without prompting.
///
/// # Examples
///
/// ```no_run
/// use batch_unpack::extraction::{ArchiveExtractor, SevenZipExtractor};
/// use std::path::Path;
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let extractor = SevenZipExtractor::from_path().expect("7z not found in PATH");
/// extractor
///     .extract(
///         Path::new("/data/221.zip"),
///         Path::new("/data/221"),
///         "secret",
///         Some(Duration::from_secs(10)),
///     )
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct SevenZipExtractor {
    binary_path: PathBuf,
}

impl SevenZipExtractor {
    /// Create an extractor with an explicit binary path
    pub fn new(binary_path: PathBuf) -> Self {
        Self { binary_path }
    }

    /// Attempt to find a 7-zip binary in PATH
    ///
    /// Uses the `which` crate and tries `7z`, `7za` and `7zz` in that order.
    pub fn from_path() -> Option<Self> {
        BINARY_NAMES
            .iter()
            .find_map(|name| which::which(name).ok())
            .map(Self::new)
    }

    /// Resolve the extractor from configuration: explicit path first, then PATH search
    pub fn from_config(config: &Config) -> Result<Self> {
        if let Some(path) = &config.sevenzip_path {
            return Ok(Self::new(path.clone()));
        }
        if config.search_path
            && let Some(extractor) = Self::from_path()
        {
            return Ok(extractor);
        }
        Err(Error::NotSupported(
            "archive extraction requires a 7z binary. \
             Configure sevenzip_path or ensure 7z is in PATH."
                .into(),
        ))
    }

    /// Path of the binary this extractor runs
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    fn build_command(&self, archive: &Path, output_dir: &Path, password: &str) -> Command {
        let mut cmd = Command::new(&self.binary_path);
        cmd.arg("x")
            .arg(archive)
            .arg(format!("-o{}", output_dir.display()))
            .arg(format!("-p{}", password))
            .arg("-y")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(parent) = archive.parent()
            && !parent.as_os_str().is_empty()
        {
            cmd.current_dir(parent);
        }
        cmd
    }
}

#[async_trait]
impl ArchiveExtractor for SevenZipExtractor {
    async fn extract(
        &self,
        archive: &Path,
        output_dir: &Path,
        password: &str,
        timeout: Option<Duration>,
    ) -> Result<()> {
        ensure_dir(output_dir).await?;

        debug!(
            binary = ?self.binary_path,
            ?archive,
            ?output_dir,
            password_length = password.len(),
            ?timeout,
            "running 7z extraction"
        );

        // the child runs from the archive's directory, so relative paths would resolve twice
        let archive_abs = std::path::absolute(archive).map_err(|e| Error::file_op(archive, e))?;
        let output_abs =
            std::path::absolute(output_dir).map_err(|e| Error::file_op(output_dir, e))?;

        let child = self
            .build_command(&archive_abs, &output_abs, password)
            .spawn()
            .map_err(|e| Error::ExternalTool(format!("Failed to execute 7z: {}", e)))?;

        // Dropping the output future on timeout drops the child, which kills it
        let output = match timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(result) => result,
                Err(_) => {
                    return Err(ExtractionError::Timeout {
                        archive: archive.to_path_buf(),
                        timeout: limit,
                    }
                    .into());
                }
            },
            None => child.wait_with_output().await,
        }
        .map_err(|e| Error::ExternalTool(format!("Failed to wait for 7z: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let reason = if stderr.is_empty() {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            } else {
                stderr
            };
            return Err(ExtractionError::Failed {
                archive: archive.to_path_buf(),
                reason: format!("7z exited with {}: {}", output.status, reason),
            }
            .into());
        }

        info!(?archive, ?output_dir, "7z extraction successful");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "cli-7z"
    }
}
