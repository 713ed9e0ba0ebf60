//! # Path Resolution Module
//!
//! Centralizza il calcolo della destinazione di un file:
//! - `<root>/<anno>/<mese a due cifre>` per i file datati
//! - `<root>/undated` per i file senza data
//!
//! Se il file si trova già nella directory calcolata il risultato è
//! "già al suo posto" e nessuna operazione sul filesystem viene eseguita.

use crate::{date_extractor::CaptureDate, error::OrganizeError};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Bucket for files without a capture date
pub const UNDATED_DIR: &str = "undated";

/// Where a file should end up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub directory: PathBuf,
    /// Intended name, before any disambiguation
    pub file_name: OsString,
}

impl Destination {
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The file's parent already is the resolved directory
    AlreadyInPlace(PathBuf),
    Relocate(Destination),
}

/// Computes destinations under the media root
pub struct PathResolver;

impl PathResolver {
    /// Directory for a capture date, or the undated bucket
    pub fn target_directory(media_root: &Path, date: Option<CaptureDate>) -> PathBuf {
        match date {
            Some(date) => media_root
                .join(date.year.to_string())
                .join(format!("{:02}", date.month)),
            None => media_root.join(UNDATED_DIR),
        }
    }

    /// Resolve the destination of `source`. Touches nothing on disk.
    pub async fn resolve(
        source: &Path,
        date: Option<CaptureDate>,
        media_root: &Path,
    ) -> Result<Resolution, OrganizeError> {
        let file_name = source.file_name().ok_or_else(|| {
            OrganizeError::Validation(format!("Invalid file name: {}", source.display()))
        })?;
        let directory = Self::target_directory(media_root, date);

        let parent = source.parent().unwrap_or(Path::new(""));
        if Self::same_directory(parent, &directory).await {
            debug!("{} already in {}", source.display(), directory.display());
            return Ok(Resolution::AlreadyInPlace(directory));
        }

        Ok(Resolution::Relocate(Destination {
            directory,
            file_name: file_name.to_os_string(),
        }))
    }

    async fn same_directory(a: &Path, b: &Path) -> bool {
        if a == b {
            return true;
        }
        match (tokio::fs::canonicalize(a).await, tokio::fs::canonicalize(b).await) {
            (Ok(a), Ok(b)) => a == b,
            // A directory that does not exist yet cannot hold the file
            _ => false,
        }
    }

    /// Create `directory` and any missing ancestors
    pub async fn ensure_directory(directory: &Path) -> Result<(), OrganizeError> {
        tokio::fs::create_dir_all(directory)
            .await
            .map_err(|source| OrganizeError::DirectoryCreation {
                directory: directory.to_path_buf(),
                source,
            })
    }
}
