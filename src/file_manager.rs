//! # File Management Module
//!
//! Questo modulo gestisce la classificazione dei file e la discovery dei media.
//!
//! ## Responsabilità:
//! - Classificazione foto/video/non supportato tramite estensione
//! - Conteggio dei file media idonei (primo passaggio)
//! - Discovery ricorsiva di tutti i file non-directory (secondo passaggio)
//!
//! ## Formati supportati:
//! - **Foto**: JPG, JPEG, PNG, CR2, CR3, TIF, TIFF, NEF, ORF, DNG, ARW, SRW
//! - **Video**: MP4, AVI, MOV, MKV, FLV, WMV, M4V
//!
//! Le tabelle delle estensioni sono statiche e disgiunte; il confronto è
//! case-insensitive solo sull'estensione.
//!
//! ## Esempio:
//! ```rust,ignore
//! let total = FileManager::count_media_files(Path::new("/path/to/source"))?;
//! for file in FileManager::walk_files(Path::new("/path/to/source")) {
//!     let file = file?;
//!     match FileManager::classify(&file) { /* ... */ }
//! }
//! ```

use crate::error::OrganizeError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Photo extensions, lowercase, without the dot
pub const PHOTO_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "cr2", "cr3", "tif", "tiff", "nef", "orf", "dng", "arw", "srw",
];

/// Video extensions, lowercase, without the dot
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "flv", "wmv", "m4v"];

/// What a file is, as far as sorting is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Photo,
    Video,
    Unsupported,
}

impl MediaKind {
    /// Photos and videos get dated and moved
    pub fn is_media(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Video => "video",
            Self::Unsupported => "unsupported",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Manages classification and discovery
pub struct FileManager;

impl FileManager {
    /// Classify a file by its extension
    pub fn classify(path: &Path) -> MediaKind {
        let Some(ext) = path.extension() else {
            return MediaKind::Unsupported;
        };
        let ext_lower = ext.to_string_lossy().to_lowercase();

        if PHOTO_EXTENSIONS.contains(&ext_lower.as_str()) {
            MediaKind::Photo
        } else if VIDEO_EXTENSIONS.contains(&ext_lower.as_str()) {
            MediaKind::Video
        } else {
            MediaKind::Unsupported
        }
    }

    /// Walk every non-directory entry below `dir`.
    ///
    /// The walk stops at the first traversal error, which is yielded as the
    /// last item.
    pub fn walk_files(dir: &Path) -> impl Iterator<Item = Result<PathBuf, OrganizeError>> {
        let mut failed = false;
        WalkDir::new(dir)
            .into_iter()
            .filter_map(move |entry| {
                if failed {
                    return None;
                }
                match entry {
                    Ok(entry) if entry.file_type().is_dir() => None,
                    Ok(entry) => Some(Ok(entry.into_path())),
                    Err(e) => {
                        failed = true;
                        Some(Err(OrganizeError::from(e)))
                    }
                }
            })
    }

    /// Count photos and videos below `dir`, with no side effects.
    ///
    /// Any traversal error aborts the count.
    pub fn count_media_files(dir: &Path) -> Result<usize, OrganizeError> {
        let mut total = 0;
        for file in Self::walk_files(dir) {
            if Self::classify(&file?).is_media() {
                total += 1;
            }
        }
        Ok(total)
    }
}
