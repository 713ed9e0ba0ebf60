//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `OrganizeError` enum per categorizzare tutti gli errori possibili
//! - Distingue errori fatali per il run da errori confinati al singolo file
//! - Integra con `thiserror` per automatic error conversion
//! - Mantiene il contesto (sorgente, destinazione, causa) per il logging
//!
//! ## Categorie di errori:
//! - `Traversal`: Errore durante la scansione dell'albero (fatale per il run)
//! - `Extraction`: Data di scatto non estraibile (il file finisce in `undated`)
//! - `DirectoryCreation`: Impossibile creare la directory di destinazione
//! - `Relocation`: Spostamento fallito (permessi, sorgente sparita, I/O)
//! - `MissingDependency`: Tool esterno mancante (exiftool)
//! - `Validation`: Errori di validazione input
//!
//! Le collisioni di nome NON sono errori: vengono risolte dal `Relocator`
//! con il suffisso numerico.
//!
//! ## Esempio:
//! ```rust,ignore
//! if !tool_exists {
//!     return Err(OrganizeError::MissingDependency("exiftool".to_string()));
//! }
//! ```

use std::path::PathBuf;

/// Custom error types for media organization
#[derive(thiserror::Error, Debug)]
pub enum OrganizeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Traversal error at {path}: {message}")]
    Traversal { path: PathBuf, message: String },

    #[error("Capture date extraction failed for {path}: {message}")]
    Extraction { path: PathBuf, message: String },

    #[error("Failed to create directory {directory}: {source}")]
    DirectoryCreation {
        directory: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move {source_path} to {destination}: {source}")]
    Relocation {
        source_path: PathBuf,
        destination: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Dependency missing: {0}")]
    MissingDependency(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl OrganizeError {
    /// Build an extraction error for a file
    pub fn extraction(path: &std::path::Path, message: impl Into<String>) -> Self {
        Self::Extraction {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    /// Whether this error must halt the whole run
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Traversal { .. } | Self::Validation(_))
    }
}

impl From<walkdir::Error> for OrganizeError {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(|p| p.to_path_buf()).unwrap_or_default();
        Self::Traversal {
            path,
            message: err.to_string(),
        }
    }
}
