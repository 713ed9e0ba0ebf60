//! # Relocation Module
//!
//! Sposta un file nella destinazione calcolata senza mai sovrascrivere.
//!
//! ## Politica di collisione:
//! - Se `nome.ext` esiste già si prova `nome_1.ext`, poi `nome_2.ext`, ...
//! - Il suffisso è sempre calcolato dal nome originale (mai `nome_1_1.ext`)
//! - Nessun limite al numero di tentativi
//!
//! Lo spostamento usa hard link + rimozione della sorgente: la creazione del
//! link fallisce in modo atomico se il nome è occupato, anche con più worker
//! che puntano allo stesso nome. Dove gli hard link non sono disponibili si
//! ricade su controllo di esistenza + `rename`.

use crate::{error::OrganizeError, organizer::path_resolver::Destination};
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub struct Relocator;

impl Relocator {
    /// `<stem>_<n><ext>` built from the original name
    pub fn disambiguated_name(original: &OsStr, n: usize) -> OsString {
        let original_path = Path::new(original);
        let mut name = original_path
            .file_stem()
            .map(OsStr::to_os_string)
            .unwrap_or_else(|| original.to_os_string());
        name.push(format!("_{}", n));
        if let Some(ext) = original_path.extension() {
            name.push(".");
            name.push(ext);
        }
        name
    }

    /// Move `source` into `destination`, returning the path it ended up at
    pub async fn relocate(source: &Path, destination: &Destination) -> Result<PathBuf, OrganizeError> {
        let mut candidate = destination.path();
        let mut suffix = 0usize;

        loop {
            match Self::move_no_clobber(source, &candidate).await {
                Ok(()) => {
                    debug!("Moved {} -> {}", source.display(), candidate.display());
                    return Ok(candidate);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    suffix += 1;
                    debug!("{} is taken, trying suffix _{}", candidate.display(), suffix);
                    candidate = destination
                        .directory
                        .join(Self::disambiguated_name(&destination.file_name, suffix));
                }
                Err(e) => {
                    return Err(OrganizeError::Relocation {
                        source_path: source.to_path_buf(),
                        destination: candidate,
                        source: e,
                    });
                }
            }
        }
    }

    async fn move_no_clobber(source: &Path, target: &Path) -> io::Result<()> {
        match tokio::fs::hard_link(source, target).await {
            Ok(()) => {
                if let Err(e) = tokio::fs::remove_file(source).await {
                    // Undo the link so the file is not left in two places
                    if let Err(undo) = tokio::fs::remove_file(target).await {
                        warn!(
                            "Could not remove {} after failing to unlink {}: {}",
                            target.display(),
                            source.display(),
                            undo
                        );
                    }
                    return Err(e);
                }
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(e),
            Err(e) => {
                debug!("Hard link to {} failed ({}), using rename", target.display(), e);
                if tokio::fs::try_exists(target).await? {
                    return Err(io::Error::from(io::ErrorKind::AlreadyExists));
                }
                tokio::fs::rename(source, target).await
            }
        }
    }
}
