//! # Task Organizer Module
//!
//! Worker per un singolo file: classificazione → data di scatto →
//! destinazione → spostamento → aggiornamento progress.
//! Ogni errore resta confinato al file che lo ha generato.

use crate::{
    date_extractor::DateExtractor,
    error::OrganizeError,
    file_manager::{FileManager, MediaKind},
    organizer::{
        path_resolver::{PathResolver, Resolution},
        progress_tracker::ProgressTracker,
        relocator::Relocator,
    },
};
use std::path::PathBuf;
use tracing::{debug, error, info};

/// One discovered file, consumed by exactly one worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocationTask {
    pub source: PathBuf,
    pub kind: MediaKind,
}

impl RelocationTask {
    /// Classify a file found during discovery
    pub fn discover(source: PathBuf) -> Self {
        let kind = FileManager::classify(&source);
        Self { source, kind }
    }
}

/// How a task ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Moved {
        from: PathBuf,
        to: PathBuf,
        undated: bool,
    },
    AlreadyInPlace(PathBuf),
    Unsupported(PathBuf),
    Failed {
        path: PathBuf,
        reason: String,
    },
}

/// Worker shared by every task of a run
pub struct TaskOrganizer {
    extractor: DateExtractor,
    media_root: PathBuf,
    progress: ProgressTracker,
}

impl TaskOrganizer {
    pub fn new(extractor: DateExtractor, media_root: PathBuf, progress: ProgressTracker) -> Self {
        Self {
            extractor,
            media_root,
            progress,
        }
    }

    /// Process one file. Never fails: errors become `TaskOutcome::Failed`.
    pub async fn process_file(&self, task: RelocationTask) -> TaskOutcome {
        let source = task.source.clone();
        match self.organize(task).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Failed to organize {}: {}", source.display(), e);
                TaskOutcome::Failed {
                    path: source,
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn organize(&self, task: RelocationTask) -> Result<TaskOutcome, OrganizeError> {
        if !task.kind.is_media() {
            debug!("Skipping unsupported file: {}", task.source.display());
            return Ok(TaskOutcome::Unsupported(task.source));
        }

        let date = self.extractor.extract(&task.source, task.kind).await;

        let destination = match PathResolver::resolve(&task.source, date, &self.media_root).await? {
            Resolution::AlreadyInPlace(directory) => {
                info!(
                    "{} is already in the correct location ({})",
                    task.source.display(),
                    directory.display()
                );
                return Ok(TaskOutcome::AlreadyInPlace(task.source));
            }
            Resolution::Relocate(destination) => destination,
        };

        PathResolver::ensure_directory(&destination.directory).await?;
        let moved_to = Relocator::relocate(&task.source, &destination).await?;
        self.progress.on_moved(&moved_to).await;

        Ok(TaskOutcome::Moved {
            from: task.source,
            to: moved_to,
            undated: date.is_none(),
        })
    }
}
