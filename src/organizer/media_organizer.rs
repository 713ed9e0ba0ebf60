//! # Media Organizer Main Orchestrator
//!
//! Orchestratore principale che delega responsabilità ai moduli specializzati.
//!
//! ## Flusso di esecuzione (per run):
//! 1. **Counting**: prima scansione completa, conta foto e video senza
//!    effetti collaterali; un errore di traversal interrompe il run
//! 2. **Dispatching**: seconda scansione, un `RelocationTask` per ogni file
//!    (anche non supportati); ogni task attende un permesso del `WorkerPool`
//! 3. **Draining**: attende tutti i task dispatchati, anche dopo un errore
//!    di traversal a metà scansione
//! 4. **Done**: statistiche finali e riga `Moved <n> files out of <total>.`
//!
//! ## Gestione concorrenza:
//! - Semaforo con capacità fissa (default: 2)
//! - `ProgressTracker` condiviso, unico stato mutabile tra i worker
//! - Nessun ordine garantito tra i completamenti dei task

use crate::{
    config::Config,
    date_extractor::DateExtractor,
    error::OrganizeError,
    file_manager::FileManager,
    organizer::{
        path_resolver::UNDATED_DIR,
        progress_tracker::{ProgressState, ProgressTracker},
        task_organizer::{RelocationTask, TaskOrganizer, TaskOutcome},
        worker_pool::WorkerPool,
    },
    platform::PlatformCommands,
    progress::OrganizeStats,
};
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Result of one run
#[derive(Debug)]
pub struct RunSummary {
    pub stats: OrganizeStats,
    pub progress: ProgressState,
    /// Traversal error hit while dispatching; in-flight tasks were still drained
    pub traversal_error: Option<OrganizeError>,
}

/// Orchestratore principale
pub struct MediaOrganizer {
    config: Config,
    extractor: DateExtractor,
}

impl MediaOrganizer {
    pub fn new(config: Config) -> Result<Self> {
        let extractor = DateExtractor::new(&config);
        Self::with_extractor(config, extractor)
    }

    /// Use a custom extraction setup
    pub fn with_extractor(config: Config, extractor: DateExtractor) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, extractor })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Warn when the external tool is missing. Not fatal: photos still decode
    /// in-process, everything else goes undated.
    pub async fn check_dependencies(&self) -> bool {
        let available = PlatformCommands::instance()
            .is_command_available(&self.config.exiftool_command)
            .await;
        if !available {
            warn!(
                "{} not found: videos will be moved to {}",
                OrganizeError::MissingDependency(self.config.exiftool_command.clone()),
                self.config.media_root.join(UNDATED_DIR).display()
            );
        }
        available
    }

    /// Sort every photo and video below `source` into the media root
    pub async fn run(&self, source: &Path) -> Result<RunSummary> {
        info!(
            "Sorting {} into {} ({} workers)",
            source.display(),
            self.config.media_root.display(),
            self.config.workers
        );

        let total = FileManager::count_media_files(source)?;
        info!("Found {} photos and videos", total);

        self.organize_entries(FileManager::walk_files(source), total).await
    }

    /// Dispatch one task per entry, then drain them all.
    ///
    /// A fatal entry error stops dispatching; tasks already running are still
    /// drained and the error is reported in the summary.
    async fn organize_entries<I>(&self, entries: I, total: usize) -> Result<RunSummary>
    where
        I: IntoIterator<Item = Result<PathBuf, OrganizeError>>,
    {
        let progress = ProgressTracker::new(total, self.config.show_progress);
        let worker = Arc::new(TaskOrganizer::new(
            self.extractor.clone(),
            self.config.media_root.clone(),
            progress.clone(),
        ));
        let mut pool = WorkerPool::new(self.config.workers);
        let mut traversal_error = None;

        for entry in entries {
            let path = match entry {
                Ok(path) => path,
                Err(e) if e.is_fatal() => {
                    error!("Traversal stopped: {}", e);
                    traversal_error = Some(e);
                    break;
                }
                Err(e) => {
                    warn!("Skipping entry: {}", e);
                    continue;
                }
            };

            let task = RelocationTask::discover(path);
            let worker = worker.clone();
            pool.dispatch(async move { worker.process_file(task).await }).await?;
        }

        info!("Dispatched {} files, waiting for workers", pool.dispatched());

        let mut stats = OrganizeStats::new(total);
        for result in pool.drain().await {
            match result {
                Ok(TaskOutcome::Moved { undated, .. }) => stats.add_moved(undated),
                Ok(TaskOutcome::AlreadyInPlace(_)) => stats.add_already_in_place(),
                Ok(TaskOutcome::Unsupported(_)) => stats.add_unsupported(),
                Ok(TaskOutcome::Failed { .. }) => stats.add_error(),
                Err(e) => {
                    error!("Worker task failed: {}", e);
                    stats.add_error();
                }
            }
        }

        progress.finish();
        let state = progress.snapshot().await;
        info!("=== Sorting Complete ===");
        info!("{}", stats.format_summary());
        info!("Progress: {:.0}% of {} files moved", state.fraction() * 100.0, state.total);

        Ok(RunSummary {
            stats,
            progress: state,
            traversal_error,
        })
    }
}
