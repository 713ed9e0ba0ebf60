//! # Organizer Module
//!
//! Pipeline di classificazione e spostamento, separata in sottomoduli:
//! - `media_organizer`: Orchestratore (conteggio, dispatch, drain, riepilogo)
//! - `worker_pool`: Limite di task concorrenti tramite semaforo
//! - `task_organizer`: Worker per singolo file
//! - `path_resolver`: Calcolo della directory anno/mese o `undated`
//! - `relocator`: Spostamento senza sovrascrittura con suffisso numerico
//! - `progress_tracker`: Contatori condivisi e progress bar

pub mod media_organizer;
pub mod path_resolver;
pub mod progress_tracker;
pub mod relocator;
pub mod task_organizer;
pub mod worker_pool;

pub use media_organizer::{MediaOrganizer, RunSummary};
pub use path_resolver::{Destination, PathResolver, Resolution};
pub use progress_tracker::{ProgressState, ProgressTracker};
pub use relocator::Relocator;
pub use task_organizer::{RelocationTask, TaskOrganizer, TaskOutcome};
pub use worker_pool::WorkerPool;
