//! # Progress Tracking Module
//!
//! Contatori condivisi tra i worker (file spostati / totale) protetti da un
//! singolo mutex. L'incremento e il ridisegno della barra avvengono insieme
//! sotto lo stesso lock, che non viene mai tenuto durante I/O o sottoprocessi.

use crate::progress::ProgressManager;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Counters for one run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProgressState {
    pub moved: usize,
    pub total: usize,
}

impl ProgressState {
    /// Completed share in 0.0..=1.0
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.moved as f64 / self.total as f64).min(1.0)
    }
}

/// Thread-safe tracker shared by all workers of a run
#[derive(Clone)]
pub struct ProgressTracker {
    state: Arc<Mutex<ProgressState>>,
    progress_manager: ProgressManager,
}

impl ProgressTracker {
    pub fn new(total: usize, visible: bool) -> Self {
        let progress_manager = if visible {
            ProgressManager::new(total as u64)
        } else {
            ProgressManager::hidden(total as u64)
        };

        Self {
            state: Arc::new(Mutex::new(ProgressState { moved: 0, total })),
            progress_manager,
        }
    }

    /// Count one moved file and redraw. Returns the new moved count.
    pub async fn on_moved(&self, destination: &Path) -> usize {
        let mut state = self.state.lock().await;
        state.moved += 1;
        let label = destination
            .file_name()
            .unwrap_or_default()
            .to_string_lossy();
        self.progress_manager.set_position(state.moved as u64, &label);
        state.moved
    }

    pub async fn snapshot(&self) -> ProgressState {
        *self.state.lock().await
    }

    pub fn finish(&self) {
        self.progress_manager.finish();
    }
}
