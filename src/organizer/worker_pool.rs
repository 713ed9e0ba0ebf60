//! # Worker Pool Module
//!
//! Limita il numero di task in esecuzione contemporanea con un semaforo.
//! Il permesso viene acquisito PRIMA dello spawn: se non ci sono permessi
//! liberi il dispatch si blocca finché un task non termina.

use anyhow::Result;
use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinHandle};
use tracing::debug;

/// Bounded pool of spawned tasks
pub struct WorkerPool<T> {
    semaphore: Arc<Semaphore>,
    capacity: usize,
    tasks: Vec<JoinHandle<T>>,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// `capacity` is clamped to 1..=`Semaphore::MAX_PERMITS`
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, Semaphore::MAX_PERMITS);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
            tasks: Vec::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Tasks currently holding a permit
    pub fn in_flight(&self) -> usize {
        self.capacity - self.semaphore.available_permits()
    }

    pub fn dispatched(&self) -> usize {
        self.tasks.len()
    }

    /// Wait for a free permit, then spawn `work`
    pub async fn dispatch<F>(&mut self, work: F) -> Result<()>
    where
        F: Future<Output = T> + Send + 'static,
    {
        let permit = self.semaphore.clone().acquire_owned().await?;
        debug!("Dispatching task #{} ({} in flight)", self.tasks.len() + 1, self.in_flight());

        self.tasks.push(tokio::spawn(async move {
            let _permit = permit; // released when the task finishes
            work.await
        }));
        Ok(())
    }

    /// Wait for every dispatched task, in dispatch order
    pub async fn drain(self) -> Vec<Result<T, JoinError>> {
        join_all(self.tasks).await
    }
}
