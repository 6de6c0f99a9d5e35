use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::trace;

/// Monotonic counter used to tag async operations.
///
/// An operation takes a tag with [`Generation::advance`] when it starts and may
/// only commit its result while that tag is still current.
#[derive(Debug, Clone, Default)]
pub struct Generation(Arc<AtomicU64>);

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, tag: u64) -> bool {
        self.current() == tag
    }
}

/// Runs only the most recently scheduled task, once it has been left alone
/// for the quiet period.
pub struct Debouncer {
    quiet: Duration,
    generation: Generation,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            generation: Generation::new(),
            pending: Mutex::new(None),
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    /// Schedule `task`, superseding anything scheduled before.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        // New ticket first so an already-sleeping task sees it is superseded
        let ticket = self.generation.advance();
        let generation = self.generation.clone();
        let quiet = self.quiet;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            // Superseded while sleeping (an abort may land after the wake-up)
            if !generation.is_current(ticket) {
                trace!("Debounced task {} superseded", ticket);
                return;
            }
            task.await;
        });

        let previous = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        // Stop the previous timer
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Drop whatever is pending without scheduling a replacement.
    pub fn cancel(&self) {
        self.generation.advance();
        if let Some(pending) = self.pending.lock().unwrap_or_else(PoisonError::into_inner).take() {
            pending.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
