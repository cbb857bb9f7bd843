//! Cooperative task primitives.
//!
//! The sidebar's timed behaviors come in two flavors:
//!
//! - **restartable**: starting a new run supersedes the one in flight. The
//!   superseded run keeps executing until its next checkpoint, but any
//!   deferred side effect must first check [`RunToken::is_current`].
//! - **keep-latest**: while one run is in flight, queued invocations
//!   collapse to the most recent; intermediate ones are dropped.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;

/// Supersession guard for restartable operations.
///
/// Each [`Restartable::start`] bumps a shared generation counter and hands
/// out a token pinned to the new generation. A token stops being current
/// the moment a newer run starts. Clones share the generation, so a run
/// can hand one to each effect it defers.
#[derive(Debug, Clone)]
pub struct RunToken {
    generation: u64,
    current: Arc<AtomicU64>,
}

impl RunToken {
    /// Whether this run is still the latest one.
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.generation
    }
}

/// Issues [`RunToken`]s for one restartable operation.
#[derive(Debug, Default)]
pub struct Restartable {
    current: Arc<AtomicU64>,
}

impl Restartable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new run, superseding any run already in flight.
    pub fn start(&self) -> RunToken {
        let generation = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        RunToken {
            generation,
            current: Arc::clone(&self.current),
        }
    }

    /// Invalidate the in-flight run without starting a new one.
    pub fn cancel(&self) {
        self.current.fetch_add(1, Ordering::SeqCst);
    }
}

/// Collapses overlapping invocations to the most recent one.
///
/// Callers race for a ticket, then queue on a mutex. When the lock frees,
/// every waiter whose ticket is no longer the latest drops out; only the
/// newest invocation actually runs.
#[derive(Debug, Default)]
pub struct KeepLatest {
    latest: AtomicU64,
    lock: Mutex<()>,
}

impl KeepLatest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `op` unless a newer invocation arrives first. Returns `None`
    /// when this invocation was superseded while queued.
    pub async fn run<F, Fut, T>(&self, op: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = self.lock.lock().await;
        if self.latest.load(Ordering::SeqCst) != ticket {
            return None;
        }
        Some(op().await)
    }
}
