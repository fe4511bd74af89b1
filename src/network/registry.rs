//! Session Registry
//!
//! Tracks spawned session threads and reaps the finished ones.

use std::collections::HashMap;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{unbounded, Receiver, Sender};

use crate::error::Result;

/// Identifier handed out per spawned session
pub type SessionId = u64;

/// Handles of in-flight session workers
///
/// Workers report completion over a channel, so finished sessions are
/// found without polling every handle or blocking the accept loop.
pub struct SessionRegistry {
    workers: HashMap<SessionId, JoinHandle<()>>,

    /// Completion notices (cloned into every worker)
    done_tx: Sender<SessionId>,
    done_rx: Receiver<SessionId>,

    next_id: SessionId,
}

/// Reports completion when the worker exits, including by panic
struct CompletionGuard {
    id: SessionId,
    done_tx: Sender<SessionId>,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        let _ = self.done_tx.send(self.id);
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        let (done_tx, done_rx) = unbounded();
        Self {
            workers: HashMap::new(),
            done_tx,
            done_rx,
            next_id: 1,
        }
    }

    /// Run `work` on a new named thread
    ///
    /// If the thread cannot be started, `work` (and anything it owns) is
    /// dropped immediately and the error returned.
    pub fn spawn<F>(&mut self, work: F) -> Result<SessionId>
    where
        F: FnOnce(SessionId) + Send + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;

        let done_tx = self.done_tx.clone();
        let handle = thread::Builder::new()
            .name(format!("session-{}", id))
            .spawn(move || {
                let _guard = CompletionGuard { id, done_tx };
                work(id);
            })?;

        self.workers.insert(id, handle);
        tracing::debug!("Spawned session {} ({} active)", id, self.workers.len());
        Ok(id)
    }

    /// Join every worker that has reported completion; never blocks on a
    /// running one
    pub fn reap(&mut self) -> usize {
        let mut reaped = 0;
        while let Ok(id) = self.done_rx.try_recv() {
            if let Some(handle) = self.workers.remove(&id) {
                Self::join(id, handle);
                reaped += 1;
            }
        }

        if reaped > 0 {
            tracing::debug!("Reaped {} sessions ({} active)", reaped, self.workers.len());
        }
        reaped
    }

    /// Block until every worker has finished
    pub fn join_all(&mut self) -> usize {
        let count = self.workers.len();
        for (id, handle) in self.workers.drain() {
            Self::join(id, handle);
        }
        while self.done_rx.try_recv().is_ok() {}
        count
    }

    /// Number of workers not yet reaped
    pub fn active(&self) -> usize {
        self.workers.len()
    }

    fn join(id: SessionId, handle: JoinHandle<()>) {
        if handle.join().is_err() {
            tracing::warn!("Session {} panicked", id);
        }
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
