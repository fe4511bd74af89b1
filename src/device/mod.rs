//! Device Module
//!
//! The shared log instance and per-handle access to it.
//!
//! ## Concurrency Model
//! - One [`LogDevice`] per process, constructed at startup and shared by `Arc`
//! - Every lookup and mutation goes through its single mutex
//! - Lock waits are bounded; a wait that gives up surfaces as
//!   [`LogError::LockAcquireInterrupted`] and leaves the log untouched
//! - Each [`LogFile`] handle owns its cursor and pending bytes, so handles
//!   never share partial commands

mod file;

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};

use crate::address::AddressTranslator;
use crate::config::Config;
use crate::error::{LogError, Result};
use crate::ring::{CommandEntry, CommandLog};

pub use file::LogFile;

/// Exclusive access to the log, held for one critical section
pub type LogGuard<'a> = MutexGuard<'a, CommandLog>;

/// The shared command log and its lock
#[derive(Debug)]
pub struct LogDevice {
    log: Mutex<CommandLog>,

    /// `None` waits forever
    lock_timeout: Option<Duration>,

    /// Per-handle accumulator limit
    max_command_len: Option<usize>,
}

impl LogDevice {
    /// Create a device with `capacity` slots and unbounded lock waits
    pub fn new(capacity: usize) -> Result<Self> {
        Ok(Self {
            log: Mutex::new(CommandLog::new(capacity)?),
            lock_timeout: None,
            max_command_len: None,
        })
    }

    /// Create a device sized and bounded by `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            log: Mutex::new(CommandLog::new(config.capacity)?),
            lock_timeout: config.lock_timeout(),
            max_command_len: Some(config.max_command_len),
        })
    }

    /// Bound lock waits to `timeout`
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = Some(timeout);
        self
    }

    /// Acquire the log lock, giving up after the configured wait
    pub fn lock(&self) -> Result<LogGuard<'_>> {
        match self.lock_timeout {
            Some(timeout) => self.log.try_lock_for(timeout).ok_or_else(|| {
                tracing::warn!("Gave up waiting {:?} for the log lock", timeout);
                LogError::LockAcquireInterrupted {
                    waited_ms: timeout.as_millis() as u64,
                }
            }),
            None => Ok(self.log.lock()),
        }
    }

    /// Insert a completed command, returning whatever it evicted
    pub fn commit(&self, entry: CommandEntry) -> Result<Option<CommandEntry>> {
        let mut log = self.lock()?;
        Ok(insert_logged(&mut log, entry))
    }

    /// Copy of the whole retained log, oldest command first
    pub fn snapshot(&self) -> Result<Vec<u8>> {
        let log = self.lock()?;
        let translator = AddressTranslator::new(&log);

        let mut out = Vec::with_capacity(translator.end());
        for entry in log.iter() {
            out.extend_from_slice(entry.as_bytes());
        }
        Ok(out)
    }

    pub fn retained_count(&self) -> Result<usize> {
        Ok(self.lock()?.retained_count())
    }

    pub fn total_size(&self) -> Result<usize> {
        Ok(self.lock()?.total_size())
    }

    /// Release every retained command; returns how many were live
    ///
    /// Waits for the lock without a bound so in-flight holders finish first.
    pub fn clear(&self) -> usize {
        let mut log = self.log.lock();
        let released = log.retained_count();
        log.init();
        released
    }

    /// Open a new handle positioned at offset 0
    pub fn open(self: &Arc<Self>) -> LogFile {
        LogFile::new(Arc::clone(self), self.max_command_len)
    }
}

/// Insert under an already held lock, tracing the commit and any eviction
pub(crate) fn insert_logged(log: &mut CommandLog, entry: CommandEntry) -> Option<CommandEntry> {
    let size = entry.size();
    let evicted = log.insert(entry);

    tracing::debug!(
        "Committed {} byte command ({} retained)",
        size,
        log.retained_count()
    );
    if let Some(ref old) = evicted {
        tracing::debug!("Evicted oldest command ({} bytes)", old.size());
    }

    evicted
}
