//! Error types for seeklog
//!
//! Provides a unified error type for all operations. Every error is local to
//! one session: none of them leave the shared log partially modified.

use std::collections::TryReserveError;
use std::io;

use thiserror::Error;

/// Result type alias using LogError
pub type Result<T> = std::result::Result<T, LogError>;

/// Unified error type for seeklog operations
#[derive(Debug, Error)]
pub enum LogError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A reply copy moved fewer bytes than requested
    #[error("Partial transfer: moved {actual} of {expected} bytes")]
    PartialTransfer { expected: usize, actual: usize },

    // -------------------------------------------------------------------------
    // Accumulation Errors
    // -------------------------------------------------------------------------
    #[error("Allocation of {requested} bytes failed: {source}")]
    Allocation {
        requested: usize,
        #[source]
        source: TryReserveError,
    },

    #[error("Command too large: {len} bytes (max {limit})")]
    CommandTooLarge { len: usize, limit: usize },

    // -------------------------------------------------------------------------
    // Seek Errors
    // -------------------------------------------------------------------------
    #[error("Command index {index} out of range ({retained} retained)")]
    CommandIndexOutOfRange { index: usize, retained: usize },

    #[error("Byte offset {offset} out of range for command of {size} bytes")]
    ByteOffsetOutOfRange { offset: usize, size: usize },

    // -------------------------------------------------------------------------
    // Concurrency Errors
    // -------------------------------------------------------------------------
    #[error("Lock acquisition interrupted after {waited_ms} ms")]
    LockAcquireInterrupted { waited_ms: u64 },

    // -------------------------------------------------------------------------
    // Protocol / Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl LogError {
    /// Whether the failed operation may succeed if simply retried
    pub fn is_retryable(&self) -> bool {
        matches!(self, LogError::LockAcquireInterrupted { .. })
    }
}

impl From<LogError> for io::Error {
    fn from(err: LogError) -> Self {
        match err {
            LogError::Io(inner) => inner,
            other => {
                let kind = match &other {
                    LogError::PartialTransfer { .. } => io::ErrorKind::WriteZero,
                    LogError::Allocation { .. } => io::ErrorKind::OutOfMemory,
                    LogError::LockAcquireInterrupted { .. } => io::ErrorKind::TimedOut,
                    LogError::Protocol(_) => io::ErrorKind::InvalidData,
                    _ => io::ErrorKind::InvalidInput,
                };
                io::Error::new(kind, other)
            }
        }
    }
}
