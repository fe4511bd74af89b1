//! Ring Module
//!
//! Fixed-capacity storage for committed commands.
//!
//! ## Responsibilities
//! - Hold the last N commands in insertion order
//! - Evict the oldest command once the ring is full
//! - Assemble partial writes into complete commands
//!
//! ## Layout
//! ```text
//!          out                 in
//!           │                  │
//!   ┌─────┬─▼───┬─────┬─────┬──▼──┐
//!   │  -  │ c0  │ c1  │ c2  │  -  │   retained: out .. in-1 (mod N)
//!   └─────┴─────┴─────┴─────┴─────┘
//! ```
//! When `full`, `in == out` and every slot is live; the next insert
//! overwrites the slot at `in` and hands the old command back.

mod accumulator;
mod log;

use std::ops::Range;

use bytes::Bytes;

pub use accumulator::Accumulator;
pub use log::{CommandLog, DEFAULT_CAPACITY};

/// One committed, newline-terminated command
///
/// The buffer is owned by whichever structure currently holds the entry;
/// evicted entries are returned to the caller, never kept by the log.
#[derive(Debug, PartialEq, Eq)]
pub struct CommandEntry {
    data: Bytes,
}

impl CommandEntry {
    /// Wrap an owned buffer
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    /// Size of the command in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Cheap view into part of the command (shares the buffer)
    pub fn slice(&self, range: Range<usize>) -> Bytes {
        self.data.slice(range)
    }

    pub fn into_bytes(self) -> Bytes {
        self.data
    }
}
