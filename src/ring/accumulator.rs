//! Write accumulator
//!
//! Grows as partial writes arrive; yields a command once the last byte
//! appended is a newline.

use crate::error::{LogError, Result};
use super::CommandEntry;

/// Per-session buffer for a command under construction
#[derive(Debug, Default)]
pub struct Accumulator {
    buf: Vec<u8>,

    /// Upper bound on the assembled command, if any
    limit: Option<usize>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulator that refuses to grow past `limit` bytes
    pub fn with_limit(limit: usize) -> Self {
        Self {
            buf: Vec::new(),
            limit: Some(limit),
        }
    }

    /// Append `bytes` to the tail
    ///
    /// On failure nothing is appended; the buffer keeps its prior contents.
    pub fn append(&mut self, bytes: &[u8]) -> Result<()> {
        let new_len = self.buf.len() + bytes.len();
        if let Some(limit) = self.limit {
            if new_len > limit {
                return Err(LogError::CommandTooLarge { len: new_len, limit });
            }
        }

        self.buf
            .try_reserve(bytes.len())
            .map_err(|source| LogError::Allocation {
                requested: new_len,
                source,
            })?;
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// True iff the last byte appended so far is a newline
    pub fn is_complete(&self) -> bool {
        self.buf.last() == Some(&b'\n')
    }

    /// Hand the completed command over and reset to empty
    ///
    /// Returns `None` (and keeps the buffered bytes) while incomplete.
    pub fn take(&mut self) -> Option<CommandEntry> {
        if !self.is_complete() {
            return None;
        }
        Some(CommandEntry::new(std::mem::take(&mut self.buf)))
    }

    /// Shorten the buffer to `len` bytes, undoing later appends
    ///
    /// Has no effect when `len` is not shorter than the buffer.
    pub fn truncate(&mut self, len: usize) {
        self.buf.truncate(len);
    }

    /// Drop whatever has been buffered
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }
}
