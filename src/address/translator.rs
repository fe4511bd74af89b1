//! Address translator
//!
//! Read-only view over a [`CommandLog`]; callers hold the log lock for as
//! long as the translator lives.

use bytes::Bytes;

use crate::error::{LogError, Result};
use crate::ring::CommandLog;
use super::{GlobalOffset, Position, SeekRequest};

/// Translates global offsets to and from (command, offset) pairs
#[derive(Debug, Clone, Copy)]
pub struct AddressTranslator<'a> {
    log: &'a CommandLog,
}

impl<'a> AddressTranslator<'a> {
    pub fn new(log: &'a CommandLog) -> Self {
        Self { log }
    }

    /// Global offset of byte `intra_offset` inside command `command_index`
    ///
    /// Validation order: the command index first, then the byte offset.
    pub fn to_global(&self, command_index: usize, intra_offset: usize) -> Result<GlobalOffset> {
        let retained = self.log.retained_count();
        let entry = self
            .log
            .entry_at(command_index)
            .ok_or(LogError::CommandIndexOutOfRange {
                index: command_index,
                retained,
            })?;

        if intra_offset >= entry.size() {
            return Err(LogError::ByteOffsetOutOfRange {
                offset: intra_offset,
                size: entry.size(),
            });
        }

        let preceding: usize = self
            .log
            .iter()
            .take(command_index)
            .map(|e| e.size())
            .sum();

        Ok(preceding + intra_offset)
    }

    /// [`to_global`](Self::to_global) for a wire-level seek request
    pub fn resolve(&self, request: SeekRequest) -> Result<GlobalOffset> {
        self.to_global(
            request.command_index as usize,
            request.intra_offset as usize,
        )
    }

    /// Inverse of [`to_global`](Self::to_global)
    pub fn locate(&self, global_offset: GlobalOffset) -> Option<Position> {
        let mut composed = 0usize;
        for (command_index, entry) in self.log.iter().enumerate() {
            if global_offset < composed + entry.size() {
                return Some(Position {
                    command_index,
                    intra_offset: global_offset - composed,
                });
            }
            composed += entry.size();
        }
        None
    }

    /// Up to `max_len` bytes starting at `global_offset`
    ///
    /// Never crosses a command boundary; callers loop to stream the log.
    /// Returns the bytes and their count, or `None` at end of log.
    pub fn read_slice(&self, global_offset: GlobalOffset, max_len: usize) -> Option<(Bytes, usize)> {
        let (entry, local_offset) = self.log.find_by_offset(global_offset)?;
        let len = max_len.min(entry.size() - local_offset);
        Some((entry.slice(local_offset..local_offset + len), len))
    }

    /// Total retained bytes (one past the last valid offset)
    pub fn end(&self) -> GlobalOffset {
        self.log.total_size()
    }
}
