//! Open handle on a LogDevice
//!
//! Each handle has its own cursor and its own pending command; only
//! completed commands become visible to other handles.

use std::io::{self, Read, Seek, SeekFrom, Write};
use std::sync::Arc;

use crate::address::{AddressTranslator, GlobalOffset, SeekRequest};
use crate::error::Result;
use crate::ring::Accumulator;
use super::{insert_logged, LogDevice};

/// A cursor over the shared log plus a private write accumulator
#[derive(Debug)]
pub struct LogFile {
    device: Arc<LogDevice>,

    /// Next byte to read
    pos: GlobalOffset,

    /// Bytes written but not yet newline-terminated
    pending: Accumulator,
}

impl LogFile {
    pub(super) fn new(device: Arc<LogDevice>, max_command_len: Option<usize>) -> Self {
        let pending = match max_command_len {
            Some(limit) => Accumulator::with_limit(limit),
            None => Accumulator::new(),
        };
        Self {
            device,
            pos: 0,
            pending,
        }
    }

    /// Reposition to the start of a retained command plus an offset into it
    ///
    /// On failure the cursor does not move.
    pub fn seek_to(&mut self, request: SeekRequest) -> Result<GlobalOffset> {
        let log = self.device.lock()?;
        let offset = AddressTranslator::new(&log).resolve(request)?;
        self.pos = offset;

        tracing::debug!(
            "Seek to command {} offset {} -> {}",
            request.command_index,
            request.intra_offset,
            offset
        );
        Ok(offset)
    }

    pub fn position(&self) -> GlobalOffset {
        self.pos
    }

    /// Bytes buffered by this handle that are not yet committed
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn device(&self) -> &Arc<LogDevice> {
        &self.device
    }
}

impl Write for LogFile {
    /// Buffer `buf`, committing once the pending command is complete
    ///
    /// On error nothing from `buf` is kept: the handle's pending bytes are
    /// as they were before the call, so the same write can be retried.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let before = self.pending.len();
        self.pending.append(buf)?;

        if !self.pending.is_complete() {
            return Ok(buf.len());
        }

        let mut log = match self.device.lock() {
            Ok(log) => log,
            Err(e) => {
                self.pending.truncate(before);
                return Err(e.into());
            }
        };
        if let Some(entry) = self.pending.take() {
            // Evicted command is released here
            insert_logged(&mut log, entry);
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Read for LogFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let log = self.device.lock()?;
        let Some((bytes, len)) = AddressTranslator::new(&log).read_slice(self.pos, buf.len()) else {
            return Ok(0);
        };

        buf[..len].copy_from_slice(&bytes);
        self.pos += len;
        Ok(len)
    }
}

impl Seek for LogFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let end = self.device.total_size()? as i128;
        let target = match pos {
            SeekFrom::Start(n) => n as i128,
            SeekFrom::Current(delta) => self.pos as i128 + delta as i128,
            SeekFrom::End(delta) => end + delta as i128,
        };

        if target < 0 || target > end {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("seek target {} outside 0..={}", target, end),
            ));
        }

        self.pos = target as usize;
        Ok(self.pos as u64)
    }
}

impl Drop for LogFile {
    fn drop(&mut self) {
        if !self.pending.is_empty() {
            tracing::trace!(
                "Discarding {} uncommitted bytes on close",
                self.pending.len()
            );
        }
    }
}
