//! Session state machine
//!
//! One client interaction: accumulate a command, commit it, reply with the
//! log. Generic over the byte streams so it runs the same over a socket or
//! in memory.
//!
//! ```text
//! Accepted → Reading → Committing → Replying → Closed
//!                │                      ▲
//!                └──→ SeekRequested ────┘
//! ```

use std::io::{ErrorKind, Read, Write};

use crate::address::{AddressTranslator, GlobalOffset, SeekRequest};
use crate::config::Config;
use crate::device::{insert_logged, LogDevice};
use crate::error::{LogError, Result};
use crate::protocol::{classify, parse_seek_directive, Inbound};
use crate::ring::{Accumulator, CommandEntry, CommandLog};

/// Where a session currently is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Accepted,
    Reading,
    Committing,
    SeekRequested,
    Replying,
    Closed,
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// A command was appended and the full log sent back
    Committed { evicted: bool, bytes_sent: usize },

    /// A seek directive was honored and the log sent from `offset`
    Seeked { offset: GlobalOffset, bytes_sent: usize },

    /// The peer went away before completing a command
    Disconnected { discarded: usize },
}

/// Per-session knobs taken from [`Config`]
#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    /// Receive chunk and reply chunk size
    pub chunk_len: usize,
    pub max_command_len: usize,
    pub read_timeout_ms: u64,
    pub write_timeout_ms: u64,
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            chunk_len: config.recv_buffer_len,
            max_command_len: config.max_command_len,
            read_timeout_ms: config.read_timeout_ms,
            write_timeout_ms: config.write_timeout_ms,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// A single session against the shared log
///
/// Accumulation runs without the lock; the lock is held from commit (or
/// seek resolution) until the reply has been written, so a reply always
/// reflects one consistent log state.
pub struct Session<'a> {
    device: &'a LogDevice,
    settings: SessionSettings,
    state: SessionState,
}

impl<'a> Session<'a> {
    pub fn new(device: &'a LogDevice, settings: SessionSettings) -> Self {
        Self {
            device,
            settings,
            state: SessionState::Accepted,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run the session to completion
    ///
    /// The session is `Closed` afterwards whether or not it succeeded.
    pub fn handle<R: Read, W: Write>(&mut self, input: &mut R, output: &mut W) -> Result<SessionOutcome> {
        let result = self.run(input, output);
        self.state = SessionState::Closed;
        result
    }

    fn run<R: Read, W: Write>(&mut self, input: &mut R, output: &mut W) -> Result<SessionOutcome> {
        self.state = SessionState::Reading;

        let mut accumulator = Accumulator::with_limit(self.settings.max_command_len);
        let mut chunk = vec![0u8; self.settings.chunk_len.max(1)];

        loop {
            let n = match input.read(&mut chunk) {
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };

            if n == 0 {
                // A directive may arrive without its newline
                if let Some(request) = parse_seek_directive(accumulator.as_bytes()) {
                    return self.seek(request?, output);
                }

                tracing::debug!(
                    "Stream closed with {} uncommitted bytes",
                    accumulator.len()
                );
                return Ok(SessionOutcome::Disconnected {
                    discarded: accumulator.len(),
                });
            }

            tracing::trace!("Received {} bytes", n);
            accumulator.append(&chunk[..n])?;

            if let Some(entry) = accumulator.take() {
                let directive = match classify(entry.as_bytes())? {
                    Inbound::Seek(request) => Some(request),
                    Inbound::Content(_) => None,
                };
                return match directive {
                    Some(request) => self.seek(request, output),
                    None => self.commit(entry, output),
                };
            }
        }
    }

    fn commit<W: Write>(&mut self, entry: CommandEntry, output: &mut W) -> Result<SessionOutcome> {
        self.state = SessionState::Committing;
        tracing::debug!("Newline detected, committing {} bytes", entry.size());

        let mut log = self.device.lock()?;
        let evicted = insert_logged(&mut log, entry);

        self.state = SessionState::Replying;
        let bytes_sent = stream_from(&log, 0, output, self.settings.chunk_len)?;

        Ok(SessionOutcome::Committed {
            evicted: evicted.is_some(),
            bytes_sent,
        })
    }

    fn seek<W: Write>(&mut self, request: SeekRequest, output: &mut W) -> Result<SessionOutcome> {
        self.state = SessionState::SeekRequested;
        tracing::info!(
            "Received seek directive: command {} offset {}",
            request.command_index,
            request.intra_offset
        );

        let log = self.device.lock()?;
        let offset = AddressTranslator::new(&log).resolve(request)?;

        self.state = SessionState::Replying;
        let bytes_sent = stream_from(&log, offset, output, self.settings.chunk_len)?;

        Ok(SessionOutcome::Seeked { offset, bytes_sent })
    }
}

/// Write the retained log from `start` to its end, one slice per write
///
/// Each slice must be taken whole by a single `write`; a short write is a
/// [`LogError::PartialTransfer`] and aborts the reply.
pub fn stream_from<W: Write>(
    log: &CommandLog,
    start: GlobalOffset,
    output: &mut W,
    chunk_len: usize,
) -> Result<usize> {
    let translator = AddressTranslator::new(log);
    let mut pos = start;

    while let Some((bytes, len)) = translator.read_slice(pos, chunk_len.max(1)) {
        let written = output.write(&bytes)?;
        if written != len {
            return Err(LogError::PartialTransfer {
                expected: len,
                actual: written,
            });
        }
        pos += len;
    }

    output.flush()?;
    tracing::debug!("Sent {} bytes", pos - start);
    Ok(pos - start)
}
