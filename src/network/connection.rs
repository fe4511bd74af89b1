//! Connection Handler
//!
//! Runs one session over a client TCP connection.

use std::io::{BufReader, BufWriter, ErrorKind};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use crate::device::LogDevice;
use crate::error::{LogError, Result};
use super::session::{Session, SessionOutcome, SessionSettings};

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// The shared log
    device: Arc<LogDevice>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    ///
    /// Sets up buffered I/O and disables Nagle's algorithm
    pub fn new(stream: TcpStream, device: Arc<LogDevice>) -> Result<Self> {
        // Get peer address for logging before we split the stream
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        stream.set_nodelay(true)?;

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            device,
            peer_addr,
        })
    }

    /// Configure connection timeouts (0 leaves a direction unbounded)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        let read_stream = self.reader.get_ref();
        let write_stream = self.writer.get_ref();

        if read_ms > 0 {
            read_stream.set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            write_stream.set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }

        Ok(())
    }

    /// Run one session (blocking until it closes)
    ///
    /// A peer that disconnects or times out is a clean close, not an error.
    pub fn handle(&mut self, settings: SessionSettings) -> Result<SessionOutcome> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        let mut session = Session::new(&self.device, settings);
        match session.handle(&mut self.reader, &mut self.writer) {
            Ok(outcome) => {
                tracing::info!("Closed connection from {} ({:?})", self.peer_addr, outcome);
                Ok(outcome)
            }
            Err(LogError::Io(ref e)) if is_disconnect(e.kind()) => {
                tracing::debug!("Client {} went away: {}", self.peer_addr, e);
                Ok(SessionOutcome::Disconnected { discarded: 0 })
            }
            Err(e) => {
                tracing::warn!("Session with {} failed: {}", self.peer_addr, e);
                Err(e)
            }
        }
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

/// Errors that just mean the peer is gone (or idle past the timeout)
fn is_disconnect(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::UnexpectedEof
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
            // Read timeout (Windows uses TimedOut instead of WouldBlock)
            | ErrorKind::WouldBlock
            | ErrorKind::TimedOut
    )
}
