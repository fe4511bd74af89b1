//! Session Coordinator
//!
//! Gate between accepted connections and the shared log.
//!
//! ## Responsibilities
//! - Spawn one worker per accepted connection, up to `max_connections`
//! - Reap finished workers opportunistically after each spawn
//! - On shutdown: wait for every worker, then release the log's commands
//!
//! Serialization of commits and replies is done by the [`LogDevice`] lock;
//! the coordinator never holds it itself.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;

use crate::config::Config;
use crate::device::LogDevice;
use crate::error::Result;
use crate::network::{Connection, Session, SessionId, SessionOutcome, SessionRegistry, SessionSettings};

/// Owns the worker registry and hands sessions the shared log
pub struct SessionCoordinator {
    device: Arc<LogDevice>,
    registry: SessionRegistry,
    settings: SessionSettings,
    max_connections: usize,
}

impl SessionCoordinator {
    pub fn new(config: &Config, device: Arc<LogDevice>) -> Self {
        Self {
            device,
            registry: SessionRegistry::new(),
            settings: SessionSettings::from_config(config),
            max_connections: config.max_connections,
        }
    }

    /// Start a worker for an accepted connection
    ///
    /// Returns `Ok(None)` when the connection was refused because too many
    /// sessions are active; the stream is closed in that case.
    pub fn dispatch(&mut self, stream: TcpStream, peer: SocketAddr) -> Result<Option<SessionId>> {
        if self.registry.active() >= self.max_connections {
            self.registry.reap();
        }
        if self.registry.active() >= self.max_connections {
            tracing::warn!(
                "Refusing connection from {}: {} sessions active",
                peer,
                self.registry.active()
            );
            return Ok(None);
        }

        let device = Arc::clone(&self.device);
        let settings = self.settings;
        let id = self
            .registry
            .spawn(move |id| run_connection(id, stream, device, settings))
            .map_err(|e| {
                tracing::error!("Failed to spawn session for {}: {}", peer, e);
                e
            })?;

        self.registry.reap();
        Ok(Some(id))
    }

    /// Run one session on the calling thread
    pub fn handle_session<R: Read, W: Write>(&self, input: &mut R, output: &mut W) -> Result<SessionOutcome> {
        Session::new(&self.device, self.settings).handle(input, output)
    }

    /// Join finished workers without blocking
    pub fn reap(&mut self) -> usize {
        self.registry.reap()
    }

    /// Wait for every session, then release all retained commands
    ///
    /// Returns the number of commands released.
    pub fn shutdown(&mut self) -> usize {
        tracing::info!("Waiting for {} sessions to finish", self.registry.active());
        let joined = self.registry.join_all();
        let released = self.device.clear();
        tracing::info!("Joined {} sessions, released {} commands", joined, released);
        released
    }

    pub fn active_sessions(&self) -> usize {
        self.registry.active()
    }

    pub fn device(&self) -> &Arc<LogDevice> {
        &self.device
    }
}

/// Worker body: one connection, one session
fn run_connection(id: SessionId, stream: TcpStream, device: Arc<LogDevice>, settings: SessionSettings) {
    let mut connection = match Connection::new(stream, device) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Session {}: failed to set up connection: {}", id, e);
            return;
        }
    };

    if let Err(e) = connection.set_timeouts(settings.read_timeout_ms, settings.write_timeout_ms) {
        tracing::warn!("Session {}: failed to set timeouts for {}: {}", id, connection.peer_addr(), e);
        return;
    }

    if let Err(e) = connection.handle(settings) {
        if e.is_retryable() {
            tracing::info!("Session {} for {} may be retried: {}", id, connection.peer_addr(), e);
        }
    }
}
