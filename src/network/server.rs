//! TCP Server
//!
//! Accepts connections and dispatches them to session workers.

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::coordinator::SessionCoordinator;
use crate::device::LogDevice;
use crate::error::Result;
use crate::timestamp::Timestamper;

/// Cloneable trigger for a graceful server shutdown
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle(Arc<AtomicBool>);

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_shutdown(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// TCP server for seeklog
pub struct Server {
    config: Config,
    coordinator: SessionCoordinator,
    listener: Option<TcpListener>,
    local_addr: Option<SocketAddr>,
    shutdown: ShutdownHandle,

    /// Stopped before the log is released
    timestamper: Option<Timestamper>,
}

impl Server {
    /// Create a new server with the given config and log
    pub fn new(config: Config, device: Arc<LogDevice>) -> Self {
        let coordinator = SessionCoordinator::new(&config, device);
        Self {
            config,
            coordinator,
            listener: None,
            local_addr: None,
            shutdown: ShutdownHandle::default(),
            timestamper: None,
        }
    }

    /// Bind the listen address; `run` binds lazily if this is skipped
    pub fn bind(&mut self) -> Result<SocketAddr> {
        let listener = TcpListener::bind(&self.config.listen_addr)?;
        // Non-blocking so the loop can notice shutdown
        listener.set_nonblocking(true)?;

        let addr = listener.local_addr()?;
        tracing::info!("Listening on {}", addr);

        self.listener = Some(listener);
        self.local_addr = Some(addr);
        Ok(addr)
    }

    /// Hand a running timestamper to the server
    ///
    /// It is stopped on shutdown before the log is released, so no stamp
    /// lands in the log after that point.
    pub fn attach_timestamper(&mut self, timestamper: Timestamper) {
        self.timestamper = Some(timestamper);
    }

    /// Serve until shutdown is requested (blocking)
    ///
    /// Sessions already running are allowed to finish; the log's commands
    /// are released before returning.
    pub fn run(&mut self) -> Result<()> {
        if self.listener.is_none() {
            self.bind()?;
        }
        let Some(listener) = self.listener.take() else {
            return Ok(());
        };
        let poll = Duration::from_millis(self.config.accept_poll_ms.max(1));

        while !self.shutdown.is_shutdown() {
            match listener.accept() {
                Ok((stream, peer)) => {
                    tracing::info!("Accepted connection from {}", peer);
                    if let Err(e) = stream.set_nonblocking(false) {
                        tracing::warn!("Dropping connection from {}: {}", peer, e);
                        continue;
                    }
                    if let Err(e) = self.coordinator.dispatch(stream, peer) {
                        tracing::error!("Dispatch failed for {}: {}", peer, e);
                    }
                }
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                    self.coordinator.reap();
                    thread::sleep(poll);
                }
                Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::warn!("Accept error: {}", e);
                    thread::sleep(poll);
                }
            }
        }

        drop(listener);
        tracing::info!("Shutting down");
        if let Some(timestamper) = self.timestamper.take() {
            timestamper.stop();
        }
        self.coordinator.shutdown();
        Ok(())
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.shutdown();
    }

    /// Handle that can stop the server from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Bound address, once `bind` has run
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn coordinator(&self) -> &SessionCoordinator {
        &self.coordinator
    }
}
