//! Configuration for seeklog
//!
//! Centralized configuration with sensible defaults.

use std::time::Duration;

use crate::error::{LogError, Result};
use crate::ring::DEFAULT_CAPACITY;

/// Main configuration for a seeklog instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Log Configuration
    // -------------------------------------------------------------------------
    /// Number of ring slots; the oldest command is evicted past this
    pub capacity: usize,

    /// Largest single command a session may accumulate (in bytes)
    pub max_command_len: usize,

    /// Bound on waiting for the shared log lock (0 = wait forever)
    pub lock_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent client sessions
    pub max_connections: usize,

    /// Connection read timeout (milliseconds, 0 = none)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,

    /// Receive chunk size, also used as the reply chunk size
    pub recv_buffer_len: usize,

    /// Sleep between polls of the non-blocking accept loop
    pub accept_poll_ms: u64,

    // -------------------------------------------------------------------------
    // Timestamp Configuration
    // -------------------------------------------------------------------------
    /// Append a timestamp command every N seconds (0 = disabled)
    pub timestamp_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            max_command_len: 16 * 1024 * 1024, // 16 MB
            lock_timeout_ms: 10_000,
            listen_addr: "0.0.0.0:9000".to_string(),
            max_connections: 128,
            read_timeout_ms: 30_000,
            write_timeout_ms: 5000,
            recv_buffer_len: 1024,
            accept_poll_ms: 50,
            timestamp_interval_secs: 0,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check that every size and count is usable
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(LogError::Config("capacity must be at least 1".to_string()));
        }
        if self.max_command_len == 0 {
            return Err(LogError::Config(
                "max_command_len must be at least 1".to_string(),
            ));
        }
        if self.max_connections == 0 {
            return Err(LogError::Config(
                "max_connections must be at least 1".to_string(),
            ));
        }
        if self.recv_buffer_len == 0 {
            return Err(LogError::Config(
                "recv_buffer_len must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Lock wait bound, `None` when unbounded
    pub fn lock_timeout(&self) -> Option<Duration> {
        (self.lock_timeout_ms > 0).then(|| Duration::from_millis(self.lock_timeout_ms))
    }

    /// Timestamp interval, `None` when disabled
    pub fn timestamp_interval(&self) -> Option<Duration> {
        (self.timestamp_interval_secs > 0)
            .then(|| Duration::from_secs(self.timestamp_interval_secs))
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the ring capacity (number of retained commands)
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    /// Set the per-command size limit (in bytes)
    pub fn max_command_len(mut self, len: usize) -> Self {
        self.config.max_command_len = len;
        self
    }

    /// Set the lock wait bound (in milliseconds, 0 = wait forever)
    pub fn lock_timeout_ms(mut self, ms: u64) -> Self {
        self.config.lock_timeout_ms = ms;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent sessions
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the receive/reply chunk size
    pub fn recv_buffer_len(mut self, len: usize) -> Self {
        self.config.recv_buffer_len = len;
        self
    }

    /// Set the accept loop poll interval (in milliseconds)
    pub fn accept_poll_ms(mut self, ms: u64) -> Self {
        self.config.accept_poll_ms = ms;
        self
    }

    /// Set the timestamp interval (in seconds, 0 = disabled)
    pub fn timestamp_interval_secs(mut self, secs: u64) -> Self {
        self.config.timestamp_interval_secs = secs;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
