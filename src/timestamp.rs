//! Periodic timestamp commands
//!
//! A background ticker that appends a local-time stamp to the log at a
//! fixed interval, competing for the lock like any other writer.

use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};
use crossbeam::channel::{bounded, tick, Sender};

use crate::device::LogDevice;
use crate::error::Result;
use crate::ring::CommandEntry;

/// Render the timestamp command for `at`
///
/// `timestamp: 2024, 03, 01, 14, 05, 09\n`
pub fn format_timestamp<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    at.format("timestamp: %Y, %m, %d, %H, %M, %S\n").to_string()
}

/// Handle on the ticker thread; stops it on drop
pub struct Timestamper {
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl Timestamper {
    /// Start appending a timestamp every `interval`
    pub fn spawn(device: Arc<LogDevice>, interval: Duration) -> Result<Self> {
        let (stop_tx, stop_rx) = bounded::<()>(1);

        let handle = thread::Builder::new()
            .name("timestamper".to_string())
            .spawn(move || {
                let ticker = tick(interval);
                loop {
                    crossbeam::select! {
                        recv(ticker) -> _ => {
                            let line = format_timestamp(&Local::now());
                            match device.commit(CommandEntry::new(line.into_bytes())) {
                                Ok(_) => tracing::info!("Appended timestamp"),
                                Err(e) => tracing::warn!("Failed to append timestamp: {}", e),
                            }
                        }
                        recv(stop_rx) -> _ => break,
                    }
                }
            })?;

        tracing::debug!("Timestamper started ({:?} interval)", interval);
        Ok(Self {
            stop_tx,
            handle: Some(handle),
        })
    }

    /// Stop the ticker and wait for it
    pub fn stop(mut self) {
        self.stop_inner();
    }

    fn stop_inner(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        let _ = self.stop_tx.send(());
        if handle.join().is_err() {
            tracing::warn!("Timestamper thread panicked");
        }
    }
}

impl Drop for Timestamper {
    fn drop(&mut self) {
        self.stop_inner();
    }
}
