//! # seeklog
//!
//! A fixed-capacity log of newline-delimited commands with:
//! - Overwrite-oldest eviction once the ring is full
//! - Byte-offset reads across the concatenation of retained commands
//! - Direct seeks to (command index, intra-command offset)
//! - A TCP service that commits one command per session and replies with the log
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │                  (Multiple Clients)                          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                 Session Coordinator                          │
//! │         (one worker per session, reaped on completion)       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌──────────────┐
//!   │ Accumulator │          │  LogDevice   │
//!   │ (per task)  │─commit──▶│   (Mutex)    │
//!   └─────────────┘          └──────┬───────┘
//!                                   │
//!                                   ▼
//!                           ┌──────────────┐
//!                           │  CommandLog  │◀── AddressTranslator
//!                           │    (ring)    │
//!                           └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod ring;
pub mod address;
pub mod device;
pub mod protocol;
pub mod network;
pub mod coordinator;
pub mod timestamp;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{LogError, Result};
pub use config::Config;
pub use ring::{Accumulator, CommandEntry, CommandLog};
pub use address::{AddressTranslator, GlobalOffset, SeekRequest};
pub use device::{LogDevice, LogFile};
pub use coordinator::SessionCoordinator;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of seeklog
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
