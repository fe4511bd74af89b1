//! Protocol Module
//!
//! Framing used by the TCP service on top of the log.
//!
//! ## Protocol Format
//!
//! There is no length header: a client sends raw bytes and a command ends at
//! a newline. After the command is committed the server replies with the
//! whole retained log and closes the connection.
//!
//! ### Seek Directive
//! ```text
//! AESDCHAR_IOCSEEKTO:<command_index>,<intra_offset>\n
//! ```
//! Sent in place of a command. Nothing is appended; the reply starts at
//! the addressed byte instead of offset 0.

mod directive;

pub use directive::{classify, encode_seek_directive, parse_seek_directive, Inbound, SEEKTO_PREFIX};
