//! Address Module
//!
//! Maps between the flat byte space of the retained log and
//! (command, intra-command offset) pairs.
//!
//! ## Global Offsets
//! ```text
//!   command:   0          1        2
//!            ┌──────────┬────────┬─────────────┐
//!            │ "aa\n"   │ "bb\n" │ "hello\n"   │
//!            └──────────┴────────┴─────────────┘
//!   offset:    0  1  2    3  4  5  6 ...     11
//! ```
//! Offsets are only meaningful for the current log contents: after an
//! eviction the same offset addresses different data.

mod translator;

pub use translator::AddressTranslator;

/// Byte position in the concatenation of all retained commands
pub type GlobalOffset = usize;

/// Structured seek control: start of a command plus a byte offset into it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeekRequest {
    /// Command index, counted from the oldest retained command
    pub command_index: u32,

    /// Byte offset within that command
    pub intra_offset: u32,
}

impl SeekRequest {
    pub fn new(command_index: u32, intra_offset: u32) -> Self {
        Self {
            command_index,
            intra_offset,
        }
    }
}

/// A resolved (command, offset) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub command_index: usize,
    pub intra_offset: usize,
}
