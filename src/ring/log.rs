//! CommandLog implementation
//!
//! Slot vector with separate write (`in`) and eviction (`out`) cursors.
//! Any necessary locking is performed by the caller.

use crate::error::{LogError, Result};
use super::CommandEntry;

/// Default number of retained commands
pub const DEFAULT_CAPACITY: usize = 10;

/// Fixed-capacity ring of committed commands
///
/// ## Invariants
/// - `full` is true iff every slot is live; `in_offs == out_offs` alone
///   cannot tell empty from full
/// - Retained order is `out_offs, out_offs + 1, ...` (mod capacity)
/// - `out_offs` only moves when an insert evicts
#[derive(Debug)]
pub struct CommandLog {
    /// One slot per retained command
    slots: Vec<Option<CommandEntry>>,

    /// Next slot to write
    in_offs: usize,

    /// Oldest retained slot
    out_offs: usize,

    full: bool,
}

impl CommandLog {
    /// Create an empty log with `capacity` slots
    ///
    /// Slot storage is reserved up front; failure to do so is the only
    /// fatal condition of the log.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(LogError::Config("capacity must be at least 1".to_string()));
        }

        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|source| LogError::Allocation {
                requested: capacity * std::mem::size_of::<Option<CommandEntry>>(),
                source,
            })?;
        slots.resize_with(capacity, || None);

        Ok(Self {
            slots,
            in_offs: 0,
            out_offs: 0,
            full: false,
        })
    }

    /// Reset to empty, releasing every retained command
    pub fn init(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.in_offs = 0;
        self.out_offs = 0;
        self.full = false;
    }

    /// Store `entry` at the write cursor
    ///
    /// When the log is already full the oldest command is overwritten and
    /// returned; the caller owns it from then on. The log becomes full
    /// exactly when the write cursor wraps back to slot 0.
    ///
    /// An empty entry takes a slot but contributes no bytes: no global
    /// offset resolves to it and any intra offset into it is out of range.
    pub fn insert(&mut self, entry: CommandEntry) -> Option<CommandEntry> {
        let capacity = self.capacity();
        let evicted = if self.full {
            self.slots[self.in_offs].take()
        } else {
            None
        };

        self.slots[self.in_offs] = Some(entry);
        self.in_offs = (self.in_offs + 1) % capacity;

        if self.full {
            self.out_offs = (self.out_offs + 1) % capacity;
        }

        if self.in_offs == 0 {
            self.full = true;
        }

        evicted
    }

    /// Find the command holding byte `global_offset` of the concatenated log
    ///
    /// Returns the command and the offset within it, or `None` when the
    /// offset is at or past the end of the retained bytes.
    pub fn find_by_offset(&self, global_offset: usize) -> Option<(&CommandEntry, usize)> {
        let mut composed = 0usize;
        for entry in self.iter() {
            let start = composed;
            composed += entry.size();
            if composed > global_offset {
                return Some((entry, global_offset - start));
            }
        }
        None
    }

    /// Number of live commands
    pub fn retained_count(&self) -> usize {
        if self.full {
            self.capacity()
        } else {
            (self.in_offs + self.capacity() - self.out_offs) % self.capacity()
        }
    }

    /// Command at `command_index`, counted from the oldest retained
    pub fn entry_at(&self, command_index: usize) -> Option<&CommandEntry> {
        if command_index >= self.retained_count() {
            return None;
        }
        self.slots[self.slot_index(command_index)].as_ref()
    }

    /// Retained commands, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &CommandEntry> + '_ {
        (0..self.retained_count()).filter_map(move |i| self.slots[self.slot_index(i)].as_ref())
    }

    /// Sum of all retained command sizes
    pub fn total_size(&self) -> usize {
        self.iter().map(CommandEntry::size).sum()
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn is_full(&self) -> bool {
        self.full
    }

    pub fn is_empty(&self) -> bool {
        self.retained_count() == 0
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn slot_index(&self, command_index: usize) -> usize {
        (self.out_offs + command_index) % self.capacity()
    }
}
