//! Tests for CommandLog
//!
//! These tests verify:
//! - Insertion order and retained count
//! - Eviction of the oldest command once full
//! - Offset lookup across command boundaries
//! - Index lookup relative to the oldest command
//! - Reset via init

use seeklog::ring::{CommandEntry, CommandLog, DEFAULT_CAPACITY};
use seeklog::LogError;

// =============================================================================
// Helper Functions
// =============================================================================

fn entry(s: &str) -> CommandEntry {
    CommandEntry::new(s.as_bytes().to_vec())
}

fn log_with(capacity: usize, commands: &[&str]) -> CommandLog {
    let mut log = CommandLog::new(capacity).unwrap();
    for c in commands {
        log.insert(entry(c));
    }
    log
}

fn retained(log: &CommandLog) -> Vec<String> {
    log.iter()
        .map(|e| String::from_utf8(e.as_bytes().to_vec()).unwrap())
        .collect()
}

// =============================================================================
// Construction Tests
// =============================================================================

#[test]
fn test_new_log_is_empty() {
    let log = CommandLog::new(DEFAULT_CAPACITY).unwrap();

    assert_eq!(log.capacity(), 10);
    assert_eq!(log.retained_count(), 0);
    assert_eq!(log.total_size(), 0);
    assert!(log.is_empty());
    assert!(!log.is_full());
}

#[test]
fn test_zero_capacity_rejected() {
    assert!(matches!(CommandLog::new(0), Err(LogError::Config(_))));
}

// =============================================================================
// Insert / Eviction Tests
// =============================================================================

#[test]
fn test_insert_below_capacity_evicts_nothing() {
    let mut log = CommandLog::new(3).unwrap();

    assert!(log.insert(entry("a\n")).is_none());
    assert!(log.insert(entry("b\n")).is_none());

    assert_eq!(log.retained_count(), 2);
    assert_eq!(retained(&log), vec!["a\n", "b\n"]);
}

#[test]
fn test_becomes_full_after_capacity_inserts() {
    let mut log = CommandLog::new(3).unwrap();
    for c in ["a\n", "b\n", "c\n"] {
        assert!(log.insert(entry(c)).is_none());
    }

    assert!(log.is_full());
    assert_eq!(log.retained_count(), 3);
}

#[test]
fn test_insert_into_full_log_returns_oldest() {
    let mut log = log_with(3, &["a\n", "b\n", "c\n"]);

    let evicted = log.insert(entry("d\n")).unwrap();
    assert_eq!(evicted.as_bytes(), b"a\n");

    let evicted = log.insert(entry("e\n")).unwrap();
    assert_eq!(evicted.as_bytes(), b"b\n");

    assert_eq!(retained(&log), vec!["c\n", "d\n", "e\n"]);
}

#[test]
fn test_retains_last_n_in_insertion_order() {
    for capacity in 1..=6 {
        for extra in 1..=15 {
            let mut log = CommandLog::new(capacity).unwrap();
            let commands: Vec<String> = (0..capacity + extra).map(|i| format!("cmd{}\n", i)).collect();
            for c in &commands {
                log.insert(entry(c));
            }

            assert_eq!(log.retained_count(), capacity);
            assert!(log.is_full());
            assert_eq!(retained(&log), commands[extra..].to_vec());
        }
    }
}

#[test]
fn test_evicted_command_is_no_longer_retained() {
    let mut log = log_with(2, &["first\n", "second\n"]);

    let evicted = log.insert(entry("third\n")).unwrap();

    assert_eq!(evicted.as_bytes(), b"first\n");
    assert!(log.iter().all(|e| e.as_bytes() != b"first\n"));
    assert_eq!(log.total_size(), "second\n".len() + "third\n".len());
}

#[test]
fn test_capacity_one_always_evicts_previous() {
    let mut log = CommandLog::new(1).unwrap();

    assert!(log.insert(entry("a\n")).is_none());
    assert!(log.is_full());
    assert_eq!(log.insert(entry("b\n")).unwrap().as_bytes(), b"a\n");
    assert_eq!(retained(&log), vec!["b\n"]);
}

// =============================================================================
// find_by_offset Tests
// =============================================================================

#[test]
fn test_find_by_offset_scenario() {
    let mut log = log_with(2, &["aa\n", "bb\n"]);

    let (found, local) = log.find_by_offset(4).unwrap();
    assert_eq!(found.as_bytes(), b"bb\n");
    assert_eq!(local, 1);

    log.insert(entry("cc\n"));
    let (found, local) = log.find_by_offset(0).unwrap();
    assert_eq!(found.as_bytes(), b"bb\n");
    assert_eq!(local, 0);
}

#[test]
fn test_find_by_offset_at_boundaries() {
    let log = log_with(4, &["abc\n", "d\n"]);

    let (found, local) = log.find_by_offset(3).unwrap();
    assert_eq!((found.as_bytes(), local), (&b"abc\n"[..], 3));

    let (found, local) = log.find_by_offset(4).unwrap();
    assert_eq!((found.as_bytes(), local), (&b"d\n"[..], 0));
}

#[test]
fn test_find_by_offset_past_end() {
    let log = log_with(4, &["abc\n", "d\n"]);

    assert!(log.find_by_offset(6).is_none());
    assert!(log.find_by_offset(1000).is_none());
}

#[test]
fn test_find_by_offset_on_empty_log() {
    let log = CommandLog::new(4).unwrap();
    assert!(log.find_by_offset(0).is_none());
}

#[test]
fn test_find_by_offset_after_wrap() {
    let log = log_with(3, &["1\n", "22\n", "333\n", "4444\n"]);

    // retained: "22\n" "333\n" "4444\n"
    let (found, local) = log.find_by_offset(7).unwrap();
    assert_eq!(found.as_bytes(), b"4444\n");
    assert_eq!(local, 0);
    assert!(log.find_by_offset(12).is_none());
}

// =============================================================================
// entry_at Tests
// =============================================================================

#[test]
fn test_entry_at_counts_from_oldest() {
    let log = log_with(2, &["aa\n", "bb\n", "cc\n"]);

    assert_eq!(log.entry_at(0).unwrap().as_bytes(), b"bb\n");
    assert_eq!(log.entry_at(1).unwrap().as_bytes(), b"cc\n");
    assert!(log.entry_at(2).is_none());
}

#[test]
fn test_entry_at_beyond_retained() {
    let log = log_with(5, &["a\n"]);
    assert!(log.entry_at(1).is_none());
    assert!(log.entry_at(4).is_none());
}

// =============================================================================
// init Tests
// =============================================================================

#[test]
fn test_init_empties_log() {
    let mut log = log_with(2, &["a\n", "b\n", "c\n"]);

    log.init();

    assert!(log.is_empty());
    assert!(!log.is_full());
    assert_eq!(log.total_size(), 0);
    assert!(log.find_by_offset(0).is_none());
}

#[test]
fn test_log_usable_after_init() {
    let mut log = log_with(2, &["a\n", "b\n", "c\n"]);
    log.init();

    assert!(log.insert(entry("x\n")).is_none());
    assert!(log.insert(entry("y\n")).is_none());
    assert_eq!(log.insert(entry("z\n")).unwrap().as_bytes(), b"x\n");
}
