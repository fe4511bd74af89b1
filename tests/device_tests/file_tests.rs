//! Tests for LogDevice and LogFile
//!
//! These tests verify:
//! - Writes become visible only once newline-terminated
//! - Each handle keeps its own cursor and pending bytes
//! - Structured seeks and io::Seek positioning
//! - A write refused by the lock keeps nothing and can be retried
//! - Concurrent writers produce whole, distinct commands

use std::io::{self, Read, Seek, SeekFrom, Write};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use seeklog::{Config, LogDevice, LogError, SeekRequest};

// =============================================================================
// Helper Functions
// =============================================================================

fn device(capacity: usize) -> Arc<LogDevice> {
    Arc::new(LogDevice::new(capacity).unwrap())
}

fn read_to_string(file: &mut impl Read) -> String {
    let mut out = String::new();
    file.read_to_string(&mut out).unwrap();
    out
}

fn log_error(err: &io::Error) -> Option<&LogError> {
    err.get_ref().and_then(|e| e.downcast_ref::<LogError>())
}

// =============================================================================
// Write Tests
// =============================================================================

#[test]
fn test_write_returns_bytes_accepted() {
    let dev = device(4);
    let mut file = dev.open();

    assert_eq!(file.write(b"partial").unwrap(), 7);
    assert_eq!(file.write(b" done\n").unwrap(), 6);
}

#[test]
fn test_unterminated_write_is_not_visible() {
    let dev = device(4);
    let mut writer = dev.open();

    writer.write_all(b"no newline yet").unwrap();

    assert_eq!(writer.pending_len(), 14);
    assert_eq!(dev.retained_count().unwrap(), 0);
    assert_eq!(read_to_string(&mut dev.open()), "");
}

#[test]
fn test_completed_write_commits_one_command() {
    let dev = device(4);
    let mut writer = dev.open();

    writer.write_all(b"hello ").unwrap();
    writer.write_all(b"world\n").unwrap();

    assert_eq!(writer.pending_len(), 0);
    assert_eq!(dev.retained_count().unwrap(), 1);
    assert_eq!(dev.snapshot().unwrap(), b"hello world\n");
}

#[test]
fn test_pending_bytes_are_per_handle() {
    let dev = device(4);
    let mut a = dev.open();
    let mut b = dev.open();

    a.write_all(b"from a, ").unwrap();
    b.write_all(b"from b\n").unwrap();
    a.write_all(b"done\n").unwrap();

    assert_eq!(read_to_string(&mut dev.open()), "from b\nfrom a, done\n");
}

#[test]
fn test_dropped_handle_discards_pending() {
    let dev = device(4);
    {
        let mut file = dev.open();
        file.write_all(b"never finished").unwrap();
    }
    assert_eq!(dev.total_size().unwrap(), 0);
}

#[test]
fn test_write_past_limit_is_rejected() {
    let config = Config::builder().capacity(4).max_command_len(8).build();
    let dev = Arc::new(LogDevice::from_config(&config).unwrap());
    let mut file = dev.open();

    let err = file.write(b"way too long\n").unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    assert!(matches!(log_error(&err), Some(LogError::CommandTooLarge { .. })));
    assert_eq!(dev.retained_count().unwrap(), 0);
}

#[test]
fn test_write_blocked_by_lock_can_be_retried() {
    let dev = Arc::new(
        LogDevice::new(4)
            .unwrap()
            .with_lock_timeout(Duration::from_millis(20)),
    );
    let mut file = dev.open();
    file.write_all(b"hel").unwrap();

    let guard = dev.lock().unwrap();
    let (kind, interrupted, pending) = thread::scope(|s| {
        s.spawn(|| {
            let err = file.write(b"lo\n").unwrap_err();
            let interrupted = matches!(
                log_error(&err),
                Some(LogError::LockAcquireInterrupted { .. })
            );
            (err.kind(), interrupted, file.pending_len())
        })
        .join()
        .unwrap()
    });
    drop(guard);

    assert_eq!(kind, io::ErrorKind::TimedOut);
    assert!(interrupted);
    // Only the bytes from before the failed call remain
    assert_eq!(pending, 3);
    assert_eq!(dev.retained_count().unwrap(), 0);

    assert_eq!(file.write(b"lo\n").unwrap(), 3);
    assert_eq!(file.pending_len(), 0);
    assert_eq!(dev.retained_count().unwrap(), 1);
    assert_eq!(dev.snapshot().unwrap(), b"hello\n");
}

// =============================================================================
// Read Tests
// =============================================================================

#[test]
fn test_read_advances_cursor_within_command() {
    let dev = device(4);
    dev.open().write_all(b"abcdef\n").unwrap();

    let mut file = dev.open();
    let mut buf = [0u8; 3];

    assert_eq!(file.read(&mut buf).unwrap(), 3);
    assert_eq!(&buf, b"abc");
    assert_eq!(file.position(), 3);
}

#[test]
fn test_read_stops_at_command_boundary() {
    let dev = device(4);
    let mut writer = dev.open();
    writer.write_all(b"ab\n").unwrap();
    writer.write_all(b"cd\n").unwrap();

    let mut file = dev.open();
    let mut buf = [0u8; 16];

    assert_eq!(file.read(&mut buf).unwrap(), 3);
    assert_eq!(&buf[..3], b"ab\n");
    assert_eq!(file.read(&mut buf).unwrap(), 3);
    assert_eq!(&buf[..3], b"cd\n");
    assert_eq!(file.read(&mut buf).unwrap(), 0);
}

#[test]
fn test_read_after_eviction_shows_last_n() {
    let dev = device(2);
    let mut writer = dev.open();
    for line in ["one\n", "two\n", "three\n"] {
        writer.write_all(line.as_bytes()).unwrap();
    }

    assert_eq!(read_to_string(&mut dev.open()), "two\nthree\n");
}

// =============================================================================
// Seek Tests
// =============================================================================

#[test]
fn test_seek_to_command_and_offset() {
    let dev = device(4);
    let mut writer = dev.open();
    writer.write_all(b"aa\nbb\n").unwrap(); // one write, one command
    writer.write_all(b"cc\n").unwrap();

    let mut file = dev.open();
    let offset = file.seek_to(SeekRequest::new(1, 1)).unwrap();

    assert_eq!(offset, 7);
    assert_eq!(read_to_string(&mut file), "c\n");
}

#[test]
fn test_failed_seek_leaves_cursor() {
    let dev = device(4);
    dev.open().write_all(b"abc\n").unwrap();

    let mut file = dev.open();
    file.seek(SeekFrom::Start(2)).unwrap();

    assert!(matches!(
        file.seek_to(SeekRequest::new(1, 0)),
        Err(LogError::CommandIndexOutOfRange { .. })
    ));
    assert!(matches!(
        file.seek_to(SeekRequest::new(0, 4)),
        Err(LogError::ByteOffsetOutOfRange { .. })
    ));
    assert_eq!(file.position(), 2);
}

#[test]
fn test_io_seek_variants() {
    let dev = device(4);
    dev.open().write_all(b"0123456789\n").unwrap();
    let mut file = dev.open();

    assert_eq!(file.seek(SeekFrom::Start(4)).unwrap(), 4);
    assert_eq!(file.seek(SeekFrom::Current(2)).unwrap(), 6);
    assert_eq!(file.seek(SeekFrom::End(-3)).unwrap(), 8);
    assert_eq!(read_to_string(&mut file), "89\n");

    // Exactly at end is allowed, reads nothing
    assert_eq!(file.seek(SeekFrom::End(0)).unwrap(), 11);
    assert_eq!(read_to_string(&mut file), "");
}

#[test]
fn test_io_seek_out_of_range() {
    let dev = device(4);
    dev.open().write_all(b"abc\n").unwrap();
    let mut file = dev.open();

    let err = file.seek(SeekFrom::Current(-1)).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);

    let err = file.seek(SeekFrom::Start(5)).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    assert_eq!(file.position(), 0);
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_writers_produce_whole_commands() {
    const WRITERS: usize = 8;
    let dev = device(WRITERS);

    let handles: Vec<_> = (0..WRITERS)
        .map(|t| {
            let dev = Arc::clone(&dev);
            thread::spawn(move || {
                let mut file = dev.open();
                // Split into several writes to invite interleaving
                for part in [format!("writer-{}", t), "-part".to_string(), "-end\n".to_string()] {
                    file.write_all(part.as_bytes()).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let log = String::from_utf8(dev.snapshot().unwrap()).unwrap();
    let mut lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), WRITERS);

    lines.sort();
    let mut expected: Vec<String> = (0..WRITERS).map(|t| format!("writer-{}-part-end", t)).collect();
    expected.sort();
    assert_eq!(lines, expected);
}
