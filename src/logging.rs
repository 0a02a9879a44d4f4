//! Non-blocking logging.
//!
//! ```text
//! session loop              LogStream             log_drain handler
//! rt_info!(..) ──push──▶  [ ][ ][ ][ ]  ──pop──▶  LogSink (debug UART)
//!                         fixed ring              DRAIN_BATCH per tick
//! ```
//!
//! Formatting happens on the stack into a fixed buffer, so logging never
//! allocates and never waits. A full ring drops the message and the drain
//! reports the count later. Logs go to a separate debug line only; the
//! operator never sees them.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, Ordering};

/// Longest message kept; longer text is cut.
pub const MAX_MSG_LEN: usize = 96;

/// Ring capacity in messages. Small, the framebuffer needs the SRAM.
pub const LOG_BUFFER_SIZE: usize = 64;

/// Severity, most severe first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
            Self::Trace => "TRACE",
        }
    }
}

/// One queued message.
#[derive(Clone, Copy)]
pub struct LogEntry {
    pub timestamp_us: i64,
    pub level: LogLevel,
    len: u8,
    text: [u8; MAX_MSG_LEN],
}

impl LogEntry {
    const EMPTY: Self = Self {
        timestamp_us: 0,
        level: LogLevel::Info,
        len: 0,
        text: [0; MAX_MSG_LEN],
    };

    fn fill(&mut self, timestamp_us: i64, level: LogLevel, msg: &[u8]) {
        let len = msg.len().min(MAX_MSG_LEN);
        self.timestamp_us = timestamp_us;
        self.level = level;
        self.len = len as u8;
        self.text[..len].copy_from_slice(&msg[..len]);
    }

    /// Message bytes, possibly cut at [`MAX_MSG_LEN`].
    pub fn bytes(&self) -> &[u8] {
        &self.text[..self.len as usize]
    }

    /// Message text; a cut through a multi-byte character is trimmed.
    pub fn message(&self) -> &str {
        match core::str::from_utf8(self.bytes()) {
            Ok(text) => text,
            Err(e) => core::str::from_utf8(&self.bytes()[..e.valid_up_to()]).unwrap_or(""),
        }
    }
}

impl Default for LogEntry {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Fixed-size message ring, one producer and one consumer.
///
/// The session loop is the only writer and the log drain handler the only
/// reader, so publishing a slot is a single release store of `head`.
/// A full ring drops the new message and counts it.
pub struct LogStream<const N: usize = LOG_BUFFER_SIZE> {
    slots: UnsafeCell<[LogEntry; N]>,
    /// Next slot to write; only the producer stores it.
    head: AtomicU32,
    /// Next slot to read; only the consumer stores it.
    tail: AtomicU32,
    dropped: AtomicU32,
}

// SAFETY: a slot is written only while it lies outside [tail, head) and
// read only while inside it; head and tail each have a single writer.
unsafe impl<const N: usize> Sync for LogStream<N> {}

impl<const N: usize> LogStream<N> {
    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "ring size must be a power of two");
        Self {
            slots: UnsafeCell::new([LogEntry::EMPTY; N]),
            head: AtomicU32::new(0),
            tail: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    #[inline]
    fn slot(index: u32) -> usize {
        index as usize & (N - 1)
    }

    /// Queue a message. Returns `false` if the ring was full.
    pub fn push(&self, timestamp_us: i64, level: LogLevel, msg: &[u8]) -> bool {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);
        if head.wrapping_sub(tail) as usize >= N {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        // SAFETY: slot `head` is outside [tail, head), the consumer
        // does not touch it until the store below.
        unsafe { (*self.slots.get())[Self::slot(head)].fill(timestamp_us, level, msg) };
        self.head.store(head.wrapping_add(1), Ordering::Release);
        true
    }

    /// Oldest queued message.
    pub fn pop(&self) -> Option<LogEntry> {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);
        if tail == head {
            return None;
        }

        // SAFETY: slot `tail` was published by the release store of head.
        let entry = unsafe { (*self.slots.get())[Self::slot(tail)] };
        self.tail.store(tail.wrapping_add(1), Ordering::Release);
        Some(entry)
    }

    /// Messages waiting.
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        head.wrapping_sub(tail) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Messages dropped since the last call; resets the count.
    pub fn take_dropped(&self) -> u32 {
        self.dropped.swap(0, Ordering::Relaxed)
    }
}

impl<const N: usize> Default for LogStream<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Render `args` into `buf`, cutting at capacity on a char boundary.
///
/// Returns the number of bytes written.
pub fn format_to_buffer(buf: &mut [u8], args: core::fmt::Arguments<'_>) -> usize {
    struct Cursor<'b> {
        buf: &'b mut [u8],
        at: usize,
    }

    impl core::fmt::Write for Cursor<'_> {
        fn write_str(&mut self, s: &str) -> core::fmt::Result {
            let room = self.buf.len() - self.at;
            let mut take = s.len().min(room);
            while !s.is_char_boundary(take) {
                take -= 1;
            }
            self.buf[self.at..self.at + take].copy_from_slice(&s.as_bytes()[..take]);
            self.at += take;
            if take < s.len() {
                Err(core::fmt::Error)
            } else {
                Ok(())
            }
        }
    }

    let mut cursor = Cursor { buf, at: 0 };
    let _ = core::fmt::write(&mut cursor, args);
    cursor.at
}

/// Format and queue a message without allocating.
///
/// ```ignore
/// rt_log!(LogLevel::Info, log_stream(), now_us, "session {}: {}", n, mode);
/// ```
#[macro_export]
macro_rules! rt_log {
    ($level:expr, $stream:expr, $timestamp:expr, $($arg:tt)*) => {{
        let mut text = [0u8; $crate::logging::MAX_MSG_LEN];
        let len = $crate::logging::format_to_buffer(&mut text, format_args!($($arg)*));
        $stream.push($timestamp, $level, &text[..len]);
    }};
}

#[macro_export]
macro_rules! rt_error {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Error, $stream, $timestamp, $($arg)*)
    };
}

#[macro_export]
macro_rules! rt_warn {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Warn, $stream, $timestamp, $($arg)*)
    };
}

#[macro_export]
macro_rules! rt_info {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Info, $stream, $timestamp, $($arg)*)
    };
}

#[macro_export]
macro_rules! rt_debug {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Debug, $stream, $timestamp, $($arg)*)
    };
}

#[macro_export]
macro_rules! rt_trace {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Trace, $stream, $timestamp, $($arg)*)
    };
}

/// The process-wide log stream.
#[inline]
pub fn log_stream() -> &'static LogStream {
    &crate::LOG_STREAM
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_then_pop_in_order() {
        let stream = LogStream::<16>::new();
        assert!(stream.is_empty());

        assert!(stream.push(1000, LogLevel::Info, b"session 1: 640x480"));
        assert!(stream.push(1001, LogLevel::Warn, b"no keyboard detected"));
        assert_eq!(stream.len(), 2);

        let entry = stream.pop().unwrap();
        assert_eq!(entry.timestamp_us, 1000);
        assert_eq!(entry.level, LogLevel::Info);
        assert_eq!(entry.message(), "session 1: 640x480");
        assert_eq!(stream.pop().unwrap().message(), "no keyboard detected");

        assert!(stream.is_empty());
        assert!(stream.pop().is_none());
    }

    #[test]
    fn test_full_ring_drops_and_recovers() {
        let stream = LogStream::<4>::new();

        for t in 0..4 {
            assert!(stream.push(t, LogLevel::Warn, b"x"));
        }
        assert!(!stream.push(4, LogLevel::Warn, b"dropped"));
        assert!(!stream.push(5, LogLevel::Warn, b"dropped"));
        assert_eq!(stream.len(), 4);

        stream.pop();
        assert!(stream.push(6, LogLevel::Warn, b"fits again"));
        assert_eq!(stream.take_dropped(), 2);
        assert_eq!(stream.take_dropped(), 0);

        let last = core::iter::from_fn(|| stream.pop()).last().unwrap();
        assert_eq!(last.timestamp_us, 6);
    }

    #[test]
    fn test_indices_wrap() {
        let stream = LogStream::<2>::new();
        for t in 0..10 {
            assert!(stream.push(t, LogLevel::Debug, b"tick"));
            assert_eq!(stream.pop().unwrap().timestamp_us, t);
        }
    }

    #[test]
    fn test_long_message_truncated() {
        let stream = LogStream::<4>::new();
        let long = [b'a'; MAX_MSG_LEN + 20];
        stream.push(0, LogLevel::Error, &long);
        assert_eq!(stream.pop().unwrap().bytes().len(), MAX_MSG_LEN);
    }

    #[test]
    fn test_cut_utf8_is_trimmed() {
        let stream = LogStream::<4>::new();
        stream.push(0, LogLevel::Info, &"ü".as_bytes()[..1]);
        assert_eq!(stream.pop().unwrap().message(), "");
    }

    #[test]
    fn test_macro_formats_into_stream() {
        let stream = LogStream::<4>::new();
        crate::rt_error!(stream, 42, "fault: {}", "out of memory");
        let entry = stream.pop().unwrap();
        assert_eq!(entry.level, LogLevel::Error);
        assert_eq!(entry.message(), "fault: out of memory");
    }

    #[test]
    fn test_format_to_buffer_truncates() {
        let mut buf = [0u8; 8];
        let len = format_to_buffer(&mut buf, format_args!("baud {}", 115200));
        assert_eq!(&buf[..len], b"baud 115");

        let len = format_to_buffer(&mut buf[..3], format_args!("aä"));
        assert_eq!(&buf[..len], "aä".as_bytes());
        let len = format_to_buffer(&mut buf[..2], format_args!("aä"));
        assert_eq!(&buf[..len], b"a");
    }

    #[test]
    fn test_level_names() {
        assert!(LogLevel::Error < LogLevel::Trace);
        assert_eq!(LogLevel::Warn.as_str(), "WARN");
    }
}
