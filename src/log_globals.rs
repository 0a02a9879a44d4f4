//! Global log stream instance.
//!
//! This core runs on a single cooperative thread, so one stream is enough:
//! producers are the Supervisor, the setup menu and any USB callback that
//! fires inside a Scheduler tick; the single consumer is the log drain
//! handler.

use crate::logging::LogStream;

/// Process-wide log stream, drained by [`crate::scheduler::log_drain`].
pub static LOG_STREAM: LogStream = LogStream::new();
