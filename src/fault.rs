//! Session faults and the ctrl-alt-del signal.
//!
//! # Policy
//!
//! > No fault is fatal. Tear down, rebuild, retry in a known-safe mode.
//!
//! Every step of a session returns `Result<_, Fault>`. The Supervisor
//! collapses whatever comes back into a [`SessionError`], which picks the
//! video mode of the next session and becomes the setup-screen banner.

use alloc::borrow::Cow;
use alloc::string::{String, ToString};
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Banner text for the hot-key pseudo fault.
pub const HOTKEY_REASON: &str = "ctrl-alt-del pressed";

/// Banner text for a fault that carried no description.
pub const UNKNOWN_REASON: &str = "unknown error";

/// Why a session ended early.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fault {
    /// Structured failure with a human-readable reason.
    Reason(Cow<'static, str>),

    /// Runtime failure reported by a collaborator, kept as its description.
    Runtime(String),

    /// Failure that carried nothing to show.
    Unknown,

    /// The operator pressed ctrl-alt-del.
    /// Not an error; it routes through the same recovery path into setup.
    HotKey,
}

impl Fault {
    /// Wrap any collaborator error by its description.
    pub fn runtime(err: impl core::fmt::Display) -> Self {
        let text = err.to_string();
        if text.is_empty() {
            Fault::Unknown
        } else {
            Fault::Runtime(text)
        }
    }

    /// Text shown to the operator.
    pub fn reason(&self) -> &str {
        match self {
            Fault::Reason(msg) => msg.as_ref(),
            Fault::Runtime(msg) => msg.as_str(),
            Fault::Unknown => UNKNOWN_REASON,
            Fault::HotKey => HOTKEY_REASON,
        }
    }
}

impl core::fmt::Display for Fault {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.reason())
    }
}

/// Outcome of the previous session.
///
/// `NoError` runs the next session in pass-through mode with the configured
/// video mode. `Reason` forces the safe mode and opens setup with the text
/// as banner.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SessionError {
    #[default]
    NoError,
    Reason(Cow<'static, str>),
}

impl SessionError {
    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, SessionError::Reason(_))
    }

    /// Banner text, empty when there was no error.
    pub fn message(&self) -> &str {
        match self {
            SessionError::NoError => "",
            SessionError::Reason(msg) => msg.as_ref(),
        }
    }
}

impl From<Fault> for SessionError {
    fn from(fault: Fault) -> Self {
        match fault {
            Fault::Reason(msg) if !msg.is_empty() => SessionError::Reason(msg),
            Fault::Runtime(msg) => SessionError::Reason(Cow::Owned(msg)),
            Fault::Reason(_) | Fault::Unknown => SessionError::Reason(Cow::Borrowed(UNKNOWN_REASON)),
            Fault::HotKey => SessionError::Reason(Cow::Borrowed(HOTKEY_REASON)),
        }
    }
}

/// Ctrl-alt-del detection flag.
///
/// Set by the USB keyboard driver whenever it decodes the combination,
/// polled by the pass-through loop and the setup menu, consumed exactly
/// once per session by the Supervisor.
///
/// # Usage
///
/// ```ignore
/// static HOTKEY: HotKey = HotKey::new();
///
/// // In the HID report handler:
/// HOTKEY.raise();
///
/// // In every wait loop:
/// if HOTKEY.is_raised() {
///     return;
/// }
///
/// // At session teardown:
/// let pressed = HOTKEY.take();
/// ```
pub struct HotKey {
    /// True until consumed.
    raised: AtomicBool,

    /// Total presses since boot (never cleared).
    count: AtomicU32,
}

impl HotKey {
    pub const fn new() -> Self {
        Self {
            raised: AtomicBool::new(false),
            count: AtomicU32::new(0),
        }
    }

    /// Signal a detected ctrl-alt-del.
    #[inline]
    pub fn raise(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
        self.raised.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }

    /// Read and clear the flag.
    #[inline]
    pub fn take(&self) -> bool {
        self.raised.swap(false, Ordering::AcqRel)
    }

    /// Total presses since boot, for diagnostics.
    #[inline]
    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }
}

impl Default for HotKey {
    fn default() -> Self {
        Self::new()
    }
}
