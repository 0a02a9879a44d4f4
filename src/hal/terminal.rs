//! ANSI terminal engine facade.
//!
//! The engine renders into the session's pixmap and owns keyboard
//! decoding. Bytes flow through it in both directions:
//!
//! ```text
//! UART RX ──putc()──▶ Terminal ──▶ pixmap
//! UART TX ◀──getc()── Terminal ◀── USB keyboard
//! ```

use alloc::boxed::Box;

use crate::fault::Fault;
use crate::video::SharedPixmap;

/// Mode switches of the terminal engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TerminalFlags {
    pub utf8_mode: bool,
    pub newline_mode: bool,
    pub application_mode: bool,
    pub local_echo: bool,
    pub sgr_cumulative: bool,
    pub c1_codes_8bit: bool,
    pub auto_wrap: bool,
    pub cursor_visible: bool,
    pub log_unhandled: bool,
}

/// Terminal engine attached to one pixmap.
///
/// `core::fmt::Write` output is interpreted exactly like `putc` input, so
/// escape sequences written with `write!` take effect.
pub trait Terminal: core::fmt::Write {
    /// Feed one byte from the host into the emulator.
    fn putc(&mut self, byte: u8);

    /// Next byte of keyboard input for the host, `None` when nothing is
    /// pending.
    fn getc(&mut self) -> Option<u8>;

    /// Current mode switches.
    fn flags(&self) -> TerminalFlags;

    fn flags_mut(&mut self) -> &mut TerminalFlags;

    /// Mode switches restored by `reset`.
    fn set_defaults(&mut self, defaults: TerminalFlags);

    /// Reset to defaults; a hard reset also clears the screen.
    fn reset(&mut self, hard: bool);

    /// Print the engine's identification banner.
    fn identify(&mut self);
}

/// Builds a terminal engine on top of a session's pixmap.
pub trait TerminalFactory {
    fn open(&mut self, surface: SharedPixmap) -> Result<Box<dyn Terminal>, Fault>;
}
