//! Serial pass-through between the data UART and the terminal engine.
//!
//! ```text
//! UART RX ──▶ XON/XOFF filter ──▶ Terminal::putc
//! UART TX ◀── (unless paused) ◀── Terminal::getc
//! ```
//!
//! The peer pauses our transmit direction with XOFF and resumes it with
//! XON. Both control bytes are consumed here and never reach the terminal.

use crate::fault::HotKey;
use crate::hal::{SerialPort, Terminal};
use crate::scheduler::Scheduler;

/// Resume transmission (DC1, ctrl-Q).
pub const XON: u8 = 17;

/// Pause transmission (DC3, ctrl-S).
pub const XOFF: u8 = 19;

/// Software flow control state for one pass-through session.
#[derive(Debug, Default)]
pub struct SerialBridge {
    paused: bool,
}

impl SerialBridge {
    pub const fn new() -> Self {
        Self { paused: false }
    }

    /// True while the peer has sent XOFF and not yet XON.
    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// One non-blocking iteration.
    ///
    /// Forwards at most one received byte into the terminal, then sends at
    /// most one byte of terminal output unless paused. When paused, or when
    /// the terminal had nothing to send, the Scheduler runs instead.
    pub fn step(
        &mut self,
        serial: &mut dyn SerialPort,
        terminal: &mut dyn Terminal,
        scheduler: &mut Scheduler<'_>,
    ) {
        match serial.read_byte() {
            Some(XON) => self.paused = false,
            Some(XOFF) => self.paused = true,
            Some(byte) => terminal.putc(byte),
            None => {}
        }

        if !self.paused {
            if let Some(byte) = terminal.getc() {
                serial.write_byte(byte);
                return;
            }
        }
        scheduler.run();
    }

    /// Pump bytes until ctrl-alt-del is detected.
    ///
    /// The flag is only observed here, so the worst-case reaction time is
    /// one Scheduler tick. It is left raised for the Supervisor to consume.
    pub fn run(
        &mut self,
        serial: &mut dyn SerialPort,
        terminal: &mut dyn Terminal,
        scheduler: &mut Scheduler<'_>,
        hotkey: &HotKey,
    ) {
        while !hotkey.is_raised() {
            self.step(serial, terminal, scheduler);
        }
    }
}

/// Re-apply the live baud rate after a system clock change.
///
/// The UART divisor is derived from the peripheral clock, so the board
/// calls this from its clock-change notification.
pub fn sysclock_changed(serial: &mut dyn SerialPort, settings: &crate::config::Settings) {
    serial.set_baud_rate(settings.baud_rate());
}
