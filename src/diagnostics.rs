//! System information block.
//!
//! Shown at the start of every pass-through session and from the first
//! row of the setup menu. It stays reachable in safe mode so resource
//! exhaustion can be diagnosed on the device itself.

use crate::config::Settings;
use crate::hal::{LoadStats, SystemInfo, Terminal, UsbHost};

/// Version string (set by build.rs, includes git hash)
pub const VERSION: &str = env!("VERSION_STRING");

/// Print the system information block.
///
/// Newline mode is forced on while printing and restored afterwards.
pub fn print_system_info(
    terminal: &mut dyn Terminal,
    info: &SystemInfo,
    settings: &Settings,
    usb: &dyn UsbHost,
) {
    let newline = terminal.flags().newline_mode;
    terminal.flags_mut().newline_mode = true;

    let _ = writeln!(terminal, "{}", VERSION);
    let _ = writeln!(terminal, "running on core {}", info.core);
    let _ = writeln!(terminal, "total heap size = {}", info.heap_size);

    // Free list, walked iteratively: first chunk is the headline figure
    for (i, chunk) in info.free_chunks.iter().enumerate() {
        let label = if i == 0 { "heap free" } else { "+fragment" };
        let _ = writeln!(terminal, "{}: {} bytes", label, chunk);
    }
    let _ = writeln!(terminal, "stack free: {} bytes", info.stack_free);

    for region in &info.regions {
        if region.start != region.end {
            let _ = writeln!(terminal, "0x{:08x} to 0x{:08x}: {}", region.start, region.end, region.name);
        } else {
            let _ = writeln!(terminal, "{} not used", region.name);
        }
    }

    if let Some(flash) = info.flash {
        let _ = writeln!(
            terminal,
            "0x{:08x} to 0x{:08x}: flash, used {}, free {}",
            flash.start, flash.end, flash.used, flash.free
        );
    }

    let _ = writeln!(terminal, "system clock = {} MHz", info.sysclock_hz / 1_000_000);
    if let Some(load) = info.load {
        let _ = writeln!(terminal, "{}", LoadLine(load));
    }

    let flags = terminal.flags();
    let _ = writeln!(
        terminal,
        "serial port: {} 8N1{}{}",
        settings.baud_rate(),
        if flags.utf8_mode { ", utf-8" } else { "" },
        if flags.c1_codes_8bit { ", 8bit c1 codes" } else { "" }
    );
    let _ = terminal.write_str(if usb.keyboard_present() {
        "keyboard detected\n"
    } else {
        "***no keyboard!\n"
    });
    let _ = terminal.write_str(if usb.mouse_present() {
        "mouse detected\n"
    } else {
        "no mouse\n"
    });

    terminal.flags_mut().newline_mode = newline;
}

/// Load figures rounded to 0.1 MHz.
struct LoadLine(LoadStats);

impl core::fmt::Display for LoadLine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let tenths = |hz: u32| (hz + 50_000) / 100_000;
        let (min, avg, max) = (tenths(self.0.min_hz), tenths(self.0.avg_hz), tenths(self.0.max_hz));
        write!(
            f,
            "load core {}: {}.{}, {}.{}, {}.{}MHz (min,avg,max)",
            self.0.core,
            min / 10,
            min % 10,
            avg / 10,
            avg % 10,
            max / 10,
            max % 10
        )
    }
}
