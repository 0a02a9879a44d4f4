//! Hardware Abstraction Layer for VgaAnsiTerminal.
//!
//! Thin seams around the subsystems this crate drives but does not
//! implement: USB host, video compositor, terminal engine, UART, audio,
//! status LED and system introspection.
//! Business logic stays in core modules, HAL is just I/O.
//!
//! Facades that the Scheduler polls in the background (USB, LED, audio,
//! system) take `&self`; they are hardware singletons with their own
//! interior state. Everything driven from a single owner takes `&mut self`.

pub mod audio;
pub mod gpio;
pub mod serial;
pub mod system;
pub mod terminal;
pub mod usb;
pub mod video;

#[cfg(target_os = "espidf")]
pub mod esp;

pub use audio::{Audio, Beep, SAVE_BEEP};
pub use gpio::StatusLed;
pub use serial::SerialPort;
pub use system::{FlashUsage, LoadStats, SystemInfo, SystemMonitor};
pub use terminal::{Terminal, TerminalFactory, TerminalFlags};
pub use usb::{KeyLayout, KeyTable, UsbHost, KEY_TABLE_GER, KEY_TABLE_US};
pub use video::VideoController;
