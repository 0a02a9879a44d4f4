//! # VgaAnsiTerminal
//!
//! Core of a VGA ANSI terminal adapter: a serial line in, a VGA screen and
//! a USB keyboard out front.
//!
//! ## Architecture
//!
//! [`Supervisor`] runs sessions forever. Each session rebuilds video and
//! terminal from the live [`Settings`], then either pumps bytes through the
//! [`SerialBridge`] or runs the [`SetupMenu`]. Every wait point polls the
//! cooperative [`Scheduler`], the only concurrency in the system.
//!
//! - Faults bubble up as [`Fault`] to one boundary in the Supervisor
//! - Ctrl-alt-del is an atomic [`HotKey`] flag, seen only at poll points
//! - Hardware sits behind the traits in [`hal`]; on ESP-IDF the `board`
//!   module wires the on-chip peripherals and runs the Supervisor

#![cfg_attr(not(test), no_std)]

extern crate alloc;

#[cfg(target_os = "espidf")]
pub mod board;
pub mod bridge;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod fault;
pub mod hal;
pub mod log_globals;
pub mod logging;
pub mod menu;
pub mod scheduler;
pub mod supervisor;
pub mod uart_logger;
pub mod video;

pub use bridge::SerialBridge;
pub use config::{ConfigStore, MemoryStorage, Settings, SettingsStorage};
pub use context::Context;
pub use fault::{Fault, HotKey, SessionError};
pub use log_globals::LOG_STREAM;
pub use menu::{MenuExit, SetupMenu};
pub use scheduler::Scheduler;
pub use supervisor::{Devices, Supervisor};
