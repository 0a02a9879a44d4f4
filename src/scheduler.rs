//! Cooperative periodic-handler registry.
//!
//! # Rules
//!
//! - Handlers never block and never run the scheduler themselves
//! - Every wait loop calls [`Scheduler::run`] at least once per spin
//! - Handlers are registered for the lifetime of the scheduler, no removal
//!
//! There is no preemption in this core. Background work (LED heartbeat,
//! USB servicing, log draining) only advances where a wait loop cooperates.
//!
//! `run` takes `&mut self` and a handler cannot reach the scheduler that
//! owns it, so a recursive `run` from inside a handler does not compile.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::hal::{StatusLed, SystemMonitor, UsbHost};
use crate::logging::LogStream;
use crate::uart_logger::{LogDrain, LogSink};

/// Registry of zero-argument periodic callbacks.
pub struct Scheduler<'a> {
    handlers: Vec<Box<dyn FnMut() + 'a>>,
    ticks: u64,
}

impl<'a> Scheduler<'a> {
    pub const fn new() -> Self {
        Self {
            handlers: Vec::new(),
            ticks: 0,
        }
    }

    /// Register a non-blocking periodic callback.
    pub fn add_handler(&mut self, handler: impl FnMut() + 'a) {
        self.handlers.push(Box::new(handler));
    }

    /// Invoke every handler once, in registration order.
    pub fn run(&mut self) {
        for handler in self.handlers.iter_mut() {
            handler();
        }
        self.ticks = self.ticks.wrapping_add(1);
    }

    /// Number of completed [`run`](Self::run) calls.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for Scheduler<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Half period of the LED heartbeat.
pub const HEARTBEAT_HALF_PERIOD_US: u64 = 500_000;

/// Blinks the on-board LED at 1 Hz while the loop is alive.
pub fn heartbeat<'a>(
    led: &'a dyn StatusLed,
    system: &'a dyn SystemMonitor,
) -> impl FnMut() + 'a {
    let mut on = false;
    let mut next_toggle_us = 0u64;
    move || {
        let now = system.now_us();
        if now >= next_toggle_us {
            on = !on;
            led.set(on);
            next_toggle_us = now + HEARTBEAT_HALF_PERIOD_US;
        }
    }
}

/// Services the USB host stack.
pub fn usb_poll<'a>(usb: &'a dyn UsbHost) -> impl FnMut() + 'a {
    move || usb.poll()
}

/// Drains the log stream to the debug sink, a bounded batch per tick.
pub fn log_drain<'a>(
    stream: &'a LogStream,
    sink: &'a dyn LogSink,
    system: &'a dyn SystemMonitor,
) -> impl FnMut() + 'a {
    let mut drain = LogDrain::new();
    move || {
        drain.tick(stream, sink, system.now_us() as i64);
    }
}
