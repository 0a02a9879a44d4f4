//! GPIO HAL for the on-board status LED.

/// On-board LED used as a heartbeat.
pub trait StatusLed {
    fn set(&self, on: bool);
}
