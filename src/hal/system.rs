//! Clock, memory and load introspection.

use alloc::string::String;
use alloc::vec::Vec;

/// Flash image placement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlashUsage {
    pub start: u32,
    pub end: u32,
    pub used: u32,
    pub free: u32,
}

/// Core load over the last measurement window, in Hz of busy clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub core: u32,
    pub min_hz: u32,
    pub avg_hz: u32,
    pub max_hz: u32,
}

/// A named address range worth reporting (scratch banks, stacks).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRegion {
    pub name: String,
    pub start: u32,
    pub end: u32,
}

/// Snapshot printed by the diagnostics screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemInfo {
    pub core: u32,
    pub heap_size: u32,
    /// Free heap chunks, largest first. Empty when nothing is free.
    pub free_chunks: Vec<u32>,
    pub stack_free: u32,
    pub regions: Vec<MemoryRegion>,
    pub flash: Option<FlashUsage>,
    pub sysclock_hz: u32,
    pub load: Option<LoadStats>,
}

/// System facade.
pub trait SystemMonitor {
    /// Monotonic microseconds since boot.
    fn now_us(&self) -> u64;

    /// Start the background load measurement. Called once at boot.
    fn start_load_sensor(&self);

    fn info(&self) -> SystemInfo;
}
