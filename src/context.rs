//! Process-wide state shared by the Supervisor, the setup menu and the
//! pass-through session.
//!
//! Exactly one logical thread touches it: the cooperative session loop.
//! The only field written from elsewhere is the hot-key flag, which is
//! atomic.

use crate::config::{ConfigStore, Settings};
use crate::fault::HotKey;
use crate::hal::SystemMonitor;

pub struct Context<'a> {
    /// Live settings, consumed by the next session.
    pub settings: Settings,
    /// Raised by the USB keyboard driver on ctrl-alt-del.
    pub hotkey: &'a HotKey,
    pub store: ConfigStore<'a>,
    pub system: &'a dyn SystemMonitor,
}

impl<'a> Context<'a> {
    /// Build the context and load live settings from the store.
    pub fn load(mut store: ConfigStore<'a>, hotkey: &'a HotKey, system: &'a dyn SystemMonitor) -> Self {
        let settings = store.load();
        Self {
            settings,
            hotkey,
            store,
            system,
        }
    }

    /// Log timestamp.
    #[inline]
    pub fn now_us(&self) -> i64 {
        self.system.now_us() as i64
    }
}
