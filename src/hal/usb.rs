//! USB host facade (HID keyboard and mouse).
//!
//! The USB stack decodes HID reports on its own and raises the shared
//! [`crate::fault::HotKey`] when it sees ctrl-alt-del. It only makes
//! progress when [`UsbHost::poll`] runs, which the Scheduler does every tick.

/// Keyboard layouts known to the HID translator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyLayout {
    Us,
    German,
}

/// HID usage → character translation table, selected by layout.
#[derive(Debug, PartialEq, Eq)]
pub struct KeyTable {
    /// Short name shown in setup and used for default selection.
    pub name: &'static str,
    pub layout: KeyLayout,
}

impl core::fmt::Display for KeyTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name)
    }
}

pub const KEY_TABLE_US: KeyTable = KeyTable {
    name: "us",
    layout: KeyLayout::Us,
};

pub const KEY_TABLE_GER: KeyTable = KeyTable {
    name: "ger",
    layout: KeyLayout::German,
};

pub trait UsbHost {
    /// Bring up the host controller. Called once at boot.
    fn init(&self);

    /// Service the USB stack. Must run every Scheduler tick.
    fn poll(&self);

    fn keyboard_present(&self) -> bool;

    fn mouse_present(&self) -> bool;

    fn set_key_table(&self, table: &'static KeyTable);
}
