//! Module: config
//!
//! Purpose: Persisted terminal settings for VgaAnsiTerminal.
//!
//! Architecture:
//! - [`Settings`]: fixed 16-byte record, indices into the option tables
//!   plus nine terminal switches
//! - Option tables: [`VGA_MODES`], [`BAUD_RATES`], [`KEYBOARDS`], fixed at build time
//! - [`defaults`]: compile-time defaults, overridable from the build environment
//! - [`store`]: load/save against a single storage slot
//! - [`nvs`]: ESP-IDF NVS backend for the slot
//!
//! Invariant: a [`Settings`] handed out by [`ConfigStore::load`] is always
//! valid, so option tables are indexed without further checks.

pub mod defaults;
pub mod nvs;
pub mod store;

pub use store::{ConfigStore, MemoryStorage, SettingsStorage, StorageError};

use crate::hal::usb::{KeyTable, KEY_TABLE_GER, KEY_TABLE_US};
use crate::hal::TerminalFlags;
use crate::video::{
    VgaMode, VGA_MODE_1024X768_60, VGA_MODE_320X240_60, VGA_MODE_400X300_60,
    VGA_MODE_512X384_60, VGA_MODE_640X384_60, VGA_MODE_640X480_60, VGA_MODE_800X600_60,
};

/// Structural validity tag of a persisted record.
pub const SETTINGS_MAGIC: u32 = 0x0123_afd3;

/// Size of the persisted record in bytes.
pub const SETTINGS_SIZE: usize = 16;

/// Selectable video modes, in menu order.
pub static VGA_MODES: [&VgaMode; 7] = [
    &VGA_MODE_320X240_60,
    &VGA_MODE_400X300_60,
    &VGA_MODE_512X384_60,
    &VGA_MODE_640X480_60,
    &VGA_MODE_800X600_60,
    &VGA_MODE_1024X768_60,
    &VGA_MODE_640X384_60,
];

/// Selectable UART rates, in menu order.
pub static BAUD_RATES: [u32; 7] = [2400, 4800, 9600, 19200, 38400, 57600, 115200];

/// Selectable keyboard layouts, in menu order.
pub static KEYBOARDS: [&KeyTable; 2] = [&KEY_TABLE_US, &KEY_TABLE_GER];

/// Terminal settings as persisted in flash.
///
/// # Layout (little endian)
///
/// ```text
/// 0..4   magic
/// 4      baud_rate_idx
/// 5      vga_mode_idx
/// 6      keyboard_idx
/// 7..16  enable_mouse, auto_wrap, application_mode, utf8_mode,
///        c1_codes_8bit, newline_mode, local_echo, sgr_cumulative,
///        log_unhandled   (0 = off, anything else = on)
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settings {
    pub magic: u32,
    pub baud_rate_idx: u8,
    pub vga_mode_idx: u8,
    pub keyboard_idx: u8,
    pub enable_mouse: bool,
    pub auto_wrap: bool,
    pub application_mode: bool,
    pub utf8_mode: bool,
    pub c1_codes_8bit: bool,
    pub newline_mode: bool,
    pub local_echo: bool,
    pub sgr_cumulative: bool,
    pub log_unhandled: bool,
}

impl Settings {
    /// Settings built from the compile-time configuration.
    ///
    /// Each index points at the last table entry matching the configured
    /// default, or at entry 0 when the default is not in the table.
    pub fn defaults() -> Self {
        Self {
            magic: SETTINGS_MAGIC,
            baud_rate_idx: default_index(&BAUD_RATES, |&b| b == defaults::DEFAULT_BAUD_RATE),
            vga_mode_idx: default_index(&VGA_MODES, |m| m.name == defaults::DEFAULT_VGA_MODE),
            keyboard_idx: default_index(&KEYBOARDS, |k| k.name == defaults::DEFAULT_KEYTABLE),
            enable_mouse: defaults::DEFAULT_ENABLE_MOUSE,
            auto_wrap: defaults::DEFAULT_AUTO_WRAP,
            application_mode: defaults::DEFAULT_APPLICATION_MODE,
            utf8_mode: defaults::DEFAULT_UTF8_MODE,
            c1_codes_8bit: defaults::DEFAULT_C1_CODES_8BIT,
            newline_mode: defaults::DEFAULT_NEWLINE_MODE,
            local_echo: defaults::DEFAULT_LOCAL_ECHO,
            sgr_cumulative: defaults::DEFAULT_SGR_CUMULATIVE,
            log_unhandled: defaults::DEFAULT_LOG_UNHANDLED,
        }
    }

    /// True if the tag matches and every index is inside its table.
    pub fn is_valid(&self) -> bool {
        self.magic == SETTINGS_MAGIC
            && IndexField::ALL
                .iter()
                .all(|f| (f.get(self) as usize) < f.len())
    }

    /// Decode a raw record. The result is not validated.
    pub fn from_bytes(bytes: &[u8; SETTINGS_SIZE]) -> Self {
        let flag = |i: usize| bytes[i] != 0;
        Self {
            magic: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            baud_rate_idx: bytes[4],
            vga_mode_idx: bytes[5],
            keyboard_idx: bytes[6],
            enable_mouse: flag(7),
            auto_wrap: flag(8),
            application_mode: flag(9),
            utf8_mode: flag(10),
            c1_codes_8bit: flag(11),
            newline_mode: flag(12),
            local_echo: flag(13),
            sgr_cumulative: flag(14),
            log_unhandled: flag(15),
        }
    }

    pub fn to_bytes(&self) -> [u8; SETTINGS_SIZE] {
        let mut bytes = [0u8; SETTINGS_SIZE];
        bytes[..4].copy_from_slice(&self.magic.to_le_bytes());
        bytes[4] = self.baud_rate_idx;
        bytes[5] = self.vga_mode_idx;
        bytes[6] = self.keyboard_idx;
        for (i, flag) in Flag::ALL.iter().enumerate() {
            bytes[7 + i] = flag.get(self) as u8;
        }
        bytes
    }

    #[inline]
    pub fn vga_mode(&self) -> &'static VgaMode {
        VGA_MODES[self.vga_mode_idx as usize]
    }

    #[inline]
    pub fn baud_rate(&self) -> u32 {
        BAUD_RATES[self.baud_rate_idx as usize]
    }

    #[inline]
    pub fn keyboard(&self) -> &'static KeyTable {
        KEYBOARDS[self.keyboard_idx as usize]
    }

    /// Terminal power-on defaults for a pass-through session.
    pub fn terminal_defaults(&self) -> TerminalFlags {
        TerminalFlags {
            utf8_mode: self.utf8_mode,
            newline_mode: self.newline_mode,
            application_mode: self.application_mode,
            local_echo: self.local_echo,
            sgr_cumulative: self.sgr_cumulative,
            c1_codes_8bit: self.c1_codes_8bit,
            auto_wrap: self.auto_wrap,
            cursor_visible: true,
            log_unhandled: self.log_unhandled,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::defaults()
    }
}

/// Index of the last entry matching `is_default`, scanning from the end;
/// 0 if nothing matches.
fn default_index<T>(table: &[T], is_default: impl Fn(&T) -> bool) -> u8 {
    table.iter().rposition(is_default).unwrap_or(0) as u8
}

/// The three settings that select into an option table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexField {
    VgaMode,
    BaudRate,
    Keyboard,
}

impl IndexField {
    pub const ALL: [IndexField; 3] = [IndexField::VgaMode, IndexField::BaudRate, IndexField::Keyboard];

    /// Length of the backing table.
    pub fn len(self) -> usize {
        match self {
            IndexField::VgaMode => VGA_MODES.len(),
            IndexField::BaudRate => BAUD_RATES.len(),
            IndexField::Keyboard => KEYBOARDS.len(),
        }
    }

    pub fn get(self, s: &Settings) -> u8 {
        match self {
            IndexField::VgaMode => s.vga_mode_idx,
            IndexField::BaudRate => s.baud_rate_idx,
            IndexField::Keyboard => s.keyboard_idx,
        }
    }

    pub fn set(self, s: &mut Settings, idx: u8) {
        match self {
            IndexField::VgaMode => s.vga_mode_idx = idx,
            IndexField::BaudRate => s.baud_rate_idx = idx,
            IndexField::Keyboard => s.keyboard_idx = idx,
        }
    }

    /// Step to the next table entry, wrapping to 0 after the last.
    pub fn advance(self, s: &mut Settings) {
        let len = self.len();
        self.set(s, ((self.get(s) as usize + 1) % len) as u8);
    }

    /// Step to the previous table entry, wrapping to the last after 0.
    pub fn retreat(self, s: &mut Settings) {
        let len = self.len();
        self.set(s, ((self.get(s) as usize + len - 1) % len) as u8);
    }
}

/// The nine on/off terminal switches, in persisted order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flag {
    EnableMouse,
    AutoWrap,
    ApplicationMode,
    Utf8Mode,
    C1Codes8bit,
    NewlineMode,
    LocalEcho,
    SgrCumulative,
    LogUnhandled,
}

impl Flag {
    pub const ALL: [Flag; 9] = [
        Flag::EnableMouse,
        Flag::AutoWrap,
        Flag::ApplicationMode,
        Flag::Utf8Mode,
        Flag::C1Codes8bit,
        Flag::NewlineMode,
        Flag::LocalEcho,
        Flag::SgrCumulative,
        Flag::LogUnhandled,
    ];

    fn slot(self, s: &mut Settings) -> &mut bool {
        match self {
            Flag::EnableMouse => &mut s.enable_mouse,
            Flag::AutoWrap => &mut s.auto_wrap,
            Flag::ApplicationMode => &mut s.application_mode,
            Flag::Utf8Mode => &mut s.utf8_mode,
            Flag::C1Codes8bit => &mut s.c1_codes_8bit,
            Flag::NewlineMode => &mut s.newline_mode,
            Flag::LocalEcho => &mut s.local_echo,
            Flag::SgrCumulative => &mut s.sgr_cumulative,
            Flag::LogUnhandled => &mut s.log_unhandled,
        }
    }

    pub fn get(self, s: &Settings) -> bool {
        match self {
            Flag::EnableMouse => s.enable_mouse,
            Flag::AutoWrap => s.auto_wrap,
            Flag::ApplicationMode => s.application_mode,
            Flag::Utf8Mode => s.utf8_mode,
            Flag::C1Codes8bit => s.c1_codes_8bit,
            Flag::NewlineMode => s.newline_mode,
            Flag::LocalEcho => s.local_echo,
            Flag::SgrCumulative => s.sgr_cumulative,
            Flag::LogUnhandled => s.log_unhandled,
        }
    }

    pub fn toggle(self, s: &mut Settings) {
        let v = self.slot(s);
        *v = !*v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let s = Settings::defaults();
        assert!(s.is_valid());
        assert_eq!(s.vga_mode().name, defaults::DEFAULT_VGA_MODE);
        assert_eq!(s.baud_rate(), defaults::DEFAULT_BAUD_RATE);
        assert_eq!(s.keyboard().name, defaults::DEFAULT_KEYTABLE);
    }

    #[test]
    fn test_default_index_scans_from_end() {
        assert_eq!(default_index(&[1, 2, 1, 3], |&v| v == 1), 2);
        assert_eq!(default_index(&[1, 2, 3], |&v| v == 9), 0);
    }

    #[test]
    fn test_bytes_layout() {
        let mut s = Settings::defaults();
        s.baud_rate_idx = 6;
        s.vga_mode_idx = 5;
        s.keyboard_idx = 1;
        s.log_unhandled = true;
        let b = s.to_bytes();
        assert_eq!(&b[..4], &SETTINGS_MAGIC.to_le_bytes());
        assert_eq!(b[4..7], [6, 5, 1]);
        assert_eq!(b[15], 1);
        assert_eq!(Settings::from_bytes(&b), s);
    }

    #[test]
    fn test_index_out_of_table_is_invalid() {
        let mut s = Settings::defaults();
        s.keyboard_idx = KEYBOARDS.len() as u8;
        assert!(!s.is_valid());
    }

    #[test]
    fn test_index_wraps_at_table_ends() {
        for field in IndexField::ALL {
            let last = (field.len() - 1) as u8;
            let mut s = Settings::defaults();

            field.set(&mut s, 0);
            field.retreat(&mut s);
            assert_eq!(field.get(&s), last, "{:?} retreat from 0", field);

            field.advance(&mut s);
            assert_eq!(field.get(&s), 0, "{:?} advance from last", field);
            assert!(s.is_valid());
        }
    }

    #[test]
    fn test_flag_toggle_only_touches_its_field() {
        for flag in Flag::ALL {
            let before = Settings::defaults();
            let mut after = before;
            flag.toggle(&mut after);
            assert_ne!(flag.get(&before), flag.get(&after));
            for other in Flag::ALL.iter().filter(|&&f| f != flag) {
                assert_eq!(other.get(&before), other.get(&after));
            }
        }
    }
}
