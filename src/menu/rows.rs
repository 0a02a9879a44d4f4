//! Setup menu rows and the pending/live diff marker.

use core::fmt;

use crate::config::{Flag, IndexField, Settings};
use crate::hal::KeyTable;
use crate::video::VgaMode;

/// One selectable line of the setup screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Row {
    SystemInfo,
    Index(IndexField),
    Flag(Flag),
    Save,
    Exit,
}

/// Rows in screen order.
pub const ROWS: [Row; 15] = [
    Row::SystemInfo,
    Row::Index(IndexField::VgaMode),
    Row::Index(IndexField::BaudRate),
    Row::Index(IndexField::Keyboard),
    Row::Flag(Flag::EnableMouse),
    Row::Flag(Flag::Utf8Mode),
    Row::Flag(Flag::C1Codes8bit),
    Row::Flag(Flag::NewlineMode),
    Row::Flag(Flag::AutoWrap),
    Row::Flag(Flag::ApplicationMode),
    Row::Flag(Flag::LocalEcho),
    Row::Flag(Flag::SgrCumulative),
    Row::Flag(Flag::LogUnhandled),
    Row::Save,
    Row::Exit,
];

impl Row {
    pub fn label(self) -> &'static str {
        match self {
            Row::SystemInfo => "show system info",
            Row::Index(IndexField::VgaMode) => "screen size",
            Row::Index(IndexField::BaudRate) => "baud rate",
            Row::Index(IndexField::Keyboard) => "keyboard",
            Row::Flag(Flag::EnableMouse) => "enable mouse",
            Row::Flag(Flag::Utf8Mode) => "utf-8 encoding",
            Row::Flag(Flag::C1Codes8bit) => "8 bit C1 codes",
            Row::Flag(Flag::NewlineMode) => "newline mode",
            Row::Flag(Flag::AutoWrap) => "auto-wrap mode",
            Row::Flag(Flag::ApplicationMode) => "kbd application mode",
            Row::Flag(Flag::LocalEcho) => "local echo",
            Row::Flag(Flag::SgrCumulative) => "SGR accumulative",
            Row::Flag(Flag::LogUnhandled) => "log unhandled codes",
            Row::Save => "save to flash",
            Row::Exit => "exit",
        }
    }

    /// The row's setting as shown in its marker, `None` for action rows.
    pub fn value(self, s: &Settings) -> Option<RowValue> {
        match self {
            Row::Index(IndexField::VgaMode) => Some(RowValue::Mode(s.vga_mode())),
            Row::Index(IndexField::BaudRate) => Some(RowValue::Baud(s.baud_rate())),
            Row::Index(IndexField::Keyboard) => Some(RowValue::Keys(s.keyboard())),
            Row::Flag(flag) => Some(RowValue::OnOff(flag.get(s))),
            Row::SystemInfo | Row::Save | Row::Exit => None,
        }
    }

    /// Marker comparing the pending value with the live one.
    pub fn marker(self, pending: &Settings, live: &Settings) -> Option<Inked<RowValue>> {
        Some(inked(self.value(pending)?, self.value(live)?, |v| v))
    }
}

/// A setting value of any of the row kinds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RowValue {
    Mode(&'static VgaMode),
    Baud(u32),
    Keys(&'static KeyTable),
    OnOff(bool),
}

impl fmt::Display for RowValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowValue::Mode(mode) => write!(f, "{}", mode),
            RowValue::Baud(baud) => write!(f, "{}", baud),
            RowValue::Keys(table) => write!(f, "{}", table),
            RowValue::OnOff(on) => f.write_str(if *on { "ON" } else { "OFF" }),
        }
    }
}

const INK_AGREE: &str = "\x1b[32m";
const INK_DIFFER: &str = "\x1b[31m";
const INK_DEFAULT: &str = "\x1b[39m";

/// Bracketed value coloured green when pending == live, red otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inked<D> {
    pub agree: bool,
    pub value: D,
}

/// Build a marker from two values, a display conversion and their equality.
pub fn inked<T: PartialEq, D: fmt::Display>(pending: T, live: T, show: impl FnOnce(T) -> D) -> Inked<D> {
    let agree = pending == live;
    Inked {
        agree,
        value: show(pending),
    }
}

impl<D: fmt::Display> fmt::Display for Inked<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ink = if self.agree { INK_AGREE } else { INK_DIFFER };
        write!(f, "[{}{}{}] ", ink, self.value, INK_DEFAULT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_rendering() {
        let s = Settings::defaults();
        let mut live = s;
        let m = Row::Flag(Flag::LocalEcho).marker(&s, &live).unwrap();
        assert_eq!(std::format!("{}", m), "[\x1b[32mOFF\x1b[39m] ");

        live.local_echo = true;
        let m = Row::Flag(Flag::LocalEcho).marker(&s, &live).unwrap();
        assert_eq!(std::format!("{}", m), "[\x1b[31mOFF\x1b[39m] ");
    }

    #[test]
    fn test_index_marker_shows_table_entry() {
        let mut s = Settings::defaults();
        s.vga_mode_idx = 0;
        s.baud_rate_idx = 6;
        s.keyboard_idx = 0;
        let vga = Row::Index(IndexField::VgaMode).marker(&s, &s).unwrap();
        let baud = Row::Index(IndexField::BaudRate).marker(&s, &s).unwrap();
        let kbd = Row::Index(IndexField::Keyboard).marker(&s, &s).unwrap();
        assert_eq!(std::format!("{}", vga.value), "320x240");
        assert_eq!(std::format!("{}", baud.value), "115200");
        assert_eq!(std::format!("{}", kbd.value), "us");
    }

    #[test]
    fn test_action_rows_have_no_marker() {
        let s = Settings::defaults();
        for row in [Row::SystemInfo, Row::Save, Row::Exit] {
            assert!(row.marker(&s, &s).is_none());
        }
    }

    #[test]
    fn test_labels_fit_column() {
        for row in ROWS {
            assert!(row.label().len() <= 20, "{:?}", row);
        }
    }
}
