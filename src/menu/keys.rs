//! Menu key decoder.
//!
//! Turns the terminal's byte stream into menu keys:
//!
//! ```text
//! ' ' | CR         → Activate
//! ESC ESC          → Leave
//! ESC [ A / B      → Up / Down
//! ESC [ C          → Activate (right arrow acts like space)
//! ESC [ D          → Left
//! anything else    → Ignored
//! ```

/// A decoded menu key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKey {
    Activate,
    Up,
    Down,
    Left,
    Leave,
}

/// Result of feeding one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    /// Sequence incomplete, feed the next byte.
    Pending,
    /// Sequence complete but not a menu key.
    Ignored,
    Key(MenuKey),
}

const ESC: u8 = 0x1B;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EscapeState {
    Normal,
    Escape,  // Got ESC
    Bracket, // Got ESC [
}

/// Escape sequence state machine
#[derive(Debug)]
pub struct KeyDecoder {
    state: EscapeState,
}

impl KeyDecoder {
    pub const fn new() -> Self {
        Self {
            state: EscapeState::Normal,
        }
    }

    /// True when no sequence is in progress.
    pub fn is_idle(&self) -> bool {
        self.state == EscapeState::Normal
    }

    /// Drop any partially received sequence.
    pub fn reset(&mut self) {
        self.state = EscapeState::Normal;
    }

    pub fn feed(&mut self, byte: u8) -> Decoded {
        match self.state {
            EscapeState::Normal => match byte {
                b' ' | b'\r' => Decoded::Key(MenuKey::Activate),
                ESC => {
                    self.state = EscapeState::Escape;
                    Decoded::Pending
                }
                _ => Decoded::Ignored,
            },
            EscapeState::Escape => {
                self.state = EscapeState::Normal;
                match byte {
                    ESC => Decoded::Key(MenuKey::Leave),
                    b'[' => {
                        self.state = EscapeState::Bracket;
                        Decoded::Pending
                    }
                    _ => Decoded::Ignored,
                }
            }
            EscapeState::Bracket => {
                self.state = EscapeState::Normal;
                match byte {
                    b'A' => Decoded::Key(MenuKey::Up),
                    b'B' => Decoded::Key(MenuKey::Down),
                    b'C' => Decoded::Key(MenuKey::Activate),
                    b'D' => Decoded::Key(MenuKey::Left),
                    _ => Decoded::Ignored,
                }
            }
        }
    }
}

impl Default for KeyDecoder {
    fn default() -> Self {
        Self::new()
    }
}
