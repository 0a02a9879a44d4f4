//! Compile-time configuration.
//!
//! Every value can be overridden at build time through an environment
//! variable, e.g. `VGATERM_DEFAULT_BAUD_RATE=115200 cargo build`.
//! Unparseable overrides fall back to the built-in value.
//!
//! These are only consulted when the persisted settings are missing or
//! invalid, see [`super::Settings::defaults`].

/// Name of the default video mode, matched against [`crate::video::VgaMode::name`].
pub const DEFAULT_VGA_MODE: &str = env_str(option_env!("VGATERM_DEFAULT_VGA_MODE"), "640x480");

/// Default UART baud rate.
pub const DEFAULT_BAUD_RATE: u32 = env_u32(option_env!("VGATERM_DEFAULT_BAUD_RATE"), 9600);

/// Name of the default keyboard table, matched against [`crate::hal::KeyTable::name`].
pub const DEFAULT_KEYTABLE: &str = env_str(option_env!("VGATERM_DEFAULT_KEYTABLE"), "ger");

/// Scanline buffer depth handed to the compositor.
pub const SCANLINE_BUFFER_SIZE: u32 = env_u32(option_env!("VGATERM_SCANLINE_BUFFER_SIZE"), 4);

pub const DEFAULT_ENABLE_MOUSE: bool = env_bool(option_env!("VGATERM_DEFAULT_ENABLE_MOUSE"), false);
pub const DEFAULT_AUTO_WRAP: bool = env_bool(option_env!("VGATERM_DEFAULT_AUTO_WRAP"), true);
pub const DEFAULT_APPLICATION_MODE: bool =
    env_bool(option_env!("VGATERM_DEFAULT_APPLICATION_MODE"), false);
pub const DEFAULT_UTF8_MODE: bool = env_bool(option_env!("VGATERM_DEFAULT_UTF8_MODE"), false);
pub const DEFAULT_C1_CODES_8BIT: bool = env_bool(option_env!("VGATERM_DEFAULT_C1_CODES_8BIT"), false);
pub const DEFAULT_NEWLINE_MODE: bool = env_bool(option_env!("VGATERM_DEFAULT_NEWLINE_MODE"), false);
pub const DEFAULT_LOCAL_ECHO: bool = env_bool(option_env!("VGATERM_DEFAULT_LOCAL_ECHO"), false);
pub const DEFAULT_SGR_CUMULATIVE: bool =
    env_bool(option_env!("VGATERM_DEFAULT_SGR_CUMULATIVE"), false);
pub const DEFAULT_LOG_UNHANDLED: bool = env_bool(option_env!("VGATERM_DEFAULT_LOG_UNHANDLED"), false);

/// How long boot waits for a USB keyboard to enumerate.
pub const KEYBOARD_WAIT_US: u64 = 2 * 1000 * 1000;

const fn env_str(value: Option<&'static str>, fallback: &'static str) -> &'static str {
    match value {
        Some(s) if !s.is_empty() => s,
        _ => fallback,
    }
}

const fn env_u32(value: Option<&str>, fallback: u32) -> u32 {
    match value {
        Some(s) => parse_u32(s, fallback),
        None => fallback,
    }
}

const fn env_bool(value: Option<&str>, fallback: bool) -> bool {
    match value {
        Some(s) => parse_bool(s, fallback),
        None => fallback,
    }
}

pub(crate) const fn parse_u32(s: &str, fallback: u32) -> u32 {
    let bytes = s.as_bytes();
    if bytes.is_empty() {
        return fallback;
    }

    let mut value: u32 = 0;
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if c < b'0' || c > b'9' {
            return fallback;
        }
        value = match value.checked_mul(10) {
            Some(v) => match v.checked_add((c - b'0') as u32) {
                Some(v) => v,
                None => return fallback,
            },
            None => return fallback,
        };
        i += 1;
    }
    value
}

pub(crate) const fn parse_bool(s: &str, fallback: bool) -> bool {
    let b = s.as_bytes();
    if bytes_eq(b, b"1") || bytes_eq(b, b"true") || bytes_eq(b, b"on") || bytes_eq(b, b"yes") {
        true
    } else if bytes_eq(b, b"0") || bytes_eq(b, b"false") || bytes_eq(b, b"off") || bytes_eq(b, b"no") {
        false
    } else {
        fallback
    }
}

const fn bytes_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_u32() {
        assert_eq!(parse_u32("115200", 1), 115200);
        assert_eq!(parse_u32("", 7), 7);
        assert_eq!(parse_u32("96o0", 7), 7);
        assert_eq!(parse_u32("99999999999", 7), 7);
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("on", false));
        assert!(!parse_bool("0", true));
        assert!(parse_bool("maybe", true));
        assert!(!parse_bool("maybe", false));
    }
}
