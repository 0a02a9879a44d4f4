//! Settings persistence against a single storage slot.
//!
//! # Rules
//!
//! - `load` never hands out an invalid record: anything that fails the
//!   validity check is replaced by complete defaults, never merged
//! - `save` stamps the magic tag and writes; it does not read back

use alloc::string::String;

use super::{Settings, SETTINGS_MAGIC, SETTINGS_SIZE};

/// Slot (NVS key) holding the settings record.
pub const SETTINGS_SLOT: &str = "settings";

/// Persistence device errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Stored record has the wrong size
    BadLength(usize),
    /// Device read/write error
    Io(String),
    /// No persistence device on this platform
    NotAvailable,
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BadLength(len) => write!(f, "stored record has {} bytes", len),
            Self::Io(msg) => write!(f, "storage i/o: {}", msg),
            Self::NotAvailable => f.write_str("storage not available"),
        }
    }
}

/// Flash-backed key/value device.
///
/// Last write wins. No transactional guarantee is assumed.
pub trait SettingsStorage {
    /// Read a slot into `buf`. `Ok(false)` means the slot was never written.
    fn read(&mut self, slot: &str, buf: &mut [u8; SETTINGS_SIZE]) -> Result<bool, StorageError>;

    fn write(&mut self, slot: &str, bytes: &[u8; SETTINGS_SIZE]) -> Result<(), StorageError>;
}

/// Where the settings handed out by [`ConfigStore::load`] came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadResult {
    /// Stored record was valid and is used as is.
    Stored,
    /// Nothing stored yet, defaults computed.
    FreshInstall,
    /// Stored record failed validation, defaults computed.
    Invalid,
    /// Device error, defaults computed.
    ReadFailed(StorageError),
}

impl LoadResult {
    pub fn used_defaults(&self) -> bool {
        !matches!(self, LoadResult::Stored)
    }
}

/// Loads and saves [`Settings`] in one fixed slot.
pub struct ConfigStore<'a> {
    storage: &'a mut dyn SettingsStorage,
}

impl<'a> ConfigStore<'a> {
    pub fn new(storage: &'a mut dyn SettingsStorage) -> Self {
        Self { storage }
    }

    /// Load settings; always returns a valid record.
    pub fn load(&mut self) -> Settings {
        self.load_with_result().0
    }

    /// Load settings and report where they came from.
    pub fn load_with_result(&mut self) -> (Settings, LoadResult) {
        let mut buf = [0u8; SETTINGS_SIZE];
        let result = match self.storage.read(SETTINGS_SLOT, &mut buf) {
            Ok(false) => LoadResult::FreshInstall,
            Ok(true) => {
                let stored = Settings::from_bytes(&buf);
                if stored.is_valid() {
                    return (stored, LoadResult::Stored);
                }
                LoadResult::Invalid
            }
            Err(e) => LoadResult::ReadFailed(e),
        };
        (Settings::defaults(), result)
    }

    /// Stamp the magic tag and write the record.
    ///
    /// The write is not verified. Callers may log the error but the
    /// operator is never told.
    pub fn save(&mut self, settings: &mut Settings) -> Result<(), StorageError> {
        settings.magic = SETTINGS_MAGIC;
        self.storage.write(SETTINGS_SLOT, &settings.to_bytes())
    }
}

/// RAM-backed slot that starts out like erased flash (all 0xFF).
///
/// Used on hosts and in tests; contents are lost on power cycle.
pub struct MemoryStorage {
    bytes: [u8; SETTINGS_SIZE],
    writes: u32,
}

impl MemoryStorage {
    pub const ERASED: [u8; SETTINGS_SIZE] = [0xFF; SETTINGS_SIZE];

    pub const fn new() -> Self {
        Self::with_bytes(Self::ERASED)
    }

    pub const fn with_bytes(bytes: [u8; SETTINGS_SIZE]) -> Self {
        Self { bytes, writes: 0 }
    }

    pub fn bytes(&self) -> &[u8; SETTINGS_SIZE] {
        &self.bytes
    }

    /// Number of completed writes.
    pub fn writes(&self) -> u32 {
        self.writes
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStorage for MemoryStorage {
    fn read(&mut self, _slot: &str, buf: &mut [u8; SETTINGS_SIZE]) -> Result<bool, StorageError> {
        buf.copy_from_slice(&self.bytes);
        Ok(true)
    }

    fn write(&mut self, _slot: &str, bytes: &[u8; SETTINGS_SIZE]) -> Result<(), StorageError> {
        self.bytes = *bytes;
        self.writes += 1;
        Ok(())
    }
}
