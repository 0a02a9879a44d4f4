//! NVS persistence for the settings record.
//!
//! The whole [`super::Settings`] record is stored as one blob under
//! [`SETTINGS_SLOT`](super::store::SETTINGS_SLOT) in namespace
//! [`NVS_NAMESPACE`]. The record's magic tag doubles as its schema stamp:
//! a blob with a foreign tag is simply replaced by defaults on load.

use super::store::{SettingsStorage, StorageError};
use super::SETTINGS_SIZE;

#[cfg(target_os = "espidf")]
use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};
#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::EspError;

#[cfg(target_os = "espidf")]
use alloc::string::ToString;

/// NVS namespace for terminal settings
pub const NVS_NAMESPACE: &str = "vgaterm";

#[cfg(target_os = "espidf")]
impl From<EspError> for StorageError {
    fn from(e: EspError) -> Self {
        StorageError::Io(e.to_string())
    }
}

/// Settings slot in the default NVS partition.
#[cfg(target_os = "espidf")]
pub struct NvsStorage {
    nvs: EspNvs<NvsDefault>,
}

#[cfg(target_os = "espidf")]
impl NvsStorage {
    /// Open the namespace read-write on the default partition.
    pub fn take() -> Result<Self, StorageError> {
        let partition = EspDefaultNvsPartition::take()?;
        let nvs = EspNvs::new(partition, NVS_NAMESPACE, true)?;
        Ok(Self { nvs })
    }
}

#[cfg(target_os = "espidf")]
impl SettingsStorage for NvsStorage {
    fn read(&mut self, slot: &str, buf: &mut [u8; SETTINGS_SIZE]) -> Result<bool, StorageError> {
        let mut raw = [0u8; SETTINGS_SIZE];
        match self.nvs.get_blob(slot, &mut raw)? {
            None => Ok(false),
            Some(blob) if blob.len() == SETTINGS_SIZE => {
                buf.copy_from_slice(blob);
                Ok(true)
            }
            Some(blob) => Err(StorageError::BadLength(blob.len())),
        }
    }

    fn write(&mut self, slot: &str, bytes: &[u8; SETTINGS_SIZE]) -> Result<(), StorageError> {
        self.nvs.set_blob(slot, bytes)?;
        Ok(())
    }
}

/// Stub for non-ESP platforms
#[cfg(not(target_os = "espidf"))]
pub struct NvsStorage;

#[cfg(not(target_os = "espidf"))]
impl NvsStorage {
    pub fn take() -> Result<Self, StorageError> {
        Err(StorageError::NotAvailable)
    }
}

#[cfg(not(target_os = "espidf"))]
impl SettingsStorage for NvsStorage {
    fn read(&mut self, _slot: &str, _buf: &mut [u8; SETTINGS_SIZE]) -> Result<bool, StorageError> {
        Err(StorageError::NotAvailable)
    }

    fn write(&mut self, _slot: &str, _bytes: &[u8; SETTINGS_SIZE]) -> Result<(), StorageError> {
        Err(StorageError::NotAvailable)
    }
}
