//! Property tests for the settings record.
//!
//! Whatever bytes sit in the slot, `load` hands out a record whose indices
//! select into their tables, and saving that record is a fixed point.

use proptest::prelude::*;

use vga_ansi_terminal::config::{
    ConfigStore, IndexField, MemoryStorage, Settings, BAUD_RATES, KEYBOARDS, SETTINGS_MAGIC,
    SETTINGS_SIZE, VGA_MODES,
};

fn blob() -> impl Strategy<Value = [u8; SETTINGS_SIZE]> {
    prop::array::uniform16(any::<u8>())
}

/// Blobs that carry the magic, so validation reaches the index checks.
fn tagged_blob() -> impl Strategy<Value = [u8; SETTINGS_SIZE]> {
    blob().prop_map(|mut b| {
        b[..4].copy_from_slice(&SETTINGS_MAGIC.to_le_bytes());
        b
    })
}

/// Well-formed records: magic, every index inside its table, flags 0/1.
fn valid_blob() -> impl Strategy<Value = [u8; SETTINGS_SIZE]> {
    (
        0..BAUD_RATES.len() as u8,
        0..VGA_MODES.len() as u8,
        0..KEYBOARDS.len() as u8,
        prop::array::uniform9(any::<bool>()),
    )
        .prop_map(|(baud, vga, kbd, flags)| {
            let mut b = [0u8; SETTINGS_SIZE];
            b[..4].copy_from_slice(&SETTINGS_MAGIC.to_le_bytes());
            b[4] = baud;
            b[5] = vga;
            b[6] = kbd;
            for (slot, flag) in b[7..].iter_mut().zip(flags) {
                *slot = flag as u8;
            }
            b
        })
}

proptest! {
    #[test]
    fn loaded_indices_are_in_range(bytes in prop_oneof![blob(), tagged_blob()]) {
        let mut storage = MemoryStorage::with_bytes(bytes);
        let s = ConfigStore::new(&mut storage).load();

        prop_assert!(s.is_valid());
        for field in IndexField::ALL {
            prop_assert!((field.get(&s) as usize) < field.len());
        }
        // Lookups must not panic
        let _ = (s.vga_mode(), s.baud_rate(), s.keyboard());
    }

    #[test]
    fn save_of_loaded_record_is_idempotent(bytes in prop_oneof![blob(), tagged_blob()]) {
        let mut storage = MemoryStorage::with_bytes(bytes);
        let mut s = ConfigStore::new(&mut storage).load();

        ConfigStore::new(&mut storage).save(&mut s).unwrap();
        let once = *storage.bytes();
        let mut again = ConfigStore::new(&mut storage).load();
        prop_assert_eq!(again, s);

        ConfigStore::new(&mut storage).save(&mut again).unwrap();
        prop_assert_eq!(*storage.bytes(), once);
    }

    #[test]
    fn valid_records_load_unchanged(bytes in valid_blob()) {
        let decoded = Settings::from_bytes(&bytes);
        prop_assert!(decoded.is_valid());

        let mut storage = MemoryStorage::with_bytes(bytes);
        prop_assert_eq!(ConfigStore::new(&mut storage).load(), decoded);
        prop_assert_eq!(*storage.bytes(), bytes);
        prop_assert_eq!(storage.writes(), 0);
    }

    #[test]
    fn index_stepping_stays_in_range(steps in prop::collection::vec(any::<bool>(), 0..40)) {
        let mut s = Settings::defaults();
        for forward in steps {
            for field in IndexField::ALL {
                if forward { field.advance(&mut s) } else { field.retreat(&mut s) }
            }
            prop_assert!(s.is_valid());
        }
    }
}
