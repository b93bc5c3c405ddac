//! Persisted watchface preferences

mod flash;
mod ram;

pub use flash::{FlashStore, SETTINGS_ADDRESS};
pub use ram::RamStore;

use crate::config::{KEY_DEFAULTS_SET, KEY_SHOW_DATE};

/// Preference store failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// The underlying bus reported an error
    Bus,
    /// The device stayed busy for too long
    Timeout,
    /// No room for another key
    Full,
    /// Stored data is not in a known format
    Corrupt,
}

/// Durable key to boolean store
pub trait KeyValueStore {
    /// Whether a value is stored under `key`
    fn exists(&mut self, key: u32) -> Result<bool, StorageError>;

    /// Value stored under `key`, if any
    fn read_bool(&mut self, key: u32) -> Result<Option<bool>, StorageError>;

    /// Store `value` under `key`
    fn write_bool(&mut self, key: u32, value: bool) -> Result<(), StorageError>;

    /// Store several values at once.
    ///
    /// Stores that can commit all entries in one write override this.
    fn write_bools(&mut self, entries: &[(u32, bool)]) -> Result<(), StorageError> {
        for &(key, value) in entries {
            self.write_bool(key, value)?;
        }
        Ok(())
    }
}

impl<K: KeyValueStore + ?Sized> KeyValueStore for &mut K {
    fn exists(&mut self, key: u32) -> Result<bool, StorageError> {
        (**self).exists(key)
    }

    fn read_bool(&mut self, key: u32) -> Result<Option<bool>, StorageError> {
        (**self).read_bool(key)
    }

    fn write_bool(&mut self, key: u32, value: bool) -> Result<(), StorageError> {
        (**self).write_bool(key, value)
    }

    fn write_bools(&mut self, entries: &[(u32, bool)]) -> Result<(), StorageError> {
        (**self).write_bools(entries)
    }
}

/// Snapshot of the persisted flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PreferenceFlags {
    pub defaults_initialized: bool,
    pub show_date: bool,
}

/// Typed access to the watchface preferences
pub struct Preferences<K> {
    store: K,
}

impl<K: KeyValueStore> Preferences<K> {
    pub fn new(store: K) -> Self {
        Self { store }
    }

    /// Write the first-run defaults unless they are already in place.
    ///
    /// A flag stored without the marker is kept; only the marker is added.
    /// A failed read leaves the store untouched.
    pub fn ensure_defaults(&mut self) -> Result<(), StorageError> {
        let stored = match self.store.exists(KEY_DEFAULTS_SET) {
            Ok(true) => return Ok(()),
            Ok(false) => self.store.read_bool(KEY_SHOW_DATE),
            Err(err) => Err(err),
        };
        match stored {
            Ok(Some(_)) => {
                info!("Marking stored preferences as initialized");
                self.store.write_bool(KEY_DEFAULTS_SET, true)
            }
            Ok(None) => {
                info!("Writing default preferences");
                // Marker last, so an interrupted write is redone on next start
                self.store
                    .write_bools(&[(KEY_SHOW_DATE, true), (KEY_DEFAULTS_SET, true)])
            }
            Err(err) => {
                warn!("Preferences unreadable, defaults not written: {}", err);
                Ok(())
            }
        }
    }

    /// Persisted "show date" flag, `true` when unset or unreadable.
    pub fn show_date(&mut self) -> bool {
        match self.store.read_bool(KEY_SHOW_DATE) {
            Ok(Some(show)) => show,
            Ok(None) => true,
            Err(err) => {
                warn!("Show date flag unreadable: {}", err);
                true
            }
        }
    }

    /// Persist the "show date" flag.
    ///
    /// The marker is written along with it, so a later
    /// [`ensure_defaults`](Self::ensure_defaults) never replaces the choice.
    pub fn set_show_date(&mut self, show: bool) -> Result<(), StorageError> {
        self.store
            .write_bools(&[(KEY_SHOW_DATE, show), (KEY_DEFAULTS_SET, true)])
    }

    /// Both flags as currently stored.
    pub fn flags(&mut self) -> PreferenceFlags {
        PreferenceFlags {
            defaults_initialized: matches!(self.store.read_bool(KEY_DEFAULTS_SET), Ok(Some(true))),
            show_date: self.show_date(),
        }
    }

    /// Give back the underlying store.
    pub fn into_inner(self) -> K {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Store whose every operation fails
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn exists(&mut self, _key: u32) -> Result<bool, StorageError> {
            Err(StorageError::Bus)
        }

        fn read_bool(&mut self, _key: u32) -> Result<Option<bool>, StorageError> {
            Err(StorageError::Bus)
        }

        fn write_bool(&mut self, _key: u32, _value: bool) -> Result<(), StorageError> {
            Err(StorageError::Bus)
        }
    }

    /// RAM store whose first `fail_reads` reads fail
    struct FlakyStore {
        inner: RamStore<4>,
        fail_reads: usize,
    }

    impl FlakyStore {
        fn new(fail_reads: usize) -> Self {
            Self {
                inner: RamStore::new(),
                fail_reads,
            }
        }

        fn read_fails(&mut self) -> bool {
            let fails = self.fail_reads > 0;
            self.fail_reads = self.fail_reads.saturating_sub(1);
            fails
        }
    }

    impl KeyValueStore for FlakyStore {
        fn exists(&mut self, key: u32) -> Result<bool, StorageError> {
            if self.read_fails() {
                return Err(StorageError::Bus);
            }
            self.inner.exists(key)
        }

        fn read_bool(&mut self, key: u32) -> Result<Option<bool>, StorageError> {
            if self.read_fails() {
                return Err(StorageError::Bus);
            }
            self.inner.read_bool(key)
        }

        fn write_bool(&mut self, key: u32, value: bool) -> Result<(), StorageError> {
            self.inner.write_bool(key, value)
        }
    }

    #[test]
    fn test_first_run_writes_defaults() {
        let mut prefs = Preferences::new(RamStore::<4>::new());
        assert_eq!(
            prefs.flags(),
            PreferenceFlags {
                defaults_initialized: false,
                show_date: true,
            }
        );

        prefs.ensure_defaults().unwrap();
        assert_eq!(
            prefs.flags(),
            PreferenceFlags {
                defaults_initialized: true,
                show_date: true,
            }
        );
        let mut store = prefs.into_inner();
        assert_eq!(store.read_bool(KEY_SHOW_DATE), Ok(Some(true)));
    }

    #[test]
    fn test_ensure_defaults_is_idempotent() {
        let mut once = Preferences::new(RamStore::<4>::new());
        once.ensure_defaults().unwrap();

        let mut twice = Preferences::new(RamStore::<4>::new());
        twice.ensure_defaults().unwrap();
        twice.ensure_defaults().unwrap();

        assert_eq!(once.flags(), twice.flags());
        assert_eq!(once.into_inner(), twice.into_inner());
    }

    #[test]
    fn test_ensure_defaults_keeps_user_choice() {
        let mut prefs = Preferences::new(RamStore::<4>::new());
        prefs.ensure_defaults().unwrap();
        prefs.set_show_date(false).unwrap();

        prefs.ensure_defaults().unwrap();
        assert!(!prefs.show_date());
    }

    #[test]
    fn test_show_date_survives_restart() {
        let mut store = RamStore::<4>::new();

        let mut prefs = Preferences::new(&mut store);
        prefs.ensure_defaults().unwrap();
        prefs.set_show_date(false).unwrap();
        assert!(!prefs.show_date());

        // Reload from the same store
        let mut prefs = Preferences::new(&mut store);
        prefs.ensure_defaults().unwrap();
        assert!(!prefs.show_date());
    }

    #[test]
    fn test_unset_flag_reads_true() {
        let mut store = RamStore::<4>::new();
        store.write_bool(KEY_DEFAULTS_SET, true).unwrap();
        assert!(Preferences::new(store).show_date());
    }

    #[test]
    fn test_read_failures_fall_back_to_defaults() {
        let mut prefs = Preferences::new(BrokenStore);
        assert_eq!(prefs.ensure_defaults(), Ok(()));
        assert!(prefs.show_date());
    }

    #[test]
    fn test_write_failure_is_reported() {
        let mut prefs = Preferences::new(BrokenStore);
        assert_eq!(prefs.set_show_date(false), Err(StorageError::Bus));
    }

    #[test]
    fn test_flag_without_marker_is_kept() {
        let mut store = RamStore::<4>::new();
        store.write_bool(KEY_SHOW_DATE, false).unwrap();

        let mut prefs = Preferences::new(store);
        prefs.ensure_defaults().unwrap();
        assert_eq!(
            prefs.flags(),
            PreferenceFlags {
                defaults_initialized: true,
                show_date: false,
            }
        );
    }

    #[test]
    fn test_choice_after_unreadable_marker_is_kept() {
        let mut prefs = Preferences::new(FlakyStore::new(1));
        prefs.ensure_defaults().unwrap();
        assert_eq!(prefs.store.inner.exists(KEY_DEFAULTS_SET), Ok(false));

        prefs.set_show_date(false).unwrap();
        prefs.ensure_defaults().unwrap();
        assert!(!prefs.show_date());
        assert_eq!(prefs.store.inner.read_bool(KEY_DEFAULTS_SET), Ok(Some(true)));
    }
}
