//! Volatile preference store

use heapless::FnvIndexMap;

use super::{KeyValueStore, StorageError};

/// Store that keeps its values in RAM only.
///
/// `N` must be a power of two.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RamStore<const N: usize> {
    values: FnvIndexMap<u32, bool, N>,
}

impl<const N: usize> RamStore<N> {
    pub fn new() -> Self {
        Self {
            values: FnvIndexMap::new(),
        }
    }
}

impl<const N: usize> KeyValueStore for RamStore<N> {
    fn exists(&mut self, key: u32) -> Result<bool, StorageError> {
        Ok(self.values.contains_key(&key))
    }

    fn read_bool(&mut self, key: u32) -> Result<Option<bool>, StorageError> {
        Ok(self.values.get(&key).copied())
    }

    fn write_bool(&mut self, key: u32, value: bool) -> Result<(), StorageError> {
        self.values
            .insert(key, value)
            .map(|_| ())
            .map_err(|_| StorageError::Full)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_back() {
        let mut store = RamStore::<2>::new();
        assert_eq!(store.exists(7), Ok(false));
        assert_eq!(store.read_bool(7), Ok(None));

        store.write_bool(7, false).unwrap();
        assert_eq!(store.exists(7), Ok(true));
        assert_eq!(store.read_bool(7), Ok(Some(false)));

        store.write_bool(7, true).unwrap();
        assert_eq!(store.read_bool(7), Ok(Some(true)));
    }

    #[test]
    fn test_full() {
        let mut store = RamStore::<2>::new();
        store.write_bool(1, true).unwrap();
        store.write_bool(2, true).unwrap();
        assert_eq!(store.write_bool(3, true), Err(StorageError::Full));
        // Overwriting an existing key still works
        assert_eq!(store.write_bool(2, false), Ok(()));
    }
}
