//! Nullable store: thread-safe in-memory storage for testing.

use accrue_store::{AccrualStore, StoreError};
use accrue_types::HolderAddress;
use std::collections::HashMap;
use std::sync::Mutex;

/// An in-memory accrual store for testing.
#[derive(Default)]
pub struct NullAccrualStore {
    holders: Mutex<HashMap<HolderAddress, Vec<u8>>>,
    meta: Mutex<HashMap<Vec<u8>, Vec<u8>>>,
}

impl NullAccrualStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted holder records.
    pub fn holder_count(&self) -> usize {
        self.holders.lock().map_or(0, |h| h.len())
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Backend("null store lock poisoned".to_string())
}

impl AccrualStore for NullAccrualStore {
    fn get_holder_record(&self, holder: &HolderAddress) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.holders.lock().map_err(poisoned)?.get(holder).cloned())
    }

    fn put_holder_record(&self, holder: &HolderAddress, record: &[u8]) -> Result<(), StoreError> {
        self.holders
            .lock()
            .map_err(poisoned)?
            .insert(*holder, record.to_vec());
        Ok(())
    }

    fn iter_holder_records(&self) -> Result<Vec<(HolderAddress, Vec<u8>)>, StoreError> {
        Ok(self
            .holders
            .lock()
            .map_err(poisoned)?
            .iter()
            .map(|(k, v)| (*k, v.clone()))
            .collect())
    }

    fn get_meta(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.meta.lock().map_err(poisoned)?.get(key).cloned())
    }

    fn put_meta(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.meta
            .lock()
            .map_err(poisoned)?
            .insert(key.to_vec(), value.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_holder_record() {
        let store = NullAccrualStore::new();
        let addr = HolderAddress::from_low_u64(1);
        store.put_holder_record(&addr, b"record").unwrap();
        assert_eq!(store.get_holder_record(&addr).unwrap(), Some(b"record".to_vec()));
        assert_eq!(store.holder_count(), 1);
    }

    #[test]
    fn test_missing_holder_is_none() {
        let store = NullAccrualStore::new();
        let addr = HolderAddress::from_low_u64(2);
        assert_eq!(store.get_holder_record(&addr).unwrap(), None);
    }

    #[test]
    fn test_meta_overwrite() {
        let store = NullAccrualStore::new();
        store.put_meta(b"k", b"one").unwrap();
        store.put_meta(b"k", b"two").unwrap();
        assert_eq!(store.get_meta(b"k").unwrap(), Some(b"two".to_vec()));
        assert_eq!(store.get_meta(b"other").unwrap(), None);
    }
}
