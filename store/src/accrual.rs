use crate::StoreError;
use accrue_types::HolderAddress;

/// Store trait for persisting accrual engine state to durable storage.
///
/// Uses opaque `Vec<u8>` so the store doesn't depend on the `accrue-accrual`
/// crate. The engine serializes and deserializes its own types.
pub trait AccrualStore {
    fn get_holder_record(&self, holder: &HolderAddress) -> Result<Option<Vec<u8>>, StoreError>;
    fn put_holder_record(&self, holder: &HolderAddress, record: &[u8]) -> Result<(), StoreError>;
    fn iter_holder_records(&self) -> Result<Vec<(HolderAddress, Vec<u8>)>, StoreError>;

    fn get_meta(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;
    fn put_meta(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;
}
