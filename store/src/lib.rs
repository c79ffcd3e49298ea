//! Abstract storage traits for the Accrue ledger.
//!
//! Every storage backend (in-memory for testing, or an embedding
//! application's own database) implements these traits. The rest of the
//! codebase depends only on the traits.

pub mod accrual;
pub mod error;

pub use accrual::AccrualStore;
pub use error::StoreError;
