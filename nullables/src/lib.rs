//! Nullable infrastructure for deterministic testing.
//!
//! External dependencies of the ledger (clock, storage) are abstracted behind
//! traits. This crate provides implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem
//!
//! Usage: swap real implementations for nullables in tests and scenario replay.

pub mod clock;
pub mod store;

pub use clock::NullClock;
pub use store::NullAccrualStore;
