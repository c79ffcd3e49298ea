//! Fungible balance substrate for the Accrue ledger.
//!
//! Plain stored-balance bookkeeping with no notion of time or interest:
//! - Minting and burning raw balances (tracked in total supply)
//! - Transfers with zero-address and sufficient-balance checks
//! - Allowances for delegated transfers
//! - Checkpoints so a caller can roll back a multi-step operation

pub mod error;
pub mod ledger;

pub use error::TokenError;
pub use ledger::{LedgerCheckpoint, TokenLedger};
