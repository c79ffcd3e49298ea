//! Substrate errors.

use accrue_types::HolderAddress;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    #[error("insufficient allowance for {spender}: need {needed}, have {available}")]
    InsufficientAllowance {
        spender: HolderAddress,
        needed: u128,
        available: u128,
    },

    #[error("the zero address cannot hold or move balances")]
    ZeroAddress,

    #[error("arithmetic overflow in balance bookkeeping")]
    Overflow,
}
