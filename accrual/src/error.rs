//! Accrual errors.

use crate::access::Capability;
use accrue_token::TokenError;
use accrue_types::HolderAddress;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccrualError {
    #[error("protocol rate must not increase: current {current}, proposed {proposed}")]
    RateMustNotIncrease { current: u128, proposed: u128 },

    #[error("insufficient balance: need {needed}, available {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    #[error("insufficient allowance for {spender}: need {needed}, available {available}")]
    InsufficientAllowance {
        spender: HolderAddress,
        needed: u128,
        available: u128,
    },

    #[error("the zero address cannot hold or move balances")]
    ZeroAddress,

    #[error("{caller} lacks the {capability} capability")]
    Unauthorized {
        caller: HolderAddress,
        capability: Capability,
    },

    #[error("arithmetic overflow in accrual computation")]
    Overflow,

    #[error("store error: {0}")]
    Store(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<TokenError> for AccrualError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::InsufficientBalance { needed, available } => {
                Self::InsufficientBalance { needed, available }
            }
            TokenError::InsufficientAllowance {
                spender,
                needed,
                available,
            } => Self::InsufficientAllowance {
                spender,
                needed,
                available,
            },
            TokenError::ZeroAddress => Self::ZeroAddress,
            TokenError::Overflow => Self::Overflow,
        }
    }
}
