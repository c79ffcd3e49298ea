//! Capability gate for restricted operations.
//!
//! One owner may change the protocol rate, grant mint/burn capability, and
//! hand over ownership. Mint and burn require the mint/burn capability; the
//! owner does not hold it implicitly.

use std::collections::HashSet;
use std::fmt;

use crate::error::AccrualError;
use accrue_types::HolderAddress;

/// A restricted capability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Rate changes, capability grants, ownership transfer.
    Owner,
    /// Minting and burning principal.
    MintBurn,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owner => write!(f, "owner"),
            Self::MintBurn => write!(f, "mint/burn"),
        }
    }
}

/// Who holds which capability.
#[derive(Clone, Debug)]
pub struct AccessControl {
    owner: HolderAddress,
    mint_burn: HashSet<HolderAddress>,
}

impl AccessControl {
    pub fn new(owner: HolderAddress) -> Self {
        Self {
            owner,
            mint_burn: HashSet::new(),
        }
    }

    pub fn owner(&self) -> &HolderAddress {
        &self.owner
    }

    pub fn has(&self, account: &HolderAddress, capability: Capability) -> bool {
        match capability {
            Capability::Owner => *account == self.owner,
            Capability::MintBurn => self.mint_burn.contains(account),
        }
    }

    /// Fail with [`AccrualError::Unauthorized`] unless `caller` holds `capability`.
    pub fn require(
        &self,
        caller: &HolderAddress,
        capability: Capability,
    ) -> Result<(), AccrualError> {
        if self.has(caller, capability) {
            return Ok(());
        }
        tracing::warn!(caller = %caller, %capability, "unauthorized call rejected");
        Err(AccrualError::Unauthorized {
            caller: *caller,
            capability,
        })
    }

    /// Returns `false` if `account` already held the capability.
    pub fn grant_mint_burn(&mut self, account: HolderAddress) -> bool {
        self.mint_burn.insert(account)
    }

    /// Replace the owner, returning the previous one.
    pub fn set_owner(&mut self, new_owner: HolderAddress) -> HolderAddress {
        std::mem::replace(&mut self.owner, new_owner)
    }
}
