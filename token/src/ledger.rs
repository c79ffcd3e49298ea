//! In-memory fungible balance ledger.

use std::collections::HashMap;

use crate::error::TokenError;
use accrue_types::HolderAddress;
use serde::{Deserialize, Serialize};

/// Stored balances, allowances, and total supply.
///
/// Every mutating method validates before it writes, so a returned error
/// always leaves the ledger untouched.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TokenLedger {
    balances: HashMap<HolderAddress, u128>,
    allowances: HashMap<(HolderAddress, HolderAddress), u128>,
    total_supply: u128,
}

/// Saved balances for a set of accounts plus the total supply.
#[derive(Clone, Debug)]
pub struct LedgerCheckpoint {
    balances: Vec<(HolderAddress, u128)>,
    total_supply: u128,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored balance of `account` (zero if never credited).
    pub fn balance_of(&self, account: &HolderAddress) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    pub fn allowance(&self, owner: &HolderAddress, spender: &HolderAddress) -> u128 {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    /// Number of accounts holding a non-zero balance.
    pub fn holder_count(&self) -> usize {
        self.balances.len()
    }

    /// Credit `amount` to `to`, growing the total supply.
    pub fn mint(&mut self, to: &HolderAddress, amount: u128) -> Result<(), TokenError> {
        if to.is_zero() {
            return Err(TokenError::ZeroAddress);
        }
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        let balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        self.total_supply = supply;
        self.set_balance(to, balance);
        Ok(())
    }

    /// Debit `amount` from `from`, shrinking the total supply.
    pub fn burn(&mut self, from: &HolderAddress, amount: u128) -> Result<(), TokenError> {
        if from.is_zero() {
            return Err(TokenError::ZeroAddress);
        }
        let available = self.balance_of(from);
        let balance = available
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientBalance {
                needed: amount,
                available,
            })?;
        self.set_balance(from, balance);
        // Supply is the sum of balances, so it always covers a valid burn.
        self.total_supply -= amount;
        Ok(())
    }

    /// Move `amount` from `from` to `to`.
    pub fn transfer(
        &mut self,
        from: &HolderAddress,
        to: &HolderAddress,
        amount: u128,
    ) -> Result<(), TokenError> {
        if from.is_zero() || to.is_zero() {
            return Err(TokenError::ZeroAddress);
        }
        let available = self.balance_of(from);
        let debited = available
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientBalance {
                needed: amount,
                available,
            })?;
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        self.set_balance(from, debited);
        self.set_balance(to, credited);
        Ok(())
    }

    /// Set the allowance `spender` may move out of `owner`'s balance.
    pub fn approve(
        &mut self,
        owner: &HolderAddress,
        spender: &HolderAddress,
        amount: u128,
    ) -> Result<(), TokenError> {
        if owner.is_zero() || spender.is_zero() {
            return Err(TokenError::ZeroAddress);
        }
        if amount == 0 {
            self.allowances.remove(&(*owner, *spender));
        } else {
            self.allowances.insert((*owner, *spender), amount);
        }
        Ok(())
    }

    /// Move `amount` from `from` to `to` on behalf of `spender`, spending its
    /// allowance. An allowance of `u128::MAX` is unlimited and never shrinks.
    pub fn transfer_from(
        &mut self,
        spender: &HolderAddress,
        from: &HolderAddress,
        to: &HolderAddress,
        amount: u128,
    ) -> Result<(), TokenError> {
        let allowed = self.allowance(from, spender);
        if allowed < amount {
            return Err(TokenError::InsufficientAllowance {
                spender: *spender,
                needed: amount,
                available: allowed,
            });
        }
        self.transfer(from, to, amount)?;
        if allowed != u128::MAX {
            let remaining = allowed - amount;
            if remaining == 0 {
                self.allowances.remove(&(*from, *spender));
            } else {
                self.allowances.insert((*from, *spender), remaining);
            }
        }
        Ok(())
    }

    /// Capture the balances of `accounts` and the total supply.
    pub fn checkpoint<'a>(
        &self,
        accounts: impl IntoIterator<Item = &'a HolderAddress>,
    ) -> LedgerCheckpoint {
        LedgerCheckpoint {
            balances: accounts
                .into_iter()
                .map(|a| (*a, self.balance_of(a)))
                .collect(),
            total_supply: self.total_supply,
        }
    }

    /// Restore a checkpoint taken with [`TokenLedger::checkpoint`].
    ///
    /// Only the checkpointed accounts are rewritten; the caller must cover every
    /// account it touched in between.
    pub fn restore(&mut self, checkpoint: LedgerCheckpoint) {
        for (account, balance) in checkpoint.balances.into_iter().rev() {
            self.set_balance(&account, balance);
        }
        self.total_supply = checkpoint.total_supply;
    }

    fn set_balance(&mut self, account: &HolderAddress, balance: u128) {
        if balance == 0 {
            self.balances.remove(account);
        } else {
            self.balances.insert(*account, balance);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn addr(n: u64) -> HolderAddress {
        HolderAddress::from_low_u64(n)
    }

    #[test]
    fn mint_credits_and_grows_supply() {
        let mut ledger = TokenLedger::new();
        ledger.mint(&addr(1), 500).unwrap();
        ledger.mint(&addr(2), 250).unwrap();
        assert_eq!(ledger.balance_of(&addr(1)), 500);
        assert_eq!(ledger.total_supply(), 750);
        assert_eq!(ledger.holder_count(), 2);
    }

    #[test]
    fn mint_to_zero_address_rejected() {
        let mut ledger = TokenLedger::new();
        assert_eq!(
            ledger.mint(&HolderAddress::ZERO, 1),
            Err(TokenError::ZeroAddress)
        );
        assert_eq!(ledger.total_supply(), 0);
    }

    #[test]
    fn burn_more_than_balance_fails_without_change() {
        let mut ledger = TokenLedger::new();
        ledger.mint(&addr(1), 100).unwrap();
        let err = ledger.burn(&addr(1), 101).unwrap_err();
        assert_eq!(
            err,
            TokenError::InsufficientBalance {
                needed: 101,
                available: 100
            }
        );
        assert_eq!(ledger.balance_of(&addr(1)), 100);
        assert_eq!(ledger.total_supply(), 100);
    }

    #[test]
    fn burn_entire_balance_drops_holder() {
        let mut ledger = TokenLedger::new();
        ledger.mint(&addr(1), 100).unwrap();
        ledger.burn(&addr(1), 100).unwrap();
        assert_eq!(ledger.balance_of(&addr(1)), 0);
        assert_eq!(ledger.holder_count(), 0);
        assert_eq!(ledger.total_supply(), 0);
    }

    #[test]
    fn transfer_moves_exact_amount() {
        let mut ledger = TokenLedger::new();
        ledger.mint(&addr(1), 100).unwrap();
        ledger.transfer(&addr(1), &addr(2), 40).unwrap();
        assert_eq!(ledger.balance_of(&addr(1)), 60);
        assert_eq!(ledger.balance_of(&addr(2)), 40);
        assert_eq!(ledger.total_supply(), 100);
    }

    #[test]
    fn transfer_to_self_is_noop() {
        let mut ledger = TokenLedger::new();
        ledger.mint(&addr(1), 100).unwrap();
        ledger.transfer(&addr(1), &addr(1), 100).unwrap();
        assert_eq!(ledger.balance_of(&addr(1)), 100);
        assert!(ledger.transfer(&addr(1), &addr(1), 101).is_err());
    }

    #[test]
    fn transfer_zero_address_rejected() {
        let mut ledger = TokenLedger::new();
        ledger.mint(&addr(1), 100).unwrap();
        assert_eq!(
            ledger.transfer(&addr(1), &HolderAddress::ZERO, 1),
            Err(TokenError::ZeroAddress)
        );
        assert_eq!(
            ledger.transfer(&HolderAddress::ZERO, &addr(1), 0),
            Err(TokenError::ZeroAddress)
        );
    }

    #[test]
    fn transfer_from_spends_allowance() {
        let mut ledger = TokenLedger::new();
        ledger.mint(&addr(1), 100).unwrap();
        ledger.approve(&addr(1), &addr(9), 60).unwrap();
        ledger.transfer_from(&addr(9), &addr(1), &addr(2), 50).unwrap();
        assert_eq!(ledger.allowance(&addr(1), &addr(9)), 10);
        assert_eq!(ledger.balance_of(&addr(2)), 50);

        let err = ledger
            .transfer_from(&addr(9), &addr(1), &addr(2), 11)
            .unwrap_err();
        assert_eq!(
            err,
            TokenError::InsufficientAllowance {
                spender: addr(9),
                needed: 11,
                available: 10
            }
        );
    }

    #[test]
    fn transfer_from_failed_transfer_keeps_allowance() {
        let mut ledger = TokenLedger::new();
        ledger.mint(&addr(1), 10).unwrap();
        ledger.approve(&addr(1), &addr(9), 50).unwrap();
        assert!(ledger.transfer_from(&addr(9), &addr(1), &addr(2), 20).is_err());
        assert_eq!(ledger.allowance(&addr(1), &addr(9)), 50);
    }

    #[test]
    fn unlimited_allowance_never_shrinks() {
        let mut ledger = TokenLedger::new();
        ledger.mint(&addr(1), 100).unwrap();
        ledger.approve(&addr(1), &addr(9), u128::MAX).unwrap();
        ledger.transfer_from(&addr(9), &addr(1), &addr(2), 70).unwrap();
        assert_eq!(ledger.allowance(&addr(1), &addr(9)), u128::MAX);
    }

    #[test]
    fn checkpoint_restore_rolls_back_touched_accounts() {
        let mut ledger = TokenLedger::new();
        ledger.mint(&addr(1), 100).unwrap();
        let cp = ledger.checkpoint([&addr(1), &addr(2)]);
        ledger.mint(&addr(2), 5).unwrap();
        ledger.transfer(&addr(1), &addr(2), 30).unwrap();
        ledger.restore(cp);
        assert_eq!(ledger.balance_of(&addr(1)), 100);
        assert_eq!(ledger.balance_of(&addr(2)), 0);
        assert_eq!(ledger.total_supply(), 100);
    }

    proptest! {
        #[test]
        fn transfers_conserve_supply(
            minted in 0u128..1_000_000_000,
            moves in proptest::collection::vec((1u64..5, 1u64..5, 0u128..1_000_000), 0..20),
        ) {
            let mut ledger = TokenLedger::new();
            ledger.mint(&addr(1), minted).unwrap();
            for (from, to, amount) in moves {
                let _ = ledger.transfer(&addr(from), &addr(to), amount);
            }
            let sum: u128 = (1..5).map(|n| ledger.balance_of(&addr(n))).sum();
            prop_assert_eq!(sum, ledger.total_supply());
            prop_assert_eq!(sum, minted);
        }
    }
}
