//! Caller-facing token surface over the accrual engine.
//!
//! Adds capability checks and reads the clock exactly once per operation.

use crate::access::{AccessControl, Capability};
use crate::engine::AccrualEngine;
use crate::error::AccrualError;
use crate::event::AccrualEvent;
use accrue_types::{Clock, HolderAddress, ProtocolParams};
use tracing::info;

/// An interest-bearing token: engine, capabilities, metadata, and a clock.
pub struct InterestToken<C> {
    engine: AccrualEngine,
    access: AccessControl,
    params: ProtocolParams,
    clock: C,
}

impl<C: Clock> InterestToken<C> {
    /// Create a token at genesis, owned by `owner`.
    pub fn new(params: ProtocolParams, owner: HolderAddress, clock: C) -> Self {
        let engine = AccrualEngine::with_params(&params);
        Self::from_parts(engine, AccessControl::new(owner), params, clock)
    }

    /// Assemble a token around an existing engine (e.g. one loaded from a store).
    pub fn from_parts(
        engine: AccrualEngine,
        access: AccessControl,
        params: ProtocolParams,
        clock: C,
    ) -> Self {
        Self {
            engine,
            access,
            params,
            clock,
        }
    }

    pub fn engine(&self) -> &AccrualEngine {
        &self.engine
    }

    pub fn access(&self) -> &AccessControl {
        &self.access
    }

    /// Token name, symbol, decimals and genesis rate.
    pub fn metadata(&self) -> &ProtocolParams {
        &self.params
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&AccrualEvent) + Send + Sync>) {
        self.engine.subscribe(listener);
    }

    // ── Owner operations ─────────────────────────────────────────────────

    pub fn set_protocol_rate(
        &mut self,
        caller: &HolderAddress,
        new_rate: u128,
    ) -> Result<(), AccrualError> {
        self.access.require(caller, Capability::Owner)?;
        self.engine.set_protocol_rate(new_rate)
    }

    pub fn grant_mint_burn_capability(
        &mut self,
        caller: &HolderAddress,
        account: &HolderAddress,
    ) -> Result<(), AccrualError> {
        self.access.require(caller, Capability::Owner)?;
        if self.access.grant_mint_burn(*account) {
            info!(account = %account, "mint/burn capability granted");
            self.engine.emit(AccrualEvent::CapabilityGranted {
                account: *account,
                capability: Capability::MintBurn,
            });
        }
        Ok(())
    }

    pub fn transfer_ownership(
        &mut self,
        caller: &HolderAddress,
        new_owner: &HolderAddress,
    ) -> Result<(), AccrualError> {
        self.access.require(caller, Capability::Owner)?;
        if new_owner.is_zero() {
            return Err(AccrualError::ZeroAddress);
        }
        let previous = self.access.set_owner(*new_owner);
        info!(previous = %previous, new_owner = %new_owner, "ownership transferred");
        self.engine.emit(AccrualEvent::OwnershipTransferred {
            previous,
            new_owner: *new_owner,
        });
        Ok(())
    }

    // ── Mint / burn (capability holders) ─────────────────────────────────

    pub fn mint(
        &mut self,
        caller: &HolderAddress,
        to: &HolderAddress,
        amount: u128,
    ) -> Result<(), AccrualError> {
        self.access.require(caller, Capability::MintBurn)?;
        let now = self.clock.now();
        self.engine.mint(to, amount, now)
    }

    /// Returns the amount burned (the whole balance for `MAX_AMOUNT`).
    pub fn burn(
        &mut self,
        caller: &HolderAddress,
        from: &HolderAddress,
        amount: u128,
    ) -> Result<u128, AccrualError> {
        self.access.require(caller, Capability::MintBurn)?;
        let now = self.clock.now();
        self.engine.burn(from, amount, now)
    }

    // ── Holder operations ────────────────────────────────────────────────

    pub fn transfer(
        &mut self,
        caller: &HolderAddress,
        to: &HolderAddress,
        amount: u128,
    ) -> Result<bool, AccrualError> {
        let now = self.clock.now();
        self.engine.transfer(caller, to, amount, now)?;
        Ok(true)
    }

    pub fn transfer_from(
        &mut self,
        caller: &HolderAddress,
        from: &HolderAddress,
        to: &HolderAddress,
        amount: u128,
    ) -> Result<bool, AccrualError> {
        let now = self.clock.now();
        self.engine.transfer_from(caller, from, to, amount, now)?;
        Ok(true)
    }

    pub fn approve(
        &mut self,
        caller: &HolderAddress,
        spender: &HolderAddress,
        amount: u128,
    ) -> Result<bool, AccrualError> {
        self.engine.approve(caller, spender, amount)?;
        Ok(true)
    }

    // ── Reads ────────────────────────────────────────────────────────────

    /// Balance including interest accrued up to the clock's current time.
    pub fn balance_of(&self, holder: &HolderAddress) -> Result<u128, AccrualError> {
        self.engine.balance_of(holder, self.clock.now())
    }

    pub fn principal_balance_of(&self, holder: &HolderAddress) -> u128 {
        self.engine.principal_balance_of(holder)
    }

    pub fn allowance(&self, owner: &HolderAddress, spender: &HolderAddress) -> u128 {
        self.engine.allowance(owner, spender)
    }

    pub fn protocol_rate(&self) -> u128 {
        self.engine.protocol_rate()
    }

    pub fn holder_rate(&self, holder: &HolderAddress) -> u128 {
        self.engine.holder_rate(holder)
    }

    pub fn total_supply(&self) -> u128 {
        self.engine.total_supply()
    }
}
