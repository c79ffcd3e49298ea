//! Core accrual engine.

use std::collections::HashMap;

use crate::error::AccrualError;
use crate::event::{AccrualEvent, EventBus};
use crate::state::HolderRecord;
use accrue_store::AccrualStore;
use accrue_token::TokenLedger;
use accrue_types::{HolderAddress, ProtocolParams, Timestamp, DEFAULT_INITIAL_RATE, MAX_AMOUNT};
use tracing::{debug, info, warn};

const META_PROTOCOL_RATE: &[u8] = b"protocol_rate";
const META_LEDGER: &[u8] = b"ledger";

/// The accrual engine. Settles interest, assigns locked-in rates, and guards the protocol rate.
///
/// Every balance-changing entry point runs through [`AccrualEngine::with_settlement`]:
/// affected holders are settled first, then the change is applied, and any
/// failure restores the pre-call state.
pub struct AccrualEngine {
    protocol_rate: u128,
    holders: HashMap<HolderAddress, HolderRecord>,
    ledger: TokenLedger,
    events: EventBus,
    /// Events raised by the operation in flight, delivered on success.
    pending: Vec<AccrualEvent>,
}

impl AccrualEngine {
    /// Create an engine with an explicit genesis protocol rate.
    pub fn new(initial_rate: u128) -> Self {
        Self {
            protocol_rate: initial_rate,
            holders: HashMap::new(),
            ledger: TokenLedger::new(),
            events: EventBus::new(),
            pending: Vec::new(),
        }
    }

    pub fn with_params(params: &ProtocolParams) -> Self {
        Self::new(params.initial_rate)
    }

    /// The current protocol rate.
    pub fn protocol_rate(&self) -> u128 {
        self.protocol_rate
    }

    /// A holder's record, or the default record if it was never settled.
    pub fn holder_record(&self, holder: &HolderAddress) -> HolderRecord {
        self.holders.get(holder).copied().unwrap_or_default()
    }

    /// A holder's locked-in rate.
    pub fn holder_rate(&self, holder: &HolderAddress) -> u128 {
        self.holder_record(holder).locked_rate
    }

    /// Every holder that has been settled at least once.
    pub fn holders(&self) -> impl Iterator<Item = (&HolderAddress, &HolderRecord)> {
        self.holders.iter()
    }

    /// Raw stored principal, excluding interest not yet settled.
    pub fn principal_balance_of(&self, holder: &HolderAddress) -> u128 {
        self.ledger.balance_of(holder)
    }

    /// Principal plus interest accrued since the holder's last settlement.
    ///
    /// `principal × (PRECISION + locked_rate × (now − last_synced)) / PRECISION`
    pub fn balance_of(&self, holder: &HolderAddress, now: Timestamp) -> Result<u128, AccrualError> {
        self.holder_record(holder)
            .accrued_balance_checked(self.ledger.balance_of(holder), now)
            .ok_or(AccrualError::Overflow)
    }

    /// Sum of settled principal. Unsettled interest is not counted.
    pub fn total_supply(&self) -> u128 {
        self.ledger.total_supply()
    }

    pub fn allowance(&self, owner: &HolderAddress, spender: &HolderAddress) -> u128 {
        self.ledger.allowance(owner, spender)
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&AccrualEvent) + Send + Sync>) {
        self.events.subscribe(listener);
    }

    /// Deliver an event immediately, outside any settled operation.
    pub(crate) fn emit(&self, event: AccrualEvent) {
        self.events.emit(&event);
    }

    /// Lower (or keep) the protocol rate. Raising it fails and changes nothing.
    ///
    /// Setting the current rate again is accepted and still emits
    /// [`AccrualEvent::ProtocolRateChanged`]. Existing holders keep their
    /// locked-in rates.
    pub fn set_protocol_rate(&mut self, new_rate: u128) -> Result<(), AccrualError> {
        if new_rate > self.protocol_rate {
            warn!(
                current = self.protocol_rate,
                proposed = new_rate,
                "rejected protocol rate increase"
            );
            return Err(AccrualError::RateMustNotIncrease {
                current: self.protocol_rate,
                proposed: new_rate,
            });
        }
        info!(previous = self.protocol_rate, new_rate, "protocol rate changed");
        self.protocol_rate = new_rate;
        self.emit(AccrualEvent::ProtocolRateChanged { new_rate });
        Ok(())
    }

    /// Mint `amount` of principal to `to`, refreshing its rate to the current
    /// protocol rate regardless of its prior balance.
    pub fn mint(
        &mut self,
        to: &HolderAddress,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), AccrualError> {
        self.with_settlement(&[*to], now, |engine| {
            let rate = engine.protocol_rate;
            engine.lock_rate(to, rate);
            engine.ledger.mint(to, amount)?;
            debug!(to = %to, amount, locked_rate = rate, "minted");
            engine.pending.push(AccrualEvent::Minted {
                to: *to,
                amount,
                locked_rate: rate,
            });
            Ok(())
        })
    }

    /// Burn `amount` of `from`'s settled balance. [`MAX_AMOUNT`] burns all of it.
    ///
    /// Returns the amount actually burned.
    pub fn burn(
        &mut self,
        from: &HolderAddress,
        amount: u128,
        now: Timestamp,
    ) -> Result<u128, AccrualError> {
        self.with_settlement(&[*from], now, |engine| {
            let amount = engine.resolve_amount(from, amount);
            engine.ledger.burn(from, amount)?;
            debug!(from = %from, amount, "burned");
            engine.pending.push(AccrualEvent::Burned {
                from: *from,
                amount,
            });
            Ok(amount)
        })
    }

    /// Move `amount` from `from` to `to`. [`MAX_AMOUNT`] moves the sender's
    /// whole settled balance. Returns the amount moved.
    pub fn transfer(
        &mut self,
        from: &HolderAddress,
        to: &HolderAddress,
        amount: u128,
        now: Timestamp,
    ) -> Result<u128, AccrualError> {
        self.with_settlement(&[*from, *to], now, |engine| {
            engine.move_settled(None, from, to, amount)
        })
    }

    /// Like [`AccrualEngine::transfer`], spending `spender`'s allowance on `from`.
    pub fn transfer_from(
        &mut self,
        spender: &HolderAddress,
        from: &HolderAddress,
        to: &HolderAddress,
        amount: u128,
        now: Timestamp,
    ) -> Result<u128, AccrualError> {
        self.with_settlement(&[*from, *to], now, |engine| {
            engine.move_settled(Some(spender), from, to, amount)
        })
    }

    /// Set the allowance `spender` may move out of `owner`'s balance.
    pub fn approve(
        &mut self,
        owner: &HolderAddress,
        spender: &HolderAddress,
        amount: u128,
    ) -> Result<(), AccrualError> {
        self.ledger.approve(owner, spender, amount)?;
        self.emit(AccrualEvent::Approved {
            owner: *owner,
            spender: *spender,
            amount,
        });
        Ok(())
    }

    /// Settle every holder in `affected` (in order), then run `op`.
    ///
    /// All-or-nothing: if settlement or `op` fails, holder records, balances
    /// and total supply of the affected holders are restored and the events
    /// raised so far are discarded. `op` must only touch balances of
    /// `affected` holders.
    fn with_settlement<T>(
        &mut self,
        affected: &[HolderAddress],
        now: Timestamp,
        op: impl FnOnce(&mut Self) -> Result<T, AccrualError>,
    ) -> Result<T, AccrualError> {
        let saved_records: Vec<(HolderAddress, Option<HolderRecord>)> = affected
            .iter()
            .map(|h| (*h, self.holders.get(h).copied()))
            .collect();
        let saved_ledger = self.ledger.checkpoint(affected);

        let result = affected
            .iter()
            .try_for_each(|h| self.settle(h, now).map(drop))
            .and_then(|()| op(self));

        match result {
            Ok(value) => {
                let events = std::mem::take(&mut self.pending);
                for event in &events {
                    self.events.emit(event);
                }
                Ok(value)
            }
            Err(e) => {
                for (holder, record) in saved_records.into_iter().rev() {
                    match record {
                        Some(r) => self.holders.insert(holder, r),
                        None => self.holders.remove(&holder),
                    };
                }
                self.ledger.restore(saved_ledger);
                self.pending.clear();
                debug!(error = %e, "operation rolled back");
                Err(e)
            }
        }
    }

    /// Materialize `holder`'s accrued interest into principal and mark it synced
    /// at `now`. Returns the interest minted. Idempotent within one instant.
    fn settle(&mut self, holder: &HolderAddress, now: Timestamp) -> Result<u128, AccrualError> {
        let record = self.holder_record(holder);
        let principal = self.ledger.balance_of(holder);
        let current = record
            .accrued_balance_checked(principal, now)
            .ok_or(AccrualError::Overflow)?;
        let interest = current.saturating_sub(principal);
        if interest > 0 {
            self.ledger.mint(holder, interest)?;
            debug!(holder = %holder, interest, at = now.as_secs(), "settled accrued interest");
            self.pending.push(AccrualEvent::InterestAccrued {
                holder: *holder,
                amount: interest,
                at: now,
            });
        }
        // The sync point never moves backward.
        let last_synced = record.last_synced.max(now);
        self.holders.insert(
            *holder,
            HolderRecord {
                last_synced,
                ..record
            },
        );
        Ok(interest)
    }

    /// Transfer between two already-settled holders, applying rate inheritance.
    fn move_settled(
        &mut self,
        spender: Option<&HolderAddress>,
        from: &HolderAddress,
        to: &HolderAddress,
        amount: u128,
    ) -> Result<u128, AccrualError> {
        let amount = self.resolve_amount(from, amount);
        if self.ledger.balance_of(to) == 0 {
            let rate = self.holder_rate(from);
            self.lock_rate(to, rate);
            self.pending.push(AccrualEvent::RateInherited {
                holder: *to,
                from: *from,
                rate,
            });
        }
        match spender {
            Some(spender) => self.ledger.transfer_from(spender, from, to, amount)?,
            None => self.ledger.transfer(from, to, amount)?,
        }
        debug!(from = %from, to = %to, amount, "transferred");
        self.pending.push(AccrualEvent::Transferred {
            from: *from,
            to: *to,
            amount,
        });
        Ok(amount)
    }

    /// Substitute the holder's full settled balance for [`MAX_AMOUNT`].
    fn resolve_amount(&self, holder: &HolderAddress, amount: u128) -> u128 {
        if amount == MAX_AMOUNT {
            self.ledger.balance_of(holder)
        } else {
            amount
        }
    }

    fn lock_rate(&mut self, holder: &HolderAddress, rate: u128) {
        self.holders.entry(*holder).or_default().locked_rate = rate;
    }
}

impl AccrualEngine {
    /// Persist all engine state to an accrual store.
    pub fn save_to_store(&self, store: &dyn AccrualStore) -> Result<(), AccrualError> {
        store
            .put_meta(META_PROTOCOL_RATE, &self.protocol_rate.to_be_bytes())
            .map_err(|e| AccrualError::Store(e.to_string()))?;

        let ledger_bytes =
            bincode::serialize(&self.ledger).map_err(|e| AccrualError::Serialization(e.to_string()))?;
        store
            .put_meta(META_LEDGER, &ledger_bytes)
            .map_err(|e| AccrualError::Store(e.to_string()))?;

        for (holder, record) in &self.holders {
            let bytes =
                bincode::serialize(record).map_err(|e| AccrualError::Serialization(e.to_string()))?;
            store
                .put_holder_record(holder, &bytes)
                .map_err(|e| AccrualError::Store(e.to_string()))?;
        }
        debug!(holders = self.holders.len(), "engine state saved");
        Ok(())
    }

    /// Restore engine state from an accrual store.
    ///
    /// A store without a saved rate starts at [`DEFAULT_INITIAL_RATE`].
    /// Event subscribers are not persisted.
    pub fn load_from_store(store: &dyn AccrualStore) -> Result<Self, AccrualError> {
        let protocol_rate = match store
            .get_meta(META_PROTOCOL_RATE)
            .map_err(|e| AccrualError::Store(e.to_string()))?
        {
            Some(bytes) => {
                let raw: [u8; 16] = bytes.as_slice().try_into().map_err(|_| {
                    AccrualError::Serialization(format!(
                        "protocol rate must be 16 bytes, got {}",
                        bytes.len()
                    ))
                })?;
                u128::from_be_bytes(raw)
            }
            None => DEFAULT_INITIAL_RATE,
        };

        let ledger = match store
            .get_meta(META_LEDGER)
            .map_err(|e| AccrualError::Store(e.to_string()))?
        {
            Some(bytes) => bincode::deserialize(&bytes)
                .map_err(|e| AccrualError::Serialization(e.to_string()))?,
            None => TokenLedger::new(),
        };

        let entries = store
            .iter_holder_records()
            .map_err(|e| AccrualError::Store(e.to_string()))?;
        let mut holders = HashMap::with_capacity(entries.len());
        for (holder, bytes) in entries {
            let record: HolderRecord = bincode::deserialize(&bytes)
                .map_err(|e| AccrualError::Serialization(e.to_string()))?;
            holders.insert(holder, record);
        }
        debug!(holders = holders.len(), protocol_rate, "engine state loaded");

        Ok(Self {
            protocol_rate,
            holders,
            ledger,
            events: EventBus::new(),
            pending: Vec::new(),
        })
    }
}

impl Default for AccrualEngine {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_RATE)
    }
}
