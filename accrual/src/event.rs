//! Events emitted by the engine for subscribers.

use crate::access::Capability;
use accrue_types::{HolderAddress, Timestamp};

/// Engine-level events that observers can subscribe to via the [`EventBus`].
///
/// Events raised inside a settled operation are delivered only once the whole
/// operation has succeeded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccrualEvent {
    /// The protocol rate was set.
    ProtocolRateChanged { new_rate: u128 },
    /// Accrued interest was materialized into a holder's principal.
    InterestAccrued {
        holder: HolderAddress,
        amount: u128,
        at: Timestamp,
    },
    /// New principal was minted and the holder's rate refreshed.
    Minted {
        to: HolderAddress,
        amount: u128,
        locked_rate: u128,
    },
    /// Principal was burned.
    Burned { from: HolderAddress, amount: u128 },
    /// Principal moved between holders.
    Transferred {
        from: HolderAddress,
        to: HolderAddress,
        amount: u128,
    },
    /// A zero-balance recipient took over the sender's locked-in rate.
    RateInherited {
        holder: HolderAddress,
        from: HolderAddress,
        rate: u128,
    },
    /// An allowance was set.
    Approved {
        owner: HolderAddress,
        spender: HolderAddress,
        amount: u128,
    },
    /// A capability was granted to an account.
    CapabilityGranted {
        account: HolderAddress,
        capability: Capability,
    },
    /// The owner role moved to a new account.
    OwnershipTransferred {
        previous: HolderAddress,
        new_owner: HolderAddress,
    },
}

/// Synchronous fan-out event bus.
///
/// Listeners are invoked inline on the emitting thread; keep handlers fast.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&AccrualEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&AccrualEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &AccrualEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
