//! Protocol parameters: the genesis interest rate and token metadata.

use crate::amount::PRECISION;
use serde::{Deserialize, Serialize};

/// Default genesis rate: `5 * PRECISION / 10^8` per second (5 × 10^10).
pub const DEFAULT_INITIAL_RATE: u128 = 5 * PRECISION / 100_000_000;

/// Parameters a ledger is created with.
///
/// Only `initial_rate` affects accrual. The protocol rate can be lowered
/// afterwards but never raised above this value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolParams {
    /// Genesis protocol rate, fixed-point per second (scaled by `PRECISION`).
    #[serde(default = "default_initial_rate")]
    pub initial_rate: u128,

    /// Human-readable token name.
    #[serde(default = "default_name")]
    pub name: String,

    /// Ticker symbol.
    #[serde(default = "default_symbol")]
    pub symbol: String,

    /// Display decimals for raw amounts.
    #[serde(default = "default_decimals")]
    pub decimals: u8,
}

fn default_initial_rate() -> u128 {
    DEFAULT_INITIAL_RATE
}

fn default_name() -> String {
    "Accrue Token".to_string()
}

fn default_symbol() -> String {
    "ACR".to_string()
}

fn default_decimals() -> u8 {
    18
}

impl ProtocolParams {
    /// Parameters with a custom genesis rate and default metadata.
    pub fn with_rate(initial_rate: u128) -> Self {
        Self {
            initial_rate,
            ..Self::default()
        }
    }
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self {
            initial_rate: default_initial_rate(),
            name: default_name(),
            symbol: default_symbol(),
            decimals: default_decimals(),
        }
    }
}
