//! Fundamental types for the Accrue ledger.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! holder addresses, timestamps and clocks, fixed-point amount helpers, and the
//! protocol parameters.

pub mod address;
pub mod amount;
pub mod error;
pub mod params;
pub mod time;

pub use address::HolderAddress;
pub use amount::{format_amount, mul_div, parse_amount, MAX_AMOUNT, PRECISION};
pub use error::TypesError;
pub use params::{ProtocolParams, DEFAULT_INITIAL_RATE};
pub use time::{Clock, SystemClock, Timestamp};
