//! Accrual: the interest-bearing balance engine.
//!
//! A holder's balance is a deterministic function of time:
//! `balance(h) = principal(h) × (PRECISION + rate(h) × (t_now − t_synced(h))) / PRECISION`
//!
//! This crate handles:
//! - Balance computation from stored principal and the holder's locked-in rate
//! - Settling accrued interest into principal before every balance change
//! - Rate assignment on mint (refresh) and inbound transfer (inheritance)
//! - The protocol rate, which can only ever be lowered
//! - Capability checks for the caller-facing [`InterestToken`] surface

pub mod access;
pub mod engine;
pub mod error;
pub mod event;
pub mod interest_token;
pub mod state;

pub use access::{AccessControl, Capability};
pub use engine::AccrualEngine;
pub use error::AccrualError;
pub use event::{AccrualEvent, EventBus};
pub use interest_token::InterestToken;
pub use state::HolderRecord;
