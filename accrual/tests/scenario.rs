//! End-to-end flows through the caller-facing token surface.

use std::sync::{Arc, Mutex};

use accrue_accrual::{AccessControl, AccrualEngine, AccrualError, AccrualEvent, InterestToken};
use accrue_nullables::{NullAccrualStore, NullClock};
use accrue_types::{HolderAddress, ProtocolParams, MAX_AMOUNT, PRECISION};

const OWNER: u64 = 1;
const VAULT: u64 = 2;
const ALICE: u64 = 10;
const BOB: u64 = 11;
const CAROL: u64 = 12;

fn addr(n: u64) -> HolderAddress {
    HolderAddress::from_low_u64(n)
}

fn setup(clock: &NullClock) -> InterestToken<&NullClock> {
    let mut token = InterestToken::new(ProtocolParams::default(), addr(OWNER), clock);
    token
        .grant_mint_burn_capability(&addr(OWNER), &addr(VAULT))
        .unwrap();
    token
}

#[test]
fn early_depositor_keeps_higher_rate() {
    let clock = NullClock::new(0);
    let mut token = setup(&clock);
    let initial = token.protocol_rate();

    token.mint(&addr(VAULT), &addr(ALICE), 100 * PRECISION).unwrap();
    token.set_protocol_rate(&addr(OWNER), initial / 2).unwrap();
    token.mint(&addr(VAULT), &addr(BOB), 100 * PRECISION).unwrap();

    clock.advance(86_400);
    let alice = token.balance_of(&addr(ALICE)).unwrap();
    let bob = token.balance_of(&addr(BOB)).unwrap();
    assert!(alice > bob, "early holder should out-earn late holder: {alice} <= {bob}");
    assert_eq!(
        alice - 100 * PRECISION,
        2 * (bob - 100 * PRECISION),
        "interest scales with the locked-in rate"
    );
}

#[test]
fn rejected_rate_increase_reports_both_values() {
    let clock = NullClock::new(0);
    let mut token = setup(&clock);
    let err = token
        .set_protocol_rate(&addr(OWNER), 60_000_000_000)
        .unwrap_err();
    assert_eq!(
        err,
        AccrualError::RateMustNotIncrease {
            current: 50_000_000_000,
            proposed: 60_000_000_000
        }
    );
    assert_eq!(token.protocol_rate(), 50_000_000_000);
    assert_eq!(
        err.to_string(),
        "protocol rate must not increase: current 50000000000, proposed 60000000000"
    );
}

#[test]
fn recipient_chain_propagates_original_rate() {
    let clock = NullClock::new(0);
    let mut token = setup(&clock);
    let initial = token.protocol_rate();
    token.mint(&addr(VAULT), &addr(ALICE), 10 * PRECISION).unwrap();
    token.set_protocol_rate(&addr(OWNER), 0).unwrap();

    clock.advance(100);
    token.transfer(&addr(ALICE), &addr(BOB), PRECISION).unwrap();
    clock.advance(100);
    token.transfer(&addr(BOB), &addr(CAROL), PRECISION / 2).unwrap();

    assert_eq!(token.holder_rate(&addr(BOB)), initial);
    assert_eq!(token.holder_rate(&addr(CAROL)), initial);

    // A later mint to Carol resets her to the live (zero) rate.
    token.mint(&addr(VAULT), &addr(CAROL), 1).unwrap();
    assert_eq!(token.holder_rate(&addr(CAROL)), 0);
}

#[test]
fn rate_changed_notification_is_emitted() {
    let clock = NullClock::new(0);
    let mut token = setup(&clock);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    token.subscribe(Box::new(move |e| {
        if let AccrualEvent::ProtocolRateChanged { new_rate } = e {
            sink.lock().unwrap().push(*new_rate);
        }
    }));

    token.set_protocol_rate(&addr(OWNER), 40_000_000_000).unwrap();
    let _ = token.set_protocol_rate(&addr(OWNER), 45_000_000_000);
    token.set_protocol_rate(&addr(OWNER), 10_000_000_000).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![40_000_000_000, 10_000_000_000]);
}

#[test]
fn failed_transfer_leaves_everything_unchanged() {
    let clock = NullClock::new(0);
    let mut token = setup(&clock);
    token.mint(&addr(VAULT), &addr(ALICE), 5 * PRECISION).unwrap();
    clock.advance(10_000);

    let principal = token.principal_balance_of(&addr(ALICE));
    let supply = token.total_supply();
    let record = token.engine().holder_record(&addr(ALICE));

    let err = token
        .transfer(&addr(ALICE), &addr(BOB), 6 * PRECISION)
        .unwrap_err();
    assert!(matches!(err, AccrualError::InsufficientBalance { .. }));
    assert_eq!(token.principal_balance_of(&addr(ALICE)), principal);
    assert_eq!(token.total_supply(), supply);
    assert_eq!(token.engine().holder_record(&addr(ALICE)), record);
    assert_eq!(token.holder_rate(&addr(BOB)), 0);
}

#[test]
fn withdraw_everything_through_vault() {
    let clock = NullClock::new(1_000);
    let mut token = setup(&clock);
    token.mint(&addr(VAULT), &addr(ALICE), 100 * PRECISION).unwrap();
    clock.advance(1_000);

    let owed = token.balance_of(&addr(ALICE)).unwrap();
    let burned = token.burn(&addr(VAULT), &addr(ALICE), MAX_AMOUNT).unwrap();
    assert_eq!(burned, owed);
    assert_eq!(burned, 100_005_000_000_000_000_000);
    assert_eq!(token.balance_of(&addr(ALICE)).unwrap(), 0);
}

#[test]
fn state_survives_store_round_trip() {
    let clock = NullClock::new(0);
    let mut token = setup(&clock);
    token.mint(&addr(VAULT), &addr(ALICE), 42 * PRECISION).unwrap();
    token.set_protocol_rate(&addr(OWNER), 1_000_000_000).unwrap();
    clock.advance(500);
    token.transfer(&addr(ALICE), &addr(BOB), PRECISION).unwrap();

    let store = NullAccrualStore::new();
    token.engine().save_to_store(&store).unwrap();
    assert_eq!(store.holder_count(), 2);

    let engine = AccrualEngine::load_from_store(&store).unwrap();
    let restored = InterestToken::from_parts(
        engine,
        AccessControl::new(addr(OWNER)),
        ProtocolParams::default(),
        &clock,
    );
    clock.advance(7_200);
    assert_eq!(
        restored.balance_of(&addr(BOB)).unwrap(),
        token.balance_of(&addr(BOB)).unwrap()
    );
    assert_eq!(restored.protocol_rate(), 1_000_000_000);
}
