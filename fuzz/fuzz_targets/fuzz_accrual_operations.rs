#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use accrue_accrual::AccrualEngine;
use accrue_types::{HolderAddress, Timestamp, MAX_AMOUNT};

#[derive(Arbitrary, Debug)]
enum Op {
    SetRate(u64),
    Mint { to: u8, amount: u128 },
    Burn { from: u8, amount: u128, all: bool },
    Transfer { from: u8, to: u8, amount: u128, all: bool },
    Approve { owner: u8, spender: u8, amount: u128 },
    TransferFrom { spender: u8, from: u8, to: u8, amount: u128 },
}

#[derive(Arbitrary, Debug)]
struct Input {
    initial_rate: u64,
    steps: Vec<(u32, Op)>,
}

fn holder(n: u8) -> HolderAddress {
    // Small address space so operations collide; 0 is the zero address.
    HolderAddress::from_low_u64(u64::from(n % 6))
}

// Drive the engine with arbitrary operations. It must never panic, the rate
// must never rise, and supply must always equal the sum of principals.
fuzz_target!(|input: Input| {
    let mut engine = AccrualEngine::new(u128::from(input.initial_rate));
    let mut now = 0u64;

    for (dt, op) in input.steps {
        now = now.saturating_add(u64::from(dt));
        let at = Timestamp::new(now);
        let rate_before = engine.protocol_rate();

        let _ = match op {
            Op::SetRate(rate) => engine.set_protocol_rate(u128::from(rate)),
            Op::Mint { to, amount } => engine.mint(&holder(to), amount, at),
            Op::Burn { from, amount, all } => {
                let amount = if all { MAX_AMOUNT } else { amount };
                engine.burn(&holder(from), amount, at).map(|_| ())
            }
            Op::Transfer { from, to, amount, all } => {
                let amount = if all { MAX_AMOUNT } else { amount };
                engine.transfer(&holder(from), &holder(to), amount, at).map(|_| ())
            }
            Op::Approve { owner, spender, amount } => {
                engine.approve(&holder(owner), &holder(spender), amount)
            }
            Op::TransferFrom { spender, from, to, amount } => engine
                .transfer_from(&holder(spender), &holder(from), &holder(to), amount, at)
                .map(|_| ()),
        };

        assert!(engine.protocol_rate() <= rate_before);
        let principals: u128 = (0..6u8)
            .map(|n| engine.principal_balance_of(&holder(n)))
            .sum();
        assert_eq!(principals, engine.total_supply());
        for n in 0..6u8 {
            let _ = engine.balance_of(&holder(n), at);
        }
    }
});
