#![no_main]

use libfuzzer_sys::fuzz_target;

use accrue_types::mul_div;

// Wide multiply-divide must never panic and must agree with u128 arithmetic
// whenever the product fits.
fuzz_target!(|input: (u128, u128, u128)| {
    let (a, b, denom) = input;
    let wide = mul_div(a, b, denom);
    if denom == 0 {
        assert!(wide.is_none());
        return;
    }
    if let Some(product) = a.checked_mul(b) {
        assert_eq!(wide, Some(product / denom));
    }
});
