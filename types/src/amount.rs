//! Fixed-point amount helpers.
//!
//! Amounts are raw `u128` units. Rates are fixed-point values scaled by
//! [`PRECISION`], so `PRECISION` itself represents a factor of 1.0.

use crate::error::TypesError;

/// Fixed-point scale for rates and growth factors (10^18).
pub const PRECISION: u128 = 1_000_000_000_000_000_000;

/// The largest representable amount. Passed as a burn or transfer amount it
/// means "the holder's entire settled balance".
pub const MAX_AMOUNT: u128 = u128::MAX;

const LOW_MASK: u128 = u64::MAX as u128;

/// Computes `a * b / denom` with a 256-bit intermediate product, truncating.
///
/// Returns `None` if `denom` is zero or the quotient does not fit in `u128`.
pub fn mul_div(a: u128, b: u128, denom: u128) -> Option<u128> {
    if denom == 0 {
        return None;
    }
    if let Some(product) = a.checked_mul(b) {
        return Some(product / denom);
    }

    let (hi, lo) = widening_mul(a, b);
    if hi >= denom {
        return None;
    }

    // Restoring long division of (hi, lo) by denom, one bit at a time.
    // Invariant: rem < denom at the top of every iteration.
    let mut rem = hi;
    let mut quotient: u128 = 0;
    for i in (0..128).rev() {
        let carry = rem >> 127;
        rem = (rem << 1) | ((lo >> i) & 1);
        quotient <<= 1;
        if carry == 1 || rem >= denom {
            rem = rem.wrapping_sub(denom);
            quotient |= 1;
        }
    }
    Some(quotient)
}

/// Full 256-bit product of two `u128` values as `(high, low)` halves.
fn widening_mul(a: u128, b: u128) -> (u128, u128) {
    let (a0, a1) = (a & LOW_MASK, a >> 64);
    let (b0, b1) = (b & LOW_MASK, b >> 64);

    let p00 = a0 * b0;
    let p01 = a0 * b1;
    let p10 = a1 * b0;
    let p11 = a1 * b1;

    let mid = (p00 >> 64) + (p01 & LOW_MASK) + (p10 & LOW_MASK);
    let lo = (p00 & LOW_MASK) | (mid << 64);
    let hi = p11 + (p01 >> 64) + (p10 >> 64) + (mid >> 64);
    (hi, lo)
}

/// Parse a raw amount: a decimal integer, or `max` for [`MAX_AMOUNT`].
pub fn parse_amount(s: &str) -> Result<u128, TypesError> {
    let trimmed = s.trim();
    if trimmed.eq_ignore_ascii_case("max") {
        return Ok(MAX_AMOUNT);
    }
    trimmed
        .replace('_', "")
        .parse::<u128>()
        .map_err(|_| TypesError::InvalidAmount(s.to_string()))
}

/// Render a raw amount with `decimals` fractional digits, e.g. `100.000005`.
///
/// Trailing fractional zeros are trimmed.
pub fn format_amount(raw: u128, decimals: u8) -> String {
    if decimals == 0 {
        return raw.to_string();
    }
    // 10^39 and up exceed u128: every raw value is then a pure fraction.
    let (whole, frac) = match 10u128.checked_pow(decimals as u32) {
        Some(scale) => (raw / scale, raw % scale),
        None => (0, raw),
    };
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:0width$}", frac, width = decimals as usize);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn mul_div_small_values() {
        assert_eq!(mul_div(10, 20, 3), Some(66));
        assert_eq!(mul_div(0, u128::MAX, 7), Some(0));
        assert_eq!(mul_div(5, 5, 0), None);
    }

    #[test]
    fn mul_div_needs_wide_product() {
        // 10^30 principal times a growth factor just above 1.0.
        let principal = 10u128.pow(30);
        let factor = PRECISION + 50_000_000_000_000;
        let expected = principal + principal / PRECISION * 50_000_000_000_000;
        assert_eq!(mul_div(principal, factor, PRECISION), Some(expected));
    }

    #[test]
    fn mul_div_max_by_max() {
        assert_eq!(mul_div(u128::MAX, u128::MAX, u128::MAX), Some(u128::MAX));
        assert_eq!(mul_div(u128::MAX, 2, 1), None);
    }

    #[test]
    fn parse_amount_accepts_max_and_underscores() {
        assert_eq!(parse_amount("max"), Ok(MAX_AMOUNT));
        assert_eq!(parse_amount("MAX"), Ok(MAX_AMOUNT));
        assert_eq!(parse_amount("1_000"), Ok(1000));
        assert!(parse_amount("-5").is_err());
        assert!(parse_amount("ten").is_err());
    }

    #[test]
    fn format_amount_trims_fraction() {
        assert_eq!(format_amount(100 * PRECISION, 18), "100");
        assert_eq!(format_amount(100_000_005_000_000_000_000, 18), "100.000005");
        assert_eq!(format_amount(1, 18), "0.000000000000000001");
        assert_eq!(format_amount(42, 0), "42");
    }

    proptest! {
        #[test]
        fn mul_div_matches_narrow_path(a in 0u128..=u64::MAX as u128, b in 0u128..=u64::MAX as u128, d in 1u128..=u64::MAX as u128) {
            prop_assert_eq!(mul_div(a, b, d), Some(a * b / d));
        }

        #[test]
        fn mul_div_identity_scale(a: u128, d in 1u128..=u128::MAX) {
            prop_assert_eq!(mul_div(a, d, d), Some(a));
        }
    }
}
