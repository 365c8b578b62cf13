//! Numeric conversions between raw chain units and human token units.
//!
//! Raw amounts are parsed into arbitrary-precision integers exactly once,
//! at the checkpoint boundary; everything here stays in BigInt/BigDecimal
//! and never touches floating point, so results are bit-identical across
//! runs and machines.

use std::num::NonZeroU64;

use alloy::primitives::U256;
use bigdecimal::{rounding::RoundingMode, BigDecimal};
use num_bigint::{BigInt, Sign};
use num_traits::Zero;
use once_cell::sync::Lazy;

/// Significant digits kept when rounding a price quotient. Comfortably
/// above `decimals + 10` for any token with sane decimal counts.
const PRICE_SIG_FIGS: NonZeroU64 = match NonZeroU64::new(40) {
    Some(n) => n,
    None => unreachable!(),
};

static POW10_CACHE: Lazy<[BigDecimal; 25]> =
    Lazy::new(|| std::array::from_fn(|i| BigDecimal::from(BigInt::from(10u32).pow(i as u32))));

/// Compute 10^exp as BigDecimal.
pub(crate) fn big_pow10(exp: u8) -> BigDecimal {
    if (exp as usize) < POW10_CACHE.len() {
        POW10_CACHE[exp as usize].clone()
    } else {
        BigDecimal::from(BigInt::from(10u32).pow(exp as u32))
    }
}

/// Convert U256 to BigInt via bytes (faster than string parsing).
pub fn u256_to_bigint(value: &U256) -> BigInt {
    let bytes: [u8; 32] = value.to_le_bytes();
    BigInt::from_bytes_le(Sign::Plus, &bytes)
}

/// Scale a raw integer amount to human units, quantized to the token's
/// native decimal count with round-half-up. One raw unit never truncates
/// to zero; an exact zero is reported as the literal zero.
pub fn to_standard_units(raw: &BigInt, decimals: u8) -> BigDecimal {
    if raw.is_zero() {
        return BigDecimal::zero();
    }
    (BigDecimal::from(raw.clone()) / big_pow10(decimals))
        .with_scale_round(decimals as i64, RoundingMode::HalfUp)
}

/// Quotient of two human-scaled quantities, rounded half-up to
/// [`PRICE_SIG_FIGS`] significant digits. `None` when the denominator is
/// zero (a drained pool has no meaningful price).
pub fn price_ratio(numer: &BigDecimal, denom: &BigDecimal) -> Option<BigDecimal> {
    if denom.is_zero() {
        return None;
    }
    Some((numer / denom).with_precision_round(PRICE_SIG_FIGS, RoundingMode::HalfUp))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn one_raw_unit_rounds_up_not_to_zero() {
        let value = to_standard_units(&BigInt::from(1), 18);
        assert_eq!(value.to_string(), "0.000000000000000001");
    }

    #[test]
    fn zero_is_the_literal_zero() {
        assert_eq!(to_standard_units(&BigInt::from(0), 18).to_string(), "0");
    }

    #[test]
    fn scaling_keeps_the_native_decimal_count() {
        let raw = BigInt::from_str("10000000000000000000").unwrap(); // 10e18
        assert_eq!(
            to_standard_units(&raw, 18).to_string(),
            "10.000000000000000000"
        );
        assert_eq!(
            to_standard_units(&BigInt::from(19_000_000u64), 6).to_string(),
            "19.000000"
        );
    }

    #[test]
    fn negative_amounts_keep_their_sign() {
        // Post-swap reserves of corrupt input may go negative; they must
        // stay visible, not clamp to zero.
        assert_eq!(
            to_standard_units(&BigInt::from(-1_500_000), 6).to_string(),
            "-1.500000"
        );
    }

    #[test]
    fn price_rounds_half_up_at_the_last_digit() {
        let q = price_ratio(&BigDecimal::from(2), &BigDecimal::from(3)).unwrap();
        // 40 significant digits of 2/3: 39 sixes then a rounded-up 7.
        let expected = format!("0.{}7", "6".repeat(39));
        assert_eq!(q.to_string(), expected);
    }

    #[test]
    fn drained_reserve_has_no_price() {
        assert!(price_ratio(&BigDecimal::from(5), &BigDecimal::zero()).is_none());
    }
}
