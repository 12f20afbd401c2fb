//! Conversion between reserve ratios and Q64.96 square-root prices.
//!
//! Encoding is exact: the ratio is scaled by `2^192` on big integers and the
//! integer square root is taken, which equals `floor(sqrt(r1 / r0) * 2^96)`
//! for any pair of decimal reserves.

use alloy::primitives::U256;
use bigdecimal::num_bigint::{BigInt, Sign};
use bigdecimal::BigDecimal;

use super::tick_math::{MAX_SQRT_RATIO, MIN_SQRT_RATIO};
use super::{big_to_u256, u256_to_big};
use crate::error::EngineError;

/// Encodes `sqrt(reserve1 / reserve0)` as a Q64.96 fixed point integer,
/// truncating toward zero.
///
/// # Arguments
/// * `reserve1` - amount of token1 in the reference ratio
/// * `reserve0` - amount of token0 in the reference ratio
///
/// # Errors
/// * `ZeroDenominator` if `reserve0` is zero
/// * `InvalidAmount` if either reserve is negative
/// * `MathOverflow` if the encoded value does not fit in 256 bits
pub fn encode_sqrt_price_x96(
    reserve1: &BigDecimal,
    reserve0: &BigDecimal,
) -> Result<U256, EngineError> {
    let (digits1, scale1) = reserve1.as_bigint_and_exponent();
    let (digits0, scale0) = reserve0.as_bigint_and_exponent();

    if digits0.sign() == Sign::NoSign {
        return Err(EngineError::ZeroDenominator {
            reserve1: reserve1.to_string(),
        });
    }
    for (reserve, digits) in [(reserve1, &digits1), (reserve0, &digits0)] {
        if digits.sign() == Sign::Minus {
            return Err(EngineError::InvalidAmount {
                amount: reserve.to_string(),
                symbol: "reserve".to_string(),
                reason: "reserves must not be negative".to_string(),
            });
        }
    }

    // r1 / r0 lies within (10^(m-1), 10^(m+1)); above 10^97 the root
    // overflows 256 bits, below 10^-59 it truncates to zero
    let exponent = i128::from(scale0) - i128::from(scale1);
    let magnitude = i128::from(reserve1.digits()) - i128::from(reserve0.digits()) + exponent;
    if digits1.sign() == Sign::NoSign || magnitude <= -60 {
        return Ok(U256::ZERO);
    }
    if magnitude >= 98 {
        return Err(EngineError::MathOverflow("encode_sqrt_price_x96"));
    }

    // r1 / r0 = digits1 * 10^(scale0 - scale1) / digits0
    let mut numerator = digits1 << 192usize;
    let mut denominator = digits0;
    let power = BigInt::from(10u8).pow(
        u32::try_from(exponent.unsigned_abs())
            .map_err(|_| EngineError::MathOverflow("encode_sqrt_price_x96"))?,
    );
    if exponent >= 0 {
        numerator *= power;
    } else {
        denominator *= power;
    }

    // floor(sqrt(x)) == isqrt(floor(x)) for x >= 0
    let root = (numerator / denominator).sqrt();
    big_to_u256(&root).ok_or(EngineError::MathOverflow("encode_sqrt_price_x96"))
}

/// Decodes a Q64.96 square-root price back into the reserve ratio
/// `(sqrt_price_x96 / 2^96)^2`.
///
/// Intended for diagnostics only; the division carries 100 significant
/// digits.
#[must_use]
pub fn decode_sqrt_price_x96(sqrt_price_x96: U256) -> BigDecimal {
    let root = u256_to_big(sqrt_price_x96);
    let numerator = BigDecimal::new(&root * &root, 0);
    let denominator = BigDecimal::new(BigInt::from(1u8) << 192usize, 0);
    numerator / denominator
}

/// Same as [`decode_sqrt_price_x96`], rounded to `digits` significant digits.
#[must_use]
pub fn decode_with_precision(sqrt_price_x96: U256, digits: u64) -> BigDecimal {
    decode_sqrt_price_x96(sqrt_price_x96).with_prec(digits)
}

/// Checks that a pool could be initialized at `sqrt_price_x96`.
///
/// # Errors
/// * `SqrtPriceOutOfBounds` unless `MIN_SQRT_RATIO <= sqrt_price_x96 < MAX_SQRT_RATIO`
pub fn ensure_initializable(sqrt_price_x96: U256) -> Result<U256, EngineError> {
    if sqrt_price_x96 < MIN_SQRT_RATIO || sqrt_price_x96 >= MAX_SQRT_RATIO {
        return Err(EngineError::SqrtPriceOutOfBounds(sqrt_price_x96));
    }
    Ok(sqrt_price_x96)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Q96;
    use rand::Rng;
    use std::str::FromStr;

    fn dec(value: &str) -> BigDecimal {
        BigDecimal::from_str(value).unwrap()
    }

    fn assert_close(actual: &BigDecimal, expected: &BigDecimal) {
        let relative = ((actual - expected) / expected).abs();
        assert!(
            relative < dec("1e-14"),
            "{actual} differs from {expected} by {relative}"
        );
    }

    #[test]
    fn test_encode_known_values() {
        for (reserve1, reserve0, expected) in [
            // reserve1,  reserve0,    expected
            ("1", "1", "79228162514264337593543950336"),
            ("1", "5", "35431911422859142059220343232"),
            ("5", "1", "177159557114295710296101716160"),
            ("100", "1", "792281625142643375935439503360"),
            ("1", "30000000", "14465017266249264964771739"),
            ("0.2", "1", "35431911422859142059220343232"),
        ] {
            assert_eq!(
                encode_sqrt_price_x96(&dec(reserve1), &dec(reserve0)).unwrap(),
                U256::from_str(expected).unwrap(),
                "{reserve1} / {reserve0}"
            );
        }
    }

    #[test]
    fn test_encode_truncates() {
        // sqrt(2) * 2^96 = 112045541949572279837463876454.9...
        assert_eq!(
            encode_sqrt_price_x96(&dec("2"), &dec("1")).unwrap(),
            U256::from_str("112045541949572279837463876454").unwrap()
        );
    }

    #[test]
    fn test_encode_extreme_exponents() {
        assert_eq!(
            encode_sqrt_price_x96(&dec("1e96"), &dec("1")).unwrap(),
            U256::from_str(&format!("79228162514264337593543950336{}", "0".repeat(48))).unwrap()
        );
        assert_eq!(
            encode_sqrt_price_x96(&dec("1e-57"), &dec("1")).unwrap(),
            U256::from(2u8)
        );

        // Resolved from the exponent alone
        assert_eq!(
            encode_sqrt_price_x96(&dec("1e-30000000"), &dec("1")),
            Ok(U256::ZERO)
        );
        assert_eq!(
            encode_sqrt_price_x96(&dec("1"), &dec("1e30000000")),
            Ok(U256::ZERO)
        );
        assert_eq!(
            encode_sqrt_price_x96(&dec("1e30000000"), &dec("1")),
            Err(EngineError::MathOverflow("encode_sqrt_price_x96"))
        );
    }

    #[test]
    fn test_encode_rejects_zero_denominator() {
        assert_eq!(
            encode_sqrt_price_x96(&dec("1"), &dec("0")),
            Err(EngineError::ZeroDenominator {
                reserve1: "1".to_string()
            })
        );
        assert!(matches!(
            encode_sqrt_price_x96(&dec("-1"), &dec("1")),
            Err(EngineError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_decode_one() {
        assert_eq!(decode_sqrt_price_x96(Q96), BigDecimal::from(1));
    }

    #[test]
    fn test_round_trip_fixed_ratios() {
        for (reserve1, reserve0) in [("1", "1"), ("1", "5"), ("1", "30000000"), ("3", "7")] {
            let encoded = encode_sqrt_price_x96(&dec(reserve1), &dec(reserve0)).unwrap();
            let decoded = decode_sqrt_price_x96(encoded);
            assert_close(&decoded, &(dec(reserve1) / dec(reserve0)));
        }
    }

    #[test]
    fn test_round_trip_random_ratios() {
        let mut rng = rand::rng();
        for _ in 0..200 {
            let reserve1 = BigDecimal::from(rng.random_range(1u64..1_000_000_000));
            let reserve0 = BigDecimal::from(rng.random_range(1u64..1_000_000_000));

            let forward = decode_sqrt_price_x96(encode_sqrt_price_x96(&reserve1, &reserve0).unwrap());
            let backward = decode_sqrt_price_x96(encode_sqrt_price_x96(&reserve0, &reserve1).unwrap());

            assert_close(&forward, &(&reserve1 / &reserve0));
            assert_close(&(&forward * &backward), &BigDecimal::from(1));
        }
    }

    #[test]
    fn test_decode_with_precision() {
        let encoded = encode_sqrt_price_x96(&dec("1"), &dec("5")).unwrap();
        assert_eq!(decode_with_precision(encoded, 15), dec("0.200000000000000"));
    }

    #[test]
    fn test_ensure_initializable() {
        assert!(ensure_initializable(Q96).is_ok());
        assert!(ensure_initializable(MIN_SQRT_RATIO).is_ok());
        assert_eq!(
            ensure_initializable(MAX_SQRT_RATIO),
            Err(EngineError::SqrtPriceOutOfBounds(MAX_SQRT_RATIO))
        );
        assert_eq!(
            ensure_initializable(U256::ZERO),
            Err(EngineError::SqrtPriceOutOfBounds(U256::ZERO))
        );
    }
}
