//! # Pool Math
//!
//! Fixed point helpers for Q64.96 square-root prices, tick conversions and
//! liquidity sizing. Rounding follows what the pool contracts do on chain so
//! that computed mint amounts are exactly what the position manager pulls.

/// 512-bit intermediate multiply/divide
pub mod full_math;
/// Liquidity derivation from a single token amount
pub mod liquidity_amounts;
/// Reserve ratio <-> square-root price conversion
pub mod price;
/// Token amount deltas between two square-root prices
pub mod sqrt_price_math;
/// Tick <-> square-root price conversion
pub mod tick_math;

use alloy::primitives::U256;
use bigdecimal::num_bigint::{BigInt, Sign};

/// Number of fractional bits in a Q64.96 value
pub const RESOLUTION: u8 = 96;

/// `2^96`, the Q64.96 representation of 1.0
pub const Q96: U256 = U256::from_limbs([0, 4_294_967_296, 0, 0]);

/// Converts a non-negative big integer into a `U256`, `None` if it does not fit.
pub(crate) fn big_to_u256(value: &BigInt) -> Option<U256> {
    if value.sign() == Sign::Minus {
        return None;
    }
    let (_, bytes) = value.to_bytes_be();
    U256::try_from_be_slice(&bytes)
}

/// Lossless conversion into a non-negative `BigInt`
pub(crate) fn u256_to_big(value: U256) -> BigInt {
    BigInt::from_bytes_be(Sign::Plus, &value.to_be_bytes::<32>())
}
