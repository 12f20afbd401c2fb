use alloy::primitives::U256;

use super::full_math::{div_rounding_up, mul_div, mul_div_rounding_up};
use super::{Q96, RESOLUTION};
use crate::error::EngineError;

/// Amount of token0 held by `liquidity` between two square-root prices:
/// `L * 2^96 * (b - a) / b / a`.
///
/// The prices may be passed in either order. Rounding up yields what a mint
/// has to pay in; rounding down what a burn pays out.
///
/// # Arguments
///
/// * `sqrt_ratio_a_x96`, `sqrt_ratio_b_x96` - Range bounds, Q64.96
/// * `liquidity` - Position liquidity
/// * `round_up` - Round up instead of down
///
/// # Errors
/// * `DivisionByZero` if the lower price is zero
/// * `MathOverflow` if the result does not fit in 256 bits
pub fn get_amount0_delta(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<U256, EngineError> {
    let (lower, upper) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    if lower.is_zero() {
        return Err(EngineError::DivisionByZero);
    }

    let numerator1 = U256::from(liquidity) << RESOLUTION;
    let numerator2 = upper - lower;

    if round_up {
        div_rounding_up(mul_div_rounding_up(numerator1, numerator2, upper)?, lower)
    } else {
        Ok(mul_div(numerator1, numerator2, upper)? / lower)
    }
}

/// Amount of token1 held by `liquidity` between two square-root prices:
/// `L * (b - a) / 2^96`.
///
/// # Errors
/// * `MathOverflow` if the result does not fit in 256 bits
pub fn get_amount1_delta(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<U256, EngineError> {
    let (lower, upper) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    let liquidity = U256::from(liquidity);

    if round_up {
        mul_div_rounding_up(liquidity, upper - lower, Q96)
    } else {
        mul_div(liquidity, upper - lower, Q96)
    }
}

/// `(min, max)` of two prices
fn sorted(a: U256, b: U256) -> (U256, U256) {
    if a > b {
        (b, a)
    } else {
        (a, b)
    }
}
