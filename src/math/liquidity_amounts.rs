use alloy::primitives::{U256, U512};

use super::full_math::{mul_div, narrow};
use super::Q96;
use crate::error::EngineError;

/// Largest liquidity that `amount0` of token0 can back between two prices,
/// computed as `amount0 * a * b / (2^96 * (b - a))` without intermediate
/// rounding.
///
/// # Errors
/// * `DivisionByZero` if the two prices are equal
/// * `MathOverflow` if the product exceeds 512 bits or the result 256 bits
pub fn max_liquidity_for_amount0_precise(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    amount0: U256,
) -> Result<U256, EngineError> {
    let (lower, upper) = if sqrt_ratio_a_x96 > sqrt_ratio_b_x96 {
        (sqrt_ratio_b_x96, sqrt_ratio_a_x96)
    } else {
        (sqrt_ratio_a_x96, sqrt_ratio_b_x96)
    };
    if lower == upper {
        return Err(EngineError::DivisionByZero);
    }

    let numerator = U512::from(amount0)
        .checked_mul(U512::from(lower))
        .and_then(|n| n.checked_mul(U512::from(upper)))
        .ok_or(EngineError::MathOverflow("max_liquidity_for_amount0_precise"))?;
    let denominator = U512::from(Q96) * U512::from(upper - lower);

    narrow(numerator / denominator, "max_liquidity_for_amount0_precise")
}

/// Largest liquidity that `amount1` of token1 can back between two prices:
/// `amount1 * 2^96 / (b - a)`.
///
/// # Errors
/// * `DivisionByZero` if the two prices are equal
/// * `MathOverflow` if the result exceeds 256 bits
pub fn max_liquidity_for_amount1(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    amount1: U256,
) -> Result<U256, EngineError> {
    let (lower, upper) = if sqrt_ratio_a_x96 > sqrt_ratio_b_x96 {
        (sqrt_ratio_b_x96, sqrt_ratio_a_x96)
    } else {
        (sqrt_ratio_a_x96, sqrt_ratio_b_x96)
    };
    mul_div(amount1, Q96, upper - lower)
}
