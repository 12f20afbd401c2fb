use alloy::primitives::{U256, U512};

use crate::error::EngineError;

/// Computes `floor(a * b / denominator)` without losing the high bits of the
/// product.
///
/// # Errors
/// * `DivisionByZero` if `denominator` is zero
/// * `MathOverflow` if the quotient does not fit in 256 bits
pub fn mul_div(a: U256, b: U256, denominator: U256) -> Result<U256, EngineError> {
    if denominator.is_zero() {
        return Err(EngineError::DivisionByZero);
    }

    let quotient = U512::from(a) * U512::from(b) / U512::from(denominator);
    narrow(quotient, "mul_div")
}

/// Like [`mul_div`], but rounds up when the division leaves a remainder.
///
/// # Errors
/// Same as [`mul_div`].
pub fn mul_div_rounding_up(a: U256, b: U256, denominator: U256) -> Result<U256, EngineError> {
    if denominator.is_zero() {
        return Err(EngineError::DivisionByZero);
    }

    let product = U512::from(a) * U512::from(b);
    let denominator = U512::from(denominator);
    let mut quotient = product / denominator;
    if !(product % denominator).is_zero() {
        quotient += U512::from(1u8);
    }
    narrow(quotient, "mul_div_rounding_up")
}

/// Divides `a` by `b`, rounding up on a non-zero remainder.
///
/// # Errors
/// * `DivisionByZero` if `b` is zero
pub fn div_rounding_up(a: U256, b: U256) -> Result<U256, EngineError> {
    if b.is_zero() {
        return Err(EngineError::DivisionByZero);
    }

    let (quotient, remainder) = a.div_rem(b);
    if remainder.is_zero() {
        Ok(quotient)
    } else {
        Ok(quotient + U256::from(1u8))
    }
}

/// Truncates a 512-bit intermediate back to 256 bits.
///
/// # Errors
/// * `MathOverflow` tagged with `context` if the value does not fit
pub(crate) fn narrow(value: U512, context: &'static str) -> Result<U256, EngineError> {
    if value > U512::from(U256::MAX) {
        return Err(EngineError::MathOverflow(context));
    }
    Ok(value.to::<U256>())
}
