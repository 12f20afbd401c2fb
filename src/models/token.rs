use std::fmt::{self, Display};
use std::str::FromStr;

use alloy::primitives::{Address, U256};
use bigdecimal::num_bigint::{BigInt, Sign};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::math::{big_to_u256, u256_to_big};

/// Decimal digits of `2^256`; any larger power of ten overflows
const U256_DIGITS: i128 = 78;

/// ERC-20 metadata as read from the token contract
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenDescriptor {
    /// Token contract address
    pub address: Address,
    /// Number of decimals of the base unit
    pub decimals: u8,
    /// Short display symbol
    pub symbol: String,
    /// Display name
    pub name: String,
}

impl TokenDescriptor {
    /// Create a new token descriptor
    #[must_use]
    pub fn new(address: Address, decimals: u8, symbol: &str, name: &str) -> Self {
        Self {
            address,
            decimals,
            symbol: symbol.to_string(),
            name: name.to_string(),
        }
    }

    /// Converts an amount in display units (`"1.5"`) into base units.
    ///
    /// # Arguments
    ///
    /// * `amount` - Non-negative decimal string, scientific notation allowed
    ///
    /// # Returns
    ///
    /// `amount * 10^decimals`, exact
    ///
    /// # Errors
    /// * `InvalidAmount` if the string is not a decimal number, is negative,
    ///   has more fractional digits than the token supports or overflows 256 bits
    pub fn parse_units(&self, amount: &str) -> Result<U256, EngineError> {
        let invalid = |reason: &str| EngineError::InvalidAmount {
            amount: amount.to_string(),
            symbol: self.symbol.clone(),
            reason: reason.to_string(),
        };

        let value = BigDecimal::from_str(amount.trim()).map_err(|_| invalid("not a decimal number"))?;
        let (digits, scale) = value.as_bigint_and_exponent();
        match digits.sign() {
            Sign::Minus => return Err(invalid("amount must not be negative")),
            Sign::NoSign => return Ok(U256::ZERO),
            Sign::Plus => {}
        }

        // Reject out-of-range exponents before materializing 10^shift
        let shift = i128::from(self.decimals) - i128::from(scale);
        if shift >= U256_DIGITS {
            return Err(invalid("does not fit in 256 bits"));
        }
        if -shift > i128::from(value.digits()) {
            return Err(invalid(&format!(
                "more than {} fractional digits",
                self.decimals
            )));
        }
        let ten = BigInt::from(10u8);
        let raw = if shift >= 0 {
            let power = u32::try_from(shift).map_err(|_| invalid("exponent too large"))?;
            digits * ten.pow(power)
        } else {
            let power = u32::try_from(-shift).map_err(|_| invalid("exponent too large"))?;
            let divisor = ten.pow(power);
            if &digits % &divisor != BigInt::from(0u8) {
                return Err(invalid(&format!(
                    "more than {} fractional digits",
                    self.decimals
                )));
            }
            digits / divisor
        };

        big_to_u256(&raw).ok_or_else(|| invalid("does not fit in 256 bits"))
    }

    /// Renders a base-unit amount in display units
    #[must_use]
    pub fn format_units(&self, raw: U256) -> BigDecimal {
        BigDecimal::new(u256_to_big(raw), i64::from(self.decimals))
    }
}

impl Display for TokenDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.symbol, self.address)
    }
}
