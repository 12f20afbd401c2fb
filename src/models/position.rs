use std::fmt::{self, Display};

use alloy::primitives::{Address, U256};
use serde::Serialize;

use crate::error::EngineError;
use crate::models::fee::FeeTier;
use crate::models::token::TokenDescriptor;

/// Token amounts a mint pulls from the owner, in canonical order
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MintAmounts {
    /// Canonical token0 amount, base units
    pub amount0: U256,
    /// Canonical token1 amount, base units
    pub amount1: U256,
}

/// A concentrated liquidity position ready to be minted.
///
/// Ticks are multiples of the pool's tick spacing with
/// `tick_lower < tick_upper`. Everything is in canonical pair order; use
/// [`Position::amount_of`] to map amounts back to a specific token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    /// Chain the token amounts belong to
    pub chain_id: u64,
    /// Pool the position lives in
    pub pool: Address,
    /// Pool fee tier
    pub fee: FeeTier,
    /// Canonical token0
    pub token0: TokenDescriptor,
    /// Canonical token1
    pub token1: TokenDescriptor,
    /// Lower usable tick
    pub tick_lower: i32,
    /// Upper usable tick
    pub tick_upper: i32,
    /// Liquidity the amounts back
    pub liquidity: u128,
    /// Amounts to deposit
    pub mint_amounts: MintAmounts,
}

impl Position {
    /// Deposit amount of `token`.
    ///
    /// # Errors
    /// * `TokenNotInPair` if `token` is neither side of the position
    pub fn amount_of(&self, token: Address) -> Result<U256, EngineError> {
        if token == self.token0.address {
            Ok(self.mint_amounts.amount0)
        } else if token == self.token1.address {
            Ok(self.mint_amounts.amount1)
        } else {
            Err(EngineError::TokenNotInPair {
                token,
                token0: self.token0.address,
                token1: self.token1.address,
            })
        }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Position({}/{} fee {} [{}, {}] {} {} + {} {})",
            self.token0.symbol,
            self.token1.symbol,
            self.fee,
            self.tick_lower,
            self.tick_upper,
            self.token0.format_units(self.mint_amounts.amount0),
            self.token0.symbol,
            self.token1.format_units(self.mint_amounts.amount1),
            self.token1.symbol,
        )
    }
}
