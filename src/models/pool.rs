use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::math::tick_math::{MAX_TICK, MIN_TICK};
use crate::models::fee::FeeTier;

/// Snapshot of a pool's on-chain state.
///
/// `fee` is kept as the raw value the contract reported; it is validated
/// into a [`FeeTier`] before any math runs on the snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolState {
    /// Pool contract address
    pub address: Address,
    /// Current tick
    pub tick: i32,
    /// Distance between usable ticks
    pub tick_spacing: i32,
    /// Raw fee value
    pub fee: u32,
    /// Current Q64.96 square-root price
    pub sqrt_price_x96: U256,
    /// In-range liquidity
    pub liquidity: u128,
}

impl PoolState {
    /// The pool's fee tier.
    ///
    /// # Errors
    /// * `UnsupportedFee` if the raw fee is not a known tier
    pub fn fee_tier(&self) -> Result<FeeTier, EngineError> {
        FeeTier::try_from(self.fee)
    }

    /// Checks the snapshot can be sized against: known fee tier, positive
    /// spacing, tick inside the protocol bounds.
    ///
    /// # Errors
    /// * `UnsupportedFee`, `InvalidTickSpacing` or `TickOutOfBounds`
    pub fn validate(&self) -> Result<FeeTier, EngineError> {
        let fee = self.fee_tier()?;
        if self.tick_spacing <= 0 {
            return Err(EngineError::InvalidTickSpacing(self.tick_spacing));
        }
        if !(MIN_TICK..=MAX_TICK).contains(&self.tick) {
            return Err(EngineError::TickOutOfBounds(self.tick));
        }
        Ok(fee)
    }

    /// Whether the pool has been given a price yet
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        !self.sqrt_price_x96.is_zero()
    }
}
