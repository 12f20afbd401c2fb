use std::fs;
use std::path::Path;

use alloy::primitives::{Address, U256};
use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::liquidity::TickWidth;
use crate::math::full_math::mul_div;

/// 100% in basis points
const BPS_DENOMINATOR: u32 = 10_000;

/// Minimum-amount policy for the mint call.
///
/// ```json
/// { "kind": "unprotected" }
/// { "kind": "tolerance", "bps": 50 }
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Slippage {
    /// `amount0Min = amount1Min = 0`. Only suitable for bootstrap liquidity
    /// seeded by a trusted operator into a pool it just priced.
    Unprotected,
    /// Accept at most `bps` hundredths of a percent less than desired
    Tolerance {
        /// Tolerance in basis points, `0..=10000`
        bps: u32,
    },
}

impl Slippage {
    /// Checks the tolerance is at most 100%.
    ///
    /// # Errors
    /// * `InvalidSlippage` if `bps > 10000`
    pub fn validate(self) -> Result<Self, EngineError> {
        match self {
            Self::Tolerance { bps } if bps > BPS_DENOMINATOR => Err(EngineError::InvalidSlippage(bps)),
            _ => Ok(self),
        }
    }

    /// Minimum amount the mint must take when `desired` is requested.
    ///
    /// # Arguments
    ///
    /// * `desired` - Amount the mint asks for, base units
    ///
    /// # Returns
    ///
    /// Zero when unprotected, otherwise `desired * (10000 - bps) / 10000`
    /// rounded down
    ///
    /// # Errors
    /// * `InvalidSlippage` if the tolerance is above 100%
    pub fn minimum(self, desired: U256) -> Result<U256, EngineError> {
        match self.validate()? {
            Self::Unprotected => Ok(U256::ZERO),
            Self::Tolerance { bps } => mul_div(
                desired,
                U256::from(BPS_DENOMINATOR - bps),
                U256::from(BPS_DENOMINATOR),
            ),
        }
    }
}

/// One pool to create, price and seed.
///
/// `token_a`/`token_b` are in whatever order the caller likes; the
/// provisioner sorts them. Reserves are display-unit amounts whose ratio is
/// the initial price, and `input_amount` is the single-sided deposit of
/// `input_token`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolRequest {
    /// First token
    pub token_a: Address,
    /// Second token
    pub token_b: Address,
    /// Raw fee value; anything but 100, 500, 3000 or 10000 is rejected
    pub fee: u32,
    /// `token_a` side of the initial price ratio
    pub reserve_a: String,
    /// `token_b` side of the initial price ratio
    pub reserve_b: String,
    /// Token the deposit amount is denominated in
    pub input_token: Address,
    /// Deposit amount, display units
    pub input_amount: String,
}

/// A provisioning batch file.
///
/// The range width and the slippage policy have no defaults; a file that
/// omits either is rejected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProvisionBatch {
    /// Position range half-width, in tick spacings
    pub width: TickWidth,
    /// Mint minimum policy
    pub slippage: Slippage,
    /// Pools, provisioned in order
    pub pools: Vec<PoolRequest>,
}

impl ProvisionBatch {
    /// Parses a batch from JSON.
    ///
    /// # Errors
    /// * If the JSON is malformed or misses a required field
    pub fn from_json(json: &str) -> Result<Self> {
        let batch: Self = serde_json::from_str(json).wrap_err("invalid provisioning batch")?;
        batch.slippage.validate()?;
        Ok(batch)
    }

    /// Reads and parses a batch file.
    ///
    /// # Errors
    /// * If the file cannot be read
    /// * If its content is not a valid batch
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read batch file {}", path.display()))?;
        Self::from_json(&json).wrap_err_with(|| format!("in batch file {}", path.display()))
    }
}
