use std::fmt::{self, Display};

use alloy::primitives::{Address, U256};

use crate::chain::MintReceipt;
use crate::models::fee::FeeTier;
use crate::models::pair::OrderedPair;
use crate::models::pool::PoolState;
use crate::models::position::Position;
use crate::models::token::TokenDescriptor;

/// Where a pool stands in the provisioning pipeline.
///
/// `NotFound -> Initialized -> LiquidityAdded`. A pool that exists but was
/// never priced counts as `NotFound`: the creation entry point initializes
/// it without creating it again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProvisionState {
    /// No priced pool for the pair and fee
    NotFound,
    /// Pool exists and has a price; carries its confirmed state
    Initialized(PoolState),
    /// Position minted
    LiquidityAdded(Box<ProvisionOutcome>),
}

impl ProvisionState {
    /// Whether the pipeline has nothing left to do
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::LiquidityAdded(_))
    }
}

impl Display for ProvisionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::Initialized(pool) => write!(f, "initialized at {} (tick {})", pool.address, pool.tick),
            Self::LiquidityAdded(outcome) => write!(f, "liquidity added, token id {}", outcome.receipt.token_id),
        }
    }
}

/// A request after input validation and token metadata lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolPlan {
    /// Canonically ordered token metadata
    pub pair: OrderedPair<TokenDescriptor>,
    /// Fee tier
    pub fee: FeeTier,
    /// Price to initialize the pool at, if it has none yet
    pub sqrt_price_x96: U256,
    /// Token the deposit is denominated in
    pub input_token: Address,
    /// Deposit amount, display units
    pub input_amount: String,
}

impl PoolPlan {
    /// Canonical token0 metadata
    #[must_use]
    pub const fn token0(&self) -> &TokenDescriptor {
        &self.pair.first().payload
    }

    /// Canonical token1 metadata
    #[must_use]
    pub const fn token1(&self) -> &TokenDescriptor {
        &self.pair.second().payload
    }
}

impl Display for PoolPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} fee {}",
            self.token0().symbol,
            self.token1().symbol,
            self.fee
        )
    }
}

/// What a fully provisioned pool ended with
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProvisionOutcome {
    /// Pool state the position was sized against
    pub pool: PoolState,
    /// Position that was minted
    pub position: Position,
    /// Mint confirmation
    pub receipt: MintReceipt,
}

impl Display for ProvisionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} in pool {} -> token id {} ({})",
            self.position, self.pool.address, self.receipt.token_id, self.receipt.tx_hash
        )
    }
}
