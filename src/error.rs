//! Invalid-input and math errors raised by the pure engine components.
//!
//! Everything in here is detected synchronously, before any on-chain call is
//! attempted. On-chain failures travel as `eyre::Report` instead, wrapped with
//! the provisioning step that produced them.

use alloy::primitives::{Address, U256};
use thiserror::Error;

/// Errors produced by price encoding, pair ordering, position sizing,
/// path packing and deployment lookups.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Both sides of a pair resolve to the same token
    #[error("token pair must contain two distinct tokens, got {address} twice")]
    IdenticalTokens {
        /// The duplicated address
        address: Address,
    },

    /// Fee value outside of the supported tiers
    #[error("unsupported fee tier {0}, expected one of 100, 500, 3000, 10000")]
    UnsupportedFee(u32),

    /// Path arrays do not line up
    #[error("swap path needs fees.len() == tokens.len() - 1, got {tokens} tokens and {fees} fees")]
    PathLengthMismatch {
        /// Number of tokens supplied
        tokens: usize,
        /// Number of fees supplied
        fees: usize,
    },

    /// A route needs at least one hop
    #[error("swap path needs at least 2 tokens, got {tokens}")]
    PathTooShort {
        /// Number of tokens supplied
        tokens: usize,
    },

    /// Packed path bytes have the wrong length
    #[error("packed path of {0} bytes is not 20 + 23 * hops")]
    MalformedPath(usize),

    /// Price ratio with a zero denominator
    #[error("reserve0 must be non-zero to encode a price ratio (reserve1 = {reserve1})")]
    ZeroDenominator {
        /// The numerator that was supplied
        reserve1: String,
    },

    /// Amount string that cannot be turned into base units
    #[error("invalid amount {amount:?} for {symbol}: {reason}")]
    InvalidAmount {
        /// The offending input
        amount: String,
        /// Symbol of the token the amount was meant for
        symbol: String,
        /// What is wrong with it
        reason: String,
    },

    /// Tick width multiplier of zero
    #[error("tick width multiplier must be at least 1")]
    InvalidTickWidth,

    /// The caller's token is not part of the canonical pair
    #[error("token {token} is not one of the pair tokens {token0} / {token1}")]
    TokenNotInPair {
        /// Token the caller asked about
        token: Address,
        /// Canonical token0
        token0: Address,
        /// Canonical token1
        token1: Address,
    },

    /// Slippage tolerance above 100%
    #[error("slippage tolerance of {0} bps exceeds 10000")]
    InvalidSlippage(u32),

    /// Tick spacing that is not a positive integer
    #[error("tick spacing must be positive, got {0}")]
    InvalidTickSpacing(i32),

    /// Tick beyond the protocol bounds
    #[error("tick {0} is outside [-887272, 887272]")]
    TickOutOfBounds(i32),

    /// Square-root price beyond the protocol bounds
    #[error("sqrt price {0} is outside the initializable range")]
    SqrtPriceOutOfBounds(U256),

    /// Position range that holds no amount of the token being fixed
    #[error("tick range [{tick_lower}, {tick_upper}) around tick {tick} holds no {symbol}")]
    RangeExcludesToken {
        /// Symbol of the token whose amount was fixed
        symbol: String,
        /// Current pool tick
        tick: i32,
        /// Lower tick of the range
        tick_lower: i32,
        /// Upper tick of the range
        tick_upper: i32,
    },

    /// Intermediate or final value does not fit
    #[error("math overflow in {0}")]
    MathOverflow(&'static str),

    /// Division by zero inside fixed point math
    #[error("division by zero")]
    DivisionByZero,

    /// Network missing from the deployment registry
    #[error("network {0:?} is not present in the deployment registry")]
    UnknownNetwork(String),

    /// Contract missing from a network's deployment registry entry
    #[error("contract {contract} is not deployed on network {network:?}")]
    UnknownContract {
        /// Logical contract name
        contract: String,
        /// Network that was searched
        network: String,
    },
}
