//! # Chain Access
//!
//! The provisioner talks to the ledger only through [`ChainClient`]: token
//! metadata, pool reads and the handful of transactions it sends. Every send
//! resolves once the transaction is confirmed, so callers never have two
//! transactions in flight for the same signer.

/// `alloy` backed client
pub mod alloy_client;
/// Solidity bindings
pub mod contracts;

use alloy::primitives::{Address, TxHash, U256};
use eyre::Result;

use crate::models::fee::FeeTier;
use crate::models::pool::PoolState;
use crate::models::token::TokenDescriptor;

pub use alloy_client::AlloyChain;

/// Arguments of a position manager `mint` call, canonical order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MintRequest {
    /// Position manager to mint through
    pub position_manager: Address,
    /// Canonical token0
    pub token0: Address,
    /// Canonical token1
    pub token1: Address,
    /// Pool fee tier
    pub fee: FeeTier,
    /// Lower tick
    pub tick_lower: i32,
    /// Upper tick
    pub tick_upper: i32,
    /// Desired token0 amount
    pub amount0_desired: U256,
    /// Desired token1 amount
    pub amount1_desired: U256,
    /// Minimum token0 the mint must take
    pub amount0_min: U256,
    /// Minimum token1 the mint must take
    pub amount1_min: U256,
    /// Owner of the minted position
    pub recipient: Address,
    /// Unix timestamp after which the mint reverts
    pub deadline: u64,
}

/// What a confirmed mint reported back
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MintReceipt {
    /// Mint transaction
    pub tx_hash: TxHash,
    /// Position NFT id
    pub token_id: U256,
    /// Liquidity added
    pub liquidity: u128,
    /// token0 actually deposited
    pub amount0: U256,
    /// token1 actually deposited
    pub amount1: U256,
}

/// Chain RPC, signer and token metadata as seen by the provisioner.
///
/// Reads are side-effect free. Writes return only after confirmation and
/// fail if the transaction reverted.
#[allow(async_fn_in_trait)]
pub trait ChainClient {
    /// Chain id of the connected network
    async fn chain_id(&self) -> Result<u64>;

    /// Account transactions are sent from
    fn owner(&self) -> Address;

    /// ERC-20 metadata of `token`
    async fn token_descriptor(&self, token: Address) -> Result<TokenDescriptor>;

    /// Pool of `(token0, token1, fee)`, `None` if the factory has none
    async fn pool_address(
        &self,
        factory: Address,
        token0: Address,
        token1: Address,
        fee: FeeTier,
    ) -> Result<Option<Address>>;

    /// Current state of the pool at `pool`
    async fn pool_state(&self, pool: Address) -> Result<PoolState>;

    /// Creates the pool if missing and initializes it if unpriced; returns
    /// the pool address. A pool that already has a price keeps it.
    async fn create_and_initialize_pool(
        &self,
        position_manager: Address,
        token0: Address,
        token1: Address,
        fee: FeeTier,
        sqrt_price_x96: U256,
    ) -> Result<Address>;

    /// Allowance `owner` granted `spender` on `token`
    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256>;

    /// Approves `spender` for `amount` of `token`
    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<TxHash>;

    /// Mints a liquidity position
    async fn mint(&self, request: &MintRequest) -> Result<MintReceipt>;
}
