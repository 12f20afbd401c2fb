use alloy::network::EthereumWallet;
use alloy::primitives::aliases::{I24, U160, U24};
use alloy::primitives::ruint::UintTryFrom;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder, MULTICALL3_ADDRESS};
use alloy::rpc::types::Log;
use alloy::signers::local::PrivateKeySigner;
use alloy::sol_types::{SolCall, SolValue};
use eyre::{bail, eyre, Result, WrapErr};
use log::{debug, info};
use url::Url;

use super::contracts::{
    IMulticall3, INonfungiblePositionManager, IUniswapV3Factory, IUniswapV3Pool, IERC20,
};
use super::{ChainClient, MintReceipt, MintRequest};
use crate::models::fee::FeeTier;
use crate::models::pool::PoolState;
use crate::models::token::TokenDescriptor;

/// [`ChainClient`] over an `alloy` provider.
///
/// Transactions are signed by the provider's wallet; gas, nonce and chain id
/// are filled by the provider's recommended fillers.
#[derive(Clone, Debug)]
pub struct AlloyChain<P> {
    /// Provider every call and transaction goes through
    provider: P,
    /// Wallet address; `Address::ZERO` for read-only clients
    owner: Address,
}

/// Connects to `rpc_url` with a wallet built from `private_key`.
///
/// # Errors
/// * If the private key cannot be parsed
pub fn connect(rpc_url: Url, private_key: &str) -> Result<AlloyChain<impl Provider + Clone>> {
    let signer: PrivateKeySigner = private_key
        .trim()
        .parse()
        .map_err(|e| eyre!("SPROUT_PRIVATE_KEY is not a valid private key: {e}"))?;
    let owner = signer.address();
    let provider = ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer))
        .on_http(rpc_url);

    info!("chain::alloy: Connected as {owner}");
    Ok(AlloyChain::new(provider, owner))
}

/// Connects to `rpc_url` without a wallet; only reads will succeed.
#[must_use]
pub fn connect_read_only(rpc_url: Url) -> AlloyChain<impl Provider + Clone> {
    AlloyChain::new(ProviderBuilder::new().on_http(rpc_url), Address::ZERO)
}

impl<P: Provider> AlloyChain<P> {
    /// Wraps a provider; `owner` must be the provider wallet's address
    pub const fn new(provider: P, owner: Address) -> Self {
        Self { provider, owner }
    }
}

impl<P: Provider> ChainClient for AlloyChain<P> {
    async fn chain_id(&self) -> Result<u64> {
        Ok(self.provider.get_chain_id().await?)
    }

    fn owner(&self) -> Address {
        self.owner
    }

    async fn token_descriptor(&self, token: Address) -> Result<TokenDescriptor> {
        let multicall = IMulticall3::new(MULTICALL3_ADDRESS, &self.provider);

        let calls = vec![
            IMulticall3::Call3 {
                target: token,
                allowFailure: true,
                callData: Bytes::from(IERC20::nameCall::new(()).abi_encode()),
            },
            IMulticall3::Call3 {
                target: token,
                allowFailure: true,
                callData: Bytes::from(IERC20::symbolCall::new(()).abi_encode()),
            },
            IMulticall3::Call3 {
                target: token,
                allowFailure: false,
                callData: Bytes::from(IERC20::decimalsCall::new(()).abi_encode()),
            },
        ];

        let results = multicall
            .aggregate3(calls)
            .call()
            .await
            .wrap_err_with(|| format!("failed to read token metadata of {token}"))?
            .returnData;
        let [name, symbol, decimals] = results.as_slice() else {
            bail!("multicall returned {} results for token {token}", results.len());
        };

        // Some tokens return bytes32 or nothing for name/symbol; those fall back to empty strings
        let name = if name.success {
            String::abi_decode(&name.returnData, true).unwrap_or_default()
        } else {
            String::new()
        };
        let symbol = if symbol.success {
            String::abi_decode(&symbol.returnData, true).unwrap_or_default()
        } else {
            String::new()
        };
        let decimals = U256::abi_decode(&decimals.returnData, true)
            .wrap_err_with(|| format!("token {token} returned malformed decimals"))?;
        if decimals > U256::from(u8::MAX) {
            bail!("token {token} reports {decimals} decimals");
        }

        let descriptor = TokenDescriptor::new(token, decimals.to::<u8>(), &symbol, &name);
        debug!("chain::alloy: Token {descriptor} has {} decimals", descriptor.decimals);
        Ok(descriptor)
    }

    async fn pool_address(
        &self,
        factory: Address,
        token0: Address,
        token1: Address,
        fee: FeeTier,
    ) -> Result<Option<Address>> {
        let pool = IUniswapV3Factory::new(factory, &self.provider)
            .getPool(token0, token1, U24::from(fee.as_u32()))
            .call()
            .await?
            ._0;
        Ok((pool != Address::ZERO).then_some(pool))
    }

    async fn pool_state(&self, pool: Address) -> Result<PoolState> {
        let contract = IUniswapV3Pool::new(pool, &self.provider);

        let slot0 = contract.slot0().call().await?;
        let liquidity = contract.liquidity().call().await?._0;
        let tick_spacing = contract.tickSpacing().call().await?._0;
        let fee = contract.fee().call().await?._0;

        Ok(PoolState {
            address: pool,
            tick: slot0.tick.low_i32(),
            tick_spacing: tick_spacing.low_i32(),
            fee: fee.to::<u32>(),
            sqrt_price_x96: U256::from(slot0.sqrtPriceX96),
            liquidity,
        })
    }

    async fn create_and_initialize_pool(
        &self,
        position_manager: Address,
        token0: Address,
        token1: Address,
        fee: FeeTier,
        sqrt_price_x96: U256,
    ) -> Result<Address> {
        let sqrt_price_x96 = U160::uint_try_from(sqrt_price_x96)
            .map_err(|_| eyre!("sqrt price {sqrt_price_x96} does not fit in uint160"))?;
        let manager = INonfungiblePositionManager::new(position_manager, &self.provider);
        let call = manager.createAndInitializePoolIfNecessary(
            token0,
            token1,
            U24::from(fee.as_u32()),
            sqrt_price_x96,
        );

        // Dry run first to learn the pool address the call resolves to
        let pool = call.call().await?.pool;
        let receipt = call.send().await?.get_receipt().await?;
        if !receipt.status() {
            bail!("createAndInitializePoolIfNecessary reverted in {}", receipt.transaction_hash);
        }

        debug!(
            "chain::alloy: Pool {pool} ready in {}",
            receipt.transaction_hash
        );
        Ok(pool)
    }

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256> {
        Ok(IERC20::new(token, &self.provider)
            .allowance(owner, spender)
            .call()
            .await?
            ._0)
    }

    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<TxHash> {
        let receipt = IERC20::new(token, &self.provider)
            .approve(spender, amount)
            .send()
            .await?
            .get_receipt()
            .await?;
        if !receipt.status() {
            bail!("approve reverted in {}", receipt.transaction_hash);
        }
        Ok(receipt.transaction_hash)
    }

    async fn mint(&self, request: &MintRequest) -> Result<MintReceipt> {
        let tick = |tick: i32| {
            I24::try_from(tick).map_err(|_| eyre!("tick {tick} does not fit in int24"))
        };
        let params = INonfungiblePositionManager::MintParams {
            token0: request.token0,
            token1: request.token1,
            fee: U24::from(request.fee.as_u32()),
            tickLower: tick(request.tick_lower)?,
            tickUpper: tick(request.tick_upper)?,
            amount0Desired: request.amount0_desired,
            amount1Desired: request.amount1_desired,
            amount0Min: request.amount0_min,
            amount1Min: request.amount1_min,
            recipient: request.recipient,
            deadline: U256::from(request.deadline),
        };

        let receipt = INonfungiblePositionManager::new(request.position_manager, &self.provider)
            .mint(params)
            .send()
            .await?
            .get_receipt()
            .await?;
        if !receipt.status() {
            bail!("mint reverted in {}", receipt.transaction_hash);
        }

        let event = increase_liquidity(receipt.inner.logs()).ok_or_else(|| {
            eyre!(
                "mint {} emitted no IncreaseLiquidity event",
                receipt.transaction_hash
            )
        })?;

        Ok(MintReceipt {
            tx_hash: receipt.transaction_hash,
            token_id: event.tokenId,
            liquidity: event.liquidity,
            amount0: event.amount0,
            amount1: event.amount1,
        })
    }
}

/// The first `IncreaseLiquidity` event among a receipt's logs
fn increase_liquidity(logs: &[Log]) -> Option<INonfungiblePositionManager::IncreaseLiquidity> {
    logs.iter()
        .find_map(|log| {
            log.log_decode::<INonfungiblePositionManager::IncreaseLiquidity>()
                .ok()
        })
        .map(|log| log.inner.data)
}
