use alloy::primitives::{Address, U256};
use bigdecimal::BigDecimal;
use chrono::Utc;
use eyre::{bail, eyre, Report, Result, WrapErr};
use log::{debug, error, info};

use super::request::{PoolRequest, Slippage};
use super::state::{PoolPlan, ProvisionOutcome, ProvisionState};
use crate::chain::{ChainClient, MintRequest};
use crate::config::{Contract, NetworkDeployment};
use crate::error::EngineError;
use crate::liquidity::{size_position, PositionRequest, TickWidth};
use crate::math::price::{encode_sqrt_price_x96, ensure_initializable};
use crate::math::u256_to_big;
use crate::models::fee::FeeTier;
use crate::models::pair::OrderedPair;
use crate::models::pool::PoolState;
use crate::models::token::TokenDescriptor;

/// Creates, prices and seeds pools on one network.
///
/// Every step awaits confirmation before the next one starts, so a single
/// provisioner never has two transactions in flight.
#[derive(Debug)]
pub struct PoolProvisioner<C> {
    /// RPC and signer
    chain: C,
    /// Contract addresses and expected chain id
    deployment: NetworkDeployment,
    /// Range half-width in tick spacings
    width: TickWidth,
    /// Mint minimum policy
    slippage: Slippage,
    /// Mint deadline, seconds from submission
    deadline_secs: u64,
}

/// The pool a batch stopped at
#[derive(Debug)]
pub struct BatchFailure {
    /// Index of the failed request in the batch
    pub index: usize,
    /// Why it failed
    pub error: Report,
}

/// Result of a fail-fast batch run.
///
/// Pools completed before a failure stay provisioned; requests after it are
/// never attempted.
#[derive(Debug)]
pub struct BatchOutcome {
    /// Pools that were fully provisioned, in batch order
    pub completed: Vec<ProvisionOutcome>,
    /// The failure that stopped the batch, if any
    pub failure: Option<BatchFailure>,
}

impl BatchOutcome {
    /// Turns the outcome into an error if the batch stopped early.
    ///
    /// # Errors
    /// * The failing pool's error, annotated with its batch index
    pub fn into_result(self) -> Result<Vec<ProvisionOutcome>> {
        match self.failure {
            None => Ok(self.completed),
            Some(BatchFailure { index, error }) => Err(error.wrap_err(format!(
                "batch stopped at pool #{index} after {} completed",
                self.completed.len()
            ))),
        }
    }
}

impl<C: ChainClient> PoolProvisioner<C> {
    /// Creates a provisioner.
    ///
    /// # Arguments
    /// * `chain` - RPC and signer
    /// * `deployment` - contract addresses of the target network
    /// * `width` - position range half-width, in tick spacings
    /// * `slippage` - minimum amount policy of the mint
    /// * `deadline_secs` - how long a mint stays valid after it is built
    ///
    /// # Errors
    /// * `InvalidSlippage` if the tolerance is above 100%
    pub fn new(
        chain: C,
        deployment: NetworkDeployment,
        width: TickWidth,
        slippage: Slippage,
        deadline_secs: u64,
    ) -> Result<Self, EngineError> {
        Ok(Self {
            chain,
            deployment,
            width,
            slippage: slippage.validate()?,
            deadline_secs,
        })
    }

    /// The chain client
    pub const fn chain(&self) -> &C {
        &self.chain
    }

    /// Fails unless the connected chain is the one the deployment is for.
    ///
    /// # Errors
    /// * If the chain id cannot be read or does not match
    pub async fn verify_chain(&self) -> Result<()> {
        let chain_id = self.chain.chain_id().await.wrap_err("failed to read chain id")?;
        if chain_id != self.deployment.chain_id {
            bail!(
                "connected to chain {chain_id} but network {:?} is chain {}",
                self.deployment.network,
                self.deployment.chain_id
            );
        }
        Ok(())
    }

    /// Validates a request and resolves its token metadata.
    ///
    /// Fee tier, token distinctness and the input token are checked before
    /// anything is read from chain.
    ///
    /// # Errors
    /// * `UnsupportedFee`, `IdenticalTokens` or `TokenNotInPair` on bad input
    /// * If token metadata cannot be read
    /// * `InvalidAmount`, `ZeroDenominator` or `SqrtPriceOutOfBounds` if the
    ///   reserves do not describe an initializable price
    pub async fn plan(&self, request: &PoolRequest) -> Result<PoolPlan> {
        let context = || {
            format!(
                "invalid pool request {}/{} fee {}",
                request.token_a, request.token_b, request.fee
            )
        };
        let fee = FeeTier::try_from(request.fee).wrap_err_with(context)?;
        let reserves = OrderedPair::new(
            request.token_a,
            request.reserve_a.as_str(),
            request.token_b,
            request.reserve_b.as_str(),
        )
        .wrap_err_with(context)?;
        reserves.position_of(request.input_token).wrap_err_with(context)?;

        let (token0, token1) = reserves.addresses();
        let descriptor0 = self.token(token0).await?;
        let descriptor1 = self.token(token1).await?;

        let describe = || {
            format!(
                "cannot price {}/{} fee {fee} from reserves {} / {}",
                descriptor0.symbol,
                descriptor1.symbol,
                reserves.first().payload,
                reserves.second().payload
            )
        };
        let reserve0 = descriptor0
            .parse_units(reserves.first().payload)
            .wrap_err_with(describe)?;
        let reserve1 = descriptor1
            .parse_units(reserves.second().payload)
            .wrap_err_with(describe)?;
        let sqrt_price_x96 = encode_sqrt_price_x96(
            &BigDecimal::new(u256_to_big(reserve1), 0),
            &BigDecimal::new(u256_to_big(reserve0), 0),
        )
        .wrap_err_with(describe)?;
        ensure_initializable(sqrt_price_x96).wrap_err_with(describe)?;

        let plan = PoolPlan {
            pair: OrderedPair::new(token0, descriptor0, token1, descriptor1)?,
            fee,
            sqrt_price_x96,
            input_token: request.input_token,
            input_amount: request.input_amount.clone(),
        };
        debug!("provision::pool: {plan} initial sqrt price {sqrt_price_x96}");
        Ok(plan)
    }

    /// Reads where the pool of `plan` currently stands.
    ///
    /// # Errors
    /// * If the factory is not in the deployment registry
    /// * If the factory or pool cannot be read
    pub async fn locate(&self, plan: &PoolPlan) -> Result<ProvisionState> {
        let factory = self.deployment.resolve(Contract::Factory)?;
        let (token0, token1) = plan.pair.addresses();

        let Some(pool) = self
            .chain
            .pool_address(factory, token0, token1, plan.fee)
            .await
            .wrap_err_with(|| format!("failed to look up pool {plan}"))?
        else {
            info!("provision::pool: {plan} has no pool yet");
            return Ok(ProvisionState::NotFound);
        };

        let state = self
            .chain
            .pool_state(pool)
            .await
            .wrap_err_with(|| format!("failed to read pool {pool} ({plan})"))?;
        if !state.is_initialized() {
            info!("provision::pool: {plan} pool {pool} exists without a price");
            return Ok(ProvisionState::NotFound);
        }

        info!(
            "provision::pool: {plan} pool {pool} already priced at tick {}",
            state.tick
        );
        Ok(ProvisionState::Initialized(state))
    }

    /// Performs the single transition out of `state`.
    ///
    /// `LiquidityAdded` is terminal and is returned unchanged.
    ///
    /// # Arguments
    ///
    /// * `plan` - The validated request
    /// * `state` - Where the pool currently stands, usually from [`Self::locate`]
    ///
    /// # Returns
    ///
    /// The state after the step, confirmed on chain
    ///
    /// # Errors
    /// * If any read or transaction of the step fails; the step is named
    ///   in the error together with the pair and fee
    pub async fn advance(&self, plan: &PoolPlan, state: ProvisionState) -> Result<ProvisionState> {
        match state {
            ProvisionState::NotFound => self.initialize(plan).await.map(ProvisionState::Initialized),
            ProvisionState::Initialized(pool) => self
                .add_liquidity(plan, pool)
                .await
                .map(|outcome| ProvisionState::LiquidityAdded(Box::new(outcome))),
            done @ ProvisionState::LiquidityAdded(_) => Ok(done),
        }
    }

    /// Runs one request through the whole pipeline, picking up wherever the
    /// pool already is.
    ///
    /// # Errors
    /// * Invalid input, before anything is read from chain
    /// * If the connected chain does not match the deployment
    /// * The first failing step
    pub async fn provision(&self, request: &PoolRequest) -> Result<ProvisionOutcome> {
        let plan = self.plan(request).await?;
        self.verify_chain().await?;

        let mut state = self.locate(&plan).await?;
        loop {
            state = match state {
                ProvisionState::LiquidityAdded(outcome) => return Ok(*outcome),
                pending => self.advance(&plan, pending).await?,
            };
            info!("provision::pool: {plan} is {state}");
        }
    }

    /// Provisions `requests` in order, stopping at the first failure.
    ///
    /// Completed pools are not rolled back.
    ///
    /// # Arguments
    ///
    /// * `requests` - Pools to provision, in order
    /// * `on_complete` - Called with the batch index after each pool finishes
    ///
    /// # Returns
    ///
    /// The outcomes of the pools that finished and, if one failed, its index
    /// and error
    pub async fn provision_batch<F>(&self, requests: &[PoolRequest], mut on_complete: F) -> BatchOutcome
    where
        F: FnMut(usize, &ProvisionOutcome),
    {
        let mut completed = Vec::with_capacity(requests.len());

        for (index, request) in requests.iter().enumerate() {
            match self.provision(request).await {
                Ok(outcome) => {
                    on_complete(index, &outcome);
                    completed.push(outcome);
                }
                Err(error) => {
                    error!(
                        "provision::pool: Pool #{index} failed, skipping the remaining {}: {error:#}",
                        requests.len() - index - 1
                    );
                    return BatchOutcome {
                        completed,
                        failure: Some(BatchFailure { index, error }),
                    };
                }
            }
        }

        BatchOutcome {
            completed,
            failure: None,
        }
    }

    /// Token metadata, with the address in the error
    async fn token(&self, address: Address) -> Result<TokenDescriptor> {
        self.chain
            .token_descriptor(address)
            .await
            .wrap_err_with(|| format!("failed to read token metadata of {address}"))
    }

    /// `NotFound -> Initialized`
    async fn initialize(&self, plan: &PoolPlan) -> Result<PoolState> {
        let manager = self.deployment.resolve(Contract::PositionManager)?;
        let (token0, token1) = plan.pair.addresses();

        let pool = self
            .chain
            .create_and_initialize_pool(manager, token0, token1, plan.fee, plan.sqrt_price_x96)
            .await
            .wrap_err_with(|| format!("failed to create and initialize pool {plan}"))?;

        // The confirmed price is authoritative from here on
        let state = self
            .chain
            .pool_state(pool)
            .await
            .wrap_err_with(|| format!("failed to read pool {pool} ({plan}) after initialization"))?;
        if state.sqrt_price_x96 != plan.sqrt_price_x96 {
            info!(
                "provision::pool: {plan} was already priced at {}, keeping it",
                state.sqrt_price_x96
            );
        }
        Ok(state)
    }

    /// `Initialized -> LiquidityAdded`
    async fn add_liquidity(&self, plan: &PoolPlan, pool: PoolState) -> Result<ProvisionOutcome> {
        let manager = self.deployment.resolve(Contract::PositionManager)?;

        let (input, other) = if plan.input_token == plan.token0().address {
            (plan.token0(), plan.token1())
        } else {
            (plan.token1(), plan.token0())
        };
        let position = size_position(&PositionRequest {
            chain_id: self.deployment.chain_id,
            pool: &pool,
            token0: input,
            token1: other,
            input_token0_amount: &plan.input_amount,
            width: self.width,
        })
        .wrap_err_with(|| format!("failed to size position for {plan}"))?;
        debug!("provision::pool: Sized {position}");

        let amounts = position.mint_amounts;
        for (token, amount) in [(&position.token0, amounts.amount0), (&position.token1, amounts.amount1)] {
            self.ensure_allowance(token, manager, amount)
                .await
                .wrap_err_with(|| format!("failed to approve {} for {plan}", token.symbol))?;
        }

        let request = MintRequest {
            position_manager: manager,
            token0: position.token0.address,
            token1: position.token1.address,
            fee: position.fee,
            tick_lower: position.tick_lower,
            tick_upper: position.tick_upper,
            amount0_desired: amounts.amount0,
            amount1_desired: amounts.amount1,
            amount0_min: self.slippage.minimum(amounts.amount0)?,
            amount1_min: self.slippage.minimum(amounts.amount1)?,
            recipient: self.chain.owner(),
            deadline: self.deadline()?,
        };
        let receipt = self
            .chain
            .mint(&request)
            .await
            .wrap_err_with(|| format!("failed to mint position in {plan}"))?;

        info!(
            "provision::pool: Minted token id {} with liquidity {} in {}",
            receipt.token_id, receipt.liquidity, receipt.tx_hash
        );
        Ok(ProvisionOutcome {
            pool,
            position,
            receipt,
        })
    }

    /// Grants the position manager an unlimited allowance unless the current
    /// one already covers `amount`.
    async fn ensure_allowance(&self, token: &TokenDescriptor, spender: Address, amount: U256) -> Result<()> {
        if amount.is_zero() {
            return Ok(());
        }

        let current = self
            .chain
            .allowance(token.address, self.chain.owner(), spender)
            .await?;
        if current >= amount {
            info!(
                "provision::pool: {} allowance {current} covers {amount}, skipping approval",
                token.symbol
            );
            return Ok(());
        }

        let tx_hash = self.chain.approve(token.address, spender, U256::MAX).await?;
        info!("provision::pool: Approved {} for {spender} in {tx_hash}", token.symbol);
        Ok(())
    }

    /// Unix timestamp `deadline_secs` from now
    fn deadline(&self) -> Result<u64> {
        let now = u64::try_from(Utc::now().timestamp())
            .map_err(|_| eyre!("system clock is before the unix epoch"))?;
        Ok(now.saturating_add(self.deadline_secs))
    }
}
