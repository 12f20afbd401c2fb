use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use alloy::primitives::{Address, TxHash, U256};
use eyre::{bail, eyre, Result};

use crate::chain::{ChainClient, MintReceipt, MintRequest};
use crate::config::{Contract, NetworkDeployment};
use crate::math::tick_math::get_tick_at_sqrt_ratio;
use crate::models::fee::FeeTier;
use crate::models::pool::PoolState;
use crate::models::token::TokenDescriptor;

/// Parses an address, left-padding short hex strings (`"0x01"`) with zeros
pub fn address_from_str(value: &str) -> Address {
    let hex = value.trim_start_matches("0x");
    Address::from_str(&format!("{hex:0>40}")).unwrap()
}

pub fn token(address: &str, decimals: u8, symbol: &str) -> TokenDescriptor {
    TokenDescriptor::new(address_from_str(address), decimals, symbol, &format!("{symbol} Token"))
}

/// 500-fee pool trading at roughly 1:5
pub fn fixture_pool() -> PoolState {
    PoolState {
        address: address_from_str("0xBB"),
        tick: -16_096,
        tick_spacing: 10,
        fee: 500,
        sqrt_price_x96: U256::from_str("35431911422859142059220343232").unwrap(),
        liquidity: 0,
    }
}

pub fn fixture_deployment() -> NetworkDeployment {
    NetworkDeployment {
        network: "testnet".to_string(),
        chain_id: 84_532,
        contracts: HashMap::from([
            (Contract::Factory, address_from_str("0xFAC7")),
            (Contract::PositionManager, address_from_str("0x9A9A")),
            (Contract::SwapRouter, address_from_str("0x5A9")),
        ]),
    }
}

/// Everything the in-memory chain knows
#[derive(Debug, Default)]
pub struct MockLedger {
    pub tokens: HashMap<Address, TokenDescriptor>,
    pub pools: HashMap<(Address, Address, FeeTier), PoolState>,
    /// (token, owner, spender) -> allowance
    pub allowances: HashMap<(Address, Address, Address), U256>,
    /// (token, spender, amount) of every approval sent
    pub approvals: Vec<(Address, Address, U256)>,
    pub mints: Vec<MintRequest>,
    pub calls: Vec<&'static str>,
    /// (call, nth occurrence) that should fail
    pub failures: Vec<(&'static str, usize)>,
}

impl MockLedger {
    pub fn count(&self, call: &str) -> usize {
        self.calls.iter().filter(|name| **name == call).count()
    }
}

/// In-memory [`ChainClient`] mimicking the factory, position manager and ERC-20s
#[derive(Debug)]
pub struct MockChain {
    chain_id: u64,
    owner: Address,
    ledger: Mutex<MockLedger>,
}

impl MockChain {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            owner: address_from_str("0x0A0A"),
            ledger: Mutex::new(MockLedger::default()),
        }
    }

    pub fn with_token(self, token: TokenDescriptor) -> Self {
        self.ledger().tokens.insert(token.address, token);
        self
    }

    pub fn ledger(&self) -> MutexGuard<'_, MockLedger> {
        self.ledger.lock().unwrap()
    }

    /// Makes the `nth` (1-based) call of `call` fail
    pub fn fail_on(&self, call: &'static str, nth: usize) {
        self.ledger().failures.push((call, nth));
    }

    pub fn set_allowance(&self, token: Address, spender: Address, amount: U256) {
        self.ledger()
            .allowances
            .insert((token, self.owner, spender), amount);
    }

    /// A pool that was created but never given a price
    pub fn seed_unpriced_pool(&self, token0: Address, token1: Address, fee: FeeTier) {
        let mut ledger = self.ledger();
        let address = Address::with_last_byte(0xA0 + ledger.pools.len() as u8);
        ledger.pools.insert(
            (token0, token1, fee),
            PoolState {
                address,
                tick: 0,
                tick_spacing: fee.tick_spacing(),
                fee: fee.as_u32(),
                sqrt_price_x96: U256::ZERO,
                liquidity: 0,
            },
        );
    }

    /// Logs `call` and fails it if a failure was injected for this occurrence
    fn record(&self, call: &'static str) -> Result<MutexGuard<'_, MockLedger>> {
        let mut ledger = self.ledger();
        ledger.calls.push(call);
        let nth = ledger.count(call);
        if ledger.failures.contains(&(call, nth)) {
            bail!("injected failure of {call} #{nth}");
        }
        Ok(ledger)
    }
}

impl ChainClient for MockChain {
    async fn chain_id(&self) -> Result<u64> {
        let _ledger = self.record("chain_id")?;
        Ok(self.chain_id)
    }

    fn owner(&self) -> Address {
        self.owner
    }

    async fn token_descriptor(&self, token: Address) -> Result<TokenDescriptor> {
        let ledger = self.record("token_descriptor")?;
        ledger
            .tokens
            .get(&token)
            .cloned()
            .ok_or_else(|| eyre!("no token at {token}"))
    }

    async fn pool_address(
        &self,
        _factory: Address,
        token0: Address,
        token1: Address,
        fee: FeeTier,
    ) -> Result<Option<Address>> {
        let ledger = self.record("pool_address")?;
        Ok(ledger.pools.get(&(token0, token1, fee)).map(|pool| pool.address))
    }

    async fn pool_state(&self, pool: Address) -> Result<PoolState> {
        let ledger = self.record("pool_state")?;
        ledger
            .pools
            .values()
            .find(|state| state.address == pool)
            .cloned()
            .ok_or_else(|| eyre!("no pool at {pool}"))
    }

    async fn create_and_initialize_pool(
        &self,
        _position_manager: Address,
        token0: Address,
        token1: Address,
        fee: FeeTier,
        sqrt_price_x96: U256,
    ) -> Result<Address> {
        let mut ledger = self.record("create_and_initialize_pool")?;
        if token0 >= token1 {
            bail!("execution reverted: token0 must sort below token1");
        }

        let next = Address::with_last_byte(0xA0 + ledger.pools.len() as u8);
        let pool = ledger
            .pools
            .entry((token0, token1, fee))
            .or_insert_with(|| PoolState {
                address: next,
                tick: 0,
                tick_spacing: fee.tick_spacing(),
                fee: fee.as_u32(),
                sqrt_price_x96: U256::ZERO,
                liquidity: 0,
            });
        if !pool.is_initialized() {
            pool.tick = get_tick_at_sqrt_ratio(sqrt_price_x96)?;
            pool.sqrt_price_x96 = sqrt_price_x96;
        }
        Ok(pool.address)
    }

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256> {
        let ledger = self.record("allowance")?;
        Ok(ledger
            .allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or_default())
    }

    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<TxHash> {
        let mut ledger = self.record("approve")?;
        ledger.allowances.insert((token, self.owner, spender), amount);
        ledger.approvals.push((token, spender, amount));
        Ok(TxHash::with_last_byte(ledger.approvals.len() as u8))
    }

    async fn mint(&self, request: &MintRequest) -> Result<MintReceipt> {
        let mut ledger = self.record("mint")?;
        for (token, desired, minimum) in [
            (request.token0, request.amount0_desired, request.amount0_min),
            (request.token1, request.amount1_desired, request.amount1_min),
        ] {
            let allowance = ledger
                .allowances
                .get(&(token, self.owner, request.position_manager))
                .copied()
                .unwrap_or_default();
            if allowance < desired {
                bail!("execution reverted: ERC20: insufficient allowance for {token}");
            }
            if minimum > desired {
                bail!("execution reverted: Price slippage check");
            }
        }

        ledger.mints.push(request.clone());
        let minted = ledger.mints.len();
        Ok(MintReceipt {
            tx_hash: TxHash::with_last_byte(0xF0 + minted as u8),
            token_id: U256::from(minted),
            // Liquidity is not tracked by the mock
            liquidity: 0,
            amount0: request.amount0_desired,
            amount1: request.amount1_desired,
        })
    }
}
