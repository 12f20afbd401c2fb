use std::collections::HashMap;
use std::fmt::{self, Display};
use std::fs;
use std::path::Path;

use alloy::primitives::Address;
use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Contracts the engine talks to, by the name they are deployed under
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Contract {
    /// Pool factory
    #[serde(rename = "UniswapV3Factory")]
    Factory,
    /// Position manager (liquidity NFT)
    #[serde(rename = "NonfungiblePositionManager")]
    PositionManager,
    /// Multi-hop swap router
    #[serde(rename = "SwapRouter")]
    SwapRouter,
}

impl Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Factory => write!(f, "UniswapV3Factory"),
            Self::PositionManager => write!(f, "NonfungiblePositionManager"),
            Self::SwapRouter => write!(f, "SwapRouter"),
        }
    }
}

/// Deployed addresses for one network
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDeployment {
    /// Network name the entry was loaded under
    #[serde(skip)]
    pub network: String,
    /// Chain id the addresses are valid on
    pub chain_id: u64,
    /// Logical name -> address
    pub contracts: HashMap<Contract, Address>,
}

impl NetworkDeployment {
    /// Address of `contract` on this network.
    ///
    /// # Errors
    /// * `UnknownContract` if it was never deployed here
    pub fn resolve(&self, contract: Contract) -> Result<Address, EngineError> {
        self.contracts
            .get(&contract)
            .copied()
            .ok_or_else(|| EngineError::UnknownContract {
                contract: contract.to_string(),
                network: self.network.clone(),
            })
    }
}

/// Registry of all known deployments, keyed by network name.
///
/// ```json
/// {
///   "base-sepolia": {
///     "chainId": 84532,
///     "contracts": {
///       "UniswapV3Factory": "0x4752ba5DBc23f44D87826276BF6Fd6b1C372aD24",
///       "NonfungiblePositionManager": "0x27F971cb582BF9E50F397e4d29a5C7A34f11faA2"
///     }
///   }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Deployments {
    /// Deployments keyed by network name
    networks: HashMap<String, NetworkDeployment>,
}

impl Deployments {
    /// Parses a registry from JSON.
    ///
    /// # Errors
    /// * If the JSON does not match the registry layout
    pub fn from_json(json: &str) -> Result<Self> {
        let mut deployments: Self =
            serde_json::from_str(json).wrap_err("malformed deployment registry")?;
        for (name, deployment) in &mut deployments.networks {
            deployment.network.clone_from(name);
        }
        Ok(deployments)
    }

    /// Reads and parses a registry file.
    ///
    /// # Errors
    /// * If the file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .wrap_err_with(|| format!("cannot read deployment registry {}", path.display()))?;
        Self::from_json(&json)
    }

    /// Deployment entry of `network`.
    ///
    /// # Errors
    /// * `UnknownNetwork` if there is none
    pub fn network(&self, network: &str) -> Result<&NetworkDeployment, EngineError> {
        self.networks
            .get(network)
            .ok_or_else(|| EngineError::UnknownNetwork(network.to_string()))
    }
}
