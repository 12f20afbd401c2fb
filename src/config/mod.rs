//! # Configuration
//!
//! Environment-driven settings (loaded through `.env` when present) and the
//! deployment registry that maps logical contract names to addresses.

/// Deployment registry
pub mod deployments;

use std::env;
use std::path::PathBuf;

use eyre::{eyre, Result, WrapErr};
use url::Url;

pub use deployments::{Contract, Deployments, NetworkDeployment};

/// Network used when `SPROUT_NETWORK` is unset
const DEFAULT_NETWORK: &str = "base-sepolia";
/// Registry path used when `SPROUT_DEPLOYMENTS` is unset
const DEFAULT_DEPLOYMENTS: &str = "deployments.json";
/// Mint deadline, seconds from submission
const DEFAULT_DEADLINE_SECS: u64 = 1200;

/// Runtime settings
#[derive(Clone, Debug)]
pub struct Config {
    /// JSON-RPC endpoint
    pub rpc_url: Url,
    /// Hex private key of the provisioning account
    pub private_key: Option<String>,
    /// Logical network name, the key into the deployment registry
    pub network: String,
    /// Path of the deployment registry file
    pub deployments_path: PathBuf,
    /// Seconds a mint stays valid after submission
    pub deadline_secs: u64,
}

impl Config {
    /// Loads the configuration from the environment.
    ///
    /// # Environment Variables
    /// * `SPROUT_RPC_URL` - JSON-RPC endpoint (required)
    /// * `SPROUT_PRIVATE_KEY` - signer key, only needed to send transactions
    /// * `SPROUT_NETWORK` - network name, default `base-sepolia`
    /// * `SPROUT_DEPLOYMENTS` - registry path, default `deployments.json`
    /// * `SPROUT_DEADLINE_SECS` - mint deadline, default 1200
    ///
    /// # Errors
    /// * If `SPROUT_RPC_URL` is missing or not a URL
    /// * If `SPROUT_DEADLINE_SECS` is not an integer
    pub fn from_env() -> Result<Self> {
        // A missing .env file is fine; real environment variables still apply
        dotenv::dotenv().ok();

        let rpc_url = env::var("SPROUT_RPC_URL").map_err(|_| eyre!("SPROUT_RPC_URL must be set"))?;
        let rpc_url = Url::parse(&rpc_url).wrap_err("SPROUT_RPC_URL is not a valid URL")?;

        let deadline_secs = match env::var("SPROUT_DEADLINE_SECS") {
            Ok(value) => value
                .parse()
                .wrap_err_with(|| format!("SPROUT_DEADLINE_SECS={value} is not a number of seconds"))?,
            Err(_) => DEFAULT_DEADLINE_SECS,
        };

        Ok(Self {
            rpc_url,
            private_key: env::var("SPROUT_PRIVATE_KEY").ok(),
            network: env::var("SPROUT_NETWORK").unwrap_or_else(|_| DEFAULT_NETWORK.to_string()),
            deployments_path: env::var("SPROUT_DEPLOYMENTS")
                .map_or_else(|_| PathBuf::from(DEFAULT_DEPLOYMENTS), PathBuf::from),
            deadline_secs,
        })
    }

    /// The signer key.
    ///
    /// # Errors
    /// * If `SPROUT_PRIVATE_KEY` was not set
    pub fn private_key(&self) -> Result<&str> {
        self.private_key
            .as_deref()
            .ok_or_else(|| eyre!("SPROUT_PRIVATE_KEY must be set to send transactions"))
    }

    /// Loads the deployment registry entry for the configured network.
    ///
    /// # Errors
    /// * If the registry file cannot be read or parsed
    /// * If the network is missing from it
    pub fn network_deployment(&self) -> Result<NetworkDeployment> {
        let deployments = Deployments::load(&self.deployments_path)?;
        Ok(deployments.network(&self.network)?.clone())
    }
}
