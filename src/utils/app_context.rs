//! Everything a CLI command needs before it can touch the chain.
//!
//! Loads the environment configuration and the deployment entry of the
//! selected network once, and hands out chain clients on demand: a
//! read-only one for inspection commands and a signing one for
//! provisioning.

use alloy::providers::Provider;
use eyre::{Result, WrapErr};
use log::info;

use crate::chain::alloy_client::{connect, connect_read_only};
use crate::chain::AlloyChain;
use crate::config::{Config, NetworkDeployment};

/// Configuration plus the resolved deployment of the active network
#[derive(Clone, Debug)]
pub struct AppContext {
    /// Environment configuration
    pub config: Config,
    /// Contract addresses of `config.network`
    pub deployment: NetworkDeployment,
}

impl AppContext {
    /// Loads configuration and the deployment registry entry.
    ///
    /// # Errors
    /// * If required environment variables are missing or invalid
    /// * If the registry cannot be read or lacks the network
    pub fn new() -> Result<Self> {
        let config = Config::from_env()?;
        let deployment = config
            .network_deployment()
            .wrap_err_with(|| format!("failed to load deployments for {}", config.network))?;

        info!(
            "utils::app_context: Network {} (chain {}) via {}",
            config.network,
            deployment.chain_id,
            config.rpc_url.host_str().unwrap_or("<no host>")
        );
        Ok(Self { config, deployment })
    }

    /// Client that can only read.
    #[must_use]
    pub fn read_only_chain(&self) -> AlloyChain<impl Provider + Clone> {
        connect_read_only(self.config.rpc_url.clone())
    }

    /// Client that signs with `SPROUT_PRIVATE_KEY`.
    ///
    /// # Errors
    /// * If the key is missing or malformed
    pub fn signing_chain(&self) -> Result<AlloyChain<impl Provider + Clone>> {
        connect(self.config.rpc_url.clone(), self.config.private_key()?)
    }
}
