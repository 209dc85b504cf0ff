// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Network configuration
//!
//! Where each chain's RPC endpoint and token deployment live. Loaded from a
//! JSON deployments file keyed by network name:
//!
//! ```json
//! {
//!   "sepolia": {
//!     "chainId": 11155111,
//!     "rpcUrl": "https://ethereum-sepolia-rpc.publicnode.com",
//!     "token": "0x1111111111111111111111111111111111111111"
//!   },
//!   "arbitrum-sepolia": {
//!     "chainId": 421614,
//!     "rpcUrl": "https://sepolia-rollup.arbitrum.io/rpc",
//!     "token": "0x2222222222222222222222222222222222222222",
//!     "decimals": 18
//!   }
//! }
//! ```
//!
//! `RPC_URL_<NETWORK>` environment variables (network name upper-cased, `-`
//! replaced by `_`, e.g. `RPC_URL_ARBITRUM_SEPOLIA`) override the file's URLs.

use alloy_chains::NamedChain;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};
use url::Url;

use crate::chain::OftChain;
use crate::error::{BridgeError, Result};

/// Prefix of the per-network RPC override variables.
pub const RPC_URL_ENV_PREFIX: &str = "RPC_URL_";

/// One network's RPC endpoint and token deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkEntry {
    pub chain_id: u64,
    pub rpc_url: Url,
    /// Token contract address on this network.
    pub token: Address,
    /// Token decimals. Read from the contract when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,
}

impl NetworkEntry {
    /// The chain this entry deploys to.
    pub fn chain(&self) -> Result<NamedChain> {
        NamedChain::try_from(self.chain_id).map_err(|_| {
            BridgeError::InvalidConfig(format!("unknown chain id {}", self.chain_id))
        })
    }
}

/// Deployments for every network the bridge may touch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkConfig {
    networks: BTreeMap<String, NetworkEntry>,
}

impl NetworkConfig {
    /// Parses a deployments document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a deployments file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            BridgeError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        let config = Self::from_json(&json)?;
        info!(
            path = %path.display(),
            networks = config.networks.len(),
            event = "network_config_loaded"
        );
        Ok(config)
    }

    /// Adds or replaces the entry for `name`.
    pub fn with_network(mut self, name: impl Into<String>, entry: NetworkEntry) -> Self {
        self.networks.insert(name.into(), entry);
        self
    }

    /// Applies `RPC_URL_<NETWORK>` overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies RPC URL overrides looked up through `lookup`.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        for (name, entry) in self.networks.iter_mut() {
            let key = env_key(name);
            if let Some(raw) = lookup(&key) {
                entry.rpc_url = Url::parse(raw.trim()).map_err(|e| {
                    BridgeError::InvalidConfig(format!("{key} is not a valid URL: {e}"))
                })?;
                debug!(network = %name, variable = %key, event = "rpc_url_overridden");
            }
        }
        Ok(self)
    }

    /// Returns the entry deploying to `chain`.
    pub fn entry(&self, chain: NamedChain) -> Result<&NetworkEntry> {
        self.networks
            .values()
            .find(|entry| entry.chain_id == chain as u64)
            .ok_or_else(|| {
                BridgeError::InvalidConfig(format!("no deployment configured for {chain}"))
            })
    }

    pub fn networks(&self) -> impl Iterator<Item = (&str, &NetworkEntry)> {
        self.networks.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Checks that every entry points at a distinct, supported chain.
    pub fn validate(&self) -> Result<()> {
        let mut seen = BTreeMap::new();
        for (name, entry) in &self.networks {
            let chain = entry.chain()?;
            if !chain.is_supported() {
                return Err(BridgeError::ChainNotSupported {
                    chain: chain.to_string(),
                });
            }
            if entry.token == Address::ZERO {
                return Err(BridgeError::InvalidConfig(format!(
                    "{name}: token address is zero"
                )));
            }
            if let Some(previous) = seen.insert(entry.chain_id, name) {
                return Err(BridgeError::InvalidConfig(format!(
                    "{previous} and {name} both deploy to chain {}",
                    entry.chain_id
                )));
            }
        }
        Ok(())
    }
}

fn env_key(network: &str) -> String {
    let suffix: String = network
        .chars()
        .map(|c| match c {
            '-' | ' ' | '.' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect();
    format!("{RPC_URL_ENV_PREFIX}{suffix}")
}
