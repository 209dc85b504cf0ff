// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Alloy-backed token balance reads.

use alloy_chains::NamedChain;
use alloy_primitives::{Address, U256};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, instrument};

use crate::config::NetworkConfig;
use crate::contracts::erc20::Erc20Contract;
use crate::error::{BridgeError, Result};
use crate::traits::BalanceSource;

/// A connection to one chain plus the token deployed there.
#[derive(Debug, Clone)]
pub struct ChainClient {
    provider: DynProvider,
    token: Address,
}

impl ChainClient {
    pub fn new(provider: DynProvider, token: Address) -> Self {
        Self { provider, token }
    }

    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }

    pub fn token(&self) -> Address {
        self.token
    }
}

/// Per-chain RPC clients, created on first use from a [`NetworkConfig`].
///
/// Cheap to clone; clones share the cache.
#[derive(Debug, Clone, Default)]
pub struct ChainClients {
    config: Arc<NetworkConfig>,
    clients: Arc<RwLock<HashMap<NamedChain, ChainClient>>>,
}

impl ChainClients {
    pub fn new(config: NetworkConfig) -> Self {
        Self {
            config: Arc::new(config),
            clients: Arc::default(),
        }
    }

    /// Registers a pre-built client, e.g. one with a wallet attached.
    pub fn insert(&self, chain: NamedChain, client: ChainClient) -> Result<()> {
        self.clients
            .write()
            .map_err(|_| BridgeError::Provider("client cache lock poisoned".to_string()))?
            .insert(chain, client);
        Ok(())
    }

    /// Returns the client for `chain`, connecting it if needed.
    ///
    /// # Errors
    ///
    /// [`BridgeError::InvalidConfig`] if the network configuration has no
    /// deployment for `chain`.
    pub fn client(&self, chain: NamedChain) -> Result<ChainClient> {
        {
            let clients = self
                .clients
                .read()
                .map_err(|_| BridgeError::Provider("client cache lock poisoned".to_string()))?;
            if let Some(client) = clients.get(&chain) {
                return Ok(client.clone());
            }
        }

        let entry = self.config.entry(chain)?;
        let provider = ProviderBuilder::new()
            .connect_http(entry.rpc_url.clone())
            .erased();
        debug!(chain = %chain, rpc_url = %entry.rpc_url, event = "chain_client_connected");

        let mut clients = self
            .clients
            .write()
            .map_err(|_| BridgeError::Provider("client cache lock poisoned".to_string()))?;
        Ok(clients
            .entry(chain)
            .or_insert_with(|| ChainClient::new(provider, entry.token))
            .clone())
    }

    /// Checks that `chain` has a registered client or a configured deployment.
    pub fn ensure_configured(&self, chain: NamedChain) -> Result<()> {
        let connected = self
            .clients
            .read()
            .map_err(|_| BridgeError::Provider("client cache lock poisoned".to_string()))?
            .contains_key(&chain);
        if connected {
            return Ok(());
        }
        self.config.entry(chain).map(|_| ())
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }
}

/// [`BalanceSource`] reading the configured token's `balanceOf` over RPC.
///
/// # Examples
///
/// ```rust,no_run
/// use xbridge_rs::providers::{ChainClients, Erc20BalanceSource};
/// use xbridge_rs::{BalanceSource, NetworkConfig};
/// use alloy_chains::NamedChain;
/// use alloy_primitives::Address;
///
/// # async fn example() -> xbridge_rs::Result<()> {
/// let config = NetworkConfig::load("deployments.json")?.with_env_overrides()?;
/// let balances = Erc20BalanceSource::new(ChainClients::new(config));
/// let balance = balances
///     .balance_of(Address::repeat_byte(1), NamedChain::ArbitrumSepolia)
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Erc20BalanceSource {
    clients: ChainClients,
}

impl Erc20BalanceSource {
    pub fn new(clients: ChainClients) -> Self {
        Self { clients }
    }

    pub fn clients(&self) -> &ChainClients {
        &self.clients
    }
}

#[async_trait]
impl BalanceSource for Erc20BalanceSource {
    #[instrument(skip(self), fields(chain = %chain, address = %address))]
    async fn balance_of(&self, address: Address, chain: NamedChain) -> Result<U256> {
        let client = self.clients.client(chain)?;
        let erc20 = Erc20Contract::new(client.token, client.provider);
        erc20
            .balance_of(address)
            .await
            .map_err(|e| BridgeError::BalanceRead {
                chain: chain.to_string(),
                reason: e.to_string(),
            })
    }

    fn check_chain(&self, chain: NamedChain) -> Result<()> {
        self.clients.ensure_configured(chain)
    }
}
