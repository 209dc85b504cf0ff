// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! ERC20 contract bindings for balance reads
//!
//! The completion detector only ever needs `balanceOf`; `decimals` is used to
//! turn user-entered amounts into smallest units.

use alloy_network::Ethereum;
use alloy_primitives::{Address, U256};
use alloy_provider::Provider;
use alloy_sol_types::sol;
use tracing::{debug, trace};

use Erc20::Erc20Instance;

/// ERC20 contract wrapper for read-only calls
///
/// # Example
///
/// ```rust,no_run
/// use xbridge_rs::Erc20Contract;
/// use alloy_primitives::address;
/// use alloy_provider::ProviderBuilder;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = ProviderBuilder::new().connect("http://localhost:8545").await?;
/// let token = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
///
/// let erc20 = Erc20Contract::new(token, provider);
/// let holder = address!("1234567890123456789012345678901234567890");
/// let balance = erc20.balance_of(holder).await?;
/// # Ok(())
/// # }
/// ```
pub struct Erc20Contract<P: Provider<Ethereum>> {
    instance: Erc20Instance<P>,
}

impl<P: Provider<Ethereum>> Erc20Contract<P> {
    pub fn new(address: Address, provider: P) -> Self {
        Self {
            instance: Erc20Instance::new(address, provider),
        }
    }

    /// Get the token balance of an address, in smallest units
    pub async fn balance_of(&self, account: Address) -> Result<U256, alloy_contract::Error> {
        trace!(
            account = %account,
            contract_address = %self.instance.address(),
            event = "checking_balance"
        );

        let result = self.instance.balanceOf(account).call().await?;

        debug!(
            account = %account,
            balance = %result,
            contract_address = %self.instance.address(),
            event = "balance_retrieved"
        );

        Ok(result)
    }

    /// Get the number of decimals of the token
    pub async fn decimals(&self) -> Result<u8, alloy_contract::Error> {
        let decimals = self.instance.decimals().call().await?;
        debug!(
            decimals = decimals,
            contract_address = %self.instance.address(),
            event = "decimals_retrieved"
        );
        Ok(decimals)
    }

    /// Returns the contract address
    pub fn address(&self) -> Address {
        *self.instance.address()
    }
}

sol!(
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract Erc20 {
        function balanceOf(address account) external view returns (uint256);
        function decimals() external view returns (uint8);
    }
);
