// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
use alloy_chains::NamedChain;
use std::str::FromStr;

use crate::error::{BridgeError, Result};
use crate::protocol::EndpointId;

/// Bridge configuration for chains reachable through the messaging layer
///
/// Implemented on `alloy_chains::NamedChain`.
///
/// # Example
///
/// ```rust
/// use xbridge_rs::{EndpointId, OftChain};
/// use alloy_chains::NamedChain;
///
/// assert!(NamedChain::BaseSepolia.is_supported());
/// assert_eq!(NamedChain::BaseSepolia.endpoint_id().unwrap(), EndpointId::BaseSepolia);
/// ```
pub trait OftChain {
    /// Returns true if the chain has a messaging endpoint
    fn is_supported(&self) -> bool;

    /// Returns the messaging endpoint id of the chain
    fn endpoint_id(&self) -> Result<EndpointId>;

    /// Typical seconds until a source transaction is considered confirmed
    fn confirmation_average_time_seconds(&self) -> Result<u64>;
}

impl OftChain for NamedChain {
    fn is_supported(&self) -> bool {
        self.endpoint_id().is_ok()
    }

    fn endpoint_id(&self) -> Result<EndpointId> {
        use NamedChain::*;

        match self {
            Mainnet => Ok(EndpointId::Ethereum),
            BinanceSmartChain => Ok(EndpointId::BnbSmartChain),
            Avalanche => Ok(EndpointId::Avalanche),
            Polygon => Ok(EndpointId::Polygon),
            Arbitrum => Ok(EndpointId::Arbitrum),
            Optimism => Ok(EndpointId::Optimism),
            Linea => Ok(EndpointId::Linea),
            Base => Ok(EndpointId::Base),
            Scroll => Ok(EndpointId::Scroll),
            // Testnets
            BinanceSmartChainTestnet => Ok(EndpointId::BnbSmartChainTestnet),
            AvalancheFuji => Ok(EndpointId::AvalancheFuji),
            Sepolia => Ok(EndpointId::Sepolia),
            ArbitrumSepolia => Ok(EndpointId::ArbitrumSepolia),
            OptimismSepolia => Ok(EndpointId::OptimismSepolia),
            BaseSepolia => Ok(EndpointId::BaseSepolia),
            PolygonAmoy => Ok(EndpointId::PolygonAmoy),
            _ => Err(BridgeError::ChainNotSupported {
                chain: self.to_string(),
            }),
        }
    }

    fn confirmation_average_time_seconds(&self) -> Result<u64> {
        use NamedChain::*;

        match self {
            Mainnet | Sepolia => Ok(15),
            BinanceSmartChain | BinanceSmartChainTestnet => Ok(3),
            Avalanche | AvalancheFuji => Ok(2),
            Polygon | PolygonAmoy => Ok(2),
            Arbitrum | ArbitrumSepolia => Ok(1),
            Optimism | OptimismSepolia | Base | BaseSepolia => Ok(2),
            Linea => Ok(3),
            Scroll => Ok(3),
            _ => Err(BridgeError::ChainNotSupported {
                chain: self.to_string(),
            }),
        }
    }
}

/// Resolves a network argument to a supported chain.
///
/// Accepts kebab-case chain names (`arbitrum-sepolia`), snake_case and
/// camelCase spellings (`arbitrum_sepolia`, `arbitrumSepolia`), a few common
/// aliases (`ethereum`, `eth`, `bsc`, `amoy`, `fuji`) and numeric EVM chain ids.
///
/// ```rust
/// use xbridge_rs::parse_network;
/// use alloy_chains::NamedChain;
///
/// assert_eq!(parse_network("arbitrumSepolia").unwrap(), NamedChain::ArbitrumSepolia);
/// assert_eq!(parse_network("11155111").unwrap(), NamedChain::Sepolia);
/// ```
pub fn parse_network(name: &str) -> Result<NamedChain> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(BridgeError::InvalidInput(
            "network name is empty".to_string(),
        ));
    }

    let normalized = normalize_network_name(trimmed);
    let chain = match normalized.as_str() {
        "ethereum" | "eth" | "mainnet" => Some(NamedChain::Mainnet),
        "bsc" | "bnb" => Some(NamedChain::BinanceSmartChain),
        "bsc-testnet" | "bnb-testnet" => Some(NamedChain::BinanceSmartChainTestnet),
        "amoy" | "polygon-amoy" => Some(NamedChain::PolygonAmoy),
        "fuji" | "avalanche-fuji" => Some(NamedChain::AvalancheFuji),
        _ => None,
    };

    let chain = match chain {
        Some(chain) => chain,
        None => match normalized.parse::<u64>() {
            Ok(id) => NamedChain::try_from(id).map_err(|_| {
                BridgeError::InvalidInput(format!("unknown chain id: {id}"))
            })?,
            Err(_) => NamedChain::from_str(&normalized).map_err(|_| {
                BridgeError::InvalidInput(format!("unknown network: {trimmed}"))
            })?,
        },
    };

    if !chain.is_supported() {
        return Err(BridgeError::ChainNotSupported {
            chain: chain.to_string(),
        });
    }
    Ok(chain)
}

/// Lowercases and converts `_` and camelCase word boundaries to `-`.
fn normalize_network_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut previous_lower = false;
    for c in name.chars() {
        if c == '_' || c == ' ' {
            out.push('-');
            previous_lower = false;
        } else if c.is_ascii_uppercase() {
            if previous_lower {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
            previous_lower = false;
        } else {
            out.push(c);
            previous_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        }
    }
    out
}
