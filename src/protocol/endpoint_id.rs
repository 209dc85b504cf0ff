// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Messaging endpoint identifiers
//!
//! The messaging layer addresses chains by endpoint id rather than by EVM
//! chain id. Mainnet endpoints live in the 30xxx range, testnet endpoints in
//! the 40xxx range.

use std::fmt;

/// Messaging endpoint identifier of a chain
///
/// # Example
///
/// ```rust
/// use xbridge_rs::EndpointId;
///
/// let eid: u32 = EndpointId::Arbitrum.into();
/// assert_eq!(eid, 30110);
/// assert!(EndpointId::Sepolia.is_testnet());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
#[non_exhaustive]
pub enum EndpointId {
    Ethereum = 30101,
    BnbSmartChain = 30102,
    Avalanche = 30106,
    Polygon = 30109,
    Arbitrum = 30110,
    Optimism = 30111,
    Linea = 30183,
    Base = 30184,
    Scroll = 30214,
    BnbSmartChainTestnet = 40102,
    AvalancheFuji = 40106,
    Sepolia = 40161,
    ArbitrumSepolia = 40231,
    OptimismSepolia = 40232,
    BaseSepolia = 40245,
    PolygonAmoy = 40267,
}

impl EndpointId {
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    #[inline]
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            30101 => Some(Self::Ethereum),
            30102 => Some(Self::BnbSmartChain),
            30106 => Some(Self::Avalanche),
            30109 => Some(Self::Polygon),
            30110 => Some(Self::Arbitrum),
            30111 => Some(Self::Optimism),
            30183 => Some(Self::Linea),
            30184 => Some(Self::Base),
            30214 => Some(Self::Scroll),
            40102 => Some(Self::BnbSmartChainTestnet),
            40106 => Some(Self::AvalancheFuji),
            40161 => Some(Self::Sepolia),
            40231 => Some(Self::ArbitrumSepolia),
            40232 => Some(Self::OptimismSepolia),
            40245 => Some(Self::BaseSepolia),
            40267 => Some(Self::PolygonAmoy),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_testnet(self) -> bool {
        self.as_u32() >= 40000
    }

    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ethereum => "Ethereum",
            Self::BnbSmartChain => "BNB Smart Chain",
            Self::Avalanche => "Avalanche",
            Self::Polygon => "Polygon",
            Self::Arbitrum => "Arbitrum",
            Self::Optimism => "Optimism",
            Self::Linea => "Linea",
            Self::Base => "Base",
            Self::Scroll => "Scroll",
            Self::BnbSmartChainTestnet => "BNB Smart Chain Testnet",
            Self::AvalancheFuji => "Avalanche Fuji",
            Self::Sepolia => "Sepolia",
            Self::ArbitrumSepolia => "Arbitrum Sepolia",
            Self::OptimismSepolia => "Optimism Sepolia",
            Self::BaseSepolia => "Base Sepolia",
            Self::PolygonAmoy => "Polygon Amoy",
        }
    }
}

impl From<EndpointId> for u32 {
    #[inline]
    fn from(eid: EndpointId) -> Self {
        eid.as_u32()
    }
}

impl TryFrom<u32> for EndpointId {
    type Error = InvalidEndpointId;

    #[inline]
    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_u32(value).ok_or(InvalidEndpointId(value))
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_u32())
    }
}

/// Error returned when a u32 is not a known endpoint id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidEndpointId(pub u32);

impl fmt::Display for InvalidEndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid endpoint ID: {}", self.0)
    }
}

impl std::error::Error for InvalidEndpointId {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_ranges() {
        assert!(!EndpointId::Ethereum.is_testnet());
        assert!(!EndpointId::Scroll.is_testnet());
        assert!(EndpointId::BaseSepolia.is_testnet());
        assert!(EndpointId::BnbSmartChainTestnet.is_testnet());
    }

    #[test]
    fn test_try_from() {
        assert_eq!(EndpointId::try_from(40161).unwrap(), EndpointId::Sepolia);
        assert_eq!(
            EndpointId::try_from(30000).unwrap_err(),
            InvalidEndpointId(30000)
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(EndpointId::Arbitrum.to_string(), "Arbitrum (30110)");
        assert_eq!(
            EndpointId::ArbitrumSepolia.to_string(),
            "Arbitrum Sepolia (40231)"
        );
    }

    #[test]
    fn test_conversion_roundtrip() {
        for eid in [
            EndpointId::Ethereum,
            EndpointId::Base,
            EndpointId::Sepolia,
            EndpointId::PolygonAmoy,
        ] {
            let value: u32 = eid.into();
            assert_eq!(EndpointId::from_u32(value), Some(eid));
        }
    }
}
