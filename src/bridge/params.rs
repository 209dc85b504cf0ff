// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
use alloy_chains::NamedChain;
use alloy_primitives::{Address, TxHash, U256};
use bon::Builder;

use crate::chain::OftChain;
use crate::error::{BridgeError, Result};
use crate::protocol::rescale_amount;

/// Parameters for bridging tokens from one chain to another
///
/// `amount` is in the source token's smallest unit, use
/// [`parse_amount`](crate::parse_amount) to convert user input. When the token
/// has a different number of decimals on each chain, set both
/// `source_decimals` and `destination_decimals` so the arrival is matched in
/// destination units.
#[derive(Builder, Debug, Clone, PartialEq, Eq)]
pub struct BridgeParams {
    source_chain: NamedChain,
    destination_chain: NamedChain,
    recipient: Address,
    amount: U256,
    source_decimals: Option<u8>,
    destination_decimals: Option<u8>,
}

impl BridgeParams {
    pub fn source_chain(&self) -> NamedChain {
        self.source_chain
    }

    pub fn destination_chain(&self) -> NamedChain {
        self.destination_chain
    }

    pub fn recipient(&self) -> Address {
        self.recipient
    }

    pub fn amount(&self) -> U256 {
        self.amount
    }

    pub fn source_decimals(&self) -> Option<u8> {
        self.source_decimals
    }

    pub fn destination_decimals(&self) -> Option<u8> {
        self.destination_decimals
    }

    /// The amount the recipient should receive, in the destination token's
    /// smallest units.
    ///
    /// Equal to [`amount`](Self::amount) unless both decimals are known.
    /// Saturates on overflow, which [`validate`](Self::validate) rejects.
    pub fn expected_amount(&self) -> U256 {
        match (self.source_decimals, self.destination_decimals) {
            (Some(from), Some(to)) => rescale_amount(self.amount, from, to).unwrap_or(U256::MAX),
            _ => self.amount,
        }
    }

    /// Checks the parameters before anything touches a chain.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::InvalidInput`] for a zero amount, the zero address as
    ///   recipient, identical source and destination chains, or an amount
    ///   that does not survive conversion to the destination's decimals
    /// - [`BridgeError::ChainNotSupported`] if either chain has no messaging
    ///   endpoint
    pub fn validate(&self) -> Result<()> {
        if self.amount.is_zero() {
            return Err(BridgeError::InvalidInput(
                "amount must be greater than zero".to_string(),
            ));
        }
        if self.recipient == Address::ZERO {
            return Err(BridgeError::InvalidInput(
                "recipient must not be the zero address".to_string(),
            ));
        }
        if self.source_chain == self.destination_chain {
            return Err(BridgeError::InvalidInput(format!(
                "source and destination are both {}",
                self.source_chain
            )));
        }
        if let (Some(from), Some(to)) = (self.source_decimals, self.destination_decimals) {
            match rescale_amount(self.amount, from, to) {
                Some(expected) if !expected.is_zero() => {}
                Some(_) => {
                    return Err(BridgeError::InvalidInput(format!(
                        "amount {} is below the smallest unit on {} ({to} decimals)",
                        self.amount, self.destination_chain
                    )))
                }
                None => {
                    return Err(BridgeError::InvalidInput(format!(
                        "amount {} overflows at {to} decimals",
                        self.amount
                    )))
                }
            }
        }
        self.source_chain.endpoint_id()?;
        self.destination_chain.endpoint_id()?;
        Ok(())
    }
}

/// A bridge whose source transaction was accepted by the source chain.
///
/// Immutable once created; detection runs read the destination, recipient and
/// amount from here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeRequest {
    params: BridgeParams,
    source_tx: TxHash,
}

impl BridgeRequest {
    /// Wraps already-submitted parameters, e.g. to resume waiting for a
    /// transfer sent by an earlier process.
    pub fn from_accepted(params: BridgeParams, source_tx: TxHash) -> Self {
        Self { params, source_tx }
    }

    pub fn params(&self) -> &BridgeParams {
        &self.params
    }

    pub fn source_chain(&self) -> NamedChain {
        self.params.source_chain
    }

    pub fn destination_chain(&self) -> NamedChain {
        self.params.destination_chain
    }

    pub fn recipient(&self) -> Address {
        self.params.recipient
    }

    pub fn amount(&self) -> U256 {
        self.params.amount
    }

    /// See [`BridgeParams::expected_amount`].
    pub fn expected_amount(&self) -> U256 {
        self.params.expected_amount()
    }

    pub fn source_tx(&self) -> TxHash {
        self.source_tx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn params(
        source: NamedChain,
        destination: NamedChain,
        recipient: Address,
        amount: u64,
    ) -> BridgeParams {
        BridgeParams::builder()
            .source_chain(source)
            .destination_chain(destination)
            .recipient(recipient)
            .amount(U256::from(amount))
            .build()
    }

    #[test]
    fn test_bridge_params_builder() {
        let params = params(
            NamedChain::Sepolia,
            NamedChain::ArbitrumSepolia,
            Address::repeat_byte(1),
            1000,
        );

        assert_eq!(params.source_chain(), NamedChain::Sepolia);
        assert_eq!(params.destination_chain(), NamedChain::ArbitrumSepolia);
        assert_eq!(params.recipient(), Address::repeat_byte(1));
        assert_eq!(params.amount(), U256::from(1000));
        assert!(params.validate().is_ok());
    }

    #[rstest]
    #[case::zero_amount(NamedChain::Sepolia, NamedChain::BaseSepolia, Address::repeat_byte(1), 0)]
    #[case::zero_recipient(NamedChain::Sepolia, NamedChain::BaseSepolia, Address::ZERO, 10)]
    #[case::same_chain(NamedChain::Sepolia, NamedChain::Sepolia, Address::repeat_byte(1), 10)]
    fn test_validate_rejects_input(
        #[case] source: NamedChain,
        #[case] destination: NamedChain,
        #[case] recipient: Address,
        #[case] amount: u64,
    ) {
        let result = params(source, destination, recipient, amount).validate();
        assert!(matches!(result, Err(BridgeError::InvalidInput(_))));
    }

    #[test]
    fn test_validate_rejects_unsupported_chain() {
        let result = params(
            NamedChain::Sepolia,
            NamedChain::Gnosis,
            Address::repeat_byte(1),
            10,
        )
        .validate();
        assert!(matches!(result, Err(BridgeError::ChainNotSupported { .. })));
    }

    #[test]
    fn test_expected_amount_in_destination_decimals() {
        let params = BridgeParams::builder()
            .source_chain(NamedChain::Sepolia)
            .destination_chain(NamedChain::ArbitrumSepolia)
            .recipient(Address::repeat_byte(1))
            .amount(U256::from(1_500_000_000_000_000_000u64))
            .source_decimals(18)
            .destination_decimals(6)
            .build();

        assert!(params.validate().is_ok());
        assert_eq!(params.amount(), U256::from(1_500_000_000_000_000_000u64));
        assert_eq!(params.expected_amount(), U256::from(1_500_000u64));
        let request = BridgeRequest::from_accepted(params, TxHash::ZERO);
        assert_eq!(request.expected_amount(), U256::from(1_500_000u64));
    }

    #[test]
    fn test_expected_amount_without_decimals_is_amount() {
        let params = BridgeParams::builder()
            .source_chain(NamedChain::Sepolia)
            .destination_chain(NamedChain::ArbitrumSepolia)
            .recipient(Address::repeat_byte(1))
            .amount(U256::from(42u64))
            .destination_decimals(6)
            .build();
        assert_eq!(params.expected_amount(), U256::from(42u64));
    }

    #[rstest]
    #[case::below_destination_precision(18, 6, 999_999_999_999)]
    #[case::overflows_destination(0, 255, 1)]
    fn test_validate_rejects_unconvertible_amount(
        #[case] source_decimals: u8,
        #[case] destination_decimals: u8,
        #[case] amount: u64,
    ) {
        let params = BridgeParams::builder()
            .source_chain(NamedChain::Sepolia)
            .destination_chain(NamedChain::ArbitrumSepolia)
            .recipient(Address::repeat_byte(1))
            .amount(U256::from(amount))
            .source_decimals(source_decimals)
            .destination_decimals(destination_decimals)
            .build();
        assert!(matches!(params.validate(), Err(BridgeError::InvalidInput(_))));
    }

    #[test]
    fn test_request_exposes_params() {
        let params = params(
            NamedChain::BaseSepolia,
            NamedChain::OptimismSepolia,
            Address::repeat_byte(7),
            42,
        );
        let request = BridgeRequest::from_accepted(params.clone(), TxHash::repeat_byte(3));

        assert_eq!(request.params(), &params);
        assert_eq!(request.source_chain(), NamedChain::BaseSepolia);
        assert_eq!(request.destination_chain(), NamedChain::OptimismSepolia);
        assert_eq!(request.recipient(), Address::repeat_byte(7));
        assert_eq!(request.amount(), U256::from(42));
        assert_eq!(request.source_tx(), TxHash::repeat_byte(3));
    }
}
