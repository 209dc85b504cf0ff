// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Cross-chain token (OFT) contract bindings
//!
//! The token burns on the source chain inside `send` and the messaging layer
//! mints on the destination chain. Sending requires a native messaging fee,
//! quoted with `quoteSend` beforehand.

use alloy_network::Ethereum;
use alloy_primitives::{Address, Bytes, U256};
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::sol;
use tracing::{debug, info};

use crate::protocol::{address_to_bytes32, EndpointId};
use Oft::{MessagingFee, OftInstance, SendParam};

/// Wrapper around the token's cross-chain send interface
///
/// # Example
///
/// ```rust,no_run
/// use xbridge_rs::{EndpointId, OftContract};
/// use alloy_primitives::{address, Bytes, U256};
/// use alloy_provider::ProviderBuilder;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = ProviderBuilder::new().connect("http://localhost:8545").await?;
/// let token = address!("1111111111111111111111111111111111111111");
/// let oft = OftContract::new(token, provider);
///
/// let recipient = address!("2222222222222222222222222222222222222222");
/// let amount = U256::from(10u64).pow(U256::from(18u64));
/// let param = OftContract::<alloy_provider::DynProvider>::send_param(
///     EndpointId::ArbitrumSepolia,
///     recipient,
///     amount,
///     amount,
///     Bytes::new(),
/// );
/// let fee = oft.quote_send(&param).await?;
/// let tx = oft.send_transaction(recipient, param, fee, recipient);
/// # Ok(())
/// # }
/// ```
pub struct OftContract<P: Provider<Ethereum>> {
    instance: OftInstance<P>,
}

impl<P: Provider<Ethereum>> OftContract<P> {
    pub fn new(address: Address, provider: P) -> Self {
        debug!(
            contract_address = %address,
            event = "oft_contract_initialized"
        );
        Self {
            instance: OftInstance::new(address, provider),
        }
    }

    /// Builds the send parameters for a transfer to `recipient` on `destination`
    ///
    /// `min_amount` is the least the destination must credit; the token
    /// reverts the send if dust removal would take the credited amount below it.
    pub fn send_param(
        destination: EndpointId,
        recipient: Address,
        amount: U256,
        min_amount: U256,
        extra_options: Bytes,
    ) -> SendParam {
        SendParam {
            dstEid: destination.as_u32(),
            to: address_to_bytes32(recipient),
            amountLD: amount,
            minAmountLD: min_amount,
            extraOptions: extra_options,
            composeMsg: Bytes::new(),
            oftCmd: Bytes::new(),
        }
    }

    /// Quotes the messaging fee for `param`, payable in native gas token
    pub async fn quote_send(&self, param: &SendParam) -> Result<MessagingFee, alloy_contract::Error> {
        let fee = self.instance.quoteSend(param.clone(), false).call().await?;

        info!(
            destination_eid = param.dstEid,
            amount = %param.amountLD,
            native_fee = %fee.nativeFee,
            contract_address = %self.instance.address(),
            event = "send_fee_quoted"
        );

        Ok(fee)
    }

    /// Create the `send` transaction request, attaching the quoted native fee
    ///
    /// This creates but does not send the transaction.
    pub fn send_transaction(
        &self,
        from: Address,
        param: SendParam,
        fee: MessagingFee,
        refund_address: Address,
    ) -> TransactionRequest {
        info!(
            from = %from,
            destination_eid = param.dstEid,
            amount = %param.amountLD,
            native_fee = %fee.nativeFee,
            contract_address = %self.instance.address(),
            event = "send_transaction_created"
        );

        let value = fee.nativeFee;
        self.instance
            .send(param, fee, refund_address)
            .from(from)
            .value(value)
            .into_transaction_request()
    }

    /// Returns the contract address
    pub fn address(&self) -> Address {
        *self.instance.address()
    }
}

sol!(
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract Oft {
        struct SendParam {
            uint32 dstEid;
            bytes32 to;
            uint256 amountLD;
            uint256 minAmountLD;
            bytes extraOptions;
            bytes composeMsg;
            bytes oftCmd;
        }

        struct MessagingFee {
            uint256 nativeFee;
            uint256 lzTokenFee;
        }

        struct MessagingReceipt {
            bytes32 guid;
            uint64 nonce;
            MessagingFee fee;
        }

        struct OFTReceipt {
            uint256 amountSentLD;
            uint256 amountReceivedLD;
        }

        function quoteSend(SendParam calldata sendParam, bool payInLzToken) external view returns (MessagingFee memory fee);

        function send(SendParam calldata sendParam, MessagingFee calldata fee, address refundAddress) external payable returns (MessagingReceipt memory receipt, OFTReceipt memory oftReceipt);
    }
);
