// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Command-line bridge
//!
//! ```text
//! xbridge <source> <destination> <amount> [recipient] [nowait]
//! ```
//!
//! Sends `amount` (decimal, in whole tokens) from the wallet in `PRIVATE_KEY`
//! to `recipient` (defaults to the sender) and waits for it to arrive, unless
//! `nowait` is given. Ctrl-C stops waiting.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use alloy_network::EthereumWallet;
use alloy_primitives::{Address, U256};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_signer_local::PrivateKeySigner;
use clap::Parser;
use tracing::{info, warn};

use xbridge_rs::providers::{ChainClients, Erc20BalanceSource, OftSubmitter, TokioClock};
use xbridge_rs::{
    cancellation, format_amount, parse_amount, parse_network, BridgeError, BridgeOrchestrator,
    BridgeParams, CompletionDetector, ConfirmationConfig, ConsoleReporter, DetectionConfig,
    DetectionState, Erc20Contract, NetworkConfig, Result, DEFAULT_POLL_INTERVAL_SECS,
    DEFAULT_TIMEOUT_SECS, DEFAULT_TOLERANCE,
};

const NOWAIT: &str = "nowait";

#[derive(Parser, Debug)]
#[command(
    name = "xbridge",
    version,
    about = "Bridge tokens between chains and wait for them to arrive"
)]
struct Cli {
    /// Source network, e.g. sepolia
    source: String,

    /// Destination network, e.g. arbitrum-sepolia
    destination: String,

    /// Amount in whole tokens, e.g. 1.5
    amount: String,

    /// Recipient address (defaults to the sender), or `nowait`
    recipient: Option<String>,

    /// Pass `nowait` to return once the source transaction confirms
    nowait: Option<String>,

    /// Deployments file with RPC URLs and token addresses per network
    #[arg(long, env = "XBRIDGE_DEPLOYMENTS", default_value = "deployments.json")]
    deployments: PathBuf,

    /// Seconds between destination balance polls
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL_SECS)]
    poll_interval: u64,

    /// Seconds to wait for the tokens to arrive
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Allowed difference between expected and observed increase, in smallest units
    #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
    tolerance: u64,
}

impl Cli {
    /// Splits the optional positionals into a recipient and the nowait flag.
    fn recipient_and_nowait(&self) -> Result<(Option<Address>, bool)> {
        let (recipient, flag) = match (self.recipient.as_deref(), self.nowait.as_deref()) {
            (Some(r), None) if r.eq_ignore_ascii_case(NOWAIT) => (None, Some(r)),
            (recipient, flag) => (recipient, flag),
        };

        let nowait = match flag {
            None => false,
            Some(flag) if flag.eq_ignore_ascii_case(NOWAIT) => true,
            Some(other) => {
                return Err(BridgeError::InvalidInput(format!(
                    "unexpected argument '{other}', expected '{NOWAIT}'"
                )))
            }
        };

        let recipient = recipient
            .map(|r| {
                r.trim()
                    .parse::<Address>()
                    .map_err(|e| BridgeError::InvalidInput(format!("malformed recipient {r}: {e}")))
            })
            .transpose()?;

        Ok((recipient, nowait))
    }

    fn detection_config(&self) -> DetectionConfig {
        DetectionConfig::default()
            .with_poll_interval(Duration::from_secs(self.poll_interval))
            .with_timeout(Duration::from_secs(self.timeout))
            .with_tolerance(U256::from(self.tolerance))
    }
}

/// How a completed invocation ended.
enum Outcome {
    Submitted,
    Finished(DetectionState),
}

impl Outcome {
    fn exit_code(&self) -> ExitCode {
        match self {
            Self::Submitted | Self::Finished(DetectionState::Matched) => ExitCode::SUCCESS,
            // The transfer may still land, the bridge itself went through.
            Self::Finished(DetectionState::TimedOut) => ExitCode::SUCCESS,
            Self::Finished(_) => ExitCode::FAILURE,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    init_logging();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<Outcome> {
    let source_chain = parse_network(&cli.source)?;
    let destination_chain = parse_network(&cli.destination)?;
    let (recipient, nowait) = cli.recipient_and_nowait()?;
    let detection = cli.detection_config();
    detection.validate()?;

    let config = NetworkConfig::load(&cli.deployments)?.with_env_overrides()?;
    let source = config.entry(source_chain)?.clone();
    let destination_decimals = config.entry(destination_chain)?.decimals;
    let clients = ChainClients::new(config);

    let private_key = std::env::var("PRIVATE_KEY")
        .map_err(|_| BridgeError::InvalidConfig("PRIVATE_KEY is not set".to_string()))?;
    let signer: PrivateKeySigner = private_key
        .trim()
        .parse()
        .map_err(|e| BridgeError::InvalidConfig(format!("PRIVATE_KEY is not a valid key: {e}")))?;
    let sender = signer.address();
    let recipient = recipient.unwrap_or(sender);

    let provider = ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer))
        .connect_http(source.rpc_url.clone())
        .erased();

    let decimals = token_decimals(source.decimals, source.token, provider.clone()).await?;
    let destination_decimals = match destination_decimals {
        Some(decimals) => decimals,
        None => {
            let client = clients.client(destination_chain)?;
            token_decimals(None, client.token(), client.provider().clone()).await?
        }
    };
    let amount = parse_amount(&cli.amount, decimals)?;

    info!(
        source_chain = %source_chain,
        destination_chain = %destination_chain,
        sender = %sender,
        recipient = %recipient,
        amount = %amount,
        source_decimals = decimals,
        destination_decimals,
        event = "cli_bridge_requested"
    );

    let submitter = OftSubmitter::builder()
        .provider(provider)
        .source_chain(source_chain)
        .token(source.token)
        .from(sender)
        .confirmation(ConfirmationConfig::for_chain(source_chain)?)
        .clock(TokioClock::new())
        .build();

    let orchestrator = BridgeOrchestrator::new(
        submitter,
        Erc20BalanceSource::new(clients),
        CompletionDetector::new(detection),
    )
    .with_reporter(Arc::new(ConsoleReporter::stdout()));

    let params = BridgeParams::builder()
        .source_chain(source_chain)
        .destination_chain(destination_chain)
        .recipient(recipient)
        .amount(amount)
        .source_decimals(decimals)
        .destination_decimals(destination_decimals)
        .build();

    println!(
        "Bridging {} tokens ({amount} units) from {source_chain} to {destination_chain} for {recipient}",
        display_amount(amount, decimals)
    );

    if nowait {
        let request = orchestrator.submit_and_confirm(&params).await?;
        println!(
            "Source transaction {} confirmed. Not waiting for the destination.",
            request.source_tx()
        );
        return Ok(Outcome::Submitted);
    }

    let (handle, cancel) = cancellation();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!(event = "interrupt_received");
            handle.cancel();
        }
    });

    let result = orchestrator.run(params, cancel).await?;
    Ok(Outcome::Finished(result.final_state))
}

/// Returns the configured decimals, or asks the token contract.
async fn token_decimals(configured: Option<u8>, token: Address, provider: DynProvider) -> Result<u8> {
    match configured {
        Some(decimals) => Ok(decimals),
        None => Erc20Contract::new(token, provider)
            .decimals()
            .await
            .map_err(|e| BridgeError::ContractCall(e.to_string())),
    }
}

fn display_amount(amount: U256, decimals: u8) -> String {
    format_amount(amount, decimals).unwrap_or_else(|_| amount.to_string())
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
