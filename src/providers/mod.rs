// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Production implementations of the bridge trait abstractions.
//!
//! This module provides the "real" implementations of the traits defined in
//! [`crate::traits`]: token balances read over JSON-RPC, bridge submission
//! through the token's cross-chain `send`, and the Tokio clock.
//!
//! Test code uses the fakes in [`crate::testing`] instead.

mod erc20_balance;
mod oft;
mod throttled;
mod tokio_clock;

pub use self::erc20_balance::{ChainClient, ChainClients, Erc20BalanceSource};
pub use self::oft::OftSubmitter;
pub use self::throttled::ThrottledBalanceSource;
pub use self::tokio_clock::TokioClock;
