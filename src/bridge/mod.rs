// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! End-to-end bridge flow
//!
//! [`BridgeParams`] describe a transfer, [`BridgeOrchestrator`] submits it,
//! waits for the source chain and hands the destination side to the
//! completion detector.

mod config;
mod orchestrator;
mod params;

pub use config::ConfirmationConfig;
pub use orchestrator::BridgeOrchestrator;
pub use params::{BridgeParams, BridgeRequest};
