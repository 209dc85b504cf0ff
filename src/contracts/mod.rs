// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Contract bindings
//!
//! Alloy-generated bindings for the token: plain ERC20 reads used by the
//! completion detector, and the cross-chain `send` interface used to submit a
//! bridge.

pub mod erc20;
pub mod oft;
