// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Chain configuration for the bridge
//!
//! Endpoint id mappings, confirmation times and network-name parsing for every
//! chain the bridge can reach.

mod config;

pub use config::{parse_network, OftChain};
