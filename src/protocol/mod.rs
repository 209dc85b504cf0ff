// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Messaging protocol types
//!
//! Endpoint identifiers used to address chains on the messaging layer, and the
//! amount and address encodings the token contract expects.

mod amount;
mod endpoint_id;

pub use amount::{address_to_bytes32, format_amount, parse_amount, rescale_amount};
pub use endpoint_id::{EndpointId, InvalidEndpointId};
