// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Remote vision-service adapter
//!
//! Sends the screenshot to an OpenAI-compatible vision model and recovers a
//! structured analysis from its free-form reply.

pub mod client;
pub mod parser;
pub mod prompt;
pub mod provider;

pub use client::VisionClient;
pub use parser::{normalize_element_type, parse_reply, ParsedReply};
pub use provider::VisionProvider;
