// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

/// Agent Tokens Rust SDK
///
/// Mint `Agent-Token` header values from an agent before it calls an HTTP API.

pub mod builder;

pub use agent_tokens_core::{AllowRule, Envelope, Intent, IntentMode, SchemaError, AT_INTENT_V1};
pub use builder::{IntentBuilder, TokenBuilder};
