// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Agent Tokens Core
//!
//! Compact, self-describing authorization tokens for agent-originated HTTP
//! requests, and the logic deciding whether a request is in scope for the
//! intent declared inside the token.
//!
//! ```text
//! wire string ─ decode_envelope ─ Envelope ─ extract_intent ─ Intent ─ evaluate ─ PolicyEvaluation
//! ```
//!
//! # Architecture
//!
//! - **domain**: envelope, package registry, `at.intent.v1` schema, policy evaluator, error taxonomy
//! - **infrastructure**: strict base64url/JSON codec and envelope codec
//! - **application**: framework-agnostic admission gate and policy hook seam
//!
//! The token carries no signature. Authenticity is the transport's concern.

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
pub use application::gate::{AdmittedToken, AgentTokenGate, GateOutcome, Rejection, RejectionCode};
pub use application::policy_hook::{PolicyHook, PolicyHookContext};
pub use infrastructure::envelope_codec::{decode_envelope, encode_envelope};
