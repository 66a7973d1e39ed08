// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use agent_tokens_core::{
    encode_envelope, AllowRule, Envelope, Intent, IntentMode, Package, SchemaError,
};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde_json::Value;
use uuid::Uuid;

/// Builder for an `at.intent.v1` package.
///
/// `build` runs the same validator the receiving side runs, so an issuer can
/// never mint an intent that a verifier rejects on shape.
#[derive(Debug, Clone)]
pub struct IntentBuilder {
    intent: Intent,
}

impl IntentBuilder {
    /// Start an intent in the given mode with a fresh random `intentId`.
    pub fn new(mode: IntentMode) -> Self {
        Self {
            intent: Intent::new(mode, Uuid::new_v4().to_string()),
        }
    }

    /// Enforced allowlist.
    pub fn strict() -> Self {
        Self::new(IntentMode::Strict)
    }

    /// Informational only.
    pub fn advisory() -> Self {
        Self::new(IntentMode::Advisory)
    }

    pub fn intent_id(mut self, id: impl Into<String>) -> Self {
        self.intent.intent_id = id.into();
        self
    }

    /// High-level goal summary. Avoid raw prompts.
    pub fn goal(mut self, goal: impl Into<String>) -> Self {
        self.intent.goal = Some(goal.into());
        self
    }

    /// Pre-computed prompt hash, e.g. `"sha256:<hex>"`.
    pub fn prompt_hash(mut self, hash: impl Into<String>) -> Self {
        self.intent.prompt_hash = Some(hash.into());
        self
    }

    pub fn allow(mut self, rule: AllowRule) -> Self {
        self.intent.allow.get_or_insert_with(Vec::new).push(rule);
        self
    }

    pub fn expires_at(mut self, exp: DateTime<Utc>) -> Self {
        self.intent.exp = Some(exp.to_rfc3339_opts(SecondsFormat::Millis, true));
        self
    }

    pub fn expires_after(self, now: DateTime<Utc>, ttl: Duration) -> Self {
        self.expires_at(now + ttl)
    }

    pub fn build(self) -> Result<Intent, SchemaError> {
        Intent::from_value(&self.intent.to_value())
    }
}

/// Builder for a complete token.
#[derive(Debug, Clone, Default)]
pub struct TokenBuilder {
    envelope: Envelope,
}

impl TokenBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intent(self, intent: &Intent) -> Self {
        self.package(intent)
    }

    pub fn package<P: Package>(mut self, package: &P) -> Self {
        self.envelope.pkgs.insert(P::ID.to_string(), package.to_value());
        self
    }

    /// Attach a package this SDK has no type for. Replaces any existing payload.
    pub fn raw_package(mut self, id: impl Into<String>, payload: Value) -> Self {
        self.envelope.pkgs.insert(id.into(), payload);
        self
    }

    pub fn build(self) -> Envelope {
        self.envelope
    }

    /// The header value to send.
    pub fn encode(&self) -> String {
        encode_envelope(&self.envelope)
    }
}
