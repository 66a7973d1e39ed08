// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Intent Policy Evaluation
//!
//! Deterministic, framework-agnostic `at.intent.v1` semantics. This is the
//! shared baseline every Agent-Token implementation must agree on, so it is a
//! pure function of `(context, intent, now)`.
//!
//! ## Decision order (first failure wins)
//!
//! 1. Expiry: an unparsable `exp` denies with `invalid_intent_expiry`; `now`
//!    strictly after `exp` denies with `token_expired`.
//! 2. Scope: in `strict` mode the request must match at least one `allow`
//!    rule, otherwise `out_of_scope`. `advisory` mode never consults `allow`.
//! 3. Allow.
//!
//! The evaluator never yields [`PolicyDecision::Challenge`]. That decision is
//! reserved for a [`crate::application::policy_hook::PolicyHook`] layered on top.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::domain::error::ErrorCode;
use crate::domain::intent::{AllowRule, Expiry, Intent, IntentMode};

/// Minimal HTTP request context supplied by the embedding framework.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub method: String,
    pub path: String,

    /// e.g. `"https://api.weather.gov"`. Origin-scoped rules only match when
    /// this is present and canonicalizes to the same origin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

impl RequestContext {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            origin: None,
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyDecision {
    Allow,
    Deny,
    Challenge,
}

impl PolicyDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
            Self::Challenge => "challenge",
        }
    }
}

/// Outcome of a policy evaluation. A value, never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyEvaluation {
    pub decision: PolicyDecision,

    /// Machine-readable code for deny/challenge decisions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorCode>,

    /// Human-readable reason, safe for logs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl PolicyEvaluation {
    pub fn allow() -> Self {
        Self {
            decision: PolicyDecision::Allow,
            error: None,
            reason: None,
        }
    }

    pub fn deny(error: ErrorCode, reason: impl Into<String>) -> Self {
        Self {
            decision: PolicyDecision::Deny,
            error: Some(error),
            reason: Some(reason.into()),
        }
    }

    pub fn challenge(reason: impl Into<String>) -> Self {
        Self {
            decision: PolicyDecision::Challenge,
            error: None,
            reason: Some(reason.into()),
        }
    }

    pub fn is_allow(&self) -> bool {
        self.decision == PolicyDecision::Allow
    }
}

/// Evaluate the `at.intent.v1` policy for one request.
pub fn evaluate(context: &RequestContext, intent: &Intent, now: DateTime<Utc>) -> PolicyEvaluation {
    if let Some(denied) = check_expiry(intent, now) {
        return denied;
    }

    if intent.mode == IntentMode::Strict {
        let rules = intent.allow.as_deref().unwrap_or_default();
        let in_scope = !rules.is_empty() && rules.iter().any(|rule| matches_allow_rule(context, rule));
        if !in_scope {
            debug!(
                intent_id = %intent.intent_id,
                method = %context.method,
                path = %context.path,
                rules = rules.len(),
                "Request outside declared intent allowlist"
            );
            return PolicyEvaluation::deny(
                ErrorCode::OutOfScope,
                "Request outside declared at.intent.v1 allowlist (strict mode).",
            );
        }
    }

    PolicyEvaluation::allow()
}

/// Expiry step of [`evaluate`] on its own. `None` means the intent is fresh.
///
/// Expiry is a freshness control independent of scope enforcement, so callers
/// that skip allowlist checks still run this.
pub fn check_expiry(intent: &Intent, now: DateTime<Utc>) -> Option<PolicyEvaluation> {
    match intent.expiry() {
        Expiry::Never => None,
        Expiry::Unparsable => {
            debug!(intent_id = %intent.intent_id, "Intent exp is not a valid timestamp");
            Some(PolicyEvaluation::deny(
                ErrorCode::InvalidIntentExpiry,
                "at.intent.v1 exp is not a valid timestamp.",
            ))
        }
        Expiry::At(exp) if now > exp => {
            debug!(intent_id = %intent.intent_id, exp = %exp, now = %now, "Intent expired");
            Some(PolicyEvaluation::deny(
                ErrorCode::TokenExpired,
                "at.intent.v1 is expired (exp in the past).",
            ))
        }
        Expiry::At(_) => None,
    }
}

/// A rule matches when every constraint it specifies holds.
pub fn matches_allow_rule(context: &RequestContext, rule: &AllowRule) -> bool {
    if let Some(methods) = rule.methods.as_ref().filter(|m| !m.is_empty()) {
        let method = context.method.to_uppercase();
        if !methods.iter().any(|allowed| allowed.to_uppercase() == method) {
            return false;
        }
    }

    if let Some(prefix) = &rule.path_prefix {
        if !context.path.starts_with(prefix.as_str()) {
            return false;
        }
    }

    if let Some(rule_origin) = &rule.origin {
        // Origin-scoped rules cannot match a request without an origin.
        let Some(context_origin) = &context.origin else {
            return false;
        };
        match (canonicalize_origin(context_origin), canonicalize_origin(rule_origin)) {
            (Some(a), Some(b)) if a == b => {}
            _ => return false,
        }
    }

    true
}

/// Canonical `scheme://host[:port]` form with the default port elided.
///
/// Returns `None` for strings that do not parse as absolute URLs and for
/// schemes without a tuple origin (`file:`, `data:`, `mailto:`, ...).
pub fn canonicalize_origin(input: &str) -> Option<String> {
    let origin = Url::parse(input).ok()?.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}
