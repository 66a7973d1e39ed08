// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Agent-Token Gate
//!
//! Framework-agnostic admission pipeline for agent-originated requests. HTTP
//! integrations extract the raw header values and a [`RequestContext`], call
//! [`AgentTokenGate::admit`], and map the [`GateOutcome`] onto their own
//! response types.
//!
//! ## Processing Pipeline
//!
//! ```text
//! header values
//!   └─ exactly one value?                 ← invalid_request
//!   └─ present? (or `required`)           ← missing_agent_token
//!   └─ decode_envelope                    ← invalid_token / unsupported_version
//!   └─ PackageRegistry::validate          ← invalid_intent_package / invalid_intent_expiry
//!   └─ intent present? (`require_intent`) ← missing_intent_package
//!   └─ check_expiry (always)              ← invalid_intent_expiry / token_expired
//!   └─ evaluate (scope == strict)         ← out_of_scope
//!   └─ PolicyHook::decide (optional)      ← deny / challenge
//!         └─ Admitted { envelope, intent }
//! ```
//!
//! The gate holds no per-request state and can be shared behind an `Arc`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use tracing::{debug, info, warn};

use crate::application::policy_hook::{PolicyHook, PolicyHookContext};
use crate::domain::envelope::Envelope;
use crate::domain::error::{AgentTokenError, ErrorCode};
use crate::domain::gate_config::{
    normalize_header_name, GateConfig, ScopeEnforcement, DEFAULT_HEADER_NAME,
};
use crate::domain::intent::{extract_intent, Intent, AT_INTENT_V1};
use crate::domain::package::PackageRegistry;
use crate::domain::policy::{check_expiry, evaluate, PolicyDecision, PolicyEvaluation, RequestContext};
use crate::infrastructure::envelope_codec::decode_envelope;

/// Machine-readable rejection code: the core vocabulary plus gate-level codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionCode {
    Token(ErrorCode),
    /// More than one token header on the same request.
    InvalidRequest,
    MissingAgentToken,
    MissingIntentPackage,
    AgentPolicyDenied,
    AgentPolicyChallenge,
}

impl RejectionCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Token(code) => code.as_str(),
            Self::InvalidRequest => "invalid_request",
            Self::MissingAgentToken => "missing_agent_token",
            Self::MissingIntentPackage => "missing_intent_package",
            Self::AgentPolicyDenied => "agent_policy_denied",
            Self::AgentPolicyChallenge => "agent_policy_challenge",
        }
    }
}

impl std::fmt::Display for RejectionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RejectionCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl From<ErrorCode> for RejectionCode {
    fn from(code: ErrorCode) -> Self {
        Self::Token(code)
    }
}

/// Why a request was turned away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    /// `Deny` or `Challenge`; never `Allow`.
    pub decision: PolicyDecision,
    #[serde(rename = "error")]
    pub code: RejectionCode,
    pub reason: String,
}

impl Rejection {
    fn deny(code: impl Into<RejectionCode>, reason: impl Into<String>) -> Self {
        Self {
            decision: PolicyDecision::Deny,
            code: code.into(),
            reason: reason.into(),
        }
    }

    /// Convert a non-allow evaluation, filling in gate defaults.
    fn from_evaluation(evaluation: PolicyEvaluation) -> Self {
        let (fallback_code, fallback_reason) = match evaluation.decision {
            PolicyDecision::Challenge => (RejectionCode::AgentPolicyChallenge, "Agent policy challenge."),
            _ => (RejectionCode::AgentPolicyDenied, "Agent policy denied."),
        };
        Self {
            decision: evaluation.decision,
            code: evaluation.error.map_or(fallback_code, RejectionCode::Token),
            reason: evaluation.reason.unwrap_or_else(|| fallback_reason.to_string()),
        }
    }
}

/// A request that passed the gate with a token attached.
#[derive(Debug, Clone, PartialEq)]
pub struct AdmittedToken {
    pub envelope: Envelope,
    pub intent: Option<Intent>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GateOutcome {
    /// No token was presented and none is required.
    Bypassed,
    Admitted(AdmittedToken),
    Rejected(Rejection),
}

impl GateOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }
}

pub struct AgentTokenGate {
    config: GateConfig,
    registry: PackageRegistry,
    hook: Option<Arc<dyn PolicyHook>>,
}

impl AgentTokenGate {
    /// The header name is lowercased here as well, so hand-built configs behave
    /// like ones loaded from YAML. A blank name falls back to the default.
    pub fn new(mut config: GateConfig) -> Self {
        config.header_name = normalize_header_name(&config.header_name);
        if config.header_name.is_empty() {
            warn!("Blank Agent-Token header name configured, using {}", DEFAULT_HEADER_NAME);
            config.header_name = DEFAULT_HEADER_NAME.to_string();
        }

        Self {
            config,
            registry: PackageRegistry::with_defaults(),
            hook: None,
        }
    }

    /// Replace the package registry (e.g. to validate additional packages).
    pub fn with_registry(mut self, registry: PackageRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_hook(mut self, hook: Arc<dyn PolicyHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Lowercased header name the embedding framework should read.
    pub fn header_name(&self) -> &str {
        &self.config.header_name
    }

    /// Run the full pipeline, including the optional policy hook.
    pub async fn admit(
        &self,
        header_values: &[&str],
        request: &RequestContext,
        now: DateTime<Utc>,
    ) -> GateOutcome {
        let admitted = match self.check(header_values, request, now) {
            GateOutcome::Admitted(admitted) => admitted,
            other => return other,
        };

        let Some(hook) = &self.hook else {
            return GateOutcome::Admitted(admitted);
        };

        let ctx = PolicyHookContext {
            request,
            envelope: &admitted.envelope,
            intent: admitted.intent.as_ref(),
        };
        match hook.decide(ctx).await {
            Ok(evaluation) if evaluation.is_allow() => GateOutcome::Admitted(admitted),
            Ok(evaluation) => {
                let rejection = Rejection::from_evaluation(evaluation);
                info!(
                    decision = rejection.decision.as_str(),
                    code = %rejection.code,
                    "Policy hook rejected agent request"
                );
                GateOutcome::Rejected(rejection)
            }
            Err(e) => {
                warn!("Policy hook failed, denying request: {}", e);
                GateOutcome::Rejected(Rejection::deny(
                    RejectionCode::AgentPolicyDenied,
                    "Agent policy could not be evaluated.",
                ))
            }
        }
    }

    /// Run every built-in step without consulting the policy hook.
    pub fn check(
        &self,
        header_values: &[&str],
        request: &RequestContext,
        now: DateTime<Utc>,
    ) -> GateOutcome {
        let token = match header_values {
            [] => None,
            [value] if value.is_empty() => None,
            [value] => Some(*value),
            _ => {
                warn!(header = %self.config.header_name, count = header_values.len(), "Rejecting request with multiple Agent-Token headers");
                return GateOutcome::Rejected(Rejection::deny(
                    RejectionCode::InvalidRequest,
                    "Multiple Agent-Token headers are not allowed.",
                ));
            }
        };

        let Some(token) = token else {
            if self.config.required {
                debug!("Rejecting request without Agent-Token");
                return GateOutcome::Rejected(Rejection::deny(
                    RejectionCode::MissingAgentToken,
                    "Agent-Token header is required.",
                ));
            }
            return GateOutcome::Bypassed;
        };

        let (envelope, intent) = match self.decode(token) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!(code = %e.code(), "Rejecting malformed Agent-Token: {}", e);
                return GateOutcome::Rejected(Rejection::deny(e.code(), e.to_string()));
            }
        };

        if self.config.require_intent && intent.is_none() {
            return GateOutcome::Rejected(Rejection::deny(
                RejectionCode::MissingIntentPackage,
                format!("Agent-Token carries no {} package.", AT_INTENT_V1),
            ));
        }

        if let Some(intent) = &intent {
            let evaluation = match self.config.enforce_intent_scope {
                ScopeEnforcement::Strict => evaluate(request, intent, now),
                ScopeEnforcement::None => check_expiry(intent, now).unwrap_or_else(PolicyEvaluation::allow),
            };
            if !evaluation.is_allow() {
                let rejection = Rejection::from_evaluation(evaluation);
                info!(
                    intent_id = %intent.intent_id,
                    method = %request.method,
                    path = %request.path,
                    code = %rejection.code,
                    "Agent request rejected by intent policy"
                );
                return GateOutcome::Rejected(rejection);
            }
        }

        GateOutcome::Admitted(AdmittedToken { envelope, intent })
    }

    fn decode(&self, token: &str) -> Result<(Envelope, Option<Intent>), AgentTokenError> {
        let envelope = decode_envelope(token)?;
        self.registry.validate(&envelope)?;
        let intent = extract_intent(&envelope)?;
        Ok((envelope, intent))
    }
}
