// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod envelope;
pub mod error;
pub mod gate_config;
pub mod intent;
pub mod package;
pub mod policy;

pub use envelope::{Envelope, MAX_TOKEN_LENGTH, SUPPORTED_VERSION};
pub use error::{AgentTokenError, EnvelopeError, ErrorCode, FormatError, SchemaError};
pub use gate_config::{ConfigError, GateConfig, ScopeEnforcement};
pub use intent::{extract_intent, AllowRule, Expiry, Intent, IntentMode, AT_INTENT_V1};
pub use package::{Package, PackageRegistry};
pub use policy::{evaluate, PolicyDecision, PolicyEvaluation, RequestContext};
