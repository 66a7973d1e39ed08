// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Agent-Token Gate Configuration
//
// Deployment knobs for the framework-agnostic admission pipeline in
// `application::gate`. Every field has a default, so an empty document is a
// valid configuration:
//
//   header_name: agent-token
//   required: false
//   require_intent: false
//   enforce_intent_scope: none

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_HEADER_NAME: &str = "agent-token";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read gate config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid gate config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid gate config: header_name must not be empty")]
    EmptyHeaderName,
}

/// Whether the built-in allowlist check runs for `strict` intents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeEnforcement {
    /// Intents are parsed and expiry is enforced, but `allow` is not checked.
    #[default]
    None,
    /// `strict` intents must match their `allow` list.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    /// Header carrying the token. Stored lowercased.
    #[serde(default = "default_header_name")]
    pub header_name: String,

    /// Reject requests that carry no token.
    #[serde(default)]
    pub required: bool,

    /// Reject tokens that carry no valid `at.intent.v1` package.
    #[serde(default)]
    pub require_intent: bool,

    #[serde(default)]
    pub enforce_intent_scope: ScopeEnforcement,
}

fn default_header_name() -> String {
    DEFAULT_HEADER_NAME.to_string()
}

/// HTTP header names are case-insensitive; lookups use the lowercase form.
pub fn normalize_header_name(name: &str) -> String {
    name.trim().to_lowercase()
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            header_name: default_header_name(),
            required: false,
            require_intent: false,
            enforce_intent_scope: ScopeEnforcement::None,
        }
    }
}

impl GateConfig {
    /// The strictest preset: token and intent required, allowlists enforced.
    pub fn strict() -> Self {
        Self {
            required: true,
            require_intent: true,
            enforce_intent_scope: ScopeEnforcement::Strict,
            ..Self::default()
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.normalized()
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    fn normalized(mut self) -> Result<Self, ConfigError> {
        self.header_name = normalize_header_name(&self.header_name);
        if self.header_name.is_empty() {
            return Err(ConfigError::EmptyHeaderName);
        }
        Ok(self)
    }
}
