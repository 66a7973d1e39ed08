// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Agent-Token Error Taxonomy
//!
//! Every failure the core can report maps onto one stable, machine-readable
//! [`ErrorCode`]. Embedding middleware keys its response handling off these
//! strings, so they are part of the wire contract and must never change.
//!
//! | Error | Raised by | Codes |
//! |-------|-----------|-------|
//! | [`FormatError`] | strict base64url/JSON codec | `invalid_token` |
//! | [`EnvelopeError`] | envelope codec | `invalid_token`, `unsupported_version` |
//! | [`SchemaError`] | package validators | `invalid_intent_package`, `invalid_intent_expiry` |
//!
//! Policy denials are not errors: they are returned as
//! [`crate::domain::policy::PolicyEvaluation`] values.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable error code vocabulary shared with every Agent-Token implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidToken,
    UnsupportedVersion,
    InvalidIntentPackage,
    InvalidIntentExpiry,
    TokenExpired,
    OutOfScope,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidToken => "invalid_token",
            Self::UnsupportedVersion => "unsupported_version",
            Self::InvalidIntentPackage => "invalid_intent_package",
            Self::InvalidIntentExpiry => "invalid_intent_expiry",
            Self::TokenExpired => "token_expired",
            Self::OutOfScope => "out_of_scope",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Malformed base64url, UTF-8 or JSON at the codec layer.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Invalid format: empty token")]
    Empty,

    #[error("Invalid format: character {character:?} at offset {offset} is not strict base64url (no padding, no '+', no '/', no whitespace)")]
    IllegalCharacter { character: char, offset: usize },

    #[error("Invalid base64url payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Decoded payload is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Decoded payload is not JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl FormatError {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::InvalidToken
    }
}

/// The decoded value does not have the `{ v, pkgs }` envelope shape.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("Agent-Token exceeds maximum allowed size ({max} characters, got {length})")]
    Oversize { length: usize, max: usize },

    #[error("Agent-Token is not valid base64url-encoded JSON: {0}")]
    Format(#[from] FormatError),

    #[error("Agent-Token must decode to a JSON object")]
    NotAnObject,

    #[error("Agent-Token missing numeric version")]
    MissingVersion,

    #[error("Unsupported Agent-Token version: {0}")]
    UnsupportedVersion(serde_json::Number),

    #[error("Agent-Token missing pkgs object")]
    MissingPackages,
}

impl EnvelopeError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedVersion(_) => ErrorCode::UnsupportedVersion,
            _ => ErrorCode::InvalidToken,
        }
    }
}

/// A package payload failed structural validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The payload carries an `exp` key that is not a parseable timestamp.
    #[error("Invalid {package} package: exp must be a valid ISO8601 timestamp")]
    InvalidExpiry { package: String },

    #[error("Invalid {package} package: {reason}")]
    InvalidPackage { package: String, reason: String },
}

impl SchemaError {
    pub(crate) fn invalid(package: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPackage {
            package: package.to_string(),
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidExpiry { .. } => ErrorCode::InvalidIntentExpiry,
            Self::InvalidPackage { .. } => ErrorCode::InvalidIntentPackage,
        }
    }
}

/// Any fail-fast error from the decode pipeline (envelope, then packages).
#[derive(Debug, Error)]
pub enum AgentTokenError {
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl AgentTokenError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Envelope(e) => e.code(),
            Self::Schema(e) => e.code(),
        }
    }
}
