// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Envelope Codec
//!
//! Turns the opaque `Agent-Token` header value into a typed [`Envelope`] and
//! back. Decoding is fail-closed: every shape problem is an
//! [`EnvelopeError`], and the caller must reject the request outright.
//!
//! ```text
//! token ─ length guard ─ b64url::decode_json ─ object? ─ v == 0? ─ pkgs object? ─ Envelope
//! ```

use serde_json::Value;
use tracing::debug;

use crate::domain::envelope::{Envelope, MAX_TOKEN_LENGTH, SUPPORTED_VERSION};
use crate::domain::error::EnvelopeError;
use crate::infrastructure::b64url;

/// Decode and shape-check an Agent-Token.
pub fn decode_envelope(token: &str) -> Result<Envelope, EnvelopeError> {
    // Measured in characters, not bytes.
    let length = token.chars().count();
    if length > MAX_TOKEN_LENGTH {
        return Err(EnvelopeError::Oversize {
            length,
            max: MAX_TOKEN_LENGTH,
        });
    }

    let value = b64url::decode_json(token)?;
    let Value::Object(mut obj) = value else {
        return Err(EnvelopeError::NotAnObject);
    };

    let version = match obj.get("v") {
        Some(Value::Number(n)) => n.clone(),
        _ => return Err(EnvelopeError::MissingVersion),
    };
    if version.as_f64() != Some(SUPPORTED_VERSION as f64) {
        return Err(EnvelopeError::UnsupportedVersion(version));
    }

    let pkgs = match obj.remove("pkgs") {
        Some(Value::Object(pkgs)) => pkgs,
        _ => return Err(EnvelopeError::MissingPackages),
    };

    debug!(packages = pkgs.len(), "Decoded Agent-Token envelope");
    Ok(Envelope {
        v: SUPPORTED_VERSION,
        pkgs,
    })
}

/// Encode an envelope. The typed envelope is trusted as-is.
pub fn encode_envelope(envelope: &Envelope) -> String {
    let mut obj = serde_json::Map::new();
    obj.insert("v".to_string(), Value::from(envelope.v));
    obj.insert("pkgs".to_string(), Value::Object(envelope.pkgs.clone()));
    b64url::encode_json(&Value::Object(obj))
}

impl Envelope {
    /// See [`decode_envelope`].
    pub fn decode(token: &str) -> Result<Self, EnvelopeError> {
        decode_envelope(token)
    }

    /// See [`encode_envelope`].
    pub fn encode(&self) -> String {
        encode_envelope(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::{ErrorCode, FormatError};
    use serde_json::json;

    fn token_for(value: Value) -> String {
        b64url::encode_json(&value)
    }

    #[test]
    fn test_round_trip() {
        let mut env = Envelope::new();
        env.pkgs.insert("hello".into(), json!({ "a": 1 }));
        env.pkgs.insert("at.intent.v1".into(), json!({ "mode": "advisory", "intentId": "abcdabcd" }));

        let decoded = decode_envelope(&encode_envelope(&env)).unwrap();
        assert_eq!(decoded, env);
        assert_eq!(decoded.v, 0);
        assert_eq!(decoded.package("hello").unwrap()["a"], 1);
    }

    #[test]
    fn test_oversize_token_is_rejected() {
        let token = "A".repeat(MAX_TOKEN_LENGTH + 1);
        let err = decode_envelope(&token).unwrap_err();
        assert!(matches!(err, EnvelopeError::Oversize { .. }));
        assert_eq!(err.code(), ErrorCode::InvalidToken);
    }

    #[test]
    fn test_token_at_the_limit_is_decoded() {
        // {"pkgs":{"pad":"x…"},"v":0} is 12288 bytes, i.e. exactly 16384 base64 characters.
        let token = token_for(json!({ "v": 0, "pkgs": { "pad": "x".repeat(12_263) } }));
        assert_eq!(token.len(), MAX_TOKEN_LENGTH);
        assert!(decode_envelope(&token).is_ok());
    }

    #[test]
    fn test_length_guard_is_inclusive() {
        // At the limit the codec runs; zero bytes are not JSON.
        let err = decode_envelope(&"A".repeat(MAX_TOKEN_LENGTH)).unwrap_err();
        assert!(matches!(err, EnvelopeError::Format(FormatError::Json(_))), "{:?}", err);

        let err = decode_envelope(&"A".repeat(MAX_TOKEN_LENGTH + 1)).unwrap_err();
        assert!(matches!(err, EnvelopeError::Oversize { length: 16_385, max: 16_384 }));
    }

    #[test]
    fn test_length_counts_characters() {
        // 16384 multibyte characters stay under the limit and fail in the codec instead.
        let err = decode_envelope(&"é".repeat(MAX_TOKEN_LENGTH)).unwrap_err();
        assert!(matches!(err, EnvelopeError::Format(FormatError::IllegalCharacter { .. })));
    }

    #[test]
    fn test_codec_failures_are_invalid_token() {
        for token in ["", "e30=", "abc+def", "abc/def", "ab cd"] {
            let err = decode_envelope(token).unwrap_err();
            assert!(matches!(err, EnvelopeError::Format(_)), "{:?}", token);
            assert_eq!(err.code(), ErrorCode::InvalidToken);
        }
        assert!(matches!(
            decode_envelope(""),
            Err(EnvelopeError::Format(FormatError::Empty))
        ));
    }

    #[test]
    fn test_non_object_is_rejected() {
        for value in [json!([]), json!(null), json!(0), json!("v")] {
            let err = decode_envelope(&token_for(value)).unwrap_err();
            assert!(matches!(err, EnvelopeError::NotAnObject));
        }
    }

    #[test]
    fn test_missing_or_non_numeric_version_is_invalid_token() {
        for value in [
            json!({ "pkgs": {} }),
            json!({ "v": "0", "pkgs": {} }),
            json!({ "v": null, "pkgs": {} }),
            json!({ "v": false, "pkgs": {} }),
        ] {
            let err = decode_envelope(&token_for(value)).unwrap_err();
            assert!(matches!(err, EnvelopeError::MissingVersion));
            assert_eq!(err.code(), ErrorCode::InvalidToken);
        }
    }

    #[test]
    fn test_other_numeric_version_is_unsupported() {
        for value in [json!({ "v": 1, "pkgs": {} }), json!({ "v": -1, "pkgs": {} }), json!({ "v": 0.5, "pkgs": {} })] {
            let err = decode_envelope(&token_for(value)).unwrap_err();
            assert_eq!(err.code(), ErrorCode::UnsupportedVersion);
        }
    }

    #[test]
    fn test_float_zero_version_is_supported() {
        let env = decode_envelope(&token_for(json!({ "v": 0.0, "pkgs": {} }))).unwrap();
        assert_eq!(env.v, SUPPORTED_VERSION);
    }

    #[test]
    fn test_version_is_checked_before_pkgs() {
        let err = decode_envelope(&token_for(json!({ "v": 2 }))).unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnsupportedVersion);
    }

    #[test]
    fn test_bad_pkgs_is_invalid_token() {
        for value in [
            json!({ "v": 0 }),
            json!({ "v": 0, "pkgs": [] }),
            json!({ "v": 0, "pkgs": null }),
            json!({ "v": 0, "pkgs": "at.intent.v1" }),
        ] {
            let err = decode_envelope(&token_for(value)).unwrap_err();
            assert!(matches!(err, EnvelopeError::MissingPackages));
        }
    }

    #[test]
    fn test_unknown_top_level_fields_are_dropped() {
        let env = decode_envelope(&token_for(json!({ "v": 0, "pkgs": {}, "sig": "x" }))).unwrap();
        assert_eq!(env, Envelope::new());
    }
}
