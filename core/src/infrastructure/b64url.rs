// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Strict Base64URL (RFC 4648 §5) JSON codec.
//!
//! Only the unpadded URL-safe alphabet `[A-Za-z0-9_-]` is accepted on decode.
//! Padding, the standard alphabet (`+`, `/`) and whitespace are rejected up
//! front instead of being cleaned, so two implementations can never disagree
//! about which strings are the same token.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde_json::Value;

use crate::domain::error::FormatError;

fn is_strict_b64url(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_'
}

/// Serialize `value` as canonical JSON (sorted keys) and base64url-encode it
/// without padding.
pub fn encode_json(value: &Value) -> String {
    URL_SAFE_NO_PAD.encode(value.to_string())
}

/// Decode a strict base64url string into a JSON value.
pub fn decode_json(input: &str) -> Result<Value, FormatError> {
    if input.is_empty() {
        return Err(FormatError::Empty);
    }

    if let Some((offset, character)) = input
        .char_indices()
        .find(|(_, c)| !c.is_ascii() || !is_strict_b64url(*c as u8))
    {
        return Err(FormatError::IllegalCharacter { character, offset });
    }

    let bytes = URL_SAFE_NO_PAD.decode(input)?;
    let text = String::from_utf8(bytes)?;
    Ok(serde_json::from_str(&text)?)
}
