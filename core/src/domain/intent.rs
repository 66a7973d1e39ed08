// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # `at.intent.v1` Package
//!
//! The standardized package describing the scope an agent declared for its
//! requests. Validation here is purely structural: it never reads a clock and
//! never makes an authorization decision (see [`crate::domain::policy`]).
//!
//! ## Error tiers
//!
//! A payload that carries an `exp` key whose value is not a parseable
//! timestamp fails with [`SchemaError::InvalidExpiry`], even if other fields
//! are also wrong. Every other violation is [`SchemaError::InvalidPackage`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::envelope::Envelope;
use crate::domain::error::SchemaError;
use crate::domain::package::{self, Package};

/// Reserved package id for intents.
pub const AT_INTENT_V1: &str = "at.intent.v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentMode {
    /// The `allow` list is enforced.
    Strict,
    /// Informational only; `allow` is never consulted.
    Advisory,
}

impl IntentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Advisory => "advisory",
        }
    }
}

/// One allowlist entry. Every absent field is a wildcard for that dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowRule {
    /// e.g. `"https://api.weather.gov"`, compared after origin canonicalization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,

    /// Allowed HTTP methods, compared case-insensitively.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<String>>,

    /// Case-sensitive path prefix, e.g. `"/v1/"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_prefix: Option<String>,
}

impl AllowRule {
    /// A rule that matches every request.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = Some(methods.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.path_prefix = Some(prefix.into());
        self
    }
}

/// Validated `at.intent.v1` payload. Deserialization runs the same checks as
/// [`Package::from_value`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "Value")]
pub struct Intent {
    pub mode: IntentMode,
    pub intent_id: String,

    /// High-level goal summary. Never a raw prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,

    /// Hash of the canonicalized user prompt, e.g. `"sha256:<hex>"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_hash: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow: Option<Vec<AllowRule>>,

    /// ISO 8601 expiry, kept verbatim as it appeared on the wire.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<String>,
}

impl Intent {
    pub fn new(mode: IntentMode, intent_id: impl Into<String>) -> Self {
        Self {
            mode,
            intent_id: intent_id.into(),
            goal: None,
            prompt_hash: None,
            allow: None,
            exp: None,
        }
    }

    pub fn expiry(&self) -> Expiry {
        match self.exp.as_deref() {
            None => Expiry::Never,
            Some(exp) => parse_timestamp(exp).map_or(Expiry::Unparsable, Expiry::At),
        }
    }
}

/// Interpretation of an intent's optional `exp` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    Never,
    At(DateTime<Utc>),
    /// `exp` is present but is not a valid timestamp.
    Unparsable,
}

impl Package for Intent {
    const ID: &'static str = AT_INTENT_V1;

    fn from_value(value: &Value) -> Result<Self, SchemaError> {
        let obj = value
            .as_object()
            .ok_or_else(|| SchemaError::invalid(AT_INTENT_V1, "payload must be a JSON object"))?;

        // Expiry is checked first so a bad `exp` always yields the specific code.
        if let Some(exp) = obj.get("exp") {
            let parseable = exp.as_str().and_then(parse_timestamp).is_some();
            if !parseable {
                return Err(SchemaError::InvalidExpiry {
                    package: AT_INTENT_V1.to_string(),
                });
            }
        }

        let mode = match obj.get("mode").and_then(Value::as_str) {
            Some("strict") => IntentMode::Strict,
            Some("advisory") => IntentMode::Advisory,
            _ => {
                return Err(SchemaError::invalid(
                    AT_INTENT_V1,
                    "mode must be \"strict\" or \"advisory\"",
                ))
            }
        };

        let intent_id = match obj.get("intentId").and_then(Value::as_str) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                return Err(SchemaError::invalid(
                    AT_INTENT_V1,
                    "intentId must be a non-empty string",
                ))
            }
        };

        let allow = match obj.get("allow") {
            None => None,
            Some(Value::Array(rules)) => Some(
                rules
                    .iter()
                    .enumerate()
                    .map(|(index, rule)| parse_allow_rule(index, rule))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Some(_) => return Err(SchemaError::invalid(AT_INTENT_V1, "allow must be an array")),
        };

        Ok(Self {
            mode,
            intent_id,
            goal: optional_string(obj, "goal", "goal")?,
            prompt_hash: optional_string(obj, "promptHash", "promptHash")?,
            allow,
            exp: optional_string(obj, "exp", "exp")?,
        })
    }

    fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Decode the intent package from `envelope`, if present.
pub fn extract_intent(envelope: &Envelope) -> Result<Option<Intent>, SchemaError> {
    package::extract::<Intent>(envelope)
}

fn parse_allow_rule(index: usize, value: &Value) -> Result<AllowRule, SchemaError> {
    let obj = value.as_object().ok_or_else(|| {
        SchemaError::invalid(AT_INTENT_V1, format!("allow[{}] must be an object", index))
    })?;

    let methods = match obj.get("methods") {
        None => None,
        Some(Value::Array(items)) => Some(
            items
                .iter()
                .map(|m| m.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| {
                    SchemaError::invalid(
                        AT_INTENT_V1,
                        format!("allow[{}].methods must contain only strings", index),
                    )
                })?,
        ),
        Some(_) => {
            return Err(SchemaError::invalid(
                AT_INTENT_V1,
                format!("allow[{}].methods must be an array of strings", index),
            ))
        }
    };

    Ok(AllowRule {
        origin: optional_string(obj, "origin", &format!("allow[{}].origin", index))?,
        methods,
        path_prefix: optional_string(obj, "pathPrefix", &format!("allow[{}].pathPrefix", index))?,
    })
}

/// A present key must hold a string; `null` counts as present.
fn optional_string(
    obj: &Map<String, Value>,
    key: &str,
    label: &str,
) -> Result<Option<String>, SchemaError> {
    match obj.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(SchemaError::invalid(
            AT_INTENT_V1,
            format!("{} must be a string", label),
        )),
    }
}

/// Parse an ISO 8601 timestamp.
///
/// Accepts RFC 3339 date-times, date-times with a `+HHMM` offset, zone-less
/// date-times (read as UTC), and calendar dates reduced to `YYYY-MM-DD`,
/// `YYYY-MM` or `YYYY` (UTC midnight on the first missing day/month).
/// Anything else is `None`.
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }

    const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M%z"];
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(input, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(naive.and_utc());
        }
    }

    parse_calendar_date(input)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// `YYYY`, `YYYY-MM` or `YYYY-MM-DD`, with exactly that many digits per part.
fn parse_calendar_date(input: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = input.split('-').collect();
    let widths_ok = parts.len() <= 3
        && parts
            .iter()
            .zip([4, 2, 2])
            .all(|(part, width)| part.len() == width && part.bytes().all(|b| b.is_ascii_digit()));
    if !widths_ok {
        return None;
    }

    let year = parts[0].parse().ok()?;
    let month = parts.get(1).map_or(Some(1), |m| m.parse().ok())?;
    let day = parts.get(2).map_or(Some(1), |d| d.parse().ok())?;
    NaiveDate::from_ymd_opt(year, month, day)
}

impl TryFrom<Value> for Intent {
    type Error = SchemaError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}
